// Library root: the pitcher rating and projection pipeline.
//
// Everything here is pure computation over data handed in by a
// `StatsSource`, except the season cache and the orchestrator, which drive
// the source concurrently.

pub mod cache;
pub mod config;
pub mod fip;
pub mod league;
pub mod orchestrator;
pub mod projection;
pub mod ratings;
pub mod scouting;
pub mod source;
pub mod stats;
