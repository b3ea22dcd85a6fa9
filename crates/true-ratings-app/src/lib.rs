// Library root: re-exports all modules so integration tests can drive the
// CSV-backed pipeline without going through the binary.

pub mod config;
pub mod feed;
pub mod output;
