// Raw stat handling: innings notation, per-season lines, multi-year histories.

pub mod aggregate;
pub mod innings;
pub mod season;

pub use season::{PlayerId, RateLine, StatRow, YearlySeasonStat};
