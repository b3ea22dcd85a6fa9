// Stats source: the external collaborator that supplies roster, scouting and
// per-season stat rows.
//
// The core never talks to a file or a network directly. Anything that can
// produce these three lists implements `StatsSource`; `cache::SeasonCache`
// sits in front of it to deduplicate season fetches.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scouting::ScoutingProfile;
use crate::stats::season::{PlayerId, StatRow};

/// Roster role code for a rotation starter.
pub const STARTER_ROLE_CODE: u32 = 11;

/// Level a rostered player is assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LeagueLevel {
    Major,
    AAA,
    AA,
    A,
    ShortA,
    Rookie,
}

impl LeagueLevel {
    /// Map a feed level id. 1 is the top level; unknown ids give `None`.
    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            1 => Some(LeagueLevel::Major),
            2 => Some(LeagueLevel::AAA),
            3 => Some(LeagueLevel::AA),
            4 => Some(LeagueLevel::A),
            5 => Some(LeagueLevel::ShortA),
            6 => Some(LeagueLevel::Rookie),
            _ => None,
        }
    }

    pub fn is_upper_minors(self) -> bool {
        matches!(self, LeagueLevel::AAA | LeagueLevel::AA)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterRecord {
    pub player_id: PlayerId,
    pub first_name: String,
    pub last_name: String,
    pub team_id: Option<u32>,
    pub role_code: Option<u32>,
    /// Age during the season the run is requested for.
    pub age: u32,
    pub level: Option<LeagueLevel>,
}

impl RosterRecord {
    pub fn full_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (false, false) => format!("{} {}", self.first_name, self.last_name),
            (true, _) => self.last_name.clone(),
            (false, true) => self.first_name.clone(),
        }
    }
}

/// Failure to produce data from a source. Cloneable so a shared in-flight
/// fetch can hand the same error to every waiter.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    #[error("no stats available for {0}")]
    NotFound(i32),

    #[error("source unavailable: {0}")]
    Unavailable(String),

    #[error("malformed data: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait StatsSource: Send + Sync {
    async fn fetch_roster(&self) -> Result<Vec<RosterRecord>, FetchError>;

    /// Scouting is optional; a source without it returns an empty list.
    async fn fetch_scouting(&self) -> Result<Vec<ScoutingProfile>, FetchError>;

    /// Every stat row for one season, all splits and levels.
    async fn fetch_season(&self, year: i32) -> Result<Vec<StatRow>, FetchError>;
}
