// CSV league export: roster, scouting and per-season stats files.
//
// Layout on disk:
//   roster.csv            one row per rostered player
//   scouting.csv          optional, one row per scouted pitcher
//   stats/stats_{year}.csv  every stat row for one season

use std::io::Read;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use true_ratings_core::ratings::skills::SkillRatings;
use true_ratings_core::scouting::{parse_stars, Durability, PitchRating, ScoutingProfile};
use true_ratings_core::source::{FetchError, LeagueLevel, RosterRecord, StatsSource};
use true_ratings_core::stats::season::{PlayerId, StatRow, OVERALL_SPLIT_ID, TOP_LEVEL_ID};

/// File name of one season's stats inside the stats directory.
pub fn season_file_name(year: i32) -> String {
    format!("stats_{year}.csv")
}

// ---------------------------------------------------------------------------
// Raw CSV rows
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawRosterRow {
    #[serde(alias = "ID", alias = "id")]
    player_id: PlayerId,
    #[serde(default, alias = "First")]
    first_name: String,
    #[serde(default, alias = "Last")]
    last_name: String,
    #[serde(default, alias = "Team")]
    team_id: Option<u32>,
    #[serde(default, alias = "Role", alias = "role")]
    role_code: Option<u32>,
    #[serde(alias = "Age")]
    age: u32,
    #[serde(default, alias = "Level", alias = "level")]
    level_id: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawScoutingRow {
    #[serde(alias = "ID", alias = "id")]
    player_id: PlayerId,
    #[serde(alias = "STU", alias = "Stuff")]
    stuff: f64,
    #[serde(alias = "CON", alias = "Control")]
    control: f64,
    #[serde(alias = "HRA", alias = "HRR")]
    hra: f64,
    #[serde(default, alias = "STM", alias = "Stamina")]
    stamina: Option<f64>,
    #[serde(default, alias = "Prone", alias = "prone")]
    durability: Option<String>,
    /// "Fastball:65;Slider:55;Changeup:45"
    #[serde(default, alias = "Pitches")]
    pitches: Option<String>,
    #[serde(default, alias = "OVR", alias = "ovr")]
    overall: Option<f64>,
    #[serde(default, alias = "OVR Stars", alias = "ovr_stars")]
    overall_stars: Option<String>,
    #[serde(default, alias = "POT Stars", alias = "pot", alias = "POT")]
    potential_stars: Option<String>,
    #[serde(default, alias = "Age")]
    age: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawStatRow {
    #[serde(alias = "ID", alias = "id")]
    player_id: PlayerId,
    #[serde(alias = "Year")]
    year: i32,
    /// Kept as text: the feed writes thirds as `.1` and `.2`.
    #[serde(alias = "IP")]
    ip: String,
    #[serde(alias = "K", alias = "SO", alias = "so")]
    k: u32,
    #[serde(alias = "BB")]
    bb: u32,
    #[serde(alias = "HR", alias = "HRA")]
    hr: u32,
    #[serde(default, alias = "GS")]
    gs: u32,
    #[serde(default, alias = "ER")]
    er: Option<u32>,
    #[serde(default = "default_split", alias = "split")]
    split_id: u32,
    #[serde(default = "default_level", alias = "level")]
    level_id: u32,
}

fn default_split() -> u32 {
    OVERALL_SPLIT_ID
}

fn default_level() -> u32 {
    TOP_LEVEL_ID
}

// ---------------------------------------------------------------------------
// Reader-based loaders
// ---------------------------------------------------------------------------

/// Load roster rows. Malformed rows are skipped with a warning; an
/// unreadable header line fails the whole file.
pub fn load_roster_from_reader<R: Read>(rdr: R) -> Result<Vec<RosterRecord>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    reader.headers()?;
    let mut roster = Vec::new();

    for result in reader.deserialize::<RawRosterRow>() {
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("skipping malformed roster row: {}", e);
                continue;
            }
        };

        let level = match row.level_id {
            Some(id) => {
                let level = LeagueLevel::from_id(id);
                if level.is_none() {
                    debug!(player_id = row.player_id, level_id = id, "unknown level id");
                }
                level
            }
            None => None,
        };

        roster.push(RosterRecord {
            player_id: row.player_id,
            first_name: row.first_name.trim().to_string(),
            last_name: row.last_name.trim().to_string(),
            team_id: row.team_id,
            role_code: row.role_code,
            age: row.age,
            level,
        });
    }

    Ok(roster)
}

/// Load scouting profiles. Unknown durability labels and unparseable pitch
/// entries are dropped from the profile rather than failing the row.
pub fn load_scouting_from_reader<R: Read>(rdr: R) -> Result<Vec<ScoutingProfile>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    reader.headers()?;
    let mut profiles = Vec::new();

    for result in reader.deserialize::<RawScoutingRow>() {
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("skipping malformed scouting row: {}", e);
                continue;
            }
        };

        let durability = row.durability.as_deref().and_then(|label| {
            if label.trim().is_empty() {
                return None;
            }
            let parsed = Durability::from_label(label);
            if parsed.is_none() {
                warn!(player_id = row.player_id, label, "unknown durability label");
            }
            parsed
        });

        profiles.push(ScoutingProfile {
            player_id: row.player_id,
            skills: SkillRatings::new(row.stuff, row.control, row.hra),
            stamina: row.stamina,
            durability,
            pitches: row
                .pitches
                .as_deref()
                .map(|text| parse_pitches(row.player_id, text))
                .unwrap_or_default(),
            overall: row.overall,
            overall_stars: row.overall_stars.as_deref().and_then(parse_stars),
            potential_stars: row.potential_stars.as_deref().and_then(parse_stars),
            age: row.age,
        });
    }

    Ok(profiles)
}

/// Load every stat row of one season file.
pub fn load_stats_from_reader<R: Read>(rdr: R) -> Result<Vec<StatRow>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    reader.headers()?;
    let mut rows = Vec::new();

    for result in reader.deserialize::<RawStatRow>() {
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("skipping malformed stats row: {}", e);
                continue;
            }
        };

        rows.push(StatRow {
            player_id: row.player_id,
            year: row.year,
            ip: row.ip.trim().to_string(),
            k: row.k,
            bb: row.bb,
            hr: row.hr,
            gs: row.gs,
            er: row.er,
            split_id: row.split_id,
            level_id: row.level_id,
        });
    }

    Ok(rows)
}

/// Parse "Fastball:65;Slider:55". Entries without a numeric grade are
/// skipped.
fn parse_pitches(player_id: PlayerId, text: &str) -> Vec<PitchRating> {
    text.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let parsed = entry
                .split_once(':')
                .and_then(|(name, grade)| Some((name.trim(), grade.trim().parse::<f64>().ok()?)));
            match parsed {
                Some((name, rating)) if !name.is_empty() => Some(PitchRating {
                    pitch: name.to_string(),
                    rating,
                }),
                _ => {
                    warn!(player_id, entry, "skipping unparseable pitch entry");
                    None
                }
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// A `StatsSource` over a directory of CSV exports.
#[derive(Debug, Clone)]
pub struct CsvStatsSource {
    roster: PathBuf,
    scouting: Option<PathBuf>,
    stats_dir: PathBuf,
}

impl CsvStatsSource {
    pub fn new(roster: PathBuf, scouting: Option<PathBuf>, stats_dir: PathBuf) -> Self {
        Self {
            roster,
            scouting,
            stats_dir,
        }
    }

    pub fn season_path(&self, year: i32) -> PathBuf {
        self.stats_dir.join(season_file_name(year))
    }
}

async fn read_bytes(path: &Path) -> Result<Vec<u8>, std::io::Error> {
    tokio::fs::read(path).await
}

fn unavailable(path: &Path, e: std::io::Error) -> FetchError {
    FetchError::Unavailable(format!("{}: {e}", path.display()))
}

fn malformed(path: &Path, e: csv::Error) -> FetchError {
    FetchError::Malformed(format!("{}: {e}", path.display()))
}

#[async_trait]
impl StatsSource for CsvStatsSource {
    async fn fetch_roster(&self) -> Result<Vec<RosterRecord>, FetchError> {
        let bytes = read_bytes(&self.roster)
            .await
            .map_err(|e| unavailable(&self.roster, e))?;
        load_roster_from_reader(bytes.as_slice()).map_err(|e| malformed(&self.roster, e))
    }

    async fn fetch_scouting(&self) -> Result<Vec<ScoutingProfile>, FetchError> {
        let Some(path) = &self.scouting else {
            return Ok(Vec::new());
        };
        let bytes = read_bytes(path).await.map_err(|e| unavailable(path, e))?;
        load_scouting_from_reader(bytes.as_slice()).map_err(|e| malformed(path, e))
    }

    async fn fetch_season(&self, year: i32) -> Result<Vec<StatRow>, FetchError> {
        let path = self.season_path(year);
        let bytes = match read_bytes(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(year, path = %path.display(), "no stats file for season");
                return Err(FetchError::NotFound(year));
            }
            Err(e) => return Err(unavailable(&path, e)),
        };
        load_stats_from_reader(bytes.as_slice()).map_err(|e| malformed(&path, e))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
