// Tunable constants for the rating and projection pipeline.
//
// Every section deserializes with `#[serde(default)]`, so a TOML file only
// needs to name the values it changes.

use serde::Deserialize;

use crate::stats::aggregate::DEFAULT_YEARS_BACK;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Trailing seasons aggregated per player.
    pub years_back: usize,
    pub league: LeagueConfig,
    pub rating: RatingConfig,
    pub workload: WorkloadConfig,
    pub ensemble: EnsembleConfig,
    pub readiness: ReadinessConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            years_back: DEFAULT_YEARS_BACK,
            league: LeagueConfig::default(),
            rating: RatingConfig::default(),
            workload: WorkloadConfig::default(),
            ensemble: EnsembleConfig::default(),
            readiness: ReadinessConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// League context
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LeagueConfig {
    /// Innings a pitcher needs to count toward league averages.
    pub min_ip_for_league_average: f64,
    /// FIP constant used when the feed carries no earned runs.
    pub default_fip_constant: f64,
    /// Replacement-level FIP sits this far above league-average FIP.
    pub replacement_fip_margin: f64,
    pub runs_per_win: f64,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            min_ip_for_league_average: 20.0,
            default_fip_constant: 3.47,
            replacement_fip_margin: 1.0,
            runs_per_win: 8.5,
        }
    }
}

// ---------------------------------------------------------------------------
// Current ratings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// Weight per season by recency: index 0 is the base year, 1 the year
    /// before, and so on. Seasons past the end of the list get no weight.
    pub recency_weights: Vec<f64>,
    /// Seasons below this many innings are left out of the weighted rates.
    pub reliability_ip_floor: f64,
    /// Unscouted players need this many reliable innings to be rated at all.
    pub min_ip_unscouted: f64,
    /// Scouting weight falls linearly to zero at this many innings.
    pub scouting_full_ip: f64,
    /// Scouting weight at zero innings, and the cap once bonuses are added.
    pub max_scouting_weight: f64,
    /// Extra scouting weight for a full four-star development gap. Applies at
    /// any sample size.
    pub development_bonus: f64,
    /// Players with no reliable top-level innings but a minor-league record.
    pub prospect: ProspectConfig,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            recency_weights: vec![5.0, 3.0, 2.0, 1.0],
            reliability_ip_floor: 10.0,
            min_ip_unscouted: 10.0,
            scouting_full_ip: 150.0,
            max_scouting_weight: 1.0,
            development_bonus: 0.15,
            prospect: ProspectConfig::default(),
        }
    }
}

/// Scouting weight for a prospect:
/// `min(max, base + age bonus + ip_factor_innings / (ip_factor_innings + ip) × ip_factor_weight)`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProspectConfig {
    pub base_scouting_weight: f64,
    pub ip_factor_innings: f64,
    pub ip_factor_weight: f64,
    pub max_scouting_weight: f64,
    /// Each year younger than this adds `age_bonus_per_year`.
    pub age_bonus_pivot: u32,
    pub age_bonus_per_year: f64,
}

impl Default for ProspectConfig {
    fn default() -> Self {
        Self {
            base_scouting_weight: 0.7,
            ip_factor_innings: 50.0,
            ip_factor_weight: 0.2,
            max_scouting_weight: 0.95,
            age_bonus_pivot: 24,
            age_bonus_per_year: 0.03,
        }
    }
}

// ---------------------------------------------------------------------------
// Workload
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkloadConfig {
    /// Weights for the three most recent seasons, most recent first.
    pub history_weights: [f64; 3],
    /// A breakout season must exceed this many innings...
    pub breakout_min_ip: f64,
    /// ...and this multiple of the season before it.
    pub breakout_ratio: f64,
    pub limited_experience_ip: f64,
    pub limited_experience_max_age: u32,
    /// Weighted history above this counts as an established track record.
    pub established_ip: f64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            history_weights: [5.0, 3.0, 2.0],
            breakout_min_ip: 120.0,
            breakout_ratio: 1.5,
            limited_experience_ip: 80.0,
            limited_experience_max_age: 28,
            established_ip: 50.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Ensemble
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnsembleConfig {
    /// Trend-model weight once a pitcher has `full_trend_ip` innings.
    pub max_trend_weight: f64,
    pub full_trend_ip: f64,
    /// Fraction of the fitted year-over-year slope carried into next season.
    pub trend_damping: f64,
    /// Innings of league-average performance mixed into the trend model.
    pub regression_ip: f64,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            max_trend_weight: 0.35,
            full_trend_ip: 300.0,
            trend_damping: 0.5,
            regression_ip: 60.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Readiness
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    /// Top-level innings in the base year or the year before that count as
    /// recent qualifying performance.
    pub min_recent_ip: f64,
    /// Mean scouting skill (20-80) an upper-minors prospect needs.
    pub prospect_skill_threshold: f64,
    /// Alternative current rating (0.5-5.0) an upper-minors prospect needs.
    pub prospect_min_rating: f64,
    /// Scouting overall (20-80) that admits a player on its own.
    pub high_overall_threshold: f64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            min_recent_ip: 10.0,
            prospect_skill_threshold: 45.0,
            prospect_min_rating: 2.0,
            high_overall_threshold: 50.0,
        }
    }
}
