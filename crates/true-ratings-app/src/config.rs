// Configuration loading and validation (config/pipeline.toml).

use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use true_ratings_core::config::{
    EnsembleConfig, LeagueConfig, PipelineConfig, RatingConfig, ReadinessConfig, WorkloadConfig,
};
use true_ratings_core::orchestrator::current_season;
use true_ratings_core::stats::aggregate::DEFAULT_YEARS_BACK;

pub const CONFIG_FILE: &str = "pipeline.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Assembled config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Year to rate; `None` means the current calendar year.
    pub base_year: Option<i32>,
    pub data: DataPaths,
    pub output: OutputConfig,
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    pub fn base_year(&self) -> i32 {
        self.base_year.unwrap_or_else(current_season)
    }
}

// ---------------------------------------------------------------------------
// pipeline.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct PipelineFile {
    #[serde(default)]
    season: SeasonSection,
    data: DataPaths,
    #[serde(default)]
    output: OutputConfig,
    #[serde(default)]
    league: LeagueConfig,
    #[serde(default)]
    rating: RatingConfig,
    #[serde(default)]
    workload: WorkloadConfig,
    #[serde(default)]
    ensemble: EnsembleConfig,
    #[serde(default)]
    readiness: ReadinessConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct SeasonSection {
    base_year: Option<i32>,
    years_back: usize,
}

impl Default for SeasonSection {
    fn default() -> Self {
        Self {
            base_year: None,
            years_back: DEFAULT_YEARS_BACK,
        }
    }
}

/// Where the league export lives. Relative paths are taken from the
/// directory the app runs in.
#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub roster: String,
    /// Optional; without it every pitcher is rated on performance alone.
    #[serde(default)]
    pub scouting: Option<String>,
    /// Directory holding `stats_{year}.csv` files.
    pub stats_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: "output".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/pipeline.toml` under `base_dir`.
///
/// Does not copy defaults; `load_config()` does.
pub fn load_config_from(base_dir: &Path) -> Result<AppConfig, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    parse_config(&text, &path)
}

fn parse_config(text: &str, path: &Path) -> Result<AppConfig, ConfigError> {
    let file: PipelineFile = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config = AppConfig {
        base_year: file.season.base_year,
        data: file.data,
        output: file.output,
        pipeline: PipelineConfig {
            years_back: file.season.years_back,
            league: file.league,
            rating: file.rating,
            workload: file.workload,
            ensemble: file.ensemble,
            readiness: file.readiness,
        },
    };

    validate(&config)?;

    Ok(config)
}

/// Seed `config/` from `defaults/` under `base_dir`.
///
/// Files already in `config/` are left untouched, and `.example` files stay
/// behind. Returns the paths written. Without a `defaults/` directory an
/// existing `config/` is used as is.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.is_dir() {
        if config_dir.is_dir() {
            debug!("no defaults/ in {}; using config/ as is", base_dir.display());
            return Ok(Vec::new());
        }
        return Err(copy_error(format!(
            "no defaults/ or config/ under {}; run from the project root",
            base_dir.display()
        )));
    }

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| copy_error(format!("cannot create {}: {e}", config_dir.display())))?;
    let entries = std::fs::read_dir(&defaults_dir)
        .map_err(|e| copy_error(format!("cannot list {}: {e}", defaults_dir.display())))?;

    let mut copied = Vec::new();
    for entry in entries {
        let source = entry
            .map_err(|e| copy_error(format!("cannot list {}: {e}", defaults_dir.display())))?
            .path();
        let Some(file_name) = source.file_name().filter(|_| source.is_file()) else {
            continue;
        };
        if source.extension().is_some_and(|ext| ext == "example") {
            continue;
        }
        let target = config_dir.join(file_name);
        if copy_default(&source, &target)? {
            info!("seeded {} from {}", target.display(), source.display());
            copied.push(target);
        }
    }

    Ok(copied)
}

/// Copy one default file unless `target` already exists. Returns whether a
/// file was written.
fn copy_default(source: &Path, target: &Path) -> Result<bool, ConfigError> {
    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            debug!("keeping existing {}", target.display());
            return Ok(false);
        }
        Err(e) => return Err(copy_error(format!("cannot create {}: {e}", target.display()))),
    };
    let content = std::fs::read(source)
        .map_err(|e| copy_error(format!("cannot read {}: {e}", source.display())))?;
    dest.write_all(&content)
        .map_err(|e| copy_error(format!("cannot write {}: {e}", target.display())))?;
    Ok(true)
}

/// Load config relative to the current working directory, copying defaults
/// first.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn copy_error(message: String) -> ConfigError {
    ConfigError::DefaultsCopyError { message }
}

fn invalid(field: &str, message: String) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message,
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    let p = &config.pipeline;

    if p.years_back == 0 {
        return Err(invalid("season.years_back", "must be greater than 0".into()));
    }

    if p.rating.recency_weights.is_empty() {
        return Err(invalid("rating.recency_weights", "must not be empty".into()));
    }
    if let Some(w) = p.rating.recency_weights.iter().find(|w| **w <= 0.0) {
        return Err(invalid(
            "rating.recency_weights",
            format!("every weight must be > 0, got {w}"),
        ));
    }

    if p.league.runs_per_win <= 0.0 {
        return Err(invalid(
            "league.runs_per_win",
            format!("must be > 0, got {}", p.league.runs_per_win),
        ));
    }

    if p.league.min_ip_for_league_average < 0.0 {
        return Err(invalid(
            "league.min_ip_for_league_average",
            format!("must be >= 0, got {}", p.league.min_ip_for_league_average),
        ));
    }

    let weights: &[(&str, f64)] = &[
        ("ensemble.max_trend_weight", p.ensemble.max_trend_weight),
        ("ensemble.trend_damping", p.ensemble.trend_damping),
        ("rating.max_scouting_weight", p.rating.max_scouting_weight),
        ("rating.prospect.base_scouting_weight", p.rating.prospect.base_scouting_weight),
        ("rating.prospect.max_scouting_weight", p.rating.prospect.max_scouting_weight),
    ];
    for (name, val) in weights {
        if !(0.0..=1.0).contains(val) {
            return Err(invalid(
                name,
                format!("must be between 0.0 and 1.0 inclusive, got {val}"),
            ));
        }
    }

    if p.rating.prospect.ip_factor_innings < 0.0 {
        return Err(invalid(
            "rating.prospect.ip_factor_innings",
            format!("must be >= 0, got {}", p.rating.prospect.ip_factor_innings),
        ));
    }

    if config.data.roster.trim().is_empty() {
        return Err(invalid("data.roster", "must not be empty".into()));
    }
    if config.data.stats_dir.trim().is_empty() {
        return Err(invalid("data.stats_dir", "must not be empty".into()));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Path to the app crate root, where `defaults/` lives.
    fn crate_root() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    }

    /// Fresh scratch directory with a copy of `defaults/`.
    fn scratch(name: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(format!("true_ratings_{name}"));
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::copy(
            crate_root().join("defaults").join(CONFIG_FILE),
            tmp.join("defaults").join(CONFIG_FILE),
        )
        .unwrap();
        tmp
    }

    const MINIMAL: &str = r#"
[data]
roster = "data/roster.csv"
stats_dir = "data/stats"
"#;

    fn parse(text: &str) -> Result<AppConfig, ConfigError> {
        parse_config(text, Path::new("pipeline.toml"))
    }

    fn assert_rejects(text: &str, field: &str) {
        match parse(text) {
            Err(ConfigError::ValidationError { field: f, .. }) => assert_eq!(f, field),
            other => panic!("expected validation error for {field}, got {other:?}"),
        }
    }

    // -- Loading --

    #[test]
    fn load_valid_config_from_defaults() {
        let tmp = scratch("load_defaults");
        let copied = ensure_config_files(&tmp).expect("should copy default configs");
        assert_eq!(copied, vec![tmp.join("config").join(CONFIG_FILE)]);

        let config = load_config_from(&tmp).expect("should load valid config");
        assert_eq!(config.pipeline.years_back, 4);
        assert_eq!(config.data.roster, "data/roster.csv");
        assert_eq!(config.data.scouting.as_deref(), Some("data/scouting.csv"));
        assert_eq!(config.data.stats_dir, "data/stats");
        assert_eq!(config.output.dir, "output");
        assert_eq!(config.pipeline.rating.recency_weights, vec![5.0, 3.0, 2.0, 1.0]);
        assert!((config.pipeline.league.runs_per_win - 8.5).abs() < f64::EPSILON);
        assert!((config.pipeline.ensemble.max_trend_weight - 0.35).abs() < f64::EPSILON);
        assert!((config.pipeline.rating.prospect.max_scouting_weight - 0.95).abs() < f64::EPSILON);

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_never_overwrites() {
        let tmp = scratch("no_overwrite");
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("config").join(CONFIG_FILE), MINIMAL).unwrap();

        let copied = ensure_config_files(&tmp).unwrap();
        assert!(copied.is_empty());
        let kept = fs::read_to_string(tmp.join("config").join(CONFIG_FILE)).unwrap();
        assert_eq!(kept, MINIMAL);

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn example_files_not_copied() {
        let tmp = scratch("skip_example");
        fs::write(tmp.join("defaults").join("local.toml.example"), "x = 1\n").unwrap();

        let copied = ensure_config_files(&tmp).unwrap();
        assert_eq!(copied.len(), 1);
        assert!(!tmp.join("config").join("local.toml.example").exists());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_defaults_and_config_is_error() {
        let tmp = std::env::temp_dir().join("true_ratings_nothing_here");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();
        assert!(matches!(
            ensure_config_files(&tmp),
            Err(ConfigError::DefaultsCopyError { .. })
        ));
        assert!(matches!(load_config_from(&tmp), Err(ConfigError::FileNotFound { .. })));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn minimal_file_takes_defaults() {
        let config = parse(MINIMAL).unwrap();
        assert_eq!(config.base_year, None);
        assert_eq!(config.data.scouting, None);
        assert_eq!(config.output.dir, "output");
        assert_eq!(config.pipeline.years_back, 4);
        assert_eq!(config.pipeline.workload.history_weights, [5.0, 3.0, 2.0]);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let text = format!("{MINIMAL}\n[league]\nruns_per_win = 9.0\n\n[season]\nbase_year = 2031\n");
        let config = parse(&text).unwrap();
        assert_eq!(config.base_year(), 2031);
        assert!((config.pipeline.league.runs_per_win - 9.0).abs() < f64::EPSILON);
        assert!((config.pipeline.league.min_ip_for_league_average - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_data_section_is_parse_error() {
        assert!(matches!(parse("[season]\nyears_back = 3\n"), Err(ConfigError::ParseError { .. })));
    }

    // -- Validation --

    #[test]
    fn rejects_years_back_zero() {
        assert_rejects(&format!("{MINIMAL}\n[season]\nyears_back = 0\n"), "season.years_back");
    }

    #[test]
    fn rejects_empty_recency_weights() {
        assert_rejects(&format!("{MINIMAL}\n[rating]\nrecency_weights = []\n"), "rating.recency_weights");
    }

    #[test]
    fn rejects_non_positive_recency_weight() {
        assert_rejects(
            &format!("{MINIMAL}\n[rating]\nrecency_weights = [5.0, 0.0]\n"),
            "rating.recency_weights",
        );
    }

    #[test]
    fn rejects_non_positive_runs_per_win() {
        assert_rejects(&format!("{MINIMAL}\n[league]\nruns_per_win = 0.0\n"), "league.runs_per_win");
    }

    #[test]
    fn rejects_negative_min_ip() {
        assert_rejects(
            &format!("{MINIMAL}\n[league]\nmin_ip_for_league_average = -1.0\n"),
            "league.min_ip_for_league_average",
        );
    }

    #[test]
    fn rejects_trend_weight_out_of_range() {
        assert_rejects(
            &format!("{MINIMAL}\n[ensemble]\nmax_trend_weight = 1.5\n"),
            "ensemble.max_trend_weight",
        );
    }

    #[test]
    fn rejects_blank_roster_path() {
        assert_rejects("[data]\nroster = \" \"\nstats_dir = \"data/stats\"\n", "data.roster");
    }

    #[test]
    fn rejects_prospect_weight_out_of_range() {
        assert_rejects(
            &format!("{MINIMAL}\n[rating.prospect]\nmax_scouting_weight = 1.2\n"),
            "rating.prospect.max_scouting_weight",
        );
    }

    #[test]
    fn prospect_table_nests_under_rating() {
        let text = format!("{MINIMAL}\n[rating]\nmin_ip_unscouted = 12.0\n\n[rating.prospect]\nage_bonus_pivot = 25\n");
        let config = parse(&text).unwrap();
        let rating = &config.pipeline.rating;
        assert!((rating.min_ip_unscouted - 12.0).abs() < f64::EPSILON);
        assert_eq!(rating.prospect.age_bonus_pivot, 25);
        assert!((rating.prospect.base_scouting_weight - 0.7).abs() < f64::EPSILON);
    }
}
