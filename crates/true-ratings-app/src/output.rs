// JSON reports for a finished projection run.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use true_ratings_core::league::LeagueAverages;
use true_ratings_core::orchestrator::{ProjectedPlayer, ProjectionRun};
use true_ratings_core::ratings::true_rating::TrueRatingResult;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Shared header on both reports.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub requested_year: i32,
    pub base_year: i32,
    pub used_fallback_year: bool,
    pub degraded: bool,
    pub league: LeagueAverages,
}

#[derive(Debug, Serialize)]
struct CurrentReport<'a> {
    #[serde(flatten)]
    summary: &'a RunSummary,
    pitchers: &'a [TrueRatingResult],
}

#[derive(Debug, Serialize)]
struct ProjectionReport<'a> {
    #[serde(flatten)]
    summary: &'a RunSummary,
    projection_year: i32,
    pitchers: &'a [ProjectedPlayer],
}

/// Paths of the files written for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenReports {
    pub current: PathBuf,
    pub projections: PathBuf,
}

pub fn current_file_name(base_year: i32) -> String {
    format!("true_ratings_{base_year}.json")
}

pub fn projections_file_name(projection_year: i32) -> String {
    format!("projections_{projection_year}.json")
}

/// Write `true_ratings_{base}.json` and `projections_{base+1}.json` under
/// `dir`, creating it if needed.
pub fn write_reports(run: &ProjectionRun, dir: &Path) -> Result<WrittenReports, OutputError> {
    std::fs::create_dir_all(dir).map_err(|e| OutputError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let summary = RunSummary {
        generated_at: Utc::now(),
        requested_year: run.requested_year,
        base_year: run.base_year,
        used_fallback_year: run.used_fallback_year,
        degraded: run.degraded,
        league: run.league,
    };

    let current = dir.join(current_file_name(run.base_year));
    write_json(
        &current,
        &CurrentReport {
            summary: &summary,
            pitchers: &run.current,
        },
    )?;

    let projections = dir.join(projections_file_name(run.projection_year()));
    write_json(
        &projections,
        &ProjectionReport {
            summary: &summary,
            projection_year: run.projection_year(),
            pitchers: &run.projected,
        },
    )?;

    info!(
        current = %current.display(),
        projections = %projections.display(),
        "reports written"
    );

    Ok(WrittenReports {
        current,
        projections,
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), OutputError> {
    let file = std::fs::File::create(path).map_err(|e| OutputError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(writer, value).map_err(|e| OutputError::Json {
        path: path.to_path_buf(),
        source: e,
    })
}
