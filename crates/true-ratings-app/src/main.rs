// True Ratings entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Resolve the requested year (argument, config, or current season)
// 4. Build the CSV source and season cache
// 5. Run the projection pipeline
// 6. Write the JSON reports

use std::path::PathBuf;
use std::sync::Arc;

use true_ratings_app::config;
use true_ratings_app::feed::CsvStatsSource;
use true_ratings_app::output;
use true_ratings_core::cache::SeasonCache;
use true_ratings_core::orchestrator::ProjectionOrchestrator;

use anyhow::Context;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, not terminal)
    init_tracing()?;
    info!("True Ratings starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;

    // 3. Resolve the requested year
    let requested_year = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse::<i32>()
            .with_context(|| format!("invalid year argument: {arg}"))?,
        None => config.base_year(),
    };
    info!(
        "Config loaded: year={}, {} seasons back, roster={}",
        requested_year, config.pipeline.years_back, config.data.roster
    );

    // 4. Build the CSV source and season cache
    let source = CsvStatsSource::new(
        PathBuf::from(&config.data.roster),
        config.data.scouting.as_ref().map(PathBuf::from),
        PathBuf::from(&config.data.stats_dir),
    );
    let cache = SeasonCache::new(Arc::new(source));
    let orchestrator = ProjectionOrchestrator::new(cache, config.pipeline.clone());

    // 5. Run the projection pipeline
    let run = orchestrator
        .run(requested_year)
        .await
        .context("projection run failed")?;
    if run.degraded {
        warn!("no qualifying innings for {requested_year} or the year before; league defaults used");
    }

    // 6. Write the JSON reports
    let written = output::write_reports(&run, &PathBuf::from(&config.output.dir))
        .context("failed to write reports")?;

    println!(
        "Rated {} pitchers for {} and projected {} for {}",
        run.current.len(),
        run.base_year,
        run.projected.len(),
        run.projection_year()
    );
    println!("  {}", written.current.display());
    println!("  {}", written.projections.display());

    info!("True Ratings finished");
    Ok(())
}

/// Initialize tracing to write to a log file (not stdout).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("true-ratings.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("true_ratings=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
