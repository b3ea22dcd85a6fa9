// Ensemble projection.
//
// Two forecasts for the same pitcher:
// - ratings model: current true-rating rates, aged one season.
// - trend model: an innings-weighted fit of each rate against year, damped
//   toward the recency-weighted rates, regressed to the league, then aged.
//
// The blend keeps both lines and their weights in `EnsembleMetadata`. FIP and
// WAR are always recomputed from the blended rates.

use serde::Serialize;

use crate::config::{EnsembleConfig, PipelineConfig};
use crate::fip::fip_and_war;
use crate::league::LeagueAverages;
use crate::projection::aging::age_rates;
use crate::projection::ProjectionError;
use crate::ratings::skills::SkillRatings;
use crate::ratings::true_rating::weighted_rates;
use crate::stats::aggregate::PitcherHistory;
use crate::stats::season::RateLine;

#[derive(Debug, Clone, Copy)]
pub struct EnsembleInput<'a> {
    /// Current blended rates from the rating pass.
    pub current_rates: RateLine,
    pub history: &'a PitcherHistory,
    /// Age during the projected season.
    pub age: u32,
    pub projected_ip: f64,
    pub base_year: i32,
}

/// How the two models were combined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnsembleMetadata {
    pub ratings_weight: f64,
    pub trend_weight: f64,
    pub ratings_model: RateLine,
    /// `None` when the pitcher has no history to fit.
    pub trend_model: Option<RateLine>,
    pub seasons_used: usize,
    pub history_ip: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnsembleProjection {
    pub skills: SkillRatings,
    pub rates: RateLine,
    pub fip: f64,
    pub war: f64,
    pub innings: f64,
    pub metadata: EnsembleMetadata,
}

// ---------------------------------------------------------------------------
// Ratings model
// ---------------------------------------------------------------------------

pub fn ratings_model(current: &RateLine, age: u32) -> RateLine {
    age_rates(current, age)
}

// ---------------------------------------------------------------------------
// Trend model
// ---------------------------------------------------------------------------

/// Innings-weighted least-squares value of one rate at `target_year`.
///
/// A single season (or seasons all in one year) has no slope; the weighted
/// mean is returned.
fn fitted_rate(points: &[(f64, f64, f64)], target_year: f64) -> f64 {
    let total_w: f64 = points.iter().map(|(_, _, w)| w).sum();
    let mean_x = points.iter().map(|(x, _, w)| x * w).sum::<f64>() / total_w;
    let mean_y = points.iter().map(|(_, y, w)| y * w).sum::<f64>() / total_w;
    let sxx: f64 = points.iter().map(|(x, _, w)| w * (x - mean_x).powi(2)).sum();
    let sxy: f64 = points
        .iter()
        .map(|(x, y, w)| w * (x - mean_x) * (y - mean_y))
        .sum();
    let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
    mean_y + slope * (target_year - mean_x)
}

/// Trend rates for the season after `base_year`, before aging.
///
/// Returns the rates, the seasons fitted and their total innings, or `None`
/// when no season has innings.
pub fn trend_rates(
    history: &PitcherHistory,
    base_year: i32,
    league: &RateLine,
    config: &PipelineConfig,
) -> Option<(RateLine, usize, f64)> {
    let seasons: Vec<_> = history
        .seasons
        .iter()
        .filter(|s| s.year <= base_year && s.ip > 0.0)
        .collect();
    if seasons.is_empty() {
        return None;
    }
    let history_ip: f64 = seasons.iter().map(|s| s.ip).sum();
    let target = (base_year + 1) as f64;

    let fit = |rate: fn(&RateLine) -> f64| {
        let points: Vec<(f64, f64, f64)> = seasons
            .iter()
            .map(|s| (s.year as f64, rate(&s.rates()), s.ip))
            .collect();
        fitted_rate(&points, target)
    };
    let fitted = RateLine::new(fit(|r| r.k9), fit(|r| r.bb9), fit(|r| r.hr9));

    // Anchor on the recency-weighted rates; if no season is reliable enough
    // for those, the fit's own weighted mean stands in.
    let anchor = weighted_rates(history, base_year, &config.rating)
        .map(|(rates, _)| rates)
        .unwrap_or_else(|| {
            let mean = |rate: fn(&RateLine) -> f64| {
                seasons.iter().map(|s| rate(&s.rates()) * s.ip).sum::<f64>() / history_ip
            };
            RateLine::new(mean(|r| r.k9), mean(|r| r.bb9), mean(|r| r.hr9))
        });

    let ensemble = &config.ensemble;
    let damped = anchor.weighted_sum(1.0 - ensemble.trend_damping, &fitted, ensemble.trend_damping);

    let regression = if ensemble.regression_ip + history_ip > 0.0 {
        ensemble.regression_ip / (ensemble.regression_ip + history_ip)
    } else {
        0.0
    };
    let regressed = damped.weighted_sum(1.0 - regression, league, regression);

    Some((regressed, seasons.len(), history_ip))
}

/// Trend-model weight for a history of `history_ip` innings.
pub fn trend_weight(history_ip: f64, config: &EnsembleConfig) -> f64 {
    if history_ip <= 0.0 || config.full_trend_ip <= 0.0 {
        return 0.0;
    }
    config.max_trend_weight * (history_ip / config.full_trend_ip).min(1.0)
}

// ---------------------------------------------------------------------------
// Blend
// ---------------------------------------------------------------------------

pub fn project_ensemble(
    input: &EnsembleInput<'_>,
    league: &LeagueAverages,
    config: &PipelineConfig,
) -> Result<EnsembleProjection, ProjectionError> {
    let player_id = input.history.player_id;
    let ratings_line = ratings_model(&input.current_rates, input.age);

    let trend = trend_rates(input.history, input.base_year, &league.rates(), config)
        .map(|(rates, seasons, ip)| (age_rates(&rates, input.age), seasons, ip));

    let (trend_model, seasons_used, history_ip) = match trend {
        Some((rates, seasons, ip)) => (Some(rates), seasons, ip),
        None => (None, 0, 0.0),
    };
    let w_trend = if trend_model.is_some() {
        trend_weight(history_ip, &config.ensemble)
    } else {
        0.0
    };
    let w_ratings = 1.0 - w_trend;

    let rates = match &trend_model {
        Some(trend_line) => ratings_line.weighted_sum(w_ratings, trend_line, w_trend),
        None => ratings_line,
    };
    if !rates.is_finite() {
        return Err(ProjectionError::NonFinite {
            player_id,
            what: "blended rates",
        });
    }

    let value = fip_and_war(&rates, league, input.projected_ip, config.league.runs_per_win);
    if !value.fip.is_finite() || !value.war.is_finite() {
        return Err(ProjectionError::NonFinite {
            player_id,
            what: "FIP/WAR",
        });
    }

    Ok(EnsembleProjection {
        skills: SkillRatings::from_rates(&rates),
        rates,
        fip: value.fip,
        war: value.war,
        innings: input.projected_ip,
        metadata: EnsembleMetadata {
            ratings_weight: w_ratings,
            trend_weight: w_trend,
            ratings_model: ratings_line,
            trend_model,
            seasons_used,
            history_ip,
        },
    })
}
