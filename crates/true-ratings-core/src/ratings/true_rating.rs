// True Rating calculation.
//
// 1. Recency-weighted multi-year rates from each pitcher's reliable seasons.
// 2. Shrinkage toward scouting when the innings sample is thin. Players with
//    no reliable top-level innings blend scouting with their translated
//    minor-league rates instead.
// 3. A FIP-like composite from the blended rates.
// 4. One tie-aware ranking of the whole pool, then percentile and rating.

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::RatingConfig;
use crate::fip::calculate_fip;
use crate::league::LeagueAverages;
use crate::ratings::percentile::rank_pool;
use crate::ratings::prospect::{minor_league_rates, prospect_scouting_weight};
use crate::ratings::skills::SkillRatings;
use crate::scouting::ScoutingProfile;
use crate::stats::aggregate::{MinorLeagueLine, PitcherHistory};
use crate::stats::season::{PlayerId, RateLine};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One pitcher handed to the rating pass.
#[derive(Debug, Clone)]
pub struct RatingInput {
    pub player_id: PlayerId,
    pub name: String,
    pub history: PitcherHistory,
    pub scouting: Option<ScoutingProfile>,
    /// Roster age, for the prospect age bonus.
    pub age: Option<u32>,
    pub minor_league: Vec<MinorLeagueLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrueRatingResult {
    pub player_id: PlayerId,
    pub name: String,
    /// Component ratings on the 20-80 scale.
    pub skills: SkillRatings,
    /// Blended rates the composite was computed from.
    pub rates: RateLine,
    /// Composite run-prevention score. Used only for ranking; lower is better.
    pub fip: f64,
    /// Innings from seasons that carried weight.
    pub weighted_ip: f64,
    /// Minor-league innings behind a prospect blend; zero otherwise.
    pub minor_league_ip: f64,
    pub scouting_weight: f64,
    pub rank: f64,
    pub percentile: f64,
    pub true_rating: f64,
}

/// Blended rates for one pitcher, before ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct BlendedRates {
    pub rates: RateLine,
    pub weighted_ip: f64,
    pub minor_league_ip: f64,
    pub scouting_weight: f64,
}

// ---------------------------------------------------------------------------
// Recency weighting
// ---------------------------------------------------------------------------

/// Weight for a season by its distance from the base year.
///
/// Seasons after the base year or beyond the weight list get zero.
pub fn recency_weight(base_year: i32, season_year: i32, weights: &[f64]) -> f64 {
    let offset = base_year - season_year;
    if offset < 0 {
        return 0.0;
    }
    weights.get(offset as usize).copied().unwrap_or(0.0)
}

/// Recency-weighted rates across a history.
///
/// Each season counts in proportion to `weight × innings`, and only seasons
/// at or above the reliability floor count at all. Returns the rates and the
/// innings that carried weight, or `None` if no season qualified.
pub fn weighted_rates(
    history: &PitcherHistory,
    base_year: i32,
    config: &RatingConfig,
) -> Option<(RateLine, f64)> {
    let mut weighted_ip = 0.0;
    let mut weighted_k = 0.0;
    let mut weighted_bb = 0.0;
    let mut weighted_hr = 0.0;
    let mut reliable_ip = 0.0;

    for season in &history.seasons {
        if season.ip < config.reliability_ip_floor {
            continue;
        }
        let w = recency_weight(base_year, season.year, &config.recency_weights);
        if w <= 0.0 {
            continue;
        }
        weighted_ip += w * season.ip;
        weighted_k += w * season.k as f64;
        weighted_bb += w * season.bb as f64;
        weighted_hr += w * season.hr as f64;
        reliable_ip += season.ip;
    }

    if weighted_ip <= 0.0 {
        return None;
    }

    Some((
        RateLine::from_counts(weighted_ip, weighted_k, weighted_bb, weighted_hr),
        reliable_ip,
    ))
}

// ---------------------------------------------------------------------------
// Scouting shrinkage
// ---------------------------------------------------------------------------

/// Weight given to scouting for a sample of `innings`.
///
/// Zero without a profile. Otherwise falls linearly from its maximum at zero
/// innings to zero at `scouting_full_ip`. A development gap (potential over
/// overall stars) adds a bonus on top at any sample size; the total never
/// exceeds the maximum.
pub fn scouting_weight(
    innings: f64,
    scouting: Option<&ScoutingProfile>,
    config: &RatingConfig,
) -> f64 {
    let Some(profile) = scouting else {
        return 0.0;
    };
    if config.scouting_full_ip <= 0.0 {
        return 0.0;
    }

    let max = config.max_scouting_weight;
    let base = (max * (1.0 - innings / config.scouting_full_ip)).clamp(0.0, max);
    let gap_bonus = profile
        .star_gap()
        .map(|gap| (gap / 4.0).min(1.0) * config.development_bonus)
        .unwrap_or(0.0);

    (base + gap_bonus).min(max)
}

/// Combine observed performance with scouting for one pitcher.
///
/// Returns `None` when the pitcher has neither a scouting profile nor enough
/// reliable innings to be rated on performance alone. A scouted pitcher with
/// no reliable top-level innings is blended with their minor-league record
/// when one qualifies, and rated on scouting alone otherwise.
pub fn blend_rates(input: &RatingInput, base_year: i32, config: &RatingConfig) -> Option<BlendedRates> {
    let observed = weighted_rates(&input.history, base_year, config);

    match (observed, input.scouting.as_ref()) {
        (Some((rates, ip)), Some(profile)) => {
            let w = scouting_weight(ip, Some(profile), config);
            let scouted = profile.skills.to_rates();
            Some(BlendedRates {
                rates: scouted.weighted_sum(w, &rates, 1.0 - w),
                weighted_ip: ip,
                minor_league_ip: 0.0,
                scouting_weight: w,
            })
        }
        (Some((rates, ip)), None) => {
            if ip < config.min_ip_unscouted {
                return None;
            }
            Some(BlendedRates {
                rates,
                weighted_ip: ip,
                minor_league_ip: 0.0,
                scouting_weight: 0.0,
            })
        }
        (None, Some(profile)) => {
            let scouted = profile.skills.to_rates();
            match minor_league_rates(&input.minor_league, base_year, config) {
                Some((minors, minor_ip)) => {
                    let w = prospect_scouting_weight(minor_ip, input.age, &config.prospect);
                    debug!(
                        "player {}: prospect blend over {minor_ip:.1} minor-league innings, scouting weight {w:.3}",
                        input.player_id
                    );
                    Some(BlendedRates {
                        rates: scouted.weighted_sum(w, &minors, 1.0 - w),
                        weighted_ip: 0.0,
                        minor_league_ip: minor_ip,
                        scouting_weight: w,
                    })
                }
                None => Some(BlendedRates {
                    rates: scouted,
                    weighted_ip: 0.0,
                    minor_league_ip: 0.0,
                    scouting_weight: 1.0,
                }),
            }
        }
        (None, None) => None,
    }
}

// ---------------------------------------------------------------------------
// Pool rating
// ---------------------------------------------------------------------------

/// Rate every pitcher in the pool against each other.
///
/// Results are sorted best first. Pitchers that cannot be rated are left out;
/// an empty pool gives an empty list.
pub fn calculate_true_ratings(
    inputs: &[RatingInput],
    league: &LeagueAverages,
    base_year: i32,
    config: &RatingConfig,
) -> Vec<TrueRatingResult> {
    let mut rated: Vec<(&RatingInput, BlendedRates, f64)> = Vec::with_capacity(inputs.len());

    for input in inputs {
        let Some(blended) = blend_rates(input, base_year, config) else {
            debug!("player {} has no usable history or scouting; not rated", input.player_id);
            continue;
        };
        let fip = calculate_fip(&blended.rates, league.fip_constant);
        if !fip.is_finite() {
            warn!("player {} produced a non-finite composite; dropped", input.player_id);
            continue;
        }
        rated.push((input, blended, fip));
    }

    let scores: Vec<f64> = rated.iter().map(|(_, _, fip)| *fip).collect();
    let ranked = rank_pool(&scores);

    let mut results: Vec<TrueRatingResult> = rated
        .into_iter()
        .zip(ranked)
        .map(|((input, blended, fip), ranked)| TrueRatingResult {
            player_id: input.player_id,
            name: input.name.clone(),
            skills: SkillRatings::from_rates(&blended.rates),
            rates: blended.rates,
            fip,
            weighted_ip: blended.weighted_ip,
            minor_league_ip: blended.minor_league_ip,
            scouting_weight: blended.scouting_weight,
            rank: ranked.rank,
            percentile: ranked.percentile,
            true_rating: ranked.rating,
        })
        .collect();

    results.sort_by(|a, b| a.rank.total_cmp(&b.rank).then(a.player_id.cmp(&b.player_id)));
    results
}
