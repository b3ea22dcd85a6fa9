// FIP and WAR.
//
// The one place the run-prevention formula lives. The current-season rating
// pass, the league context and the projection pass all call through here.

use serde::Serialize;

use crate::league::LeagueAverages;
use crate::stats::season::RateLine;

pub const HR_COEFFICIENT: f64 = 13.0;
pub const BB_COEFFICIENT: f64 = 3.0;
pub const K_COEFFICIENT: f64 = 2.0;

pub const DEFAULT_RUNS_PER_WIN: f64 = 8.5;

/// FIP without the run-environment constant: `(13·HR9 + 3·BB9 − 2·K9) / 9`.
pub fn fip_core(rates: &RateLine) -> f64 {
    (HR_COEFFICIENT * rates.hr9 + BB_COEFFICIENT * rates.bb9 - K_COEFFICIENT * rates.k9) / 9.0
}

/// Fielding-independent pitching. Lower is better.
pub fn calculate_fip(rates: &RateLine, fip_constant: f64) -> f64 {
    fip_core(rates) + fip_constant
}

/// Wins above replacement over `innings`.
///
/// Returns 0.0 when `runs_per_win` is not positive.
pub fn calculate_war(fip: f64, replacement_fip: f64, innings: f64, runs_per_win: f64) -> f64 {
    if runs_per_win <= 0.0 {
        return 0.0;
    }
    ((replacement_fip - fip) / runs_per_win) * (innings / 9.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FipWar {
    pub fip: f64,
    pub war: f64,
}

/// FIP and WAR for a rate line against a league context.
pub fn fip_and_war(
    rates: &RateLine,
    league: &LeagueAverages,
    innings: f64,
    runs_per_win: f64,
) -> FipWar {
    let fip = calculate_fip(rates, league.fip_constant);
    let war = calculate_war(fip, league.replacement_fip, innings, runs_per_win);
    FipWar { fip, war }
}
