// League context: per-season averages every rating is measured against.

use serde::Serialize;
use tracing::debug;

use crate::config::LeagueConfig;
use crate::fip::{calculate_fip, fip_core};
use crate::stats::season::{RateLine, YearlySeasonStat};

pub const DEFAULT_K9: f64 = 7.5;
pub const DEFAULT_BB9: f64 = 3.0;
pub const DEFAULT_HR9: f64 = 0.85;

/// League-wide rates and run environment for one season.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LeagueAverages {
    pub k9: f64,
    pub bb9: f64,
    pub hr9: f64,
    pub fip_constant: f64,
    pub replacement_fip: f64,
    /// Pitchers that met the innings minimum. Zero for the fixed defaults.
    pub qualified_pitchers: usize,
}

impl LeagueAverages {
    /// Fixed fallback used when a season has no qualifying pitchers.
    pub fn defaults(config: &LeagueConfig) -> Self {
        let rates = RateLine::new(DEFAULT_K9, DEFAULT_BB9, DEFAULT_HR9);
        Self::from_rates(rates, config.default_fip_constant, config, 0)
    }

    fn from_rates(
        rates: RateLine,
        fip_constant: f64,
        config: &LeagueConfig,
        qualified_pitchers: usize,
    ) -> Self {
        let league_fip = calculate_fip(&rates, fip_constant);
        Self {
            k9: rates.k9,
            bb9: rates.bb9,
            hr9: rates.hr9,
            fip_constant,
            replacement_fip: league_fip + config.replacement_fip_margin,
            qualified_pitchers,
        }
    }

    pub fn rates(&self) -> RateLine {
        RateLine::new(self.k9, self.bb9, self.hr9)
    }

    pub fn league_fip(&self) -> f64 {
        calculate_fip(&self.rates(), self.fip_constant)
    }

    pub fn is_default(&self) -> bool {
        self.qualified_pitchers == 0
    }
}

/// Compute league averages from one season's lines.
///
/// Rates are innings-weighted (total events over total innings), not a mean
/// of per-pitcher rates. The FIP constant is derived from earned runs when
/// every qualifier carries them, otherwise the configured default is used.
/// Returns `None` when no pitcher reaches the innings minimum.
pub fn compute_league_averages<'a, I>(seasons: I, config: &LeagueConfig) -> Option<LeagueAverages>
where
    I: IntoIterator<Item = &'a YearlySeasonStat>,
{
    let mut ip = 0.0;
    let mut k = 0.0;
    let mut bb = 0.0;
    let mut hr = 0.0;
    let mut er = Some(0.0);
    let mut qualified = 0usize;

    for s in seasons
        .into_iter()
        .filter(|s| s.ip >= config.min_ip_for_league_average && s.ip > 0.0)
    {
        qualified += 1;
        ip += s.ip;
        k += s.k as f64;
        bb += s.bb as f64;
        hr += s.hr as f64;
        er = match (er, s.er) {
            (Some(total), Some(runs)) => Some(total + runs as f64),
            _ => None,
        };
    }

    if qualified == 0 || ip <= 0.0 {
        debug!(
            "no pitcher reached {} innings; no league averages",
            config.min_ip_for_league_average
        );
        return None;
    }

    let rates = RateLine::from_counts(ip, k, bb, hr);
    let fip_constant = match er {
        Some(runs) => runs / ip * 9.0 - fip_core(&rates),
        None => config.default_fip_constant,
    };

    Some(LeagueAverages::from_rates(rates, fip_constant, config, qualified))
}
