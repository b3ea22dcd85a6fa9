// Per-season stat lines: raw feed rows and the derived per-nine rates.

use serde::{Deserialize, Serialize};

/// League-assigned player identifier.
pub type PlayerId = u32;

/// Split id of the full-season line in the league export.
pub const OVERALL_SPLIT_ID: u32 = 1;

/// Level id of the top (major) league in the league export.
pub const TOP_LEVEL_ID: u32 = 1;

// ---------------------------------------------------------------------------
// Feed rows
// ---------------------------------------------------------------------------

/// One pitching row as delivered by the stats feed.
///
/// A player can have several rows for the same year: one per split, one per
/// level, and one per team after a mid-season trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatRow {
    pub player_id: PlayerId,
    pub year: i32,
    /// Innings in `D.F` outs notation.
    pub ip: String,
    pub k: u32,
    pub bb: u32,
    pub hr: u32,
    pub gs: u32,
    /// Earned runs, when the export includes them.
    #[serde(default)]
    pub er: Option<u32>,
    pub split_id: u32,
    pub level_id: u32,
}

impl StatRow {
    pub fn is_overall_top_level(&self) -> bool {
        self.split_id == OVERALL_SPLIT_ID && self.level_id == TOP_LEVEL_ID
    }
}

/// Keep only full-season rows from the top level.
pub fn filter_overall_top_level(rows: &[StatRow]) -> impl Iterator<Item = &StatRow> {
    rows.iter().filter(|r| r.is_overall_top_level())
}

// ---------------------------------------------------------------------------
// Rates
// ---------------------------------------------------------------------------

/// Strikeouts, walks and home runs allowed per nine innings.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RateLine {
    pub k9: f64,
    pub bb9: f64,
    pub hr9: f64,
}

impl RateLine {
    pub fn new(k9: f64, bb9: f64, hr9: f64) -> Self {
        Self { k9, bb9, hr9 }
    }

    /// Per-nine rates from raw counts. All zero when `ip` is not positive.
    pub fn from_counts(ip: f64, k: f64, bb: f64, hr: f64) -> Self {
        if ip <= 0.0 {
            return Self::default();
        }
        Self {
            k9: k / ip * 9.0,
            bb9: bb / ip * 9.0,
            hr9: hr / ip * 9.0,
        }
    }

    /// Component-wise `self * w_self + other * w_other`.
    pub fn weighted_sum(&self, w_self: f64, other: &RateLine, w_other: f64) -> Self {
        Self {
            k9: self.k9 * w_self + other.k9 * w_other,
            bb9: self.bb9 * w_self + other.bb9 * w_other,
            hr9: self.hr9 * w_self + other.hr9 * w_other,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.k9.is_finite() && self.bb9.is_finite() && self.hr9.is_finite()
    }
}

// ---------------------------------------------------------------------------
// Season line
// ---------------------------------------------------------------------------

/// A player's combined top-level line for one season.
///
/// Historical seasons never change once built; only the season in progress
/// is ever refetched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlySeasonStat {
    pub year: i32,
    /// Fractional innings (150⅔, not 150.2).
    pub ip: f64,
    pub k: u32,
    pub bb: u32,
    pub hr: u32,
    pub gs: u32,
    pub er: Option<u32>,
    pub k9: f64,
    pub bb9: f64,
    pub hr9: f64,
}

impl YearlySeasonStat {
    pub fn new(year: i32, ip: f64, k: u32, bb: u32, hr: u32, gs: u32) -> Self {
        let rates = RateLine::from_counts(ip, k as f64, bb as f64, hr as f64);
        Self {
            year,
            ip,
            k,
            bb,
            hr,
            gs,
            er: None,
            k9: rates.k9,
            bb9: rates.bb9,
            hr9: rates.hr9,
        }
    }

    pub fn with_earned_runs(mut self, er: Option<u32>) -> Self {
        self.er = er;
        self
    }

    pub fn rates(&self) -> RateLine {
        RateLine::new(self.k9, self.bb9, self.hr9)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn row(split_id: u32, level_id: u32) -> StatRow {
        StatRow {
            player_id: 1,
            year: 2024,
            ip: "10.0".into(),
            k: 10,
            bb: 3,
            hr: 1,
            gs: 2,
            er: None,
            split_id,
            level_id,
        }
    }

    #[test]
    fn rates_per_nine() {
        let s = YearlySeasonStat::new(2024, 180.0, 200, 40, 20, 30);
        assert!(approx_eq(s.k9, 10.0));
        assert!(approx_eq(s.bb9, 2.0));
        assert!(approx_eq(s.hr9, 1.0));
    }

    #[test]
    fn zero_innings_has_zero_rates() {
        let s = YearlySeasonStat::new(2024, 0.0, 3, 2, 1, 0);
        assert_eq!(s.rates(), RateLine::default());
    }

    #[test]
    fn filter_keeps_only_overall_top_level() {
        let rows = vec![row(1, 1), row(2, 1), row(1, 2), row(3, 4)];
        let kept: Vec<_> = filter_overall_top_level(&rows).collect();
        assert_eq!(kept.len(), 1);
        assert!(kept[0].is_overall_top_level());
    }

    #[test]
    fn weighted_sum_blends_each_component() {
        let a = RateLine::new(9.0, 3.0, 1.0);
        let b = RateLine::new(7.0, 2.0, 0.5);
        let blended = a.weighted_sum(0.25, &b, 0.75);
        assert!(approx_eq(blended.k9, 7.5));
        assert!(approx_eq(blended.bb9, 2.25));
        assert!(approx_eq(blended.hr9, 0.625));
    }
}
