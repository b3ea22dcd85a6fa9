// Aging curve: per-skill change for the coming season, by age.
//
// Growth through the mid-twenties, a flat peak from 28 to 31, then declines
// that deepen with every bracket. The curve is defined on the 20-80 scale and
// applied as the equivalent rate change, so an elite rate is never cut back
// to the top of the scale first. Both projection models age through
// `age_rates`.

use crate::ratings::skills::{rate_change, SkillRatings};
use crate::stats::season::RateLine;

/// Last age with no expected change.
pub const PEAK_END_AGE: u32 = 31;

/// Additive change on the 20-80 scale for a pitcher entering a season at
/// `age`: (stuff, control, hra).
///
/// Past the peak every component is non-positive and non-increasing with age.
pub fn aging_delta(age: u32) -> SkillRatings {
    let (stuff, control, hra) = match age {
        0..=21 => (2.0, 2.5, 1.5),
        22..=24 => (1.0, 1.5, 1.0),
        25..=27 => (0.5, 0.5, 0.5),
        28..=PEAK_END_AGE => (0.0, 0.0, 0.0),
        32..=33 => (-1.0, -0.5, -0.5),
        34..=35 => (-2.0, -1.0, -1.0),
        36..=38 => (-3.0, -1.5, -2.0),
        39..=41 => (-4.0, -2.5, -3.0),
        _ => (-5.0, -3.5, -4.0),
    };
    SkillRatings::new(stuff, control, hra)
}

/// Rates expected at `age`. No rate goes below zero.
pub fn age_rates(rates: &RateLine, age: u32) -> RateLine {
    let change = rate_change(&aging_delta(age));
    RateLine::new(
        (rates.k9 + change.k9).max(0.0),
        (rates.bb9 + change.bb9).max(0.0),
        (rates.hr9 + change.hr9).max(0.0),
    )
}
