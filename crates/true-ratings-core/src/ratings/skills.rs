// Skill ratings on the 20-80 scouting scale and their rate-stat equivalents.
//
// Each skill maps to one rate through a fitted linear relation:
//   K/9  = 2.07 + 0.074 * stuff
//   BB/9 = 5.22 - 0.052 * control
//   HR/9 = 2.08 - 0.024 * hra
// Better rate always means a higher rating; results are clamped to the scale.
// Ratings are for reporting and scouting input. Projections stay in rate
// space, so pitchers past either end of the scale keep their separation.

use serde::{Deserialize, Serialize};

use crate::stats::season::RateLine;

pub const SCALE_MIN: f64 = 20.0;
pub const SCALE_MAX: f64 = 80.0;

const K9_INTERCEPT: f64 = 2.07;
const K9_PER_STUFF: f64 = 0.074;
const BB9_INTERCEPT: f64 = 5.22;
const BB9_PER_CONTROL: f64 = 0.052;
const HR9_INTERCEPT: f64 = 2.08;
const HR9_PER_HRA: f64 = 0.024;

pub fn clamp_to_scale(rating: f64) -> f64 {
    rating.clamp(SCALE_MIN, SCALE_MAX)
}

pub fn stuff_to_k9(stuff: f64) -> f64 {
    K9_INTERCEPT + K9_PER_STUFF * stuff
}

pub fn k9_to_stuff(k9: f64) -> f64 {
    clamp_to_scale((k9 - K9_INTERCEPT) / K9_PER_STUFF)
}

pub fn control_to_bb9(control: f64) -> f64 {
    BB9_INTERCEPT - BB9_PER_CONTROL * control
}

pub fn bb9_to_control(bb9: f64) -> f64 {
    clamp_to_scale((BB9_INTERCEPT - bb9) / BB9_PER_CONTROL)
}

pub fn hra_to_hr9(hra: f64) -> f64 {
    HR9_INTERCEPT - HR9_PER_HRA * hra
}

pub fn hr9_to_hra(hr9: f64) -> f64 {
    clamp_to_scale((HR9_INTERCEPT - hr9) / HR9_PER_HRA)
}

/// Rate change implied by a change in ratings. The relation is linear, so
/// no intercept and no clamping.
pub fn rate_change(delta: &SkillRatings) -> RateLine {
    RateLine::new(
        K9_PER_STUFF * delta.stuff,
        -BB9_PER_CONTROL * delta.control,
        -HR9_PER_HRA * delta.hra,
    )
}

/// Stuff, control and home-run avoidance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillRatings {
    pub stuff: f64,
    pub control: f64,
    pub hra: f64,
}

impl SkillRatings {
    pub fn new(stuff: f64, control: f64, hra: f64) -> Self {
        Self {
            stuff,
            control,
            hra,
        }
    }

    pub fn from_rates(rates: &RateLine) -> Self {
        Self {
            stuff: k9_to_stuff(rates.k9),
            control: bb9_to_control(rates.bb9),
            hra: hr9_to_hra(rates.hr9),
        }
    }

    /// Rates implied by these ratings, after clamping to the scale.
    pub fn to_rates(&self) -> RateLine {
        let r = self.clamped();
        RateLine::new(
            stuff_to_k9(r.stuff),
            control_to_bb9(r.control),
            hra_to_hr9(r.hra),
        )
    }

    pub fn clamped(&self) -> Self {
        Self {
            stuff: clamp_to_scale(self.stuff),
            control: clamp_to_scale(self.control),
            hra: clamp_to_scale(self.hra),
        }
    }

    pub fn mean(&self) -> f64 {
        (self.stuff + self.control + self.hra) / 3.0
    }
}
