// Scouting input: subjective skill grades, durability, repertoire.
//
// Scouting is optional and never authoritative once a pitcher has enough
// innings; see the shrinkage in `ratings::true_rating`.

use serde::{Deserialize, Serialize};

use crate::ratings::skills::SkillRatings;
use crate::stats::season::PlayerId;

// ---------------------------------------------------------------------------
// Durability
// ---------------------------------------------------------------------------

/// Injury-proneness category from the scouting report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Durability {
    IronMan,
    Durable,
    Normal,
    Fragile,
    Wrecked,
}

impl Durability {
    /// Multiplier applied to the base innings projection.
    pub fn multiplier(self) -> f64 {
        match self {
            Durability::IronMan => 1.15,
            Durability::Durable => 1.08,
            Durability::Normal => 1.0,
            Durability::Fragile => 0.85,
            Durability::Wrecked => 0.60,
        }
    }

    /// Parse a report label ("Iron Man", "durable", "WRECKED").
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized: String = label
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "ironman" => Some(Durability::IronMan),
            "durable" => Some(Durability::Durable),
            "normal" => Some(Durability::Normal),
            "fragile" => Some(Durability::Fragile),
            "wrecked" => Some(Durability::Wrecked),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// One pitch in the repertoire with its 20-80 grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchRating {
    pub pitch: String,
    pub rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoutingProfile {
    pub player_id: PlayerId,
    pub skills: SkillRatings,
    /// Stamina on the 20-80 scale.
    pub stamina: Option<f64>,
    pub durability: Option<Durability>,
    #[serde(default)]
    pub pitches: Vec<PitchRating>,
    /// Overall grade on the 20-80 scale.
    pub overall: Option<f64>,
    /// Overall and potential summaries on the 0.5-5.0 star scale.
    pub overall_stars: Option<f64>,
    pub potential_stars: Option<f64>,
    pub age: Option<u32>,
}

impl ScoutingProfile {
    /// Pitches graded at or above `min_rating`.
    pub fn usable_pitch_count(&self, min_rating: f64) -> usize {
        self.pitches.iter().filter(|p| p.rating >= min_rating).count()
    }

    /// Potential minus overall stars: how much development remains.
    pub fn star_gap(&self) -> Option<f64> {
        match (self.potential_stars, self.overall_stars) {
            (Some(pot), Some(ovr)) => Some((pot - ovr).max(0.0)),
            _ => None,
        }
    }
}

/// Parse star text such as "4.5 Stars" or "3" into a number.
pub fn parse_stars(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let number: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    number.parse().ok()
}
