// Readiness gate: who belongs in the ranked pool at all.
//
// Players who will not pitch in the league next season distort every
// percentile if they are ranked, so they are left out unless a rule below
// admits them. Rules are checked in `READINESS_RULES` order.

use serde::Serialize;

use crate::config::ReadinessConfig;
use crate::scouting::ScoutingProfile;
use crate::source::LeagueLevel;
use crate::stats::aggregate::PitcherHistory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ReadinessRule {
    /// Enough top-level innings in the base year or the year before.
    RecentPerformance,
    /// Upper-minors assignment with a good enough scouting profile.
    ProspectPromotion,
    /// Scouting overall grade high enough on its own.
    HighScoutingOverall,
}

pub const READINESS_RULES: [ReadinessRule; 3] = [
    ReadinessRule::RecentPerformance,
    ReadinessRule::ProspectPromotion,
    ReadinessRule::HighScoutingOverall,
];

#[derive(Debug, Clone, Copy)]
pub struct ReadinessInput<'a> {
    pub level: Option<LeagueLevel>,
    pub scouting: Option<&'a ScoutingProfile>,
    pub history: &'a PitcherHistory,
    pub base_year: i32,
}

impl ReadinessRule {
    pub fn matches(self, input: &ReadinessInput<'_>, config: &ReadinessConfig) -> bool {
        match self {
            ReadinessRule::RecentPerformance => {
                [input.base_year, input.base_year - 1].iter().any(|&year| {
                    input
                        .history
                        .season(year)
                        .is_some_and(|s| s.ip >= config.min_recent_ip)
                })
            }
            ReadinessRule::ProspectPromotion => {
                let upper_minors = input.level.is_some_and(LeagueLevel::is_upper_minors);
                upper_minors
                    && input.scouting.is_some_and(|p| {
                        p.skills.mean() >= config.prospect_skill_threshold
                            || p.overall_stars.is_some_and(|stars| stars >= config.prospect_min_rating)
                    })
            }
            ReadinessRule::HighScoutingOverall => input
                .scouting
                .and_then(|p| p.overall)
                .is_some_and(|overall| overall >= config.high_overall_threshold),
        }
    }

    /// Admitted on scouting rather than recent performance.
    pub fn is_prospect(self) -> bool {
        self != ReadinessRule::RecentPerformance
    }
}

/// First rule that admits the player, or `None` to leave them out.
pub fn assess_readiness(input: &ReadinessInput<'_>, config: &ReadinessConfig) -> Option<ReadinessRule> {
    READINESS_RULES
        .iter()
        .copied()
        .find(|rule| rule.matches(input, config))
}
