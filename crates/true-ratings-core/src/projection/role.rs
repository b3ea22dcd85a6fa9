// Starter/reliever classification.
//
// Rules are checked in `ROLE_RULES` order and the first match makes the
// pitcher a starter; no match means reliever. The scouting profile outranks
// the roster flag, which outranks workload history, so a pitcher being
// converted mid-career is caught before their flag or history moves.

use serde::Serialize;

use crate::scouting::ScoutingProfile;
use crate::source::STARTER_ROLE_CODE;
use crate::stats::aggregate::PitcherHistory;

pub const USABLE_PITCH_RATING: f64 = 45.0;
pub const MIN_USABLE_PITCHES: usize = 3;
pub const MIN_STARTER_STAMINA: f64 = 35.0;
pub const MIN_PROFILE_RATING: f64 = 2.0;
pub const MIN_STARTS: u32 = 5;
/// A past season needs more than this many innings to say anything about role.
pub const HISTORY_MIN_IP: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PitcherRole {
    Starter,
    Reliever,
}

impl PitcherRole {
    pub fn is_starter(self) -> bool {
        self == PitcherRole::Starter
    }
}

/// Everything the classifier looks at for one pitcher.
#[derive(Debug, Clone, Copy)]
pub struct RoleInput<'a> {
    pub scouting: Option<&'a ScoutingProfile>,
    pub role_code: Option<u32>,
    /// Current rating on the 0.5-5.0 scale.
    pub current_rating: Option<f64>,
    pub history: &'a PitcherHistory,
    pub base_year: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RoleRule {
    /// Deep enough repertoire, enough stamina, good enough to start.
    ScoutingProfile,
    /// Roster lists the pitcher in the rotation.
    RosterRoleFlag,
    /// Started games in the base year or the last meaningful season before it.
    RecentStarts,
}

/// Starter rules in priority order.
pub const ROLE_RULES: [RoleRule; 3] = [
    RoleRule::ScoutingProfile,
    RoleRule::RosterRoleFlag,
    RoleRule::RecentStarts,
];

impl RoleRule {
    pub fn matches(self, input: &RoleInput<'_>) -> bool {
        match self {
            RoleRule::ScoutingProfile => profile_says_starter(input),
            RoleRule::RosterRoleFlag => input.role_code == Some(STARTER_ROLE_CODE),
            RoleRule::RecentStarts => history_says_starter(input.history, input.base_year),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoleDecision {
    pub role: PitcherRole,
    /// Rule that made the pitcher a starter; `None` for relievers.
    pub rule: Option<RoleRule>,
}

pub fn classify_role(input: &RoleInput<'_>) -> RoleDecision {
    match ROLE_RULES.iter().copied().find(|rule| rule.matches(input)) {
        Some(rule) => RoleDecision {
            role: PitcherRole::Starter,
            rule: Some(rule),
        },
        None => RoleDecision {
            role: PitcherRole::Reliever,
            rule: None,
        },
    }
}

fn profile_says_starter(input: &RoleInput<'_>) -> bool {
    let Some(profile) = input.scouting else {
        return false;
    };
    let Some(stamina) = profile.stamina else {
        return false;
    };
    profile.usable_pitch_count(USABLE_PITCH_RATING) >= MIN_USABLE_PITCHES
        && stamina >= MIN_STARTER_STAMINA
        && input.current_rating.is_some_and(|r| r >= MIN_PROFILE_RATING)
}

fn history_says_starter(history: &PitcherHistory, base_year: i32) -> bool {
    if let Some(current) = history.season(base_year) {
        if current.gs >= MIN_STARTS {
            return true;
        }
    }
    history
        .seasons
        .iter()
        .filter(|s| s.year < base_year)
        .find(|s| s.ip > HISTORY_MIN_IP)
        .is_some_and(|s| s.gs >= MIN_STARTS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratings::skills::SkillRatings;
    use crate::scouting::PitchRating;
    use crate::stats::season::YearlySeasonStat;

    fn profile(pitches: &[f64], stamina: f64) -> ScoutingProfile {
        ScoutingProfile {
            player_id: 1,
            skills: SkillRatings::new(50.0, 50.0, 50.0),
            stamina: Some(stamina),
            durability: None,
            pitches: pitches
                .iter()
                .map(|&rating| PitchRating {
                    pitch: "X".into(),
                    rating,
                })
                .collect(),
            overall: None,
            overall_stars: None,
            potential_stars: None,
            age: None,
        }
    }

    fn history(seasons: Vec<YearlySeasonStat>) -> PitcherHistory {
        PitcherHistory {
            player_id: 1,
            seasons,
        }
    }

    fn input<'a>(
        scouting: Option<&'a ScoutingProfile>,
        role_code: Option<u32>,
        current_rating: Option<f64>,
        history: &'a PitcherHistory,
    ) -> RoleInput<'a> {
        RoleInput {
            scouting,
            role_code,
            current_rating,
            history,
            base_year: 2024,
        }
    }

    #[test]
    fn profile_makes_starter_over_reliever_history() {
        let p = profile(&[50.0, 55.0, 45.0], 40.0);
        let h = history(vec![YearlySeasonStat::new(2024, 60.0, 60, 20, 5, 0)]);
        let decision = classify_role(&input(Some(&p), None, Some(2.5), &h));
        assert_eq!(decision.role, PitcherRole::Starter);
        assert_eq!(decision.rule, Some(RoleRule::ScoutingProfile));
    }

    #[test]
    fn profile_needs_three_usable_pitches() {
        let p = profile(&[50.0, 55.0, 44.0], 60.0);
        let h = history(vec![]);
        assert_eq!(
            classify_role(&input(Some(&p), None, Some(3.0), &h)).role,
            PitcherRole::Reliever
        );
    }

    #[test]
    fn profile_needs_stamina_and_rating() {
        let h = history(vec![]);
        let low_stamina = profile(&[50.0, 55.0, 60.0], 34.0);
        assert!(!RoleRule::ScoutingProfile.matches(&input(Some(&low_stamina), None, Some(3.0), &h)));
        let ok = profile(&[50.0, 55.0, 60.0], 35.0);
        assert!(!RoleRule::ScoutingProfile.matches(&input(Some(&ok), None, Some(1.5), &h)));
        assert!(!RoleRule::ScoutingProfile.matches(&input(Some(&ok), None, None, &h)));
        assert!(RoleRule::ScoutingProfile.matches(&input(Some(&ok), None, Some(2.0), &h)));
    }

    #[test]
    fn role_flag_beats_history() {
        let h = history(vec![YearlySeasonStat::new(2024, 60.0, 60, 20, 5, 0)]);
        let decision = classify_role(&input(None, Some(STARTER_ROLE_CODE), None, &h));
        assert_eq!(decision.rule, Some(RoleRule::RosterRoleFlag));
    }

    #[test]
    fn other_role_codes_do_not_start() {
        let h = history(vec![]);
        assert_eq!(
            classify_role(&input(None, Some(12), None, &h)).role,
            PitcherRole::Reliever
        );
    }

    #[test]
    fn current_season_starts() {
        let h = history(vec![YearlySeasonStat::new(2024, 30.0, 30, 10, 3, 5)]);
        let decision = classify_role(&input(None, None, None, &h));
        assert_eq!(decision.rule, Some(RoleRule::RecentStarts));
    }

    #[test]
    fn falls_back_to_last_meaningful_season() {
        // 2024 has few starts; 2023 is a token stint; 2022 was in the rotation.
        let h = history(vec![
            YearlySeasonStat::new(2024, 8.0, 8, 3, 1, 1),
            YearlySeasonStat::new(2023, 9.0, 9, 3, 1, 0),
            YearlySeasonStat::new(2022, 150.0, 140, 45, 16, 26),
        ]);
        assert_eq!(classify_role(&input(None, None, None, &h)).role, PitcherRole::Starter);
    }

    #[test]
    fn most_recent_meaningful_season_decides() {
        // 2023 was a relief season with real innings, so 2022's starts don't count.
        let h = history(vec![
            YearlySeasonStat::new(2023, 55.0, 60, 20, 6, 0),
            YearlySeasonStat::new(2022, 150.0, 140, 45, 16, 26),
        ]);
        assert_eq!(classify_role(&input(None, None, None, &h)).role, PitcherRole::Reliever);
    }

    #[test]
    fn nothing_matches_means_reliever() {
        let h = history(vec![]);
        let decision = classify_role(&input(None, None, None, &h));
        assert_eq!(decision.role, PitcherRole::Reliever);
        assert_eq!(decision.rule, None);
    }
}
