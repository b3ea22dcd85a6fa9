// Next-season innings projection.
//
// A model baseline from role, stamina and durability is blended with the
// pitcher's recent workload, then cut for age.

use serde::Serialize;
use tracing::debug;

use crate::config::WorkloadConfig;
use crate::projection::role::PitcherRole;
use crate::scouting::Durability;
use crate::stats::aggregate::PitcherHistory;

// ---------------------------------------------------------------------------
// Model baseline
// ---------------------------------------------------------------------------

pub const STARTER_BASE_IP: f64 = 100.0;
pub const STARTER_IP_PER_STAMINA: f64 = 1.2;
pub const STARTER_MAX_IP: f64 = 240.0;
pub const STARTER_DEFAULT_STAMINA: f64 = 50.0;

pub const RELIEVER_BASE_IP: f64 = 30.0;
pub const RELIEVER_IP_PER_STAMINA: f64 = 0.6;
pub const RELIEVER_MAX_IP: f64 = 100.0;
pub const RELIEVER_DEFAULT_STAMINA: f64 = 30.0;

/// Innings multipliers by age, highest bracket first. Only the first match
/// applies.
pub const AGE_CLIFFS: [(u32, f64); 3] = [(46, 0.10), (43, 0.40), (40, 0.75)];

/// Innings from role and stamina alone, before durability.
pub fn base_innings(role: PitcherRole, stamina: Option<f64>) -> f64 {
    match role {
        PitcherRole::Starter => {
            let stamina = stamina.unwrap_or(STARTER_DEFAULT_STAMINA);
            (STARTER_BASE_IP + stamina * STARTER_IP_PER_STAMINA).clamp(STARTER_BASE_IP, STARTER_MAX_IP)
        }
        PitcherRole::Reliever => {
            let stamina = stamina.unwrap_or(RELIEVER_DEFAULT_STAMINA);
            (RELIEVER_BASE_IP + stamina * RELIEVER_IP_PER_STAMINA).clamp(RELIEVER_BASE_IP, RELIEVER_MAX_IP)
        }
    }
}

/// Model baseline: role and stamina scaled by durability. Unknown durability
/// counts as normal.
pub fn model_innings(role: PitcherRole, stamina: Option<f64>, durability: Option<Durability>) -> f64 {
    let multiplier = durability.unwrap_or(Durability::Normal).multiplier();
    base_innings(role, stamina) * multiplier
}

/// Multiplier for the highest age bracket reached; 1.0 below the first cliff.
pub fn age_cliff_factor(age: u32) -> f64 {
    AGE_CLIFFS
        .iter()
        .find(|(min_age, _)| age >= *min_age)
        .map(|&(_, factor)| factor)
        .unwrap_or(1.0)
}

// ---------------------------------------------------------------------------
// History blend
// ---------------------------------------------------------------------------

/// How the model baseline and the workload history were combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WorkloadRule {
    /// No trailing seasons; the model stands alone.
    NoHistory,
    /// Most recent season replaces the weighted average as the history.
    Breakout,
    /// Young starter with a thin track record: 90% model.
    LimitedExperienceStarter,
    /// Weighted history above the established threshold: 70% history.
    Established,
    /// Thin history: even split.
    Thin,
}

impl WorkloadRule {
    /// Share of the final number that comes from the model baseline.
    pub fn model_weight(self) -> f64 {
        match self {
            WorkloadRule::NoHistory => 1.0,
            WorkloadRule::Breakout | WorkloadRule::Established => 0.3,
            WorkloadRule::LimitedExperienceStarter => 0.9,
            WorkloadRule::Thin => 0.5,
        }
    }
}

/// Everything the workload projector needs for one pitcher.
#[derive(Debug, Clone, Copy)]
pub struct WorkloadInput<'a> {
    pub role: PitcherRole,
    pub stamina: Option<f64>,
    pub durability: Option<Durability>,
    /// Age during the projected season.
    pub age: u32,
    pub history: &'a PitcherHistory,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WorkloadProjection {
    /// Projected innings, rounded to a whole inning.
    pub innings: f64,
    pub model_innings: f64,
    /// History baseline the model was blended with, if any.
    pub history_innings: Option<f64>,
    pub rule: WorkloadRule,
    pub age_factor: f64,
}

/// `weights`-weighted innings over the three most recent seasons.
pub fn weighted_history_innings(history: &PitcherHistory, weights: &[f64; 3]) -> Option<f64> {
    let (total, weight) = history
        .seasons
        .iter()
        .zip(weights.iter())
        .fold((0.0, 0.0), |(total, weight), (season, w)| {
            (total + season.ip * w, weight + w)
        });
    (weight > 0.0).then(|| total / weight)
}

fn is_breakout(history: &PitcherHistory, config: &WorkloadConfig) -> bool {
    let Some(recent) = history.seasons.first() else {
        return false;
    };
    let prior = history.seasons.get(1).map(|s| s.ip).unwrap_or(0.0);
    recent.ip > config.breakout_min_ip && recent.ip > config.breakout_ratio * prior
}

/// Pick the blend rule and the history baseline it uses.
fn select_rule(input: &WorkloadInput<'_>, config: &WorkloadConfig) -> (WorkloadRule, Option<f64>) {
    let Some(weighted) = weighted_history_innings(input.history, &config.history_weights) else {
        return (WorkloadRule::NoHistory, None);
    };

    if is_breakout(input.history, config) {
        let recent = input.history.seasons.first().map(|s| s.ip);
        return (WorkloadRule::Breakout, recent);
    }

    let trailing_total: f64 = input.history.seasons.iter().take(3).map(|s| s.ip).sum();
    if trailing_total < config.limited_experience_ip
        && input.age < config.limited_experience_max_age
        && input.role.is_starter()
    {
        return (WorkloadRule::LimitedExperienceStarter, Some(weighted));
    }

    if weighted > config.established_ip {
        (WorkloadRule::Established, Some(weighted))
    } else {
        (WorkloadRule::Thin, Some(weighted))
    }
}

pub fn project_workload(input: &WorkloadInput<'_>, config: &WorkloadConfig) -> WorkloadProjection {
    let model = model_innings(input.role, input.stamina, input.durability);
    let (rule, history_innings) = select_rule(input, config);

    let blended = match history_innings {
        Some(hist) => {
            let w = rule.model_weight();
            model * w + hist * (1.0 - w)
        }
        None => model,
    };

    let age_factor = age_cliff_factor(input.age);
    let innings = (blended * age_factor).round();

    debug!(
        "player {}: {:?} workload {innings} IP (model {model:.1}, history {history_innings:?}, age factor {age_factor})",
        input.history.player_id, rule
    );

    WorkloadProjection {
        innings,
        model_innings: model,
        history_innings,
        rule,
        age_factor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::season::YearlySeasonStat;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn history(ips: &[f64]) -> PitcherHistory {
        PitcherHistory {
            player_id: 7,
            seasons: ips
                .iter()
                .enumerate()
                .map(|(i, &ip)| YearlySeasonStat::new(2024 - i as i32, ip, 0, 0, 0, 0))
                .collect(),
        }
    }

    fn input(role: PitcherRole, age: u32, history: &PitcherHistory) -> WorkloadInput<'_> {
        WorkloadInput {
            role,
            stamina: Some(50.0),
            durability: None,
            age,
            history,
        }
    }

    // -- Model baseline --

    #[test]
    fn base_innings_by_role() {
        assert!(approx_eq(base_innings(PitcherRole::Starter, Some(50.0)), 160.0));
        assert!(approx_eq(base_innings(PitcherRole::Starter, None), 160.0));
        assert!(approx_eq(base_innings(PitcherRole::Starter, Some(80.0)), 196.0));
        assert!(approx_eq(base_innings(PitcherRole::Reliever, None), 48.0));
        assert!(approx_eq(base_innings(PitcherRole::Reliever, Some(80.0)), 78.0));
    }

    #[test]
    fn base_innings_clamped() {
        assert!(approx_eq(base_innings(PitcherRole::Starter, Some(200.0)), STARTER_MAX_IP));
        assert!(approx_eq(base_innings(PitcherRole::Starter, Some(-10.0)), STARTER_BASE_IP));
        assert!(approx_eq(base_innings(PitcherRole::Reliever, Some(150.0)), RELIEVER_MAX_IP));
    }

    #[test]
    fn durability_scales_model() {
        let fragile = model_innings(PitcherRole::Starter, Some(50.0), Some(Durability::Fragile));
        assert!(approx_eq(fragile, 160.0 * 0.85));
        let unknown = model_innings(PitcherRole::Starter, Some(50.0), None);
        assert!(approx_eq(unknown, 160.0));
    }

    #[test]
    fn age_cliff_uses_highest_bracket_only() {
        assert_eq!(age_cliff_factor(39), 1.0);
        assert_eq!(age_cliff_factor(40), 0.75);
        assert_eq!(age_cliff_factor(43), 0.40);
        assert_eq!(age_cliff_factor(46), 0.10);
        assert_eq!(age_cliff_factor(50), 0.10);
    }

    // -- History blend --

    #[test]
    fn no_history_uses_model() {
        let h = history(&[]);
        let p = project_workload(&input(PitcherRole::Starter, 30, &h), &WorkloadConfig::default());
        assert_eq!(p.rule, WorkloadRule::NoHistory);
        assert_eq!(p.innings, 160.0);
    }

    #[test]
    fn history_weighted_five_three_two() {
        let h = history(&[100.0, 200.0, 50.0, 999.0]);
        let avg = weighted_history_innings(&h, &[5.0, 3.0, 2.0]).unwrap();
        assert!(approx_eq(avg, (500.0 + 600.0 + 100.0) / 10.0));
    }

    #[test]
    fn breakout_ignores_backup_year() {
        let h = history(&[180.0, 60.0]);
        let p = project_workload(&input(PitcherRole::Starter, 27, &h), &WorkloadConfig::default());
        assert_eq!(p.rule, WorkloadRule::Breakout);
        assert_eq!(p.history_innings, Some(180.0));
        // 0.3·160 + 0.7·180
        assert_eq!(p.innings, 174.0);
    }

    #[test]
    fn steady_workload_is_not_breakout() {
        let h = history(&[180.0, 170.0]);
        let p = project_workload(&input(PitcherRole::Starter, 29, &h), &WorkloadConfig::default());
        assert_eq!(p.rule, WorkloadRule::Established);
    }

    #[test]
    fn limited_experience_starter_trusts_model() {
        let h = history(&[40.0, 20.0]);
        let p = project_workload(&input(PitcherRole::Starter, 24, &h), &WorkloadConfig::default());
        assert_eq!(p.rule, WorkloadRule::LimitedExperienceStarter);
        let hist = (40.0 * 5.0 + 20.0 * 3.0) / 8.0;
        assert_eq!(p.innings, (160.0 * 0.9 + hist * 0.1_f64).round());
    }

    #[test]
    fn older_thin_starter_is_thin_blend() {
        let h = history(&[40.0, 20.0]);
        let p = project_workload(&input(PitcherRole::Starter, 28, &h), &WorkloadConfig::default());
        assert_eq!(p.rule, WorkloadRule::Thin);
        let hist = (40.0 * 5.0 + 20.0 * 3.0) / 8.0;
        assert_eq!(p.innings, (160.0 * 0.5 + hist * 0.5_f64).round());
    }

    #[test]
    fn established_reliever_blend() {
        let h = history(&[65.0, 70.0, 60.0]);
        let p = project_workload(&input(PitcherRole::Reliever, 30, &h), &WorkloadConfig::default());
        assert_eq!(p.rule, WorkloadRule::Established);
        // model = 30 + 50·0.6 = 60
        let hist = (65.0 * 5.0 + 70.0 * 3.0 + 60.0 * 2.0) / 10.0;
        assert_eq!(p.innings, (60.0 * 0.3 + hist * 0.7_f64).round());
    }

    #[test]
    fn age_46_starter_keeps_a_tenth() {
        let h = history(&[]);
        let config = WorkloadConfig::default();
        let baseline = project_workload(&input(PitcherRole::Starter, 30, &h), &config);
        let old = project_workload(&input(PitcherRole::Starter, 46, &h), &config);
        assert_eq!(baseline.innings, 160.0);
        assert_eq!(old.innings, 16.0);
        assert!(old.innings <= baseline.innings * 0.10);
    }
}
