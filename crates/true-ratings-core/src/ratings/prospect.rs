// Prospect ratings: minor-league lines translated to top-level rates, then
// blended with scouting. Used for players with no reliable top-level innings.
//
// Minor leaguers post fewer strikeouts and more walks than their grades
// predict, so each level's rates get a fixed adjustment before weighting.

use crate::config::{ProspectConfig, RatingConfig};
use crate::ratings::true_rating::recency_weight;
use crate::source::LeagueLevel;
use crate::stats::aggregate::MinorLeagueLine;
use crate::stats::season::RateLine;

/// Added to a level's rates to estimate the top-level equivalent.
pub fn level_adjustment(level: LeagueLevel) -> RateLine {
    match level {
        LeagueLevel::Major => RateLine::new(0.0, 0.0, 0.0),
        LeagueLevel::AAA => RateLine::new(0.30, -0.42, 0.14),
        LeagueLevel::AA => RateLine::new(0.33, -0.47, 0.06),
        LeagueLevel::A | LeagueLevel::ShortA => RateLine::new(0.22, -0.59, 0.07),
        LeagueLevel::Rookie => RateLine::new(0.45, -0.58, 0.06),
    }
}

/// Recency-weighted, level-adjusted rates across minor-league lines.
///
/// Lines below the reliability floor or outside the recency weights are left
/// out. Returns the rates and the innings that counted, or `None` if nothing
/// qualified.
pub fn minor_league_rates(
    lines: &[MinorLeagueLine],
    base_year: i32,
    config: &RatingConfig,
) -> Option<(RateLine, f64)> {
    let mut total_w = 0.0;
    let mut sum = RateLine::default();
    let mut counted_ip = 0.0;

    for line in lines {
        let season = &line.season;
        if season.ip < config.reliability_ip_floor {
            continue;
        }
        let w = recency_weight(base_year, season.year, &config.recency_weights) * season.ip;
        if w <= 0.0 {
            continue;
        }
        let raw = season.rates();
        let adj = level_adjustment(line.level);
        sum.k9 += w * (raw.k9 + adj.k9);
        sum.bb9 += w * (raw.bb9 + adj.bb9);
        sum.hr9 += w * (raw.hr9 + adj.hr9);
        total_w += w;
        counted_ip += season.ip;
    }

    if total_w <= 0.0 {
        return None;
    }
    let rates = RateLine::new(
        (sum.k9 / total_w).max(0.0),
        (sum.bb9 / total_w).max(0.0),
        (sum.hr9 / total_w).max(0.0),
    );
    Some((rates, counted_ip))
}

/// Extra scouting weight for youth; zero at or past the pivot age.
pub fn age_bonus(age: Option<u32>, config: &ProspectConfig) -> f64 {
    age.map(|age| config.age_bonus_pivot.saturating_sub(age) as f64 * config.age_bonus_per_year)
        .unwrap_or(0.0)
}

/// Weight given to scouting against `minor_ip` adjusted minor-league innings.
pub fn prospect_scouting_weight(minor_ip: f64, age: Option<u32>, config: &ProspectConfig) -> f64 {
    let denominator = config.ip_factor_innings + minor_ip.max(0.0);
    let ip_factor = if denominator > 0.0 {
        config.ip_factor_innings / denominator
    } else {
        0.0
    };
    let w = config.base_scouting_weight + age_bonus(age, config) + ip_factor * config.ip_factor_weight;
    w.min(config.max_scouting_weight).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::season::YearlySeasonStat;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn line(level: LeagueLevel, year: i32, ip: f64, k: u32, bb: u32, hr: u32) -> MinorLeagueLine {
        MinorLeagueLine {
            level,
            season: YearlySeasonStat::new(year, ip, k, bb, hr, 10),
        }
    }

    // -- Level translation --

    #[test]
    fn double_a_line_gets_double_a_adjustment() {
        let config = RatingConfig::default();
        // 7.2 K/9, 3.6 BB/9, 0.9 HR/9 before adjustment.
        let lines = [line(LeagueLevel::AA, 2024, 100.0, 80, 40, 10)];
        let (rates, ip) = minor_league_rates(&lines, 2024, &config).unwrap();
        assert!(approx_eq(rates.k9, 7.2 + 0.33));
        assert!(approx_eq(rates.bb9, 3.6 - 0.47));
        assert!(approx_eq(rates.hr9, 0.9 + 0.06));
        assert!(approx_eq(ip, 100.0));
    }

    #[test]
    fn recent_levels_weigh_more() {
        let config = RatingConfig::default();
        let lines = [
            line(LeagueLevel::AAA, 2024, 90.0, 90, 30, 9),
            line(LeagueLevel::A, 2023, 90.0, 45, 30, 9),
        ];
        let (rates, ip) = minor_league_rates(&lines, 2024, &config).unwrap();
        // (5·(9.0 + 0.30) + 3·(4.5 + 0.22)) / 8
        assert!(approx_eq(rates.k9, (5.0 * 9.3 + 3.0 * 4.72) / 8.0));
        assert!(approx_eq(ip, 180.0));
    }

    #[test]
    fn token_stints_and_old_seasons_ignored() {
        let config = RatingConfig::default();
        let lines = [
            line(LeagueLevel::Rookie, 2024, 4.0, 8, 0, 0),
            line(LeagueLevel::AA, 2019, 120.0, 100, 40, 10),
        ];
        assert!(minor_league_rates(&lines, 2024, &config).is_none());
        assert!(minor_league_rates(&[], 2024, &config).is_none());
    }

    #[test]
    fn adjusted_rates_never_negative() {
        let config = RatingConfig::default();
        let lines = [line(LeagueLevel::A, 2024, 30.0, 30, 0, 0)];
        let (rates, _) = minor_league_rates(&lines, 2024, &config).unwrap();
        assert_eq!(rates.bb9, 0.0);
    }

    // -- Scouting weight --

    #[test]
    fn young_thin_sample_leans_on_scouting() {
        let config = ProspectConfig::default();
        // 0.7 + (24 − 22)·0.03 + 50/160·0.2
        let w = prospect_scouting_weight(110.0, Some(22), &config);
        assert!(approx_eq(w, 0.7 + 0.06 + 0.0625));
    }

    #[test]
    fn weight_capped_for_teenagers() {
        let config = ProspectConfig::default();
        assert!(approx_eq(prospect_scouting_weight(0.0, Some(18), &config), 0.95));
    }

    #[test]
    fn no_age_bonus_past_pivot() {
        let config = ProspectConfig::default();
        assert_eq!(age_bonus(Some(24), &config), 0.0);
        assert_eq!(age_bonus(Some(31), &config), 0.0);
        assert_eq!(age_bonus(None, &config), 0.0);
        assert!(approx_eq(age_bonus(Some(20), &config), 0.12));
    }

    #[test]
    fn weight_falls_with_innings_and_age() {
        let config = ProspectConfig::default();
        let thin = prospect_scouting_weight(30.0, Some(25), &config);
        let thick = prospect_scouting_weight(300.0, Some(25), &config);
        let younger = prospect_scouting_weight(300.0, Some(21), &config);
        assert!(thin > thick);
        assert!(younger > thick);
        assert!(thick >= config.base_scouting_weight);
    }
}
