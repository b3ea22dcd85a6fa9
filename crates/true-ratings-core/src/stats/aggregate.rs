// Multi-year aggregation.
//
// Folds per-season feed rows into one combined top-level line per player and
// season, then groups those lines into a time-ordered history per player.
// Minor-league rows fold the same way, one line per player, level and season.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use tracing::warn;

use crate::source::LeagueLevel;
use crate::stats::innings::innings_to_fraction;
use crate::stats::season::{
    filter_overall_top_level, PlayerId, StatRow, YearlySeasonStat, OVERALL_SPLIT_ID, TOP_LEVEL_ID,
};

/// Number of trailing seasons considered by default.
pub const DEFAULT_YEARS_BACK: usize = 4;

/// A player's top-level seasons inside the trailing window, most recent first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PitcherHistory {
    pub player_id: PlayerId,
    pub seasons: Vec<YearlySeasonStat>,
}

impl PitcherHistory {
    pub fn season(&self, year: i32) -> Option<&YearlySeasonStat> {
        self.seasons.iter().find(|s| s.year == year)
    }
}

/// One season at one minor-league level.
#[derive(Debug, Clone, PartialEq)]
pub struct MinorLeagueLine {
    pub level: LeagueLevel,
    pub season: YearlySeasonStat,
}

/// Years in the trailing window ending at `end_year`, most recent first.
pub fn season_window(end_year: i32, years_back: usize) -> Vec<i32> {
    (0..years_back as i32).map(|offset| end_year - offset).collect()
}

// ---------------------------------------------------------------------------
// Row folding
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct SeasonTotals {
    ip: f64,
    k: u32,
    bb: u32,
    hr: u32,
    gs: u32,
    er: Option<u32>,
}

impl SeasonTotals {
    fn from_row(row: &StatRow, ip: f64) -> Self {
        Self {
            ip,
            k: row.k,
            bb: row.bb,
            hr: row.hr,
            gs: row.gs,
            er: row.er,
        }
    }

    fn add(&mut self, row: &StatRow, ip: f64) {
        self.ip += ip;
        self.k += row.k;
        self.bb += row.bb;
        self.hr += row.hr;
        self.gs += row.gs;
        // Earned runs only survive if every stint reported them.
        self.er = match (self.er, row.er) {
            (Some(a), Some(b)) => Some(a + b),
            _ => None,
        };
    }

    fn into_season(self, year: i32) -> YearlySeasonStat {
        YearlySeasonStat::new(year, self.ip, self.k, self.bb, self.hr, self.gs)
            .with_earned_runs(self.er)
    }
}

fn fold_rows<'a, K, I, F>(year: i32, rows: I, key: F) -> HashMap<K, SeasonTotals>
where
    K: Eq + Hash,
    I: Iterator<Item = &'a StatRow>,
    F: Fn(&StatRow) -> K,
{
    let mut totals: HashMap<K, SeasonTotals> = HashMap::new();

    for row in rows {
        if row.year != year {
            warn!(
                "skipping row for player {}: year {} in season {} feed",
                row.player_id, row.year, year
            );
            continue;
        }
        let ip = match innings_to_fraction(&row.ip) {
            Ok(ip) => ip,
            Err(e) => {
                warn!("skipping row for player {} in {}: {}", row.player_id, year, e);
                continue;
            }
        };
        totals
            .entry(key(row))
            .and_modify(|t| t.add(row, ip))
            .or_insert_with(|| SeasonTotals::from_row(row, ip));
    }

    totals
}

/// Combine one season's feed rows into one top-level line per player.
///
/// Rows outside the overall split or the top level are ignored. Rows whose
/// innings cannot be parsed are skipped with a warning.
pub fn combine_season_rows(year: i32, rows: &[StatRow]) -> HashMap<PlayerId, YearlySeasonStat> {
    fold_rows(year, filter_overall_top_level(rows), |row| row.player_id)
        .into_iter()
        .map(|(id, t)| (id, t.into_season(year)))
        .collect()
}

/// Combine one season's overall-split minor-league rows into one line per
/// player and level. Unknown level ids are ignored.
pub fn combine_minor_league_rows(year: i32, rows: &[StatRow]) -> HashMap<PlayerId, Vec<MinorLeagueLine>> {
    let minors = rows.iter().filter(|r| {
        r.split_id == OVERALL_SPLIT_ID
            && r.level_id != TOP_LEVEL_ID
            && LeagueLevel::from_id(r.level_id).is_some()
    });

    let mut lines: HashMap<PlayerId, Vec<MinorLeagueLine>> = HashMap::new();
    for ((player_id, level_id), totals) in fold_rows(year, minors, |row| (row.player_id, row.level_id)) {
        let Some(level) = LeagueLevel::from_id(level_id) else {
            continue;
        };
        lines.entry(player_id).or_default().push(MinorLeagueLine {
            level,
            season: totals.into_season(year),
        });
    }
    lines
}

/// Group already-combined season lines into histories for the window ending
/// at `end_year`. Years outside the window are ignored.
pub fn histories_from_lines(
    lines: &BTreeMap<i32, HashMap<PlayerId, YearlySeasonStat>>,
    end_year: i32,
    years_back: usize,
) -> HashMap<PlayerId, PitcherHistory> {
    let mut histories: HashMap<PlayerId, PitcherHistory> = HashMap::new();

    for year in season_window(end_year, years_back) {
        let Some(season) = lines.get(&year) else {
            continue;
        };
        for (&player_id, line) in season {
            histories
                .entry(player_id)
                .or_insert_with(|| PitcherHistory {
                    player_id,
                    seasons: Vec::new(),
                })
                .seasons
                .push(line.clone());
        }
    }

    for history in histories.values_mut() {
        history.seasons.sort_by(|a, b| b.year.cmp(&a.year));
    }

    histories
}

/// Minor-league lines inside the window ending at `end_year`, per player,
/// most recent first.
pub fn minor_league_records(
    lines: &BTreeMap<i32, HashMap<PlayerId, Vec<MinorLeagueLine>>>,
    end_year: i32,
    years_back: usize,
) -> HashMap<PlayerId, Vec<MinorLeagueLine>> {
    let mut records: HashMap<PlayerId, Vec<MinorLeagueLine>> = HashMap::new();
    for year in season_window(end_year, years_back) {
        let Some(season) = lines.get(&year) else {
            continue;
        };
        for (&player_id, player_lines) in season {
            records
                .entry(player_id)
                .or_default()
                .extend(player_lines.iter().cloned());
        }
    }
    for record in records.values_mut() {
        record.sort_by(|a, b| b.season.year.cmp(&a.season.year).then(a.level.cmp(&b.level)));
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn row(player_id: PlayerId, year: i32, ip: &str, k: u32, bb: u32, hr: u32, gs: u32) -> StatRow {
        StatRow {
            player_id,
            year,
            ip: ip.into(),
            k,
            bb,
            hr,
            gs,
            er: None,
            split_id: 1,
            level_id: 1,
        }
    }

    #[test]
    fn window_is_most_recent_first() {
        assert_eq!(season_window(2024, 4), vec![2024, 2023, 2022, 2021]);
        assert!(season_window(2024, 0).is_empty());
    }

    #[test]
    fn traded_player_rows_are_summed() {
        let rows = vec![
            row(7, 2024, "60.1", 70, 20, 6, 10),
            row(7, 2024, "40.2", 40, 10, 4, 7),
        ];
        let combined = combine_season_rows(2024, &rows);
        let line = &combined[&7];
        assert!(approx_eq(line.ip, 101.0));
        assert_eq!(line.k, 110);
        assert_eq!(line.gs, 17);
        assert!(approx_eq(line.k9, 110.0 / 101.0 * 9.0));
    }

    #[test]
    fn earned_runs_kept_only_when_every_row_has_them() {
        let mut a = row(1, 2024, "10.0", 10, 2, 1, 0);
        let mut b = row(1, 2024, "10.0", 10, 2, 1, 0);
        a.er = Some(4);
        b.er = Some(5);
        assert_eq!(combine_season_rows(2024, &[a.clone(), b])[&1].er, Some(9));

        let c = row(1, 2024, "10.0", 10, 2, 1, 0);
        assert_eq!(combine_season_rows(2024, &[a, c])[&1].er, None);
    }

    #[test]
    fn minor_league_and_split_rows_ignored() {
        let mut minors = row(1, 2024, "50.0", 50, 10, 5, 8);
        minors.level_id = 2;
        let mut split = row(1, 2024, "20.0", 20, 5, 2, 3);
        split.split_id = 2;
        let combined = combine_season_rows(2024, &[minors, split]);
        assert!(combined.is_empty());
    }

    #[test]
    fn unparseable_innings_row_skipped() {
        let rows = vec![row(1, 2024, "n/a", 10, 2, 1, 0), row(2, 2024, "5.0", 5, 1, 0, 0)];
        let combined = combine_season_rows(2024, &rows);
        assert_eq!(combined.len(), 1);
        assert!(combined.contains_key(&2));
    }

    fn combined(seasons: &[(i32, Vec<StatRow>)]) -> BTreeMap<i32, HashMap<PlayerId, YearlySeasonStat>> {
        seasons
            .iter()
            .map(|(year, rows)| (*year, combine_season_rows(*year, rows)))
            .collect()
    }

    #[test]
    fn histories_span_window_and_sort_descending() {
        let lines = combined(&[
            (2022, vec![row(1, 2022, "100.0", 90, 30, 10, 18)]),
            (2024, vec![row(1, 2024, "150.0", 150, 40, 15, 25)]),
            (2023, vec![row(1, 2023, "120.0", 110, 35, 12, 20)]),
            // Outside a three-year window ending in 2024.
            (2021, vec![row(1, 2021, "80.0", 60, 30, 9, 12)]),
        ]);

        let histories = histories_from_lines(&lines, 2024, 3);
        let h = &histories[&1];
        let years: Vec<i32> = h.seasons.iter().map(|s| s.year).collect();
        assert_eq!(years, vec![2024, 2023, 2022]);
        assert!(approx_eq(h.season(2023).map(|s| s.ip).unwrap_or(0.0), 120.0));
        assert!(h.season(2021).is_none());
    }

    #[test]
    fn missing_seasons_contribute_nothing() {
        let lines = combined(&[(2023, vec![row(1, 2023, "30.0", 30, 10, 3, 0)])]);
        let histories = histories_from_lines(&lines, 2024, 4);
        assert_eq!(histories[&1].seasons.len(), 1);
    }

    // -- Minor leagues --

    fn minor(player_id: PlayerId, year: i32, level_id: u32, ip: &str, k: u32) -> StatRow {
        StatRow {
            level_id,
            ..row(player_id, year, ip, k, 10, 3, 5)
        }
    }

    #[test]
    fn minor_league_rows_combine_per_level() {
        let mut split = minor(3, 2024, 3, "15.0", 12);
        split.split_id = 2;
        let rows = vec![
            minor(3, 2024, 3, "40.0", 30),
            minor(3, 2024, 3, "20.1", 20),
            minor(3, 2024, 2, "12.0", 10),
            split,
            // Unknown level and top level both stay out.
            minor(3, 2024, 9, "30.0", 30),
            row(3, 2024, "5.0", 4, 1, 0, 0),
        ];
        let combined = combine_minor_league_rows(2024, &rows);
        let mut lines = combined[&3].clone();
        lines.sort_by(|a, b| a.level.cmp(&b.level));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].level, LeagueLevel::AAA);
        assert!(approx_eq(lines[0].season.ip, 12.0));
        assert_eq!(lines[1].level, LeagueLevel::AA);
        assert!(approx_eq(lines[1].season.ip, 60.0 + 1.0 / 3.0));
        assert_eq!(lines[1].season.k, 50);
    }

    #[test]
    fn minor_league_records_keep_window() {
        let lines: BTreeMap<i32, HashMap<PlayerId, Vec<MinorLeagueLine>>> = [
            (2024, vec![minor(3, 2024, 3, "60.0", 50)]),
            (2023, vec![minor(3, 2023, 4, "80.0", 70)]),
            (2020, vec![minor(3, 2020, 6, "40.0", 30)]),
        ]
        .into_iter()
        .map(|(year, rows)| (year, combine_minor_league_rows(year, &rows)))
        .collect();

        let records = minor_league_records(&lines, 2024, 4);
        let years: Vec<i32> = records[&3].iter().map(|l| l.season.year).collect();
        assert_eq!(years, vec![2024, 2023]);
        assert_eq!(records[&3][1].level, LeagueLevel::A);
    }
}
