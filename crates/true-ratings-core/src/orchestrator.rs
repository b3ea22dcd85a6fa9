// Projection orchestrator: one run of the whole pipeline.
//
// Gather -> ReadinessFilter -> RateCurrent -> RateProject -> RankProject -> Done
//
// Gather is the only stage that does I/O; roster, scouting and every season
// in the window are fetched concurrently. Ranking is the one barrier: both
// rank passes need every pitcher's score before any percentile exists.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::Datelike;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::{SeasonCache, SeasonResult};
use crate::config::PipelineConfig;
use crate::league::{compute_league_averages, LeagueAverages};
use crate::projection::ensemble::{project_ensemble, EnsembleInput, EnsembleMetadata};
use crate::projection::readiness::{assess_readiness, ReadinessInput, ReadinessRule};
use crate::projection::role::{classify_role, PitcherRole, RoleInput, RoleRule};
use crate::projection::workload::{project_workload, WorkloadInput, WorkloadRule};
use crate::projection::ProjectionError;
use crate::ratings::percentile::rank_pool;
use crate::ratings::skills::SkillRatings;
use crate::ratings::true_rating::{calculate_true_ratings, RatingInput, TrueRatingResult};
use crate::scouting::ScoutingProfile;
use crate::source::{FetchError, RosterRecord};
use crate::stats::aggregate::{
    combine_minor_league_rows, combine_season_rows, histories_from_lines, minor_league_records,
    season_window, MinorLeagueLine, PitcherHistory,
};
use crate::stats::season::{PlayerId, RateLine, YearlySeasonStat};

/// The calendar year right now, used when no base year is configured.
pub fn current_season() -> i32 {
    chrono::Local::now().year()
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedPlayer {
    pub player_id: PlayerId,
    pub name: String,
    /// Age during the projected season.
    pub age: u32,
    pub current_true_rating: f64,
    pub current_percentile: f64,
    pub projected_skills: SkillRatings,
    pub projected_rates: RateLine,
    pub projected_fip: f64,
    pub projected_war: f64,
    pub projected_ip: f64,
    pub role: PitcherRole,
    pub role_rule: Option<RoleRule>,
    pub workload_rule: WorkloadRule,
    pub is_prospect: bool,
    pub projected_rank: f64,
    pub projected_percentile: f64,
    pub projected_true_rating: f64,
    pub ensemble: EnsembleMetadata,
}

impl ProjectedPlayer {
    pub fn is_starter(&self) -> bool {
        self.role.is_starter()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionRun {
    /// Year the run was asked for.
    pub requested_year: i32,
    /// Year the ratings were actually based on.
    pub base_year: i32,
    /// The requested year had no qualifying innings and the year before was
    /// used instead.
    pub used_fallback_year: bool,
    /// Neither year had qualifying innings; league averages are the fixed
    /// defaults.
    pub degraded: bool,
    pub league: LeagueAverages,
    /// Current True Ratings, best first.
    pub current: Vec<TrueRatingResult>,
    /// Next-season projections, best projected rating first.
    pub projected: Vec<ProjectedPlayer>,
}

impl ProjectionRun {
    pub fn projection_year(&self) -> i32 {
        self.base_year + 1
    }
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Gather,
    ReadinessFilter,
    RateCurrent,
    RateProject,
    RankProject,
    Done,
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunStage::Gather => "gather",
            RunStage::ReadinessFilter => "readiness filter",
            RunStage::RateCurrent => "rate current",
            RunStage::RateProject => "rate project",
            RunStage::RankProject => "rank project",
            RunStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Combined season lines keyed by year: top level and minor leagues.
#[derive(Default)]
struct SeasonLines {
    top: BTreeMap<i32, HashMap<PlayerId, YearlySeasonStat>>,
    minors: BTreeMap<i32, HashMap<PlayerId, Vec<MinorLeagueLine>>>,
}

impl SeasonLines {
    fn contains(&self, year: i32) -> bool {
        self.top.contains_key(&year)
    }

    fn insert(&mut self, year: i32, result: SeasonResult) {
        match result {
            Ok(rows) => {
                self.top.insert(year, combine_season_rows(year, &rows));
                self.minors.insert(year, combine_minor_league_rows(year, &rows));
            }
            Err(e) => warn!("season {year} unavailable, treated as empty: {e}"),
        }
    }
}

struct Gathered {
    roster: Vec<RosterRecord>,
    scouting: HashMap<PlayerId, ScoutingProfile>,
    lines: SeasonLines,
}

/// A roster player who passed the readiness gate.
struct Candidate {
    record: RosterRecord,
    history: PitcherHistory,
    minor_league: Vec<MinorLeagueLine>,
    scouting: Option<ScoutingProfile>,
    readiness: ReadinessRule,
}

/// Per-player projection before the second ranking pass.
struct Draft {
    player_id: PlayerId,
    name: String,
    age: u32,
    current: (f64, f64),
    skills: SkillRatings,
    rates: RateLine,
    fip: f64,
    war: f64,
    innings: f64,
    role: PitcherRole,
    role_rule: Option<RoleRule>,
    workload_rule: WorkloadRule,
    is_prospect: bool,
    ensemble: EnsembleMetadata,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

pub struct ProjectionOrchestrator {
    cache: SeasonCache,
    config: PipelineConfig,
}

impl ProjectionOrchestrator {
    pub fn new(cache: SeasonCache, config: PipelineConfig) -> Self {
        Self { cache, config }
    }

    pub fn cache(&self) -> &SeasonCache {
        &self.cache
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage for `requested_year`.
    ///
    /// Only a roster failure aborts the run. Missing scouting, failed season
    /// fetches and individual projection errors degrade the result instead.
    /// A season still in progress is refetched on every run.
    pub async fn run(&self, requested_year: i32) -> Result<ProjectionRun, FetchError> {
        info!("stage {}: {requested_year}", RunStage::Gather);
        let in_progress = current_season();
        if requested_year >= in_progress {
            debug!("season {in_progress} in progress; dropping cached rows");
            self.cache.invalidate(in_progress);
        }
        let mut gathered = self.gather(requested_year).await?;
        let (base_year, league, used_fallback_year, degraded) =
            self.resolve_base_year(requested_year, &mut gathered.lines).await;

        let years_back = self.config.years_back;
        let histories = histories_from_lines(&gathered.lines.top, base_year, years_back);
        let minors = minor_league_records(&gathered.lines.minors, base_year, years_back);
        info!(
            "base year {base_year}: {} rostered, {} with history, {} with minor-league lines, {} scouted",
            gathered.roster.len(),
            histories.len(),
            minors.len(),
            gathered.scouting.len()
        );

        info!("stage {}", RunStage::ReadinessFilter);
        let candidates = self.readiness_filter(gathered, histories, minors, base_year);

        info!("stage {}: {} candidates", RunStage::RateCurrent, candidates.len());
        let inputs: Vec<RatingInput> = candidates
            .values()
            .map(|c| RatingInput {
                player_id: c.record.player_id,
                name: c.record.full_name(),
                history: c.history.clone(),
                scouting: c.scouting.clone(),
                age: Some(c.record.age),
                minor_league: c.minor_league.clone(),
            })
            .collect();
        let current = calculate_true_ratings(&inputs, &league, base_year, &self.config.rating);

        info!("stage {}: {} rated", RunStage::RateProject, current.len());
        let target_year = base_year + 1;
        let drafts: Vec<Draft> = current
            .iter()
            .filter_map(|rated| {
                match self.project_player(rated, &candidates, &league, base_year, requested_year) {
                    Ok(draft) => Some(draft),
                    Err(e) => {
                        warn!("dropping projection for {target_year}: {e}");
                        None
                    }
                }
            })
            .collect();

        info!("stage {}: {} projected", RunStage::RankProject, drafts.len());
        let projected = rank_projections(drafts);

        info!(
            "stage {}: {} current, {} projected (fallback: {used_fallback_year}, degraded: {degraded})",
            RunStage::Done,
            current.len(),
            projected.len()
        );

        Ok(ProjectionRun {
            requested_year,
            base_year,
            used_fallback_year,
            degraded,
            league,
            current,
            projected,
        })
    }

    async fn gather(&self, requested_year: i32) -> Result<Gathered, FetchError> {
        let source = self.cache.source();
        let years = season_window(requested_year, self.config.years_back);

        let (roster, scouting, seasons) = tokio::join!(
            source.fetch_roster(),
            source.fetch_scouting(),
            self.cache.seasons(&years)
        );

        let roster = roster?;
        let scouting = match scouting {
            Ok(profiles) => profiles.into_iter().map(|p| (p.player_id, p)).collect(),
            Err(e) => {
                warn!("scouting unavailable, rating on performance only: {e}");
                HashMap::new()
            }
        };

        let mut lines = SeasonLines::default();
        for (year, result) in seasons {
            lines.insert(year, result);
        }

        Ok(Gathered {
            roster,
            scouting,
            lines,
        })
    }

    /// Pick the base year and its league context.
    ///
    /// Returns `(base_year, league, used_fallback_year, degraded)`.
    async fn resolve_base_year(
        &self,
        requested_year: i32,
        lines: &mut SeasonLines,
    ) -> (i32, LeagueAverages, bool, bool) {
        if let Some(league) = league_for(lines, requested_year, &self.config) {
            return (requested_year, league, false, false);
        }

        let prior = requested_year - 1;
        warn!("no qualifying innings in {requested_year}; retrying with {prior}");
        // The prior window reaches one season further back.
        if self.config.years_back > 0 {
            let oldest = prior - (self.config.years_back as i32 - 1);
            if !lines.contains(oldest) {
                let result = self.cache.season(oldest).await;
                lines.insert(oldest, result);
            }
        }
        if let Some(league) = league_for(lines, prior, &self.config) {
            return (prior, league, true, false);
        }

        warn!("no qualifying innings in {prior} either; using default league averages");
        (
            requested_year,
            LeagueAverages::defaults(&self.config.league),
            false,
            true,
        )
    }

    fn readiness_filter(
        &self,
        gathered: Gathered,
        mut histories: HashMap<PlayerId, PitcherHistory>,
        mut minors: HashMap<PlayerId, Vec<MinorLeagueLine>>,
        base_year: i32,
    ) -> HashMap<PlayerId, Candidate> {
        let Gathered {
            roster,
            mut scouting,
            ..
        } = gathered;

        let mut candidates = HashMap::new();
        for record in roster {
            let player_id = record.player_id;
            let history = histories.remove(&player_id).unwrap_or_else(|| PitcherHistory {
                player_id,
                seasons: Vec::new(),
            });
            let profile = scouting.remove(&player_id);

            let input = ReadinessInput {
                level: record.level,
                scouting: profile.as_ref(),
                history: &history,
                base_year,
            };
            let Some(readiness) = assess_readiness(&input, &self.config.readiness) else {
                debug!("player {player_id} not ready; left out of the pool");
                continue;
            };
            debug!("player {player_id} admitted by {readiness:?}");
            candidates.insert(
                player_id,
                Candidate {
                    record,
                    history,
                    minor_league: minors.remove(&player_id).unwrap_or_default(),
                    scouting: profile,
                    readiness,
                },
            );
        }

        if !histories.is_empty() {
            debug!("{} players with stats are not on the roster", histories.len());
        }
        candidates
    }

    fn project_player(
        &self,
        rated: &TrueRatingResult,
        candidates: &HashMap<PlayerId, Candidate>,
        league: &LeagueAverages,
        base_year: i32,
        requested_year: i32,
    ) -> Result<Draft, ProjectionError> {
        let candidate = candidates
            .get(&rated.player_id)
            .ok_or(ProjectionError::NotRostered(rated.player_id))?;
        let age = projected_age(candidate.record.age, requested_year, base_year + 1);
        let scouting = candidate.scouting.as_ref();

        let role = classify_role(&RoleInput {
            scouting,
            role_code: candidate.record.role_code,
            current_rating: Some(rated.true_rating),
            history: &candidate.history,
            base_year,
        });
        debug!("player {}: {:?} via {:?}", rated.player_id, role.role, role.rule);

        let workload = project_workload(
            &WorkloadInput {
                role: role.role,
                stamina: scouting.and_then(|p| p.stamina),
                durability: scouting.and_then(|p| p.durability),
                age,
                history: &candidate.history,
            },
            &self.config.workload,
        );

        let projection = project_ensemble(
            &EnsembleInput {
                current_rates: rated.rates,
                history: &candidate.history,
                age,
                projected_ip: workload.innings,
                base_year,
            },
            league,
            &self.config,
        )?;

        Ok(Draft {
            player_id: rated.player_id,
            name: rated.name.clone(),
            age,
            current: (rated.true_rating, rated.percentile),
            skills: projection.skills,
            rates: projection.rates,
            fip: projection.fip,
            war: projection.war,
            innings: projection.innings,
            role: role.role,
            role_rule: role.rule,
            workload_rule: workload.rule,
            is_prospect: candidate.readiness.is_prospect(),
            ensemble: projection.metadata,
        })
    }
}

fn league_for(lines: &SeasonLines, year: i32, config: &PipelineConfig) -> Option<LeagueAverages> {
    let season = lines.top.get(&year)?;
    compute_league_averages(season.values(), &config.league)
}

/// Age in `target_year` for a roster age recorded in `requested_year`.
pub fn projected_age(roster_age: u32, requested_year: i32, target_year: i32) -> u32 {
    let years = target_year - requested_year;
    if years >= 0 {
        roster_age.saturating_add(years as u32)
    } else {
        roster_age.saturating_sub(years.unsigned_abs())
    }
}

/// Second, independent ranking pass over projected FIP.
fn rank_projections(drafts: Vec<Draft>) -> Vec<ProjectedPlayer> {
    let scores: Vec<f64> = drafts.iter().map(|d| d.fip).collect();
    let ranked = rank_pool(&scores);

    let mut projected: Vec<ProjectedPlayer> = drafts
        .into_iter()
        .zip(ranked)
        .map(|(d, r)| ProjectedPlayer {
            player_id: d.player_id,
            name: d.name,
            age: d.age,
            current_true_rating: d.current.0,
            current_percentile: d.current.1,
            projected_skills: d.skills,
            projected_rates: d.rates,
            projected_fip: d.fip,
            projected_war: d.war,
            projected_ip: d.innings,
            role: d.role,
            role_rule: d.role_rule,
            workload_rule: d.workload_rule,
            is_prospect: d.is_prospect,
            projected_rank: r.rank,
            projected_percentile: r.percentile,
            projected_true_rating: r.rating,
            ensemble: d.ensemble,
        })
        .collect();

    projected.sort_by(|a, b| {
        a.projected_rank
            .total_cmp(&b.projected_rank)
            .then(a.player_id.cmp(&b.player_id))
    });
    projected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_moves_with_target_year() {
        assert_eq!(projected_age(30, 2024, 2025), 31);
        // Fallback run: the projected season is the requested one.
        assert_eq!(projected_age(30, 2024, 2024), 30);
        assert_eq!(projected_age(0, 2024, 2022), 0);
    }

    #[test]
    fn stage_names() {
        assert_eq!(RunStage::ReadinessFilter.to_string(), "readiness filter");
        assert_eq!(RunStage::Done.to_string(), "done");
    }
}
