//! Timetable generation entry point.
//!
//! # Pipeline
//!
//! 1. Validate the config (the only hard error).
//! 2. Index sections by course group; invalid sections are dropped and
//!    reported.
//! 3. Enumerate each group's legal selections.
//! 4. Run failure analysis on the mandatory groups. Any finding ends the
//!    run with [`SearchStatus::Infeasible`] before searching.
//! 5. Search with the configured strategy and rank the results.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::analysis::{analyze_infeasibility, Infeasibility, InfeasibilityKind};
use crate::catalog::index_sections;
use crate::config::SchedulerConfig;
use crate::models::Section;
use crate::search::{build_group_options, run_search, RankedSchedule, SearchStats};
use crate::validation::ValidationError;

/// How a generation run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchStatus {
    /// The search space was fully explored (or the walk ran its course).
    Complete,
    /// The deadline expired; results are partial.
    TimedOut,
    /// The cancel flag was raised; results are partial.
    Cancelled,
    /// No schedule exists; see [`ScheduleOutcome::infeasibility`].
    Infeasible,
}

/// Result of [`TimetableScheduler::generate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    /// Best schedules, best first.
    pub schedules: Vec<RankedSchedule>,
    /// How the run ended.
    pub status: SearchStatus,
    /// Search diagnostics.
    pub stats: SearchStats,
    /// Sections dropped during indexing.
    pub rejected_sections: Vec<ValidationError>,
    /// Why nothing was found, when `status` is `Infeasible`.
    pub infeasibility: Vec<Infeasibility>,
}

impl ScheduleOutcome {
    fn empty(stats: SearchStats, rejected_sections: Vec<ValidationError>) -> Self {
        Self {
            schedules: Vec::new(),
            status: SearchStatus::Complete,
            stats,
            rejected_sections,
            infeasibility: Vec::new(),
        }
    }

    /// Whether the run produced a usable answer (possibly empty).
    pub fn is_success(&self) -> bool {
        self.status != SearchStatus::Infeasible
    }

    /// Whether the search stopped before finishing.
    pub fn is_partial(&self) -> bool {
        matches!(self.status, SearchStatus::TimedOut | SearchStatus::Cancelled)
    }

    /// Top-ranked schedule.
    pub fn best(&self) -> Option<&RankedSchedule> {
        self.schedules.first()
    }

    /// Number of schedules returned.
    pub fn len(&self) -> usize {
        self.schedules.len()
    }

    /// Whether no schedule was returned.
    pub fn is_empty(&self) -> bool {
        self.schedules.is_empty()
    }
}

/// Generates ranked weekly timetables from a section catalog.
///
/// # Example
///
/// ```
/// use u_timetable::config::SchedulerConfig;
/// use u_timetable::models::{Day, Section};
/// use u_timetable::scheduler::{SearchStatus, TimetableScheduler};
///
/// let sections = vec![
///     Section::lecture("C-L1", "C").with_credits(3).with_slot(Day::Tuesday, 2),
///     Section::lab("C-B1", "C").with_credits(1).with_slot(Day::Wednesday, 5),
/// ];
/// let config = SchedulerConfig::default()
///     .with_max_credits(10)
///     .with_mandatory("C");
///
/// let outcome = TimetableScheduler::new(config).generate(&sections).unwrap();
/// assert_eq!(outcome.status, SearchStatus::Complete);
/// assert_eq!(outcome.schedules[0].schedule.total_credits(), 4);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TimetableScheduler {
    config: SchedulerConfig,
    cancel: Option<Arc<AtomicBool>>,
}

impl TimetableScheduler {
    /// Creates a scheduler for a config.
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// Attaches a cancel flag polled during search.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Generates up to `max_results` ranked schedules.
    ///
    /// # Errors
    /// Only for an invalid configuration. Infeasibility, timeouts and
    /// cancellation are reported through [`ScheduleOutcome::status`].
    pub fn generate(&self, sections: &[Section]) -> Result<ScheduleOutcome, String> {
        let config = &self.config;
        config.validate()?;

        let index = index_sections(sections);
        let groups = build_group_options(&index, config);
        let stats = SearchStats::new(config.strategy);

        if config.max_results == 0 {
            return Ok(ScheduleOutcome::empty(stats, index.rejected));
        }

        let reasons = analyze_infeasibility(&groups, config);
        if !reasons.is_empty() {
            for r in &reasons {
                warn!("infeasible: {}", r.message);
            }
            return Ok(ScheduleOutcome {
                status: SearchStatus::Infeasible,
                infeasibility: reasons,
                ..ScheduleOutcome::empty(stats, index.rejected)
            });
        }

        let run = run_search(&groups, config, self.cancel.clone())?;
        let mut outcome = ScheduleOutcome {
            schedules: run.schedules,
            status: if run.stats.cancelled {
                SearchStatus::Cancelled
            } else if run.stats.timed_out {
                SearchStatus::TimedOut
            } else {
                SearchStatus::Complete
            },
            stats: run.stats,
            rejected_sections: index.rejected,
            infeasibility: Vec::new(),
        };

        if outcome.schedules.is_empty() && outcome.status == SearchStatus::Complete {
            outcome.status = SearchStatus::Infeasible;
            outcome.infeasibility.push(Infeasibility::new(
                InfeasibilityKind::NoFeasibleSchedule,
                config.mandatory_groups.iter().cloned().collect(),
                "no combination of course groups satisfies the hard constraints",
            ));
        }

        info!(
            "generated {} schedules ({:?})",
            outcome.schedules.len(),
            outcome.status
        );
        Ok(outcome)
    }

    /// Runs failure analysis only, without searching.
    ///
    /// # Errors
    /// Only for an invalid configuration.
    pub fn diagnose(&self, sections: &[Section]) -> Result<Vec<Infeasibility>, String> {
        self.config.validate()?;
        let index = index_sections(sections);
        let groups = build_group_options(&index, &self.config);
        Ok(analyze_infeasibility(&groups, &self.config))
    }

    /// Runs [`generate`](Self::generate) on a worker thread.
    ///
    /// Pair with [`with_cancel`](Self::with_cancel) to stop the worker
    /// from the calling thread.
    pub fn spawn(self, sections: Vec<Section>) -> JoinHandle<Result<ScheduleOutcome, String>> {
        thread::spawn(move || self.generate(&sections))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AnnealingConfig, PreferenceWeights, SearchStrategy};
    use crate::models::Day;
    use crate::validation::ValidationErrorKind;
    use crate::search::check_schedule;
    use proptest::prelude::*;
    use std::collections::{BTreeMap, BTreeSet};
    use std::sync::atomic::Ordering;

    fn scenario_conflict() -> Vec<Section> {
        vec![
            Section::lecture("A1", "A").with_credits(5).with_slot(Day::Monday, 1),
            Section::lecture("B1", "B").with_credits(4).with_slot(Day::Monday, 1),
        ]
    }

    fn ten_independent_groups() -> Vec<Section> {
        (0..10)
            .map(|i| {
                Section::lecture(format!("G{i}-L"), format!("G{i}"))
                    .with_credits(3)
                    .with_slot(Day::from_index(i % 5).unwrap_or(Day::Monday), (i / 5 + 1) as u8)
            })
            .collect()
    }

    #[test]
    fn test_mandatory_conflict_is_infeasible() {
        let config = SchedulerConfig::default()
            .with_max_credits(20)
            .with_max_conflicts(0)
            .with_mandatory("A")
            .with_mandatory("B");
        let outcome = TimetableScheduler::new(config)
            .generate(&scenario_conflict())
            .unwrap();

        assert_eq!(outcome.status, SearchStatus::Infeasible);
        assert!(outcome.is_empty());
        assert_eq!(
            outcome.infeasibility[0].message,
            "A and B conflict and cannot both be included under the conflict bound."
        );
    }

    #[test]
    fn test_required_lab_is_included() {
        let sections = vec![
            Section::lecture("C-L", "C").with_credits(3).with_slot(Day::Tuesday, 2),
            Section::lab("C-B", "C").with_credits(1).with_slot(Day::Wednesday, 5),
        ];
        let config = SchedulerConfig::default()
            .with_max_credits(10)
            .with_mandatory("C");
        let outcome = TimetableScheduler::new(config).generate(&sections).unwrap();

        assert_eq!(outcome.status, SearchStatus::Complete);
        assert_eq!(outcome.len(), 1);
        let best = &outcome.schedules[0].schedule;
        assert_eq!(best.total_credits(), 4);
        assert_eq!(outcome.stats.invariant_failures, 0);
        let ids: Vec<&str> = best.sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["C-L", "C-B"]);
    }

    #[test]
    fn test_top_three_distinct_full_loads() {
        let config = SchedulerConfig::default()
            .with_max_credits(9)
            .with_max_results(3);
        let outcome = TimetableScheduler::new(config)
            .generate(&ten_independent_groups())
            .unwrap();

        assert_eq!(outcome.len(), 3);
        let mut sets = BTreeSet::new();
        for r in &outcome.schedules {
            assert_eq!(r.schedule.total_credits(), 9);
            assert_eq!(r.schedule.group_ids().len(), 3);
            let set: BTreeSet<String> =
                r.schedule.group_ids().into_iter().map(String::from).collect();
            assert!(sets.insert(set));
        }
    }

    #[test]
    fn test_zero_results_is_empty_success() {
        let config = SchedulerConfig::default().with_max_results(0);
        let outcome = TimetableScheduler::new(config)
            .generate(&ten_independent_groups())
            .unwrap();
        assert!(outcome.is_success());
        assert!(outcome.is_empty());
        assert_eq!(outcome.status, SearchStatus::Complete);
    }

    #[test]
    fn test_zero_ceiling_with_mandatory_is_infeasible() {
        let config = SchedulerConfig::default()
            .with_max_credits(0)
            .with_mandatory("G0");
        let outcome = TimetableScheduler::new(config)
            .generate(&ten_independent_groups())
            .unwrap();
        assert_eq!(outcome.status, SearchStatus::Infeasible);
        assert_eq!(
            outcome.infeasibility[0].kind,
            InfeasibilityKind::CreditFloorExceeded
        );
    }

    #[test]
    fn test_zero_ceiling_with_free_mandatory_succeeds() {
        let sections = vec![Section::lecture("S-L", "SEMINAR").with_slot(Day::Friday, 1)];
        let config = SchedulerConfig::default()
            .with_max_credits(0)
            .with_mandatory("SEMINAR");
        let outcome = TimetableScheduler::new(config).generate(&sections).unwrap();
        assert_eq!(outcome.status, SearchStatus::Complete);
        assert_eq!(outcome.len(), 1);
        assert_eq!(outcome.schedules[0].schedule.total_credits(), 0);
    }

    #[test]
    fn test_invalid_config_is_error() {
        let config = SchedulerConfig::default()
            .with_mandatory("A")
            .with_excluded("A");
        assert!(TimetableScheduler::new(config).generate(&[]).is_err());

        let config = SchedulerConfig::default()
            .with_weights(PreferenceWeights::default().with_gaps(-1.0));
        assert!(TimetableScheduler::new(config).diagnose(&[]).is_err());
    }

    #[test]
    fn test_empty_catalog_reports_no_schedule() {
        let outcome = TimetableScheduler::default().generate(&[]).unwrap();
        assert_eq!(outcome.status, SearchStatus::Infeasible);
        assert_eq!(
            outcome.infeasibility[0].kind,
            InfeasibilityKind::NoFeasibleSchedule
        );
    }

    #[test]
    fn test_rejected_sections_reported() {
        let mut sections = ten_independent_groups();
        sections.push(Section::lecture("", "G0").with_slot(Day::Friday, 9));
        sections.push(Section::lecture("BAD", "G0").with_credits(-2));
        let config = SchedulerConfig::default().with_max_credits(3);
        let outcome = TimetableScheduler::new(config).generate(&sections).unwrap();

        assert!(outcome.is_success());
        let kinds: Vec<ValidationErrorKind> =
            outcome.rejected_sections.iter().map(|e| e.kind.clone()).collect();
        assert!(kinds.contains(&ValidationErrorKind::MissingId));
        assert!(kinds.contains(&ValidationErrorKind::NegativeCredits));
    }

    #[test]
    fn test_exhaustive_is_deterministic() {
        let config = SchedulerConfig::default()
            .with_max_credits(12)
            .with_max_results(5)
            .with_weights(PreferenceWeights::default())
            .with_desired_free_day(Day::Friday);
        let scheduler = TimetableScheduler::new(config);
        let a = scheduler.generate(&ten_independent_groups()).unwrap();
        let b = scheduler.generate(&ten_independent_groups()).unwrap();
        let ids = |o: &ScheduleOutcome| -> Vec<Vec<String>> {
            o.schedules
                .iter()
                .map(|r| r.schedule.sections.iter().map(|s| s.id.clone()).collect())
                .collect()
        };
        assert_eq!(ids(&a), ids(&b));
        assert!(a.best().is_some_and(|r| !r.schedule.contains_group("G4")));
    }

    #[test]
    fn test_annealing_strategy() {
        let config = SchedulerConfig::default()
            .with_max_credits(9)
            .with_max_results(3)
            .with_mandatory("G1")
            .with_strategy(SearchStrategy::Annealing)
            .with_annealing(AnnealingConfig::default().with_seed(11));
        let outcome = TimetableScheduler::new(config)
            .generate(&ten_independent_groups())
            .unwrap();

        assert_eq!(outcome.status, SearchStatus::Complete);
        assert_eq!(outcome.stats.strategy, SearchStrategy::Annealing);
        assert!(!outcome.is_empty());
        for r in &outcome.schedules {
            assert!(r.schedule.total_credits() <= 9);
            assert!(r.schedule.contains_group("G1"));
        }
    }

    #[test]
    fn test_cancelled_before_start() {
        let flag = Arc::new(AtomicBool::new(true));
        let outcome = TimetableScheduler::default()
            .with_cancel(flag)
            .generate(&ten_independent_groups())
            .unwrap();
        assert_eq!(outcome.status, SearchStatus::Cancelled);
        assert!(outcome.is_partial());
        assert!(outcome.is_success());
    }

    #[test]
    fn test_spawn_on_worker_thread() {
        let flag = Arc::new(AtomicBool::new(false));
        let handle = TimetableScheduler::new(SchedulerConfig::default().with_max_credits(6))
            .with_cancel(flag.clone())
            .spawn(ten_independent_groups());
        let outcome = handle.join().unwrap().unwrap();
        assert!(!flag.load(Ordering::Relaxed));
        assert!(outcome.best().is_some_and(|r| r.schedule.total_credits() == 6));
    }

    #[test]
    fn test_diagnose_without_search() {
        let config = SchedulerConfig::default()
            .with_mandatory("A")
            .with_mandatory("B");
        let reasons = TimetableScheduler::new(config)
            .diagnose(&scenario_conflict())
            .unwrap();
        assert_eq!(reasons.len(), 1);
        assert_eq!(reasons[0].kind, InfeasibilityKind::MandatoryConflict);
    }

    /// Twenty independent groups with three alternatives each: far too
    /// many combinations to finish, but the first leaf is found at once.
    fn wide_catalog() -> Vec<Section> {
        let mut sections = Vec::new();
        for g in 0..20usize {
            let day = Day::from_index(g % 5).unwrap_or(Day::Monday);
            for k in 0..3usize {
                let period = ((g / 5) * 3 + k + 1) as u8;
                sections.push(
                    Section::lecture(format!("W{g}-{k}"), format!("W{g}"))
                        .with_credits(1)
                        .with_slot(day, period),
                );
            }
        }
        sections
    }

    fn wide_config() -> SchedulerConfig {
        SchedulerConfig::default()
            .with_max_credits(60)
            .with_max_results(5)
            .with_mandatory("W0")
            .with_annealing(
                AnnealingConfig::default()
                    .with_max_iterations(usize::MAX)
                    .with_min_temperature(1e-12)
                    .with_cooling_rate(0.999_999_9)
                    .with_seed(5),
            )
    }

    fn assert_admissible(outcome: &ScheduleOutcome, config: &SchedulerConfig) {
        assert!(!outcome.is_empty());
        assert!(outcome.is_success());
        for r in &outcome.schedules {
            assert!(check_schedule(&r.schedule, config, &BTreeMap::new()).is_ok());
            assert!(r.schedule.contains_group("W0"));
        }
    }

    #[test]
    fn test_timeout_keeps_results_found_so_far() {
        for strategy in [SearchStrategy::Exhaustive, SearchStrategy::Annealing] {
            let config = wide_config().with_strategy(strategy).with_timeout_ms(50);
            let outcome = TimetableScheduler::new(config.clone())
                .generate(&wide_catalog())
                .unwrap();

            assert_eq!(outcome.status, SearchStatus::TimedOut);
            assert!(outcome.is_partial());
            assert!(outcome.stats.timed_out);
            assert_admissible(&outcome, &config);
        }
    }

    #[test]
    fn test_cancel_mid_search_keeps_results() {
        for strategy in [SearchStrategy::Exhaustive, SearchStrategy::Annealing] {
            let config = wide_config().with_strategy(strategy).without_timeout();
            let flag = Arc::new(AtomicBool::new(false));
            let handle = TimetableScheduler::new(config.clone())
                .with_cancel(flag.clone())
                .spawn(wide_catalog());

            thread::sleep(std::time::Duration::from_millis(50));
            flag.store(true, Ordering::Relaxed);
            let outcome = handle.join().unwrap().unwrap();

            assert_eq!(outcome.status, SearchStatus::Cancelled);
            assert!(outcome.stats.cancelled);
            assert_admissible(&outcome, &config);
        }
    }

    fn arb_catalog() -> impl Strategy<Value = Vec<Section>> {
        prop::collection::vec(
            (0usize..4, 0i32..5, 0usize..5, 1u8..5, any::<bool>()),
            1..10,
        )
        .prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (group, credits, day, period, lab))| {
                    let day = Day::from_index(day).unwrap_or(Day::Monday);
                    let group = format!("G{group}");
                    let section = if lab {
                        Section::lab(format!("S{i}"), group)
                    } else {
                        Section::lecture(format!("S{i}"), group)
                    };
                    section.with_credits(credits).with_slot(day, period)
                })
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_results_respect_hard_limits(
            sections in arb_catalog(),
            max_credits in 0i32..12,
            max_conflicts in 0usize..2,
            mandatory in prop::collection::btree_set(0usize..4, 0..2),
        ) {
            let mut config = SchedulerConfig::default()
                .with_max_credits(max_credits)
                .with_max_conflicts(max_conflicts)
                .with_max_results(5)
                .without_timeout();
            for g in &mandatory {
                config = config.with_mandatory(format!("G{g}"));
            }
            let outcome = TimetableScheduler::new(config.clone()).generate(&sections).unwrap();

            prop_assert!(outcome.len() <= 5);
            if outcome.status == SearchStatus::Infeasible {
                prop_assert!(outcome.is_empty());
                prop_assert!(!outcome.infeasibility.is_empty());
            }
            for r in &outcome.schedules {
                let s = &r.schedule;
                prop_assert!(!s.is_empty());
                prop_assert!(s.total_credits() <= max_credits);
                prop_assert!(s.conflict_count() <= max_conflicts);
                for g in &config.mandatory_groups {
                    let lectures = s
                        .sections_for_group(g)
                        .into_iter()
                        .filter(|x| x.role == crate::models::SectionRole::Lecture)
                        .count();
                    prop_assert_eq!(lectures, 1);
                }
            }
        }
    }
}
