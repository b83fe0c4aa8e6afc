//! Timetable search.
//!
//! Explores the cross product of per-group options under the credit
//! ceiling, the conflict bound and the hard day limits, feeding every
//! admissible complete schedule to a [`ResultLedger`].
//!
//! # Strategies
//!
//! - [`SearchStrategy::Exhaustive`]: depth-first backtracking with
//!   incremental pruning. Deterministic.
//! - [`SearchStrategy::Annealing`]: simulated-annealing walk over group
//!   assignments. Deterministic for a fixed seed.
//!
//! The strategy is picked by a plain `match` on the config; both share
//! the group ordering, the deadline, and the ledger.
//!
//! # Group Ordering
//!
//! Mandatory groups come first, then optional ones; inside each bucket,
//! groups with fewer selections come first (ties keep group-id order).
//! This is a pruning heuristic only. Under a result cap it decides which
//! of several equally ranked schedules are found, and therefore kept,
//! first.
//!
//! # References
//!
//! - Golomb & Baumert (1965), "Backtrack Programming"
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"

mod annealing;
mod backtrack;
mod feasibility;
mod ledger;
mod occupancy;

pub use feasibility::check_schedule;
pub(crate) use feasibility::day_violations;
pub use ledger::{OfferOutcome, RankedSchedule, ResultLedger};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::catalog::{derive_constraints, enumerate_selections, CatalogIndex};
use crate::config::{SchedulerConfig, SearchStrategy};
use crate::models::{GroupConstraint, Schedule, Selection};

/// Companion requirements per group id, as seen by the terminal re-check.
pub(crate) type ConstraintMap = BTreeMap<String, GroupConstraint>;
use crate::scheduler::{RankKey, ScoreBreakdown};

/// Legal options of one course group, as seen by the search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupOptions {
    /// Course-group identifier.
    pub group_id: String,
    /// Companion requirements the selections were built from.
    pub constraint: GroupConstraint,
    /// Legal selections, in enumeration order.
    pub selections: Vec<Selection>,
    /// Whether the group must appear.
    pub mandatory: bool,
}

impl GroupOptions {
    /// Creates an option list.
    pub fn new(group_id: impl Into<String>, selections: Vec<Selection>, mandatory: bool) -> Self {
        Self {
            group_id: group_id.into(),
            constraint: GroupConstraint::default(),
            selections,
            mandatory,
        }
    }

    /// Sets the originating constraint.
    pub fn with_constraint(mut self, constraint: GroupConstraint) -> Self {
        self.constraint = constraint;
        self
    }

    /// Whether the null "skip" option is legal.
    pub fn allows_skip(&self) -> bool {
        !self.mandatory
    }

    /// Number of branches at this group's search node.
    pub fn option_count(&self) -> usize {
        self.selections.len() + usize::from(self.allows_skip())
    }

    /// Cheapest selection's credits, if any selection exists.
    pub fn min_credits(&self) -> Option<i32> {
        self.selections.iter().map(Selection::credits).min()
    }
}

/// Builds the per-group option lists for a catalog.
///
/// Excluded groups are dropped. Groups without any legal selection are
/// kept so that failure analysis can report mandatory ones.
pub fn build_group_options(index: &CatalogIndex, config: &SchedulerConfig) -> Vec<GroupOptions> {
    let constraints = derive_constraints(&index.groups);
    index
        .groups
        .iter()
        .filter(|(id, _)| !config.excluded_groups.contains(*id))
        .map(|(id, group)| {
            let constraint = constraints.get(id).copied().unwrap_or_default();
            GroupOptions::new(
                id.clone(),
                enumerate_selections(group, &constraint),
                config.is_mandatory(id),
            )
            .with_constraint(constraint)
        })
        .collect()
}

/// Orders groups for search (see the module docs).
///
/// Optional groups without selections are dropped: skipping is their
/// only option.
pub fn order_groups(groups: &[GroupOptions]) -> Vec<&GroupOptions> {
    let mut ordered: Vec<&GroupOptions> = groups
        .iter()
        .filter(|g| g.mandatory || !g.selections.is_empty())
        .collect();
    ordered.sort_by_key(|g| (!g.mandatory, g.selections.len()));
    ordered
}

/// Counters and timings of one search run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchStats {
    /// Strategy that produced the run.
    pub strategy: SearchStrategy,
    /// Search nodes (backtracking) or iterations (annealing).
    pub nodes_explored: u64,
    /// Branches cut by a hard limit (backtracking) or infeasible
    /// neighbors (annealing).
    pub branches_pruned: u64,
    /// Complete schedules offered to the ledger.
    pub candidates_offered: u64,
    /// Complete schedules that failed the final re-check.
    pub invariant_failures: u64,
    /// Selections dropped before search for using slots off the grid.
    pub invalid_selections: u64,
    /// Annealing moves accepted.
    pub accepted_moves: u64,
    /// Annealing moves that improved fitness.
    pub improving_moves: u64,
    /// Wall-clock time (ms).
    pub elapsed_ms: u64,
    /// The deadline expired before the search finished.
    pub timed_out: bool,
    /// The caller cancelled the search.
    pub cancelled: bool,
}

impl SearchStats {
    /// Creates zeroed stats for a strategy.
    pub fn new(strategy: SearchStrategy) -> Self {
        Self {
            strategy,
            ..Default::default()
        }
    }

    /// Whether the search stopped early.
    pub fn stopped_early(&self) -> bool {
        self.timed_out || self.cancelled
    }
}

/// Output of [`run_search`].
#[derive(Debug, Clone)]
pub struct SearchRun {
    /// Ledger contents, best first.
    pub schedules: Vec<RankedSchedule>,
    /// Run diagnostics.
    pub stats: SearchStats,
}

/// Why a search stopped before exhausting its space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StopReason {
    Timeout,
    Cancelled,
}

/// Wall-clock deadline plus an optional external cancel flag.
#[derive(Debug, Clone)]
pub(crate) struct Deadline {
    started: Instant,
    limit: Option<Duration>,
    cancel: Option<Arc<AtomicBool>>,
}

impl Deadline {
    pub(crate) fn new(timeout_ms: Option<u64>, cancel: Option<Arc<AtomicBool>>) -> Self {
        Self {
            started: Instant::now(),
            limit: timeout_ms.map(Duration::from_millis),
            cancel,
        }
    }

    pub(crate) fn check(&self) -> Option<StopReason> {
        if let Some(ref flag) = self.cancel {
            if flag.load(Ordering::Relaxed) {
                return Some(StopReason::Cancelled);
            }
        }
        match self.limit {
            Some(limit) if self.started.elapsed() >= limit => Some(StopReason::Timeout),
            _ => None,
        }
    }

    pub(crate) fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

/// Scores an admissible schedule and offers it to the ledger.
///
/// Re-checks the schedule from scratch first; a failure there means the
/// incremental bookkeeping let something through, so the candidate is
/// dropped and counted instead of being recorded.
pub(crate) fn record_candidate(
    schedule: Schedule,
    config: &SchedulerConfig,
    constraints: &ConstraintMap,
    ledger: &mut ResultLedger,
    stats: &mut SearchStats,
) -> OfferOutcome {
    if let Err(violations) = check_schedule(&schedule, config, constraints) {
        stats.invariant_failures += 1;
        for v in &violations {
            log::error!("discarding candidate that escaped pruning: {}", v.message);
        }
        return OfferOutcome::Rejected;
    }
    let score = ScoreBreakdown::calculate(&schedule, config);
    let rank = RankKey::for_schedule(&schedule, &score, config);
    stats.candidates_offered += 1;
    ledger.offer(RankedSchedule::new(schedule, score, rank))
}

/// Drops selections that use a slot outside the weekly grid.
///
/// Option lists built by [`build_group_options`] never contain any; hand
/// built ones may.
fn drop_off_grid_selections<'a>(
    groups: &'a [GroupOptions],
    stats: &mut SearchStats,
) -> Cow<'a, [GroupOptions]> {
    let on_grid = |s: &Selection| s.slots().all(|slot| slot.is_valid());
    if groups.iter().all(|g| g.selections.iter().all(on_grid)) {
        return Cow::Borrowed(groups);
    }
    let cleaned = groups
        .iter()
        .map(|g| {
            let mut g = g.clone();
            g.selections.retain(|s| {
                let keep = on_grid(s);
                if !keep {
                    warn!(
                        "dropping selection of {} (lecture {}): slot off the weekly grid",
                        g.group_id, s.lecture.id
                    );
                    stats.invalid_selections += 1;
                }
                keep
            });
            g
        })
        .collect();
    Cow::Owned(cleaned)
}

fn apply_stop(stats: &mut SearchStats, reason: Option<StopReason>) {
    match reason {
        Some(StopReason::Timeout) => stats.timed_out = true,
        Some(StopReason::Cancelled) => stats.cancelled = true,
        None => {}
    }
}

/// Runs the configured strategy over prepared option lists.
///
/// Selections using slots off the weekly grid are dropped and counted in
/// [`SearchStats::invalid_selections`]. On timeout or cancellation the
/// schedules found so far are returned with the corresponding flag set.
///
/// # Errors
/// Only for an invalid configuration.
pub fn run_search(
    groups: &[GroupOptions],
    config: &SchedulerConfig,
    cancel: Option<Arc<AtomicBool>>,
) -> Result<SearchRun, String> {
    config.validate()?;
    let deadline = Deadline::new(config.timeout_ms, cancel);
    let mut stats = SearchStats::new(config.strategy);
    let mut ledger = ResultLedger::new(config.max_results);

    if config.max_results == 0 {
        debug!("result cap is 0, skipping search");
        return Ok(SearchRun {
            schedules: Vec::new(),
            stats,
        });
    }

    let groups = drop_off_grid_selections(groups, &mut stats);
    let constraints: ConstraintMap = groups
        .iter()
        .map(|g| (g.group_id.clone(), g.constraint))
        .collect();
    let ordered = order_groups(&groups);
    info!(
        "searching {} course groups ({} mandatory) with {:?}",
        ordered.len(),
        ordered.iter().filter(|g| g.mandatory).count(),
        config.strategy
    );

    let stop = match config.strategy {
        SearchStrategy::Exhaustive => {
            backtrack::search(&ordered, config, &constraints, &deadline, &mut ledger, &mut stats)
        }
        SearchStrategy::Annealing => {
            annealing::search(&ordered, config, &constraints, &deadline, &mut ledger, &mut stats)
        }
    };
    apply_stop(&mut stats, stop);
    stats.elapsed_ms = deadline.elapsed_ms();

    info!(
        "search finished: {} kept, {} offered, {} nodes, {} pruned, {} ms{}",
        ledger.len(),
        stats.candidates_offered,
        stats.nodes_explored,
        stats.branches_pruned,
        stats.elapsed_ms,
        if stats.stopped_early() { " (stopped early)" } else { "" }
    );

    Ok(SearchRun {
        schedules: ledger.into_ranked(),
        stats,
    })
}
