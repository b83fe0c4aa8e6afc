//! Exhaustive backtracking search.
//!
//! # Algorithm
//!
//! Depth-first over the ordered groups. At each node:
//! 1. Try every selection: apply it to the running [`Occupancy`], prune
//!    if a hard limit breaks, otherwise recurse; undo on return.
//! 2. Then try skipping the group, unless it is mandatory.
//! 3. At full depth, rebuild the schedule, re-check it from scratch and
//!    offer it to the ledger.
//!
//! The deadline is polled at every node; on expiry the recursion
//! unwinds without visiting further branches.
//!
//! # Complexity
//! O(∏ option counts) in the worst case; credit and conflict pruning cut
//! most of it on realistic catalogs. Recursion depth equals the number of
//! groups.

use log::trace;

use super::occupancy::Occupancy;
use super::{
    record_candidate, ConstraintMap, Deadline, GroupOptions, ResultLedger, SearchStats, StopReason,
};
use crate::config::SchedulerConfig;
use crate::models::{Schedule, Selection};

struct Backtracker<'a> {
    groups: &'a [&'a GroupOptions],
    config: &'a SchedulerConfig,
    constraints: &'a ConstraintMap,
    deadline: &'a Deadline,
    ledger: &'a mut ResultLedger,
    stats: &'a mut SearchStats,
    occupancy: Occupancy,
    chosen: Vec<&'a Selection>,
    stop: Option<StopReason>,
}

/// Runs the exhaustive search; returns why it stopped early, if it did.
pub(crate) fn search(
    groups: &[&GroupOptions],
    config: &SchedulerConfig,
    constraints: &ConstraintMap,
    deadline: &Deadline,
    ledger: &mut ResultLedger,
    stats: &mut SearchStats,
) -> Option<StopReason> {
    let mut bt = Backtracker {
        groups,
        config,
        constraints,
        deadline,
        ledger,
        stats,
        occupancy: Occupancy::new(),
        chosen: Vec::with_capacity(groups.len()),
        stop: None,
    };
    bt.descend(0);
    bt.stop
}

impl<'a> Backtracker<'a> {
    fn descend(&mut self, depth: usize) {
        if self.stop.is_some() {
            return;
        }
        self.stats.nodes_explored += 1;
        if let Some(reason) = self.deadline.check() {
            self.stop = Some(reason);
            return;
        }

        if depth == self.groups.len() {
            self.record();
            return;
        }

        let group: &'a GroupOptions = self.groups[depth];
        for selection in &group.selections {
            self.occupancy.add_selection(selection);
            match self.occupancy.violation(self.config) {
                Some(reason) => {
                    trace!("pruned {} at depth {depth}: {reason:?}", group.group_id);
                    self.stats.branches_pruned += 1;
                }
                None => {
                    self.chosen.push(selection);
                    self.descend(depth + 1);
                    self.chosen.pop();
                }
            }
            self.occupancy.remove_selection(selection);
            if self.stop.is_some() {
                return;
            }
        }

        if group.allows_skip() {
            self.descend(depth + 1);
        } else {
            self.stats.branches_pruned += 1;
        }
    }

    fn record(&mut self) {
        if self.chosen.is_empty() {
            return;
        }
        let schedule = Schedule::from_selections(self.chosen.iter().copied());
        record_candidate(schedule, self.config, self.constraints, self.ledger, self.stats);
    }
}
