//! Simulated-annealing search over group assignments.
//!
//! # Algorithm
//!
//! A state assigns each ordered group either one of its selections or,
//! for optional groups, nothing. Starting from a random state:
//!
//! 1. Pick a random movable group and propose one move: add a selection
//!    to a skipped group, drop an optional group, or swap a selection.
//! 2. Score the neighbor: rank fitness minus a penalty proportional to
//!    how far it overshoots the hard limits.
//! 3. Accept with the Metropolis criterion `exp(Δ / T)`.
//! 4. Cool geometrically: `T ← α·T`.
//!
//! Every distinct feasible non-empty state visited is offered to the
//! ledger, so the result is the best N seen along the walk, not just the
//! final state.
//!
//! Stops on the iteration budget, when `T` drops below the minimum, or
//! on the deadline.
//!
//! # Reference
//! Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

use super::feasibility::hard_excess;
use super::{
    record_candidate, ConstraintMap, Deadline, GroupOptions, ResultLedger, SearchStats, StopReason,
};
use crate::config::SchedulerConfig;
use crate::models::Schedule;
use crate::scheduler::{RankKey, ScoreBreakdown};

/// Fitness lost per unit of hard-limit overshoot.
const HARD_PENALTY: f64 = 1000.0;

type Assignment = Vec<Option<usize>>;

/// Runs the annealing walk; returns why it stopped early, if it did.
pub(crate) fn search(
    groups: &[&GroupOptions],
    config: &SchedulerConfig,
    constraints: &ConstraintMap,
    deadline: &Deadline,
    ledger: &mut ResultLedger,
    stats: &mut SearchStats,
) -> Option<StopReason> {
    if groups.iter().any(|g| g.mandatory && g.selections.is_empty()) {
        debug!("a mandatory group has no selections, nothing to anneal");
        return None;
    }
    if groups.is_empty() {
        return None;
    }

    let params = &config.annealing;
    let seed = params.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);
    debug!("annealing with seed {seed}");

    let movable: Vec<usize> = groups
        .iter()
        .enumerate()
        .filter(|(_, g)| !g.mandatory || g.selections.len() > 1)
        .map(|(i, _)| i)
        .collect();

    let mut walk = Walk {
        groups,
        config,
        constraints,
        ledger,
        stats,
        seen: HashSet::new(),
    };
    let mut current = initial_assignment(groups, params.skip_probability, &mut rng);
    let mut current_fitness = walk.visit(&current);

    if movable.is_empty() {
        return deadline.check();
    }

    let mut temperature = params.initial_temperature;
    let mut iteration = 0usize;
    while iteration < params.max_iterations && temperature >= params.min_temperature {
        if let Some(reason) = deadline.check() {
            return Some(reason);
        }
        walk.stats.nodes_explored += 1;

        let group_index = movable[rng.random_range(0..movable.len())];
        let neighbor = propose(&current, group_index, groups[group_index], &mut rng);
        let neighbor_fitness = walk.visit(&neighbor);

        let delta = neighbor_fitness - current_fitness;
        let accept = if delta > 0.0 {
            walk.stats.improving_moves += 1;
            true
        } else {
            rng.random_range(0.0..1.0) < (delta / temperature).exp()
        };
        if accept {
            current = neighbor;
            current_fitness = neighbor_fitness;
            walk.stats.accepted_moves += 1;
        }

        temperature *= params.cooling_rate;
        iteration += 1;
    }

    debug!(
        "annealing stopped after {iteration} iterations at T={temperature:.4}, {} states visited",
        walk.seen.len()
    );
    None
}

fn initial_assignment(groups: &[&GroupOptions], skip_probability: f64, rng: &mut StdRng) -> Assignment {
    groups
        .iter()
        .map(|g| {
            if g.selections.is_empty() || (!g.mandatory && rng.random_bool(skip_probability)) {
                None
            } else {
                Some(rng.random_range(0..g.selections.len()))
            }
        })
        .collect()
}

/// One random move on `group_index`. The group must be movable.
fn propose(current: &Assignment, group_index: usize, group: &GroupOptions, rng: &mut StdRng) -> Assignment {
    let mut next = current.clone();
    let n = group.selections.len();
    next[group_index] = match current[group_index] {
        None => Some(rng.random_range(0..n)),
        Some(_) if n == 1 => None,
        Some(k) => {
            // drop the group, or move to a different selection
            if !group.mandatory && rng.random_bool(1.0 / n as f64) {
                None
            } else {
                let other = rng.random_range(0..n - 1);
                Some(if other >= k { other + 1 } else { other })
            }
        }
    };
    next
}

/// Per-run state shared by every visited assignment.
struct Walk<'a, 'g> {
    groups: &'a [&'g GroupOptions],
    config: &'a SchedulerConfig,
    constraints: &'a ConstraintMap,
    ledger: &'a mut ResultLedger,
    stats: &'a mut SearchStats,
    seen: HashSet<Assignment>,
}

impl Walk<'_, '_> {
    /// Builds and scores a state, recording it when feasible, new, and
    /// good enough for the ledger.
    ///
    /// A state the ledger turns down now is never offered again: the
    /// ledger's worst entry only improves.
    fn visit(&mut self, assignment: &Assignment) -> f64 {
        let schedule = Schedule::from_selections(
            assignment
                .iter()
                .zip(self.groups)
                .filter_map(|(choice, g)| choice.map(|k| &g.selections[k])),
        );
        let excess = hard_excess(&schedule, self.config);
        let breakdown = ScoreBreakdown::calculate(&schedule, self.config);
        let rank = RankKey::for_schedule(&schedule, &breakdown, self.config);
        let fitness = rank.fitness(self.config) - HARD_PENALTY * excess;

        if excess > 0.0 {
            self.stats.branches_pruned += 1;
        } else if !schedule.is_empty()
            && self.seen.insert(assignment.clone())
            && self.ledger.would_accept(&rank)
        {
            record_candidate(
                schedule,
                self.config,
                self.constraints,
                self.ledger,
                self.stats,
            );
        }
        fitness
    }
}
