//! Schedule preference scoring.
//!
//! Computes a desirability score from five independent terms, each
//! normalized to 0..100 before weighting.
//!
//! # Terms
//!
//! | Term | Definition |
//! |------|-----------|
//! | Free days | Share of desired free days that stay free |
//! | Compression | (7 − days used) / 7, only when enabled |
//! | Gaps | (slots − breaks) / slots |
//! | Consecutive | Slots inside runs of two or more / slots |
//! | Conflict penalty | conflicts / tolerated conflicts (subtracted) |
//!
//! Both the gap and the consecutive terms divide by the total number of
//! occupied slots; see DESIGN.md for why this normalization is kept.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::config::SchedulerConfig;
use crate::models::{Schedule, DAYS_PER_WEEK};

/// Per-term preference scores of one schedule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Free-day satisfaction (0..100).
    pub free_days: f64,
    /// Day compression (0..100).
    pub compression: f64,
    /// Gap minimization (0..100).
    pub gaps: f64,
    /// Consecutive-block share (0..100).
    pub consecutive: f64,
    /// Conflict penalty (0..100, subtracted).
    pub conflict_penalty: f64,
    /// Weighted total; higher is better.
    pub total: f64,
}

impl ScoreBreakdown {
    /// Scores a schedule.
    ///
    /// Uses the configured weights, or the baseline weights when none are
    /// set (ranking then ignores `total`, see [`RankKey`]).
    pub fn calculate(schedule: &Schedule, config: &SchedulerConfig) -> Self {
        let stats = schedule.stats();
        let weights = config.weights.unwrap_or_default();

        let free_days = if config.desired_free_days.is_empty() {
            0.0
        } else {
            let satisfied = config
                .desired_free_days
                .iter()
                .filter(|&&day| schedule.is_free(day, config.strict_free_days))
                .count();
            100.0 * satisfied as f64 / config.desired_free_days.len() as f64
        };

        let compression = if config.compress_days {
            100.0 * (DAYS_PER_WEEK - stats.days_used()) as f64 / DAYS_PER_WEEK as f64
        } else {
            0.0
        };

        let total_slots = stats.occupied_slots();
        let mut breaks = 0usize;
        let mut in_runs = 0usize;
        for periods in &stats.periods_by_day {
            let (b, r) = day_shape(periods);
            breaks += b;
            in_runs += r;
        }

        let (gaps, consecutive) = if total_slots == 0 {
            (0.0, 0.0)
        } else {
            (
                100.0 * (total_slots - breaks) as f64 / total_slots as f64,
                100.0 * in_runs as f64 / total_slots as f64,
            )
        };

        let conflict_penalty = if config.max_conflicts > 0 {
            100.0 * stats.conflict_count as f64 / config.max_conflicts as f64
        } else {
            0.0
        };

        let total = weights.free_days * free_days
            + weights.compression * compression
            + weights.gaps * gaps
            + weights.consecutive * consecutive
            - weights.conflict_penalty * conflict_penalty;

        Self {
            free_days,
            compression,
            gaps,
            consecutive,
            conflict_penalty,
            total,
        }
    }
}

/// Weighted preference score of a schedule. Higher is better.
pub fn score(schedule: &Schedule, config: &SchedulerConfig) -> f64 {
    ScoreBreakdown::calculate(schedule, config).total
}

/// Breaks between consecutive occupied periods, and slots sitting in
/// runs of length two or more, for one day's sorted periods.
fn day_shape(periods: &[u8]) -> (usize, usize) {
    if periods.is_empty() {
        return (0, 0);
    }
    let mut breaks = 0;
    let mut in_runs = 0;
    let mut run = 1;
    for w in periods.windows(2) {
        if w[1] == w[0] + 1 {
            run += 1;
        } else {
            breaks += 1;
            if run >= 2 {
                in_runs += run;
            }
            run = 1;
        }
    }
    if run >= 2 {
        in_runs += run;
    }
    (breaks, in_runs)
}

/// Ordering key used by the result ledger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RankKey {
    /// Weighted preference score; higher is better.
    Weighted(f64),
    /// Fewer conflicts first, then more credits.
    Lexicographic { conflicts: usize, credits: i32 },
}

impl RankKey {
    /// Ranks a scored schedule according to the config.
    pub fn for_schedule(
        schedule: &Schedule,
        breakdown: &ScoreBreakdown,
        config: &SchedulerConfig,
    ) -> Self {
        if config.weights.is_some() {
            RankKey::Weighted(breakdown.total)
        } else {
            RankKey::Lexicographic {
                conflicts: schedule.conflict_count(),
                credits: schedule.total_credits(),
            }
        }
    }

    /// `Greater` when `self` ranks better than `other`.
    ///
    /// Keys of different kinds never meet in one run and compare equal.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (RankKey::Weighted(a), RankKey::Weighted(b)) => a.total_cmp(b),
            (
                RankKey::Lexicographic {
                    conflicts: ca,
                    credits: xa,
                },
                RankKey::Lexicographic {
                    conflicts: cb,
                    credits: xb,
                },
            ) => cb.cmp(ca).then(xa.cmp(xb)),
            _ => Ordering::Equal,
        }
    }

    /// Whether `self` ranks strictly better than `other`.
    pub fn is_better_than(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Greater
    }

    /// Scalar form for local search. Preserves the lexicographic order for
    /// schedules within the credit ceiling.
    pub fn fitness(&self, config: &SchedulerConfig) -> f64 {
        match *self {
            RankKey::Weighted(s) => s,
            RankKey::Lexicographic { conflicts, credits } => {
                credits as f64 - conflicts as f64 * (config.max_credits.max(0) as f64 + 1.0)
            }
        }
    }
}
