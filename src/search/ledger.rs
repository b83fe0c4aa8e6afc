//! Bounded best-N result collection.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::models::Schedule;
use crate::scheduler::{RankKey, ScoreBreakdown};

/// A schedule together with its score and rank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedSchedule {
    /// The timetable.
    pub schedule: Schedule,
    /// Per-term preference scores.
    pub score: ScoreBreakdown,
    /// Ordering key.
    pub rank: RankKey,
    /// Discovery order; breaks ties between equal ranks.
    pub sequence: u64,
}

impl RankedSchedule {
    /// Creates an entry; the ledger assigns the sequence number.
    pub fn new(schedule: Schedule, score: ScoreBreakdown, rank: RankKey) -> Self {
        Self {
            schedule,
            score,
            rank,
            sequence: 0,
        }
    }

    /// Best-first ordering: higher rank first, earlier discovery on ties.
    fn best_first(a: &Self, b: &Self) -> Ordering {
        b.rank.compare(&a.rank).then(a.sequence.cmp(&b.sequence))
    }
}

/// What happened to an offered schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferOutcome {
    /// Stored; the ledger had room.
    Inserted,
    /// Stored in place of the previous worst entry.
    Replaced,
    /// Not stored.
    Rejected,
}

/// Keeps the best `capacity` schedules seen so far.
///
/// At capacity, a new schedule displaces the current worst only when it
/// ranks strictly better; equal ranks keep the earlier discovery.
#[derive(Debug, Clone)]
pub struct ResultLedger {
    capacity: usize,
    entries: Vec<RankedSchedule>,
    next_sequence: u64,
}

impl ResultLedger {
    /// Creates an empty ledger.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity.min(64)),
            next_sequence: 0,
        }
    }

    /// Offers a schedule.
    pub fn offer(&mut self, mut entry: RankedSchedule) -> OfferOutcome {
        if self.capacity == 0 {
            return OfferOutcome::Rejected;
        }
        entry.sequence = self.next_sequence;
        self.next_sequence += 1;

        if self.entries.len() < self.capacity {
            self.entries.push(entry);
            return OfferOutcome::Inserted;
        }

        match self.worst_index() {
            Some(i) if entry.rank.is_better_than(&self.entries[i].rank) => {
                self.entries[i] = entry;
                OfferOutcome::Replaced
            }
            _ => OfferOutcome::Rejected,
        }
    }

    /// Whether a schedule of this rank would currently be kept.
    pub fn would_accept(&self, rank: &RankKey) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.entries.len() < self.capacity {
            return true;
        }
        self.worst_index()
            .is_some_and(|i| rank.is_better_than(&self.entries[i].rank))
    }

    fn worst_index(&self) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| RankedSchedule::best_first(a, b))
            .map(|(i, _)| i)
    }

    /// Number of stored schedules.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of stored schedules.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stored schedules, best first.
    pub fn into_ranked(mut self) -> Vec<RankedSchedule> {
        self.entries.sort_by(RankedSchedule::best_first);
        self.entries
    }
}
