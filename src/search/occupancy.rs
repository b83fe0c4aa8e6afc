//! Incremental slot occupancy used while extending a partial schedule.

use crate::config::SchedulerConfig;
use crate::models::{Day, Section, Selection, DAYS_PER_WEEK, MAX_PERIOD};

const PERIOD_CELLS: usize = MAX_PERIOD as usize + 1;

/// Why a partial schedule was cut off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PruneReason {
    CreditCeiling,
    ConflictBound,
    FreeDay(Day),
    DailyLimit(Day),
}

/// Running totals of a partial schedule.
///
/// Adding then removing the same selection restores the previous state
/// exactly, which is what the backtracking search relies on.
#[derive(Debug, Clone)]
pub(crate) struct Occupancy {
    counts: [[u16; PERIOD_CELLS]; DAYS_PER_WEEK],
    day_load: [usize; DAYS_PER_WEEK],
    credits: i32,
    conflicts: usize,
}

impl Occupancy {
    pub(crate) fn new() -> Self {
        Self {
            counts: [[0; PERIOD_CELLS]; DAYS_PER_WEEK],
            day_load: [0; DAYS_PER_WEEK],
            credits: 0,
            conflicts: 0,
        }
    }

    #[cfg(test)]
    pub(crate) fn credits(&self) -> i32 {
        self.credits
    }

    #[cfg(test)]
    pub(crate) fn conflicts(&self) -> usize {
        self.conflicts
    }

    pub(crate) fn add_selection(&mut self, selection: &Selection) {
        for section in selection.sections() {
            self.add_section(section);
        }
    }

    pub(crate) fn remove_selection(&mut self, selection: &Selection) {
        for section in selection.sections() {
            self.remove_section(section);
        }
    }

    fn add_section(&mut self, section: &Section) {
        self.credits += section.credits;
        for slot in &section.slots {
            let d = slot.day.index();
            let cell = &mut self.counts[d][slot.period as usize];
            *cell += 1;
            match *cell {
                1 => self.day_load[d] += 1,
                2 => self.conflicts += 1,
                _ => {}
            }
        }
    }

    fn remove_section(&mut self, section: &Section) {
        self.credits -= section.credits;
        for slot in &section.slots {
            let d = slot.day.index();
            let cell = &mut self.counts[d][slot.period as usize];
            *cell -= 1;
            match *cell {
                0 => self.day_load[d] -= 1,
                1 => self.conflicts -= 1,
                _ => {}
            }
        }
    }

    /// First hard limit the current totals break, if any.
    pub(crate) fn violation(&self, config: &SchedulerConfig) -> Option<PruneReason> {
        if self.credits > config.max_credits {
            return Some(PruneReason::CreditCeiling);
        }
        if self.conflicts > config.max_conflicts {
            return Some(PruneReason::ConflictBound);
        }
        if config.require_free_days {
            let allowance = config.free_day_allowance();
            if let Some(&day) = config
                .desired_free_days
                .iter()
                .find(|d| self.day_load[d.index()] > allowance)
            {
                return Some(PruneReason::FreeDay(day));
            }
        }
        if let Some(limit) = config.max_periods_per_day {
            if let Some(day) = Day::ALL
                .iter()
                .copied()
                .find(|d| self.day_load[d.index()] > limit)
            {
                return Some(PruneReason::DailyLimit(day));
            }
        }
        None
    }
}
