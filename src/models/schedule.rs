//! Schedule (solution) model.
//!
//! A schedule is the set of sections picked for one student's week: the
//! union of the chosen selections across course groups. Its derived
//! properties (credits, conflicts, per-day load, free days) are computed
//! once on first access and cached.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

use super::{Day, Section, Selection, TimeSlot, DAYS_PER_WEEK};

/// A complete weekly timetable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    /// Chosen sections in group-assignment order.
    pub sections: Vec<Section>,
    #[serde(skip)]
    stats: OnceLock<ScheduleStats>,
}

/// Derived schedule properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleStats {
    /// Sum of section credits.
    pub total_credits: i32,
    /// Distinct slots occupied by two or more sections.
    pub conflict_count: usize,
    /// Distinct occupied slots per day (index = `Day::index`).
    pub day_histogram: [usize; DAYS_PER_WEEK],
    /// Sorted distinct occupied periods per day.
    pub periods_by_day: [Vec<u8>; DAYS_PER_WEEK],
    /// Days with no occupied slot.
    pub free_days: Vec<Day>,
}

impl ScheduleStats {
    /// Computes stats for a set of sections.
    pub fn calculate(sections: &[Section]) -> Self {
        let mut occupancy: BTreeMap<TimeSlot, usize> = BTreeMap::new();
        for slot in sections.iter().flat_map(|s| s.slots.iter()) {
            *occupancy.entry(*slot).or_insert(0) += 1;
        }

        let mut day_histogram = [0usize; DAYS_PER_WEEK];
        let mut periods_by_day: [Vec<u8>; DAYS_PER_WEEK] = Default::default();
        // BTreeMap order keeps each day's periods sorted
        for slot in occupancy.keys() {
            day_histogram[slot.day.index()] += 1;
            periods_by_day[slot.day.index()].push(slot.period);
        }

        let free_days = Day::ALL
            .iter()
            .copied()
            .filter(|d| day_histogram[d.index()] == 0)
            .collect();

        Self {
            total_credits: sections.iter().map(|s| s.credits).sum(),
            conflict_count: occupancy.values().filter(|&&n| n >= 2).count(),
            day_histogram,
            periods_by_day,
            free_days,
        }
    }

    /// Number of days with at least one occupied slot.
    pub fn days_used(&self) -> usize {
        DAYS_PER_WEEK - self.free_days.len()
    }

    /// Total distinct occupied slots.
    pub fn occupied_slots(&self) -> usize {
        self.day_histogram.iter().sum()
    }
}

impl Schedule {
    /// Creates a schedule from sections.
    pub fn new(sections: Vec<Section>) -> Self {
        Self {
            sections,
            stats: OnceLock::new(),
        }
    }

    /// Creates a schedule from the union of selections.
    pub fn from_selections<'a>(selections: impl IntoIterator<Item = &'a Selection>) -> Self {
        let sections = selections
            .into_iter()
            .flat_map(|sel| sel.sections().cloned())
            .collect();
        Self::new(sections)
    }

    /// Derived properties, computed on first call.
    pub fn stats(&self) -> &ScheduleStats {
        self.stats
            .get_or_init(|| ScheduleStats::calculate(&self.sections))
    }

    /// Total credits.
    pub fn total_credits(&self) -> i32 {
        self.stats().total_credits
    }

    /// Number of conflicting slots.
    pub fn conflict_count(&self) -> usize {
        self.stats().conflict_count
    }

    /// Days without classes.
    pub fn free_days(&self) -> &[Day] {
        &self.stats().free_days
    }

    /// Occupied slot count on a day.
    pub fn load_on(&self, day: Day) -> usize {
        self.stats().day_histogram[day.index()]
    }

    /// Whether a day counts as free: no slot in strict mode, at most one
    /// slot otherwise.
    pub fn is_free(&self, day: Day, strict: bool) -> bool {
        let allowance = if strict { 0 } else { 1 };
        self.load_on(day) <= allowance
    }

    /// Distinct course-group ids, in first-appearance order.
    pub fn group_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for s in &self.sections {
            if !ids.contains(&s.group_id.as_str()) {
                ids.push(&s.group_id);
            }
        }
        ids
    }

    /// Whether any section of the group is present.
    pub fn contains_group(&self, group_id: &str) -> bool {
        self.sections.iter().any(|s| s.group_id == group_id)
    }

    /// Sections belonging to a group.
    pub fn sections_for_group(&self, group_id: &str) -> Vec<&Section> {
        self.sections
            .iter()
            .filter(|s| s.group_id == group_id)
            .collect()
    }

    /// Sections meeting on a day.
    pub fn sections_on(&self, day: Day) -> Vec<&Section> {
        self.sections
            .iter()
            .filter(|s| s.slots.iter().any(|slot| slot.day == day))
            .collect()
    }

    /// Number of sections.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Whether no section was chosen.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// A hard-constraint violation found when re-checking a schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related entity (group id, day name, or empty).
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
}

/// Classification of hard-constraint violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// Total credits above the ceiling.
    CreditCeilingExceeded,
    /// More conflicting slots than allowed.
    ConflictBoundExceeded,
    /// A mandatory group has no section in the schedule.
    MandatoryGroupMissing,
    /// A group contributes more than one section of the same role.
    DuplicateRole,
    /// A group is present without its lecture or a required companion.
    MissingRequiredRole,
    /// An excluded group appears in the schedule.
    ExcludedGroupPresent,
    /// A desired free day carries classes while free days are enforced.
    FreeDayViolated,
    /// A day holds more periods than the per-day limit.
    DailyLimitExceeded,
}

impl Violation {
    /// Creates a violation.
    pub fn new(
        violation_type: ViolationType,
        entity_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            violation_type,
            entity_id: entity_id.into(),
            message: message.into(),
        }
    }
}
