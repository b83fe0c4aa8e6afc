//! Section (course offering) model.
//!
//! A section is one schedulable offering of a course: a lecture, a
//! problem session, or a lab. Sections that share a `group_id` belong to
//! the same course and are combined into selections by the enumerator.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::{Day, TimeSlot};

/// Role a section plays within its course group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SectionRole {
    /// Main lecture. Every selection contains exactly one.
    Lecture,
    /// Problem / recitation session.
    ProblemSession,
    /// Laboratory session.
    Lab,
}

impl fmt::Display for SectionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SectionRole::Lecture => "Lecture",
            SectionRole::ProblemSession => "ProblemSession",
            SectionRole::Lab => "Lab",
        };
        f.write_str(name)
    }
}

/// One schedulable course offering.
///
/// Sections are immutable once handed to the engine. The `attributes`
/// map carries descriptive metadata (faculty, department, campus) that the
/// engine never interprets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Unique section identifier.
    pub id: String,
    /// Course-group identifier shared by sibling sections.
    pub group_id: String,
    /// Credit weight (ECTS). Negative values are rejected by validation.
    pub credits: i32,
    /// Role within the course group.
    pub role: SectionRole,
    /// Occupied (day, period) cells.
    pub slots: Vec<TimeSlot>,
    /// Instructor name.
    pub instructor: String,
    /// Opaque descriptive metadata.
    pub attributes: HashMap<String, String>,
}

impl Section {
    /// Creates a section with no slots and zero credits.
    pub fn new(id: impl Into<String>, group_id: impl Into<String>, role: SectionRole) -> Self {
        Self {
            id: id.into(),
            group_id: group_id.into(),
            credits: 0,
            role,
            slots: Vec::new(),
            instructor: String::new(),
            attributes: HashMap::new(),
        }
    }

    /// Creates a lecture section.
    pub fn lecture(id: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self::new(id, group_id, SectionRole::Lecture)
    }

    /// Creates a problem-session section.
    pub fn problem_session(id: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self::new(id, group_id, SectionRole::ProblemSession)
    }

    /// Creates a lab section.
    pub fn lab(id: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self::new(id, group_id, SectionRole::Lab)
    }

    /// Sets the credit weight.
    pub fn with_credits(mut self, credits: i32) -> Self {
        self.credits = credits;
        self
    }

    /// Adds an occupied slot.
    pub fn with_slot(mut self, day: Day, period: u8) -> Self {
        self.slots.push(TimeSlot::new(day, period));
        self
    }

    /// Adds a contiguous block of periods on one day (inclusive range).
    pub fn with_block(mut self, day: Day, first: u8, last: u8) -> Self {
        for period in first..=last {
            self.slots.push(TimeSlot::new(day, period));
        }
        self
    }

    /// Sets the instructor.
    pub fn with_instructor(mut self, instructor: impl Into<String>) -> Self {
        self.instructor = instructor.into();
        self
    }

    /// Adds a descriptive attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Whether this section occupies the given slot.
    pub fn occupies(&self, slot: &TimeSlot) -> bool {
        self.slots.contains(slot)
    }

    /// Whether two sections share at least one slot.
    pub fn overlaps(&self, other: &Section) -> bool {
        self.slots.iter().any(|s| other.occupies(s))
    }

    /// Whether this section and `other` are main-code siblings.
    pub fn is_sibling_of(&self, other: &Section) -> bool {
        self.group_id == other.group_id
    }
}
