//! Course groups, companion constraints, and selections.
//!
//! A course group gathers every section sharing a course identifier,
//! partitioned by role. Its `GroupConstraint` says which companion roles
//! are compulsory, and a `Selection` is one concrete pick of sections
//! honoring that constraint.

use serde::{Deserialize, Serialize};

use super::{Section, SectionRole, TimeSlot};

/// All sections of one course, partitioned by role.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourseGroup {
    /// Course-group identifier.
    pub id: String,
    /// Lecture sections.
    pub lectures: Vec<Section>,
    /// Problem-session sections.
    pub problem_sessions: Vec<Section>,
    /// Lab sections.
    pub labs: Vec<Section>,
}

impl CourseGroup {
    /// Creates an empty group.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Files a section into the bucket matching its role.
    pub fn push(&mut self, section: Section) {
        match section.role {
            SectionRole::Lecture => self.lectures.push(section),
            SectionRole::ProblemSession => self.problem_sessions.push(section),
            SectionRole::Lab => self.labs.push(section),
        }
    }

    /// Adds a section (builder form).
    pub fn with_section(mut self, section: Section) -> Self {
        self.push(section);
        self
    }

    /// Sections of the given role.
    pub fn sections_for(&self, role: SectionRole) -> &[Section] {
        match role {
            SectionRole::Lecture => &self.lectures,
            SectionRole::ProblemSession => &self.problem_sessions,
            SectionRole::Lab => &self.labs,
        }
    }

    /// A group without lectures can never be scheduled.
    pub fn is_schedulable(&self) -> bool {
        !self.lectures.is_empty()
    }

    /// Total number of sections across roles.
    pub fn section_count(&self) -> usize {
        self.lectures.len() + self.problem_sessions.len() + self.labs.len()
    }
}

/// Companion requirements of a course group.
///
/// Derived purely from which role buckets are populated; never configured
/// by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupConstraint {
    /// Every selection must include a problem session.
    pub requires_problem_session: bool,
    /// Every selection must include a lab.
    pub requires_lab: bool,
}

impl GroupConstraint {
    /// Derives the constraint from a group's role buckets.
    pub fn derive(group: &CourseGroup) -> Self {
        Self {
            requires_problem_session: !group.problem_sessions.is_empty(),
            requires_lab: !group.labs.is_empty(),
        }
    }

    /// Whether the given role is compulsory.
    pub fn requires(&self, role: SectionRole) -> bool {
        match role {
            SectionRole::Lecture => true,
            SectionRole::ProblemSession => self.requires_problem_session,
            SectionRole::Lab => self.requires_lab,
        }
    }
}

/// One legal combination of sections for a course group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    /// Course-group identifier.
    pub group_id: String,
    /// The chosen lecture.
    pub lecture: Section,
    /// The chosen problem session, if any.
    pub problem_session: Option<Section>,
    /// The chosen lab, if any.
    pub lab: Option<Section>,
}

impl Selection {
    /// Creates a lecture-only selection.
    pub fn new(lecture: Section) -> Self {
        Self {
            group_id: lecture.group_id.clone(),
            lecture,
            problem_session: None,
            lab: None,
        }
    }

    /// Sets the problem session.
    pub fn with_problem_session(mut self, section: Option<Section>) -> Self {
        self.problem_session = section;
        self
    }

    /// Sets the lab.
    pub fn with_lab(mut self, section: Option<Section>) -> Self {
        self.lab = section;
        self
    }

    /// Chosen sections in lecture, problem session, lab order.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        std::iter::once(&self.lecture)
            .chain(self.problem_session.as_ref())
            .chain(self.lab.as_ref())
    }

    /// Sum of the chosen sections' credits.
    pub fn credits(&self) -> i32 {
        self.sections().map(|s| s.credits).sum()
    }

    /// Every slot occupied by the chosen sections (with repetition).
    pub fn slots(&self) -> impl Iterator<Item = &TimeSlot> {
        self.sections().flat_map(|s| s.slots.iter())
    }

    /// Number of distinct slots occupied by two or more of this
    /// selection's own sections.
    pub fn internal_conflicts(&self) -> usize {
        let mut seen: Vec<TimeSlot> = Vec::new();
        let mut doubled: Vec<TimeSlot> = Vec::new();
        for slot in self.slots() {
            if seen.contains(slot) {
                if !doubled.contains(slot) {
                    doubled.push(*slot);
                }
            } else {
                seen.push(*slot);
            }
        }
        doubled.len()
    }
}
