//! Catalog indexing: flat sections → course groups.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{CourseGroup, Section};
use crate::validation::{sanitize_sections, ValidationError};

/// Sections grouped by course, plus the sections that were dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogIndex {
    /// Course groups keyed by group ID.
    pub groups: BTreeMap<String, CourseGroup>,
    /// Validation errors of dropped sections.
    pub rejected: Vec<ValidationError>,
}

impl CatalogIndex {
    /// Looks up a group.
    pub fn group(&self, group_id: &str) -> Option<&CourseGroup> {
        self.groups.get(group_id)
    }

    /// Number of groups.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Groups that have no lecture and can never be scheduled.
    pub fn unschedulable(&self) -> impl Iterator<Item = &CourseGroup> {
        self.groups.values().filter(|g| !g.is_schedulable())
    }
}

/// Groups sections by course-group ID in one pass.
///
/// Invalid sections are dropped and reported in
/// [`CatalogIndex::rejected`]; they never abort indexing. Within a group,
/// sections keep their input order.
pub fn index_sections(sections: &[Section]) -> CatalogIndex {
    let (accepted, rejected) = sanitize_sections(sections);
    for err in &rejected {
        warn!("dropping section: {}", err.message);
    }

    let accepted_count = accepted.len();
    let mut groups: BTreeMap<String, CourseGroup> = BTreeMap::new();
    for section in accepted {
        groups
            .entry(section.group_id.clone())
            .or_insert_with(|| CourseGroup::new(section.group_id.clone()))
            .push(section);
    }

    debug!(
        "indexed {} sections into {} course groups ({} dropped)",
        accepted_count,
        groups.len(),
        sections.len() - accepted_count
    );

    CatalogIndex { groups, rejected }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Day, SectionRole};
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_groups_by_course() {
        let sections = vec![
            Section::lecture("M-L1", "MATH").with_slot(Day::Monday, 1),
            Section::problem_session("M-P1", "MATH").with_slot(Day::Tuesday, 1),
            Section::lecture("P-L1", "PHYS").with_slot(Day::Monday, 3),
            Section::lecture("M-L2", "MATH").with_slot(Day::Thursday, 1),
        ];
        let index = index_sections(&sections);

        assert_eq!(index.group_count(), 2);
        let math = index.group("MATH").unwrap();
        assert_eq!(math.lectures.len(), 2);
        assert_eq!(math.lectures[0].id, "M-L1");
        assert_eq!(math.lectures[1].id, "M-L2");
        assert_eq!(math.sections_for(SectionRole::ProblemSession).len(), 1);
        assert!(index.rejected.is_empty());
    }

    #[test]
    fn test_invalid_sections_reported_not_fatal() {
        let sections = vec![
            Section::lecture("", "MATH"),
            Section::lecture("P-L1", "PHYS").with_credits(-3),
            Section::lecture("C-L1", "CHEM"),
        ];
        let index = index_sections(&sections);

        assert_eq!(index.group_count(), 1);
        assert!(index.group("CHEM").is_some());
        assert_eq!(index.rejected.len(), 2);
        assert!(index
            .rejected
            .iter()
            .any(|e| e.kind == ValidationErrorKind::MissingId));
    }

    #[test]
    fn test_unschedulable_groups_listed() {
        let sections = vec![
            Section::lab("X-B1", "X"),
            Section::lecture("Y-L1", "Y"),
        ];
        let index = index_sections(&sections);
        let ids: Vec<&str> = index.unschedulable().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["X"]);
    }

    #[test]
    fn test_groups_iterate_in_id_order() {
        let sections = vec![
            Section::lecture("3", "ZOO"),
            Section::lecture("1", "ART"),
            Section::lecture("2", "BIO"),
        ];
        let index = index_sections(&sections);
        let ids: Vec<&String> = index.groups.keys().collect();
        assert_eq!(ids, vec!["ART", "BIO", "ZOO"]);
    }
}
