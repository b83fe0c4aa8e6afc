//! Companion-role derivation.

use std::collections::BTreeMap;

use crate::models::{CourseGroup, GroupConstraint};

/// Derives each group's companion requirements.
///
/// A role is required iff the group offers at least one section of it:
/// a course that runs labs expects every student to take one.
pub fn derive_constraints(
    groups: &BTreeMap<String, CourseGroup>,
) -> BTreeMap<String, GroupConstraint> {
    groups
        .iter()
        .map(|(id, group)| (id.clone(), GroupConstraint::derive(group)))
        .collect()
}
