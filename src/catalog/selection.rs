//! Selection enumeration.
//!
//! # Algorithm
//!
//! For each lecture, take the cross product of problem-session options
//! and lab options. A required role contributes its bucket; an optional
//! role contributes its bucket plus "none".
//!
//! # Complexity
//! O(|L| × |PS| × |Lab|). Buckets rarely exceed a handful of sections,
//! so this never dominates a run.

use crate::models::{CourseGroup, GroupConstraint, Section, Selection};

/// Lists every legal selection of a group, lecture-major.
///
/// Returns an empty list when the group has no lecture or a required
/// bucket is empty. Callers decide whether that is fatal (mandatory
/// group) or merely removes the group from the search.
pub fn enumerate_selections(group: &CourseGroup, constraint: &GroupConstraint) -> Vec<Selection> {
    let ps_options = role_options(&group.problem_sessions, constraint.requires_problem_session);
    let lab_options = role_options(&group.labs, constraint.requires_lab);

    let mut selections =
        Vec::with_capacity(group.lectures.len() * ps_options.len() * lab_options.len());
    for lecture in &group.lectures {
        for ps in &ps_options {
            for lab in &lab_options {
                selections.push(
                    Selection::new(lecture.clone())
                        .with_problem_session(ps.cloned())
                        .with_lab(lab.cloned()),
                );
            }
        }
    }
    selections
}

/// Number of selections [`enumerate_selections`] yields for a group.
pub fn expected_selection_count(group: &CourseGroup, constraint: &GroupConstraint) -> usize {
    let ps = option_count(group.problem_sessions.len(), constraint.requires_problem_session);
    let lab = option_count(group.labs.len(), constraint.requires_lab);
    group.lectures.len() * ps * lab
}

fn role_options(bucket: &[Section], required: bool) -> Vec<Option<&Section>> {
    let mut options: Vec<Option<&Section>> = bucket.iter().map(Some).collect();
    if !required {
        options.push(None);
    }
    options
}

fn option_count(bucket_len: usize, required: bool) -> usize {
    if required {
        bucket_len
    } else {
        bucket_len + 1
    }
}
