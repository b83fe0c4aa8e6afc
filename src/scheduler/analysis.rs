//! Failure analysis.
//!
//! Finds reasons a catalog cannot yield any schedule, by inspecting the
//! mandatory groups alone. Cheap enough to run before every search; a
//! non-empty result means the search would find nothing.
//!
//! # Checks
//!
//! | Kind | Condition |
//! |------|-----------|
//! | `UnknownGroup` | a mandatory group is not in the catalog |
//! | `NoValidCombination` | a mandatory group has no selection within the conflict bound |
//! | `PreferencesTooTight` | every selection of a mandatory group breaks a hard day limit |
//! | `CreditFloorExceeded` | the cheapest mandatory selections exceed the ceiling |
//! | `MandatoryConflict` | every pairing of two mandatory groups exceeds the conflict bound |

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::config::SchedulerConfig;
use crate::models::{Schedule, SectionRole, Selection};
use crate::search::{day_violations, GroupOptions};

/// A structured reason why no schedule exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Infeasibility {
    /// What went wrong.
    pub kind: InfeasibilityKind,
    /// Course groups involved.
    pub group_ids: Vec<String>,
    /// Human-readable description.
    pub message: String,
}

/// Classification of infeasibility reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfeasibilityKind {
    /// A mandatory group is not offered.
    UnknownGroup,
    /// A mandatory group has no usable selection.
    NoValidCombination,
    /// Mandatory groups alone need more credits than the ceiling.
    CreditFloorExceeded,
    /// Two mandatory groups always conflict beyond the bound.
    MandatoryConflict,
    /// Hard free-day or per-day limits rule out a mandatory group.
    PreferencesTooTight,
    /// The search completed without finding anything.
    NoFeasibleSchedule,
}

impl Infeasibility {
    /// Creates a reason.
    pub fn new(kind: InfeasibilityKind, group_ids: Vec<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            group_ids,
            message: message.into(),
        }
    }
}

/// Reports every reason the mandatory groups cannot be scheduled.
///
/// Returns an empty vector when nothing is provably wrong; the search may
/// still come back empty in that case.
pub fn analyze_infeasibility(groups: &[GroupOptions], config: &SchedulerConfig) -> Vec<Infeasibility> {
    let mut reasons = Vec::new();

    let known: BTreeSet<&str> = groups.iter().map(|g| g.group_id.as_str()).collect();
    for id in &config.mandatory_groups {
        if !known.contains(id.as_str()) {
            reasons.push(Infeasibility::new(
                InfeasibilityKind::UnknownGroup,
                vec![id.clone()],
                format!("course group {id} is not offered"),
            ));
        }
    }

    // Selections of each mandatory group that survive on their own.
    let mut usable: Vec<(&GroupOptions, Vec<&Selection>)> = Vec::new();
    for group in groups.iter().filter(|g| g.mandatory) {
        if group.selections.is_empty() {
            reasons.push(Infeasibility::new(
                InfeasibilityKind::NoValidCombination,
                vec![group.group_id.clone()],
                format!(
                    "course group {} has no legal {} combination",
                    group.group_id,
                    role_label(group)
                ),
            ));
            continue;
        }

        let within_bound: Vec<&Selection> = group
            .selections
            .iter()
            .filter(|s| s.internal_conflicts() <= config.max_conflicts)
            .collect();
        if within_bound.is_empty() {
            reasons.push(Infeasibility::new(
                InfeasibilityKind::NoValidCombination,
                vec![group.group_id.clone()],
                format!(
                    "every combination of course group {} conflicts with itself beyond the conflict bound",
                    group.group_id
                ),
            ));
            continue;
        }

        let within_days: Vec<&Selection> = within_bound
            .into_iter()
            .filter(|s| fits_day_limits(s, config))
            .collect();
        if within_days.is_empty() {
            reasons.push(Infeasibility::new(
                InfeasibilityKind::PreferencesTooTight,
                vec![group.group_id.clone()],
                format!(
                    "course group {} cannot meet the required free days or the per-day limit",
                    group.group_id
                ),
            ));
            continue;
        }
        usable.push((group, within_days));
    }

    let floor: i32 = groups
        .iter()
        .filter(|g| g.mandatory)
        .filter_map(GroupOptions::min_credits)
        .sum();
    if floor > config.max_credits {
        let ids: Vec<String> = groups
            .iter()
            .filter(|g| g.mandatory && !g.selections.is_empty())
            .map(|g| g.group_id.clone())
            .collect();
        reasons.push(Infeasibility::new(
            InfeasibilityKind::CreditFloorExceeded,
            ids.clone(),
            format!(
                "mandatory course groups {} need at least {floor} credits but the ceiling is {}",
                ids.join(", "),
                config.max_credits
            ),
        ));
    }

    for (i, (a, a_sel)) in usable.iter().enumerate() {
        for (b, b_sel) in &usable[i + 1..] {
            let compatible = a_sel.iter().any(|sa| {
                b_sel.iter().any(|sb| {
                    Schedule::from_selections([*sa, *sb]).conflict_count() <= config.max_conflicts
                })
            });
            if !compatible {
                reasons.push(Infeasibility::new(
                    InfeasibilityKind::MandatoryConflict,
                    vec![a.group_id.clone(), b.group_id.clone()],
                    format!(
                        "{} and {} conflict and cannot both be included under the conflict bound.",
                        a.group_id, b.group_id
                    ),
                ));
            }
        }
    }

    reasons
}

fn fits_day_limits(selection: &Selection, config: &SchedulerConfig) -> bool {
    if !config.require_free_days && config.max_periods_per_day.is_none() {
        return true;
    }
    let alone = Schedule::from_selections([selection]);
    day_violations(&alone, config).is_empty()
}

fn role_label(group: &GroupOptions) -> String {
    [SectionRole::Lecture, SectionRole::ProblemSession, SectionRole::Lab]
        .into_iter()
        .filter(|r| group.constraint.requires(*r))
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join("+")
}
