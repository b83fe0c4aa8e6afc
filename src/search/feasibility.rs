//! Whole-schedule hard-constraint check.
//!
//! Recomputes everything from the finished schedule, independent of the
//! incremental bookkeeping used during search.

use std::collections::BTreeMap;

use crate::config::SchedulerConfig;
use crate::models::{Day, GroupConstraint, Schedule, SectionRole, Violation, ViolationType};

/// Checks a complete schedule against every hard constraint.
///
/// `constraints` maps group ids to their companion requirements; a group
/// missing from the map only needs its lecture.
///
/// # Returns
/// `Ok(())` if the schedule is admissible, `Err(violations)` otherwise.
pub fn check_schedule(
    schedule: &Schedule,
    config: &SchedulerConfig,
    constraints: &BTreeMap<String, GroupConstraint>,
) -> Result<(), Vec<Violation>> {
    let mut violations = Vec::new();
    let stats = schedule.stats();

    if stats.total_credits > config.max_credits {
        violations.push(Violation::new(
            ViolationType::CreditCeilingExceeded,
            "",
            format!(
                "{} credits exceed the ceiling of {}",
                stats.total_credits, config.max_credits
            ),
        ));
    }

    if stats.conflict_count > config.max_conflicts {
        violations.push(Violation::new(
            ViolationType::ConflictBoundExceeded,
            "",
            format!(
                "{} conflicting slots exceed the bound of {}",
                stats.conflict_count, config.max_conflicts
            ),
        ));
    }

    for group_id in &config.mandatory_groups {
        if !schedule.contains_group(group_id) {
            violations.push(Violation::new(
                ViolationType::MandatoryGroupMissing,
                group_id,
                format!("mandatory course group {group_id} is missing"),
            ));
        }
    }

    let mut roles: BTreeMap<(&str, SectionRole), usize> = BTreeMap::new();
    for section in &schedule.sections {
        if config.excluded_groups.contains(&section.group_id) {
            violations.push(Violation::new(
                ViolationType::ExcludedGroupPresent,
                &section.group_id,
                format!("excluded course group {} is present", section.group_id),
            ));
        }
        *roles
            .entry((section.group_id.as_str(), section.role))
            .or_insert(0) += 1;
    }
    for ((group_id, role), n) in &roles {
        if *n > 1 {
            violations.push(Violation::new(
                ViolationType::DuplicateRole,
                *group_id,
                format!("course group {group_id} has {n} {role} sections"),
            ));
        }
    }
    for group_id in schedule.group_ids() {
        let constraint = constraints.get(group_id).copied().unwrap_or_default();
        for role in [SectionRole::Lecture, SectionRole::ProblemSession, SectionRole::Lab] {
            if constraint.requires(role) && !roles.contains_key(&(group_id, role)) {
                violations.push(Violation::new(
                    ViolationType::MissingRequiredRole,
                    group_id,
                    format!("course group {group_id} is missing its {role} section"),
                ));
            }
        }
    }

    violations.extend(day_violations(schedule, config));

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Free-day and per-day-limit violations only.
pub(crate) fn day_violations(schedule: &Schedule, config: &SchedulerConfig) -> Vec<Violation> {
    let mut violations = Vec::new();
    if config.require_free_days {
        for &day in &config.desired_free_days {
            if !schedule.is_free(day, config.strict_free_days) {
                violations.push(Violation::new(
                    ViolationType::FreeDayViolated,
                    day.to_string(),
                    format!("{day} carries {} classes", schedule.load_on(day)),
                ));
            }
        }
    }
    if let Some(limit) = config.max_periods_per_day {
        for day in Day::ALL {
            if schedule.load_on(day) > limit {
                violations.push(Violation::new(
                    ViolationType::DailyLimitExceeded,
                    day.to_string(),
                    format!(
                        "{day} holds {} periods, limit is {limit}",
                        schedule.load_on(day)
                    ),
                ));
            }
        }
    }
    violations
}

/// Total amount by which a schedule overshoots the hard bounds.
///
/// Zero iff the credit, conflict and day limits hold. Used by local
/// search to steer infeasible states back.
pub(crate) fn hard_excess(schedule: &Schedule, config: &SchedulerConfig) -> f64 {
    let stats = schedule.stats();
    let credit_excess = (stats.total_credits - config.max_credits).max(0) as f64;
    let conflict_excess = stats.conflict_count.saturating_sub(config.max_conflicts) as f64;

    let mut day_excess = 0usize;
    if config.require_free_days {
        let allowance = config.free_day_allowance();
        day_excess += config
            .desired_free_days
            .iter()
            .map(|d| schedule.load_on(*d).saturating_sub(allowance))
            .sum::<usize>();
    }
    if let Some(limit) = config.max_periods_per_day {
        day_excess += Day::ALL
            .iter()
            .map(|d| schedule.load_on(*d).saturating_sub(limit))
            .sum::<usize>();
    }

    credit_excess + conflict_excess + day_excess as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Section;

    fn no_companions() -> BTreeMap<String, GroupConstraint> {
        BTreeMap::new()
    }

    fn schedule() -> Schedule {
        Schedule::new(vec![
            Section::lecture("A1", "A")
                .with_credits(6)
                .with_slot(Day::Monday, 1),
            Section::lab("A2", "A")
                .with_credits(1)
                .with_slot(Day::Friday, 2),
            Section::lecture("B1", "B")
                .with_credits(4)
                .with_slot(Day::Monday, 1),
        ])
    }

    #[test]
    fn test_admissible() {
        let config = SchedulerConfig::default().with_max_conflicts(1).with_mandatory("A");
        assert!(check_schedule(&schedule(), &config, &no_companions()).is_ok());
        assert_eq!(hard_excess(&schedule(), &config), 0.0);
    }

    #[test]
    fn test_credit_and_conflict_violations() {
        let config = SchedulerConfig::default().with_max_credits(10);
        let v = check_schedule(&schedule(), &config, &no_companions()).unwrap_err();
        assert!(v
            .iter()
            .any(|x| x.violation_type == ViolationType::CreditCeilingExceeded));
        assert!(v
            .iter()
            .any(|x| x.violation_type == ViolationType::ConflictBoundExceeded));
        assert_eq!(hard_excess(&schedule(), &config), 2.0);
    }

    #[test]
    fn test_missing_mandatory_and_excluded() {
        let config = SchedulerConfig::default()
            .with_max_conflicts(1)
            .with_mandatory("C")
            .with_excluded("B");
        let v = check_schedule(&schedule(), &config, &no_companions()).unwrap_err();
        assert!(v
            .iter()
            .any(|x| x.violation_type == ViolationType::MandatoryGroupMissing && x.entity_id == "C"));
        assert!(v
            .iter()
            .any(|x| x.violation_type == ViolationType::ExcludedGroupPresent));
    }

    #[test]
    fn test_duplicate_role() {
        let s = Schedule::new(vec![
            Section::lecture("A1", "A").with_slot(Day::Monday, 1),
            Section::lecture("A2", "A").with_slot(Day::Tuesday, 1),
        ]);
        let v = check_schedule(&s, &SchedulerConfig::default(), &no_companions()).unwrap_err();
        assert_eq!(v[0].violation_type, ViolationType::DuplicateRole);
    }

    #[test]
    fn test_day_limits() {
        let config = SchedulerConfig::default()
            .with_max_conflicts(1)
            .with_desired_free_day(Day::Friday)
            .with_required_free_days(true)
            .with_max_periods_per_day(0);
        let v = day_violations(&schedule(), &config);
        assert!(v
            .iter()
            .any(|x| x.violation_type == ViolationType::FreeDayViolated));
        assert!(v
            .iter()
            .any(|x| x.violation_type == ViolationType::DailyLimitExceeded));
        // Friday: 1 over the free-day allowance; Monday 1 + Friday 1 over the limit
        assert_eq!(hard_excess(&schedule(), &config), 3.0);

        let relaxed = config.with_strict_free_days(false).with_max_periods_per_day(2);
        assert!(day_violations(&schedule(), &relaxed).is_empty());
    }

    #[test]
    fn test_missing_required_companion() {
        let lecture_only = Schedule::new(vec![Section::lecture("A1", "A")
            .with_credits(3)
            .with_slot(Day::Monday, 1)]);
        let mut constraints = BTreeMap::new();
        constraints.insert(
            "A".to_string(),
            GroupConstraint {
                requires_problem_session: false,
                requires_lab: true,
            },
        );
        let config = SchedulerConfig::default().with_mandatory("A");

        let v = check_schedule(&lecture_only, &config, &constraints).unwrap_err();
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].violation_type, ViolationType::MissingRequiredRole);
        assert_eq!(v[0].message, "course group A is missing its Lab section");

        assert!(check_schedule(&lecture_only, &config, &no_companions()).is_ok());
    }

    #[test]
    fn test_missing_lecture() {
        let lab_only = Schedule::new(vec![Section::lab("B2", "B").with_slot(Day::Tuesday, 2)]);
        let v = check_schedule(&lab_only, &SchedulerConfig::default(), &no_companions()).unwrap_err();
        assert_eq!(v[0].violation_type, ViolationType::MissingRequiredRole);
        assert_eq!(v[0].entity_id, "B");
    }
}
