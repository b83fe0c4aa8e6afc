//! Input validation for course sections.
//!
//! Checks each section before it reaches the catalog. Detects:
//! - Empty section or course-group identifiers
//! - Negative credit weights
//! - Slots outside the weekly grid
//! - Slots listed twice within one section
//! - Section IDs reused across the input
//!
//! Defective sections are dropped one by one; a defect never aborts the
//! whole run.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::{Section, TimeSlot, MAX_PERIOD};

/// Validation result for a single section.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Offending section ID (may be empty when the ID itself is missing).
    pub section_id: String,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    /// Section identifier is empty.
    MissingId,
    /// Course-group identifier is empty.
    MissingGroupId,
    /// Credit weight below zero.
    NegativeCredits,
    /// Period outside `1..=MAX_PERIOD`.
    InvalidSlot,
    /// Same (day, period) listed twice.
    DuplicateSlot,
    /// Two sections share the same ID.
    DuplicateId,
}

impl ValidationError {
    fn new(
        kind: ValidationErrorKind,
        section_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            section_id: section_id.into(),
            message: message.into(),
        }
    }
}

/// Validates one section in isolation.
///
/// Checks:
/// 1. Non-empty section ID
/// 2. Non-empty course-group ID
/// 3. Non-negative credits
/// 4. Every slot inside the weekly grid
/// 5. No slot repeated
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_section(section: &Section) -> ValidationResult {
    let mut errors = Vec::new();

    if section.id.trim().is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::MissingId,
            "",
            format!(
                "Section in group '{}' has an empty identifier",
                section.group_id
            ),
        ));
    }

    if section.group_id.trim().is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::MissingGroupId,
            &section.id,
            format!("Section '{}' has an empty course-group identifier", section.id),
        ));
    }

    if section.credits < 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::NegativeCredits,
            &section.id,
            format!(
                "Section '{}' has negative credits ({})",
                section.id, section.credits
            ),
        ));
    }

    let mut seen: HashSet<TimeSlot> = HashSet::new();
    for slot in &section.slots {
        if !slot.is_valid() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidSlot,
                &section.id,
                format!(
                    "Section '{}' uses period {} outside 1..={MAX_PERIOD}",
                    section.id, slot.period
                ),
            ));
        } else if !seen.insert(*slot) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateSlot,
                &section.id,
                format!("Section '{}' lists slot {slot} twice", section.id),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Splits sections into accepted ones and the errors of those dropped.
///
/// Sections are checked with [`validate_section`]; of several sections
/// sharing an ID, the first valid one wins and later ones are dropped.
pub fn sanitize_sections(sections: &[Section]) -> (Vec<Section>, Vec<ValidationError>) {
    let mut accepted = Vec::with_capacity(sections.len());
    let mut rejected = Vec::new();
    let mut ids: HashSet<&str> = HashSet::new();

    for section in sections {
        if let Err(errors) = validate_section(section) {
            rejected.extend(errors);
            continue;
        }
        if !ids.insert(section.id.as_str()) {
            rejected.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                &section.id,
                format!("Duplicate section ID: {}", section.id),
            ));
            continue;
        }
        accepted.push(section.clone());
    }

    (accepted, rejected)
}
