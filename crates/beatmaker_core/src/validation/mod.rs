//! Field-level validation for beat candidates.
//!
//! # Responsibility
//! - Define the validator contract consumed by `BeatService`.
//! - Provide the default input-shape rules.
//!
//! # Invariants
//! - Validators are side-effect free and report every violation, not just
//!   the first one.

pub mod beat_rules;

use crate::model::beat::BeatCandidate;

/// Outcome of validating one candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Human-readable rule violations, in rule order.
    pub violations: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub(crate) fn push(&mut self, violation: impl Into<String>) {
        self.violations.push(violation.into());
    }
}

/// Field-validation collaborator contract.
pub trait BeatValidator {
    fn validate(&self, candidate: &BeatCandidate) -> ValidationReport;
}

impl<V: BeatValidator + ?Sized> BeatValidator for &V {
    fn validate(&self, candidate: &BeatCandidate) -> ValidationReport {
        (**self).validate(candidate)
    }
}
