//! Default input-shape rules for beat candidates.

use crate::model::beat::BeatCandidate;
use crate::validation::{BeatValidator, ValidationReport};
use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum title length in characters.
pub const TITLE_MAX_CHARS: usize = 100;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));
static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").expect("valid username regex"));

/// Stateless default rule set.
#[derive(Debug, Clone, Copy, Default)]
pub struct BeatRules;

impl BeatValidator for BeatRules {
    fn validate(&self, candidate: &BeatCandidate) -> ValidationReport {
        let mut report = ValidationReport::default();

        let title = candidate.title.trim();
        if title.is_empty() {
            report.push("title must not be blank");
        } else if title.chars().count() > TITLE_MAX_CHARS {
            report.push(format!(
                "title must be at most {TITLE_MAX_CHARS} characters"
            ));
        }

        match candidate.beat_string.as_deref() {
            None => report.push("beat string is required"),
            Some(value) if value.trim().is_empty() => {
                report.push("beat string must not be blank")
            }
            Some(_) => {}
        }

        let owner = candidate.user_email.trim();
        if owner.is_empty() {
            report.push("user email or username must not be blank");
        } else if owner.contains('@') {
            if !EMAIL_RE.is_match(owner) {
                report.push(format!("`{owner}` is not a valid email address"));
            }
        } else if !USERNAME_RE.is_match(owner) {
            report.push("username may only contain letters, digits, `_`, `.` and `-`");
        }

        report
    }
}
