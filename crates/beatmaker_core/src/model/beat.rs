//! Beat domain model.
//!
//! # Responsibility
//! - Define the persisted beat record and the caller-supplied candidate.
//!
//! # Invariants
//! - `Beat::owner_id` is always resolved by core, never copied from input.
//! - `Beat::beat_string` is stored and returned byte-for-byte.
//! - `Beat::id` is `None` until storage assigns one.

use crate::model::user::UserId;
use serde::{Deserialize, Serialize};

/// Storage-assigned beat row id.
pub type BeatId = i64;

/// Persisted rhythm pattern owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beat {
    pub id: Option<BeatId>,
    pub owner_id: UserId,
    pub title: String,
    /// Checksum-guarded encoded pattern, e.g. `AB12:6`.
    pub beat_string: String,
}

impl Beat {
    /// Assembles a beat from a candidate and a resolved owner id.
    pub fn from_candidate(candidate: &BeatCandidate, owner_id: UserId) -> Self {
        Self {
            id: candidate.id,
            owner_id,
            title: candidate.title.clone(),
            beat_string: candidate.beat_string.clone().unwrap_or_default(),
        }
    }
}

/// Caller input for create/update/delete use-cases.
///
/// Carries the owner's email or username instead of an owner id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeatCandidate {
    /// Required by update/delete; ignored by create.
    #[serde(default)]
    pub id: Option<BeatId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub beat_string: Option<String>,
    /// Email or username of the declared owner.
    #[serde(default)]
    pub user_email: String,
}

impl BeatCandidate {
    pub fn new(
        title: impl Into<String>,
        beat_string: impl Into<String>,
        user_email: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            beat_string: Some(beat_string.into()),
            user_email: user_email.into(),
        }
    }

    /// Returns the same candidate targeting an existing beat id.
    pub fn with_id(mut self, id: BeatId) -> Self {
        self.id = Some(id);
        self
    }
}
