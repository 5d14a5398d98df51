//! Beat orchestration service.
//!
//! # Responsibility
//! - Enforce the write policy: verify encoding, then validate fields, then
//!   resolve ownership, then persist.
//! - Map collaborator outcomes onto a single caller-facing error type.
//!
//! # Invariants
//! - No beat reaches storage with a beat string that fails verification.
//! - `owner_id` is always resolved at write time from the declared owner
//!   email/username, never taken from caller input.
//! - Integrity errors take precedence over validation errors, which take
//!   precedence over owner lookup and storage errors.
//! - Exactly one storage call per operation, and only after every check passed.

use crate::codec::beat_string::{decode_beat_string, BeatStringError};
use crate::model::beat::{Beat, BeatCandidate};
use crate::model::user::UserId;
use crate::repo::beat_repo::{BeatRepository, RepoError};
use crate::repo::user_repo::UserRepository;
use crate::validation::BeatValidator;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors surfaced by beat use-cases.
#[derive(Debug)]
pub enum BeatServiceError {
    /// Beat string is malformed or its checksum does not match.
    Integrity(BeatStringError),
    /// Field rules rejected the candidate.
    Validation(Vec<String>),
    /// Declared owner email/username is not registered.
    OwnerNotFound(String),
    /// User-lookup collaborator failed; forwarded unmodified.
    Lookup(RepoError),
    /// Storage collaborator failed; forwarded unmodified.
    Storage(RepoError),
}

impl Display for BeatServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integrity(err) => write!(f, "corrupted beat data: {err}"),
            Self::Validation(violations) => {
                write!(f, "beat validation failed: {}", violations.join("; "))
            }
            Self::OwnerNotFound(owner) => write!(f, "user not found: {owner}"),
            Self::Lookup(err) => write!(f, "user lookup failed: {err}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BeatServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Integrity(err) => Some(err),
            Self::Lookup(err) | Self::Storage(err) => Some(err),
            Self::Validation(_) | Self::OwnerNotFound(_) => None,
        }
    }
}

impl From<BeatStringError> for BeatServiceError {
    fn from(value: BeatStringError) -> Self {
        Self::Integrity(value)
    }
}

pub type BeatServiceResult<T> = Result<T, BeatServiceError>;

/// Which storage write a verified candidate is headed for.
#[derive(Debug, Clone, Copy)]
enum WriteKind {
    Create,
    Update,
}

impl WriteKind {
    fn event(self) -> &'static str {
        match self {
            Self::Create => "beat_create",
            Self::Update => "beat_update",
        }
    }
}

/// Use-case service over storage, user-lookup and validation collaborators.
pub struct BeatService<B: BeatRepository, U: UserRepository, V: BeatValidator> {
    beats: B,
    users: U,
    validator: V,
}

impl<B: BeatRepository, U: UserRepository, V: BeatValidator> BeatService<B, U, V> {
    pub fn new(beats: B, users: U, validator: V) -> Self {
        Self {
            beats,
            users,
            validator,
        }
    }

    /// Verifies, validates and stores a new beat.
    ///
    /// Returns the persisted beat carrying its storage-assigned id.
    pub fn create_beat(&self, candidate: &BeatCandidate) -> BeatServiceResult<Beat> {
        self.write_beat(candidate, WriteKind::Create)
    }

    /// Verifies, validates and fully replaces an existing beat.
    pub fn update_beat(&self, candidate: &BeatCandidate) -> BeatServiceResult<Beat> {
        self.write_beat(candidate, WriteKind::Update)
    }

    /// Deletes a beat owned by the declared user.
    ///
    /// The beat string is not verified; deletion only needs identity.
    pub fn delete_beat(&self, candidate: &BeatCandidate) -> BeatServiceResult<()> {
        let owner_id = self.resolve_owner_id(candidate.user_email.as_str())?;
        let beat = Beat::from_candidate(candidate, owner_id);
        self.beats.delete_beat(&beat).map_err(|err| {
            warn!(
                "event=beat_delete module=service status=error error_code=storage_failed error={err}"
            );
            BeatServiceError::Storage(err)
        })?;

        info!(
            "event=beat_delete module=service status=ok owner_id={owner_id} beat_id={:?}",
            beat.id
        );
        Ok(())
    }

    /// Lists every beat owned by the user with this email or username.
    pub fn list_beats_for_user(&self, user_email: &str) -> BeatServiceResult<Vec<Beat>> {
        let owner_id = self.resolve_owner_id(user_email)?;
        let beats = self
            .beats
            .get_all_beats_for_owner(owner_id)
            .map_err(BeatServiceError::Storage)?;

        info!(
            "event=beat_list module=service status=ok owner_id={owner_id} count={}",
            beats.len()
        );
        Ok(beats)
    }

    fn write_beat(&self, candidate: &BeatCandidate, kind: WriteKind) -> BeatServiceResult<Beat> {
        let event = kind.event();

        let encoded = candidate.beat_string.as_deref().unwrap_or_default();
        if let Err(err) = decode_beat_string(encoded) {
            warn!(
                "event={event} module=service status=rejected error_code=integrity reason={} beat_len={}",
                err.code(),
                encoded.len()
            );
            return Err(err.into());
        }

        let report = self.validator.validate(candidate);
        if !report.is_valid() {
            warn!(
                "event={event} module=service status=rejected error_code=validation violations={}",
                report.violations.len()
            );
            return Err(BeatServiceError::Validation(report.violations));
        }

        let owner_id = self.resolve_owner_id(candidate.user_email.as_str())?;
        let beat = Beat::from_candidate(candidate, owner_id);
        let stored = match kind {
            WriteKind::Create => self.beats.create_beat(&beat),
            WriteKind::Update => self.beats.update_beat(&beat),
        }
        .map_err(|err| {
            warn!("event={event} module=service status=error error_code=storage_failed error={err}");
            BeatServiceError::Storage(err)
        })?;

        info!(
            "event={event} module=service status=ok owner_id={owner_id} beat_id={:?}",
            stored.id
        );
        Ok(stored)
    }

    fn resolve_owner_id(&self, email_or_username: &str) -> BeatServiceResult<UserId> {
        match self.users.get_user_by_email_or_username(email_or_username) {
            Ok(Some(user)) => Ok(user.id),
            Ok(None) => {
                warn!("event=owner_resolve module=service status=not_found");
                Err(BeatServiceError::OwnerNotFound(
                    email_or_username.to_string(),
                ))
            }
            Err(err) => Err(BeatServiceError::Lookup(err)),
        }
    }
}
