//! Domain model for beats and their owners.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//!
//! # Invariants
//! - Every persisted beat is owned by exactly one `User`.
//! - Ids are assigned by storage, never by callers.

pub mod beat;
pub mod user;
