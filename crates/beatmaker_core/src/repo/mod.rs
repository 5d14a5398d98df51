//! Repository layer contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define the storage and user-lookup collaborators consumed by services.
//! - Isolate SQLite query details from orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `UserConflict`) in
//!   addition to DB transport errors.

pub mod beat_repo;
pub mod user_repo;
