//! Core domain logic for BeatMaker.
//!
//! Beats are rhythm patterns stored as checksum-guarded strings
//! (`<payload>:<checksum>`) and owned by registered users. This crate owns
//! the beat-string codec and the write policy that keeps corrupted beats
//! out of storage.

pub mod codec;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod validation;

pub use codec::beat_string::{
    compute_checksum, decode_beat_string, encode_beat_string, verify_beat_string,
    BeatStringError, DecodedBeat, FILLER, SEPARATOR,
};
pub use config::{load_config, AppConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::beat::{Beat, BeatCandidate, BeatId};
pub use model::user::{NewUser, User, UserId};
pub use repo::beat_repo::{BeatRepository, RepoError, RepoResult, SqliteBeatRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use service::beat_service::{BeatService, BeatServiceError, BeatServiceResult};
pub use validation::beat_rules::BeatRules;
pub use validation::{BeatValidator, ValidationReport};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
