//! Encoded beat-string codec.
//!
//! # Responsibility
//! - Parse and verify checksum-guarded beat strings.
//! - Produce valid encoded strings from raw payloads.
//!
//! # Invariants
//! - Codec functions are pure and never panic on malformed input.

pub mod beat_string;
