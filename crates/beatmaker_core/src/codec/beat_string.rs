//! Beat-string checksum codec.
//!
//! # Responsibility
//! - Strip filler characters, split payload from checksum, and verify the
//!   additive checksum of the payload.
//! - Report malformed input as typed errors instead of panicking.
//!
//! # Invariants
//! - Exactly one `SEPARATOR` must remain after `FILLER` removal.
//! - Payload characters are restricted to `0-9` and `A-Z`.
//! - Checksum is the sum of digit values plus 1-based letter positions.
//!
//! Format: `<payload>:<checksum>`, e.g. `AB12:6`. Filler (`;`) may appear
//! anywhere and is ignored.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Character allowed anywhere in an encoded beat and removed before parsing.
pub const FILLER: char = ';';
/// Character dividing the payload segment from the checksum segment.
pub const SEPARATOR: char = ':';

/// Parsed beat string whose checksum has been verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBeat {
    /// Payload segment with filler characters removed.
    pub payload: String,
    /// Checksum value embedded in the encoded string.
    pub checksum: u64,
}

/// Reasons a beat string fails to decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeatStringError {
    /// Input is empty (or only filler).
    Empty,
    /// No separator between payload and checksum.
    MissingSeparator,
    /// More than one separator after filler removal.
    ExtraSeparator,
    /// Payload segment is empty.
    EmptyPayload,
    /// Payload contains a character outside `0-9` / `A-Z`.
    UnsupportedCharacter { character: char, position: usize },
    /// Checksum segment is not a base-10 integer.
    InvalidChecksum(String),
    /// Embedded checksum disagrees with the payload.
    ChecksumMismatch { expected: u64, computed: u64 },
}

impl Display for BeatStringError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "beat string is empty"),
            Self::MissingSeparator => {
                write!(f, "beat string has no `{SEPARATOR}` separator")
            }
            Self::ExtraSeparator => {
                write!(f, "beat string has more than one `{SEPARATOR}` separator")
            }
            Self::EmptyPayload => write!(f, "beat payload is empty"),
            Self::UnsupportedCharacter {
                character,
                position,
            } => write!(
                f,
                "unsupported payload character {character:?} at position {position}"
            ),
            Self::InvalidChecksum(text) => write!(f, "invalid checksum segment `{text}`"),
            Self::ChecksumMismatch { expected, computed } => write!(
                f,
                "checksum mismatch: expected {expected}, computed {computed}"
            ),
        }
    }
}

impl BeatStringError {
    /// Stable machine-readable code, safe to log.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::MissingSeparator => "missing_separator",
            Self::ExtraSeparator => "extra_separator",
            Self::EmptyPayload => "empty_payload",
            Self::UnsupportedCharacter { .. } => "unsupported_character",
            Self::InvalidChecksum(_) => "invalid_checksum",
            Self::ChecksumMismatch { .. } => "checksum_mismatch",
        }
    }
}

impl Error for BeatStringError {}

/// Returns whether `input` is a well-formed beat string with a matching checksum.
///
/// `None`, empty, and malformed inputs are all reported as invalid.
pub fn verify_beat_string(input: Option<&str>) -> bool {
    input.is_some_and(|value| decode_beat_string(value).is_ok())
}

/// Decodes and verifies one encoded beat string.
///
/// # Errors
/// - Returns the first structural problem found, in parse order: emptiness,
///   separator count, empty payload, payload characters, checksum text, and
///   finally checksum mismatch.
pub fn decode_beat_string(input: &str) -> Result<DecodedBeat, BeatStringError> {
    let stripped: String = input.chars().filter(|ch| *ch != FILLER).collect();
    if stripped.is_empty() {
        return Err(BeatStringError::Empty);
    }

    let mut segments = stripped.split(SEPARATOR);
    let payload = segments.next().unwrap_or_default();
    let checksum_text = segments.next().ok_or(BeatStringError::MissingSeparator)?;
    if segments.next().is_some() {
        return Err(BeatStringError::ExtraSeparator);
    }

    if payload.is_empty() {
        return Err(BeatStringError::EmptyPayload);
    }

    let computed = compute_checksum(payload)?;
    let expected = parse_checksum(checksum_text)?;
    if computed != expected {
        return Err(BeatStringError::ChecksumMismatch { expected, computed });
    }

    Ok(DecodedBeat {
        payload: payload.to_string(),
        checksum: expected,
    })
}

/// Computes the additive checksum of a filler-free payload.
///
/// Digits contribute their numeric value; `A..=Z` contribute `1..=26`.
///
/// # Errors
/// - Returns `UnsupportedCharacter` for anything else, including lowercase.
pub fn compute_checksum(payload: &str) -> Result<u64, BeatStringError> {
    payload
        .chars()
        .enumerate()
        .try_fold(0_u64, |sum, (position, character)| {
            char_value(character)
                .map(|value| sum + value)
                .ok_or(BeatStringError::UnsupportedCharacter {
                    character,
                    position,
                })
        })
}

/// Builds `payload:checksum` for a raw payload.
///
/// Filler characters in `payload` are kept verbatim; they do not count
/// toward the checksum.
pub fn encode_beat_string(payload: &str) -> Result<String, BeatStringError> {
    let stripped: String = payload.chars().filter(|ch| *ch != FILLER).collect();
    if stripped.contains(SEPARATOR) {
        return Err(BeatStringError::ExtraSeparator);
    }
    if stripped.is_empty() {
        return Err(BeatStringError::EmptyPayload);
    }
    let checksum = compute_checksum(&stripped)?;
    Ok(format!("{payload}{SEPARATOR}{checksum}"))
}

fn char_value(character: char) -> Option<u64> {
    match character {
        '0'..='9' => Some(u64::from(character as u8 - b'0')),
        'A'..='Z' => Some(u64::from(character as u8 - b'A' + 1)),
        _ => None,
    }
}

fn parse_checksum(text: &str) -> Result<u64, BeatStringError> {
    if text.is_empty() || !text.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(BeatStringError::InvalidChecksum(text.to_string()));
    }
    text.parse::<u64>()
        .map_err(|_| BeatStringError::InvalidChecksum(text.to_string()))
}
