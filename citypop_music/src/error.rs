// Error types for the generator.
//
// Most failures are absorbed inside a run: a note the MIDI writer refuses is
// skipped, a file that fails to serialize is replaced by a one-note fallback,
// a catalog miss falls back to a default voicing. Only `GenerationError`
// escapes an attempt, and only `GenerationError::RetriesExhausted` escapes
// `generate_midi`.

use std::path::PathBuf;
use thiserror::Error;

/// Unrecognized option strings (CLI boundary only).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OptionError {
    #[error("unknown era '{0}' (expected 70s, early80s, mid80s or late80s)")]
    UnknownEra(String),
    #[error("unknown style '{0}' (expected ballad, uptempo or fusion)")]
    UnknownStyle(String),
}

/// Why the MIDI track refused a note.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NoteRejection {
    #[error("pitch {0} is outside 0..=127")]
    PitchOutOfRange(i32),
    #[error("start time {0} is negative or not finite")]
    InvalidStart(f64),
    #[error("duration {0} is not a positive finite number")]
    InvalidDuration(f64),
    #[error("velocity {0} is outside 0..=1")]
    InvalidVelocity(f64),
}

/// Whole-file serialization failure.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SerializationError {
    #[error("MIDI file has no tracks")]
    NoTracks,
    #[error("tempo {0} BPM cannot be encoded")]
    InvalidTempo(f64),
    #[error("event delta of {0} ticks exceeds the 28-bit limit")]
    DeltaOverflow(u64),
    #[error("writing SMF bytes failed: {0}")]
    Write(String),
}

/// Failure of one generation attempt.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("no progression template for style '{0}' or 'standard'")]
    NoProgression(String),
    #[error("fallback file could not be serialized: {0}")]
    Fallback(#[source] SerializationError),
    #[error("generation failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: usize,
        #[source]
        last: Box<GenerationError>,
    },
}

/// Loading or validating a JSON catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog: {0}")]
    Json(#[from] serde_json::Error),
    #[error("voicing '{0}' has no intervals")]
    EmptyVoicing(String),
    #[error("progression template {0} has no roots")]
    EmptyProgression(usize),
    #[error("{what} offset {value} is outside -128..=128")]
    OffsetOutOfRange { what: String, value: i32 },
    #[error("catalog has no 'standard' progression template")]
    NoStandardProgression,
    #[error("style profile '{style}' has an inverted {field} range")]
    InvertedRange { style: String, field: &'static str },
}

/// Loading or validating a generator config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
