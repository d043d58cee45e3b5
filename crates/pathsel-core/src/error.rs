//! # Error Hierarchy
//!
//! Validation errors for the domain primitives defined in this crate, built
//! with `thiserror`. Each variant carries the rejected input so that an
//! operator reading a log line can see what was wrong without re-running.

use thiserror::Error;

/// Validation errors for domain primitive newtypes.
///
/// Each identifier type enforces its format at construction time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Region identifier is zero, which is reserved as the wildcard.
    #[error("invalid region ID: 0 is reserved as the wildcard region")]
    ReservedRegionId,

    /// Region identifier text is not a number in `1..=65535`.
    #[error("invalid region ID: \"{0}\" (expected an integer in 1..=65535)")]
    InvalidRegionId(String),

    /// Path fingerprint is empty or whitespace-only.
    #[error("invalid path fingerprint: must be non-empty")]
    EmptyFingerprint,
}
