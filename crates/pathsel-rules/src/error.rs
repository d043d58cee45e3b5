//! Rule loading errors.
//!
//! Two families matter to callers: the source could not be read at all
//! (fetch-class) or it was read but is not a usable rule document
//! (parse-class). [`RuleError::is_fetch`] and [`RuleError::is_parse`] make
//! the distinction without matching every variant.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while fetching or parsing a rule document.
#[derive(Debug, Error)]
pub enum RuleError {
    /// The source is unreachable or the transfer failed.
    #[error("failed to fetch rules from {origin}: {reason}")]
    Fetch { origin: String, reason: String },

    /// The source answered with a non-success HTTP status.
    #[error("rule source {origin} returned HTTP {status}")]
    HttpStatus { origin: String, status: u16 },

    /// The fetch did not complete within the configured timeout.
    #[error("timed out after {timeout:?} fetching rules from {origin}")]
    Timeout { origin: String, timeout: Duration },

    /// The document is not valid YAML or does not match the schema.
    #[error("failed to parse rule document from {origin}: {source}")]
    Parse {
        origin: String,
        source: serde_yaml::Error,
    },

    /// A rule entry parsed but violates a structural constraint.
    #[error("invalid rule {rule:?} in {origin}: {reason}")]
    InvalidRule {
        origin: String,
        rule: String,
        reason: String,
    },

    /// A specific application was requested but the document has none by
    /// that name.
    #[error("application {app:?} not found in {origin}")]
    UnknownApp { origin: String, app: String },

    /// The rule location string could not be interpreted.
    #[error("invalid rule location {location:?}: {reason}")]
    InvalidLocation { location: String, reason: String },
}

impl RuleError {
    /// Whether the rule source could not be read.
    pub fn is_fetch(&self) -> bool {
        matches!(
            self,
            Self::Fetch { .. } | Self::HttpStatus { .. } | Self::Timeout { .. }
        )
    }

    /// Whether the rule source was read but its content is unusable.
    pub fn is_parse(&self) -> bool {
        matches!(
            self,
            Self::Parse { .. } | Self::InvalidRule { .. } | Self::UnknownApp { .. }
        )
    }
}
