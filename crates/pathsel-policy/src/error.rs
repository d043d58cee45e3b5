//! Policy resolution errors.

use thiserror::Error;

/// Errors raised while resolving user intent into a [`crate::Policy`].
///
/// All of these are resolution-phase errors: a session that hits one never
/// starts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// Rule name and explicit preference were both given.
    #[error("either specify a rule or a preference, not both (rule {rule:?}, preference {preference:?})")]
    Config { rule: String, preference: String },

    /// The named rule is not in the loaded store.
    #[error("unknown rule {name:?} (available: {available})")]
    UnknownRule { name: String, available: String },

    /// A preference label could not be parsed.
    #[error("invalid preference {label:?}: {reason}")]
    InvalidPreference { label: String, reason: String },

    /// A hop-sequence string could not be parsed.
    #[error("invalid hop sequence {sequence:?}: {reason}")]
    InvalidSequence { sequence: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_names_both_inputs() {
        let e = PolicyError::Config {
            rule: "fast".to_string(),
            preference: "hops".to_string(),
        };
        let msg = e.to_string();
        assert!(msg.contains("\"fast\""));
        assert!(msg.contains("\"hops\""));
    }

    #[test]
    fn unknown_rule_lists_available() {
        let e = PolicyError::UnknownRule {
            name: "x".to_string(),
            available: "fast, short".to_string(),
        };
        assert!(e.to_string().contains("fast, short"));
    }
}
