//! Selection errors.

use thiserror::Error;

/// Errors raised while filtering, choosing, or maintaining a selection.
#[derive(Debug, Error)]
pub enum SelectError {
    /// No candidate satisfies the active policy.
    ///
    /// Fatal at session setup. During steady state the selector moves to
    /// `Unselected` and the caller is expected to keep going.
    #[error("no path satisfies the policy ({candidates} candidates offered{})", reason_suffix(.reason))]
    NoPath {
        candidates: usize,
        reason: Option<String>,
    },

    /// A chooser returned an index outside the ranked list.
    #[error("chooser picked path {index} but only {len} paths were offered")]
    InvalidChoice { index: usize, len: usize },

    /// `initialize` was called on a selector that already holds a path or
    /// is waiting on a chooser.
    #[error("selector is already initialized")]
    AlreadyInitialized,

    /// The interactive input ended before a valid choice was made.
    #[error("input closed before a path was chosen")]
    InputClosed,

    /// The session task has stopped and no longer accepts updates.
    #[error("selection session has stopped")]
    SessionClosed,

    /// Reading or writing the interactive prompt failed.
    #[error("prompt I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

fn reason_suffix(reason: &Option<String>) -> String {
    match reason {
        Some(r) => format!(": {r}"),
        None => String::new(),
    }
}

impl SelectError {
    pub(crate) fn no_path(candidates: usize) -> Self {
        Self::NoPath {
            candidates,
            reason: None,
        }
    }

    /// Whether this is [`SelectError::NoPath`].
    pub fn is_no_path(&self) -> bool {
        matches!(self, Self::NoPath { .. })
    }
}
