//! # pathsel-select — Path Filtering, Ranking & Live Selection
//!
//! - **Filter** (`filter.rs`): [`filter`] and [`filter_for`] keep the
//!   candidates a policy permits, in discovery order.
//!
//! - **Rank** (`rank.rs`): [`rank`] orders candidates by a preference order,
//!   stable under full ties.
//!
//! - **Chooser** (`chooser.rs`): the [`PathChooser`] capability and the
//!   line-oriented [`PromptChooser`].
//!
//! - **Selector** (`selector.rs`): [`PathSelector`], the `Unselected` /
//!   `Selected` state machine that owns one session's current path.
//!
//! - **Session** (`session.rs`): [`SelectionSession`], a tokio task that
//!   applies candidate-set updates to a selector and publishes the result.
//!
//! ## Crate Policy
//!
//! - The selector never performs I/O except through its chooser.
//! - `NoPath` during an update is recoverable; the selector moves to
//!   `Unselected` and the next permitted snapshot selects again.

pub mod chooser;
pub mod error;
pub mod filter;
pub mod rank;
pub mod selector;
pub mod session;

pub use chooser::{parse_choice, InvalidSelection, PathChooser, PromptChooser};
pub use error::SelectError;
pub use filter::{filter, filter_for};
pub use rank::{compare, rank};
pub use selector::{PathSelector, Selection, SelectionChange, SelectionState};
pub use session::{SelectionSession, SessionHandle};
