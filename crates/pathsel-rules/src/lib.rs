//! # pathsel-rules — Named Selection Rules
//!
//! A rule binds a name to a set of permitted regions and a preference
//! label. Operators publish rules in a YAML document grouped by
//! application; a session picks one by name.
//!
//! ## Architecture
//!
//! - **Source** (`source.rs`): the [`RuleSource`] capability. Fetching is
//!   injected so that loading and lookup stay testable without network
//!   access. HTTP, file, and in-memory adapters are provided.
//!
//! - **Document** (`document.rs`): the on-the-wire YAML schema and its
//!   parser.
//!
//! - **Store** (`store.rs`): [`RuleStore`], one immutable snapshot built by a
//!   single load and passed by reference to whoever resolves policies.
//!   There is no process-wide cache.
//!
//! ## Crate Policy
//!
//! - Depends on `pathsel-core` only, for region identifiers.
//! - Never exits the process: every failure is a [`RuleError`] and the caller
//!   decides whether it is fatal.

pub mod document;
pub mod error;
pub mod rule;
pub mod source;
pub mod store;

pub use document::{AppRules, RuleDocument, RuleEntry};
pub use error::RuleError;
pub use rule::Rule;
pub use source::{
    AnyRuleSource, FileRuleSource, HttpRuleSource, RuleLocation, RuleSource, StaticRuleSource,
};
pub use store::{LoadOptions, RuleStore, DEFAULT_FETCH_TIMEOUT};
