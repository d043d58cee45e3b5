#![deny(missing_docs)]

//! # pathsel-core — Foundational Types for Path Selection
//!
//! This crate defines the types every other crate in the workspace depends
//! on. It has no internal crate dependencies — only `serde`, `thiserror`, and
//! `uuid` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** A [`RegionId`] is not a
//!    bare integer and a [`PathFingerprint`] is not a bare string. Both are
//!    validated at construction and on deserialization.
//!
//! 2. **[`RegionSet`] owns the "empty means unrestricted" rule.** Callers ask
//!    [`RegionSet::permits`] instead of re-deriving the emptiness check, so an
//!    empty permission set can never be mistaken for "reject everything".
//!
//! 3. **[`PathCandidate`] is supplied, never mutated.** Path discovery and
//!    measurement happen outside this workspace; the selection engine only
//!    reads candidates and clones them into its own bookkeeping.
//!
//! 4. **[`ValidationError`] hierarchy.** Structured errors with `thiserror` —
//!    no `Box<dyn Error>`, no `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod path;
pub mod region;

// Re-export primary types at crate root for ergonomic imports.
pub use error::ValidationError;
pub use identity::SessionId;
pub use path::{CandidateSet, PathCandidate, PathFingerprint, PathMetrics};
pub use region::{RegionId, RegionSet};
