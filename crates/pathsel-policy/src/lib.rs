//! # pathsel-policy — Policy Resolution
//!
//! Turns user intent into one concrete [`Policy`]:
//!
//! - **Criteria** (`criteria.rs`): [`PreferenceCriterion`] and the ordered
//!   [`PreferenceOrder`] parsed from a preference label such as
//!   `"latency,hops"`.
//!
//! - **Sequence** (`sequence.rs`): [`SequenceConstraint`], a list of
//!   [`HopPredicate`] tokens a path's hop sequence must satisfy. Matching
//!   semantics are defined there and nowhere else.
//!
//! - **Policy** (`policy.rs`): the resolved, immutable [`Policy`].
//!
//! - **Resolver** (`resolver.rs`): [`PolicyResolver`], which reads a
//!   [`pathsel_rules::RuleStore`] by reference and rejects contradictory
//!   intent.
//!
//! Resolution is pure: all inputs are already in memory.

pub mod criteria;
pub mod error;
pub mod policy;
pub mod resolver;
pub mod sequence;

pub use criteria::{PreferenceCriterion, PreferenceOrder, RegionWeights, AVAILABLE_PREFERENCES};
pub use error::PolicyError;
pub use policy::{Policy, PolicyOrigin};
pub use resolver::{PolicyIntent, PolicyResolver};
pub use sequence::{HopPredicate, SequenceConstraint};
