//! # Path Filter
//!
//! Narrows a candidate list to the paths a policy allows. A candidate is
//! kept iff every hop region is permitted (an empty permitted set permits
//! everything) and the sequence constraint, when present, matches its hop
//! list. Relative order is preserved.

use pathsel_core::{PathCandidate, RegionSet};
use pathsel_policy::{Policy, SequenceConstraint};

use crate::error::SelectError;

/// Keep the candidates allowed by `permitted` and `sequence`.
///
/// # Errors
///
/// Returns [`SelectError::NoPath`] when nothing survives, including when
/// `candidates` is empty.
pub fn filter(
    candidates: &[PathCandidate],
    permitted: &RegionSet,
    sequence: Option<&SequenceConstraint>,
) -> Result<Vec<PathCandidate>, SelectError> {
    if candidates.is_empty() {
        return Err(SelectError::NoPath {
            candidates: 0,
            reason: Some("candidate set is empty".to_string()),
        });
    }

    let kept: Vec<PathCandidate> = candidates
        .iter()
        .filter(|c| allows(c, permitted, sequence))
        .cloned()
        .collect();

    tracing::trace!(
        offered = candidates.len(),
        kept = kept.len(),
        "filtered candidates"
    );

    if kept.is_empty() {
        return Err(SelectError::no_path(candidates.len()));
    }
    Ok(kept)
}

/// [`filter`] with the policy's permitted regions and sequence.
pub fn filter_for(
    candidates: &[PathCandidate],
    policy: &Policy,
) -> Result<Vec<PathCandidate>, SelectError> {
    filter(candidates, policy.permitted_regions(), policy.sequence())
}

pub(crate) fn allows(
    candidate: &PathCandidate,
    permitted: &RegionSet,
    sequence: Option<&SequenceConstraint>,
) -> bool {
    permitted.permits_all(&candidate.hops)
        && sequence.map_or(true, |s| s.matches(&candidate.hops))
}
