//! # Path Ranking
//!
//! Orders candidates by a [`PreferenceOrder`]. Criteria are compared
//! lexicographically: the first criterion decides, later ones only break
//! its ties. The sort is stable, so candidates that tie on every criterion
//! keep their discovery order.
//!
//! An unknown metric value always sorts after every known value, whichever
//! direction the criterion prefers.

use std::cmp::Ordering;

use pathsel_core::PathCandidate;
use pathsel_policy::{PreferenceCriterion, PreferenceOrder};

/// Return `candidates` ordered best first.
pub fn rank(candidates: Vec<PathCandidate>, order: &PreferenceOrder) -> Vec<PathCandidate> {
    let mut ranked = candidates;
    ranked.sort_by(|a, b| compare(a, b, order));
    ranked
}

/// Compare two candidates under `order`. `Less` means `a` is preferred.
pub fn compare(a: &PathCandidate, b: &PathCandidate, order: &PreferenceOrder) -> Ordering {
    order
        .criteria()
        .iter()
        .map(|c| compare_by(a, b, c))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn compare_by(a: &PathCandidate, b: &PathCandidate, criterion: &PreferenceCriterion) -> Ordering {
    match criterion {
        PreferenceCriterion::Hops => a.hop_count().cmp(&b.hop_count()),
        PreferenceCriterion::Latency => lower_known_first(a.metrics.latency_ms, b.metrics.latency_ms),
        PreferenceCriterion::Bandwidth => {
            higher_known_first(a.metrics.bandwidth_kbps, b.metrics.bandwidth_kbps)
        }
        PreferenceCriterion::Mtu => higher_known_first(a.metrics.mtu, b.metrics.mtu),
        PreferenceCriterion::AvoidRegions(weights) => weights.score(a).cmp(&weights.score(b)),
    }
}

fn lower_known_first<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn higher_known_first<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
