//! # Path Selector
//!
//! [`PathSelector`] owns the current path of one live session.
//!
//! ## States
//!
//! ```text
//!             initialize / update with a permitted path
//!  Unselected ─────────────────────────────────────────▶ Selected
//!      ▲                                                   │  │
//!      └──────────── update with no permitted path ────────┘  │
//!                                                             │ update:
//!                                   current still permitted ──┤  retain (sticky)
//!                                   current gone ─────────────┘  switch to rank 0
//! ```
//!
//! A retained selection is sticky: it stays even when a better-ranked path
//! appears. Its value is refreshed with the newest snapshot's metrics.
//!
//! ## Locking
//!
//! Selection state sits behind one mutex and the chooser behind another.
//! An interactive prompt holds only the chooser lock, so updates keep
//! landing while the user reads the list. When the prompt returns, the
//! choice is checked against the newest snapshot before it is committed.

use std::fmt;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use pathsel_core::{CandidateSet, PathCandidate, PathFingerprint};
use pathsel_policy::Policy;

use crate::chooser::PathChooser;
use crate::error::SelectError;
use crate::filter::{allows, filter_for};
use crate::rank::rank;

/// Whether the selector currently holds a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Unselected,
    Selected,
}

impl fmt::Display for SelectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unselected => f.write_str("unselected"),
            Self::Selected => f.write_str("selected"),
        }
    }
}

/// Point-in-time view of a selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// The selected path, present iff `state` is `Selected`.
    pub current: Option<PathCandidate>,
    pub state: SelectionState,
    /// When the current path was committed.
    pub selected_at: Option<DateTime<Utc>>,
    /// Incremented on every commit and every loss of selection.
    pub generation: u64,
}

impl Selection {
    fn unselected() -> Self {
        Self {
            current: None,
            state: SelectionState::Unselected,
            selected_at: None,
            generation: 0,
        }
    }
}

/// Outcome of a candidate-set update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    /// The current path is still permitted and was kept.
    Retained(PathCandidate),
    /// The current path disappeared and the top-ranked permitted path
    /// replaced it.
    Switched {
        from: PathFingerprint,
        to: PathCandidate,
    },
    /// Nothing was selected before; the top-ranked path is now.
    Selected(PathCandidate),
    /// An interactive choice is in progress; the snapshot was recorded and
    /// will be checked when the choice returns.
    Deferred,
}

impl SelectionChange {
    /// The selected path after the update, if the update settled one.
    pub fn current(&self) -> Option<&PathCandidate> {
        match self {
            Self::Retained(c) | Self::Selected(c) | Self::Switched { to: c, .. } => Some(c),
            Self::Deferred => None,
        }
    }
}

#[derive(Debug)]
struct Inner {
    selection: Selection,
    latest: Option<CandidateSet>,
    choosing: bool,
}

impl Inner {
    fn commit(&mut self, candidate: PathCandidate) {
        self.selection.current = Some(candidate);
        self.selection.state = SelectionState::Selected;
        self.selection.selected_at = Some(Utc::now());
        self.selection.generation += 1;
    }

    fn clear(&mut self) {
        if self.selection.state == SelectionState::Selected {
            self.selection.generation += 1;
        }
        self.selection.current = None;
        self.selection.state = SelectionState::Unselected;
        self.selection.selected_at = None;
    }
}

/// Owns and maintains one session's path selection.
pub struct PathSelector {
    inner: Mutex<Inner>,
    chooser: Mutex<Option<Box<dyn PathChooser + Send>>>,
}

impl fmt::Debug for PathSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathSelector")
            .field("selection", &self.inner.lock().selection)
            .finish_non_exhaustive()
    }
}

impl Default for PathSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl PathSelector {
    /// A selector without a chooser. Interactive policies fall back to the
    /// top-ranked path.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                selection: Selection::unselected(),
                latest: None,
                choosing: false,
            }),
            chooser: Mutex::new(None),
        }
    }

    /// A selector that asks `chooser` on interactive initial selection.
    pub fn with_chooser(chooser: impl PathChooser + Send + 'static) -> Self {
        let selector = Self::new();
        *selector.chooser.lock() = Some(Box::new(chooser));
        selector
    }

    /// Make the initial pick from `candidates`.
    ///
    /// Non-interactive policies take the top-ranked permitted path.
    /// Interactive policies ask the chooser; if the chosen path is no
    /// longer permitted in the newest snapshot by the time the chooser
    /// returns, the newest top-ranked path is taken instead.
    ///
    /// Call it once, before handing the selector to a
    /// [`SelectionSession`](crate::SelectionSession). After a steady-state
    /// loss of selection the session's updates re-select on their own.
    ///
    /// # Errors
    ///
    /// - [`SelectError::AlreadyInitialized`] when a path is already
    ///   selected or another initial choice is in progress.
    /// - [`SelectError::NoPath`] when nothing is permitted.
    /// - [`SelectError::InvalidChoice`] when the chooser answers with an
    ///   index outside the ranked list.
    /// - [`SelectError::InputClosed`] or [`SelectError::Io`] from the
    ///   chooser.
    pub fn initialize(
        &self,
        candidates: CandidateSet,
        policy: &Policy,
    ) -> Result<PathCandidate, SelectError> {
        let ranked = {
            let mut inner = self.inner.lock();
            if inner.choosing || inner.selection.state == SelectionState::Selected {
                return Err(SelectError::AlreadyInitialized);
            }
            let ranked = rank(filter_for(&candidates, policy)?, policy.preference_order());
            inner.latest = Some(candidates);

            if !policy.interactive() {
                let top = ranked[0].clone();
                inner.commit(top.clone());
                tracing::info!(path = %top, "selected top-ranked path");
                return Ok(top);
            }
            inner.choosing = true;
            ranked
        };

        let choice = self.ask(&ranked);

        let mut inner = self.inner.lock();
        inner.choosing = false;
        let chosen = ranked[choice?].fingerprint.clone();

        let latest = inner.latest.clone().unwrap_or_default();
        let fresh = match filter_for(&latest, policy) {
            Ok(kept) => rank(kept, policy.preference_order()),
            Err(e) => {
                inner.clear();
                return Err(e);
            }
        };

        let pick = match fresh.iter().find(|c| c.fingerprint == chosen) {
            Some(c) => {
                tracing::info!(path = %c, "selected path chosen by user");
                c.clone()
            }
            None => {
                tracing::warn!(
                    fingerprint = %chosen,
                    "chosen path vanished while prompting; taking top-ranked path"
                );
                fresh[0].clone()
            }
        };
        inner.commit(pick.clone());
        Ok(pick)
    }

    fn ask(&self, ranked: &[PathCandidate]) -> Result<usize, SelectError> {
        let mut chooser = self.chooser.lock();
        match chooser.as_mut() {
            Some(chooser) => {
                let index = chooser.choose(ranked)?;
                if index >= ranked.len() {
                    return Err(SelectError::InvalidChoice {
                        index,
                        len: ranked.len(),
                    });
                }
                Ok(index)
            }
            None => {
                tracing::warn!("interactive selection requested without a chooser; taking top-ranked path");
                Ok(0)
            }
        }
    }

    /// Re-validate the selection against a new candidate snapshot.
    ///
    /// The current path is kept while it is still present and permitted,
    /// refreshed with its newest value. Otherwise the top-ranked permitted
    /// path is taken. When nothing is permitted the selector becomes
    /// `Unselected`.
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::NoPath`] when nothing is permitted. This is
    /// not fatal: the next update that offers a permitted path selects it.
    pub fn on_candidate_set_changed(
        &self,
        candidates: CandidateSet,
        policy: &Policy,
    ) -> Result<SelectionChange, SelectError> {
        let mut inner = self.inner.lock();

        if inner.choosing && inner.selection.state == SelectionState::Unselected {
            inner.latest = Some(candidates);
            return Ok(SelectionChange::Deferred);
        }

        let retained = inner.selection.current.as_ref().and_then(|current| {
            candidates
                .iter()
                .find(|c| c.fingerprint == current.fingerprint)
                .filter(|c| allows(c, policy.permitted_regions(), policy.sequence()))
                .cloned()
        });
        if let Some(fresh) = retained {
            tracing::debug!(fingerprint = %fresh.fingerprint, "current path still permitted");
            inner.selection.current = Some(fresh.clone());
            inner.latest = Some(candidates);
            return Ok(SelectionChange::Retained(fresh));
        }

        let ranked = match filter_for(&candidates, policy) {
            Ok(kept) => rank(kept, policy.preference_order()),
            Err(e) => {
                if let Some(lost) = &inner.selection.current {
                    tracing::warn!(fingerprint = %lost.fingerprint, error = %e, "lost selected path");
                }
                inner.clear();
                inner.latest = Some(candidates);
                return Err(e);
            }
        };

        let top = ranked[0].clone();
        let previous = inner.selection.current.take().map(|c| c.fingerprint);
        inner.commit(top.clone());
        inner.latest = Some(candidates);

        match previous {
            Some(from) => {
                tracing::info!(from = %from, to = %top, "switched path");
                Ok(SelectionChange::Switched { from, to: top })
            }
            None => {
                tracing::info!(path = %top, "selected path");
                Ok(SelectionChange::Selected(top))
            }
        }
    }

    /// The selected path, if any.
    pub fn current(&self) -> Option<PathCandidate> {
        self.inner.lock().selection.current.clone()
    }

    pub fn state(&self) -> SelectionState {
        self.inner.lock().selection.state
    }

    /// Copy of the full selection record.
    pub fn snapshot(&self) -> Selection {
        self.inner.lock().selection.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathsel_core::{RegionId, RegionSet};
    use pathsel_policy::{PolicyOrigin, PreferenceOrder};

    fn cand(fp: &str, hops: &[u16], latency: u64) -> PathCandidate {
        PathCandidate::new(
            PathFingerprint::new(fp).unwrap(),
            hops.iter().map(|&n| RegionId::new(n).unwrap()).collect(),
        )
        .with_latency_ms(latency)
    }

    fn policy(regions: &[u16]) -> Policy {
        Policy::new(
            PolicyOrigin::Explicit,
            PreferenceOrder::parse("latency").unwrap(),
            regions.iter().map(|&n| RegionId::new(n).unwrap()).collect::<RegionSet>(),
        )
    }

    /// Always picks the given index.
    struct Fixed(usize);

    impl PathChooser for Fixed {
        fn choose(&mut self, _ranked: &[PathCandidate]) -> Result<usize, SelectError> {
            Ok(self.0)
        }
    }

    #[test]
    fn starts_unselected() {
        let s = PathSelector::new();
        assert_eq!(s.state(), SelectionState::Unselected);
        assert!(s.current().is_none());
        assert_eq!(s.snapshot().generation, 0);
    }

    #[test]
    fn initialize_picks_top_ranked() {
        let s = PathSelector::new();
        let picked = s
            .initialize(vec![cand("a", &[1], 50), cand("b", &[1], 10)], &policy(&[]))
            .unwrap();
        assert_eq!(picked.fingerprint.as_str(), "b");
        let snap = s.snapshot();
        assert_eq!(snap.state, SelectionState::Selected);
        assert_eq!(snap.generation, 1);
        assert!(snap.selected_at.is_some());
    }

    #[test]
    fn initialize_with_nothing_permitted_stays_unselected() {
        let s = PathSelector::new();
        let err = s.initialize(vec![cand("a", &[3], 5)], &policy(&[1])).unwrap_err();
        assert!(err.is_no_path());
        assert_eq!(s.state(), SelectionState::Unselected);
    }

    #[test]
    fn retained_value_is_refreshed() {
        let s = PathSelector::new();
        s.initialize(vec![cand("a", &[1], 50)], &policy(&[])).unwrap();
        let change = s
            .on_candidate_set_changed(vec![cand("a", &[1], 70), cand("b", &[1], 1)], &policy(&[]))
            .unwrap();
        assert_eq!(change, SelectionChange::Retained(cand("a", &[1], 70)));
        assert_eq!(s.current().unwrap().metrics.latency_ms, Some(70));
        assert_eq!(s.snapshot().generation, 1);
    }

    #[test]
    fn loss_then_recovery() {
        let s = PathSelector::new();
        s.initialize(vec![cand("a", &[1], 50)], &policy(&[1])).unwrap();

        let err = s
            .on_candidate_set_changed(vec![cand("x", &[9], 1)], &policy(&[1]))
            .unwrap_err();
        assert!(err.is_no_path());
        assert_eq!(s.state(), SelectionState::Unselected);
        assert_eq!(s.snapshot().generation, 2);

        let change = s
            .on_candidate_set_changed(vec![cand("b", &[1], 5)], &policy(&[1]))
            .unwrap();
        assert!(matches!(change, SelectionChange::Selected(ref c) if c.fingerprint.as_str() == "b"));
        assert_eq!(s.snapshot().generation, 3);
    }

    #[test]
    fn interactive_uses_chooser() {
        let s = PathSelector::with_chooser(Fixed(1));
        let p = policy(&[]).with_interactive(true);
        let picked = s
            .initialize(vec![cand("a", &[1], 10), cand("b", &[1], 20)], &p)
            .unwrap();
        assert_eq!(picked.fingerprint.as_str(), "b");
    }

    #[test]
    fn out_of_range_choice_is_rejected() {
        let s = PathSelector::with_chooser(Fixed(7));
        let p = policy(&[]).with_interactive(true);
        let err = s
            .initialize(vec![cand("a", &[1], 10), cand("b", &[1], 20)], &p)
            .unwrap_err();
        assert!(matches!(err, SelectError::InvalidChoice { index: 7, len: 2 }));
        assert_eq!(s.state(), SelectionState::Unselected);
        assert!(s.current().is_none());
        assert_eq!(s.snapshot().generation, 0);
    }

    #[test]
    fn second_initialize_is_rejected() {
        let s = PathSelector::new();
        s.initialize(vec![cand("a", &[1], 10)], &policy(&[])).unwrap();
        let err = s
            .initialize(vec![cand("b", &[1], 1)], &policy(&[]))
            .unwrap_err();
        assert!(matches!(err, SelectError::AlreadyInitialized));
        assert_eq!(s.current().unwrap().fingerprint.as_str(), "a");
        assert_eq!(s.snapshot().generation, 1);
    }

    #[test]
    fn initialize_after_failed_attempt_is_allowed() {
        let s = PathSelector::new();
        assert!(s.initialize(vec![cand("a", &[3], 10)], &policy(&[1])).is_err());
        let picked = s.initialize(vec![cand("b", &[1], 10)], &policy(&[1])).unwrap();
        assert_eq!(picked.fingerprint.as_str(), "b");
    }

    #[test]
    fn retained_path_crossing_forbidden_region_is_replaced() {
        let s = PathSelector::new();
        s.initialize(vec![cand("a", &[1], 10), cand("c", &[2], 80)], &policy(&[1, 2]))
            .unwrap();

        let change = s
            .on_candidate_set_changed(
                vec![cand("a", &[1, 3], 10), cand("c", &[2], 80)],
                &policy(&[1, 2]),
            )
            .unwrap();
        assert_eq!(
            change,
            SelectionChange::Switched {
                from: PathFingerprint::new("a").unwrap(),
                to: cand("c", &[2], 80),
            }
        );
    }

    #[test]
    fn interactive_without_chooser_takes_top() {
        let s = PathSelector::new();
        let p = policy(&[]).with_interactive(true);
        let picked = s
            .initialize(vec![cand("a", &[1], 10), cand("b", &[1], 20)], &p)
            .unwrap();
        assert_eq!(picked.fingerprint.as_str(), "a");
    }
}
