//! # Selection Session
//!
//! Drives a [`PathSelector`] from candidate-set updates that arrive on a
//! separate task. Updates are queued on an `mpsc` channel and applied one
//! at a time, and the resulting [`Selection`] is published on a `watch`
//! channel for any number of observers.
//!
//! Every log line the task emits is inside a `session` span carrying the
//! session's [`SessionId`].
//!
//! A `NoPath` outcome is logged and the task keeps running; the next update
//! that offers a permitted path selects it.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::Instrument;

use pathsel_core::{CandidateSet, PathCandidate, SessionId};
use pathsel_policy::Policy;

use crate::error::SelectError;
use crate::selector::{PathSelector, Selection, SelectionChange};

/// Queued updates before `update` starts waiting.
const UPDATE_QUEUE_DEPTH: usize = 16;

/// Spawns session tasks.
pub struct SelectionSession;

impl SelectionSession {
    /// Start a session task for `selector` under `policy`.
    ///
    /// The first published value is the selector's snapshot at this call,
    /// so run [`PathSelector::initialize`] before spawning. Must be called
    /// within a tokio runtime.
    pub fn spawn(selector: Arc<PathSelector>, policy: Policy) -> SessionHandle {
        Self::spawn_with_id(SessionId::new(), selector, policy)
    }

    /// [`SelectionSession::spawn`] with a caller-chosen identifier.
    pub fn spawn_with_id(
        id: SessionId,
        selector: Arc<PathSelector>,
        policy: Policy,
    ) -> SessionHandle {
        let (update_tx, update_rx) = mpsc::channel(UPDATE_QUEUE_DEPTH);
        let (selection_tx, selection_rx) = watch::channel(selector.snapshot());

        let span = tracing::info_span!("session", id = %id);
        let task = tokio::spawn(
            run(selector, policy, update_rx, selection_tx).instrument(span),
        );

        SessionHandle {
            id,
            updates: update_tx,
            selection: selection_rx,
            task,
        }
    }
}

async fn run(
    selector: Arc<PathSelector>,
    policy: Policy,
    mut updates: mpsc::Receiver<CandidateSet>,
    selection: watch::Sender<Selection>,
) {
    tracing::debug!(policy = %policy, "session started");
    while let Some(candidates) = updates.recv().await {
        let offered = candidates.len();
        match selector.on_candidate_set_changed(candidates, &policy) {
            Ok(SelectionChange::Retained(_)) | Ok(SelectionChange::Deferred) => {}
            Ok(change) => {
                if let Some(path) = change.current() {
                    tracing::debug!(path = %path, offered, "selection updated");
                }
            }
            Err(e) if e.is_no_path() => {
                tracing::warn!(offered, error = %e, "no permitted path; waiting for next update");
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to apply candidate update");
            }
        }
        selection.send_replace(selector.snapshot());
    }
    tracing::debug!("session stopped");
}

/// Handle to a running session.
#[derive(Debug)]
pub struct SessionHandle {
    id: SessionId,
    updates: mpsc::Sender<CandidateSet>,
    selection: watch::Receiver<Selection>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Queue a new candidate snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::SessionClosed`] if the task has stopped.
    pub async fn update(&self, candidates: CandidateSet) -> Result<(), SelectError> {
        self.updates
            .send(candidates)
            .await
            .map_err(|_| SelectError::SessionClosed)
    }

    /// A receiver that observes every published selection.
    pub fn subscribe(&self) -> watch::Receiver<Selection> {
        self.selection.clone()
    }

    /// The most recently published selected path.
    pub fn current(&self) -> Option<PathCandidate> {
        self.selection.borrow().current.clone()
    }

    /// Stop accepting updates, drain the queue, and return the final
    /// selection.
    pub async fn shutdown(self) -> Selection {
        let Self {
            updates,
            selection,
            task,
            ..
        } = self;
        drop(updates);
        if let Err(e) = task.await {
            tracing::error!(error = %e, "session task failed");
        }
        let last = selection.borrow().clone();
        last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathsel_core::{PathFingerprint, RegionId, RegionSet};
    use pathsel_policy::{PolicyOrigin, PreferenceOrder};

    fn cand(fp: &str, hops: &[u16], latency: u64) -> PathCandidate {
        PathCandidate::new(
            PathFingerprint::new(fp).unwrap(),
            hops.iter().map(|&n| RegionId::new(n).unwrap()).collect(),
        )
        .with_latency_ms(latency)
    }

    fn policy() -> Policy {
        Policy::new(
            PolicyOrigin::Explicit,
            PreferenceOrder::parse("latency").unwrap(),
            [1, 2].iter().map(|&n| RegionId::new(n).unwrap()).collect::<RegionSet>(),
        )
    }

    #[tokio::test]
    async fn publishes_each_update() {
        let selector = Arc::new(PathSelector::new());
        selector
            .initialize(vec![cand("a", &[1], 50)], &policy())
            .unwrap();

        let handle = SelectionSession::spawn(selector.clone(), policy());
        let mut rx = handle.subscribe();
        assert_eq!(handle.current().unwrap().fingerprint.as_str(), "a");

        handle.update(vec![cand("c", &[2], 80)]).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(
            rx.borrow_and_update().current.as_ref().unwrap().fingerprint.as_str(),
            "c"
        );

        handle.update(vec![cand("x", &[9], 1)]).await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().current.is_none());

        let last = handle.shutdown().await;
        assert!(last.current.is_none());
        assert_eq!(selector.snapshot(), last);
    }

    #[tokio::test]
    async fn shutdown_drains_queued_updates() {
        let selector = Arc::new(PathSelector::new());
        let handle = SelectionSession::spawn(selector, policy());
        handle.update(vec![cand("a", &[1], 5)]).await.unwrap();
        handle
            .update(vec![cand("a", &[1], 7), cand("b", &[2], 1)])
            .await
            .unwrap();

        let last = handle.shutdown().await;
        let current = last.current.unwrap();
        assert_eq!(current.fingerprint.as_str(), "a");
        assert_eq!(current.metrics.latency_ms, Some(7));
        assert_eq!(last.generation, 1);
    }
}
