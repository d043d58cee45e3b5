//! # Watch Subcommand
//!
//! Makes the initial selection like `select`, then keeps it valid while the
//! candidate file changes. The file is re-read every poll interval; when
//! its contents differ from the last read, the new snapshot is pushed into
//! a [`SelectionSession`]. Each selection change is printed. Runs until
//! interrupted.
//!
//! A snapshot that fails to parse is logged and skipped. A snapshot with no
//! permitted path leaves the session unselected until a later one offers
//! one.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tokio::time::MissedTickBehavior;

use pathsel_select::{Selection, SelectionSession, SessionHandle};

use crate::candidates::parse_candidates;
use crate::config::SelectorConfig;
use crate::select::{initial_selection, resolve_policy, PolicyArgs};

/// Arguments for `pathsel watch`.
#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub policy: PolicyArgs,

    /// YAML or JSON file listing the available paths; re-read on change.
    #[arg(short, long, value_name = "FILE")]
    pub candidates: PathBuf,

    /// Override the configured poll interval.
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval_secs: Option<u64>,
}

/// Execute the watch subcommand.
pub async fn run_watch(args: &WatchArgs, config: &SelectorConfig) -> Result<u8> {
    let policy = resolve_policy(&args.policy, config).await?;
    let initial = std::fs::read(&args.candidates)
        .with_context(|| format!("failed to read candidates file {}", args.candidates.display()))?;
    let candidates = parse_candidates(&initial, &args.candidates.display().to_string())?;

    let (selector, picked) = initial_selection(&policy, candidates).await?;
    println!("Selected path: {picked}");

    let handle = SelectionSession::spawn(selector, policy);
    tracing::info!(session = %handle.id(), file = %args.candidates.display(), "watching candidates");

    let poll = args
        .poll_interval_secs
        .map(Duration::from_secs)
        .unwrap_or(config.poll_interval);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for interrupt");
        }
    };
    let last = watch_file(&args.candidates, initial, poll, handle, shutdown).await?;

    match last.current {
        Some(path) => println!("Final path: {path}"),
        None => println!("Final path: none"),
    }
    Ok(0)
}

/// Poll `path` and feed changed snapshots into the session until
/// `shutdown` completes. Returns the final selection.
pub async fn watch_file(
    path: &Path,
    mut last_bytes: Vec<u8>,
    poll: Duration,
    handle: SessionHandle,
    shutdown: impl std::future::Future<Output = ()>,
) -> Result<Selection> {
    let mut selection = handle.subscribe();
    let mut generation = selection.borrow_and_update().generation;

    let mut ticker = tokio::time::interval(poll);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                let bytes = match tokio::fs::read(path).await {
                    Ok(b) => b,
                    Err(e) => {
                        tracing::warn!(file = %path.display(), error = %e, "failed to read candidates");
                        continue;
                    }
                };
                if bytes == last_bytes {
                    continue;
                }
                let origin = path.display().to_string();
                match parse_candidates(&bytes, &origin) {
                    Ok(candidates) => {
                        tracing::debug!(count = candidates.len(), "candidate file changed");
                        handle.update(candidates).await?;
                    }
                    Err(e) => {
                        tracing::warn!(error = %format!("{e:#}"), "ignoring unreadable candidate snapshot");
                    }
                }
                last_bytes = bytes;
            }
            changed = selection.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = selection.borrow_and_update().clone();
                if snapshot.generation != generation {
                    generation = snapshot.generation;
                    match &snapshot.current {
                        Some(current) => println!("Selected path: {current}"),
                        None => println!("No permitted path available"),
                    }
                }
            }
        }
    }

    Ok(handle.shutdown().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathsel_core::{PathCandidate, PathFingerprint, RegionId};
    use pathsel_policy::Policy;
    use pathsel_select::PathSelector;
    use std::sync::Arc;

    fn cand(fp: &str, hop: u16) -> PathCandidate {
        PathCandidate::new(PathFingerprint::new(fp).unwrap(), vec![RegionId::new(hop).unwrap()])
    }

    #[tokio::test]
    async fn picks_up_file_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("candidates.yml");
        let first = b"- {fingerprint: A, hops: [1]}\n".to_vec();
        std::fs::write(&path, &first).unwrap();

        let policy = Policy::unrestricted();
        let selector = Arc::new(PathSelector::new());
        selector.initialize(vec![cand("A", 1)], &policy).unwrap();
        let handle = SelectionSession::spawn(selector, policy);

        let writer_path = path.clone();
        let shutdown = async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            std::fs::write(&writer_path, "- {fingerprint: B, hops: [2]}\n").unwrap();
            tokio::time::sleep(Duration::from_millis(400)).await;
        };

        let last = watch_file(&path, first, Duration::from_millis(50), handle, shutdown)
            .await
            .unwrap();
        assert_eq!(last.current.unwrap().fingerprint.as_str(), "B");
    }

    #[tokio::test]
    async fn unparseable_snapshot_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("candidates.yml");
        let first = b"- {fingerprint: A, hops: [1]}\n".to_vec();
        std::fs::write(&path, &first).unwrap();

        let policy = Policy::unrestricted();
        let selector = Arc::new(PathSelector::new());
        selector.initialize(vec![cand("A", 1)], &policy).unwrap();
        let handle = SelectionSession::spawn(selector, policy);

        let writer_path = path.clone();
        let shutdown = async move {
            std::fs::write(&writer_path, "not: [a list").unwrap();
            tokio::time::sleep(Duration::from_millis(300)).await;
        };

        let last = watch_file(&path, first, Duration::from_millis(50), handle, shutdown)
            .await
            .unwrap();
        assert_eq!(last.current.unwrap().fingerprint.as_str(), "A");
    }
}
