//! # Select Subcommand
//!
//! Resolves a policy from `--rule` / `--preference` / `--sequence` /
//! `--interactive`, reads a candidate file, and prints the selected path.
//!
//! Rules are only fetched when a rule name is given; an explicit preference
//! or the default policy needs no rule document.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use pathsel_core::{CandidateSet, PathCandidate};
use pathsel_policy::{Policy, PolicyIntent, PolicyResolver};
use pathsel_rules::RuleStore;
use pathsel_select::{PathSelector, PromptChooser};

use crate::candidates::read_candidates;
use crate::config::SelectorConfig;
use crate::rules::load_rule_store;

/// Policy flags shared by `select` and `watch`.
#[derive(Args, Debug, Clone, Default)]
pub struct PolicyArgs {
    /// Name of a rule from the rule document.
    #[arg(long)]
    pub rule: Option<String>,

    /// Comma-separated preference criteria: hops, latency, bandwidth, mtu,
    /// avoid:<region>[=<weight>][+...]. Cannot be combined with --rule.
    #[arg(long)]
    pub preference: Option<String>,

    /// Space-separated hop predicates: <region>, 0 or * for any hop,
    /// !<region> to exclude a region.
    #[arg(long, allow_hyphen_values = true)]
    pub sequence: Option<String>,

    /// Choose the initial path from a numbered list.
    #[arg(short, long)]
    pub interactive: bool,
}

impl PolicyArgs {
    pub fn intent(&self) -> PolicyIntent {
        PolicyIntent {
            rule: self.rule.clone(),
            preference: self.preference.clone(),
            sequence: self.sequence.clone(),
            interactive: self.interactive,
        }
    }

    /// A rule document is needed only for a lone rule name. When a
    /// preference is also given the resolver rejects the pair without one.
    fn needs_rules(&self) -> bool {
        let given = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        given(&self.rule) && !given(&self.preference)
    }
}

/// Arguments for `pathsel select`.
#[derive(Args, Debug)]
pub struct SelectArgs {
    #[command(flatten)]
    pub policy: PolicyArgs,

    /// YAML or JSON file listing the available paths.
    #[arg(short, long, value_name = "FILE")]
    pub candidates: PathBuf,

    /// Print the selected path as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Resolve the policy, loading rules only when a rule name needs them.
pub async fn resolve_policy(args: &PolicyArgs, config: &SelectorConfig) -> Result<Policy> {
    let store = if args.needs_rules() {
        load_rule_store(config).await?
    } else {
        RuleStore::empty()
    };
    let policy = PolicyResolver::new(&store)
        .resolve(&args.intent())
        .context("failed to resolve path policy")?;
    tracing::info!(policy = %policy, "resolved policy");
    Ok(policy)
}

/// Build a selector and make the initial pick. Interactive policies prompt
/// on the terminal from a blocking thread.
pub async fn initial_selection(
    policy: &Policy,
    candidates: CandidateSet,
) -> Result<(Arc<PathSelector>, PathCandidate)> {
    if !policy.interactive() {
        let selector = Arc::new(PathSelector::new());
        let picked = selector
            .initialize(candidates, policy)
            .context("initial path selection failed")?;
        return Ok((selector, picked));
    }

    let selector = Arc::new(PathSelector::with_chooser(PromptChooser::stdio()));
    let worker = Arc::clone(&selector);
    let policy = policy.clone();
    let picked = tokio::task::spawn_blocking(move || worker.initialize(candidates, &policy))
        .await
        .context("interactive selection task failed")?
        .context("initial path selection failed")?;
    Ok((selector, picked))
}

/// Execute the select subcommand.
pub async fn run_select(args: &SelectArgs, config: &SelectorConfig) -> Result<u8> {
    let policy = resolve_policy(&args.policy, config).await?;
    let candidates = read_candidates(&args.candidates)?;
    tracing::debug!(count = candidates.len(), "read candidates");

    let (_, picked) = initial_selection(&policy, candidates).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&picked)?);
    } else {
        println!("Selected path: {picked}");
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathsel_policy::PolicyError;
    use pathsel_rules::RuleLocation;
    use std::io::Write;

    const CANDIDATES: &str = r#"
- fingerprint: A
  hops: [1]
  metrics: {latency_ms: 50}
- fingerprint: B
  hops: [1, 3]
  metrics: {latency_ms: 10}
- fingerprint: C
  hops: [2]
  metrics: {latency_ms: 80}
"#;

    const RULES: &str = r#"
apps:
  - name: hello
    rules:
      - name: fast
        Permitted_ISD: [1, 2]
        Preference: latency
"#;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn config_with_rules(rules: &tempfile::NamedTempFile) -> SelectorConfig {
        SelectorConfig {
            rules: RuleLocation::File(rules.path().to_path_buf()),
            ..SelectorConfig::defaults().unwrap()
        }
    }

    #[test]
    fn needs_rules_only_for_lone_rule() {
        let args = |rule: Option<&str>, preference: Option<&str>| PolicyArgs {
            rule: rule.map(str::to_string),
            preference: preference.map(str::to_string),
            ..PolicyArgs::default()
        };
        assert!(args(Some("fast"), None).needs_rules());
        assert!(!args(Some("fast"), Some("hops")).needs_rules());
        assert!(!args(None, Some("hops")).needs_rules());
        assert!(!args(Some(" "), None).needs_rules());
        assert!(!args(None, None).needs_rules());
    }

    #[tokio::test]
    async fn selects_with_named_rule() {
        let rules = write_temp(RULES);
        let candidates = write_temp(CANDIDATES);
        let args = PolicyArgs {
            rule: Some("fast".to_string()),
            ..PolicyArgs::default()
        };

        let policy = resolve_policy(&args, &config_with_rules(&rules)).await.unwrap();
        let (selector, picked) = initial_selection(&policy, read_candidates(candidates.path()).unwrap())
            .await
            .unwrap();

        assert_eq!(picked.fingerprint.as_str(), "A");
        assert_eq!(selector.current(), Some(picked));
    }

    #[tokio::test]
    async fn rule_and_preference_conflict_without_fetching() {
        let dir = tempfile::tempdir().unwrap();
        let config = SelectorConfig {
            rules: RuleLocation::File(dir.path().join("never-read.yml")),
            ..SelectorConfig::defaults().unwrap()
        };
        let args = PolicyArgs {
            rule: Some("fast".to_string()),
            preference: Some("hops".to_string()),
            ..PolicyArgs::default()
        };

        let err = resolve_policy(&args, &config).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PolicyError>(),
            Some(PolicyError::Config { .. })
        ));
    }

    #[tokio::test]
    async fn explicit_preference_needs_no_rules() {
        let dir = tempfile::tempdir().unwrap();
        let config = SelectorConfig {
            rules: RuleLocation::File(dir.path().join("never-read.yml")),
            ..SelectorConfig::defaults().unwrap()
        };
        let candidates = write_temp(CANDIDATES);
        let args = SelectArgs {
            policy: PolicyArgs {
                preference: Some("latency".to_string()),
                ..PolicyArgs::default()
            },
            candidates: candidates.path().to_path_buf(),
            json: true,
        };
        assert_eq!(run_select(&args, &config).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn nothing_permitted_fails() {
        let rules = write_temp(RULES);
        let candidates = write_temp("- {fingerprint: X, hops: [9]}\n");
        let args = SelectArgs {
            policy: PolicyArgs {
                rule: Some("fast".to_string()),
                ..PolicyArgs::default()
            },
            candidates: candidates.path().to_path_buf(),
            json: false,
        };
        let err = run_select(&args, &config_with_rules(&rules)).await.unwrap_err();
        assert!(format!("{err:#}").contains("no path satisfies the policy"));
    }
}
