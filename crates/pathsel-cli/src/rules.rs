//! # Rules Subcommand
//!
//! Loads the configured rule document and lists its rules, so an operator
//! can see which names `--rule` accepts.

use anyhow::{Context, Result};
use clap::Args;

use pathsel_rules::{AnyRuleSource, LoadOptions, RuleStore};

use crate::config::SelectorConfig;

/// Arguments for `pathsel rules`.
#[derive(Args, Debug)]
pub struct RulesArgs {
    /// Print rules as JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// Fetch and parse the configured rule document.
pub async fn load_rule_store(config: &SelectorConfig) -> Result<RuleStore> {
    let source = AnyRuleSource::from_location(config.rules.clone(), config.fetch_timeout)
        .with_context(|| format!("failed to prepare rule source {}", config.rules))?;
    let options = LoadOptions {
        app: config.app.clone(),
        timeout: config.fetch_timeout,
    };
    RuleStore::load(&source, &options)
        .await
        .with_context(|| format!("failed to load rules from {}", config.rules))
}

/// Execute the rules subcommand.
pub async fn run_rules(args: &RulesArgs, config: &SelectorConfig) -> Result<u8> {
    let store = load_rule_store(config).await?;

    if args.json {
        let listing: Vec<serde_json::Value> = store
            .rules()
            .iter()
            .map(|r| {
                serde_json::json!({
                    "name": r.name(),
                    "permitted_regions": r.permitted_regions(),
                    "preference": r.preference_label(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(0);
    }

    if store.is_empty() {
        println!("No rules defined in {}", config.rules);
        return Ok(0);
    }

    let width = store.names().map(str::len).max().unwrap_or(0);
    for rule in store.rules() {
        let preference = match rule.preference_label() {
            "" => "(default)",
            label => label,
        };
        println!(
            "{:<width$}  regions={}  preference={}",
            rule.name(),
            rule.permitted_regions(),
            preference,
        );
    }
    Ok(0)
}
