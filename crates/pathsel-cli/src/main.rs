//! # pathsel CLI entry point
//!
//! Parses command-line arguments, builds the layered configuration, and
//! dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pathsel_cli::config::SelectorConfig;
use pathsel_cli::rules::{run_rules, RulesArgs};
use pathsel_cli::select::{run_select, SelectArgs};
use pathsel_cli::watch::{run_watch, WatchArgs};
use pathsel_rules::RuleLocation;

/// Region-aware path selection.
///
/// Picks one of several available network paths according to a named rule
/// or an explicit preference, honouring region restrictions and hop
/// sequence constraints.
#[derive(Parser, Debug)]
#[command(name = "pathsel", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    log_json: bool,

    /// Path to configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Rule document location: an http(s) URL or a file path.
    #[arg(long, global = true, value_name = "LOCATION")]
    rules: Option<String>,

    /// Only load rules of this application.
    #[arg(long, global = true)]
    app: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the rules of the configured rule document.
    Rules(RulesArgs),

    /// Select a path from a candidate file and print it.
    Select(SelectArgs),

    /// Select a path, then keep it valid while the candidate file changes.
    Watch(WatchArgs),
}

fn init_tracing(verbose: u8, json: bool) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Defaults, config file, environment, then flags.
fn build_config(cli: &Cli) -> Result<SelectorConfig> {
    let config =
        SelectorConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    apply_flags(cli, config)
}

fn apply_flags(cli: &Cli, mut config: SelectorConfig) -> Result<SelectorConfig> {
    if let Some(raw) = &cli.rules {
        config.rules = RuleLocation::parse(raw).context("invalid --rules location")?;
    }
    if let Some(app) = &cli.app {
        config.app = Some(app.clone());
    }
    tracing::debug!(?config, "resolved configuration");
    Ok(config)
}

async fn run(cli: Cli) -> Result<u8> {
    let config = build_config(&cli)?;
    match &cli.command {
        Commands::Rules(args) => run_rules(args, &config).await,
        Commands::Select(args) => run_select(args, &config).await,
        Commands::Watch(args) => run_watch(args, &config).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    tracing::debug!("pathsel v{} starting", env!("CARGO_PKG_VERSION"));

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathsel_cli::config::ConfigLayer;

    #[test]
    fn parses_select_with_policy_flags() {
        let cli = Cli::try_parse_from([
            "pathsel",
            "-vv",
            "select",
            "--rule",
            "fast",
            "--sequence",
            "1 * !3",
            "-i",
            "-c",
            "paths.yml",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Select(args) = cli.command else {
            panic!("expected select");
        };
        assert_eq!(args.policy.rule.as_deref(), Some("fast"));
        assert_eq!(args.policy.sequence.as_deref(), Some("1 * !3"));
        assert!(args.policy.interactive);
        assert_eq!(args.candidates, PathBuf::from("paths.yml"));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "pathsel",
            "rules",
            "--rules",
            "./app.yml",
            "--app",
            "hello",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.rules.as_deref(), Some("./app.yml"));
        assert_eq!(cli.app.as_deref(), Some("hello"));
        assert!(matches!(cli.command, Commands::Rules(RulesArgs { json: true })));
    }

    #[test]
    fn select_requires_candidates() {
        assert!(Cli::try_parse_from(["pathsel", "select", "--preference", "hops"]).is_err());
    }

    #[test]
    fn watch_rejects_zero_poll_interval() {
        assert!(Cli::try_parse_from([
            "pathsel",
            "watch",
            "-c",
            "paths.yml",
            "--poll-interval-secs",
            "0"
        ])
        .is_err());
    }

    #[test]
    fn flags_override_configured_rules() {
        let cli = Cli::try_parse_from([
            "pathsel",
            "--rules",
            "https://rules.example/app.yml",
            "rules",
        ])
        .unwrap();
        let env = ConfigLayer::from_lookup(|var| match var {
            "PATHSEL_RULES_URL" => Some("https://env.example/app.yml".to_string()),
            "PATHSEL_APP" => Some("from-env".to_string()),
            _ => None,
        })
        .unwrap();
        let loaded = SelectorConfig::load_with_env(None, env).unwrap();
        assert_eq!(loaded.rules.to_string(), "https://env.example/app.yml");

        let config = apply_flags(&cli, loaded).unwrap();
        assert_eq!(config.rules.to_string(), "https://rules.example/app.yml");
        assert_eq!(config.app.as_deref(), Some("from-env"));
    }
}
