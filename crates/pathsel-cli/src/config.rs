//! # Selector Configuration
//!
//! Settings are layered, later layers overriding earlier ones:
//!
//! 1. Built-in defaults.
//! 2. The YAML file named by `--config`, if any.
//! 3. Environment variables.
//! 4. Command-line flags (applied by the caller).
//!
//! Config file keys and their environment variables:
//!
//! | Key | Variable | Default |
//! |-----|----------|---------|
//! | `rules_url` | `PATHSEL_RULES_URL` | the public HelloSCIONWorld rule file |
//! | `rules_file` | `PATHSEL_RULES_FILE` | (none) |
//! | `app` | `PATHSEL_APP` | all applications |
//! | `fetch_timeout_secs` | `PATHSEL_FETCH_TIMEOUT_SECS` | 10 |
//! | `poll_interval_secs` | `PATHSEL_POLL_INTERVAL_SECS` | 2 |
//!
//! A layer may set `rules_url` or `rules_file`, not both.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use pathsel_rules::{RuleLocation, DEFAULT_FETCH_TIMEOUT};

/// Rule document used when nothing else is configured.
pub const DEFAULT_RULES_URL: &str =
    "https://raw.githubusercontent.com/alicecuii/HelloSCIONWorld/main/configfiles/app.yml";

/// How often `watch` re-reads the candidate file by default.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorConfig {
    /// Where to load rules from.
    pub rules: RuleLocation,
    /// Only load this application's rules.
    pub app: Option<String>,
    /// Deadline for fetching the rule document.
    pub fetch_timeout: Duration,
    /// Candidate file poll interval for `watch`.
    pub poll_interval: Duration,
}

/// One configuration layer. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    pub rules_url: Option<String>,
    pub rules_file: Option<PathBuf>,
    pub app: Option<String>,
    pub fetch_timeout_secs: Option<u64>,
    pub poll_interval_secs: Option<u64>,
}

impl ConfigLayer {
    /// Read a YAML config file.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_yaml::from_slice(&raw).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Build a layer from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build a layer from an arbitrary variable lookup. Blank values count
    /// as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let secs = |var: &str| env_secs(var, get(var));
        Ok(Self {
            rules_url: get("PATHSEL_RULES_URL"),
            rules_file: get("PATHSEL_RULES_FILE").map(PathBuf::from),
            app: get("PATHSEL_APP"),
            fetch_timeout_secs: secs("PATHSEL_FETCH_TIMEOUT_SECS")?,
            poll_interval_secs: secs("PATHSEL_POLL_INTERVAL_SECS")?,
        })
    }
}

fn env_secs(var: &str, raw: Option<String>) -> Result<Option<u64>, ConfigError> {
    raw.map(|v| {
        v.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: var.to_string(),
            value: v.clone(),
            reason: "expected a whole number of seconds".to_string(),
        })
    })
    .transpose()
}

fn positive_secs(key: &str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: secs.to_string(),
            reason: "must be at least 1 second".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

impl SelectorConfig {
    /// Built-in defaults.
    pub fn defaults() -> Result<Self, ConfigError> {
        let url = Url::parse(DEFAULT_RULES_URL)
            .map_err(|e| ConfigError::InvalidUrl("default".to_string(), e.to_string()))?;
        Ok(Self {
            rules: RuleLocation::Url(url),
            app: None,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    /// Defaults, then `file` if given, then the environment.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] raised while reading or applying a layer.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(file, ConfigLayer::from_env()?)
    }

    /// [`SelectorConfig::load`] with the environment layer supplied by the
    /// caller.
    pub fn load_with_env(file: Option<&Path>, env: ConfigLayer) -> Result<Self, ConfigError> {
        let mut config = Self::defaults()?;
        if let Some(path) = file {
            config.apply(ConfigLayer::read(path)?, &path.display().to_string())?;
            tracing::debug!(path = %path.display(), "applied config file");
        }
        config.apply(env, "environment")?;
        Ok(config)
    }

    /// Overlay `layer` onto this configuration.
    pub fn apply(&mut self, layer: ConfigLayer, origin: &str) -> Result<(), ConfigError> {
        match (layer.rules_url, layer.rules_file) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::ConflictingRules(origin.to_string()));
            }
            (Some(raw), None) => {
                let url = Url::parse(raw.trim())
                    .map_err(|e| ConfigError::InvalidUrl(origin.to_string(), e.to_string()))?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(ConfigError::InvalidUrl(
                        origin.to_string(),
                        format!("unsupported scheme {:?}", url.scheme()),
                    ));
                }
                self.rules = RuleLocation::Url(url);
            }
            (None, Some(path)) => self.rules = RuleLocation::File(path),
            (None, None) => {}
        }
        if let Some(app) = layer.app {
            self.app = Some(app);
        }
        if let Some(secs) = layer.fetch_timeout_secs {
            self.fetch_timeout = positive_secs("fetch_timeout_secs", secs)?;
        }
        if let Some(secs) = layer.poll_interval_secs {
            self.poll_interval = positive_secs("poll_interval_secs", secs)?;
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("invalid rules URL from {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid {key} {value:?}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
    #[error("{0} sets both rules_url and rules_file")]
    ConflictingRules(String),
}
