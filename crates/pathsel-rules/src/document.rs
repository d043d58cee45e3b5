//! # Rule Document Schema
//!
//! The rule document lists applications, each with its own rules:
//!
//! ```yaml
//! apps:
//!   - name: hello-scion
//!     rules:
//!       - name: fast
//!         permitted_regions: [1, 2]
//!         preference: latency
//!       - name: anywhere
//!         preference: hops
//! ```
//!
//! `Permitted_ISD` and `Preference` are accepted as aliases so that
//! documents written for earlier tooling still load. Unknown keys inside a
//! rule are rejected: a rule that carries a single `ISD` field instead of a
//! permitted list would otherwise load as unrestricted.
//!
//! JSON is a subset of YAML and parses through the same path.

use serde::{Deserialize, Serialize};

use pathsel_core::RegionSet;

use crate::error::RuleError;

/// Top-level rule document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleDocument {
    /// Applications in document order.
    #[serde(default)]
    pub apps: Vec<AppRules>,
}

/// The rules published for one application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppRules {
    /// Application name.
    pub name: String,
    /// Rules in document order.
    #[serde(default)]
    pub rules: Vec<RuleEntry>,
}

/// One rule as written in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleEntry {
    /// Rule name, unique within the loaded store.
    pub name: String,
    /// Permitted regions. Absent or empty means unrestricted.
    #[serde(default, alias = "Permitted_ISD", alias = "permitted_isd")]
    pub permitted_regions: RegionSet,
    /// Preference label, e.g. `latency` or `hops,bandwidth`.
    #[serde(default, alias = "Preference")]
    pub preference: String,
}

impl RuleDocument {
    /// Parse a document from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Parse`] if the bytes are not YAML or do not match
    /// the schema.
    pub fn parse(bytes: &[u8], origin: &str) -> Result<Self, RuleError> {
        serde_yaml::from_slice(bytes).map_err(|e| RuleError::Parse {
            origin: origin.to_string(),
            source: e,
        })
    }

    /// Look up an application by name.
    pub fn app(&self, name: &str) -> Option<&AppRules> {
        self.apps.iter().find(|a| a.name == name)
    }
}
