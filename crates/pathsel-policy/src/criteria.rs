//! # Preference Criteria
//!
//! A preference label is a comma-separated list of criteria, most
//! significant first:
//!
//! | Token | Prefers |
//! |-------|---------|
//! | `hops` (alias `shortest`) | fewest hops |
//! | `latency` | lowest latency estimate |
//! | `bandwidth` | highest bandwidth estimate |
//! | `mtu` (alias `largest_mtu`) | largest MTU |
//! | `avoid:<region>[=<weight>][+<region>[=<weight>]...]` | lowest summed weight of hops in the listed regions |
//!
//! For example `avoid:3=5+4,latency` ranks paths by how much they touch
//! regions 3 (weight 5 per hop) and 4 (weight 1 per hop), breaking ties by
//! latency.
//!
//! Each criterion may appear at most once. The order is significant and is
//! applied lexicographically by the ranker.

use std::collections::BTreeMap;
use std::fmt;

use pathsel_core::{PathCandidate, RegionId};

use crate::error::PolicyError;

/// Preference tokens accepted in a label, for help text.
pub const AVAILABLE_PREFERENCES: &[&str] = &[
    "hops",
    "latency",
    "bandwidth",
    "mtu",
    "avoid:<region>[=<weight>][+...]",
];

/// Per-region penalty weights for the avoidance criterion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionWeights(BTreeMap<RegionId, u32>);

impl RegionWeights {
    /// Weight of a single region; zero when not listed.
    pub fn weight(&self, region: RegionId) -> u32 {
        self.0.get(&region).copied().unwrap_or(0)
    }

    /// Summed weight over every hop of `candidate`. A region visited by
    /// several hops is counted once per hop.
    pub fn score(&self, candidate: &PathCandidate) -> u64 {
        candidate
            .hops
            .iter()
            .map(|&r| u64::from(self.weight(r)))
            .sum()
    }

    fn parse(spec: &str, label: &str) -> Result<Self, PolicyError> {
        let invalid = |reason: String| PolicyError::InvalidPreference {
            label: label.to_string(),
            reason,
        };

        let mut weights = BTreeMap::new();
        for part in spec.split('+') {
            let part = part.trim();
            if part.is_empty() {
                return Err(invalid("avoid: needs at least one region".to_string()));
            }
            let (region, weight) = match part.split_once('=') {
                Some((r, w)) => {
                    let w: u32 = w
                        .trim()
                        .parse()
                        .map_err(|_| invalid(format!("weight {:?} is not a number", w.trim())))?;
                    (r, w)
                }
                None => (part, 1),
            };
            if weight == 0 {
                return Err(invalid(format!("weight for region {region} must be positive")));
            }
            let region: RegionId = region.parse().map_err(|e| invalid(format!("{e}")))?;
            if weights.insert(region, weight).is_some() {
                return Err(invalid(format!("region {region} listed twice in avoid:")));
            }
        }
        Ok(Self(weights))
    }
}

impl fmt::Display for RegionWeights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(r, w)| {
                if *w == 1 {
                    r.to_string()
                } else {
                    format!("{r}={w}")
                }
            })
            .collect();
        write!(f, "{}", parts.join("+"))
    }
}

/// One ranking criterion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceCriterion {
    /// Fewest hops first.
    Hops,
    /// Lowest latency first; unknown latency last.
    Latency,
    /// Highest bandwidth first; unknown bandwidth last.
    Bandwidth,
    /// Largest MTU first; unknown MTU last.
    Mtu,
    /// Lowest region-avoidance score first.
    AvoidRegions(RegionWeights),
}

impl PreferenceCriterion {
    /// Parse a single token.
    fn parse(token: &str, label: &str) -> Result<Self, PolicyError> {
        let lower = token.to_ascii_lowercase();
        if let Some(spec) = lower.strip_prefix("avoid:") {
            return Ok(Self::AvoidRegions(RegionWeights::parse(spec, label)?));
        }
        match lower.as_str() {
            "hops" | "shortest" => Ok(Self::Hops),
            "latency" => Ok(Self::Latency),
            "bandwidth" => Ok(Self::Bandwidth),
            "mtu" | "largest_mtu" => Ok(Self::Mtu),
            _ => Err(PolicyError::InvalidPreference {
                label: label.to_string(),
                reason: format!(
                    "unknown criterion {token:?} (available: {})",
                    AVAILABLE_PREFERENCES.join("|")
                ),
            }),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Hops => "hops",
            Self::Latency => "latency",
            Self::Bandwidth => "bandwidth",
            Self::Mtu => "mtu",
            Self::AvoidRegions(_) => "avoid",
        }
    }
}

impl fmt::Display for PreferenceCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AvoidRegions(w) => write!(f, "avoid:{w}"),
            other => write!(f, "{}", other.kind()),
        }
    }
}

/// An ordered list of criteria, most significant first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceOrder(Vec<PreferenceCriterion>);

impl PreferenceOrder {
    /// The neutral ordering used when no preference is given: fewest hops.
    pub fn default_order() -> Self {
        Self(vec![PreferenceCriterion::Hops])
    }

    /// Build an order from criteria. Duplicate kinds are not checked here.
    pub fn from_criteria(criteria: Vec<PreferenceCriterion>) -> Self {
        Self(criteria)
    }

    /// Parse a comma-separated preference label.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidPreference`] for blank labels, empty
    /// tokens, unknown tokens, malformed `avoid:` specs, and criteria that
    /// appear more than once.
    pub fn parse(label: &str) -> Result<Self, PolicyError> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return Err(PolicyError::InvalidPreference {
                label: label.to_string(),
                reason: "no criteria given".to_string(),
            });
        }

        let mut criteria: Vec<PreferenceCriterion> = Vec::new();
        for token in trimmed.split(',') {
            let token = token.trim();
            if token.is_empty() {
                return Err(PolicyError::InvalidPreference {
                    label: label.to_string(),
                    reason: "empty criterion".to_string(),
                });
            }
            let criterion = PreferenceCriterion::parse(token, label)?;
            if criteria.iter().any(|c| c.kind() == criterion.kind()) {
                return Err(PolicyError::InvalidPreference {
                    label: label.to_string(),
                    reason: format!("criterion {} given more than once", criterion.kind()),
                });
            }
            criteria.push(criterion);
        }
        Ok(Self(criteria))
    }

    /// Criteria, most significant first.
    pub fn criteria(&self) -> &[PreferenceCriterion] {
        &self.0
    }

    /// Number of criteria.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no criterion is set (every candidate ties).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PreferenceOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join(","))
    }
}
