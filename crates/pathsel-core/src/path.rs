//! # Path Candidates
//!
//! A [`PathCandidate`] is one concrete, distinguishable network path between
//! two endpoints, as reported by an external path-discovery collaborator.
//! It is identified by a stable [`PathFingerprint`], lists the region of
//! each hop in traversal order, and carries whatever [`PathMetrics`] the
//! collaborator measured.
//!
//! Candidates are read-only inputs to the selection engine. A
//! [`CandidateSet`] is a full snapshot; updates replace it wholesale.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::region::RegionId;

/// The current list of candidates visible to a session.
pub type CandidateSet = Vec<PathCandidate>;

// -- Validating Deserialize for PathFingerprint ---------------------------------

impl<'de> Deserialize<'de> for PathFingerprint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

/// Opaque, stable identifier of a path.
///
/// Two candidates with the same fingerprint denote the same path, even if
/// their metrics differ between snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PathFingerprint(String);

impl PathFingerprint {
    /// Create a fingerprint, validating non-emptiness.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyFingerprint`] if the string is empty
    /// or whitespace-only.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let trimmed = value.into().trim().to_string();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyFingerprint);
        }
        Ok(Self(trimmed))
    }

    /// Access the fingerprint string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PathFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Measured or advertised properties of a path.
///
/// Every field is optional: discovery may not know a value. Ranking treats
/// an unknown value as worse than any known one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathMetrics {
    /// Number of hops as counted by discovery. Falls back to the length of
    /// the hop list when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hop_count: Option<u32>,
    /// Estimated one-way latency in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    /// Estimated bottleneck bandwidth in kbit/s.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bandwidth_kbps: Option<u64>,
    /// Path MTU in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u16>,
}

/// One selectable network path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathCandidate {
    /// Stable identity of the path across snapshots.
    pub fingerprint: PathFingerprint,
    /// Region of each hop, in traversal order.
    pub hops: Vec<RegionId>,
    /// Properties reported by discovery.
    #[serde(default)]
    pub metrics: PathMetrics,
}

impl PathCandidate {
    /// Create a candidate with no metrics.
    pub fn new(fingerprint: PathFingerprint, hops: Vec<RegionId>) -> Self {
        Self {
            fingerprint,
            hops,
            metrics: PathMetrics::default(),
        }
    }

    /// Replace the metrics.
    pub fn with_metrics(mut self, metrics: PathMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Set the latency estimate.
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        self.metrics.latency_ms = Some(latency_ms);
        self
    }

    /// Effective hop count used for ranking.
    pub fn hop_count(&self) -> u32 {
        self.metrics
            .hop_count
            .unwrap_or_else(|| u32::try_from(self.hops.len()).unwrap_or(u32::MAX))
    }

    /// Whether any hop lies in `region`.
    pub fn traverses(&self, region: RegionId) -> bool {
        self.hops.contains(&region)
    }
}

impl fmt::Display for PathCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hops: Vec<String> = self.hops.iter().map(ToString::to_string).collect();
        write!(
            f,
            "{} [{}] hops={}",
            self.fingerprint,
            hops.join(">"),
            self.hop_count()
        )?;
        if let Some(latency) = self.metrics.latency_ms {
            write!(f, " latency={latency}ms")?;
        }
        if let Some(bw) = self.metrics.bandwidth_kbps {
            write!(f, " bandwidth={bw}kbps")?;
        }
        if let Some(mtu) = self.metrics.mtu {
            write!(f, " mtu={mtu}")?;
        }
        Ok(())
    }
}
