//! # Region Identifiers & Permission Sets
//!
//! A region is an administrative or topological division of the network
//! (an isolation domain). Every hop of a path belongs to exactly one region,
//! and rules restrict which regions a path may traverse.
//!
//! ## Validation
//!
//! [`RegionId`] is a non-zero 16-bit number. Zero is reserved as the
//! wildcard in hop-sequence predicates and is rejected here so that a
//! wildcard can never leak into a permission set.
//!
//! [`RegionSet`] is always valid; the empty set means *unrestricted*.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

// -- Validating Deserialize for RegionId ---------------------------------------

impl<'de> Deserialize<'de> for RegionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = u16::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

/// A region identifier, e.g. the ISD number `1` or `17`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RegionId(u16);

impl RegionId {
    /// Create a region identifier, rejecting the reserved wildcard value.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ReservedRegionId`] for `0`.
    pub fn new(value: u16) -> Result<Self, ValidationError> {
        if value == 0 {
            return Err(ValidationError::ReservedRegionId);
        }
        Ok(Self(value))
    }

    /// Access the numeric region identifier.
    pub fn get(self) -> u16 {
        self.0
    }
}

impl FromStr for RegionId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value: u16 = trimmed
            .parse()
            .map_err(|_| ValidationError::InvalidRegionId(trimmed.to_string()))?;
        Self::new(value)
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A set of permitted regions.
///
/// An empty set means "no restriction", never "reject everything". Use
/// [`RegionSet::permits`] and [`RegionSet::permits_all`] rather than checking
/// membership directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionSet(BTreeSet<RegionId>);

impl RegionSet {
    /// The unrestricted set.
    pub fn unrestricted() -> Self {
        Self(BTreeSet::new())
    }

    /// Whether this set places no restriction on regions.
    pub fn is_unrestricted(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether a path may traverse `region`.
    pub fn permits(&self, region: RegionId) -> bool {
        self.0.is_empty() || self.0.contains(&region)
    }

    /// Whether every region in `hops` is permitted.
    pub fn permits_all<'a>(&self, hops: impl IntoIterator<Item = &'a RegionId>) -> bool {
        if self.0.is_empty() {
            return true;
        }
        hops.into_iter().all(|r| self.0.contains(r))
    }

    /// Add a region to the set. Returns `false` if it was already present.
    pub fn insert(&mut self, region: RegionId) -> bool {
        self.0.insert(region)
    }

    /// Explicit membership (ignores the unrestricted rule).
    pub fn contains(&self, region: RegionId) -> bool {
        self.0.contains(&region)
    }

    /// Number of explicitly listed regions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no region is explicitly listed. Equivalent to
    /// [`RegionSet::is_unrestricted`].
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate the listed regions in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = RegionId> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<RegionId> for RegionSet {
    fn from_iter<I: IntoIterator<Item = RegionId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for RegionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "*");
        }
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{{{}}}", parts.join(","))
    }
}
