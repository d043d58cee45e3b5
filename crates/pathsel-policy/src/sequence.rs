//! # Hop Sequence Constraints
//!
//! A sequence constraint is a whitespace-separated list of hop predicates:
//!
//! - `<region>`: some hop lies in that region.
//! - `0` or `*`: some hop, in any region.
//! - `!<region>`: no hop anywhere on the path lies in that region.
//!
//! Positive predicates must be satisfied by an ordered, not necessarily
//! contiguous, subsequence of the path's hops. `"1 * 2"` therefore matches
//! `[1, 3, 3, 2]` and `[1, 4, 2]` but not `[1, 2]` or `[2, 3, 1]`. Exclusions
//! are checked over the whole path regardless of where they appear in the
//! constraint. The empty constraint matches every path.

use std::fmt;
use std::str::FromStr;

use pathsel_core::RegionId;

use crate::error::PolicyError;

/// One token of a [`SequenceConstraint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HopPredicate {
    /// A hop in this region.
    Region(RegionId),
    /// A hop in any region.
    Any,
    /// No hop in this region anywhere on the path.
    Exclude(RegionId),
}

impl HopPredicate {
    fn matches_hop(self, hop: RegionId) -> bool {
        match self {
            Self::Region(r) => r == hop,
            Self::Any => true,
            Self::Exclude(_) => false,
        }
    }
}

impl fmt::Display for HopPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Region(r) => write!(f, "{r}"),
            Self::Any => f.write_str("*"),
            Self::Exclude(r) => write!(f, "!{r}"),
        }
    }
}

/// A parsed hop-sequence constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceConstraint {
    predicates: Vec<HopPredicate>,
}

impl SequenceConstraint {
    /// Parse a constraint string. Blank input yields the empty constraint.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidSequence`] for tokens that are not a
    /// region number, `0`, `*`, or `!<region>` with a non-zero region.
    pub fn parse(sequence: &str) -> Result<Self, PolicyError> {
        let invalid = |reason: String| PolicyError::InvalidSequence {
            sequence: sequence.to_string(),
            reason,
        };

        let mut predicates = Vec::new();
        for token in sequence.split_whitespace() {
            let predicate = if token == "*" || token == "0" {
                HopPredicate::Any
            } else if let Some(rest) = token.strip_prefix('!') {
                let region: RegionId = rest
                    .parse()
                    .map_err(|e| invalid(format!("token {token:?}: {e}")))?;
                HopPredicate::Exclude(region)
            } else {
                let region: RegionId = token
                    .parse()
                    .map_err(|e| invalid(format!("token {token:?}: {e}")))?;
                HopPredicate::Region(region)
            };
            predicates.push(predicate);
        }
        Ok(Self { predicates })
    }

    /// Predicates in the order they were written.
    pub fn predicates(&self) -> &[HopPredicate] {
        &self.predicates
    }

    /// Whether the constraint has no predicates.
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Whether a path with these hop regions satisfies the constraint.
    pub fn matches(&self, hops: &[RegionId]) -> bool {
        let excluded = self.predicates.iter().any(|p| match p {
            HopPredicate::Exclude(r) => hops.contains(r),
            _ => false,
        });
        if excluded {
            return false;
        }

        // Greedy leftmost matching is complete for subsequence containment.
        let mut remaining = hops.iter();
        self.predicates
            .iter()
            .filter(|p| !matches!(p, HopPredicate::Exclude(_)))
            .all(|p| remaining.any(|&hop| p.matches_hop(hop)))
    }
}

impl FromStr for SequenceConstraint {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SequenceConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.predicates.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hops(ids: &[u16]) -> Vec<RegionId> {
        ids.iter().map(|&n| RegionId::new(n).unwrap()).collect()
    }

    #[test]
    fn parses_tokens() {
        let c = SequenceConstraint::parse("1 * 0 !3").unwrap();
        assert_eq!(
            c.predicates(),
            &[
                HopPredicate::Region(RegionId::new(1).unwrap()),
                HopPredicate::Any,
                HopPredicate::Any,
                HopPredicate::Exclude(RegionId::new(3).unwrap()),
            ]
        );
        assert_eq!(c.to_string(), "1 * * !3");
    }

    #[test]
    fn rejects_bad_tokens() {
        for s in ["x", "1 two", "!0", "!", "!*", "-1", "70000"] {
            assert!(
                SequenceConstraint::parse(s).is_err(),
                "sequence {s:?} should be rejected"
            );
        }
    }

    #[test]
    fn blank_is_empty_and_matches_everything() {
        let c = SequenceConstraint::parse("   ").unwrap();
        assert!(c.is_empty());
        assert!(c.matches(&[]));
        assert!(c.matches(&hops(&[1, 2, 3])));
    }

    #[test]
    fn ordered_subsequence() {
        let c = SequenceConstraint::parse("1 * 2").unwrap();
        assert!(c.matches(&hops(&[1, 3, 3, 2])));
        assert!(c.matches(&hops(&[1, 4, 2])));
        assert!(!c.matches(&hops(&[1, 2])));
        assert!(!c.matches(&hops(&[2, 3, 1])));
    }

    #[test]
    fn exclusion_applies_anywhere() {
        let c = SequenceConstraint::parse("!3 1").unwrap();
        assert!(c.matches(&hops(&[1, 2])));
        assert!(!c.matches(&hops(&[1, 3])));
        assert!(!c.matches(&hops(&[3, 1])));
    }

    #[test]
    fn wildcard_needs_a_hop() {
        let c = SequenceConstraint::parse("*").unwrap();
        assert!(!c.matches(&[]));
        assert!(c.matches(&hops(&[7])));
    }

    proptest! {
        #[test]
        fn path_matches_its_own_sequence(ids in prop::collection::vec(1u16..8, 0..8)) {
            let text = ids.iter().map(u16::to_string).collect::<Vec<_>>().join(" ");
            let c = SequenceConstraint::parse(&text).unwrap();
            prop_assert!(c.matches(&hops(&ids)));
        }

        #[test]
        fn excluded_region_never_matches(
            ids in prop::collection::vec(1u16..8, 1..8),
            pick in any::<prop::sample::Index>(),
        ) {
            let banned = ids[pick.index(ids.len())];
            let c = SequenceConstraint::parse(&format!("!{banned}")).unwrap();
            prop_assert!(!c.matches(&hops(&ids)));
        }
    }
}
