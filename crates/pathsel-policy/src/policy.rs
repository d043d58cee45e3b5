//! The resolved [`Policy`].

use std::fmt;

use pathsel_core::RegionSet;

use crate::criteria::PreferenceOrder;
use crate::sequence::SequenceConstraint;

/// Where a policy's preference came from.
///
/// A policy carries either a named rule's preference or an explicit one,
/// never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyOrigin {
    /// Resolved from the named rule.
    Rule(String),
    /// Resolved from an explicit preference label.
    Explicit,
    /// Neither was given; default ordering.
    Default,
}

impl fmt::Display for PolicyOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rule(name) => write!(f, "rule {name}"),
            Self::Explicit => f.write_str("explicit"),
            Self::Default => f.write_str("default"),
        }
    }
}

/// A concrete filtering and ranking procedure. Built once per session and
/// immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    origin: PolicyOrigin,
    preference_order: PreferenceOrder,
    permitted_regions: RegionSet,
    sequence: Option<SequenceConstraint>,
    interactive: bool,
}

impl Policy {
    /// Create a non-interactive policy without a sequence constraint.
    pub fn new(
        origin: PolicyOrigin,
        preference_order: PreferenceOrder,
        permitted_regions: RegionSet,
    ) -> Self {
        Self {
            origin,
            preference_order,
            permitted_regions,
            sequence: None,
            interactive: false,
        }
    }

    /// Unrestricted regions, default ordering.
    pub fn unrestricted() -> Self {
        Self::new(
            PolicyOrigin::Default,
            PreferenceOrder::default_order(),
            RegionSet::unrestricted(),
        )
    }

    /// Attach a sequence constraint. An empty constraint is dropped.
    pub fn with_sequence(mut self, sequence: SequenceConstraint) -> Self {
        self.sequence = (!sequence.is_empty()).then_some(sequence);
        self
    }

    /// Mark the policy as requiring a manual choice on initial selection.
    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn origin(&self) -> &PolicyOrigin {
        &self.origin
    }

    pub fn preference_order(&self) -> &PreferenceOrder {
        &self.preference_order
    }

    pub fn permitted_regions(&self) -> &RegionSet {
        &self.permitted_regions
    }

    pub fn sequence(&self) -> Option<&SequenceConstraint> {
        self.sequence.as_ref()
    }

    pub fn interactive(&self) -> bool {
        self.interactive
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} prefer={} regions={}",
            self.origin, self.preference_order, self.permitted_regions
        )?;
        if let Some(seq) = &self.sequence {
            write!(f, " sequence=\"{seq}\"")?;
        }
        if self.interactive {
            f.write_str(" interactive")?;
        }
        Ok(())
    }
}
