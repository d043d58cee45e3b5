//! The [`Rule`] value held by a [`crate::RuleStore`].

use pathsel_core::RegionSet;

/// A named region permission set with a preference label.
///
/// Immutable once loaded. The preference label is kept verbatim here; it is
/// interpreted when a policy is resolved from the rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    name: String,
    permitted_regions: RegionSet,
    preference_label: String,
}

impl Rule {
    /// Create a rule.
    pub fn new(
        name: impl Into<String>,
        permitted_regions: RegionSet,
        preference_label: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            permitted_regions,
            preference_label: preference_label.into(),
        }
    }

    /// The unique rule name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Regions a path governed by this rule may traverse. Empty means
    /// unrestricted.
    pub fn permitted_regions(&self) -> &RegionSet {
        &self.permitted_regions
    }

    /// The raw preference label, e.g. `"latency"` or `"hops,latency"`.
    pub fn preference_label(&self) -> &str {
        &self.preference_label
    }
}
