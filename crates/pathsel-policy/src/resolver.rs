//! # Policy Resolution
//!
//! [`PolicyResolver`] turns a [`PolicyIntent`] into a [`Policy`]:
//!
//! 1. A rule name together with an explicit preference is rejected before
//!    anything else is looked at.
//! 2. A rule name takes the rule's permitted regions and preference label.
//!    A rule with a blank label ranks by the default ordering.
//! 3. An explicit preference is unrestricted by region.
//! 4. With neither, the default ordering applies with no region restriction.
//! 5. A non-blank sequence is parsed and combined with the above.
//!
//! Blank strings count as absent throughout.

use pathsel_core::RegionSet;
use pathsel_rules::RuleStore;

use crate::criteria::PreferenceOrder;
use crate::error::PolicyError;
use crate::policy::{Policy, PolicyOrigin};
use crate::sequence::SequenceConstraint;

/// What the user asked for, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyIntent {
    pub rule: Option<String>,
    pub preference: Option<String>,
    pub sequence: Option<String>,
    pub interactive: bool,
}

impl PolicyIntent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    pub fn with_preference(mut self, preference: impl Into<String>) -> Self {
        self.preference = Some(preference.into());
        self
    }

    pub fn with_sequence(mut self, sequence: impl Into<String>) -> Self {
        self.sequence = Some(sequence.into());
        self
    }

    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Resolves intent against a loaded rule store. Performs no I/O.
#[derive(Debug, Clone, Copy)]
pub struct PolicyResolver<'a> {
    rules: &'a RuleStore,
}

impl<'a> PolicyResolver<'a> {
    pub fn new(rules: &'a RuleStore) -> Self {
        Self { rules }
    }

    /// Resolve `intent` into a policy.
    ///
    /// # Errors
    ///
    /// - [`PolicyError::Config`] when both a rule and a preference are given.
    /// - [`PolicyError::UnknownRule`] when the rule is not in the store.
    /// - [`PolicyError::InvalidPreference`] for an unparseable label, whether
    ///   explicit or taken from the rule.
    /// - [`PolicyError::InvalidSequence`] for an unparseable sequence.
    pub fn resolve(&self, intent: &PolicyIntent) -> Result<Policy, PolicyError> {
        let rule = non_blank(&intent.rule);
        let preference = non_blank(&intent.preference);

        let policy = match (rule, preference) {
            (Some(rule), Some(preference)) => {
                return Err(PolicyError::Config {
                    rule: rule.to_string(),
                    preference: preference.to_string(),
                });
            }
            (Some(name), None) => {
                let rule = self.rules.by_name(name).ok_or_else(|| PolicyError::UnknownRule {
                    name: name.to_string(),
                    available: self.available(),
                })?;
                let label = rule.preference_label().trim();
                let order = if label.is_empty() {
                    PreferenceOrder::default_order()
                } else {
                    PreferenceOrder::parse(label)?
                };
                Policy::new(
                    PolicyOrigin::Rule(rule.name().to_string()),
                    order,
                    rule.permitted_regions().clone(),
                )
            }
            (None, Some(preference)) => Policy::new(
                PolicyOrigin::Explicit,
                PreferenceOrder::parse(preference)?,
                RegionSet::unrestricted(),
            ),
            (None, None) => Policy::unrestricted(),
        };

        let policy = match non_blank(&intent.sequence) {
            Some(seq) => policy.with_sequence(SequenceConstraint::parse(seq)?),
            None => policy,
        }
        .with_interactive(intent.interactive);

        tracing::debug!(policy = %policy, "resolved policy");
        Ok(policy)
    }

    fn available(&self) -> String {
        if self.rules.is_empty() {
            return "none loaded".to_string();
        }
        self.rules.names().collect::<Vec<_>>().join(", ")
    }
}
