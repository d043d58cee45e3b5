//! # Rule Store
//!
//! [`RuleStore`] is one immutable snapshot of named rules, built by a single
//! load and then only read. Construct it once per process and pass it by
//! reference; there is deliberately no global instance, so tests substitute
//! a fixture store with [`RuleStore::from_rules`].
//!
//! ## Duplicate names
//!
//! Rule names are unique within a store. When the document repeats a name
//! (within one application or across applications) the first occurrence in
//! document order wins and each later duplicate is skipped with a warning.

use std::collections::HashMap;
use std::time::Duration;

use crate::document::RuleDocument;
use crate::error::RuleError;
use crate::rule::Rule;
use crate::source::RuleSource;

/// Default deadline for fetching a rule document.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Options for [`RuleStore::load`].
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Only load rules of this application. All applications when `None`.
    pub app: Option<String>,
    /// Deadline for the whole fetch.
    pub timeout: Duration,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            app: None,
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

/// Immutable snapshot of named rules.
#[derive(Debug, Clone, Default)]
pub struct RuleStore {
    rules: Vec<Rule>,
    index: HashMap<String, usize>,
    origin: Option<String>,
}

impl RuleStore {
    /// A store with no rules.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a store from rules already in memory.
    pub fn from_rules(rules: impl IntoIterator<Item = Rule>) -> Self {
        let mut store = Self::empty();
        for rule in rules {
            store.push(rule);
        }
        store
    }

    /// Fetch a rule document from `source` and build a store from it.
    ///
    /// The fetch is abandoned once `options.timeout` elapses.
    ///
    /// # Errors
    ///
    /// - [`RuleError::Timeout`] if the deadline elapses.
    /// - Any fetch-class error raised by the source.
    /// - Any parse-class error from [`RuleStore::from_document_bytes`].
    pub async fn load<S: RuleSource>(source: &S, options: &LoadOptions) -> Result<Self, RuleError> {
        let origin = source.origin();
        let bytes = tokio::time::timeout(options.timeout, source.fetch())
            .await
            .map_err(|_| RuleError::Timeout {
                origin: origin.clone(),
                timeout: options.timeout,
            })??;

        let store = Self::from_document_bytes(&bytes, &origin, options.app.as_deref())?;
        tracing::info!(
            origin = %origin,
            app = options.app.as_deref().unwrap_or("*"),
            rules = store.len(),
            "loaded rule set"
        );
        Ok(store)
    }

    /// Parse a rule document and build a store from it. No I/O.
    ///
    /// # Errors
    ///
    /// - [`RuleError::Parse`] for malformed documents.
    /// - [`RuleError::UnknownApp`] if `app` names no application.
    /// - [`RuleError::InvalidRule`] for a blank rule name.
    pub fn from_document_bytes(
        bytes: &[u8],
        origin: &str,
        app: Option<&str>,
    ) -> Result<Self, RuleError> {
        let doc = RuleDocument::parse(bytes, origin)?;

        let apps: Vec<_> = match app {
            Some(name) => vec![doc.app(name).ok_or_else(|| RuleError::UnknownApp {
                origin: origin.to_string(),
                app: name.to_string(),
            })?],
            None => doc.apps.iter().collect(),
        };

        let mut store = Self {
            origin: Some(origin.to_string()),
            ..Self::default()
        };
        for app in apps {
            for entry in &app.rules {
                let name = entry.name.trim();
                if name.is_empty() {
                    return Err(RuleError::InvalidRule {
                        origin: origin.to_string(),
                        rule: entry.name.clone(),
                        reason: format!("rule name in app {:?} is blank", app.name),
                    });
                }
                store.push(Rule::new(
                    name,
                    entry.permitted_regions.clone(),
                    entry.preference.trim(),
                ));
            }
        }
        Ok(store)
    }

    fn push(&mut self, rule: Rule) {
        if self.index.contains_key(rule.name()) {
            tracing::warn!(
                rule = rule.name(),
                "duplicate rule name; keeping the first definition"
            );
            return;
        }
        self.index.insert(rule.name().to_string(), self.rules.len());
        self.rules.push(rule);
    }

    /// Look up a rule by name.
    pub fn by_name(&self, name: &str) -> Option<&Rule> {
        self.index.get(name).map(|&i| &self.rules[i])
    }

    /// Rule names in load order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(Rule::name)
    }

    /// All rules in load order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the store holds no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Where the rules were loaded from, if they came from a document.
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticRuleSource;
    use pathsel_core::{RegionId, RegionSet};

    const DOC: &str = r#"
apps:
  - name: hello
    rules:
      - name: fast
        permitted_regions: [1, 2]
        preference: latency
      - name: short
        preference: hops
  - name: other
    rules:
      - name: fast
        permitted_regions: [9]
        preference: bandwidth
      - name: wide
        preference: bandwidth
"#;

    fn regions(ids: &[u16]) -> RegionSet {
        ids.iter().map(|&n| RegionId::new(n).unwrap()).collect()
    }

    /// Never completes within any test timeout.
    struct StalledSource;

    impl RuleSource for StalledSource {
        fn origin(&self) -> String {
            "stalled".to_string()
        }

        async fn fetch(&self) -> Result<Vec<u8>, RuleError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Vec::new())
        }
    }

    #[test]
    fn builds_from_document() {
        let store = RuleStore::from_document_bytes(DOC.as_bytes(), "mem", None).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.names().collect::<Vec<_>>(), ["fast", "short", "wide"]);
        assert_eq!(store.origin(), Some("mem"));
    }

    #[test]
    fn duplicate_name_keeps_first() {
        let store = RuleStore::from_document_bytes(DOC.as_bytes(), "mem", None).unwrap();
        let fast = store.by_name("fast").unwrap();
        assert_eq!(fast.permitted_regions(), &regions(&[1, 2]));
        assert_eq!(fast.preference_label(), "latency");
    }

    #[test]
    fn app_filter_limits_rules() {
        let store = RuleStore::from_document_bytes(DOC.as_bytes(), "mem", Some("other")).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(
            store.by_name("fast").unwrap().permitted_regions(),
            &regions(&[9])
        );
        assert!(store.by_name("short").is_none());
    }

    #[test]
    fn unknown_app_is_error() {
        let err = RuleStore::from_document_bytes(DOC.as_bytes(), "mem", Some("nope")).unwrap_err();
        assert!(matches!(err, RuleError::UnknownApp { .. }));
    }

    #[test]
    fn blank_rule_name_is_error() {
        let doc = "apps:\n  - name: a\n    rules:\n      - name: '  '\n";
        let err = RuleStore::from_document_bytes(doc.as_bytes(), "mem", None).unwrap_err();
        assert!(matches!(err, RuleError::InvalidRule { .. }));
    }

    #[test]
    fn by_name_misses_return_none() {
        let store = RuleStore::from_rules([Rule::new("a", RegionSet::unrestricted(), "hops")]);
        assert!(store.by_name("a").is_some());
        assert!(store.by_name("b").is_none());
        assert!(RuleStore::empty().is_empty());
    }

    #[tokio::test]
    async fn load_from_static_source() {
        let src = StaticRuleSource::new("mem", DOC);
        let store = RuleStore::load(&src, &LoadOptions::default()).await.unwrap();
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn load_propagates_parse_error() {
        let src = StaticRuleSource::new("mem", "apps: {not: a list}");
        let err = RuleStore::load(&src, &LoadOptions::default()).await.unwrap_err();
        assert!(err.is_parse());
    }

    #[tokio::test]
    async fn load_times_out() {
        let options = LoadOptions {
            app: None,
            timeout: Duration::from_millis(20),
        };
        let err = RuleStore::load(&StalledSource, &options).await.unwrap_err();
        assert!(matches!(err, RuleError::Timeout { .. }));
    }
}
