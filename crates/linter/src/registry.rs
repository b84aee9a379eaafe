//! Rule registration and effective-rule resolution.

use crate::config::{Profile, RuleOverrides};
use crate::diagnostics::Severity;
use crate::rules::{builtin_rules, LintRule};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("rule '{0}' is already registered")]
    DuplicateRule(String),
    #[error("unknown rule(s) referenced: {}", .0.join(", "))]
    UnknownRules(Vec<String>),
}

/// The set of known rules. Registration order is preserved and is the
/// order rules run in.
pub struct RuleRegistry {
    rules: Vec<Arc<dyn LintRule>>,
    index: HashMap<&'static str, usize>,
}

impl RuleRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// A registry pre-loaded with every built-in rule.
    #[must_use]
    pub fn with_default_rules() -> Self {
        let mut registry = Self::new();
        for rule in builtin_rules() {
            if registry.register(rule).is_err() {
                // Built-in ids are distinct string literals.
                unreachable!("duplicate built-in rule id");
            }
        }
        registry
    }

    /// Register a rule. Ids must be unique; a collision leaves the
    /// registry unchanged.
    pub fn register(&mut self, rule: Arc<dyn LintRule>) -> Result<(), RegistryError> {
        let id = rule.id();
        if self.index.contains_key(id) {
            return Err(RegistryError::DuplicateRule(id.to_string()));
        }
        self.index.insert(id, self.rules.len());
        self.rules.push(rule);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Arc<dyn LintRule>> {
        self.index.get(id).map(|&i| &self.rules[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn LintRule>> {
        self.rules.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All registered ids, sorted.
    #[must_use]
    pub fn all_rule_ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<_> = self.rules.iter().map(|r| r.id()).collect();
        ids.sort_unstable();
        ids
    }

    /// Resolve a profile plus overrides into the concrete rule set for a
    /// run. Precedence per rule: an enable-list entry always wins, a
    /// disable-list entry beats the profile, otherwise the profile
    /// decides. Severity: override remap, else profile remap, else the
    /// rule's default.
    ///
    /// Every rule id mentioned by the profile or the overrides must be
    /// registered; unknown ids fail resolution rather than being ignored.
    pub fn resolve(
        &self,
        profile: &Profile,
        overrides: &RuleOverrides,
    ) -> Result<EffectiveRules, RegistryError> {
        let mut unknown: BTreeSet<String> = BTreeSet::new();
        for id in profile
            .enabled_rules()
            .chain(overrides.mentioned_rules())
        {
            if !self.index.contains_key(id) {
                unknown.insert(id.to_string());
            }
        }
        if !unknown.is_empty() {
            return Err(RegistryError::UnknownRules(unknown.into_iter().collect()));
        }

        let enabled: HashSet<&str> = overrides.enable.iter().map(String::as_str).collect();
        let disabled: HashSet<&str> = overrides.disable.iter().map(String::as_str).collect();

        let mut rules = Vec::new();
        for rule in &self.rules {
            let id = rule.id();
            let on = if enabled.contains(id) {
                true
            } else if disabled.contains(id) {
                false
            } else {
                profile.is_enabled(id)
            };
            if !on {
                continue;
            }
            let severity = overrides
                .severity
                .get(id)
                .copied()
                .or_else(|| profile.severity_override(id))
                .unwrap_or_else(|| rule.default_severity());
            rules.push(EffectiveRule {
                rule: Arc::clone(rule),
                severity,
            });
        }
        Ok(EffectiveRules { rules })
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

/// A rule paired with its severity for this run.
#[derive(Clone)]
pub struct EffectiveRule {
    pub rule: Arc<dyn LintRule>,
    pub severity: Severity,
}

/// The resolved, ordered rule set for one run.
#[derive(Clone, Default)]
pub struct EffectiveRules {
    rules: Vec<EffectiveRule>,
}

impl EffectiveRules {
    pub fn iter(&self) -> impl Iterator<Item = &EffectiveRule> {
        self.rules.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&EffectiveRule> {
        self.rules.iter().find(|e| e.rule.id() == id)
    }

    /// A copy restricted to the given ids, preserving order and
    /// severities. Used to rerun only the rules whose fixes were applied.
    #[must_use]
    pub fn restrict(&self, ids: &HashSet<&str>) -> Self {
        Self {
            rules: self
                .rules
                .iter()
                .filter(|e| ids.contains(e.rule.id()))
                .cloned()
                .collect(),
        }
    }
}
