//! Profiles, rule overrides, and the suppression configuration.
//!
//! These are immutable input values supplied once per run; config *file*
//! discovery belongs to the caller.

use crate::diagnostics::Severity;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

/// A named baseline of enabled rules and default severities.
///
/// Built-in profiles form a ladder: `min` ⊂ `basic` ⊂ `production`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    name: String,
    enabled: BTreeSet<String>,
    severities: BTreeMap<String, Severity>,
}

impl Profile {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: BTreeSet::new(),
            severities: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn enable(mut self, rule: impl Into<String>) -> Self {
        self.enabled.insert(rule.into());
        self
    }

    #[must_use]
    pub fn severity(mut self, rule: impl Into<String>, severity: Severity) -> Self {
        self.severities.insert(rule.into(), severity);
        self
    }

    #[must_use]
    pub fn is_enabled(&self, rule: &str) -> bool {
        self.enabled.contains(rule)
    }

    #[must_use]
    pub fn severity_override(&self, rule: &str) -> Option<Severity> {
        self.severities.get(rule).copied()
    }

    #[must_use]
    pub fn enabled_rules(&self) -> impl Iterator<Item = &str> {
        self.enabled.iter().map(String::as_str)
    }

    /// Correctness checks only: references that will not run.
    #[must_use]
    pub fn min() -> Self {
        Self::new("min")
            .enable("unknown_module")
            .enable("required_argument")
    }

    /// `min` plus the idiom checks most teams want on by default.
    #[must_use]
    pub fn basic() -> Self {
        Self::min()
            .with_name("basic")
            .enable("name_missing")
            .enable("truthy_value")
            .enable("deprecated_local_action")
            .enable("deprecated_module")
            .enable("handler_undefined")
    }

    /// Everything, with naming violations promoted to errors.
    #[must_use]
    pub fn production() -> Self {
        Self::basic()
            .with_name("production")
            .enable("name_duplicate")
            .enable("unknown_parameter")
            .enable("command_instead_of_shell")
            .severity("name_missing", Severity::Error)
    }

    /// Look up a built-in profile by name.
    #[must_use]
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "min" => Some(Self::min()),
            "basic" => Some(Self::basic()),
            "production" => Some(Self::production()),
            _ => None,
        }
    }

    #[must_use]
    fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }
}

/// Explicit per-run enable/disable lists and severity remaps.
///
/// Resolution order (total, proven by property test): profile base set,
/// then enable-list (always wins), then disable-list (wins over profile,
/// loses to enable), then severity overrides.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleOverrides {
    #[serde(default)]
    pub enable: Vec<String>,
    #[serde(default)]
    pub disable: Vec<String>,
    #[serde(default)]
    pub severity: BTreeMap<String, Severity>,
}

impl RuleOverrides {
    /// All rule ids this override set mentions, for validation.
    #[must_use]
    pub fn mentioned_rules(&self) -> BTreeSet<&str> {
        self.enable
            .iter()
            .chain(self.disable.iter())
            .map(String::as_str)
            .chain(self.severity.keys().map(String::as_str))
            .collect()
    }
}

/// Whether a list entry drops a finding or merely demotes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuppressionAction {
    /// Drop the finding entirely.
    Skip,
    /// Demote the finding to the lowest advisory severity.
    Warn,
}

/// Path-scoped skip/warn lists: path pattern → rule id → action.
///
/// Patterns are glob-style and matched against the document path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SuppressionConfig {
    pub paths: BTreeMap<String, BTreeMap<String, SuppressionAction>>,
}

impl SuppressionConfig {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
