//! Rule-based static analysis for YAML automation playbooks.
//!
//! The pipeline is: parse sources into [`Document`]s, resolve a
//! [`Profile`] plus [`RuleOverrides`] against the [`RuleRegistry`], run
//! the matching engine, apply suppressions, then dedup and sort. The
//! optional transform pass applies rule fixes, reparses, and verifies
//! each fix against a rerun before reporting it as resolved.
//!
//! [`Linter`] wires the stages together for the common case:
//!
//! ```
//! use playlint_linter::{Linter, Profile};
//! use playlint_syntax::Document;
//!
//! let doc = Document::parse("site.yml", "- ping:\n").unwrap();
//! let linter = Linter::new(Profile::basic());
//! let report = linter.run(&[doc]).unwrap();
//! assert!(report.findings.iter().any(|f| f.rule == "name_missing"));
//! ```

pub mod aggregate;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod playbook;
pub mod registry;
pub mod rules;
pub mod suppression;
pub mod transform;

pub use config::{Profile, RuleOverrides, SuppressionAction, SuppressionConfig};
pub use diagnostics::{Finding, FindingKey, FindingKind, Fix, Severity, TextEdit};
pub use engine::{MatchingEngine, RunOutcome};
pub use registry::{EffectiveRule, EffectiveRules, RegistryError, RuleRegistry};
pub use rules::{builtin_rules, LintRule};
pub use transform::{TransformEngine, TransformOutcome};

use playlint_resolver::{ReferenceResolver, StaticResolver};
use playlint_syntax::{Document, ParseError, Position, Span};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Pseudo rule id carried by parse-failure findings.
pub const LOAD_FAILURE: &str = "load_failure";

/// Parse sources, converting each failure into a finding instead of
/// aborting the run. Unparseable documents are simply absent from the
/// returned list.
#[must_use]
pub fn load_documents(sources: &[(&str, &str)]) -> (Vec<Document>, Vec<Finding>) {
    let mut documents = Vec::with_capacity(sources.len());
    let mut failures = Vec::new();
    for (path, text) in sources {
        match Document::parse(*path, *text) {
            Ok(doc) => documents.push(doc),
            Err(err) => failures.push(parse_failure(path, &err)),
        }
    }
    (documents, failures)
}

fn parse_failure(path: &str, err: &ParseError) -> Finding {
    let position = Position {
        line: err.line(),
        column: 0,
        offset: 0,
    };
    Finding::new(
        LOAD_FAILURE,
        path,
        Span::new(position, position),
        Severity::Error,
        err.to_string(),
    )
    .with_kind(FindingKind::ParseFailure)
}

/// One finished analysis pass.
#[derive(Debug)]
pub struct LintReport {
    /// Deduplicated findings in report order.
    pub findings: Vec<Finding>,
    /// Documents fully processed before any deadline.
    pub processed: usize,
    pub deadline_exceeded: bool,
}

impl LintReport {
    /// Whether any surviving finding is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Error)
    }
}

/// A [`LintReport`] plus the outcome of the fix pass that produced it.
#[derive(Debug)]
pub struct FixReport {
    pub report: LintReport,
    /// The documents after fixing; render them to persist the changes.
    pub documents: Vec<Document>,
    pub resolved: Vec<FindingKey>,
    pub unresolved: Vec<FindingKey>,
}

/// Configured front door for the whole pipeline.
pub struct Linter {
    registry: RuleRegistry,
    profile: Profile,
    overrides: RuleOverrides,
    suppressions: SuppressionConfig,
    resolver: Arc<dyn ReferenceResolver>,
    timeout: Option<Duration>,
}

impl Linter {
    #[must_use]
    pub fn new(profile: Profile) -> Self {
        Self {
            registry: RuleRegistry::with_default_rules(),
            profile,
            overrides: RuleOverrides::default(),
            suppressions: SuppressionConfig::default(),
            resolver: Arc::new(StaticResolver::builtin()),
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_registry(mut self, registry: RuleRegistry) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: RuleOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    #[must_use]
    pub fn with_suppressions(mut self, suppressions: SuppressionConfig) -> Self {
        self.suppressions = suppressions;
        self
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn ReferenceResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Bound the matching pass; checked between documents.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Match, suppress, dedup, sort.
    pub fn run(&self, documents: &[Document]) -> Result<LintReport, RegistryError> {
        let rules = self.registry.resolve(&self.profile, &self.overrides)?;
        info!(profile = self.profile.name(), rules = rules.len(), documents = documents.len(), "starting run");
        let deadline = self.timeout.map(|t| Instant::now() + t);
        let engine = MatchingEngine::new(&rules, self.resolver.as_ref());
        let outcome = engine.run_with_deadline(documents, deadline);
        let findings = suppression::apply(outcome.findings, documents, &self.suppressions);
        Ok(LintReport {
            findings: aggregate::assemble(findings),
            processed: outcome.processed,
            deadline_exceeded: outcome.deadline_exceeded,
        })
    }

    /// Fix what can be fixed, then report on the fixed documents.
    ///
    /// Suppressions are honored before fixing: a suppressed finding is
    /// never "resolved" by edit.
    pub fn run_with_fixes(&self, documents: Vec<Document>) -> Result<FixReport, RegistryError> {
        let rules = self.registry.resolve(&self.profile, &self.overrides)?;
        let engine = MatchingEngine::new(&rules, self.resolver.as_ref());
        let matched = engine.run(&documents).findings;
        let candidates = suppression::apply(matched, &documents, &self.suppressions);
        let transform = TransformEngine::new(&rules, self.resolver.as_ref());
        let outcome = transform.apply(documents, &candidates);
        let report = self.run(&outcome.documents)?;
        Ok(FixReport {
            report,
            documents: outcome.documents,
            resolved: outcome.resolved,
            unresolved: outcome.unresolved,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_documents_converts_failures_to_findings() {
        let (documents, failures) = load_documents(&[
            ("good.yml", "- name: ok\n  ping:\n"),
            ("bad.yml", "key: [unclosed\n"),
        ]);
        assert_eq!(documents.len(), 1);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].rule, LOAD_FAILURE);
        assert_eq!(failures[0].kind, FindingKind::ParseFailure);
        assert_eq!(failures[0].severity, Severity::Error);
    }

    #[test]
    fn linter_end_to_end() {
        let (documents, _) = load_documents(&[("site.yml", "- ping:\n- ping:\n")]);
        let report = Linter::new(Profile::basic()).run(&documents).unwrap();
        assert!(!report.has_errors());
        let rules: Vec<_> = report.findings.iter().map(|f| f.rule.as_str()).collect();
        assert_eq!(rules, vec!["name_missing", "name_missing"]);
        assert_eq!(report.processed, 1);
    }

    #[test]
    fn run_with_fixes_reports_on_the_new_revision() {
        let (documents, _) = load_documents(&[("site.yml", "- name: a\n  apt:\n    update_cache: yes\n")]);
        let fixed = Linter::new(Profile::basic()).run_with_fixes(documents).unwrap();
        assert_eq!(fixed.resolved.len(), 1);
        assert!(fixed.report.findings.is_empty());
        assert!(fixed.documents[0].render().contains("update_cache: true"));
    }
}
