//! The matching engine: runs effective rules over parsed documents.
//!
//! Rules are untrusted in one specific sense: a panic inside a rule must
//! not take the run down. Each rule invocation is isolated; a panicking
//! rule is disabled for the remainder of that document and the failure
//! surfaces as a single internal-error finding.

use crate::diagnostics::{Finding, FindingKind, Severity};
use crate::registry::EffectiveRules;
use playlint_resolver::ReferenceResolver;
use playlint_syntax::{Document, Span};
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;
use tracing::{debug, warn};

/// Result of one engine pass.
#[derive(Debug)]
pub struct RunOutcome {
    pub findings: Vec<Finding>,
    /// Documents fully processed before the deadline (all of them when no
    /// deadline was given or it never fired).
    pub processed: usize,
    pub deadline_exceeded: bool,
}

/// Documents are processed in order on the calling thread. The engine
/// borrows only shared read-only state, so callers wanting parallelism
/// shard the document list across threads and concatenate the outcomes.
pub struct MatchingEngine<'a> {
    rules: &'a EffectiveRules,
    resolver: &'a dyn ReferenceResolver,
}

impl<'a> MatchingEngine<'a> {
    #[must_use]
    pub fn new(rules: &'a EffectiveRules, resolver: &'a dyn ReferenceResolver) -> Self {
        Self { rules, resolver }
    }

    #[must_use]
    pub fn run(&self, documents: &[Document]) -> RunOutcome {
        self.run_with_deadline(documents, None)
    }

    /// Run with a cooperative deadline, checked between documents. Findings
    /// for fully-processed documents are kept; the outcome records how far
    /// the pass got.
    #[must_use]
    #[tracing::instrument(skip_all, fields(documents = documents.len()))]
    pub fn run_with_deadline(
        &self,
        documents: &[Document],
        deadline: Option<Instant>,
    ) -> RunOutcome {
        let mut findings = Vec::new();
        let mut processed = 0;
        for doc in documents {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                warn!(processed, total = documents.len(), "deadline hit, stopping early");
                return RunOutcome {
                    findings,
                    processed,
                    deadline_exceeded: true,
                };
            }
            self.run_document(doc, &mut findings);
            processed += 1;
        }
        RunOutcome {
            findings,
            processed,
            deadline_exceeded: false,
        }
    }

    fn run_document(&self, doc: &Document, findings: &mut Vec<Finding>) {
        debug!(file = %doc.path().display(), revision = doc.revision(), "matching document");
        // Rules that panicked on this document; skipped for its remainder.
        let mut failed: HashSet<&str> = HashSet::new();

        for node in doc.nodes() {
            for effective in self.rules.iter() {
                let rule = &effective.rule;
                if failed.contains(rule.id()) {
                    continue;
                }
                // The applicability predicate is rule code too; it runs
                // inside the same guard as the check itself.
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    if rule.applicable(node) {
                        rule.evaluate(node, doc, self.resolver)
                    } else {
                        Vec::new()
                    }
                }));
                match outcome {
                    Ok(batch) => {
                        findings.extend(with_severity(batch, effective.severity));
                    }
                    Err(payload) => {
                        failed.insert(rule.id());
                        findings.push(internal_error(rule.id(), doc, payload.as_ref()));
                    }
                }
            }
        }

        for effective in self.rules.iter() {
            let rule = &effective.rule;
            if failed.contains(rule.id()) {
                continue;
            }
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                rule.check_document(doc, self.resolver)
            }));
            match outcome {
                Ok(batch) => {
                    findings.extend(with_severity(batch, effective.severity));
                }
                Err(payload) => {
                    failed.insert(rule.id());
                    findings.push(internal_error(rule.id(), doc, payload.as_ref()));
                }
            }
        }
    }
}

fn with_severity(
    batch: Vec<Finding>,
    severity: Severity,
) -> impl Iterator<Item = Finding> {
    batch.into_iter().map(move |mut finding| {
        finding.severity = severity;
        finding
    })
}

fn internal_error(rule: &str, doc: &Document, payload: &(dyn std::any::Any + Send)) -> Finding {
    let reason = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    warn!(rule, file = %doc.path().display(), reason, "rule failed, disabling for document");
    Finding::new(
        rule,
        doc.path(),
        Span::default(),
        Severity::Error,
        format!("rule '{rule}' failed on this document and was disabled: {reason}"),
    )
    .with_kind(FindingKind::InternalError)
}
