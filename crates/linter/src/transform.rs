//! The transform engine: applies rule fixes and verifies they resolve
//! what they claim to.
//!
//! Fixes are text edits against a document's current source. A batch of
//! accepted fixes is applied right-to-left, the result is reparsed, and
//! the fixed rules are rerun on the new revision. A fix whose finding is
//! still reported afterwards is reverted and the batch retried, so the
//! engine never reports a violation as resolved while it still fires.

use crate::diagnostics::{Finding, FindingKey, FindingKind, Fix};
use crate::engine::MatchingEngine;
use crate::registry::EffectiveRules;
use playlint_resolver::ReferenceResolver;
use playlint_syntax::Document;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// Result of one transform pass over a set of documents.
#[derive(Debug)]
pub struct TransformOutcome {
    /// The documents after fixing; unedited ones are passed through.
    pub documents: Vec<Document>,
    /// Findings whose fixes were applied and verified gone.
    pub resolved: Vec<FindingKey>,
    /// Fixable findings that could not be resolved: no fix produced,
    /// incoherent or conflicting edits, reparse failure, or the finding
    /// survived its own fix.
    pub unresolved: Vec<FindingKey>,
}

pub struct TransformEngine<'a> {
    rules: &'a EffectiveRules,
    resolver: &'a dyn ReferenceResolver,
}

struct Candidate {
    key: FindingKey,
    rule: String,
    fix: Fix,
}

impl<'a> TransformEngine<'a> {
    #[must_use]
    pub fn new(rules: &'a EffectiveRules, resolver: &'a dyn ReferenceResolver) -> Self {
        Self { rules, resolver }
    }

    /// Fix every fixable finding it can, one document at a time.
    #[must_use]
    #[tracing::instrument(skip_all, fields(documents = documents.len()))]
    pub fn apply(&self, documents: Vec<Document>, findings: &[Finding]) -> TransformOutcome {
        let mut outcome = TransformOutcome {
            documents: Vec::with_capacity(documents.len()),
            resolved: Vec::new(),
            unresolved: Vec::new(),
        };
        for doc in documents {
            let doc_findings: Vec<&Finding> = findings
                .iter()
                .filter(|f| f.kind == FindingKind::Violation && f.file == doc.path())
                .collect();
            let fixed = self.fix_document(doc, &doc_findings, &mut outcome);
            outcome.documents.push(fixed);
        }
        outcome
    }

    fn fix_document(
        &self,
        doc: Document,
        findings: &[&Finding],
        outcome: &mut TransformOutcome,
    ) -> Document {
        let mut accepted: Vec<Candidate> = Vec::new();
        for &finding in findings {
            let Some(effective) = self.rules.get(&finding.rule) else {
                continue;
            };
            if !effective.rule.supports_fix() {
                continue;
            }
            // The fix generator is rule code and gets the same isolation
            // as the matching passes.
            let generated = panic::catch_unwind(AssertUnwindSafe(|| {
                effective.rule.fix(finding, &doc)
            }));
            let fix = match generated {
                Ok(Some(fix)) => fix,
                Ok(None) => {
                    outcome.unresolved.push(finding.key());
                    continue;
                }
                Err(_) => {
                    warn!(rule = %finding.rule, "fix generator panicked, skipping its finding");
                    outcome.unresolved.push(finding.key());
                    continue;
                }
            };
            if !fix.is_coherent() || !edits_in_bounds(&fix, doc.render()) {
                warn!(rule = %finding.rule, "rejecting malformed fix");
                outcome.unresolved.push(finding.key());
                continue;
            }
            // First-come-first-served: a fix touching text an earlier
            // accepted fix already claims loses.
            let conflicts = accepted.iter().any(|c| {
                c.fix
                    .edits
                    .iter()
                    .any(|a| fix.edits.iter().any(|b| a.overlaps(b)))
            });
            if conflicts {
                outcome.unresolved.push(finding.key());
                continue;
            }
            accepted.push(Candidate {
                key: finding.key(),
                rule: finding.rule.clone(),
                fix,
            });
        }

        if accepted.is_empty() {
            return doc;
        }

        // Verify-and-revert loop: shrink the accepted set until every
        // applied fix actually silences its finding.
        loop {
            let text = apply_edits(doc.render(), &accepted);
            let new_doc = match doc.reparse(text) {
                Ok(new_doc) => new_doc,
                Err(err) => {
                    // The combined edits broke the document; revert the
                    // whole batch rather than guess which edit is at fault.
                    warn!(file = %doc.path().display(), %err, "fixes broke the document, reverting");
                    outcome
                        .unresolved
                        .extend(accepted.drain(..).map(|c| c.key));
                    return doc;
                }
            };

            let fixed_rules: HashSet<&str> =
                accepted.iter().map(|c| c.rule.as_str()).collect();
            let restricted = self.rules.restrict(&fixed_rules);
            let rerun =
                MatchingEngine::new(&restricted, self.resolver).run(std::slice::from_ref(&new_doc));
            let still_present: HashSet<FindingKey> =
                rerun.findings.iter().map(Finding::key).collect();

            let (failed, verified): (Vec<Candidate>, Vec<Candidate>) = accepted
                .into_iter()
                .partition(|c| still_present.contains(&c.key));
            if failed.is_empty() {
                debug!(file = %doc.path().display(), fixes = verified.len(), "fixes verified");
                outcome.resolved.extend(verified.into_iter().map(|c| c.key));
                return new_doc;
            }
            outcome
                .unresolved
                .extend(failed.into_iter().map(|c| c.key));
            accepted = verified;
            if accepted.is_empty() {
                return doc;
            }
        }
    }
}

fn edits_in_bounds(fix: &Fix, text: &str) -> bool {
    fix.edits.iter().all(|e| {
        e.start <= e.end
            && e.end <= text.len()
            && text.is_char_boundary(e.start)
            && text.is_char_boundary(e.end)
    })
}

/// Apply all accepted edits right-to-left so earlier offsets stay valid.
fn apply_edits(text: &str, accepted: &[Candidate]) -> String {
    let mut edits: Vec<_> = accepted.iter().flat_map(|c| c.fix.edits.iter()).collect();
    edits.sort_by(|a, b| b.start.cmp(&a.start));
    let mut out = text.to_string();
    for edit in edits {
        out.replace_range(edit.start..edit.end, &edit.new_text);
    }
    out
}
