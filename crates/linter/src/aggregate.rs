//! Final report assembly: dedup then a stable presentation order.

use crate::diagnostics::{Finding, FindingKey};
use std::collections::HashSet;

/// Drop duplicate findings, keeping the first occurrence of each
/// [`FindingKey`]. Spans are not part of the key: the same violation
/// reported at slightly different offsets is still one violation.
#[must_use]
pub fn dedup(findings: Vec<Finding>) -> Vec<Finding> {
    let mut seen: HashSet<FindingKey> = HashSet::with_capacity(findings.len());
    findings
        .into_iter()
        .filter(|finding| seen.insert(finding.key()))
        .collect()
}

/// Sort into the stable report order: file, then start position, then
/// rule id. The sort is stable so equal-keyed findings keep their
/// engine-emission order.
pub fn sort(findings: &mut [Finding]) {
    findings.sort_by(|a, b| {
        (&a.file, a.span.start.line, a.span.start.column, &a.rule).cmp(&(
            &b.file,
            b.span.start.line,
            b.span.start.column,
            &b.rule,
        ))
    });
}

/// Dedup and sort in one step; idempotent.
#[must_use]
pub fn assemble(findings: Vec<Finding>) -> Vec<Finding> {
    let mut findings = dedup(findings);
    sort(&mut findings);
    findings
}
