//! Suppression resolution: inline `noqa` directives and path-scoped
//! skip/warn lists.
//!
//! Only [`FindingKind::Violation`] findings can be suppressed. Parse
//! failures, internal errors, and unused-suppression notices always pass
//! through, and every directive that matched nothing becomes a finding
//! itself so stale suppressions stay visible.

use crate::config::{SuppressionAction, SuppressionConfig};
use crate::diagnostics::{Finding, FindingKind, Severity};
use glob::Pattern;
use playlint_syntax::{Document, Position, Span};
use std::path::PathBuf;
use tracing::debug;

/// Pseudo rule id carried by unused-suppression findings.
pub const UNUSED_SUPPRESSION: &str = "unused_suppression";

/// An inline `# noqa` comment: suppresses findings starting on its line.
/// `rules` is `None` for a bare `noqa` (suppresses every rule).
#[derive(Debug, Clone, PartialEq, Eq)]
struct InlineDirective {
    file: PathBuf,
    line: usize,
    rules: Option<Vec<String>>,
    span: Span,
}

impl InlineDirective {
    fn matches(&self, finding: &Finding) -> bool {
        if finding.file != self.file || finding.span.start.line != self.line {
            return false;
        }
        match &self.rules {
            None => true,
            Some(rules) => rules.iter().any(|r| r == &finding.rule),
        }
    }
}

/// Parse `noqa` / `noqa: rule_a, rule_b` out of a comment body.
fn parse_directive(text: &str) -> Option<Option<Vec<String>>> {
    let rest = text.strip_prefix("noqa")?;
    let rest = rest.trim();
    if rest.is_empty() {
        return Some(None);
    }
    let rest = rest.strip_prefix(':')?.trim();
    let rules: Vec<String> = rest
        .split([',', ' '])
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if rules.is_empty() {
        return Some(None);
    }
    Some(Some(rules))
}

fn collect_directives(documents: &[Document]) -> Vec<InlineDirective> {
    let mut directives = Vec::new();
    for doc in documents {
        for comment in doc.comments() {
            let Some(rules) = parse_directive(&comment.text) else {
                continue;
            };
            let start = Position {
                line: comment.line,
                column: comment.column,
                offset: comment.offset,
            };
            let end = Position {
                line: comment.line,
                column: comment.column + comment.text.len() + 1,
                offset: comment.offset + comment.text.len() + 1,
            };
            directives.push(InlineDirective {
                file: doc.path().to_path_buf(),
                line: comment.line,
                rules,
                span: Span::new(start, end),
            });
        }
    }
    directives
}

/// Apply inline directives and the configured skip/warn lists.
///
/// Inline directives are consulted first; a finding they drop never
/// reaches the config lists. The returned vector contains the surviving
/// findings plus one informational finding per unused directive, unused
/// config entry, and invalid glob pattern.
#[must_use]
pub fn apply(
    findings: Vec<Finding>,
    documents: &[Document],
    config: &SuppressionConfig,
) -> Vec<Finding> {
    let mut directives = collect_directives(documents);
    let mut directive_used = vec![false; directives.len()];

    // (pattern, rule) entries with use tracking; invalid patterns are
    // reported instead of being matched.
    let mut entries: Vec<(Pattern, &str, &str, SuppressionAction, bool)> = Vec::new();
    let mut notices = Vec::new();
    for (pattern_text, rules) in &config.paths {
        match Pattern::new(pattern_text) {
            Ok(pattern) => {
                for (rule, action) in rules {
                    entries.push((pattern.clone(), pattern_text, rule, *action, false));
                }
            }
            Err(err) => {
                notices.push(
                    Finding::new(
                        UNUSED_SUPPRESSION,
                        pattern_text,
                        Span::default(),
                        Severity::Info,
                        format!("suppression pattern '{pattern_text}' is not a valid glob: {err}"),
                    )
                    .with_kind(FindingKind::UnusedSuppression),
                );
            }
        }
    }

    let mut kept = Vec::new();
    'findings: for mut finding in findings {
        if finding.kind != FindingKind::Violation {
            kept.push(finding);
            continue;
        }

        for (i, directive) in directives.iter().enumerate() {
            if directive.matches(&finding) {
                directive_used[i] = true;
                debug!(rule = %finding.rule, file = %finding.file.display(), line = finding.span.start.line, "suppressed inline");
                continue 'findings;
            }
        }

        let file = finding.file.to_string_lossy().into_owned();
        for (pattern, _, rule, action, used) in &mut entries {
            if *rule != finding.rule || !pattern.matches(&file) {
                continue;
            }
            *used = true;
            match action {
                SuppressionAction::Skip => continue 'findings,
                SuppressionAction::Warn => finding.severity = Severity::Info,
            }
        }
        kept.push(finding);
    }

    for (directive, used) in directives.drain(..).zip(directive_used) {
        if used {
            continue;
        }
        kept.push(
            Finding::new(
                UNUSED_SUPPRESSION,
                directive.file,
                directive.span,
                Severity::Info,
                match &directive.rules {
                    None => "'noqa' directive matched no findings".to_string(),
                    Some(rules) => format!(
                        "'noqa: {}' directive matched no findings",
                        rules.join(", ")
                    ),
                },
            )
            .with_kind(FindingKind::UnusedSuppression),
        );
    }

    for (_, pattern_text, rule, action, used) in entries {
        if used {
            continue;
        }
        let verb = match action {
            SuppressionAction::Skip => "skip",
            SuppressionAction::Warn => "warn",
        };
        kept.push(
            Finding::new(
                UNUSED_SUPPRESSION,
                pattern_text,
                Span::default(),
                Severity::Info,
                format!("{verb} entry for '{rule}' under '{pattern_text}' matched no findings"),
            )
            .with_kind(FindingKind::UnusedSuppression),
        );
    }

    kept.extend(notices);
    kept
}
