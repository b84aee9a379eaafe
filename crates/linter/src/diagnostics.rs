//! Findings, fixes, and text edits.

use playlint_syntax::{NodePath, Span};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    /// Lowest advisory level; `warn`-listed findings are demoted to this.
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// What produced a finding.
///
/// Only `Violation` findings are subject to suppression; the other kinds
/// exist to keep abnormal conditions observable and must never be silently
/// droppable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FindingKind {
    /// A rule matched.
    Violation,
    /// The document could not be parsed and was excluded from matching.
    ParseFailure,
    /// A rule panicked; fault isolation converted it into a finding.
    InternalError,
    /// A suppression directive matched nothing.
    UnusedSuppression,
}

/// Identity of a finding: the dedup key and the unit of the transform
/// engine's resolved/unresolved partition. Spans are deliberately excluded —
/// they move under edits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FindingKey {
    pub file: PathBuf,
    pub path: Option<NodePath>,
    pub rule: String,
    pub message: String,
}

/// One reported violation instance. Immutable value object: the engine
/// resolves severity at creation time and later stages only drop, demote,
/// or reorder findings.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    /// Identifier of the producing rule.
    pub rule: String,
    /// Document the finding belongs to.
    pub file: PathBuf,
    /// Node path, or `None` for document-level findings.
    pub path: Option<NodePath>,
    /// Source span in the document revision that was matched.
    pub span: Span,
    pub severity: Severity,
    pub message: String,
    /// Optional machine-readable payload (e.g. a fix replacement).
    pub detail: Option<serde_json::Value>,
    pub kind: FindingKind,
}

impl Finding {
    #[must_use]
    pub fn new(
        rule: impl Into<String>,
        file: impl Into<PathBuf>,
        span: Span,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule: rule.into(),
            file: file.into(),
            path: None,
            span,
            severity,
            message: message.into(),
            detail: None,
            kind: FindingKind::Violation,
        }
    }

    #[must_use]
    pub fn warning(
        rule: impl Into<String>,
        file: impl Into<PathBuf>,
        span: Span,
        message: impl Into<String>,
    ) -> Self {
        Self::new(rule, file, span, Severity::Warning, message)
    }

    #[must_use]
    pub fn error(
        rule: impl Into<String>,
        file: impl Into<PathBuf>,
        span: Span,
        message: impl Into<String>,
    ) -> Self {
        Self::new(rule, file, span, Severity::Error, message)
    }

    #[must_use]
    pub fn with_path(mut self, path: NodePath) -> Self {
        self.path = Some(path);
        self
    }

    #[must_use]
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = Some(detail);
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: FindingKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn key(&self) -> FindingKey {
        FindingKey {
            file: self.file.clone(),
            path: self.path.clone(),
            rule: self.rule.clone(),
            message: self.message.clone(),
        }
    }
}

/// A single text edit against the *original* source of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// Start byte offset.
    pub start: usize,
    /// End byte offset (half-open).
    pub end: usize,
    /// Replacement text (empty means deletion).
    pub new_text: String,
}

impl TextEdit {
    #[must_use]
    pub fn new(start: usize, end: usize, new_text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            new_text: new_text.into(),
        }
    }

    #[must_use]
    pub fn delete(start: usize, end: usize) -> Self {
        Self::new(start, end, "")
    }

    #[must_use]
    pub fn insert(position: usize, text: impl Into<String>) -> Self {
        Self::new(position, position, text)
    }

    /// Whether two edits overlap. Zero-width inserts at the same offset are
    /// treated as overlapping since their application order is ambiguous.
    #[must_use]
    pub fn overlaps(&self, other: &TextEdit) -> bool {
        if self.start == other.start && self.end == other.end && self.start == self.end {
            return true;
        }
        self.start < other.end && other.start < self.end
    }
}

/// An ordered set of non-overlapping edits that resolves one finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fix {
    /// Human-readable description of what the fix does.
    pub label: String,
    /// Edits against the original source text.
    pub edits: Vec<TextEdit>,
}

impl Fix {
    #[must_use]
    pub fn new(label: impl Into<String>, edits: Vec<TextEdit>) -> Self {
        Self {
            label: label.into(),
            edits,
        }
    }

    #[must_use]
    pub fn replace(label: impl Into<String>, start: usize, end: usize, text: impl Into<String>) -> Self {
        Self::new(label, vec![TextEdit::new(start, end, text)])
    }

    /// Whether the edits within this fix are pairwise non-overlapping.
    #[must_use]
    pub fn is_coherent(&self) -> bool {
        for (i, a) in self.edits.iter().enumerate() {
            for b in &self.edits[i + 1..] {
                if a.overlaps(b) {
                    return false;
                }
            }
        }
        !self.edits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finding_key_ignores_span() {
        let mut a = Finding::warning("rule", "f.yml", Span::default(), "msg");
        let mut b = a.clone();
        b.span.start.offset = 10;
        a.severity = Severity::Error;
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn edit_overlap_rules() {
        assert!(TextEdit::new(0, 5, "x").overlaps(&TextEdit::new(4, 6, "y")));
        assert!(!TextEdit::new(0, 5, "x").overlaps(&TextEdit::new(5, 6, "y")));
        // Same-position inserts conflict.
        assert!(TextEdit::insert(3, "a").overlaps(&TextEdit::insert(3, "b")));
        // An insert inside a replaced range conflicts.
        assert!(TextEdit::insert(3, "a").overlaps(&TextEdit::new(2, 4, "y")));
    }

    #[test]
    fn fix_coherence() {
        let good = Fix::new("ok", vec![TextEdit::new(0, 2, "a"), TextEdit::new(5, 7, "b")]);
        assert!(good.is_coherent());
        let bad = Fix::new("bad", vec![TextEdit::new(0, 4, "a"), TextEdit::new(2, 6, "b")]);
        assert!(!bad.is_coherent());
        assert!(!Fix::new("empty", vec![]).is_coherent());
    }

    #[test]
    fn severity_serde_round_trip() {
        let sev: Severity = serde_json::from_str("\"warning\"").unwrap();
        assert_eq!(sev, Severity::Warning);
        assert_eq!(serde_json::to_string(&Severity::Info).unwrap(), "\"info\"");
    }
}
