//! Node identity, kinds, paths, and source spans.

use std::fmt;

/// Index of a node inside its owning [`Document`](crate::Document).
///
/// Ids are only meaningful for the document revision that produced them.
/// After a reparse the tree is rebuilt and old ids must not be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[must_use]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// The kind of a normalized tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Mapping,
    Sequence,
    Scalar,
}

/// A scalar's resolved value.
///
/// Templated expressions (`{{ ... }}`) are kept opaque: rules that want to
/// inspect template syntax work from the raw text slice instead.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
    /// Contains a `{{ ... }}` expression; treated as opaque.
    Template,
}

impl ScalarValue {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_template(&self) -> bool {
        matches!(self, Self::Template)
    }
}

/// One step in a node path: a mapping key or a sequence index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathStep {
    Key(String),
    Index(usize),
}

/// Path from the document root to a node, as an ordered sequence of
/// key/index steps. Stable across a parse, not across edits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath(pub Vec<PathStep>);

impl NodePath {
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn steps(&self) -> &[PathStep] {
        &self.0
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NodePath {
    /// jq-style rendering: `.[0].tasks[2].copy.dest`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, ".");
        }
        for step in &self.0 {
            match step {
                PathStep::Key(k) => write!(f, ".{k}")?,
                PathStep::Index(i) => write!(f, "[{i}]")?,
            }
        }
        Ok(())
    }
}

/// A position in the source text.
///
/// `line` is 1-based, `column` is a 0-based character column, and `offset`
/// is a byte offset into the document text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

/// A half-open source range `[start, end)`.
///
/// Half-open ranges are what make the tree invariants hold: a child span is
/// contained within its parent's span, and sibling spans never overlap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Whether `other` is fully contained in `self` (byte-offset containment).
    #[must_use]
    pub fn contains(&self, other: &Span) -> bool {
        self.start.offset <= other.start.offset && other.end.offset <= self.end.offset
    }

    /// Whether the byte offset falls inside this span.
    #[must_use]
    pub fn contains_offset(&self, offset: usize) -> bool {
        self.start.offset <= offset && offset < self.end.offset
    }

    /// Whether two half-open spans overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start.offset < other.end.offset && other.start.offset < self.end.offset
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start.line, self.start.column + 1)
    }
}
