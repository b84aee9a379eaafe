//! The parsed document and its arena-owned node tree.

use crate::node::{NodeId, NodeKind, NodePath, PathStep, ScalarValue, Span};
use crate::parse;
use crate::ParseError;
use std::path::{Path, PathBuf};

/// How a node hangs off its parent.
#[derive(Debug, Clone)]
pub(crate) enum Step {
    Root,
    Key { name: String, span: Span },
    Index(usize),
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) step: Step,
    pub(crate) span: Span,
    pub(crate) value: Option<ScalarValue>,
}

/// A comment retained out-of-band, attached to the nearest following node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Text after the `#`, trimmed.
    pub text: String,
    /// 1-based line of the `#`.
    pub line: usize,
    /// 0-based character column of the `#`.
    pub column: usize,
    /// Byte offset of the `#`.
    pub offset: usize,
    /// Nearest node starting at or after the comment, if any.
    pub attached_to: Option<NodeId>,
}

/// One parsed configuration file.
///
/// Documents own their nodes arena-style: edits never mutate a tree, they
/// produce a new `Document` via [`Document::reparse`], and node ids from the
/// old revision must be discarded.
#[derive(Debug, Clone)]
pub struct Document {
    pub(crate) path: PathBuf,
    pub(crate) text: String,
    pub(crate) revision: u32,
    pub(crate) root: Option<NodeId>,
    pub(crate) nodes: Vec<NodeData>,
    pub(crate) comments: Vec<Comment>,
}

impl Document {
    /// Parse a source text into a document at revision 0.
    pub fn parse(path: impl Into<PathBuf>, text: impl Into<String>) -> Result<Self, ParseError> {
        parse::build(path.into(), text.into(), 0)
    }

    /// Reparse edited text under the same path, bumping the revision.
    pub fn reparse(&self, new_text: impl Into<String>) -> Result<Self, ParseError> {
        parse::build(self.path.clone(), new_text.into(), self.revision + 1)
    }

    /// The original source text, verbatim.
    ///
    /// Fixes edit text rather than the tree, so rendering an unedited
    /// document always round-trips byte for byte.
    #[must_use]
    pub fn render(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn revision(&self) -> u32 {
        self.revision
    }

    #[must_use]
    pub fn root(&self) -> Option<NodeRef<'_>> {
        self.root.map(|id| NodeRef { doc: self, id })
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { doc: self, id }
    }

    /// All nodes in pre-order (document order). Node creation order during
    /// the event-driven build is already pre-order, so this is a plain scan.
    pub fn nodes(&self) -> impl Iterator<Item = NodeRef<'_>> {
        (0..self.nodes.len()).map(move |i| NodeRef {
            doc: self,
            id: NodeId(i as u32),
        })
    }

    #[must_use]
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Walk a path from the root. Returns `None` if any step is missing.
    #[must_use]
    pub fn find(&self, path: &NodePath) -> Option<NodeRef<'_>> {
        let mut current = self.root()?;
        for step in path.steps() {
            current = match step {
                PathStep::Key(k) => current.get(k)?,
                PathStep::Index(i) => current.item(*i)?,
            };
        }
        Some(current)
    }

    pub(crate) fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }
}

/// A borrowed view of one node in a document.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub fn document(&self) -> &'a Document {
        self.doc
    }

    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.doc.data(self.id).kind
    }

    #[must_use]
    pub fn is_mapping(&self) -> bool {
        self.kind() == NodeKind::Mapping
    }

    #[must_use]
    pub fn is_sequence(&self) -> bool {
        self.kind() == NodeKind::Sequence
    }

    #[must_use]
    pub fn is_scalar(&self) -> bool {
        self.kind() == NodeKind::Scalar
    }

    #[must_use]
    pub fn span(&self) -> &'a Span {
        &self.doc.data(self.id).span
    }

    /// The raw text slice covered by this node's span.
    #[must_use]
    pub fn raw(&self) -> &'a str {
        let span = self.span();
        &self.doc.text[span.start.offset..span.end.offset]
    }

    /// Resolved scalar value; `None` for mappings and sequences.
    #[must_use]
    pub fn value(&self) -> Option<&'a ScalarValue> {
        self.doc.data(self.id).value.as_ref()
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&'a str> {
        self.value().and_then(ScalarValue::as_str)
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.doc.data(self.id).parent.map(|id| NodeRef {
            doc: self.doc,
            id,
        })
    }

    /// Child nodes in document order.
    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + '_ {
        let doc = self.doc;
        self.doc
            .data(self.id)
            .children
            .iter()
            .map(move |id| NodeRef { doc, id: *id })
    }

    /// Mapping entries as `(key, value)` pairs, in source order.
    pub fn entries(&self) -> impl Iterator<Item = (&'a str, NodeRef<'a>)> + '_ {
        let doc = self.doc;
        self.doc
            .data(self.id)
            .children
            .iter()
            .filter_map(move |id| {
                let child = NodeRef { doc, id: *id };
                match &doc.data(*id).step {
                    Step::Key { name, .. } => Some((name.as_str(), child)),
                    _ => None,
                }
            })
    }

    /// Value under a mapping key (first occurrence wins for duplicate keys).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<NodeRef<'a>> {
        self.entries().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Sequence item by index.
    #[must_use]
    pub fn item(&self, index: usize) -> Option<NodeRef<'a>> {
        self.doc
            .data(self.id)
            .children
            .get(index)
            .map(|id| NodeRef {
                doc: self.doc,
                id: *id,
            })
    }

    /// The mapping key under which this node hangs, if any.
    #[must_use]
    pub fn key(&self) -> Option<&'a str> {
        match &self.doc.data(self.id).step {
            Step::Key { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Span of the mapping key under which this node hangs, if any.
    #[must_use]
    pub fn key_span(&self) -> Option<&'a Span> {
        match &self.doc.data(self.id).step {
            Step::Key { span, .. } => Some(span),
            _ => None,
        }
    }

    /// Path from the document root, computed by walking parents (O(depth)).
    #[must_use]
    pub fn path(&self) -> NodePath {
        let mut steps = Vec::new();
        let mut current = *self;
        loop {
            match &current.doc.data(current.id).step {
                Step::Root => break,
                Step::Key { name, .. } => steps.push(PathStep::Key(name.clone())),
                Step::Index(i) => steps.push(PathStep::Index(*i)),
            }
            match current.parent() {
                Some(p) => current = p,
                None => break,
            }
        }
        steps.reverse();
        NodePath(steps)
    }

    /// Comments attached to this node.
    pub fn comments(&self) -> impl Iterator<Item = &'a Comment> + '_ {
        let id = self.id;
        self.doc
            .comments
            .iter()
            .filter(move |c| c.attached_to == Some(id))
    }
}
