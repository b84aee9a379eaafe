//! Event-driven construction of the normalized tree.
//!
//! The YAML scanner only marks where each event *starts*, so end positions
//! are derived: container ends come from the matching end event, scalar ends
//! from the token itself (single-line plain/quoted) or from trimming the gap
//! to the next event (block and multiline scalars).

use crate::document::{Comment, Document, NodeData, Step};
use crate::line_index::LineIndex;
use crate::node::{NodeId, NodeKind, Position, ScalarValue, Span};
use std::path::PathBuf;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, ScanError, TScalarStyle};

/// A document could not be normalized.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("{path}:{line}:{column}: {message}")]
    Syntax {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },
    #[error("{path}:{line}:{column}: multiple YAML documents in one file")]
    MultipleDocuments {
        path: PathBuf,
        line: usize,
        column: usize,
    },
    #[error("{path}:{line}:{column}: non-scalar mapping keys are not supported")]
    UnsupportedKey {
        path: PathBuf,
        line: usize,
        column: usize,
    },
}

impl ParseError {
    fn syntax(path: &PathBuf, err: &ScanError) -> Self {
        let marker = err.marker();
        Self::Syntax {
            path: path.clone(),
            line: marker.line(),
            column: marker.col(),
            message: err.to_string(),
        }
    }

    /// 1-based line the error points at.
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            Self::Syntax { line, .. }
            | Self::MultipleDocuments { line, .. }
            | Self::UnsupportedKey { line, .. } => *line,
        }
    }
}

#[derive(Default)]
struct EventCollector {
    events: Vec<(Event, Marker)>,
}

impl MarkedEventReceiver for EventCollector {
    fn on_event(&mut self, ev: Event, mark: Marker) {
        self.events.push((ev, mark));
    }
}

enum Frame {
    Mapping {
        id: NodeId,
        pending_key: Option<(String, Span)>,
    },
    Sequence {
        id: NodeId,
        next_index: usize,
    },
}

pub(crate) fn build(path: PathBuf, text: String, revision: u32) -> Result<Document, ParseError> {
    let index = LineIndex::new(&text);

    let mut collector = EventCollector::default();
    let mut parser = Parser::new(text.chars());
    parser
        .load(&mut collector, true)
        .map_err(|e| ParseError::syntax(&path, &e))?;

    let positions: Vec<Position> = collector
        .events
        .iter()
        .map(|(_, mark)| index.position(&text, mark.line(), mark.col()))
        .collect();

    let mut nodes: Vec<NodeData> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<NodeId> = None;

    for (i, (event, _)) in collector.events.iter().enumerate() {
        let pos = positions[i];
        let limit = positions.get(i + 1).map_or(text.len(), |p| p.offset);

        match event {
            Event::DocumentStart { .. } => {
                if root.is_some() {
                    return Err(ParseError::MultipleDocuments {
                        path,
                        line: pos.line,
                        column: pos.column,
                    });
                }
            }
            Event::Scalar(value, style, _, _) => {
                let span = scalar_span(&text, &index, pos, limit, *style, value);
                match stack.last_mut() {
                    Some(Frame::Mapping { pending_key, .. }) if pending_key.is_none() => {
                        *pending_key = Some((value.clone(), span));
                    }
                    _ => {
                        let resolved = resolve_scalar(value, *style);
                        attach(
                            &mut nodes,
                            &mut stack,
                            &mut root,
                            NodeKind::Scalar,
                            span,
                            Some(resolved),
                        );
                    }
                }
            }
            Event::Alias { .. } => {
                // Anchors are not resolved; an alias becomes an opaque scalar.
                if key_expected(&stack) {
                    return Err(ParseError::UnsupportedKey {
                        path,
                        line: pos.line,
                        column: pos.column,
                    });
                }
                let end = trimmed_end(&text, pos.offset, limit);
                let span = Span::new(pos, index.position_at(&text, end));
                let raw = text[span.start.offset..span.end.offset].to_string();
                attach(
                    &mut nodes,
                    &mut stack,
                    &mut root,
                    NodeKind::Scalar,
                    span,
                    Some(ScalarValue::Str(raw)),
                );
            }
            Event::MappingStart { .. } | Event::SequenceStart { .. } => {
                if key_expected(&stack) {
                    return Err(ParseError::UnsupportedKey {
                        path,
                        line: pos.line,
                        column: pos.column,
                    });
                }
                let kind = if matches!(event, Event::MappingStart { .. }) {
                    NodeKind::Mapping
                } else {
                    NodeKind::Sequence
                };
                let span = Span::new(pos, pos);
                let id = attach(&mut nodes, &mut stack, &mut root, kind, span, None);
                stack.push(match kind {
                    NodeKind::Mapping => Frame::Mapping {
                        id,
                        pending_key: None,
                    },
                    _ => Frame::Sequence { id, next_index: 0 },
                });
            }
            Event::MappingEnd | Event::SequenceEnd => {
                if let Some(frame) = stack.pop() {
                    let id = match frame {
                        Frame::Mapping { id, .. } | Frame::Sequence { id, .. } => id,
                    };
                    nodes[id.index()].span.end = pos;
                }
            }
            _ => {}
        }
    }

    let comments = scan_comments(&text, &index, &nodes);

    Ok(Document {
        path,
        text,
        revision,
        root,
        nodes,
        comments,
    })
}

fn key_expected(stack: &[Frame]) -> bool {
    matches!(
        stack.last(),
        Some(Frame::Mapping {
            pending_key: None,
            ..
        })
    )
}

/// Create a node, wiring it to the innermost open container (or as root).
fn attach(
    nodes: &mut Vec<NodeData>,
    stack: &mut [Frame],
    root: &mut Option<NodeId>,
    kind: NodeKind,
    span: Span,
    value: Option<ScalarValue>,
) -> NodeId {
    let id = NodeId(nodes.len() as u32);
    let (parent, step) = match stack.last_mut() {
        None => {
            *root = Some(id);
            (None, Step::Root)
        }
        Some(Frame::Mapping {
            id: parent,
            pending_key,
        }) => match pending_key.take() {
            Some((name, key_span)) => (
                Some(*parent),
                Step::Key {
                    name,
                    span: key_span,
                },
            ),
            None => unreachable!("mapping value without a pending key"),
        },
        Some(Frame::Sequence {
            id: parent,
            next_index,
        }) => {
            let i = *next_index;
            *next_index += 1;
            (Some(*parent), Step::Index(i))
        }
    };
    if let Some(parent) = parent {
        nodes[parent.index()].children.push(id);
    }
    nodes.push(NodeData {
        kind,
        parent,
        children: Vec::new(),
        step,
        span,
        value,
    });
    id
}

fn scalar_span(
    text: &str,
    index: &LineIndex,
    start: Position,
    limit: usize,
    style: TScalarStyle,
    value: &str,
) -> Span {
    let end = match style {
        TScalarStyle::Plain if !value.contains('\n') => {
            (start.offset + value.len()).min(limit)
        }
        TScalarStyle::SingleQuoted | TScalarStyle::DoubleQuoted => {
            closing_quote_end(text, start.offset, limit)
                .unwrap_or_else(|| trimmed_end(text, start.offset, limit))
        }
        _ => trimmed_end(text, start.offset, limit),
    };
    Span::new(start, index.position_at(text, end))
}

/// Byte offset just past the closing quote of a quoted scalar token.
fn closing_quote_end(text: &str, start: usize, limit: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let quote = *bytes.get(start)?;
    if quote != b'\'' && quote != b'"' {
        return None;
    }
    let mut i = start + 1;
    while i < limit.min(bytes.len()) {
        let b = bytes[i];
        if quote == b'"' && b == b'\\' {
            i += 2;
            continue;
        }
        if b == quote {
            // Single-quoted strings escape quotes by doubling them.
            if quote == b'\'' && bytes.get(i + 1) == Some(&b'\'') {
                i += 2;
                continue;
            }
            return Some(i + 1);
        }
        i += 1;
    }
    None
}

/// End of the gap to the next event, with trailing whitespace trimmed.
fn trimmed_end(text: &str, start: usize, limit: usize) -> usize {
    let limit = limit.min(text.len()).max(start);
    start + text[start..limit].trim_end().len()
}

fn resolve_scalar(value: &str, style: TScalarStyle) -> ScalarValue {
    if value.contains("{{") {
        return ScalarValue::Template;
    }
    if style != TScalarStyle::Plain {
        return ScalarValue::Str(value.to_string());
    }
    match value {
        "" | "~" | "null" | "Null" | "NULL" => return ScalarValue::Null,
        "true" | "True" | "TRUE" => return ScalarValue::Bool(true),
        "false" | "False" | "FALSE" => return ScalarValue::Bool(false),
        _ => {}
    }
    // YAML 1.1 octal-looking literals (mode: 0644) must stay strings.
    let octal_like = value.len() > 1
        && value.starts_with('0')
        && value.bytes().all(|b| b.is_ascii_digit());
    if !octal_like {
        if let Ok(i) = value.parse::<i64>() {
            return ScalarValue::Int(i);
        }
        if let Ok(f) = value.parse::<f64>() {
            return ScalarValue::Float(f);
        }
    }
    ScalarValue::Str(value.to_string())
}

/// Collect comments, skipping `#` bytes that sit inside scalar or key tokens.
fn scan_comments(text: &str, index: &LineIndex, nodes: &[NodeData]) -> Vec<Comment> {
    let mut token_spans: Vec<(usize, usize)> = Vec::new();
    for node in nodes {
        if node.kind == NodeKind::Scalar {
            token_spans.push((node.span.start.offset, node.span.end.offset));
        }
        if let Step::Key { span, .. } = &node.step {
            token_spans.push((span.start.offset, span.end.offset));
        }
    }
    token_spans.sort_unstable();

    // Pre-order start offsets are non-decreasing, which makes attachment a
    // partition-point lookup.
    let starts: Vec<usize> = nodes.iter().map(|n| n.span.start.offset).collect();

    let mut comments = Vec::new();
    for line in 1..=index.line_count() {
        let line_start = index.line_start(line);
        let line_end = match text[line_start..].find('\n') {
            Some(nl) => line_start + nl,
            None => text.len(),
        };
        let content = &text[line_start..line_end];
        let mut prev: Option<char> = None;
        for (col, (byte_idx, ch)) in content.char_indices().enumerate() {
            let offset = line_start + byte_idx;
            let at_line_head = prev.is_none() || prev == Some(' ') || prev == Some('\t');
            if ch == '#' && at_line_head && !inside_token(&token_spans, offset) {
                let attach_idx = starts.partition_point(|s| *s < offset);
                comments.push(Comment {
                    text: content[byte_idx + 1..].trim().to_string(),
                    line,
                    column: col,
                    offset,
                    attached_to: starts
                        .get(attach_idx)
                        .map(|_| NodeId(attach_idx as u32)),
                });
                break;
            }
            prev = Some(ch);
        }
    }
    comments
}

fn inside_token(sorted_spans: &[(usize, usize)], offset: usize) -> bool {
    let idx = sorted_spans.partition_point(|(s, _)| *s <= offset);
    idx > 0 && sorted_spans[idx - 1].1 > offset
}
