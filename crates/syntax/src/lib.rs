//! # Playbook Document Model
//!
//! Span-preserving parsing for automation playbooks. A source file is parsed
//! into a [`Document`] owning a normalized tree of mappings, sequences, and
//! scalars. Every node carries a half-open source span, a deterministic path
//! from the root, and (for scalars) a resolved typed value. Comments are
//! retained out-of-band and attached to the nearest following node.
//!
//! The model is deliberately text-first: [`Document::render`] returns the
//! original source verbatim, because automatic fixes are applied as text
//! edits followed by a reparse, never as tree mutation. Node ids and spans
//! are only valid for the revision that produced them.

mod document;
mod line_index;
mod node;
mod parse;

pub use document::{Comment, Document, NodeRef};
pub use line_index::LineIndex;
pub use node::{NodeId, NodeKind, NodePath, PathStep, Position, ScalarValue, Span};
pub use parse::ParseError;

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYBOOK: &str = "\
---
# Provision web hosts
- name: web play
  hosts: web
  tasks:
    - name: install nginx
      apt:
        name: nginx
        state: present
    - name: enable service  # trailing note
      service:
        name: nginx
        enabled: yes
";

    fn parse(text: &str) -> Document {
        Document::parse("playbook.yml", text).unwrap()
    }

    #[test]
    fn round_trip_preserves_text() {
        let doc = parse(PLAYBOOK);
        assert_eq!(doc.render(), PLAYBOOK);
    }

    #[test]
    fn revision_starts_at_zero_and_bumps_on_reparse() {
        let doc = parse(PLAYBOOK);
        assert_eq!(doc.revision(), 0);
        let next = doc.reparse(PLAYBOOK.to_string()).unwrap();
        assert_eq!(next.revision(), 1);
        assert_eq!(next.path(), doc.path());
    }

    #[test]
    fn tree_shape_matches_source() {
        let doc = parse(PLAYBOOK);
        let root = doc.root().unwrap();
        assert!(root.is_sequence());
        let play = root.item(0).unwrap();
        assert!(play.is_mapping());
        assert_eq!(play.get("name").unwrap().as_str(), Some("web play"));
        let tasks = play.get("tasks").unwrap();
        assert_eq!(tasks.children().count(), 2);
        let apt = tasks.item(0).unwrap().get("apt").unwrap();
        assert_eq!(apt.get("state").unwrap().as_str(), Some("present"));
    }

    #[test]
    fn paths_are_deterministic_and_walkable() {
        let doc = parse(PLAYBOOK);
        let apt_name = doc
            .root()
            .unwrap()
            .item(0)
            .unwrap()
            .get("tasks")
            .unwrap()
            .item(0)
            .unwrap()
            .get("apt")
            .unwrap()
            .get("name")
            .unwrap();
        let path = apt_name.path();
        assert_eq!(path.to_string(), "[0].tasks[0].apt.name");
        let found = doc.find(&path).unwrap();
        assert_eq!(found.id(), apt_name.id());

        let reparsed = doc.reparse(PLAYBOOK.to_string()).unwrap();
        assert_eq!(reparsed.find(&path).unwrap().path(), path);
    }

    #[test]
    fn scalar_values_are_typed() {
        let doc = parse(
            "count: 3\nratio: 0.5\nflag: true\nempty:\nmode: 0644\nmsg: \"{{ item }}\"\n",
        );
        let root = doc.root().unwrap();
        assert_eq!(root.get("count").unwrap().value(), Some(&ScalarValue::Int(3)));
        assert_eq!(
            root.get("ratio").unwrap().value(),
            Some(&ScalarValue::Float(0.5))
        );
        assert_eq!(
            root.get("flag").unwrap().value(),
            Some(&ScalarValue::Bool(true))
        );
        assert_eq!(root.get("empty").unwrap().value(), Some(&ScalarValue::Null));
        // Octal-looking literals stay strings.
        assert_eq!(
            root.get("mode").unwrap().as_str(),
            Some("0644")
        );
        assert_eq!(
            root.get("msg").unwrap().value(),
            Some(&ScalarValue::Template)
        );
    }

    #[test]
    fn spans_slice_the_raw_text() {
        let doc = parse("key: value\nother: 'quoted'\n");
        let root = doc.root().unwrap();
        assert_eq!(root.get("key").unwrap().raw(), "value");
        assert_eq!(root.get("other").unwrap().raw(), "'quoted'");
        let key_span = root.get("key").unwrap().key_span().unwrap();
        assert_eq!(&doc.text()[key_span.start.offset..key_span.end.offset], "key");
    }

    #[test]
    fn span_invariants_hold() {
        let doc = parse(PLAYBOOK);
        for node in doc.nodes() {
            assert!(
                node.span().start.offset <= node.span().end.offset,
                "inverted span at {}",
                node.path()
            );
            if let Some(parent) = node.parent() {
                assert!(
                    parent.span().contains(node.span()),
                    "child {} escapes parent span",
                    node.path()
                );
            }
            let children: Vec<_> = node.children().collect();
            for pair in children.windows(2) {
                assert!(
                    !pair[0].span().overlaps(pair[1].span()),
                    "sibling spans overlap under {}",
                    node.path()
                );
            }
        }
    }

    #[test]
    fn comments_are_retained_and_attached() {
        let doc = parse(PLAYBOOK);
        let texts: Vec<&str> = doc.comments().iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["Provision web hosts", "trailing note"]);

        let provision = &doc.comments()[0];
        let attached = doc.node(provision.attached_to.unwrap());
        // Nearest following node is the play sequence (or its first item).
        assert!(attached.span().start.line > provision.line);
    }

    #[test]
    fn hash_inside_strings_is_not_a_comment() {
        let doc = parse("msg: 'not # a comment'\nreal: value # yes\n");
        assert_eq!(doc.comments().len(), 1);
        assert_eq!(doc.comments()[0].text, "yes");
    }

    #[test]
    fn duplicate_keys_resolve_to_first() {
        let doc = parse("a: 1\na: 2\n");
        let root = doc.root().unwrap();
        assert_eq!(root.get("a").unwrap().value(), Some(&ScalarValue::Int(1)));
        assert_eq!(root.children().count(), 2);
    }

    #[test]
    fn parse_error_reports_location() {
        let err = Document::parse("bad.yml", "key: [unclosed\n").unwrap_err();
        match err {
            ParseError::Syntax { line, .. } => assert!(line >= 1),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn multiple_documents_are_rejected() {
        let err = Document::parse("multi.yml", "---\na: 1\n---\nb: 2\n").unwrap_err();
        assert!(matches!(err, ParseError::MultipleDocuments { .. }));
    }

    #[test]
    fn empty_document_has_no_root() {
        let doc = parse("");
        assert!(doc.root().is_none());
        assert_eq!(doc.render(), "");
    }

    #[test]
    fn block_scalar_spans_cover_content() {
        let text = "script: |\n  line one\n  line two\nafter: done\n";
        let doc = parse(text);
        let script = doc.root().unwrap().get("script").unwrap();
        assert!(script.raw().contains("line two") || script.raw().starts_with('|'));
        let after = doc.root().unwrap().get("after").unwrap();
        assert!(!script.span().overlaps(after.span()));
    }
}
