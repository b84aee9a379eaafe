use crate::diagnostics::{Finding, Severity};
use crate::playbook;
use crate::rules::LintRule;
use playlint_resolver::ReferenceResolver;
use playlint_syntax::{Document, NodeKind, NodeRef, ScalarValue};
use std::collections::HashSet;

/// Every `notify` target must name a handler defined in the same document.
///
/// Handlers answer to their `name` and to any value of their `listen`
/// key. Templated notify targets are skipped; they can't be matched
/// statically.
pub struct HandlerUndefinedRule;

fn handler_names(doc: &Document) -> HashSet<String> {
    let mut names = HashSet::new();
    for node in doc.nodes() {
        if !playbook::is_handler(node) {
            continue;
        }
        if let Some(name) = playbook::task_name(node) {
            names.insert(name.to_string());
        }
        if let Some(listen) = node.get("listen") {
            match listen.kind() {
                NodeKind::Scalar => {
                    if let Some(topic) = listen.as_str() {
                        names.insert(topic.to_string());
                    }
                }
                NodeKind::Sequence => {
                    for item in listen.children() {
                        if let Some(topic) = item.as_str() {
                            names.insert(topic.to_string());
                        }
                    }
                }
                NodeKind::Mapping => {}
            }
        }
    }
    names
}

fn notify_targets(task: NodeRef<'_>) -> Vec<NodeRef<'_>> {
    let Some(notify) = task.get("notify") else {
        return Vec::new();
    };
    match notify.kind() {
        NodeKind::Scalar => vec![notify],
        NodeKind::Sequence => notify.children().collect(),
        NodeKind::Mapping => Vec::new(),
    }
}

impl LintRule for HandlerUndefinedRule {
    fn id(&self) -> &'static str {
        "handler_undefined"
    }

    fn description(&self) -> &'static str {
        "notify targets must match a defined handler"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn tags(&self) -> &'static [&'static str] {
        &["correctness"]
    }

    fn check_document(&self, doc: &Document, _resolver: &dyn ReferenceResolver) -> Vec<Finding> {
        let handlers = handler_names(doc);
        let mut findings = Vec::new();
        for task in playbook::tasks(doc) {
            if playbook::is_handler(task) {
                continue;
            }
            for target in notify_targets(task) {
                if matches!(target.value(), Some(ScalarValue::Template)) {
                    continue;
                }
                let Some(name) = target.as_str() else {
                    continue;
                };
                if handlers.contains(name) {
                    continue;
                }
                findings.push(
                    Finding::warning(
                        self.id(),
                        doc.path(),
                        *target.span(),
                        format!("notify target '{name}' matches no handler"),
                    )
                    .with_path(target.path()),
                );
            }
        }
        findings
    }
}
