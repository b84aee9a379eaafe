use crate::diagnostics::{Finding, Severity};
use crate::playbook;
use crate::rules::LintRule;
use playlint_resolver::ReferenceResolver;
use playlint_syntax::{Document, NodeRef};
use serde_json::json;

/// The task's action must resolve to a known module schema.
pub struct UnknownModuleRule;

impl LintRule for UnknownModuleRule {
    fn id(&self) -> &'static str {
        "unknown_module"
    }

    fn description(&self) -> &'static str {
        "Task actions must resolve to a known module"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn tags(&self) -> &'static [&'static str] {
        &["correctness"]
    }

    fn applicable(&self, node: NodeRef<'_>) -> bool {
        playbook::is_task(node)
    }

    fn evaluate(
        &self,
        node: NodeRef<'_>,
        doc: &Document,
        resolver: &dyn ReferenceResolver,
    ) -> Vec<Finding> {
        let Some((module, value)) = playbook::action_of(node) else {
            return Vec::new();
        };
        if !resolver.lookup(module).is_unknown() {
            return Vec::new();
        }
        let span = value.key_span().copied().unwrap_or(*value.span());
        vec![
            Finding::error(
                self.id(),
                doc.path(),
                span,
                format!("couldn't resolve module '{module}'"),
            )
            .with_path(node.path())
            .with_detail(json!({ "module": module })),
        ]
    }
}
