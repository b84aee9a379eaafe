use crate::diagnostics::{Finding, Severity};
use crate::playbook;
use crate::rules::LintRule;
use playlint_resolver::ReferenceResolver;
use playlint_syntax::{Document, NodeRef};
use serde_json::json;

/// The task's action must not be a module whose schema names a
/// replacement.
pub struct DeprecatedModuleRule;

impl LintRule for DeprecatedModuleRule {
    fn id(&self) -> &'static str {
        "deprecated_module"
    }

    fn description(&self) -> &'static str {
        "Task actions must not use modules with a declared replacement"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn tags(&self) -> &'static [&'static str] {
        &["deprecations"]
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
        let Some(schema) = resolver.lookup(module).schema() else {
            return Vec::new();
        };
        let Some(replacement) = schema.redirect.as_deref() else {
            return Vec::new();
        };
        let span = value.key_span().copied().unwrap_or(*value.span());
        vec![
            Finding::warning(
                self.id(),
                doc.path(),
                span,
                format!("module '{module}' is deprecated, use '{replacement}' instead"),
            )
            .with_path(node.path())
            .with_detail(json!({ "module": module, "replacement": replacement })),
        ]
    }
}
