use crate::diagnostics::{Finding, Severity};
use crate::playbook;
use crate::rules::LintRule;
use playlint_resolver::ReferenceResolver;
use playlint_syntax::{Document, NodeRef};

/// `local_action` is legacy shorthand for `delegate_to: localhost`.
pub struct DeprecatedLocalActionRule;

impl LintRule for DeprecatedLocalActionRule {
    fn id(&self) -> &'static str {
        "deprecated_local_action"
    }

    fn description(&self) -> &'static str {
        "Use delegate_to: localhost instead of local_action"
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
        _resolver: &dyn ReferenceResolver,
    ) -> Vec<Finding> {
        let Some(value) = node.get("local_action") else {
            return Vec::new();
        };
        let span = value.key_span().copied().unwrap_or(*value.span());
        vec![
            Finding::warning(
                self.id(),
                doc.path(),
                span,
                "use 'delegate_to: localhost' instead of 'local_action'",
            )
            .with_path(node.path()),
        ]
    }
}
