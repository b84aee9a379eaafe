use crate::diagnostics::{Finding, Severity};
use crate::playbook;
use crate::rules::LintRule;
use playlint_resolver::ReferenceResolver;
use playlint_syntax::{Document, NodeRef};
use serde_json::json;

/// Module arguments must be parameters the resolved schema declares.
///
/// Skipped when the catalog entry declares no parameters at all, so
/// sparse catalogs and arbitrary-keyword modules like `set_fact` stay
/// quiet. Templated argument keys are skipped for the same reason
/// templated values are elsewhere: their expansion is unknowable
/// statically.
pub struct UnknownParameterRule;

impl LintRule for UnknownParameterRule {
    fn id(&self) -> &'static str {
        "unknown_parameter"
    }

    fn description(&self) -> &'static str {
        "Module arguments must be declared parameters"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
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
        let Some((module, args)) = playbook::action_of(node) else {
            return Vec::new();
        };
        let Some(schema) = resolver.lookup(module).schema() else {
            return Vec::new();
        };
        if schema.params.is_empty() || !args.is_mapping() {
            return Vec::new();
        }

        let mut findings = Vec::new();
        for (key, value) in args.entries() {
            if key.contains("{{")
                || schema.knows_param(key)
                || schema.required.iter().any(|r| r == key)
            {
                continue;
            }
            let span = value.key_span().copied().unwrap_or(*value.span());
            findings.push(
                Finding::warning(
                    self.id(),
                    doc.path(),
                    span,
                    format!("module '{module}' does not accept parameter '{key}'"),
                )
                .with_path(value.path())
                .with_detail(json!({ "module": module, "parameter": key })),
            );
        }
        findings
    }
}
