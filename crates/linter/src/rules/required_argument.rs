use crate::diagnostics::{Finding, Severity};
use crate::playbook;
use crate::rules::LintRule;
use playlint_resolver::ReferenceResolver;
use playlint_syntax::{Document, NodeKind, NodeRef, ScalarValue};
use serde_json::json;

/// Module invocations must supply every required parameter.
///
/// String arguments are parsed as inline `k=v` shorthand and those keys
/// count as supplied. Templated arguments are skipped wholesale since
/// their expansion is unknowable statically.
pub struct RequiredArgumentRule;

fn inline_params(raw: &str) -> Vec<&str> {
    raw.split_whitespace()
        .filter_map(|token| token.split_once('=').map(|(key, _)| key))
        .collect()
}

impl LintRule for RequiredArgumentRule {
    fn id(&self) -> &'static str {
        "required_argument"
    }

    fn description(&self) -> &'static str {
        "Module invocations must supply required parameters"
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
        let Some((module, args)) = playbook::action_of(node) else {
            return Vec::new();
        };
        let Some(schema) = resolver.lookup(module).schema() else {
            return Vec::new();
        };
        if schema.required.is_empty() {
            return Vec::new();
        }

        let supplied: Vec<String> = match args.kind() {
            NodeKind::Mapping => args.entries().map(|(key, _)| key.to_string()).collect(),
            NodeKind::Scalar => {
                if matches!(args.value(), Some(ScalarValue::Template)) {
                    return Vec::new();
                }
                // Inline `k=v` shorthand works for any module; for
                // free-form modules the rest of the string is the payload.
                inline_params(args.raw())
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            }
            NodeKind::Sequence => return Vec::new(),
        };

        let missing: Vec<&str> = schema
            .required
            .iter()
            .map(String::as_str)
            .filter(|required| !supplied.iter().any(|got| got == required))
            .collect();
        if missing.is_empty() {
            return Vec::new();
        }

        let span = args.key_span().copied().unwrap_or(*args.span());
        vec![
            Finding::error(
                self.id(),
                doc.path(),
                span,
                format!(
                    "module '{module}' is missing required parameter(s): {}",
                    missing.join(", ")
                ),
            )
            .with_path(node.path())
            .with_detail(json!({ "module": module, "missing": missing })),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playlint_resolver::StaticResolver;
    use playlint_syntax::Document;

    fn check(source: &str) -> Vec<Finding> {
        let doc = Document::parse("test.yml", source).unwrap();
        let resolver = StaticResolver::builtin();
        let rule = RequiredArgumentRule;
        doc.nodes()
            .filter(|n| rule.applicable(*n))
            .flat_map(|n| rule.evaluate(n, &doc, &resolver))
            .collect()
    }

    #[test]
    fn all_required_supplied() {
        let findings = check("- name: ok\n  copy:\n    src: a\n    dest: /tmp/a\n");
        assert!(findings.is_empty());
    }

    #[test]
    fn missing_dest_is_reported() {
        let findings = check("- name: bad\n  copy:\n    src: a\n");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("dest"));
        assert_eq!(findings[0].severity, Severity::Error);
    }

    #[test]
    fn multiple_missing_are_listed_together() {
        let findings = check("- name: bad\n  template:\n    mode: '0644'\n");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("src"));
        assert!(findings[0].message.contains("dest"));
    }

    #[test]
    fn inline_kv_shorthand_counts_as_supplied() {
        let findings = check("- name: ok\n  lineinfile: path=/etc/hosts line=x\n");
        assert!(findings.is_empty());
        let findings = check("- name: bad\n  lineinfile: line=x\n");
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn templated_args_are_skipped() {
        let findings = check("- name: ok\n  copy: \"{{ copy_args }}\"\n");
        assert!(findings.is_empty());
    }

    #[test]
    fn unknown_modules_are_out_of_scope() {
        let findings = check("- name: other rule\n  frobnicate:\n    a: b\n");
        assert!(findings.is_empty());
    }
}
