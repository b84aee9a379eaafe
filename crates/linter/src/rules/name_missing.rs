use crate::diagnostics::{Finding, Severity};
use crate::playbook;
use crate::rules::LintRule;
use playlint_resolver::ReferenceResolver;
use playlint_syntax::{Document, NodeRef};

/// Every task should carry a `name` so run output is self-describing.
///
/// Block wrapper tasks are exempt: they group other tasks and frequently
/// stay anonymous by convention.
pub struct NameMissingRule;

impl LintRule for NameMissingRule {
    fn id(&self) -> &'static str {
        "name_missing"
    }

    fn description(&self) -> &'static str {
        "Tasks should be named"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn tags(&self) -> &'static [&'static str] {
        &["naming", "readability"]
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
        if playbook::task_name(node).is_some() {
            return Vec::new();
        }
        if node.get("block").is_some() {
            return Vec::new();
        }
        let message = match playbook::action_of(node) {
            Some((module, _)) => format!("task ({module}) has no name"),
            None => "task has no name".to_string(),
        };
        vec![Finding::warning(self.id(), doc.path(), *node.span(), message).with_path(node.path())]
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
        let rule = NameMissingRule;
        doc.nodes()
            .filter(|n| rule.applicable(*n))
            .flat_map(|n| rule.evaluate(n, &doc, &resolver))
            .collect()
    }

    #[test]
    fn named_task_passes() {
        let findings = check("- name: do it\n  ping:\n");
        assert!(findings.is_empty());
    }

    #[test]
    fn unnamed_task_is_reported() {
        let findings = check("- ping:\n");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("ping"));
        assert_eq!(findings[0].path.as_ref().unwrap().to_string(), "[0]");
    }

    #[test]
    fn empty_name_counts_as_missing() {
        let findings = check("- name: ''\n  ping:\n");
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn block_wrappers_are_exempt() {
        let findings = check(
            "- hosts: all\n  tasks:\n    - block:\n        - name: inner\n          ping:\n",
        );
        assert!(findings.is_empty());
    }
}
