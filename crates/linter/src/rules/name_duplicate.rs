use crate::diagnostics::{Finding, Severity};
use crate::playbook;
use crate::rules::LintRule;
use playlint_resolver::ReferenceResolver;
use playlint_syntax::Document;
use std::collections::HashMap;

/// Task names must be unique within a document.
///
/// Duplicate names make `--start-at-task` ambiguous and run output
/// misleading. This is a whole-document pass: the first occurrence wins and
/// every later duplicate is reported at its `name` value.
pub struct NameDuplicateRule;

impl LintRule for NameDuplicateRule {
    fn id(&self) -> &'static str {
        "name_duplicate"
    }

    fn description(&self) -> &'static str {
        "Task names should be unique within a document"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn tags(&self) -> &'static [&'static str] {
        &["naming"]
    }

    fn check_document(&self, doc: &Document, _resolver: &dyn ReferenceResolver) -> Vec<Finding> {
        let mut first_seen: HashMap<&str, usize> = HashMap::new();
        let mut findings = Vec::new();
        for task in playbook::tasks(doc) {
            let Some(name) = playbook::task_name(task) else {
                continue;
            };
            let Some(name_node) = task.get("name") else {
                continue;
            };
            let line = name_node.span().start.line;
            match first_seen.get(name) {
                None => {
                    first_seen.insert(name, line);
                }
                Some(first_line) => {
                    findings.push(
                        Finding::warning(
                            self.id(),
                            doc.path(),
                            *name_node.span(),
                            format!(
                                "task name '{name}' is already used at line {first_line}"
                            ),
                        )
                        .with_path(name_node.path()),
                    );
                }
            }
        }
        findings
    }
}
