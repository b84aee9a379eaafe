use crate::diagnostics::{Finding, Fix, Severity};
use crate::playbook;
use crate::rules::LintRule;
use playlint_resolver::ReferenceResolver;
use playlint_syntax::{Document, NodeKind, NodeRef, ScalarValue};
use serde_json::json;

/// `shell` invocations that don't use any shell feature should be
/// `command`: same behavior, no shell injection surface. Fixable: the
/// action key is rewritten in place, preserving a collection prefix.
pub struct CommandInsteadOfShellRule;

const SHELL_MODULES: &[&str] = &["shell", "ansible.builtin.shell"];

fn uses_shell_features(cmd: &str) -> bool {
    cmd.chars()
        .any(|c| matches!(c, '|' | '&' | ';' | '<' | '>' | '$' | '*' | '`' | '?' | '~'))
}

fn command_text(args: NodeRef<'_>) -> Option<&str> {
    match args.kind() {
        NodeKind::Scalar => args.as_str(),
        NodeKind::Mapping => args.get("cmd")?.as_str(),
        NodeKind::Sequence => None,
    }
}

impl LintRule for CommandInsteadOfShellRule {
    fn id(&self) -> &'static str {
        "command_instead_of_shell"
    }

    fn description(&self) -> &'static str {
        "Use command unless shell features are needed"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn tags(&self) -> &'static [&'static str] {
        &["safety"]
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
        let Some((module, args)) = playbook::action_of(node) else {
            return Vec::new();
        };
        if !SHELL_MODULES.contains(&module) {
            return Vec::new();
        }
        let Some(cmd) = command_text(args) else {
            return Vec::new();
        };
        if matches!(args.value(), Some(ScalarValue::Template)) || uses_shell_features(cmd) {
            return Vec::new();
        }
        let replacement = module.replacen("shell", "command", 1);
        let span = args.key_span().copied().unwrap_or(*args.span());
        vec![
            Finding::warning(
                self.id(),
                doc.path(),
                span,
                format!("command '{cmd}' uses no shell features, use '{replacement}'"),
            )
            .with_path(node.path())
            .with_detail(json!({ "replacement": replacement })),
        ]
    }

    fn supports_fix(&self) -> bool {
        true
    }

    fn fix(&self, finding: &Finding, _doc: &Document) -> Option<Fix> {
        let replacement = finding.detail.as_ref()?.get("replacement")?.as_str()?;
        Some(Fix::replace(
            format!("rewrite action to '{replacement}'"),
            finding.span.start.offset,
            finding.span.end.offset,
            replacement,
        ))
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
        let rule = CommandInsteadOfShellRule;
        doc.nodes()
            .filter(|n| rule.applicable(*n))
            .flat_map(|n| rule.evaluate(n, &doc, &resolver))
            .collect()
    }

    #[test]
    fn pipes_justify_shell() {
        let findings = check("- name: count\n  shell: ps aux | wc -l\n");
        assert!(findings.is_empty());
    }

    #[test]
    fn variable_expansion_justifies_shell() {
        let findings = check("- name: home\n  shell: ls $HOME\n");
        assert!(findings.is_empty());
    }

    #[test]
    fn plain_command_is_flagged() {
        let findings = check("- name: uptime\n  shell: uptime\n");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("'command'"));
    }

    #[test]
    fn cmd_key_form_is_checked_too() {
        let findings = check("- name: uptime\n  shell:\n    cmd: uptime\n");
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn command_module_passes() {
        let findings = check("- name: uptime\n  command: uptime\n");
        assert!(findings.is_empty());
    }

    #[test]
    fn fix_rewrites_the_action_key_preserving_prefix() {
        let source = "- name: uptime\n  ansible.builtin.shell: uptime\n";
        let doc = Document::parse("test.yml", source).unwrap();
        let findings = check(source);
        assert_eq!(findings.len(), 1);
        let fix = CommandInsteadOfShellRule.fix(&findings[0], &doc).unwrap();
        let edit = &fix.edits[0];
        assert_eq!(&source[edit.start..edit.end], "ansible.builtin.shell");
        assert_eq!(edit.new_text, "ansible.builtin.command");
    }
}
