//! End-to-end pipeline tests: parse, match, suppress, aggregate, fix.

use playlint_linter::{
    load_documents, Finding, FindingKind, Linter, LintRule, Profile, RuleOverrides, RuleRegistry,
    Severity, SuppressionConfig,
};
use playlint_resolver::ReferenceResolver;
use playlint_syntax::{Document, NodeRef};
use std::sync::Arc;
use std::time::Duration;

const SITE: &str = "\
- name: provision web
  hosts: webservers
  tasks:
    - name: install nginx
      apt:
        name: nginx
        update_cache: yes
    - apt:
        name: curl
    - name: install nginx
      apt:
        name: nginx-extras
";

#[test]
fn report_order_is_file_line_rule() {
    let (documents, _) = load_documents(&[("site.yml", SITE)]);
    let report = Linter::new(Profile::production()).run(&documents).unwrap();
    let rules: Vec<_> = report
        .findings
        .iter()
        .map(|f| (f.rule.as_str(), f.span.start.line))
        .collect();
    assert_eq!(
        rules,
        vec![
            ("truthy_value", 7),
            ("name_missing", 8),
            ("name_duplicate", 10),
        ]
    );
}

#[test]
fn min_profile_only_runs_correctness_rules() {
    let (documents, _) = load_documents(&[("site.yml", SITE)]);
    let report = Linter::new(Profile::min()).run(&documents).unwrap();
    // No unknown modules and no missing required args in SITE.
    assert!(report.findings.is_empty());
}

#[test]
fn production_promotes_name_missing_to_error() {
    let (documents, _) = load_documents(&[("site.yml", "- ping:\n")]);
    let report = Linter::new(Profile::production()).run(&documents).unwrap();
    assert!(report.has_errors());
    assert_eq!(report.findings[0].rule, "name_missing");
    assert_eq!(report.findings[0].severity, Severity::Error);
}

#[test]
fn skip_list_is_path_precise() {
    let suppressions: SuppressionConfig = serde_yaml::from_str(
        "
legacy/*.yml:
  name_missing: skip
",
    )
    .unwrap();
    let (documents, _) = load_documents(&[
        ("legacy/old.yml", "- ping:\n"),
        ("current.yml", "- ping:\n"),
    ]);
    let report = Linter::new(Profile::basic())
        .with_suppressions(suppressions)
        .run(&documents)
        .unwrap();
    let name_missing: Vec<_> = report
        .findings
        .iter()
        .filter(|f| f.rule == "name_missing")
        .collect();
    assert_eq!(name_missing.len(), 1);
    assert_eq!(name_missing[0].file.to_str(), Some("current.yml"));
}

#[test]
fn inline_noqa_suppresses_and_stale_noqa_is_reported() {
    let source = "\
- ping: # noqa: name_missing
- name: fine
  ping: # noqa: name_missing
";
    let (documents, _) = load_documents(&[("site.yml", source)]);
    let report = Linter::new(Profile::basic()).run(&documents).unwrap();
    assert!(report.findings.iter().all(|f| f.rule != "name_missing"));
    let stale: Vec<_> = report
        .findings
        .iter()
        .filter(|f| f.kind == FindingKind::UnusedSuppression)
        .collect();
    assert_eq!(stale.len(), 1);
    assert_eq!(stale[0].span.start.line, 3);
}

#[test]
fn parse_failures_become_findings_and_other_files_still_lint() {
    let (documents, failures) = load_documents(&[
        ("broken.yml", "tasks: [unclosed\n"),
        ("ok.yml", "- ping:\n"),
    ]);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].kind, FindingKind::ParseFailure);
    let report = Linter::new(Profile::basic()).run(&documents).unwrap();
    assert!(report.findings.iter().any(|f| f.rule == "name_missing"));
}

#[test]
fn fixes_edit_reparse_and_verify() {
    let source = "\
- name: configure
  hosts: all
  tasks:
    - name: toggle
      apt:
        name: nginx
        update_cache: yes
    - name: check
      shell: uptime
";
    let (documents, _) = load_documents(&[("site.yml", source)]);
    let fixed = Linter::new(Profile::production())
        .run_with_fixes(documents)
        .unwrap();
    assert_eq!(fixed.resolved.len(), 2);
    assert!(fixed.unresolved.is_empty());
    let text = fixed.documents[0].render();
    assert!(text.contains("update_cache: true"));
    assert!(text.contains("command: uptime"));
    // The post-fix report is clean.
    assert!(fixed.report.findings.is_empty());
    assert_eq!(fixed.documents[0].revision(), 1);
}

#[test]
fn shell_with_pipes_is_left_alone() {
    let source = "- name: count\n  shell: ps aux | wc -l\n";
    let (documents, _) = load_documents(&[("site.yml", source)]);
    let fixed = Linter::new(Profile::production())
        .run_with_fixes(documents)
        .unwrap();
    assert!(fixed.resolved.is_empty());
    assert_eq!(fixed.documents[0].render(), source);
}

struct ExplodingRule;

impl LintRule for ExplodingRule {
    fn id(&self) -> &'static str {
        "exploding"
    }
    fn description(&self) -> &'static str {
        "panics on every mapping"
    }
    fn default_severity(&self) -> Severity {
        Severity::Warning
    }
    fn applicable(&self, node: NodeRef<'_>) -> bool {
        node.is_mapping()
    }
    fn evaluate(
        &self,
        _: NodeRef<'_>,
        _: &Document,
        _: &dyn ReferenceResolver,
    ) -> Vec<Finding> {
        panic!("rule bug")
    }
}

#[test]
fn a_broken_rule_does_not_take_down_the_run() {
    let mut registry = RuleRegistry::with_default_rules();
    registry.register(Arc::new(ExplodingRule)).unwrap();
    let (documents, _) = load_documents(&[("site.yml", SITE)]);
    let report = Linter::new(Profile::basic().enable("exploding"))
        .with_registry(registry)
        .run(&documents)
        .unwrap();
    let internal: Vec<_> = report
        .findings
        .iter()
        .filter(|f| f.kind == FindingKind::InternalError)
        .collect();
    assert_eq!(internal.len(), 1);
    assert!(internal[0].message.contains("rule bug"));
    // The healthy rules still reported.
    assert!(report.findings.iter().any(|f| f.rule == "name_missing"));
}

#[test]
fn zero_timeout_reports_partial_coverage() {
    let (documents, _) = load_documents(&[("a.yml", "- ping:\n"), ("b.yml", "- ping:\n")]);
    let report = Linter::new(Profile::basic())
        .with_timeout(Duration::ZERO)
        .run(&documents)
        .unwrap();
    assert!(report.deadline_exceeded);
    assert_eq!(report.processed, 0);
}

#[test]
fn unknown_rule_in_overrides_fails_the_run() {
    let overrides = RuleOverrides {
        enable: vec!["no_such_rule".into()],
        ..Default::default()
    };
    let (documents, _) = load_documents(&[("site.yml", "- ping:\n")]);
    let result = Linter::new(Profile::basic())
        .with_overrides(overrides)
        .run(&documents);
    assert!(result.is_err());
}
