//! Property tests for the order- and determinism-sensitive stages.

use playlint_linter::{
    aggregate, Finding, Linter, Profile, RuleOverrides, RuleRegistry, Severity,
};
use playlint_syntax::{Document, Position, Span};
use proptest::prelude::*;

const RULE_IDS: &[&str] = &[
    "name_missing",
    "name_duplicate",
    "truthy_value",
    "deprecated_local_action",
    "deprecated_module",
    "unknown_module",
    "required_argument",
    "unknown_parameter",
    "handler_undefined",
    "command_instead_of_shell",
];

fn arb_overrides() -> impl Strategy<Value = RuleOverrides> {
    let id = prop::sample::select(RULE_IDS);
    (
        prop::collection::vec(id.clone(), 0..4),
        prop::collection::vec(id, 0..4),
    )
        .prop_map(|(enable, disable)| RuleOverrides {
            enable: enable.into_iter().map(str::to_string).collect(),
            disable: disable.into_iter().map(str::to_string).collect(),
            severity: Default::default(),
        })
}

fn arb_finding() -> impl Strategy<Value = Finding> {
    (
        prop::sample::select(&["a.yml", "b.yml", "c.yml"][..]),
        1usize..40,
        0usize..10,
        prop::sample::select(RULE_IDS),
        prop::sample::select(&["m1", "m2", "m3"][..]),
    )
        .prop_map(|(file, line, column, rule, message)| {
            let start = Position {
                line,
                column,
                offset: line * 100 + column,
            };
            Finding::new(rule, file, Span::new(start, start), Severity::Warning, message)
        })
}

/// A small playbook assembled from known-good pieces, so it always parses.
fn arb_playbook() -> impl Strategy<Value = String> {
    let task = (
        "[a-z]{1,8}",
        prop::sample::select(&["ping", "debug", "apt", "command"][..]),
        prop::bool::ANY,
    )
        .prop_map(|(name, module, named)| {
            if named {
                format!("- name: {name}\n  {module}:\n")
            } else {
                format!("- {module}:\n")
            }
        });
    prop::collection::vec(task, 1..6).prop_map(|tasks| tasks.concat())
}

proptest! {
    #[test]
    fn resolution_is_deterministic(overrides in arb_overrides()) {
        let registry = RuleRegistry::with_default_rules();
        let profile = Profile::basic();
        let first = registry.resolve(&profile, &overrides).unwrap();
        let second = registry.resolve(&profile, &overrides).unwrap();
        let ids = |e: &playlint_linter::EffectiveRules| -> Vec<&'static str> {
            e.iter().map(|r| r.rule.id()).collect()
        };
        prop_assert_eq!(ids(&first), ids(&second));
        // Every enabled rule really is enabled, every disabled-but-not-enabled
        // rule really is off.
        for rule in &overrides.enable {
            prop_assert!(first.contains(rule));
        }
        for rule in &overrides.disable {
            if !overrides.enable.contains(rule) {
                prop_assert!(!first.contains(rule));
            }
        }
    }

    #[test]
    fn assemble_is_idempotent(findings in prop::collection::vec(arb_finding(), 0..30)) {
        let once = aggregate::assemble(findings);
        let twice = aggregate::assemble(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn assemble_never_grows(findings in prop::collection::vec(arb_finding(), 0..30)) {
        let n = findings.len();
        prop_assert!(aggregate::assemble(findings).len() <= n);
    }

    #[test]
    fn parse_round_trips(source in arb_playbook()) {
        let doc = Document::parse("gen.yml", source.as_str()).unwrap();
        prop_assert_eq!(doc.render(), source.as_str());
    }

    #[test]
    fn runs_are_deterministic(source in arb_playbook()) {
        let linter = Linter::new(Profile::production());
        let doc = Document::parse("gen.yml", source.as_str()).unwrap();
        let first = linter.run(std::slice::from_ref(&doc)).unwrap();
        let second = linter.run(std::slice::from_ref(&doc)).unwrap();
        prop_assert_eq!(first.findings, second.findings);
    }
}
