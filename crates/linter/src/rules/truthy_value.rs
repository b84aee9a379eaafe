use crate::diagnostics::{Finding, Fix, Severity};
use crate::rules::LintRule;
use playlint_resolver::ReferenceResolver;
use playlint_syntax::{Document, NodeRef, ScalarValue};
use serde_json::json;

/// Non-canonical booleans (`yes`, `no`, `on`, `off`) in plain scalars.
///
/// The runtime still coerces these YAML 1.1 spellings, but they are a
/// perpetual source of confusion next to YAML 1.2 parsers. Fixable: the
/// scalar is rewritten to `true`/`false`.
pub struct TruthyValueRule;

const TRUTHY: &[(&str, &str)] = &[
    ("yes", "true"),
    ("Yes", "true"),
    ("YES", "true"),
    ("on", "true"),
    ("On", "true"),
    ("ON", "true"),
    ("no", "false"),
    ("No", "false"),
    ("NO", "false"),
    ("off", "false"),
    ("Off", "false"),
    ("OFF", "false"),
];

fn canonical(raw: &str) -> Option<&'static str> {
    TRUTHY
        .iter()
        .find(|(spelling, _)| *spelling == raw)
        .map(|(_, canonical)| *canonical)
}

impl LintRule for TruthyValueRule {
    fn id(&self) -> &'static str {
        "truthy_value"
    }

    fn description(&self) -> &'static str {
        "Booleans should be spelled true or false"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn tags(&self) -> &'static [&'static str] {
        &["formatting"]
    }

    fn applicable(&self, node: NodeRef<'_>) -> bool {
        node.is_scalar()
    }

    fn evaluate(
        &self,
        node: NodeRef<'_>,
        doc: &Document,
        _resolver: &dyn ReferenceResolver,
    ) -> Vec<Finding> {
        // Quoted spellings are deliberate strings; only plain scalars
        // (raw text identical to the resolved string) are flagged.
        let raw = node.raw();
        if node.value() != Some(&ScalarValue::Str(raw.to_string())) {
            return Vec::new();
        }
        let Some(canonical) = canonical(raw) else {
            return Vec::new();
        };
        vec![
            Finding::warning(
                self.id(),
                doc.path(),
                *node.span(),
                format!("truthy value '{raw}' should be '{canonical}'"),
            )
            .with_path(node.path())
            .with_detail(json!({ "replacement": canonical })),
        ]
    }

    fn supports_fix(&self) -> bool {
        true
    }

    fn fix(&self, finding: &Finding, _doc: &Document) -> Option<Fix> {
        let replacement = finding.detail.as_ref()?.get("replacement")?.as_str()?;
        Some(Fix::replace(
            format!("replace with '{replacement}'"),
            finding.span.start.offset,
            finding.span.end.offset,
            replacement,
        ))
    }
}
