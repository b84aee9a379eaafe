//! Built-in lint rules.
//!
//! Each rule is implemented in its own file as a stateless unit struct. The
//! [`LintRule`] trait is a capability interface: a rule opts into node-level
//! matching via `applicable`/`evaluate`, into whole-document matching via
//! `check_document`, and into autofix via `supports_fix`/`fix`.

use crate::diagnostics::{Finding, Fix, Severity};
use playlint_resolver::ReferenceResolver;
use playlint_syntax::{Document, NodeRef};
use std::sync::Arc;

/// A named check over the document model.
///
/// Rules hold no mutable state between documents; everything they need is
/// passed into each call, which is what makes cross-document parallelism
/// safe without synchronization.
pub trait LintRule: Send + Sync {
    /// Unique identifier, stable across versions (e.g. `"truthy_value"`).
    fn id(&self) -> &'static str;

    /// Human-readable description.
    fn description(&self) -> &'static str;

    /// Default severity (profiles and overrides may remap it).
    fn default_severity(&self) -> Severity;

    /// Classification tags.
    fn tags(&self) -> &'static [&'static str] {
        &[]
    }

    /// Whether `evaluate` should run on this node.
    fn applicable(&self, node: NodeRef<'_>) -> bool {
        let _ = node;
        false
    }

    /// Node-level check. Only called when `applicable` returned true.
    fn evaluate(
        &self,
        node: NodeRef<'_>,
        doc: &Document,
        resolver: &dyn ReferenceResolver,
    ) -> Vec<Finding> {
        let _ = (node, doc, resolver);
        Vec::new()
    }

    /// Whole-document pass for cross-node invariants.
    fn check_document(&self, doc: &Document, resolver: &dyn ReferenceResolver) -> Vec<Finding> {
        let _ = (doc, resolver);
        Vec::new()
    }

    /// Whether this rule declares a fix generator.
    fn supports_fix(&self) -> bool {
        false
    }

    /// Generate the fix for one of this rule's findings, as text edits
    /// against the document's current source text.
    fn fix(&self, finding: &Finding, doc: &Document) -> Option<Fix> {
        let _ = (finding, doc);
        None
    }
}

mod command_instead_of_shell;
mod deprecated_local_action;
mod deprecated_module;
mod handler_undefined;
mod name_duplicate;
mod name_missing;
mod required_argument;
mod truthy_value;
mod unknown_module;
mod unknown_parameter;

pub use command_instead_of_shell::CommandInsteadOfShellRule;
pub use deprecated_local_action::DeprecatedLocalActionRule;
pub use deprecated_module::DeprecatedModuleRule;
pub use handler_undefined::HandlerUndefinedRule;
pub use name_duplicate::NameDuplicateRule;
pub use name_missing::NameMissingRule;
pub use required_argument::RequiredArgumentRule;
pub use truthy_value::TruthyValueRule;
pub use unknown_module::UnknownModuleRule;
pub use unknown_parameter::UnknownParameterRule;

/// All built-in rules, in registration order.
#[must_use]
pub fn builtin_rules() -> Vec<Arc<dyn LintRule>> {
    vec![
        Arc::new(NameMissingRule),
        Arc::new(NameDuplicateRule),
        Arc::new(TruthyValueRule),
        Arc::new(DeprecatedLocalActionRule),
        Arc::new(DeprecatedModuleRule),
        Arc::new(UnknownModuleRule),
        Arc::new(RequiredArgumentRule),
        Arc::new(UnknownParameterRule),
        Arc::new(HandlerUndefinedRule),
        Arc::new(CommandInsteadOfShellRule),
    ]
}
