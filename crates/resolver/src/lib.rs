//! # Module Reference Resolution
//!
//! Translates task action references (`copy`, `ansible.builtin.copy`) into
//! declared parameter schemas. The resolver is a pure query service: it is
//! loaded once before matching begins, never mutated afterwards, and safe to
//! share across document workers without locking.

use serde::Deserialize;
use std::collections::HashMap;

/// Declared parameter schema for one module.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModuleSchema {
    /// Fully qualified or short module name.
    pub name: String,
    /// Parameters that must be present in the task's arguments.
    #[serde(default)]
    pub required: Vec<String>,
    /// All known parameter names.
    #[serde(default)]
    pub params: Vec<String>,
    /// Replacement note for deprecated modules, if any.
    #[serde(default)]
    pub redirect: Option<String>,
}

impl ModuleSchema {
    #[must_use]
    pub fn knows_param(&self, name: &str) -> bool {
        self.params.iter().any(|p| p == name)
    }
}

/// Result of a reference lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<'a> {
    Schema(&'a ModuleSchema),
    Unknown,
}

impl<'a> Lookup<'a> {
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// The schema, borrowed for the resolver's lifetime rather than this
    /// lookup's.
    #[must_use]
    pub const fn schema(&self) -> Option<&'a ModuleSchema> {
        match self {
            Self::Schema(s) => Some(*s),
            Self::Unknown => None,
        }
    }
}

/// Side-effect-free reference lookup, shared read-only across workers.
pub trait ReferenceResolver: Send + Sync {
    fn lookup(&self, name: &str) -> Lookup<'_>;
}

/// Catalog load failure.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid module catalog: {0}")]
    Invalid(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct Catalog {
    modules: Vec<ModuleSchema>,
}

/// Resolver over an immutable module catalog.
///
/// Lookup tries the exact reference first, then the short name (last
/// dot-separated segment) so `ansible.builtin.copy` and `copy` resolve to
/// the same schema.
#[derive(Debug, Default)]
pub struct StaticResolver {
    modules: HashMap<String, ModuleSchema>,
}

impl StaticResolver {
    #[must_use]
    pub fn new(schemas: Vec<ModuleSchema>) -> Self {
        let mut modules: HashMap<String, ModuleSchema> = HashMap::new();
        for schema in schemas {
            // Index qualified names under their short form too, so `copy`
            // finds a catalog entry named `ansible.builtin.copy`. Explicit
            // entries always win over derived aliases.
            if let Some(short) = schema.name.rsplit('.').next() {
                if short != schema.name && !modules.contains_key(short) {
                    modules.insert(short.to_string(), schema.clone());
                }
            }
            modules.insert(schema.name.clone(), schema);
        }
        Self { modules }
    }

    /// Load a catalog from its JSON serialization:
    /// `{"modules": [{"name": "copy", "required": ["dest"], ...}]}`.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(json)?;
        Ok(Self::new(catalog.modules))
    }

    /// A small catalog of ubiquitous builtin modules, enough for defaults
    /// and tests. Real runs load a generated catalog via [`Self::from_json`].
    #[must_use]
    pub fn builtin() -> Self {
        let schema = |name: &str, required: &[&str], params: &[&str]| ModuleSchema {
            name: name.to_string(),
            required: required.iter().map(ToString::to_string).collect(),
            params: params.iter().map(ToString::to_string).collect(),
            redirect: None,
        };
        Self::new(vec![
            schema("command", &[], &["cmd", "argv", "chdir", "creates", "removes"]),
            schema("shell", &[], &["cmd", "chdir", "creates", "removes", "executable"]),
            schema("raw", &[], &["executable"]),
            schema("script", &[], &["cmd", "chdir", "creates", "executable"]),
            schema("debug", &[], &["msg", "var", "verbosity"]),
            schema("ping", &[], &["data"]),
            schema("set_fact", &[], &[]),
            schema(
                "copy",
                &["dest"],
                &["src", "dest", "content", "mode", "owner", "group", "backup"],
            ),
            schema(
                "template",
                &["src", "dest"],
                &["src", "dest", "mode", "owner", "group", "backup"],
            ),
            schema(
                "file",
                &["path"],
                &["path", "state", "mode", "owner", "group", "recurse"],
            ),
            schema(
                "service",
                &["name"],
                &["name", "state", "enabled", "pattern"],
            ),
            schema(
                "apt",
                &[],
                &["name", "state", "update_cache", "cache_valid_time", "force"],
            ),
            schema(
                "user",
                &["name"],
                &["name", "state", "groups", "shell", "home"],
            ),
            schema(
                "git",
                &["repo", "dest"],
                &["repo", "dest", "version", "depth", "update"],
            ),
            schema(
                "lineinfile",
                &["path"],
                &["path", "line", "regexp", "state", "create"],
            ),
            schema("include_tasks", &[], &["file", "apply"]),
            ModuleSchema {
                redirect: Some("include_tasks".to_string()),
                ..schema("include", &[], &["file"])
            },
        ])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl ReferenceResolver for StaticResolver {
    fn lookup(&self, name: &str) -> Lookup<'_> {
        if let Some(schema) = self.modules.get(name) {
            return Lookup::Schema(schema);
        }
        if let Some(short) = name.rsplit('.').next() {
            if short != name {
                if let Some(schema) = self.modules.get(short) {
                    return Lookup::Schema(schema);
                }
            }
        }
        Lookup::Unknown
    }
}
