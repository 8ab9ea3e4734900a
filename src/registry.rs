use crate::{
    error::{SchemaGenError, SchemaResult},
    specification::Schema,
};
use indexmap::IndexMap;
use tracing::debug;

/// How a registered schema is handed back to a requesting site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emission {
    /// Return a named reference into the registry
    ByReference,
    /// Return a structural copy of the registered node, deliberately
    /// breaking the shared-identity invariant for one-off embedding
    Inline,
}

/// Name → schema map with write-at-most-once semantics
///
/// Entries already present are treated as built and never recomputed. The
/// registry is an explicit object threaded through every call; a host may
/// keep several side by side (a long-lived published registry and a
/// transient per-operation one) and the synthesis engine accepts either.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: IndexMap<String, Schema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Registered names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Schema)> {
        self.schemas.iter().map(|(name, schema)| (name.as_str(), schema))
    }

    /// Store a schema under a name, keeping any existing entry
    ///
    /// The first write wins; later writes under the same name are ignored so
    /// a name is never rebound once published.
    pub fn register(&mut self, name: &str, schema: Schema) {
        if !self.schemas.contains_key(name) {
            debug!(schema = name, "registering schema");
        }
        self.schemas.entry(name.to_string()).or_insert(schema);
    }

    /// Return the entry under `name`, building it first if absent
    ///
    /// The builder receives the registry so nested schemas can register
    /// themselves. A builder failure commits nothing under `name`.
    pub fn ensure<F>(&mut self, name: &str, build: F) -> SchemaResult<&Schema>
    where
        F: FnOnce(&mut SchemaRegistry) -> SchemaResult<Schema>,
    {
        if !self.schemas.contains_key(name) {
            let schema = build(self)?;
            self.register(name, schema);
        }
        match self.schemas.get(name) {
            Some(schema) => Ok(schema),
            None => Err(SchemaGenError::missing_reference(name, "registry")),
        }
    }

    /// Emit a registered schema in the requested form
    ///
    /// `requested_by` identifies the declaration asking for the schema and is
    /// reported when the name is absent.
    pub fn emit(&self, name: &str, emission: Emission, requested_by: &str) -> SchemaResult<Schema> {
        match emission {
            Emission::ByReference => {
                if self.contains(name) {
                    Ok(Schema::reference(name))
                } else {
                    Err(SchemaGenError::missing_reference(name, requested_by))
                }
            }
            Emission::Inline => self
                .get(name)
                .cloned()
                .ok_or_else(|| SchemaGenError::missing_reference(name, requested_by)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_is_write_once() {
        let mut registry = SchemaRegistry::new();
        registry.register("User", Schema::empty_object());
        registry.register("User", Schema::untyped());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("User"), Some(&Schema::empty_object()));
    }

    #[test]
    fn test_ensure_builds_once() {
        let mut registry = SchemaRegistry::new();
        let mut calls = 0;
        for _ in 0..3 {
            registry
                .ensure("User", |_| {
                    calls += 1;
                    Ok(Schema::empty_object())
                })
                .unwrap();
        }
        assert_eq!(calls, 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_failed_build_commits_nothing() {
        let mut registry = SchemaRegistry::new();
        let result = registry.ensure("Broken", |_| Err(SchemaGenError::generic("boom")));
        assert!(result.is_err());
        assert!(!registry.contains("Broken"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_emit_by_reference() {
        let mut registry = SchemaRegistry::new();
        registry.register("User", Schema::empty_object());
        let schema = registry.emit("User", Emission::ByReference, "caller").unwrap();
        assert_eq!(schema.as_reference().unwrap().name(), "User");
    }

    #[test]
    fn test_emit_inline_clones_the_node() {
        let mut registry = SchemaRegistry::new();
        registry.register("User", Schema::empty_object());
        let schema = registry.emit("User", Emission::Inline, "caller").unwrap();
        assert_eq!(schema, Schema::empty_object());
    }

    #[test]
    fn test_emit_missing_reports_requester() {
        let registry = SchemaRegistry::new();
        let err = registry
            .emit("Ghost", Emission::ByReference, "CreateUserRequest.body")
            .unwrap_err();
        match err {
            SchemaGenError::MissingReference { name, requested_by } => {
                assert_eq!(name, "Ghost");
                assert_eq!(requested_by, "CreateUserRequest.body");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_builder_may_register_nested_schemas() {
        let mut registry = SchemaRegistry::new();
        registry
            .ensure("Outer", |reg| {
                reg.register("Inner", Schema::empty_object());
                Ok(Schema::reference("Inner"))
            })
            .unwrap();
        assert!(registry.contains("Inner"));
        assert!(registry.contains("Outer"));
        assert_eq!(registry.len(), 2);
    }
}
