use crate::specification::Schema;
use indexmap::IndexMap;

/// Configuration for schema generation
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Express optional property types with a null branch
    pub nullable_optional: bool,
    /// Include example values from annotations
    pub include_examples: bool,
    /// Mark non-optional properties as required
    pub require_non_optional: bool,
    /// Nesting depth guard for pathologically deep type graphs
    pub max_depth: usize,
    /// Custom type name → schema overrides, consulted before synthesis
    pub custom_schemas: IndexMap<String, Schema>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            nullable_optional: true,
            include_examples: true,
            require_non_optional: true,
            max_depth: 64,
            custom_schemas: IndexMap::new(),
        }
    }
}

impl GeneratorConfig {
    /// Create new configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set nullable option handling
    pub fn with_nullable_optional(mut self, nullable: bool) -> Self {
        self.nullable_optional = nullable;
        self
    }

    /// Set example inclusion
    pub fn with_examples(mut self, include: bool) -> Self {
        self.include_examples = include;
        self
    }

    /// Set whether non-optional properties become required
    pub fn with_require_non_optional(mut self, require: bool) -> Self {
        self.require_non_optional = require;
        self
    }

    /// Set the nesting depth guard
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Add a custom type mapping
    pub fn with_custom_schema(mut self, type_name: &str, schema: Schema) -> Self {
        self.custom_schemas.insert(type_name.to_string(), schema);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert!(config.nullable_optional);
        assert!(config.include_examples);
        assert!(config.require_non_optional);
        assert_eq!(config.max_depth, 64);
        assert!(config.custom_schemas.is_empty());
    }

    #[test]
    fn test_builder_chain() {
        let config = GeneratorConfig::new()
            .with_nullable_optional(false)
            .with_examples(false)
            .with_max_depth(8)
            .with_custom_schema("Money", Schema::untyped());
        assert!(!config.nullable_optional);
        assert!(!config.include_examples);
        assert_eq!(config.max_depth, 8);
        assert!(config.custom_schemas.contains_key("Money"));
    }
}
