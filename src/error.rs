use thiserror::Error;

/// Result type for schema generation operations
pub type SchemaResult<T> = Result<T, SchemaGenError>;

/// Errors that can occur during schema synthesis
///
/// Configuration errors carry the identity of the offending type or property
/// and abort the build of the single schema they concern. Best-effort
/// degradations (instantiation failures, unknown annotation shapes) are never
/// surfaced through this enum; they are absorbed and logged.
#[derive(Debug, Error)]
pub enum SchemaGenError {
    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O error (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A named type was demanded but is not present in the type catalog
    #[error("unknown type `{type_name}` (requested by `{requested_by}`)")]
    UnknownType {
        type_name: String,
        requested_by: String,
    },

    /// A by-reference emission was requested for a name never registered
    #[error("schema `{name}` is not registered (requested by `{requested_by}`)")]
    MissingReference { name: String, requested_by: String },

    /// Conflicting inheritance declarations on a single type
    #[error("conflicting inheritance declarations on `{type_name}`: {reason}")]
    ConflictingComposition { type_name: String, reason: String },

    /// A required-property name that matches no declared property
    #[error("required property `{property}` is not declared on `{type_name}`")]
    UnknownRequiredProperty { type_name: String, property: String },

    /// Nesting depth guard tripped on a pathologically deep type graph
    #[error("maximum schema nesting depth {limit} exceeded while building `{type_name}`")]
    DepthExceeded { type_name: String, limit: usize },

    /// Generic error with context
    #[error("schema generation error: {0}")]
    Generic(String),
}

impl SchemaGenError {
    /// Create a new unknown-type error
    pub fn unknown_type<T: ToString, R: ToString>(type_name: T, requested_by: R) -> Self {
        Self::UnknownType {
            type_name: type_name.to_string(),
            requested_by: requested_by.to_string(),
        }
    }

    /// Create a new missing-reference error
    pub fn missing_reference<N: ToString, R: ToString>(name: N, requested_by: R) -> Self {
        Self::MissingReference {
            name: name.to_string(),
            requested_by: requested_by.to_string(),
        }
    }

    /// Create a new conflicting-composition error
    pub fn conflicting_composition<T: ToString, R: ToString>(type_name: T, reason: R) -> Self {
        Self::ConflictingComposition {
            type_name: type_name.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a new unknown-required-property error
    pub fn unknown_required_property<T: ToString, P: ToString>(type_name: T, property: P) -> Self {
        Self::UnknownRequiredProperty {
            type_name: type_name.to_string(),
            property: property.to_string(),
        }
    }

    /// Create a new depth-exceeded error
    pub fn depth_exceeded<T: ToString>(type_name: T, limit: usize) -> Self {
        Self::DepthExceeded {
            type_name: type_name.to_string(),
            limit,
        }
    }

    /// Create a generic error
    pub fn generic<T: ToString>(msg: T) -> Self {
        Self::Generic(msg.to_string())
    }
}
