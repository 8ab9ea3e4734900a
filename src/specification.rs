use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Prefix for schema references in the components section
pub const REF_PREFIX: &str = "#/components/schemas/";

/// Data type names used in schema `type` fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Null,
    Object,
    Array,
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SchemaType::String => "string",
            SchemaType::Number => "number",
            SchemaType::Integer => "integer",
            SchemaType::Boolean => "boolean",
            SchemaType::Null => "null",
            SchemaType::Object => "object",
            SchemaType::Array => "array",
        };
        f.write_str(name)
    }
}

/// Set of data types carried by one schema's `type` field
///
/// A single member serializes as a bare string, several members as an array.
/// Nullability of a primitive is expressed by adding `null` to this set
/// instead of wrapping the schema in a union.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypeSet(Vec<SchemaType>);

impl TypeSet {
    /// Create a set with a single member
    pub fn single(ty: SchemaType) -> Self {
        Self(vec![ty])
    }

    /// Add a member unless it is already present
    pub fn insert(&mut self, ty: SchemaType) {
        if !self.0.contains(&ty) {
            self.0.push(ty);
        }
    }

    pub fn contains(&self, ty: SchemaType) -> bool {
        self.0.contains(&ty)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[SchemaType] {
        &self.0
    }
}

impl From<SchemaType> for TypeSet {
    fn from(ty: SchemaType) -> Self {
        Self::single(ty)
    }
}

impl Serialize for TypeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.len() == 1 {
            self.0[0].serialize(serializer)
        } else {
            self.0.serialize(serializer)
        }
    }
}

/// One node of the schema tree
///
/// The variants mirror the shapes the synthesis engine can emit: a leaf
/// primitive, an object with properties, an array, a named reference, an
/// `allOf` inheritance composition, or an `anyOf` union used to express a
/// nullable reference. Serialization is untagged so each variant writes its
/// natural wire form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Schema {
    Reference(SchemaRef),
    AllOf(Composition),
    AnyOf(NullableUnion),
    Array(ArraySchema),
    Object(ObjectSchema),
    Primitive(PrimitiveSchema),
}

impl Schema {
    /// A reference to a named schema in the components section
    pub fn reference(name: &str) -> Self {
        Schema::Reference(SchemaRef::new(name))
    }

    /// The most permissive schema: no constraints at all
    pub fn untyped() -> Self {
        Schema::Primitive(PrimitiveSchema::default())
    }

    /// The `null` type marker used as a union branch
    pub fn null() -> Self {
        Schema::Primitive(PrimitiveSchema {
            types: TypeSet::single(SchemaType::Null),
            ..Default::default()
        })
    }

    /// An object schema with no properties
    pub fn empty_object() -> Self {
        Schema::Object(ObjectSchema::default())
    }

    pub fn as_primitive(&self) -> Option<&PrimitiveSchema> {
        match self {
            Schema::Primitive(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectSchema> {
        match self {
            Schema::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArraySchema> {
        match self {
            Schema::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&SchemaRef> {
        match self {
            Schema::Reference(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_all_of(&self) -> Option<&Composition> {
        match self {
            Schema::AllOf(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_any_of(&self) -> Option<&NullableUnion> {
        match self {
            Schema::AnyOf(u) => Some(u),
            _ => None,
        }
    }

    /// Attach a default value where the node can legally carry one
    ///
    /// References cannot carry defaults; the value is dropped there since the
    /// constraint belongs on the referenced schema instead.
    pub fn set_default(&mut self, value: Value) {
        match self {
            Schema::Primitive(p) => p.default = Some(value),
            Schema::Object(o) => o.default = Some(value),
            Schema::Array(a) => a.default = Some(value),
            Schema::AnyOf(u) => u.default = Some(value),
            Schema::Reference(_) | Schema::AllOf(_) => {}
        }
    }
}

/// Named pointer to a registered schema
///
/// A reference can carry at most title/description overrides; every other
/// constraint must live on the referenced schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaRef {
    #[serde(rename = "$ref")]
    pub reference: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SchemaRef {
    pub fn new(name: &str) -> Self {
        Self {
            reference: format!("{}{}", REF_PREFIX, name),
            title: None,
            description: None,
        }
    }

    /// The bare schema name this reference points at
    pub fn name(&self) -> &str {
        self.reference
            .strip_prefix(REF_PREFIX)
            .unwrap_or(&self.reference)
    }
}

/// Leaf value schema (string/number/integer/boolean/null)
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PrimitiveSchema {
    #[serde(rename = "type", skip_serializing_if = "TypeSet::is_empty")]
    pub types: TypeSet,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Enumerated literal set; non-empty only for enumeration schemas
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,

    #[serde(rename = "exclusiveMinimum", skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<bool>,

    #[serde(rename = "exclusiveMaximum", skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<bool>,

    #[serde(rename = "minLength", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,

    #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(rename = "readOnly", skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,

    #[serde(rename = "writeOnly", skip_serializing_if = "Option::is_none")]
    pub write_only: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,

    /// Vendor extensions (`x-…` keys), flattened into the node
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

/// Value of an object's `additionalProperties` field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    /// Blanket allow/deny
    Allowed(bool),
    /// Constrained wildcard: every extra property must match this schema
    Schema(Box<Schema>),
}

/// Object schema with an ordered property map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectSchema {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    #[serde(rename = "additionalProperties", skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,

    #[serde(rename = "minProperties", skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<u64>,

    #[serde(rename = "maxProperties", skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<u64>,

    #[serde(rename = "unevaluatedProperties", skip_serializing_if = "Option::is_none")]
    pub unevaluated_properties: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    #[serde(rename = "readOnly", skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,

    #[serde(rename = "writeOnly", skip_serializing_if = "Option::is_none")]
    pub write_only: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,

    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl Default for ObjectSchema {
    fn default() -> Self {
        Self {
            schema_type: SchemaType::Object,
            title: None,
            description: None,
            properties: IndexMap::new(),
            required: Vec::new(),
            additional_properties: None,
            min_properties: None,
            max_properties: None,
            unevaluated_properties: None,
            default: None,
            example: None,
            read_only: None,
            write_only: None,
            deprecated: None,
            extensions: IndexMap::new(),
        }
    }
}

/// Array schema wrapping an item schema
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArraySchema {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub items: Box<Schema>,

    #[serde(rename = "minItems", skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,

    #[serde(rename = "maxItems", skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,

    #[serde(rename = "uniqueItems", skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl ArraySchema {
    pub fn new(items: Schema) -> Self {
        Self {
            schema_type: SchemaType::Array,
            title: None,
            description: None,
            items: Box::new(items),
            min_items: None,
            max_items: None,
            unique_items: None,
            default: None,
            example: None,
            extensions: IndexMap::new(),
        }
    }
}

/// `allOf` composition expressing single inheritance
///
/// The base type comes first as a reference; the sibling object schema with
/// the subtype's own declared properties follows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Composition {
    #[serde(rename = "allOf")]
    pub all_of: Vec<Schema>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Composition {
    pub fn new(base: SchemaRef) -> Self {
        Self {
            all_of: vec![Schema::Reference(base)],
            title: None,
            description: None,
        }
    }

    pub fn push(&mut self, schema: Schema) {
        self.all_of.push(schema);
    }
}

/// `anyOf` union used only to express a nullable reference or enum
///
/// A bare reference cannot carry a null branch itself, and the referenced
/// schema may be reused non-nullable elsewhere, so the null marker lives in
/// this wrapper instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NullableUnion {
    #[serde(rename = "anyOf")]
    pub any_of: Vec<Schema>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl NullableUnion {
    pub fn new(inner: Schema) -> Self {
        Self {
            any_of: vec![inner, Schema::null()],
            title: None,
            description: None,
            default: None,
        }
    }

    /// The non-null branch of the union
    pub fn inner(&self) -> Option<&Schema> {
        self.any_of.first()
    }

    pub fn inner_mut(&mut self) -> Option<&mut Schema> {
        self.any_of.first_mut()
    }
}
