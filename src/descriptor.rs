/*!
Type descriptor input boundary.

The annotation-discovery front end (source scanning, build-time generation)
produces these descriptors; the synthesis engine never parses source syntax
itself. Annotation arguments arrive already resolved to literal form, and the
optional instance snapshot carries a best-effort instantiation of the type for
default-value capture.
*/

use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fmt;

/// Leaf value kinds the primitive mapper understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Text,
    Boolean,
    Int32,
    Int64,
    UInt32,
    UInt64,
    Float,
    Double,
    Decimal,
    Date,
    DateTime,
    Duration,
    Binary,
    Uuid,
    Uri,
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrimitiveKind::Text => "text",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Int32 => "int32",
            PrimitiveKind::Int64 => "int64",
            PrimitiveKind::UInt32 => "uint32",
            PrimitiveKind::UInt64 => "uint64",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::Decimal => "decimal",
            PrimitiveKind::Date => "date",
            PrimitiveKind::DateTime => "date-time",
            PrimitiveKind::Duration => "duration",
            PrimitiveKind::Binary => "binary",
            PrimitiveKind::Uuid => "uuid",
            PrimitiveKind::Uri => "uri",
        };
        f.write_str(name)
    }
}

/// Declared type of a property or array element
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    /// A named type resolved through the catalog
    Named(String),
    /// A bare leaf value kind
    Primitive(PrimitiveKind),
    /// Nullable wrapper around an inner type
    Optional(Box<TypeRef>),
    /// Homogeneous collection of an element type
    Array(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn optional(inner: TypeRef) -> Self {
        TypeRef::Optional(Box::new(inner))
    }

    pub fn array(element: TypeRef) -> Self {
        TypeRef::Array(Box::new(element))
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, TypeRef::Optional(_))
    }

    /// Name of the named type at the root of this reference, if any
    pub fn named_root(&self) -> Option<&str> {
        match self {
            TypeRef::Named(name) => Some(name),
            TypeRef::Optional(inner) | TypeRef::Array(inner) => inner.named_root(),
            TypeRef::Primitive(_) => None,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => f.write_str(name),
            TypeRef::Primitive(kind) => write!(f, "{}", kind),
            TypeRef::Optional(inner) => write!(f, "Option<{}>", inner),
            TypeRef::Array(inner) => write!(f, "Vec<{}>", inner),
        }
    }
}

/// One raw annotation record attached to a type or property
///
/// Arguments are already resolved to literal JSON values by the discovery
/// front end; this core never sees source syntax.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Attribute name as written at the declaration
    pub name: String,
    /// Positional argument values
    pub args: Vec<Value>,
    /// Named argument values, in declaration order
    pub named_args: Vec<(String, Value)>,
}

impl Annotation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            named_args: Vec::new(),
        }
    }

    pub fn with_arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn with_named(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named_args.push((key.into(), value.into()));
        self
    }
}

/// One declared property of an object type
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    pub name: String,
    pub ty: TypeRef,
    /// Raw annotation records, in declaration order
    pub annotations: Vec<Annotation>,
    /// Wildcard marker: this property describes all additional properties
    /// instead of one named member
    pub catch_all: bool,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            annotations: Vec::new(),
            catch_all: false,
        }
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn catch_all(mut self) -> Self {
        self.catch_all = true;
        self
    }
}

/// Shape classification produced once per type by the discovery step
#[derive(Debug, Clone)]
pub enum TypeShape {
    /// The type is itself a leaf value kind (a named primitive)
    Primitive(PrimitiveKind),
    /// Closed set of named members
    Enum { variants: Vec<String> },
    /// Structured type with declared properties
    Object { properties: Vec<PropertyDescriptor> },
}

/// Full description of one declared type: the `describe()` contract
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    pub name: String,
    pub shape: TypeShape,
    /// Declared base type, absent when the type derives only from the
    /// universal root
    pub base: Option<String>,
    /// The type behaves as an array of its base
    pub array_of_base: bool,
    /// Raw type-level annotation records, in declaration order
    pub annotations: Vec<Annotation>,
    /// Best-effort instantiation snapshot for default capture; `None` means
    /// instantiation failed and every property's default is absent
    pub instance: Option<Map<String, Value>>,
}

impl TypeDescriptor {
    /// Describe an object type with no properties yet
    pub fn object(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shape: TypeShape::Object {
                properties: Vec::new(),
            },
            base: None,
            array_of_base: false,
            annotations: Vec::new(),
            instance: None,
        }
    }

    /// Describe an enumeration with the given member names
    pub fn enumeration<I, S>(name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            shape: TypeShape::Enum {
                variants: variants.into_iter().map(Into::into).collect(),
            },
            base: None,
            array_of_base: false,
            annotations: Vec::new(),
            instance: None,
        }
    }

    /// Describe a named primitive (branded scalar) type
    pub fn primitive(name: impl Into<String>, kind: PrimitiveKind) -> Self {
        Self {
            name: name.into(),
            shape: TypeShape::Primitive(kind),
            base: None,
            array_of_base: false,
            annotations: Vec::new(),
            instance: None,
        }
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn as_array_of_base(mut self) -> Self {
        self.array_of_base = true;
        self
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn with_property(mut self, property: PropertyDescriptor) -> Self {
        if let TypeShape::Object { properties } = &mut self.shape {
            properties.push(property);
        }
        self
    }

    pub fn with_instance(mut self, instance: Map<String, Value>) -> Self {
        self.instance = Some(instance);
        self
    }

    /// Declared own properties; empty for non-object shapes
    pub fn properties(&self) -> &[PropertyDescriptor] {
        match &self.shape {
            TypeShape::Object { properties } => properties,
            _ => &[],
        }
    }
}

/// Lookup table from type name to descriptor, handed in by the discovery
/// front end
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    types: IndexMap<String, TypeDescriptor>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor under its own name
    pub fn insert(&mut self, descriptor: TypeDescriptor) {
        self.types.insert(descriptor.name.clone(), descriptor);
    }

    pub fn with_type(mut self, descriptor: TypeDescriptor) -> Self {
        self.insert(descriptor);
        self
    }

    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
