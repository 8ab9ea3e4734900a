/*!
# openapi-schemagen

Recursive OpenAPI schema synthesis from annotated type descriptors.

A discovery front end hands this crate a catalog of type descriptors (shape,
base type, annotation records, an optional instance snapshot); the generator
walks that graph and registers one canonical schema per named type, expressing
inheritance as `allOf` composition, nullability as type-set members or `anyOf`
unions, and cycles as placeholder objects instead of infinite recursion.

## Features

- Recursive schema synthesis with cycle-safe traversal
- Single canonical registration per named schema
- Inheritance as `allOf` composition, pure aliases collapse to references
- Annotation merging with deterministic precedence rules
- Default-value capture with intrinsic-zero suppression
- JSON and YAML document export

## Usage

```rust,no_run
use openapi_schemagen::{
    GeneratorConfig, PrimitiveKind, PropertyDescriptor, SchemaDocument, SchemaGenerator,
    SchemaRegistry, TypeCatalog, TypeDescriptor, TypeRef,
};

let catalog = TypeCatalog::new().with_type(
    TypeDescriptor::object("User")
        .with_property(PropertyDescriptor::new(
            "id",
            TypeRef::Primitive(PrimitiveKind::Int64),
        ))
        .with_property(PropertyDescriptor::new(
            "name",
            TypeRef::Primitive(PrimitiveKind::Text),
        )),
);

let generator = SchemaGenerator::new(&catalog, GeneratorConfig::default());
let mut registry = SchemaRegistry::new();
generator.ensure_schema("User", &mut registry).unwrap();

let document = SchemaDocument::from_registry(&registry);
println!("{}", document.export_json(true).unwrap());
```
*/

// Re-export main types
pub use crate::{
    annotations::ConstraintDescriptor,
    config::GeneratorConfig,
    descriptor::{
        Annotation, PrimitiveKind, PropertyDescriptor, TypeCatalog, TypeDescriptor, TypeRef,
        TypeShape,
    },
    error::{SchemaGenError, SchemaResult},
    export::{Components, OutputFormat, SchemaDocument},
    generator::SchemaGenerator,
    registry::{Emission, SchemaRegistry},
    specification::{Schema, SchemaRef, SchemaType},
};

// Core synthesis
pub mod composition;
pub mod generator;
pub mod primitives;
pub mod registry;

// Input boundary
pub mod annotations;
pub mod defaults;
pub mod descriptor;

// Data model and export
pub mod export;
pub mod specification;

// Support
pub mod config;
pub mod error;
