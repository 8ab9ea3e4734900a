/*!
Recursive schema synthesis.

`SchemaGenerator` walks a type graph from the descriptor catalog and registers
every named schema it reaches. One top-level `ensure_schema` call owns one
traversal: a visited set of the names currently on the build stack breaks
self-referential cycles with an empty object placeholder, while the shared
registry memoizes finished schemas so common sub-schemas build exactly once
across unrelated top-level calls.
*/

use crate::{
    annotations::{self, ConstraintDescriptor},
    composition::{self, CompositionPlan},
    config::GeneratorConfig,
    defaults,
    descriptor::{
        Annotation, PropertyDescriptor, TypeCatalog, TypeDescriptor, TypeRef, TypeShape,
    },
    error::{SchemaGenError, SchemaResult},
    primitives,
    registry::SchemaRegistry,
    specification::{
        AdditionalProperties, ArraySchema, Composition, ObjectSchema, PrimitiveSchema, Schema,
        SchemaType, TypeSet,
    },
};
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

/// Traversal state scoped to one top-level build
///
/// `visited` holds the type names currently on the build stack; asking for one
/// of them again means the graph loops back on itself. The set never leaks
/// across unrelated top-level calls.
struct BuildContext {
    visited: HashSet<String>,
    depth: usize,
}

impl BuildContext {
    fn new() -> Self {
        Self {
            visited: HashSet::new(),
            depth: 0,
        }
    }
}

/// Recursive schema builder over a type descriptor catalog
///
/// The registry is handed in per call rather than owned, so a host can aim
/// the same generator at a long-lived published registry or a transient
/// per-operation one.
pub struct SchemaGenerator<'c> {
    catalog: &'c TypeCatalog,
    config: GeneratorConfig,
}

impl<'c> SchemaGenerator<'c> {
    /// Create a generator over a catalog with the given configuration
    pub fn new(catalog: &'c TypeCatalog, config: GeneratorConfig) -> Self {
        Self { catalog, config }
    }

    /// Create a generator with default configuration
    pub fn with_defaults(catalog: &'c TypeCatalog) -> Self {
        Self::new(catalog, GeneratorConfig::default())
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Build and register the schema for a named type
    ///
    /// Returns a reference for registered types, the base's form for pure
    /// aliases, and an inline fragment for named primitives. Calling this
    /// twice for the same name returns the same result without rebuilding;
    /// a failed build leaves no entry behind.
    pub fn ensure_schema(&self, name: &str, registry: &mut SchemaRegistry) -> SchemaResult<Schema> {
        let mut ctx = BuildContext::new();
        self.build_named(name, registry, &mut ctx, name)
    }

    /// Whether a schema is registered under `name`
    pub fn schema_exists(&self, name: &str, registry: &SchemaRegistry) -> bool {
        registry.contains(name)
    }

    /// Infer the immediate shape of a type without forcing full registration
    ///
    /// Primitives, optionals, arrays and named-primitive aliases resolve
    /// structurally; complex named types come back as a bare reference even
    /// when nothing is registered under that name yet. Used when a caller
    /// only needs a parameter's or response property's outer shape.
    pub fn infer_leaf_schema(&self, ty: &TypeRef) -> SchemaResult<Schema> {
        match ty {
            TypeRef::Primitive(kind) => Ok(Schema::Primitive(primitives::fragment(*kind))),
            TypeRef::Optional(inner) => {
                let schema = self.infer_leaf_schema(inner)?;
                if self.config.nullable_optional {
                    Ok(primitives::fold_nullable(schema))
                } else {
                    Ok(schema)
                }
            }
            TypeRef::Array(element) => Ok(Schema::Array(ArraySchema::new(
                self.infer_leaf_schema(element)?,
            ))),
            TypeRef::Named(name) => self.infer_named_leaf(name),
        }
    }

    fn infer_named_leaf(&self, name: &str) -> SchemaResult<Schema> {
        if let Some(custom) = self.config.custom_schemas.get(name) {
            return Ok(custom.clone());
        }
        let Some(descriptor) = self.catalog.get(name) else {
            return Ok(Schema::reference(name));
        };
        if let TypeShape::Primitive(kind) = &descriptor.shape {
            if descriptor.base.is_none() {
                let mut schema = Schema::Primitive(primitives::fragment(*kind));
                annotations::apply(
                    &self.effective_constraints(&descriptor.annotations),
                    &mut schema,
                );
                return Ok(schema);
            }
        }
        match composition::classify(descriptor, self.catalog)? {
            CompositionPlan::PrimitiveAlias {
                kind,
                annotations: chain,
            } => {
                let mut schema = Schema::Primitive(primitives::fragment(kind));
                annotations::apply(&self.effective_constraints(&chain), &mut schema);
                Ok(schema)
            }
            CompositionPlan::BaseReference { base } => Ok(Schema::reference(&base)),
            CompositionPlan::ArrayOfBase { base } => {
                Ok(Schema::Array(ArraySchema::new(Schema::reference(&base))))
            }
            _ => Ok(Schema::reference(name)),
        }
    }

    /// Dispatch one declared type through the traversal
    fn build(
        &self,
        ty: &TypeRef,
        registry: &mut SchemaRegistry,
        ctx: &mut BuildContext,
        site: &str,
    ) -> SchemaResult<Schema> {
        match ty {
            TypeRef::Optional(inner) => {
                let schema = self.build(inner, registry, ctx, site)?;
                if self.config.nullable_optional {
                    Ok(primitives::fold_nullable(schema))
                } else {
                    Ok(schema)
                }
            }
            TypeRef::Primitive(kind) => Ok(Schema::Primitive(primitives::fragment(*kind))),
            TypeRef::Array(element) => {
                let items = self.build(element, registry, ctx, site)?;
                Ok(Schema::Array(ArraySchema::new(items)))
            }
            TypeRef::Named(name) => self.build_named(name, registry, ctx, site),
        }
    }

    fn build_named(
        &self,
        name: &str,
        registry: &mut SchemaRegistry,
        ctx: &mut BuildContext,
        site: &str,
    ) -> SchemaResult<Schema> {
        if let Some(custom) = self.config.custom_schemas.get(name) {
            registry.register(name, custom.clone());
            return Ok(Schema::reference(name));
        }
        if registry.contains(name) {
            return Ok(Schema::reference(name));
        }
        if ctx.depth >= self.config.max_depth {
            return Err(SchemaGenError::depth_exceeded(name, self.config.max_depth));
        }
        ctx.depth += 1;
        let result = self.build_named_inner(name, registry, ctx, site);
        ctx.depth -= 1;
        result
    }

    fn build_named_inner(
        &self,
        name: &str,
        registry: &mut SchemaRegistry,
        ctx: &mut BuildContext,
        site: &str,
    ) -> SchemaResult<Schema> {
        let descriptor = self
            .catalog
            .get(name)
            .ok_or_else(|| SchemaGenError::unknown_type(name, site))?;

        match composition::classify(descriptor, self.catalog)? {
            CompositionPlan::Standalone => self.build_standalone(descriptor, registry, ctx),
            CompositionPlan::PrimitiveAlias {
                kind,
                annotations: chain,
            } => {
                // Branded scalar: collapse to an inline fragment, the derived
                // type's annotation overrides folded in last. Never registered.
                let mut schema = Schema::Primitive(primitives::fragment(kind));
                annotations::apply(&self.effective_constraints(&chain), &mut schema);
                Ok(schema)
            }
            CompositionPlan::BaseReference { base } => {
                // Pure alias: the derived name registers nothing of its own.
                self.build_named(&base, registry, ctx, name)
            }
            CompositionPlan::ArrayOfBase { base } => {
                let items = self.build_named(&base, registry, ctx, name)?;
                let mut schema = Schema::Array(ArraySchema::new(items));
                annotations::apply(
                    &self.effective_constraints(&descriptor.annotations),
                    &mut schema,
                );
                Ok(schema)
            }
            CompositionPlan::ComposedObject { base } => {
                if ctx.visited.contains(name) {
                    debug!(schema = name, "cycle detected, emitting placeholder object");
                    return Ok(Schema::empty_object());
                }
                ctx.visited.insert(name.to_string());
                let built = self.build_composition(descriptor, &base, registry, ctx);
                ctx.visited.remove(name);
                registry.register(name, Schema::AllOf(built?));
                Ok(Schema::reference(name))
            }
            CompositionPlan::ArrayOfComposed { base } => {
                if ctx.visited.contains(name) {
                    debug!(schema = name, "cycle detected, emitting placeholder object");
                    return Ok(Schema::empty_object());
                }
                ctx.visited.insert(name.to_string());
                let built = self.build_composition(descriptor, &base, registry, ctx);
                ctx.visited.remove(name);
                let items = Schema::AllOf(built?);
                registry.register(name, Schema::Array(ArraySchema::new(items)));
                Ok(Schema::reference(name))
            }
        }
    }

    /// Base reference plus a sibling object holding the own properties
    fn build_composition(
        &self,
        descriptor: &TypeDescriptor,
        base: &str,
        registry: &mut SchemaRegistry,
        ctx: &mut BuildContext,
    ) -> SchemaResult<Composition> {
        let base_schema = self.build_named(base, registry, ctx, &descriptor.name)?;
        let Some(base_ref) = base_schema.as_reference().cloned() else {
            return Err(SchemaGenError::conflicting_composition(
                &descriptor.name,
                format!("base `{}` does not resolve to a referenceable schema", base),
            ));
        };
        let sibling = self.build_object_schema(descriptor, registry, ctx)?;
        let mut composition = Composition::new(base_ref);
        composition.push(Schema::Object(sibling));
        Ok(composition)
    }

    fn build_standalone(
        &self,
        descriptor: &TypeDescriptor,
        registry: &mut SchemaRegistry,
        ctx: &mut BuildContext,
    ) -> SchemaResult<Schema> {
        match &descriptor.shape {
            TypeShape::Primitive(kind) => {
                // Named primitive without a base: inlined like any other leaf.
                let mut schema = Schema::Primitive(primitives::fragment(*kind));
                annotations::apply(
                    &self.effective_constraints(&descriptor.annotations),
                    &mut schema,
                );
                Ok(schema)
            }
            TypeShape::Enum { variants } => {
                // Enums register by name so several sites can reference them.
                let primitive = PrimitiveSchema {
                    types: TypeSet::single(SchemaType::String),
                    enum_values: variants.iter().map(|v| Value::String(v.clone())).collect(),
                    ..Default::default()
                };
                let mut schema = Schema::Primitive(primitive);
                annotations::apply(
                    &self.effective_constraints(&descriptor.annotations),
                    &mut schema,
                );
                registry.register(&descriptor.name, schema);
                Ok(Schema::reference(&descriptor.name))
            }
            TypeShape::Object { .. } => {
                if ctx.visited.contains(&descriptor.name) {
                    debug!(
                        schema = %descriptor.name,
                        "cycle detected, emitting placeholder object"
                    );
                    return Ok(Schema::empty_object());
                }
                ctx.visited.insert(descriptor.name.clone());
                let built = self.build_object_schema(descriptor, registry, ctx);
                ctx.visited.remove(&descriptor.name);
                registry.register(&descriptor.name, Schema::Object(built?));
                Ok(Schema::reference(&descriptor.name))
            }
        }
    }

    /// Object build restricted to the descriptor's own declared properties
    fn build_object_schema(
        &self,
        descriptor: &TypeDescriptor,
        registry: &mut SchemaRegistry,
        ctx: &mut BuildContext,
    ) -> SchemaResult<ObjectSchema> {
        let constraints = self.effective_constraints(&descriptor.annotations);
        for required in &constraints.required {
            let declared = descriptor
                .properties()
                .iter()
                .any(|p| !p.catch_all && p.name == *required);
            if !declared {
                return Err(SchemaGenError::unknown_required_property(
                    &descriptor.name,
                    required,
                ));
            }
        }

        let mut object = ObjectSchema::default();
        for property in descriptor.properties() {
            let schema = self.build_property_schema(descriptor, property, registry, ctx)?;
            if property.catch_all {
                object.additional_properties =
                    Some(AdditionalProperties::Schema(Box::new(schema)));
            } else {
                if self.config.require_non_optional && !property.ty.is_optional() {
                    object.required.push(property.name.clone());
                }
                object.properties.insert(property.name.clone(), schema);
            }
        }
        for required in &constraints.required {
            if !object.required.contains(required) {
                object.required.push(required.clone());
            }
        }
        annotations::apply_to_object(&constraints, &mut object);
        Ok(object)
    }

    fn build_property_schema(
        &self,
        owner: &TypeDescriptor,
        property: &PropertyDescriptor,
        registry: &mut SchemaRegistry,
        ctx: &mut BuildContext,
    ) -> SchemaResult<Schema> {
        let site = format!("{}.{}", owner.name, property.name);
        let mut schema = match self.build(&property.ty, registry, ctx, &site) {
            Ok(schema) => schema,
            Err(SchemaGenError::UnknownType { type_name, .. }) => {
                // Unclassifiable property types degrade to the most
                // permissive fragment instead of failing the whole build.
                debug!(
                    property = %site,
                    ty = %type_name,
                    "property type not classifiable, falling back to untyped schema"
                );
                Schema::untyped()
            }
            Err(other) => return Err(other),
        };
        let constraints = self.effective_constraints(&property.annotations);
        annotations::apply(&constraints, &mut schema);
        if constraints.default.is_none() {
            if let Some(value) = defaults::capture(owner.instance.as_ref(), property) {
                schema.set_default(value);
            }
        }
        Ok(schema)
    }

    fn effective_constraints(&self, records: &[Annotation]) -> ConstraintDescriptor {
        let mut merged = annotations::merge(records);
        if !self.config.include_examples {
            merged.example = None;
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::PrimitiveKind;
    use serde_json::json;

    fn user_catalog() -> TypeCatalog {
        TypeCatalog::new().with_type(
            TypeDescriptor::object("User")
                .with_property(PropertyDescriptor::new(
                    "id",
                    TypeRef::Primitive(PrimitiveKind::Int64),
                ))
                .with_property(PropertyDescriptor::new(
                    "name",
                    TypeRef::Primitive(PrimitiveKind::Text),
                )),
        )
    }

    #[test]
    fn test_object_registers_and_returns_reference() {
        let catalog = user_catalog();
        let generator = SchemaGenerator::with_defaults(&catalog);
        let mut registry = SchemaRegistry::new();

        let schema = generator.ensure_schema("User", &mut registry).unwrap();
        assert_eq!(schema.as_reference().unwrap().name(), "User");
        assert!(generator.schema_exists("User", &registry));

        let object = registry.get("User").unwrap().as_object().unwrap();
        assert_eq!(object.properties.len(), 2);
        assert_eq!(object.required, vec!["id", "name"]);
    }

    #[test]
    fn test_unknown_root_type_is_an_error() {
        let catalog = TypeCatalog::new();
        let generator = SchemaGenerator::with_defaults(&catalog);
        let mut registry = SchemaRegistry::new();

        let err = generator.ensure_schema("Ghost", &mut registry).unwrap_err();
        assert!(matches!(err, SchemaGenError::UnknownType { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unknown_property_type_degrades_to_untyped() {
        let catalog = TypeCatalog::new().with_type(
            TypeDescriptor::object("Holder")
                .with_property(PropertyDescriptor::new("mystery", TypeRef::named("Ghost"))),
        );
        let generator = SchemaGenerator::with_defaults(&catalog);
        let mut registry = SchemaRegistry::new();

        generator.ensure_schema("Holder", &mut registry).unwrap();
        let object = registry.get("Holder").unwrap().as_object().unwrap();
        assert_eq!(
            serde_json::to_value(&object.properties["mystery"]).unwrap(),
            json!({})
        );
    }

    #[test]
    fn test_custom_schema_override_wins() {
        let catalog = TypeCatalog::new();
        let config = GeneratorConfig::new().with_custom_schema(
            "Money",
            Schema::Primitive(PrimitiveSchema {
                types: TypeSet::single(SchemaType::String),
                format: Some("decimal".to_string()),
                ..Default::default()
            }),
        );
        let generator = SchemaGenerator::new(&catalog, config);
        let mut registry = SchemaRegistry::new();

        let schema = generator.ensure_schema("Money", &mut registry).unwrap();
        assert_eq!(schema.as_reference().unwrap().name(), "Money");
        let registered = registry.get("Money").unwrap().as_primitive().unwrap();
        assert_eq!(registered.format.as_deref(), Some("decimal"));
    }

    #[test]
    fn test_depth_guard_trips_on_long_inheritance_chains() {
        let mut catalog = TypeCatalog::new().with_type(TypeDescriptor::object("Level0"));
        for level in 1..8 {
            catalog.insert(
                TypeDescriptor::object(format!("Level{}", level))
                    .with_base(format!("Level{}", level - 1))
                    .with_property(PropertyDescriptor::new(
                        "depth",
                        TypeRef::Primitive(PrimitiveKind::Int32),
                    )),
            );
        }
        let generator =
            SchemaGenerator::new(&catalog, GeneratorConfig::new().with_max_depth(3));
        let mut registry = SchemaRegistry::new();

        let err = generator.ensure_schema("Level7", &mut registry).unwrap_err();
        assert!(matches!(err, SchemaGenError::DepthExceeded { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_infer_leaf_schema_resolves_structurally() {
        let catalog = TypeCatalog::new().with_type(TypeDescriptor::primitive(
            "CustomerId",
            PrimitiveKind::Uuid,
        ));
        let generator = SchemaGenerator::with_defaults(&catalog);

        let uuid = generator
            .infer_leaf_schema(&TypeRef::named("CustomerId"))
            .unwrap();
        assert_eq!(
            uuid.as_primitive().unwrap().format.as_deref(),
            Some("uuid")
        );

        let unregistered = generator
            .infer_leaf_schema(&TypeRef::named("Order"))
            .unwrap();
        assert_eq!(unregistered.as_reference().unwrap().name(), "Order");

        let list = generator
            .infer_leaf_schema(&TypeRef::array(TypeRef::named("Order")))
            .unwrap();
        assert!(list.as_array().is_some());
    }

    #[test]
    fn test_non_nullable_optional_config() {
        let catalog = TypeCatalog::new().with_type(TypeDescriptor::object("Note").with_property(
            PropertyDescriptor::new(
                "text",
                TypeRef::optional(TypeRef::Primitive(PrimitiveKind::Text)),
            ),
        ));
        let generator = SchemaGenerator::new(
            &catalog,
            GeneratorConfig::new().with_nullable_optional(false),
        );
        let mut registry = SchemaRegistry::new();

        generator.ensure_schema("Note", &mut registry).unwrap();
        let object = registry.get("Note").unwrap().as_object().unwrap();
        let text = object.properties["text"].as_primitive().unwrap();
        assert!(!text.types.contains(SchemaType::Null));
        assert!(object.required.is_empty());
    }
}
