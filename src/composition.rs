/*!
Inheritance classification.

A type's declared base relationship collapses into one of a closed set of
plans: a bare base reference for pure aliases, an array wrapper, an `allOf`
composition with a sibling object, or a primitive fragment when the base
chain bottoms out in a leaf value kind (a branded scalar). The generator
executes the plan; this module only decides which shape applies and rejects
conflicting declarations.
*/

use crate::{
    descriptor::{Annotation, PrimitiveKind, TypeCatalog, TypeDescriptor, TypeShape},
    error::{SchemaGenError, SchemaResult},
};
use std::collections::HashSet;

/// How a type's inheritance relationship should be emitted
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CompositionPlan {
    /// No base declared; the normal object/enum/primitive build applies
    Standalone,
    /// The base chain ends in a leaf value kind: collapse to a primitive
    /// fragment carrying the chain's annotations, root first so the derived
    /// type's overrides win
    PrimitiveAlias {
        kind: PrimitiveKind,
        annotations: Vec<Annotation>,
    },
    /// Pure alias: emit a bare reference to the base, register nothing under
    /// the derived name
    BaseReference { base: String },
    /// Alias flagged as array-of-base: emit an array of base references
    ArrayOfBase { base: String },
    /// Base reference plus a sibling object carrying the own properties
    ComposedObject { base: String },
    /// Array whose items are the base-plus-sibling composition
    ArrayOfComposed { base: String },
}

/// Classify a descriptor's inheritance into a plan
pub(crate) fn classify(
    descriptor: &TypeDescriptor,
    catalog: &TypeCatalog,
) -> SchemaResult<CompositionPlan> {
    let Some(base) = descriptor.base.as_deref() else {
        if descriptor.array_of_base {
            return Err(SchemaGenError::conflicting_composition(
                &descriptor.name,
                "array-of-base flag without a base type",
            ));
        }
        return Ok(CompositionPlan::Standalone);
    };

    if let Some((kind, annotations)) = primitive_chain(descriptor, catalog)? {
        return Ok(CompositionPlan::PrimitiveAlias { kind, annotations });
    }

    let has_own_properties = !descriptor.properties().is_empty();
    let plan = match (descriptor.array_of_base, has_own_properties) {
        (false, false) => CompositionPlan::BaseReference {
            base: base.to_string(),
        },
        (true, false) => CompositionPlan::ArrayOfBase {
            base: base.to_string(),
        },
        (false, true) => CompositionPlan::ComposedObject {
            base: base.to_string(),
        },
        (true, true) => CompositionPlan::ArrayOfComposed {
            base: base.to_string(),
        },
    };
    Ok(plan)
}

/// Walk the base chain; when it bottoms out in a primitive shape, collect the
/// annotations along the way (root first, derived last)
fn primitive_chain(
    descriptor: &TypeDescriptor,
    catalog: &TypeCatalog,
) -> SchemaResult<Option<(PrimitiveKind, Vec<Annotation>)>> {
    let mut chain: Vec<&TypeDescriptor> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    seen.insert(descriptor.name.as_str());

    let mut current = descriptor;
    while let Some(base_name) = current.base.as_deref() {
        if !seen.insert(base_name) {
            return Err(SchemaGenError::conflicting_composition(
                &descriptor.name,
                "inheritance chain forms a cycle",
            ));
        }
        let base = catalog
            .get(base_name)
            .ok_or_else(|| SchemaGenError::unknown_type(base_name, &descriptor.name))?;
        chain.push(base);
        current = base;
    }

    let TypeShape::Primitive(kind) = &current.shape else {
        return Ok(None);
    };

    for link in chain.iter().take(chain.len().saturating_sub(1)) {
        if !link.properties().is_empty() {
            return Err(SchemaGenError::conflicting_composition(
                &link.name,
                "object properties declared on a primitive-based type",
            ));
        }
    }
    if !descriptor.properties().is_empty() {
        return Err(SchemaGenError::conflicting_composition(
            &descriptor.name,
            "object properties declared on a primitive-based type",
        ));
    }

    let mut annotations = Vec::new();
    for link in chain.iter().rev() {
        annotations.extend(link.annotations.iter().cloned());
    }
    annotations.extend(descriptor.annotations.iter().cloned());
    Ok(Some((*kind, annotations)))
}
