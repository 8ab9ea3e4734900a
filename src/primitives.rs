/*!
Leaf value kind mapping.

A closed table from `PrimitiveKind` to schema `type`/`format` fragments, plus
the nullable folding rule: nullability joins a primitive's own type set, while
references and other composite nodes are wrapped in an `anyOf` union with a
null branch.
*/

use crate::{
    descriptor::PrimitiveKind,
    specification::{NullableUnion, PrimitiveSchema, Schema, SchemaType, TypeSet},
};

/// Map a leaf value kind to its schema fragment
///
/// Unsigned integer kinds carry a zero minimum. Decimal maps to
/// `number`/`double`; there is no standard decimal format.
pub fn fragment(kind: PrimitiveKind) -> PrimitiveSchema {
    let (ty, format) = match kind {
        PrimitiveKind::Text => (SchemaType::String, None),
        PrimitiveKind::Boolean => (SchemaType::Boolean, None),
        PrimitiveKind::Int32 => (SchemaType::Integer, Some("int32")),
        PrimitiveKind::Int64 => (SchemaType::Integer, Some("int64")),
        PrimitiveKind::UInt32 => (SchemaType::Integer, Some("int32")),
        PrimitiveKind::UInt64 => (SchemaType::Integer, Some("int64")),
        PrimitiveKind::Float => (SchemaType::Number, Some("float")),
        PrimitiveKind::Double => (SchemaType::Number, Some("double")),
        PrimitiveKind::Decimal => (SchemaType::Number, Some("double")),
        PrimitiveKind::Date => (SchemaType::String, Some("date")),
        PrimitiveKind::DateTime => (SchemaType::String, Some("date-time")),
        PrimitiveKind::Duration => (SchemaType::String, Some("duration")),
        PrimitiveKind::Binary => (SchemaType::String, Some("byte")),
        PrimitiveKind::Uuid => (SchemaType::String, Some("uuid")),
        PrimitiveKind::Uri => (SchemaType::String, Some("uri")),
    };

    let minimum = match kind {
        PrimitiveKind::UInt32 | PrimitiveKind::UInt64 => Some(0.0),
        _ => None,
    };

    PrimitiveSchema {
        types: TypeSet::single(ty),
        format: format.map(str::to_string),
        minimum,
        ..Default::default()
    }
}

/// Fold a null branch into a schema
///
/// Primitives take `null` as an extra member of their type set; everything
/// else (references, compositions, arrays, objects) is wrapped in an `anyOf`
/// union so the shared target schema stays untouched.
pub(crate) fn fold_nullable(mut schema: Schema) -> Schema {
    match schema {
        Schema::Primitive(ref mut primitive) => {
            primitive.types.insert(SchemaType::Null);
            schema
        }
        Schema::AnyOf(_) => schema,
        other => Schema::AnyOf(NullableUnion::new(other)),
    }
}
