/*!
Annotation merging.

Zero or more raw annotation records attached to one declaration are folded
into a single effective `ConstraintDescriptor`, which is then applied onto a
schema node. The fold is a deterministic left-to-right pass with later records
taking precedence: scalar text fields last-non-empty wins, boolean flags OR,
explicitly set bounds win over earlier ones, value lists union in first-seen
order, default/example last-non-null wins. Unknown annotation names and
argument shapes are ignored.
*/

use crate::{
    descriptor::Annotation,
    primitives,
    specification::{
        AdditionalProperties, ArraySchema, ObjectSchema, PrimitiveSchema, Schema, SchemaRef,
        SchemaType,
    },
};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::trace;

/// Merged, effective annotation state for one declaration
///
/// Every "unset" state is `None` (or `false` for pure flags); raw records may
/// arrive carrying negative length sentinels and those parse to unset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintDescriptor {
    pub title: Option<String>,
    pub description: Option<String>,
    pub format: Option<String>,
    pub pattern: Option<String>,

    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: bool,
    pub exclusive_maximum: bool,

    pub min_length: Option<u64>,
    pub max_length: Option<u64>,

    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub unique_items: bool,

    pub min_properties: Option<u64>,
    pub max_properties: Option<u64>,

    pub nullable: bool,
    pub read_only: bool,
    pub write_only: bool,
    pub deprecated: bool,

    /// Tri-state: `None` means not specified, which must stay distinct from
    /// an explicit `false`
    pub additional_properties_allowed: Option<bool>,
    pub unevaluated_properties: Option<bool>,

    pub default: Option<Value>,
    pub example: Option<Value>,

    /// Enumerated literal set, unioned across records in first-seen order
    pub enum_values: Vec<Value>,
    /// Required-property names, unioned across records in first-seen order
    pub required: Vec<String>,

    /// Vendor extensions (`x-…`), last write per key wins
    pub extensions: IndexMap<String, Value>,
}

/// Fold an ordered list of raw records into one effective descriptor
pub fn merge(records: &[Annotation]) -> ConstraintDescriptor {
    let mut descriptor = ConstraintDescriptor::default();
    for record in records {
        fold_record(&mut descriptor, record);
    }
    descriptor
}

fn fold_record(descriptor: &mut ConstraintDescriptor, record: &Annotation) {
    fold_record_name(descriptor, record);
    for (key, value) in &record.named_args {
        fold_field(descriptor, key, value);
    }
}

/// Records whose name itself names the field take their payload from the
/// positional arguments
fn fold_record_name(descriptor: &mut ConstraintDescriptor, record: &Annotation) {
    let first = record.args.first();
    match normalize(&record.name).as_str() {
        "title" | "summary" => {
            if let Some(text) = first.and_then(as_text) {
                descriptor.title = Some(text);
            }
        }
        "description" | "doc" => {
            if let Some(text) = first.and_then(as_text) {
                descriptor.description = Some(text);
            }
        }
        "format" => {
            if let Some(text) = first.and_then(as_text) {
                descriptor.format = Some(text);
            }
        }
        "pattern" => {
            if let Some(text) = first.and_then(as_text) {
                descriptor.pattern = Some(text);
            }
        }
        "default" => {
            if let Some(value) = first.filter(|v| !v.is_null()) {
                descriptor.default = Some(value.clone());
            }
        }
        "example" => {
            if let Some(value) = first.filter(|v| !v.is_null()) {
                descriptor.example = Some(value.clone());
            }
        }
        "deprecated" => descriptor.deprecated |= first.and_then(as_bool).unwrap_or(true),
        "nullable" => descriptor.nullable |= first.and_then(as_bool).unwrap_or(true),
        "readonly" => descriptor.read_only |= first.and_then(as_bool).unwrap_or(true),
        "writeonly" => descriptor.write_only |= first.and_then(as_bool).unwrap_or(true),
        "enum" | "values" => {
            for arg in &record.args {
                union_values(&mut descriptor.enum_values, as_value_list(arg));
            }
        }
        "required" => {
            for arg in &record.args {
                union_names(&mut descriptor.required, as_name_list(arg));
            }
        }
        _ => {}
    }
}

fn fold_field(descriptor: &mut ConstraintDescriptor, key: &str, value: &Value) {
    if key.starts_with("x-") {
        if !value.is_null() {
            descriptor.extensions.insert(key.to_string(), value.clone());
        }
        return;
    }

    match normalize(key).as_str() {
        "title" | "summary" => {
            if let Some(text) = as_text(value) {
                descriptor.title = Some(text);
            }
        }
        "description" => {
            if let Some(text) = as_text(value) {
                descriptor.description = Some(text);
            }
        }
        "format" => {
            if let Some(text) = as_text(value) {
                descriptor.format = Some(text);
            }
        }
        "pattern" => {
            if let Some(text) = as_text(value) {
                descriptor.pattern = Some(text);
            }
        }
        "minimum" => {
            if let Some(number) = as_number(value) {
                descriptor.minimum = Some(number);
            }
        }
        "maximum" => {
            if let Some(number) = as_number(value) {
                descriptor.maximum = Some(number);
            }
        }
        "exclusiveminimum" => descriptor.exclusive_minimum |= as_bool(value).unwrap_or(false),
        "exclusivemaximum" => descriptor.exclusive_maximum |= as_bool(value).unwrap_or(false),
        "minlength" => {
            if let Some(length) = as_length(value) {
                descriptor.min_length = Some(length);
            }
        }
        "maxlength" => {
            if let Some(length) = as_length(value) {
                descriptor.max_length = Some(length);
            }
        }
        "minitems" => {
            if let Some(length) = as_length(value) {
                descriptor.min_items = Some(length);
            }
        }
        "maxitems" => {
            if let Some(length) = as_length(value) {
                descriptor.max_items = Some(length);
            }
        }
        "uniqueitems" => descriptor.unique_items |= as_bool(value).unwrap_or(false),
        "minproperties" => {
            if let Some(length) = as_length(value) {
                descriptor.min_properties = Some(length);
            }
        }
        "maxproperties" => {
            if let Some(length) = as_length(value) {
                descriptor.max_properties = Some(length);
            }
        }
        "nullable" => descriptor.nullable |= as_bool(value).unwrap_or(false),
        "readonly" => descriptor.read_only |= as_bool(value).unwrap_or(false),
        "writeonly" => descriptor.write_only |= as_bool(value).unwrap_or(false),
        "deprecated" => descriptor.deprecated |= as_bool(value).unwrap_or(false),
        "additionalproperties" => {
            if let Some(allowed) = as_bool(value) {
                descriptor.additional_properties_allowed = Some(allowed);
            }
        }
        "unevaluatedproperties" => {
            if let Some(flag) = as_bool(value) {
                descriptor.unevaluated_properties = Some(flag);
            }
        }
        "default" => {
            if !value.is_null() {
                descriptor.default = Some(value.clone());
            }
        }
        "example" => {
            if !value.is_null() {
                descriptor.example = Some(value.clone());
            }
        }
        "enum" | "values" => union_values(&mut descriptor.enum_values, as_value_list(value)),
        "required" => union_names(&mut descriptor.required, as_name_list(value)),
        other => trace!(field = other, "ignoring unknown annotation argument"),
    }
}

/// Write the merged state onto a schema node
///
/// References keep only title/description; every other field is dropped there
/// since constraints on a reference must live on the referenced schema. When
/// the nullable flag is set, references and compositions are wrapped in a
/// null union; primitives take `null` into their own type set.
pub fn apply(descriptor: &ConstraintDescriptor, schema: &mut Schema) {
    match schema {
        Schema::Primitive(primitive) => apply_to_primitive(descriptor, primitive),
        Schema::Object(object) => apply_to_object(descriptor, object),
        Schema::Array(array) => apply_to_array(descriptor, array),
        Schema::Reference(reference) => apply_to_reference(descriptor, reference),
        Schema::AllOf(composition) => {
            set_text(&mut composition.title, &descriptor.title);
            set_text(&mut composition.description, &descriptor.description);
        }
        Schema::AnyOf(union) => {
            set_text(&mut union.title, &descriptor.title);
            set_text(&mut union.description, &descriptor.description);
            if let Some(value) = &descriptor.default {
                union.default = Some(value.clone());
            }
            if let Some(inner) = union.inner_mut() {
                let mut inner_constraints = descriptor.clone();
                inner_constraints.title = None;
                inner_constraints.description = None;
                inner_constraints.default = None;
                inner_constraints.nullable = false;
                apply(&inner_constraints, inner);
            }
        }
    }

    if descriptor.nullable {
        match schema {
            Schema::Primitive(primitive) => primitive.types.insert(SchemaType::Null),
            Schema::Reference(_) | Schema::AllOf(_) => {
                let inner = std::mem::replace(schema, Schema::untyped());
                *schema = primitives::fold_nullable(inner);
            }
            _ => {}
        }
    }
}

fn apply_to_primitive(descriptor: &ConstraintDescriptor, primitive: &mut PrimitiveSchema) {
    set_text(&mut primitive.title, &descriptor.title);
    set_text(&mut primitive.description, &descriptor.description);
    set_text(&mut primitive.format, &descriptor.format);
    set_text(&mut primitive.pattern, &descriptor.pattern);

    if descriptor.minimum.is_some() {
        primitive.minimum = descriptor.minimum;
    }
    if descriptor.maximum.is_some() {
        primitive.maximum = descriptor.maximum;
    }
    if descriptor.exclusive_minimum {
        primitive.exclusive_minimum = Some(true);
    }
    if descriptor.exclusive_maximum {
        primitive.exclusive_maximum = Some(true);
    }
    if descriptor.min_length.is_some() {
        primitive.min_length = descriptor.min_length;
    }
    if descriptor.max_length.is_some() {
        primitive.max_length = descriptor.max_length;
    }
    if descriptor.read_only {
        primitive.read_only = Some(true);
    }
    if descriptor.write_only {
        primitive.write_only = Some(true);
    }
    if descriptor.deprecated {
        primitive.deprecated = Some(true);
    }
    if !descriptor.enum_values.is_empty() {
        primitive.enum_values = descriptor.enum_values.clone();
    }
    if let Some(value) = &descriptor.default {
        primitive.default = Some(value.clone());
    }
    if let Some(value) = &descriptor.example {
        primitive.example = Some(value.clone());
    }
    extend_extensions(&mut primitive.extensions, descriptor);
}

/// Object-node application, also used directly by the generator after the
/// required-name validation pass
pub(crate) fn apply_to_object(descriptor: &ConstraintDescriptor, object: &mut ObjectSchema) {
    set_text(&mut object.title, &descriptor.title);
    set_text(&mut object.description, &descriptor.description);

    if descriptor.min_properties.is_some() {
        object.min_properties = descriptor.min_properties;
    }
    if descriptor.max_properties.is_some() {
        object.max_properties = descriptor.max_properties;
    }
    if descriptor.unevaluated_properties.is_some() {
        object.unevaluated_properties = descriptor.unevaluated_properties;
    }
    if object.additional_properties.is_none() {
        if let Some(allowed) = descriptor.additional_properties_allowed {
            object.additional_properties = Some(AdditionalProperties::Allowed(allowed));
        }
    }
    if descriptor.read_only {
        object.read_only = Some(true);
    }
    if descriptor.write_only {
        object.write_only = Some(true);
    }
    if descriptor.deprecated {
        object.deprecated = Some(true);
    }
    if let Some(value) = &descriptor.default {
        object.default = Some(value.clone());
    }
    if let Some(value) = &descriptor.example {
        object.example = Some(value.clone());
    }
    extend_extensions(&mut object.extensions, descriptor);
}

fn apply_to_array(descriptor: &ConstraintDescriptor, array: &mut ArraySchema) {
    set_text(&mut array.title, &descriptor.title);
    set_text(&mut array.description, &descriptor.description);

    if descriptor.min_items.is_some() {
        array.min_items = descriptor.min_items;
    }
    if descriptor.max_items.is_some() {
        array.max_items = descriptor.max_items;
    }
    if descriptor.unique_items {
        array.unique_items = Some(true);
    }
    if let Some(value) = &descriptor.default {
        array.default = Some(value.clone());
    }
    if let Some(value) = &descriptor.example {
        array.example = Some(value.clone());
    }
    extend_extensions(&mut array.extensions, descriptor);
}

fn apply_to_reference(descriptor: &ConstraintDescriptor, reference: &mut SchemaRef) {
    set_text(&mut reference.title, &descriptor.title);
    set_text(&mut reference.description, &descriptor.description);

    let dropped = descriptor.format.is_some()
        || descriptor.pattern.is_some()
        || descriptor.minimum.is_some()
        || descriptor.maximum.is_some()
        || descriptor.min_length.is_some()
        || descriptor.max_length.is_some()
        || !descriptor.enum_values.is_empty()
        || descriptor.default.is_some()
        || descriptor.example.is_some()
        || !descriptor.extensions.is_empty();
    if dropped {
        trace!(
            target = %reference.reference,
            "dropping constraint fields a reference cannot carry"
        );
    }
}

fn extend_extensions(target: &mut IndexMap<String, Value>, descriptor: &ConstraintDescriptor) {
    for (key, value) in &descriptor.extensions {
        target.insert(key.clone(), value.clone());
    }
}

fn set_text(target: &mut Option<String>, value: &Option<String>) {
    if let Some(text) = value {
        *target = Some(text.clone());
    }
}

/// Lowercase a key and strip separators so `minLength`, `min_length` and
/// `min-length` all address the same field
fn normalize(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_' && *c != '-')
        .collect::<String>()
        .to_ascii_lowercase()
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Numeric value, also accepted in textual form
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Non-negative length bound; negative values are the legacy unset sentinel
/// and read as a no-op
fn as_length(value: &Value) -> Option<u64> {
    let raw = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_u64().map(|u| u as i64))?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    u64::try_from(raw).ok()
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_value_list(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::Null => Vec::new(),
        other => vec![other.clone()],
    }
}

fn as_name_list(value: &Value) -> Vec<String> {
    as_value_list(value)
        .into_iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect()
}

fn union_values(target: &mut Vec<Value>, incoming: Vec<Value>) {
    for value in incoming {
        if !target.contains(&value) {
            target.push(value);
        }
    }
}

fn union_names(target: &mut Vec<String>, incoming: Vec<String>) {
    for name in incoming {
        if !target.contains(&name) {
            target.push(name);
        }
    }
}
