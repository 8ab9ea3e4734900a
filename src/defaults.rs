/*!
Default value capture.

The discovery front end attaches a best-effort instance snapshot to each type
descriptor. A property's observed value is compared against the intrinsic
default of its declared kind: the zero/empty value the kind naturally takes
when uninitialized. Intrinsic values are suppressed so schemas do not pick up
accidental defaults; anything else is published as the property's `default`.
Instantiation failure (no snapshot) yields absent for every property and is
never an error.
*/

use crate::descriptor::{PrimitiveKind, PropertyDescriptor, TypeRef};
use chrono::{DateTime, NaiveDate};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Read a property's captured default, suppressing intrinsic values
pub fn capture(instance: Option<&Map<String, Value>>, property: &PropertyDescriptor) -> Option<Value> {
    let snapshot = instance?;
    let value = snapshot.get(&property.name)?;
    if is_intrinsic_default(&property.ty, value) {
        None
    } else {
        Some(value.clone())
    }
}

/// Whether a value equals the intrinsic default of the declared kind
pub(crate) fn is_intrinsic_default(ty: &TypeRef, value: &Value) -> bool {
    if value.is_null() {
        return true;
    }
    match ty {
        TypeRef::Named(_) => false,
        TypeRef::Optional(inner) => is_intrinsic_default(inner, value),
        TypeRef::Array(_) => value.as_array().map(Vec::is_empty).unwrap_or(false),
        TypeRef::Primitive(kind) => is_intrinsic_primitive(*kind, value),
    }
}

fn is_intrinsic_primitive(kind: PrimitiveKind, value: &Value) -> bool {
    match kind {
        PrimitiveKind::Text => value.as_str().map(str::is_empty).unwrap_or(false),
        PrimitiveKind::Boolean => value.as_bool() == Some(false),
        PrimitiveKind::Int32
        | PrimitiveKind::Int64
        | PrimitiveKind::UInt32
        | PrimitiveKind::UInt64
        | PrimitiveKind::Float
        | PrimitiveKind::Double
        | PrimitiveKind::Decimal => value.as_f64() == Some(0.0),
        PrimitiveKind::Date => value.as_str().map(is_epoch_date).unwrap_or(false),
        PrimitiveKind::DateTime => value.as_str().map(is_epoch_timestamp).unwrap_or(false),
        PrimitiveKind::Duration => is_zero_duration(value),
        PrimitiveKind::Uuid => value
            .as_str()
            .and_then(|s| Uuid::parse_str(s).ok())
            .map(|u| u.is_nil())
            .unwrap_or(false),
        PrimitiveKind::Binary | PrimitiveKind::Uri => {
            value.as_str().map(str::is_empty).unwrap_or(false)
        }
    }
}

fn is_epoch_date(text: &str) -> bool {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map(|date| date == NaiveDate::default())
        .unwrap_or(false)
}

fn is_epoch_timestamp(text: &str) -> bool {
    DateTime::parse_from_rfc3339(text)
        .map(|ts| ts.timestamp() == 0 && ts.timestamp_subsec_nanos() == 0)
        .unwrap_or(false)
}

fn is_zero_duration(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => matches!(s.as_str(), "PT0S" | "P0D" | "0"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn property(ty: TypeRef) -> PropertyDescriptor {
        PropertyDescriptor::new("value", ty)
    }

    fn snapshot(value: Value) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("value".to_string(), value);
        map
    }

    #[test]
    fn test_zero_numeric_is_suppressed() {
        let map = snapshot(json!(0));
        let prop = property(TypeRef::Primitive(PrimitiveKind::Int32));
        assert_eq!(capture(Some(&map), &prop), None);
    }

    #[test]
    fn test_meaningful_numeric_is_captured() {
        let map = snapshot(json!(42));
        let prop = property(TypeRef::Primitive(PrimitiveKind::Int32));
        assert_eq!(capture(Some(&map), &prop), Some(json!(42)));
    }

    #[test]
    fn test_missing_snapshot_yields_absent() {
        let prop = property(TypeRef::Primitive(PrimitiveKind::Int32));
        assert_eq!(capture(None, &prop), None);
    }

    #[test]
    fn test_empty_text_is_suppressed() {
        let map = snapshot(json!(""));
        let prop = property(TypeRef::Primitive(PrimitiveKind::Text));
        assert_eq!(capture(Some(&map), &prop), None);
    }

    #[test]
    fn test_false_boolean_is_suppressed_but_true_is_not() {
        let prop = property(TypeRef::Primitive(PrimitiveKind::Boolean));
        assert_eq!(capture(Some(&snapshot(json!(false))), &prop), None);
        assert_eq!(capture(Some(&snapshot(json!(true))), &prop), Some(json!(true)));
    }

    #[test]
    fn test_epoch_timestamp_is_suppressed() {
        let prop = property(TypeRef::Primitive(PrimitiveKind::DateTime));
        assert_eq!(
            capture(Some(&snapshot(json!("1970-01-01T00:00:00Z"))), &prop),
            None
        );
        assert_eq!(
            capture(Some(&snapshot(json!("2024-05-01T10:00:00Z"))), &prop),
            Some(json!("2024-05-01T10:00:00Z"))
        );
    }

    #[test]
    fn test_nil_uuid_is_suppressed() {
        let prop = property(TypeRef::Primitive(PrimitiveKind::Uuid));
        assert_eq!(
            capture(
                Some(&snapshot(json!("00000000-0000-0000-0000-000000000000"))),
                &prop
            ),
            None
        );
        assert!(capture(
            Some(&snapshot(json!("8c5f4d52-9d0a-4f3e-8f07-6a2e5a1bb001"))),
            &prop
        )
        .is_some());
    }

    #[test]
    fn test_zero_duration_is_suppressed() {
        let prop = property(TypeRef::Primitive(PrimitiveKind::Duration));
        assert_eq!(capture(Some(&snapshot(json!("PT0S"))), &prop), None);
        assert_eq!(
            capture(Some(&snapshot(json!("PT5M"))), &prop),
            Some(json!("PT5M"))
        );
    }

    #[test]
    fn test_null_is_always_intrinsic() {
        let prop = property(TypeRef::named("User"));
        assert_eq!(capture(Some(&snapshot(Value::Null)), &prop), None);
    }

    #[test]
    fn test_reference_value_is_meaningful_when_present() {
        let prop = property(TypeRef::named("User"));
        assert!(capture(Some(&snapshot(json!({"id": 1}))), &prop).is_some());
    }

    #[test]
    fn test_empty_array_is_suppressed() {
        let prop = property(TypeRef::array(TypeRef::Primitive(PrimitiveKind::Text)));
        assert_eq!(capture(Some(&snapshot(json!([]))), &prop), None);
        assert_eq!(
            capture(Some(&snapshot(json!(["a"]))), &prop),
            Some(json!(["a"]))
        );
    }
}
