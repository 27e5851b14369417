//! Conversion between serde types and [`Value`] via `toml::Value`.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use toml::Value as Toml;

use super::{Annotated, ReflectError, Shape, StructSchema};
use crate::annotation::Annotations;
use crate::value::{Field, FieldDescriptor, Scalar, Struct, Value};

/// Lifts `value` into the tagged model, attaching the annotations declared
/// by `T`'s schema.
pub fn to_value<T: Serialize + Annotated>(value: &T) -> Result<Value, ReflectError> {
    let schema = T::schema();
    match Toml::try_from(value)? {
        Toml::Table(table) => lift_struct(&schema, table, "").map(Value::Struct),
        _ => Err(ReflectError::ShapeMismatch {
            path: schema.name.to_string(),
            expected: schema.name.to_string(),
        }),
    }
}

/// Rebuilds a typed value from the tagged model.
///
/// Absent optionals are dropped from their enclosing struct or map; anywhere
/// else they cannot be represented.
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, ReflectError> {
    let raw = lower(value, "")?;
    raw.try_into().map_err(ReflectError::Deserialize)
}

fn lift_struct(
    schema: &StructSchema,
    mut table: toml::Table,
    path: &str,
) -> Result<Struct, ReflectError> {
    let mut lifted = Struct::new(schema.name);

    for field in &schema.fields {
        let field_path = join(path, field.name);
        let annotations =
            Annotations::parse(field.tag).map_err(|source| ReflectError::Annotation {
                field: field_path.clone(),
                source,
            })?;
        let value = lift(&field.shape, table.remove(field.name), &field_path)?;

        let mut descriptor =
            FieldDescriptor::new(field.name, field.shape.type_name()).with_annotations(annotations);
        if let Shape::Int(bounds) = field.shape {
            descriptor = descriptor.with_int_bounds(bounds);
        }

        lifted.fields.push(Field { descriptor, value });
    }

    if let Some(extra) = table.keys().next() {
        return Err(ReflectError::UndeclaredField(join(path, extra)));
    }

    Ok(lifted)
}

fn lift(shape: &Shape, raw: Option<Toml>, path: &str) -> Result<Value, ReflectError> {
    let mismatch = || ReflectError::ShapeMismatch {
        path: display_path(path),
        expected: shape.type_name(),
    };

    let raw = match (shape, raw) {
        (Shape::Optional(_), None) => return Ok(Value::Optional(None)),
        (Shape::Optional(inner), Some(raw)) => {
            return Ok(Value::Optional(Some(Box::new(lift(inner, Some(raw), path)?))));
        }
        (_, None) => return Err(ReflectError::MissingField(display_path(path))),
        (_, Some(raw)) => raw,
    };

    match (shape, raw) {
        (Shape::Bool, Toml::Boolean(b)) => Ok(Value::Scalar(Scalar::Bool(b))),
        (Shape::Int(bounds), Toml::Integer(i)) if bounds.contains(i) => {
            Ok(Value::Scalar(Scalar::Int(i)))
        }
        (Shape::UInt, Toml::Integer(i)) => u64::try_from(i)
            .map(|u| Value::Scalar(Scalar::UInt(u)))
            .map_err(|_| mismatch()),
        (Shape::Float, Toml::Float(f)) => Ok(Value::Scalar(Scalar::Float(f))),
        (Shape::Str, Toml::String(s)) => Ok(Value::Scalar(Scalar::Str(s))),
        (Shape::Str, Toml::Datetime(dt)) => Ok(Value::Scalar(Scalar::Str(dt.to_string()))),
        (Shape::Seq(inner), Toml::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| lift(inner, Some(item), &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Seq),
        (Shape::Map(inner), Toml::Table(table)) => table
            .into_iter()
            .map(|(key, item)| {
                let value = lift(inner, Some(item), &join(path, &key))?;
                Ok((key, value))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(Value::Map),
        (Shape::Struct(schema), Toml::Table(table)) => {
            lift_struct(&schema(), table, path).map(Value::Struct)
        }
        _ => Err(mismatch()),
    }
}

fn lower(value: Value, path: &str) -> Result<Toml, ReflectError> {
    let lowered = match value {
        Value::Scalar(Scalar::Bool(b)) => Toml::Boolean(b),
        Value::Scalar(Scalar::Int(i)) => Toml::Integer(i),
        Value::Scalar(Scalar::UInt(u)) => {
            Toml::Integer(i64::try_from(u).map_err(|_| ReflectError::Unrepresentable {
                path: display_path(path),
                reason: "unsigned integer exceeds i64::MAX",
            })?)
        }
        Value::Scalar(Scalar::Float(f)) => Toml::Float(f),
        Value::Scalar(Scalar::Str(s)) => Toml::String(s),
        Value::Struct(s) => Toml::Table(lower_entries(
            s.fields
                .into_iter()
                .map(|field| (field.descriptor.name, field.value)),
            path,
        )?),
        Value::Map(map) => Toml::Table(lower_entries(map.into_iter(), path)?),
        Value::Seq(items) => Toml::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| lower(item, &format!("{path}[{i}]")))
                .collect::<Result<_, _>>()?,
        ),
        Value::Optional(Some(inner)) => lower(*inner, path)?,
        Value::Optional(None) => {
            return Err(ReflectError::Unrepresentable {
                path: display_path(path),
                reason: "absent value outside of a struct or map",
            })
        }
    };
    Ok(lowered)
}

fn lower_entries(
    entries: impl Iterator<Item = (String, Value)>,
    path: &str,
) -> Result<toml::Table, ReflectError> {
    let mut table = toml::Table::new();
    for (key, value) in entries {
        if matches!(value, Value::Optional(None)) {
            continue;
        }
        let lowered = lower(value, &join(path, &key))?;
        table.insert(key, lowered);
    }
    Ok(table)
}

fn join(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{path}.{segment}")
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Server {
        host: String,
        port: u16,
        #[serde(default)]
        tags: Vec<String>,
        weight: Option<f64>,
        limits: BTreeMap<String, i64>,
        upstream: Option<Upstream>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Upstream {
        url: String,
        enabled: bool,
    }

    impl Annotated for Server {
        fn schema() -> StructSchema {
            StructSchema::new("Server")
                .tagged("host", Shape::Str, r#"conf:"SERVER_HOST""#)
                .field("port", Shape::UInt)
                .field("tags", Shape::seq(Shape::Str))
                .field("weight", Shape::optional(Shape::Float))
                .field("limits", Shape::map(Shape::I64))
                .field("upstream", Shape::optional(Shape::of::<Upstream>()))
        }
    }

    impl Annotated for Upstream {
        fn schema() -> StructSchema {
            StructSchema::new("Upstream")
                .tagged("url", Shape::Str, r#"validate:"^https?://""#)
                .field("enabled", Shape::Bool)
        }
    }

    fn server() -> Server {
        Server {
            host: "localhost".into(),
            port: 8080,
            tags: vec!["a".into(), "b".into()],
            weight: None,
            limits: BTreeMap::from([("rps".to_string(), 100)]),
            upstream: Some(Upstream {
                url: "https://origin".into(),
                enabled: true,
            }),
        }
    }

    #[test]
    fn test_lift_attaches_descriptors_in_declaration_order() {
        let value = to_value(&server()).unwrap();
        let s = value.as_struct().unwrap();

        let names: Vec<_> = s.fields.iter().map(|f| f.descriptor.name.as_str()).collect();
        assert_eq!(names, vec!["host", "port", "tags", "weight", "limits", "upstream"]);

        let host = &s.fields[0].descriptor;
        assert_eq!(host.type_name, "String");
        assert_eq!(host.annotation("conf"), Some("SERVER_HOST"));

        assert_eq!(s.get("port"), Some(&Value::from(8080u64)));
        assert_eq!(s.get("weight"), Some(&Value::none()));
        assert_eq!(s.fields[5].descriptor.type_name, "Option<Upstream>");
    }

    #[test]
    fn test_lift_nested_struct_annotations() {
        let value = to_value(&server()).unwrap();
        let upstream = match value.as_struct().unwrap().get("upstream") {
            Some(Value::Optional(Some(inner))) => inner.as_struct().cloned().unwrap(),
            other => panic!("unexpected upstream: {other:?}"),
        };
        assert_eq!(upstream.fields[0].descriptor.annotation("validate"), Some("^https?://"));
    }

    #[test]
    fn test_round_trip_preserves_typed_value() {
        let original = server();
        let value = to_value(&original).unwrap();
        let back: Server = from_value(value).unwrap();
        assert_eq!(back, original);

        let mut sparse = server();
        sparse.upstream = None;
        sparse.weight = Some(0.5);
        let back: Server = from_value(to_value(&sparse).unwrap()).unwrap();
        assert_eq!(back, sparse);
    }

    #[derive(Serialize)]
    struct Loose {
        declared: i64,
        extra: i64,
    }

    impl Annotated for Loose {
        fn schema() -> StructSchema {
            StructSchema::new("Loose").field("declared", Shape::I64)
        }
    }

    #[test]
    fn test_undeclared_field_is_rejected() {
        let result = to_value(&Loose {
            declared: 1,
            extra: 2,
        });
        assert!(matches!(result, Err(ReflectError::UndeclaredField(ref f)) if f == "extra"));
    }

    #[derive(Serialize)]
    struct Mistyped {
        count: String,
    }

    impl Annotated for Mistyped {
        fn schema() -> StructSchema {
            StructSchema::new("Mistyped").field("count", Shape::I64)
        }
    }

    #[test]
    fn test_shape_mismatch_reports_path_and_type() {
        let result = to_value(&Mistyped {
            count: "three".into(),
        });
        match result {
            Err(ReflectError::ShapeMismatch { path, expected }) => {
                assert_eq!(path, "count");
                assert_eq!(expected, "i64");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[derive(Serialize)]
    struct Small {
        level: i8,
        count: i64,
    }

    impl Annotated for Small {
        fn schema() -> StructSchema {
            StructSchema::new("Small")
                .field("level", Shape::I8)
                .field("count", Shape::I64)
        }
    }

    #[test]
    fn test_int_fields_carry_declared_bounds() {
        let value = to_value(&Small { level: -3, count: 9 }).unwrap();
        let s = value.as_struct().unwrap();

        assert_eq!(s.fields[0].descriptor.type_name, "i8");
        assert_eq!(s.fields[0].descriptor.int_bounds, Some(crate::value::IntBounds::I8));
        assert_eq!(s.fields[1].descriptor.int_bounds, Some(crate::value::IntBounds::I64));
        assert_eq!(s.get("level"), Some(&Value::from(-3i64)));
    }

    #[derive(Serialize)]
    struct Sparse {
        present: i64,
    }

    impl Annotated for Sparse {
        fn schema() -> StructSchema {
            StructSchema::new("Sparse")
                .field("present", Shape::I64)
                .field("required", Shape::Str)
        }
    }

    #[test]
    fn test_missing_required_field() {
        let result = to_value(&Sparse { present: 1 });
        assert!(matches!(result, Err(ReflectError::MissingField(ref f)) if f == "required"));
    }

    #[derive(Serialize)]
    struct BadTag {
        value: i64,
    }

    impl Annotated for BadTag {
        fn schema() -> StructSchema {
            StructSchema::new("BadTag").tagged("value", Shape::I64, "conf:VALUE")
        }
    }

    #[test]
    fn test_malformed_tag_is_reported_with_field() {
        let result = to_value(&BadTag { value: 1 });
        assert!(matches!(result, Err(ReflectError::Annotation { ref field, .. }) if field == "value"));
    }

    #[test]
    fn test_absent_value_in_sequence_is_unrepresentable() {
        let value = Value::from(
            Struct::new("Holder").field(
                FieldDescriptor::new("items", "Vec<Option<i64>>"),
                vec![Value::some(1i64), Value::none()],
            ),
        );
        let result = lower(value, "");
        assert!(matches!(
            result,
            Err(ReflectError::Unrepresentable { ref path, .. }) if path == "items[1]"
        ));
    }
}
