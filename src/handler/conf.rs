//! Configuration population driven by the `conf` annotation.

use std::num::ParseIntError;

use thiserror::Error;
use tracing::debug;

use crate::source::VarSource;
use crate::value::{FieldDescriptor, IntBounds, Scalar, Value};

/// Annotation key naming the variable that feeds a field.
pub const CONF_KEY: &str = "conf";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfError {
    #[error("failed to parse '{raw}' for field '{field}': {source}")]
    Parse {
        field: String,
        raw: String,
        source: IntParseError,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IntParseError {
    #[error(transparent)]
    Invalid(#[from] ParseIntError),

    #[error("out of range for {type_name} ({min}..={max})")]
    OutOfRange {
        type_name: &'static str,
        min: i64,
        max: i64,
    },
}

/// Returns a mutating handler that fills `conf`-annotated fields from `source`.
///
/// String fields take the variable verbatim and integer fields parse it in
/// base 10, within the field's declared range when it has one. Unset
/// variables leave the field untouched. Other field kinds are left alone.
pub fn conf<S>(source: &S) -> impl FnMut(&mut Value, &FieldDescriptor) -> Result<(), ConfError> + '_
where
    S: VarSource + ?Sized,
{
    move |value, field| apply(source, value, field)
}

/// Applies the `conf` annotation of `field` to `value`.
pub fn apply<S>(source: &S, value: &mut Value, field: &FieldDescriptor) -> Result<(), ConfError>
where
    S: VarSource + ?Sized,
{
    let Some(name) = field.annotation(CONF_KEY) else {
        return Ok(());
    };
    let Some(raw) = source.var(name) else {
        debug!(field = %field.name, var = name, "variable unset, keeping current value");
        return Ok(());
    };

    match value {
        Value::Scalar(Scalar::Str(s)) => *s = raw,
        Value::Scalar(Scalar::Int(i)) => {
            *i = parse_int(&raw, field.int_bounds).map_err(|source| ConfError::Parse {
                field: field.name.clone(),
                raw: raw.clone(),
                source,
            })?;
        }
        other => {
            debug!(
                field = %field.name,
                var = name,
                kind = other.kind(),
                "unsupported field kind, skipping"
            );
            return Ok(());
        }
    }

    debug!(field = %field.name, var = name, "field populated");
    Ok(())
}

fn parse_int(raw: &str, bounds: Option<IntBounds>) -> Result<i64, IntParseError> {
    let parsed: i64 = raw.parse()?;
    match bounds {
        Some(b) if !b.contains(parsed) => Err(IntParseError::OutOfRange {
            type_name: b.type_name,
            min: b.min,
            max: b.max,
        }),
        _ => Ok(parsed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Annotations;
    use crate::source::MapSource;
    use crate::value::Struct;
    use crate::walk::walk_mut;

    fn conf_field(name: &str, type_name: &str, var: &str) -> FieldDescriptor {
        FieldDescriptor::new(name, type_name).with_annotations(Annotations::new().with(CONF_KEY, var))
    }

    fn config(retries: i64, host: &str) -> Value {
        Value::from(
            Struct::new("Config")
                .field(conf_field("http_max_retries", "i64", "HTTP_MAX_RETRIES"), retries)
                .field(conf_field("elasticsearch_host", "String", "ELASTICSEARCH_HOST"), host),
        )
    }

    #[test]
    fn test_unset_variable_keeps_prior_value() {
        let source = MapSource::new();
        let mut value = Value::from(3i64);
        apply(&source, &mut value, &conf_field("retries", "i64", "RETRIES")).unwrap();
        assert_eq!(value, Value::from(3i64));
    }

    #[test]
    fn test_integer_is_parsed() {
        let source = MapSource::new().with("RETRIES", "5");
        let mut value = Value::from(0i64);
        apply(&source, &mut value, &conf_field("retries", "i64", "RETRIES")).unwrap();
        assert_eq!(value, Value::from(5i64));
    }

    #[test]
    fn test_negative_integer_is_parsed() {
        let source = MapSource::new().with("OFFSET", "-12");
        let mut value = Value::from(0i64);
        apply(&source, &mut value, &conf_field("offset", "i64", "OFFSET")).unwrap();
        assert_eq!(value, Value::from(-12i64));
    }

    #[test]
    fn test_integer_parse_error_names_field() {
        let source = MapSource::new().with("RETRIES", "abc");
        let mut value = Value::from(1i64);
        let err = apply(&source, &mut value, &conf_field("retries", "i64", "RETRIES")).unwrap_err();

        let ConfError::Parse { field, raw, .. } = &err;
        assert_eq!(field, "retries");
        assert_eq!(raw, "abc");
        assert!(err.to_string().contains("retries"));
        assert_eq!(value, Value::from(1i64));
    }

    #[test]
    fn test_integer_outside_declared_range_names_field() {
        let source = MapSource::new().with("RETRIES", "5000000000");
        let field = conf_field("retries", "i32", "RETRIES").with_int_bounds(IntBounds::I32);
        let mut value = Value::from(1i64);

        let err = apply(&source, &mut value, &field).unwrap_err();

        let ConfError::Parse { field, raw, source } = &err;
        assert_eq!(field, "retries");
        assert_eq!(raw, "5000000000");
        assert!(matches!(source, IntParseError::OutOfRange { type_name: "i32", .. }));
        assert_eq!(value, Value::from(1i64));
    }

    #[test]
    fn test_integer_at_declared_bound_is_accepted() {
        let source = MapSource::new().with("LEVEL", "-128");
        let field = conf_field("level", "i8", "LEVEL").with_int_bounds(IntBounds::I8);
        let mut value = Value::from(0i64);
        apply(&source, &mut value, &field).unwrap();
        assert_eq!(value, Value::from(-128i64));
    }

    #[test]
    fn test_string_is_assigned_verbatim() {
        let source = MapSource::new().with("HOST", "  es.local:9200 ");
        let mut value = Value::from("");
        apply(&source, &mut value, &conf_field("host", "String", "HOST")).unwrap();
        assert_eq!(value, Value::from("  es.local:9200 "));
    }

    #[test]
    fn test_missing_annotation_is_noop() {
        let source = MapSource::new().with("host", "x");
        let mut value = Value::from("y");
        apply(&source, &mut value, &FieldDescriptor::new("host", "String")).unwrap();
        assert_eq!(value, Value::from("y"));
    }

    #[test]
    fn test_unsupported_kinds_are_left_alone() {
        let source = MapSource::new().with("FLAG", "true").with("RATIO", "0.5");

        let mut flag = Value::from(false);
        apply(&source, &mut flag, &conf_field("flag", "bool", "FLAG")).unwrap();
        assert_eq!(flag, Value::from(false));

        let mut ratio = Value::from(0.1f64);
        apply(&source, &mut ratio, &conf_field("ratio", "f64", "RATIO")).unwrap();
        assert_eq!(ratio, Value::from(0.1f64));

        let mut absent = Value::none();
        apply(&source, &mut absent, &conf_field("maybe", "Option<bool>", "FLAG")).unwrap();
        assert_eq!(absent, Value::none());
    }

    #[test]
    fn test_walk_mut_populates_config_in_place() {
        let source = MapSource::new()
            .with("HTTP_MAX_RETRIES", "5")
            .with("ELASTICSEARCH_HOST", "es.internal");
        let mut root = config(0, "");

        walk_mut(&mut root, conf(&source)).unwrap();

        assert_eq!(root, config(5, "es.internal"));
    }

    #[test]
    fn test_walk_mut_reaches_nested_and_sequence_fields() {
        let source = MapSource::new().with("WORKER_NAME", "w");
        let worker = || {
            Value::from(Struct::new("Worker").field(conf_field("name", "String", "WORKER_NAME"), "?"))
        };
        let mut root = Value::from(
            Struct::new("Pool").field(FieldDescriptor::new("workers", "Vec<Worker>"), vec![worker(), worker()]),
        );

        walk_mut(&mut root, conf(&source)).unwrap();

        assert_eq!(root.to_string(), "{[{w} {w}]}");
    }

    #[test]
    fn test_walk_mut_stops_at_parse_error() {
        let source = MapSource::new()
            .with("HTTP_MAX_RETRIES", "many")
            .with("ELASTICSEARCH_HOST", "es.internal");
        let mut root = config(2, "before");

        let err = walk_mut(&mut root, conf(&source)).unwrap_err();

        assert!(matches!(err, ConfError::Parse { ref field, .. } if field == "http_max_retries"));
        assert_eq!(root, config(2, "before"));
    }
}
