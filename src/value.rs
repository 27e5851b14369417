//! Tagged-variant value model walked by [`walk`](fn@crate::walk).

use std::collections::BTreeMap;
use std::fmt;

use crate::annotation::Annotations;

/// A value of arbitrary shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    Struct(Struct),
    Seq(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Optional(Option<Box<Value>>),
}

/// Leaf values.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
}

/// A structure with named, annotated fields in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Struct {
    pub type_name: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub descriptor: FieldDescriptor,
    pub value: Value,
}

/// Static metadata of a struct field: its name, declared type and annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub type_name: String,
    pub annotations: Annotations,
    /// Range of the declared type, for signed integer fields.
    pub int_bounds: Option<IntBounds>,
}

/// Range and name of a signed integer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntBounds {
    pub type_name: &'static str,
    pub min: i64,
    pub max: i64,
}

impl IntBounds {
    pub const I8: Self = Self::new("i8", i8::MIN as i64, i8::MAX as i64);
    pub const I16: Self = Self::new("i16", i16::MIN as i64, i16::MAX as i64);
    pub const I32: Self = Self::new("i32", i32::MIN as i64, i32::MAX as i64);
    pub const I64: Self = Self::new("i64", i64::MIN, i64::MAX);

    pub const fn new(type_name: &'static str, min: i64, max: i64) -> Self {
        Self { type_name, min, max }
    }

    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            annotations: Annotations::new(),
            int_bounds: None,
        }
    }

    pub fn with_int_bounds(mut self, bounds: IntBounds) -> Self {
        self.int_bounds = Some(bounds);
        self
    }

    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    /// Shorthand for `self.annotations.lookup(key)`.
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.lookup(key)
    }
}

impl Struct {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Appends a field, keeping declaration order.
    pub fn field(mut self, descriptor: FieldDescriptor, value: impl Into<Value>) -> Self {
        self.fields.push(Field {
            descriptor,
            value: value.into(),
        });
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|f| f.descriptor.name == name)
            .map(|f| &f.value)
    }
}

impl Value {
    pub fn none() -> Self {
        Value::Optional(None)
    }

    pub fn some(value: impl Into<Value>) -> Self {
        Value::Optional(Some(Box::new(value.into())))
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&Struct> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the variant, used in log output.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Scalar(Scalar::Bool(_)) => "bool",
            Value::Scalar(Scalar::Int(_)) => "int",
            Value::Scalar(Scalar::UInt(_)) => "uint",
            Value::Scalar(Scalar::Float(_)) => "float",
            Value::Scalar(Scalar::Str(_)) => "string",
            Value::Struct(_) => "struct",
            Value::Seq(_) => "seq",
            Value::Map(_) => "map",
            Value::Optional(_) => "optional",
        }
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Value::Scalar(s)
    }
}

impl From<Struct> for Value {
    fn from(s: Struct) -> Self {
        Value::Struct(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Seq(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Scalar(Scalar::Bool(b))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Scalar(Scalar::Int(i))
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Value::Scalar(Scalar::UInt(u))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Scalar(Scalar::Float(f))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(Scalar::Str(s.to_string()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Scalar(Scalar::Str(s))
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::UInt(u) => write!(f, "{u}"),
            Scalar::Float(x) => write!(f, "{x}"),
            Scalar::Str(s) => f.write_str(s),
        }
    }
}

/// Canonical display string. Scalars render plainly; containers use a
/// space-separated bracketed form, maps in key order.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(s) => fmt::Display::fmt(s, f),
            Value::Struct(s) => {
                f.write_str("{")?;
                write_joined(f, s.fields.iter().map(|field| &field.value))?;
                f.write_str("}")
            }
            Value::Seq(items) => {
                f.write_str("[")?;
                write_joined(f, items.iter())?;
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("map[")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{key}:{value}")?;
                }
                f.write_str("]")
            }
            Value::Optional(None) => f.write_str("<nil>"),
            Value::Optional(Some(inner)) => fmt::Display::fmt(inner, f),
        }
    }
}

fn write_joined<'a>(
    f: &mut fmt::Formatter<'_>,
    values: impl Iterator<Item = &'a Value>,
) -> fmt::Result {
    for (i, value) in values.enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{value}")?;
    }
    Ok(())
}
