use crate::value::IntBounds;

/// A type whose field layout and annotations are known up front.
///
/// Implementations describe the *serialized* field names, in declaration
/// order, together with each field's annotation tag:
///
/// ```
/// use tagwalk::reflect::{Annotated, Shape, StructSchema};
///
/// struct Config {
///     http_max_retries: i64,
///     elasticsearch_host: String,
/// }
///
/// impl Annotated for Config {
///     fn schema() -> StructSchema {
///         StructSchema::new("Config")
///             .tagged("http_max_retries", Shape::I64, r#"conf:"HTTP_MAX_RETRIES""#)
///             .tagged("elasticsearch_host", Shape::Str, r#"conf:"ELASTICSEARCH_HOST""#)
///     }
/// }
/// ```
pub trait Annotated {
    fn schema() -> StructSchema;
}

/// Declared shape of a field.
///
/// Nested structs are referenced through their schema function, so
/// self-referential types such as a `Person` with `friends: Vec<Person>` can
/// be described without building an infinite schema.
#[derive(Debug, Clone)]
pub enum Shape {
    Bool,
    /// A signed integer; the bounds are those of the target type.
    Int(IntBounds),
    /// Any unsigned integer.
    UInt,
    Float,
    Str,
    Struct(fn() -> StructSchema),
    Seq(Box<Shape>),
    Map(Box<Shape>),
    Optional(Box<Shape>),
}

impl Shape {
    pub const I8: Shape = Shape::Int(IntBounds::I8);
    pub const I16: Shape = Shape::Int(IntBounds::I16);
    pub const I32: Shape = Shape::Int(IntBounds::I32);
    pub const I64: Shape = Shape::Int(IntBounds::I64);

    pub fn of<T: Annotated>() -> Self {
        Shape::Struct(T::schema)
    }

    pub fn seq(inner: Shape) -> Self {
        Shape::Seq(Box::new(inner))
    }

    /// A map with string keys.
    pub fn map(inner: Shape) -> Self {
        Shape::Map(Box::new(inner))
    }

    pub fn optional(inner: Shape) -> Self {
        Shape::Optional(Box::new(inner))
    }

    /// Rust-like rendering used as the field descriptor's type name.
    pub fn type_name(&self) -> String {
        match self {
            Shape::Bool => "bool".to_string(),
            Shape::Int(bounds) => bounds.type_name.to_string(),
            Shape::UInt => "u64".to_string(),
            Shape::Float => "f64".to_string(),
            Shape::Str => "String".to_string(),
            Shape::Struct(schema) => schema().name.to_string(),
            Shape::Seq(inner) => format!("Vec<{}>", inner.type_name()),
            Shape::Map(inner) => format!("BTreeMap<String, {}>", inner.type_name()),
            Shape::Optional(inner) => format!("Option<{}>", inner.type_name()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldSchema {
    pub name: &'static str,
    pub shape: Shape,
    /// Raw annotation tag, parsed when the value is lifted.
    pub tag: &'static str,
}

#[derive(Debug, Clone)]
pub struct StructSchema {
    pub name: &'static str,
    pub fields: Vec<FieldSchema>,
}

impl StructSchema {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
        }
    }

    /// Declares a field without annotations.
    pub fn field(self, name: &'static str, shape: Shape) -> Self {
        self.tagged(name, shape, "")
    }

    /// Declares a field carrying the annotation tag `tag`.
    pub fn tagged(mut self, name: &'static str, shape: Shape, tag: &'static str) -> Self {
        self.fields.push(FieldSchema { name, shape, tag });
        self
    }
}
