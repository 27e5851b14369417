//! Walk a value's structure and dispatch per-field behavior from annotations.
//!
//! Values are modelled as a tagged [`Value`]; [`walk`](fn@walk) visits every struct
//! field pre-order and hands it, with its [`FieldDescriptor`], to a handler.
//! Two handlers ship with the crate: [`handler::validate`] (regex checks from
//! `validate:"..."`) and [`handler::conf`] (fill fields from the variables
//! named by `conf:"..."`). Typed structs take part through [`reflect`].

pub mod annotation;
mod error;
pub mod handler;
pub mod reflect;
pub mod source;
pub mod value;
pub mod walk;

pub use annotation::{AnnotationError, Annotations};
pub use error::Error;
pub use value::{Field, FieldDescriptor, IntBounds, Scalar, Struct, Value};
pub use walk::{walk, walk_mut};
