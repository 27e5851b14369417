//! Typed front end: per-type schemas that lift ordinary serde structs into
//! the tagged [`Value`](crate::Value) model.

mod convert;
mod error;
mod schema;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::instrument;

pub use convert::{from_value, to_value};
pub use error::ReflectError;
pub use crate::value::IntBounds;
pub use schema::{Annotated, FieldSchema, Shape, StructSchema};

use crate::handler;
use crate::source::VarSource;
use crate::walk::{walk, walk_mut};
use crate::Error;

/// Checks every `validate`-annotated field reachable from `value`.
#[instrument(skip_all, fields(type_name = std::any::type_name::<T>()))]
pub fn validate<T: Serialize + Annotated>(value: &T) -> Result<(), Error> {
    let lifted = to_value(value)?;
    walk(&lifted, handler::validate)?;
    Ok(())
}

/// Fills `conf`-annotated fields of `target` from `source`.
///
/// `target` is only replaced once every field has been applied and the
/// result deserializes back into `T`; on error it is left as it was.
#[instrument(skip_all, fields(type_name = std::any::type_name::<T>()))]
pub fn populate<T, S>(target: &mut T, source: &S) -> Result<(), Error>
where
    T: Serialize + DeserializeOwned + Annotated,
    S: VarSource + ?Sized,
{
    let mut lifted = to_value(target)?;
    walk_mut(&mut lifted, handler::conf(source))?;
    *target = from_value(lifted)?;
    Ok(())
}
