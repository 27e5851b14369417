//! Field handlers for [`walk`](crate::walk::walk) and
//! [`walk_mut`](crate::walk::walk_mut).

pub mod conf;
pub mod validate;

pub use conf::{conf, ConfError, IntParseError, CONF_KEY};
pub use validate::{validate, ValidateError, VALIDATE_KEY};
