//! Pre-order, fail-fast traversal of a [`Value`].
//!
//! The handler is called once for every struct field reachable from the root,
//! before the walker descends into that field. Sequences, maps and optionals
//! are transparent: the walker recurses through them but only struct fields
//! trigger the handler. The first error returned by the handler aborts the
//! walk and is returned unchanged.

use tracing::trace;

use crate::value::{FieldDescriptor, Value};

/// Walks `root`, calling `handler` for each struct field.
///
/// Map entries are visited in an unspecified order; handlers must not rely on
/// the order of sibling map values.
pub fn walk<F, E>(root: &Value, mut handler: F) -> Result<(), E>
where
    F: FnMut(&Value, &FieldDescriptor) -> Result<(), E>,
{
    visit(root, &mut handler)
}

/// Like [`walk`], but hands the handler a mutable reference to each field.
///
/// Changes made by the handler are visible to the recursion into that field.
pub fn walk_mut<F, E>(root: &mut Value, mut handler: F) -> Result<(), E>
where
    F: FnMut(&mut Value, &FieldDescriptor) -> Result<(), E>,
{
    visit_mut(root, &mut handler)
}

fn visit<F, E>(value: &Value, handler: &mut F) -> Result<(), E>
where
    F: FnMut(&Value, &FieldDescriptor) -> Result<(), E>,
{
    match value {
        Value::Struct(s) => {
            for field in &s.fields {
                trace!(
                    type_name = %s.type_name,
                    field = %field.descriptor.name,
                    kind = field.value.kind(),
                    "visiting field"
                );
                handler(&field.value, &field.descriptor)?;
                visit(&field.value, handler)?;
            }
            Ok(())
        }
        Value::Seq(items) => items.iter().try_for_each(|item| visit(item, handler)),
        Value::Map(map) => map.values().try_for_each(|item| visit(item, handler)),
        Value::Optional(Some(inner)) => visit(inner, handler),
        Value::Optional(None) | Value::Scalar(_) => Ok(()),
    }
}

fn visit_mut<F, E>(value: &mut Value, handler: &mut F) -> Result<(), E>
where
    F: FnMut(&mut Value, &FieldDescriptor) -> Result<(), E>,
{
    match value {
        Value::Struct(s) => {
            for field in &mut s.fields {
                trace!(
                    type_name = %s.type_name,
                    field = %field.descriptor.name,
                    kind = field.value.kind(),
                    "visiting field"
                );
                handler(&mut field.value, &field.descriptor)?;
                visit_mut(&mut field.value, handler)?;
            }
            Ok(())
        }
        Value::Seq(items) => items
            .iter_mut()
            .try_for_each(|item| visit_mut(item, handler)),
        Value::Map(map) => map
            .values_mut()
            .try_for_each(|item| visit_mut(item, handler)),
        Value::Optional(Some(inner)) => visit_mut(inner, handler),
        Value::Optional(None) | Value::Scalar(_) => Ok(()),
    }
}
