//! Value adaptation
//!
//! Callers in the managed language pass class literals as type-reference
//! placeholders. Records store native class references, so placeholders are
//! converted before the instance check.

use crate::element::ElementType;
use crate::value::{ArrayValue, Value};

/// Convert type-reference placeholders to native class references
///
/// Object arrays are adapted element by element; every other value passes
/// through unchanged.
#[must_use]
pub fn adapt(value: Value) -> Value {
    match value {
        Value::TypeRef(name) => Value::ClassRef(name),
        Value::Array(ArrayValue::Object { element, items }) => Value::Array(ArrayValue::Object {
            element,
            items: items.into_iter().map(adapt).collect(),
        }),
        other => other,
    }
}

/// Adapt `value` and check it against `expected`
///
/// Returns `None` when the value is missing or is not an instance of
/// `expected` after adaptation.
#[must_use]
pub fn coerce(value: Option<Value>, expected: &ElementType) -> Option<Value> {
    let adapted = adapt(value?);
    expected.accepts(&adapted).then_some(adapted)
}
