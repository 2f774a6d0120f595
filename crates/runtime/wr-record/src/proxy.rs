//! Method dispatch on records behind their declared interface
//!
//! Four well-known method names are routed to the record's built-in
//! behavior; every other name must match a field accessor.

use crate::error::RecordError;
use crate::instance::RecordInstance;
use crate::schema::RecordView;
use crate::value::Value;
use std::sync::Arc;

/// Equality method name
pub const EQUALS: &str = "equals";
/// Hash method name
pub const HASH_CODE: &str = "hashCode";
/// Rendering method name
pub const TO_STRING: &str = "toString";
/// Type identity accessor name
pub const ANNOTATION_TYPE: &str = "annotationType";

/// What a method name is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodRole {
    /// Value-based equality with one other record
    Equals,
    /// Cached record hash
    HashCode,
    /// Cached `@Kind(...)` rendering
    ToString,
    /// Class reference naming the record kind
    AnnotationType,
    /// Stored value of the field at this schema index
    Accessor(usize),
}

/// Built-in methods, checked before field accessors
const BUILTINS: &[(&str, MethodRole)] = &[
    (EQUALS, MethodRole::Equals),
    (HASH_CODE, MethodRole::HashCode),
    (TO_STRING, MethodRole::ToString),
    (ANNOTATION_TYPE, MethodRole::AnnotationType),
];

/// A record exposed through its declared interface
#[derive(Debug, Clone)]
pub struct RecordProxy {
    instance: Arc<RecordInstance>,
}

impl RecordProxy {
    /// Wrap a constructed record
    #[must_use]
    pub fn new(instance: Arc<RecordInstance>) -> Self {
        Self { instance }
    }

    /// The wrapped record
    #[must_use]
    pub fn instance(&self) -> &Arc<RecordInstance> {
        &self.instance
    }

    /// Route a call of `method` with `arity` arguments
    ///
    /// `equals` only matches with exactly one argument; otherwise the name
    /// falls through to the field accessors like any other.
    #[must_use]
    pub fn dispatch(&self, method: &str, arity: usize) -> Option<MethodRole> {
        let builtin = BUILTINS
            .iter()
            .find(|(name, _)| *name == method)
            .map(|&(_, role)| role)
            .filter(|&role| role != MethodRole::Equals || arity == 1);

        builtin.or_else(|| {
            self.instance
                .schema()
                .position(method)
                .map(MethodRole::Accessor)
        })
    }

    /// Invoke `method` with `args`
    ///
    /// # Errors
    ///
    /// Returns `RecordError::UnsupportedRecord` if the name is neither a
    /// built-in method nor a field of the record.
    pub fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, RecordError> {
        let Some(role) = self.dispatch(method, args.len()) else {
            return Err(RecordError::UnsupportedRecord {
                kind: self.instance.kind().to_owned(),
                method: method.to_owned(),
                arity: args.len(),
            });
        };

        let result = match role {
            MethodRole::Equals => Value::Bool(match args {
                [Value::Record(other)] => self.instance.equals(other.as_ref()),
                _ => false,
            }),
            MethodRole::HashCode => {
                Value::Long(i64::from_ne_bytes(self.instance.hash_code().to_ne_bytes()))
            }
            MethodRole::ToString => Value::String(self.instance.render().to_owned()),
            MethodRole::AnnotationType => Value::ClassRef(self.instance.kind().to_owned()),
            MethodRole::Accessor(index) => match self.instance.value_at(index) {
                Some(value) => value.clone(),
                None => {
                    return Err(RecordError::UnsupportedRecord {
                        kind: self.instance.kind().to_owned(),
                        method: method.to_owned(),
                        arity: args.len(),
                    });
                }
            },
        };

        Ok(result)
    }
}

impl RecordView for RecordProxy {
    fn record_kind(&self) -> &str {
        self.instance.kind()
    }

    fn field_value(&self, name: &str) -> Option<&Value> {
        self.instance.get(name)
    }

    fn field_count(&self) -> usize {
        self.instance.schema().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constructor::RecordConstructor;
    use crate::element::ElementType;
    use crate::schema::{FieldDescriptor, FieldSchema, Origin};

    fn proxy(x: i32, label: &str) -> RecordProxy {
        let schema = Arc::new(FieldSchema::new(
            "Point",
            vec![
                FieldDescriptor::new("x", ElementType::Int),
                FieldDescriptor::new("label", ElementType::String),
            ],
        ));
        let record = RecordConstructor::new(schema, false, Origin::Managed)
            .unwrap()
            .call(vec![Some(Value::Int(x)), Some(Value::string(label))])
            .unwrap();
        RecordProxy::new(record)
    }

    #[test]
    fn test_builtins() {
        let point = proxy(5, "hi");
        let twin = proxy(5, "hi");

        assert_eq!(
            point.invoke(TO_STRING, &[]).unwrap(),
            Value::string("@Point(x=5, label=hi)")
        );
        assert_eq!(
            point.invoke(HASH_CODE, &[]).unwrap(),
            twin.invoke(HASH_CODE, &[]).unwrap()
        );
        assert_eq!(
            point.invoke(ANNOTATION_TYPE, &[]).unwrap(),
            Value::ClassRef("Point".into())
        );
        assert_eq!(
            point
                .invoke(EQUALS, &[Value::Record(Arc::clone(twin.instance()))])
                .unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            point.invoke(EQUALS, &[Value::string("@Point(x=5, label=hi)")]).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_accessors() {
        let point = proxy(5, "hi");
        assert_eq!(point.dispatch("label", 0), Some(MethodRole::Accessor(1)));
        assert_eq!(point.invoke("x", &[]).unwrap(), Value::Int(5));
        assert_eq!(point.invoke("label", &[]).unwrap(), Value::string("hi"));
    }

    #[test]
    fn test_unknown_method() {
        let point = proxy(5, "hi");
        assert_eq!(
            point.invoke("z", &[]),
            Err(RecordError::UnsupportedRecord {
                kind: "Point".to_owned(),
                method: "z".to_owned(),
                arity: 0,
            })
        );
    }

    #[test]
    fn test_equals_needs_exactly_one_argument() {
        let point = proxy(5, "hi");
        assert_eq!(point.dispatch(EQUALS, 1), Some(MethodRole::Equals));
        assert_eq!(point.dispatch(EQUALS, 0), None);
        assert!(matches!(
            point.invoke(EQUALS, &[]),
            Err(RecordError::UnsupportedRecord { arity: 0, .. })
        ));
    }
}
