//! Declared element types of record fields

use crate::value::{ArrayValue, Value};
use std::fmt;

/// Runtime type a field value must be an instance of
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// `true` / `false`
    Boolean,
    /// A single character
    Char,
    /// 8-bit signed integer
    Byte,
    /// 16-bit signed integer
    Short,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    /// 32-bit float
    Float,
    /// 64-bit float
    Double,
    /// Text
    String,
    /// Native class reference
    Class,
    /// Entry of the named enum
    Enum(String),
    /// Nested record of the named kind
    Record(String),
    /// Array of the given element type
    Array(Box<Self>),
    /// Top type; every value is an instance of it
    Any,
}

impl ElementType {
    /// Array of `element`
    #[must_use]
    pub fn array_of(element: Self) -> Self {
        Self::Array(Box::new(element))
    }

    /// Whether values of this type are stored unboxed in arrays
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Self::Boolean
                | Self::Char
                | Self::Byte
                | Self::Short
                | Self::Int
                | Self::Long
                | Self::Float
                | Self::Double
        )
    }

    /// Whether every instance of `other` is also an instance of `self`
    ///
    /// Object arrays are covariant; primitive arrays only match their own
    /// element kind.
    #[must_use]
    pub fn is_assignable_from(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Any, _) => true,
            (Self::Array(ours), Self::Array(theirs)) => {
                if ours.is_primitive() || theirs.is_primitive() {
                    ours == theirs
                } else {
                    ours.is_assignable_from(theirs)
                }
            }
            _ => self == other,
        }
    }

    /// Whether `value` is an instance of this type
    ///
    /// Type-reference placeholders are never instances of anything: they
    /// must be adapted first.
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        let Some(runtime) = value.runtime_type() else {
            return false;
        };
        if !self.is_assignable_from(&runtime) {
            return false;
        }

        match (self, value) {
            (Self::Array(element), Value::Array(ArrayValue::Object { items, .. })) => {
                items.iter().all(|item| element.accepts(item))
            }
            _ => true,
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean => write!(f, "Boolean"),
            Self::Char => write!(f, "Char"),
            Self::Byte => write!(f, "Byte"),
            Self::Short => write!(f, "Short"),
            Self::Int => write!(f, "Int"),
            Self::Long => write!(f, "Long"),
            Self::Float => write!(f, "Float"),
            Self::Double => write!(f, "Double"),
            Self::String => write!(f, "String"),
            Self::Class => write!(f, "Class"),
            Self::Enum(name) | Self::Record(name) => write!(f, "{name}"),
            Self::Array(element) if element.is_primitive() => write!(f, "{element}Array"),
            Self::Array(element) => write!(f, "Array<{element}>"),
            Self::Any => write!(f, "Any"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(ElementType::array_of(ElementType::Int).to_string(), "IntArray");
        assert_eq!(
            ElementType::array_of(ElementType::String).to_string(),
            "Array<String>"
        );
        assert_eq!(ElementType::Record("Point".into()).to_string(), "Point");
    }

    #[test]
    fn test_object_arrays_are_covariant() {
        let any_array = ElementType::array_of(ElementType::Any);
        let string_array = ElementType::array_of(ElementType::String);
        assert!(any_array.is_assignable_from(&string_array));
        assert!(!string_array.is_assignable_from(&any_array));
    }

    #[test]
    fn test_primitive_arrays_are_exact() {
        let any_array = ElementType::array_of(ElementType::Any);
        let int_array = ElementType::array_of(ElementType::Int);
        assert!(!any_array.is_assignable_from(&int_array));
        assert!(ElementType::Any.is_assignable_from(&int_array));
        assert!(!ElementType::array_of(ElementType::Long).is_assignable_from(&int_array));
    }

    #[test]
    fn test_accepts_checks_array_items() {
        let declared = ElementType::array_of(ElementType::String);
        let mixed = Value::Array(ArrayValue::Object {
            element: ElementType::String,
            items: vec![Value::String("a".into()), Value::Int(1)],
        });
        assert!(!declared.accepts(&mixed));
        assert!(!ElementType::Class.accepts(&Value::TypeRef("Point".into())));
        assert!(ElementType::Class.accepts(&Value::ClassRef("Point".into())));
    }
}
