//! Runtime value representation
//!
//! Equality and hashing here are the record contract, not IEEE semantics:
//! floating point values compare by bit pattern so that a record holding
//! `NaN` is still equal to itself.

#![allow(
    clippy::min_ident_chars,
    reason = "Short identifiers like f are conventional in formatting implementations"
)]

use crate::element::ElementType;
use crate::instance::RecordInstance;
use std::fmt;
use std::mem;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Runtime value of a record field or argument
#[derive(Debug, Clone)]
pub enum Value {
    /// Boolean value
    Bool(bool),
    /// Character value
    Char(char),
    /// 8-bit integer
    Byte(i8),
    /// 16-bit integer
    Short(i16),
    /// 32-bit integer
    Int(i32),
    /// 64-bit integer
    Long(i64),
    /// 32-bit float
    Float(f32),
    /// 64-bit float
    Double(f64),
    /// String value
    String(String),
    /// Language-level class literal; adapted to [`Value::ClassRef`] before use
    TypeRef(String),
    /// Native class reference
    ClassRef(String),
    /// Enum entry
    Enum {
        /// Enum type name
        ty: String,
        /// Entry name
        entry: String,
    },
    /// Nested record
    Record(Arc<RecordInstance>),
    /// Array value
    Array(ArrayValue),
}

/// Array value, unboxed for primitive element kinds
#[derive(Debug, Clone)]
pub enum ArrayValue {
    /// `BooleanArray`
    Bool(Vec<bool>),
    /// `CharArray`
    Char(Vec<char>),
    /// `ByteArray`
    Byte(Vec<i8>),
    /// `ShortArray`
    Short(Vec<i16>),
    /// `IntArray`
    Int(Vec<i32>),
    /// `LongArray`
    Long(Vec<i64>),
    /// `FloatArray`
    Float(Vec<f32>),
    /// `DoubleArray`
    Double(Vec<f64>),
    /// Array of references with its element type
    Object {
        /// Element type the array was created with
        element: ElementType,
        /// Elements
        items: Vec<Value>,
    },
}

impl Value {
    /// Convenience constructor for strings
    pub fn string(text: impl Into<String>) -> Self {
        Self::String(text.into())
    }

    /// Runtime type of the value, `None` for unadapted type-reference placeholders
    #[must_use]
    pub fn runtime_type(&self) -> Option<ElementType> {
        let ty = match self {
            Self::Bool(_) => ElementType::Boolean,
            Self::Char(_) => ElementType::Char,
            Self::Byte(_) => ElementType::Byte,
            Self::Short(_) => ElementType::Short,
            Self::Int(_) => ElementType::Int,
            Self::Long(_) => ElementType::Long,
            Self::Float(_) => ElementType::Float,
            Self::Double(_) => ElementType::Double,
            Self::String(_) => ElementType::String,
            Self::TypeRef(_) => return None,
            Self::ClassRef(_) => ElementType::Class,
            Self::Enum { ty, .. } => ElementType::Enum(ty.clone()),
            Self::Record(record) => ElementType::Record(record.kind().to_owned()),
            Self::Array(array) => ElementType::array_of(array.element_type()),
        };
        Some(ty)
    }
}

impl ArrayValue {
    /// Element type of the array
    #[must_use]
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Bool(_) => ElementType::Boolean,
            Self::Char(_) => ElementType::Char,
            Self::Byte(_) => ElementType::Byte,
            Self::Short(_) => ElementType::Short,
            Self::Int(_) => ElementType::Int,
            Self::Long(_) => ElementType::Long,
            Self::Float(_) => ElementType::Float,
            Self::Double(_) => ElementType::Double,
            Self::Object { element, .. } => element.clone(),
        }
    }

    /// Number of elements
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Bool(items) => items.len(),
            Self::Char(items) => items.len(),
            Self::Byte(items) => items.len(),
            Self::Short(items) => items.len(),
            Self::Int(items) => items.len(),
            Self::Long(items) => items.len(),
            Self::Float(items) => items.len(),
            Self::Double(items) => items.len(),
            Self::Object { items, .. } => items.len(),
        }
    }

    /// Whether the array has no elements
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::Byte(a), Self::Byte(b)) => a == b,
            (Self::Short(a), Self::Short(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Long(a), Self::Long(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Double(a), Self::Double(b)) => a.to_bits() == b.to_bits(),
            (Self::String(a), Self::String(b))
            | (Self::TypeRef(a), Self::TypeRef(b))
            | (Self::ClassRef(a), Self::ClassRef(b)) => a == b,
            (
                Self::Enum { ty, entry },
                Self::Enum {
                    ty: other_ty,
                    entry: other_entry,
                },
            ) => ty == other_ty && entry == other_entry,
            (Self::Record(a), Self::Record(b)) => Arc::ptr_eq(a, b) || a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl PartialEq for ArrayValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::Byte(a), Self::Byte(b)) => a == b,
            (Self::Short(a), Self::Short(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Long(a), Self::Long(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
            }
            (Self::Double(a), Self::Double(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
            }
            (Self::Object { items: a, .. }, Self::Object { items: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl Eq for ArrayValue {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        match self {
            Self::Bool(b) => b.hash(state),
            Self::Char(c) => c.hash(state),
            Self::Byte(n) => n.hash(state),
            Self::Short(n) => n.hash(state),
            Self::Int(n) => n.hash(state),
            Self::Long(n) => n.hash(state),
            Self::Float(x) => x.to_bits().hash(state),
            Self::Double(x) => x.to_bits().hash(state),
            Self::String(s) | Self::TypeRef(s) | Self::ClassRef(s) => s.hash(state),
            Self::Enum { ty, entry } => {
                ty.hash(state);
                entry.hash(state);
            }
            Self::Record(record) => state.write_u64(record.hash_code()),
            Self::Array(array) => array.hash(state),
        }
    }
}

impl Hash for ArrayValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        match self {
            Self::Bool(items) => items.hash(state),
            Self::Char(items) => items.hash(state),
            Self::Byte(items) => items.hash(state),
            Self::Short(items) => items.hash(state),
            Self::Int(items) => items.hash(state),
            Self::Long(items) => items.hash(state),
            Self::Float(items) => {
                state.write_usize(items.len());
                items.iter().for_each(|x| x.to_bits().hash(state));
            }
            Self::Double(items) => {
                state.write_usize(items.len());
                items.iter().for_each(|x| x.to_bits().hash(state));
            }
            Self::Object { items, .. } => items.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Char(c) => write!(f, "{c}"),
            Self::Byte(n) => write!(f, "{n}"),
            Self::Short(n) => write!(f, "{n}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Long(n) => write!(f, "{n}"),
            Self::Float(x) => write_float(f, *x),
            Self::Double(x) => write_float(f, *x),
            Self::String(s) => write!(f, "{s}"),
            Self::TypeRef(name) | Self::ClassRef(name) => write!(f, "{name}::class"),
            Self::Enum { entry, .. } => write!(f, "{entry}"),
            Self::Record(record) => write!(f, "{record}"),
            Self::Array(array) => write!(f, "{array}"),
        }
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    write!(f, "[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, "]")
}

/// Plain notation inside `[1e-3, 1e7)`, `1.0E20` style outside it,
/// `Infinity` and `NaN` spelled out
fn write_float<T>(f: &mut fmt::Formatter<'_>, value: T) -> fmt::Result
where
    T: Copy + Into<f64> + fmt::Debug + fmt::LowerExp,
{
    let wide: f64 = value.into();
    if wide.is_nan() {
        return write!(f, "NaN");
    }
    if wide.is_infinite() {
        return write!(f, "{}Infinity", if wide < 0.0 { "-" } else { "" });
    }

    let magnitude = wide.abs();
    if magnitude.to_bits() == 0 || (1e-3..1e7).contains(&magnitude) {
        return write!(f, "{value:?}");
    }

    let scientific = format!("{value:e}");
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    if mantissa.contains('.') {
        write!(f, "{mantissa}E{exponent}")
    } else {
        write!(f, "{mantissa}.0E{exponent}")
    }
}

fn write_float_list<T>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result
where
    T: Copy + Into<f64> + fmt::Debug + fmt::LowerExp,
{
    write!(f, "[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write_float(f, *item)?;
    }
    write!(f, "]")
}

impl fmt::Display for ArrayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(items) => write_list(f, items),
            Self::Char(items) => write_list(f, items),
            Self::Byte(items) => write_list(f, items),
            Self::Short(items) => write_list(f, items),
            Self::Int(items) => write_list(f, items),
            Self::Long(items) => write_list(f, items),
            Self::Float(items) => write_float_list(f, items),
            Self::Double(items) => write_float_list(f, items),
            Self::Object { items, .. } => write_list(f, items),
        }
    }
}
