//! Field schemas built by the front-end from declared accessors

use crate::element::ElementType;
use crate::value::Value;

/// Field name that a native record may still take positionally
pub const SOLE_POSITIONAL_FIELD: &str = "value";

/// Where the record type was declared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Declared by the host platform; field order is not guaranteed
    Native,
    /// Declared in the managed language; field order is the declaration order
    Managed,
}

/// The declared interface of a record
///
/// Equality is defined against this interface so a record can be compared
/// with any other container of the same kind, not only with instances built
/// here.
pub trait RecordView {
    /// Kind (type name) of the record
    fn record_kind(&self) -> &str;

    /// Value of the field called `name`
    fn field_value(&self, name: &str) -> Option<&Value>;

    /// Number of fields the container exposes
    fn field_count(&self) -> usize;
}

/// One declared accessor of a record type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    name: String,
    element_type: ElementType,
    default: Option<Value>,
}

impl FieldDescriptor {
    /// Field without a default value
    pub fn new(name: impl Into<String>, element_type: ElementType) -> Self {
        Self {
            name: name.into(),
            element_type,
            default: None,
        }
    }

    /// Attach the declared default value
    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Field name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared element type
    #[must_use]
    pub fn element_type(&self) -> &ElementType {
        &self.element_type
    }

    /// Declared default value, if any
    #[must_use]
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Read this field from any container implementing the record interface
    #[must_use]
    pub fn extract<'c>(&self, container: &'c dyn RecordView) -> Option<&'c Value> {
        container.field_value(&self.name)
    }
}

/// Ordered fields of one record type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    kind: String,
    fields: Vec<FieldDescriptor>,
}

impl FieldSchema {
    /// Schema of the record kind `kind` with `fields` in declaration order
    pub fn new(kind: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            kind: kind.into(),
            fields,
        }
    }

    /// Record kind name
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Fields in schema order
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Number of fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Index of the field called `name`
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    /// Whether the record can be called positionally regardless of field order
    #[must_use]
    pub fn is_order_independent(&self) -> bool {
        self.fields
            .iter()
            .all(|field| field.name == SOLE_POSITIONAL_FIELD)
    }
}
