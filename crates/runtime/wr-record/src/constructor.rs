//! Record construction from positional or named arguments

use crate::coerce::coerce;
use crate::error::{ArityReason, RecordError};
use crate::instance::RecordInstance;
use crate::schema::{FieldSchema, Origin};
use crate::value::Value;
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Constructor for one record type and call convention
///
/// The call-convention check runs once in [`RecordConstructor::new`], before
/// any argument is looked at.
#[derive(Debug, Clone)]
pub struct RecordConstructor {
    schema: Arc<FieldSchema>,
    allow_defaults: bool,
    origin: Origin,
}

impl RecordConstructor {
    /// Create a constructor for `schema`
    ///
    /// # Errors
    ///
    /// Returns `RecordError::ArityOrOrder` when defaults are not allowed, the
    /// record is native and it has any field other than `value`: native records
    /// do not guarantee field order, so they cannot be called positionally.
    pub fn new(
        schema: Arc<FieldSchema>,
        allow_defaults: bool,
        origin: Origin,
    ) -> Result<Self, RecordError> {
        if !allow_defaults && origin == Origin::Native && !schema.is_order_independent() {
            return Err(RecordError::ArityOrOrder {
                kind: schema.kind().to_owned(),
                reason: ArityReason::PositionalNativeCall,
            });
        }

        Ok(Self {
            schema,
            allow_defaults,
            origin,
        })
    }

    /// Schema this constructor builds
    #[must_use]
    pub fn schema(&self) -> &Arc<FieldSchema> {
        &self.schema
    }

    /// Origin of the record type
    #[must_use]
    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Build from arguments in schema order; `None` stands for null
    ///
    /// # Errors
    ///
    /// Returns `RecordError::ArityOrOrder` if the argument count differs from
    /// the field count, or `RecordError::TypeMismatch` for the first argument
    /// that does not fit its field.
    pub fn call(&self, args: Vec<Option<Value>>) -> Result<Arc<RecordInstance>, RecordError> {
        if args.len() != self.schema.len() {
            return Err(RecordError::ArityOrOrder {
                kind: self.schema.kind().to_owned(),
                reason: ArityReason::ArgumentCount {
                    expected: self.schema.len(),
                    found: args.len(),
                },
            });
        }

        self.construct(args)
    }

    /// Build from arguments keyed by field name; missing names are absent
    ///
    /// # Errors
    ///
    /// Returns `RecordError::ArityOrOrder` for a name the schema does not
    /// have, or `RecordError::TypeMismatch` for the first field whose value
    /// does not fit.
    pub fn call_by(
        &self,
        named: &IndexMap<String, Option<Value>>,
    ) -> Result<Arc<RecordInstance>, RecordError> {
        if let Some(name) = named.keys().find(|name| self.schema.position(name).is_none()) {
            return Err(RecordError::ArityOrOrder {
                kind: self.schema.kind().to_owned(),
                reason: ArityReason::UnknownArgument { name: name.clone() },
            });
        }

        let args = self
            .schema
            .fields()
            .iter()
            .map(|field| named.get(field.name()).cloned().flatten())
            .collect();
        self.construct(args)
    }

    fn construct(&self, args: Vec<Option<Value>>) -> Result<Arc<RecordInstance>, RecordError> {
        let mut values = Vec::with_capacity(self.schema.len());

        for (index, (field, arg)) in self.schema.fields().iter().zip(args).enumerate() {
            let value = match arg {
                None if self.allow_defaults => {
                    trace!(field = field.name(), "substituting default");
                    field.default().cloned()
                }
                supplied => supplied,
            };

            let Some(coerced) = coerce(value, field.element_type()) else {
                debug!(kind = self.schema.kind(), field = field.name(), "argument type mismatch");
                return Err(RecordError::TypeMismatch {
                    index,
                    name: field.name().to_owned(),
                    expected: field.element_type().to_string(),
                });
            };
            values.push(coerced);
        }

        Ok(Arc::new(RecordInstance::assemble(
            Arc::clone(&self.schema),
            values,
        )))
    }
}

/// Build a record from named arguments in one step
///
/// # Errors
///
/// Returns the errors of [`RecordConstructor::new`] and
/// [`RecordConstructor::call_by`].
pub fn build(
    schema: Arc<FieldSchema>,
    named: &IndexMap<String, Option<Value>>,
    allow_defaults: bool,
    origin: Origin,
) -> Result<Arc<RecordInstance>, RecordError> {
    RecordConstructor::new(schema, allow_defaults, origin)?.call_by(named)
}
