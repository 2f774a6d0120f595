//! Typed record construction
//!
//! Builds immutable, annotation-like records from a [`FieldSchema`] and a set of
//! positional or named arguments. Arguments are adapted and checked against the
//! declared element type of each field, omitted arguments can take declared
//! defaults, and the finished [`RecordInstance`] carries value-based equality,
//! a cached hash and a cached `@Kind(field=value, ...)` rendering.
//!
//! Callers that need the record behind its declared interface go through
//! [`RecordProxy`], an explicit dispatch table over method names.

pub mod coerce;
pub mod constructor;
pub mod element;
pub mod error;
pub mod instance;
pub mod proxy;
pub mod schema;
pub mod value;


pub use constructor::{RecordConstructor, build};
pub use element::ElementType;
pub use error::{ArityReason, RecordError};
pub use instance::RecordInstance;
pub use proxy::{MethodRole, RecordProxy};
pub use schema::{FieldDescriptor, FieldSchema, Origin, RecordView, SOLE_POSITIONAL_FIELD};
pub use value::{ArrayValue, Value};
