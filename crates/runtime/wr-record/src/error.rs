//! Error types for record construction and dispatch

use miette::Diagnostic;
use thiserror::Error;

/// Why a call shape was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArityReason {
    /// Positional call of a native record whose fields are not just `value`
    #[error(
        "positional call of a native record constructor is allowed only if there are no \
         parameters or one parameter named \"value\", because native records do not impose \
         any order on their fields"
    )]
    PositionalNativeCall,

    /// Positional call with the wrong number of arguments
    #[error("expected {expected} arguments, found {found}")]
    ArgumentCount {
        /// Number of fields in the schema
        expected: usize,
        /// Number of arguments supplied
        found: usize,
    },

    /// Named call mentioning a field the schema does not have
    #[error("no field named `{name}`")]
    UnknownArgument {
        /// The unknown argument name
        name: String,
    },
}

/// Errors raised while building or dispatching on a record
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum RecordError {
    /// The arguments do not fit the call convention of the record
    #[error("cannot construct `{kind}`: {reason}")]
    #[diagnostic(code(record::arity_or_order))]
    ArityOrOrder {
        /// Record kind being constructed
        kind: String,
        /// What was wrong with the call
        reason: ArityReason,
    },

    /// An argument is not an instance of the declared element type
    #[error("argument #{index} {name} is not of the required type {expected}")]
    #[diagnostic(code(record::type_mismatch))]
    TypeMismatch {
        /// Zero-based field index
        index: usize,
        /// Field name
        name: String,
        /// Declared element type
        expected: String,
    },

    /// A method name the record interface does not have
    #[error("method is not supported: {kind}.{method} with {arity} arguments")]
    #[diagnostic(code(record::unsupported))]
    UnsupportedRecord {
        /// Record kind dispatched on
        kind: String,
        /// Requested method name
        method: String,
        /// Number of arguments passed
        arity: usize,
    },
}
