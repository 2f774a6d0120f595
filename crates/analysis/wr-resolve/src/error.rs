//! Error types for scope handling
//!
//! These are contract violations by the embedding driver, not user errors:
//! user-facing findings are [`crate::ResolveDiagnostic`] values.

use crate::scope::ScopeId;
use miette::Diagnostic;
use wr_span::FileSpan;

/// Misuse of the scope stack
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Diagnostic)]
pub enum ResolutionError {
    /// A scope was exited while it was not the innermost open scope
    #[error("scope exit out of order: expected {expected} on top of the stack")]
    #[diagnostic(
        code(resolve::scope_mismatch),
        help("every enter_scope must be matched by exit_scope in reverse order")
    )]
    ScopeMismatch {
        /// Scope named by the handle being exited
        expected: ScopeId,
        /// Scope actually on top of the stack, if any
        top: Option<ScopeId>,
    },

    /// A local declaration was made with no scope open
    #[error("cannot declare a binding at {span} with no open scope")]
    #[diagnostic(code(resolve::no_open_scope))]
    NoOpenScope {
        /// Location of the rejected declaration
        span: FileSpan,
    },
}
