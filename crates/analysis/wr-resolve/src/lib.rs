//! Lexical scope resolution for lambda parameter lists
//!
//! This crate resolves identifier references inside nested function literals,
//! including destructured tuple parameters, and diagnoses parameters that
//! shadow a name already visible from an enclosing scope.
//!
//! # Architecture
//!
//! - **Scope stack**: strictly nested frames of bindings, one per parameter list
//! - **Lambda resolver**: walks a function body, pushing a frame per literal
//! - **Diagnostics**: name shadowing and unresolved references, reported as values
//! - **Errors**: contract violations by the embedding driver (unbalanced scopes)
//!
//! # Usage
//!
//! ```rust,ignore
//! use wr_resolve::{ComponentTable, LambdaResolver};
//!
//! let resolver = LambdaResolver::new(&interner, &components);
//! let result = resolver.resolve(&function, &globals)?;
//! for diagnostic in &result.diagnostics {
//!     // Hand off to the reporting layer
//! }
//! ```

pub mod body;
pub mod diagnostic;
pub mod error;
pub mod resolver;
pub mod scope;
pub mod ty;

#[cfg(test)]
mod prop_tests;

pub use body::{Body, Component, Expr, ExprId, FunctionDecl, LambdaParam, Param};
pub use diagnostic::{DiagnosticKind, ResolveDiagnostic};
pub use error::ResolutionError;
pub use resolver::{LambdaResolver, ResolutionResult, ResolveOptions};
pub use scope::{Binding, BindingId, Resolution, ScopeHandle, ScopeId, ScopeKind, ScopeStack};
pub use ty::{ComponentTable, Ty};
