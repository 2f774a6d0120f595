//! Declaration tree handed over by the parser

use crate::ty::Ty;
use la_arena::{Arena, Idx};
use wr_intern::Symbol;
use wr_span::FileSpan;

/// Expression ID in a function body
pub type ExprId = Idx<Expr>;

/// Expressions relevant to name resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A literal; binds and references nothing
    Literal {
        /// Source location
        span: FileSpan,
    },
    /// A use of a name
    Reference {
        /// Referenced name
        name: Symbol,
        /// Source location
        span: FileSpan,
    },
    /// A call `callee(args)`; a trailing lambda is just the last argument
    Call {
        /// Callee expression
        callee: ExprId,
        /// Arguments in source order
        args: Vec<ExprId>,
        /// Source location
        span: FileSpan,
    },
    /// A local declaration `val name: ty = initializer`
    Let {
        /// Declared name
        name: Symbol,
        /// Declared type
        ty: Ty,
        /// Initializer, resolved before the name becomes visible
        initializer: Option<ExprId>,
        /// Location of the name
        span: FileSpan,
    },
    /// A function literal `{ params -> body }`
    Lambda {
        /// Parameter list
        params: Vec<LambdaParam>,
        /// Statements of the literal body
        body: Vec<ExprId>,
        /// Source location
        span: FileSpan,
    },
}

/// One entry of a lambda parameter list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LambdaParam {
    /// `name` or `name: Ty`
    Named {
        /// Parameter name
        name: Symbol,
        /// Declared (or expected) parameter type
        ty: Ty,
        /// Location of the name
        span: FileSpan,
    },
    /// `(a, b)` destructuring of a single argument
    Destructured {
        /// Type of the destructured argument
        ty: Ty,
        /// Components in declaration order
        components: Vec<Component>,
        /// Location of the whole pattern
        span: FileSpan,
    },
}

/// One name inside a destructuring pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// Component name; `_` binds nothing
    pub name: Symbol,
    /// Explicit annotation, if written
    pub ty: Option<Ty>,
    /// Location of the name
    pub span: FileSpan,
}

/// A named, typed parameter of a function or a module-level declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Parameter name
    pub name: Symbol,
    /// Declared type
    pub ty: Ty,
    /// Location of the name
    pub span: FileSpan,
}

/// Expression storage of one function
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Body {
    /// All expressions of the body
    pub exprs: Arena<Expr>,
    /// Top-level statements in order
    pub statements: Vec<ExprId>,
}

impl Body {
    /// Create an empty body
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an expression without making it a statement
    pub fn alloc(&mut self, expr: Expr) -> ExprId {
        self.exprs.alloc(expr)
    }

    /// Allocate an expression and append it as a top-level statement
    pub fn push_statement(&mut self, expr: Expr) -> ExprId {
        let id = self.exprs.alloc(expr);
        self.statements.push(id);
        id
    }
}

/// A function declaration whose body contains the literals to resolve
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    /// Function name
    pub name: Symbol,
    /// Value parameters
    pub params: Vec<Param>,
    /// Function body
    pub body: Body,
    /// Source location of the declaration
    pub span: FileSpan,
}
