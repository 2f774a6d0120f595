//! JSON form of a compilation unit handed over by the parser
//!
//! Spans are `[start, end]` byte offsets into the unit's source. Every
//! expression carries a `kind` tag:
//!
//! ```json
//! { "kind": "lambda", "span": [40, 72],
//!   "params": [ { "destructure": [ { "name": "a", "span": [43, 44] } ],
//!                 "type": "Pair", "span": [42, 48] } ],
//!   "body": [ { "kind": "reference", "name": "a", "span": [52, 53] } ] }
//! ```

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use wr_intern::Interner;
use wr_resolve::{Body, Component, ComponentTable, Expr, ExprId, FunctionDecl, LambdaParam, Param, Ty};
use wr_span::{FileId, FileSpan, Span};

/// `[start, end]` byte offsets
pub type SpanInput = [u32; 2];

/// One source file worth of declarations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitInput {
    /// Path shown in diagnostics
    pub path: String,
    /// Source text, enabling snippet rendering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Destructurable types and their component types in order
    #[serde(default)]
    pub data_classes: IndexMap<String, Vec<TypeInput>>,
    /// Module-level declarations visible in every function
    #[serde(default)]
    pub globals: Vec<ParamInput>,
    /// Functions to resolve
    #[serde(default)]
    pub functions: Vec<FunctionInput>,
}

/// A type written as a name or a function type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeInput {
    /// `"Int"`
    Named(String),
    /// `{ "params": [...], "ret": ... }`
    Function {
        /// Parameter types
        params: Vec<TypeInput>,
        /// Return type
        ret: Box<TypeInput>,
    },
}

/// A named parameter or module-level declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamInput {
    /// Declared name
    pub name: String,
    /// Declared type; unknown when absent
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<TypeInput>,
    /// Location of the name
    pub span: SpanInput,
}

/// A function declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionInput {
    /// Function name
    pub name: String,
    /// Value parameters
    #[serde(default)]
    pub params: Vec<ParamInput>,
    /// Top-level statements
    #[serde(default)]
    pub body: Vec<ExprInput>,
    /// Location of the declaration
    pub span: SpanInput,
}

/// An expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExprInput {
    /// Any literal
    Literal {
        /// Source location
        span: SpanInput,
    },
    /// Use of a name
    Reference {
        /// Referenced name
        name: String,
        /// Source location
        span: SpanInput,
    },
    /// Call with arguments, trailing lambda included
    Call {
        /// Callee
        callee: Box<ExprInput>,
        /// Arguments
        #[serde(default)]
        args: Vec<ExprInput>,
        /// Source location
        span: SpanInput,
    },
    /// Local declaration
    Let {
        /// Declared name
        name: String,
        /// Declared type
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        ty: Option<TypeInput>,
        /// Initializer
        #[serde(default, skip_serializing_if = "Option::is_none")]
        initializer: Option<Box<ExprInput>>,
        /// Location of the name
        span: SpanInput,
    },
    /// Function literal
    Lambda {
        /// Parameter list
        #[serde(default)]
        params: Vec<LambdaParamInput>,
        /// Statements
        #[serde(default)]
        body: Vec<ExprInput>,
        /// Source location
        span: SpanInput,
    },
}

/// One entry of a lambda parameter list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LambdaParamInput {
    /// `(a, b)` pattern
    Destructured {
        /// Component names in order
        destructure: Vec<ComponentInput>,
        /// Type of the destructured argument
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        ty: Option<TypeInput>,
        /// Location of the whole pattern
        span: SpanInput,
    },
    /// Simple parameter
    Named(ParamInput),
}

/// One name in a destructuring pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentInput {
    /// Component name
    pub name: String,
    /// Explicit annotation
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<TypeInput>,
    /// Location of the name
    pub span: SpanInput,
}

/// A unit lowered into resolver input
#[derive(Debug, Clone)]
pub struct LoweredUnit {
    /// Component table built from `data_classes`
    pub components: ComponentTable,
    /// Module-level bindings
    pub globals: Vec<Param>,
    /// Functions in input order
    pub functions: Vec<FunctionDecl>,
}

impl UnitInput {
    /// Parse a unit from JSON text
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not describe a unit.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("invalid unit description")
    }

    /// Intern names and allocate expression arenas
    #[must_use]
    pub fn lower(&self, interner: &Interner, file: FileId) -> LoweredUnit {
        let lowering = Lowering { interner, file };

        let mut components = ComponentTable::new();
        for (owner, types) in &self.data_classes {
            components.insert(
                interner.intern(owner),
                types.iter().map(|ty| lowering.ty(ty)).collect(),
            );
        }

        LoweredUnit {
            components,
            globals: self.globals.iter().map(|param| lowering.param(param)).collect(),
            functions: self
                .functions
                .iter()
                .map(|function| lowering.function(function))
                .collect(),
        }
    }
}

struct Lowering<'a> {
    interner: &'a Interner,
    file: FileId,
}

impl Lowering<'_> {
    fn span(&self, [start, end]: SpanInput) -> FileSpan {
        FileSpan::new(self.file, Span::new(start, end))
    }

    fn ty(&self, ty: &TypeInput) -> Ty {
        match ty {
            TypeInput::Named(name) => Ty::named(self.interner, name),
            TypeInput::Function { params, ret } => Ty::Function {
                params: params.iter().map(|param| self.ty(param)).collect(),
                ret: Box::new(self.ty(ret)),
            },
        }
    }

    fn ty_or_unknown(&self, ty: Option<&TypeInput>) -> Ty {
        ty.map_or(Ty::Unknown, |ty| self.ty(ty))
    }

    fn param(&self, param: &ParamInput) -> Param {
        Param {
            name: self.interner.intern(&param.name),
            ty: self.ty_or_unknown(param.ty.as_ref()),
            span: self.span(param.span),
        }
    }

    fn function(&self, function: &FunctionInput) -> FunctionDecl {
        let mut body = Body::new();
        for stmt in &function.body {
            let id = self.expr(&mut body, stmt);
            body.statements.push(id);
        }

        FunctionDecl {
            name: self.interner.intern(&function.name),
            params: function.params.iter().map(|param| self.param(param)).collect(),
            body,
            span: self.span(function.span),
        }
    }

    /// Children are allocated before their parent
    fn expr(&self, body: &mut Body, expr: &ExprInput) -> ExprId {
        let lowered = match expr {
            ExprInput::Literal { span } => Expr::Literal {
                span: self.span(*span),
            },
            ExprInput::Reference { name, span } => Expr::Reference {
                name: self.interner.intern(name),
                span: self.span(*span),
            },
            ExprInput::Call { callee, args, span } => {
                let callee = self.expr(body, callee);
                let args = args.iter().map(|arg| self.expr(body, arg)).collect();
                Expr::Call {
                    callee,
                    args,
                    span: self.span(*span),
                }
            }
            ExprInput::Let {
                name,
                ty,
                initializer,
                span,
            } => {
                let initializer = initializer.as_deref().map(|init| self.expr(body, init));
                Expr::Let {
                    name: self.interner.intern(name),
                    ty: self.ty_or_unknown(ty.as_ref()),
                    initializer,
                    span: self.span(*span),
                }
            }
            ExprInput::Lambda {
                params,
                body: statements,
                span,
            } => {
                let statements = statements.iter().map(|stmt| self.expr(body, stmt)).collect();
                Expr::Lambda {
                    params: params.iter().map(|param| self.lambda_param(param)).collect(),
                    body: statements,
                    span: self.span(*span),
                }
            }
        };
        body.alloc(lowered)
    }

    fn lambda_param(&self, param: &LambdaParamInput) -> LambdaParam {
        match param {
            LambdaParamInput::Named(param) => {
                let Param { name, ty, span } = self.param(param);
                LambdaParam::Named { name, ty, span }
            }
            LambdaParamInput::Destructured {
                destructure,
                ty,
                span,
            } => LambdaParam::Destructured {
                ty: self.ty_or_unknown(ty.as_ref()),
                components: destructure
                    .iter()
                    .map(|component| Component {
                        name: self.interner.intern(&component.name),
                        ty: component.ty.as_ref().map(|ty| self.ty(ty)),
                        span: self.span(component.span),
                    })
                    .collect(),
                span: self.span(*span),
            },
        }
    }
}
