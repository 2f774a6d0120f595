//! Name resolution pass over function literals

use crate::body::{Body, Expr, ExprId, FunctionDecl, LambdaParam, Param};
use crate::diagnostic::ResolveDiagnostic;
use crate::error::ResolutionError;
use crate::scope::{Binding, BindingId, ScopeStack};
use crate::ty::{ComponentTable, Ty};
use la_arena::Arena;
use rustc_hash::FxHashMap;
use tracing::debug;
use wr_intern::{Interner, Symbol};
use wr_span::FileSpan;

/// Name of the placeholder parameter that binds nothing
const PLACEHOLDER: &str = "_";

/// Result of name resolution for one function
#[derive(Debug, Clone)]
pub struct ResolutionResult {
    /// Every binding introduced during the pass
    pub bindings: Arena<Binding>,
    /// Mapping from reference expressions to the binding they resolve to
    pub references: FxHashMap<ExprId, BindingId>,
    /// Diagnostics in the order they were found
    pub diagnostics: Vec<ResolveDiagnostic>,
}

impl ResolutionResult {
    /// Binding a reference expression resolved to
    #[must_use]
    pub fn binding_of(&self, expr: ExprId) -> Option<&Binding> {
        self.references.get(&expr).map(|&id| &self.bindings[id])
    }

    /// Declared type of the binding a reference resolved to
    #[must_use]
    pub fn type_of(&self, expr: ExprId) -> Option<&Ty> {
        self.binding_of(expr).map(|binding| &binding.ty)
    }

    /// Only the shadowing diagnostics
    pub fn shadowing(&self) -> impl Iterator<Item = &ResolveDiagnostic> {
        self.diagnostics
            .iter()
            .filter(|diagnostic| matches!(diagnostic, ResolveDiagnostic::NameShadowing { .. }))
    }
}

/// Tuning knobs for unresolved-reference suggestions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Largest edit distance still offered as a suggestion
    pub max_distance: usize,
    /// Maximum number of suggestions per reference
    pub max_suggestions: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_distance: 3,
            max_suggestions: 3,
        }
    }
}

/// Resolves references inside function bodies
///
/// Each call to [`LambdaResolver::resolve`] runs an independent pass with its
/// own scope stack:
/// 1. Push module globals, then the function parameters, then the body frame
/// 2. Walk the statements, pushing one frame per function literal
pub struct LambdaResolver<'a> {
    interner: &'a Interner,
    components: &'a ComponentTable,
    options: ResolveOptions,
}

impl<'a> LambdaResolver<'a> {
    /// Create a resolver with default options
    #[must_use]
    pub fn new(interner: &'a Interner, components: &'a ComponentTable) -> Self {
        Self {
            interner,
            components,
            options: ResolveOptions::default(),
        }
    }

    /// Replace the suggestion options
    #[must_use]
    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Resolve every reference in `function`
    ///
    /// # Errors
    ///
    /// Returns a `ResolutionError` only if scope handling is unbalanced, which
    /// indicates a bug in the pass rather than in the input.
    pub fn resolve(
        &self,
        function: &FunctionDecl,
        globals: &[Param],
    ) -> Result<ResolutionResult, ResolutionError> {
        debug!(
            function = self.interner.resolve(&function.name),
            statements = function.body.statements.len(),
            "resolving function"
        );

        let mut pass = Pass {
            resolver: self,
            body: &function.body,
            stack: ScopeStack::new(),
            references: FxHashMap::default(),
        };

        let module = pass
            .stack
            .enter_module_scope(globals.iter().map(param_binding));
        let params = pass
            .stack
            .enter_scope(function.params.iter().map(param_binding));
        let block = pass.stack.enter_scope([]);

        for &stmt in &function.body.statements {
            pass.walk_expr(stmt)?;
        }

        pass.stack.exit_scope(block)?;
        pass.stack.exit_scope(params)?;
        pass.stack.exit_scope(module)?;

        let (bindings, diagnostics) = pass.stack.finish();
        Ok(ResolutionResult {
            bindings,
            references: pass.references,
            diagnostics,
        })
    }

    fn is_placeholder(&self, name: Symbol) -> bool {
        self.interner.resolve(&name) == PLACEHOLDER
    }

    /// Bindings introduced by a literal's parameter list, in declaration order
    fn lambda_bindings(&self, params: &[LambdaParam]) -> Vec<Binding> {
        let mut bindings = Vec::new();

        for param in params {
            match param {
                LambdaParam::Named { name, ty, span } => {
                    if !self.is_placeholder(*name) {
                        bindings.push(Binding::new(*name, ty.clone(), *span));
                    }
                }
                LambdaParam::Destructured { ty, components, .. } => {
                    for (index, component) in components.iter().enumerate() {
                        if self.is_placeholder(component.name) {
                            continue;
                        }
                        let component_ty = component
                            .ty
                            .clone()
                            .or_else(|| self.components.component(ty, index).cloned())
                            .unwrap_or(Ty::Unknown);
                        bindings.push(Binding::new(component.name, component_ty, component.span));
                    }
                }
            }
        }

        bindings
    }
}

fn param_binding(param: &Param) -> Binding {
    Binding::new(param.name, param.ty.clone(), param.span)
}

/// State of a single resolution pass
struct Pass<'r, 'a> {
    resolver: &'r LambdaResolver<'a>,
    body: &'r Body,
    stack: ScopeStack,
    references: FxHashMap<ExprId, BindingId>,
}

impl Pass<'_, '_> {
    fn walk_expr(&mut self, expr_id: ExprId) -> Result<(), ResolutionError> {
        let body = self.body;

        match &body.exprs[expr_id] {
            Expr::Literal { .. } => {}

            Expr::Reference { name, span } => self.resolve_reference(expr_id, *name, *span),

            Expr::Call { callee, args, .. } => {
                self.walk_expr(*callee)?;
                for &arg in args {
                    self.walk_expr(arg)?;
                }
            }

            Expr::Let {
                name,
                ty,
                initializer,
                span,
            } => {
                // The initializer cannot see the name it initializes
                if let Some(init) = initializer {
                    self.walk_expr(*init)?;
                }
                self.stack.declare(Binding::new(*name, ty.clone(), *span))?;
            }

            Expr::Lambda {
                params,
                body: statements,
                ..
            } => {
                let bindings = self.resolver.lambda_bindings(params);
                let handle = self.stack.enter_scope(bindings);
                // Locals of the literal live one frame above its parameters
                let block = self.stack.enter_scope([]);
                for &stmt in statements {
                    self.walk_expr(stmt)?;
                }
                self.stack.exit_scope(block)?;
                self.stack.exit_scope(handle)?;
            }
        }

        Ok(())
    }

    fn resolve_reference(&mut self, expr_id: ExprId, name: Symbol, span: FileSpan) {
        if let Some(binding) = self.stack.resolve(name).binding() {
            self.references.insert(expr_id, binding);
            return;
        }

        let options = self.resolver.options;
        let suggestions = ResolveDiagnostic::compute_suggestions(
            name,
            self.resolver.interner,
            &self.stack.visible_names(),
            options.max_distance,
            options.max_suggestions,
        );
        self.stack.report(ResolveDiagnostic::UnresolvedReference {
            name,
            use_site: span,
            suggestions,
        });
    }
}
