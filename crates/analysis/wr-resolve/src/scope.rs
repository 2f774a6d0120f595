//! Scope stack for name resolution
//!
//! Frames are pushed when a parameter list is entered and popped when the
//! literal ends. Shadowing is checked once, at the moment a binding is
//! introduced, against whatever binding is visible from the enclosing frames.

use crate::diagnostic::ResolveDiagnostic;
use crate::error::ResolutionError;
use crate::ty::Ty;
use la_arena::{Arena, Idx};
use std::fmt;
use std::mem;
use tracing::{debug, trace};
use wr_intern::Symbol;
use wr_span::FileSpan;

/// Binding ID in the pass's binding arena
pub type BindingId = Idx<Binding>;

/// A parameter, destructuring component or local declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Bound name
    pub name: Symbol,
    /// Declared type
    pub ty: Ty,
    /// Where it was declared
    pub span: FileSpan,
}

impl Binding {
    /// Create a binding
    #[must_use]
    pub fn new(name: Symbol, ty: Ty, span: FileSpan) -> Self {
        Self { name, ty, span }
    }
}

/// Unique identifier for a scope frame
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub struct ScopeId(pub u32);

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope#{}", self.0)
    }
}

/// Kind of scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Top-level declarations; visible, but never reported as shadowed
    Module,
    /// Function parameters, literal parameters and local blocks
    Local,
}

/// Proof of entry returned by [`ScopeStack::enter_scope`]
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
#[must_use = "a scope handle must be passed back to exit_scope"]
pub struct ScopeHandle {
    id: ScopeId,
    depth: usize,
}

impl ScopeHandle {
    /// Scope this handle closes
    pub fn id(self) -> ScopeId {
        self.id
    }

    /// Zero-based stack depth of the frame
    pub fn depth(self) -> usize {
        self.depth
    }
}

/// Outcome of looking a name up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The nearest visible binding
    Found(BindingId),
    /// No open frame binds the name
    Unresolved,
}

impl Resolution {
    /// The binding, if found
    #[must_use]
    pub fn binding(self) -> Option<BindingId> {
        match self {
            Self::Found(id) => Some(id),
            Self::Unresolved => None,
        }
    }
}

/// A single open frame
#[derive(Debug, Clone)]
struct Frame {
    id: ScopeId,
    kind: ScopeKind,
    /// Bindings in declaration order
    bindings: Vec<BindingId>,
}

impl Frame {
    /// Latest binding of `name` in this frame
    fn find(&self, name: Symbol, arena: &Arena<Binding>) -> Option<BindingId> {
        self.bindings
            .iter()
            .rev()
            .copied()
            .find(|&id| arena[id].name == name)
    }
}

/// Stack of lexical scopes owned by one resolution pass
///
/// Bindings stay in the arena after their frame is popped so resolution
/// tables can keep pointing at them; they are no longer visible to
/// [`ScopeStack::resolve`].
#[derive(Debug, Default)]
pub struct ScopeStack {
    bindings: Arena<Binding>,
    frames: Vec<Frame>,
    next_scope: u32,
    diagnostics: Vec<ResolveDiagnostic>,
}

impl ScopeStack {
    /// Create an empty stack
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a frame holding `bindings` in declaration order
    ///
    /// Each binding whose name is visible from an enclosing frame yields a
    /// [`ResolveDiagnostic::NameShadowing`] against that nearest binding.
    /// Bindings of the new frame are not checked against each other.
    pub fn enter_scope(&mut self, bindings: impl IntoIterator<Item = Binding>) -> ScopeHandle {
        self.push_frame(ScopeKind::Local, bindings)
    }

    /// Push a module-level frame whose bindings are never reported as shadowed
    pub fn enter_module_scope(
        &mut self,
        bindings: impl IntoIterator<Item = Binding>,
    ) -> ScopeHandle {
        self.push_frame(ScopeKind::Module, bindings)
    }

    fn push_frame(
        &mut self,
        kind: ScopeKind,
        bindings: impl IntoIterator<Item = Binding>,
    ) -> ScopeHandle {
        let enclosing = self.frames.len();
        let mut ids = Vec::new();
        for binding in bindings {
            self.check_shadowing(&binding, enclosing);
            ids.push(self.bindings.alloc(binding));
        }

        let id = ScopeId(self.next_scope);
        self.next_scope += 1;
        trace!(scope = id.0, depth = enclosing, bindings = ids.len(), "enter scope");

        self.frames.push(Frame {
            id,
            kind,
            bindings: ids,
        });

        ScopeHandle {
            id,
            depth: enclosing,
        }
    }

    /// Add a local declaration to the innermost frame
    ///
    /// # Errors
    ///
    /// Returns `ResolutionError::NoOpenScope` if no frame is open.
    pub fn declare(&mut self, binding: Binding) -> Result<BindingId, ResolutionError> {
        let Some(top) = self.frames.len().checked_sub(1) else {
            return Err(ResolutionError::NoOpenScope { span: binding.span });
        };

        self.check_shadowing(&binding, top);
        let id = self.bindings.alloc(binding);
        self.frames[top].bindings.push(id);
        Ok(id)
    }

    /// Pop the innermost frame
    ///
    /// # Errors
    ///
    /// Returns `ResolutionError::ScopeMismatch` if `handle` does not name the
    /// innermost frame; the stack is left untouched in that case.
    pub fn exit_scope(&mut self, handle: ScopeHandle) -> Result<(), ResolutionError> {
        match self.frames.last() {
            Some(frame) if frame.id == handle.id => {
                self.frames.pop();
                trace!(scope = handle.id.0, "exit scope");
                Ok(())
            }
            top => Err(ResolutionError::ScopeMismatch {
                expected: handle.id,
                top: top.map(|frame| frame.id),
            }),
        }
    }

    /// Resolve `name` against all open frames, innermost first
    #[must_use]
    pub fn resolve(&self, name: Symbol) -> Resolution {
        self.lookup(name, self.frames.len())
            .map_or(Resolution::Unresolved, |(id, _)| Resolution::Found(id))
    }

    /// Look `name` up in the outermost `visible` frames
    fn lookup(&self, name: Symbol, visible: usize) -> Option<(BindingId, ScopeKind)> {
        self.frames[..visible]
            .iter()
            .rev()
            .find_map(|frame| frame.find(name, &self.bindings).map(|id| (id, frame.kind)))
    }

    fn check_shadowing(&mut self, binding: &Binding, enclosing: usize) {
        let Some((shadowed, ScopeKind::Local)) = self.lookup(binding.name, enclosing) else {
            return;
        };

        let shadowed = self.bindings[shadowed].span;
        debug!(shadowing = %binding.span, shadowed = %shadowed, "name shadowing");
        self.diagnostics.push(ResolveDiagnostic::NameShadowing {
            name: binding.name,
            shadowing: binding.span,
            shadowed,
        });
    }

    /// Get a binding by ID, including bindings of popped frames
    #[must_use]
    pub fn binding(&self, id: BindingId) -> &Binding {
        &self.bindings[id]
    }

    /// Names visible from the innermost frame, innermost first
    #[must_use]
    pub fn visible_names(&self) -> Vec<Symbol> {
        self.frames
            .iter()
            .rev()
            .flat_map(|frame| frame.bindings.iter().rev())
            .map(|&id| self.bindings[id].name)
            .collect()
    }

    /// Number of open frames
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Record a diagnostic found by the caller during this pass
    pub fn report(&mut self, diagnostic: ResolveDiagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Diagnostics collected so far
    #[must_use]
    pub fn diagnostics(&self) -> &[ResolveDiagnostic] {
        &self.diagnostics
    }

    /// Take the diagnostics collected so far
    pub fn take_diagnostics(&mut self) -> Vec<ResolveDiagnostic> {
        mem::take(&mut self.diagnostics)
    }

    /// Consume the stack, keeping the binding arena and the diagnostics
    #[must_use]
    pub fn finish(self) -> (Arena<Binding>, Vec<ResolveDiagnostic>) {
        (self.bindings, self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wr_intern::Interner;
    use wr_span::{FileId, Span};

    fn at(offset: u32) -> FileSpan {
        FileSpan::new(FileId(0), Span::new(offset, offset + 1))
    }

    fn binding(interner: &Interner, name: &str, ty: &str, offset: u32) -> Binding {
        Binding::new(interner.intern(name), Ty::named(interner, ty), at(offset))
    }

    #[test]
    fn test_resolve_innermost() {
        let interner = Interner::new();
        let mut stack = ScopeStack::new();
        let _outer = stack.enter_scope([binding(&interner, "a", "Double", 0)]);
        let _inner = stack.enter_scope([binding(&interner, "a", "Int", 10)]);

        let found = stack.resolve(interner.intern("a")).binding().unwrap();
        assert_eq!(stack.binding(found).span, at(10));
        assert_eq!(stack.binding(found).ty, Ty::named(&interner, "Int"));
    }

    #[test]
    fn test_shadowing_reports_nearest_enclosing() {
        let interner = Interner::new();
        let mut stack = ScopeStack::new();
        let _first = stack.enter_scope([binding(&interner, "x", "Int", 0)]);
        let _second = stack.enter_scope([binding(&interner, "x", "Int", 5)]);
        let _third = stack.enter_scope([binding(&interner, "x", "Int", 9)]);

        assert_eq!(
            stack.diagnostics(),
            &[
                ResolveDiagnostic::NameShadowing {
                    name: interner.intern("x"),
                    shadowing: at(5),
                    shadowed: at(0),
                },
                ResolveDiagnostic::NameShadowing {
                    name: interner.intern("x"),
                    shadowing: at(9),
                    shadowed: at(5),
                },
            ]
        );
    }

    #[test]
    fn test_same_frame_never_shadows() {
        let interner = Interner::new();
        let mut stack = ScopeStack::new();
        let _frame = stack.enter_scope([
            binding(&interner, "a", "Int", 0),
            binding(&interner, "a", "String", 3),
        ]);

        assert!(stack.diagnostics().is_empty());
        let found = stack.resolve(interner.intern("a")).binding().unwrap();
        assert_eq!(stack.binding(found).span, at(3));
    }

    #[test]
    fn test_exit_restores_shadowed_binding() {
        let interner = Interner::new();
        let mut stack = ScopeStack::new();
        let _outer = stack.enter_scope([binding(&interner, "a", "Double", 0)]);
        let inner = stack.enter_scope([
            binding(&interner, "a", "Int", 10),
            binding(&interner, "c", "String", 12),
        ]);
        stack.exit_scope(inner).unwrap();

        let found = stack.resolve(interner.intern("a")).binding().unwrap();
        assert_eq!(stack.binding(found).span, at(0));
        assert_eq!(stack.resolve(interner.intern("c")), Resolution::Unresolved);
    }

    #[test]
    fn test_out_of_order_exit_is_rejected() {
        let interner = Interner::new();
        let mut stack = ScopeStack::new();
        let outer = stack.enter_scope([binding(&interner, "a", "Int", 0)]);
        let inner = stack.enter_scope([]);

        let error = stack.exit_scope(outer).unwrap_err();
        assert_eq!(
            error,
            ResolutionError::ScopeMismatch {
                expected: outer.id(),
                top: Some(inner.id()),
            }
        );
        assert_eq!(stack.depth(), 2);

        stack.exit_scope(inner).unwrap();
        stack.exit_scope(outer).unwrap();
        assert_eq!(
            stack.exit_scope(outer),
            Err(ResolutionError::ScopeMismatch {
                expected: outer.id(),
                top: None,
            })
        );
    }

    #[test]
    fn test_module_bindings_are_not_shadowed() {
        let interner = Interner::new();
        let mut stack = ScopeStack::new();
        let _module = stack.enter_module_scope([binding(&interner, "foo", "Unit", 0)]);
        let _local = stack.enter_scope([binding(&interner, "foo", "Int", 4)]);

        assert!(stack.diagnostics().is_empty());
        let found = stack.resolve(interner.intern("foo")).binding().unwrap();
        assert_eq!(stack.binding(found).span, at(4));
    }

    #[test]
    fn test_declare_checks_enclosing_frames_only() {
        let interner = Interner::new();
        let mut stack = ScopeStack::new();
        let _params = stack.enter_scope([binding(&interner, "a", "Double", 0)]);
        let _block = stack.enter_scope([]);

        stack.declare(binding(&interner, "b", "Short", 6)).unwrap();
        stack.declare(binding(&interner, "b", "Short", 8)).unwrap();
        assert!(stack.diagnostics().is_empty());

        stack.declare(binding(&interner, "a", "Int", 12)).unwrap();
        assert_eq!(stack.diagnostics().len(), 1);
    }

    #[test]
    fn test_declare_without_scope_fails() {
        let interner = Interner::new();
        let mut stack = ScopeStack::new();
        assert_eq!(
            stack.declare(binding(&interner, "a", "Int", 1)),
            Err(ResolutionError::NoOpenScope { span: at(1) })
        );
    }

    #[test]
    fn test_bindings_outlive_their_frame() {
        let interner = Interner::new();
        let mut stack = ScopeStack::new();
        let frame = stack.enter_scope([binding(&interner, "a", "Int", 0)]);
        let id = stack.resolve(interner.intern("a")).binding().unwrap();
        stack.exit_scope(frame).unwrap();

        assert_eq!(stack.binding(id).name, interner.intern("a"));
        let (arena, diagnostics) = stack.finish();
        assert_eq!(arena.len(), 1);
        assert!(diagnostics.is_empty());
    }
}
