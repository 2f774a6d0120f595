//! Declared types as seen by the resolver
//!
//! The resolver never infers types. It only carries the declared type of each
//! binding so the external type checker can read it back from the resolution
//! table.

use rustc_hash::FxHashMap;
use std::fmt;
use wr_intern::{Interner, Symbol};

/// Declared type of a binding
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ty {
    /// A nominal type such as `Int` or a data class
    Named(Symbol),
    /// A function type `(params) -> ret`
    Function {
        /// Parameter types
        params: Vec<Self>,
        /// Return type
        ret: Box<Self>,
    },
    /// Not known to the front-end (no annotation and no component information)
    Unknown,
}

impl Ty {
    /// Nominal type by name
    pub fn named(interner: &Interner, name: &str) -> Self {
        Self::Named(interner.intern(name))
    }

    /// Render the type using `interner` for names
    #[must_use]
    pub fn display<'a>(&'a self, interner: &'a Interner) -> TyDisplay<'a> {
        TyDisplay { ty: self, interner }
    }
}

/// Display adapter returned by [`Ty::display`]
pub struct TyDisplay<'a> {
    ty: &'a Ty,
    interner: &'a Interner,
}

impl fmt::Display for TyDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ty {
            Ty::Named(name) => f.write_str(self.interner.resolve(name)),
            Ty::Function { params, ret } => {
                write!(f, "(")?;
                for (idx, param) in params.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", param.display(self.interner))?;
                }
                write!(f, ") -> {}", ret.display(self.interner))
            }
            Ty::Unknown => f.write_str("{unknown}"),
        }
    }
}

/// Component types of destructurable types, keyed by type name
///
/// Supplied by the external symbol table: a data class `A(val x: Int, val y: String)`
/// contributes `A -> [Int, String]`.
#[derive(Debug, Clone, Default)]
pub struct ComponentTable {
    components: FxHashMap<Symbol, Vec<Ty>>,
}

impl ComponentTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the ordered component types of `owner`
    pub fn insert(&mut self, owner: Symbol, components: Vec<Ty>) {
        self.components.insert(owner, components);
    }

    /// All component types of `ty`, if it is destructurable
    #[must_use]
    pub fn components_of(&self, ty: &Ty) -> Option<&[Ty]> {
        match ty {
            Ty::Named(owner) => self.components.get(owner).map(Vec::as_slice),
            Ty::Function { .. } | Ty::Unknown => None,
        }
    }

    /// The zero-based `index`-th component type of `ty`
    #[must_use]
    pub fn component(&self, ty: &Ty, index: usize) -> Option<&Ty> {
        self.components_of(ty)?.get(index)
    }
}
