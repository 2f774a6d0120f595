//! Integration test utilities for the Wren front-end

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wr_driver::{Config, Driver, LoweredUnit, SchemaCatalog, UnitInput};
use wr_intern::Interner;
use wr_resolve::{Expr, FunctionDecl, LambdaResolver, ResolutionResult};
use wr_span::FileId;

/// Directory holding the JSON fixtures
#[must_use]
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Load a unit fixture by file name
///
/// # Errors
///
/// Returns an error if the fixture is missing or malformed
pub fn load_unit(name: &str) -> Result<UnitInput> {
    let path = fixtures_dir().join(name);
    let text = fs::read_to_string(&path).with_context(|| format!("fixture {}", path.display()))?;
    UnitInput::from_json(&text)
}

/// Load a schema fixture by path relative to the fixtures directory
///
/// # Errors
///
/// Returns an error if the fixture is missing or malformed
pub fn load_catalog(name: &str) -> Result<SchemaCatalog> {
    let path = fixtures_dir().join(name);
    let text = fs::read_to_string(&path).with_context(|| format!("fixture {}", path.display()))?;
    SchemaCatalog::from_json(&text)
}

/// A unit resolved directly through the resolver, keeping its tables
pub struct ResolvedUnit {
    /// Interner used for the unit's names
    pub interner: Interner,
    /// Lowered declarations
    pub lowered: LoweredUnit,
    /// One result per function, in declaration order
    pub results: Vec<ResolutionResult>,
}

impl ResolvedUnit {
    /// Lower and resolve every function of `unit`
    ///
    /// # Errors
    ///
    /// Returns an error if resolution reports unbalanced scopes
    pub fn resolve(unit: &UnitInput) -> Result<Self> {
        let interner = Interner::new();
        let lowered = unit.lower(&interner, FileId::new(0));
        let resolver = LambdaResolver::new(&interner, &lowered.components);

        let mut results = Vec::with_capacity(lowered.functions.len());
        for function in &lowered.functions {
            results.push(resolver.resolve(function, &lowered.globals)?);
        }

        Ok(Self {
            interner,
            lowered,
            results,
        })
    }

    /// Function called `name` and its resolution
    #[must_use]
    pub fn function(&self, name: &str) -> Option<(&FunctionDecl, &ResolutionResult)> {
        self.lowered
            .functions
            .iter()
            .zip(&self.results)
            .find(|(function, _)| self.interner.resolve(&function.name) == name)
    }

    /// `(name, start offset, declared type)` of every resolved reference in
    /// `function`, ordered by offset
    #[must_use]
    pub fn reference_types(&self, function: &str) -> Vec<(String, u32, String)> {
        let Some((decl, result)) = self.function(function) else {
            return Vec::new();
        };

        let mut types: Vec<_> = decl
            .body
            .exprs
            .iter()
            .filter_map(|(id, expr)| match expr {
                Expr::Reference { name, span } => result.type_of(id).map(|ty| {
                    (
                        self.interner.resolve(name).to_owned(),
                        span.span.start,
                        ty.display(&self.interner).to_string(),
                    )
                }),
                _ => None,
            })
            .collect();
        types.sort_by_key(|(_, start, _)| *start);
        types
    }
}

/// Scratch directory with an optional `wren.toml`
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create an empty workspace
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    /// Root of the workspace
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` to `name` inside the workspace
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn write(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(name);
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Driver configured from the workspace's `wren.toml`, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be parsed
    pub fn driver(&self) -> Result<Driver> {
        Ok(Driver::new(Config::discover(self.dir.path())?))
    }
}
