//! Front-end driver
//!
//! Loads units and record schemas from their JSON descriptions, runs the
//! lambda resolver and the record constructor over them, and turns the
//! results into configured, renderable reports.

pub mod config;
pub mod input;
pub mod records;
pub mod report;

pub use config::{CONFIG_FILE, Config, Level};
pub use input::{LoweredUnit, UnitInput};
pub use records::{SchemaCatalog, SchemaInput, parse_element_type};
pub use report::{Related, ReportedDiagnostic, UnitReport};

use anyhow::{Context, Result};
use serde_json::{Map, Value as Json};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use wr_intern::Interner;
use wr_record::RecordInstance;
use wr_resolve::{LambdaResolver, ResolveDiagnostic};
use wr_span::FileId;

/// Runs checks and constructions under one configuration
#[derive(Debug, Clone, Default)]
pub struct Driver {
    config: Config,
    interner: Interner,
}

impl Driver {
    /// Create a driver with `config`
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            interner: Interner::new(),
        }
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Interner holding every name seen so far
    #[must_use]
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// Resolve every function of `unit` and collect configured diagnostics
    ///
    /// # Errors
    ///
    /// Returns an error only on unbalanced scope handling inside the
    /// resolver; findings in the unit itself are part of the report.
    pub fn check_unit(&self, unit: &UnitInput) -> Result<UnitReport> {
        let lowered = unit.lower(&self.interner, FileId::new(0));
        let resolver = LambdaResolver::new(&self.interner, &lowered.components)
            .with_options(self.config.resolve_options());

        let mut diagnostics = Vec::new();
        let mut resolved_references = 0;
        for function in &lowered.functions {
            let name = self.interner.resolve(&function.name);
            let result = resolver
                .resolve(function, &lowered.globals)
                .with_context(|| format!("resolving `{name}` in {}", unit.path))?;

            resolved_references += result.references.len();
            diagnostics.extend(
                result
                    .diagnostics
                    .iter()
                    .filter_map(|diagnostic| self.reported(diagnostic, name)),
            );
        }

        info!(
            path = %unit.path,
            functions = lowered.functions.len(),
            diagnostics = diagnostics.len(),
            "checked unit"
        );

        Ok(UnitReport {
            path: unit.path.clone(),
            source: unit.source.clone(),
            diagnostics,
            resolved_references,
        })
    }

    /// Read a unit from a JSON file and check it
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn check_file(&self, path: &Path) -> Result<UnitReport> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let unit = UnitInput::from_json(&text).with_context(|| format!("in {}", path.display()))?;
        self.check_unit(&unit)
    }

    /// Construct a `kind` record from JSON named arguments
    ///
    /// # Errors
    ///
    /// Returns the errors of [`SchemaCatalog::construct`].
    pub fn construct(
        &self,
        catalog: &SchemaCatalog,
        kind: &str,
        arguments: &Map<String, Json>,
    ) -> Result<Arc<RecordInstance>> {
        catalog.construct(kind, arguments, self.config.records.allow_defaults)
    }

    fn reported(&self, diagnostic: &ResolveDiagnostic, function: &str) -> Option<ReportedDiagnostic> {
        let kind = diagnostic.kind();
        let level = self.config.level_for(kind);
        if level == Level::Allow {
            debug!(code = kind.code(), "diagnostic allowed by configuration");
            return None;
        }

        let related = match diagnostic {
            ResolveDiagnostic::NameShadowing { shadowed, .. } => Some(Related {
                message: "shadowed declaration".to_owned(),
                span: shadowed.span,
            }),
            ResolveDiagnostic::UnresolvedReference { .. } => None,
        };

        Some(ReportedDiagnostic {
            code: kind.code(),
            level,
            message: diagnostic.message(&self.interner),
            function: function.to_owned(),
            span: diagnostic.primary_span().span,
            related,
            help: diagnostic.help(&self.interner),
        })
    }
}
