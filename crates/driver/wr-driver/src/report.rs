//! Diagnostic reports and their renderings

use crate::config::Level;
use anyhow::Result;
use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};
use codespan_reporting::files::SimpleFile;
use codespan_reporting::term;
use serde::Serialize;
use wr_span::Span;

/// A secondary location attached to a diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Related {
    /// What the location is
    pub message: String,
    /// Byte range in the unit
    pub span: Span,
}

/// One diagnostic with its configured level
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportedDiagnostic {
    /// Stable kebab-case code
    pub code: &'static str,
    /// Configured level, never `allow`
    pub level: Level,
    /// Human-readable message
    pub message: String,
    /// Enclosing function
    pub function: String,
    /// Byte range in the unit
    pub span: Span,
    /// Shadowed declaration for shadowing diagnostics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related: Option<Related>,
    /// Suggestion text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

/// Result of checking one unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitReport {
    /// Unit path
    pub path: String,
    /// Source text, when the unit carried it
    #[serde(skip)]
    pub source: Option<String>,
    /// Reported diagnostics in resolution order
    pub diagnostics: Vec<ReportedDiagnostic>,
    /// Number of references bound to a declaration
    pub resolved_references: usize,
}

impl UnitReport {
    /// Number of diagnostics at `level`
    #[must_use]
    pub fn count(&self, level: Level) -> usize {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.level == level)
            .count()
    }

    /// Whether any diagnostic is an error
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.count(Level::Error) > 0
    }

    /// Diagnostics with `code`
    pub fn with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a ReportedDiagnostic> {
        self.diagnostics
            .iter()
            .filter(move |diagnostic| diagnostic.code == code)
    }

    /// Uncolored text rendering with byte ranges instead of snippets
    #[must_use]
    pub fn render_plain(&self) -> String {
        let mut lines = Vec::new();
        for diagnostic in &self.diagnostics {
            lines.push(format!(
                "{}[{}]: {}",
                diagnostic.level, diagnostic.code, diagnostic.message
            ));
            lines.push(format!(
                "  --> {}:{} in {}",
                self.path, diagnostic.span, diagnostic.function
            ));
            if let Some(related) = &diagnostic.related {
                lines.push(format!("  = note: {} at {}", related.message, related.span));
            }
            if let Some(help) = &diagnostic.help {
                lines.push(format!("  = help: {help}"));
            }
        }

        lines.iter().map(|line| format!("{line}\n")).collect()
    }

    /// Source snippet rendering, `None` when the unit has no source text
    ///
    /// # Errors
    ///
    /// Returns an error if a span lies outside the source.
    pub fn render_snippets(&self) -> Result<Option<String>> {
        let Some(source) = &self.source else {
            return Ok(None);
        };

        let file = SimpleFile::new(self.path.as_str(), source.as_str());
        let config = term::Config::default();
        let mut buffer = Vec::new();

        for diagnostic in &self.diagnostics {
            let codespan = to_codespan(diagnostic);
            #[allow(deprecated, reason = "io::Write sink keeps the output uncolored")]
            term::emit(&mut buffer, &config, &file, &codespan)?;
        }

        Ok(Some(String::from_utf8_lossy(&buffer).into_owned()))
    }

    /// Pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn to_codespan(diagnostic: &ReportedDiagnostic) -> Diagnostic<()> {
    let severity = match diagnostic.level {
        Level::Error => Severity::Error,
        Level::Warning => Severity::Warning,
        Level::Info | Level::Allow => Severity::Note,
    };

    let mut labels = vec![Label::primary((), diagnostic.span.range())];
    if let Some(related) = &diagnostic.related {
        labels.push(Label::secondary((), related.span.range()).with_message(related.message.clone()));
    }

    Diagnostic::new(severity)
        .with_message(diagnostic.message.clone())
        .with_code(diagnostic.code)
        .with_labels(labels)
        .with_notes(diagnostic.help.iter().map(|help| format!("help: {help}")).collect())
}
