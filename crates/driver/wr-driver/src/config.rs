//! `wren.toml` configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use wr_resolve::{DiagnosticKind, ResolveOptions};

/// File name looked up next to the input when no path is given
pub const CONFIG_FILE: &str = "wren.toml";

/// Severity assigned to a diagnostic kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Not reported at all
    Allow,
    /// Informational message
    Info,
    /// Warning that should be addressed
    Warning,
    /// Error that fails the check
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Allow => "allow",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// Whole configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Resolver diagnostics
    pub diagnostics: DiagnosticsConfig,
    /// Record construction
    pub records: RecordsConfig,
}

/// `[diagnostics]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct DiagnosticsConfig {
    /// Level of `name-shadowing`
    pub name_shadowing: Level,
    /// Level of `unresolved-reference`
    pub unresolved_reference: Level,
    /// Maximum number of "did you mean" suggestions
    pub max_suggestions: usize,
    /// Maximum edit distance of a suggestion
    pub max_distance: usize,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        let options = ResolveOptions::default();
        Self {
            name_shadowing: Level::Warning,
            unresolved_reference: Level::Error,
            max_suggestions: options.max_suggestions,
            max_distance: options.max_distance,
        }
    }
}

/// `[records]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct RecordsConfig {
    /// Substitute declared defaults for absent or null arguments
    pub allow_defaults: bool,
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            allow_defaults: true,
        }
    }
}

impl Config {
    /// Parse configuration text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or has unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid configuration")
    }

    /// Load configuration from `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Load `wren.toml` from `dir` if it exists, otherwise use the defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn discover(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if path.is_file() {
            tracing::debug!(path = %path.display(), "loading configuration");
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Configured level for `kind`
    #[must_use]
    pub fn level_for(&self, kind: DiagnosticKind) -> Level {
        match kind {
            DiagnosticKind::NameShadowing => self.diagnostics.name_shadowing,
            DiagnosticKind::UnresolvedReference => self.diagnostics.unresolved_reference,
        }
    }

    /// Suggestion limits for the resolver
    #[must_use]
    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            max_distance: self.diagnostics.max_distance,
            max_suggestions: self.diagnostics.max_suggestions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.level_for(DiagnosticKind::NameShadowing), Level::Warning);
        assert_eq!(
            config.level_for(DiagnosticKind::UnresolvedReference),
            Level::Error
        );
        assert_eq!(config.diagnostics.max_suggestions, 3);
        assert!(config.records.allow_defaults);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [diagnostics]
            name-shadowing = "error"
            "#,
        )
        .unwrap();

        assert_eq!(config.diagnostics.name_shadowing, Level::Error);
        assert_eq!(config.diagnostics.unresolved_reference, Level::Error);
        assert_eq!(config.diagnostics.max_distance, 3);
        assert!(config.records.allow_defaults);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(Config::from_toml_str("[diagnostics]\nshadowing = \"allow\"\n").is_err());
        assert!(Config::from_toml_str("[diagnostics]\nname-shadowing = \"loud\"\n").is_err());
    }

    #[test]
    fn test_load_and_discover() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::discover(dir.path()).unwrap(), Config::default());

        let mut file = fs::File::create(dir.path().join(CONFIG_FILE)).unwrap();
        writeln!(
            file,
            "[diagnostics]\nname-shadowing = \"allow\"\nmax-suggestions = 1\n\n[records]\nallow-defaults = false"
        )
        .unwrap();

        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.diagnostics.name_shadowing, Level::Allow);
        assert_eq!(config.resolve_options().max_suggestions, 1);
        assert!(!config.records.allow_defaults);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let error = Config::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(error.to_string().starts_with("failed to read"));
    }
}
