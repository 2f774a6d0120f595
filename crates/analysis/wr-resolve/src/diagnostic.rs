//! Diagnostics produced during resolution
//!
//! Diagnostics never abort resolution: a shadowing parameter still resolves
//! to the innermost binding, and an unresolved reference is simply left out
//! of the resolution table.

use std::mem;
use wr_intern::{Interner, Symbol};
use wr_span::FileSpan;

/// Kind of a [`ResolveDiagnostic`], used for severity configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// A binding hides one from an enclosing scope
    NameShadowing,
    /// A reference matched no visible binding
    UnresolvedReference,
}

impl DiagnosticKind {
    /// Stable kebab-case code
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::NameShadowing => "name-shadowing",
            Self::UnresolvedReference => "unresolved-reference",
        }
    }
}

/// A finding reported to the external diagnostic collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveDiagnostic {
    /// `name` is declared again while a binding from an enclosing scope is visible
    NameShadowing {
        /// The shadowed name
        name: Symbol,
        /// The new (inner) declaration
        shadowing: FileSpan,
        /// The nearest enclosing declaration it hides
        shadowed: FileSpan,
    },

    /// `name` is not visible at its use site
    UnresolvedReference {
        /// The name that was not found
        name: Symbol,
        /// Where the name was used
        use_site: FileSpan,
        /// Similar visible names, closest first
        suggestions: Vec<Symbol>,
    },
}

impl ResolveDiagnostic {
    /// Kind of this diagnostic
    #[must_use]
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Self::NameShadowing { .. } => DiagnosticKind::NameShadowing,
            Self::UnresolvedReference { .. } => DiagnosticKind::UnresolvedReference,
        }
    }

    /// Location the diagnostic is reported at
    #[must_use]
    pub fn primary_span(&self) -> FileSpan {
        match self {
            Self::NameShadowing { shadowing, .. } => *shadowing,
            Self::UnresolvedReference { use_site, .. } => *use_site,
        }
    }

    /// The name the diagnostic is about
    #[must_use]
    pub fn name(&self) -> Symbol {
        match self {
            Self::NameShadowing { name, .. } | Self::UnresolvedReference { name, .. } => *name,
        }
    }

    /// Human-readable message
    #[must_use]
    pub fn message(&self, interner: &Interner) -> String {
        match self {
            Self::NameShadowing { name, .. } => {
                format!("name shadowed: {}", interner.resolve(name))
            }
            Self::UnresolvedReference { name, .. } => {
                format!("unresolved reference: {}", interner.resolve(name))
            }
        }
    }

    /// "Did you mean" text for unresolved references with suggestions
    #[must_use]
    pub fn help(&self, interner: &Interner) -> Option<String> {
        match self {
            Self::UnresolvedReference { suggestions, .. } if !suggestions.is_empty() => {
                let names: Vec<&str> = suggestions
                    .iter()
                    .map(|sym| interner.resolve(sym))
                    .collect();
                Some(format!("did you mean `{}`?", names.join("`, `")))
            }
            Self::NameShadowing { .. } | Self::UnresolvedReference { .. } => None,
        }
    }

    /// Rank `available` names by edit distance to `name`
    ///
    /// Keeps names within `max_distance` edits, closest first, at most
    /// `max_suggestions` of them, without duplicates.
    pub fn compute_suggestions(
        name: Symbol,
        interner: &Interner,
        available: &[Symbol],
        max_distance: usize,
        max_suggestions: usize,
    ) -> Vec<Symbol> {
        let target = interner.resolve(&name);
        let mut ranked: Vec<(Symbol, usize)> = Vec::new();
        for &candidate in available {
            if candidate == name || ranked.iter().any(|(seen, _)| *seen == candidate) {
                continue;
            }
            let distance = levenshtein_distance(target, interner.resolve(&candidate));
            if distance <= max_distance {
                ranked.push((candidate, distance));
            }
        }

        ranked.sort_by_key(|(_, distance)| *distance);
        ranked
            .into_iter()
            .take(max_suggestions)
            .map(|(sym, _)| sym)
            .collect()
    }
}

/// Compute Levenshtein distance between two strings
fn levenshtein_distance(source: &str, target: &str) -> usize {
    let target_chars: Vec<char> = target.chars().collect();
    let mut previous: Vec<usize> = (0..=target_chars.len()).collect();
    let mut current = vec![0; target_chars.len() + 1];

    for (idx, source_char) in source.chars().enumerate() {
        current[0] = idx + 1;
        for (jdx, target_char) in target_chars.iter().enumerate() {
            let cost = usize::from(source_char != *target_char);
            current[jdx + 1] = (previous[jdx + 1] + 1)
                .min(current[jdx] + 1)
                .min(previous[jdx] + cost);
        }
        mem::swap(&mut previous, &mut current);
    }

    previous[target_chars.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("abc", "abc"), 0);
        assert_eq!(levenshtein_distance("abc", "def"), 3);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("", "four"), 4);
        assert_eq!(levenshtein_distance("naïve", "naive"), 1);
    }

    #[test]
    fn test_suggestions_closest_first() {
        let interner = Interner::new();
        let name = interner.intern("cout");
        let available = [
            interner.intern("count"),
            interner.intern("unrelated"),
            interner.intern("cout2"),
            interner.intern("count"),
            interner.intern("out"),
        ];

        let suggestions = ResolveDiagnostic::compute_suggestions(name, &interner, &available, 3, 2);
        let names: Vec<&str> = suggestions.iter().map(|sym| interner.resolve(sym)).collect();
        assert_eq!(names, vec!["count", "cout2"]);
    }

    #[test]
    fn test_help_lists_suggestions() {
        let interner = Interner::new();
        let diagnostic = ResolveDiagnostic::UnresolvedReference {
            name: interner.intern("valu"),
            use_site: FileSpan::new(wr_span::FileId(0), wr_span::Span::new(0, 4)),
            suggestions: vec![interner.intern("value"), interner.intern("val")],
        };
        assert_eq!(
            diagnostic.help(&interner).as_deref(),
            Some("did you mean `value`, `val`?")
        );
        assert_eq!(diagnostic.message(&interner), "unresolved reference: valu");
        assert_eq!(diagnostic.kind().code(), "unresolved-reference");
    }
}
