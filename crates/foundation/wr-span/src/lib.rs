//! Source file spans and locations
//!
//! Every binding and diagnostic in the front-end core carries a [`FileSpan`]:
//! a byte range inside a file registered by the external parser.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A unique identifier for a source file
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[display("file#{_0}")]
pub struct FileId(pub u32);

impl FileId {
    /// Create a file id from its raw index
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// A byte offset span in a source file
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[display("{start}..{end}")]
pub struct Span {
    /// Inclusive start offset
    pub start: u32,
    /// Exclusive end offset
    pub end: u32,
}

impl Span {
    /// Create a span covering `start..end`
    #[must_use]
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Byte range usable for slicing the source text
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }

    /// Length of the span in bytes
    #[must_use]
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Whether the span covers no bytes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// A span with associated file
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[display("{file}@{span}")]
pub struct FileSpan {
    /// File the span points into
    pub file: FileId,
    /// Byte range inside the file
    pub span: Span,
}

impl FileSpan {
    /// Create a span inside `file`
    #[must_use]
    pub fn new(file: FileId, span: Span) -> Self {
        Self { file, span }
    }

    /// Byte range usable for slicing the source text
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.span.range()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let span = FileSpan::new(FileId::new(2), Span::new(4, 9));
        assert_eq!(span.to_string(), "file#2@4..9");
    }

    #[test]
    fn test_len_of_inverted_span_is_zero() {
        let span = Span::new(10, 4);
        assert_eq!(span.len(), 0);
        assert!(span.is_empty());
    }

    #[test]
    fn test_serde_shape() {
        let span = FileSpan::new(FileId(0), Span::new(1, 3));
        let json = serde_json::to_string(&span).unwrap();
        assert_eq!(json, r#"{"file":0,"span":{"start":1,"end":3}}"#);
    }
}
