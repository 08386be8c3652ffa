//! Shared types for folio
//!
//! This crate provides plain data types used across the folio crates:
//! source spans and the document type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Byte range in a source text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shift both ends by `offset`, used when a nested scope is tokenized
    /// from a slice of the original source.
    pub fn offset(self, offset: usize) -> Self {
        Self::new(self.start + offset, self.end + offset)
    }

    /// Smallest span covering both
    pub fn join(self, other: Span) -> Self {
        Self::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// Kind of document being produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    /// Continuous document without page boundaries
    #[default]
    Plain,
    /// Paginated document (print, PDF)
    Paged,
    /// Presentation slides
    Slides,
}

impl DocumentType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "plain" => Some(DocumentType::Plain),
            "paged" => Some(DocumentType::Paged),
            "slides" => Some(DocumentType::Slides),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Plain => "plain",
            DocumentType::Paged => "paged",
            DocumentType::Slides => "slides",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_join_and_offset() {
        let a = Span::new(2, 5);
        let b = Span::new(4, 9);
        assert_eq!(a.join(b), Span::new(2, 9));
        assert_eq!(a.offset(10), Span::new(12, 15));
        assert_eq!(a.len(), 3);
        assert!(Span::new(3, 3).is_empty());
    }

    #[test]
    fn test_document_type_round_trip() {
        assert_eq!(DocumentType::from_str("Paged"), Some(DocumentType::Paged));
        assert_eq!(DocumentType::from_str("nope"), None);
        assert_eq!(DocumentType::Slides.as_str(), "slides");
    }
}
