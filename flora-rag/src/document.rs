//! Data types for documents and search results.

use serde::{Deserialize, Serialize};

/// Prefix used when deriving document identifiers from insertion order.
pub const DOCUMENT_ID_PREFIX: &str = "sentence";

/// Derive the identifier for the document at `position` in an indexing batch.
///
/// ```
/// assert_eq!(flora_rag::document_id(0), "sentence-0");
/// ```
pub fn document_id(position: usize) -> String {
    format!("{DOCUMENT_ID_PREFIX}-{position}")
}

/// An immutable piece of text stored in a collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    /// Unique identifier within the collection.
    pub id: String,
    /// The text content of the document.
    pub text: String,
}

impl Document {
    /// Create a document from an identifier and its text.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into() }
    }
}

/// A retrieved [`Document`] paired with a relevance score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    /// The retrieved document.
    pub document: Document,
    /// The similarity score (higher is more relevant).
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_follow_insertion_position() {
        assert_eq!(document_id(0), "sentence-0");
        assert_eq!(document_id(41), "sentence-41");
    }
}
