//! Vector store trait: named collections, batch insertion and similarity query.

use async_trait::async_trait;

use crate::document::{Document, SearchResult};
use crate::error::Result;

/// A handle naming a collection inside a [`VectorStore`].
///
/// Obtained from [`VectorStore::get_or_create_collection`]; cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionHandle {
    name: String,
}

impl CollectionHandle {
    /// Wrap a collection name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The collection name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for CollectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// A storage backend that embeds text internally and answers similarity queries.
///
/// Callers hand over plain text; vectors never cross this boundary. The
/// similarity metric and the tie-break rule are backend-defined.
///
/// # Example
///
/// ```rust,ignore
/// use flora_rag::{Document, InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// let docs = store.get_or_create_collection("docs").await?;
/// store.add(&docs, &[Document::new("sentence-0", "a red cat")]).await?;
/// let ranked = store.query(&docs, &["cat"], 3).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Return the named collection, creating it empty if it does not exist.
    async fn get_or_create_collection(&self, name: &str) -> Result<CollectionHandle>;

    /// Insert a batch of documents into a collection.
    ///
    /// Behavior for identifiers that already exist is backend-defined.
    async fn add(&self, collection: &CollectionHandle, documents: &[Document]) -> Result<()>;

    /// Search for the `n_results` most similar documents to each query text.
    ///
    /// Returns one ranked list per query text, in the order of `query_texts`;
    /// each list is ordered most relevant first and holds at most `n_results`
    /// entries.
    async fn query(
        &self,
        collection: &CollectionHandle,
        query_texts: &[&str],
        n_results: usize,
    ) -> Result<Vec<Vec<SearchResult>>>;

    /// Number of documents stored in a collection.
    async fn count(&self, collection: &CollectionHandle) -> Result<usize>;
}
