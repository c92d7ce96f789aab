//! In-memory vector store using cosine similarity.
//!
//! [`InMemoryVectorStore`] keeps collections in a `HashMap` protected by a
//! `tokio::sync::RwLock` and embeds text with an injected
//! [`EmbeddingProvider`]. Nothing is persisted; dropping the store drops
//! every collection.
//!
//! Ranking is by descending cosine similarity. Equal scores keep insertion
//! order, so the earlier-inserted document ranks first. Adding a document
//! whose id already exists replaces its text in place.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::document::{Document, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::hashing::HashingEmbeddingProvider;
use crate::vectorstore::{CollectionHandle, VectorStore};

const BACKEND: &str = "InMemory";

#[derive(Debug, Clone)]
struct StoredDocument {
    document: Document,
    embedding: Vec<f32>,
}

/// Documents in insertion order plus an id index for upserts.
#[derive(Debug, Default)]
struct Collection {
    documents: Vec<StoredDocument>,
    positions: HashMap<String, usize>,
}

impl Collection {
    fn upsert(&mut self, stored: StoredDocument) {
        match self.positions.get(&stored.document.id) {
            Some(&position) => self.documents[position] = stored,
            None => {
                self.positions.insert(stored.document.id.clone(), self.documents.len());
                self.documents.push(stored);
            }
        }
    }
}

/// An in-memory vector store.
///
/// # Example
///
/// ```rust,ignore
/// use flora_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// let collection = store.get_or_create_collection("docs").await?;
/// ```
pub struct InMemoryVectorStore {
    embedder: Arc<dyn EmbeddingProvider>,
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryVectorStore {
    /// Create an empty store using the default [`HashingEmbeddingProvider`].
    pub fn new() -> Self {
        Self::with_embedding_provider(Arc::new(HashingEmbeddingProvider::default()))
    }

    /// Create an empty store that embeds text with `embedder`.
    pub fn with_embedding_provider(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { embedder, collections: RwLock::new(HashMap::new()) }
    }

    /// Return a reference to the embedding provider.
    pub fn embedding_provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    async fn embed_all(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let embeddings = self.embedder.embed_batch(texts).await?;
        if embeddings.len() != texts.len() {
            return Err(RagError::EmbeddingError {
                provider: self.embedder.name().to_string(),
                message: format!(
                    "expected {} embeddings, provider returned {}",
                    texts.len(),
                    embeddings.len()
                ),
            });
        }
        let dimensions = self.embedder.dimensions();
        if let Some(bad) = embeddings.iter().find(|e| e.len() != dimensions) {
            return Err(RagError::EmbeddingError {
                provider: self.embedder.name().to_string(),
                message: format!(
                    "expected {dimensions}-dimensional embeddings, provider returned {}",
                    bad.len()
                ),
            });
        }
        Ok(embeddings)
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryVectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryVectorStore")
            .field("embedder", &self.embedder.name())
            .finish_non_exhaustive()
    }
}

fn missing_collection(collection: &CollectionHandle) -> RagError {
    RagError::VectorStoreError {
        backend: BACKEND.to_string(),
        message: format!("collection '{collection}' does not exist"),
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn get_or_create_collection(&self, name: &str) -> Result<CollectionHandle> {
        if name.is_empty() {
            return Err(RagError::VectorStoreError {
                backend: BACKEND.to_string(),
                message: "collection name must not be empty".to_string(),
            });
        }
        let mut collections = self.collections.write().await;
        collections.entry(name.to_string()).or_default();
        Ok(CollectionHandle::new(name))
    }

    async fn add(&self, collection: &CollectionHandle, documents: &[Document]) -> Result<()> {
        let texts: Vec<&str> = documents.iter().map(|d| d.text.as_str()).collect();
        let embeddings = self.embed_all(&texts).await?;

        let mut collections = self.collections.write().await;
        let store =
            collections.get_mut(collection.name()).ok_or_else(|| missing_collection(collection))?;
        for (document, embedding) in documents.iter().zip(embeddings) {
            store.upsert(StoredDocument { document: document.clone(), embedding });
        }
        debug!(
            collection = %collection,
            added = documents.len(),
            total = store.documents.len(),
            "added documents"
        );
        Ok(())
    }

    async fn query(
        &self,
        collection: &CollectionHandle,
        query_texts: &[&str],
        n_results: usize,
    ) -> Result<Vec<Vec<SearchResult>>> {
        let query_embeddings = self.embed_all(query_texts).await?;

        let collections = self.collections.read().await;
        let store =
            collections.get(collection.name()).ok_or_else(|| missing_collection(collection))?;

        let ranked = query_embeddings
            .iter()
            .map(|query| {
                let mut scored: Vec<SearchResult> = store
                    .documents
                    .iter()
                    .map(|stored| SearchResult {
                        document: stored.document.clone(),
                        score: cosine_similarity(&stored.embedding, query),
                    })
                    .collect();
                // Stable sort: equal scores keep insertion order.
                scored.sort_by(|a, b| {
                    b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal)
                });
                scored.truncate(n_results);
                scored
            })
            .collect();
        Ok(ranked)
    }

    async fn count(&self, collection: &CollectionHandle) -> Result<usize> {
        let collections = self.collections.read().await;
        collections
            .get(collection.name())
            .map(|store| store.documents.len())
            .ok_or_else(|| missing_collection(collection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Claims more dimensions than it produces.
    struct ShortProvider;

    #[async_trait]
    impl EmbeddingProvider for ShortProvider {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0; 4])
        }

        fn dimensions(&self) -> usize {
            8
        }

        fn name(&self) -> &str {
            "short"
        }
    }

    #[tokio::test]
    async fn mismatched_embedding_dimensions_are_rejected() {
        let store = InMemoryVectorStore::with_embedding_provider(Arc::new(ShortProvider));
        assert_eq!(store.embedding_provider().dimensions(), 8);

        let collection = store.get_or_create_collection("docs").await.unwrap();
        let err = store.add(&collection, &docs(&["a red cat"])).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Embedding error (short): expected 8-dimensional embeddings, provider returned 4"
        );
        assert_eq!(store.count(&collection).await.unwrap(), 0);
    }

    fn docs(texts: &[&str]) -> Vec<Document> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| Document::new(crate::document_id(i), *text))
            .collect()
    }

    #[tokio::test]
    async fn get_or_create_is_idempotent() {
        let store = InMemoryVectorStore::new();
        let first = store.get_or_create_collection("docs").await.unwrap();
        store.add(&first, &docs(&["a red cat"])).await.unwrap();
        let second = store.get_or_create_collection("docs").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.count(&second).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn empty_collection_name_is_rejected() {
        let store = InMemoryVectorStore::new();
        assert!(store.get_or_create_collection("").await.is_err());
    }

    #[tokio::test]
    async fn add_to_unknown_collection_fails() {
        let store = InMemoryVectorStore::new();
        let err = store
            .add(&CollectionHandle::new("missing"), &docs(&["a red cat"]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("collection 'missing' does not exist"));
    }

    #[tokio::test]
    async fn duplicate_ids_replace_text_in_place() {
        let store = InMemoryVectorStore::new();
        let collection = store.get_or_create_collection("docs").await.unwrap();
        store.add(&collection, &docs(&["a red cat", "a blue dog"])).await.unwrap();
        store.add(&collection, &docs(&["a green bird"])).await.unwrap();
        assert_eq!(store.count(&collection).await.unwrap(), 2);

        let ranked = store.query(&collection, &["green bird"], 2).await.unwrap();
        assert_eq!(ranked[0][0].document, Document::new("sentence-0", "a green bird"));
    }

    #[tokio::test]
    async fn query_ranks_most_similar_first() {
        let store = InMemoryVectorStore::new();
        let collection = store.get_or_create_collection("docs").await.unwrap();
        store
            .add(&collection, &docs(&["a blue dog", "a red cat", "a green bird"]))
            .await
            .unwrap();

        let ranked = store.query(&collection, &["red cat"], 3).await.unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0][0].document.text, "a red cat");
        for pair in ranked[0].windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[tokio::test]
    async fn ties_keep_insertion_order() {
        let store = InMemoryVectorStore::new();
        let collection = store.get_or_create_collection("docs").await.unwrap();
        store.add(&collection, &docs(&["alpha", "beta", "gamma"])).await.unwrap();

        // An empty query embeds to the zero vector, so every score is 0.0.
        let ranked = store.query(&collection, &[""], 3).await.unwrap();
        let ids: Vec<&str> = ranked[0].iter().map(|r| r.document.id.as_str()).collect();
        assert_eq!(ids, ["sentence-0", "sentence-1", "sentence-2"]);
    }

    #[tokio::test]
    async fn one_result_list_per_query_text() {
        let store = InMemoryVectorStore::new();
        let collection = store.get_or_create_collection("docs").await.unwrap();
        store.add(&collection, &docs(&["a red cat", "a blue dog"])).await.unwrap();

        let ranked = store.query(&collection, &["cat", "dog"], 1).await.unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0][0].document.text, "a red cat");
        assert_eq!(ranked[1][0].document.text, "a blue dog");
    }

    #[test]
    fn cosine_of_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
    }
}
