//! Similarity retrieval against a collection.

use tracing::{debug, error};

use crate::error::{RagError, Result};
use crate::vectorstore::{CollectionHandle, VectorStore};

/// Return the texts of the `k` documents most similar to `question`, most relevant first.
///
/// Ranking is entirely the store's. If the collection holds fewer than `k`
/// documents, every stored document is returned; the result is never padded.
/// An empty `question` is passed through unchanged.
///
/// # Errors
///
/// - [`RagError::ConfigError`] if `k` is zero.
/// - [`RagError::PipelineError`] wrapping the store error if the query fails.
pub async fn retrieve(
    store: &dyn VectorStore,
    collection: &CollectionHandle,
    question: &str,
    k: usize,
) -> Result<Vec<String>> {
    if k == 0 {
        return Err(RagError::ConfigError("k must be greater than zero".to_string()));
    }

    let ranked = store.query(collection, &[question], k).await.map_err(|e| {
        error!(collection = %collection, error = %e, "similarity query failed");
        RagError::PipelineError(format!("query failed in collection '{collection}': {e}"))
    })?;

    // One list per query text; only one text was sent.
    let mut texts: Vec<String> = ranked
        .into_iter()
        .next()
        .unwrap_or_default()
        .into_iter()
        .map(|result| result.document.text)
        .collect();
    texts.truncate(k);

    debug!(collection = %collection, k, result_count = texts.len(), "retrieved context");
    Ok(texts)
}
