//! Document indexing: derive identifiers and batch-insert into a collection.

use tracing::{error, info};

use crate::document::{Document, document_id};
use crate::error::{RagError, Result};
use crate::vectorstore::{CollectionHandle, VectorStore};

/// Pair each text with its insertion-order identifier (`sentence-0`, `sentence-1`, ...).
///
/// Identifiers depend only on position, so the same input always yields the
/// same identifiers.
pub fn assign_ids<S: AsRef<str>>(texts: &[S]) -> Vec<Document> {
    texts.iter().enumerate().map(|(i, text)| Document::new(document_id(i), text.as_ref())).collect()
}

/// Get or create `collection_name` in `store` and insert `texts` in one batch.
///
/// An empty `texts` slice leaves an empty (but existing) collection. What
/// happens when the collection already holds documents with the same
/// identifiers is up to the store; see the store's documentation.
///
/// # Errors
///
/// Returns [`RagError::PipelineError`] wrapping the store error if the collection
/// cannot be created or the insertion fails. Nothing is retried.
pub async fn index<S: AsRef<str>>(
    store: &dyn VectorStore,
    texts: &[S],
    collection_name: &str,
) -> Result<CollectionHandle> {
    let collection = store.get_or_create_collection(collection_name).await.map_err(|e| {
        error!(collection = collection_name, error = %e, "failed to get or create collection");
        RagError::PipelineError(format!("failed to get or create collection '{collection_name}': {e}"))
    })?;

    let documents = assign_ids(texts);
    if !documents.is_empty() {
        store.add(&collection, &documents).await.map_err(|e| {
            error!(collection = %collection, error = %e, "batch insert failed");
            RagError::PipelineError(format!("failed to add documents to '{collection}': {e}"))
        })?;
    }

    info!(collection = %collection, document_count = documents.len(), "indexed documents");
    Ok(collection)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_assigned_in_input_order() {
        let documents = assign_ids(&["How are you?", "What did you do today?"]);
        assert_eq!(
            documents,
            vec![
                Document::new("sentence-0", "How are you?"),
                Document::new("sentence-1", "What did you do today?"),
            ]
        );
    }

    #[test]
    fn no_texts_no_documents() {
        let texts: [&str; 0] = [];
        assert!(assign_ids(&texts).is_empty());
    }
}
