//! RAG pipeline orchestrator.
//!
//! The [`RagPipeline`] ties a [`VectorStore`] and a [`Generator`] together:
//! index documents once, then for each question retrieve context, build the
//! grounding prompt and ask the generator. Stages run strictly one after
//! another.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use flora_rag::{GeneratorConfig, InMemoryVectorStore, OllamaGenerator, RagConfig, RagPipeline};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .generator(Arc::new(OllamaGenerator::new(GeneratorConfig::default())?))
//!     .build()?;
//!
//! let collection = pipeline.index(&["How are you?", "What did you have for dinner?"]).await?;
//! let answer = pipeline.answer(&collection, "What did you have for dinner?").await?;
//! ```

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::RagConfig;
use crate::error::{RagError, Result};
use crate::generation::{GenerationResult, Generator};
use crate::indexer;
use crate::prompt::build_prompt;
use crate::retriever;
use crate::vectorstore::{CollectionHandle, VectorStore};

/// A completed question: the context it was grounded on and the model's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    /// Retrieved documents, most relevant first.
    pub context: Vec<String>,
    /// The prompt sent to the generator.
    pub prompt: String,
    /// The generated answer.
    pub text: String,
}

/// The RAG pipeline orchestrator.
///
/// Holds the store and generator handles passed in by the caller; nothing is
/// global. Construct one via [`RagPipeline::builder()`].
pub struct RagPipeline {
    config: RagConfig,
    vector_store: Arc<dyn VectorStore>,
    generator: Arc<dyn Generator>,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the vector store.
    pub fn vector_store(&self) -> &Arc<dyn VectorStore> {
        &self.vector_store
    }

    /// Return a reference to the generator.
    pub fn generator(&self) -> &Arc<dyn Generator> {
        &self.generator
    }

    /// Index `texts` into the configured collection.
    ///
    /// # Errors
    ///
    /// See [`indexer::index`].
    pub async fn index<S: AsRef<str>>(&self, texts: &[S]) -> Result<CollectionHandle> {
        indexer::index(self.vector_store.as_ref(), texts, &self.config.collection_name).await
    }

    /// Retrieve the configured `top_k` documents most similar to `question`.
    ///
    /// # Errors
    ///
    /// See [`retriever::retrieve`].
    pub async fn retrieve(
        &self,
        collection: &CollectionHandle,
        question: &str,
    ) -> Result<Vec<String>> {
        retriever::retrieve(self.vector_store.as_ref(), collection, question, self.config.top_k)
            .await
    }

    /// Build the prompt for `question` and `context` and run the generator on it.
    pub async fn ask<S: AsRef<str>>(
        &self,
        question: &str,
        context: &[S],
        cancel: &CancellationToken,
    ) -> GenerationResult {
        let prompt = build_prompt(question, context);
        self.generator.generate(&prompt, cancel).await
    }

    /// Retrieve context for `question`, then generate a grounded answer.
    ///
    /// # Errors
    ///
    /// - [`RagError::PipelineError`] if retrieval fails.
    /// - [`RagError::GenerationError`] if the generator produced no answer.
    pub async fn answer(&self, collection: &CollectionHandle, question: &str) -> Result<Answer> {
        self.answer_with_cancel(collection, question, &CancellationToken::new()).await
    }

    /// Like [`answer`](RagPipeline::answer), stopping generation when `cancel` fires.
    ///
    /// # Errors
    ///
    /// See [`answer`](RagPipeline::answer).
    pub async fn answer_with_cancel(
        &self,
        collection: &CollectionHandle,
        question: &str,
        cancel: &CancellationToken,
    ) -> Result<Answer> {
        let context = self.retrieve(collection, question).await?;
        let prompt = build_prompt(question, &context);

        let text = self.generator.generate(&prompt, cancel).await.map_err(|e| {
            error!(collection = %collection, kind = e.kind(), error = %e, "generation failed");
            RagError::GenerationError(e)
        })?;

        info!(collection = %collection, context_count = context.len(), "answered question");
        Ok(Answer { context, prompt, text })
    }
}

impl std::fmt::Debug for RagPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagPipeline").field("config", &self.config).finish_non_exhaustive()
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// The vector store and generator are required. The configuration defaults
/// to [`RagConfig::default()`].
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    vector_store: Option<Arc<dyn VectorStore>>,
    generator: Option<Arc<dyn Generator>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set the generator.
    pub fn generator(mut self, generator: Arc<dyn Generator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Build the [`RagPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if a required field is missing or the
    /// configuration is invalid.
    pub fn build(self) -> Result<RagPipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagError::ConfigError("vector_store is required".to_string()))?;
        let generator =
            self.generator.ok_or_else(|| RagError::ConfigError("generator is required".to_string()))?;

        Ok(RagPipeline { config, vector_store, generator })
    }
}
