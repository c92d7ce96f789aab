//! # flora-rag
//!
//! A small retrieval-augmented generation pipeline: sentences are indexed
//! into a vector store, the ones most similar to a question are retrieved,
//! and they are handed as context to a local language model runtime
//! (`ollama run llama3.1` by default).
//!
//! ## Components
//!
//! - [`VectorStore`]: named collections, batch insertion, similarity query.
//!   [`InMemoryVectorStore`] embeds text internally with an
//!   [`EmbeddingProvider`] ([`HashingEmbeddingProvider`] by default).
//! - [`index`] / [`retrieve`]: the indexing and retrieval contracts.
//! - [`build_prompt`]: the grounding prompt.
//! - [`Generator`]: prompt in, answer or [`GenerationError`] out.
//!   [`OllamaGenerator`] runs the runtime as a child process through a
//!   [`CommandRunner`].
//! - [`RagPipeline`]: ties the above together.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use flora_rag::{GeneratorConfig, InMemoryVectorStore, OllamaGenerator, RagConfig, RagPipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pipeline = RagPipeline::builder()
//!         .config(RagConfig::default())
//!         .vector_store(Arc::new(InMemoryVectorStore::new()))
//!         .generator(Arc::new(OllamaGenerator::new(GeneratorConfig::default())?))
//!         .build()?;
//!
//!     let collection = pipeline.index(&flora_rag::demo::SENTENCES).await?;
//!     let answer = pipeline.answer(&collection, flora_rag::demo::QUESTION).await?;
//!     println!("{}", answer.text);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod demo;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod hashing;
pub mod indexer;
pub mod inmemory;
pub mod pipeline;
pub mod prompt;
pub mod retriever;
pub mod runner;
pub mod vectorstore;

pub use config::{
    DEFAULT_COLLECTION, DEFAULT_TOP_K, GeneratorConfig, GeneratorConfigBuilder, RagConfig,
    RagConfigBuilder,
};
pub use document::{Document, SearchResult, document_id};
pub use embedding::EmbeddingProvider;
pub use error::{GenerationError, RagError, Result};
pub use generation::{GenerationResult, Generator, OllamaGenerator};
pub use hashing::HashingEmbeddingProvider;
pub use indexer::{assign_ids, index};
pub use inmemory::InMemoryVectorStore;
pub use pipeline::{Answer, RagPipeline, RagPipelineBuilder};
pub use prompt::{build_prompt, format_context};
pub use retriever::retrieve;
pub use runner::{CommandRunner, Invocation, ProcessOutput, SystemRunner};
pub use tokio_util::sync::CancellationToken;
pub use vectorstore::{CollectionHandle, VectorStore};
