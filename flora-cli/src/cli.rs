//! Command-line arguments and the run loop.

use std::io::Write;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use flora_rag::{CancellationToken, GeneratorConfig, RagConfig, RagPipeline, demo};
use tracing::{info, warn};

/// Index a few sentences, retrieve the ones closest to a question and ask a
/// local model to answer from them.
#[derive(Debug, Parser)]
#[command(name = "flora")]
#[command(version)]
pub struct Cli {
    /// Question to answer
    #[arg(short, long, default_value = demo::QUESTION)]
    pub question: String,

    /// Sentence to index (repeatable); defaults to the built-in demo sentences
    #[arg(short, long = "document", value_name = "TEXT")]
    pub documents: Vec<String>,

    /// Number of context sentences to retrieve
    #[arg(short = 'k', long, default_value_t = flora_rag::DEFAULT_TOP_K)]
    pub top_k: usize,

    /// Collection to index into and query
    #[arg(long, default_value = flora_rag::DEFAULT_COLLECTION)]
    pub collection: String,

    /// Model passed to the runtime
    #[arg(short, long, default_value = "llama3.1")]
    pub model: String,

    /// Runtime executable, looked up on PATH
    #[arg(long, default_value = "ollama")]
    pub program: String,

    /// Give up on the model after this many seconds (default: wait indefinitely)
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Sentences to index: the ones given on the command line, or the demo corpus.
    pub fn documents(&self) -> Vec<String> {
        if self.documents.is_empty() {
            demo::SENTENCES.iter().map(|s| s.to_string()).collect()
        } else {
            self.documents.clone()
        }
    }

    /// Retrieval configuration derived from the arguments.
    pub fn rag_config(&self) -> flora_rag::Result<RagConfig> {
        RagConfig::builder().collection_name(&self.collection).top_k(self.top_k).build()
    }

    /// Generation configuration derived from the arguments.
    pub fn generator_config(&self) -> flora_rag::Result<GeneratorConfig> {
        let builder = GeneratorConfig::builder().program(&self.program).model(&self.model);
        match self.timeout_secs {
            Some(secs) => builder.timeout(Duration::from_secs(secs)).build(),
            None => builder.build(),
        }
    }
}

/// Index the documents, print the retrieved context, then ask `model` and
/// print its answer (or the diagnostic in its place) to `out`.
///
/// Returns [`ExitCode::FAILURE`] when the model produced no answer.
pub async fn run(
    cli: &Cli,
    pipeline: &RagPipeline,
    model: &str,
    cancel: &CancellationToken,
    out: &mut impl Write,
) -> Result<ExitCode> {
    let documents = cli.documents();
    let collection = pipeline.index(&documents).await.context("indexing failed")?;
    info!(collection = %collection, count = documents.len(), "collection ready");

    let context =
        pipeline.retrieve(&collection, &cli.question).await.context("retrieval failed")?;

    writeln!(out, "Retrieved context:")?;
    for (i, doc) in context.iter().enumerate() {
        writeln!(out, "  {}. {doc}", i + 1)?;
    }
    writeln!(out, "\nAsking {model} with retrieved context...\n")?;
    out.flush()?;

    match pipeline.ask(&cli.question, &context, cancel).await {
        Ok(answer) => {
            writeln!(out, "Answer:\n{answer}")?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            warn!(kind = e.kind(), "no answer from the model runtime");
            writeln!(out, "Answer:\n{e}")?;
            Ok(ExitCode::FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use flora_rag::{GenerationError, GenerationResult, Generator, InMemoryVectorStore};

    use super::*;

    /// Answers with a fixed outcome.
    struct FixedGenerator(fn() -> GenerationResult);

    #[async_trait]
    impl Generator for FixedGenerator {
        async fn generate(&self, _prompt: &str, _cancel: &CancellationToken) -> GenerationResult {
            (self.0)()
        }
    }

    async fn run_with(args: &[&str], outcome: fn() -> GenerationResult) -> (ExitCode, String) {
        let cli = Cli::try_parse_from(args).unwrap();
        let pipeline = RagPipeline::builder()
            .config(cli.rag_config().unwrap())
            .vector_store(Arc::new(InMemoryVectorStore::new()))
            .generator(Arc::new(FixedGenerator(outcome)))
            .build()
            .unwrap();

        let mut out = Vec::new();
        let code = run(&cli, &pipeline, &cli.model, &CancellationToken::new(), &mut out)
            .await
            .unwrap();
        (code, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn run_prints_numbered_context_then_answer() {
        let (code, out) = run_with(
            &["flora", "-d", "a red cat", "-d", "a blue dog", "-q", "red cat", "-k", "1"],
            || Ok("Red.".to_string()),
        )
        .await;

        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(
            out,
            "Retrieved context:\n  1. a red cat\n\nAsking llama3.1 with retrieved context...\n\nAnswer:\nRed.\n"
        );
    }

    #[tokio::test]
    async fn run_prints_diagnostic_and_fails_without_an_answer() {
        let (code, out) = run_with(&["flora"], || {
            Err(GenerationError::NonZeroExit {
                display_name: "Ollama".to_string(),
                code: 1,
                stderr: "boom".to_string(),
            })
        })
        .await;

        assert_eq!(code, ExitCode::FAILURE);
        assert!(out.starts_with("Retrieved context:\n  1. What did you have for dinner?\n"), "{out}");
        assert!(out.ends_with("Answer:\nOllama returned non-zero exit code 1: boom\n"), "{out}");
    }

    #[test]
    fn no_arguments_reproduce_the_demo() {
        let cli = Cli::try_parse_from(["flora"]).unwrap();
        assert_eq!(cli.question, "What did you have for dinner?");
        assert_eq!(cli.documents(), demo::SENTENCES);
        assert_eq!(cli.rag_config().unwrap(), RagConfig::default());
        assert_eq!(cli.generator_config().unwrap(), GeneratorConfig::default());
    }

    #[test]
    fn documents_and_overrides_are_parsed() {
        let cli = Cli::try_parse_from([
            "flora",
            "-q",
            "What color is the cat?",
            "-d",
            "a red cat",
            "--document",
            "a blue dog",
            "-k",
            "2",
            "--model",
            "mistral",
            "--timeout-secs",
            "60",
        ])
        .unwrap();
        assert_eq!(cli.documents(), ["a red cat", "a blue dog"]);
        assert_eq!(cli.rag_config().unwrap().top_k, 2);

        let generator = cli.generator_config().unwrap();
        assert_eq!(generator.model, "mistral");
        assert_eq!(generator.timeout, Some(Duration::from_secs(60)));
    }

    #[test]
    fn zero_top_k_is_a_config_error() {
        let cli = Cli::try_parse_from(["flora", "-k", "0"]).unwrap();
        assert!(cli.rag_config().is_err());
    }
}
