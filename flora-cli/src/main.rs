//! # flora
//!
//! Runs the retrieval-augmented prompt pipeline once from the command line:
//! index sentences into an in-memory collection, retrieve the ones closest to
//! the question, print them, then ask the local model and print its answer.
//!
//! ```bash
//! # The built-in demo: four sentences, "What did you have for dinner?"
//! flora
//!
//! # Your own sentences and question
//! flora -d "a red cat" -d "a blue dog" -q "What color is the cat?" -k 1
//! ```
//!
//! Logs go to stderr (`RUST_LOG` or `--verbose`); stdout carries only the
//! context and the answer. A missing or failing model runtime prints its
//! diagnostic in place of the answer and exits with a failure status.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use flora_rag::{CancellationToken, InMemoryVectorStore, OllamaGenerator, RagPipeline};
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::Cli;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let generator_config = cli.generator_config().context("invalid generator settings")?;
    let model = generator_config.model.clone();
    let pipeline = RagPipeline::builder()
        .config(cli.rag_config().context("invalid retrieval settings")?)
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .generator(Arc::new(OllamaGenerator::new(generator_config)?))
        .build()?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, stopping generation");
            on_interrupt.cancel();
        }
    });

    cli::run(&cli, &pipeline, &model, &cancel, &mut std::io::stdout()).await
}
