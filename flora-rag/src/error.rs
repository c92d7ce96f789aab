//! Error types for the `flora-rag` crate.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur in RAG operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// An error occurred while the vector store embedded text.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An error in the RAG pipeline orchestration.
    #[error("Pipeline error: {0}")]
    PipelineError(String),

    /// The generation runtime did not produce an answer.
    #[error(transparent)]
    GenerationError(#[from] GenerationError),
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;

/// Reasons a call to the generation runtime produced no answer.
///
/// The `Display` output is the human-readable diagnostic shown to users in
/// place of an answer.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The runtime executable could not be found on `PATH`. No process was started.
    #[error(
        "{display_name} CLI not found. Please install from {install_url} and ensure \"{program}\" is on your PATH."
    )]
    DependencyMissing {
        /// Executable that was looked up.
        program: String,
        /// Human-facing runtime name, e.g. `Ollama`.
        display_name: String,
        /// Where to get the runtime.
        install_url: String,
    },

    /// The operating system refused to start the process.
    #[error("Failed to invoke {display_name}: {source}")]
    Launch {
        /// Human-facing runtime name.
        display_name: String,
        /// The underlying spawn or pipe error.
        #[source]
        source: std::io::Error,
    },

    /// The process ran but exited unsuccessfully.
    ///
    /// On unix, `code` is the negated signal number when the process was
    /// terminated by a signal; `-1` when no status is available.
    #[error("{display_name} returned non-zero exit code {code}: {stderr}")]
    NonZeroExit {
        /// Human-facing runtime name.
        display_name: String,
        /// Process exit code.
        code: i32,
        /// Trimmed standard error.
        stderr: String,
    },

    /// The configured timeout elapsed; the process was killed.
    #[error("{display_name} did not finish within {}s", .after.as_secs_f64())]
    TimedOut {
        /// Human-facing runtime name.
        display_name: String,
        /// The timeout that elapsed.
        after: Duration,
    },

    /// The caller cancelled the invocation; the process was killed.
    #[error("{display_name} invocation was cancelled")]
    Cancelled {
        /// Human-facing runtime name.
        display_name: String,
    },
}

impl GenerationError {
    /// Short machine-friendly name of the failure kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DependencyMissing { .. } => "dependency_missing",
            Self::Launch { .. } => "launch_failure",
            Self::NonZeroExit { .. } => "runtime_failure",
            Self::TimedOut { .. } => "timed_out",
            Self::Cancelled { .. } => "cancelled",
        }
    }
}
