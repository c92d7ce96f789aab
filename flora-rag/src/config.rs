//! Configuration for retrieval and generation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Collection used when none is configured.
pub const DEFAULT_COLLECTION: &str = "sentences_collection";

/// Number of context documents retrieved when none is configured.
pub const DEFAULT_TOP_K: usize = 3;

/// Retrieval parameters for the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RagConfig {
    /// Name of the collection documents are indexed into and retrieved from.
    pub collection_name: String,
    /// Number of most-similar documents to retrieve per question.
    pub top_k: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self { collection_name: DEFAULT_COLLECTION.to_string(), top_k: DEFAULT_TOP_K }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// Check that the parameters are usable.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if `collection_name` is empty or `top_k == 0`.
    pub fn validate(&self) -> Result<()> {
        if self.collection_name.is_empty() {
            return Err(RagError::ConfigError("collection_name must not be empty".to_string()));
        }
        if self.top_k == 0 {
            return Err(RagError::ConfigError("top_k must be greater than zero".to_string()));
        }
        Ok(())
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the collection name.
    pub fn collection_name(mut self, name: impl Into<String>) -> Self {
        self.config.collection_name = name.into();
        self
    }

    /// Set the number of documents to retrieve.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Build the [`RagConfig`], validating it.
    ///
    /// # Errors
    ///
    /// See [`RagConfig::validate`].
    pub fn build(self) -> Result<RagConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// How to invoke the local generation runtime.
///
/// The runtime is started as `<program> <subcommand> <model>` with the prompt
/// on standard input. The defaults run `ollama run llama3.1` with no timeout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Executable name or path, resolved on `PATH`.
    pub program: String,
    /// First argument passed to the executable.
    pub subcommand: String,
    /// Model identifier passed after the subcommand.
    pub model: String,
    /// Human-facing runtime name used in diagnostics.
    pub display_name: String,
    /// Where users can install the runtime.
    pub install_url: String,
    /// Upper bound on one invocation; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            program: "ollama".to_string(),
            subcommand: "run".to_string(),
            model: "llama3.1".to_string(),
            display_name: "Ollama".to_string(),
            install_url: "https://ollama.com".to_string(),
            timeout: None,
        }
    }
}

impl GeneratorConfig {
    /// Create a new builder for constructing a [`GeneratorConfig`].
    pub fn builder() -> GeneratorConfigBuilder {
        GeneratorConfigBuilder::default()
    }

    /// Arguments passed to the executable.
    pub fn args(&self) -> Vec<String> {
        vec![self.subcommand.clone(), self.model.clone()]
    }

    /// Check that the runtime can be invoked with these settings.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if `program`, `subcommand` or `model` is
    /// empty, or if `timeout` is zero.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in
            [("program", &self.program), ("subcommand", &self.subcommand), ("model", &self.model)]
        {
            if value.trim().is_empty() {
                return Err(RagError::ConfigError(format!("{field} must not be empty")));
            }
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(RagError::ConfigError("timeout must be greater than zero".to_string()));
        }
        Ok(())
    }
}

/// Builder for constructing a validated [`GeneratorConfig`].
#[derive(Debug, Clone, Default)]
pub struct GeneratorConfigBuilder {
    config: GeneratorConfig,
}

impl GeneratorConfigBuilder {
    /// Set the executable name or path.
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.config.program = program.into();
        self
    }

    /// Set the subcommand.
    pub fn subcommand(mut self, subcommand: impl Into<String>) -> Self {
        self.config.subcommand = subcommand.into();
        self
    }

    /// Set the model identifier.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the runtime name used in diagnostics.
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.config.display_name = name.into();
        self
    }

    /// Set the install pointer used in the dependency-missing diagnostic.
    pub fn install_url(mut self, url: impl Into<String>) -> Self {
        self.config.install_url = url.into();
        self
    }

    /// Bound each invocation to `timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Build the [`GeneratorConfig`], validating it.
    ///
    /// # Errors
    ///
    /// See [`GeneratorConfig::validate`].
    pub fn build(self) -> Result<GeneratorConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
