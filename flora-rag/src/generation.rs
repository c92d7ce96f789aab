//! Grounded generation through a local model runtime.
//!
//! [`OllamaGenerator`] runs the configured executable (by default
//! `ollama run llama3.1`) once per prompt. Each call goes through three
//! steps, with nothing kept between calls:
//!
//! 1. Preflight: resolve the executable. If it is missing, fail with
//!    [`GenerationError::DependencyMissing`] without starting anything.
//! 2. Invoke: start the process, write the prompt to its stdin, capture
//!    stdout and stderr, await exit. The wait is bounded by the configured
//!    timeout (if any) and by the caller's [`CancellationToken`].
//! 3. Classify: exit 0 yields the trimmed stdout; anything else becomes a
//!    [`GenerationError`] variant.
//!
//! The process is killed and its pipes released on every early exit.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::GeneratorConfig;
use crate::error::{GenerationError, Result};
use crate::runner::{CommandRunner, Invocation, ProcessOutput, SystemRunner};

/// Outcome of one generation: the answer text, or why there is none.
pub type GenerationResult = std::result::Result<String, GenerationError>;

/// Produces an answer for a fully built prompt.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate text for `prompt`.
    ///
    /// Never panics; every failure is reported as a [`GenerationError`].
    /// Cancelling `cancel` stops the generation as soon as possible.
    async fn generate(&self, prompt: &str, cancel: &CancellationToken) -> GenerationResult;
}

/// Generator backed by a local command-line runtime such as `ollama`.
///
/// # Example
///
/// ```rust,ignore
/// use flora_rag::{Generator, GeneratorConfig, OllamaGenerator};
/// use tokio_util::sync::CancellationToken;
///
/// let generator = OllamaGenerator::new(GeneratorConfig::default())?;
/// match generator.generate(&prompt, &CancellationToken::new()).await {
///     Ok(answer) => println!("{answer}"),
///     Err(e) => eprintln!("{e}"),
/// }
/// ```
#[derive(Debug)]
pub struct OllamaGenerator<R = SystemRunner> {
    config: GeneratorConfig,
    runner: R,
}

impl OllamaGenerator<SystemRunner> {
    /// Create a generator that runs real processes found on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`](crate::RagError::ConfigError) if the
    /// configuration is invalid.
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        Self::with_runner(config, SystemRunner::new())
    }
}

impl<R: CommandRunner> OllamaGenerator<R> {
    /// Create a generator that starts processes through `runner`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`](crate::RagError::ConfigError) if the
    /// configuration is invalid.
    pub fn with_runner(config: GeneratorConfig, runner: R) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, runner })
    }

    /// Return a reference to the generator configuration.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Return a reference to the command runner.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn display_name(&self) -> String {
        self.config.display_name.clone()
    }

    fn classify(&self, output: ProcessOutput) -> GenerationResult {
        if output.success() {
            return Ok(output.stdout.trim().to_string());
        }
        let code = output.status.unwrap_or(-1);
        let stderr = output.stderr.trim().to_string();
        warn!(program = %self.config.program, code, stderr = %stderr, "runtime exited unsuccessfully");
        Err(GenerationError::NonZeroExit { display_name: self.display_name(), code, stderr })
    }
}

#[async_trait]
impl<R: CommandRunner> Generator for OllamaGenerator<R> {
    async fn generate(&self, prompt: &str, cancel: &CancellationToken) -> GenerationResult {
        let Some(program) = self.runner.locate(&self.config.program) else {
            warn!(program = %self.config.program, "runtime executable not found");
            return Err(GenerationError::DependencyMissing {
                program: self.config.program.clone(),
                display_name: self.display_name(),
                install_url: self.config.install_url.clone(),
            });
        };

        if cancel.is_cancelled() {
            return Err(GenerationError::Cancelled { display_name: self.display_name() });
        }

        let invocation =
            Invocation { program, args: self.config.args(), stdin: prompt.to_string() };
        debug!(
            program = %invocation.program.display(),
            model = %self.config.model,
            prompt_len = prompt.len(),
            timeout = ?self.config.timeout,
            "invoking generation runtime"
        );

        let run = self.runner.run(&invocation);
        let bounded = async {
            match self.config.timeout {
                Some(limit) => tokio::time::timeout(limit, run).await.map_err(|_| {
                    warn!(program = %self.config.program, ?limit, "generation timed out");
                    GenerationError::TimedOut { display_name: self.display_name(), after: limit }
                }),
                None => Ok(run.await),
            }
        };

        // Dropping the losing branch drops the child process, which kills it.
        let output = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                info!(program = %self.config.program, "generation cancelled");
                return Err(GenerationError::Cancelled { display_name: self.display_name() });
            }
            result = bounded => result?,
        };

        let output = output.map_err(|source| {
            warn!(program = %self.config.program, error = %source, "failed to start runtime");
            GenerationError::Launch { display_name: self.display_name(), source }
        })?;

        let result = self.classify(output);
        if let Ok(answer) = &result {
            info!(answer_len = answer.len(), "generation completed");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    struct FixedRunner(ProcessOutput);

    #[async_trait]
    impl CommandRunner for FixedRunner {
        fn locate(&self, program: &str) -> Option<PathBuf> {
            Some(PathBuf::from(format!("/usr/bin/{program}")))
        }

        async fn run(&self, _invocation: &Invocation) -> std::io::Result<ProcessOutput> {
            Ok(self.0.clone())
        }
    }

    async fn generate_with(output: ProcessOutput) -> GenerationResult {
        let generator =
            OllamaGenerator::with_runner(GeneratorConfig::default(), FixedRunner(output)).unwrap();
        generator.generate("prompt", &CancellationToken::new()).await
    }

    #[tokio::test]
    async fn success_returns_trimmed_stdout() {
        let answer = generate_with(ProcessOutput {
            status: Some(0),
            stdout: "\n  Pasta, I think.  \n".to_string(),
            stderr: "loading model...".to_string(),
        })
        .await
        .unwrap();
        assert_eq!(answer, "Pasta, I think.");
    }

    #[tokio::test]
    async fn signal_termination_reports_negated_signal() {
        let err = generate_with(ProcessOutput {
            status: Some(-9),
            stderr: "dying\n".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();
        assert!(matches!(err, GenerationError::NonZeroExit { code: -9, .. }));
        assert_eq!(err.to_string(), "Ollama returned non-zero exit code -9: dying");
    }

    #[tokio::test]
    async fn unknown_exit_status_reports_minus_one() {
        let err = generate_with(ProcessOutput { status: None, ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::NonZeroExit { code: -1, .. }));
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let config = GeneratorConfig { program: String::new(), ..Default::default() };
        assert!(OllamaGenerator::new(config).is_err());
    }
}
