//! Subordinate process execution.
//!
//! [`CommandRunner`] is the seam between the generation invoker and the
//! operating system: it resolves an executable and runs it to completion with
//! piped standard streams. [`SystemRunner`] is the real implementation, built
//! on `which` and `tokio::process`.

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, trace};

/// A fully resolved command to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Resolved path of the executable.
    pub program: PathBuf,
    /// Command-line arguments.
    pub args: Vec<String>,
    /// Data written to the process's standard input before it is closed.
    pub stdin: String,
}

/// Captured result of a process that ran to exit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessOutput {
    /// Exit code. On unix a process terminated by a signal reports the
    /// negated signal number (`-9` for `SIGKILL`). `None` if neither is known.
    pub status: Option<i32>,
    /// Captured standard output (lossily decoded as UTF-8).
    pub stdout: String,
    /// Captured standard error (lossily decoded as UTF-8).
    pub stderr: String,
}

impl ProcessOutput {
    /// Whether the process exited with status zero.
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Resolves and runs external commands.
///
/// Implementations must release the process and its pipes when the future
/// returned by [`run`](CommandRunner::run) is dropped before completion;
/// callers rely on that to enforce timeouts and cancellation.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Resolve `program` to an executable path, or `None` if it cannot be found.
    fn locate(&self, program: &str) -> Option<PathBuf>;

    /// Run `invocation` to completion, feeding its stdin and capturing its output.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the process cannot be started or its output
    /// cannot be collected. A non-zero exit is not an error here.
    async fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutput>;
}

/// Runs commands as real child processes.
///
/// Executables are looked up on `PATH` unless a search path is set with
/// [`with_search_path`](SystemRunner::with_search_path).
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    search_path: Option<OsString>,
}

impl SystemRunner {
    /// Create a runner that searches the process `PATH`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a runner that searches only `search_path` (same syntax as `PATH`).
    pub fn with_search_path(search_path: impl Into<OsString>) -> Self {
        Self { search_path: Some(search_path.into()) }
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        match &self.search_path {
            Some(paths) => {
                let cwd = std::env::current_dir().ok()?;
                which::which_in(program, Some(paths), cwd).ok()
            }
            None => which::which(program).ok(),
        }
    }

    async fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutput> {
        debug!(program = %invocation.program.display(), args = ?invocation.args, "spawning process");

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let mut stdin =
            child.stdin.take().ok_or_else(|| io::Error::other("child stdin was not captured"))?;
        let input = invocation.stdin.as_bytes();

        // Feed stdin while draining stdout/stderr so a large prompt cannot
        // deadlock against a full output pipe.
        let feed = async move {
            stdin.write_all(input).await?;
            stdin.shutdown().await
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());

        match fed {
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                trace!("process closed stdin before reading the whole prompt");
            }
            other => other?,
        }
        let output = output?;

        Ok(ProcessOutput {
            status: exit_code(output.status),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;

    status.code().or_else(|| status.signal().map(|signal| -signal))
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> Option<i32> {
    status.code()
}

#[cfg(all(test, unix))]
mod tests {
    use std::os::unix::fs::PermissionsExt;

    use super::*;

    fn write_script(dir: &std::path::Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn locate_honours_search_path() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "fake-runtime", "exit 0");
        let runner = SystemRunner::with_search_path(dir.path());
        assert_eq!(runner.locate("fake-runtime"), Some(script));
        assert_eq!(runner.locate("definitely-not-here"), None);
    }

    #[tokio::test]
    async fn run_feeds_stdin_and_captures_streams() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "echoer", "cat\necho \"args: $1 $2\" >&2\nexit 3");
        let output = SystemRunner::new()
            .run(&Invocation {
                program: script,
                args: vec!["run".to_string(), "llama3.1".to_string()],
                stdin: "hello prompt".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(output.status, Some(3));
        assert!(!output.success());
        assert_eq!(output.stdout, "hello prompt");
        assert_eq!(output.stderr.trim(), "args: run llama3.1");
    }

    #[tokio::test]
    async fn signal_termination_reports_negated_signal() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "dies", "cat >/dev/null\necho dying >&2\nkill -9 $$");
        let output = SystemRunner::new()
            .run(&Invocation { program: script, args: Vec::new(), stdin: "prompt".to_string() })
            .await
            .unwrap();
        assert_eq!(output.status, Some(-9));
        assert!(!output.success());
        assert_eq!(output.stderr.trim(), "dying");
    }

    #[tokio::test]
    async fn missing_program_is_an_io_error() {
        let err = SystemRunner::new()
            .run(&Invocation {
                program: PathBuf::from("/nonexistent/flora-runtime"),
                args: Vec::new(),
                stdin: String::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
