//! Builder for executing external tool commands.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::Command;

use crate::{Error, Result};

/// Lines of stderr kept in a failure message.
const STDERR_TAIL_LINES: usize = 20;

/// Output captured from a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Process exit status.
    pub status: ExitStatus,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

/// A builder for constructing and executing external tool invocations.
///
/// The child is killed if the returned future is dropped or the timeout
/// expires, so a failed or abandoned conversion never leaves a process behind.
///
/// # Example
///
/// ```no_run
/// use formatfusion_av::ToolCommand;
/// use std::path::PathBuf;
///
/// # async fn example() -> formatfusion_av::Result<()> {
/// let output = ToolCommand::new(PathBuf::from("ffmpeg"))
///     .arg("-i").arg("/tmp/in.mp4")
///     .arg("/tmp/out.webm")
///     .execute()
///     .await?;
/// println!("{}", output.stderr);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
    timeout: Option<Duration>,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
            timeout: None,
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<OsString>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<OsString>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Set the maximum execution time. `None` waits indefinitely.
    pub fn timeout(&mut self, d: Option<Duration>) -> &mut Self {
        self.timeout = d;
        self
    }

    fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    /// Execute the command, capturing stdout and stderr.
    ///
    /// # Errors
    ///
    /// - [`Error::ToolNotFound`] if the program does not exist.
    /// - [`Error::ToolFailed`] if spawning fails or the process exits with a
    ///   non-zero status (message includes the tail of stderr).
    /// - [`Error::Timeout`] if the process outlives the configured timeout.
    pub async fn execute(&self) -> Result<ToolOutput> {
        let program_name = self.program_name();

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(feature = "tracing")]
        tracing::debug!(tool = %program_name, args = ?self.args, "Spawning external tool");

        let child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::tool_not_found(&program_name)
            } else {
                Error::tool_failed(&program_name, format!("failed to spawn: {e}"))
            }
        })?;

        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(result) => result,
                // Dropping the wait future drops the child, which kills it.
                Err(_elapsed) => {
                    return Err(Error::Timeout {
                        tool: program_name,
                        timeout: limit,
                    })
                }
            },
            None => child.wait_with_output().await,
        }
        .map_err(|e| {
            Error::tool_failed(&program_name, format!("I/O error waiting for process: {e}"))
        })?;

        let tool_output = ToolOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !output.status.success() {
            return Err(Error::tool_failed(
                program_name,
                format!(
                    "exited with status {}: {}",
                    output.status,
                    stderr_tail(&tool_output.stderr)
                ),
            ));
        }

        Ok(tool_output)
    }
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.trim().lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn execute_echo() {
        let output = ToolCommand::new(PathBuf::from("echo"))
            .arg("hello")
            .execute()
            .await;

        match output {
            Ok(out) => {
                assert!(out.status.success());
                assert!(out.stdout.trim().contains("hello"));
            }
            Err(_) => {
                // On some minimal environments echo may not exist; skip.
            }
        }
    }

    #[tokio::test]
    async fn execute_nonexistent_tool() {
        let result = ToolCommand::new(PathBuf::from("nonexistent_tool_xyz_12345"))
            .execute()
            .await;
        assert!(matches!(result, Err(Error::ToolNotFound { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_tool_failed() {
        let result = ToolCommand::new(PathBuf::from("sh"))
            .args(["-c", "echo broken >&2; exit 3"])
            .execute()
            .await;
        match result {
            Err(Error::ToolFailed { tool, message }) => {
                assert_eq!(tool, "sh");
                assert!(message.contains("broken"), "unexpected message: {message}");
            }
            other => panic!("expected ToolFailed, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn timeout_fires() {
        let result = ToolCommand::new(PathBuf::from("sleep"))
            .arg("10")
            .timeout(Some(Duration::from_millis(100)))
            .execute()
            .await;
        let err = result.unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }), "unexpected error: {err}");
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn stderr_tail_keeps_last_lines() {
        let stderr: String = (0..50).map(|i| format!("line {i}\n")).collect();
        let tail = stderr_tail(&stderr);
        assert_eq!(tail.lines().count(), STDERR_TAIL_LINES);
        assert!(tail.ends_with("line 49"));
    }
}
