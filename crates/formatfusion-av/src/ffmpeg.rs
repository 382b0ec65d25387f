//! Shared ffmpeg invocation used by the video and audio transcoders.

use crate::command::ToolCommand;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How to launch ffmpeg.
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl Ffmpeg {
    /// Use the given ffmpeg executable with no time limit.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    /// Kill the conversion if it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run `ffmpeg -i <input> [output_args] <output>`.
    ///
    /// On any failure the output file is removed, so callers either get a
    /// complete non-empty file or an error.
    pub(crate) async fn run(
        &self,
        input: &Path,
        output_args: &[&str],
        output: &Path,
    ) -> Result<()> {
        if !input.exists() {
            return Err(Error::file_not_found(input));
        }

        let mut cmd = ToolCommand::new(self.program.clone());
        cmd.args(["-hide_banner", "-nostdin", "-y", "-i"])
            .arg(input)
            .args(output_args.iter().copied())
            .arg(output)
            .timeout(self.timeout);

        if let Err(e) = cmd.execute().await {
            let _ = std::fs::remove_file(output);
            return Err(e);
        }

        match std::fs::metadata(output) {
            Ok(meta) if meta.len() > 0 => Ok(()),
            _ => {
                let _ = std::fs::remove_file(output);
                Err(Error::tool_failed(
                    self.program.display().to_string(),
                    format!("produced no output at {}", output.display()),
                ))
            }
        }
    }
}

impl Default for Ffmpeg {
    fn default() -> Self {
        Self::new(crate::tools::FFMPEG)
    }
}
