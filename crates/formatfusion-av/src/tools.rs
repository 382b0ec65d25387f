//! External tool detection and management.

use crate::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Name of the transcoding executable.
pub const FFMPEG: &str = "ffmpeg";

/// Name of the probing executable.
pub const FFPROBE: &str = "ffprobe";

/// Information about an external tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    /// Name of the tool.
    pub name: String,
    /// Whether the tool is available.
    pub available: bool,
    /// Version string if available.
    pub version: Option<String>,
    /// Path to the tool executable.
    pub path: Option<PathBuf>,
}

/// Check a tool at an explicit program path.
///
/// ffmpeg-family tools take `-version` rather than `--version`.
pub fn check_tool_at(name: &str, program: &Path) -> ToolInfo {
    let result = Command::new(program).arg("-version").output();

    match result {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .map(|s| s.to_string());

            let path = which::which(program).ok();

            ToolInfo {
                name: name.to_string(),
                available: true,
                version,
                path,
            }
        }
        _ => ToolInfo {
            name: name.to_string(),
            available: false,
            version: None,
            path: None,
        },
    }
}

/// Check ffmpeg and ffprobe, honouring configured paths.
///
/// # Example
///
/// ```no_run
/// use formatfusion_av::check_tools;
///
/// for tool in check_tools(None, None) {
///     println!("{}: {:?}", tool.name, tool.version);
/// }
/// ```
pub fn check_tools(ffmpeg: Option<&Path>, ffprobe: Option<&Path>) -> Vec<ToolInfo> {
    vec![
        check_tool_at(FFMPEG, &resolve_tool_path(FFMPEG, ffmpeg)),
        check_tool_at(FFPROBE, &resolve_tool_path(FFPROBE, ffprobe)),
    ]
}

/// Require that a tool is available, returning its path.
///
/// # Errors
///
/// Returns an error if the tool is not found.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::tool_not_found(name))
}

/// Get the path to a tool, preferring a configured path over PATH lookup.
pub fn get_tool_path(name: &str, config_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = config_path {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
    }

    require_tool(name)
}

/// The program to launch for `name`.
///
/// Like [`get_tool_path`], but never fails: when the tool cannot be found
/// the configured path (or the bare name) is returned, so running it later
/// reports [`Error::ToolNotFound`].
pub fn resolve_tool_path(name: &str, config_path: Option<&Path>) -> PathBuf {
    get_tool_path(name, config_path).unwrap_or_else(|_| {
        config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(name))
    })
}
