//! Error types for formatfusion-av.

use std::path::PathBuf;
use std::time::Duration;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while receiving, converting or probing media.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required external tool is not available.
    #[error("tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// An external tool ran but reported failure.
    #[error("tool execution failed: {tool}: {message}")]
    ToolFailed { tool: String, message: String },

    /// An external tool did not finish within its time limit.
    #[error("tool timed out: {tool} after {timeout:?}")]
    Timeout { tool: String, timeout: Duration },

    /// Failed to parse tool output.
    #[error("failed to parse {tool} output: {message}")]
    ParseError { tool: String, message: String },

    /// The specified file was not found.
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// The input could not be decoded.
    #[error("failed to decode {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },

    /// The encoder rejected the requested format or color mode.
    #[error("failed to encode {format}: {message}")]
    Encode { format: String, message: String },

    /// A format name that is not accepted for the given media kind.
    #[error("unsupported {kind} format: {format}")]
    UnsupportedFormat { kind: String, format: String },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Workspace error.
    #[error("workspace error: {0}")]
    Workspace(String),
}

impl Error {
    /// Create a tool not found error.
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    /// Create a tool execution failed error.
    pub fn tool_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a parse error.
    pub fn parse_error(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a decode error.
    pub fn decode(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Decode {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Create an encode error.
    pub fn encode(format: impl Into<String>, message: impl ToString) -> Self {
        Self::Encode {
            format: format.into(),
            message: message.to_string(),
        }
    }

    /// Create an unsupported format error.
    pub fn unsupported_format(kind: impl ToString, format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            kind: kind.to_string(),
            format: format.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::unsupported_format("image", "gif");
        assert_eq!(err.to_string(), "unsupported image format: gif");

        let err = Error::tool_failed("ffmpeg", "exited with status 1");
        assert_eq!(
            err.to_string(),
            "tool execution failed: ffmpeg: exited with status 1"
        );
    }
}
