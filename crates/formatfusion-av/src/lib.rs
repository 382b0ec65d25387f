//! # formatfusion-av
//!
//! Media conversion library behind formatfusion.
//!
//! This crate provides functionality for:
//! - Describing media kinds and the formats each can be converted to
//! - Scoped temporary workspaces for uploads and outputs
//! - Re-encoding raster images with the `image` crate
//! - Transcoding video and audio through the ffmpeg executable
//! - Probing video/audio files with ffprobe
//!
//! ## Features
//!
//! - `probe` (default) - ffprobe-based probing
//! - `tracing` - Enable tracing support
//!
//! ## Example
//!
//! ```no_run
//! use formatfusion_av::{convert_image, ImageTarget, Workspace};
//!
//! let workspace = Workspace::new()?;
//! let output = workspace.temp_file("photo.jpg");
//! let info = convert_image(std::path::Path::new("photo.png"), ImageTarget::Jpg, &output)?;
//! println!("{}x{} {}", info.width, info.height, info.color);
//! # Ok::<(), formatfusion_av::Error>(())
//! ```

mod audio;
pub mod command;
mod error;
mod ffmpeg;
pub mod format;
#[cfg(feature = "probe")]
pub mod probe;
mod raster;
pub mod tools;
mod video;
pub mod workspace;

// Re-exports
pub use audio::transcode_audio;
pub use command::{ToolCommand, ToolOutput};
pub use error::{Error, Result};
pub use ffmpeg::Ffmpeg;
pub use format::{AudioTarget, ImageTarget, MediaKind, TargetFormat, VideoTarget};
#[cfg(feature = "probe")]
pub use probe::{probe_with_ffprobe, MediaSummary, StreamSummary};
pub use raster::{convert_image, inspect_image, ImageInfo, ImageMetadata};
pub use tools::{
    check_tool_at, check_tools, get_tool_path, require_tool, resolve_tool_path, ToolInfo,
};
pub use video::transcode_video;
pub use workspace::Workspace;
