use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub conversion: ConversionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Prebuilt front-end to serve at `/`
    #[serde(default)]
    pub static_dir: Option<PathBuf>,

    /// Largest accepted upload, in megabytes
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: u64,

    /// Seconds an unconverted upload is kept before it is discarded
    #[serde(default = "default_upload_ttl")]
    pub upload_ttl_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_max_upload_mb() -> u64 {
    200
}
fn default_upload_ttl() -> u64 {
    3600
}

impl ServerConfig {
    pub fn max_upload_bytes(&self) -> usize {
        usize::try_from(self.max_upload_mb.saturating_mul(1024 * 1024)).unwrap_or(usize::MAX)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
            max_upload_mb: default_max_upload_mb(),
            upload_ttl_secs: default_upload_ttl(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConversionConfig {
    /// Parent directory for upload and output workspaces (system temp dir if unset)
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,

    /// Kill a video transcode after this many seconds (unset = no limit)
    #[serde(default)]
    pub video_timeout_secs: Option<u64>,

    /// Kill an audio transcode after this many seconds (unset = no limit)
    #[serde(default)]
    pub audio_timeout_secs: Option<u64>,
}

impl ConversionConfig {
    pub fn video_timeout(&self) -> Option<Duration> {
        self.video_timeout_secs.map(Duration::from_secs)
    }

    pub fn audio_timeout(&self) -> Option<Duration> {
        self.audio_timeout_secs.map(Duration::from_secs)
    }
}
