//! The receive → transcode → publish pipeline.
//!
//! A conversion is two explicit steps: [`Converter::receive`] stores an
//! upload and returns an [`Upload`] handle, then [`Converter::transcode`]
//! turns that handle and a [`TargetFormat`] into a [`TranscodedAsset`].
//! Every temporary file is owned by a value and removed with it.

mod publish;
mod upload;

pub use publish::{content_disposition, download_file_name, TranscodedAsset};
pub use upload::{receive, Upload, UploadRecord};

use crate::config::Config;
use bytes::Bytes;
use formatfusion_av::tools::{resolve_tool_path, FFMPEG, FFPROBE};
use formatfusion_av::{
    convert_image, inspect_image, transcode_audio, transcode_video, Error, Ffmpeg, ImageInfo,
    MediaKind, MediaSummary, Result, TargetFormat, Workspace,
};
use std::path::{Path, PathBuf};

/// Runs conversions with the tools and limits from the configuration.
#[derive(Debug, Clone)]
pub struct Converter {
    video: Ffmpeg,
    audio: Ffmpeg,
    ffprobe: PathBuf,
    temp_root: Option<PathBuf>,
}

impl Converter {
    pub fn new(config: &Config) -> Self {
        // A configured path that does not exist falls back to PATH lookup.
        let ffmpeg = resolve_tool_path(FFMPEG, config.tools.ffmpeg_path.as_deref());

        Self {
            video: Ffmpeg::new(ffmpeg.clone()).with_timeout(config.conversion.video_timeout()),
            audio: Ffmpeg::new(ffmpeg).with_timeout(config.conversion.audio_timeout()),
            ffprobe: resolve_tool_path(FFPROBE, config.tools.ffprobe_path.as_deref()),
            temp_root: config.conversion.temp_dir.clone(),
        }
    }

    pub fn ffmpeg_path(&self) -> &Path {
        self.video.program()
    }

    pub fn ffprobe_path(&self) -> &Path {
        &self.ffprobe
    }

    /// Store an upload of `kind` so it can be transcoded.
    pub fn receive(&self, kind: MediaKind, filename: &str, data: &[u8]) -> Result<Upload> {
        receive(kind, filename, data, self.temp_root.as_deref())
    }

    /// Describe an uploaded image. Returns `None` for other kinds.
    pub async fn inspect(&self, upload: &Upload) -> Result<Option<ImageInfo>> {
        if upload.kind() != MediaKind::Image {
            return Ok(None);
        }

        let path = upload.path().to_path_buf();
        let info = tokio::task::spawn_blocking(move || inspect_image(&path))
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e)))??;
        Ok(Some(info))
    }

    /// Summarise a video or audio file with ffprobe.
    pub async fn probe(&self, path: &Path) -> Result<MediaSummary> {
        formatfusion_av::probe_with_ffprobe(&self.ffprobe, path).await
    }

    /// Convert an upload into `target` and load the result into memory.
    ///
    /// The output is written into a fresh workspace that is removed as soon
    /// as its bytes have been read; the upload itself is left untouched so it
    /// can be converted again.
    pub async fn transcode(&self, upload: &Upload, target: TargetFormat) -> Result<TranscodedAsset> {
        if target.kind() != upload.kind() {
            return Err(Error::unsupported_format(upload.kind(), target.extension()));
        }

        let bytes = self.transcode_file(upload.path(), target).await?;
        let file_name = download_file_name(upload.filename(), target);

        tracing::info!(
            upload_id = %upload.id(),
            target = %target,
            download = %file_name,
            size_bytes = bytes.len(),
            "Conversion complete"
        );

        Ok(TranscodedAsset {
            bytes,
            file_name,
            target,
        })
    }

    /// Convert the file at `input` into `target`, returning the output bytes.
    pub async fn transcode_file(&self, input: &Path, target: TargetFormat) -> Result<Bytes> {
        let workspace = Workspace::create(self.temp_root.as_deref())?;
        let output = workspace.temp_file(&format!("output.{}", target.extension()));

        match target {
            TargetFormat::Image(image_target) => {
                let input = input.to_path_buf();
                let out = output.clone();
                tokio::task::spawn_blocking(move || convert_image(&input, image_target, &out))
                    .await
                    .map_err(|e| Error::Io(std::io::Error::other(e)))??;
            }
            TargetFormat::Video(video_target) => {
                transcode_video(&self.video, input, video_target, &output).await?;
            }
            TargetFormat::Audio(audio_target) => {
                transcode_audio(&self.audio, input, audio_target, &output).await?;
            }
        }

        let bytes = tokio::fs::read(&output).await?;

        if let Err(e) = workspace.cleanup() {
            tracing::warn!("Failed to remove conversion workspace: {}", e);
        }

        Ok(Bytes::from(bytes))
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}
