//! Media kinds and the target formats each kind can be converted to.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// The three families of media the converter handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
}

impl MediaKind {
    /// All media kinds, in display order.
    pub fn all() -> &'static [MediaKind] {
        &[MediaKind::Image, MediaKind::Video, MediaKind::Audio]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
        }
    }

    /// File extensions accepted for uploads of this kind.
    ///
    /// Image uploads do not include `webp` even though it is a valid target.
    pub fn upload_extensions(&self) -> &'static [&'static str] {
        match self {
            MediaKind::Image => &["png", "jpg", "jpeg", "tiff", "tif", "bmp"],
            MediaKind::Video => &["mp4", "webm", "ogg", "mov", "avi"],
            MediaKind::Audio => &["mp3", "wav", "ogg", "flac", "m4a"],
        }
    }

    /// Target formats offered for this kind.
    pub fn targets(&self) -> Vec<TargetFormat> {
        match self {
            MediaKind::Image => ImageTarget::ALL.iter().copied().map(TargetFormat::Image).collect(),
            MediaKind::Video => VideoTarget::ALL.iter().copied().map(TargetFormat::Video).collect(),
            MediaKind::Audio => AudioTarget::ALL.iter().copied().map(TargetFormat::Audio).collect(),
        }
    }

    /// Whether a filename passes this kind's upload extension filter.
    ///
    /// Only the extension is checked; contents are not sniffed.
    pub fn accepts_upload(&self, filename: &str) -> bool {
        match extension_of(filename) {
            Some(ext) => self.upload_extensions().contains(&ext.as_str()),
            None => false,
        }
    }

    /// Guess the kind from a file extension.
    ///
    /// `ogg` is accepted by both audio and video; it resolves to audio.
    pub fn from_extension(ext: &str) -> Option<MediaKind> {
        let ext = ext.to_ascii_lowercase();
        [MediaKind::Image, MediaKind::Audio, MediaKind::Video]
            .into_iter()
            .find(|kind| kind.upload_extensions().contains(&ext.as_str()))
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "image" => Ok(MediaKind::Image),
            "video" => Ok(MediaKind::Video),
            "audio" => Ok(MediaKind::Audio),
            other => Err(Error::InvalidInput(format!("unknown media kind: {other}"))),
        }
    }
}

/// Raster image output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageTarget {
    Png,
    Jpg,
    Jpeg,
    Tiff,
    Tif,
    Bmp,
    Webp,
}

impl ImageTarget {
    pub const ALL: [ImageTarget; 7] = [
        ImageTarget::Png,
        ImageTarget::Jpg,
        ImageTarget::Jpeg,
        ImageTarget::Tiff,
        ImageTarget::Tif,
        ImageTarget::Bmp,
        ImageTarget::Webp,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            ImageTarget::Png => "png",
            ImageTarget::Jpg => "jpg",
            ImageTarget::Jpeg => "jpeg",
            ImageTarget::Tiff => "tiff",
            ImageTarget::Tif => "tif",
            ImageTarget::Bmp => "bmp",
            ImageTarget::Webp => "webp",
        }
    }

    /// The encoder used for this target.
    pub fn image_format(&self) -> image::ImageFormat {
        match self {
            ImageTarget::Png => image::ImageFormat::Png,
            ImageTarget::Jpg | ImageTarget::Jpeg => image::ImageFormat::Jpeg,
            ImageTarget::Tiff | ImageTarget::Tif => image::ImageFormat::Tiff,
            ImageTarget::Bmp => image::ImageFormat::Bmp,
            ImageTarget::Webp => image::ImageFormat::WebP,
        }
    }

    /// Whether the output can carry an alpha channel.
    pub fn supports_alpha(&self) -> bool {
        !matches!(self, ImageTarget::Jpg | ImageTarget::Jpeg)
    }

    /// Whether the encoder only takes 8-bit samples.
    pub fn requires_8bit(&self) -> bool {
        matches!(
            self,
            ImageTarget::Jpg | ImageTarget::Jpeg | ImageTarget::Bmp | ImageTarget::Webp
        )
    }

    fn content_type(&self) -> &'static str {
        match self {
            ImageTarget::Png => "image/png",
            ImageTarget::Jpg | ImageTarget::Jpeg => "image/jpeg",
            ImageTarget::Tiff | ImageTarget::Tif => "image/tiff",
            ImageTarget::Bmp => "image/bmp",
            ImageTarget::Webp => "image/webp",
        }
    }
}

/// Video container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoTarget {
    Mp4,
    Webm,
    Ogg,
    Mov,
    Avi,
}

impl VideoTarget {
    pub const ALL: [VideoTarget; 5] = [
        VideoTarget::Mp4,
        VideoTarget::Webm,
        VideoTarget::Ogg,
        VideoTarget::Mov,
        VideoTarget::Avi,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            VideoTarget::Mp4 => "mp4",
            VideoTarget::Webm => "webm",
            VideoTarget::Ogg => "ogg",
            VideoTarget::Mov => "mov",
            VideoTarget::Avi => "avi",
        }
    }

    fn content_type(&self) -> &'static str {
        match self {
            VideoTarget::Mp4 => "video/mp4",
            VideoTarget::Webm => "video/webm",
            VideoTarget::Ogg => "video/ogg",
            VideoTarget::Mov => "video/quicktime",
            VideoTarget::Avi => "video/x-msvideo",
        }
    }
}

/// Audio output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioTarget {
    Mp3,
    Wav,
    Ogg,
    Flac,
    M4a,
}

impl AudioTarget {
    pub const ALL: [AudioTarget; 5] = [
        AudioTarget::Mp3,
        AudioTarget::Wav,
        AudioTarget::Ogg,
        AudioTarget::Flac,
        AudioTarget::M4a,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            AudioTarget::Mp3 => "mp3",
            AudioTarget::Wav => "wav",
            AudioTarget::Ogg => "ogg",
            AudioTarget::Flac => "flac",
            AudioTarget::M4a => "m4a",
        }
    }

    /// The ffmpeg muxer (`-f`) for this target.
    ///
    /// ffmpeg has no muxer named `m4a`; the `ipod` muxer writes M4A files.
    pub fn muxer(&self) -> &'static str {
        match self {
            AudioTarget::Mp3 => "mp3",
            AudioTarget::Wav => "wav",
            AudioTarget::Ogg => "ogg",
            AudioTarget::Flac => "flac",
            AudioTarget::M4a => "ipod",
        }
    }

    fn content_type(&self) -> &'static str {
        match self {
            AudioTarget::Mp3 => "audio/mpeg",
            AudioTarget::Wav => "audio/wav",
            AudioTarget::Ogg => "audio/ogg",
            AudioTarget::Flac => "audio/flac",
            AudioTarget::M4a => "audio/mp4",
        }
    }
}

/// A conversion target, tagged by media kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetFormat {
    Image(ImageTarget),
    Video(VideoTarget),
    Audio(AudioTarget),
}

impl TargetFormat {
    /// Parse a format name offered for `kind`. Case-insensitive, leading dot allowed.
    pub fn parse(kind: MediaKind, name: &str) -> Result<Self> {
        let wanted = name.trim().trim_start_matches('.').to_ascii_lowercase();
        kind.targets()
            .into_iter()
            .find(|target| target.extension() == wanted)
            .ok_or_else(|| Error::unsupported_format(kind, name.trim()))
    }

    pub fn kind(&self) -> MediaKind {
        match self {
            TargetFormat::Image(_) => MediaKind::Image,
            TargetFormat::Video(_) => MediaKind::Video,
            TargetFormat::Audio(_) => MediaKind::Audio,
        }
    }

    /// Lower-case file extension written for this target.
    pub fn extension(&self) -> &'static str {
        match self {
            TargetFormat::Image(t) => t.extension(),
            TargetFormat::Video(t) => t.extension(),
            TargetFormat::Audio(t) => t.extension(),
        }
    }

    /// MIME type implied by the extension.
    pub fn content_type(&self) -> &'static str {
        match self {
            TargetFormat::Image(t) => t.content_type(),
            TargetFormat::Video(t) => t.content_type(),
            TargetFormat::Audio(t) => t.content_type(),
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl Serialize for TargetFormat {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.extension())
    }
}

/// Lower-cased extension of a filename, if it has one.
pub fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target_case_insensitive() {
        let target = TargetFormat::parse(MediaKind::Image, "JPG").unwrap();
        assert_eq!(target, TargetFormat::Image(ImageTarget::Jpg));
        assert_eq!(target.extension(), "jpg");

        let target = TargetFormat::parse(MediaKind::Audio, ".m4a").unwrap();
        assert_eq!(target, TargetFormat::Audio(AudioTarget::M4a));
    }

    #[test]
    fn test_parse_target_wrong_kind() {
        let err = TargetFormat::parse(MediaKind::Image, "mp4").unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { .. }));
        assert!(TargetFormat::parse(MediaKind::Video, "mp3").is_err());
    }

    #[test]
    fn test_ogg_belongs_to_video_and_audio() {
        assert_eq!(
            TargetFormat::parse(MediaKind::Video, "ogg").unwrap(),
            TargetFormat::Video(VideoTarget::Ogg)
        );
        assert_eq!(
            TargetFormat::parse(MediaKind::Audio, "ogg").unwrap(),
            TargetFormat::Audio(AudioTarget::Ogg)
        );
        assert_eq!(MediaKind::from_extension("OGG"), Some(MediaKind::Audio));
        assert_eq!(MediaKind::from_extension("mov"), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_extension("gif"), None);
    }

    #[test]
    fn test_upload_filter() {
        assert!(MediaKind::Image.accepts_upload("holiday.PNG"));
        assert!(MediaKind::Image.accepts_upload("scan.tif"));
        assert!(!MediaKind::Image.accepts_upload("sticker.webp"));
        assert!(!MediaKind::Image.accepts_upload("noextension"));
        assert!(MediaKind::Audio.accepts_upload("song.m4a"));
        assert!(!MediaKind::Audio.accepts_upload("clip.mp4"));
    }

    #[test]
    fn test_alpha_and_depth_rules() {
        assert!(!ImageTarget::Jpeg.supports_alpha());
        assert!(ImageTarget::Png.supports_alpha());
        assert!(ImageTarget::Webp.requires_8bit());
        assert!(!ImageTarget::Tiff.requires_8bit());
    }

    #[test]
    fn test_content_types() {
        assert_eq!(TargetFormat::Image(ImageTarget::Tif).content_type(), "image/tiff");
        assert_eq!(TargetFormat::Video(VideoTarget::Mov).content_type(), "video/quicktime");
        assert_eq!(TargetFormat::Audio(AudioTarget::Mp3).content_type(), "audio/mpeg");
    }

    #[test]
    fn test_target_lists() {
        assert_eq!(MediaKind::Image.targets().len(), 7);
        assert_eq!(MediaKind::Video.targets().len(), 5);
        assert_eq!(MediaKind::Audio.targets().len(), 5);
        assert!(MediaKind::Video
            .targets()
            .iter()
            .all(|t| t.kind() == MediaKind::Video));
    }
}
