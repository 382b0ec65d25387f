//! Publishing converted files for download.

use bytes::Bytes;
use formatfusion_av::TargetFormat;
use std::path::Path;

/// Stem used when the original name has none.
const FALLBACK_STEM: &str = "converted";

/// A finished conversion, held in memory.
#[derive(Debug, Clone)]
pub struct TranscodedAsset {
    pub bytes: Bytes,
    /// Suggested name for the download, `<original stem>.<target extension>`.
    pub file_name: String,
    pub target: TargetFormat,
}

impl TranscodedAsset {
    pub fn content_type(&self) -> &'static str {
        self.target.content_type()
    }

    /// Value for a `Content-Disposition` header offering this file as a download.
    pub fn content_disposition(&self) -> String {
        content_disposition(&self.file_name)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Download name for a conversion of `original` into `target`.
///
/// Only the last extension of the original name is replaced, whatever its
/// case; the new extension is always the canonical lower-case one. Dots
/// inside the stem are kept, so `my.photo.png` becomes `my.photo.jpg`
/// rather than being cut at the first dot.
pub fn download_file_name(original: &str, target: TargetFormat) -> String {
    let stem = Path::new(original)
        .file_stem()
        .map(|s| s.to_string_lossy().trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| FALLBACK_STEM.to_string());

    format!("{}.{}", stem, target.extension())
}

/// Build an `attachment` disposition with an ASCII fallback and an RFC 5987
/// UTF-8 name.
pub fn content_disposition(file_name: &str) -> String {
    let ascii: String = file_name
        .chars()
        .map(|c| match c {
            ' '..='~' if c != '"' && c != '\\' => c,
            _ => '_',
        })
        .collect();

    if ascii == file_name {
        format!("attachment; filename=\"{}\"", ascii)
    } else {
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            ascii,
            percent_encode(file_name)
        )
    }
}

fn percent_encode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use formatfusion_av::{AudioTarget, ImageTarget, MediaKind, VideoTarget};

    #[test]
    fn test_download_name_replaces_extension() {
        let png = TargetFormat::Image(ImageTarget::Png);
        assert_eq!(download_file_name("photo.jpg", png), "photo.png");
        assert_eq!(download_file_name("photo.JPG", png), "photo.png");
        assert_eq!(download_file_name("photo.JpEg", png), "photo.png");
    }

    #[test]
    fn test_download_name_keeps_dots_in_stem() {
        let jpg = TargetFormat::Image(ImageTarget::Jpg);
        assert_eq!(download_file_name("my.photo.png", jpg), "my.photo.jpg");
    }

    #[test]
    fn test_download_name_for_every_target() {
        for kind in MediaKind::all() {
            for target in kind.targets() {
                let name = download_file_name("Input.File.XYZ", target);
                assert_eq!(name, format!("Input.File.{}", target.extension()));
            }
        }
    }

    #[test]
    fn test_download_name_edge_cases() {
        let webm = TargetFormat::Video(VideoTarget::Webm);
        assert_eq!(download_file_name("clip", webm), "clip.webm");
        assert_eq!(download_file_name("", webm), "converted.webm");

        let mp3 = TargetFormat::Audio(AudioTarget::Mp3);
        assert_eq!(download_file_name("my song.wav", mp3), "my song.mp3");
    }

    #[test]
    fn test_content_disposition_ascii() {
        assert_eq!(
            content_disposition("photo.png"),
            "attachment; filename=\"photo.png\""
        );
    }

    #[test]
    fn test_content_disposition_escapes() {
        let value = content_disposition("café \"quoted\".mp3");
        assert!(value.starts_with("attachment; filename=\"caf_ _quoted_.mp3\""));
        assert!(value.contains("filename*=UTF-8''caf%C3%A9%20%22quoted%22.mp3"));
    }

    #[test]
    fn test_asset_content_type() {
        let asset = TranscodedAsset {
            bytes: Bytes::from_static(b"data"),
            file_name: "a.ogg".to_string(),
            target: TargetFormat::Audio(AudioTarget::Ogg),
        };
        assert_eq!(asset.content_type(), "audio/ogg");
        assert_eq!(asset.len(), 4);
        assert!(!asset.is_empty());
    }
}
