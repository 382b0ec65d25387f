//! FFprobe-based media probing.

use crate::command::ToolCommand;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    format_name: String,
    duration: Option<String>,
    size: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    index: u32,
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    channels: Option<u32>,
    sample_rate: Option<String>,
}

/// Summary of a video or audio file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaSummary {
    pub file_path: PathBuf,
    /// ffprobe's container name list, e.g. `mov,mp4,m4a,3gp,3g2,mj2`.
    pub container: String,
    pub duration: Option<Duration>,
    pub file_size: u64,
    pub streams: Vec<StreamSummary>,
}

impl MediaSummary {
    pub fn video_streams(&self) -> impl Iterator<Item = &StreamSummary> {
        self.streams.iter().filter(|s| s.kind == "video")
    }

    pub fn audio_streams(&self) -> impl Iterator<Item = &StreamSummary> {
        self.streams.iter().filter(|s| s.kind == "audio")
    }
}

/// One stream inside a probed file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamSummary {
    pub index: u32,
    /// `video`, `audio`, `subtitle`, `data` or `unknown`.
    pub kind: String,
    pub codec: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub channels: Option<u32>,
    pub sample_rate: Option<u32>,
}

/// Probe a media file using ffprobe.
pub async fn probe_with_ffprobe(ffprobe: &Path, path: &Path) -> Result<MediaSummary> {
    if !path.exists() {
        return Err(Error::file_not_found(path));
    }

    let output = ToolCommand::new(ffprobe.to_path_buf())
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .execute()
        .await?;

    parse_ffprobe_json(path, &output.stdout)
}

fn parse_ffprobe_json(path: &Path, json: &str) -> Result<MediaSummary> {
    let output: FfprobeOutput = serde_json::from_str(json)
        .map_err(|e| Error::parse_error("ffprobe", e.to_string()))?;

    let duration = output
        .format
        .duration
        .and_then(|s| s.parse::<f64>().ok())
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok());

    let streams = output
        .streams
        .into_iter()
        .map(|stream| StreamSummary {
            index: stream.index,
            kind: stream.codec_type.unwrap_or_else(|| "unknown".to_string()),
            codec: stream.codec_name,
            width: stream.width,
            height: stream.height,
            channels: stream.channels,
            sample_rate: stream.sample_rate.and_then(|s| s.parse().ok()),
        })
        .collect();

    Ok(MediaSummary {
        file_path: path.to_path_buf(),
        container: output.format.format_name,
        duration,
        file_size: output.format.size.and_then(|s| s.parse().ok()).unwrap_or(0),
        streams,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "streams": [
            {"index": 0, "codec_type": "video", "codec_name": "vp9", "width": 64, "height": 48},
            {"index": 1, "codec_type": "audio", "codec_name": "opus", "channels": 2, "sample_rate": "48000"}
        ],
        "format": {
            "filename": "clip.webm",
            "format_name": "matroska,webm",
            "duration": "1.001000",
            "size": "4096"
        }
    }"#;

    #[test]
    fn test_parse_ffprobe_json() {
        let summary = parse_ffprobe_json(Path::new("clip.webm"), SAMPLE).unwrap();
        assert_eq!(summary.container, "matroska,webm");
        assert_eq!(summary.file_size, 4096);
        assert_eq!(summary.duration, Some(Duration::from_secs_f64(1.001)));
        assert_eq!(summary.video_streams().count(), 1);

        let audio = summary.audio_streams().next().unwrap();
        assert_eq!(audio.codec.as_deref(), Some("opus"));
        assert_eq!(audio.sample_rate, Some(48000));
        assert_eq!(audio.channels, Some(2));
    }

    #[test]
    fn test_parse_without_duration() {
        let json = r#"{"format": {"format_name": "image2"}, "streams": []}"#;
        let summary = parse_ffprobe_json(Path::new("x.png"), json).unwrap();
        assert_eq!(summary.duration, None);
        assert_eq!(summary.file_size, 0);
        assert!(summary.streams.is_empty());
    }

    #[test]
    fn test_out_of_range_duration_is_dropped() {
        for duration in ["1e30", "-5.0", "NaN", "inf"] {
            let json = format!(
                r#"{{"format": {{"format_name": "mp3", "duration": "{duration}"}}, "streams": []}}"#
            );
            let summary = parse_ffprobe_json(Path::new("x.mp3"), &json).unwrap();
            assert_eq!(summary.duration, None, "{duration}");
        }
    }

    #[test]
    fn test_parse_garbage() {
        let err = parse_ffprobe_json(Path::new("x"), "not json").unwrap_err();
        assert!(matches!(err, Error::ParseError { .. }));
    }

    #[tokio::test]
    async fn test_probe_missing_file() {
        let err = probe_with_ffprobe(Path::new("ffprobe"), Path::new("/no/such/file.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }
}
