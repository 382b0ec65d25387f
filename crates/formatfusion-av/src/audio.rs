//! Audio re-encoding through the ffmpeg executable.

use crate::ffmpeg::Ffmpeg;
use crate::format::AudioTarget;
use crate::Result;
use std::path::Path;

/// Decode `input` (format detected by ffmpeg) and re-encode it as `target`.
///
/// Video streams such as embedded cover art are dropped so that audio-only
/// containers like WAV can always be written.
pub async fn transcode_audio(
    ffmpeg: &Ffmpeg,
    input: &Path,
    target: AudioTarget,
    output: &Path,
) -> Result<()> {
    #[cfg(feature = "tracing")]
    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        target = target.extension(),
        "Transcoding audio"
    );

    ffmpeg.run(input, &audio_args(target), output).await?;

    #[cfg(feature = "tracing")]
    tracing::info!(output = %output.display(), "Audio transcode completed");

    Ok(())
}

fn audio_args(target: AudioTarget) -> [&'static str; 3] {
    ["-vn", "-f", target.muxer()]
}
