//! Video transcoding through the ffmpeg executable.

use crate::ffmpeg::Ffmpeg;
use crate::format::VideoTarget;
use crate::Result;
use std::path::Path;

/// Transcode `input` into the container implied by `target`, writing `output`.
///
/// No codec, bitrate or resolution flags are passed; ffmpeg picks its
/// defaults for the container named by the output extension. The output path
/// must therefore end in `target`'s extension.
pub async fn transcode_video(
    ffmpeg: &Ffmpeg,
    input: &Path,
    target: VideoTarget,
    output: &Path,
) -> Result<()> {
    #[cfg(feature = "tracing")]
    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        target = target.extension(),
        "Transcoding video"
    );

    debug_assert_eq!(
        output.extension().and_then(|e| e.to_str()),
        Some(target.extension())
    );

    ffmpeg.run(input, &[], output).await?;

    #[cfg(feature = "tracing")]
    tracing::info!(output = %output.display(), "Video transcode completed");

    Ok(())
}
