//! Raster image conversion and inspection using the `image` crate.

use crate::format::ImageTarget;
use crate::{Error, Result};
use image::{ColorType, DynamicImage, ImageDecoder, ImageReader};
use serde::Serialize;
use std::path::Path;

/// Facts about an image, for display next to an upload or a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    /// Detected container format, e.g. `png`.
    pub format: Option<String>,
    /// Color mode, e.g. `rgba8`.
    pub color: String,
    /// Embedded metadata blocks found in the file.
    pub metadata: ImageMetadata,
}

/// Sizes of embedded metadata blocks, in bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImageMetadata {
    pub icc_profile: Option<usize>,
    pub exif: Option<usize>,
}

/// Read dimensions, format, color mode and embedded metadata without a full decode.
pub fn inspect_image(path: &Path) -> Result<ImageInfo> {
    let reader = open_reader(path)?;
    let format = reader
        .format()
        .and_then(|f| f.extensions_str().first().copied())
        .map(str::to_string);

    let mut decoder = reader.into_decoder().map_err(|e| Error::decode(path, e))?;
    let (width, height) = decoder.dimensions();
    let color = color_name(decoder.color_type());

    // A decoder that cannot read a block reports no metadata rather than failing.
    let metadata = ImageMetadata {
        icc_profile: decoder.icc_profile().ok().flatten().map(|b| b.len()),
        exif: decoder.exif_metadata().ok().flatten().map(|b| b.len()),
    };

    Ok(ImageInfo {
        width,
        height,
        format,
        color,
        metadata,
    })
}

/// Decode `input` and re-encode it into `target` at `output`.
///
/// Alpha is dropped for targets that cannot carry it, and high bit-depth
/// samples are reduced for 8-bit-only encoders. Nothing is left at `output`
/// if decoding or encoding fails.
pub fn convert_image(input: &Path, target: ImageTarget, output: &Path) -> Result<ImageInfo> {
    let img = open_reader(input)?
        .decode()
        .map_err(|e| Error::decode(input, e))?;

    #[cfg(feature = "tracing")]
    tracing::debug!(
        input = %input.display(),
        color = ?img.color(),
        width = img.width(),
        height = img.height(),
        target = target.extension(),
        "Decoded image"
    );

    let img = prepare_for(img, target);

    if let Err(e) = img.save_with_format(output, target.image_format()) {
        let _ = std::fs::remove_file(output);
        return Err(match e {
            image::ImageError::IoError(io) => Error::Io(io),
            other => Error::encode(target.extension(), other),
        });
    }

    Ok(ImageInfo {
        width: img.width(),
        height: img.height(),
        format: Some(target.extension().to_string()),
        color: color_name(img.color()),
        metadata: ImageMetadata::default(),
    })
}

fn open_reader(path: &Path) -> Result<ImageReader<std::io::BufReader<std::fs::File>>> {
    let reader = ImageReader::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::file_not_found(path)
        } else {
            Error::Io(e)
        }
    })?;
    reader.with_guessed_format().map_err(Error::Io)
}

/// Convert the pixel layout into one the target encoder accepts.
fn prepare_for(img: DynamicImage, target: ImageTarget) -> DynamicImage {
    let color = img.color();
    let has_alpha = color.has_alpha();

    if !target.supports_alpha() {
        return match color {
            ColorType::L8 | ColorType::Rgb8 => img,
            ColorType::La8 | ColorType::L16 | ColorType::La16 => {
                DynamicImage::ImageLuma8(img.to_luma8())
            }
            _ => DynamicImage::ImageRgb8(img.to_rgb8()),
        };
    }

    let is_8bit = matches!(
        color,
        ColorType::L8 | ColorType::La8 | ColorType::Rgb8 | ColorType::Rgba8
    );
    let is_float = matches!(color, ColorType::Rgb32F | ColorType::Rgba32F);

    let tiff = matches!(target, ImageTarget::Tiff | ImageTarget::Tif);

    // The TIFF encoder has no gray+alpha layouts.
    if tiff {
        match color {
            ColorType::La8 => return DynamicImage::ImageRgba8(img.to_rgba8()),
            ColorType::La16 => return DynamicImage::ImageRgba16(img.to_rgba16()),
            _ => {}
        }
    }

    if (target.requires_8bit() && !is_8bit) || (is_float && !tiff) {
        if has_alpha {
            DynamicImage::ImageRgba8(img.to_rgba8())
        } else {
            DynamicImage::ImageRgb8(img.to_rgb8())
        }
    } else {
        img
    }
}

fn color_name(color: ColorType) -> String {
    match color {
        ColorType::L8 => "l8",
        ColorType::La8 => "la8",
        ColorType::Rgb8 => "rgb8",
        ColorType::Rgba8 => "rgba8",
        ColorType::L16 => "l16",
        ColorType::La16 => "la16",
        ColorType::Rgb16 => "rgb16",
        ColorType::Rgba16 => "rgba16",
        ColorType::Rgb32F => "rgb32f",
        ColorType::Rgba32F => "rgba32f",
        _ => "unknown",
    }
    .to_string()
}
