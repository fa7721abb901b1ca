//! CLI image helpers.
//!
//! Normalizes extensions, loads RGBA buffers, rejects lossy inputs, and
//! writes files with the appropriate lossless encoder.
use std::fs::File;
use std::io::{Error, ErrorKind};
use std::path::Path;

use image::codecs::bmp::BmpEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::tiff::TiffEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};

use super::AppError;

/// Extensions whose containers discard low-order bits on save.
const LOSSY_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "jpe", "avif"];

/// Normalizes the extension of a path to lowercase.
pub(super) fn normalized_extension(path: impl AsRef<Path>) -> Option<String>
{
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

/// Loads an image from the specified path and converts it to an RGBA
/// buffer.
///
/// # Errors
///
/// Returns:
/// * [`AppError::Read`] when the path is a directory
/// * [`AppError::LossyInput`] when the extension names a lossy container
/// * [`AppError::ImageOpen`] when the image cannot be loaded
pub(super) fn load_image(path: impl AsRef<Path>) -> Result<RgbaImage, AppError>
{
    let path = path.as_ref();
    if path.is_dir()
    {
        let message = format!("{} is a directory", path.display());
        return Err(AppError::Read {
            path: path.into(),
            source: Error::new(ErrorKind::IsADirectory, message),
        });
    }

    if let Some(extension) = normalized_extension(path)
    {
        if LOSSY_EXTENSIONS.contains(&extension.as_str())
        {
            return Err(AppError::LossyInput {
                extension: extension.into(),
            });
        }
    }

    image::open(path)
        .map_err(|source| AppError::ImageOpen {
            path: path.into(),
            source,
        })
        .map(DynamicImage::into_rgba8)
}

/// Writes the provided image using the encoder defined by the extension.
///
/// Supported extensions: png, bmp, tiff/tif, webp.
///
/// # Errors
///
/// Returns:
/// * [`AppError::Write`] when the file cannot be created
/// * [`AppError::ImageEncode`] when the image cannot be encoded
/// * [`AppError::UnsupportedFormat`] when the extension is not supported
pub(super) fn write_image(
    image: &RgbaImage,
    extension: Option<&str>,
    output: impl AsRef<Path>,
) -> Result<(), AppError>
{
    let mut file =
        File::create(output.as_ref()).map_err(|source| AppError::Write {
            path: output.as_ref().into(),
            source,
        })?;

    match extension
    {
        Some(ext @ "png") =>
        {
            let encoder = PngEncoder::new_with_quality(
                &mut file,
                CompressionType::Default,
                FilterType::Adaptive,
            );
            encoder
                .write_image(
                    image.as_raw(),
                    image.width(),
                    image.height(),
                    ExtendedColorType::Rgba8,
                )
                .map_err(|source| AppError::ImageEncode {
                    path: output.as_ref().into(),
                    target_format: ext.into(),
                    source,
                })?;
        },
        Some(ext @ "bmp") =>
        {
            let mut encoder = BmpEncoder::new(&mut file);
            encoder
                .encode(
                    image.as_raw(),
                    image.width(),
                    image.height(),
                    ExtendedColorType::Rgba8,
                )
                .map_err(|source| AppError::ImageEncode {
                    path: output.as_ref().into(),
                    target_format: ext.into(),
                    source,
                })?;
        },
        Some(ext @ ("tiff" | "tif")) =>
        {
            let encoder = TiffEncoder::new(&mut file);
            encoder
                .write_image(
                    image.as_raw(),
                    image.width(),
                    image.height(),
                    ExtendedColorType::Rgba8,
                )
                .map_err(|source| AppError::ImageEncode {
                    path: output.as_ref().into(),
                    target_format: ext.into(),
                    source,
                })?;
        },
        Some(ext @ "webp") =>
        {
            let encoder = WebPEncoder::new_lossless(&mut file);
            encoder
                .write_image(
                    image.as_raw(),
                    image.width(),
                    image.height(),
                    ExtendedColorType::Rgba8,
                )
                .map_err(|source| AppError::ImageEncode {
                    path: output.as_ref().into(),
                    target_format: ext.into(),
                    source,
                })?;
        },
        _ =>
        {
            let extension = extension.unwrap_or("<unknown>").into();
            return Err(AppError::UnsupportedFormat { extension });
        },
    }

    Ok(())
}
