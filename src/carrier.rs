//! Byte-oriented carrier handling.
//!
//! Mirrors the hide/extract surface a hosting service exposes: callers
//! hand over encoded image bytes, this module sniffs the container
//! format, runs the codec over the decoded samples, and re-encodes in
//! the same format. Only lossless containers are accepted; a lossy
//! re-encode would not preserve the low-order bits that carry the
//! payload, so those formats are rejected up front.
//!
//! # Errors
//!
//! Returns [`CarrierError`] when decoding, embedding, extracting, or
//! re-encoding fails.
use std::io::Cursor;

use image::codecs::bmp::BmpEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::tiff::TiffEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, RgbaImage};
use thiserror::Error;

use crate::stego::{self, EmbeddingPlan, StegoError};

/// Errors that can be emitted while handling carrier bytes
#[derive(Debug, Error)]
pub enum CarrierError
{
    /// The bytes are not a decodable image
    #[error("failed to decode carrier image: {0}")]
    Decode(#[source] image::ImageError),

    /// Re-encoding the mutated image failed
    #[error("failed to encode carrier image: {0}")]
    Encode(#[source] image::ImageError),

    /// The container format discards low-order bits
    #[error(
        "{format:?} is a lossy format and cannot carry low-bit data; use \
         PNG, BMP, TIFF or lossless WebP"
    )]
    LossyFormat
    {
        format: ImageFormat
    },

    /// The container format is not supported
    #[error(
        "unsupported carrier format {format:?}; use PNG, BMP, TIFF or \
         lossless WebP"
    )]
    UnsupportedFormat
    {
        format: ImageFormat
    },

    /// A steganography error occurred
    #[error(transparent)]
    Stego(#[from] StegoError),
}

/// Hides `message` in the supplied image bytes and returns the
/// re-encoded carrier in its original container format.
///
/// # Errors
///
/// Returns [`CarrierError::Decode`] when the bytes are not a valid image,
/// [`CarrierError::LossyFormat`] / [`CarrierError::UnsupportedFormat`]
/// when the container cannot carry low-bit data, and passes through
/// [`StegoError`] failures such as an oversized payload.
pub fn hide_text(
    image_bytes: &[u8],
    message: &str,
    plan: &EmbeddingPlan,
) -> Result<Vec<u8>, CarrierError>
{
    let (mut image, format) = decode_carrier(image_bytes)?;
    stego::embed_text(&mut image, message, plan)?;

    encode_carrier(&image, format)
}

/// Recovers text previously hidden with [`hide_text`] under the same
/// plan.
///
/// # Errors
///
/// Returns [`CarrierError::Decode`] when the bytes are not a valid image
/// and passes through [`StegoError`] failures when no consistent payload
/// is found.
pub fn extract_text(
    image_bytes: &[u8],
    plan: &EmbeddingPlan,
) -> Result<String, CarrierError>
{
    let (image, _) = decode_carrier(image_bytes)?;

    Ok(stego::extract_text(&image, plan)?)
}

/// Sniffs the container format and decodes to the RGBA8 working form.
fn decode_carrier(
    image_bytes: &[u8],
) -> Result<(RgbaImage, ImageFormat), CarrierError>
{
    let format =
        image::guess_format(image_bytes).map_err(CarrierError::Decode)?;
    ensure_lossless(format)?;

    let image = image::load_from_memory_with_format(image_bytes, format)
        .map_err(CarrierError::Decode)?;

    Ok((image.into_rgba8(), format))
}

/// Rejects container formats whose compression would not preserve
/// low-order channel bits.
fn ensure_lossless(format: ImageFormat) -> Result<(), CarrierError>
{
    match format
    {
        ImageFormat::Png
        | ImageFormat::Bmp
        | ImageFormat::Tiff
        | ImageFormat::WebP => Ok(()),
        ImageFormat::Jpeg | ImageFormat::Avif =>
        {
            Err(CarrierError::LossyFormat { format })
        },
        _ => Err(CarrierError::UnsupportedFormat { format }),
    }
}

/// Re-encodes the mutated working buffer in the original container
/// format.
fn encode_carrier(
    image: &RgbaImage,
    format: ImageFormat,
) -> Result<Vec<u8>, CarrierError>
{
    let mut buffer = Cursor::new(Vec::new());

    match format
    {
        ImageFormat::Png =>
        {
            let encoder = PngEncoder::new_with_quality(
                &mut buffer,
                CompressionType::Default,
                FilterType::Adaptive,
            );
            write_rgba(encoder, image)?;
        },
        ImageFormat::Bmp =>
        {
            let mut encoder = BmpEncoder::new(&mut buffer);
            encoder
                .encode(
                    image.as_raw(),
                    image.width(),
                    image.height(),
                    ExtendedColorType::Rgba8,
                )
                .map_err(CarrierError::Encode)?;
        },
        ImageFormat::Tiff =>
        {
            let encoder = TiffEncoder::new(&mut buffer);
            write_rgba(encoder, image)?;
        },
        ImageFormat::WebP =>
        {
            let encoder = WebPEncoder::new_lossless(&mut buffer);
            write_rgba(encoder, image)?;
        },
        other => return Err(CarrierError::UnsupportedFormat { format: other }),
    }

    Ok(buffer.into_inner())
}

/// Shared encoder write path for the RGBA8 working buffer.
fn write_rgba<E: ImageEncoder>(
    encoder: E,
    image: &RgbaImage,
) -> Result<(), CarrierError>
{
    encoder
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(CarrierError::Encode)
}
