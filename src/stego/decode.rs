//! Extraction half of the codec.
//!
//! Reads the frame header out of the carrier's low bits, sanity-checks
//! the declared length before trusting it, then recovers and verifies
//! the payload.
//!
//! # Errors
//!
//! Returns [`StegoError`] when extracting text fails.
use image::RgbaImage;

use super::bits::unpack_bytes;
use super::capacity::payload_capacity;
use super::frame::{FRAME_HEADER_BYTES, declared_payload_len, parse_frame};
use super::pixels::{eligible_sample_count, eligible_samples};
use super::{EmbeddingPlan, MAX_REASONABLE_MSG_SIZE, StegoError};

/// Extracts UTF-8 text previously embedded with [`embed_text`] under the
/// same plan.
///
/// The read is stateless and never modifies the image, so repeated calls
/// against the same carrier return the same result.
///
/// # Errors
///
/// Returns [`StegoError::MissingHeader`] when the image holds too few
/// eligible bits for a frame header,
///
/// [`StegoError::UnreasonablePayloadSize`] when the decoded header
/// declares more than the supported maximum,
///
/// [`StegoError::ImplausibleLength`] when it declares more than the image
/// could carry (the usual verdict on images that never held a payload),
///
/// [`StegoError::IntegrityMismatch`] when the payload checksum disagrees
/// with the header,
///
/// [`StegoError::InvalidUtf8`] when the recovered payload is not text.
///
/// [`embed_text`]: super::embed_text
pub fn extract_text(
    image: &RgbaImage,
    plan: &EmbeddingPlan,
) -> Result<String, StegoError>
{
    let sample_count = image.as_raw().len();
    let depth = plan.bits_per_channel();

    let available_bits =
        eligible_sample_count(sample_count, plan) * usize::from(depth);
    if available_bits < FRAME_HEADER_BYTES * 8
    {
        return Err(StegoError::MissingHeader { available_bits });
    }

    let mut bit_stream =
        eligible_samples(image.as_raw(), plan).flat_map(move |channel| {
            (0..depth)
                .rev()
                .map(move |position| (channel >> position) & 1)
        });

    let mut frame = unpack_bytes(&mut bit_stream, FRAME_HEADER_BYTES)
        .ok_or(StegoError::IncompletePayload)?;

    let declared_bytes = declared_payload_len(&frame);
    if declared_bytes > MAX_REASONABLE_MSG_SIZE
    {
        return Err(StegoError::UnreasonablePayloadSize { declared_bytes });
    }

    let available_bytes = payload_capacity(sample_count, plan);
    if declared_bytes > available_bytes
    {
        return Err(StegoError::ImplausibleLength {
            declared_bytes,
            available_bytes,
        });
    }

    frame.extend(
        unpack_bytes(&mut bit_stream, declared_bytes)
            .ok_or(StegoError::IncompletePayload)?,
    );

    let payload = parse_frame(&frame)?;
    String::from_utf8(payload).map_err(StegoError::InvalidUtf8)
}
