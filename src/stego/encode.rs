//! Embedding half of the codec.
//!
//! Wraps the payload in its length-and-checksum frame and writes the
//! frame bits into the low bits of the eligible channel samples.
//!
//! # Errors
//!
//! Returns [`StegoError`] when embedding text fails.
use image::RgbaImage;

use super::bits::BitPacker;
use super::capacity::payload_capacity;
use super::frame::build_frame;
use super::pixels::eligible_samples_mut;
use super::{EmbeddingPlan, StegoError};

/// Embeds UTF-8 text into the low bits of the eligible channel samples of
/// the given image.
///
/// The capacity check happens before any write, so a failed call leaves
/// the image byte-for-byte untouched. Samples past the last frame bit
/// keep their original values, and the same inputs always produce the
/// same output buffer.
///
/// # Errors
///
/// Returns [`StegoError::LengthOverflow`] when the payload cannot fit in
/// the 32-bit length field or [`StegoError::CapacityExceeded`] when the
/// image lacks sufficient eligible bits.
pub fn embed_text(
    image: &mut RgbaImage,
    message: &str,
    plan: &EmbeddingPlan,
) -> Result<(), StegoError>
{
    let payload = message.as_bytes();
    if u32::try_from(payload.len()).is_err()
    {
        return Err(StegoError::LengthOverflow {
            requested_bytes: payload.len(),
        });
    }

    let available_bytes = payload_capacity(image.as_raw().len(), plan);
    if payload.len() > available_bytes
    {
        return Err(StegoError::CapacityExceeded {
            needed_bytes: payload.len(),
            available_bytes,
        });
    }

    let frame = build_frame(payload);
    let mut bits = BitPacker::new(&frame);
    let depth = plan.bits_per_channel();
    let mask = plan.group_mask();

    for channel in eligible_samples_mut(image, plan)
    {
        let Some(group) = bits.next_group(depth)
        else
        {
            break;
        };

        // keep the high bits, replace the plan's low bits
        *channel = (*channel & !mask) | group;
    }

    Ok(())
}
