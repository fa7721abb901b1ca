//! Capacity planning for the embed path.
//!
//! These numbers are the single source of truth for the "image too small"
//! failure: the embedder consults them before any write, and the
//! extractor uses the same arithmetic to judge whether a decoded header
//! could possibly be real.
use image::RgbaImage;

use super::EmbeddingPlan;
use super::frame::FRAME_HEADER_BYTES;
use super::pixels::eligible_sample_count;

/// Maximum payload bytes a buffer of `sample_count` raw samples can carry
/// under `plan`, after frame overhead.
pub(super) fn payload_capacity(
    sample_count: usize,
    plan: &EmbeddingPlan,
) -> usize
{
    let usable_bits = eligible_sample_count(sample_count, plan)
        * usize::from(plan.bits_per_channel());

    (usable_bits / 8).saturating_sub(FRAME_HEADER_BYTES)
}

/// Returns the maximum message size (in bytes) that can be embedded in
/// the given image under `plan`.
#[must_use]
pub fn max_message_size(image: &RgbaImage, plan: &EmbeddingPlan) -> usize
{
    payload_capacity(image.as_raw().len(), plan)
}
