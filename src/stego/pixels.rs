//! Flat channel-sample views over the RGBA8 working buffer.
//!
//! The codec sees an image only as an ordered run of 8-bit channel
//! samples; which samples of each pixel may carry data comes from the
//! [`EmbeddingPlan`]. Nothing here knows about container formats.
use super::EmbeddingPlan;

/// Samples per pixel in the RGBA8 working buffer.
pub(super) const SAMPLES_PER_PIXEL: usize = 4;

/// Number of samples the plan may touch in a buffer of `sample_count` raw
/// samples.
pub(super) fn eligible_sample_count(
    sample_count: usize,
    plan: &EmbeddingPlan,
) -> usize
{
    (sample_count / SAMPLES_PER_PIXEL) * plan.stride().eligible_per_pixel()
}

/// Iterates the eligible samples of `samples` in embedding order.
pub(super) fn eligible_samples<'buffer>(
    samples: &'buffer [u8],
    plan: &EmbeddingPlan,
) -> impl Iterator<Item = u8> + 'buffer
{
    let eligible = plan.stride().eligible_per_pixel();
    samples
        .chunks_exact(SAMPLES_PER_PIXEL)
        .flat_map(move |pixel| pixel[..eligible].iter().copied())
}

/// Mutable counterpart of [`eligible_samples`].
pub(super) fn eligible_samples_mut<'buffer>(
    samples: &'buffer mut [u8],
    plan: &EmbeddingPlan,
) -> impl Iterator<Item = &'buffer mut u8>
{
    let eligible = plan.stride().eligible_per_pixel();
    samples
        .chunks_exact_mut(SAMPLES_PER_PIXEL)
        .flat_map(move |pixel| pixel[..eligible].iter_mut())
}
