//! Steganography routines for embedding and extracting text from images.
//!
//! The codec works on the RGBA8 sample buffer of a decoded image and never
//! touches the container format itself.
//!
//! # Wire Format
//!
//! - First 32 embedded bits: payload length as big-endian u32
//! - Next 32 bits: CRC-32 (IEEE) of the payload bytes, big-endian
//! - Remaining bits: payload bytes, each byte encoded MSB-first (bit 7 to
//!   bit 0)
//! - Pixels are visited left-to-right, top-to-bottom, channels in storage
//!   order; the [`EmbeddingPlan`] decides which channels of each pixel are
//!   eligible and how many low bits of each eligible channel carry data
//!
//! Embed and extract must use the same plan or the round trip fails.
//!
//! # Errors
//!
//! Returns [`StegoError`] when embedding or extracting text fails.
use std::string::FromUtf8Error;

use thiserror::Error;

mod bits;
mod capacity;
mod decode;
mod encode;
mod frame;
mod pixels;

pub use capacity::max_message_size;
pub use decode::extract_text;
pub use encode::embed_text;
pub use frame::FRAME_HEADER_BYTES;

/// Deepest low-bit plane the codec will rewrite in a channel sample.
pub const MAX_BITS_PER_CHANNEL: u8 = 8;

/// Maximum reasonable message size in bytes
// Declared lengths above this are treated as noise without reading further
pub const MAX_REASONABLE_MSG_SIZE: usize = 100 * 1024 * 1024; // 100 MiB

/// Errors that can be emitted while embedding or extracting text
#[derive(Debug, Error)]
pub enum StegoError
{
    /// The requested bit depth cannot be honored
    #[error(
        "bit depth {requested} is outside the supported range \
         1..={MAX_BITS_PER_CHANNEL}"
    )]
    UnsupportedBitDepth
    {
        requested: u8
    },

    /// The payload is too large to fit in the image
    #[error(
        "payload length of {needed_bytes} bytes exceeds available capacity \
         of {available_bytes} bytes"
    )]
    CapacityExceeded
    {
        needed_bytes: usize,
        available_bytes: usize,
    },

    /// The payload length is too large to fit in the header
    #[error(
        "payload length of {requested_bytes} bytes exceeds the 32-bit \
         length field"
    )]
    LengthOverflow
    {
        requested_bytes: usize
    },

    /// The image does not contain enough data to decode the payload header
    #[error(
        "image holds only {available_bits} eligible bits, too few for a \
         payload header"
    )]
    MissingHeader
    {
        available_bits: usize
    },

    /// The header declares more payload than the image could ever carry
    #[error(
        "declared payload of {declared_bytes} bytes exceeds available \
         capacity of {available_bytes} bytes"
    )]
    ImplausibleLength
    {
        declared_bytes: usize,
        available_bytes: usize,
    },

    /// The declared payload size exceeds the supported maximum
    #[error(
        "declared payload size of {declared_bytes} bytes exceeds reasonable \
         limit of {MAX_REASONABLE_MSG_SIZE} bytes"
    )]
    UnreasonablePayloadSize
    {
        declared_bytes: usize
    },

    /// The frame ends before the declared payload length
    #[error(
        "frame declares {declared_bytes} payload bytes but only \
         {available_bytes} are present"
    )]
    TruncatedFrame
    {
        declared_bytes: usize,
        available_bytes: usize,
    },

    /// The payload checksum does not match the header
    #[error(
        "payload checksum mismatch: header says {stored:#010x}, payload \
         hashes to {computed:#010x}"
    )]
    IntegrityMismatch
    {
        stored: u32,
        computed: u32,
    },

    /// The image data ended before the payload could be fully reconstructed
    #[error("image data ended before the payload could be fully reconstructed")]
    IncompletePayload,

    /// The decoded payload is not valid UTF-8
    #[error("decoded payload is not valid UTF-8")]
    InvalidUtf8(#[from] FromUtf8Error),
}

/// Which channels of each pixel may carry payload bits.
///
/// [`ChannelStride::Rgb`] skips the alpha sample of every pixel so opacity
/// is never disturbed; [`ChannelStride::Rgba`] uses all four samples.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChannelStride
{
    #[default]
    Rgb,
    Rgba,
}

impl ChannelStride
{
    /// Eligible samples at the start of each RGBA8 pixel.
    pub(crate) const fn eligible_per_pixel(self) -> usize
    {
        match self
        {
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// Fixes how payload bits map onto channel samples for one operation.
///
/// A plan is built once per embed or extract call and passed through
/// explicitly; there is no process-wide default to mutate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmbeddingPlan
{
    bits_per_channel: u8,
    stride: ChannelStride,
}

impl Default for EmbeddingPlan
{
    /// One bit per channel, alpha untouched.
    fn default() -> Self
    {
        Self {
            bits_per_channel: 1,
            stride: ChannelStride::Rgb,
        }
    }
}

impl EmbeddingPlan
{
    /// Builds a plan, validating the bit depth.
    ///
    /// # Errors
    ///
    /// Returns [`StegoError::UnsupportedBitDepth`] when `bits_per_channel`
    /// is zero or exceeds [`MAX_BITS_PER_CHANNEL`].
    pub fn new(
        bits_per_channel: u8,
        stride: ChannelStride,
    ) -> Result<Self, StegoError>
    {
        if bits_per_channel == 0 || bits_per_channel > MAX_BITS_PER_CHANNEL
        {
            return Err(StegoError::UnsupportedBitDepth {
                requested: bits_per_channel,
            });
        }

        Ok(Self {
            bits_per_channel,
            stride,
        })
    }

    /// Payload bits carried by each eligible channel sample.
    #[must_use]
    pub const fn bits_per_channel(&self) -> u8
    {
        self.bits_per_channel
    }

    /// Which channels of each pixel are eligible.
    #[must_use]
    pub const fn stride(&self) -> ChannelStride
    {
        self.stride
    }

    /// Mask selecting the low bits of a sample this plan rewrites.
    pub(crate) const fn group_mask(&self) -> u8
    {
        u8::MAX >> (8 - self.bits_per_channel)
    }
}
