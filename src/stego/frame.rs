//! Payload frame construction and parsing.
//!
//! The frame is the binary container wrapped around the payload before it
//! is bit-packed into the carrier:
//!
//! ```text
//! [4 bytes] payload length (big-endian u32)
//! [4 bytes] CRC-32 (IEEE) of the payload bytes (big-endian u32)
//! [N bytes] payload
//! ```
//!
//! The checksum covers the payload only, never the length field, so a
//! corrupted header and a corrupted payload stay distinguishable.
use super::StegoError;

/// Fixed frame overhead: length(4) + crc(4).
pub const FRAME_HEADER_BYTES: usize = 8;

/// Builds a frame around `payload`.
///
/// The caller has already checked that the payload length fits a `u32`.
pub(super) fn build_frame(payload: &[u8]) -> Vec<u8>
{
    debug_assert!(
        u32::try_from(payload.len()).is_ok(),
        "payload length must fit the header"
    );

    let mut frame = Vec::with_capacity(FRAME_HEADER_BYTES + payload.len());
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(&crc32fast::hash(payload).to_be_bytes());
    frame.extend_from_slice(payload);

    frame
}

/// Reads the payload length a frame header declares.
///
/// `header` must hold at least the four length bytes.
pub(super) fn declared_payload_len(header: &[u8]) -> usize
{
    debug_assert!(header.len() >= 4, "header too short for a length field");

    u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize
}

/// Parses a frame, verifying the declared length and the checksum.
///
/// `data` may be longer than the actual frame; the frame length is taken
/// from the embedded length field and trailing bytes are ignored.
///
/// # Errors
///
/// Returns [`StegoError::MissingHeader`] when `data` cannot hold a header,
/// [`StegoError::TruncatedFrame`] when it ends before the declared payload
/// does, and [`StegoError::IntegrityMismatch`] when the checksum disagrees
/// with the payload.
pub(super) fn parse_frame(data: &[u8]) -> Result<Vec<u8>, StegoError>
{
    let Some((header, body)) = data.split_first_chunk::<FRAME_HEADER_BYTES>()
    else
    {
        return Err(StegoError::MissingHeader {
            available_bits: data.len() * 8,
        });
    };

    let declared_bytes = declared_payload_len(header);
    let stored =
        u32::from_be_bytes([header[4], header[5], header[6], header[7]]);

    if body.len() < declared_bytes
    {
        return Err(StegoError::TruncatedFrame {
            declared_bytes,
            available_bytes: body.len(),
        });
    }

    let payload = &body[..declared_bytes];
    let computed = crc32fast::hash(payload);
    if stored != computed
    {
        return Err(StegoError::IntegrityMismatch { stored, computed });
    }

    Ok(payload.to_vec())
}
