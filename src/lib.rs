//! Steganographic text codec for lossless raster images.
//!
//! Embeds UTF-8 text into the low-order bits of pixel channel samples and
//! recovers it exactly. A length-and-checksum frame wraps every payload so
//! extraction can tell a real message from noise. The crate exposes the
//! codec itself ([`stego`]), a byte-oriented surface for in-memory carriers
//! ([`carrier`]), and a command line interface for files ([`cli`]).
pub mod carrier;
pub mod cli;
pub mod stego;
