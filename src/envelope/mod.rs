//! # Envelope Codec
//!
//! Two on-disk framings for the same logical structures (keys, signatures,
//! encrypted messages): armored text ([`armor`]) and binary ([`binary`]).
//! [`header`] defines the tagged-union encryption envelope headers shared by
//! both framings.

pub mod armor;
pub mod binary;
pub mod header;

/// Hard ceiling on any single input read by this crate (a message, a key
/// file, an envelope). Enforced by the I/O layer before any buffer is
/// allocated to hold the full contents, so a hostile huge file fails with
/// [`crate::error::Error::TooLarge`] instead of two allocations proportional
/// to its size.
pub const MAX_INPUT_SIZE: u64 = 1 << 30;
