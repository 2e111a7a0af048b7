//! # Algorithm Identifiers
//!
//! Every on-disk algorithm tag is a fixed 2-byte ASCII value. There is no
//! negotiation: a tag that doesn't match one of these constants is a hard
//! rejection ([`Error::AlgorithmUnsupported`]), never a fallback.

use crate::error::{Error, Result};

/// Ed25519 signatures.
pub const SIG_ED25519: [u8; 2] = *b"Ed";
/// Curve25519 encryption key algorithm; also the legacy public-key envelope.
pub const ENC_CURVE25519: [u8; 2] = *b"CS";
/// Current ephemeral-key public-key encryption envelope.
pub const ENV_EPHEMERAL_CURRENT: [u8; 2] = *b"eC";
/// Legacy ephemeral-key envelope.
pub const ENV_EPHEMERAL_LEGACY: [u8; 2] = *b"eS";
/// Symmetric Salsa20-Poly1305 envelope.
pub const SYM_SALSA20POLY1305: [u8; 2] = *b"SP";
/// bcrypt-based KDF.
pub const KDF_BCRYPT: [u8; 2] = *b"BK";

/// Binary framing magic: `RBF` followed by a trailing NUL.
pub const BINARY_MAGIC: [u8; 4] = *b"RBF\0";

/// Reject `tag` unless it equals `expected`.
pub fn require(tag: [u8; 2], expected: [u8; 2]) -> Result<()> {
    if tag == expected {
        Ok(())
    } else {
        tracing::warn!(got = ?String::from_utf8_lossy(&tag), expected = ?String::from_utf8_lossy(&expected), "rejected algorithm tag");
        Err(Error::AlgorithmUnsupported(tag))
    }
}
