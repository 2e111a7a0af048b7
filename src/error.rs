//! # Error Handling
//!
//! Error types for every fallible operation this crate exposes.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                     │
//! │  │                                                                      │
//! │  ├── Io                  - file read/write failed, or refused path     │
//! │  ├── TooLarge            - input exceeded the 1 GiB cap                │
//! │  ├── Format              - framing malformed / base64 invalid /        │
//! │  │                         size mismatch for the declared algorithm    │
//! │  ├── AlgorithmUnsupported- a 2-byte tag is not a known constant        │
//! │  ├── Mismatch            - randomids don't bind envelope to keys       │
//! │  ├── AuthFail            - tag or signature verification failed       │
//! │  ├── NoKey               - requested key could not be located         │
//! │  └── Passphrase          - passphrase missing, empty, or mismatched   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `Mismatch` and `AuthFail` are kept distinct on purpose: a `randomid`
//! mismatch is detected before any expensive cryptography runs, while
//! `AuthFail` means the cryptographic tag or signature itself didn't check
//! out. Callers that want to tell "wrong key" from "tampered data" apart
//! need that distinction.

use thiserror::Error;

/// Result type alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Every error this crate can surface.
///
/// The core never panics or exits the process on a caller's behalf; every
/// failure path returns one of these variants.
#[derive(Error, Debug)]
pub enum Error {
    /// Underlying file read/write failed, or the path was a directory,
    /// symlink, or did not exist.
    #[error("I/O error: {0}")]
    Io(String),

    /// Input exceeded the maximum accepted size (1 GiB).
    #[error("input exceeds the maximum accepted size")]
    TooLarge,

    /// Armored framing missing or malformed, base64 invalid, binary magic
    /// or length prefix invalid, or struct size mismatch for the declared
    /// algorithm tag.
    #[error("malformed input: {0}")]
    Format(String),

    /// A 2-byte algorithm tag did not equal one of the fixed constants.
    #[error("unsupported algorithm tag: {0:?}")]
    AlgorithmUnsupported([u8; 2]),

    /// `randomid` fields in an envelope or signature do not bind to the
    /// keys supplied. Distinct from `AuthFail`: no cryptography has run yet.
    #[error("key identifiers do not match")]
    Mismatch,

    /// Cryptographic tag or signature verification failed: wrong key, wrong
    /// passphrase, or tampered ciphertext/message.
    #[error("authentication failed")]
    AuthFail,

    /// The requested key could not be located (missing file, or no
    /// matching ident in the key-ring).
    #[error("key not found: {0}")]
    NoKey(String),

    /// The passphrase callback returned nothing, returned empty when one
    /// was required, or the two confirmation prompts disagreed.
    #[error("passphrase error: {0}")]
    Passphrase(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}
