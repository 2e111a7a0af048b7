//! # reop
//!
//! A small command-line cryptographic toolkit descended from OpenBSD's
//! `signify`/`reop` lineage: sign and verify detached or embedded messages,
//! and encrypt or decrypt files symmetrically (by passphrase) or to a
//! recipient's public key.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  primitives   Ed25519 / Curve25519-XSalsa20Poly1305 / XSalsa20Poly1305 │
//! │      │        bcrypt-pbkdf, all in-place with detached tags         │
//! │      ▼                                                               │
//! │  kdf          passphrase -> symmetric key, wraps sigkey||enckey     │
//! │      │                                                               │
//! │      ▼                                                               │
//! │  keys         PublicKey / SecretKey, on-disk raw layouts            │
//! │      │                                                               │
//! │      ├──▶ signature   detached Ed25519 signing and verification     │
//! │      └──▶ encrypt     symmetric + public-key (current & legacy)     │
//! │                  │                                                   │
//! │                  ▼                                                   │
//! │           envelope    armored text and binary framing               │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The core has no direct dependency on a terminal, the filesystem, or a
//! key-ring file: [`passphrase::PassphraseProvider`], [`io`], and
//! [`keyring::FindPublicKey`] are the seams the `reop` binary plugs real
//! implementations into.
#![warn(missing_docs)]

pub mod alg;
pub mod encrypt;
pub mod envelope;
pub mod error;
pub mod io;
pub mod kdf;
pub mod keyring;
pub mod keys;
pub mod message;
pub mod passphrase;
pub mod primitives;
pub mod signature;

pub use error::{Error, Result};
