//! # Key Management
//!
//! Defines the on-disk key entities from the data model: [`PublicKey`] and
//! [`SecretKey`], and [`Keypair::generate`] which produces a fresh,
//! passphrase-wrapped pair.
//!
//! ## Key Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  PublicKey                                                      │
//! │  ──────────                                                      │
//! │  sigalg[2] encalg[2] randomid[8] sigkey[32] enckey[32]          │
//! │  + an out-of-band `ident` string (not part of the raw bytes)    │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  SecretKey (on disk)                                             │
//! │  ────────────────────                                            │
//! │  sigalg[2] encalg[2] symalg[2] kdfalg[2] randomid[8]            │
//! │  kdfrounds[4] salt[16] nonce[24] tag[16]                        │
//! │  sigkey[64] enckey[32]   (these 96 bytes are KDF-wrapped)       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `randomid` pairs a public key with its secret half and lets signature
//! and envelope verification reject a wrong-key attempt before any
//! cryptography runs.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::alg;
use crate::error::{Error, Result};
use crate::kdf::{self, WrapHeader, WRAPPED_SIZE};
use crate::primitives;

/// Size of a `randomid`.
pub const RANDOMID_SIZE: usize = 8;
/// Maximum content length (bytes) of an `ident` string, not counting the
/// implied terminating NUL.
pub const IDENT_MAX: usize = 63;

/// Raw, fixed-size encoding of [`PublicKey`] (excludes `ident`).
pub const PUBLIC_KEY_RAW_SIZE: usize = 2 + 2 + RANDOMID_SIZE + 32 + 32;
/// Raw, fixed-size encoding of [`SecretKey`] on disk (excludes `ident`).
pub const SECRET_KEY_RAW_SIZE: usize =
    2 + 2 + 2 + 2 + RANDOMID_SIZE + 4 + kdf::SALT_SIZE + primitives::NONCE_SIZE + primitives::TAG_SIZE + WRAPPED_SIZE;

/// A public key: the half of a keypair that is safe to share.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    pub sigalg: [u8; 2],
    pub encalg: [u8; 2],
    pub randomid: [u8; RANDOMID_SIZE],
    pub sigkey: [u8; 32],
    pub enckey: [u8; 32],
    pub ident: String,
}

impl PublicKey {
    /// Encode the raw struct fields (not `ident`) to bytes, in the exact
    /// on-disk layout.
    pub fn to_raw_bytes(&self) -> [u8; PUBLIC_KEY_RAW_SIZE] {
        let mut out = [0u8; PUBLIC_KEY_RAW_SIZE];
        let mut off = 0;
        out[off..off + 2].copy_from_slice(&self.sigalg);
        off += 2;
        out[off..off + 2].copy_from_slice(&self.encalg);
        off += 2;
        out[off..off + RANDOMID_SIZE].copy_from_slice(&self.randomid);
        off += RANDOMID_SIZE;
        out[off..off + 32].copy_from_slice(&self.sigkey);
        off += 32;
        out[off..off + 32].copy_from_slice(&self.enckey);
        out
    }

    /// Decode raw struct bytes (the `ident` is supplied separately, as it
    /// lives outside the serialized payload).
    pub fn from_raw_bytes(bytes: &[u8; PUBLIC_KEY_RAW_SIZE], ident: String) -> Result<Self> {
        let mut off = 0;
        let sigalg = [bytes[off], bytes[off + 1]];
        off += 2;
        let encalg = [bytes[off], bytes[off + 1]];
        off += 2;
        alg::require(sigalg, alg::SIG_ED25519)?;
        alg::require(encalg, alg::ENC_CURVE25519)?;
        let mut randomid = [0u8; RANDOMID_SIZE];
        randomid.copy_from_slice(&bytes[off..off + RANDOMID_SIZE]);
        off += RANDOMID_SIZE;
        let mut sigkey = [0u8; 32];
        sigkey.copy_from_slice(&bytes[off..off + 32]);
        off += 32;
        let mut enckey = [0u8; 32];
        enckey.copy_from_slice(&bytes[off..off + 32]);

        Ok(Self {
            sigalg,
            encalg,
            randomid,
            sigkey,
            enckey,
            ident,
        })
    }
}

/// A secret key, held in memory with its signing and encryption material in
/// plaintext. Zeroized on drop.
#[derive(ZeroizeOnDrop)]
pub struct SecretKey {
    #[zeroize(skip)]
    pub sigalg: [u8; 2],
    #[zeroize(skip)]
    pub encalg: [u8; 2],
    #[zeroize(skip)]
    pub symalg: [u8; 2],
    #[zeroize(skip)]
    pub kdfalg: [u8; 2],
    #[zeroize(skip)]
    pub randomid: [u8; RANDOMID_SIZE],
    /// Ed25519 secret key, libsodium layout (32-byte seed || 32-byte public key).
    pub sigkey: [u8; 64],
    /// Curve25519 secret key.
    pub enckey: [u8; 32],
    #[zeroize(skip)]
    pub ident: String,
}

impl SecretKey {
    /// Encrypt this key's secret material in place and serialize to the
    /// on-disk layout, using `passphrase` and `rounds` iterations of
    /// bcrypt-pbkdf. The in-memory plaintext copy is untouched; only the
    /// returned bytes are encrypted.
    pub fn to_wrapped_bytes(&self, passphrase: &[u8], rounds: u32) -> Result<[u8; SECRET_KEY_RAW_SIZE]> {
        let mut material = [0u8; WRAPPED_SIZE];
        material[..64].copy_from_slice(&self.sigkey);
        material[64..].copy_from_slice(&self.enckey);

        let header = kdf::wrap(&mut material, passphrase, rounds)?;

        let mut out = [0u8; SECRET_KEY_RAW_SIZE];
        let mut off = 0;
        out[off..off + 2].copy_from_slice(&self.sigalg);
        off += 2;
        out[off..off + 2].copy_from_slice(&self.encalg);
        off += 2;
        out[off..off + 2].copy_from_slice(&self.symalg);
        off += 2;
        out[off..off + 2].copy_from_slice(&self.kdfalg);
        off += 2;
        out[off..off + RANDOMID_SIZE].copy_from_slice(&self.randomid);
        off += RANDOMID_SIZE;
        out[off..off + 4].copy_from_slice(&header.rounds.to_be_bytes());
        off += 4;
        out[off..off + kdf::SALT_SIZE].copy_from_slice(&header.salt);
        off += kdf::SALT_SIZE;
        out[off..off + primitives::NONCE_SIZE].copy_from_slice(&header.nonce);
        off += primitives::NONCE_SIZE;
        out[off..off + primitives::TAG_SIZE].copy_from_slice(&header.tag);
        off += primitives::TAG_SIZE;
        out[off..off + WRAPPED_SIZE].copy_from_slice(&material);

        material.zeroize();
        Ok(out)
    }

    /// Parse the on-disk layout and decrypt the secret material with
    /// `passphrase`. On auth failure, no partial plaintext is exposed.
    pub fn from_wrapped_bytes(
        bytes: &[u8; SECRET_KEY_RAW_SIZE],
        ident: String,
        passphrase: &[u8],
    ) -> Result<Self> {
        let mut off = 0;
        let sigalg = [bytes[off], bytes[off + 1]];
        off += 2;
        let encalg = [bytes[off], bytes[off + 1]];
        off += 2;
        let symalg = [bytes[off], bytes[off + 1]];
        off += 2;
        let kdfalg = [bytes[off], bytes[off + 1]];
        off += 2;
        alg::require(sigalg, alg::SIG_ED25519)?;
        alg::require(encalg, alg::ENC_CURVE25519)?;
        alg::require(symalg, alg::SYM_SALSA20POLY1305)?;
        alg::require(kdfalg, alg::KDF_BCRYPT)?;

        let mut randomid = [0u8; RANDOMID_SIZE];
        randomid.copy_from_slice(&bytes[off..off + RANDOMID_SIZE]);
        off += RANDOMID_SIZE;

        let rounds = u32::from_be_bytes(bytes[off..off + 4].try_into().unwrap());
        off += 4;
        let mut salt = [0u8; kdf::SALT_SIZE];
        salt.copy_from_slice(&bytes[off..off + kdf::SALT_SIZE]);
        off += kdf::SALT_SIZE;
        let mut nonce = [0u8; primitives::NONCE_SIZE];
        nonce.copy_from_slice(&bytes[off..off + primitives::NONCE_SIZE]);
        off += primitives::NONCE_SIZE;
        let mut tag = [0u8; primitives::TAG_SIZE];
        tag.copy_from_slice(&bytes[off..off + primitives::TAG_SIZE]);
        off += primitives::TAG_SIZE;

        let mut material = [0u8; WRAPPED_SIZE];
        material.copy_from_slice(&bytes[off..off + WRAPPED_SIZE]);

        let header = WrapHeader {
            rounds,
            salt,
            nonce,
            tag,
        };
        kdf::unwrap(&mut material, passphrase, &header)?;

        let mut sigkey = [0u8; 64];
        sigkey.copy_from_slice(&material[..64]);
        let mut enckey = [0u8; 32];
        enckey.copy_from_slice(&material[64..]);
        material.zeroize();

        Ok(Self {
            sigalg,
            encalg,
            symalg,
            kdfalg,
            randomid,
            sigkey,
            enckey,
            ident,
        })
    }

    /// This key's public half.
    pub fn public_key(&self) -> PublicKey {
        let mut sigkey_pub = [0u8; 32];
        sigkey_pub.copy_from_slice(&self.sigkey[32..]);
        PublicKey {
            sigalg: self.sigalg,
            encalg: self.encalg,
            randomid: self.randomid,
            sigkey: sigkey_pub,
            enckey: crypto_box_public_from_secret(&self.enckey),
            ident: self.ident.clone(),
        }
    }
}

fn crypto_box_public_from_secret(secret: &[u8; 32]) -> [u8; 32] {
    let sk = crypto_box::SecretKey::from(*secret);
    *sk.public_key().as_bytes()
}

/// A freshly generated `(public, secret)` pair sharing one `randomid`.
pub struct Keypair {
    pub public: PublicKey,
    pub secret: SecretKey,
}

impl Keypair {
    /// Generate a fresh Ed25519/Curve25519 keypair bound to `ident`.
    pub fn generate(ident: &str) -> Result<Self> {
        if ident.len() > IDENT_MAX {
            return Err(Error::Format(format!(
                "ident exceeds {IDENT_MAX} bytes"
            )));
        }

        let signing_key = ed25519_dalek::SigningKey::generate(&mut rand::rngs::OsRng);
        let sigkey = signing_key.to_keypair_bytes();
        let sigkey_pub = signing_key.verifying_key().to_bytes();

        let enc_secret = crypto_box::SecretKey::generate(&mut rand::rngs::OsRng);
        let enckey = enc_secret.to_bytes();
        let enckey_pub = *enc_secret.public_key().as_bytes();

        let mut randomid = [0u8; RANDOMID_SIZE];
        primitives::random_bytes(&mut randomid);

        let secret = SecretKey {
            sigalg: alg::SIG_ED25519,
            encalg: alg::ENC_CURVE25519,
            symalg: alg::SYM_SALSA20POLY1305,
            kdfalg: alg::KDF_BCRYPT,
            randomid,
            sigkey,
            enckey,
            ident: ident.to_string(),
        };

        let public = PublicKey {
            sigalg: alg::SIG_ED25519,
            encalg: alg::ENC_CURVE25519,
            randomid,
            sigkey: sigkey_pub,
            enckey: enckey_pub,
            ident: ident.to_string(),
        };

        tracing::debug!(ident, randomid = %hex::encode(randomid), "generated keypair");
        Ok(Self { public, secret })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_shares_randomid_and_algs() {
        let kp = Keypair::generate("alice").unwrap();
        assert_eq!(kp.public.randomid, kp.secret.randomid);
        assert_eq!(kp.public.sigalg, alg::SIG_ED25519);
        assert_eq!(kp.public.encalg, alg::ENC_CURVE25519);
        assert_eq!(kp.secret.public_key(), kp.public);
    }

    #[test]
    fn public_key_raw_roundtrip() {
        let kp = Keypair::generate("alice").unwrap();
        let raw = kp.public.to_raw_bytes();
        let restored = PublicKey::from_raw_bytes(&raw, "alice".into()).unwrap();
        assert_eq!(restored, kp.public);
    }

    #[test]
    fn secret_key_wrap_unwrap_roundtrip() {
        let kp = Keypair::generate("alice").unwrap();
        let wrapped = kp.secret.to_wrapped_bytes(b"pw", kdf::DEFAULT_ROUNDS).unwrap();
        let restored = SecretKey::from_wrapped_bytes(&wrapped, "alice".into(), b"pw").unwrap();
        assert_eq!(restored.sigkey, kp.secret.sigkey);
        assert_eq!(restored.enckey, kp.secret.enckey);
        assert_eq!(restored.randomid, kp.secret.randomid);
    }

    #[test]
    fn secret_key_wrong_passphrase_fails() {
        let kp = Keypair::generate("alice").unwrap();
        let wrapped = kp.secret.to_wrapped_bytes(b"pw", kdf::DEFAULT_ROUNDS).unwrap();
        assert!(SecretKey::from_wrapped_bytes(&wrapped, "alice".into(), b"wrong").is_err());
    }

    #[test]
    fn ident_too_long_is_rejected() {
        let long = "x".repeat(IDENT_MAX + 1);
        assert!(Keypair::generate(&long).is_err());
    }
}
