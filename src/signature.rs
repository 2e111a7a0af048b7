//! # Signing Flow
//!
//! Detached Ed25519 signatures bound to a `randomid` so that verifying with
//! the wrong public key is caught before any cryptography runs.
//!
//! ```text
//! sign(secret, msg)   -> Signature { sigalg: Ed, randomid: secret.randomid, sig, ident: secret.ident }
//! verify(public, msg, sig)
//!   if public.randomid != sig.randomid -> Mismatch
//!   else verify_detached(public.sigkey, msg, sig.sig) -> AuthFail | Ok
//! ```
use crate::alg;
use crate::error::{Error, Result};
use crate::keys::{PublicKey, SecretKey, RANDOMID_SIZE};
use crate::primitives;

/// Raw, fixed-size encoding of a detached [`Signature`] (excludes `ident`).
pub const SIGNATURE_RAW_SIZE: usize = 2 + RANDOMID_SIZE + primitives::SIG_SIZE;

/// A detached Ed25519 signature plus the `randomid` of the key that issued
/// it, used to detect wrong-key verification attempts before verifying.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub sigalg: [u8; 2],
    pub randomid: [u8; RANDOMID_SIZE],
    pub sig: [u8; primitives::SIG_SIZE],
    pub ident: String,
}

impl Signature {
    pub fn to_raw_bytes(&self) -> [u8; SIGNATURE_RAW_SIZE] {
        let mut out = [0u8; SIGNATURE_RAW_SIZE];
        let mut off = 0;
        out[off..off + 2].copy_from_slice(&self.sigalg);
        off += 2;
        out[off..off + RANDOMID_SIZE].copy_from_slice(&self.randomid);
        off += RANDOMID_SIZE;
        out[off..off + primitives::SIG_SIZE].copy_from_slice(&self.sig);
        out
    }

    pub fn from_raw_bytes(bytes: &[u8; SIGNATURE_RAW_SIZE], ident: String) -> Result<Self> {
        let mut off = 0;
        let sigalg = [bytes[off], bytes[off + 1]];
        off += 2;
        alg::require(sigalg, alg::SIG_ED25519)?;
        let mut randomid = [0u8; RANDOMID_SIZE];
        randomid.copy_from_slice(&bytes[off..off + RANDOMID_SIZE]);
        off += RANDOMID_SIZE;
        let mut sig = [0u8; primitives::SIG_SIZE];
        sig.copy_from_slice(&bytes[off..off + primitives::SIG_SIZE]);
        Ok(Self {
            sigalg,
            randomid,
            sig,
            ident,
        })
    }
}

/// Sign `msg` with `secret`, producing a detached signature carrying the
/// secret key's `randomid` and `ident`.
pub fn sign(secret: &SecretKey, msg: &[u8]) -> Result<Signature> {
    let sig = primitives::sign_detached(&secret.sigkey, msg)?;
    Ok(Signature {
        sigalg: alg::SIG_ED25519,
        randomid: secret.randomid,
        sig,
        ident: secret.ident.clone(),
    })
}

/// Verify a detached signature against `msg` with `public`.
///
/// Returns [`Error::Mismatch`] if `public.randomid` does not equal the
/// signature's `randomid` (wrong key, detected before any cryptography),
/// or [`Error::AuthFail`] if the signature itself doesn't verify.
pub fn verify(public: &PublicKey, msg: &[u8], sig: &Signature) -> Result<()> {
    if public.randomid != sig.randomid {
        tracing::warn!("signature randomid does not match public key");
        return Err(Error::Mismatch);
    }
    let result = primitives::verify_detached(&public.sigkey, msg, &sig.sig);
    if result.is_err() {
        tracing::warn!(ident = %sig.ident, "signature failed to verify");
    } else {
        tracing::debug!(ident = %sig.ident, "signature verified");
    }
    result
}
