//! # KDF Secret-Key Wrapping
//!
//! Derives a symmetric key from a passphrase, salt, and iteration count
//! using bcrypt-pbkdf, then uses [`crate::primitives`]'s symmetric box to
//! encrypt or decrypt the concatenation `sigkey(64) || enckey(32)` in place.
//!
//! ## No-password sentinel
//!
//! An empty passphrase selects iteration count **0**. That is a sentinel,
//! not just a fast path: the derived key is all zeros and no bcrypt call is
//! made at all, but the authenticated box is still computed over the
//! all-zero key. This keeps the on-disk secret-key format uniform — a
//! no-password key still carries a `(salt, nonce, tag)` that round-trips
//! and is still verified on load — rather than special-casing "no wrapping"
//! as a distinct format.

use crate::error::{Error, Result};
use crate::primitives::{self, BOX_KEY_SIZE, NONCE_SIZE, TAG_SIZE};

/// Size of the KDF salt, in bytes.
pub const SALT_SIZE: usize = 16;
/// Default iteration count for newly generated secret keys.
pub const DEFAULT_ROUNDS: u32 = 42;
/// Sentinel iteration count selected by an empty passphrase: derives an
/// all-zero key without invoking bcrypt at all.
pub const NO_PASSWORD_ROUNDS: u32 = 0;
/// Size, in bytes, of the secret key material that gets wrapped
/// (`sigkey(64) || enckey(32)`).
pub const WRAPPED_SIZE: usize = 96;

/// Derive a 32-byte symmetric key from a passphrase, salt, and round count.
///
/// `rounds == 0` is the no-password sentinel: returns an all-zero key
/// without calling bcrypt_pbkdf.
pub fn derive_key(passphrase: &[u8], salt: &[u8; SALT_SIZE], rounds: u32) -> Result<[u8; BOX_KEY_SIZE]> {
    if rounds == NO_PASSWORD_ROUNDS {
        return Ok([0u8; BOX_KEY_SIZE]);
    }
    let mut key = [0u8; BOX_KEY_SIZE];
    bcrypt_pbkdf::bcrypt_pbkdf(passphrase, salt, rounds, &mut key)
        .map_err(|e| Error::Passphrase(format!("bcrypt_pbkdf failed: {e}")))?;
    Ok(key)
}

/// Header fields describing how a secret key's material was wrapped.
#[derive(Clone, Copy, Debug)]
pub struct WrapHeader {
    /// Iteration count passed to bcrypt_pbkdf (0 means no-password sentinel).
    pub rounds: u32,
    /// Random salt used for this wrapping.
    pub salt: [u8; SALT_SIZE],
    /// Nonce for the authenticated symmetric box.
    pub nonce: [u8; NONCE_SIZE],
    /// Authentication tag for the symmetric box.
    pub tag: [u8; TAG_SIZE],
}

/// Encrypt `material` (96 bytes: `sigkey || enckey`) in place under a key
/// derived from `passphrase` with a fresh random salt and `rounds`
/// iterations. Returns the header needed to reverse the operation.
pub fn wrap(material: &mut [u8; WRAPPED_SIZE], passphrase: &[u8], rounds: u32) -> Result<WrapHeader> {
    let mut salt = [0u8; SALT_SIZE];
    primitives::random_bytes(&mut salt);
    let key = derive_key(passphrase, &salt, rounds)?;
    let (nonce, tag) = primitives::sym_encrypt(material, &key)?;
    tracing::debug!(rounds, "wrapped secret key material");
    Ok(WrapHeader {
        rounds,
        salt,
        nonce,
        tag,
    })
}

/// Decrypt `material` in place using the passphrase and the header recorded
/// at wrap time. On failure, `material` is zeroized before returning
/// [`Error::AuthFail`], so no partial plaintext is ever exposed.
pub fn unwrap(
    material: &mut [u8; WRAPPED_SIZE],
    passphrase: &[u8],
    header: &WrapHeader,
) -> Result<()> {
    let key = derive_key(passphrase, &header.salt, header.rounds)?;
    match primitives::sym_decrypt(material, &header.nonce, &header.tag, &key) {
        Ok(()) => {
            tracing::debug!(rounds = header.rounds, "unwrapped secret key material");
            Ok(())
        }
        Err(e) => {
            primitives::zeroize(material);
            tracing::warn!("secret key unwrap failed authentication");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_unwrap_roundtrip() {
        let mut material = [9u8; WRAPPED_SIZE];
        let original = material;
        let header = wrap(&mut material, b"correct horse", DEFAULT_ROUNDS).unwrap();
        assert_ne!(material, original);
        unwrap(&mut material, b"correct horse", &header).unwrap();
        assert_eq!(material, original);
    }

    #[test]
    fn wrong_passphrase_fails() {
        let mut material = [9u8; WRAPPED_SIZE];
        let header = wrap(&mut material, b"correct horse", DEFAULT_ROUNDS).unwrap();
        assert!(unwrap(&mut material, b"wrong horse", &header).is_err());
        // on failure the buffer is zeroized, not left holding ciphertext or plaintext
        assert_eq!(material, [0u8; WRAPPED_SIZE]);
    }

    #[test]
    fn zero_round_sentinel_roundtrips_with_empty_passphrase() {
        let mut material = [3u8; WRAPPED_SIZE];
        let original = material;
        let header = wrap(&mut material, b"", NO_PASSWORD_ROUNDS).unwrap();
        assert_eq!(header.rounds, 0);
        unwrap(&mut material, b"", &header).unwrap();
        assert_eq!(material, original);
    }

    #[test]
    fn zero_round_sentinel_rejects_nonempty_passphrase() {
        let mut material = [3u8; WRAPPED_SIZE];
        let header = wrap(&mut material, b"", NO_PASSWORD_ROUNDS).unwrap();
        assert!(unwrap(&mut material, b"not empty", &header).is_err());
    }
}
