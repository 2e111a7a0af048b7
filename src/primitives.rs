//! # Primitives Wrapper
//!
//! A thin, in-place-operating façade over the underlying elliptic-curve
//! libraries. Nothing above this module ever touches `ed25519_dalek` or
//! `crypto_box` directly — every other module only sees fixed-size byte
//! arrays and the operations below.
//!
//! ## Algorithm Choices (fixed, no negotiation)
//!
//! | Operation         | Algorithm                              |
//! |-------------------|-----------------------------------------|
//! | Detached signing  | Ed25519                                 |
//! | Public-key box    | Curve25519 + XSalsa20-Poly1305          |
//! | Symmetric box     | XSalsa20-Poly1305                       |
//!
//! Every encrypt operation here works in place on the caller's buffer and
//! returns a nonce plus a *detached* authentication tag, so ciphertext
//! length always equals plaintext length. Decrypt operates in place and
//! restores the plaintext in place, or leaves the buffer untouched and
//! returns [`Error::AuthFail`] if the tag doesn't check out.

use crypto_box::aead::{AeadInPlace, KeyInit};
use ed25519_dalek::{Signature as Ed25519Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;
use xsalsa20poly1305::XSalsa20Poly1305;

use crate::error::{Error, Result};

/// Size of an Ed25519 signature.
pub const SIG_SIZE: usize = 64;
/// Size of the libsodium-style Ed25519 secret key (32-byte seed || 32-byte public key).
pub const SIGN_SECRET_KEY_SIZE: usize = 64;
/// Size of an Ed25519 public key.
pub const SIGN_PUBLIC_KEY_SIZE: usize = 32;
/// Size of a Curve25519 key (public or secret).
pub const BOX_KEY_SIZE: usize = 32;
/// Size of an XSalsa20 nonce, used by both the symmetric and public-key box.
pub const NONCE_SIZE: usize = 24;
/// Size of a Poly1305 authentication tag.
pub const TAG_SIZE: usize = 16;

/// Fill `out` with cryptographically secure random bytes.
pub fn random_bytes(out: &mut [u8]) {
    OsRng.fill_bytes(out);
}

/// Constant-time wipe of a buffer's contents.
pub fn zeroize(buf: &mut [u8]) {
    use zeroize::Zeroize;
    buf.zeroize();
}

/// Produce a detached Ed25519 signature over `msg`.
///
/// `secret` is the libsodium-style 64-byte secret key (seed || public key).
pub fn sign_detached(secret: &[u8; SIGN_SECRET_KEY_SIZE], msg: &[u8]) -> Result<[u8; SIG_SIZE]> {
    let signing_key = SigningKey::from_keypair_bytes(secret)
        .map_err(|e| Error::Format(format!("invalid signing key: {e}")))?;
    Ok(signing_key.sign(msg).to_bytes())
}

/// Verify a detached Ed25519 signature. Returns [`Error::AuthFail`] on any
/// verification failure (wrong key, tampered message, malformed signature).
pub fn verify_detached(
    public: &[u8; SIGN_PUBLIC_KEY_SIZE],
    msg: &[u8],
    sig: &[u8; SIG_SIZE],
) -> Result<()> {
    let verifying_key = VerifyingKey::from_bytes(public).map_err(|_| Error::AuthFail)?;
    let signature = Ed25519Signature::from_bytes(sig);
    verifying_key
        .verify(msg, &signature)
        .map_err(|_| Error::AuthFail)
}

/// Encrypt `buf` in place with XSalsa20-Poly1305 under `key`, using a fresh
/// random nonce. Returns `(nonce, tag)`; `buf` now holds the ciphertext,
/// same length as the original plaintext.
pub fn sym_encrypt(
    buf: &mut [u8],
    key: &[u8; BOX_KEY_SIZE],
) -> Result<([u8; NONCE_SIZE], [u8; TAG_SIZE])> {
    let cipher = XSalsa20Poly1305::new_from_slice(key)
        .map_err(|e| Error::Format(format!("invalid symmetric key: {e}")))?;
    let mut nonce = [0u8; NONCE_SIZE];
    random_bytes(&mut nonce);
    let tag = cipher
        .encrypt_in_place_detached(xsalsa20poly1305::Nonce::from_slice(&nonce), b"", buf)
        .map_err(|_| Error::Format("symmetric encryption failed".into()))?;
    let mut tag_bytes = [0u8; TAG_SIZE];
    tag_bytes.copy_from_slice(&tag);
    Ok((nonce, tag_bytes))
}

/// Decrypt `buf` in place with XSalsa20-Poly1305 under `key`, `nonce`, and
/// `tag`. Returns [`Error::AuthFail`] if the tag does not verify; `buf` is
/// left untouched in that case.
pub fn sym_decrypt(
    buf: &mut [u8],
    nonce: &[u8; NONCE_SIZE],
    tag: &[u8; TAG_SIZE],
    key: &[u8; BOX_KEY_SIZE],
) -> Result<()> {
    let cipher = XSalsa20Poly1305::new_from_slice(key)
        .map_err(|e| Error::Format(format!("invalid symmetric key: {e}")))?;
    cipher
        .decrypt_in_place_detached(
            xsalsa20poly1305::Nonce::from_slice(nonce),
            b"",
            buf,
            xsalsa20poly1305::Tag::from_slice(tag),
        )
        .map_err(|_| Error::AuthFail)
}

/// Encrypt `buf` in place for `recipient_pub` as `sender_sec`, using
/// Curve25519-XSalsa20-Poly1305 (crypto_box) with a fresh random nonce.
/// Returns `(nonce, tag)`.
pub fn pub_encrypt(
    buf: &mut [u8],
    recipient_pub: &[u8; BOX_KEY_SIZE],
    sender_sec: &[u8; BOX_KEY_SIZE],
) -> Result<([u8; NONCE_SIZE], [u8; TAG_SIZE])> {
    let their_pub = crypto_box::PublicKey::from(*recipient_pub);
    let our_sec = crypto_box::SecretKey::from(*sender_sec);
    let b = crypto_box::SalsaBox::new(&their_pub, &our_sec);
    let mut nonce = [0u8; NONCE_SIZE];
    random_bytes(&mut nonce);
    let tag = b
        .encrypt_in_place_detached(crypto_box::Nonce::from_slice(&nonce), b"", buf)
        .map_err(|_| Error::Format("public-key encryption failed".into()))?;
    let mut tag_bytes = [0u8; TAG_SIZE];
    tag_bytes.copy_from_slice(&tag);
    Ok((nonce, tag_bytes))
}

/// Decrypt `buf` in place, encrypted by `sender_pub` as `recipient_sec`.
/// Returns [`Error::AuthFail`] if the tag does not verify.
pub fn pub_decrypt(
    buf: &mut [u8],
    nonce: &[u8; NONCE_SIZE],
    tag: &[u8; TAG_SIZE],
    sender_pub: &[u8; BOX_KEY_SIZE],
    recipient_sec: &[u8; BOX_KEY_SIZE],
) -> Result<()> {
    let their_pub = crypto_box::PublicKey::from(*sender_pub);
    let our_sec = crypto_box::SecretKey::from(*recipient_sec);
    let b = crypto_box::SalsaBox::new(&their_pub, &our_sec);
    b.decrypt_in_place_detached(
        crypto_box::Nonce::from_slice(nonce),
        b"",
        buf,
        crypto_box::Tag::from_slice(tag),
    )
    .map_err(|_| Error::AuthFail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_verify_roundtrip() {
        let signing_key = SigningKey::generate(&mut OsRng);
        let secret = signing_key.to_keypair_bytes();
        let public = signing_key.verifying_key().to_bytes();

        let sig = sign_detached(&secret, b"hello").unwrap();
        assert!(verify_detached(&public, b"hello", &sig).is_ok());
        assert!(verify_detached(&public, b"hellp", &sig).is_err());
    }

    #[test]
    fn sym_roundtrip() {
        let key = [7u8; BOX_KEY_SIZE];
        let mut buf = b"attack at dawn".to_vec();
        let plain = buf.clone();
        let (nonce, tag) = sym_encrypt(&mut buf, &key).unwrap();
        assert_ne!(buf, plain);
        sym_decrypt(&mut buf, &nonce, &tag, &key).unwrap();
        assert_eq!(buf, plain);
    }

    #[test]
    fn sym_wrong_key_fails() {
        let key = [7u8; BOX_KEY_SIZE];
        let wrong = [8u8; BOX_KEY_SIZE];
        let mut buf = b"attack at dawn".to_vec();
        let (nonce, tag) = sym_encrypt(&mut buf, &key).unwrap();
        assert!(sym_decrypt(&mut buf, &nonce, &tag, &wrong).is_err());
    }

    #[test]
    fn pub_box_roundtrip() {
        let alice_sec = crypto_box::SecretKey::generate(&mut OsRng);
        let bob_sec = crypto_box::SecretKey::generate(&mut OsRng);
        let alice_pub: [u8; 32] = *alice_sec.public_key().as_bytes();
        let bob_pub: [u8; 32] = *bob_sec.public_key().as_bytes();
        let alice_sec_bytes = alice_sec.to_bytes();
        let bob_sec_bytes = bob_sec.to_bytes();

        let mut buf = b"secret".to_vec();
        let plain = buf.clone();
        let (nonce, tag) = pub_encrypt(&mut buf, &bob_pub, &alice_sec_bytes).unwrap();
        pub_decrypt(&mut buf, &nonce, &tag, &alice_pub, &bob_sec_bytes).unwrap();
        assert_eq!(buf, plain);
    }
}
