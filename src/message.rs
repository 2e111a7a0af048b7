//! # File Assembly
//!
//! Ties the raw struct encodings in [`crate::keys`], [`crate::signature`],
//! and [`crate::envelope::header`] to whole on-disk files: a `PUBLIC KEY`
//! or `SECRET KEY` armored file, a detached `SIGNATURE` file, an embedded
//! `SIGNED MESSAGE` file, and an `ENCRYPTED MESSAGE` file (armored or
//! binary). [`crate::envelope::armor`] and [`crate::envelope::binary`]
//! only know about one payload block at a time; this module knows the
//! full file grammars, including the two multi-block layouts (signed
//! messages, encrypted messages) that don't fit the single-block shape.

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;

use crate::envelope::header::EnvelopeHeader;
use crate::envelope::{armor, binary};
use crate::error::{Error, Result};
use crate::keyring::FindPublicKey;
use crate::keys::{PublicKey, SecretKey, IDENT_MAX, PUBLIC_KEY_RAW_SIZE, SECRET_KEY_RAW_SIZE};
use crate::signature::{self, Signature, SIGNATURE_RAW_SIZE};

/// Encode a public key as a complete armored `PUBLIC KEY` file.
pub fn public_key_to_armored(key: &PublicKey) -> Result<String> {
    armor::encode_block("PUBLIC KEY", &key.ident, &key.to_raw_bytes())
}

/// Parse a complete armored `PUBLIC KEY` file.
pub fn public_key_from_armored(text: &str) -> Result<PublicKey> {
    let block = armor::parse_first_block(text, "PUBLIC KEY")?;
    let raw: [u8; PUBLIC_KEY_RAW_SIZE] = block
        .payload
        .as_slice()
        .try_into()
        .map_err(|_| Error::Format("bad PUBLIC KEY payload size".into()))?;
    PublicKey::from_raw_bytes(&raw, block.ident)
}

/// Encode a secret key as a complete armored `SECRET KEY` file, wrapping
/// its secret material with `passphrase` and `rounds` iterations.
pub fn secret_key_to_armored(key: &SecretKey, passphrase: &[u8], rounds: u32) -> Result<String> {
    let raw = key.to_wrapped_bytes(passphrase, rounds)?;
    armor::encode_block("SECRET KEY", &key.ident, &raw)
}

/// Parse a complete armored `SECRET KEY` file and decrypt its material
/// with `passphrase`.
pub fn secret_key_from_armored(text: &str, passphrase: &[u8]) -> Result<SecretKey> {
    let block = armor::parse_first_block(text, "SECRET KEY")?;
    let raw: [u8; SECRET_KEY_RAW_SIZE] = block
        .payload
        .as_slice()
        .try_into()
        .map_err(|_| Error::Format("bad SECRET KEY payload size".into()))?;
    SecretKey::from_wrapped_bytes(&raw, block.ident, passphrase)
}

/// Encode a detached signature as a complete armored `SIGNATURE` file.
pub fn signature_to_armored(sig: &Signature) -> Result<String> {
    armor::encode_block("SIGNATURE", &sig.ident, &sig.to_raw_bytes())
}

/// Parse a complete armored detached `SIGNATURE` file.
pub fn signature_from_armored(text: &str) -> Result<Signature> {
    let block = armor::parse_first_block(text, "SIGNATURE")?;
    let raw: [u8; SIGNATURE_RAW_SIZE] = block
        .payload
        .as_slice()
        .try_into()
        .map_err(|_| Error::Format("bad SIGNATURE payload size".into()))?;
    Signature::from_raw_bytes(&raw, block.ident)
}

// ---- Embedded (in-line) signed messages ----
//
// This layout doesn't fit armor::ArmorBlock's single-begin/single-end
// shape: one BEGIN opens the whole envelope, a second BEGIN (for the
// SIGNATURE sub-block) separates message from signature, and there is
// only one END at the very end. Handled here directly, on raw bytes
// (never `str`) since the embedded message may be arbitrary binary.

const SIGNED_MESSAGE_BEGIN: &[u8] = b"-----BEGIN REOP SIGNED MESSAGE-----\n";
const SIGNATURE_BEGIN: &[u8] = b"-----BEGIN REOP SIGNATURE-----\n";
const SIGNED_MESSAGE_END: &[u8] = b"-----END REOP SIGNED MESSAGE-----\n";

/// Does `data` open with the embedded `SIGNED MESSAGE` marker? Lets a
/// caller that wasn't told which verification mode to use (no explicit
/// `--embed` flag) sniff the file instead of guessing.
pub fn is_embedded_signed_message(data: &[u8]) -> bool {
    data.starts_with(SIGNED_MESSAGE_BEGIN)
}

/// Produce an embedded signed-message file: the message bytes verbatim,
/// followed by a trailing signature sub-block, the whole thing wrapped in
/// one `SIGNED MESSAGE` envelope.
pub fn sign_embedded(secret: &SecretKey, message: &[u8]) -> Result<Vec<u8>> {
    let sig = signature::sign(secret, message)?;

    let mut out = Vec::with_capacity(message.len() + 256);
    out.extend_from_slice(SIGNED_MESSAGE_BEGIN);
    out.extend_from_slice(message);
    out.extend_from_slice(SIGNATURE_BEGIN);
    out.extend_from_slice(format!("ident:{}\n", sig.ident).as_bytes());
    out.extend_from_slice(armor::wrap_base64(&sig.to_raw_bytes()).as_bytes());
    out.extend_from_slice(SIGNED_MESSAGE_END);
    Ok(out)
}

/// Parse and verify an embedded signed-message file, returning the
/// recovered message bytes on success.
///
/// The message span is the bytes between the end of the `SIGNED MESSAGE`
/// opener and the *last* occurrence of the `SIGNATURE` opener — required
/// because the message body may itself contain text that looks like a
/// signature opener, and the real signature always comes last.
///
/// `explicit_public` overrides key-ring lookup by the embedded `ident`.
pub fn verify_embedded(
    data: &[u8],
    explicit_public: Option<&PublicKey>,
    ring: &dyn FindPublicKey,
) -> Result<Vec<u8>> {
    let body = data
        .strip_prefix(SIGNED_MESSAGE_BEGIN)
        .ok_or_else(|| Error::Format("missing SIGNED MESSAGE header".into()))?;
    let body = body
        .strip_suffix(SIGNED_MESSAGE_END)
        .ok_or_else(|| Error::Format("missing SIGNED MESSAGE terminator".into()))?;

    let sig_at = find_last(body, SIGNATURE_BEGIN)
        .ok_or_else(|| Error::Format("no embedded SIGNATURE block found".into()))?;
    let message = &body[..sig_at];
    let sig_block = &body[sig_at + SIGNATURE_BEGIN.len()..];

    let sig_text = std::str::from_utf8(sig_block)
        .map_err(|_| Error::Format("embedded signature block is not valid utf-8".into()))?;
    let mut lines = sig_text.lines();
    let ident = lines
        .next()
        .unwrap_or("")
        .strip_prefix("ident:")
        .ok_or_else(|| Error::Format("missing ident: line".into()))?
        .trim()
        .to_string();
    if ident.len() > IDENT_MAX {
        return Err(Error::Format(format!("ident exceeds {IDENT_MAX} bytes")));
    }
    let b64: String = lines.collect::<Vec<_>>().join("");
    let raw_bytes = B64
        .decode(b64.trim())
        .map_err(|e| Error::Format(format!("invalid base64 in embedded signature: {e}")))?;
    let raw: [u8; SIGNATURE_RAW_SIZE] = raw_bytes
        .as_slice()
        .try_into()
        .map_err(|_| Error::Format("bad embedded signature size".into()))?;
    let sig = Signature::from_raw_bytes(&raw, ident.clone())?;

    let public = match explicit_public {
        Some(p) => p.clone(),
        None => ring.find_public_key_by_ident(&ident)?,
    };

    signature::verify(&public, message, &sig)?;
    Ok(message.to_vec())
}

fn find_last(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    (0..=haystack.len() - needle.len()).rev().find(|&i| &haystack[i..i + needle.len()] == needle)
}

// ---- Encrypted messages ----
//
// The armored form has two payload blocks under one envelope (a header
// block, then a `... DATA` marker, then the ciphertext block), which also
// doesn't fit the single-block shape `armor` handles. The binary form
// maps directly onto `envelope::binary`.

const ENC_BEGIN: &str = "-----BEGIN REOP ENCRYPTED MESSAGE-----\n";
const ENC_DATA_MARKER: &str = "-----BEGIN REOP ENCRYPTED MESSAGE DATA-----\n";
const ENC_END: &str = "-----END REOP ENCRYPTED MESSAGE-----";

/// Encode an encrypted-message armored file: a header block and a raw
/// ciphertext data block under one `ENCRYPTED MESSAGE` envelope.
pub fn encrypted_message_to_armored(header: &EnvelopeHeader, ident: &str, ciphertext: &[u8]) -> Result<String> {
    if ident.len() > IDENT_MAX {
        return Err(Error::Format(format!("ident exceeds {IDENT_MAX} bytes")));
    }
    let mut out = String::new();
    out.push_str(ENC_BEGIN);
    out.push_str("ident:");
    out.push_str(ident);
    out.push('\n');
    out.push_str(&armor::wrap_base64(&header.to_bytes()));
    out.push_str(ENC_DATA_MARKER);
    out.push_str(&armor::wrap_base64(ciphertext));
    out.push_str(ENC_END);
    out.push('\n');
    Ok(out)
}

/// Parse an encrypted-message armored file into its header, ident, and
/// ciphertext. The header block's own decoded byte length dispatches the
/// envelope variant (`SP`, `eC`, `CS`, or `eS`).
pub fn encrypted_message_from_armored(text: &str) -> Result<(EnvelopeHeader, String, Vec<u8>)> {
    let after_begin = text
        .strip_prefix(ENC_BEGIN)
        .ok_or_else(|| Error::Format("missing ENCRYPTED MESSAGE header".into()))?;
    let data_at = after_begin
        .find(ENC_DATA_MARKER)
        .ok_or_else(|| Error::Format("missing ENCRYPTED MESSAGE DATA marker".into()))?;
    let header_part = &after_begin[..data_at];
    let after_data_marker = &after_begin[data_at + ENC_DATA_MARKER.len()..];
    let end_at = after_data_marker
        .find(ENC_END)
        .ok_or_else(|| Error::Format("missing ENCRYPTED MESSAGE terminator".into()))?;
    let ciphertext_part = &after_data_marker[..end_at];

    let mut header_lines = header_part.lines();
    let ident = header_lines
        .next()
        .unwrap_or("")
        .strip_prefix("ident:")
        .ok_or_else(|| Error::Format("missing ident: line".into()))?
        .trim()
        .to_string();
    if ident.len() > IDENT_MAX {
        return Err(Error::Format(format!("ident exceeds {IDENT_MAX} bytes")));
    }
    let header_b64: String = header_lines.collect::<Vec<_>>().join("");
    let header_bytes = B64
        .decode(header_b64.trim())
        .map_err(|e| Error::Format(format!("invalid base64 in ENCRYPTED MESSAGE header: {e}")))?;
    let header = EnvelopeHeader::parse(&header_bytes)?;

    let ciphertext_b64: String = ciphertext_part.lines().collect::<Vec<_>>().join("");
    let ciphertext = B64
        .decode(ciphertext_b64.trim())
        .map_err(|e| Error::Format(format!("invalid base64 in ENCRYPTED MESSAGE DATA: {e}")))?;

    Ok((header, ident, ciphertext))
}

/// Encode an encrypted-message binary file.
pub fn encrypted_message_to_binary(header: &EnvelopeHeader, ident: &str, ciphertext: &[u8]) -> Result<Vec<u8>> {
    binary::encode(header, ident, ciphertext)
}

/// Decode an encrypted-message binary file.
pub fn encrypted_message_from_binary(bytes: &[u8]) -> Result<(EnvelopeHeader, String, Vec<u8>)> {
    let decoded = binary::decode(bytes)?;
    Ok((decoded.header, decoded.ident, decoded.ciphertext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alg;
    use crate::encrypt;
    use crate::envelope::header::SymmetricHeader;
    use crate::kdf;
    use crate::keyring::MemoryKeyRing;
    use crate::keys::Keypair;

    #[test]
    fn public_key_armored_roundtrip() {
        let kp = Keypair::generate("alice").unwrap();
        let text = public_key_to_armored(&kp.public).unwrap();
        let restored = public_key_from_armored(&text).unwrap();
        assert_eq!(restored, kp.public);
    }

    #[test]
    fn secret_key_armored_roundtrip() {
        let kp = Keypair::generate("alice").unwrap();
        let text = secret_key_to_armored(&kp.secret, b"pw", kdf::DEFAULT_ROUNDS).unwrap();
        let restored = secret_key_from_armored(&text, b"pw").unwrap();
        assert_eq!(restored.sigkey, kp.secret.sigkey);
        assert_eq!(restored.enckey, kp.secret.enckey);
        assert!(secret_key_from_armored(&text, b"wrong").is_err());
    }

    #[test]
    fn detached_signature_armored_roundtrip() {
        let kp = Keypair::generate("alice").unwrap();
        let sig = signature::sign(&kp.secret, b"hello").unwrap();
        let text = signature_to_armored(&sig).unwrap();
        let restored = signature_from_armored(&text).unwrap();
        assert_eq!(restored, sig);
    }

    #[test]
    fn embedded_sign_verify_roundtrip() {
        let kp = Keypair::generate("alice").unwrap();
        let ring = MemoryKeyRing::new(vec![kp.public.clone()]);
        let signed = sign_embedded(&kp.secret, b"hello\nworld\n").unwrap();
        let recovered = verify_embedded(&signed, None, &ring).unwrap();
        assert_eq!(recovered, b"hello\nworld\n");
    }

    #[test]
    fn detects_embedded_signed_message_by_content() {
        let kp = Keypair::generate("alice").unwrap();
        let signed = sign_embedded(&kp.secret, b"hello").unwrap();
        assert!(is_embedded_signed_message(&signed));

        let detached_sig = signature_to_armored(&signature::sign(&kp.secret, b"hello").unwrap()).unwrap();
        assert!(!is_embedded_signed_message(detached_sig.as_bytes()));
        assert!(!is_embedded_signed_message(b"hello\n"));
    }

    #[test]
    fn embedded_verify_survives_decoy_signature_block_in_body() {
        let kp = Keypair::generate("alice").unwrap();
        let ring = MemoryKeyRing::new(vec![kp.public.clone()]);
        let message: &[u8] = b"abc\n-----BEGIN REOP SIGNATURE-----\nfake\n";
        let signed = sign_embedded(&kp.secret, message).unwrap();
        let recovered = verify_embedded(&signed, None, &ring).unwrap();
        assert_eq!(recovered, message);
    }

    #[test]
    fn embedded_verify_with_explicit_public_key_skips_ring() {
        let kp = Keypair::generate("alice").unwrap();
        let empty_ring = MemoryKeyRing::new(vec![]);
        let signed = sign_embedded(&kp.secret, b"hi").unwrap();
        let recovered = verify_embedded(&signed, Some(&kp.public), &empty_ring).unwrap();
        assert_eq!(recovered, b"hi");
    }

    #[test]
    fn embedded_verify_rejects_tampered_message() {
        let kp = Keypair::generate("alice").unwrap();
        let ring = MemoryKeyRing::new(vec![kp.public.clone()]);
        let mut signed = sign_embedded(&kp.secret, b"hello").unwrap();
        let pos = signed.windows(5).position(|w| w == b"hello").unwrap();
        signed[pos] = b'H';
        assert!(verify_embedded(&signed, None, &ring).is_err());
    }

    fn sample_symmetric_header() -> EnvelopeHeader {
        EnvelopeHeader::Symmetric(SymmetricHeader {
            symalg: alg::SYM_SALSA20POLY1305,
            kdfalg: alg::KDF_BCRYPT,
            kdfrounds: kdf::DEFAULT_ROUNDS,
            salt: [1u8; 16],
            nonce: [2u8; 24],
            tag: [3u8; 16],
        })
    }

    #[test]
    fn encrypted_message_armored_roundtrip() {
        let header = sample_symmetric_header();
        let text = encrypted_message_to_armored(&header, "alice", b"some ciphertext bytes").unwrap();
        assert!(text.starts_with(ENC_BEGIN));
        let (restored_header, ident, ciphertext) = encrypted_message_from_armored(&text).unwrap();
        assert_eq!(restored_header, header);
        assert_eq!(ident, "alice");
        assert_eq!(ciphertext, b"some ciphertext bytes");
    }

    #[test]
    fn encrypted_message_binary_roundtrip() {
        let header = sample_symmetric_header();
        let bytes = encrypted_message_to_binary(&header, "alice", b"ciphertext").unwrap();
        let (restored_header, ident, ciphertext) = encrypted_message_from_binary(&bytes).unwrap();
        assert_eq!(restored_header, header);
        assert_eq!(ident, "alice");
        assert_eq!(ciphertext, b"ciphertext");
    }

    #[test]
    fn armored_and_binary_encryption_agree() {
        let alice = Keypair::generate("alice").unwrap();
        let bob = Keypair::generate("bob").unwrap();

        let mut buf_a = b"hello bob".to_vec();
        let header_a = encrypt::encrypt_current(&mut buf_a, &alice.secret, &bob.public).unwrap();
        let armored = encrypted_message_to_armored(&EnvelopeHeader::Current(header_a.clone()), "alice", &buf_a).unwrap();

        let mut buf_b = b"hello bob".to_vec();
        let header_b = encrypt::encrypt_current(&mut buf_b, &alice.secret, &bob.public).unwrap();
        let binary = encrypted_message_to_binary(&EnvelopeHeader::Current(header_b.clone()), "alice", &buf_b).unwrap();

        let (EnvelopeHeader::Current(h1), _, mut ct1) = encrypted_message_from_armored(&armored).unwrap() else {
            panic!("expected current header");
        };
        let (EnvelopeHeader::Current(h2), _, mut ct2) = encrypted_message_from_binary(&binary).unwrap() else {
            panic!("expected current header");
        };

        encrypt::decrypt_current(&mut ct1, &h1, &alice.public, &bob.secret).unwrap();
        encrypt::decrypt_current(&mut ct2, &h2, &alice.public, &bob.secret).unwrap();
        assert_eq!(ct1, b"hello bob");
        assert_eq!(ct2, b"hello bob");
    }
}
