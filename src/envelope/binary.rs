//! # Binary Framing
//!
//! ```text
//! "RBF\0"  fixed-size header (variant dispatched by its leading tag)
//! identity_len: u32 (big-endian)   identity bytes   ciphertext-to-EOF
//! ```
//!
//! Binary framing is read for all four envelope variants (so old archives
//! stay decryptable) but only ever written for the current ones (`SP`
//! symmetric, `eC` public-key).

use crate::alg;
use crate::envelope::header::EnvelopeHeader;
use crate::error::{Error, Result};
use crate::keys::IDENT_MAX;

/// Encode a binary envelope: magic, header, identity, ciphertext.
pub fn encode(header: &EnvelopeHeader, ident: &str, ciphertext: &[u8]) -> Result<Vec<u8>> {
    if ident.len() > IDENT_MAX {
        return Err(Error::Format(format!("ident exceeds {IDENT_MAX} bytes")));
    }
    let ident_bytes = ident.as_bytes();

    let mut out = Vec::with_capacity(
        alg::BINARY_MAGIC.len() + 64 + 4 + ident_bytes.len() + ciphertext.len(),
    );
    out.extend_from_slice(&alg::BINARY_MAGIC);
    out.extend_from_slice(&header.to_bytes());
    out.extend_from_slice(&(ident_bytes.len() as u32).to_be_bytes());
    out.extend_from_slice(ident_bytes);
    out.extend_from_slice(ciphertext);
    Ok(out)
}

/// A decoded binary envelope.
pub struct DecodedEnvelope {
    pub header: EnvelopeHeader,
    pub ident: String,
    pub ciphertext: Vec<u8>,
}

/// Decode a binary envelope. The header's own size (fixed per algorithm
/// tag) determines where the identity-length field begins.
pub fn decode(bytes: &[u8]) -> Result<DecodedEnvelope> {
    let magic_len = alg::BINARY_MAGIC.len();
    if bytes.len() < magic_len || bytes[..magic_len] != alg::BINARY_MAGIC {
        return Err(Error::Format("missing RBF magic".into()));
    }
    let rest = &bytes[magic_len..];

    if rest.len() < 2 {
        return Err(Error::Format("binary envelope too short".into()));
    }
    let tag = [rest[0], rest[1]];
    let header_size = header_size_for_tag(tag)?;
    if rest.len() < header_size + 4 {
        return Err(Error::Format("binary envelope truncated before identity length".into()));
    }

    let header = EnvelopeHeader::parse(&rest[..header_size])?;
    let after_header = &rest[header_size..];

    let ident_len = u32::from_be_bytes(after_header[..4].try_into().unwrap()) as usize;
    if ident_len > IDENT_MAX {
        return Err(Error::Format(format!("ident exceeds {IDENT_MAX} bytes")));
    }
    let after_len = &after_header[4..];
    if after_len.len() < ident_len {
        return Err(Error::Format("binary envelope truncated before identity bytes".into()));
    }
    let ident = std::str::from_utf8(&after_len[..ident_len])
        .map_err(|_| Error::Format("identity is not valid utf-8".into()))?
        .to_string();
    let ciphertext = after_len[ident_len..].to_vec();

    Ok(DecodedEnvelope {
        header,
        ident,
        ciphertext,
    })
}

fn header_size_for_tag(tag: [u8; 2]) -> Result<usize> {
    use crate::envelope::header::{
        CURRENT_HEADER_SIZE, LEGACY_CS_HEADER_SIZE, LEGACY_ES_HEADER_SIZE, SYMMETRIC_HEADER_SIZE,
    };
    match tag {
        t if t == alg::SYM_SALSA20POLY1305 => Ok(SYMMETRIC_HEADER_SIZE),
        t if t == alg::ENV_EPHEMERAL_CURRENT => Ok(CURRENT_HEADER_SIZE),
        t if t == alg::ENC_CURVE25519 => Ok(LEGACY_CS_HEADER_SIZE),
        t if t == alg::ENV_EPHEMERAL_LEGACY => Ok(LEGACY_ES_HEADER_SIZE),
        other => Err(Error::AlgorithmUnsupported(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::header::{SymmetricHeader, SYMMETRIC_HEADER_SIZE};

    fn sample_symmetric_header() -> EnvelopeHeader {
        EnvelopeHeader::Symmetric(SymmetricHeader {
            symalg: alg::SYM_SALSA20POLY1305,
            kdfalg: alg::KDF_BCRYPT,
            kdfrounds: 42,
            salt: [1u8; 16],
            nonce: [2u8; 24],
            tag: [3u8; 16],
        })
    }

    #[test]
    fn encode_decode_roundtrip() {
        let header = sample_symmetric_header();
        let ciphertext = b"ciphertext bytes go here".to_vec();
        let encoded = encode(&header, "alice", &ciphertext).unwrap();
        assert_eq!(&encoded[..4], b"RBF\0");

        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded.ident, "alice");
        assert_eq!(decoded.ciphertext, ciphertext);
        assert_eq!(decoded.header, header);
    }

    #[test]
    fn rejects_missing_magic() {
        let mut encoded = encode(&sample_symmetric_header(), "alice", b"ct").unwrap();
        encoded[0] = b'X';
        assert!(decode(&encoded).is_err());
    }

    #[test]
    fn rejects_oversized_identity_length() {
        let header = sample_symmetric_header();
        let mut encoded = encode(&header, "a", b"ct").unwrap();
        let len_off = 4 + SYMMETRIC_HEADER_SIZE;
        encoded[len_off..len_off + 4].copy_from_slice(&(IDENT_MAX as u32 + 1).to_be_bytes());
        assert!(decode(&encoded).is_err());
    }
}
