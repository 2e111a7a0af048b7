//! # Envelope Headers
//!
//! The four encrypted-message envelope variants share a 2-byte algorithm
//! tag at the front of their header and nothing else — in a C union they'd
//! overlap in memory; here they are an explicit tagged enum. [`EnvelopeHeader::parse`]
//! reads the tag, dispatches to the matching fixed-size layout, and rejects
//! any input whose length doesn't exactly match that variant's size.

use crate::alg;
use crate::error::{Error, Result};
use crate::keys::RANDOMID_SIZE;
use crate::primitives::{NONCE_SIZE, TAG_SIZE};

/// Symmetric (passphrase) envelope header. Tag `SP`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymmetricHeader {
    pub symalg: [u8; 2],
    pub kdfalg: [u8; 2],
    pub kdfrounds: u32,
    pub salt: [u8; 16],
    pub nonce: [u8; NONCE_SIZE],
    pub tag: [u8; TAG_SIZE],
}

pub const SYMMETRIC_HEADER_SIZE: usize = 2 + 2 + 4 + 16 + NONCE_SIZE + TAG_SIZE;

impl SymmetricHeader {
    fn to_bytes(&self) -> [u8; SYMMETRIC_HEADER_SIZE] {
        let mut out = [0u8; SYMMETRIC_HEADER_SIZE];
        let mut off = 0;
        out[off..off + 2].copy_from_slice(&self.symalg);
        off += 2;
        out[off..off + 2].copy_from_slice(&self.kdfalg);
        off += 2;
        out[off..off + 4].copy_from_slice(&self.kdfrounds.to_be_bytes());
        off += 4;
        out[off..off + 16].copy_from_slice(&self.salt);
        off += 16;
        out[off..off + NONCE_SIZE].copy_from_slice(&self.nonce);
        off += NONCE_SIZE;
        out[off..off + TAG_SIZE].copy_from_slice(&self.tag);
        out
    }

    fn from_bytes(b: &[u8]) -> Result<Self> {
        if b.len() != SYMMETRIC_HEADER_SIZE {
            return Err(Error::Format("bad symmetric header size".into()));
        }
        let symalg = [b[0], b[1]];
        let kdfalg = [b[2], b[3]];
        alg::require(symalg, alg::SYM_SALSA20POLY1305)?;
        alg::require(kdfalg, alg::KDF_BCRYPT)?;
        let kdfrounds = u32::from_be_bytes(b[4..8].try_into().unwrap());
        let mut salt = [0u8; 16];
        salt.copy_from_slice(&b[8..24]);
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&b[24..24 + NONCE_SIZE]);
        let mut tag = [0u8; TAG_SIZE];
        tag.copy_from_slice(&b[24 + NONCE_SIZE..]);
        Ok(Self {
            symalg,
            kdfalg,
            kdfrounds,
            salt,
            nonce,
            tag,
        })
    }
}

/// Current ephemeral-key public-key envelope header. Tag `eC`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrentHeader {
    pub encalg: [u8; 2],
    pub secrandomid: [u8; RANDOMID_SIZE],
    pub pubrandomid: [u8; RANDOMID_SIZE],
    pub ephpubkey: [u8; 32],
    pub ephnonce: [u8; NONCE_SIZE],
    pub ephtag: [u8; TAG_SIZE],
    pub nonce: [u8; NONCE_SIZE],
    pub tag: [u8; TAG_SIZE],
}

pub const CURRENT_HEADER_SIZE: usize =
    2 + RANDOMID_SIZE + RANDOMID_SIZE + 32 + NONCE_SIZE + TAG_SIZE + NONCE_SIZE + TAG_SIZE;

impl CurrentHeader {
    fn to_bytes(&self) -> [u8; CURRENT_HEADER_SIZE] {
        let mut out = [0u8; CURRENT_HEADER_SIZE];
        let mut off = 0;
        out[off..off + 2].copy_from_slice(&self.encalg);
        off += 2;
        out[off..off + RANDOMID_SIZE].copy_from_slice(&self.secrandomid);
        off += RANDOMID_SIZE;
        out[off..off + RANDOMID_SIZE].copy_from_slice(&self.pubrandomid);
        off += RANDOMID_SIZE;
        out[off..off + 32].copy_from_slice(&self.ephpubkey);
        off += 32;
        out[off..off + NONCE_SIZE].copy_from_slice(&self.ephnonce);
        off += NONCE_SIZE;
        out[off..off + TAG_SIZE].copy_from_slice(&self.ephtag);
        off += TAG_SIZE;
        out[off..off + NONCE_SIZE].copy_from_slice(&self.nonce);
        off += NONCE_SIZE;
        out[off..off + TAG_SIZE].copy_from_slice(&self.tag);
        out
    }

    fn from_bytes(b: &[u8]) -> Result<Self> {
        if b.len() != CURRENT_HEADER_SIZE {
            return Err(Error::Format("bad current envelope header size".into()));
        }
        let encalg = [b[0], b[1]];
        alg::require(encalg, alg::ENC_CURVE25519)?;
        let mut off = 2;
        let mut secrandomid = [0u8; RANDOMID_SIZE];
        secrandomid.copy_from_slice(&b[off..off + RANDOMID_SIZE]);
        off += RANDOMID_SIZE;
        let mut pubrandomid = [0u8; RANDOMID_SIZE];
        pubrandomid.copy_from_slice(&b[off..off + RANDOMID_SIZE]);
        off += RANDOMID_SIZE;
        let mut ephpubkey = [0u8; 32];
        ephpubkey.copy_from_slice(&b[off..off + 32]);
        off += 32;
        let mut ephnonce = [0u8; NONCE_SIZE];
        ephnonce.copy_from_slice(&b[off..off + NONCE_SIZE]);
        off += NONCE_SIZE;
        let mut ephtag = [0u8; TAG_SIZE];
        ephtag.copy_from_slice(&b[off..off + TAG_SIZE]);
        off += TAG_SIZE;
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&b[off..off + NONCE_SIZE]);
        off += NONCE_SIZE;
        let mut tag = [0u8; TAG_SIZE];
        tag.copy_from_slice(&b[off..off + TAG_SIZE]);
        Ok(Self {
            encalg,
            secrandomid,
            pubrandomid,
            ephpubkey,
            ephnonce,
            ephtag,
            nonce,
            tag,
        })
    }
}

/// Legacy `CS` envelope header: no ephemeral key, body boxed directly
/// between the two static keys.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegacyCsHeader {
    pub encalg: [u8; 2],
    pub secrandomid: [u8; RANDOMID_SIZE],
    pub pubrandomid: [u8; RANDOMID_SIZE],
    pub nonce: [u8; NONCE_SIZE],
    pub tag: [u8; TAG_SIZE],
}

pub const LEGACY_CS_HEADER_SIZE: usize = 2 + RANDOMID_SIZE + RANDOMID_SIZE + NONCE_SIZE + TAG_SIZE;

impl LegacyCsHeader {
    fn to_bytes(&self) -> [u8; LEGACY_CS_HEADER_SIZE] {
        let mut out = [0u8; LEGACY_CS_HEADER_SIZE];
        let mut off = 0;
        out[off..off + 2].copy_from_slice(&self.encalg);
        off += 2;
        out[off..off + RANDOMID_SIZE].copy_from_slice(&self.secrandomid);
        off += RANDOMID_SIZE;
        out[off..off + RANDOMID_SIZE].copy_from_slice(&self.pubrandomid);
        off += RANDOMID_SIZE;
        out[off..off + NONCE_SIZE].copy_from_slice(&self.nonce);
        off += NONCE_SIZE;
        out[off..off + TAG_SIZE].copy_from_slice(&self.tag);
        out
    }

    fn from_bytes(b: &[u8]) -> Result<Self> {
        if b.len() != LEGACY_CS_HEADER_SIZE {
            return Err(Error::Format("bad legacy CS header size".into()));
        }
        let encalg = [b[0], b[1]];
        alg::require(encalg, alg::ENC_CURVE25519)?;
        let mut off = 2;
        let mut secrandomid = [0u8; RANDOMID_SIZE];
        secrandomid.copy_from_slice(&b[off..off + RANDOMID_SIZE]);
        off += RANDOMID_SIZE;
        let mut pubrandomid = [0u8; RANDOMID_SIZE];
        pubrandomid.copy_from_slice(&b[off..off + RANDOMID_SIZE]);
        off += RANDOMID_SIZE;
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&b[off..off + NONCE_SIZE]);
        off += NONCE_SIZE;
        let mut tag = [0u8; TAG_SIZE];
        tag.copy_from_slice(&b[off..off + TAG_SIZE]);
        Ok(Self {
            encalg,
            secrandomid,
            pubrandomid,
            nonce,
            tag,
        })
    }
}

/// Legacy `eS` envelope header: only the recipient's secret is needed; the
/// envelope itself carries an ephemeral public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegacyEsHeader {
    pub ekcalg: [u8; 2],
    pub pubrandomid: [u8; RANDOMID_SIZE],
    pub pubkey: [u8; 32],
    pub nonce: [u8; NONCE_SIZE],
    pub tag: [u8; TAG_SIZE],
}

pub const LEGACY_ES_HEADER_SIZE: usize = 2 + RANDOMID_SIZE + 32 + NONCE_SIZE + TAG_SIZE;

impl LegacyEsHeader {
    fn to_bytes(&self) -> [u8; LEGACY_ES_HEADER_SIZE] {
        let mut out = [0u8; LEGACY_ES_HEADER_SIZE];
        let mut off = 0;
        out[off..off + 2].copy_from_slice(&self.ekcalg);
        off += 2;
        out[off..off + RANDOMID_SIZE].copy_from_slice(&self.pubrandomid);
        off += RANDOMID_SIZE;
        out[off..off + 32].copy_from_slice(&self.pubkey);
        off += 32;
        out[off..off + NONCE_SIZE].copy_from_slice(&self.nonce);
        off += NONCE_SIZE;
        out[off..off + TAG_SIZE].copy_from_slice(&self.tag);
        out
    }

    fn from_bytes(b: &[u8]) -> Result<Self> {
        if b.len() != LEGACY_ES_HEADER_SIZE {
            return Err(Error::Format("bad legacy eS header size".into()));
        }
        let ekcalg = [b[0], b[1]];
        alg::require(ekcalg, alg::ENV_EPHEMERAL_LEGACY)?;
        let mut off = 2;
        let mut pubrandomid = [0u8; RANDOMID_SIZE];
        pubrandomid.copy_from_slice(&b[off..off + RANDOMID_SIZE]);
        off += RANDOMID_SIZE;
        let mut pubkey = [0u8; 32];
        pubkey.copy_from_slice(&b[off..off + 32]);
        off += 32;
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&b[off..off + NONCE_SIZE]);
        off += NONCE_SIZE;
        let mut tag = [0u8; TAG_SIZE];
        tag.copy_from_slice(&b[off..off + TAG_SIZE]);
        Ok(Self {
            ekcalg,
            pubrandomid,
            pubkey,
            nonce,
            tag,
        })
    }
}

/// A tagged envelope header, dispatched on its leading 2-byte algorithm tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnvelopeHeader {
    Symmetric(SymmetricHeader),
    Current(CurrentHeader),
    LegacyCs(LegacyCsHeader),
    LegacyEs(LegacyEsHeader),
}

impl EnvelopeHeader {
    /// Serialize to bytes, including the leading tag (already part of each
    /// variant's first field).
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            EnvelopeHeader::Symmetric(h) => h.to_bytes().to_vec(),
            EnvelopeHeader::Current(h) => h.to_bytes().to_vec(),
            EnvelopeHeader::LegacyCs(h) => h.to_bytes().to_vec(),
            EnvelopeHeader::LegacyEs(h) => h.to_bytes().to_vec(),
        }
    }

    /// Dispatch on the leading 2-byte tag and parse the matching
    /// fixed-size layout. The byte length must equal that variant's exact
    /// size; any mismatch (or an unrecognized tag) is a hard rejection.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 2 {
            return Err(Error::Format("envelope header too short".into()));
        }
        let tag = [bytes[0], bytes[1]];
        tracing::trace!(tag = %String::from_utf8_lossy(&tag), "dispatching envelope header");
        match tag {
            t if t == alg::SYM_SALSA20POLY1305 => {
                Ok(EnvelopeHeader::Symmetric(SymmetricHeader::from_bytes(bytes)?))
            }
            t if t == alg::ENV_EPHEMERAL_CURRENT => {
                Ok(EnvelopeHeader::Current(CurrentHeader::from_bytes(bytes)?))
            }
            t if t == alg::ENC_CURVE25519 => {
                Ok(EnvelopeHeader::LegacyCs(LegacyCsHeader::from_bytes(bytes)?))
            }
            t if t == alg::ENV_EPHEMERAL_LEGACY => {
                Ok(EnvelopeHeader::LegacyEs(LegacyEsHeader::from_bytes(bytes)?))
            }
            other => {
                tracing::warn!(tag = %String::from_utf8_lossy(&other), "unrecognized envelope algorithm tag");
                Err(Error::AlgorithmUnsupported(other))
            }
        }
    }
}
