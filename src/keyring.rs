//! # Key-Ring Lookup
//!
//! Looking up a public key by `ident` is the one place the core needs help
//! from the outside world that isn't the passphrase prompt or raw file I/O:
//! it's a search over a file of concatenated armored `PUBLIC KEY` blocks
//! (one per line-separated entry; blank lines between blocks are allowed,
//! blank lines inside one are not, since a block's base64 body never
//! contains an empty line).
//!
//! [`FindPublicKey`] is the seam: the core depends on the trait, not on
//! `std::fs` directly, so callers can substitute an in-memory ring in tests.

use crate::envelope::armor;
use crate::error::{Error, Result};
use crate::keys::PublicKey;

/// A source of public keys addressable by `ident`.
pub trait FindPublicKey {
    /// Find the public key whose `ident` equals `ident`, or
    /// [`Error::NoKey`] if none matches.
    fn find_public_key_by_ident(&self, ident: &str) -> Result<PublicKey>;
}

/// A key-ring backed by the text contents of one or more concatenated
/// armored `PUBLIC KEY` files.
pub struct ArmoredKeyRing {
    text: String,
}

impl ArmoredKeyRing {
    pub fn from_text(text: String) -> Self {
        Self { text }
    }
}

impl FindPublicKey for ArmoredKeyRing {
    fn find_public_key_by_ident(&self, ident: &str) -> Result<PublicKey> {
        let mut search_from = 0;
        loop {
            let (begin_at, block) = match find_block_at_or_after(&self.text, search_from) {
                Some(found) => found,
                None => return Err(Error::NoKey(ident.to_string())),
            };
            if block.ident == ident {
                let raw: [u8; crate::keys::PUBLIC_KEY_RAW_SIZE] = block
                    .payload
                    .as_slice()
                    .try_into()
                    .map_err(|_| Error::Format("bad PUBLIC KEY payload size".into()))?;
                return PublicKey::from_raw_bytes(&raw, block.ident);
            }
            search_from = begin_at + 1;
        }
    }
}

fn find_block_at_or_after(text: &str, start_at: usize) -> Option<(usize, armor::ArmorBlock)> {
    let begin_marker = "-----BEGIN REOP PUBLIC KEY-----";
    let rel = text[start_at..].find(begin_marker)?;
    let begin_at = start_at + rel;
    let block = armor::parse_first_block(&text[begin_at..], "PUBLIC KEY").ok()?;
    Some((begin_at, block))
}

/// A trivial in-memory key-ring, useful for tests and for callers that have
/// already parsed their keys.
pub struct MemoryKeyRing {
    keys: Vec<PublicKey>,
}

impl MemoryKeyRing {
    pub fn new(keys: Vec<PublicKey>) -> Self {
        Self { keys }
    }
}

impl FindPublicKey for MemoryKeyRing {
    fn find_public_key_by_ident(&self, ident: &str) -> Result<PublicKey> {
        self.keys
            .iter()
            .find(|k| k.ident == ident)
            .cloned()
            .ok_or_else(|| Error::NoKey(ident.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Keypair;

    #[test]
    fn memory_ring_finds_by_ident() {
        let alice = Keypair::generate("alice").unwrap();
        let ring = MemoryKeyRing::new(vec![alice.public.clone()]);
        assert_eq!(ring.find_public_key_by_ident("alice").unwrap(), alice.public);
        assert!(ring.find_public_key_by_ident("bob").is_err());
    }

    #[test]
    fn armored_ring_finds_the_right_block_among_several() {
        let alice = Keypair::generate("alice").unwrap();
        let bob = Keypair::generate("bob").unwrap();

        let mut text = armor::encode_block("PUBLIC KEY", "alice", &alice.public.to_raw_bytes()).unwrap();
        text.push('\n');
        text.push_str(&armor::encode_block("PUBLIC KEY", "bob", &bob.public.to_raw_bytes()).unwrap());

        let ring = ArmoredKeyRing::from_text(text);
        assert_eq!(ring.find_public_key_by_ident("bob").unwrap(), bob.public);
        assert!(ring.find_public_key_by_ident("mallory").is_err());
    }
}
