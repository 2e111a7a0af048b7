//! # Encryption Flows
//!
//! Symmetric (passphrase) and public-key encryption, the latter in both its
//! current ephemeral-key form and its two legacy forms (read-only; this
//! crate never produces `CS` or `eS` envelopes, only `SP` and `eC`).
//!
//! ## Current public-key scheme (`eC`): double box for forward secrecy
//!
//! ```text
//! encrypt(sender_sec, recipient_pub, msg):
//!   (eph_sec, eph_pub) <- fresh ephemeral keypair
//!   ephpubkey, ephnonce, ephtag <- box(eph_pub;      sender_sec,  recipient_pub)
//!   ciphertext, nonce, tag      <- box(msg;          eph_sec,     recipient_pub)
//!
//! decrypt(recipient_sec, sender_pub, header):
//!   check header.secrandomid == sender_pub.randomid    (Mismatch)
//!   check header.pubrandomid == recipient_pub.randomid (Mismatch)
//!   eph_pub <- unbox(ephpubkey; sender_pub, recipient_sec)   (AuthFail)
//!   msg     <- unbox(ciphertext; eph_pub,   recipient_sec)   (AuthFail)
//! ```
//!
//! The outer box is keyed by a one-time ephemeral secret that is discarded
//! after use, so compromise of a long-term secret key does not expose past
//! message contents. The inner box over `eph_pub` is what binds the
//! envelope to the sender's long-term key.

use crate::envelope::header::{CurrentHeader, LegacyCsHeader, LegacyEsHeader, SymmetricHeader};
use crate::error::{Error, Result};
use crate::kdf;
use crate::keys::{PublicKey, SecretKey};
use crate::primitives;

/// Encrypt `plaintext` in place under a passphrase, returning the header
/// needed to decrypt it.
pub fn encrypt_symmetric(plaintext: &mut [u8], passphrase: &[u8], rounds: u32) -> Result<SymmetricHeader> {
    let mut salt = [0u8; kdf::SALT_SIZE];
    primitives::random_bytes(&mut salt);
    let key = kdf::derive_key(passphrase, &salt, rounds)?;
    let (nonce, tag) = primitives::sym_encrypt(plaintext, &key)?;
    Ok(SymmetricHeader {
        symalg: crate::alg::SYM_SALSA20POLY1305,
        kdfalg: crate::alg::KDF_BCRYPT,
        kdfrounds: rounds,
        salt,
        nonce,
        tag,
    })
}

/// Decrypt `ciphertext` in place under a passphrase and the header produced
/// by [`encrypt_symmetric`].
pub fn decrypt_symmetric(ciphertext: &mut [u8], header: &SymmetricHeader, passphrase: &[u8]) -> Result<()> {
    let key = kdf::derive_key(passphrase, &header.salt, header.kdfrounds)?;
    primitives::sym_decrypt(ciphertext, &header.nonce, &header.tag, &key)
}

/// Encrypt `plaintext` in place from `sender` to `recipient`, producing a
/// current (`eC`) envelope header.
pub fn encrypt_current(plaintext: &mut [u8], sender: &SecretKey, recipient: &PublicKey) -> Result<CurrentHeader> {
    let eph_sec_raw = crypto_box::SecretKey::generate(&mut rand::rngs::OsRng);
    let eph_sec_bytes = eph_sec_raw.to_bytes();
    let mut eph_pub_buf = *eph_sec_raw.public_key().as_bytes();

    let (ephnonce, ephtag) = primitives::pub_encrypt(&mut eph_pub_buf, &recipient.enckey, &sender.enckey)?;
    let (nonce, tag) = primitives::pub_encrypt(plaintext, &recipient.enckey, &eph_sec_bytes)?;

    Ok(CurrentHeader {
        encalg: crate::alg::ENV_EPHEMERAL_CURRENT,
        secrandomid: sender.randomid,
        pubrandomid: recipient.randomid,
        ephpubkey: eph_pub_buf,
        ephnonce,
        ephtag,
        nonce,
        tag,
    })
}

/// Decrypt a current (`eC`) envelope in place. `sender_pub` is the public
/// key the caller believes sent the message (looked up by `ident` in the
/// envelope); `recipient_sec` is the local secret key.
pub fn decrypt_current(
    ciphertext: &mut [u8],
    header: &CurrentHeader,
    sender_pub: &PublicKey,
    recipient_sec: &SecretKey,
) -> Result<()> {
    if header.secrandomid != sender_pub.randomid {
        tracing::warn!("current envelope sender randomid does not match");
        return Err(Error::Mismatch);
    }
    if header.pubrandomid != recipient_sec.randomid {
        tracing::warn!("current envelope recipient randomid does not match");
        return Err(Error::Mismatch);
    }

    let mut eph_pub_buf = header.ephpubkey;
    primitives::pub_decrypt(
        &mut eph_pub_buf,
        &header.ephnonce,
        &header.ephtag,
        &sender_pub.enckey,
        &recipient_sec.enckey,
    )?;

    primitives::pub_decrypt(ciphertext, &header.nonce, &header.tag, &eph_pub_buf, &recipient_sec.enckey)
}

/// Decrypt a legacy `CS` envelope: a direct box with no ephemeral key.
///
/// The source this format comes from has a duplicated comparison here
/// (it checks `pubrandomid` against the secret key's `randomid` twice,
/// never actually checking `secrandomid` against anything). That is not
/// reproduced: this binds both `secrandomid` and `pubrandomid` to the two
/// supplied keys, accepting either assignment of "sender" vs "recipient"
/// to the two arguments, before any cryptography runs.
pub fn decrypt_legacy_cs(
    ciphertext: &mut [u8],
    header: &LegacyCsHeader,
    sender_pub: &PublicKey,
    recipient_sec: &SecretKey,
) -> Result<()> {
    let forward = header.secrandomid == sender_pub.randomid && header.pubrandomid == recipient_sec.randomid;
    let swapped = header.secrandomid == recipient_sec.randomid && header.pubrandomid == sender_pub.randomid;
    if !forward && !swapped {
        return Err(Error::Mismatch);
    }
    primitives::pub_decrypt(
        ciphertext,
        &header.nonce,
        &header.tag,
        &sender_pub.enckey,
        &recipient_sec.enckey,
    )
}

/// Decrypt a legacy `eS` envelope: an anonymous-sender scheme where the
/// ephemeral public key travels in plaintext in the header, so there is no
/// sender binding to check, only the recipient's own identity.
pub fn decrypt_legacy_es(
    ciphertext: &mut [u8],
    header: &LegacyEsHeader,
    recipient_sec: &SecretKey,
) -> Result<()> {
    if header.pubrandomid != recipient_sec.randomid {
        return Err(Error::Mismatch);
    }
    primitives::pub_decrypt(
        ciphertext,
        &header.nonce,
        &header.tag,
        &header.pubkey,
        &recipient_sec.enckey,
    )
}
