//! End-to-end scenarios from the spec's testable-properties section,
//! driven through on-disk files rather than in-memory structs, exercising
//! the `io` and `message` layers together the way the CLI binary does.

use std::fs;

use reop::envelope::header::EnvelopeHeader;
use reop::error::Error;
use reop::io::{self, FileMode};
use reop::keyring::MemoryKeyRing;
use reop::keys::Keypair;
use reop::{encrypt, kdf, message, signature};

fn write(dir: &std::path::Path, name: &str, bytes: &[u8]) -> String {
    let path = dir.join(name);
    io::write_all(path.to_str().unwrap(), bytes, FileMode::Default, false).unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn s1_detached_sign_verify_and_tamper() {
    let dir = tempfile::tempdir().unwrap();
    let alice = Keypair::generate("alice").unwrap();

    let msg_path = write(dir.path(), "hello.txt", b"hello\n");
    let msg = io::read_all(&msg_path).unwrap();

    let sig = signature::sign(&alice.secret, &msg).unwrap();
    let sig_text = message::signature_to_armored(&sig).unwrap();
    let sig_path = write(dir.path(), "hello.txt.sig", sig_text.as_bytes());

    let restored_sig = message::signature_from_armored(&std::fs::read_to_string(&sig_path).unwrap()).unwrap();
    signature::verify(&alice.public, &msg, &restored_sig).unwrap();

    let tampered = b"hellp\n";
    assert!(matches!(
        signature::verify(&alice.public, tampered, &restored_sig),
        Err(Error::AuthFail)
    ));
}

#[test]
fn s2_current_envelope_roundtrip_and_wrong_sender() {
    let alice = Keypair::generate("alice").unwrap();
    let bob = Keypair::generate("bob").unwrap();
    let carol = Keypair::generate("carol").unwrap();

    let mut plaintext = b"secret".to_vec();
    let header = encrypt::encrypt_current(&mut plaintext, &alice.secret, &bob.public).unwrap();
    let armored = message::encrypted_message_to_armored(
        &EnvelopeHeader::Current(header),
        &alice.secret.ident,
        &plaintext,
    )
    .unwrap();

    let (header, _ident, mut ciphertext) = message::encrypted_message_from_armored(&armored).unwrap();
    let EnvelopeHeader::Current(current) = header else {
        panic!("expected current header");
    };

    let mut for_bob = ciphertext.clone();
    encrypt::decrypt_current(&mut for_bob, &current, &alice.public, &bob.secret).unwrap();
    assert_eq!(for_bob, b"secret");

    assert!(matches!(
        encrypt::decrypt_current(&mut ciphertext, &current, &carol.public, &bob.secret),
        Err(Error::Mismatch)
    ));
}

#[test]
fn s3_symmetric_roundtrip_and_wrong_passphrase() {
    let mut plaintext = b"password-protected".to_vec();
    let header = encrypt::encrypt_symmetric(&mut plaintext, b"pw", kdf::DEFAULT_ROUNDS).unwrap();

    let mut copy = plaintext.clone();
    encrypt::decrypt_symmetric(&mut copy, &header, b"pw").unwrap();
    assert_eq!(copy, b"password-protected");

    assert!(matches!(
        encrypt::decrypt_symmetric(&mut plaintext, &header, b"pw2"),
        Err(Error::AuthFail)
    ));
}

#[test]
fn s4_secret_key_file_wrong_passphrase() {
    let dir = tempfile::tempdir().unwrap();
    let kp = Keypair::generate("alice").unwrap();
    let armored = message::secret_key_to_armored(&kp.secret, b"pw", kdf::DEFAULT_ROUNDS).unwrap();
    let path = write(dir.path(), "seckey", armored.as_bytes());

    let text = fs::read_to_string(&path).unwrap();
    let restored = message::secret_key_from_armored(&text, b"pw").unwrap();
    assert_eq!(restored.sigkey, kp.secret.sigkey);

    assert!(matches!(
        message::secret_key_from_armored(&text, b""),
        Err(Error::AuthFail)
    ));
}

#[test]
fn s5_embedded_signature_survives_decoy_block() {
    let kp = Keypair::generate("alice").unwrap();
    let ring = MemoryKeyRing::new(vec![kp.public.clone()]);

    let message_body: &[u8] = b"abc\n-----BEGIN REOP SIGNATURE-----\nfake\n";
    let signed = message::sign_embedded(&kp.secret, message_body).unwrap();
    let recovered = message::verify_embedded(&signed, None, &ring).unwrap();
    assert_eq!(recovered, message_body);
}

#[test]
fn s6_legacy_cs_envelope_decrypts_with_current_code() {
    use reop::alg;
    use reop::envelope::header::LegacyCsHeader;
    use reop::primitives;

    let alice = Keypair::generate("alice").unwrap();
    let bob = Keypair::generate("bob").unwrap();

    let mut buf = b"v1 message".to_vec();
    let (nonce, tag) = primitives::pub_encrypt(&mut buf, &bob.public.enckey, &alice.secret.enckey).unwrap();
    let header = LegacyCsHeader {
        encalg: alg::ENC_CURVE25519,
        secrandomid: alice.secret.randomid,
        pubrandomid: bob.public.randomid,
        nonce,
        tag,
    };

    let binary = message::encrypted_message_to_binary(
        &EnvelopeHeader::LegacyCs(header),
        &alice.secret.ident,
        &buf,
    )
    .unwrap();

    let (decoded_header, _ident, mut ciphertext) = message::encrypted_message_from_binary(&binary).unwrap();
    let EnvelopeHeader::LegacyCs(decoded) = decoded_header else {
        panic!("expected legacy CS header");
    };
    encrypt::decrypt_legacy_cs(&mut ciphertext, &decoded, &alice.public, &bob.secret).unwrap();
    assert_eq!(ciphertext, b"v1 message");
}

#[test]
fn public_and_secret_key_files_round_trip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let kp = Keypair::generate("alice").unwrap();

    let pub_armored = message::public_key_to_armored(&kp.public).unwrap();
    let sec_armored = message::secret_key_to_armored(&kp.secret, b"pw", kdf::DEFAULT_ROUNDS).unwrap();

    let pub_path = write(dir.path(), "pubkey", pub_armored.as_bytes());
    let sec_path = write(dir.path(), "seckey", sec_armored.as_bytes());

    let pub_text = fs::read_to_string(&pub_path).unwrap();
    let sec_text = fs::read_to_string(&sec_path).unwrap();

    let restored_pub = message::public_key_from_armored(&pub_text).unwrap();
    let restored_sec = message::secret_key_from_armored(&sec_text, b"pw").unwrap();

    assert_eq!(restored_pub, kp.public);
    assert_eq!(restored_sec.public_key(), kp.public);
}
