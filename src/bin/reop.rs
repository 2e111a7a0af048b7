//! `reop` command-line driver.
//!
//! Thin glue only, per the core's design: argument parsing, default path
//! derivation, TTY passphrase prompting, and key-ring file loading. Every
//! byte-format and cryptographic decision lives in the `reop` library;
//! this binary never touches an algorithm identifier or a raw struct
//! layout directly.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use reop::envelope::header::{EnvelopeHeader, LegacyCsHeader};
use reop::error::{Error, Result};
use reop::io::{self, FileMode};
use reop::keyring::{ArmoredKeyRing, FindPublicKey};
use reop::keys::{Keypair, PublicKey, SecretKey};
use reop::passphrase::{PassphraseProvider, TtyPassphraseProvider};
use reop::signature;
use reop::{alg, encrypt, kdf, message};

#[derive(Parser, Debug)]
#[command(
    name = "reop",
    version,
    about = "Sign, verify, encrypt, and decrypt files with Ed25519 and Curve25519"
)]
struct Cli {
    /// Suppress informational messages; only errors are printed.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a new signing and encryption keypair.
    Generate {
        /// Identity string embedded in the generated keys (at most 63 bytes).
        #[arg(short = 'i', long)]
        ident: String,
        /// Public key output path (default `$HOME/.reop/pubkey`).
        #[arg(short = 'p', long)]
        pubkey: Option<PathBuf>,
        /// Secret key output path (default `$HOME/.reop/seckey`).
        #[arg(short = 's', long)]
        seckey: Option<PathBuf>,
        /// Generate with no passphrase (the zero-round sentinel).
        #[arg(short = 'n', long)]
        no_passphrase: bool,
        /// bcrypt-pbkdf iteration count (ignored with `--no-passphrase`).
        #[arg(short = 'z', long, default_value_t = kdf::DEFAULT_ROUNDS)]
        rounds: u32,
    },

    /// Sign a message, producing a detached or embedded signature.
    Sign {
        /// Secret key path (default `$HOME/.reop/seckey`).
        #[arg(short = 's', long)]
        seckey: Option<PathBuf>,
        /// Message file to sign (`-` for stdin).
        #[arg(short = 'm', long)]
        message: PathBuf,
        /// Signature output path (default `<message>.sig`).
        #[arg(short = 'x', long)]
        sigfile: Option<PathBuf>,
        /// Embed the signature with the message instead of writing it detached.
        #[arg(short = 'e', long)]
        embed: bool,
    },

    /// Verify a detached or embedded signature.
    Verify {
        /// Signer's public key path; if omitted, looked up by ident in the key-ring.
        #[arg(short = 'p', long)]
        pubkey: Option<PathBuf>,
        /// Message file. By default its content is sniffed for a
        /// `SIGNED MESSAGE` marker to decide embedded vs. detached mode.
        #[arg(short = 'm', long)]
        message: PathBuf,
        /// Detached signature path (default `<message>.sig`); ignored in embedded mode.
        #[arg(short = 'x', long)]
        sigfile: Option<PathBuf>,
        /// Force embedded-signature verification instead of sniffing the
        /// message file's content for the `SIGNED MESSAGE` marker.
        #[arg(short = 'e', long)]
        embed: bool,
        /// Key-ring path (default `$HOME/.reop/pubkeyring`).
        #[arg(long)]
        pubkeyring: Option<PathBuf>,
    },

    /// Encrypt a file symmetrically or to a recipient's public key.
    Encrypt {
        /// Plaintext file to encrypt (`-` for stdin).
        #[arg(short = 'm', long)]
        message: PathBuf,
        /// Ciphertext output path (default `<message>.enc`).
        #[arg(short = 'o', long)]
        out: Option<PathBuf>,
        /// Recipient's public key (selects public-key encryption).
        #[arg(short = 'p', long)]
        pubkey: Option<PathBuf>,
        /// Sender's secret key, required for public-key encryption
        /// (default `$HOME/.reop/seckey`).
        #[arg(short = 's', long)]
        seckey: Option<PathBuf>,
        /// Encrypt with a passphrase instead of a recipient key.
        #[arg(short = 'P', long)]
        symmetric: bool,
        /// Emit the binary `RBF` framing instead of armored text.
        #[arg(short = 'b', long)]
        binary: bool,
        /// Emit the legacy v1-compatible (`CS`) envelope instead of the
        /// current ephemeral-key (`eC`) one. Public-key mode only.
        #[arg(short = '1', long)]
        legacy: bool,
    },

    /// Decrypt a file produced by `encrypt`.
    Decrypt {
        /// Ciphertext file to decrypt (`-` for stdin).
        #[arg(short = 'm', long)]
        ciphertext: PathBuf,
        /// Plaintext output path (default: strip the `.enc` suffix).
        #[arg(short = 'o', long)]
        out: Option<PathBuf>,
        /// Sender's public key, required for public-key envelopes that
        /// bind a sender identity (`eC`, `CS`).
        #[arg(short = 'p', long)]
        pubkey: Option<PathBuf>,
        /// Recipient's secret key (default `$HOME/.reop/seckey`).
        #[arg(short = 's', long)]
        seckey: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            if cli.quiet {
                "reop=warn".into()
            } else {
                "reop=info".into()
            }
        }))
        .without_time()
        .with_target(false)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("reop: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Generate {
            ident,
            pubkey,
            seckey,
            no_passphrase,
            rounds,
        } => cmd_generate(ident, pubkey, seckey, no_passphrase, rounds, cli.quiet),
        Command::Sign {
            seckey,
            message,
            sigfile,
            embed,
        } => cmd_sign(seckey, message, sigfile, embed),
        Command::Verify {
            pubkey,
            message,
            sigfile,
            embed,
            pubkeyring,
        } => cmd_verify(pubkey, message, sigfile, embed, pubkeyring, cli.quiet),
        Command::Encrypt {
            message,
            out,
            pubkey,
            seckey,
            symmetric,
            binary,
            legacy,
        } => cmd_encrypt(message, out, pubkey, seckey, symmetric, binary, legacy),
        Command::Decrypt {
            ciphertext,
            out,
            pubkey,
            seckey,
        } => cmd_decrypt(ciphertext, out, pubkey, seckey),
    }
}

// ── Path defaults ─────────────────────────────────────────────────────────

fn reop_home() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| Error::Io("could not determine home directory".into()))?;
    Ok(home.join(".reop"))
}

fn default_pubkey_path() -> Result<PathBuf> {
    Ok(reop_home()?.join("pubkey"))
}

fn default_seckey_path() -> Result<PathBuf> {
    Ok(reop_home()?.join("seckey"))
}

fn default_pubkeyring_path() -> Result<PathBuf> {
    Ok(reop_home()?.join("pubkeyring"))
}

/// `<path>.<ext>`, except `-` (stdio) maps to `-` so piping still works.
fn default_sibling(path: &Path, ext: &str) -> PathBuf {
    if path.as_os_str() == "-" {
        return PathBuf::from("-");
    }
    let mut s = path.as_os_str().to_os_string();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

/// The default decrypt output path: strip a trailing `.enc`, or fall back
/// to appending `.dec` if the ciphertext wasn't named that way.
fn default_decrypted_sibling(path: &Path) -> PathBuf {
    if path.as_os_str() == "-" {
        return PathBuf::from("-");
    }
    match path.to_str().and_then(|s| s.strip_suffix(".enc")) {
        Some(stripped) => PathBuf::from(stripped),
        None => default_sibling(path, "dec"),
    }
}

fn path_str(p: &Path) -> Result<&str> {
    p.to_str().ok_or_else(|| Error::Io(format!("{}: not valid UTF-8", p.display())))
}

// ── Shared key loading ────────────────────────────────────────────────────

fn load_public_key(path: &Path) -> Result<PublicKey> {
    let bytes = io::read_all(path_str(path)?)?;
    let text = String::from_utf8(bytes).map_err(|_| Error::Format("public key file is not valid UTF-8".into()))?;
    message::public_key_from_armored(&text)
}

fn load_secret_key(path: &Path, confirm: bool) -> Result<SecretKey> {
    let bytes = io::read_all(path_str(path)?)?;
    let text = String::from_utf8(bytes).map_err(|_| Error::Format("secret key file is not valid UTF-8".into()))?;
    let provider = TtyPassphraseProvider;
    let passphrase = provider.read_passphrase("passphrase", confirm)?;
    message::secret_key_from_armored(&text, passphrase.as_bytes())
}

fn load_keyring(path: &Path) -> ArmoredKeyRing {
    let text = std::fs::read_to_string(path).unwrap_or_default();
    ArmoredKeyRing::from_text(text)
}

// ── Commands ──────────────────────────────────────────────────────────────

fn cmd_generate(
    ident: String,
    pubkey: Option<PathBuf>,
    seckey: Option<PathBuf>,
    no_passphrase: bool,
    rounds: u32,
    quiet: bool,
) -> Result<()> {
    let pubkey_path = match pubkey {
        Some(p) => p,
        None => default_pubkey_path()?,
    };
    let seckey_path = match seckey {
        Some(p) => p,
        None => default_seckey_path()?,
    };

    for path in [&pubkey_path, &seckey_path] {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(Error::from)?;
            }
        }
    }

    let keypair = Keypair::generate(&ident)?;

    let (passphrase, actual_rounds) = if no_passphrase {
        (String::new(), kdf::NO_PASSWORD_ROUNDS)
    } else {
        let provider = TtyPassphraseProvider;
        (provider.read_passphrase("passphrase", true)?, rounds)
    };

    let pub_armored = message::public_key_to_armored(&keypair.public)?;
    let sec_armored = message::secret_key_to_armored(&keypair.secret, passphrase.as_bytes(), actual_rounds)?;

    io::write_all(path_str(&pubkey_path)?, pub_armored.as_bytes(), FileMode::Default, true)?;
    io::write_all(path_str(&seckey_path)?, sec_armored.as_bytes(), FileMode::Secret, true)?;

    if !quiet {
        tracing::info!(
            ident = %ident,
            pubkey = %pubkey_path.display(),
            seckey = %seckey_path.display(),
            "generated keypair"
        );
    }
    Ok(())
}

fn cmd_sign(seckey: Option<PathBuf>, message_path: PathBuf, sigfile: Option<PathBuf>, embed: bool) -> Result<()> {
    let seckey_path = match seckey {
        Some(p) => p,
        None => default_seckey_path()?,
    };
    let secret = load_secret_key(&seckey_path, false)?;
    let msg_bytes = io::read_all(path_str(&message_path)?)?;

    let out_path = sigfile.unwrap_or_else(|| default_sibling(&message_path, "sig"));

    if embed {
        let signed = message::sign_embedded(&secret, &msg_bytes)?;
        io::write_all(path_str(&out_path)?, &signed, FileMode::Default, false)
    } else {
        let sig = signature::sign(&secret, &msg_bytes)?;
        let armored = message::signature_to_armored(&sig)?;
        io::write_all(path_str(&out_path)?, armored.as_bytes(), FileMode::Default, false)
    }
}

fn cmd_verify(
    pubkey: Option<PathBuf>,
    message_path: PathBuf,
    sigfile: Option<PathBuf>,
    embed: bool,
    pubkeyring: Option<PathBuf>,
    quiet: bool,
) -> Result<()> {
    let ring_path = match pubkeyring {
        Some(p) => p,
        None => default_pubkeyring_path()?,
    };
    let ring = load_keyring(&ring_path);

    let explicit_pub = match &pubkey {
        Some(p) => Some(load_public_key(p)?),
        None => None,
    };

    let data = io::read_all(path_str(&message_path)?)?;
    let use_embedded = embed || message::is_embedded_signed_message(&data);

    if use_embedded {
        let recovered = message::verify_embedded(&data, explicit_pub.as_ref(), &ring)?;
        io::write_all("-", &recovered, FileMode::Default, false)?;
    } else {
        let sig_path = sigfile.unwrap_or_else(|| default_sibling(&message_path, "sig"));
        let sig_bytes = io::read_all(path_str(&sig_path)?)?;
        let sig_text = String::from_utf8(sig_bytes).map_err(|_| Error::Format("signature file is not valid UTF-8".into()))?;
        let sig = message::signature_from_armored(&sig_text)?;

        let public = match explicit_pub {
            Some(p) => p,
            None => ring.find_public_key_by_ident(&sig.ident)?,
        };

        signature::verify(&public, &data, &sig)?;
        if !quiet {
            tracing::info!(ident = %sig.ident, "signature verified");
        }
    }
    Ok(())
}

fn cmd_encrypt(
    message_path: PathBuf,
    out: Option<PathBuf>,
    pubkey: Option<PathBuf>,
    seckey: Option<PathBuf>,
    symmetric: bool,
    binary: bool,
    legacy: bool,
) -> Result<()> {
    let mut plaintext = io::read_all(path_str(&message_path)?)?;
    let out_path = out.unwrap_or_else(|| default_sibling(&message_path, "enc"));

    let (header, ident) = if symmetric {
        let provider = TtyPassphraseProvider;
        let passphrase = provider.read_passphrase("passphrase", true)?;
        let header = encrypt::encrypt_symmetric(&mut plaintext, passphrase.as_bytes(), kdf::DEFAULT_ROUNDS)?;
        (EnvelopeHeader::Symmetric(header), String::new())
    } else {
        let pubkey_path = pubkey.ok_or_else(|| Error::NoKey("recipient public key required for public-key encryption".into()))?;
        let recipient = load_public_key(&pubkey_path)?;
        let seckey_path = match seckey {
            Some(p) => p,
            None => default_seckey_path()?,
        };
        let sender = load_secret_key(&seckey_path, false)?;

        if legacy {
            let (nonce, tag) = reop::primitives::pub_encrypt(&mut plaintext, &recipient.enckey, &sender.enckey)?;
            let header = LegacyCsHeader {
                encalg: alg::ENC_CURVE25519,
                secrandomid: sender.randomid,
                pubrandomid: recipient.randomid,
                nonce,
                tag,
            };
            (EnvelopeHeader::LegacyCs(header), sender.ident.clone())
        } else {
            let header = encrypt::encrypt_current(&mut plaintext, &sender, &recipient)?;
            (EnvelopeHeader::Current(header), sender.ident.clone())
        }
    };

    let payload = if binary {
        message::encrypted_message_to_binary(&header, &ident, &plaintext)?
    } else {
        message::encrypted_message_to_armored(&header, &ident, &plaintext)?.into_bytes()
    };

    io::write_all(path_str(&out_path)?, &payload, FileMode::Default, false)
}

fn cmd_decrypt(ciphertext_path: PathBuf, out: Option<PathBuf>, pubkey: Option<PathBuf>, seckey: Option<PathBuf>) -> Result<()> {
    let bytes = io::read_all(path_str(&ciphertext_path)?)?;
    let out_path = out.unwrap_or_else(|| default_decrypted_sibling(&ciphertext_path));

    let (header, _ident, mut ciphertext) = if bytes.starts_with(&alg::BINARY_MAGIC) {
        message::encrypted_message_from_binary(&bytes)?
    } else {
        let text = String::from_utf8(bytes).map_err(|_| Error::Format("ciphertext is neither RBF binary nor valid UTF-8 armor".into()))?;
        message::encrypted_message_from_armored(&text)?
    };

    let seckey_path = match seckey {
        Some(p) => p,
        None => default_seckey_path()?,
    };

    match &header {
        EnvelopeHeader::Symmetric(h) => {
            let provider = TtyPassphraseProvider;
            let passphrase = provider.read_passphrase("passphrase", false)?;
            encrypt::decrypt_symmetric(&mut ciphertext, h, passphrase.as_bytes())?;
        }
        EnvelopeHeader::Current(h) => {
            let recipient_sec = load_secret_key(&seckey_path, false)?;
            let pubkey_path = pubkey.ok_or_else(|| Error::NoKey("sender public key required to decrypt".into()))?;
            let sender_pub = load_public_key(&pubkey_path)?;
            encrypt::decrypt_current(&mut ciphertext, h, &sender_pub, &recipient_sec)?;
        }
        EnvelopeHeader::LegacyCs(h) => {
            let recipient_sec = load_secret_key(&seckey_path, false)?;
            let pubkey_path = pubkey.ok_or_else(|| Error::NoKey("sender public key required to decrypt".into()))?;
            let sender_pub = load_public_key(&pubkey_path)?;
            encrypt::decrypt_legacy_cs(&mut ciphertext, h, &sender_pub, &recipient_sec)?;
        }
        EnvelopeHeader::LegacyEs(h) => {
            let recipient_sec = load_secret_key(&seckey_path, false)?;
            encrypt::decrypt_legacy_es(&mut ciphertext, h, &recipient_sec)?;
        }
    }

    io::write_all(path_str(&out_path)?, &ciphertext, FileMode::Default, false)
}
