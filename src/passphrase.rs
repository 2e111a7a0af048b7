//! # Passphrase Collection
//!
//! The core never talks to a TTY directly: every passphrase-consuming
//! operation takes a `&dyn PassphraseProvider`, so tests can substitute a
//! fixed string and the CLI can substitute a real prompt.

use crate::error::{Error, Result};

/// A source of passphrases.
pub trait PassphraseProvider {
    /// Read a passphrase, showing `prompt`. If `confirm` is set, prompt a
    /// second time and return [`Error::Passphrase`] if the two disagree.
    fn read_passphrase(&self, prompt: &str, confirm: bool) -> Result<String>;
}

/// Prompts on the controlling terminal with echo disabled, via `rpassword`.
pub struct TtyPassphraseProvider;

impl PassphraseProvider for TtyPassphraseProvider {
    fn read_passphrase(&self, prompt: &str, confirm: bool) -> Result<String> {
        let first = rpassword::prompt_password(format!("{prompt}: "))
            .map_err(|e| Error::Passphrase(format!("failed to read passphrase: {e}")))?;
        if confirm {
            let second = rpassword::prompt_password(format!("{prompt} (again): "))
                .map_err(|e| Error::Passphrase(format!("failed to read passphrase: {e}")))?;
            if first != second {
                return Err(Error::Passphrase("passphrases did not match".into()));
            }
        }
        Ok(first)
    }
}

/// A fixed passphrase, for scripted or non-interactive use (and for tests).
pub struct FixedPassphraseProvider(pub String);

impl PassphraseProvider for FixedPassphraseProvider {
    fn read_passphrase(&self, _prompt: &str, _confirm: bool) -> Result<String> {
        Ok(self.0.clone())
    }
}
