//! Prompt abstraction.
//!
//! The verifier and session never touch the terminal directly; they ask a
//! [`Prompter`] for input. The binary supplies a terminal implementation and
//! tests supply [`ScriptedPrompter`].

use std::collections::VecDeque;

use pwtoy_common::{Error, Passphrase, Result, SiteLabel};

/// Prompt for the master passphrase.
pub const PASSPHRASE_PROMPT: &str = "> ";

/// Prompt for the enrollment confirmation.
pub const CONFIRM_PROMPT: &str = "conf> ";

/// Prompt for the site label.
pub const SITE_PROMPT: &str = "Site> ";

/// Message shown after a passphrase mismatch.
pub const MISMATCH_MESSAGE: &str = "Password does not match.";

/// Source of interactive input.
pub trait Prompter {
    /// Read a passphrase without echoing it.
    fn passphrase(&mut self, prompt: &str) -> Result<Passphrase>;

    /// Read a site label of at most `capacity` bytes.
    ///
    /// # Errors
    /// - `OversizedInput` if the entered label is longer than `capacity`
    fn site_label(&mut self, prompt: &str, capacity: usize) -> Result<SiteLabel>;

    /// Report that the last passphrase did not match.
    ///
    /// `attempts` is the number of mismatches so far.
    fn mismatch(&mut self, attempts: u32) -> Result<()>;
}

/// Prompter that replays canned answers.
///
/// Useful for testing. Running out of answers yields an `UnexpectedEof` I/O
/// error, like a closed terminal.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    passphrases: VecDeque<Vec<u8>>,
    sites: VecDeque<Vec<u8>>,
    prompts: Vec<String>,
    mismatches: Vec<u32>,
}

impl ScriptedPrompter {
    /// Create a prompter answering passphrase prompts in order.
    pub fn new<I, T>(passphrases: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        Self {
            passphrases: passphrases
                .into_iter()
                .map(|p| p.as_ref().to_vec())
                .collect(),
            ..Self::default()
        }
    }

    /// Queue an answer for the site prompt.
    pub fn with_site(mut self, site: impl AsRef<[u8]>) -> Self {
        self.sites.push_back(site.as_ref().to_vec());
        self
    }

    /// Every prompt shown so far, in order.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Attempt counts passed to [`Prompter::mismatch`].
    pub fn mismatches(&self) -> &[u32] {
        &self.mismatches
    }
}

fn exhausted(what: &str) -> Error {
    Error::Io(std::io::Error::new(
        std::io::ErrorKind::UnexpectedEof,
        format!("no scripted {} left", what),
    ))
}

impl Prompter for ScriptedPrompter {
    fn passphrase(&mut self, prompt: &str) -> Result<Passphrase> {
        self.prompts.push(prompt.to_string());
        let answer = self
            .passphrases
            .pop_front()
            .ok_or_else(|| exhausted("passphrase"))?;
        Passphrase::from_bytes(&answer)
    }

    fn site_label(&mut self, prompt: &str, capacity: usize) -> Result<SiteLabel> {
        self.prompts.push(prompt.to_string());
        let answer = self.sites.pop_front().ok_or_else(|| exhausted("site"))?;
        SiteLabel::new(&answer, capacity)
    }

    fn mismatch(&mut self, attempts: u32) -> Result<()> {
        self.mismatches.push(attempts);
        Ok(())
    }
}
