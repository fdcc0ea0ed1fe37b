//! Master passphrase enrollment and verification.

use tracing::{debug, info};

use crate::prompt::{Prompter, CONFIRM_PROMPT, PASSPHRASE_PROMPT};
use pwtoy_common::{Passphrase, Result};
use pwtoy_crypto::{MasterRecord, Salt};
use pwtoy_storage::RecordStore;

/// Outcome of checking one passphrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The passphrase matched the record, or was confirmed and enrolled.
    Authenticated,
    /// The passphrase did not match; ask again.
    Mismatch,
}

/// Checks passphrases against the stored master record.
///
/// With no record stored, the first confirmed passphrase is enrolled and
/// becomes the master. Records are never rotated.
pub struct MasterVerifier<S: RecordStore> {
    store: S,
    record: Option<MasterRecord>,
    mismatches: u32,
}

impl<S: RecordStore> MasterVerifier<S> {
    /// Load the record from `store`.
    ///
    /// # Postconditions
    /// - An empty store leaves the verifier in enrollment mode
    ///
    /// # Errors
    /// - I/O errors from the store
    /// - `CorruptRecord` if stored content does not parse; there is no
    ///   fallback to enrollment
    pub fn load(mut store: S) -> Result<Self> {
        let record = match store.read()? {
            Some(text) => {
                let record = MasterRecord::parse(&text)?;
                debug!("Loaded master record from {} store: {:?}", store.name(), record);
                Some(record)
            }
            None => {
                debug!("No master record in {} store, enrollment required", store.name());
                None
            }
        };

        Ok(Self {
            store,
            record,
            mismatches: 0,
        })
    }

    /// Whether a master record exists.
    pub fn is_enrolled(&self) -> bool {
        self.record.is_some()
    }

    /// The loaded or freshly enrolled record.
    pub fn record(&self) -> Option<&MasterRecord> {
        self.record.as_ref()
    }

    /// Number of mismatches seen so far.
    pub fn mismatches(&self) -> u32 {
        self.mismatches
    }

    /// Give back the underlying store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Verify `passphrase`, or enroll it if no record exists.
    ///
    /// `confirm` is only called in enrollment mode and must return the
    /// second entry of the passphrase. Confirmation is a plain byte
    /// comparison; a verified passphrase is checked by recomputing the
    /// stored hash.
    ///
    /// # Postconditions
    /// - On enrollment success the new record is persisted
    /// - Every `Mismatch` increments [`mismatches`](Self::mismatches)
    ///
    /// # Errors
    /// - `Entropy` if no salt can be generated
    /// - `Algorithm` if hashing fails
    /// - I/O errors while persisting or prompting
    pub fn enroll_or_verify<F>(&mut self, passphrase: &Passphrase, confirm: F) -> Result<Verdict>
    where
        F: FnOnce() -> Result<Passphrase>,
    {
        let verdict = match &self.record {
            Some(record) => {
                if record.verify(passphrase.as_bytes())? {
                    Verdict::Authenticated
                } else {
                    Verdict::Mismatch
                }
            }
            None => {
                let confirmation = confirm()?;
                if passphrase.matches(&confirmation) {
                    self.enroll(passphrase)?;
                    Verdict::Authenticated
                } else {
                    Verdict::Mismatch
                }
            }
        };

        if verdict == Verdict::Mismatch {
            self.mismatches += 1;
            debug!("Passphrase mismatch #{}", self.mismatches);
        }
        Ok(verdict)
    }

    /// Prompt until a passphrase is accepted.
    ///
    /// There is no retry limit: mismatches are reported through
    /// [`Prompter::mismatch`] and the prompt repeats.
    ///
    /// # Errors
    /// - Any fatal error from prompting, hashing or persisting
    pub fn authenticate<P: Prompter>(&mut self, prompter: &mut P) -> Result<Passphrase> {
        loop {
            if self.mismatches > 0 {
                prompter.mismatch(self.mismatches)?;
            }

            let passphrase = prompter.passphrase(PASSPHRASE_PROMPT)?;
            let verdict =
                self.enroll_or_verify(&passphrase, || prompter.passphrase(CONFIRM_PROMPT))?;
            if verdict == Verdict::Authenticated {
                return Ok(passphrase);
            }
        }
    }

    fn enroll(&mut self, passphrase: &Passphrase) -> Result<()> {
        let salt = Salt::generate()?;
        let record = MasterRecord::create(passphrase.as_bytes(), &salt)?;
        self.store.write(&record.encode())?;

        info!("Enrolled new master passphrase in {} store", self.store.name());
        self.record = Some(record);
        Ok(())
    }
}
