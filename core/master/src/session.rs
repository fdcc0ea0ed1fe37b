//! The site password pipeline.
//!
//! A session runs one invocation end to end: authenticate the master
//! passphrase, collect the site label, derive the site key and write its
//! rounds. Every secret it creates is dropped, and therefore zeroized,
//! before `run` returns.

use std::io::Write;
use std::time::Instant;
use tracing::debug;

use crate::prompt::{Prompter, SITE_PROMPT};
use crate::verifier::MasterVerifier;
use pwtoy_common::{Result, SiteLabel};
use pwtoy_crypto::{OutputEncoder, SiteKeyDeriver};
use pwtoy_storage::RecordStore;

/// One invocation of the password pipeline.
pub struct Session<S: RecordStore> {
    verifier: MasterVerifier<S>,
    deriver: SiteKeyDeriver,
}

impl<S: RecordStore> Session<S> {
    /// Load the master record from `store` and prepare a session.
    ///
    /// # Errors
    /// - I/O errors reading the store
    /// - `CorruptRecord` if the stored record does not parse
    pub fn open(store: S) -> Result<Self> {
        Ok(Self {
            verifier: MasterVerifier::load(store)?,
            deriver: SiteKeyDeriver::default(),
        })
    }

    /// Replace the site key deriver.
    pub fn with_deriver(mut self, deriver: SiteKeyDeriver) -> Self {
        self.deriver = deriver;
        self
    }

    /// The verifier backing this session.
    pub fn verifier(&self) -> &MasterVerifier<S> {
        &self.verifier
    }

    /// Run the pipeline and write the output line to `out`.
    ///
    /// `site` is the label given on the command line; without one the
    /// prompter is asked for it.
    ///
    /// # Errors
    /// - Any fatal error from authentication
    /// - `OversizedInput` if the label does not fit beside the passphrase
    /// - `Algorithm` if derivation fails
    /// - I/O errors writing the output
    pub fn run<P, W>(&mut self, prompter: &mut P, site: Option<&[u8]>, out: &mut W) -> Result<()>
    where
        P: Prompter,
        W: Write,
    {
        let passphrase = self.verifier.authenticate(prompter)?;

        let label = match site {
            Some(bytes) => SiteLabel::for_passphrase(&passphrase, bytes)?,
            None => prompter.site_label(SITE_PROMPT, passphrase.label_capacity())?,
        };

        let started = Instant::now();
        let key = self.deriver.derive(&passphrase, &label)?;
        debug!("Derived site key in {} ms", started.elapsed().as_millis());

        OutputEncoder::write_line(&key, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompter;
    use pwtoy_common::{Error, MAX_INPUT_LEN};
    use pwtoy_crypto::{KdfParams, KEY_LENGTH};
    use pwtoy_storage::{FileRecordStore, MemoryRecordStore};
    use tempfile::TempDir;

    /// Rounds for "correct-horse" + "example.com" with the fast parameters
    /// below, from an independent Argon2d/BLAKE2b implementation.
    const FAST_GOLDEN_LINE: &str = "1664de7c3ac9f1406ff78df28b76edcae3aae6a20ead2c60ff73e64a02ae3239 \
         81347fffcf51b8975d26125c98788a20d6ad50919fa37d7c09c717a6783ba7e8 \
         4c583c36c740c20473f4be9eddab863a72d11215cb617ecc87f6716ae46cd98a \n";

    /// Same input with the production parameters.
    const SITE_GOLDEN_LINE: &str = "a6ad2bc7816052900922b0d61ee2740e91e3b3fbba8827671904627884854cf7 \
         1902532e9e0bbcee6ca39a5a96daac3ae0d4f571dfe22fef953a42367ec61e82 \
         c106820de09c4966f0ace47c370c7a2d4ec26c2d165081e39a7a588b3578aae7 \n";

    fn fast_deriver() -> SiteKeyDeriver {
        SiteKeyDeriver::new(KdfParams {
            memory_cost: 64,
            time_cost: 1,
            parallelism: 4,
            output_len: KEY_LENGTH,
        })
    }

    fn fast_session<S: RecordStore>(store: S) -> Session<S> {
        Session::open(store).unwrap().with_deriver(fast_deriver())
    }

    #[test]
    fn test_first_run_enrolls_and_prints() {
        let mut session = fast_session(MemoryRecordStore::new());
        let mut prompter = ScriptedPrompter::new(["correct-horse", "correct-horse"]);
        let mut out = Vec::new();

        session
            .run(&mut prompter, Some(b"example.com"), &mut out)
            .unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), FAST_GOLDEN_LINE);
        assert!(session.verifier().is_enrolled());
    }

    #[test]
    fn test_site_from_prompt() {
        let mut session = fast_session(MemoryRecordStore::new());
        let mut prompter =
            ScriptedPrompter::new(["correct-horse", "correct-horse"]).with_site("example.com");
        let mut out = Vec::new();

        session.run(&mut prompter, None, &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), FAST_GOLDEN_LINE);
        assert_eq!(prompter.prompts(), ["> ", "conf> ", "Site> "]);
    }

    #[test]
    fn test_production_parameters_golden() {
        let mut session = Session::open(MemoryRecordStore::new()).unwrap();
        let mut prompter = ScriptedPrompter::new(["correct-horse", "correct-horse"]);
        let mut out = Vec::new();

        session
            .run(&mut prompter, Some(b"example.com"), &mut out)
            .unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), SITE_GOLDEN_LINE);
    }

    #[test]
    fn test_output_is_stable_across_sessions() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("master.argon2");
        let mut outputs = Vec::new();

        for answers in [vec!["pass", "pass"], vec!["pass"]] {
            let mut session = fast_session(FileRecordStore::open(&path).unwrap());
            let mut prompter = ScriptedPrompter::new(answers);
            let mut out = Vec::new();
            session.run(&mut prompter, Some(b"site"), &mut out).unwrap();
            outputs.push(String::from_utf8(out).unwrap());
        }

        assert_eq!(outputs[0], outputs[1]);
        let line = outputs[0]
            .strip_suffix(" \n")
            .expect("line ends with a space and newline");
        let tokens: Vec<&str> = line.split(' ').collect();
        assert_eq!(tokens.len(), 3);
        for token in tokens {
            assert_eq!(token.len(), 64);
            assert!(token
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        }
    }

    #[test]
    fn test_oversized_site_argument() {
        let mut session = fast_session(MemoryRecordStore::new());
        let passphrase = vec![b'p'; MAX_INPUT_LEN - 4];
        let mut prompter = ScriptedPrompter::new([&passphrase, &passphrase]);
        let mut out = Vec::new();

        let result = session.run(&mut prompter, Some(b"example.com"), &mut out);

        assert!(matches!(
            result,
            Err(Error::OversizedInput {
                requested: 11,
                available: 4,
                ..
            })
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_oversized_site_prompt() {
        let mut session = fast_session(MemoryRecordStore::new());
        let passphrase = vec![b'p'; MAX_INPUT_LEN];
        let mut prompter = ScriptedPrompter::new([&passphrase, &passphrase]).with_site("a");
        let mut out = Vec::new();

        let result = session.run(&mut prompter, None, &mut out);

        assert!(matches!(result, Err(Error::OversizedInput { .. })));
        assert!(out.is_empty());
    }

    #[test]
    fn test_corrupt_record_aborts_before_prompting() {
        let result = Session::open(MemoryRecordStore::with_content("not a record"));
        assert!(matches!(result, Err(Error::CorruptRecord(_))));
    }
}
