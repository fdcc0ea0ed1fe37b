//! Key derivation using Argon2d.
//!
//! Argon2d is a memory-hard password hashing function. Two fixed parameter
//! sets are used: a heavy one for per-site keys and a light one for the
//! master record that only has to catch mistyped passphrases.

use argon2::{Algorithm, Argon2, Block, Params, Version};
use zeroize::Zeroize;

use crate::keys::{Salt, SiteKey, KEY_LENGTH};
use pwtoy_common::{Error, Passphrase, Result, SecretBuffer, SiteLabel, MAX_INPUT_LEN};

/// Parameters for Argon2 key derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB (e.g., 65536 = 64 MiB).
    pub memory_cost: u32,
    /// Number of iterations.
    pub time_cost: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
    /// Length of the derived output in bytes.
    pub output_len: usize,
}

impl KdfParams {
    /// Parameters for per-site key derivation.
    pub fn site() -> Self {
        Self {
            memory_cost: 65536, // 64 MiB
            time_cost: 4,
            parallelism: 4,
            output_len: KEY_LENGTH,
        }
    }

    /// Parameters for the stored master check value.
    ///
    /// Only 4 bytes of hash are kept: the record detects typos, it is not a
    /// second copy of the secret.
    pub fn check() -> Self {
        Self {
            memory_cost: 8192, // 8 MiB
            time_cost: 3,
            parallelism: 4,
            output_len: 4,
        }
    }

    fn to_argon2(self) -> Result<Params> {
        Params::new(
            self.memory_cost,
            self.time_cost,
            self.parallelism,
            Some(self.output_len),
        )
        .map_err(|e| Error::Algorithm(format!("Invalid KDF parameters: {}", e)))
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::site()
    }
}

/// Run Argon2 over `password` and `salt`, filling all of `out`.
///
/// The working memory is reserved up front so that a cost too large for
/// this machine is reported instead of aborting the process.
///
/// # Errors
/// - `Algorithm` if the parameters are rejected, the working memory cannot
///   be allocated, or hashing fails
pub(crate) fn hash_raw(
    algorithm: Algorithm,
    version: Version,
    params: &KdfParams,
    password: &[u8],
    salt: &[u8],
    out: &mut [u8],
) -> Result<()> {
    if out.len() != params.output_len {
        return Err(Error::Algorithm(format!(
            "Output buffer is {} bytes, parameters require {}",
            out.len(),
            params.output_len
        )));
    }

    let argon2_params = params.to_argon2()?;
    let block_count = argon2_params.block_count();
    let mut blocks: Vec<Block> = Vec::new();
    blocks.try_reserve_exact(block_count).map_err(|e| {
        Error::Algorithm(format!("Cannot allocate {} KiB of Argon2 memory: {}", block_count, e))
    })?;
    blocks.resize(block_count, Block::default());

    let argon2 = Argon2::new(algorithm, version, argon2_params);
    argon2
        .hash_password_into_with_memory(password, salt, out, &mut blocks)
        .map_err(|e| Error::Algorithm(format!("Key derivation failed: {}", e)))
}

/// Derives per-site keys from a verified passphrase.
#[derive(Debug, Clone)]
pub struct SiteKeyDeriver {
    params: KdfParams,
}

impl SiteKeyDeriver {
    /// Create a deriver with the given parameters.
    ///
    /// Production callers use [`KdfParams::site`] via `Default`.
    pub fn new(params: KdfParams) -> Self {
        Self { params }
    }

    /// Parameters this deriver runs with.
    pub fn params(&self) -> &KdfParams {
        &self.params
    }

    /// Derive the 32-byte key for `label`.
    ///
    /// # Preconditions
    /// - `passphrase` has already been verified against the master record
    ///
    /// # Postconditions
    /// - The key is a pure function of passphrase bytes followed directly by
    ///   label bytes; there is no separator, so ("ab", "c") and ("a", "bc")
    ///   yield the same key
    /// - The concatenated input is zeroized before returning
    ///
    /// # Errors
    /// - `OversizedInput` if passphrase and label together exceed the input budget
    /// - `Algorithm` if Argon2 fails; the caller must abort rather than retry
    ///   with other parameters
    pub fn derive(&self, passphrase: &Passphrase, label: &SiteLabel) -> Result<SiteKey> {
        if self.params.output_len != KEY_LENGTH {
            return Err(Error::Algorithm(format!(
                "Site keys are {} bytes, parameters request {}",
                KEY_LENGTH, self.params.output_len
            )));
        }

        let mut input = SecretBuffer::new("Site", MAX_INPUT_LEN);
        input.extend_from_slice(passphrase.as_bytes())?;
        input.extend_from_slice(label.as_bytes())?;

        let mut key_bytes = [0u8; KEY_LENGTH];
        hash_raw(
            Algorithm::Argon2d,
            Version::V0x13,
            &self.params,
            input.as_bytes(),
            Salt::zeroed().as_bytes(),
            &mut key_bytes,
        )?;

        let key = SiteKey::from_bytes(key_bytes);
        key_bytes.zeroize();
        Ok(key)
    }
}

impl Default for SiteKeyDeriver {
    fn default() -> Self {
        Self::new(KdfParams::site())
    }
}
