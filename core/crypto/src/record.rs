//! Master record: the stored check value for the master passphrase.
//!
//! The record uses the Argon2 reference encoding,
//! `$argon2d$v=19$m=8192,t=3,p=4$<salt>$<hash>`, with salt and hash in
//! standard base64 without padding. The format is shared with other Argon2
//! tooling and must not change.

use argon2::{Algorithm, Version};
use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use std::fmt;
use std::str::FromStr;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::kdf::{hash_raw, KdfParams};
use crate::keys::{Salt, SALT_LENGTH};
use pwtoy_common::{Error, Result};

/// Parsed master record.
#[derive(Clone, PartialEq, Eq)]
pub struct MasterRecord {
    algorithm: Algorithm,
    version: Version,
    params: KdfParams,
    salt: Vec<u8>,
    hash: Vec<u8>,
}

impl MasterRecord {
    /// Hash `passphrase` into a new record with [`KdfParams::check`].
    ///
    /// # Errors
    /// - `Algorithm` if Argon2 fails
    pub fn create(passphrase: &[u8], salt: &Salt) -> Result<Self> {
        Self::create_with(passphrase, salt, KdfParams::check())
    }

    /// Hash `passphrase` into a new record with explicit parameters.
    pub fn create_with(passphrase: &[u8], salt: &Salt, params: KdfParams) -> Result<Self> {
        let mut hash = vec![0u8; params.output_len];
        hash_raw(
            Algorithm::Argon2d,
            Version::V0x13,
            &params,
            passphrase,
            salt.as_bytes(),
            &mut hash,
        )?;

        Ok(Self {
            algorithm: Algorithm::Argon2d,
            version: Version::V0x13,
            params,
            salt: salt.as_bytes().to_vec(),
            hash,
        })
    }

    /// Parse an encoded record.
    ///
    /// Trailing whitespace (such as a newline added by an editor) is
    /// ignored; anything else that deviates from the encoding is rejected.
    ///
    /// # Errors
    /// - `CorruptRecord` if the text is not a valid Argon2 encoding
    pub fn parse(encoded: &str) -> Result<Self> {
        let encoded = encoded.trim_end();
        let mut fields = encoded.split('$');

        if fields.next() != Some("") {
            return Err(corrupt("missing leading '$'"));
        }

        let algorithm = match fields.next() {
            Some("argon2d") => Algorithm::Argon2d,
            Some("argon2i") => Algorithm::Argon2i,
            Some("argon2id") => Algorithm::Argon2id,
            Some(other) => return Err(corrupt(format!("unknown algorithm '{}'", other))),
            None => return Err(corrupt("missing algorithm")),
        };

        let mut next = fields.next().ok_or_else(|| corrupt("missing parameters"))?;
        // The version field is optional; records without one are v1.0.
        let version = match next.strip_prefix("v=") {
            Some(v) => {
                let version = match parse_decimal(v, "version")? {
                    0x10 => Version::V0x10,
                    0x13 => Version::V0x13,
                    other => return Err(corrupt(format!("unsupported version {}", other))),
                };
                next = fields.next().ok_or_else(|| corrupt("missing parameters"))?;
                version
            }
            None => Version::V0x10,
        };

        let (memory_cost, time_cost, parallelism) = parse_params(next)?;

        let salt = decode_field(fields.next(), "salt")?;
        let hash = decode_field(fields.next(), "hash")?;
        if fields.next().is_some() {
            return Err(corrupt("unexpected trailing fields"));
        }
        if salt.len() < SALT_LENGTH {
            return Err(corrupt(format!("salt is {} bytes", salt.len())));
        }

        let params = KdfParams {
            memory_cost,
            time_cost,
            parallelism,
            output_len: hash.len(),
        };
        argon2::Params::new(memory_cost, time_cost, parallelism, Some(hash.len()))
            .map_err(|e| corrupt(format!("invalid parameters: {}", e)))?;

        Ok(Self {
            algorithm,
            version,
            params,
            salt,
            hash,
        })
    }

    /// Encode the record as a single line of text.
    pub fn encode(&self) -> String {
        format!(
            "${}$v={}$m={},t={},p={}${}${}",
            self.algorithm.as_str(),
            u32::from(self.version),
            self.params.memory_cost,
            self.params.time_cost,
            self.params.parallelism,
            STANDARD_NO_PAD.encode(&self.salt),
            STANDARD_NO_PAD.encode(&self.hash),
        )
    }

    /// Check `passphrase` against the stored hash.
    ///
    /// # Returns
    /// - `Ok(true)` if the recomputed hash matches
    /// - `Ok(false)` if it does not
    /// - `Err(_)` if hashing itself failed
    pub fn verify(&self, passphrase: &[u8]) -> Result<bool> {
        let mut candidate = vec![0u8; self.hash.len()];
        hash_raw(
            self.algorithm,
            self.version,
            &self.params,
            passphrase,
            &self.salt,
            &mut candidate,
        )?;

        let matched: bool = candidate.ct_eq(&self.hash).into();
        candidate.zeroize();
        Ok(matched)
    }

    /// Cost parameters stored in the record.
    pub fn params(&self) -> &KdfParams {
        &self.params
    }
}

impl fmt::Display for MasterRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl fmt::Debug for MasterRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MasterRecord")
            .field("algorithm", &self.algorithm)
            .field("version", &self.version)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl FromStr for MasterRecord {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn corrupt(msg: impl Into<String>) -> Error {
    Error::CorruptRecord(msg.into())
}

fn parse_decimal(s: &str, what: &str) -> Result<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(corrupt(format!("invalid {} '{}'", what, s)));
    }
    s.parse()
        .map_err(|_| corrupt(format!("{} out of range '{}'", what, s)))
}

/// Parse `m=<memory>,t=<time>,p=<lanes>` in that order.
fn parse_params(s: &str) -> Result<(u32, u32, u32)> {
    let mut values = [0u32; 3];
    let mut parts = s.split(',');
    for (value, key) in values.iter_mut().zip(["m=", "t=", "p="]) {
        let part = parts
            .next()
            .and_then(|p| p.strip_prefix(key))
            .ok_or_else(|| corrupt(format!("expected '{}' in '{}'", key, s)))?;
        *value = parse_decimal(part, key.trim_end_matches('='))?;
    }
    if parts.next().is_some() {
        return Err(corrupt(format!("unexpected parameters in '{}'", s)));
    }
    Ok((values[0], values[1], values[2]))
}

fn decode_field(field: Option<&str>, what: &str) -> Result<Vec<u8>> {
    let field = field.ok_or_else(|| corrupt(format!("missing {}", what)))?;
    STANDARD_NO_PAD
        .decode(field)
        .map_err(|e| corrupt(format!("invalid {} encoding: {}", what, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Produced by an independent Argon2d implementation for passphrase
    /// "hunter2" and salt "pwtoy-ts".
    const HUNTER2_RECORD: &str = "$argon2d$v=19$m=8192,t=3,p=4$cHd0b3ktdHM$HFqgPg";

    fn fast_check_params() -> KdfParams {
        KdfParams {
            memory_cost: 64,
            time_cost: 1,
            parallelism: 4,
            output_len: 4,
        }
    }

    #[test]
    fn test_reference_record_verifies() {
        let record = MasterRecord::parse(HUNTER2_RECORD).unwrap();

        assert_eq!(record.params(), &KdfParams::check());
        assert!(record.verify(b"hunter2").unwrap());
        assert!(!record.verify(b"hunter3").unwrap());
    }

    #[test]
    fn test_create_matches_reference() {
        let salt = Salt::from_bytes(*b"pwtoy-ts");
        let record = MasterRecord::create(b"hunter2", &salt).unwrap();

        assert_eq!(record.encode(), HUNTER2_RECORD);
    }

    #[test]
    fn test_encode_parse() {
        let salt = Salt::from_bytes([7u8; SALT_LENGTH]);
        let record = MasterRecord::create_with(b"secret", &salt, fast_check_params()).unwrap();

        let encoded = record.encode();
        assert!(encoded.starts_with("$argon2d$v=19$m=64,t=1,p=4$"));
        assert_eq!(MasterRecord::parse(&encoded).unwrap(), record);
        assert_eq!(encoded.parse::<MasterRecord>().unwrap(), record);
    }

    #[test]
    fn test_trailing_newline_ignored() {
        let record = MasterRecord::parse(&format!("{}\n", HUNTER2_RECORD)).unwrap();
        assert_eq!(record.encode(), HUNTER2_RECORD);
    }

    #[test]
    fn test_missing_version_is_v10() {
        let record = MasterRecord::parse("$argon2d$m=64,t=1,p=4$cHd0b3ktdHM$HFqgPg").unwrap();
        assert!(record.encode().starts_with("$argon2d$v=16$"));
    }

    #[test]
    fn test_corrupt_records_rejected() {
        let cases = [
            "garbage",
            "argon2d$v=19$m=8192,t=3,p=4$cHd0b3ktdHM$HFqgPg",
            "$scrypt$v=19$m=8192,t=3,p=4$cHd0b3ktdHM$HFqgPg",
            "$argon2d$v=18$m=8192,t=3,p=4$cHd0b3ktdHM$HFqgPg",
            "$argon2d$v=19$t=3,m=8192,p=4$cHd0b3ktdHM$HFqgPg",
            "$argon2d$v=19$m=8192,t=3$cHd0b3ktdHM$HFqgPg",
            "$argon2d$v=19$m=8192,t=3,p=4,x=1$cHd0b3ktdHM$HFqgPg",
            "$argon2d$v=19$m=+8192,t=3,p=4$cHd0b3ktdHM$HFqgPg",
            "$argon2d$v=19$m=8192,t=3,p=4$cHd0b3k$HFqgPg",
            "$argon2d$v=19$m=8192,t=3,p=4$cHd0b3ktdHM$HF",
            "$argon2d$v=19$m=8192,t=3,p=4$cHd0b3ktdHM=$HFqgPg",
            "$argon2d$v=19$m=8192,t=3,p=4$cHd0b3ktdHM",
            "$argon2d$v=19$m=8192,t=3,p=4$cHd0b3ktdHM$HFqgPg$extra",
            "$argon2d$v=19$m=1,t=3,p=4$cHd0b3ktdHM$HFqgPg",
            "$argon2d$v=19$m=8192,t=0,p=4$cHd0b3ktdHM$HFqgPg",
        ];

        for case in cases {
            assert!(
                matches!(MasterRecord::parse(case), Err(Error::CorruptRecord(_))),
                "accepted corrupt record {case:?}"
            );
        }
    }

    #[test]
    fn test_unallocatable_memory_cost_is_an_error() {
        let record =
            MasterRecord::parse("$argon2d$v=19$m=4294967295,t=1,p=1$cHd0b3ktdHM$HFqgPg").unwrap();

        assert!(matches!(record.verify(b"hunter2"), Err(Error::Algorithm(_))));
    }

    #[test]
    fn test_debug_omits_hash() {
        let record = MasterRecord::parse(HUNTER2_RECORD).unwrap();
        assert!(!format!("{record:?}").contains("HFqgPg"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_record_only_accepts_its_passphrase(
            passphrase in proptest::collection::vec(any::<u8>(), 0..32),
            other in proptest::collection::vec(any::<u8>(), 0..32),
            salt in any::<[u8; SALT_LENGTH]>(),
        ) {
            let record = MasterRecord::create_with(
                &passphrase,
                &Salt::from_bytes(salt),
                KdfParams { output_len: 16, ..fast_check_params() },
            ).unwrap();
            let restored = MasterRecord::parse(&record.encode()).unwrap();

            prop_assert!(restored.verify(&passphrase).unwrap());
            if other != passphrase {
                prop_assert!(!restored.verify(&other).unwrap());
            }
        }
    }
}
