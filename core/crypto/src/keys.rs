//! Key types with secure memory handling.
//!
//! All key types automatically zeroize their memory on drop to prevent
//! sensitive data from persisting in memory.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use pwtoy_common::{Error, Result};

/// Length of a derived site key in bytes (256-bit).
pub const KEY_LENGTH: usize = 32;

/// Length of Argon2 salts in bytes.
pub const SALT_LENGTH: usize = 8;

/// Raw 32-byte key derived from passphrase and site label.
///
/// Never persisted; consumed by the output rounds and wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SiteKey {
    key: [u8; KEY_LENGTH],
}

impl SiteKey {
    /// Create a site key from raw bytes.
    pub fn from_bytes(key: [u8; KEY_LENGTH]) -> Self {
        Self { key }
    }

    /// Get the key bytes.
    ///
    /// # Security
    /// The returned slice should be used immediately and not stored.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl fmt::Debug for SiteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SiteKey([REDACTED])")
    }
}

/// Salt for key derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Salt([u8; SALT_LENGTH]);

impl Salt {
    /// Generate a random salt from the operating system's entropy source.
    ///
    /// # Errors
    /// - `Entropy` if the source is unavailable; there is no weaker fallback
    pub fn generate() -> Result<Self> {
        let mut salt = [0u8; SALT_LENGTH];
        getrandom::getrandom(&mut salt).map_err(|e| Error::Entropy(e.to_string()))?;
        Ok(Self(salt))
    }

    /// The all-zero salt used for per-site derivation.
    ///
    /// Site keys must be reproducible from passphrase and label alone, so
    /// they are never salted randomly.
    pub fn zeroed() -> Self {
        Self([0u8; SALT_LENGTH])
    }

    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; SALT_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Get the salt bytes.
    pub fn as_bytes(&self) -> &[u8; SALT_LENGTH] {
        &self.0
    }
}
