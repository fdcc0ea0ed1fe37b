//! Cryptographic primitives for pwtoy.
//!
//! This module provides:
//! - Per-site key derivation using Argon2d
//! - The self-describing master record used to check the passphrase
//! - Output rounds rendering a site key as hex using BLAKE2b-256
//!
//! # Security Guarantees
//! - All key material is automatically zeroized on drop
//! - No passphrase or key material is ever logged
//! - Stored-hash comparison is constant-time

pub mod kdf;
pub mod keys;
pub mod record;
pub mod rounds;

pub use kdf::{KdfParams, SiteKeyDeriver};
pub use keys::{Salt, SiteKey, KEY_LENGTH, SALT_LENGTH};
pub use record::MasterRecord;
pub use rounds::{round, OutputEncoder, RoundOutput, Rounds, ROUNDS};
