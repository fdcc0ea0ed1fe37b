//! Common error types for pwtoy.

use thiserror::Error;

/// Top-level error type for pwtoy operations.
///
/// Every variant is fatal: callers propagate it to the binary, which reports
/// it and exits. A passphrase mismatch is not an error; the verifier reports
/// it as a verdict and prompts again.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O on the record file or the terminal failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The secure random source could not be read.
    #[error("Entropy source unavailable: {0}")]
    Entropy(String),

    /// Argon2 or BLAKE2 rejected its parameters or could not allocate.
    #[error("Algorithm failure: {0}")]
    Algorithm(String),

    /// Input does not fit the space left in its buffer.
    #[error("{what} too long: {requested} bytes requested, {available} available")]
    OversizedInput {
        what: &'static str,
        requested: usize,
        available: usize,
    },

    /// The stored master record could not be parsed.
    #[error("Corrupt master record: {0}")]
    CorruptRecord(String),

    /// No configuration directory could be resolved.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
