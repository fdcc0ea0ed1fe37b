//! Master passphrase handling and the site password pipeline.
//!
//! This module provides:
//! - Enrollment and verification of the master passphrase
//! - The prompt abstraction used to collect passphrases and site labels
//! - The session that runs verify, derive and encode in order
//!
//! # Architecture
//! The master module sits between the user interface and the crypto and
//! storage modules. It owns every secret buffer for the duration of one
//! invocation; buffers are wiped when the session returns, on success and on
//! error.

pub mod prompt;
pub mod session;
pub mod verifier;

pub use prompt::{Prompter, ScriptedPrompter};
pub use session::Session;
pub use verifier::{MasterVerifier, Verdict};
