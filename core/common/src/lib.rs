//! Common utilities and types shared across pwtoy modules.
//!
//! This module provides the error type every crate returns and the
//! fixed-capacity secret buffers that carry passphrase and label bytes
//! between components.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{Passphrase, SecretBuffer, SiteLabel, MAX_INPUT_LEN};
