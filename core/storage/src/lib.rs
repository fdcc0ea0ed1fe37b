//! Record storage for pwtoy.
//!
//! This module provides a trait-based interface for where the master record
//! lives, a file-backed implementation inside the user's configuration
//! directory, and an in-memory implementation for tests.
//!
//! # Design Principles
//! - The record is opened once, read once and written at most once
//! - No locking: concurrent invocations by the same user may race
//! - Stores deal in encoded text only; parsing belongs to the crypto module

pub mod config;
pub mod local;
pub mod memory;
pub mod provider;

pub use config::{ConfigDir, APP_DIRNAME, RECORD_FILENAME};
pub use local::FileRecordStore;
pub use memory::MemoryRecordStore;
pub use provider::{RecordStore, MAX_RECORD_LEN};
