//! In-memory record store for testing.

use crate::provider::{decode_stored, RecordStore};
use pwtoy_common::Result;

/// In-memory record store.
///
/// Useful for testing. Counts writes so tests can assert that a record was
/// or was not persisted.
#[derive(Debug, Default, Clone)]
pub struct MemoryRecordStore {
    content: Vec<u8>,
    writes: usize,
}

impl MemoryRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `content`.
    pub fn with_content(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: content.into(),
            writes: 0,
        }
    }

    /// Raw stored bytes.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Number of successful writes.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl RecordStore for MemoryRecordStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn read(&mut self) -> Result<Option<String>> {
        decode_stored(self.content.clone())
    }

    fn write(&mut self, record: &str) -> Result<()> {
        self.content = record.as_bytes().to_vec();
        self.writes += 1;
        Ok(())
    }
}
