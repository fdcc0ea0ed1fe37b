//! File-backed record store.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::ConfigDir;
use crate::provider::{decode_stored, RecordStore, MAX_RECORD_LEN};
use pwtoy_common::Result;

/// Record store backed by a single file.
///
/// The file is opened read-write (created if missing) when the store is
/// constructed and closed when the store is dropped.
pub struct FileRecordStore {
    path: PathBuf,
    file: File,
}

impl FileRecordStore {
    /// Open or create the record file at `path`.
    ///
    /// # Preconditions
    /// - The parent directory exists
    ///
    /// # Errors
    /// - Permission denied or any other I/O failure
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let mut options = OpenOptions::new();
        options.read(true).write(true).create(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let file = options.open(&path)?;
        debug!("Opened record store at {}", path.display());
        Ok(Self { path, file })
    }

    /// Create `config` if needed and open its record file.
    pub fn open_in(config: &ConfigDir) -> Result<Self> {
        config.ensure_exists()?;
        Self::open(config.record_path())
    }

    /// Path of the record file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordStore for FileRecordStore {
    fn name(&self) -> &str {
        "file"
    }

    fn read(&mut self) -> Result<Option<String>> {
        self.file.seek(SeekFrom::Start(0))?;

        // One byte past the limit distinguishes "full" from "too long".
        let mut bytes = Vec::with_capacity(MAX_RECORD_LEN + 1);
        (&mut self.file)
            .take(MAX_RECORD_LEN as u64 + 1)
            .read_to_end(&mut bytes)?;

        decode_stored(bytes)
    }

    fn write(&mut self, record: &str) -> Result<()> {
        self.file.set_len(0)?;
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(record.as_bytes())?;
        self.file.sync_all()?;

        debug!("Wrote {} byte record to {}", record.len(), self.path.display());
        Ok(())
    }
}
