//! Record store trait definition.

use pwtoy_common::{Error, Result};

/// Largest record a store will return, in bytes.
pub const MAX_RECORD_LEN: usize = 1023;

/// Storage for the single encoded master record.
///
/// Implementations are synchronous and hold the underlying handle open for
/// their whole lifetime.
pub trait RecordStore {
    /// Get the store name (e.g., "file", "memory").
    fn name(&self) -> &str;

    /// Read the stored record.
    ///
    /// # Postconditions
    /// - `Ok(None)` if nothing has been stored yet (empty content)
    /// - `Ok(Some(text))` with the raw stored text otherwise
    ///
    /// # Errors
    /// - I/O errors
    /// - `CorruptRecord` if the content is not UTF-8 or exceeds
    ///   [`MAX_RECORD_LEN`]
    fn read(&mut self) -> Result<Option<String>>;

    /// Replace the stored record with `record`.
    ///
    /// # Postconditions
    /// - The store holds exactly `record`; no bytes of a previous, longer
    ///   record remain
    fn write(&mut self, record: &str) -> Result<()>;
}

/// Validate raw stored bytes.
pub(crate) fn decode_stored(bytes: Vec<u8>) -> Result<Option<String>> {
    if bytes.is_empty() {
        return Ok(None);
    }
    if bytes.len() > MAX_RECORD_LEN {
        return Err(Error::CorruptRecord(format!(
            "record exceeds {} bytes",
            MAX_RECORD_LEN
        )));
    }
    String::from_utf8(bytes)
        .map(Some)
        .map_err(|_| Error::CorruptRecord("record is not valid UTF-8".to_string()))
}
