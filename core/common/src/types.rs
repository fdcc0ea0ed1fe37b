//! Fixed-capacity secret buffers.
//!
//! Passphrase and site label share a single input budget of
//! [`MAX_INPUT_LEN`] bytes: whatever the passphrase uses is no longer
//! available to the label. Each buffer has exactly one owner and wipes its
//! whole allocation when dropped.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{Error, Result};

/// Combined byte budget for passphrase plus site label.
pub const MAX_INPUT_LEN: usize = 1023;

/// Bounds-checked byte buffer that zeroizes on drop.
///
/// The backing allocation is reserved up front and never grows: appends that
/// would exceed the capacity are rejected instead of reallocating, so no
/// stale copy of the contents is left behind on the heap.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretBuffer {
    bytes: Vec<u8>,
    #[zeroize(skip)]
    capacity: usize,
    #[zeroize(skip)]
    what: &'static str,
}

impl SecretBuffer {
    /// Create an empty buffer holding at most `capacity` bytes.
    ///
    /// `what` names the contents in `OversizedInput` errors.
    pub fn new(what: &'static str, capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            capacity,
            what,
        }
    }

    /// Create a buffer and fill it from `data`.
    ///
    /// # Errors
    /// - `OversizedInput` if `data` is longer than `capacity`
    pub fn from_slice(what: &'static str, capacity: usize, data: &[u8]) -> Result<Self> {
        let mut buf = Self::new(what, capacity);
        buf.extend_from_slice(data)?;
        Ok(buf)
    }

    /// Append `data`, or fail without modifying the buffer.
    pub fn extend_from_slice(&mut self, data: &[u8]) -> Result<()> {
        if data.len() > self.remaining() {
            return Err(Error::OversizedInput {
                what: self.what,
                requested: data.len(),
                available: self.remaining(),
            });
        }
        self.bytes.extend_from_slice(data);
        Ok(())
    }

    /// Get a reference to the inner bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Get the length.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Maximum number of bytes this buffer accepts.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes that can still be appended.
    pub fn remaining(&self) -> usize {
        self.capacity - self.bytes.len()
    }
}

impl fmt::Debug for SecretBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBuffer([REDACTED; {} bytes])", self.bytes.len())
    }
}

/// Master passphrase, at most [`MAX_INPUT_LEN`] bytes.
pub struct Passphrase(SecretBuffer);

impl Passphrase {
    /// Copy `bytes` into a new passphrase buffer.
    ///
    /// # Errors
    /// - `OversizedInput` if `bytes` exceeds [`MAX_INPUT_LEN`]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        SecretBuffer::from_slice("Passphrase", MAX_INPUT_LEN, bytes).map(Self)
    }

    /// Get the passphrase bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Get the length.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Byte-for-byte comparison used for enrollment confirmation.
    ///
    /// Both values are typed by the same user in the same process, so this
    /// is a plain comparison rather than a constant-time one.
    pub fn matches(&self, other: &Passphrase) -> bool {
        self.as_bytes() == other.as_bytes()
    }

    /// Space this passphrase leaves for a site label.
    pub fn label_capacity(&self) -> usize {
        MAX_INPUT_LEN - self.len()
    }
}

impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Passphrase([REDACTED])")
    }
}

/// Site label such as a domain name.
pub struct SiteLabel(SecretBuffer);

impl SiteLabel {
    /// Create a label limited to `capacity` bytes.
    ///
    /// # Errors
    /// - `OversizedInput` if `bytes` does not fit; the label is never truncated
    pub fn new(bytes: &[u8], capacity: usize) -> Result<Self> {
        SecretBuffer::from_slice("Site", capacity, bytes).map(Self)
    }

    /// Create a label limited to the space `passphrase` leaves free.
    pub fn for_passphrase(passphrase: &Passphrase, bytes: &[u8]) -> Result<Self> {
        Self::new(bytes, passphrase.label_capacity())
    }

    /// Get the label bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Get the length.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SiteLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SiteLabel({} bytes)", self.0.len())
    }
}
