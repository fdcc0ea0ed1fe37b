//! Output rounds: rendering a site key as printable passwords.
//!
//! Each round hashes a copy of the key with a round counter folded into
//! bytes 8..12, giving several independent-looking outputs from the same
//! base key. The caller's key is never modified.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use std::fmt;
use std::io::Write;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::keys::{SiteKey, KEY_LENGTH};
use pwtoy_common::{Error, Result};

/// Number of rounds rendered per site key.
pub const ROUNDS: u32 = 3;

/// Byte offset of the little-endian counter field perturbed per round.
const COUNTER_OFFSET: usize = 8;

/// Length of a round in bytes.
pub const ROUND_LENGTH: usize = 32;

/// One 32-byte round output.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct RoundOutput([u8; ROUND_LENGTH]);

impl RoundOutput {
    /// Get the round bytes.
    pub fn as_bytes(&self) -> &[u8; ROUND_LENGTH] {
        &self.0
    }

    /// Render as 64 lowercase hex characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    fn write_hex<W: Write>(&self, out: &mut W) -> Result<()> {
        let mut text = [0u8; ROUND_LENGTH * 2];
        hex::encode_to_slice(self.0, &mut text)
            .map_err(|e| Error::Algorithm(format!("Hex encoding failed: {}", e)))?;
        let written = out.write_all(&text);
        text.zeroize();
        Ok(written?)
    }
}

impl fmt::Debug for RoundOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RoundOutput([REDACTED])")
    }
}

/// Compute round `index` of `key`.
///
/// XORs `index` (little-endian) into the 4 bytes at offset 8 of a private
/// copy of the key and hashes the copy with BLAKE2b-256.
pub fn round(key: &SiteKey, index: u32) -> RoundOutput {
    let mut block: [u8; KEY_LENGTH] = *key.as_bytes();
    for (byte, counter) in block[COUNTER_OFFSET..COUNTER_OFFSET + 4]
        .iter_mut()
        .zip(index.to_le_bytes())
    {
        *byte ^= counter;
    }

    let mut hasher = Blake2b::<U32>::new();
    hasher.update(&block);
    block.zeroize();

    let result = hasher.finalize();
    let mut output = [0u8; ROUND_LENGTH];
    output.copy_from_slice(&result);
    RoundOutput(output)
}

/// Lazy iterator over the rounds of one key, in order.
pub struct Rounds<'a> {
    key: &'a SiteKey,
    next: u32,
}

impl Iterator for Rounds<'_> {
    type Item = RoundOutput;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= ROUNDS {
            return None;
        }
        let output = round(self.key, self.next);
        self.next += 1;
        Some(output)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (ROUNDS - self.next) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Rounds<'_> {}

/// Renders site keys as a line of hex rounds.
#[derive(Debug, Default, Clone, Copy)]
pub struct OutputEncoder;

impl OutputEncoder {
    /// Rounds of `key`, produced on demand.
    pub fn encode(key: &SiteKey) -> Rounds<'_> {
        Rounds { key, next: 0 }
    }

    /// Write all rounds of `key` as one line.
    ///
    /// Every round is followed by a single space, and the line ends with
    /// `\n` after the last one's space. The writer is flushed after every
    /// round so a reader sees each one as it is ready.
    pub fn write_line<W: Write>(key: &SiteKey, out: &mut W) -> Result<()> {
        for output in Self::encode(key) {
            output.write_hex(out)?;
            out.write_all(b" ")?;
            out.flush()?;
        }
        out.write_all(b"\n")?;
        out.flush()?;
        Ok(())
    }
}
