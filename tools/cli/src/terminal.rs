//! Terminal-backed prompter.
//!
//! When stdin is a terminal, passphrases are read with echo disabled and
//! prompts are shown on the terminal. Otherwise every answer is read as a
//! line from stdin and no prompt is printed, which keeps scripted use quiet.
//!
//! Passphrases must be valid UTF-8 on both paths: entering one that is not
//! fails with an `InvalidData` I/O error. Site labels are raw bytes.

use std::io::{self, BufRead, IsTerminal, Read, StdinLock, Write};
use zeroize::Zeroize;

use pwtoy_common::{Passphrase, Result, SiteLabel};
use pwtoy_master::prompt::MISMATCH_MESSAGE;
use pwtoy_master::Prompter;

/// Prompter reading from the process's stdin.
pub struct TerminalPrompter {
    stdin: StdinLock<'static>,
    interactive: bool,
}

impl TerminalPrompter {
    /// Create a prompter over the locked process stdin.
    pub fn new() -> Self {
        let stdin = io::stdin();
        let interactive = stdin.is_terminal();
        Self {
            stdin: stdin.lock(),
            interactive,
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn passphrase(&mut self, prompt: &str) -> Result<Passphrase> {
        if self.interactive {
            let mut entered = rpassword::prompt_password(prompt)?;
            let passphrase = Passphrase::from_bytes(entered.as_bytes());
            entered.zeroize();
            passphrase
        } else {
            read_passphrase(&mut self.stdin)
        }
    }

    fn site_label(&mut self, prompt: &str, capacity: usize) -> Result<SiteLabel> {
        if self.interactive {
            let mut stderr = io::stderr();
            stderr.write_all(prompt.as_bytes())?;
            stderr.flush()?;
        }
        read_label(&mut self.stdin, capacity)
    }

    fn mismatch(&mut self, _attempts: u32) -> Result<()> {
        eprintln!("{}", MISMATCH_MESSAGE);
        Ok(())
    }
}

/// Read a passphrase line from non-terminal input.
///
/// # Errors
/// - I/O `InvalidData` if the line is not UTF-8
/// - I/O `UnexpectedEof` if the input ends before a newline
/// - `OversizedInput` if the passphrase exceeds the input budget
pub fn read_passphrase<R: BufRead>(reader: &mut R) -> Result<Passphrase> {
    let mut entered = rpassword::read_password_from_bufread(reader)?;
    let passphrase = Passphrase::from_bytes(entered.as_bytes());
    entered.zeroize();
    passphrase
}

/// Read one line of at most `capacity` bytes, without its `\n`.
///
/// End of input terminates the label as well. A line longer than
/// `capacity` is rejected rather than truncated.
pub fn read_label<R: BufRead>(reader: &mut R, capacity: usize) -> Result<SiteLabel> {
    let mut line = Vec::with_capacity(capacity + 1);
    reader
        .take(capacity as u64 + 1)
        .read_until(b'\n', &mut line)?;
    if line.last() == Some(&b'\n') {
        line.pop();
    }

    let label = SiteLabel::new(&line, capacity);
    line.zeroize();
    label
}
