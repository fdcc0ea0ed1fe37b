//! pwtoy CLI - derive per-site passwords from a master passphrase.
//!
//! On first use the master passphrase is entered twice and a short check
//! value is stored in the configuration directory. Later runs verify the
//! passphrase against it, derive the key for the requested site and print
//! three hex passwords on one line.

mod terminal;

use anyhow::{Context, Result};
use clap::Parser;
use std::ffi::OsString;
use std::io;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use pwtoy_master::Session;
use pwtoy_storage::{ConfigDir, FileRecordStore};

use crate::terminal::TerminalPrompter;

/// Exit status for every fatal error.
const EXIT_FAILURE: u8 = 2;

#[derive(Parser)]
#[command(name = "pwtoy")]
#[command(about = "Derive per-site passwords from a master passphrase")]
#[command(version)]
struct Cli {
    /// Site label, e.g. a domain name. Prompted for when omitted.
    site: Option<OsString>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match init_logging().and_then(|()| run(&cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("pwtoy: {:#}", err);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

/// Log to stderr so stdout carries only the password line.
fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Run one invocation. Secrets live inside the session and prompter and are
/// wiped when they drop at the end of this function, on every path.
fn run(cli: &Cli) -> Result<()> {
    let config = ConfigDir::resolve().context("Failed to locate configuration directory")?;
    let store = FileRecordStore::open_in(&config)
        .with_context(|| format!("Failed to open {}", config.record_path().display()))?;
    let mut session = Session::open(store).context("Failed to load master record")?;

    let mut prompter = TerminalPrompter::new();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let site = cli.site.as_ref().map(|s| s.as_encoded_bytes());

    session
        .run(&mut prompter, site, &mut out)
        .context("Failed to generate site password")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_argument_is_optional() {
        let cli = Cli::try_parse_from(["pwtoy"]).unwrap();
        assert!(cli.site.is_none());

        let cli = Cli::try_parse_from(["pwtoy", "example.com"]).unwrap();
        assert_eq!(cli.site.as_deref(), Some(std::ffi::OsStr::new("example.com")));
    }

    #[test]
    fn test_rejects_extra_arguments() {
        assert!(Cli::try_parse_from(["pwtoy", "a.com", "b.com"]).is_err());
        assert!(Cli::try_parse_from(["pwtoy", "--length", "12"]).is_err());
    }
}
