use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

/// Production-parameter output for "correct-horse" + "example.com".
const GOLDEN_LINE: &str = "a6ad2bc7816052900922b0d61ee2740e91e3b3fbba8827671904627884854cf7 \
     1902532e9e0bbcee6ca39a5a96daac3ae0d4f571dfe22fef953a42367ec61e82 \
     c106820de09c4966f0ace47c370c7a2d4ec26c2d165081e39a7a588b3578aae7 \n";

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_pwtoy"))
}

fn record_path(config_home: &Path) -> PathBuf {
    config_home.join("pwtoy").join("master.argon2")
}

fn run_pwtoy(config_home: &Path, args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(bin())
        .args(args)
        .env("XDG_CONFIG_HOME", config_home)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn pwtoy");

    // pwtoy may exit on a fatal error before reading all of its input.
    let mut pipe = child.stdin.take().expect("stdin");
    match pipe.write_all(stdin.as_bytes()) {
        Err(e) if e.kind() == ErrorKind::BrokenPipe => {}
        result => result.expect("write stdin"),
    }
    drop(pipe);
    child.wait_with_output().expect("wait for pwtoy")
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("utf-8 stdout")
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn first_run_enrolls_and_prints_golden_line() {
    let config = TempDir::new().unwrap();

    let output = run_pwtoy(config.path(), &["example.com"], "correct-horse\ncorrect-horse\n");

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), GOLDEN_LINE);

    let record = std::fs::read_to_string(record_path(config.path())).unwrap();
    assert!(record.starts_with("$argon2d$v=19$m=8192,t=3,p=4$"));
}

#[test]
fn later_run_verifies_and_reprompts_on_mismatch() {
    let config = TempDir::new().unwrap();
    let first = run_pwtoy(config.path(), &["example.com"], "correct-horse\ncorrect-horse\n");
    assert!(first.status.success());
    let record = std::fs::read_to_string(record_path(config.path())).unwrap();

    let output = run_pwtoy(config.path(), &[], "wrong\nalso-wrong\ncorrect-horse\nexample.com\n");

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), GOLDEN_LINE);
    assert_eq!(stderr_of(&output).matches("Password does not match.").count(), 2);
    // The record is never rewritten once enrolled.
    assert_eq!(
        std::fs::read_to_string(record_path(config.path())).unwrap(),
        record
    );
}

#[test]
fn enrollment_confirmation_mismatch_reprompts() {
    let config = TempDir::new().unwrap();

    let output = run_pwtoy(
        config.path(),
        &["example.com"],
        "correct-horse\ncorrect-hose\ncorrect-horse\ncorrect-horse\n",
    );

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), GOLDEN_LINE);
    assert!(stderr_of(&output).contains("Password does not match."));
}

#[test]
fn corrupt_record_exits_with_status_two() {
    let config = TempDir::new().unwrap();
    let dir = config.path().join("pwtoy");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("master.argon2"), "not a record").unwrap();

    let output = run_pwtoy(config.path(), &["example.com"], "correct-horse\n");

    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    assert!(stderr_of(&output).contains("Corrupt master record"));
    // A corrupt record is never replaced by a fresh enrollment.
    assert_eq!(
        std::fs::read_to_string(dir.join("master.argon2")).unwrap(),
        "not a record"
    );
}

#[test]
fn oversized_site_exits_with_status_two() {
    let config = TempDir::new().unwrap();
    let passphrase = "p".repeat(1020);
    let site = "example.com";

    let output = run_pwtoy(config.path(), &[site], &format!("{0}\n{0}\n", passphrase));

    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    assert!(stderr_of(&output).contains("Site too long"));
}

#[test]
fn closed_stdin_is_fatal() {
    let config = TempDir::new().unwrap();

    let output = run_pwtoy(config.path(), &["example.com"], "");

    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
}
