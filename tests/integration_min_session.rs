// Drives the compiled binary through a PTY, exercising the real event loop
// and crossterm input handling.
//
// Requires a TTY; ignored by default.
// Run manually via: `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn minimal_session_completes_and_exits() -> Result<(), Box<dyn std::error::Error>> {
    let bin = assert_cmd::cargo::cargo_bin("codetyper");
    let dir = tempfile::tempdir()?;
    let cmd = format!("{} --data-dir {} -p hi", bin.display(), dir.path().display());

    let mut p = spawn(cmd)?;
    std::thread::sleep(Duration::from_millis(200));

    p.send("hi")?;
    std::thread::sleep(Duration::from_millis(200));

    p.send("\x1b")?; // ESC
    p.expect(Eof)?;

    let history = std::fs::read_to_string(dir.path().join("typingHistory.json"))?;
    assert!(history.contains("\"language\":\"JavaScript\""));
    Ok(())
}
