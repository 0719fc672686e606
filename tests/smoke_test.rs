/// Smoke tests to verify the binary runs without panicking
use std::process::{Command, Output, Stdio};

/// Runs with stdin closed and stdout piped, so there is never a terminal.
fn globefolio(args: &[&str]) -> Output {
    let logs = tempfile::tempdir().expect("temp dir");
    let log_file = logs.path().join("smoke.log");
    Command::new("cargo")
        .args(["run", "--quiet", "--"])
        .args(args)
        .arg("--log-file")
        .arg(&log_file)
        .env_remove("GLOBEFOLIO_MAPS_API_KEY")
        .env("XDG_CONFIG_HOME", logs.path())
        .env("HOME", logs.path())
        .stdin(Stdio::null())
        .output()
        .expect("Failed to execute cargo run")
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for c in chars.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[test]
fn binary_shows_help() {
    let output = globefolio(&["--help"]);

    assert!(
        output.status.success(),
        "Binary failed to run --help: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("globefolio"), "Help output should mention globefolio");
    for view in ["scene", "travel", "map"] {
        assert!(stdout.contains(view), "Help output should list {view}");
    }
}

#[test]
fn binary_shows_version() {
    let output = globefolio(&["--version"]);

    assert!(
        output.status.success(),
        "Binary failed to run --version: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn invalid_subcommand_fails_gracefully() {
    let output = globefolio(&["nonexistent-command"]);

    // Should fail with error, not panic
    assert!(
        !output.status.success(),
        "Invalid subcommand should return error status"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    // Should show helpful error, not a panic backtrace
    assert!(
        !stderr.contains("panicked at"),
        "Invalid subcommand should not cause panic"
    );
}

#[test]
fn scene_prints_one_frame() {
    let output = globefolio(&["scene", "--print", "--seed", "1", "--width", "40", "--height", "20", "--offline"]);

    assert!(
        output.status.success(),
        "scene --print failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 20);
    assert!(stdout.chars().any(|c| ('\u{2801}'..='\u{28ff}').contains(&c)));
}

#[test]
fn travel_prints_offline() {
    let output = globefolio(&["travel", "--print", "--offline", "--width", "80", "--height", "30"]);

    assert!(
        output.status.success(),
        "travel --print failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let text = strip_ansi(&String::from_utf8_lossy(&output.stdout));
    assert!(text.contains("Travel Stats"));
    assert!(text.contains("10 / 195"));
}

#[test]
fn map_without_key_explains_itself() {
    let output = globefolio(&["map", "--print", "--width", "70", "--height", "12"]);

    assert!(
        output.status.success(),
        "map --print failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let text = strip_ansi(&String::from_utf8_lossy(&output.stdout));
    assert!(text.contains("Map view unavailable"));
    assert!(text.contains("GLOBEFOLIO_MAPS_API_KEY"));
}

#[test]
fn views_without_a_terminal_exit_quietly() {
    for view in ["scene", "travel", "map"] {
        let output = globefolio(&[view, "--offline"]);

        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(
            output.status.success(),
            "{view} without a terminal should succeed: {stderr}"
        );
        assert!(output.stdout.is_empty(), "{view} should draw nothing without a terminal");
        assert!(!stderr.contains("panicked at"), "{view} panicked: {stderr}");
    }
}
