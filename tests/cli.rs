//! Runs the `kundli_chat` binary end to end.

use std::process::{Command, Output};

fn run(place: &str, extra: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_kundli_chat"))
        .args(["--name", "Ravi", "--date", "1991-06-18", "--time", "07:10"])
        .args(["--place", place])
        .args(extra)
        .env_remove("KUNDLI_CHAT_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn answers_questions_and_exits_cleanly() {
    let output = run("Calicut, India", &["--ask", "hello", "--ask", "planets"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("🤖 Bot: Kundli has been analyzed."));
    assert!(stdout.contains("Hello Ravi!"));
    assert!(stdout.contains("Ketu: "));
}

#[test]
fn unknown_place_fails_with_the_session_message() {
    let output = run("Atlantis", &["--ask", "hello"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Could not find the location."));
}

#[test]
fn invalid_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "ephemeris": { "max_year": 2147483647 } }"#).unwrap();

    let output = run("Delhi", &["--config", path.to_str().unwrap(), "--ask", "sun"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8(output.stderr).unwrap().contains("Validation error:"));
}
