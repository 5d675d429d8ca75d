//! Basic CLI smoke tests.
//!
//! Commands run via cargo against the dev data directory so they never
//! touch a real profile.

use std::process::Command;

fn run_cli(args: &[&str]) -> (i32, String, String) {
    let output = Command::new("cargo")
        .args(["run", "-p", "studyclock-cli", "--quiet", "--"])
        .args(args)
        .env("STUDYCLOCK_ENV", "dev")
        .output()
        .expect("failed to run CLI");
    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

#[test]
fn status_prints_a_state_snapshot() {
    let (code, stdout, stderr) = run_cli(&["timer", "status"]);
    assert_eq!(code, 0, "stderr: {stderr}");
    let value: serde_json::Value =
        serde_json::from_str(&stdout).expect("status output should be JSON");
    assert_eq!(value["type"], "state_snapshot");
    assert!(value["elapsed_secs"].is_u64());
}

#[test]
fn timer_lifecycle_round_trips() {
    let (code, _, stderr) = run_cli(&["timer", "reset"]);
    assert_eq!(code, 0, "stderr: {stderr}");

    let (_, stdout, _) = run_cli(&["timer", "status"]);
    let before: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(before["elapsed_secs"], 0);
    assert_eq!(before["running"], false);

    run_cli(&["timer", "mode"]);
    run_cli(&["timer", "mode"]);
    let (_, stdout, _) = run_cli(&["timer", "status"]);
    let after: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(after["mode"], before["mode"]);
    assert_eq!(after["elapsed_secs"], 0);
}

#[test]
fn config_get_reports_defaults() {
    let (code, stdout, stderr) = run_cli(&["config", "get", "timer.work_minutes"]);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert_eq!(stdout.trim(), "25");
}

#[test]
fn config_get_rejects_unknown_keys() {
    let (code, _, _) = run_cli(&["config", "get", "timer.nonexistent"]);
    assert_ne!(code, 0);
}
