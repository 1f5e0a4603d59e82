//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a throwaway data directory and
//! verify its JSON output.

use std::io::Write;
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::Duration;

use serde_json::Value;
use tempfile::TempDir;

fn cli(data_dir: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_focusroom-cli"));
    cmd.env("FOCUSROOM_DATA_DIR", data_dir.path())
        .env("RUST_LOG", "off");
    cmd
}

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(data_dir: &TempDir, args: &[&str]) -> (i32, String, String) {
    let output: Output = cli(data_dir)
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn json_lines(stdout: &str) -> Vec<Value> {
    stdout
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).expect("stdout line is JSON"))
        .collect()
}

#[test]
fn test_config_set_and_get() {
    let dir = TempDir::new().unwrap();

    let (code, _, stderr) = run_cli(&dir, &["config", "set", "timer.work_minutes", "50"]);
    assert_eq!(code, 0, "config set failed: {stderr}");

    let (code, stdout, _) = run_cli(&dir, &["config", "get", "timer.work_minutes"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "50");

    assert!(dir.path().join("config.toml").exists());
}

#[test]
fn test_config_rejects_unknown_key() {
    let dir = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(&dir, &["config", "set", "timer.nope", "1"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_config_rejects_zero_length_phases() {
    let dir = TempDir::new().unwrap();
    for key in ["timer.work_minutes", "timer.break_minutes"] {
        let (code, _, stderr) = run_cli(&dir, &["config", "set", key, "0"]);
        assert_eq!(code, 1, "{key} = 0 was accepted");
        assert!(stderr.contains("at least 1 minute"), "stderr: {stderr}");
    }

    let (_, stdout, _) = run_cli(&dir, &["config", "get", "timer.work_minutes"]);
    assert_eq!(stdout.trim(), "25");
}

#[test]
fn test_timer_run_rejects_zero_work_minutes() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&dir, &["timer", "run", "--work-minutes", "0"]);
    assert_ne!(code, 0);
    assert!(stdout.is_empty());
}

#[test]
fn test_stats_warns_when_backend_is_not_local() {
    let dir = TempDir::new().unwrap();
    run_cli(&dir, &["config", "set", "store.backend", "firestore"]);

    let output = cli(&dir)
        .env("RUST_LOG", "warn")
        .args(["stats", "today"])
        .output()
        .expect("Failed to execute CLI command");
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("local store only"), "stderr: {stderr}");
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["sessions"], 0);
}

#[test]
fn test_config_reset() {
    let dir = TempDir::new().unwrap();
    run_cli(&dir, &["config", "set", "timer.break_minutes", "10"]);

    let (code, _, _) = run_cli(&dir, &["config", "reset"]);
    assert_eq!(code, 0);

    let (_, stdout, _) = run_cli(&dir, &["config", "get", "timer.break_minutes"]);
    assert_eq!(stdout.trim(), "5");
}

#[test]
fn test_timer_preview() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&dir, &["timer", "preview"]);
    assert_eq!(code, 0);

    let snapshot: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(snapshot["type"], "state_snapshot");
    assert_eq!(snapshot["phase"], "work");
    assert_eq!(snapshot["formatted_remaining"], "25:00");
    assert_eq!(snapshot["running"], false);
    assert_eq!(snapshot["completed_work_count"], 0);
}

#[test]
fn test_stats_today_empty() {
    let dir = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&dir, &["stats", "today"]);
    assert_eq!(code, 0);

    let report: Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(report["sessions"], 0);
    assert_eq!(report["focus_total"], "0h 0min");
}

#[test]
fn test_timer_run_records_completed_work() {
    let dir = TempDir::new().unwrap();
    let (code, _, _) = run_cli(&dir, &["config", "set", "identity.user_id", "cli-user"]);
    assert_eq!(code, 0);

    let mut child = cli(&dir)
        .args(["timer", "run", "--work-minutes", "1", "--tick-ms", "1"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn timer");

    let mut stdin = child.stdin.take().unwrap();
    writeln!(stdin, "start").unwrap();
    stdin.flush().unwrap();
    thread::sleep(Duration::from_millis(1500));
    writeln!(stdin, "quit").unwrap();
    drop(stdin);

    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let events = json_lines(&String::from_utf8_lossy(&output.stdout));
    let types: Vec<&str> = events.iter().filter_map(|e| e["type"].as_str()).collect();
    assert!(types.contains(&"timer_started"), "events: {types:?}");
    assert!(types.contains(&"work_completed"), "events: {types:?}");
    assert!(types.contains(&"session_recorded"), "events: {types:?}");

    let last = events.last().unwrap();
    assert_eq!(last["phase"], "break");
    assert_eq!(last["running"], false);
    assert_eq!(last["completed_work_count"], 1);

    let (code, stdout, _) = run_cli(&dir, &["stats", "today"]);
    assert_eq!(code, 0);
    let report: Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(report["owner"], "cli-user");
    assert_eq!(report["sessions"], 1);
    assert_eq!(report["focus_minutes"], 1);
}
