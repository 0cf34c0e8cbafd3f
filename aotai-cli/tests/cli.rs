use std::io::Write;
use std::process::{Command, Stdio};

fn aotai() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_aotai"));
    command.env("NO_COLOR", "1").env_remove("AOTAI_API_KEY");
    command
}

#[test]
fn cli_autopilot_writes_json_report() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output_path = dir.path().join("report.json");
    let status = aotai()
        .args([
            "--autopilot",
            "cautious",
            "--runs",
            "3",
            "--seed",
            "11",
            "--max-turns",
            "150",
            "--report",
            "json",
            "--output",
        ])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());

    let content = std::fs::read_to_string(output_path).expect("read output");
    let report: serde_json::Value = serde_json::from_str(&content).expect("json report");
    assert_eq!(report["runs"], 3);
    let total = report["victories"].as_u64().unwrap()
        + report["deaths"].as_u64().unwrap()
        + report["unfinished"].as_u64().unwrap();
    assert_eq!(total, 3);
    assert_eq!(report["records"][0]["seed"], 11);
    assert_eq!(report["records"][2]["seed"], 13);
    assert_eq!(report["strategy"], "Cautious");
}

#[test]
fn cli_console_autopilot_prints_summary() {
    let output = aotai()
        .args(["--autopilot", "bold", "--runs", "1", "--seed", "3"])
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Ao Tai Line Autopilot"));
    assert!(stdout.contains("Autopilot Results Summary"));
    assert!(stdout.contains("Strategy: Bold"));
}

#[test]
fn cli_interactive_session_reads_stdin() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut child = aotai()
        .args(["--offline", "--seed", "5", "--data-dir"])
        .arg(dir.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn cli");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b"start\nbuy mantou\ndone\nrest\nquit\n")
        .expect("write commands");
    let output = child.wait_with_output().expect("wait for cli");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Ao Tai Line: Crossing"));
    assert!(stdout.contains("Outfitter"));
    assert!(stdout.contains("The journey begins."));
    assert!(stdout.contains("TURN: 1"));
    assert!(stdout.contains("(use mantou)"));
    assert!(!dir.path().join("deaths.json").exists());
}

#[test]
fn cli_rejects_invalid_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("config.json");
    std::fs::write(&config, r#"{"viewport_size": 4}"#).expect("write config");
    let output = aotai()
        .args(["--offline", "--config"])
        .arg(&config)
        .stdin(Stdio::null())
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid config"));
}

#[test]
fn cli_rejects_unknown_strategy() {
    let output = aotai()
        .args(["--autopilot", "reckless"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
}
