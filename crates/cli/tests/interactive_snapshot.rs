use std::process::{Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

#[test]
fn test_cli_interactive_writes_snapshot() {
    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("prbs-interactive-{}", nonce));
    std::fs::create_dir_all(&dir).unwrap();
    let config_path = dir.join("board.yaml");
    std::fs::write(&config_path, "heartbeat_ms: 5\nled_polarity: active_low\n").unwrap();
    let snapshot_path = dir.join("snapshot.json");

    let output = Command::new(env!("CARGO_BIN_EXE_prbs"))
        .args([
            "--config",
            config_path.to_str().unwrap(),
            "--ticks",
            "3",
            "--snapshot",
            snapshot_path.to_str().unwrap(),
        ])
        .stdin(Stdio::null())
        .output()
        .expect("Failed to execute prbs");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Commands:"));

    let snapshot: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&snapshot_path).unwrap()).unwrap();
    assert_eq!(snapshot["ticks"], 3);
    assert_eq!(snapshot["status"]["running"], true);
    assert_eq!(snapshot["status"]["mode"], 3);
    assert_eq!(snapshot["metrics"]["lines"], 0);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_cli_interactive_ends_when_stdin_closes() {
    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("prbs-eof-{}", nonce));
    std::fs::create_dir_all(&dir).unwrap();
    let config_path = dir.join("board.yaml");
    std::fs::write(&config_path, "heartbeat_ms: 5\n").unwrap();
    let snapshot_path = dir.join("snapshot.json");

    let mut child = Command::new(env!("CARGO_BIN_EXE_prbs"))
        .args([
            "--config",
            config_path.to_str().unwrap(),
            "--snapshot",
            snapshot_path.to_str().unwrap(),
        ])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute prbs");

    {
        use std::io::Write;
        let mut stdin = child.stdin.take().unwrap();
        stdin.write_all(b"frame 32\nstatus\n").unwrap();
    }
    let output = child.wait_with_output().expect("Failed to wait on prbs");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("FRAME=32"));

    let snapshot: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&snapshot_path).unwrap()).unwrap();
    assert_eq!(snapshot["status"]["frame_len"], 32);
    assert_eq!(snapshot["metrics"]["lines"], 2);
    assert!(snapshot["ticks"].as_u64().unwrap() >= 1);

    let _ = std::fs::remove_dir_all(&dir);
}
