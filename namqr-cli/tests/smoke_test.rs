//! Smoke tests for namqr-cli
//!
//! These tests run the built binary against fixed payloads.

use std::io::Write;
use std::process::{Command, Output, Stdio};

const WALLET: &str = "00020101021126340016na.com.buffr.IPP01102648112345\
53035165802NA80280018na.com.buffr.namqr020200";

fn namqr(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_namqr"))
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn namqr_stdin(args: &[&str], input: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_namqr"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn command");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .expect("Failed to write stdin");
    child.wait_with_output().expect("Failed to wait for command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim_end().to_string()
}

/// Test that the CLI can show help
#[test]
fn test_cli_help() {
    let output = namqr(&["--help"]);
    let text = stdout(&output);
    for command in ["decode", "encode", "inspect", "crc", "check"] {
        assert!(text.contains(command), "Help should mention '{command}'");
    }
}

#[test]
fn test_crc_then_decode() {
    let output = namqr(&["crc", WALLET]);
    assert!(output.status.success());
    let payload = stdout(&output);
    assert!(payload.starts_with(WALLET));
    assert_eq!(payload.len(), WALLET.len() + 8);

    let output = namqr(&["decode", &payload]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let intent: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(intent["identifier"], "2648112345");
    assert_eq!(intent["account_type"], "BuffrWallet");
}

#[test]
fn test_decode_failure_exits_non_zero() {
    let output = namqr(&["decode", "0002016304ABCD"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("[3001]"), "stderr: {stderr}");
}

#[test]
fn test_encode_from_stdin() {
    let json = r#"{"initiation_method":"Dynamic","account_type":"Merchant",
        "identifier":"MERCH-001","merchant_name":"Joe's Shop","amount":"25.00"}"#;
    let output = namqr_stdin(&["encode"], json);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let payload = stdout(&output);
    assert!(payload.contains("540525.00"));
    assert!(namqr(&["check", &payload]).status.success());
}

#[test]
fn test_inspect_json() {
    let payload = stdout(&namqr(&["crc", WALLET]));
    let output = namqr_stdin(&["inspect", "--json", "-"], &format!("{payload}\n"));
    assert!(output.status.success());

    let tree: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert!(tree.to_string().contains("na.com.buffr.IPP"));
}

#[test]
fn test_check_rejects_plain_text() {
    let output = namqr(&["check", "https://example.com"]);
    assert!(!output.status.success());
}

#[test]
fn test_bad_config_file() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"max_template_depth": 0}"#).unwrap();

    let output = namqr(&["--config", path.to_str().unwrap(), "check", WALLET]);
    assert!(!output.status.success());
}
