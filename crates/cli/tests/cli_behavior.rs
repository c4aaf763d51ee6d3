use std::net::SocketAddr;
use std::path::Path;
use std::process::Command;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tempfile::TempDir;

fn run_shorts(workdir: &Path, args: &[&str]) -> (i32, String, String) {
	let output = Command::new(env!("CARGO_BIN_EXE_shorts"))
		.current_dir(workdir)
		.args(args)
		.output()
		.expect("failed to execute shorts");

	let stdout = String::from_utf8_lossy(&output.stdout).to_string();
	let stderr = String::from_utf8_lossy(&output.stderr).to_string();
	(output.status.code().unwrap_or(-1), stdout, stderr)
}

fn run_json(workdir: &Path, args: &[&str]) -> (i32, Value, String) {
	let (code, stdout, stderr) = run_shorts(workdir, args);
	let parsed = serde_json::from_str::<Value>(&stdout).unwrap_or_else(|_| json!({ "raw": stdout }));
	(code, parsed, stderr)
}

fn closed_port() -> u16 {
	let listener = std::net::TcpListener::bind(("127.0.0.1", 0)).expect("bind");
	listener.local_addr().expect("addr").port()
}

async fn fake_status_server() -> SocketAddr {
	let app = Router::new().route("/status", get(|| async { Json(json!({ "value": { "ready": true, "build": { "version": "2.11.0" } } })) }));
	let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
	let addr = listener.local_addr().expect("addr");
	tokio::spawn(async move {
		axum::serve(listener, app).await.expect("serve");
	});
	addr
}

#[test]
fn ui_table_prints_builtin_locators() {
	let tmp = TempDir::new().expect("temp dir should be created");
	let (code, json, stderr) = run_json(tmp.path(), &["ui-table"]);

	assert_eq!(code, 0, "ui-table failed: {stderr}");
	assert_eq!(json["ok"], true);
	assert_eq!(json["command"], "ui-table");
	assert_eq!(json["data"]["deviceMediaDir"], "/sdcard/Download");
	assert!(json["data"]["locators"]["set-caption"].is_object(), "{json}");
	assert_eq!(json["data"]["durationLabels"]["7"], "7 days");
}

#[test]
fn missing_video_is_invalid_input() {
	let tmp = TempDir::new().expect("temp dir should be created");
	let port = closed_port().to_string();
	let (code, json, _) = run_json(
		tmp.path(),
		&["publish", "missing.mp4", "--caption", "Episode 1", "--option", "Left", "--option", "Right", "--port", &port],
	);

	assert_eq!(code, 1);
	assert_eq!(json["ok"], false);
	assert_eq!(json["error"]["code"], "INVALID_INPUT");
	assert!(json["error"]["message"].as_str().unwrap_or_default().contains("missing.mp4"), "{json}");
}

#[test]
fn single_option_is_invalid_input() {
	let tmp = TempDir::new().expect("temp dir should be created");
	std::fs::write(tmp.path().join("clip.mp4"), b"\x00\x00\x00\x18ftypmp42").expect("video should be written");
	let port = closed_port().to_string();

	let (code, json, _) = run_json(tmp.path(), &["publish", "clip.mp4", "--caption", "Episode 1", "--option", "Only", "--port", &port]);

	assert_eq!(code, 1);
	assert_eq!(json["error"]["code"], "INVALID_INPUT");
}

#[test]
fn malformed_config_is_config_error() {
	let tmp = TempDir::new().expect("temp dir should be created");
	std::fs::write(tmp.path().join("shorts.json"), "{ nope").expect("config should be written");

	let (code, json, _) = run_json(tmp.path(), &["--config", "shorts.json", "ui-table"]);

	assert_eq!(code, 1);
	assert_eq!(json["error"]["code"], "CONFIG_ERROR");
}

#[test]
fn text_format_reports_errors_readably() {
	let tmp = TempDir::new().expect("temp dir should be created");
	let (code, stdout, _) = run_shorts(tmp.path(), &["-f", "text", "publish", "missing.mp4", "--caption", "x", "--option", "a", "--option", "b"]);

	assert_eq!(code, 1);
	assert!(stdout.starts_with("Error [INVALID_INPUT]:"), "{stdout}");
}

#[test]
fn server_status_reports_closed_port() {
	let tmp = TempDir::new().expect("temp dir should be created");
	let port = closed_port();
	let (code, json, stderr) = run_json(tmp.path(), &["server", "status", "--host", "127.0.0.1", "--port", &port.to_string()]);

	assert_eq!(code, 0, "server status failed: {stderr}");
	assert_eq!(json["data"]["running"], false);
	assert_eq!(json["data"]["port"], port);
	assert!(json["data"].get("baseUrl").is_none());
}

#[tokio::test]
async fn server_status_detects_running_server() {
	let addr = fake_status_server().await;
	let tmp = TempDir::new().expect("temp dir should be created");

	let output = tokio::process::Command::new(env!("CARGO_BIN_EXE_shorts"))
		.current_dir(tmp.path())
		.args(["server", "status", "--host", "127.0.0.1", "--port", &addr.port().to_string()])
		.output()
		.await
		.expect("failed to execute shorts");
	let json: Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");

	assert!(output.status.success());
	assert_eq!(json["data"]["running"], true);
	assert_eq!(json["data"]["baseUrl"], format!("http://127.0.0.1:{}", addr.port()));
}
