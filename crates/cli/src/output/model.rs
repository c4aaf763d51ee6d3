use serde::{Deserialize, Serialize};

/// Current schema version for command output.
pub const SCHEMA_VERSION: u32 = 1;

/// The result envelope every command prints on stdout.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult<T: Serialize> {
	pub schema_version: u32,
	pub ok: bool,
	pub command: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<CommandError>,
	pub duration_ms: u64,
}

/// Error information for failed commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
	pub code: ErrorCode,
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

/// Stable error codes for scripts consuming the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	InvalidInput,
	ConfigError,
	ServerLaunchFailed,
	SessionError,
	ElementNotFound,
	UploadTimeout,
}

impl std::fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ErrorCode::InvalidInput => write!(f, "INVALID_INPUT"),
			ErrorCode::ConfigError => write!(f, "CONFIG_ERROR"),
			ErrorCode::ServerLaunchFailed => write!(f, "SERVER_LAUNCH_FAILED"),
			ErrorCode::SessionError => write!(f, "SESSION_ERROR"),
			ErrorCode::ElementNotFound => write!(f, "ELEMENT_NOT_FOUND"),
			ErrorCode::UploadTimeout => write!(f, "UPLOAD_TIMEOUT"),
		}
	}
}

/// Payload of a successful `publish`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishData {
	pub url: String,
	pub resolved_via: shorts::ResolvedVia,
	pub poll_warnings: Vec<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub skipped_steps: Vec<String>,
}

/// Payload of `server status` and `server run`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatusData {
	pub running: bool,
	pub host: String,
	pub port: u16,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub base_url: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub owned: Option<bool>,
}

/// A command result with no payload data.
pub type EmptyResult = CommandResult<()>;
