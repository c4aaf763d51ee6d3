//! Server endpoint and launch settings.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Line the server prints once its HTTP listener accepts connections.
pub const DEFAULT_READINESS_MARKER: &str = "Appium REST http interface listener started";

/// One logical automation server endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
	pub host: String,
	pub port: u16,
	/// Forward server stdout/stderr to the log at info level.
	pub show_logs: bool,
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			host: "localhost".to_string(),
			port: 4723,
			show_logs: false,
		}
	}
}

impl ServerConfig {
	/// `http://host:port` with IPv6 literals bracketed.
	pub fn origin(&self) -> String {
		if self.host.contains(':') && !self.host.starts_with('[') {
			format!("http://[{}]:{}", self.host, self.port)
		} else {
			format!("http://{}:{}", self.host, self.port)
		}
	}

	pub(crate) fn is_loopback(&self) -> bool {
		matches!(self.host.as_str(), "localhost" | "127.0.0.1" | "::1" | "[::1]" | "0.0.0.0")
	}

	/// Arguments appended after [`LaunchOptions::launcher_args`].
	pub fn server_args(&self) -> Vec<String> {
		vec![
			"--address".to_string(),
			self.host.clone(),
			"--port".to_string(),
			self.port.to_string(),
			"--log-level".to_string(),
			if self.show_logs { "info" } else { "error" }.to_string(),
		]
	}
}

/// How to spawn the server when none is answering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LaunchOptions {
	/// Executable to run. Falls back to `node_modules/.bin/appium`, then `appium` on `PATH`.
	pub program: Option<PathBuf>,
	/// Arguments placed before the derived bind/port/log flags (e.g. `["appium"]` for `npx`).
	pub launcher_args: Vec<String>,
	/// How long to wait for the readiness line before re-probing the status endpoint.
	pub startup_grace_ms: u64,
	/// How long a terminated server may take to exit before it is killed.
	pub shutdown_grace_ms: u64,
	pub readiness_marker: String,
}

impl Default for LaunchOptions {
	fn default() -> Self {
		Self {
			program: None,
			launcher_args: Vec::new(),
			startup_grace_ms: 5_000,
			shutdown_grace_ms: 5_000,
			readiness_marker: DEFAULT_READINESS_MARKER.to_string(),
		}
	}
}

impl LaunchOptions {
	pub fn startup_grace(&self) -> Duration {
		Duration::from_millis(self.startup_grace_ms)
	}

	pub fn shutdown_grace(&self) -> Duration {
		Duration::from_millis(self.shutdown_grace_ms)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn server_args_follow_log_visibility() {
		let quiet = ServerConfig::default();
		assert_eq!(quiet.server_args(), ["--address", "localhost", "--port", "4723", "--log-level", "error"]);

		let loud = ServerConfig {
			show_logs: true,
			..Default::default()
		};
		assert_eq!(loud.server_args().last().map(String::as_str), Some("info"));
	}

	#[test]
	fn origin_brackets_ipv6_hosts() {
		let config = ServerConfig {
			host: "::1".into(),
			port: 4724,
			show_logs: false,
		};
		assert_eq!(config.origin(), "http://[::1]:4724");
		assert_eq!(ServerConfig::default().origin(), "http://localhost:4723");
	}
}
