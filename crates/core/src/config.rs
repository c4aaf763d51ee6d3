//! Publisher configuration file.
//!
//! JSON, camelCase, every field optional:
//!
//! ```json
//! {
//!   "server": { "host": "localhost", "port": 4723, "showLogs": false },
//!   "launch": { "program": "/usr/local/bin/appium", "startupGraceMs": 5000 },
//!   "capabilities": { "deviceName": "Pixel_7", "platformVersion": "14.0" },
//!   "timing": { "uploadTimeoutMs": 600000 },
//!   "defaultPollDurationDays": 7,
//!   "keepServerRunning": false,
//!   "uiTable": "ui-table.json"
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use shorts_protocol::SessionCapabilities;
use shorts_runtime::{LaunchOptions, ServerConfig};
use tracing::warn;

use crate::error::{Error, Result};
use crate::poll::PollDuration;
use crate::script::UiTable;

/// Delays and bounds used during a publish run, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Timing {
	/// Implicit wait applied to every element lookup.
	pub probe_window_ms: u64,
	pub poll_interval_ms: u64,
	pub upload_timeout_ms: u64,
	/// Pause before looking for post-upload buttons.
	pub result_settle_ms: u64,
	/// Pause after tapping a post-upload button.
	pub result_navigate_ms: u64,
}

impl Default for Timing {
	fn default() -> Self {
		Self {
			probe_window_ms: 1_000,
			poll_interval_ms: 5_000,
			upload_timeout_ms: 600_000,
			result_settle_ms: 2_000,
			result_navigate_ms: 3_000,
		}
	}
}

impl Timing {
	pub fn probe_window(&self) -> Duration {
		Duration::from_millis(self.probe_window_ms)
	}

	pub fn poll_interval(&self) -> Duration {
		Duration::from_millis(self.poll_interval_ms)
	}

	pub fn upload_timeout(&self) -> Duration {
		Duration::from_millis(self.upload_timeout_ms)
	}

	pub fn result_settle(&self) -> Duration {
		Duration::from_millis(self.result_settle_ms)
	}

	pub fn result_navigate(&self) -> Duration {
		Duration::from_millis(self.result_navigate_ms)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PublisherConfig {
	pub server: ServerConfig,
	pub launch: LaunchOptions,
	pub capabilities: SessionCapabilities,
	pub timing: Timing,
	/// Used when a poll asks for no duration or an unsupported one.
	pub default_poll_duration_days: u32,
	/// Leave an owned server running after the publish finishes.
	pub keep_server_running: bool,
	/// UI table to use instead of the builtin one. Relative paths resolve against the config file.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub ui_table: Option<PathBuf>,
}

impl Default for PublisherConfig {
	fn default() -> Self {
		Self {
			server: ServerConfig::default(),
			launch: LaunchOptions::default(),
			capabilities: SessionCapabilities::default(),
			timing: Timing::default(),
			default_poll_duration_days: 7,
			keep_server_running: false,
			ui_table: None,
		}
	}
}

impl PublisherConfig {
	pub fn from_file(path: &Path) -> Result<Self> {
		let raw = std::fs::read_to_string(path).map_err(|err| Error::Config(format!("failed to read config {}: {err}", path.display())))?;
		let mut config: PublisherConfig = serde_json::from_str(&raw).map_err(|err| Error::Config(format!("invalid config {}: {err}", path.display())))?;

		if let (Some(table), Some(dir)) = (config.ui_table.as_ref(), path.parent()) {
			if table.is_relative() {
				config.ui_table = Some(dir.join(table));
			}
		}
		Ok(config)
	}

	/// Configured default duration, or seven days if the configured value is unsupported.
	pub fn default_poll_duration(&self) -> PollDuration {
		PollDuration::from_days(self.default_poll_duration_days).unwrap_or_else(|| {
			warn!(
				target = "shorts.publish",
				days = self.default_poll_duration_days,
				"unsupported default poll duration; using 7 days"
			);
			PollDuration::SevenDays
		})
	}

	/// The configured UI table, or the builtin one.
	pub fn load_ui_table(&self) -> Result<UiTable> {
		match &self.ui_table {
			Some(path) => UiTable::from_file(path),
			None => Ok(UiTable::builtin()),
		}
	}
}
