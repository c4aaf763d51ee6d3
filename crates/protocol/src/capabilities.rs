//! Session capability document sent with `POST /session`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Vendor prefix Appium requires on every non-W3C capability key.
pub const APPIUM_PREFIX: &str = "appium:";

/// App data retention between sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPolicy {
	/// Keep app state (and the signed-in account) between sessions.
	pub no_reset: bool,
	/// Uninstall the app when the session ends.
	pub full_reset: bool,
}

impl Default for ResetPolicy {
	fn default() -> Self {
		Self {
			no_reset: true,
			full_reset: false,
		}
	}
}

/// Declares the device and application a session targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionCapabilities {
	pub platform_name: String,
	pub device_name: String,
	pub platform_version: String,
	pub app_package: String,
	pub app_activity: String,
	pub automation_name: String,
	pub reset_policy: ResetPolicy,
	pub auto_grant_permissions: bool,
	/// Idle time after which the server drops the session.
	pub session_timeout_ms: u64,
	/// Emulator image to boot when no device is attached.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub avd: Option<String>,
}

impl Default for SessionCapabilities {
	fn default() -> Self {
		Self {
			platform_name: "Android".to_string(),
			device_name: "YouTube_Emulator".to_string(),
			platform_version: "13.0".to_string(),
			app_package: "com.google.android.youtube".to_string(),
			app_activity: "com.google.android.youtube.HomeActivity".to_string(),
			automation_name: "UiAutomator2".to_string(),
			reset_policy: ResetPolicy::default(),
			auto_grant_permissions: true,
			session_timeout_ms: 60_000,
			avd: None,
		}
	}
}

impl SessionCapabilities {
	/// Flat `alwaysMatch` map with vendor keys prefixed.
	///
	/// `newCommandTimeout` is expressed in whole seconds on the wire.
	pub fn always_match(&self) -> Map<String, Value> {
		let mut caps = Map::new();
		caps.insert("platformName".into(), json!(self.platform_name));

		let mut vendor = |key: &str, value: Value| {
			caps.insert(format!("{APPIUM_PREFIX}{key}"), value);
		};
		vendor("deviceName", json!(self.device_name));
		vendor("platformVersion", json!(self.platform_version));
		vendor("appPackage", json!(self.app_package));
		vendor("appActivity", json!(self.app_activity));
		vendor("automationName", json!(self.automation_name));
		vendor("noReset", json!(self.reset_policy.no_reset));
		vendor("fullReset", json!(self.reset_policy.full_reset));
		vendor("autoGrantPermissions", json!(self.auto_grant_permissions));
		vendor("newCommandTimeout", json!(self.session_timeout_ms.div_ceil(1000)));
		if let Some(avd) = &self.avd {
			vendor("avd", json!(avd));
		}

		caps
	}

	/// Full `POST /session` body.
	pub fn new_session_payload(&self) -> Value {
		json!({
			"capabilities": {
				"alwaysMatch": self.always_match(),
				"firstMatch": [{}],
			}
		})
	}
}
