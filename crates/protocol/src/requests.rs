//! Request bodies for session, element, and Appium device endpoints.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// `POST /session/{id}/timeouts` body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeouts {
	/// How long element lookups may block before reporting `no such element`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub implicit: Option<u64>,
}

/// `POST /session/{id}/element/{eid}/value` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendKeys {
	pub text: String,
}

/// `POST /session/{id}/appium/device/push_file` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushFile {
	/// Destination path on the device.
	pub path: String,
	/// Base64-encoded file contents.
	pub data: String,
}

impl PushFile {
	pub fn new(path: impl Into<String>, contents: &[u8]) -> Self {
		Self {
			path: path.into(),
			data: STANDARD.encode(contents),
		}
	}
}

/// `POST /session/{id}/appium/device/activate_app` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateApp {
	pub app_id: String,
}
