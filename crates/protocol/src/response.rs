//! Response envelopes.
//!
//! Every W3C response wraps its payload in `{"value": ...}`; failures carry an
//! error object in the same slot:
//!
//! ```json
//! {
//!   "value": {
//!     "error": "no such element",
//!     "message": "An element could not be located on the page using the given search parameters.",
//!     "stacktrace": "..."
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error code the server uses when a lookup matched nothing.
pub const NO_SUCH_ELEMENT: &str = "no such element";

/// Generic `{"value": T}` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireResponse<T> {
	pub value: T,
}

/// Error payload carried in `value` for non-2xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireError {
	/// W3C error code, e.g. `no such element`, `session not created`.
	pub error: String,
	#[serde(default)]
	pub message: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub stacktrace: Option<String>,
}

impl WireError {
	pub fn is_no_such_element(&self) -> bool {
		self.error == NO_SUCH_ELEMENT
	}
}

/// `value` of a successful `POST /session`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
	pub session_id: String,
	#[serde(default)]
	pub capabilities: Value,
}
