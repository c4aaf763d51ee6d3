//! Driver seam between the session and the automation server.
//!
//! [`WebDriverClient`] speaks HTTP to a real server; [`FakeDriver`] simulates
//! a screen in memory and records every call for tests.

mod fake;
mod webdriver;

use async_trait::async_trait;
use shorts_protocol::{Actions, ElementRef, FindElement, PushFile, SessionCapabilities, Timeouts};
use shorts_runtime::ServerEndpoint;

pub use fake::{DriverCall, FakeDriver};
pub use webdriver::{HttpConnector, WebDriverClient};

use crate::error::Result;

/// Raw session and element commands.
///
/// Every command but [`create_session`](Driver::create_session) is scoped to a
/// session id returned by it.
#[async_trait]
pub trait Driver: Send + Sync {
	/// Negotiates a new session and returns its id.
	async fn create_session(&self, capabilities: &SessionCapabilities) -> Result<String>;

	async fn delete_session(&self, session: &str) -> Result<()>;

	async fn set_timeouts(&self, session: &str, timeouts: Timeouts) -> Result<()>;

	/// Looks up one element. `Ok(None)` means the server reported no match.
	async fn find_element(&self, session: &str, query: &FindElement) -> Result<Option<ElementRef>>;

	async fn click(&self, session: &str, element: &ElementRef) -> Result<()>;

	async fn clear(&self, session: &str, element: &ElementRef) -> Result<()>;

	async fn send_keys(&self, session: &str, element: &ElementRef, text: &str) -> Result<()>;

	async fn element_text(&self, session: &str, element: &ElementRef) -> Result<String>;

	async fn perform_actions(&self, session: &str, actions: &Actions) -> Result<()>;

	async fn push_file(&self, session: &str, request: &PushFile) -> Result<()>;

	async fn activate_app(&self, session: &str, app_id: &str) -> Result<()>;
}

/// Builds a driver for an endpoint once the server is confirmed running.
pub trait Connector: Send + Sync {
	type Driver: Driver;

	fn connect(&self, endpoint: &ServerEndpoint) -> Result<Self::Driver>;
}
