//! In-memory driver for exercising sessions and scripts without a device.
//!
//! The simulated screen shows every element unless told otherwise. Elements
//! are matched by substring against the query value, so hiding `"Your Short"`
//! hides every success marker that mentions it.
//!
//! ```ignore
//! let driver = FakeDriver::new();
//! driver.hide("Your Short is live");
//! driver.reveal_after("Upload complete", 3);
//!
//! let orchestrator = PublishOrchestrator::new(config, table, server, driver.clone());
//! orchestrator.publish(&video, "caption", &poll).await?;
//! assert_eq!(driver.sessions_deleted(), 1);
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use shorts_protocol::{Actions, ElementRef, FindElement, PushFile, SessionCapabilities, Timeouts};
use shorts_runtime::ServerEndpoint;

use super::{Connector, Driver};
use crate::error::{Error, Result};

/// One command received by a [`FakeDriver`].
///
/// Element commands carry the query value the element was found with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCall {
	CreateSession(SessionCapabilities),
	DeleteSession(String),
	SetTimeouts(Timeouts),
	FindElement(FindElement),
	Click(String),
	Clear(String),
	SendKeys { target: String, text: String },
	ElementText(String),
	PerformActions(Actions),
	PushFile { path: String, bytes: usize },
	ActivateApp(String),
}

#[derive(Debug, Default)]
struct FakeState {
	calls: Vec<DriverCall>,
	hidden: Vec<String>,
	/// Needle -> lookups remaining before it shows up.
	delayed: Vec<(String, usize)>,
	texts: Vec<(String, String)>,
	failing: HashSet<String>,
	session_error: Option<String>,
	/// Simulated implicit wait spent on every lookup.
	lookup_delay: Duration,
	elements: HashMap<String, String>,
	next_id: usize,
	sessions_created: usize,
	sessions_deleted: usize,
}

impl FakeState {
	fn check_failure(&self, command: &str) -> Result<()> {
		if self.failing.contains(command) {
			return Err(Error::driver(command, "injected failure"));
		}
		Ok(())
	}

	fn target(&self, element: &ElementRef) -> String {
		self.elements.get(&element.id).cloned().unwrap_or_else(|| element.id.clone())
	}

	fn is_visible(&mut self, query: &str) -> bool {
		if self.hidden.iter().any(|needle| query.contains(needle.as_str())) {
			return false;
		}

		let mut visible = true;
		for (needle, remaining) in &mut self.delayed {
			if query.contains(needle.as_str()) && *remaining > 0 {
				*remaining -= 1;
				visible = false;
			}
		}
		visible
	}
}

/// Scriptable [`Driver`]; clones share the same screen and call log.
#[derive(Debug, Clone, Default)]
pub struct FakeDriver {
	state: Arc<Mutex<FakeState>>,
}

impl FakeDriver {
	pub fn new() -> Self {
		Self::default()
	}

	/// Elements whose query mentions `needle` are never found.
	pub fn hide(&self, needle: impl Into<String>) -> &Self {
		self.state.lock().hidden.push(needle.into());
		self
	}

	/// Elements whose query mentions `needle` are missing for the next `lookups` lookups.
	pub fn reveal_after(&self, needle: impl Into<String>, lookups: usize) -> &Self {
		self.state.lock().delayed.push((needle.into(), lookups));
		self
	}

	/// Text reported for elements whose query mentions `needle` (default: the query itself).
	pub fn set_text(&self, needle: impl Into<String>, text: impl Into<String>) -> &Self {
		self.state.lock().texts.push((needle.into(), text.into()));
		self
	}

	/// Makes every call of `command` (e.g. `"click"`) fail with a driver error.
	pub fn fail_command(&self, command: impl Into<String>) -> &Self {
		self.state.lock().failing.insert(command.into());
		self
	}

	/// Every element lookup takes `delay` before answering, like a server-side implicit wait.
	pub fn delay_lookups(&self, delay: Duration) -> &Self {
		self.state.lock().lookup_delay = delay;
		self
	}

	/// Makes session creation fail with `reason`.
	pub fn fail_session(&self, reason: impl Into<String>) -> &Self {
		self.state.lock().session_error = Some(reason.into());
		self
	}

	pub fn calls(&self) -> Vec<DriverCall> {
		self.state.lock().calls.clone()
	}

	/// Takes all recorded calls, clearing the log.
	pub fn take_calls(&self) -> Vec<DriverCall> {
		std::mem::take(&mut self.state.lock().calls)
	}

	pub fn sessions_created(&self) -> usize {
		self.state.lock().sessions_created
	}

	pub fn sessions_deleted(&self) -> usize {
		self.state.lock().sessions_deleted
	}

	/// Query values of every clicked element, in order.
	pub fn clicked(&self) -> Vec<String> {
		self.calls()
			.into_iter()
			.filter_map(|call| match call {
				DriverCall::Click(target) => Some(target),
				_ => None,
			})
			.collect()
	}

	/// Texts typed into elements, in order.
	pub fn typed(&self) -> Vec<String> {
		self.calls()
			.into_iter()
			.filter_map(|call| match call {
				DriverCall::SendKeys { text, .. } => Some(text),
				_ => None,
			})
			.collect()
	}
}

#[async_trait]
impl Driver for FakeDriver {
	async fn create_session(&self, capabilities: &SessionCapabilities) -> Result<String> {
		let mut state = self.state.lock();
		state.calls.push(DriverCall::CreateSession(capabilities.clone()));
		if let Some(reason) = state.session_error.clone() {
			return Err(Error::SessionInit(reason));
		}
		state.sessions_created += 1;
		Ok(format!("fake-session-{}", state.sessions_created))
	}

	async fn delete_session(&self, session: &str) -> Result<()> {
		let mut state = self.state.lock();
		state.calls.push(DriverCall::DeleteSession(session.to_string()));
		state.check_failure("delete session")?;
		state.sessions_deleted += 1;
		Ok(())
	}

	async fn set_timeouts(&self, _session: &str, timeouts: Timeouts) -> Result<()> {
		let mut state = self.state.lock();
		state.calls.push(DriverCall::SetTimeouts(timeouts));
		state.check_failure("set timeouts")
	}

	async fn find_element(&self, _session: &str, query: &FindElement) -> Result<Option<ElementRef>> {
		let delay = self.state.lock().lookup_delay;
		if !delay.is_zero() {
			tokio::time::sleep(delay).await;
		}

		let mut state = self.state.lock();
		state.calls.push(DriverCall::FindElement(query.clone()));
		state.check_failure("find element")?;

		if !state.is_visible(&query.value) {
			return Ok(None);
		}

		state.next_id += 1;
		let id = format!("fake-element-{}", state.next_id);
		state.elements.insert(id.clone(), query.value.clone());
		Ok(Some(ElementRef::new(id)))
	}

	async fn click(&self, _session: &str, element: &ElementRef) -> Result<()> {
		let mut state = self.state.lock();
		let target = state.target(element);
		state.calls.push(DriverCall::Click(target));
		state.check_failure("click")
	}

	async fn clear(&self, _session: &str, element: &ElementRef) -> Result<()> {
		let mut state = self.state.lock();
		let target = state.target(element);
		state.calls.push(DriverCall::Clear(target));
		state.check_failure("clear")
	}

	async fn send_keys(&self, _session: &str, element: &ElementRef, text: &str) -> Result<()> {
		let mut state = self.state.lock();
		let target = state.target(element);
		state.calls.push(DriverCall::SendKeys {
			target,
			text: text.to_string(),
		});
		state.check_failure("send keys")
	}

	async fn element_text(&self, _session: &str, element: &ElementRef) -> Result<String> {
		let mut state = self.state.lock();
		let target = state.target(element);
		state.calls.push(DriverCall::ElementText(target.clone()));
		state.check_failure("element text")?;

		let text = state
			.texts
			.iter()
			.find(|(needle, _)| target.contains(needle.as_str()))
			.map(|(_, text)| text.clone());
		Ok(text.unwrap_or(target))
	}

	async fn perform_actions(&self, _session: &str, actions: &Actions) -> Result<()> {
		let mut state = self.state.lock();
		state.calls.push(DriverCall::PerformActions(actions.clone()));
		state.check_failure("perform actions")
	}

	async fn push_file(&self, _session: &str, request: &PushFile) -> Result<()> {
		let mut state = self.state.lock();
		state.calls.push(DriverCall::PushFile {
			path: request.path.clone(),
			bytes: request.data.len(),
		});
		state.check_failure("push file")
	}

	async fn activate_app(&self, _session: &str, app_id: &str) -> Result<()> {
		let mut state = self.state.lock();
		state.calls.push(DriverCall::ActivateApp(app_id.to_string()));
		state.check_failure("activate app")
	}
}

impl Connector for FakeDriver {
	type Driver = FakeDriver;

	fn connect(&self, _endpoint: &ServerEndpoint) -> Result<FakeDriver> {
		Ok(self.clone())
	}
}

#[cfg(test)]
mod tests {
	use shorts_protocol::Using;

	use super::*;

	fn query(value: &str) -> FindElement {
		FindElement {
			using: Using::XPath,
			value: value.to_string(),
		}
	}

	#[tokio::test]
	async fn hidden_and_delayed_elements() {
		let driver = FakeDriver::new();
		driver.hide("Secret").reveal_after("Later", 2);

		assert!(driver.find_element("s", &query("//*[@text=\"Secret\"]")).await.unwrap().is_none());
		assert!(driver.find_element("s", &query("//*[@text=\"Later\"]")).await.unwrap().is_none());
		assert!(driver.find_element("s", &query("//*[@text=\"Later\"]")).await.unwrap().is_none());
		assert!(driver.find_element("s", &query("//*[@text=\"Later\"]")).await.unwrap().is_some());
		assert!(driver.find_element("s", &query("//*[@text=\"Other\"]")).await.unwrap().is_some());
	}

	#[tokio::test]
	async fn element_commands_record_their_target() {
		let driver = FakeDriver::new();
		driver.set_text("Link", "https://youtube.com/shorts/abc");

		let button = driver.find_element("s", &query("Upload")).await.unwrap().unwrap();
		driver.click("s", &button).await.unwrap();
		let link = driver.find_element("s", &query("Link")).await.unwrap().unwrap();

		assert_eq!(driver.element_text("s", &link).await.unwrap(), "https://youtube.com/shorts/abc");
		assert_eq!(driver.clicked(), ["Upload"]);
	}

	#[tokio::test]
	async fn injected_failures_surface_as_driver_errors() {
		let driver = FakeDriver::new();
		driver.fail_command("click").fail_session("no device");

		let err = driver.create_session(&SessionCapabilities::default()).await.unwrap_err();
		assert!(matches!(err, Error::SessionInit(reason) if reason == "no device"));

		let element = ElementRef::new("x");
		let err = driver.click("s", &element).await.unwrap_err();
		assert!(matches!(err, Error::Driver { command, .. } if command == "click"));
	}
}
