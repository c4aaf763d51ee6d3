//! Automation session: one live driver handle and the primitives built on it.

use std::time::Duration;

use shorts_protocol::{Actions, ElementRef, Point, PushFile, SessionCapabilities, Timeouts};
use tracing::{debug, info, warn};

use crate::driver::Driver;
use crate::error::{Error, Result};
use crate::locator::Locator;

/// Duration of the press-drag-release swipe used by [`AutomationSession::scroll`].
pub const SWIPE_DURATION: Duration = Duration::from_millis(400);

/// Owns at most one remote session on `driver`.
///
/// [`close`](Self::close) must run on every exit path after a successful
/// [`open`](Self::open); it is idempotent and clears the local handle even if
/// the remote delete fails.
#[derive(Debug)]
pub struct AutomationSession<D: Driver> {
	driver: D,
	session_id: Option<String>,
	probe_window: Duration,
}

impl<D: Driver> AutomationSession<D> {
	/// `probe_window` becomes the driver's implicit wait: how long a lookup may
	/// block before reporting that an element is absent.
	pub fn new(driver: D, probe_window: Duration) -> Self {
		Self {
			driver,
			session_id: None,
			probe_window,
		}
	}

	pub fn driver(&self) -> &D {
		&self.driver
	}

	pub fn session_id(&self) -> Option<&str> {
		self.session_id.as_deref()
	}

	pub fn is_open(&self) -> bool {
		self.session_id.is_some()
	}

	/// Negotiates a session for `capabilities` and applies the probe window.
	pub async fn open(&mut self, capabilities: &SessionCapabilities) -> Result<()> {
		if let Some(id) = &self.session_id {
			return Err(Error::SessionInit(format!("session {id} is already open")));
		}

		let id = self.driver.create_session(capabilities).await?;
		info!(target = "shorts.session", session = %id, device = %capabilities.device_name, "session opened");
		self.session_id = Some(id);

		let timeouts = Timeouts {
			implicit: Some(self.probe_window.as_millis() as u64),
		};
		let handle = self.handle()?.to_string();
		if let Err(err) = self.driver.set_timeouts(&handle, timeouts).await {
			warn!(target = "shorts.session", error = %err, "failed to configure probe window; closing session");
			if let Err(close_err) = self.close().await {
				debug!(target = "shorts.session", error = %close_err, "close after failed open also failed");
			}
			return Err(Error::SessionInit(err.to_string()));
		}
		Ok(())
	}

	fn handle(&self) -> Result<&str> {
		self.session_id.as_deref().ok_or(Error::NoSession)
	}

	/// Returns the element `locator` matches, or [`Error::ElementNotFound`].
	///
	/// Waits no longer than the probe window.
	pub async fn find(&self, locator: &Locator) -> Result<ElementRef> {
		let session = self.handle()?;
		match self.driver.find_element(session, &locator.to_query()).await? {
			Some(element) => Ok(element),
			None => Err(Error::ElementNotFound {
				locator: locator.to_string(),
			}),
		}
	}

	/// Whether `locator` matches anything right now.
	pub async fn exists(&self, locator: &Locator) -> Result<bool> {
		let session = self.handle()?;
		Ok(self.driver.find_element(session, &locator.to_query()).await?.is_some())
	}

	pub async fn tap(&self, element: &ElementRef) -> Result<()> {
		self.driver.click(self.handle()?, element).await
	}

	/// Replaces the element's current text with `value`.
	pub async fn set_text(&self, element: &ElementRef, value: &str) -> Result<()> {
		let session = self.handle()?;
		self.driver.clear(session, element).await?;
		self.driver.send_keys(session, element, value).await
	}

	pub async fn text(&self, element: &ElementRef) -> Result<String> {
		self.driver.element_text(self.handle()?, element).await
	}

	/// Writes `contents` to `device_path` on the device.
	pub async fn push_file(&self, device_path: &str, contents: &[u8]) -> Result<()> {
		let session = self.handle()?;
		debug!(target = "shorts.session", path = device_path, bytes = contents.len(), "pushing file");
		self.driver.push_file(session, &PushFile::new(device_path, contents)).await
	}

	/// Swipes from `from` to `to`.
	pub async fn scroll(&self, from: Point, to: Point) -> Result<()> {
		let session = self.handle()?;
		let actions = Actions::swipe(from, to, SWIPE_DURATION.as_millis() as u64);
		self.driver.perform_actions(session, &actions).await
	}

	pub async fn activate_app(&self, app_id: &str) -> Result<()> {
		self.driver.activate_app(self.handle()?, app_id).await
	}

	/// Deletes the remote session. No-op when nothing is open.
	pub async fn close(&mut self) -> Result<()> {
		let Some(id) = self.session_id.take() else {
			return Ok(());
		};

		match self.driver.delete_session(&id).await {
			Ok(()) => {
				info!(target = "shorts.session", session = %id, "session closed");
				Ok(())
			}
			Err(err) => {
				warn!(target = "shorts.session", session = %id, error = %err, "failed to delete session");
				Err(err)
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::driver::{DriverCall, FakeDriver};

	fn session() -> (AutomationSession<FakeDriver>, FakeDriver) {
		let driver = FakeDriver::new();
		(AutomationSession::new(driver.clone(), Duration::from_millis(1000)), driver)
	}

	#[tokio::test]
	async fn open_configures_probe_window() {
		let (mut session, driver) = session();
		session.open(&SessionCapabilities::default()).await.unwrap();

		assert!(session.is_open());
		assert!(driver.calls().contains(&DriverCall::SetTimeouts(Timeouts { implicit: Some(1000) })));
	}

	#[tokio::test]
	async fn open_twice_is_rejected() {
		let (mut session, driver) = session();
		session.open(&SessionCapabilities::default()).await.unwrap();
		let err = session.open(&SessionCapabilities::default()).await.unwrap_err();

		assert!(matches!(err, Error::SessionInit(_)));
		assert_eq!(driver.sessions_created(), 1);
	}

	#[tokio::test]
	async fn close_is_idempotent_and_clears_on_failure() {
		let (mut session, driver) = session();
		session.close().await.unwrap();
		assert_eq!(driver.sessions_deleted(), 0);

		session.open(&SessionCapabilities::default()).await.unwrap();
		driver.fail_command("delete session");
		assert!(session.close().await.is_err());
		assert!(!session.is_open());
		session.close().await.unwrap();
	}

	#[tokio::test]
	async fn primitives_require_open_session() {
		let (session, _driver) = session();
		let err = session.find(&Locator::text("Next")).await.unwrap_err();
		assert!(matches!(err, Error::NoSession));
	}

	#[tokio::test]
	async fn find_reports_missing_element() {
		let (mut session, driver) = session();
		driver.hide("Poll");
		session.open(&SessionCapabilities::default()).await.unwrap();

		let err = session.find(&Locator::text("Poll")).await.unwrap_err();
		assert!(matches!(err, Error::ElementNotFound { .. }));
		assert!(!session.exists(&Locator::text("Poll")).await.unwrap());
		assert!(session.exists(&Locator::text("Next")).await.unwrap());
	}

	#[tokio::test]
	async fn set_text_clears_before_typing() {
		let (mut session, driver) = session();
		session.open(&SessionCapabilities::default()).await.unwrap();
		let field = session.find(&Locator::input_hint("Caption")).await.unwrap();
		session.set_text(&field, "hello").await.unwrap();

		let calls = driver.take_calls();
		let clear = calls.iter().position(|c| matches!(c, DriverCall::Clear(_))).unwrap();
		let keys = calls.iter().position(|c| matches!(c, DriverCall::SendKeys { .. })).unwrap();
		assert!(clear < keys);
		assert_eq!(calls[keys], DriverCall::SendKeys {
			target: r#"//*[@hint="Caption" or @text="Caption"]"#.into(),
			text: "hello".into(),
		});
	}
}
