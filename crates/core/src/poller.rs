//! Upload completion polling.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::driver::Driver;
use crate::error::{Error, Result};
use crate::locator::Locator;
use crate::script::UiTable;
use crate::session::AutomationSession;

/// Default delay between completion probes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default time allowed for an upload to finish.
pub const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Successful completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
	/// The success marker that was seen.
	pub marker: Locator,
	pub elapsed: Duration,
	pub probes: u32,
}

/// Watches the screen for a success marker after submission.
#[derive(Debug, Clone)]
pub struct CompletionPoller {
	success: Vec<Locator>,
	progress: Vec<Locator>,
	interval: Duration,
	timeout: Duration,
}

impl CompletionPoller {
	pub fn new(table: &UiTable) -> Self {
		Self {
			success: table.success_markers.clone(),
			progress: table.progress_markers.clone(),
			interval: DEFAULT_POLL_INTERVAL,
			timeout: DEFAULT_UPLOAD_TIMEOUT,
		}
	}

	pub fn with_interval(mut self, interval: Duration) -> Self {
		self.interval = interval;
		self
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	/// Probes until a success marker shows up or the timeout passes.
	///
	/// The last probe runs at the deadline and is cut off after one interval,
	/// so a timeout is reported no earlier than `timeout` and no later than
	/// one interval after it, however slow individual lookups are.
	/// Probe errors are logged and retried.
	pub async fn wait<D: Driver>(&self, session: &AutomationSession<D>) -> Result<Completion> {
		let start = Instant::now();
		let deadline = start + self.timeout;
		let mut probes = 0u32;
		let mut last_progress: Option<String> = None;

		info!(
			target = "shorts.poll",
			timeout_ms = self.timeout.as_millis() as u64,
			interval_ms = self.interval.as_millis() as u64,
			"waiting for upload to complete"
		);

		loop {
			probes += 1;
			// Each lookup may block for the implicit wait, so one probe can outlast the interval.
			let budget = deadline.saturating_duration_since(Instant::now()).max(self.interval);
			match tokio::time::timeout(budget, self.probe(session)).await {
				Err(_) => debug!(target = "shorts.poll", budget_ms = budget.as_millis() as u64, "status probe ran out of time"),
				Ok(Ok(Probe::Done(marker))) => {
					let elapsed = start.elapsed();
					info!(target = "shorts.poll", %marker, elapsed_ms = elapsed.as_millis() as u64, "upload complete");
					return Ok(Completion { marker, elapsed, probes });
				}
				Ok(Ok(Probe::InProgress(marker))) => {
					let label = marker.value;
					if last_progress.as_deref() != Some(label.as_str()) {
						info!(target = "shorts.poll", status = %label, "upload in progress");
						last_progress = Some(label);
					}
				}
				Ok(Ok(Probe::Unknown)) => debug!(target = "shorts.poll", "no upload status on screen"),
				Ok(Err(err)) => debug!(target = "shorts.poll", error = %err, "status probe failed; retrying"),
			}

			let now = Instant::now();
			if now >= deadline {
				let elapsed = start.elapsed();
				return Err(Error::UploadTimeout {
					elapsed_ms: elapsed.as_millis() as u64,
				});
			}
			tokio::time::sleep_until((now + self.interval).min(deadline)).await;
		}
	}

	async fn probe<D: Driver>(&self, session: &AutomationSession<D>) -> Result<Probe> {
		for marker in &self.success {
			if session.exists(marker).await? {
				return Ok(Probe::Done(marker.clone()));
			}
		}
		for marker in &self.progress {
			if session.exists(marker).await? {
				return Ok(Probe::InProgress(marker.clone()));
			}
		}
		Ok(Probe::Unknown)
	}
}

enum Probe {
	Done(Locator),
	InProgress(Locator),
	Unknown,
}
