//! End-to-end publish flow.

use std::path::Path;
use std::sync::Arc;

use shorts_runtime::{ServerControl, ServerEndpoint};
use tracing::{info, warn};

use crate::config::PublisherConfig;
use crate::driver::Connector;
use crate::error::{Result, ValidationError};
use crate::poll::{PollOptions, PollSpec};
use crate::poller::CompletionPoller;
use crate::resolver::{ResultResolver, UploadResult};
use crate::script::{RunReport, UiTable, UploadRequest, UploadStateMachine};
use crate::session::AutomationSession;

/// Everything a successful publish produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
	pub result: UploadResult,
	/// Adjustments made to the requested poll (dropped options, duration fallback).
	pub poll_warnings: Vec<String>,
	pub steps: RunReport,
}

/// Composes server, session, script, poller, and resolver into one publish call.
pub struct PublishOrchestrator<C: Connector> {
	config: PublisherConfig,
	table: UiTable,
	server: Arc<dyn ServerControl>,
	connector: C,
}

impl<C: Connector> PublishOrchestrator<C> {
	pub fn new(config: PublisherConfig, table: UiTable, server: Arc<dyn ServerControl>, connector: C) -> Self {
		Self {
			config,
			table,
			server,
			connector,
		}
	}

	pub fn config(&self) -> &PublisherConfig {
		&self.config
	}

	/// Uploads `video` with `caption` and a two-option poll.
	pub async fn publish(&self, video: &Path, caption: &str, poll: &PollOptions) -> Result<UploadResult> {
		self.publish_report(video, caption, poll).await.map(|report| report.result)
	}

	/// Like [`publish`](Self::publish), also returning poll warnings and executed steps.
	///
	/// Inputs are validated before the server is touched. After that the
	/// session is closed and the server stopped on every exit path, including
	/// a failed server start; teardown failures are logged and never replace
	/// the run's error.
	pub async fn publish_report(&self, video: &Path, caption: &str, poll: &PollOptions) -> Result<PublishReport> {
		let request = self.validate(video, caption, poll)?;
		info!(target = "shorts.publish", video = %video.display(), "publishing Short");

		let outcome = match self.server.ensure_running(&self.config.server).await {
			Ok(endpoint) => self.run(&endpoint, &request).await,
			Err(err) => Err(err.into()),
		};

		if self.config.keep_server_running {
			info!(target = "shorts.publish", "leaving automation server running");
		} else if let Err(err) = self.server.stop().await {
			warn!(target = "shorts.publish", error = %err, "failed to stop automation server");
		}

		let (result, steps) = outcome?;
		info!(target = "shorts.publish", url = %result.url, resolved_via = ?result.resolved_via, "Short published");
		Ok(PublishReport {
			result,
			poll_warnings: request.poll.warnings().to_vec(),
			steps,
		})
	}

	fn validate(&self, video: &Path, caption: &str, poll: &PollOptions) -> Result<UploadRequest> {
		if !video.is_file() {
			return Err(ValidationError::VideoNotFound(video.to_path_buf()).into());
		}
		if caption.trim().is_empty() {
			return Err(ValidationError::EmptyCaption.into());
		}
		let poll = PollSpec::new(poll, self.config.default_poll_duration())?;

		Ok(UploadRequest {
			video: video.to_path_buf(),
			caption: caption.to_string(),
			poll,
		})
	}

	async fn run(&self, endpoint: &ServerEndpoint, request: &UploadRequest) -> Result<(UploadResult, RunReport)> {
		let driver = self.connector.connect(endpoint)?;
		let mut session = AutomationSession::new(driver, self.config.timing.probe_window());

		let outcome = self.drive(&mut session, request).await;

		if let Err(err) = session.close().await {
			warn!(target = "shorts.publish", error = %err, "failed to close automation session");
		}
		outcome
	}

	async fn drive(&self, session: &mut AutomationSession<C::Driver>, request: &UploadRequest) -> Result<(UploadResult, RunReport)> {
		session.open(&self.config.capabilities).await?;

		let mut machine = UploadStateMachine::new(&self.table, self.config.capabilities.app_package.clone());
		let steps = machine.run(session, request).await?;

		let timing = &self.config.timing;
		CompletionPoller::new(&self.table)
			.with_interval(timing.poll_interval())
			.with_timeout(timing.upload_timeout())
			.wait(session)
			.await?;

		let result = ResultResolver::new(&self.table, timing.result_settle(), timing.result_navigate())
			.resolve(session)
			.await;
		Ok((result, steps))
	}
}
