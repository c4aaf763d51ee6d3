//! Step interpreter for the upload script.

use std::path::PathBuf;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use super::step::{Action, Settle, TextSource, UPLOAD_SCRIPT, UploadStep};
use super::table::UiTable;
use super::StepId;
use crate::driver::Driver;
use crate::error::{Error, Result, ValidationError};
use crate::locator::TemplateVars;
use crate::poll::PollSpec;
use crate::session::AutomationSession;

/// How often a settle condition is re-checked.
const SETTLE_POLL: Duration = Duration::from_millis(500);

/// Validated inputs for one run.
#[derive(Debug, Clone)]
pub struct UploadRequest {
	pub video: PathBuf,
	pub caption: String,
	pub poll: PollSpec,
}

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
	Ready,
	/// Index into the script.
	Step(usize),
	Submitted,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
	pub executed: Vec<StepId>,
	pub skipped: Vec<StepId>,
}

/// Drives the fixed upload script through a session.
#[derive(Debug)]
pub struct UploadStateMachine<'a> {
	table: &'a UiTable,
	app_id: String,
	steps: &'static [UploadStep],
	state: RunState,
}

impl<'a> UploadStateMachine<'a> {
	/// `app_id` is the package brought to the foreground by the first step.
	pub fn new(table: &'a UiTable, app_id: impl Into<String>) -> Self {
		Self {
			table,
			app_id: app_id.into(),
			steps: &UPLOAD_SCRIPT,
			state: RunState::Ready,
		}
	}

	pub fn state(&self) -> RunState {
		self.state
	}

	/// Runs every step in order, stopping at the first failure.
	///
	/// Failures are wrapped in [`Error::Step`] with the failing step's id.
	pub async fn run<D: Driver>(&mut self, session: &AutomationSession<D>, request: &UploadRequest) -> Result<RunReport> {
		let file_name = request
			.video
			.file_name()
			.and_then(|name| name.to_str())
			.ok_or_else(|| ValidationError::VideoNotFound(request.video.clone()))?
			.to_string();
		let vars = TemplateVars {
			file_name,
			duration_label: self.table.duration_label(request.poll.duration())?.to_string(),
		};

		let mut report = RunReport::default();
		let total = self.steps.len();

		for (index, step) in self.steps.iter().enumerate() {
			self.state = RunState::Step(index);

			if step.action == Action::SetText(TextSource::PollQuestion) && request.poll.question().is_none() {
				debug!(target = "shorts.upload", step = %step.id, "no poll question; skipping");
				report.skipped.push(step.id);
				continue;
			}

			info!(target = "shorts.upload", step = %step.id, index = index + 1, total, "running step");
			self.execute(session, step, request, &vars).await.map_err(|source| Error::Step {
				step: step.id,
				source: Box::new(source),
			})?;
			self.settle(session, step.settle, &vars).await;
			report.executed.push(step.id);
		}

		self.state = RunState::Submitted;
		info!(target = "shorts.upload", executed = report.executed.len(), skipped = report.skipped.len(), "upload submitted");
		Ok(report)
	}

	async fn execute<D: Driver>(&self, session: &AutomationSession<D>, step: &UploadStep, request: &UploadRequest, vars: &TemplateVars) -> Result<()> {
		match step.action {
			Action::ActivateApp => session.activate_app(&self.app_id).await,
			Action::Tap => {
				let locator = self.table.locator(step.id)?.render(vars);
				let element = session.find(&locator).await?;
				session.tap(&element).await
			}
			Action::SetText(source) => {
				let value = match source {
					TextSource::Caption => request.caption.as_str(),
					TextSource::PollQuestion => request.poll.question().unwrap_or_default(),
					TextSource::PollOption(index) => request.poll.options().get(index).map(String::as_str).unwrap_or_default(),
				};
				let locator = self.table.locator(step.id)?.render(vars);
				let element = session.find(&locator).await?;
				session.set_text(&element, value).await
			}
			Action::PushFile => {
				if !request.video.is_file() {
					return Err(ValidationError::VideoNotFound(request.video.clone()).into());
				}
				let contents = tokio::fs::read(&request.video).await.map_err(|source| ValidationError::VideoUnreadable {
					path: request.video.clone(),
					source,
				})?;
				session.push_file(&self.table.device_path(&vars.file_name), &contents).await
			}
			Action::Scroll => session.scroll(self.table.scroll.from, self.table.scroll.to).await,
			Action::Await => Ok(()),
		}
	}

	async fn settle<D: Driver>(&self, session: &AutomationSession<D>, settle: Settle, vars: &TemplateVars) {
		match settle {
			Settle::Fixed(delay) => {
				if !delay.is_zero() {
					tokio::time::sleep(delay).await;
				}
			}
			Settle::UntilPresent { target, bound, fallback } => self.wait_for(session, target, true, bound, fallback, vars).await,
			Settle::UntilAbsent { target, bound, fallback } => self.wait_for(session, target, false, bound, fallback, vars).await,
		}
	}

	/// Polls until `target`'s presence equals `present` or `bound` elapses,
	/// then sleeps `fallback` if the condition was never met.
	async fn wait_for<D: Driver>(&self, session: &AutomationSession<D>, target: StepId, present: bool, bound: Duration, fallback: Duration, vars: &TemplateVars) {
		let locator = match self.table.locator(target) {
			Ok(locator) => locator.render(vars),
			Err(_) => {
				tokio::time::sleep(fallback).await;
				return;
			}
		};

		let deadline = Instant::now() + bound;
		loop {
			match session.exists(&locator).await {
				Ok(found) if found == present => {
					debug!(target = "shorts.upload", %locator, present, "settle condition met");
					return;
				}
				Ok(_) => {}
				Err(err) => debug!(target = "shorts.upload", %locator, error = %err, "settle probe failed"),
			}

			let now = Instant::now();
			if now >= deadline {
				break;
			}
			tokio::time::sleep(SETTLE_POLL.min(deadline - now)).await;
		}

		debug!(target = "shorts.upload", %locator, present, "settle condition not met; using fixed delay");
		tokio::time::sleep(fallback).await;
	}
}
