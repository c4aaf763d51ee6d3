use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use shorts::{Error, ErrorKind, FakeDriver, PollOptions, PublishOrchestrator, PublisherConfig, ResolvedVia, StepId, UiTable, ValidationError};
use shorts_runtime::{ApiBase, ServerConfig, ServerControl, ServerEndpoint, ServerError};
use tempfile::NamedTempFile;

/// Counts lifecycle calls instead of running a server.
#[derive(Default)]
struct RecordingServer {
	ensures: AtomicUsize,
	stops: AtomicUsize,
	refuse: bool,
}

impl RecordingServer {
	fn refusing() -> Self {
		Self {
			refuse: true,
			..Default::default()
		}
	}

	fn ensures(&self) -> usize {
		self.ensures.load(Ordering::SeqCst)
	}

	fn stops(&self) -> usize {
		self.stops.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl ServerControl for RecordingServer {
	async fn ensure_running(&self, config: &ServerConfig) -> shorts_runtime::Result<ServerEndpoint> {
		self.ensures.fetch_add(1, Ordering::SeqCst);
		if self.refuse {
			return Err(ServerError::ExitedBeforeReady {
				status: "exit status: 1".into(),
			});
		}
		Ok(ServerEndpoint::new(config, ApiBase::Root, true))
	}

	async fn stop(&self) -> shorts_runtime::Result<()> {
		self.stops.fetch_add(1, Ordering::SeqCst);
		Ok(())
	}

	async fn is_running(&self, _config: &ServerConfig) -> bool {
		self.ensures() > self.stops()
	}
}

fn video() -> NamedTempFile {
	let mut file = tempfile::Builder::new().prefix("episode").suffix(".mp4").tempfile().expect("temp video");
	file.write_all(b"\x00\x00\x00\x18ftypmp42").expect("write video");
	file
}

fn harness(config: PublisherConfig) -> (PublishOrchestrator<FakeDriver>, Arc<RecordingServer>, FakeDriver) {
	harness_with(config, RecordingServer::default())
}

fn harness_with(config: PublisherConfig, server: RecordingServer) -> (PublishOrchestrator<FakeDriver>, Arc<RecordingServer>, FakeDriver) {
	let server = Arc::new(server);
	let driver = FakeDriver::new();
	let orchestrator = PublishOrchestrator::new(config, UiTable::builtin(), server.clone(), driver.clone());
	(orchestrator, server, driver)
}

fn two_options() -> PollOptions {
	PollOptions::new(["Open the door", "Run away"]).with_question("What happens next?")
}

#[tokio::test(start_paused = true)]
async fn publish_runs_end_to_end_and_tears_down_once() {
	let video = video();
	let (orchestrator, server, driver) = harness(PublisherConfig::default());

	let report = orchestrator
		.publish_report(video.path(), "Episode 1", &two_options())
		.await
		.expect("publish should succeed");

	assert!(!report.result.url.is_empty());
	assert_eq!(report.result.resolved_via, ResolvedVia::Placeholder);
	assert!(report.result.url.starts_with("https://youtube.com/shorts/choicestream_"));
	assert!(report.poll_warnings.is_empty());
	assert!(report.steps.skipped.is_empty());

	assert_eq!(server.ensures(), 1);
	assert_eq!(server.stops(), 1);
	assert_eq!(driver.sessions_created(), 1);
	assert_eq!(driver.sessions_deleted(), 1);
	assert_eq!(driver.typed(), ["Episode 1", "What happens next?", "Open the door", "Run away"]);
}

#[tokio::test(start_paused = true)]
async fn visible_short_url_is_reported_as_observed() {
	let video = video();
	let (orchestrator, _server, driver) = harness(PublisherConfig::default());
	driver.set_text("youtube.com/shorts/", "https://youtube.com/shorts/q9XhJ2kLmA0");

	let result = orchestrator.publish(video.path(), "Episode 2", &two_options()).await.expect("publish");

	assert_eq!(result.url, "https://youtube.com/shorts/q9XhJ2kLmA0");
	assert_eq!(result.resolved_via, ResolvedVia::Observed);
}

#[tokio::test(start_paused = true)]
async fn missing_video_fails_before_server_start() {
	let (orchestrator, server, driver) = harness(PublisherConfig::default());

	let err = orchestrator
		.publish(Path::new("/definitely/not/here.mp4"), "caption", &two_options())
		.await
		.expect_err("missing video");

	assert!(matches!(err, Error::Validation(ValidationError::VideoNotFound(_))), "{err}");
	assert_eq!(server.ensures(), 0);
	assert_eq!(server.stops(), 0);
	assert!(driver.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn blank_caption_is_rejected() {
	let video = video();
	let (orchestrator, server, _driver) = harness(PublisherConfig::default());

	let err = orchestrator.publish(video.path(), "  \n", &two_options()).await.expect_err("blank caption");

	assert!(matches!(err, Error::Validation(ValidationError::EmptyCaption)), "{err}");
	assert_eq!(server.ensures(), 0);
}

#[tokio::test(start_paused = true)]
async fn single_poll_option_fails_before_any_ui_interaction() {
	let video = video();
	let (orchestrator, server, driver) = harness(PublisherConfig::default());

	let err = orchestrator
		.publish(video.path(), "caption", &PollOptions::new(["Only one"]))
		.await
		.expect_err("one option");

	assert!(matches!(err, Error::Validation(ValidationError::NotEnoughPollOptions { count: 1 })), "{err}");
	assert_eq!(server.ensures(), 0);
	assert!(driver.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn extra_poll_options_are_truncated_with_warning() {
	let video = video();
	let (orchestrator, _server, driver) = harness(PublisherConfig::default());
	let poll = PollOptions::new(["Left", "Right", "Up", "Down"]);

	let report = orchestrator.publish_report(video.path(), "caption", &poll).await.expect("publish");

	assert_eq!(report.poll_warnings.len(), 1);
	assert_eq!(report.steps.skipped, [StepId::SetPollQuestion]);
	assert_eq!(driver.typed(), ["caption", "Left", "Right"]);
}

#[tokio::test(start_paused = true)]
async fn unsupported_duration_uses_configured_default() {
	let video = video();
	let (orchestrator, _server, driver) = harness(PublisherConfig::default());
	let poll = two_options().with_duration_days(2);

	let report = orchestrator.publish_report(video.path(), "caption", &poll).await.expect("publish");

	assert_eq!(report.poll_warnings.len(), 1);
	assert!(driver.clicked().iter().any(|query| query.contains("\"7 days\"")));
	assert!(!driver.clicked().iter().any(|query| query.contains("\"1 day\"") || query.contains("\"3 days\"")));
}

#[tokio::test(start_paused = true)]
async fn caption_failure_still_closes_session_and_stops_server() {
	let video = video();
	let (orchestrator, server, driver) = harness(PublisherConfig::default());
	driver.hide("Caption your Short");

	let err = orchestrator.publish(video.path(), "caption", &two_options()).await.expect_err("caption missing");

	assert_eq!(err.kind(), ErrorKind::ElementNotFound);
	assert_eq!(err.step(), Some(StepId::SetCaption));
	assert_eq!(driver.sessions_created(), 1);
	assert_eq!(driver.sessions_deleted(), 1);
	assert_eq!(server.stops(), 1);
	assert!(driver.typed().is_empty());
}

#[tokio::test(start_paused = true)]
async fn unconfirmed_upload_times_out_and_tears_down() {
	let video = video();
	let mut config = PublisherConfig::default();
	config.timing.upload_timeout_ms = 30_000;
	let (orchestrator, server, driver) = harness(config);
	driver.hide("Your Short").hide("Short uploaded").hide("Upload complete");

	let err = orchestrator.publish(video.path(), "caption", &two_options()).await.expect_err("timeout");

	assert_eq!(err.kind(), ErrorKind::UploadTimeout);
	assert!(matches!(err, Error::UploadTimeout { elapsed_ms: 30_000 }), "{err}");
	assert_eq!(driver.sessions_deleted(), 1);
	assert_eq!(server.stops(), 1);
}

#[tokio::test(start_paused = true)]
async fn session_failure_stops_server_without_deleting() {
	let video = video();
	let (orchestrator, server, driver) = harness(PublisherConfig::default());
	driver.fail_session("Could not find a connected Android device");

	let err = orchestrator.publish(video.path(), "caption", &two_options()).await.expect_err("no device");

	assert_eq!(err.kind(), ErrorKind::Session);
	assert_eq!(driver.sessions_deleted(), 0);
	assert_eq!(server.stops(), 1);
}

#[tokio::test(start_paused = true)]
async fn server_failure_is_lifecycle_error() {
	let video = video();
	let (orchestrator, server, driver) = harness_with(PublisherConfig::default(), RecordingServer::refusing());

	let err = orchestrator.publish(video.path(), "caption", &two_options()).await.expect_err("server down");

	assert_eq!(err.kind(), ErrorKind::ServerLifecycle);
	assert_eq!(server.ensures(), 1);
	assert_eq!(server.stops(), 1);
	assert!(driver.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn caption_is_typed_as_supplied() {
	let video = video();
	let (orchestrator, _server, driver) = harness(PublisherConfig::default());

	orchestrator.publish(video.path(), "  Episode 3 \u{1F31F}\n", &two_options()).await.expect("publish");

	assert_eq!(driver.typed().first().map(String::as_str), Some("  Episode 3 \u{1F31F}\n"));
}

#[tokio::test(start_paused = true)]
async fn keep_server_running_skips_stop() {
	let video = video();
	let config = PublisherConfig {
		keep_server_running: true,
		..Default::default()
	};
	let (orchestrator, server, driver) = harness(config);

	orchestrator.publish(video.path(), "caption", &two_options()).await.expect("publish");

	assert_eq!(server.stops(), 0);
	assert_eq!(driver.sessions_deleted(), 1);
}
