use shorts::{HttpConnector, PollOptions, PublishOrchestrator, PublisherConfig, StoryChoices};
use shorts_runtime::ServerLifecycleManager;
use tracing::info;

use crate::cli::PublishArgs;
use crate::error::Result;
use crate::output::PublishData;

pub async fn execute(config: PublisherConfig, args: PublishArgs) -> Result<PublishData> {
	let poll = poll_options(&args)?;
	let table = config.load_ui_table()?;
	info!(target = "shorts.publish", video = %args.video.display(), options = poll.options.len(), "starting publish");

	let server = ServerLifecycleManager::shared(config.launch.clone());
	let orchestrator = PublishOrchestrator::new(config, table, server, HttpConnector);
	let report = orchestrator.publish_report(&args.video, &args.caption, &poll).await?;

	Ok(PublishData {
		url: report.result.url,
		resolved_via: report.result.resolved_via,
		poll_warnings: report.poll_warnings,
		skipped_steps: report.steps.skipped.iter().map(|step| step.as_str().to_string()).collect(),
	})
}

/// `--option` values, or the story file's choices; `--question` and `--duration-days` apply to both.
fn poll_options(args: &PublishArgs) -> Result<PollOptions> {
	let mut poll = match &args.story {
		Some(path) => StoryChoices::from_file(path)?.poll_options(),
		None => PollOptions::new(args.options.iter().cloned()),
	};
	if let Some(question) = &args.question {
		poll.question = Some(question.clone());
	}
	if let Some(days) = args.duration_days {
		poll.duration_days = Some(days);
	}
	Ok(poll)
}

#[cfg(test)]
mod tests {
	use std::path::PathBuf;

	use super::*;

	fn args() -> PublishArgs {
		PublishArgs {
			video: PathBuf::from("clip.mp4"),
			caption: "Episode 1".into(),
			options: vec!["Left".into(), "Right".into()],
			story: None,
			question: None,
			duration_days: None,
		}
	}

	#[test]
	fn options_flags_become_poll() {
		let poll = poll_options(&PublishArgs {
			duration_days: Some(1),
			..args()
		})
		.unwrap();

		assert_eq!(poll.options, ["Left", "Right"]);
		assert_eq!(poll.question, None);
		assert_eq!(poll.duration_days, Some(1));
	}

	#[test]
	fn story_choices_take_story_question_unless_overridden() {
		let dir = tempfile::tempdir().unwrap();
		let story = dir.path().join("story.json");
		std::fs::write(&story, r#"{"title":"The Cave","choices":["Go in","Walk away","Call for help"]}"#).unwrap();

		let from_story = poll_options(&PublishArgs {
			options: Vec::new(),
			story: Some(story.clone()),
			..args()
		})
		.unwrap();
		assert_eq!(from_story.options, ["Go in", "Walk away"]);
		assert_eq!(from_story.question.as_deref(), Some(shorts::poll::STORY_QUESTION));

		let overridden = poll_options(&PublishArgs {
			options: Vec::new(),
			story: Some(story),
			question: Some("Now what?".into()),
			..args()
		})
		.unwrap();
		assert_eq!(overridden.question.as_deref(), Some("Now what?"));
	}

	#[test]
	fn unreadable_story_is_config_error() {
		let err = poll_options(&PublishArgs {
			options: Vec::new(),
			story: Some(PathBuf::from("/no/such/story.json")),
			..args()
		})
		.unwrap_err();
		assert_eq!(err.code(), crate::output::ErrorCode::ConfigError);
	}
}
