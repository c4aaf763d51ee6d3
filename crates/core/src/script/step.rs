//! The fixed upload script.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Identifies one step of the upload script and its entry in the UI table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepId {
	ActivateApp,
	OpenCreate,
	CreateShort,
	AddMedia,
	PushVideo,
	BrowseFiles,
	OpenDownloads,
	SelectVideo,
	AwaitProcessing,
	Advance,
	SetCaption,
	RevealPoll,
	OpenPoll,
	SetPollQuestion,
	SetPollOption1,
	SetPollOption2,
	OpenPollDuration,
	SelectPollDuration,
	ConfirmPoll,
	RevealSubmit,
	Submit,
}

impl StepId {
	pub fn as_str(self) -> &'static str {
		match self {
			StepId::ActivateApp => "activate-app",
			StepId::OpenCreate => "open-create",
			StepId::CreateShort => "create-short",
			StepId::AddMedia => "add-media",
			StepId::PushVideo => "push-video",
			StepId::BrowseFiles => "browse-files",
			StepId::OpenDownloads => "open-downloads",
			StepId::SelectVideo => "select-video",
			StepId::AwaitProcessing => "await-processing",
			StepId::Advance => "advance",
			StepId::SetCaption => "set-caption",
			StepId::RevealPoll => "reveal-poll",
			StepId::OpenPoll => "open-poll",
			StepId::SetPollQuestion => "set-poll-question",
			StepId::SetPollOption1 => "set-poll-option-1",
			StepId::SetPollOption2 => "set-poll-option-2",
			StepId::OpenPollDuration => "open-poll-duration",
			StepId::SelectPollDuration => "select-poll-duration",
			StepId::ConfirmPoll => "confirm-poll",
			StepId::RevealSubmit => "reveal-submit",
			StepId::Submit => "submit",
		}
	}
}

impl fmt::Display for StepId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Value typed by a [`Action::SetText`] step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
	Caption,
	PollQuestion,
	PollOption(usize),
}

/// What a step does once its element (if any) is located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
	/// Bring the target application to the foreground.
	ActivateApp,
	Tap,
	SetText(TextSource),
	/// Copy the local video into the device media directory.
	PushFile,
	/// Swipe using the table's scroll gesture.
	Scroll,
	/// Act on nothing; the settle policy waits for the step's own locator.
	Await,
}

impl Action {
	/// Whether the step needs a located element before acting.
	pub fn needs_element(self) -> bool {
		matches!(self, Action::Tap | Action::SetText(_))
	}
}

/// How long to let the UI catch up after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settle {
	/// Sleep for a fixed delay.
	Fixed(Duration),
	/// Wait until the locator of `target` is present, at most `bound`; sleep `fallback` if it never appears.
	UntilPresent { target: StepId, bound: Duration, fallback: Duration },
	/// Wait until the locator of `target` is gone, at most `bound`; sleep `fallback` if it lingers.
	UntilAbsent { target: StepId, bound: Duration, fallback: Duration },
}

/// One entry of the upload script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadStep {
	pub id: StepId,
	pub action: Action,
	pub settle: Settle,
}

const fn ms(millis: u64) -> Duration {
	Duration::from_millis(millis)
}

const fn step(id: StepId, action: Action, settle: Settle) -> UploadStep {
	UploadStep { id, action, settle }
}

const fn fixed(millis: u64) -> Settle {
	Settle::Fixed(ms(millis))
}

const fn until_present(target: StepId, bound_ms: u64, fallback_ms: u64) -> Settle {
	Settle::UntilPresent {
		target,
		bound: ms(bound_ms),
		fallback: ms(fallback_ms),
	}
}

/// The upload script, in execution order.
pub const UPLOAD_SCRIPT: [UploadStep; 21] = [
	step(StepId::ActivateApp, Action::ActivateApp, until_present(StepId::OpenCreate, 10_000, 3_000)),
	step(StepId::OpenCreate, Action::Tap, until_present(StepId::CreateShort, 5_000, 2_000)),
	step(StepId::CreateShort, Action::Tap, until_present(StepId::AddMedia, 5_000, 2_000)),
	step(StepId::AddMedia, Action::Tap, fixed(2_000)),
	step(StepId::PushVideo, Action::PushFile, fixed(1_000)),
	step(StepId::BrowseFiles, Action::Tap, until_present(StepId::OpenDownloads, 5_000, 2_000)),
	step(StepId::OpenDownloads, Action::Tap, until_present(StepId::SelectVideo, 5_000, 2_000)),
	step(StepId::SelectVideo, Action::Tap, fixed(3_000)),
	step(StepId::AwaitProcessing, Action::Await, until_present(StepId::AwaitProcessing, 30_000, 5_000)),
	step(StepId::Advance, Action::Tap, until_present(StepId::SetCaption, 10_000, 3_000)),
	step(StepId::SetCaption, Action::SetText(TextSource::Caption), fixed(1_000)),
	step(StepId::RevealPoll, Action::Scroll, fixed(1_000)),
	step(StepId::OpenPoll, Action::Tap, until_present(StepId::SetPollOption1, 5_000, 2_000)),
	step(StepId::SetPollQuestion, Action::SetText(TextSource::PollQuestion), fixed(1_000)),
	step(StepId::SetPollOption1, Action::SetText(TextSource::PollOption(0)), fixed(1_000)),
	step(StepId::SetPollOption2, Action::SetText(TextSource::PollOption(1)), fixed(1_000)),
	step(StepId::OpenPollDuration, Action::Tap, until_present(StepId::SelectPollDuration, 3_000, 1_000)),
	step(StepId::SelectPollDuration, Action::Tap, fixed(1_000)),
	step(
		StepId::ConfirmPoll,
		Action::Tap,
		Settle::UntilAbsent {
			target: StepId::ConfirmPoll,
			bound: ms(5_000),
			fallback: ms(2_000),
		},
	),
	step(StepId::RevealSubmit, Action::Scroll, fixed(1_000)),
	step(StepId::Submit, Action::Tap, fixed(0)),
];

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn script_ids_are_unique_and_ordered() {
		let ids: Vec<StepId> = UPLOAD_SCRIPT.iter().map(|s| s.id).collect();
		let mut sorted = ids.clone();
		sorted.sort();
		sorted.dedup();
		assert_eq!(ids, sorted);
		assert_eq!(ids.first(), Some(&StepId::ActivateApp));
		assert_eq!(ids.last(), Some(&StepId::Submit));
	}

	#[test]
	fn step_ids_serialize_kebab_case() {
		for step in UPLOAD_SCRIPT {
			let json = serde_json::to_value(step.id).unwrap();
			assert_eq!(json, step.id.as_str());
		}
	}
}
