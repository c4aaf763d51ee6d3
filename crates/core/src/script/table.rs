//! Versioned UI wording table.
//!
//! Everything the publisher matches on screen lives here so a changed app
//! build can be handled by shipping a new JSON table instead of a new binary.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use shorts_protocol::Point;

use super::step::{Action, Settle, UPLOAD_SCRIPT};
use super::StepId;
use crate::error::{Error, Result};
use crate::locator::Locator;
use crate::poll::PollDuration;

/// Schema version of [`UiTable::builtin`].
pub const UI_TABLE_VERSION: u32 = 1;

const TEXT_VIEW: &str = "android.widget.TextView";
const BUTTON: &str = "android.widget.Button";
const EDIT_TEXT: &str = "android.widget.EditText";

/// Swipe used to reveal controls below the fold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollGesture {
	pub from: Point,
	pub to: Point,
}

impl Default for ScrollGesture {
	fn default() -> Self {
		Self {
			from: Point::new(500, 1500),
			to: Point::new(500, 500),
		}
	}
}

/// Locators and on-screen wording for one app build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiTable {
	pub version: u32,
	pub locators: BTreeMap<StepId, Locator>,
	/// Any of these means the upload finished.
	pub success_markers: Vec<Locator>,
	/// Observed while the upload is still running.
	pub progress_markers: Vec<Locator>,
	/// Post-upload buttons that lead toward the published Short.
	pub result_buttons: Vec<Locator>,
	/// Text fragment identifying a visible Short URL.
	pub result_url_marker: Locator,
	/// Duration picker label per supported duration, keyed by days.
	pub duration_labels: BTreeMap<u32, String>,
	pub device_media_dir: String,
	#[serde(default)]
	pub scroll: ScrollGesture,
}

impl Default for UiTable {
	fn default() -> Self {
		Self::builtin()
	}
}

impl UiTable {
	/// Wording of the Android YouTube app the publisher was written against.
	pub fn builtin() -> Self {
		let locators = BTreeMap::from([
			(StepId::OpenCreate, Locator::content_description("Create")),
			(StepId::CreateShort, Locator::text("Create a Short").with_class(TEXT_VIEW)),
			(StepId::AddMedia, Locator::text("Add").with_class(BUTTON)),
			(StepId::BrowseFiles, Locator::text("Browse").with_class(TEXT_VIEW)),
			(StepId::OpenDownloads, Locator::text("Downloads").with_class(TEXT_VIEW)),
			(StepId::SelectVideo, Locator::text("{file_name}").with_class(TEXT_VIEW)),
			(StepId::AwaitProcessing, Locator::text("Next").with_class(BUTTON)),
			(StepId::Advance, Locator::text("Next").with_class(BUTTON)),
			(StepId::SetCaption, Locator::input_hint("Caption your Short").with_class(EDIT_TEXT)),
			(StepId::OpenPoll, Locator::text("Poll").with_class(TEXT_VIEW)),
			(StepId::SetPollQuestion, Locator::input_hint("Ask a question...").with_class(EDIT_TEXT)),
			(StepId::SetPollOption1, Locator::input_hint("Option 1").with_class(EDIT_TEXT)),
			(StepId::SetPollOption2, Locator::input_hint("Option 2").with_class(EDIT_TEXT)),
			(StepId::OpenPollDuration, Locator::text("Poll duration").with_class(TEXT_VIEW)),
			(StepId::SelectPollDuration, Locator::text("{duration_label}").with_class(TEXT_VIEW)),
			(StepId::ConfirmPoll, Locator::text("Done").with_class(BUTTON)),
			(StepId::Submit, Locator::text("Upload").with_class(BUTTON)),
		]);

		let contains = |text: &str| Locator::text_contains(text).with_class(TEXT_VIEW);

		Self {
			version: UI_TABLE_VERSION,
			locators,
			success_markers: ["Your Short is live", "Your Short was uploaded", "Short uploaded", "Upload complete"]
				.into_iter()
				.map(contains)
				.collect(),
			progress_markers: ["Uploading", "Processing", "Creating"].into_iter().map(contains).collect(),
			result_buttons: ["View", "Watch", "Go to channel"]
				.into_iter()
				.map(|label| Locator::text(label).with_class(BUTTON))
				.collect(),
			result_url_marker: Locator::text_contains("youtube.com/shorts/"),
			duration_labels: BTreeMap::from([(1, "1 day".to_string()), (3, "3 days".to_string()), (7, "7 days".to_string())]),
			device_media_dir: "/sdcard/Download".to_string(),
			scroll: ScrollGesture::default(),
		}
	}

	/// Loads and validates a table from a JSON file.
	pub fn from_file(path: &Path) -> Result<Self> {
		let raw = std::fs::read_to_string(path).map_err(|err| Error::Config(format!("failed to read UI table {}: {err}", path.display())))?;
		let table: UiTable = serde_json::from_str(&raw).map_err(|err| Error::Config(format!("invalid UI table {}: {err}", path.display())))?;
		table.validate()?;
		Ok(table)
	}

	/// Checks that every element-bound step and settle target has a locator.
	pub fn validate(&self) -> Result<()> {
		for step in &UPLOAD_SCRIPT {
			if step.action.needs_element() || step.action == Action::Await {
				self.locator(step.id)?;
			}
			if let Settle::UntilPresent { target, .. } | Settle::UntilAbsent { target, .. } = step.settle {
				self.locator(target)?;
			}
		}
		if self.success_markers.is_empty() {
			return Err(Error::Config("UI table has no success markers".into()));
		}
		for duration in PollDuration::ALL {
			self.duration_label(duration)?;
		}
		Ok(())
	}

	pub fn locator(&self, step: StepId) -> Result<&Locator> {
		self.locators
			.get(&step)
			.ok_or_else(|| Error::Config(format!("UI table has no locator for step `{step}`")))
	}

	pub fn duration_label(&self, duration: PollDuration) -> Result<&str> {
		self.duration_labels
			.get(&duration.days())
			.map(String::as_str)
			.ok_or_else(|| Error::Config(format!("UI table has no label for a {}-day poll", duration.days())))
	}

	/// Device path the local file named `file_name` is pushed to.
	pub fn device_path(&self, file_name: &str) -> String {
		format!("{}/{}", self.device_media_dir.trim_end_matches('/'), file_name)
	}
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use super::*;

	#[test]
	fn builtin_table_is_complete() {
		UiTable::builtin().validate().unwrap();
	}

	#[test]
	fn table_round_trips_through_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		let json = serde_json::to_string_pretty(&UiTable::builtin()).unwrap();
		file.write_all(json.as_bytes()).unwrap();

		let loaded = UiTable::from_file(file.path()).unwrap();
		assert_eq!(loaded, UiTable::builtin());
	}

	#[test]
	fn missing_locator_is_a_config_error() {
		let mut table = UiTable::builtin();
		table.locators.remove(&StepId::Submit);
		let err = table.validate().unwrap_err();
		assert!(err.to_string().contains("submit"), "{err}");
	}

	#[test]
	fn processing_wait_needs_its_own_locator() {
		let mut table = UiTable::builtin();
		table.locators.remove(&StepId::AwaitProcessing);

		let err = table.validate().unwrap_err();
		assert!(err.to_string().contains("await-processing"), "{err}");
	}

	#[test]
	fn device_path_joins_media_dir() {
		let mut table = UiTable::builtin();
		assert_eq!(table.device_path("clip.mp4"), "/sdcard/Download/clip.mp4");
		table.device_media_dir = "/sdcard/Movies/".into();
		assert_eq!(table.device_path("clip.mp4"), "/sdcard/Movies/clip.mp4");
	}

	#[test]
	fn json_keys_use_step_ids() {
		let json = serde_json::to_value(UiTable::builtin()).unwrap();
		assert_eq!(json["locators"]["open-create"]["strategy"], "content-description");
		assert_eq!(json["durationLabels"]["3"], "3 days");
	}
}
