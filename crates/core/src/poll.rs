//! Poll input, validation, and story-derived options.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result, ValidationError};

/// Question attached to story-derived polls.
pub const STORY_QUESTION: &str = "What happens next?";

/// Options used when a story has fewer than two choices.
pub const FALLBACK_OPTIONS: [&str; 2] = ["Option A", "Option B"];

/// Poll lengths the app offers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PollDuration {
	OneDay,
	ThreeDays,
	#[default]
	SevenDays,
}

impl PollDuration {
	pub const ALL: [PollDuration; 3] = [PollDuration::OneDay, PollDuration::ThreeDays, PollDuration::SevenDays];

	pub fn from_days(days: u32) -> Option<Self> {
		match days {
			1 => Some(PollDuration::OneDay),
			3 => Some(PollDuration::ThreeDays),
			7 => Some(PollDuration::SevenDays),
			_ => None,
		}
	}

	pub fn days(self) -> u32 {
		match self {
			PollDuration::OneDay => 1,
			PollDuration::ThreeDays => 3,
			PollDuration::SevenDays => 7,
		}
	}
}

impl TryFrom<u32> for PollDuration {
	type Error = String;

	fn try_from(days: u32) -> std::result::Result<Self, Self::Error> {
		PollDuration::from_days(days).ok_or_else(|| format!("unsupported poll duration {days}; expected 1, 3, or 7"))
	}
}

impl From<PollDuration> for u32 {
	fn from(duration: PollDuration) -> Self {
		duration.days()
	}
}

/// Caller-supplied poll, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollOptions {
	pub options: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub question: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub duration_days: Option<u32>,
}

impl PollOptions {
	pub fn new<I, S>(options: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			options: options.into_iter().map(Into::into).collect(),
			question: None,
			duration_days: None,
		}
	}

	pub fn with_question(mut self, question: impl Into<String>) -> Self {
		self.question = Some(question.into());
		self
	}

	pub fn with_duration_days(mut self, days: u32) -> Self {
		self.duration_days = Some(days);
		self
	}
}

/// A validated two-option poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSpec {
	options: [String; 2],
	question: Option<String>,
	duration: PollDuration,
	warnings: Vec<String>,
}

impl PollSpec {
	/// Validates `input`, truncating extra options and replacing an
	/// unsupported duration with `default_duration`. Both adjustments are
	/// recorded in [`warnings`](Self::warnings).
	pub fn new(input: &PollOptions, default_duration: PollDuration) -> std::result::Result<Self, ValidationError> {
		let mut warnings = Vec::new();

		let (first, second) = match input.options.as_slice() {
			[first, second, rest @ ..] => {
				if !rest.is_empty() {
					warnings.push(format!("poll supports 2 options; ignoring {} extra", rest.len()));
				}
				(first.clone(), second.clone())
			}
			other => return Err(ValidationError::NotEnoughPollOptions { count: other.len() }),
		};

		let duration = match input.duration_days {
			None => default_duration,
			Some(days) => PollDuration::from_days(days).unwrap_or_else(|| {
				warnings.push(format!("unsupported poll duration of {days} days; using {} days", default_duration.days()));
				default_duration
			}),
		};

		let question = input.question.as_deref().map(str::trim).filter(|q| !q.is_empty()).map(str::to_string);

		for warning in &warnings {
			warn!(target = "shorts.upload", "{warning}");
		}

		Ok(Self {
			options: [first, second],
			question,
			duration,
			warnings,
		})
	}

	pub fn options(&self) -> &[String; 2] {
		&self.options
	}

	pub fn question(&self) -> Option<&str> {
		self.question.as_deref()
	}

	pub fn duration(&self) -> PollDuration {
		self.duration
	}

	pub fn warnings(&self) -> &[String] {
		&self.warnings
	}
}

/// The part of a generated story the publisher consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StoryChoices {
	#[serde(default)]
	pub choices: Vec<String>,
}

impl StoryChoices {
	pub fn from_file(path: &Path) -> Result<Self> {
		let raw = std::fs::read_to_string(path).map_err(|err| Error::Config(format!("failed to read story {}: {err}", path.display())))?;
		serde_json::from_str(&raw).map_err(|err| Error::Config(format!("invalid story {}: {err}", path.display())))
	}

	/// First two choices as poll options under [`STORY_QUESTION`].
	pub fn poll_options(&self) -> PollOptions {
		let options = match self.choices.as_slice() {
			[first, second, ..] => vec![first.clone(), second.clone()],
			_ => {
				warn!(target = "shorts.upload", choices = self.choices.len(), "story has fewer than 2 choices; using default poll options");
				FALLBACK_OPTIONS.iter().map(|s| s.to_string()).collect()
			}
		};
		PollOptions {
			options,
			question: Some(STORY_QUESTION.to_string()),
			duration_days: None,
		}
	}
}
