use std::path::PathBuf;

use shorts_runtime::ServerError;
use thiserror::Error;

use crate::script::StepId;

/// Bad caller input, detected before any UI interaction.
#[derive(Debug, Error)]
pub enum ValidationError {
	#[error("video file not found: {}", .0.display())]
	VideoNotFound(PathBuf),

	#[error("failed to read video file {}: {source}", .path.display())]
	VideoUnreadable {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("caption must not be empty")]
	EmptyCaption,

	#[error("a poll needs at least 2 options, got {count}")]
	NotEnoughPollOptions { count: usize },
}

/// Errors that can occur while publishing.
#[derive(Debug, Error)]
pub enum Error {
	#[error(transparent)]
	Validation(#[from] ValidationError),

	#[error(transparent)]
	Server(#[from] ServerError),

	#[error("failed to create automation session: {0}")]
	SessionInit(String),

	#[error("driver command `{command}` failed: {message}")]
	Driver { command: String, message: String },

	#[error("element not found: {locator}")]
	ElementNotFound { locator: String },

	#[error("upload not confirmed within {elapsed_ms}ms")]
	UploadTimeout { elapsed_ms: u64 },

	#[error("no automation session is open")]
	NoSession,

	#[error("step `{step}` failed: {source}")]
	Step {
		step: StepId,
		#[source]
		source: Box<Error>,
	},

	#[error("configuration error: {0}")]
	Config(String),
}

/// Coarse classification used for exit codes and error envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	Validation,
	ServerLifecycle,
	Session,
	ElementNotFound,
	UploadTimeout,
	Config,
}

impl Error {
	/// Kind of the originating error; step wrappers are looked through.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Error::Validation(_) => ErrorKind::Validation,
			Error::Server(_) => ErrorKind::ServerLifecycle,
			Error::SessionInit(_) | Error::Driver { .. } | Error::NoSession => ErrorKind::Session,
			Error::ElementNotFound { .. } => ErrorKind::ElementNotFound,
			Error::UploadTimeout { .. } => ErrorKind::UploadTimeout,
			Error::Step { source, .. } => source.kind(),
			Error::Config(_) => ErrorKind::Config,
		}
	}

	/// Step the failure happened in, if it came out of the upload script.
	pub fn step(&self) -> Option<StepId> {
		match self {
			Error::Step { step, .. } => Some(*step),
			_ => None,
		}
	}

	pub(crate) fn driver(command: &str, message: impl Into<String>) -> Self {
		Error::Driver {
			command: command.to_string(),
			message: message.into(),
		}
	}
}

pub type Result<T> = std::result::Result<T, Error>;
