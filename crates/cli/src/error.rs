use serde_json::json;
use shorts::{ErrorKind, ValidationError};
use shorts_runtime::ServerError;
use thiserror::Error;

use crate::output::ErrorCode;

/// Process exit code for an upload that never confirmed.
pub const EXIT_UPLOAD_TIMEOUT: i32 = 2;

#[derive(Debug, Error)]
pub enum CliError {
	#[error(transparent)]
	Publish(#[from] shorts::Error),

	#[error(transparent)]
	Server(#[from] ServerError),

	#[error("{0:#}")]
	Config(anyhow::Error),
}

impl From<ValidationError> for CliError {
	fn from(err: ValidationError) -> Self {
		CliError::Publish(err.into())
	}
}

impl CliError {
	pub fn code(&self) -> ErrorCode {
		match self {
			CliError::Publish(err) => match err.kind() {
				ErrorKind::Validation => ErrorCode::InvalidInput,
				ErrorKind::ServerLifecycle => ErrorCode::ServerLaunchFailed,
				ErrorKind::Session => ErrorCode::SessionError,
				ErrorKind::ElementNotFound => ErrorCode::ElementNotFound,
				ErrorKind::UploadTimeout => ErrorCode::UploadTimeout,
				ErrorKind::Config => ErrorCode::ConfigError,
			},
			CliError::Server(_) => ErrorCode::ServerLaunchFailed,
			CliError::Config(_) => ErrorCode::ConfigError,
		}
	}

	/// Extra machine-readable context for the error envelope.
	pub fn details(&self) -> Option<serde_json::Value> {
		match self {
			CliError::Publish(err) => err.step().map(|step| json!({ "step": step.as_str() })),
			_ => None,
		}
	}

	pub fn exit_code(&self) -> i32 {
		match self.code() {
			ErrorCode::UploadTimeout => EXIT_UPLOAD_TIMEOUT,
			_ => 1,
		}
	}
}

pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
	use std::path::PathBuf;

	use shorts::StepId;

	use super::*;

	#[test]
	fn step_failures_keep_inner_code_and_report_step() {
		let err = CliError::from(shorts::Error::Step {
			step: StepId::SetCaption,
			source: Box::new(shorts::Error::ElementNotFound {
				locator: "hint=\"Caption your Short\"".into(),
			}),
		});

		assert_eq!(err.code(), ErrorCode::ElementNotFound);
		assert_eq!(err.details(), Some(json!({ "step": "set-caption" })));
		assert_eq!(err.exit_code(), 1);
	}

	#[test]
	fn upload_timeout_has_its_own_exit_code() {
		let err = CliError::from(shorts::Error::UploadTimeout { elapsed_ms: 600_000 });
		assert_eq!(err.code(), ErrorCode::UploadTimeout);
		assert_eq!(err.exit_code(), EXIT_UPLOAD_TIMEOUT);
	}

	#[test]
	fn validation_maps_to_invalid_input() {
		let err = CliError::from(ValidationError::VideoNotFound(PathBuf::from("missing.mp4")));
		assert_eq!(err.code(), ErrorCode::InvalidInput);
		assert!(err.details().is_none());
	}

	#[test]
	fn server_errors_are_launch_failures() {
		let err = CliError::from(ServerError::ProgramNotFound("appium".into()));
		assert_eq!(err.code(), ErrorCode::ServerLaunchFailed);
	}
}
