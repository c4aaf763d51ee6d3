use thiserror::Error;

/// Failures while bringing the automation server up or down.
#[derive(Debug, Error)]
pub enum ServerError {
	#[error("automation server executable `{0}` not found; install Appium or set launch.program")]
	ProgramNotFound(String),

	#[error("failed to spawn automation server `{program}`: {source}")]
	Spawn {
		program: String,
		#[source]
		source: std::io::Error,
	},

	#[error("automation server exited before it was ready ({status})")]
	ExitedBeforeReady { status: String },

	#[error("automation server on {host}:{port} did not become ready within {waited_ms}ms")]
	NotReady { host: String, port: u16, waited_ms: u64 },

	#[error("automation server I/O error: {0}")]
	Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
