//! Server process spawn and shutdown.

use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::config::{LaunchOptions, ServerConfig};
use crate::error::{Result, ServerError};
use crate::probe::{self, ApiBase};
use crate::process;

const READINESS_POLL: Duration = Duration::from_millis(100);

/// A server child this process spawned.
#[derive(Debug)]
pub(crate) struct ServerProcess {
	child: Child,
	pid: Option<u32>,
}

impl ServerProcess {
	pub(crate) fn pid(&self) -> Option<u32> {
		self.pid
	}

	pub(crate) fn has_exited(&mut self) -> bool {
		!matches!(self.child.try_wait(), Ok(None))
	}
}

/// Spawns the server and waits for it to report readiness.
///
/// Readiness is the marker line on stdout; when it has not appeared within the
/// startup grace window the status endpoint is probed once more before giving up.
pub(crate) async fn launch(config: &ServerConfig, options: &LaunchOptions) -> Result<(ServerProcess, ApiBase)> {
	let program = match &options.program {
		Some(program) => program.clone(),
		None => process::find_server_executable().ok_or_else(|| ServerError::ProgramNotFound("appium".to_string()))?,
	};

	let mut args = options.launcher_args.clone();
	args.extend(config.server_args());

	info!(
		target = "shorts.server",
		program = %program.display(),
		host = %config.host,
		port = config.port,
		"starting automation server"
	);

	let mut cmd = Command::new(&program);
	cmd.args(&args)
		.stdin(Stdio::null())
		.stdout(Stdio::piped())
		.stderr(Stdio::piped())
		.kill_on_drop(true);

	let mut child = cmd.spawn().map_err(|source| ServerError::Spawn {
		program: program.display().to_string(),
		source,
	})?;
	let pid = child.id();

	let ready = Arc::new(AtomicBool::new(false));
	if let Some(stdout) = child.stdout.take() {
		tokio::spawn(watch_stdout(stdout, options.readiness_marker.clone(), Arc::clone(&ready), config.show_logs));
	}
	if let Some(stderr) = child.stderr.take() {
		tokio::spawn(forward_stderr(stderr, config.show_logs));
	}

	let deadline = Instant::now() + options.startup_grace();
	loop {
		if ready.load(Ordering::Acquire) {
			let api_base = probe::detect(config).await.unwrap_or_default();
			info!(target = "shorts.server", pid = ?pid, api_base = ?api_base, "automation server ready");
			return Ok((ServerProcess { child, pid }, api_base));
		}

		if let Some(status) = child.try_wait()? {
			warn!(target = "shorts.server", %status, "automation server exited before it was ready");
			return Err(ServerError::ExitedBeforeReady { status: status.to_string() });
		}

		if Instant::now() >= deadline {
			break;
		}
		tokio::time::sleep(READINESS_POLL).await;
	}

	debug!(target = "shorts.server", "no readiness line within grace window; probing status endpoint");
	if let Some(api_base) = probe::detect(config).await {
		info!(target = "shorts.server", pid = ?pid, api_base = ?api_base, "automation server answering status probe");
		return Ok((ServerProcess { child, pid }, api_base));
	}

	if let Err(err) = child.kill().await {
		debug!(target = "shorts.server", error = %err, "failed to kill unready server");
	}
	Err(ServerError::NotReady {
		host: config.host.clone(),
		port: config.port,
		waited_ms: options.startup_grace_ms,
	})
}

/// Requests a graceful exit, then kills the process if it outlives `grace`.
pub(crate) async fn terminate(mut server: ServerProcess, grace: Duration) -> Result<()> {
	if let Some(status) = server.child.try_wait()? {
		debug!(target = "shorts.server", %status, "automation server already exited");
		return Ok(());
	}

	let signalled = server.pid.is_some_and(process::request_termination);
	if signalled {
		match tokio::time::timeout(grace, server.child.wait()).await {
			Ok(Ok(status)) => {
				info!(target = "shorts.server", %status, "automation server stopped");
				return Ok(());
			}
			Ok(Err(err)) => warn!(target = "shorts.server", error = %err, "failed waiting for automation server"),
			Err(_) => warn!(target = "shorts.server", grace_ms = grace.as_millis() as u64, "automation server ignored termination; forcing"),
		}
	}

	server.child.kill().await?;
	info!(target = "shorts.server", "automation server force stopped");
	Ok(())
}

async fn watch_stdout(stdout: ChildStdout, marker: String, ready: Arc<AtomicBool>, show_logs: bool) {
	let mut lines = BufReader::new(stdout).lines();
	while let Ok(Some(line)) = lines.next_line().await {
		if show_logs {
			info!(target = "shorts.server.stdout", "{line}");
		} else {
			trace!(target = "shorts.server.stdout", "{line}");
		}

		if !ready.load(Ordering::Relaxed) && line.contains(&marker) {
			ready.store(true, Ordering::Release);
		}
	}
}

async fn forward_stderr(stderr: ChildStderr, show_logs: bool) {
	let mut lines = BufReader::new(stderr).lines();
	while let Ok(Some(line)) = lines.next_line().await {
		if show_logs {
			warn!(target = "shorts.server.stderr", "{line}");
		} else {
			trace!(target = "shorts.server.stderr", "{line}");
		}
	}
}
