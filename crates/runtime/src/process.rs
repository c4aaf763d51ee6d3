//! Process and port helpers used by the server launcher.

use std::path::PathBuf;

use tracing::debug;

/// Asks `pid` to exit cleanly (SIGTERM). Returns `false` if the signal was not delivered.
///
/// Non-unix platforms have no graceful signal; callers fall through to a hard kill.
pub fn request_termination(pid: u32) -> bool {
	#[cfg(unix)]
	{
		match std::process::Command::new("kill").args(["-TERM", &pid.to_string()]).status() {
			Ok(status) if status.success() => true,
			Ok(_) => {
				debug!(target = "shorts.server", pid, "kill -TERM returned non-zero");
				false
			}
			Err(err) => {
				debug!(target = "shorts.server", pid, error = %err, "failed to run kill");
				false
			}
		}
	}

	#[cfg(not(unix))]
	{
		debug!(target = "shorts.server", pid, "graceful termination unsupported on this platform");
		false
	}
}

/// Returns `true` when `port` can be bound on localhost.
pub fn port_available(port: u16) -> bool {
	std::net::TcpListener::bind(("127.0.0.1", port)).is_ok()
}

/// Default server executable: the project-local install, else whatever `appium` is on `PATH`.
pub fn find_server_executable() -> Option<PathBuf> {
	let local = PathBuf::from("node_modules").join(".bin").join("appium");
	if local.exists() {
		return Some(local);
	}
	which::which("appium").ok()
}
