//! Process-wide automation server handle.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::{LaunchOptions, ServerConfig};
use crate::error::Result;
use crate::launcher::{self, ServerProcess};
use crate::probe::{self, ServerEndpoint};
use crate::process;

/// Where the managed server is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerPhase {
	Stopped,
	Starting,
	Running,
}

/// Seam between the publish flow and whatever keeps a server available.
#[async_trait]
pub trait ServerControl: Send + Sync {
	/// Returns a reachable endpoint, starting a server if none answers.
	async fn ensure_running(&self, config: &ServerConfig) -> Result<ServerEndpoint>;

	/// Stops an owned server. No-op when nothing was started.
	async fn stop(&self) -> Result<()>;

	/// Health probe without side effects.
	async fn is_running(&self, config: &ServerConfig) -> bool;
}

#[derive(Debug)]
struct Running {
	config: ServerConfig,
	endpoint: ServerEndpoint,
	/// `None` when the server was already answering and is not ours to stop.
	process: Option<ServerProcess>,
}

/// Starts, reuses, and stops the automation server.
///
/// Transitions are serialized by an async lock, so concurrent
/// [`ensure_running`](ServerControl::ensure_running) calls cannot both spawn.
#[derive(Debug)]
pub struct ServerLifecycleManager {
	options: LaunchOptions,
	phase: Mutex<ServerPhase>,
	slot: tokio::sync::Mutex<Option<Running>>,
	spawns: AtomicUsize,
}

static SHARED: OnceLock<Arc<ServerLifecycleManager>> = OnceLock::new();

impl ServerLifecycleManager {
	pub fn new(options: LaunchOptions) -> Self {
		Self {
			options,
			phase: Mutex::new(ServerPhase::Stopped),
			slot: tokio::sync::Mutex::new(None),
			spawns: AtomicUsize::new(0),
		}
	}

	/// Process-wide handle. The first caller's launch options win.
	pub fn shared(options: LaunchOptions) -> Arc<Self> {
		Arc::clone(SHARED.get_or_init(|| Arc::new(Self::new(options))))
	}

	pub fn options(&self) -> &LaunchOptions {
		&self.options
	}

	pub fn phase(&self) -> ServerPhase {
		*self.phase.lock()
	}

	/// Number of server processes this manager has spawned.
	pub fn spawn_count(&self) -> usize {
		self.spawns.load(Ordering::SeqCst)
	}

	/// PID of the owned server process, if any.
	pub async fn pid(&self) -> Option<u32> {
		let slot = self.slot.lock().await;
		slot.as_ref().and_then(|running| running.process.as_ref()).and_then(ServerProcess::pid)
	}

	fn set_phase(&self, phase: ServerPhase) {
		*self.phase.lock() = phase;
	}

	async fn release(&self, previous: Running) {
		if let Some(process) = previous.process {
			if let Err(err) = launcher::terminate(process, self.options.shutdown_grace()).await {
				warn!(target = "shorts.server", error = %err, "failed to stop previous automation server");
			}
		}
	}
}

#[async_trait]
impl ServerControl for ServerLifecycleManager {
	async fn ensure_running(&self, config: &ServerConfig) -> Result<ServerEndpoint> {
		let mut slot = self.slot.lock().await;

		if let Some(running) = slot.as_mut() {
			if running.config == *config {
				let owned_alive = running.process.as_mut().map(|process| !process.has_exited());
				match owned_alive {
					Some(true) => {
						debug!(target = "shorts.server", "reusing owned automation server");
						return Ok(running.endpoint.clone());
					}
					Some(false) => warn!(target = "shorts.server", "owned automation server exited; relaunching"),
					None => {
						if probe::is_running(config).await {
							debug!(target = "shorts.server", "external automation server still answering");
							return Ok(running.endpoint.clone());
						}
						debug!(target = "shorts.server", "external automation server went away");
					}
				}
			} else {
				info!(target = "shorts.server", "server settings changed; replacing current server");
			}
		}

		if let Some(previous) = slot.take() {
			self.release(previous).await;
		}

		self.set_phase(ServerPhase::Starting);

		if let Some(api_base) = probe::detect(config).await {
			let endpoint = ServerEndpoint::new(config, api_base, false);
			info!(target = "shorts.server", url = %endpoint.base_url, "automation server already running");
			*slot = Some(Running {
				config: config.clone(),
				endpoint: endpoint.clone(),
				process: None,
			});
			self.set_phase(ServerPhase::Running);
			return Ok(endpoint);
		}

		if config.is_loopback() && !process::port_available(config.port) {
			warn!(target = "shorts.server", port = config.port, "port is bound but no status endpoint answers");
		}

		self.spawns.fetch_add(1, Ordering::SeqCst);
		match launcher::launch(config, &self.options).await {
			Ok((process, api_base)) => {
				let endpoint = ServerEndpoint::new(config, api_base, true);
				*slot = Some(Running {
					config: config.clone(),
					endpoint: endpoint.clone(),
					process: Some(process),
				});
				self.set_phase(ServerPhase::Running);
				Ok(endpoint)
			}
			Err(err) => {
				self.set_phase(ServerPhase::Stopped);
				Err(err)
			}
		}
	}

	async fn stop(&self) -> Result<()> {
		let mut slot = self.slot.lock().await;
		let previous = slot.take();
		self.set_phase(ServerPhase::Stopped);

		match previous {
			Some(Running { process: Some(process), .. }) => {
				info!(target = "shorts.server", pid = ?process.pid(), "stopping automation server");
				launcher::terminate(process, self.options.shutdown_grace()).await
			}
			Some(_) => {
				debug!(target = "shorts.server", "automation server not owned; leaving it running");
				Ok(())
			}
			None => {
				debug!(target = "shorts.server", "no automation server to stop");
				Ok(())
			}
		}
	}

	async fn is_running(&self, config: &ServerConfig) -> bool {
		probe::is_running(config).await
	}
}
