//! Status endpoint probing.
//!
//! Appium 2 serves WebDriver from the root path, Appium 1 (and servers started
//! with `--base-path /wd/hub`) from `/wd/hub`. Both shapes are tried in order.

use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ServerConfig;

/// Per-request timeout for status probes.
pub const PROBE_TIMEOUT: Duration = Duration::from_millis(1000);

/// Path convention a server answers on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiBase {
	#[default]
	Root,
	Legacy,
}

impl ApiBase {
	/// Probe order: newer convention first.
	pub const ALL: [ApiBase; 2] = [ApiBase::Root, ApiBase::Legacy];

	pub fn path(self) -> &'static str {
		match self {
			ApiBase::Root => "",
			ApiBase::Legacy => "/wd/hub",
		}
	}
}

/// A confirmed, reachable server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerEndpoint {
	/// Origin plus API base path; session routes are appended to this.
	pub base_url: String,
	pub api_base: ApiBase,
	/// Whether this process spawned the server (and will stop it).
	pub owned: bool,
}

impl ServerEndpoint {
	pub fn new(config: &ServerConfig, api_base: ApiBase, owned: bool) -> Self {
		Self {
			base_url: format!("{}{}", config.origin(), api_base.path()),
			api_base,
			owned,
		}
	}
}

/// Returns the first path convention whose status endpoint answers 200.
///
/// Never fails: client, network, and timeout errors all mean "not running".
pub async fn detect(config: &ServerConfig) -> Option<ApiBase> {
	let client = match reqwest::Client::builder().timeout(PROBE_TIMEOUT).build() {
		Ok(client) => client,
		Err(err) => {
			debug!(target = "shorts.server", error = %err, "failed to build probe client");
			return None;
		}
	};

	for base in ApiBase::ALL {
		let url = format!("{}{}/status", config.origin(), base.path());
		match client.get(&url).send().await {
			Ok(response) if response.status() == StatusCode::OK => {
				debug!(target = "shorts.server", %url, "status endpoint answered");
				return Some(base);
			}
			Ok(response) => debug!(target = "shorts.server", %url, status = %response.status(), "unexpected status"),
			Err(err) => debug!(target = "shorts.server", %url, error = %err, "status probe failed"),
		}
	}

	None
}

/// Pure health check.
pub async fn is_running(config: &ServerConfig) -> bool {
	detect(config).await.is_some()
}
