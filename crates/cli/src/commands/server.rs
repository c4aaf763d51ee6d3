use shorts::PublisherConfig;
use shorts_runtime::{ServerControl, ServerEndpoint, ServerLifecycleManager, probe};
use tracing::{info, warn};

use crate::error::Result;
use crate::output::{OutputFormat, ResultBuilder, ServerStatusData, print_result};

pub async fn status(config: &PublisherConfig) -> Result<ServerStatusData> {
	let server = &config.server;
	let endpoint = probe::detect(server).await.map(|api_base| ServerEndpoint::new(server, api_base, false));

	Ok(ServerStatusData {
		running: endpoint.is_some(),
		host: server.host.clone(),
		port: server.port,
		base_url: endpoint.map(|endpoint| endpoint.base_url),
		owned: None,
	})
}

/// Brings the server up, reports it, and holds it until Ctrl-C.
///
/// Prints one envelope once the server answers and a second one after shutdown.
pub async fn run(config: &PublisherConfig, format: OutputFormat) -> Result<ServerStatusData> {
	let manager = ServerLifecycleManager::shared(config.launch.clone());
	let endpoint = manager.ensure_running(&config.server).await?;

	let ready = ServerStatusData {
		running: true,
		host: config.server.host.clone(),
		port: config.server.port,
		base_url: Some(endpoint.base_url.clone()),
		owned: Some(endpoint.owned),
	};
	print_result(&ResultBuilder::new("server run").data(ready).build(), format);
	info!(target = "shorts.server", base_url = %endpoint.base_url, "automation server ready; press Ctrl-C to stop");

	if let Err(err) = tokio::signal::ctrl_c().await {
		warn!(target = "shorts.server", error = %err, "failed to listen for Ctrl-C; stopping now");
	}

	manager.stop().await?;
	Ok(ServerStatusData {
		running: manager.is_running(&config.server).await,
		host: config.server.host.clone(),
		port: config.server.port,
		base_url: None,
		owned: Some(endpoint.owned),
	})
}
