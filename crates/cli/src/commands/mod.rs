mod publish;
mod server;
mod ui_table;

use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use serde::Serialize;
use shorts::PublisherConfig;
use tracing::error;

use crate::cli::{Cli, Commands, ConfigOverrides, ServerAction};
use crate::error::{CliError, Result};
use crate::output::{EmptyResult, OutputFormat, ResultBuilder, print_result};

/// Run the parsed command, print its envelope, and return the process exit code.
pub async fn dispatch(cli: Cli) -> i32 {
	let started = Instant::now();
	let format = cli.format;
	let config = load_config(cli.config.as_deref(), &cli.overrides);

	match cli.command {
		Commands::Publish(args) => {
			let outcome = match config {
				Ok(config) => publish::execute(config, args).await,
				Err(err) => Err(err),
			};
			finish("publish", started, format, outcome)
		}
		Commands::Server { action } => {
			let (name, outcome) = match (action, config) {
				(ServerAction::Status, Ok(config)) => ("server status", server::status(&config).await),
				(ServerAction::Run, Ok(config)) => ("server run", server::run(&config, format).await),
				(ServerAction::Status, Err(err)) => ("server status", Err(err)),
				(ServerAction::Run, Err(err)) => ("server run", Err(err)),
			};
			finish(name, started, format, outcome)
		}
		Commands::UiTable { file } => {
			let outcome = config.and_then(|config| ui_table::execute(&config, file.as_deref()));
			finish("ui-table", started, format, outcome)
		}
	}
}

fn finish<T: Serialize>(command: &str, started: Instant, format: OutputFormat, outcome: Result<T>) -> i32 {
	match outcome {
		Ok(data) => {
			print_result(&ResultBuilder::new(command).started_at(started).data(data).build(), format);
			0
		}
		Err(err) => {
			error!(target = "shorts", command, error = %err, "command failed");
			let builder = ResultBuilder::new(command).started_at(started);
			let builder = match err.details() {
				Some(details) => builder.error_with_details(err.code(), err.to_string(), details),
				None => builder.error(err.code(), err.to_string()),
			};
			let result: EmptyResult = builder.build();
			print_result(&result, format);
			err.exit_code()
		}
	}
}

/// Config file (or defaults), then command line overrides.
pub fn load_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<PublisherConfig> {
	let mut config = match path {
		Some(path) => PublisherConfig::from_file(path)
			.with_context(|| format!("loading publisher config {}", path.display()))
			.map_err(CliError::Config)?,
		None => PublisherConfig::default(),
	};
	apply_overrides(&mut config, overrides);
	Ok(config)
}

fn apply_overrides(config: &mut PublisherConfig, overrides: &ConfigOverrides) {
	if let Some(host) = &overrides.host {
		config.server.host = host.clone();
	}
	if let Some(port) = overrides.port {
		config.server.port = port;
	}
	if overrides.show_server_logs {
		config.server.show_logs = true;
	}
	if overrides.keep_server {
		config.keep_server_running = true;
	}
	if let Some(table) = &overrides.ui_table {
		config.ui_table = Some(table.clone());
	}
}

#[cfg(test)]
mod tests {
	use std::path::PathBuf;

	use super::*;
	use crate::output::ErrorCode;

	#[test]
	fn flags_override_file_values() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("shorts.json");
		std::fs::write(&path, r#"{"server":{"host":"10.0.0.5","port":4800},"keepServerRunning":false}"#).unwrap();

		let overrides = ConfigOverrides {
			port: Some(4900),
			keep_server: true,
			ui_table: Some(PathBuf::from("/tmp/table.json")),
			..Default::default()
		};
		let config = load_config(Some(&path), &overrides).unwrap();

		assert_eq!(config.server.host, "10.0.0.5");
		assert_eq!(config.server.port, 4900);
		assert!(config.keep_server_running);
		assert!(!config.server.show_logs);
		assert_eq!(config.ui_table, Some(PathBuf::from("/tmp/table.json")));
	}

	#[test]
	fn missing_config_is_config_error() {
		let err = load_config(Some(Path::new("/no/such/shorts.json")), &ConfigOverrides::default()).unwrap_err();
		assert_eq!(err.code(), ErrorCode::ConfigError);
		assert!(err.to_string().contains("loading publisher config"), "{err}");
	}

	#[test]
	fn defaults_without_file() {
		let config = load_config(None, &ConfigOverrides::default()).unwrap();
		assert_eq!(config, PublisherConfig::default());
	}
}
