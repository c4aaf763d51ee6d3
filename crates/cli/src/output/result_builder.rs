use std::fmt::Write as _;
use std::time::Instant;

use serde::Serialize;

use crate::output::format::OutputFormat;
use crate::output::model::{CommandError, CommandResult, ErrorCode, SCHEMA_VERSION};

/// Builder for constructing command results.
pub struct ResultBuilder<T: Serialize> {
	command: String,
	data: Option<T>,
	error: Option<CommandError>,
	start_time: Instant,
	duration_ms: Option<u64>,
}

impl<T: Serialize> ResultBuilder<T> {
	pub fn new(command: impl Into<String>) -> Self {
		Self {
			command: command.into(),
			data: None,
			error: None,
			start_time: Instant::now(),
			duration_ms: None,
		}
	}

	/// Start timing from an earlier instant, e.g. before config loading.
	pub fn started_at(mut self, start: Instant) -> Self {
		self.start_time = start;
		self
	}

	pub fn data(mut self, data: T) -> Self {
		self.data = Some(data);
		self
	}

	pub fn error(mut self, code: ErrorCode, message: impl Into<String>) -> Self {
		self.error = Some(CommandError {
			code,
			message: message.into(),
			details: None,
		});
		self
	}

	pub fn error_with_details(mut self, code: ErrorCode, message: impl Into<String>, details: serde_json::Value) -> Self {
		self.error = Some(CommandError {
			code,
			message: message.into(),
			details: Some(details),
		});
		self
	}

	pub fn duration_ms(mut self, duration_ms: u64) -> Self {
		self.duration_ms = Some(duration_ms);
		self
	}

	pub fn build(self) -> CommandResult<T> {
		let ok = self.error.is_none() && self.data.is_some();
		let duration_ms = self.duration_ms.unwrap_or_else(|| self.start_time.elapsed().as_millis() as u64);

		CommandResult {
			schema_version: SCHEMA_VERSION,
			ok,
			command: self.command,
			data: self.data,
			error: self.error,
			duration_ms,
		}
	}
}

/// Print a command result to stdout in the specified format.
pub fn print_result<T: Serialize>(result: &CommandResult<T>, format: OutputFormat) {
	let rendered = render_result(result, format);
	if !rendered.is_empty() {
		println!("{rendered}");
	}
}

pub(crate) fn render_result<T: Serialize>(result: &CommandResult<T>, format: OutputFormat) -> String {
	match format {
		OutputFormat::Json => serde_json::to_string_pretty(result).unwrap_or_default(),
		OutputFormat::Text => render_text(result),
	}
}

fn render_text<T: Serialize>(result: &CommandResult<T>) -> String {
	let mut out = String::new();

	if result.ok {
		if let Some(data) = result.data.as_ref().and_then(|data| serde_json::to_value(data).ok()) {
			render_value(&mut out, &data);
		}
	} else if let Some(ref error) = result.error {
		let _ = writeln!(out, "Error [{}]: {}", error.code, error.message);
		if let Some(ref details) = error.details {
			if let Ok(json) = serde_json::to_string_pretty(details) {
				let _ = writeln!(out, "Details: {json}");
			}
		}
	}

	let _ = write!(out, "Completed in {}ms", result.duration_ms);
	out
}

/// Flat objects print as `key: value` lines, anything else as pretty JSON.
fn render_value(out: &mut String, data: &serde_json::Value) {
	let Some(map) = data.as_object() else {
		let _ = writeln!(out, "{data}");
		return;
	};
	if map.values().any(|value| value.is_object()) {
		if let Ok(json) = serde_json::to_string_pretty(data) {
			let _ = writeln!(out, "{json}");
		}
		return;
	}
	for (key, value) in map {
		match value {
			serde_json::Value::String(text) => {
				let _ = writeln!(out, "{key}: {text}");
			}
			serde_json::Value::Array(items) if items.is_empty() => {}
			serde_json::Value::Array(items) => {
				let _ = writeln!(out, "{key}:");
				for item in items {
					match item.as_str() {
						Some(text) => {
							let _ = writeln!(out, "  - {text}");
						}
						None => {
							let _ = writeln!(out, "  - {item}");
						}
					}
				}
			}
			other => {
				let _ = writeln!(out, "{key}: {other}");
			}
		}
	}
}
