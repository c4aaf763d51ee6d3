//! Best-effort reference to the published Short.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::driver::Driver;
use crate::locator::Locator;
use crate::script::UiTable;
use crate::session::AutomationSession;

const PLACEHOLDER_BASE: &str = "https://youtube.com/shorts/";

/// How an [`UploadResult`] URL was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedVia {
	/// Read off the screen.
	Observed,
	/// Synthesized; the Short has to be found on the channel.
	Placeholder,
}

/// Reference to a published Short.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
	pub url: String,
	pub resolved_via: ResolvedVia,
}

/// Looks for a way to the published Short once the upload is done.
#[derive(Debug, Clone)]
pub struct ResultResolver {
	buttons: Vec<Locator>,
	url_marker: Locator,
	settle: Duration,
	navigate: Duration,
}

impl ResultResolver {
	/// `settle` is waited before looking for buttons; `navigate` after tapping one.
	pub fn new(table: &UiTable, settle: Duration, navigate: Duration) -> Self {
		Self {
			buttons: table.result_buttons.clone(),
			url_marker: table.result_url_marker.clone(),
			settle,
			navigate,
		}
	}

	/// Never fails; falls back to a placeholder URL.
	pub async fn resolve<D: Driver>(&self, session: &AutomationSession<D>) -> UploadResult {
		tokio::time::sleep(self.settle).await;

		let tapped = self.tap_result_button(session).await;
		if tapped {
			tokio::time::sleep(self.navigate).await;
		}

		if let Some(url) = self.observed_url(session).await {
			info!(target = "shorts.result", %url, "found published Short URL");
			return UploadResult {
				url,
				resolved_via: ResolvedVia::Observed,
			};
		}

		let url = placeholder_url(if tapped { "choicestream" } else { "unknown" });
		warn!(target = "shorts.result", %url, "published URL not visible; returning placeholder");
		UploadResult {
			url,
			resolved_via: ResolvedVia::Placeholder,
		}
	}

	async fn tap_result_button<D: Driver>(&self, session: &AutomationSession<D>) -> bool {
		for button in &self.buttons {
			let element = match session.find(button).await {
				Ok(element) => element,
				Err(err) => {
					debug!(target = "shorts.result", %button, error = %err, "result button not available");
					continue;
				}
			};
			match session.tap(&element).await {
				Ok(()) => {
					info!(target = "shorts.result", %button, "opened published Short");
					return true;
				}
				Err(err) => debug!(target = "shorts.result", %button, error = %err, "failed to tap result button"),
			}
		}
		false
	}

	async fn observed_url<D: Driver>(&self, session: &AutomationSession<D>) -> Option<String> {
		let element = session.find(&self.url_marker).await.ok()?;
		let text = match session.text(&element).await {
			Ok(text) => text,
			Err(err) => {
				debug!(target = "shorts.result", error = %err, "failed to read URL element");
				return None;
			}
		};
		extract_short_url(&text, &self.url_marker.value)
	}
}

/// Pulls the first token containing `marker` out of `text`, with a scheme.
fn extract_short_url(text: &str, marker: &str) -> Option<String> {
	let token = text.split_whitespace().find(|token| token.contains(marker))?;
	let start = token.find(marker)?;
	let id = token[start + marker.len()..]
		.split(|c: char| !c.is_ascii_alphanumeric() && c != '-' && c != '_')
		.next()
		.unwrap_or_default();
	if id.is_empty() {
		return None;
	}
	Some(format!("https://{marker}{id}"))
}

fn placeholder_url(tag: &str) -> String {
	let millis = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or_default();
	format!("{PLACEHOLDER_BASE}{tag}_{millis}")
}
