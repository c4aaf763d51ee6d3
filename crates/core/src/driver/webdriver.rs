//! HTTP client for W3C WebDriver plus Appium's device endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use shorts_protocol::{ActivateApp, Actions, ElementRef, FindElement, NewSession, PushFile, SendKeys, SessionCapabilities, Timeouts, WireError};
use shorts_runtime::ServerEndpoint;
use tracing::{debug, trace};

use super::{Connector, Driver};
use crate::error::{Error, Result};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound for one command; session creation may boot an emulator.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(300);

/// Talks to one automation server over HTTP.
#[derive(Debug, Clone)]
pub struct WebDriverClient {
	http: reqwest::Client,
	base_url: String,
}

impl WebDriverClient {
	pub fn new(endpoint: &ServerEndpoint) -> Result<Self> {
		let http = reqwest::Client::builder()
			.connect_timeout(CONNECT_TIMEOUT)
			.timeout(COMMAND_TIMEOUT)
			.build()
			.map_err(|err| Error::driver("connect", err.to_string()))?;
		Ok(Self {
			http,
			base_url: endpoint.base_url.trim_end_matches('/').to_string(),
		})
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	/// Sends a request and returns the HTTP status with the decoded body.
	async fn send(&self, command: &str, method: Method, path: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
		let url = format!("{}{}", self.base_url, path);
		trace!(target = "shorts.session", command, %method, %url, "driver request");

		let mut request = self.http.request(method, &url);
		if let Some(body) = body {
			request = request.json(&body);
		}

		let response = request.send().await.map_err(|err| Error::driver(command, err.to_string()))?;
		let status = response.status();
		let text = response.text().await.map_err(|err| Error::driver(command, err.to_string()))?;
		let payload = if text.trim().is_empty() {
			Value::Null
		} else {
			serde_json::from_str(&text).map_err(|err| Error::driver(command, format!("HTTP {status}: unreadable body: {err}")))?
		};
		Ok((status, payload))
	}

	/// Runs a command, separating W3C errors from transport failures.
	async fn execute(&self, command: &str, method: Method, path: &str, body: Option<Value>) -> Result<std::result::Result<Value, WireError>> {
		let (status, mut payload) = self.send(command, method, path, body).await?;
		let value = payload.get_mut("value").map(Value::take).unwrap_or(Value::Null);

		if status.is_success() {
			return Ok(Ok(value));
		}

		match serde_json::from_value::<WireError>(value) {
			Ok(wire) => {
				debug!(target = "shorts.session", command, error = %wire.error, "driver command rejected");
				Ok(Err(wire))
			}
			Err(_) => Err(Error::driver(command, format!("HTTP {status}"))),
		}
	}

	async fn command<T: DeserializeOwned>(&self, command: &str, method: Method, path: &str, body: Option<Value>) -> Result<T> {
		match self.execute(command, method, path, body).await? {
			Ok(value) => serde_json::from_value(value).map_err(|err| Error::driver(command, format!("unexpected response: {err}"))),
			Err(wire) => Err(Error::driver(command, format!("{}: {}", wire.error, wire.message))),
		}
	}

	async fn command_unit(&self, command: &str, path: &str, body: Value) -> Result<()> {
		self.command::<Value>(command, Method::POST, path, Some(body)).await.map(drop)
	}
}

fn to_body<T: serde::Serialize>(command: &str, body: &T) -> Result<Value> {
	serde_json::to_value(body).map_err(|err| Error::driver(command, err.to_string()))
}

#[async_trait]
impl Driver for WebDriverClient {
	async fn create_session(&self, capabilities: &SessionCapabilities) -> Result<String> {
		let (status, payload) = self
			.send("new session", Method::POST, "/session", Some(capabilities.new_session_payload()))
			.await
			.map_err(|err| Error::SessionInit(err.to_string()))?;

		if !status.is_success() {
			let reason = payload
				.get("value")
				.and_then(|value| serde_json::from_value::<WireError>(value.clone()).ok())
				.map(|wire| format!("{}: {}", wire.error, wire.message))
				.unwrap_or_else(|| format!("HTTP {status}"));
			return Err(Error::SessionInit(reason));
		}

		// W3C servers nest the id under `value`; JSONWP servers put it at the top level.
		if let Some(session) = payload.get("value").and_then(|value| serde_json::from_value::<NewSession>(value.clone()).ok()) {
			return Ok(session.session_id);
		}
		payload
			.get("sessionId")
			.and_then(Value::as_str)
			.map(str::to_string)
			.ok_or_else(|| Error::SessionInit("response carried no session id".into()))
	}

	async fn delete_session(&self, session: &str) -> Result<()> {
		self.command::<Value>("delete session", Method::DELETE, &format!("/session/{session}"), None)
			.await
			.map(drop)
	}

	async fn set_timeouts(&self, session: &str, timeouts: Timeouts) -> Result<()> {
		let body = to_body("set timeouts", &timeouts)?;
		self.command_unit("set timeouts", &format!("/session/{session}/timeouts"), body).await
	}

	async fn find_element(&self, session: &str, query: &FindElement) -> Result<Option<ElementRef>> {
		let body = to_body("find element", query)?;
		match self.execute("find element", Method::POST, &format!("/session/{session}/element"), Some(body)).await? {
			Ok(value) => serde_json::from_value(value)
				.map(Some)
				.map_err(|err| Error::driver("find element", format!("unexpected response: {err}"))),
			Err(wire) if wire.is_no_such_element() => Ok(None),
			Err(wire) => Err(Error::driver("find element", format!("{}: {}", wire.error, wire.message))),
		}
	}

	async fn click(&self, session: &str, element: &ElementRef) -> Result<()> {
		self.command_unit("click", &format!("/session/{session}/element/{}/click", element.id), json!({}))
			.await
	}

	async fn clear(&self, session: &str, element: &ElementRef) -> Result<()> {
		self.command_unit("clear", &format!("/session/{session}/element/{}/clear", element.id), json!({}))
			.await
	}

	async fn send_keys(&self, session: &str, element: &ElementRef, text: &str) -> Result<()> {
		let body = to_body("send keys", &SendKeys { text: text.to_string() })?;
		self.command_unit("send keys", &format!("/session/{session}/element/{}/value", element.id), body)
			.await
	}

	async fn element_text(&self, session: &str, element: &ElementRef) -> Result<String> {
		self.command("element text", Method::GET, &format!("/session/{session}/element/{}/text", element.id), None)
			.await
	}

	async fn perform_actions(&self, session: &str, actions: &Actions) -> Result<()> {
		let body = to_body("perform actions", actions)?;
		self.command_unit("perform actions", &format!("/session/{session}/actions"), body).await
	}

	async fn push_file(&self, session: &str, request: &PushFile) -> Result<()> {
		let body = to_body("push file", request)?;
		self.command_unit("push file", &format!("/session/{session}/appium/device/push_file"), body)
			.await
	}

	async fn activate_app(&self, session: &str, app_id: &str) -> Result<()> {
		let body = to_body("activate app", &ActivateApp { app_id: app_id.to_string() })?;
		self.command_unit("activate app", &format!("/session/{session}/appium/device/activate_app"), body)
			.await
	}
}

/// Connects [`WebDriverClient`]s to whatever endpoint the server manager reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpConnector;

impl Connector for HttpConnector {
	type Driver = WebDriverClient;

	fn connect(&self, endpoint: &ServerEndpoint) -> Result<WebDriverClient> {
		WebDriverClient::new(endpoint)
	}
}
