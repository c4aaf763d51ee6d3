//! Locator descriptors and their translation into element queries.

use std::fmt;

use serde::{Deserialize, Serialize};
use shorts_protocol::{FindElement, Using};

/// How a [`Locator`] value is matched against the UI tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocatorStrategy {
	/// Exact visible text.
	Text,
	/// Visible text containing the value.
	TextContains,
	/// Accessibility label (`content-desc` on Android).
	ContentDescription,
	/// Input field whose hint, or current text, equals the value.
	InputHint,
}

/// A strategy plus a value template, optionally narrowed to a widget class.
///
/// Values may embed `{file_name}` and `{duration_label}`; see [`Locator::render`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Locator {
	pub strategy: LocatorStrategy,
	pub value: String,
	/// Widget class such as `android.widget.Button`. Ignored for content descriptions.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub class: Option<String>,
}

impl Locator {
	pub fn new(strategy: LocatorStrategy, value: impl Into<String>) -> Self {
		Self {
			strategy,
			value: value.into(),
			class: None,
		}
	}

	pub fn text(value: impl Into<String>) -> Self {
		Self::new(LocatorStrategy::Text, value)
	}

	pub fn text_contains(value: impl Into<String>) -> Self {
		Self::new(LocatorStrategy::TextContains, value)
	}

	pub fn content_description(value: impl Into<String>) -> Self {
		Self::new(LocatorStrategy::ContentDescription, value)
	}

	pub fn input_hint(value: impl Into<String>) -> Self {
		Self::new(LocatorStrategy::InputHint, value)
	}

	pub fn with_class(mut self, class: impl Into<String>) -> Self {
		self.class = Some(class.into());
		self
	}

	/// Substitutes runtime values into the value template.
	pub fn render(&self, vars: &TemplateVars) -> Locator {
		Locator {
			strategy: self.strategy,
			value: vars.apply(&self.value),
			class: self.class.clone(),
		}
	}

	/// Element query for the driver.
	pub fn to_query(&self) -> FindElement {
		let node = self.class.as_deref().unwrap_or("*");
		let literal = xpath_literal(&self.value);
		let (using, value) = match self.strategy {
			LocatorStrategy::Text => (Using::XPath, format!("//{node}[@text={literal}]")),
			LocatorStrategy::TextContains => (Using::XPath, format!("//{node}[contains(@text, {literal})]")),
			LocatorStrategy::ContentDescription => (Using::AccessibilityId, self.value.clone()),
			LocatorStrategy::InputHint => (Using::XPath, format!("//{node}[@hint={literal} or @text={literal}]")),
		};
		FindElement { using, value }
	}
}

impl fmt::Display for Locator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let key = match self.strategy {
			LocatorStrategy::Text => "text=",
			LocatorStrategy::TextContains => "text~=",
			LocatorStrategy::ContentDescription => "content-desc=",
			LocatorStrategy::InputHint => "hint=",
		};
		match (&self.class, self.strategy) {
			(Some(class), strategy) if strategy != LocatorStrategy::ContentDescription => write!(f, "{class}[{key}{:?}]", self.value),
			_ => write!(f, "{key}{:?}", self.value),
		}
	}
}

/// Runtime values available to locator templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateVars {
	pub file_name: String,
	pub duration_label: String,
}

impl TemplateVars {
	fn apply(&self, template: &str) -> String {
		template.replace("{file_name}", &self.file_name).replace("{duration_label}", &self.duration_label)
	}
}

/// Quotes `value` as an XPath 1.0 string literal.
///
/// XPath has no escape sequences, so a value holding both quote kinds is
/// assembled with `concat()`.
pub fn xpath_literal(value: &str) -> String {
	if !value.contains('"') {
		return format!("\"{value}\"");
	}
	if !value.contains('\'') {
		return format!("'{value}'");
	}

	let parts: Vec<String> = value.split('"').map(|part| format!("\"{part}\"")).collect();
	format!("concat({})", parts.join(", '\"', "))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn text_locators_become_xpath() {
		let query = Locator::text("Create a Short").with_class("android.widget.TextView").to_query();
		assert_eq!(query.using, Using::XPath);
		assert_eq!(query.value, r#"//android.widget.TextView[@text="Create a Short"]"#);

		let query = Locator::text_contains("Uploading").to_query();
		assert_eq!(query.value, r#"//*[contains(@text, "Uploading")]"#);
	}

	#[test]
	fn content_description_uses_accessibility_id() {
		let query = Locator::content_description("Create").with_class("android.widget.FrameLayout").to_query();
		assert_eq!(query.using, Using::AccessibilityId);
		assert_eq!(query.value, "Create");
	}

	#[test]
	fn input_hint_matches_hint_or_text() {
		let query = Locator::input_hint("Ask a question...").to_query();
		assert_eq!(query.value, r#"//*[@hint="Ask a question..." or @text="Ask a question..."]"#);
	}

	#[test]
	fn literals_survive_either_quote_kind() {
		assert_eq!(xpath_literal("plain"), r#""plain""#);
		assert_eq!(xpath_literal(r#"say "hi""#), r#"'say "hi"'"#);
		assert_eq!(xpath_literal(r#"it's "x""#), r#"concat("it's ", '"', "x", '"', "")"#);
	}

	#[test]
	fn render_fills_templates() {
		let vars = TemplateVars {
			file_name: "clip.mp4".into(),
			duration_label: "3 days".into(),
		};
		assert_eq!(Locator::text("{file_name}").render(&vars).value, "clip.mp4");
		assert_eq!(Locator::text("{duration_label}").render(&vars).value, "3 days");
	}

	#[test]
	fn display_is_compact() {
		assert_eq!(Locator::text("Next").with_class("android.widget.Button").to_string(), r#"android.widget.Button[text="Next"]"#);
		assert_eq!(Locator::content_description("Create").to_string(), r#"content-desc="Create""#);
	}
}
