//! Element location requests and element references.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// W3C web element identifier key.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Legacy JSONWP element key, still emitted by UiAutomator2 next to [`ELEMENT_KEY`].
pub const LEGACY_ELEMENT_KEY: &str = "ELEMENT";

/// Location strategies understood by the UiAutomator2 driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Using {
	#[serde(rename = "xpath")]
	XPath,
	#[serde(rename = "accessibility id")]
	AccessibilityId,
}

/// `POST /session/{id}/element` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindElement {
	pub using: Using,
	pub value: String,
}

/// Opaque reference to an element in the live UI tree.
///
/// Deserializes from either key; servers commonly send both.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct ElementRef {
	#[serde(rename = "element-6066-11e4-a52e-4f735466cecf")]
	pub id: String,
}

impl ElementRef {
	pub fn new(id: impl Into<String>) -> Self {
		Self { id: id.into() }
	}
}

impl TryFrom<Map<String, Value>> for ElementRef {
	type Error = String;

	fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
		map.get(ELEMENT_KEY)
			.or_else(|| map.get(LEGACY_ELEMENT_KEY))
			.and_then(Value::as_str)
			.map(ElementRef::new)
			.ok_or_else(|| format!("element reference missing `{ELEMENT_KEY}`"))
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn element_ref_accepts_both_keys_at_once() {
		let value = json!({ ELEMENT_KEY: "00000000-0001", "ELEMENT": "00000000-0001" });
		let element: ElementRef = serde_json::from_value(value).unwrap();
		assert_eq!(element.id, "00000000-0001");
	}

	#[test]
	fn element_ref_accepts_legacy_key() {
		let element: ElementRef = serde_json::from_value(json!({ "ELEMENT": "42" })).unwrap();
		assert_eq!(element, ElementRef::new("42"));
	}

	#[test]
	fn element_ref_rejects_unrelated_object() {
		assert!(serde_json::from_value::<ElementRef>(json!({ "id": "42" })).is_err());
	}

	#[test]
	fn find_element_uses_w3c_strategy_names() {
		let body = serde_json::to_value(FindElement {
			using: Using::AccessibilityId,
			value: "Create".into(),
		})
		.unwrap();
		assert_eq!(body, json!({ "using": "accessibility id", "value": "Create" }));
	}
}
