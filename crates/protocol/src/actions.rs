//! W3C input actions (`POST /session/{id}/actions`).

use serde::{Deserialize, Serialize};

/// Screen coordinate in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
	pub x: i32,
	pub y: i32,
}

impl Point {
	pub const fn new(x: i32, y: i32) -> Self {
		Self { x, y }
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerType {
	Mouse,
	Pen,
	Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerParameters {
	pub pointer_type: PointerType,
}

/// A single tick of a pointer input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PointerAction {
	PointerMove { duration: u64, x: i32, y: i32 },
	PointerDown { button: u32 },
	PointerUp { button: u32 },
	Pause { duration: u64 },
}

/// One input device and its action ticks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSource {
	#[serde(rename = "type")]
	pub kind: String,
	pub id: String,
	pub parameters: PointerParameters,
	pub actions: Vec<PointerAction>,
}

/// `POST /session/{id}/actions` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actions {
	pub actions: Vec<InputSource>,
}

impl Actions {
	/// Press at `from`, drag to `to` over `duration_ms`, release.
	pub fn swipe(from: Point, to: Point, duration_ms: u64) -> Self {
		let finger = InputSource {
			kind: "pointer".to_string(),
			id: "finger1".to_string(),
			parameters: PointerParameters {
				pointer_type: PointerType::Touch,
			},
			actions: vec![
				PointerAction::PointerMove {
					duration: 0,
					x: from.x,
					y: from.y,
				},
				PointerAction::PointerDown { button: 0 },
				PointerAction::Pause { duration: 100 },
				PointerAction::PointerMove {
					duration: duration_ms,
					x: to.x,
					y: to.y,
				},
				PointerAction::PointerUp { button: 0 },
			],
		};
		Self { actions: vec![finger] }
	}
}
