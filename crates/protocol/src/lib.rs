//! Wire types for the W3C WebDriver protocol as spoken by Appium.
//!
//! This crate contains the serde-serializable types used for communication
//! with the automation server over HTTP. These types represent the
//! "protocol layer" - the shapes of data as they appear on the wire.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! * Pure data: No behavior beyond serialization/deserialization
//! * 1:1 with protocol: Match the W3C WebDriver spec plus Appium's vendor endpoints
//! * Stable: Changes only when the wire protocol changes
//!
//! Higher-level session and step APIs are built on top of these types in `shorts-rs`.

pub mod actions;
pub mod capabilities;
pub mod element;
pub mod requests;
pub mod response;

pub use actions::*;
pub use capabilities::*;
pub use element::*;
pub use requests::*;
pub use response::*;
