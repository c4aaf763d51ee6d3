//! Automation server lifecycle for the shorts publisher.
//!
//! The server (Appium) is an external long-lived process. This crate probes
//! whether one is already answering, spawns one when it is not, watches its
//! output for the readiness line, and shuts it down again.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod probe;
pub mod process;

mod launcher;

pub use config::{LaunchOptions, ServerConfig};
pub use error::{Result, ServerError};
pub use lifecycle::{ServerControl, ServerLifecycleManager, ServerPhase};
pub use probe::{ApiBase, ServerEndpoint};
