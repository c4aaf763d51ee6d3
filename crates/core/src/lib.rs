//! Publish a video as a mobile Short with a two-option poll by driving the
//! app through an Appium session.
//!
//! The flow, leaf first:
//!
//! * [`ServerLifecycleManager`](shorts_runtime::ServerLifecycleManager) makes sure an automation server answers
//! * [`AutomationSession`] owns one WebDriver session and its interaction primitives
//! * [`UploadStateMachine`] runs the fixed upload script against a [`UiTable`]
//! * [`CompletionPoller`] waits for a success marker after submission
//! * [`ResultResolver`] derives a best-effort URL for the published Short
//! * [`PublishOrchestrator`] composes all of the above with guaranteed teardown
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use shorts::{HttpConnector, PollOptions, PublishOrchestrator, PublisherConfig};
//! use shorts_runtime::ServerLifecycleManager;
//!
//! let config = PublisherConfig::default();
//! let server = ServerLifecycleManager::shared(config.launch.clone());
//! let table = config.load_ui_table()?;
//! let orchestrator = PublishOrchestrator::new(config, table, server, HttpConnector);
//!
//! let poll = PollOptions::new(["Open the door", "Run away"]).with_question("What happens next?");
//! let result = orchestrator.publish("story.mp4".as_ref(), "Episode 1", &poll).await?;
//! println!("{}", result.url);
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod locator;
pub mod orchestrator;
pub mod poll;
pub mod poller;
pub mod resolver;
pub mod script;
pub mod session;

pub use config::{PublisherConfig, Timing};
pub use driver::{Connector, Driver, DriverCall, FakeDriver, HttpConnector, WebDriverClient};
pub use error::{Error, ErrorKind, Result, ValidationError};
pub use locator::{Locator, LocatorStrategy, TemplateVars};
pub use orchestrator::{PublishOrchestrator, PublishReport};
pub use poll::{PollDuration, PollOptions, PollSpec, StoryChoices};
pub use poller::{Completion, CompletionPoller};
pub use resolver::{ResolvedVia, ResultResolver, UploadResult};
pub use script::{RunReport, StepId, UiTable, UploadRequest, UploadStateMachine};
pub use session::AutomationSession;
