//! Mock implementations for testing.
//!
//! # Available Mocks
//!
//! - [`MockHttpClient`] - HTTP client with configurable responses
//! - [`RecordingHost`] - screen host that records attach/detach calls
//! - [`RecordingController`] - navigation controller with interruption and
//!   redirect rules
//! - [`StaticScreen`] / [`StaticRegistry`] - screens resolved from a map
//! - [`ScriptedTask`] / [`MemoryPageSource`] - canned task results and pages

pub mod controller;
pub mod host;
pub mod http;
pub mod screen;
pub mod task;

pub use controller::{ControllerCall, RecordingController};
pub use host::{HostCall, RecordingHost};
pub use http::{MockHttpClient, MockResponse, RecordedRequest};
pub use screen::{StaticRegistry, StaticScreen};
pub use task::{MemoryPageSource, ScriptedTask};
