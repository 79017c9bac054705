//! Trait abstractions for the collaborators the core depends on.
//!
//! # Traits
//!
//! - [`Screen`] - a navigable screen instance
//! - [`ScreenRegistry`] - resolves screen names to instances
//! - [`ScreenHost`] - owns the physical container screens are attached to
//! - [`NavigationController`] - interception and navigation callbacks
//! - [`LocalCache`] - page-addressable local storage for list items
//! - [`HttpClient`] - HTTP operations (GET, streaming GET)

pub mod cache;
pub mod http;
pub mod screen;

pub use cache::LocalCache;
pub use http::{ByteStream, Headers, HttpClient, HttpError, Response, StreamingResponse};
pub use screen::{
    InterceptionResult, NavigationController, NavigationResult, Presentation, Screen,
    ScreenHandle, ScreenHost, ScreenRegistry, Transition,
};
