//! Concrete implementations of the trait abstractions in `crate::traits`.
//!
//! # Adapters
//!
//! - [`ReqwestHttpClient`] - HTTP client using reqwest
//! - [`InMemoryCache`] - `LocalCache` over a vector
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles for the screen host, the
//! screen registry, the navigation controller, HTTP and page sources.

pub mod memory_cache;
pub mod mock;
pub mod reqwest_http;

pub use memory_cache::InMemoryCache;
pub use mock::MockHttpClient;
pub use reqwest_http::ReqwestHttpClient;
