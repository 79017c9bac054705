//! Breadcrumb navigation.
//!
//! - [`NavigationStack`] - arena of screen records plus the breadcrumb list
//! - [`Interception`] - the single parked request of the detour protocol
//! - [`FragmentNavigator`] - the public facade

pub mod interception;
pub mod navigator;
pub mod stack;

pub use interception::{Interception, InterceptionRecord};
pub use navigator::{FragmentNavigator, NavigationOutcome};
pub use stack::{BreadcrumbEntry, NavigationStack, ScreenId};
