//! Screen, registry, host and controller traits.
//!
//! The navigator never creates or renders anything itself. It resolves
//! screens through a [`ScreenRegistry`], asks a [`NavigationController`]
//! whether a navigation may proceed, and tells a [`ScreenHost`] what to
//! attach, detach or overlay.

use std::sync::Arc;

use crate::arguments::Arguments;
use crate::error::NavigationError;
use crate::navigation::FragmentNavigator;

/// How a screen is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Presentation {
    /// Occupies the container and a breadcrumb slot.
    #[default]
    Page,
    /// Shown as an overlay; never enters the breadcrumb stack.
    Modal,
}

/// Transition hint forwarded to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transition {
    None,
    #[default]
    Open,
    Close,
    Fade,
}

/// Result delivered to the screen that becomes visible after `go_back`.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationResult {
    /// Name of the screen that was left.
    pub from: String,
    /// Arguments handed back by the caller of `go_back`.
    pub arguments: Arguments,
}

/// A navigable screen instance.
///
/// Identity matters: the navigator compares handles with [`Arc::ptr_eq`] to
/// decide whether a name is being re-shown with the same instance.
pub trait Screen: Send + Sync {
    /// Page or modal overlay.
    fn presentation(&self) -> Presentation {
        Presentation::Page
    }

    /// Called with the merged argument set right before the screen is shown.
    fn on_arguments(&self, _arguments: &Arguments) {}

    /// Called when the user navigates back to this screen with a result.
    fn on_navigation_result(&self, _result: &NavigationResult) {}
}

/// Shared handle to a screen instance.
pub type ScreenHandle = Arc<dyn Screen>;

/// Resolves screen names to instances.
pub trait ScreenRegistry: Send + Sync {
    /// Return the screen registered under `name`.
    ///
    /// Unknown names must fail with [`NavigationError::ScreenNotFound`].
    fn resolve(&self, name: &str) -> Result<ScreenHandle, NavigationError>;
}

/// The container that physically shows screens.
pub trait ScreenHost: Send {
    /// Attach `screen` under `name`, creating its view if needed.
    fn attach(&mut self, name: &str, screen: &ScreenHandle, transition: Transition);

    /// Detach `screen` without destroying it.
    fn detach(&mut self, name: &str, screen: &ScreenHandle);

    /// Swap the instance occupying `name` for a different one.
    fn replace(
        &mut self,
        name: &str,
        previous: &ScreenHandle,
        screen: &ScreenHandle,
        transition: Transition,
    );

    /// Show a modal screen over the current page.
    fn show_modal(&mut self, name: &str, screen: &ScreenHandle);

    /// Dismiss the modal shown under `name`.
    fn dismiss_modal(&mut self, name: &str);

    /// Flush queued transitions synchronously.
    fn execute_pending_transitions(&mut self) {}
}

/// Verdict of [`NavigationController::on_screen_will_show`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptionResult {
    /// Remember the request and resume it later via
    /// `continue_from_interception`.
    Insert,
    /// Drop the request silently.
    Interrupted,
    /// Proceed normally.
    Through,
}

/// Callbacks fired by the navigator around every transition.
pub trait NavigationController: Send + Sync {
    /// Fired before a navigation is committed.
    ///
    /// The controller may navigate elsewhere first (for example to a login
    /// screen) through `navigator` and return [`InterceptionResult::Insert`]
    /// to have the original request replayed later.
    fn on_screen_will_show(
        &self,
        _navigator: &mut FragmentNavigator,
        _name: &str,
        _screen: &ScreenHandle,
        _arguments: &Arguments,
    ) -> InterceptionResult {
        InterceptionResult::Through
    }

    /// Fired after a screen has been attached or shown as a modal.
    fn on_screen_shown(&self, _name: &str, _screen: &ScreenHandle) {}

    /// Fired when navigation goes back; `name` is the new top screen.
    fn on_go_back(&self, _name: &str, _breadcrumb_index: usize) {}
}
