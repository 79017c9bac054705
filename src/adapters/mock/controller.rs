//! Scriptable navigation controller.
//!
//! Rules are keyed by target screen name. A redirect rule navigates to an
//! interstitial screen from inside the will-show callback and parks the
//! original request, the way a login gate does.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::arguments::Arguments;
use crate::navigation::FragmentNavigator;
use crate::traits::{InterceptionResult, NavigationController, ScreenHandle};

/// One callback received by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerCall {
    WillShow(String),
    Shown(String),
    GoBack(String, usize),
}

#[derive(Debug, Clone)]
enum Rule {
    Interrupt,
    Redirect { via: String },
    Park,
}

/// Controller double that records callbacks and applies per-screen rules.
#[derive(Debug, Default)]
pub struct RecordingController {
    calls: Mutex<Vec<ControllerCall>>,
    rules: Mutex<HashMap<String, Rule>>,
}

impl RecordingController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every navigation to `target`.
    pub fn interrupt(&self, target: &str) {
        self.set_rule(target, Rule::Interrupt);
    }

    /// Show `via` first and park the navigation to `target`.
    pub fn redirect(&self, target: &str, via: &str) {
        self.set_rule(
            target,
            Rule::Redirect {
                via: via.to_string(),
            },
        );
    }

    /// Park the navigation to `target` without showing anything.
    pub fn park(&self, target: &str) {
        self.set_rule(target, Rule::Park);
    }

    /// Let navigations to `target` through again.
    pub fn allow(&self, target: &str) {
        self.rules.lock().unwrap().remove(target);
    }

    pub fn calls(&self) -> Vec<ControllerCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Names passed to `on_screen_shown`, in order.
    pub fn shown(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ControllerCall::Shown(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn go_back_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, ControllerCall::GoBack(..)))
            .count()
    }

    fn set_rule(&self, target: &str, rule: Rule) {
        self.rules.lock().unwrap().insert(target.to_string(), rule);
    }

    fn record(&self, call: ControllerCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl NavigationController for RecordingController {
    fn on_screen_will_show(
        &self,
        navigator: &mut FragmentNavigator,
        name: &str,
        _screen: &ScreenHandle,
        _arguments: &Arguments,
    ) -> InterceptionResult {
        self.record(ControllerCall::WillShow(name.to_string()));

        let rule = self.rules.lock().unwrap().get(name).cloned();
        match rule {
            None => InterceptionResult::Through,
            Some(Rule::Interrupt) => InterceptionResult::Interrupted,
            Some(Rule::Park) => InterceptionResult::Insert,
            Some(Rule::Redirect { via }) => {
                // A failed redirect still parks; the test asserts on the stack.
                let _ = navigator.navigate(&via);
                InterceptionResult::Insert
            }
        }
    }

    fn on_screen_shown(&self, name: &str, _screen: &ScreenHandle) {
        self.record(ControllerCall::Shown(name.to_string()));
    }

    fn on_go_back(&self, name: &str, breadcrumb_index: usize) {
        self.record(ControllerCall::GoBack(name.to_string(), breadcrumb_index));
    }
}
