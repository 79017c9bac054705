//! Screen host that records every call.

use std::sync::{Arc, Mutex};

use crate::traits::{ScreenHandle, ScreenHost, Transition};

/// One call made by the navigator on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Attach(String),
    Detach(String),
    Replace(String),
    ShowModal(String),
    DismissModal(String),
}

/// Host double; clones share one call log.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    calls: Arc<Mutex<Vec<HostCall>>>,
    transitions: Arc<Mutex<Vec<Transition>>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Transitions passed to `attach` and `replace`, in order.
    pub fn transitions(&self) -> Vec<Transition> {
        self.transitions.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
        self.transitions.lock().unwrap().clear();
    }

    fn record(&self, call: HostCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl ScreenHost for RecordingHost {
    fn attach(&mut self, name: &str, _screen: &ScreenHandle, transition: Transition) {
        self.record(HostCall::Attach(name.to_string()));
        self.transitions.lock().unwrap().push(transition);
    }

    fn detach(&mut self, name: &str, _screen: &ScreenHandle) {
        self.record(HostCall::Detach(name.to_string()));
    }

    fn replace(
        &mut self,
        name: &str,
        _previous: &ScreenHandle,
        _screen: &ScreenHandle,
        transition: Transition,
    ) {
        self.record(HostCall::Replace(name.to_string()));
        self.transitions.lock().unwrap().push(transition);
    }

    fn show_modal(&mut self, name: &str, _screen: &ScreenHandle) {
        self.record(HostCall::ShowModal(name.to_string()));
    }

    fn dismiss_modal(&mut self, name: &str) {
        self.record(HostCall::DismissModal(name.to_string()));
    }
}
