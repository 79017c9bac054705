//! Detour-and-resume bookkeeping.

use std::fmt;

use crate::arguments::Arguments;
use crate::traits::{ScreenHandle, Transition};

/// A navigation request parked until the controller resumes it.
#[derive(Clone)]
pub struct InterceptionRecord {
    pub target_name: String,
    pub target_screen: ScreenHandle,
    pub target_args: Arguments,
    pub add_to_back_stack: bool,
    pub transition: Transition,
}

impl fmt::Debug for InterceptionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptionRecord")
            .field("target_name", &self.target_name)
            .field("target_args", &self.target_args)
            .field("add_to_back_stack", &self.add_to_back_stack)
            .field("transition", &self.transition)
            .finish_non_exhaustive()
    }
}

/// Holds at most one pending interception.
///
/// Every store bumps a generation counter so a caller can tell whether a
/// nested navigation recorded its own interception while a controller
/// callback was running.
#[derive(Debug, Default)]
pub struct Interception {
    record: Option<InterceptionRecord>,
    generation: u64,
}

impl Interception {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.record.is_some()
    }

    pub fn record(&self) -> Option<&InterceptionRecord> {
        self.record.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn store(&mut self, record: InterceptionRecord) {
        self.generation += 1;
        self.record = Some(record);
    }

    pub fn take(&mut self) -> Option<InterceptionRecord> {
        self.record.take()
    }

    pub fn clear(&mut self) {
        self.record = None;
    }

    /// True when the controller navigated elsewhere during its callback and
    /// that navigation was itself intercepted.
    ///
    /// The innermost record wins; the outer request must not overwrite it.
    pub fn redirected_during_check(
        &self,
        index_before: Option<usize>,
        index_after: Option<usize>,
        generation_before: u64,
    ) -> bool {
        index_before != index_after && self.is_pending() && self.generation != generation_before
    }
}
