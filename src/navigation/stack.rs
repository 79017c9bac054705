//! Breadcrumb stack over an arena of screen records.
//!
//! Screen instances live in an arena keyed by name and are never dropped by
//! a pop, so a screen that is navigated to again is re-attached instead of
//! recreated. The breadcrumb list holds arena ids; its positions are the
//! breadcrumb indices and are always dense.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::arguments::Arguments;
use crate::traits::{ScreenHandle, ScreenHost, Transition};

/// Arena slot of a screen record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScreenId(usize);

/// One breadcrumb: a position in the stack paired with its screen.
#[derive(Clone)]
pub struct BreadcrumbEntry {
    pub index: usize,
    pub name: String,
    pub screen: ScreenHandle,
}

impl fmt::Debug for BreadcrumbEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BreadcrumbEntry")
            .field("index", &self.index)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// How a registered screen reaches the host on the next push.
#[derive(Clone)]
pub(crate) enum Placement {
    /// First time this name is shown.
    Fresh,
    /// Same instance as last time; re-attach it.
    Reuse,
    /// A different instance now occupies this name.
    Replace(ScreenHandle),
}

struct ScreenRecord {
    name: String,
    screen: ScreenHandle,
    arguments: Arguments,
    attached: bool,
}

/// Breadcrumb-indexed navigation stack.
#[derive(Default)]
pub struct NavigationStack {
    records: Vec<ScreenRecord>,
    by_name: HashMap<String, ScreenId>,
    breadcrumbs: Vec<ScreenId>,
    modal: Option<ScreenId>,
}

impl NavigationStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of breadcrumbs, root included.
    pub fn depth(&self) -> usize {
        self.breadcrumbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breadcrumbs.is_empty()
    }

    /// Index of the top breadcrumb, `None` before the first navigation.
    pub fn current_index(&self) -> Option<usize> {
        self.breadcrumbs.len().checked_sub(1)
    }

    /// True when nothing above the root can be popped.
    pub fn is_at_root(&self) -> bool {
        self.breadcrumbs.len() <= 1
    }

    pub fn top(&self) -> Option<BreadcrumbEntry> {
        self.current_index().and_then(|index| self.entry(index))
    }

    pub fn entry(&self, index: usize) -> Option<BreadcrumbEntry> {
        self.breadcrumbs.get(index).map(|id| self.to_entry(index, *id))
    }

    /// All breadcrumbs from root to top.
    pub fn entries(&self) -> Vec<BreadcrumbEntry> {
        self.breadcrumbs
            .iter()
            .enumerate()
            .map(|(index, id)| self.to_entry(index, *id))
            .collect()
    }

    /// True when `name` currently occupies a breadcrumb.
    pub fn contains_name(&self, name: &str) -> bool {
        self.by_name
            .get(name)
            .is_some_and(|id| self.breadcrumbs.contains(id))
    }

    /// Arguments accumulated by the screen registered under `name`.
    pub fn arguments_of(&self, name: &str) -> Option<&Arguments> {
        self.by_name.get(name).map(|id| &self.records[id.0].arguments)
    }

    /// True while the screen registered under `name` is attached to the host.
    pub fn is_attached(&self, name: &str) -> bool {
        self.by_name
            .get(name)
            .is_some_and(|id| self.records[id.0].attached)
    }

    /// Name of the modal currently shown over the stack.
    pub fn modal_name(&self) -> Option<&str> {
        self.modal.map(|id| self.records[id.0].name.as_str())
    }

    /// Record `screen` under `name` and decide how it reaches the host.
    pub(crate) fn register(&mut self, name: &str, screen: &ScreenHandle) -> (ScreenId, Placement) {
        if let Some(&id) = self.by_name.get(name) {
            let record = &mut self.records[id.0];
            if Arc::ptr_eq(&record.screen, screen) {
                return (id, Placement::Reuse);
            }
            let previous = std::mem::replace(&mut record.screen, Arc::clone(screen));
            record.arguments = Arguments::new();
            return (id, Placement::Replace(previous));
        }

        let id = ScreenId(self.records.len());
        self.records.push(ScreenRecord {
            name: name.to_string(),
            screen: Arc::clone(screen),
            arguments: Arguments::new(),
            attached: false,
        });
        self.by_name.insert(name.to_string(), id);
        (id, Placement::Fresh)
    }

    /// Merge `arguments` into the record's argument set and return the result.
    pub(crate) fn merge_arguments(&mut self, id: ScreenId, arguments: &Arguments) -> &Arguments {
        let record = &mut self.records[id.0];
        record.arguments.merge(arguments);
        &record.arguments
    }

    /// Push a registered screen.
    ///
    /// The current top is detached first. With `add_to_back_stack == false`
    /// every breadcrumb is discarded and the screen becomes the new root.
    /// Returns the breadcrumbs that were discarded.
    pub(crate) fn push(
        &mut self,
        host: &mut dyn ScreenHost,
        id: ScreenId,
        placement: Placement,
        add_to_back_stack: bool,
        transition: Transition,
    ) -> Vec<BreadcrumbEntry> {
        let mut discarded = Vec::new();

        if let Some(top) = self.breadcrumbs.last().copied() {
            let record = &mut self.records[top.0];
            // A replaced top already holds the new instance; `host.replace`
            // swaps the attached one below.
            let replaced_in_place = top == id && matches!(placement, Placement::Replace(_));
            if !replaced_in_place {
                host.detach(&record.name, &record.screen);
            }
            record.attached = false;

            if !add_to_back_stack {
                discarded = self.entries();
                self.breadcrumbs.clear();
            }
        }

        self.breadcrumbs.push(id);

        let record = &mut self.records[id.0];
        record.attached = true;
        match placement {
            Placement::Fresh | Placement::Reuse => {
                host.attach(&record.name, &record.screen, transition)
            }
            Placement::Replace(previous) => {
                host.replace(&record.name, &previous, &record.screen, transition)
            }
        }
        host.execute_pending_transitions();

        discarded
    }

    /// Remove the top breadcrumb and re-attach the one below it.
    ///
    /// Returns `None` when already at root.
    pub(crate) fn pop(&mut self, host: &mut dyn ScreenHost) -> Option<BreadcrumbEntry> {
        if self.is_at_root() {
            return None;
        }

        let index = self.breadcrumbs.len() - 1;
        let id = self.breadcrumbs.pop()?;
        let removed = self.to_entry(index, id);
        host.detach(&removed.name, &removed.screen);
        self.records[id.0].attached = false;

        if let Some(&below) = self.breadcrumbs.last() {
            let record = &mut self.records[below.0];
            record.attached = true;
            host.attach(&record.name, &record.screen, Transition::Close);
        }
        host.execute_pending_transitions();

        Some(removed)
    }

    /// Remove every breadcrumb above the root in one step.
    ///
    /// Returns the removed breadcrumbs, top first; empty when already at root.
    pub(crate) fn pop_to_root(&mut self, host: &mut dyn ScreenHost) -> Vec<BreadcrumbEntry> {
        if self.is_at_root() {
            return Vec::new();
        }

        let mut removed: Vec<BreadcrumbEntry> = self.entries().into_iter().skip(1).collect();
        removed.reverse();
        if let Some(top) = removed.first() {
            host.detach(&top.name, &top.screen);
        }
        for id in self.breadcrumbs.drain(1..) {
            self.records[id.0].attached = false;
        }

        let root = &mut self.records[self.breadcrumbs[0].0];
        root.attached = true;
        host.attach(&root.name, &root.screen, Transition::Close);
        host.execute_pending_transitions();

        removed
    }

    /// Show a registered screen as the modal overlay.
    pub(crate) fn show_modal(&mut self, host: &mut dyn ScreenHost, id: ScreenId) {
        if let Some(previous) = self.modal.take() {
            host.dismiss_modal(&self.records[previous.0].name);
        }
        let record = &self.records[id.0];
        host.show_modal(&record.name, &record.screen);
        self.modal = Some(id);
    }

    /// Dismiss the modal overlay, returning its name.
    pub(crate) fn dismiss_modal(&mut self, host: &mut dyn ScreenHost) -> Option<String> {
        let id = self.modal.take()?;
        let name = self.records[id.0].name.clone();
        host.dismiss_modal(&name);
        Some(name)
    }

    fn to_entry(&self, index: usize, id: ScreenId) -> BreadcrumbEntry {
        let record = &self.records[id.0];
        BreadcrumbEntry {
            index,
            name: record.name.clone(),
            screen: Arc::clone(&record.screen),
        }
    }
}
