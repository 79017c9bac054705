//! Screens and a map-backed registry for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::arguments::Arguments;
use crate::error::NavigationError;
use crate::traits::{NavigationResult, Presentation, Screen, ScreenHandle, ScreenRegistry};

/// A screen that records what the navigator hands it.
#[derive(Debug, Default)]
pub struct StaticScreen {
    presentation: Presentation,
    arguments: Mutex<Vec<Arguments>>,
    results: Mutex<Vec<NavigationResult>>,
}

impl StaticScreen {
    pub fn new(presentation: Presentation) -> Self {
        Self {
            presentation,
            ..Self::default()
        }
    }

    /// A fresh page instance.
    pub fn page() -> ScreenHandle {
        Arc::new(Self::new(Presentation::Page))
    }

    /// A fresh modal instance.
    pub fn modal() -> ScreenHandle {
        Arc::new(Self::new(Presentation::Modal))
    }

    /// A page whose recorded calls stay inspectable through the concrete type.
    pub fn recording() -> Arc<Self> {
        Arc::new(Self::new(Presentation::Page))
    }

    /// Every merged argument set delivered before a show, oldest first.
    pub fn received_arguments(&self) -> Vec<Arguments> {
        self.arguments.lock().unwrap().clone()
    }

    /// Results delivered by `go_back`, oldest first.
    pub fn results(&self) -> Vec<NavigationResult> {
        self.results.lock().unwrap().clone()
    }
}

impl Screen for StaticScreen {
    fn presentation(&self) -> Presentation {
        self.presentation
    }

    fn on_arguments(&self, arguments: &Arguments) {
        self.arguments.lock().unwrap().push(arguments.clone());
    }

    fn on_navigation_result(&self, result: &NavigationResult) {
        self.results.lock().unwrap().push(result.clone());
    }
}

/// Resolves names from a fixed map.
#[derive(Default)]
pub struct StaticRegistry {
    screens: HashMap<String, ScreenHandle>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, screen: ScreenHandle) {
        self.screens.insert(name.into(), screen);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, name: impl Into<String>, screen: ScreenHandle) -> Self {
        self.register(name, screen);
        self
    }
}

impl ScreenRegistry for StaticRegistry {
    fn resolve(&self, name: &str) -> Result<ScreenHandle, NavigationError> {
        self.screens
            .get(name)
            .cloned()
            .ok_or_else(|| NavigationError::not_found(name))
    }
}
