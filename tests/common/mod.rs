//! Common fixtures for integration tests.
//!
//! ```ignore
//! mod common;
//! use common::NavigatorFixture;
//!
//! let mut f = NavigatorFixture::new(&["home", "login", "profile"]);
//! f.navigator.navigate("home").unwrap();
//! ```

#![allow(dead_code)]

pub mod mocks;

pub use mocks::*;

use std::sync::Arc;

use serde::Deserialize;
use skeleton::navigation::FragmentNavigator;
use skeleton::task::TaskManager;
use skeleton::traits::ScreenHandle;

/// A navigator wired to recording doubles.
pub struct NavigatorFixture {
    pub navigator: FragmentNavigator,
    pub host: RecordingHost,
    pub controller: Arc<RecordingController>,
    pub tasks: TaskManager,
}

impl NavigatorFixture {
    /// Page screens for `names`, plus a modal named `"dialog"`.
    pub fn new(names: &[&str]) -> Self {
        let screens = names
            .iter()
            .map(|name| (name.to_string(), StaticScreen::page()))
            .collect();
        Self::with_screens(screens)
    }

    pub fn with_screens(screens: Vec<(String, ScreenHandle)>) -> Self {
        init_tracing();
        let mut registry = StaticRegistry::new().with("dialog", StaticScreen::modal());
        for (name, screen) in screens {
            registry.register(name, screen);
        }

        let host = RecordingHost::new();
        let controller = Arc::new(RecordingController::new());
        let tasks = TaskManager::new();
        let navigator = FragmentNavigator::new(
            Arc::new(registry),
            Box::new(host.clone()),
            controller.clone(),
        )
        .with_task_manager(tasks.clone());

        Self {
            navigator,
            host,
            controller,
            tasks,
        }
    }

    /// Breadcrumb names, bottom first.
    pub fn names(&self) -> Vec<String> {
        self.navigator
            .breadcrumbs()
            .into_iter()
            .map(|entry| entry.name)
            .collect()
    }
}

/// Route `tracing` output through the test harness; safe to call repeatedly.
pub fn init_tracing() {
    skeleton::logging::init_test_tracing();
}

/// Item type used by the list tests.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Article {
    pub id: u32,
    pub title: String,
}

/// Articles `start..start + count` as a JSON array.
pub fn articles_json(start: u32, count: u32) -> String {
    let items: Vec<String> = (start..start + count)
        .map(|id| format!(r#"{{"id":{},"title":"Article {}"}}"#, id, id))
        .collect();
    format!("[{}]", items.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_articles_json() {
        let parsed: Vec<Article> = serde_json::from_str(&articles_json(3, 2)).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].id, 3);
        assert_eq!(parsed[1].title, "Article 4");
    }

    #[test]
    fn test_fixture_starts_empty() {
        let f = NavigatorFixture::new(&["home"]);
        assert_eq!(f.navigator.depth(), 0);
        assert!(f.names().is_empty());
    }
}
