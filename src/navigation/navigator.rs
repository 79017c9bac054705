//! Public navigation API.
//!
//! [`FragmentNavigator`] resolves names through the registry, consults the
//! controller before every commit and drives the host through the
//! breadcrumb stack. A controller may navigate recursively from inside
//! `on_screen_will_show` (for example to a login screen) and ask for the
//! original request to be replayed once the detour finishes.

use std::sync::Arc;

use tracing::{debug, info};

use crate::arguments::Arguments;
use crate::error::NavigationError;
use crate::navigation::interception::{Interception, InterceptionRecord};
use crate::navigation::stack::{BreadcrumbEntry, NavigationStack};
use crate::task::TaskManager;
use crate::traits::{
    InterceptionResult, NavigationController, NavigationResult, Presentation, ScreenHandle,
    ScreenHost, ScreenRegistry, Transition,
};

/// What a navigation request ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The screen was pushed and is now the top breadcrumb.
    Shown { index: usize },
    /// The screen was shown in the modal overlay.
    ShownModal,
    /// The controller parked the request for later replay.
    Intercepted,
    /// The controller dropped the request.
    Interrupted,
}

impl NavigationOutcome {
    /// True when something became visible.
    pub fn is_shown(&self) -> bool {
        matches!(self, Self::Shown { .. } | Self::ShownModal)
    }
}

/// Breadcrumb navigator with detour-and-resume support.
pub struct FragmentNavigator {
    registry: Arc<dyn ScreenRegistry>,
    host: Box<dyn ScreenHost>,
    controller: Arc<dyn NavigationController>,
    stack: NavigationStack,
    interception: Interception,
    tasks: Option<TaskManager>,
}

impl FragmentNavigator {
    pub fn new(
        registry: Arc<dyn ScreenRegistry>,
        host: Box<dyn ScreenHost>,
        controller: Arc<dyn NavigationController>,
    ) -> Self {
        Self {
            registry,
            host,
            controller,
            stack: NavigationStack::new(),
            interception: Interception::new(),
            tasks: None,
        }
    }

    /// Cancel tasks tagged with a screen's name once it leaves the stack.
    pub fn with_task_manager(mut self, tasks: TaskManager) -> Self {
        self.tasks = Some(tasks);
        self
    }

    /// Navigate with default options: keep the back stack, open transition.
    pub fn navigate(&mut self, name: &str) -> Result<NavigationOutcome, NavigationError> {
        self.navigate_to(name, None, true, Transition::Open)
    }

    /// Navigate with arguments and default options.
    pub fn navigate_with(
        &mut self,
        name: &str,
        arguments: Arguments,
    ) -> Result<NavigationOutcome, NavigationError> {
        self.navigate_to(name, Some(arguments), true, Transition::Open)
    }

    /// Navigate to the screen registered under `name`.
    ///
    /// With `add_to_back_stack == false` the stack is reset and the screen
    /// becomes the new root.
    pub fn navigate_to(
        &mut self,
        name: &str,
        arguments: Option<Arguments>,
        add_to_back_stack: bool,
        transition: Transition,
    ) -> Result<NavigationOutcome, NavigationError> {
        if name.is_empty() {
            return Err(NavigationError::invalid_state(
                "navigate_to",
                "screen name is empty",
            ));
        }
        let screen = self.registry.resolve(name)?;

        self.navigate_to_screen(
            name.to_string(),
            screen,
            arguments.unwrap_or_default(),
            add_to_back_stack,
            transition,
        )
    }

    /// Go back one level, or dismiss the modal overlay if one is shown.
    ///
    /// Returns `false` at root. `result` is delivered to the screen that
    /// becomes visible.
    pub fn go_back(&mut self, result: Option<Arguments>) -> bool {
        let left = if let Some(modal) = self.stack.dismiss_modal(self.host.as_mut()) {
            modal
        } else if let Some(removed) = self.stack.pop(self.host.as_mut()) {
            self.cancel_tasks_for(std::slice::from_ref(&removed));
            removed.name
        } else {
            return false;
        };

        self.interception.clear();
        debug!(from = %left, "went back");

        if let Some(top) = self.stack.top() {
            self.controller.on_go_back(&top.name, top.index);
            if let Some(arguments) = result {
                top.screen.on_navigation_result(&NavigationResult {
                    from: left,
                    arguments,
                });
            }
        }
        true
    }

    /// Remove everything above the root in one step.
    pub fn go_back_to_root(&mut self) {
        if self.stack.is_at_root() {
            return;
        }

        self.stack.dismiss_modal(self.host.as_mut());
        let removed = self.stack.pop_to_root(self.host.as_mut());
        self.cancel_tasks_for(&removed);
        debug!(removed = removed.len(), "went back to root");

        if let Some(root) = self.stack.top() {
            self.controller.on_go_back(&root.name, root.index);
        }
    }

    /// Resume the parked request after the interstitial screen finishes.
    ///
    /// Without a parked request this is exactly `go_back(None)`. Otherwise
    /// the interstitial is dismissed (or popped), `extra` is merged into the
    /// stored arguments and the request is replayed through the controller.
    pub fn continue_from_interception(
        &mut self,
        extra: Option<Arguments>,
    ) -> Result<bool, NavigationError> {
        let Some(record) = self.interception.take() else {
            return Ok(self.go_back(None));
        };

        if self.stack.dismiss_modal(self.host.as_mut()).is_some() {
            self.notify_go_back();
        } else if let Some(removed) = self.stack.pop(self.host.as_mut()) {
            self.cancel_tasks_for(std::slice::from_ref(&removed));
            self.notify_go_back();
        }

        let InterceptionRecord {
            target_name,
            target_screen,
            mut target_args,
            add_to_back_stack,
            transition,
        } = record;
        if let Some(extra) = extra {
            target_args.merge(&extra);
        }

        info!(screen = %target_name, "resuming intercepted navigation");
        self.navigate_to_screen(
            target_name,
            target_screen,
            target_args,
            add_to_back_stack,
            transition,
        )?;
        Ok(true)
    }

    /// Forget the parked request without navigating.
    pub fn cancel_interception_state(&mut self) {
        if self.interception.is_pending() {
            debug!("interception state cancelled");
        }
        self.interception.clear();
    }

    pub fn is_intercepted(&self) -> bool {
        self.interception.is_pending()
    }

    /// The parked request, if any.
    pub fn interception(&self) -> Option<&InterceptionRecord> {
        self.interception.record()
    }

    pub fn is_at_root(&self) -> bool {
        self.stack.is_at_root()
    }

    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.stack.current_index()
    }

    pub fn top_name(&self) -> Option<String> {
        self.stack.top().map(|entry| entry.name)
    }

    pub fn modal_name(&self) -> Option<&str> {
        self.stack.modal_name()
    }

    pub fn breadcrumbs(&self) -> Vec<BreadcrumbEntry> {
        self.stack.entries()
    }

    /// Arguments accumulated by the screen registered under `name`.
    pub fn arguments_of(&self, name: &str) -> Option<&Arguments> {
        self.stack.arguments_of(name)
    }

    fn navigate_to_screen(
        &mut self,
        name: String,
        screen: ScreenHandle,
        arguments: Arguments,
        add_to_back_stack: bool,
        transition: Transition,
    ) -> Result<NavigationOutcome, NavigationError> {
        let controller = Arc::clone(&self.controller);
        let index_before = self.stack.current_index();
        let generation_before = self.interception.generation();

        match controller.on_screen_will_show(self, &name, &screen, &arguments) {
            InterceptionResult::Through => {}
            InterceptionResult::Interrupted => {
                debug!(screen = %name, "navigation interrupted by controller");
                return Ok(NavigationOutcome::Interrupted);
            }
            InterceptionResult::Insert => {
                if self.interception.redirected_during_check(
                    index_before,
                    self.stack.current_index(),
                    generation_before,
                ) {
                    debug!(screen = %name, "nested interception pending, keeping innermost");
                } else {
                    debug!(screen = %name, "navigation intercepted");
                    self.interception.store(InterceptionRecord {
                        target_name: name,
                        target_screen: screen,
                        target_args: arguments,
                        add_to_back_stack,
                        transition,
                    });
                }
                return Ok(NavigationOutcome::Intercepted);
            }
        }

        Ok(self.commit(name, screen, arguments, add_to_back_stack, transition))
    }

    fn commit(
        &mut self,
        name: String,
        screen: ScreenHandle,
        arguments: Arguments,
        add_to_back_stack: bool,
        transition: Transition,
    ) -> NavigationOutcome {
        let (id, placement) = self.stack.register(&name, &screen);
        screen.on_arguments(self.stack.merge_arguments(id, &arguments));

        if screen.presentation() == Presentation::Modal {
            self.stack.show_modal(self.host.as_mut(), id);
            info!(screen = %name, "modal shown");
            self.controller.on_screen_shown(&name, &screen);
            return NavigationOutcome::ShownModal;
        }

        let discarded = self.stack.push(
            self.host.as_mut(),
            id,
            placement,
            add_to_back_stack,
            transition,
        );
        self.cancel_tasks_for(&discarded);

        let index = self.stack.current_index().unwrap_or_default();
        info!(screen = %name, index, "screen shown");
        self.controller.on_screen_shown(&name, &screen);
        NavigationOutcome::Shown { index }
    }

    fn notify_go_back(&self) {
        if let Some(top) = self.stack.top() {
            self.controller.on_go_back(&top.name, top.index);
        }
    }

    fn cancel_tasks_for(&self, removed: &[BreadcrumbEntry]) {
        let Some(tasks) = &self.tasks else {
            return;
        };
        for entry in removed {
            if !self.stack.contains_name(&entry.name) {
                let cancelled = tasks.cancel_by_tag(&entry.name);
                if cancelled > 0 {
                    debug!(screen = %entry.name, cancelled, "cancelled tasks of removed screen");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{
        ControllerCall, HostCall, RecordingController, RecordingHost, StaticRegistry, StaticScreen,
    };

    struct Fixture {
        navigator: FragmentNavigator,
        host: RecordingHost,
        controller: Arc<RecordingController>,
    }

    fn fixture(names: &[&str]) -> Fixture {
        let mut registry = StaticRegistry::new();
        for name in names {
            registry.register(*name, StaticScreen::page());
        }
        registry.register("dialog", StaticScreen::modal());

        let host = RecordingHost::new();
        let controller = Arc::new(RecordingController::new());
        let navigator = FragmentNavigator::new(
            Arc::new(registry),
            Box::new(host.clone()),
            controller.clone(),
        );
        Fixture {
            navigator,
            host,
            controller,
        }
    }

    #[test]
    fn test_navigate_pushes_breadcrumbs() {
        let mut f = fixture(&["home", "list", "detail"]);

        assert_eq!(
            f.navigator.navigate("home").unwrap(),
            NavigationOutcome::Shown { index: 0 }
        );
        f.navigator.navigate("list").unwrap();
        f.navigator.navigate("detail").unwrap();

        assert_eq!(f.navigator.depth(), 3);
        assert_eq!(f.navigator.top_name().as_deref(), Some("detail"));
        assert!(!f.navigator.is_at_root());
    }

    #[test]
    fn test_unknown_screen_leaves_state_untouched() {
        let mut f = fixture(&["home"]);
        f.navigator.navigate("home").unwrap();
        f.host.clear();

        let err = f.navigator.navigate("missing").unwrap_err();
        assert_eq!(err, NavigationError::not_found("missing"));
        assert_eq!(f.navigator.depth(), 1);
        assert!(f.host.calls().is_empty());
    }

    #[test]
    fn test_empty_name_is_invalid_state() {
        let mut f = fixture(&["home"]);
        let err = f.navigator.navigate("").unwrap_err();
        assert_eq!(err.error_code(), "NAV_INVALID_STATE");
        assert_eq!(f.navigator.depth(), 0);
    }

    #[test]
    fn test_go_back_at_root_returns_false() {
        let mut f = fixture(&["home"]);
        assert!(!f.navigator.go_back(None));

        f.navigator.navigate("home").unwrap();
        assert!(!f.navigator.go_back(None));
        assert!(f.controller.calls().iter().all(|c| !matches!(c, ControllerCall::GoBack(..))));
    }

    #[test]
    fn test_go_back_fires_callback_for_new_top() {
        let mut f = fixture(&["home", "detail"]);
        f.navigator.navigate("home").unwrap();
        f.navigator.navigate("detail").unwrap();

        assert!(f.navigator.go_back(None));
        assert_eq!(f.navigator.current_index(), Some(0));
        assert!(f
            .controller
            .calls()
            .contains(&ControllerCall::GoBack("home".into(), 0)));
    }

    #[test]
    fn test_go_back_delivers_result() {
        let mut registry = StaticRegistry::new();
        let home = StaticScreen::recording();
        registry.register("home", home.clone());
        registry.register("picker", StaticScreen::page());
        let mut navigator = FragmentNavigator::new(
            Arc::new(registry),
            Box::new(RecordingHost::new()),
            Arc::new(RecordingController::new()),
        );

        navigator.navigate("home").unwrap();
        navigator.navigate("picker").unwrap();
        navigator.go_back(Some(Arguments::new().with("choice", 2)));

        let results = home.results();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].from, "picker");
        assert_eq!(results[0].arguments.get_i64("choice"), Some(2));
    }

    #[test]
    fn test_go_back_to_root_fires_once() {
        let mut f = fixture(&["home", "a", "b", "c"]);
        for name in ["home", "a", "b", "c"] {
            f.navigator.navigate(name).unwrap();
        }

        f.navigator.go_back_to_root();
        assert_eq!(f.navigator.depth(), 1);
        let go_backs: Vec<_> = f
            .controller
            .calls()
            .into_iter()
            .filter(|c| matches!(c, ControllerCall::GoBack(..)))
            .collect();
        assert_eq!(go_backs, vec![ControllerCall::GoBack("home".into(), 0)]);

        f.navigator.go_back_to_root();
        assert_eq!(f.controller.go_back_count(), 1);
    }

    #[test]
    fn test_reset_navigation_makes_single_root() {
        let mut f = fixture(&["home", "a", "login"]);
        f.navigator.navigate("home").unwrap();
        f.navigator.navigate("a").unwrap();

        let outcome = f
            .navigator
            .navigate_to("login", None, false, Transition::Fade)
            .unwrap();

        assert_eq!(outcome, NavigationOutcome::Shown { index: 0 });
        assert_eq!(f.navigator.depth(), 1);
        assert!(f.navigator.is_at_root());
    }

    #[test]
    fn test_arguments_merge_across_navigations() {
        let mut f = fixture(&["home", "detail"]);
        f.navigator.navigate("home").unwrap();
        f.navigator
            .navigate_with("detail", Arguments::new().with("id", 1).with("tab", "info"))
            .unwrap();
        f.navigator.go_back(None);
        f.navigator
            .navigate_with("detail", Arguments::new().with("tab", "reviews"))
            .unwrap();

        let args = f.navigator.arguments_of("detail").unwrap();
        assert_eq!(args.get_i64("id"), Some(1));
        assert_eq!(args.get_str("tab"), Some("reviews"));
    }

    #[test]
    fn test_same_instance_is_reattached() {
        let mut f = fixture(&["home", "detail"]);
        f.navigator.navigate("home").unwrap();
        f.navigator.navigate("detail").unwrap();
        f.navigator.go_back(None);
        f.host.clear();

        f.navigator.navigate("detail").unwrap();
        assert_eq!(
            f.host.calls(),
            vec![
                HostCall::Detach("home".into()),
                HostCall::Attach("detail".into())
            ]
        );
    }

    /// Hands out a new instance on every resolve.
    struct FreshRegistry;

    impl ScreenRegistry for FreshRegistry {
        fn resolve(&self, _name: &str) -> Result<ScreenHandle, NavigationError> {
            Ok(StaticScreen::page())
        }
    }

    /// Tracks attached instances by pointer and logs inconsistent calls.
    #[derive(Clone, Default)]
    struct InstanceHost {
        attached: Arc<std::sync::Mutex<Vec<ScreenHandle>>>,
        errors: Arc<std::sync::Mutex<Vec<String>>>,
    }

    impl InstanceHost {
        fn take(&self, name: &str, screen: &ScreenHandle, call: &str) {
            let mut attached = self.attached.lock().unwrap();
            match attached.iter().position(|s| Arc::ptr_eq(s, screen)) {
                Some(pos) => {
                    attached.remove(pos);
                }
                None => self
                    .errors
                    .lock()
                    .unwrap()
                    .push(format!("{} of unattached instance under {}", call, name)),
            }
        }
    }

    impl ScreenHost for InstanceHost {
        fn attach(&mut self, _name: &str, screen: &ScreenHandle, _transition: Transition) {
            self.attached.lock().unwrap().push(Arc::clone(screen));
        }

        fn detach(&mut self, name: &str, screen: &ScreenHandle) {
            self.take(name, screen, "detach");
        }

        fn replace(
            &mut self,
            name: &str,
            previous: &ScreenHandle,
            screen: &ScreenHandle,
            _transition: Transition,
        ) {
            self.take(name, previous, "replace");
            self.attached.lock().unwrap().push(Arc::clone(screen));
        }

        fn show_modal(&mut self, _name: &str, _screen: &ScreenHandle) {}

        fn dismiss_modal(&mut self, _name: &str) {}
    }

    #[test]
    fn test_new_instance_replaces_attached_top() {
        let host = InstanceHost::default();
        let mut navigator = FragmentNavigator::new(
            Arc::new(FreshRegistry),
            Box::new(host.clone()),
            Arc::new(RecordingController::new()),
        );

        navigator.navigate("home").unwrap();
        navigator.navigate("detail").unwrap();
        navigator.navigate("detail").unwrap();

        assert!(host.errors.lock().unwrap().is_empty());
        let attached = host.attached.lock().unwrap();
        assert_eq!(attached.len(), 1);
        let top = navigator.breadcrumbs().pop().unwrap();
        assert!(Arc::ptr_eq(&attached[0], &top.screen));
    }

    #[test]
    fn test_replaced_top_is_not_detached() {
        let registry = FreshRegistry;
        let host = RecordingHost::new();
        let mut navigator = FragmentNavigator::new(
            Arc::new(registry),
            Box::new(host.clone()),
            Arc::new(RecordingController::new()),
        );
        navigator.navigate("home").unwrap();
        navigator.navigate("detail").unwrap();
        host.clear();

        navigator.navigate("detail").unwrap();

        assert_eq!(host.calls(), vec![HostCall::Replace("detail".into())]);
    }

    #[test]
    fn test_modal_does_not_move_index() {
        let mut f = fixture(&["home"]);
        f.navigator.navigate("home").unwrap();

        let outcome = f.navigator.navigate("dialog").unwrap();
        assert_eq!(outcome, NavigationOutcome::ShownModal);
        assert_eq!(f.navigator.current_index(), Some(0));
        assert_eq!(f.navigator.modal_name(), Some("dialog"));

        assert!(f.navigator.go_back(None));
        assert!(f.navigator.modal_name().is_none());
        assert_eq!(f.navigator.depth(), 1);
    }

    #[test]
    fn test_interrupted_changes_nothing() {
        let mut f = fixture(&["home", "secret"]);
        f.navigator.navigate("home").unwrap();
        f.controller.interrupt("secret");
        f.host.clear();

        let outcome = f.navigator.navigate("secret").unwrap();
        assert_eq!(outcome, NavigationOutcome::Interrupted);
        assert_eq!(f.navigator.depth(), 1);
        assert!(!f.navigator.is_intercepted());
        assert!(f.host.calls().is_empty());
    }

    #[test]
    fn test_continue_without_interception_is_go_back() {
        let mut f = fixture(&["home", "detail"]);
        f.navigator.navigate("home").unwrap();
        f.navigator.navigate("detail").unwrap();

        assert!(f.navigator.continue_from_interception(None).unwrap());
        assert_eq!(f.navigator.depth(), 1);
        assert!(!f.navigator.continue_from_interception(None).unwrap());
    }
}
