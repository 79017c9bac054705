//! Offline walkthrough of the navigator, a paginated list and the updater.
//!
//! Every collaborator is in-memory: screens come from a static registry, the
//! host only logs, and HTTP answers come from [`MockHttpClient`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use color_eyre::eyre::{eyre, Result};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use skeleton::adapters::mock::{MockHttpClient, MockResponse, StaticRegistry, StaticScreen};
use skeleton::adapters::InMemoryCache;
use skeleton::config::{SkeletonConfig, UpdaterConfig};
use skeleton::logging;
use skeleton::navigation::FragmentNavigator;
use skeleton::pagination::{json_list, ApiBoundAdapter, HttpPageSource, LoadAction};
use skeleton::task::TaskManager;
use skeleton::traits::{
    InterceptionResult, NavigationController, Response, ScreenHandle, ScreenHost, Transition,
};
use skeleton::update::{CheckOutcome, UpdateStateManager, VersionUpdater};
use skeleton::Arguments;

const ITEMS_URL: &str = "https://demo.local/items";
const VERSION_URL: &str = "https://demo.local/version";

/// Host that only logs what a UI toolkit would do.
struct LoggingHost;

impl ScreenHost for LoggingHost {
    fn attach(&mut self, name: &str, _screen: &ScreenHandle, transition: Transition) {
        info!(screen = name, ?transition, "attach");
    }

    fn detach(&mut self, name: &str, _screen: &ScreenHandle) {
        info!(screen = name, "detach");
    }

    fn replace(
        &mut self,
        name: &str,
        _previous: &ScreenHandle,
        _screen: &ScreenHandle,
        transition: Transition,
    ) {
        info!(screen = name, ?transition, "replace instance");
    }

    fn show_modal(&mut self, name: &str, _screen: &ScreenHandle) {
        info!(screen = name, "show modal");
    }

    fn dismiss_modal(&mut self, name: &str) {
        info!(screen = name, "dismiss modal");
    }
}

/// Sends signed-out users to `login` before `profile`.
#[derive(Default)]
struct LoginGate {
    signed_in: AtomicBool,
}

impl NavigationController for LoginGate {
    fn on_screen_will_show(
        &self,
        navigator: &mut FragmentNavigator,
        name: &str,
        _screen: &ScreenHandle,
        _arguments: &Arguments,
    ) -> InterceptionResult {
        if name != "profile" || self.signed_in.load(Ordering::SeqCst) {
            return InterceptionResult::Through;
        }
        info!("profile needs a session, showing login first");
        match navigator.navigate("login") {
            Ok(_) => InterceptionResult::Insert,
            Err(_) => InterceptionResult::Interrupted,
        }
    }

    fn on_screen_shown(&self, name: &str, _screen: &ScreenHandle) {
        info!(screen = name, "shown");
    }
}

#[derive(Debug, Clone, Deserialize)]
struct Article {
    id: u32,
    title: String,
}

fn navigation_demo() -> Result<()> {
    let registry = StaticRegistry::new()
        .with("home", StaticScreen::page())
        .with("profile", StaticScreen::page())
        .with("login", StaticScreen::page());
    let gate = Arc::new(LoginGate::default());
    let mut navigator = FragmentNavigator::new(
        Arc::new(registry),
        Box::new(LoggingHost),
        gate.clone() as Arc<dyn NavigationController>,
    );

    navigator.navigate_to("home", None, false, Transition::None)?;
    navigator.navigate_with("profile", Arguments::new().with("user", 42))?;
    info!(top = ?navigator.top_name(), parked = navigator.is_intercepted(), "after profile request");

    gate.signed_in.store(true, Ordering::SeqCst);
    navigator.continue_from_interception(Some(Arguments::new().with("session", "demo")))?;
    info!(
        top = ?navigator.top_name(),
        depth = navigator.depth(),
        arguments = ?navigator.arguments_of("profile"),
        "resumed"
    );

    navigator.go_back(None);
    info!(top = ?navigator.top_name(), at_root = navigator.is_at_root(), "back");
    Ok(())
}

async fn pagination_demo(config: &SkeletonConfig, http: Arc<MockHttpClient>) -> Result<()> {
    let articles: Vec<_> = (1..=12)
        .map(|id| json!({ "id": id, "title": format!("Article {}", id) }))
        .collect();
    http.set_response(
        &format!("{}?limit={}&offset=0", ITEMS_URL, config.page.refresh_rows),
        MockResponse::Success(Response::new(
            200,
            Bytes::from(json!({ "items": articles, "total": 12 }).to_string()),
        )),
    );

    let source = HttpPageSource::new(
        http,
        ITEMS_URL,
        InMemoryCache::<Article>::new(),
        json_list::<Article>("/items"),
    )
    .with_total_at("/total");
    let adapter = ApiBoundAdapter::new(Arc::new(source), TaskManager::new(), config.page)
        .with_tag("articles");
    let mut events = adapter.events();

    let outcome = adapter.load_data(LoadAction::Refresh).await;
    info!(?outcome, items = adapter.items().len(), "refresh");
    if let Some(first) = adapter.items().get(0) {
        info!(id = first.id, title = %first.title, "first article");
    }

    let outcome = adapter.load_data(LoadAction::FetchMore).await;
    info!(?outcome, no_more = adapter.has_no_more_from_server(), "fetch more");

    while let Ok(event) = events.try_recv() {
        info!(?event, "list event");
    }
    Ok(())
}

async fn update_demo(config: &SkeletonConfig, http: Arc<MockHttpClient>) -> Result<()> {
    http.set_response(
        VERSION_URL,
        MockResponse::Success(Response::new(
            200,
            Bytes::from(
                json!({
                    "mainVersion": "0.4",
                    "buildNum": 12,
                    "url": "https://demo.local/skeleton-0.4.12.bin",
                    "features": ["Modal overlays", "Total row counts"]
                })
                .to_string(),
            ),
        )),
    );
    http.set_response(
        "https://demo.local/skeleton-0.4.12.bin",
        MockResponse::Stream(vec![Bytes::from(vec![0u8; 2048]); 8]),
    );

    let state_dir = std::env::temp_dir().join("skeleton-demo");
    let updater = VersionUpdater::new(
        config.updater.clone(),
        http,
        UpdateStateManager::with_path(state_dir.join("update_state.json")),
    );

    if let Some((old, new)) = updater.post_version_updated(&config.updater.current_version)? {
        info!(%old, %new, "updated since last run");
    }

    match updater.check_update(true).await? {
        CheckOutcome::UpdateAvailable(info) => {
            info!(version = %info.version_name(), features = %info.features_text().trim_end(), "update available");
            let download = updater.download_update().await?;
            info!(path = %download.file_path.display(), bytes = download.file_size, "downloaded");
        }
        other => info!(?other, "no update"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let config = SkeletonConfig::from_env().with_updater(
        UpdaterConfig::new(VERSION_URL)
            .with_current_build(3, env!("CARGO_PKG_VERSION"))
            .with_download_dir(std::env::temp_dir().join("skeleton-demo").join("downloads")),
    );
    if !logging::init_tracing(&config.log_filter) {
        return Err(eyre!("a tracing subscriber is already installed"));
    }

    let http = Arc::new(MockHttpClient::new());

    navigation_demo()?;
    pagination_demo(&config, http.clone()).await?;
    update_demo(&config, http).await?;
    Ok(())
}
