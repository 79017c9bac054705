//! Version updater against a local HTTP server.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;
use tokio::sync::mpsc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use skeleton::adapters::ReqwestHttpClient;
use skeleton::config::UpdaterConfig;
use skeleton::update::{
    CheckOutcome, UpdateError, UpdateEvent, UpdateStateManager, VersionUpdater,
};

const CURRENT_BUILD: u32 = 5;
const CURRENT_VERSION: &str = "2.0.5";

struct Fixture {
    server: MockServer,
    dir: TempDir,
}

impl Fixture {
    async fn new() -> Self {
        skeleton::logging::init_test_tracing();
        Self {
            server: MockServer::start().await,
            dir: TempDir::new().unwrap(),
        }
    }

    fn download_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("downloads")
    }

    fn updater(&self) -> VersionUpdater {
        let config = UpdaterConfig::new(format!("{}/version", self.server.uri()))
            .with_current_build(CURRENT_BUILD, CURRENT_VERSION)
            .with_download_dir(self.download_dir())
            .with_package_name("skeleton");
        VersionUpdater::new(
            config,
            Arc::new(ReqwestHttpClient::new()),
            UpdateStateManager::with_path(self.dir.path().join("update_state.json")),
        )
    }

    fn version_doc(&self, build: u32, force_under: u32) -> serde_json::Value {
        json!({
            "mainVersion": "2.0",
            "buildNum": build,
            "url": format!("{}/packages/skeleton-2.0.{}.bin", self.server.uri(), build),
            "forceUpdateUnderBuildNum": force_under,
            "features": ["Faster lists", "Offline cache"]
        })
    }

    async fn serve_version(&self, build: u32, force_under: u32) {
        Mock::given(method("GET"))
            .and(path("/version"))
            .respond_with(ResponseTemplate::new(200).set_body_json(self.version_doc(build, force_under)))
            .mount(&self.server)
            .await;
    }

    async fn serve_package(&self, build: u32, body: Vec<u8>) {
        Mock::given(method("GET"))
            .and(path(format!("/packages/skeleton-2.0.{}.bin", build)))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
            .mount(&self.server)
            .await;
    }
}

fn drain(rx: &mut mpsc::UnboundedReceiver<UpdateEvent>) -> Vec<UpdateEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_check_and_download_update() {
    let f = Fixture::new().await;
    f.serve_version(7, 0).await;
    f.serve_package(7, vec![0x5A; 100_000]).await;
    let updater = f.updater();
    let mut rx = updater.subscribe();

    let outcome = updater.check_update(false).await.unwrap();
    let CheckOutcome::UpdateAvailable(info) = outcome else {
        panic!("expected an update, got {:?}", outcome);
    };
    assert_eq!(info.version_name(), "2.0.7");
    assert_eq!(info.features_text(), "Faster lists\nOffline cache\n");

    let pending = updater.pending_update().unwrap();
    assert_eq!(pending.build_num, 7);
    assert!(!pending.force);

    let download = updater.download_update().await.unwrap();
    assert_eq!(download.file_size, 100_000);
    assert_eq!(
        download.file_path,
        f.download_dir().join("skeleton_2.0.7.bin")
    );
    assert_eq!(std::fs::read(&download.file_path).unwrap().len(), 100_000);
    assert_eq!(file_names(&f.download_dir()), vec!["skeleton_2.0.7.bin"]);

    let events = drain(&mut rx);
    assert_eq!(events[0], UpdateEvent::CheckStarted);
    assert_eq!(
        events[1],
        UpdateEvent::UpdateAvailable {
            info: info.clone(),
            forced: false
        }
    );
    assert!(events.contains(&UpdateEvent::DownloadStarted));
    let progress: Vec<u64> = events
        .iter()
        .filter_map(|event| match event {
            UpdateEvent::DownloadProgress { current, .. } => Some(*current),
            _ => None,
        })
        .collect();
    assert!(!progress.is_empty());
    assert!(progress.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(
        events.last(),
        Some(&UpdateEvent::DownloadFinished(download.file_path.clone()))
    );
}

#[tokio::test]
async fn test_same_build_is_up_to_date() {
    let f = Fixture::new().await;
    f.serve_version(CURRENT_BUILD, 0).await;
    let updater = f.updater();

    assert_eq!(
        updater.check_update(false).await.unwrap(),
        CheckOutcome::UpToDate
    );
    assert!(updater.pending_update().is_none());
    assert_eq!(
        updater.download_update().await.unwrap_err(),
        UpdateError::NoPendingUpdate
    );
}

#[tokio::test]
async fn test_client_headers_are_sent() {
    let f = Fixture::new().await;
    Mock::given(method("GET"))
        .and(path("/version"))
        .and(header("appVersion", CURRENT_VERSION))
        .and(header("platform", "rust"))
        .respond_with(ResponseTemplate::new(200).set_body_json(f.version_doc(CURRENT_BUILD, 0)))
        .expect(1)
        .mount(&f.server)
        .await;

    assert_eq!(
        f.updater().check_update(true).await.unwrap(),
        CheckOutcome::UpToDate
    );
}

#[tokio::test]
async fn test_postponed_check_skips_server_unless_forced() {
    let f = Fixture::new().await;
    Mock::given(method("GET"))
        .and(path("/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(f.version_doc(8, 0)))
        .expect(2)
        .mount(&f.server)
        .await;
    let updater = f.updater();

    let CheckOutcome::UpdateAvailable(info) = updater.check_update(false).await.unwrap() else {
        panic!("expected an update");
    };
    let until = updater.postpone(&info).unwrap().unwrap();
    assert!(until > chrono::Utc::now() + chrono::Duration::days(2));

    assert_eq!(
        updater.check_update(false).await.unwrap(),
        CheckOutcome::Postponed(until)
    );
    // A second updater sees the same persisted date.
    assert_eq!(
        f.updater().check_update(false).await.unwrap(),
        CheckOutcome::Postponed(until)
    );

    assert!(matches!(
        updater.check_update(true).await.unwrap(),
        CheckOutcome::UpdateAvailable(_)
    ));
}

#[tokio::test]
async fn test_forced_update_cannot_be_postponed() {
    let f = Fixture::new().await;
    f.serve_version(9, 6).await;
    let updater = f.updater();
    let mut rx = updater.subscribe();

    let CheckOutcome::UpdateAvailable(info) = updater.check_update(false).await.unwrap() else {
        panic!("expected an update");
    };
    assert!(updater.pending_update().unwrap().force);
    assert!(drain(&mut rx).contains(&UpdateEvent::UpdateAvailable {
        info: info.clone(),
        forced: true
    }));

    assert_eq!(updater.postpone(&info).unwrap(), None);
    assert!(matches!(
        updater.check_update(false).await.unwrap(),
        CheckOutcome::UpdateAvailable(_)
    ));
}

#[tokio::test]
async fn test_check_server_error() {
    let f = Fixture::new().await;
    Mock::given(method("GET"))
        .and(path("/version"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&f.server)
        .await;
    let updater = f.updater();
    let mut rx = updater.subscribe();

    let err = updater.check_update(true).await.unwrap_err();

    assert_eq!(
        err,
        UpdateError::Server {
            status: 500,
            message: "boom".into()
        }
    );
    assert!(err.is_retryable());
    assert!(!updater.is_checking());
    assert!(matches!(
        drain(&mut rx).last(),
        Some(UpdateEvent::CheckFailed(_))
    ));
}

#[tokio::test]
async fn test_malformed_version_document() {
    let f = Fixture::new().await;
    Mock::given(method("GET"))
        .and(path("/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "mainVersion": "2.0" })))
        .mount(&f.server)
        .await;

    let err = f.updater().check_update(true).await.unwrap_err();

    assert!(matches!(err, UpdateError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_missing_package_keeps_pending_update() {
    let f = Fixture::new().await;
    f.serve_version(7, 0).await;
    let updater = f.updater();
    updater.check_update(false).await.unwrap();

    let err = updater.download_update().await.unwrap_err();

    assert!(matches!(err, UpdateError::Server { status: 404, .. }));
    assert!(updater.pending_update().is_some());
    assert!(!updater.is_downloading());
    assert!(!f.download_dir().exists() || file_names(&f.download_dir()).is_empty());
}

#[tokio::test]
async fn test_download_removes_older_packages() {
    let f = Fixture::new().await;
    f.serve_version(7, 0).await;
    f.serve_package(7, vec![1; 4096]).await;
    std::fs::create_dir_all(f.download_dir()).unwrap();
    std::fs::write(f.download_dir().join("skeleton_2.0.6.bin"), b"old").unwrap();
    std::fs::write(f.download_dir().join("skeleton_2.0.7.tmp"), b"partial").unwrap();
    std::fs::write(f.download_dir().join("notes.txt"), b"keep").unwrap();
    let updater = f.updater();

    updater.check_update(false).await.unwrap();
    updater.download_update().await.unwrap();

    assert_eq!(
        file_names(&f.download_dir()),
        vec!["notes.txt", "skeleton_2.0.7.bin"]
    );
}

#[tokio::test]
async fn test_check_rejected_while_downloading() {
    let f = Fixture::new().await;
    f.serve_version(7, 0).await;
    Mock::given(method("GET"))
        .and(path("/packages/skeleton-2.0.7.bin"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![2; 1024])
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&f.server)
        .await;
    let updater = f.updater();
    updater.check_update(false).await.unwrap();

    let (download, check) = tokio::join!(updater.download_update(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        updater.check_update(true).await
    });

    assert!(download.is_ok());
    assert_eq!(check.unwrap_err(), UpdateError::AlreadyRunning);
}

#[tokio::test]
async fn test_post_version_updated_clears_pending() {
    let f = Fixture::new().await;
    f.serve_version(7, 0).await;
    let updater = f.updater();

    assert_eq!(updater.post_version_updated(CURRENT_VERSION).unwrap(), None);
    updater.check_update(false).await.unwrap();
    assert_eq!(updater.post_version_updated(CURRENT_VERSION).unwrap(), None);
    assert!(updater.pending_update().is_some());

    // Next start runs the installed build.
    let updated = updater.post_version_updated("2.0.7").unwrap();

    assert_eq!(updated, Some((CURRENT_VERSION.to_string(), "2.0.7".to_string())));
    assert!(updater.pending_update().is_none());
    assert_eq!(
        updater.store().load().installed_version.as_deref(),
        Some("2.0.7")
    );
}
