//! The update service: periodic checks, postponement, downloads and the
//! post-install bookkeeping.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::path::PathBuf;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::checker::{fetch_version_info, VersionInfo};
use super::downloader::{cleanup_old_downloads, download_path, download_to, DownloadResult};
use super::errors::UpdateError;
use super::state::{PendingUpdate, UpdateStateManager};
use crate::config::UpdaterConfig;
use crate::events::EventHub;
use crate::task::ClientInfo;
use crate::traits::HttpClient;

/// Notification sent to updater subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateEvent {
    CheckStarted,
    UpdateAvailable { info: VersionInfo, forced: bool },
    UpToDate,
    CheckFailed(String),
    DownloadStarted,
    DownloadProgress { total: u64, current: u64 },
    DownloadFinished(PathBuf),
    DownloadFailed(String),
}

/// What a call to [`VersionUpdater::check_update`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    /// The next check is postponed to a later date.
    Postponed(DateTime<Utc>),
    UpToDate,
    UpdateAvailable(VersionInfo),
}

const IDLE: u8 = 0;
const CHECKING: u8 = 1;
const DOWNLOADING: u8 = 2;

/// Returns the updater to `IDLE` on drop.
#[derive(Debug)]
struct Busy<'a>(&'a AtomicU8);

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        self.0.store(IDLE, Ordering::SeqCst);
    }
}

/// Checks for and downloads new builds.
///
/// Construct one per application and share it behind an `Arc`; nothing here
/// is global.
pub struct VersionUpdater {
    config: UpdaterConfig,
    http: Arc<dyn HttpClient>,
    store: UpdateStateManager,
    client_info: ClientInfo,
    events: EventHub<UpdateEvent>,
    /// `IDLE`, `CHECKING` or `DOWNLOADING`
    activity: AtomicU8,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl VersionUpdater {
    pub fn new(config: UpdaterConfig, http: Arc<dyn HttpClient>, store: UpdateStateManager) -> Self {
        let client_info = ClientInfo {
            app_version: config.current_version.clone(),
            ..ClientInfo::default()
        };
        Self {
            config,
            http,
            store,
            client_info,
            events: EventHub::new(),
            activity: AtomicU8::new(IDLE),
            ticker: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    pub fn store(&self) -> &UpdateStateManager {
        &self.store
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<UpdateEvent> {
        self.events.subscribe()
    }

    pub fn is_checking(&self) -> bool {
        self.activity.load(Ordering::SeqCst) == CHECKING
    }

    pub fn is_downloading(&self) -> bool {
        self.activity.load(Ordering::SeqCst) == DOWNLOADING
    }

    /// The update recorded by the last successful check, if any.
    pub fn pending_update(&self) -> Option<PendingUpdate> {
        self.store.load().pending
    }

    /// Claim the updater for `activity`; fails while anything else runs.
    fn try_begin(&self, activity: u8) -> Result<Busy<'_>, UpdateError> {
        self.activity
            .compare_exchange(IDLE, activity, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| Busy(&self.activity))
            .map_err(|_| UpdateError::AlreadyRunning)
    }

    /// Ask the server for the latest build.
    ///
    /// Unless `force` is set, nothing is fetched while the check is postponed.
    /// Fails with [`UpdateError::AlreadyRunning`] while a check or download is
    /// in progress.
    pub async fn check_update(&self, force: bool) -> Result<CheckOutcome, UpdateError> {
        if !force {
            if let Some(at) = self.store.load().next_check_at.filter(|at| *at > Utc::now()) {
                debug!(next_check_at = %at, "update check postponed");
                return Ok(CheckOutcome::Postponed(at));
            }
        }
        let _busy = self.try_begin(CHECKING)?;

        self.events.emit(UpdateEvent::CheckStarted);
        let headers = self.client_info.headers();
        let info = match fetch_version_info(self.http.as_ref(), &self.config.check_url, &headers).await {
            Ok(info) => info,
            Err(err) => {
                warn!(error = %err, "update check failed");
                self.events.emit(UpdateEvent::CheckFailed(err.to_string()));
                return Err(err);
            }
        };

        let current = self.config.current_build;
        info!(
            latest = %info.version_name(),
            current,
            force_under = info.force_update_under_build_num,
            "received latest version"
        );

        if !info.has_update(current) {
            self.events.emit(UpdateEvent::UpToDate);
            return Ok(CheckOutcome::UpToDate);
        }

        let pending = PendingUpdate::from_info(&info, current);
        let forced = pending.force;
        if let Err(err) = self.store.update(|state| state.pending = Some(pending)) {
            self.events.emit(UpdateEvent::CheckFailed(err.to_string()));
            return Err(err);
        }
        self.events.emit(UpdateEvent::UpdateAvailable {
            info: info.clone(),
            forced,
        });
        Ok(CheckOutcome::UpdateAvailable(info))
    }

    /// Skip unforced checks for the configured number of days.
    ///
    /// A forced update is never postponed; the stored date is cleared and
    /// `None` returned.
    pub fn postpone(&self, info: &VersionInfo) -> Result<Option<DateTime<Utc>>, UpdateError> {
        let next = if info.is_forced(self.config.current_build) {
            None
        } else {
            Some(Utc::now() + ChronoDuration::days(self.config.postpone_days))
        };
        self.store.update(|state| state.next_check_at = next)?;
        debug!(next_check_at = ?next, "update postponed");
        Ok(next)
    }

    /// Download the pending update to
    /// `<download_dir>/<package>_<version>.bin`.
    pub async fn download_update(&self) -> Result<DownloadResult, UpdateError> {
        let pending = self.pending_update().ok_or(UpdateError::NoPendingUpdate)?;
        let _busy = self.try_begin(DOWNLOADING)?;

        let path = download_path(
            &self.config.download_dir,
            &self.config.package_name,
            &pending.version_name(),
        );
        info!(url = %pending.url, path = %path.display(), "downloading update");
        self.events.emit(UpdateEvent::DownloadStarted);

        let events = &self.events;
        let result = download_to(
            self.http.as_ref(),
            &pending.url,
            &self.client_info.headers(),
            &path,
            |total, current| events.emit(UpdateEvent::DownloadProgress { total, current }),
        )
        .await;

        match result {
            Ok(result) => {
                if let Err(err) = cleanup_old_downloads(
                    &self.config.download_dir,
                    &self.config.package_name,
                    Some(&result.file_path),
                )
                .await
                {
                    warn!(error = %err, "could not remove old update packages");
                }
                self.events
                    .emit(UpdateEvent::DownloadFinished(result.file_path.clone()));
                Ok(result)
            }
            Err(err) => {
                warn!(error = %err, "update download failed");
                self.events.emit(UpdateEvent::DownloadFailed(err.to_string()));
                Err(err)
            }
        }
    }

    /// Record `current_version` as installed.
    ///
    /// Returns `(previous, current)` when the recorded version differs, after
    /// clearing the pending update. Call once at application start.
    pub fn post_version_updated(
        &self,
        current_version: &str,
    ) -> Result<Option<(String, String)>, UpdateError> {
        let mut updated = None;
        self.store.update(|state| {
            if let Some(previous) = state.installed_version.as_deref() {
                if previous != current_version {
                    updated = Some((previous.to_string(), current_version.to_string()));
                    state.clear_pending_update();
                }
            }
            state.installed_version = Some(current_version.to_string());
        })?;

        if let Some((old, new)) = &updated {
            info!(%old, %new, "application was updated");
        }
        Ok(updated)
    }

    /// Spawn the periodic check loop. Calling it again restarts the loop.
    pub fn start(self: &Arc<Self>) {
        let weak: Weak<Self> = Arc::downgrade(self);
        let period = self.config.check_interval;
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let Some(updater) = weak.upgrade() else {
                    break;
                };
                match updater.check_update(false).await {
                    Ok(outcome) => debug!(?outcome, "periodic update check"),
                    Err(UpdateError::AlreadyRunning) => {}
                    Err(err) => debug!(error = %err, "periodic update check failed"),
                }
            }
        });

        let previous = self
            .ticker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
        info!(interval_secs = period.as_secs(), "update checks started");
    }

    /// Stop the periodic check loop.
    pub fn stop(&self) {
        let handle = self
            .ticker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
            info!("update checks stopped");
        }
    }

    pub fn is_started(&self) -> bool {
        self.ticker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(false, |handle| !handle.is_finished())
    }
}

impl Drop for VersionUpdater {
    fn drop(&mut self) {
        self.stop();
    }
}
