//! Application self-update.
//!
//! [`VersionUpdater`] asks a version endpoint for the latest build, records
//! a pending update when the server has a newer one, and downloads it on
//! request. State survives restarts through [`UpdateStateManager`]. There is
//! no global instance; the application owns the updater and injects its
//! collaborators.
//!
//! ```ignore
//! use std::sync::Arc;
//! use skeleton::config::UpdaterConfig;
//! use skeleton::update::{CheckOutcome, UpdateStateManager, VersionUpdater};
//!
//! let updater = Arc::new(VersionUpdater::new(config, http, UpdateStateManager::with_path(path)));
//! if let CheckOutcome::UpdateAvailable(info) = updater.check_update(false).await? {
//!     println!("{} is available:\n{}", info.version_name(), info.features_text());
//!     updater.download_update().await?;
//! }
//! ```

mod checker;
mod downloader;
pub mod errors;
mod service;
pub mod state;

pub use checker::{fetch_version_info, VersionInfo};
pub use downloader::{
    cleanup_old_downloads, download_path, download_to, DownloadResult, ProgressThrottle,
};
pub use errors::UpdateError;
pub use service::{CheckOutcome, UpdateEvent, VersionUpdater};
pub use state::{PendingUpdate, UpdateState, UpdateStateManager};
