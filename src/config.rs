//! Runtime configuration.
//!
//! Use the builder methods to customize, or [`SkeletonConfig::from_env`] to
//! read overrides from the environment.
//!
//! ```ignore
//! use skeleton::config::{SkeletonConfig, UpdaterConfig};
//!
//! let config = SkeletonConfig::default()
//!     .with_page_size(20)
//!     .with_updater(UpdaterConfig::new("https://api.example.com/version"));
//! ```

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::pagination::PageConfig;

/// Default log filter when neither `SKELETON_LOG` nor `RUST_LOG` is set.
pub const DEFAULT_LOG_FILTER: &str = "skeleton=info";

/// Days an unforced update check is skipped after the user postpones.
pub const DEFAULT_POSTPONE_DAYS: i64 = 3;

/// Default period of the background update check.
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(6 * 60 * 60);

/// Settings of the [`crate::update::VersionUpdater`].
#[derive(Debug, Clone, PartialEq)]
pub struct UpdaterConfig {
    /// Endpoint returning the version document
    pub check_url: String,
    /// Where downloaded packages are written
    pub download_dir: PathBuf,
    /// File name prefix of downloaded packages
    pub package_name: String,
    /// Build number of the running application
    pub current_build: u32,
    /// Version name of the running application
    pub current_version: String,
    pub postpone_days: i64,
    pub check_interval: Duration,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            check_url: String::new(),
            download_dir: std::env::temp_dir().join("skeleton-updates"),
            package_name: env!("CARGO_PKG_NAME").to_string(),
            current_build: 0,
            current_version: env!("CARGO_PKG_VERSION").to_string(),
            postpone_days: DEFAULT_POSTPONE_DAYS,
            check_interval: DEFAULT_CHECK_INTERVAL,
        }
    }
}

impl UpdaterConfig {
    pub fn new(check_url: impl Into<String>) -> Self {
        Self {
            check_url: check_url.into(),
            ..Self::default()
        }
    }

    /// Set the running build number and version name.
    pub fn with_current_build(mut self, build: u32, version: impl Into<String>) -> Self {
        self.current_build = build;
        self.current_version = version.into();
        self
    }

    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    pub fn with_package_name(mut self, name: impl Into<String>) -> Self {
        self.package_name = name.into();
        self
    }

    pub fn with_postpone_days(mut self, days: i64) -> Self {
        self.postpone_days = days;
        self
    }

    pub fn with_check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval;
        self
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonConfig {
    /// Page sizes and end-of-data rule for paginated lists
    pub page: PageConfig,
    pub updater: UpdaterConfig,
    /// Fallback `EnvFilter` directive for [`crate::logging::init_tracing`]
    pub log_filter: String,
}

impl Default for SkeletonConfig {
    fn default() -> Self {
        Self {
            page: PageConfig::default(),
            updater: UpdaterConfig::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl SkeletonConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows requested by a fetch-more load.
    pub fn with_page_size(mut self, rows: usize) -> Self {
        self.page = self.page.with_fetch_more_rows(rows);
        self
    }

    /// Rows requested by a refresh load.
    pub fn with_refresh_size(mut self, rows: usize) -> Self {
        self.page = self.page.with_refresh_rows(rows);
        self
    }

    pub fn with_page(mut self, page: PageConfig) -> Self {
        self.page = page;
        self
    }

    pub fn with_updater(mut self, updater: UpdaterConfig) -> Self {
        self.updater = updater;
        self
    }

    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Defaults overridden by `SKELETON_PAGE_SIZE`, `SKELETON_REFRESH_SIZE`,
    /// `SKELETON_UPDATE_URL` and `SKELETON_CHECK_INTERVAL_SECS`.
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(rows) = env_parse::<usize>("SKELETON_PAGE_SIZE") {
            config = config.with_page_size(rows);
        }
        if let Some(rows) = env_parse::<usize>("SKELETON_REFRESH_SIZE") {
            config = config.with_refresh_size(rows);
        }
        if let Ok(url) = std::env::var("SKELETON_UPDATE_URL") {
            config.updater.check_url = url;
        }
        if let Some(secs) = env_parse::<u64>("SKELETON_CHECK_INTERVAL_SECS") {
            config.updater.check_interval = Duration::from_secs(secs);
        }

        config
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring invalid configuration value");
            None
        }
    }
}
