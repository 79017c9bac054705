//! Version document served by the update endpoint.
//!
//! The endpoint returns JSON like:
//!
//! ```json
//! {
//!   "mainVersion": "2.4",
//!   "buildNum": 318,
//!   "url": "https://download.example.com/app-2.4.318.bin",
//!   "forceUpdateUnderBuildNum": 300,
//!   "features": ["Offline mode", "Faster sync"]
//! }
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::errors::UpdateError;
use crate::traits::{Headers, HttpClient};

/// Latest release as announced by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub main_version: String,
    pub build_num: u32,
    pub url: String,
    /// Builds below this number must update.
    #[serde(default)]
    pub force_update_under_build_num: u32,
    #[serde(default)]
    pub features: Vec<String>,
}

impl VersionInfo {
    /// `"<main_version>.<build_num>"`
    pub fn version_name(&self) -> String {
        format!("{}.{}", self.main_version, self.build_num)
    }

    /// Features, one per line.
    pub fn features_text(&self) -> String {
        self.features.iter().map(|f| format!("{}\n", f)).collect()
    }

    pub fn has_update(&self, current_build: u32) -> bool {
        self.build_num > current_build
    }

    pub fn is_forced(&self, current_build: u32) -> bool {
        current_build < self.force_update_under_build_num
    }
}

/// GET `url` and parse the version document.
pub async fn fetch_version_info(
    client: &dyn HttpClient,
    url: &str,
    headers: &Headers,
) -> Result<VersionInfo, UpdateError> {
    debug!(%url, "fetching version info");
    let response = client.get(url, headers).await?;
    if !response.is_success() {
        return Err(UpdateError::Server {
            status: response.status,
            message: response.text().unwrap_or_default(),
        });
    }
    Ok(response.json::<VersionInfo>()?)
}
