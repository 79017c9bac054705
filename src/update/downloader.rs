//! Streaming download of update packages.
//!
//! The body is written to `<file>.tmp` chunk by chunk and renamed into place
//! once complete, so a half-written package never sits at the final path.

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::errors::UpdateError;
use crate::traits::{Headers, HttpClient};

/// Share of the total that must arrive before the next progress report.
const PROGRESS_STEP: f64 = 0.02;

/// Result of a successful download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    pub file_path: PathBuf,
    pub file_size: u64,
}

/// `<dir>/<package>_<version>.bin`
pub fn download_path(dir: &Path, package: &str, version: &str) -> PathBuf {
    dir.join(format!("{}_{}.bin", package, version))
}

/// Drops progress reports until at least 2% of the total has arrived since
/// the last one.
#[derive(Debug, Default)]
pub struct ProgressThrottle {
    previous: u64,
}

impl ProgressThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `(total, current)` should be reported. With an unknown
    /// total every report passes.
    pub fn should_report(&mut self, total: u64, current: u64) -> bool {
        if total == 0 || current.saturating_sub(self.previous) as f64 > total as f64 * PROGRESS_STEP
        {
            self.previous = current;
            true
        } else {
            false
        }
    }
}

/// Stream `url` into `path`, calling `on_progress(total, current)` for
/// throttled progress steps.
pub async fn download_to(
    client: &dyn HttpClient,
    url: &str,
    headers: &Headers,
    path: &Path,
    mut on_progress: impl FnMut(u64, u64) + Send,
) -> Result<DownloadResult, UpdateError> {
    let response = client.get_stream(url, headers).await?;
    let total = response.content_length.unwrap_or(0);
    debug!(%url, total, "download started");

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| UpdateError::io("create directory", parent, e))?;
    }

    let temp_path = path.with_extension("tmp");
    let mut file = tokio::fs::File::create(&temp_path)
        .await
        .map_err(|e| UpdateError::io("create", &temp_path, e))?;

    let mut throttle = ProgressThrottle::new();
    let mut current = 0u64;
    let mut body = response.body;
    while let Some(chunk) = body.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(err) => {
                drop(file);
                let _ = tokio::fs::remove_file(&temp_path).await;
                return Err(err.into());
            }
        };
        file.write_all(&chunk)
            .await
            .map_err(|e| UpdateError::io("write", &temp_path, e))?;
        current += chunk.len() as u64;
        if throttle.should_report(total, current) {
            on_progress(total, current);
        }
    }

    file.flush()
        .await
        .map_err(|e| UpdateError::io("write", &temp_path, e))?;
    drop(file);

    if current == 0 {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(UpdateError::EmptyDownload);
    }

    tokio::fs::rename(&temp_path, path)
        .await
        .map_err(|e| UpdateError::io("rename", path, e))?;

    info!(path = %path.display(), bytes = current, "download finished");
    Ok(DownloadResult {
        file_path: path.to_path_buf(),
        file_size: current,
    })
}

/// Remove earlier packages of `package` from `dir`, keeping `keep`.
pub async fn cleanup_old_downloads(
    dir: &Path,
    package: &str,
    keep: Option<&Path>,
) -> Result<usize, UpdateError> {
    if !dir.exists() {
        return Ok(0);
    }

    let prefix = format!("{}_", package);
    let mut removed = 0;
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| UpdateError::io("read directory", dir, e))?;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| UpdateError::io("read directory", dir, e))?
    {
        let path = entry.path();
        if Some(path.as_path()) == keep {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(&prefix) && (name.ends_with(".bin") || name.ends_with(".tmp"))
            && tokio::fs::remove_file(&path).await.is_ok()
        {
            removed += 1;
        }
    }
    Ok(removed)
}
