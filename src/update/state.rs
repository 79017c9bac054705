//! Persisted updater state.
//!
//! Stored as JSON in `~/.skeleton/update_state.json` unless another path is
//! given.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

use super::checker::VersionInfo;
use super::errors::UpdateError;

/// The update state directory name.
const UPDATE_STATE_DIR: &str = ".skeleton";

/// The update state file name.
const UPDATE_STATE_FILE: &str = "update_state.json";

/// An update found by a check and not yet installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingUpdate {
    pub main_version: String,
    pub build_num: u32,
    pub url: String,
    pub force: bool,
}

impl PendingUpdate {
    pub fn from_info(info: &VersionInfo, current_build: u32) -> Self {
        Self {
            main_version: info.main_version.clone(),
            build_num: info.build_num,
            url: info.url.clone(),
            force: info.is_forced(current_build),
        }
    }

    pub fn version_name(&self) -> String {
        format!("{}.{}", self.main_version, self.build_num)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UpdateState {
    /// Checks before this instant are skipped unless forced.
    pub next_check_at: Option<DateTime<Utc>>,
    pub pending: Option<PendingUpdate>,
    /// Version that was running when the state was last written.
    pub installed_version: Option<String>,
}

impl UpdateState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_pending_update(&self) -> bool {
        self.pending.is_some()
    }

    pub fn clear_pending_update(&mut self) {
        self.pending = None;
    }

    /// True when an unforced check at `now` should be skipped.
    pub fn is_check_postponed(&self, now: DateTime<Utc>) -> bool {
        self.next_check_at.map_or(false, |at| at > now)
    }
}

/// Reads and writes [`UpdateState`] on disk.
#[derive(Debug, Clone)]
pub struct UpdateStateManager {
    state_path: PathBuf,
}

impl UpdateStateManager {
    /// Manager for the default location under the home directory.
    ///
    /// Returns `None` if the home directory cannot be determined.
    pub fn new() -> Option<Self> {
        let home = dirs::home_dir()?;
        Some(Self::with_path(home.join(UPDATE_STATE_DIR).join(UPDATE_STATE_FILE)))
    }

    pub fn with_path(state_path: impl Into<PathBuf>) -> Self {
        Self {
            state_path: state_path.into(),
        }
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    /// Load the state; a missing or unreadable file yields the default.
    pub fn load(&self) -> UpdateState {
        if !self.state_path.exists() {
            return UpdateState::default();
        }

        let file = match File::open(&self.state_path) {
            Ok(f) => f,
            Err(err) => {
                warn!(path = %self.state_path.display(), error = %err, "cannot open update state");
                return UpdateState::default();
            }
        };

        match serde_json::from_reader(BufReader::new(file)) {
            Ok(state) => state,
            Err(err) => {
                warn!(path = %self.state_path.display(), error = %err, "discarding corrupt update state");
                UpdateState::default()
            }
        }
    }

    /// Write the state, creating the parent directory if needed.
    pub fn save(&self, state: &UpdateState) -> Result<(), UpdateError> {
        if let Some(parent) = self.state_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)
                    .map_err(|e| UpdateError::io("create directory", parent, e))?;
            }
        }

        let file = File::create(&self.state_path)
            .map_err(|e| UpdateError::io("create", &self.state_path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, state).map_err(|e| UpdateError::Io {
            operation: "serialize".to_string(),
            path: self.state_path.clone(),
            message: e.to_string(),
        })?;
        writer
            .flush()
            .map_err(|e| UpdateError::io("write", &self.state_path, e))
    }

    /// Load, apply `f`, save. Returns the saved state.
    pub fn update(&self, f: impl FnOnce(&mut UpdateState)) -> Result<UpdateState, UpdateError> {
        let mut state = self.load();
        f(&mut state);
        self.save(&state)?;
        Ok(state)
    }

    /// Remove the state file. A missing file is not an error.
    pub fn clear(&self) -> Result<(), UpdateError> {
        if !self.state_path.exists() {
            return Ok(());
        }
        fs::remove_file(&self.state_path).map_err(|e| UpdateError::io("remove", &self.state_path, e))
    }
}
