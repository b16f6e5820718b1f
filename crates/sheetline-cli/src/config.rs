//! Run settings.
//!
//! Resolution order, later wins:
//! 1. built-in defaults
//! 2. `--config <PATH>`, or `sheetline.toml` in the working directory
//! 3. `SHEETLINE_COMPLETED_DIR` / `SHEETLINE_MAX_MERGED_BYTES`
//! 4. command-line flags (applied by the caller)

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use sheetline_output::DEFAULT_MAX_MERGED_BYTES;

/// Settings file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "sheetline.toml";
pub const ENV_COMPLETED_DIR: &str = "SHEETLINE_COMPLETED_DIR";
pub const ENV_MAX_MERGED_BYTES: &str = "SHEETLINE_MAX_MERGED_BYTES";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Where converted source spreadsheets are moved.
    pub completed_dir: PathBuf,
    /// Byte ceiling for one merged file.
    pub max_merged_bytes: u64,
    pub merge_base_name: String,
    /// Output folder name under the working directory.
    pub output_dir_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            completed_dir: PathBuf::from("completed"),
            max_merged_bytes: DEFAULT_MAX_MERGED_BYTES,
            merge_base_name: "merged".to_string(),
            output_dir_name: "output".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `explicit`, or from the working directory's
    /// settings file when present, then apply environment overrides.
    pub fn load(explicit: Option<&Path>, working_dir: &Path) -> Result<Self> {
        Self::load_with_env(explicit, working_dir, |key| std::env::var(key).ok())
    }

    /// Like [`Settings::load`], reading the environment through `lookup`.
    pub fn load_with_env(
        explicit: Option<&Path>,
        working_dir: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let settings = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = working_dir.join(CONFIG_FILE_NAME);
                if path.is_file() {
                    Self::from_file(&path)?
                } else {
                    debug!("no {CONFIG_FILE_NAME} found, using defaults");
                    Self::default()
                }
            }
        };
        settings.with_env_overrides(lookup)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let settings =
            toml::from_str(&content).with_context(|| format!("parse {}", path.display()))?;
        info!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Apply environment overrides read through `lookup`.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(dir) = lookup(ENV_COMPLETED_DIR).filter(|v| !v.trim().is_empty()) {
            self.completed_dir = PathBuf::from(dir);
        }
        if let Some(bytes) = lookup(ENV_MAX_MERGED_BYTES).filter(|v| !v.trim().is_empty()) {
            self.max_merged_bytes = bytes
                .trim()
                .parse()
                .with_context(|| format!("{ENV_MAX_MERGED_BYTES} is not a byte count: {bytes}"))?;
        }
        Ok(self)
    }

    /// `completed_dir`, resolved against `working_dir` when relative.
    pub fn completed_dir_in(&self, working_dir: &Path) -> PathBuf {
        working_dir.join(&self.completed_dir)
    }
}
