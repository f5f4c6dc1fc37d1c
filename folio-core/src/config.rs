//! Viewer configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Lowest zoom a config may allow, in percent.
pub const MIN_ZOOM_PERCENT: u32 = 50;
/// Highest zoom a config may allow, in percent.
pub const MAX_ZOOM_PERCENT: u32 = 300;

/// Zoom bounds and step, in integer percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub default_percent: u32,
    pub min_percent: u32,
    pub max_percent: u32,
    pub step_percent: u32,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            default_percent: 120,
            min_percent: MIN_ZOOM_PERCENT,
            max_percent: MAX_ZOOM_PERCENT,
            step_percent: 20,
        }
    }
}

/// When the displayed page number follows a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelPolicy {
    /// Update as soon as a render for the page starts.
    #[default]
    OnStart,
    /// Update only once the page has been drawn.
    OnDraw,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub zoom: ZoomConfig,
    pub label_policy: LabelPolicy,
    /// Prefix joined with a project's file name to form its locator.
    pub asset_prefix: String,
    /// Base URL for relative locators. Without one they are filesystem paths.
    pub base_url: Option<String>,
    pub fetch_timeout_secs: Option<u64>,
    pub download_dir: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            zoom: ZoomConfig::default(),
            label_policy: LabelPolicy::default(),
            asset_prefix: "assets/pdf".to_string(),
            base_url: None,
            fetch_timeout_secs: None,
            download_dir: None,
        }
    }
}

impl ViewerConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let zoom = &self.zoom;
        if zoom.min_percent < MIN_ZOOM_PERCENT || zoom.max_percent > MAX_ZOOM_PERCENT {
            return Err(ConfigError::Invalid(format!(
                "zoom bounds {}..={} must lie within {MIN_ZOOM_PERCENT}..={MAX_ZOOM_PERCENT}",
                zoom.min_percent, zoom.max_percent
            )));
        }
        if zoom.step_percent == 0 {
            return Err(ConfigError::Invalid("zoom.step_percent must be positive".into()));
        }
        if zoom.min_percent > zoom.default_percent || zoom.default_percent > zoom.max_percent {
            return Err(ConfigError::Invalid(format!(
                "zoom.default_percent {} must lie within {}..={}",
                zoom.default_percent, zoom.min_percent, zoom.max_percent
            )));
        }
        if let Some(base) = &self.base_url {
            reqwest::Url::parse(base)
                .map_err(|e| ConfigError::Invalid(format!("base_url {base:?}: {e}")))?;
        }
        Ok(())
    }

    /// Locator of a bundled project document, e.g. `assets/pdf/thesis.pdf`.
    pub fn asset_locator(&self, file_name: &str) -> String {
        let prefix = self.asset_prefix.trim_end_matches('/');
        if prefix.is_empty() {
            file_name.to_string()
        } else {
            format!("{prefix}/{file_name}")
        }
    }

    pub fn base_url(&self) -> Option<reqwest::Url> {
        self.base_url
            .as_deref()
            .and_then(|base| reqwest::Url::parse(base).ok())
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_secs.map(Duration::from_secs)
    }

    pub fn download_dir(&self) -> PathBuf {
        self.download_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}
