use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::viewer::RetentionPolicy;

#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub viewer: ViewerConfig,
    pub search: SearchConfig,
    pub log: LogConfig,
    pub documents: Vec<DocumentConfig>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RetentionMode {
    SlidingWindow,
    AccumulateOnly,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewerConfig {
    pub buffer_radius: usize,
    pub retention: RetentionMode,
    pub eviction_radius: usize,
    pub visibility_threshold: f32,
    pub debounce_ms: u64,
    pub settle_delay_ms: u64,
    pub initial_settle_delay_ms: u64,
    pub page_gap: f32,
    pub tick_ms: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            buffer_radius: 2,
            retention: RetentionMode::SlidingWindow,
            eviction_radius: 6,
            visibility_threshold: 0.5,
            debounce_ms: 150,
            settle_delay_ms: 1000,
            initial_settle_delay_ms: 2000,
            page_gap: 16.0,
            tick_ms: 16,
        }
    }
}

impl ViewerConfig {
    pub fn retention_policy(&self) -> RetentionPolicy {
        match self.retention {
            RetentionMode::AccumulateOnly => RetentionPolicy::AccumulateOnly,
            RetentionMode::SlidingWindow => RetentionPolicy::SlidingWindow {
                eviction_radius: self.eviction_radius,
            },
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn initial_settle_delay(&self) -> Duration {
        Duration::from_millis(self.initial_settle_delay_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct SearchConfig {
    pub case_sensitive: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    pub filter: String,
    pub path: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
            path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DocumentConfig {
    pub name: String,
    pub location: PathBuf,
    #[serde(default)]
    pub title: Option<String>,
}

impl Config {
    pub fn load() -> AppResult<Self> {
        let Some(path) = default_config_path() else {
            return Ok(Self::default());
        };
        Self::load_from_path(path)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        if !path.is_file() {
            return Err(AppError::invalid_argument(format!(
                "config path is not a regular file: {}",
                path.display()
            )));
        }

        let raw = fs::read_to_string(path).map_err(|source| {
            AppError::io_with_context(source, format!("failed to read config: {}", path.display()))
        })?;
        let mut parsed = Self::parse(&raw).map_err(|err| {
            AppError::invalid_argument(format!("failed to parse config {}: {err}", path.display()))
        })?;

        // Relative document locations are anchored at the config file.
        if let Some(base) = path.parent() {
            for document in &mut parsed.documents {
                if document.location.is_relative() {
                    document.location = base.join(&document.location);
                }
            }
        }
        Ok(parsed)
    }

    pub fn parse(raw: &str) -> AppResult<Self> {
        let parsed = toml::from_str::<Self>(raw)
            .map_err(|source| AppError::invalid_argument(source.to_string()))?;
        Ok(parsed.sanitized())
    }

    fn sanitized(mut self) -> Self {
        let defaults = ViewerConfig::default();
        let viewer = &mut self.viewer;
        viewer.debounce_ms = viewer.debounce_ms.max(1);
        viewer.settle_delay_ms = viewer.settle_delay_ms.max(1);
        viewer.initial_settle_delay_ms = viewer.initial_settle_delay_ms.max(viewer.settle_delay_ms);
        viewer.tick_ms = viewer.tick_ms.max(1);
        viewer.eviction_radius = viewer.eviction_radius.max(viewer.buffer_radius);
        if !viewer.visibility_threshold.is_finite()
            || viewer.visibility_threshold <= 0.0
            || viewer.visibility_threshold > 1.0
        {
            viewer.visibility_threshold = defaults.visibility_threshold;
        }
        if !viewer.page_gap.is_finite() || viewer.page_gap < 0.0 {
            viewer.page_gap = defaults.page_gap;
        }
        if self.log.filter.trim().is_empty() {
            self.log.filter = LogConfig::default().filter;
        }
        self
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    if let Some(explicit) = std::env::var_os("PAGELINK_CONFIG_PATH")
        && !explicit.is_empty()
    {
        return Some(PathBuf::from(explicit));
    }

    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME")
        && !xdg.is_empty()
    {
        return Some(PathBuf::from(xdg).join("pagelink").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME")
        && !home.is_empty()
    {
        return Some(
            PathBuf::from(home)
                .join(".config")
                .join("pagelink")
                .join("config.toml"),
        );
    }
    if let Some(appdata) = std::env::var_os("APPDATA")
        && !appdata.is_empty()
    {
        return Some(PathBuf::from(appdata).join("pagelink").join("config.toml"));
    }
    None
}
