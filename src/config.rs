//! Persistent settings (`ridemap.json`).
//!
//! Every field has a default, so a partial or missing file is fine. CLI flags
//! are applied on top after loading.

use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::core::selector::{
    BUILD_DEFAULT_MS, DEFAULT_WINDOW_DAYS, SLIDING_DEFAULT_DAYS, SLIDING_DEFAULT_MS,
};
use crate::core::tween::Easing;
use crate::paths::{self, PathConfig};

/// Build playback parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    pub duration_ms: u64,
    /// Days before the current one kept highlighted
    pub trailing_days: usize,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            duration_ms: BUILD_DEFAULT_MS,
            trailing_days: 7,
        }
    }
}

/// Sliding window playback parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlidingWindowSettings {
    pub window_days: usize,
    pub duration_ms: u64,
}

impl Default for SlidingWindowSettings {
    fn default() -> Self {
        Self {
            window_days: SLIDING_DEFAULT_DAYS,
            duration_ms: SLIDING_DEFAULT_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Days shown at startup, counted back from the last ride
    pub initial_window_days: u64,
    /// Easing for slides that don't name one
    pub default_easing: Easing,
    /// Frame rate of the headless driver
    pub fps: u32,
    /// Minimum interval between active-ride updates
    pub active_throttle_ms: u64,
    pub build: BuildSettings,
    pub sliding_window: SlidingWindowSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            initial_window_days: DEFAULT_WINDOW_DAYS,
            default_easing: Easing::default(),
            fps: 60,
            active_throttle_ms: 100,
            build: BuildSettings::default(),
            sliding_window: SlidingWindowSettings::default(),
        }
    }
}

impl Settings {
    /// Load from `path`. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        let settings = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse settings: {}", path.display()))?;
        info!("Settings loaded from {}", path.display());
        Ok(settings)
    }

    /// Load `ridemap.json` from the resolved config directory.
    pub fn load_default(paths: &PathConfig) -> Result<Self> {
        Self::load(&paths::config_file(paths::SETTINGS_FILE, paths))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write settings: {}", path.display()))?;
        info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Save `ridemap.json` into the resolved config directory.
    pub fn save_default(&self, paths: &PathConfig) -> Result<()> {
        paths::ensure_dirs(paths)?;
        self.save(&paths::config_file(paths::SETTINGS_FILE, paths))
    }

    /// Frame interval for the configured fps (at least 1 fps).
    pub fn frame_ms(&self) -> f64 {
        1000.0 / self.fps.max(1) as f64
    }
}
