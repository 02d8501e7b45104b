// SPDX-License-Identifier: GPL-3.0-only

//! User configuration handling
//!
//! Settings persist as JSON under the user config directory. A missing file
//! is created with defaults on first start so operators can edit it on the
//! kiosk; an unreadable file falls back to defaults rather than blocking an
//! unattended boot.

use crate::constants;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Greeting shown on the start screen
    pub welcome_message: String,
    /// Directory captured photos and collages are written to
    pub target_dir: PathBuf,
    /// Countdown length in seconds
    pub countdown_seconds: u32,
    /// Preview hold after a capture, in seconds
    pub preview_seconds: u64,
    /// Shortened result hold between collage shots, in seconds
    pub collage_preview_seconds: u64,
    /// V4L2 device index of the live-view webcam
    pub camera_index: usize,
    /// Sound played on each countdown tick (None disables the cue)
    pub countdown_sound: Option<PathBuf>,
    /// Font used for the prompt overlay (None disables the overlay)
    pub prompt_font: Option<PathBuf>,
    /// Whether the collage mode is offered at all
    pub show_collage: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            welcome_message: "Willkommen zur Fotobox".to_string(),
            target_dir: default_target_dir(),
            countdown_seconds: constants::DEFAULT_COUNTDOWN_SECONDS,
            preview_seconds: constants::DEFAULT_PREVIEW_SECONDS,
            collage_preview_seconds: constants::DEFAULT_COLLAGE_PREVIEW_SECONDS,
            camera_index: constants::DEFAULT_CAMERA_INDEX,
            countdown_sound: None,
            prompt_font: None,
            show_collage: true,
        }
    }
}

impl Config {
    /// Load from the default location, creating the file with defaults when
    /// it does not exist yet.
    pub fn load_or_default() -> Self {
        let path = config_path();
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                error!(path = %path.display(), error = %e, "Falling back to default settings");
                Config::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.is_file() {
            info!(path = %path.display(), "No settings file found, creating defaults");
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("read {}: {}", path.display(), e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| AppError::Config(format!("parse {}: {}", path.display(), e)))
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Config(format!("create {}: {}", parent.display(), e)))?;
        }
        let raw = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("serialize settings: {}", e)))?;
        std::fs::write(path, raw)
            .map_err(|e| AppError::Config(format!("write {}: {}", path.display(), e)))?;
        Ok(())
    }
}

/// Location of the settings file
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("photobox")
        .join("config.json")
}

/// Directory photos land in when nothing is configured
pub fn default_target_dir() -> PathBuf {
    dirs::picture_dir()
        .map(|p| p.join("photobox"))
        .unwrap_or_else(|| PathBuf::from("data/images"))
}
