// SPDX-License-Identifier: GPL-3.0-only

//! Target paths and directories for captured files

use crate::config;
use std::path::{Path, PathBuf};
use tracing::error;

/// Timestamped target path for a single capture.
///
/// Two captures within the same second collide; the capture command runs
/// with force-overwrite so the later shot wins.
pub fn photo_path(target_dir: &Path) -> PathBuf {
    let timestamp = chrono::Local::now().format("%m%d%Y_%H%M%S");
    target_dir.join(format!("photobox_{}.jpg", timestamp))
}

/// Timestamped target path for a rendered collage.
///
/// The `collage_` prefix is what the live-view feed keys on to decide the
/// double-flip treatment of frozen frames.
pub fn collage_path(target_dir: &Path) -> PathBuf {
    let timestamp = chrono::Local::now().format("%m%d%Y_%H%M%S");
    target_dir.join(format!("collage_{}.jpg", timestamp))
}

/// True when `path` names a rendered collage rather than a raw capture
pub fn is_collage(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with("collage_"))
        .unwrap_or(false)
}

/// Make sure the target directory exists, falling back to the default
/// directory when the configured one cannot be created.
pub fn ensure_target_dir(configured: &Path) -> PathBuf {
    if std::fs::create_dir_all(configured).is_ok() {
        return configured.to_path_buf();
    }

    let fallback = config::default_target_dir();
    error!(
        configured = %configured.display(),
        fallback = %fallback.display(),
        "Couldn't create target directory, using default instead"
    );
    if let Err(e) = std::fs::create_dir_all(&fallback) {
        error!(path = %fallback.display(), error = %e, "Couldn't create fallback directory");
    }
    fallback
}
