// SPDX-License-Identifier: GPL-3.0-only

//! Bounded wait for the captured file
//!
//! The capture command returns before the image finished transferring from
//! the camera, so the sequencer polls for the file. The wait is a plain
//! future: the timeout bounds it and dropping it cancels it.

use crate::errors::CaptureError;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Poll until `path` exists, at `interval`, giving up after `timeout`.
pub async fn wait_for_file(
    path: &Path,
    interval: Duration,
    timeout: Duration,
) -> Result<(), CaptureError> {
    info!(path = %path.display(), "Waiting for file to be present");

    let poll = async {
        loop {
            if tokio::fs::try_exists(path).await.unwrap_or(false) {
                return;
            }
            tokio::time::sleep(interval).await;
        }
    };

    tokio::time::timeout(timeout, poll)
        .await
        .map_err(|_| CaptureError::FileTimeout(path.to_path_buf()))
}
