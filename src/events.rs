// SPDX-License-Identifier: GPL-3.0-only

//! Events delivered from worker contexts to the UI context
//!
//! The worker threads never touch UI state directly. Everything user-visible
//! crosses this channel; the receiving side drains it on the UI thread, which
//! is the post-to-main-thread guarantee the signal wiring used to provide.

use crate::session::CameraIdentity;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::warn;

/// Events the capture worker and camera detector emit towards the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// A camera was detected and initialized; capture controls may be enabled
    CameraReady(CameraIdentity),
    /// Countdown progress, seconds remaining (n, n-1, .., 1)
    CountdownTick(u32),
    /// The captured (or composited) file is on disk and frozen on screen
    CaptureFinished { path: PathBuf },
    /// Capture failed; the UI should reset to the home view
    CaptureFailed { reason: String },
    /// The preview hold expired without being cancelled
    PreviewFinished,
}

pub type UiReceiver = mpsc::UnboundedReceiver<UiEvent>;

/// Sending half of the UI event channel.
///
/// Cloneable; emitting after the UI receiver is gone logs and drops the
/// event instead of failing the worker.
#[derive(Debug, Clone)]
pub struct UiDispatcher {
    tx: mpsc::UnboundedSender<UiEvent>,
}

impl UiDispatcher {
    pub fn emit(&self, event: UiEvent) {
        if self.tx.send(event).is_err() {
            warn!("UI event receiver gone, event dropped");
        }
    }
}

/// Create the UI event channel
pub fn ui_channel() -> (UiDispatcher, UiReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (UiDispatcher { tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_arrive_in_order() {
        let (dispatcher, mut rx) = ui_channel();
        dispatcher.emit(UiEvent::CountdownTick(3));
        dispatcher.emit(UiEvent::CountdownTick(2));
        assert_eq!(rx.try_recv().unwrap(), UiEvent::CountdownTick(3));
        assert_eq!(rx.try_recv().unwrap(), UiEvent::CountdownTick(2));
    }

    #[test]
    fn emit_after_receiver_drop_is_silent() {
        let (dispatcher, rx) = ui_channel();
        drop(rx);
        dispatcher.emit(UiEvent::PreviewFinished);
    }
}
