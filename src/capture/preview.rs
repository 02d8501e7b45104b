// SPDX-License-Identifier: GPL-3.0-only

//! Cancellable preview hold
//!
//! After a capture the screen stays frozen on the result for a configured
//! duration. The hold is an abortable task: expiry unfreezes and announces
//! `PreviewFinished`, cancellation (home button) unfreezes immediately and
//! announces nothing.

use crate::events::{UiDispatcher, UiEvent};
use crate::session::SessionContext;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

#[derive(Debug, Default)]
pub struct PreviewTimer {
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl PreviewTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) the hold. A still-pending previous hold is
    /// aborted without firing.
    pub fn start(&self, duration: Duration, ctx: Arc<SessionContext>, events: UiDispatcher) {
        let mut guard = self.handle.lock().unwrap();
        if let Some(previous) = guard.take() {
            previous.abort();
        }

        *guard = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            ctx.set_frozen(false);
            info!("Preview time finished, returning to start screen");
            events.emit(UiEvent::PreviewFinished);
        }));
    }

    /// Abort a pending hold and unfreeze. Safe to call when nothing is
    /// pending; `PreviewFinished` is never emitted for a cancelled hold.
    pub fn cancel(&self, ctx: &SessionContext) {
        if let Some(handle) = self.handle.lock().unwrap().take() {
            handle.abort();
        }
        ctx.set_frozen(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ui_channel;

    #[tokio::test]
    async fn expiry_unfreezes_and_announces() {
        let ctx = Arc::new(SessionContext::new());
        let (dispatcher, mut rx) = ui_channel();
        let timer = PreviewTimer::new();

        ctx.set_frozen(true);
        timer.start(Duration::from_millis(20), Arc::clone(&ctx), dispatcher);

        let event = rx.recv().await.unwrap();
        assert_eq!(event, UiEvent::PreviewFinished);
        assert!(!ctx.frozen());
    }

    #[tokio::test]
    async fn cancel_unfreezes_without_announcing() {
        let ctx = Arc::new(SessionContext::new());
        let (dispatcher, mut rx) = ui_channel();
        let timer = PreviewTimer::new();

        ctx.set_frozen(true);
        timer.start(Duration::from_millis(50), Arc::clone(&ctx), dispatcher);
        timer.cancel(&ctx);

        assert!(!ctx.frozen());
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn restart_aborts_previous_hold() {
        let ctx = Arc::new(SessionContext::new());
        let (dispatcher, mut rx) = ui_channel();
        let timer = PreviewTimer::new();

        ctx.set_frozen(true);
        timer.start(Duration::from_millis(30), Arc::clone(&ctx), dispatcher.clone());
        timer.start(Duration::from_millis(60), Arc::clone(&ctx), dispatcher);

        let event = rx.recv().await.unwrap();
        assert_eq!(event, UiEvent::PreviewFinished);
        // only the second hold fired
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(rx.try_recv().is_err());
    }
}
