// SPDX-License-Identifier: GPL-3.0-only

//! Thread lifecycle for the live-view loop
//!
//! The feed runs on a dedicated thread for the whole session. The
//! controller owns the stop signal and the join handle so shutdown is a
//! single call instead of a dangling thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Action returned by each loop iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopAction {
    /// Keep running
    Continue,
    /// Leave the loop gracefully
    Stop,
}

/// Controller for a feed loop running in a separate thread
pub struct LiveLoopController {
    thread_handle: Option<JoinHandle<()>>,
    stop_signal: Arc<AtomicBool>,
    name: String,
}

impl LiveLoopController {
    /// Start a loop whose state comes from an initialization step.
    ///
    /// `init_fn` runs once on the new thread (opening the video source);
    /// when it fails the thread exits immediately and the failure is
    /// logged. `loop_fn` then runs repeatedly with the state until it
    /// returns `LoopAction::Stop` or `stop()` is called.
    pub fn start_with_init<S, I, F>(name: &str, init_fn: I, mut loop_fn: F) -> Self
    where
        S: Send + 'static,
        I: FnOnce() -> Result<S, String> + Send + 'static,
        F: FnMut(&mut S) -> LoopAction + Send + 'static,
    {
        let stop_signal = Arc::new(AtomicBool::new(false));
        let stop_signal_clone = Arc::clone(&stop_signal);
        let name_clone = name.to_string();

        info!(name = %name, "Starting feed loop");

        let thread_handle = thread::spawn(move || {
            let mut state = match init_fn() {
                Ok(s) => s,
                Err(e) => {
                    warn!(name = %name_clone, error = %e, "Feed initialization failed");
                    return;
                }
            };

            loop {
                if stop_signal_clone.load(Ordering::SeqCst) {
                    debug!(name = %name_clone, "Stop signal received");
                    break;
                }

                match loop_fn(&mut state) {
                    LoopAction::Continue => {}
                    LoopAction::Stop => {
                        debug!(name = %name_clone, "Loop requested stop");
                        break;
                    }
                }
            }

            info!(name = %name_clone, "Feed loop thread exiting");
        });

        Self {
            thread_handle: Some(thread_handle),
            stop_signal,
            name: name.to_string(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Set the stop signal without waiting
    pub fn request_stop(&self) {
        self.stop_signal.store(true, Ordering::SeqCst);
    }

    /// Stop the loop and wait for the thread to finish
    pub fn stop(&mut self) {
        self.request_stop();
        self.join();
    }

    /// Wait for the thread without signalling it
    pub fn join(&mut self) {
        if let Some(handle) = self.thread_handle.take()
            && let Err(e) = handle.join()
        {
            warn!(name = %self.name, "Feed loop thread panicked: {:?}", e);
        }
    }
}

impl Drop for LiveLoopController {
    fn drop(&mut self) {
        if self.thread_handle.is_some() {
            self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::time::Duration;

    #[test]
    fn loop_stops_itself() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = Arc::clone(&counter);

        let mut controller = LiveLoopController::start_with_init(
            "test-loop",
            || Ok(()),
            move |_: &mut ()| {
                if counter_clone.fetch_add(1, Ordering::SeqCst) >= 10 {
                    LoopAction::Stop
                } else {
                    LoopAction::Continue
                }
            },
        );

        controller.join();
        assert_eq!(counter.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn stop_signal_ends_loop() {
        let mut controller = LiveLoopController::start_with_init(
            "test-signal",
            || Ok(()),
            move |_: &mut ()| {
                thread::sleep(Duration::from_millis(5));
                LoopAction::Continue
            },
        );

        assert!(controller.is_running());
        controller.stop();
        assert!(!controller.is_running());
    }

    #[test]
    fn failed_init_never_runs_loop() {
        let ran = Arc::new(AtomicBool::new(false));
        let ran_clone = Arc::clone(&ran);

        let mut controller = LiveLoopController::start_with_init(
            "test-fail",
            || Err::<(), _>("no device".to_string()),
            move |_: &mut ()| {
                ran_clone.store(true, Ordering::SeqCst);
                LoopAction::Stop
            },
        );

        controller.join();
        assert!(!ran.load(Ordering::SeqCst));
    }
}
