// SPDX-License-Identifier: GPL-3.0-only

//! Capture session state machine
//!
//! One session walks Idle -> Countdown -> Capturing -> WaitingForFile ->
//! Previewing and back to Idle; inside a collage the machine loops back to
//! Countdown for every unfilled slot without user interaction. The worker
//! owns every transition; the UI only sees `UiEvent`s.
//!
//! Hardware failures never escape: a nonzero capture exit or a file-wait
//! timeout becomes a `CaptureFailed` event and a reset to Idle.

use super::file_wait::wait_for_file;
use super::preview::PreviewTimer;
use crate::camera::profile::profile_for;
use crate::camera::runner::CommandRunner;
use crate::config::Config;
use crate::constants::{
    self, AUDIO_PLAYER, CAMERA_COMMAND, COLLAGE_SETTLE_DELAY, FILE_POLL_INTERVAL,
    FILE_WAIT_TIMEOUT,
};
use crate::errors::CaptureError;
use crate::events::{UiDispatcher, UiEvent};
use crate::session::{CameraIdentity, SessionContext};
use crate::storage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{error, info};

/// Timing and target knobs for one sequencer instance.
///
/// Everything is a plain duration so tests can compress a whole session
/// into milliseconds.
#[derive(Debug, Clone)]
pub struct SequencerConfig {
    pub countdown_start: u32,
    pub tick_interval: Duration,
    pub preview_duration: Duration,
    /// Shortened result hold between collage shots
    pub collage_preview_duration: Duration,
    pub file_poll_interval: Duration,
    pub file_wait_timeout: Duration,
    pub collage_settle_delay: Duration,
    pub countdown_sound: Option<PathBuf>,
    pub target_dir: PathBuf,
}

impl SequencerConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            countdown_start: config.countdown_seconds,
            tick_interval: Duration::from_secs(1),
            preview_duration: Duration::from_secs(config.preview_seconds),
            collage_preview_duration: Duration::from_secs(config.collage_preview_seconds),
            file_poll_interval: FILE_POLL_INTERVAL,
            file_wait_timeout: FILE_WAIT_TIMEOUT,
            collage_settle_delay: COLLAGE_SETTLE_DELAY,
            countdown_sound: config.countdown_sound.clone(),
            target_dir: storage::ensure_target_dir(&config.target_dir),
        }
    }
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            countdown_start: constants::DEFAULT_COUNTDOWN_SECONDS,
            tick_interval: Duration::from_secs(1),
            preview_duration: Duration::from_secs(constants::DEFAULT_PREVIEW_SECONDS),
            collage_preview_duration: Duration::from_secs(
                constants::DEFAULT_COLLAGE_PREVIEW_SECONDS,
            ),
            file_poll_interval: FILE_POLL_INTERVAL,
            file_wait_timeout: FILE_WAIT_TIMEOUT,
            collage_settle_delay: COLLAGE_SETTLE_DELAY,
            countdown_sound: None,
            target_dir: crate::config::default_target_dir(),
        }
    }
}

/// Capture session worker.
///
/// Exactly one session runs at a time: a request while Countdown through
/// WaitingForFile (or a collage) is active is rejected with a busy error.
/// A request during Previewing cancels the pending hold and starts over;
/// that is the recapture path. Countdown and the in-flight capture command
/// are never cancellable; a shutter cannot be un-triggered.
pub struct CaptureSequencer {
    ctx: Arc<SessionContext>,
    config: SequencerConfig,
    events: UiDispatcher,
    runner: Arc<dyn CommandRunner>,
    active: AtomicBool,
    preview: PreviewTimer,
}

impl CaptureSequencer {
    pub fn new(
        ctx: Arc<SessionContext>,
        config: SequencerConfig,
        events: UiDispatcher,
        runner: Arc<dyn CommandRunner>,
    ) -> Arc<Self> {
        Arc::new(Self {
            ctx,
            config,
            events,
            runner,
            active: AtomicBool::new(false),
            preview: PreviewTimer::new(),
        })
    }

    /// Handle the GUI's "capture requested" signal.
    ///
    /// Spawns the session task; rejection (no camera, busy) is reported
    /// through the event channel like any other capture failure.
    pub fn request_capture(self: &Arc<Self>) {
        if self.ctx.camera().is_none() {
            error!("Camera is not detected yet. Unable to take a photo");
            self.fail(CaptureError::NoCamera);
            return;
        }

        if self.active.swap(true, Ordering::AcqRel) {
            error!("Capture requested while a session is active");
            self.fail(CaptureError::Busy);
            return;
        }

        // A pending preview dies silently; the new session owns the screen
        self.preview.cancel(&self.ctx);

        let sequencer = Arc::clone(self);
        tokio::spawn(async move {
            sequencer.run_session().await;
            sequencer.active.store(false, Ordering::Release);
        });
    }

    /// Handle the GUI's "home" signal: abort a pending preview hold.
    pub fn cancel_preview(&self) {
        self.preview.cancel(&self.ctx);
    }

    async fn run_session(&self) {
        let Some(camera) = self.ctx.camera() else {
            self.fail(CaptureError::NoCamera);
            return;
        };

        self.wake_live_view(&camera).await;

        loop {
            self.countdown().await;

            let path = storage::photo_path(&self.config.target_dir);
            if let Err(e) = self.capture_image(&camera, &path).await {
                self.fail(e);
                return;
            }

            self.ctx.set_frozen(true);
            self.ctx.set_last_capture(path.clone());

            if let Err(e) = wait_for_file(
                &path,
                self.config.file_poll_interval,
                self.config.file_wait_timeout,
            )
            .await
            {
                error!(path = %path.display(), "Timeout when waiting for captured file");
                self.ctx.set_frozen(false);
                self.fail(e);
                return;
            }

            match self.ctx.with_collage(|job| job.assign_current(path.clone())) {
                None => {
                    // Single capture: freeze on the result
                    self.preview.start(
                        self.config.preview_duration,
                        Arc::clone(&self.ctx),
                        self.events.clone(),
                    );
                    self.events.emit(UiEvent::CaptureFinished { path });
                    return;
                }
                Some(false) => {
                    // Collage slot filled, more to go: short result hold,
                    // then re-arm and count down again on our own
                    info!("Collage image captured, advancing to next slot");
                    self.events.emit(UiEvent::CaptureFinished { path });
                    tokio::time::sleep(self.config.collage_preview_duration).await;
                    self.ctx.set_frozen(false);
                    self.ctx.with_collage(|job| job.advance());
                    tokio::time::sleep(self.config.collage_settle_delay).await;
                    self.wake_live_view(&camera).await;
                }
                Some(true) => {
                    self.finish_collage().await;
                    return;
                }
            }
        }
    }

    /// Emit ticks n, n-1, .., 1, then the capture cue.
    async fn countdown(&self) {
        info!(start = self.config.countdown_start, "Countdown started");
        for remaining in (1..=self.config.countdown_start).rev() {
            self.events.emit(UiEvent::CountdownTick(remaining));
            tokio::time::sleep(self.config.tick_interval).await;
        }
        if let Some(sound) = &self.config.countdown_sound {
            play_cue(sound);
        }
    }

    /// Run the capture command to completion on a blocking worker.
    async fn capture_image(
        &self,
        camera: &CameraIdentity,
        path: &Path,
    ) -> Result<(), CaptureError> {
        info!(path = %path.display(), "Capturing image");

        let profile = profile_for(camera);
        let mut args: Vec<String> = vec![
            "--filename".into(),
            path.to_string_lossy().into_owned(),
            "--capture-image-and-download".into(),
            "--force-overwrite".into(),
            "--keep".into(),
            "--camera".into(),
            camera.as_str().to_string(),
        ];
        args.extend(profile.capture_args().iter().map(|s| s.to_string()));

        let runner = Arc::clone(&self.runner);
        let output = tokio::task::spawn_blocking(move || {
            let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
            runner.run(CAMERA_COMMAND, &arg_refs)
        })
        .await
        .map_err(|e| CaptureError::CommandFailed(e.to_string()))?
        .map_err(|e| CaptureError::CommandFailed(e.to_string()))?;

        if !output.success() {
            return Err(CaptureError::CommandFailed(format!(
                "capture command exited with {:?}",
                output.code
            )));
        }
        Ok(())
    }

    /// Render the completed collage; its output becomes the frozen preview.
    async fn finish_collage(&self) {
        let Some(job) = self.ctx.take_collage() else {
            return;
        };

        info!(slots = job.slot_count(), "Collage complete, rendering");
        let output = storage::collage_path(&self.config.target_dir);

        let render_output = output.clone();
        let result =
            tokio::task::spawn_blocking(move || crate::collage::render(&job, &render_output))
                .await;

        match result {
            Ok(Ok(())) => {
                self.ctx.set_last_capture(output.clone());
                self.preview.start(
                    self.config.preview_duration,
                    Arc::clone(&self.ctx),
                    self.events.clone(),
                );
                self.events.emit(UiEvent::CaptureFinished { path: output });
            }
            Ok(Err(e)) => {
                self.ctx.set_frozen(false);
                self.events.emit(UiEvent::CaptureFailed {
                    reason: e.to_string(),
                });
            }
            Err(e) => {
                self.ctx.set_frozen(false);
                self.events.emit(UiEvent::CaptureFailed {
                    reason: format!("collage render task failed: {}", e),
                });
            }
        }
    }

    async fn wake_live_view(&self, camera: &CameraIdentity) {
        let runner = Arc::clone(&self.runner);
        let camera = camera.clone();
        let _ = tokio::task::spawn_blocking(move || {
            profile_for(&camera).wake_live_view(runner.as_ref());
        })
        .await;
    }

    fn fail(&self, error: CaptureError) {
        self.events.emit(UiEvent::CaptureFailed {
            reason: error.to_string(),
        });
    }
}

/// Fire-and-forget countdown cue. The booth keeps working without audio.
fn play_cue(sound: &Path) {
    if let Err(e) = std::process::Command::new(AUDIO_PLAYER)
        .arg(sound)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
    {
        error!(sound = %sound.display(), error = %e, "Couldn't play countdown cue");
    }
}
