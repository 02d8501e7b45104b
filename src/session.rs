// SPDX-License-Identifier: GPL-3.0-only

//! Shared session state
//!
//! `SessionContext` is the single handle the detector, the capture sequencer
//! and the live-view feed share. The sequencer and detector are the only
//! writers; the feed and the UI read snapshots. Holding the handle in an
//! `Arc` replaces the mutable globals of earlier photobooth builds.

use crate::collage::CollageJob;
use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Vendor + model string reported by the detection command.
///
/// Set once on first successful detection and never cleared for the rest of
/// the session; a camera swap requires a process restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraIdentity(String);

impl CameraIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Substring test used for vendor profile selection
    pub fn contains(&self, pattern: &str) -> bool {
        self.0.contains(pattern)
    }
}

impl fmt::Display for CameraIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cross-thread session state.
///
/// `frozen` gates the live-view pipeline: while set, the feed shows the last
/// captured file instead of the live stream. The feed may render one stale
/// frame after a flip; that is acceptable for a visual preview.
#[derive(Debug, Default)]
pub struct SessionContext {
    camera: Mutex<Option<CameraIdentity>>,
    frozen: AtomicBool,
    last_capture: Mutex<Option<PathBuf>>,
    collage: Mutex<Option<CollageJob>>,
    prompt: Mutex<Option<String>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the detected camera, if any
    pub fn camera(&self) -> Option<CameraIdentity> {
        self.camera.lock().unwrap().clone()
    }

    pub fn set_camera(&self, identity: CameraIdentity) {
        *self.camera.lock().unwrap() = Some(identity);
    }

    pub fn frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    pub fn set_frozen(&self, frozen: bool) {
        self.frozen.store(frozen, Ordering::Release);
    }

    /// Path of the most recent capture (photo or rendered collage)
    pub fn last_capture(&self) -> Option<PathBuf> {
        self.last_capture.lock().unwrap().clone()
    }

    pub fn set_last_capture(&self, path: PathBuf) {
        *self.last_capture.lock().unwrap() = Some(path);
    }

    /// Install a collage job; the sequencer fills its slots in order
    pub fn set_collage(&self, job: CollageJob) {
        *self.collage.lock().unwrap() = Some(job);
    }

    /// Remove and return the active collage job
    pub fn take_collage(&self) -> Option<CollageJob> {
        self.collage.lock().unwrap().take()
    }

    pub fn collage_active(&self) -> bool {
        self.collage.lock().unwrap().is_some()
    }

    /// Run `f` against the active collage job, if any
    pub fn with_collage<T>(&self, f: impl FnOnce(&mut CollageJob) -> T) -> Option<T> {
        self.collage.lock().unwrap().as_mut().map(f)
    }

    /// Text challenge shown over the live stream, if any
    pub fn prompt(&self) -> Option<String> {
        self.prompt.lock().unwrap().clone()
    }

    pub fn set_prompt(&self, text: Option<String>) {
        *self.prompt.lock().unwrap() = text;
    }
}
