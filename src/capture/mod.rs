// SPDX-License-Identifier: GPL-3.0-only

//! Capture sequencing
//!
//! The countdown/capture/preview state machine and its helpers.

pub mod file_wait;
pub mod preview;
pub mod sequencer;

pub use file_wait::wait_for_file;
pub use preview::PreviewTimer;
pub use sequencer::{CaptureSequencer, SequencerConfig};
