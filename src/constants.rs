// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Seconds counted down before the shutter fires
pub const DEFAULT_COUNTDOWN_SECONDS: u32 = 5;

/// How long a captured image stays frozen on screen
pub const DEFAULT_PREVIEW_SECONDS: u64 = 20;

/// Shortened result hold between collage shots
pub const DEFAULT_COLLAGE_PREVIEW_SECONDS: u64 = 1;

/// Pause between collage shots so the camera can re-arm
pub const COLLAGE_SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Interval between checks for the captured file
pub const FILE_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Overall bound on waiting for the captured file to transfer
pub const FILE_WAIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Delay between camera auto-detect attempts at startup
pub const CAMERA_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Settle time between vendor configuration writes
pub const PROFILE_SETTLE_DELAY: Duration = Duration::from_millis(500);

/// How long the live-view wake pulse holds the camera command open
pub const LIVE_VIEW_WAKE_HOLD: Duration = Duration::from_millis(100);

/// Capture resolution requested from the video source.
///
/// 840x525 is 16:10; the side margins are cropped to 3h/2 before display to
/// remove the letterboxing a 16:9 sensor adds (see `liveview::process`).
pub const CAPTURE_WIDTH: u32 = 840;
pub const CAPTURE_HEIGHT: u32 = 525;

/// Requested live-view framerate
pub const CAPTURE_FPS: u32 = 25;

/// Scale from cropped capture size to the display surface
pub const DISPLAY_SCALE: f32 = 1.6;

/// Live-view frames buffered towards the renderer before drops start
pub const FRAME_CHANNEL_DEPTH: usize = 2;

/// Prompt overlay text height in pixels
pub const PROMPT_TEXT_SCALE: f32 = 48.0;

/// Default V4L2 device index for the live-view webcam
pub const DEFAULT_CAMERA_INDEX: usize = 0;

/// The external camera control utility
pub const CAMERA_COMMAND: &str = "gphoto2";

/// Player used for the countdown cue
pub const AUDIO_PLAYER: &str = "aplay";

/// Geometry of the cropped live-view frame for a given capture height.
///
/// The stream is letterboxed 16:9; the useful region is 3h/2 wide.
pub fn cropped_width(height: u32) -> u32 {
    3 * height / 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_matches_aspect() {
        assert_eq!(cropped_width(CAPTURE_HEIGHT), 787);
        assert_eq!(cropped_width(720), 1080);
    }

    #[test]
    fn file_wait_bound_exceeds_poll_interval() {
        assert!(FILE_WAIT_TIMEOUT > FILE_POLL_INTERVAL);
    }
}
