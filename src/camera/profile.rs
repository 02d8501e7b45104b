// SPDX-License-Identifier: GPL-3.0-only

//! Vendor device profiles
//!
//! A profile bundles the quirks of one camera family: the configuration
//! batch applied after detection, extra flags for the capture invocation and
//! the live-view wake pulse. Selection is a substring match on the detected
//! identity; anything unrecognized gets the no-op profile and runs on
//! device defaults.

use super::runner::CommandRunner;
use crate::constants::{CAMERA_COMMAND, LIVE_VIEW_WAKE_HOLD, PROFILE_SETTLE_DELAY};
use crate::session::CameraIdentity;
use tracing::{error, info};

const SONY_ISO: &str = "320";
const SONY_SHUTTER_SPEED: &str = "1/200";
const SONY_FOCUS_MODE: &str = "Automatic";
const SONY_WHITEBALANCE_MODE: &str = "Flash";
const SONY_F_NUMBER: &str = "f/8";

/// Per-vendor capture behavior
pub trait DeviceProfile: Send + Sync {
    fn name(&self) -> &'static str;

    /// Apply the vendor configuration batch once after detection.
    ///
    /// Best effort: each key is logged independently and a failed write
    /// never aborts the remaining keys.
    fn apply(&self, _runner: &dyn CommandRunner, _camera: &CameraIdentity) {}

    /// Extra flags appended to the capture invocation
    fn capture_args(&self) -> &[&'static str] {
        &[]
    }

    /// Kick the body back into live view.
    ///
    /// Called at session start and between collage shots for bodies that
    /// drop into playback mode after a capture.
    fn wake_live_view(&self, _runner: &dyn CommandRunner) {}
}

/// Select the profile for a detected identity
pub fn profile_for(identity: &CameraIdentity) -> Box<dyn DeviceProfile> {
    if identity.contains("Sony") {
        Box::new(SonyAlphaProfile)
    } else if identity.contains("Canon") && identity.contains("M3") {
        Box::new(CanonM3Profile)
    } else {
        Box::new(DefaultProfile)
    }
}

/// Device defaults, no quirks
pub struct DefaultProfile;

impl DeviceProfile for DefaultProfile {
    fn name(&self) -> &'static str {
        "default"
    }
}

/// Sony Alpha bodies: fixed booth exposure settings.
///
/// The first command issued to a Sony body over USB is silently ignored, so
/// the ISO write is sent twice; the first pass is a disposable warm-up.
/// Each parameter write needs settle time before the next one sticks.
pub struct SonyAlphaProfile;

impl SonyAlphaProfile {
    const KEYS: [(&'static str, &'static str, &'static str); 5] = [
        ("ISO", "/main/imgsettings/iso", SONY_ISO),
        (
            "Shutter speed",
            "/main/capturesettings/shutterspeed",
            SONY_SHUTTER_SPEED,
        ),
        (
            "Focus mode",
            "/main/capturesettings/focusmode",
            SONY_FOCUS_MODE,
        ),
        (
            "Whitebalance mode",
            "/main/imgsettings/whitebalance",
            SONY_WHITEBALANCE_MODE,
        ),
        ("F-Number", "/main/imgsettings/f-number", SONY_F_NUMBER),
    ];

    fn set_config(runner: &dyn CommandRunner, camera: &CameraIdentity, key: &str, value: &str) {
        let setting = format!("{}={}", key, value);
        let args = ["--set-config", setting.as_str(), "--camera", camera.as_str()];
        match runner.run(CAMERA_COMMAND, &args) {
            Ok(output) if output.success() => {}
            Ok(output) => {
                error!(key, value, code = ?output.code, "Error applying camera setting");
            }
            Err(e) => {
                error!(key, value, error = %e, "Error applying camera setting");
            }
        }
    }
}

impl DeviceProfile for SonyAlphaProfile {
    fn name(&self) -> &'static str {
        "sony-alpha"
    }

    fn apply(&self, runner: &dyn CommandRunner, camera: &CameraIdentity) {
        info!(camera = %camera, "Sony camera detected, applying booth settings");

        // Warm-up: the first write never takes, reissue ISO below
        Self::set_config(runner, camera, "/main/imgsettings/iso", SONY_ISO);
        std::thread::sleep(PROFILE_SETTLE_DELAY);

        for (label, key, value) in Self::KEYS {
            Self::set_config(runner, camera, key, value);
            info!("{} set to {}", label, value);
            std::thread::sleep(PROFILE_SETTLE_DELAY);
        }
    }
}

/// Canon EOS M3: needs CHDK and a live-view pulse.
///
/// The body drops to picture playback on USB connect and after every shot;
/// a brief movie-capture pulse resets it to shooting mode.
pub struct CanonM3Profile;

impl DeviceProfile for CanonM3Profile {
    fn name(&self) -> &'static str {
        "canon-m3"
    }

    fn capture_args(&self) -> &[&'static str] {
        &["--set-config", "chdk=On"]
    }

    fn wake_live_view(&self, runner: &dyn CommandRunner) {
        if let Err(e) = runner.pulse(
            CAMERA_COMMAND,
            &["--capture-movie", "--stdout"],
            LIVE_VIEW_WAKE_HOLD,
        ) {
            error!(error = %e, "Live-view wake pulse failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::runner::CommandOutput;
    use std::io;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingRunner {
        calls: Mutex<Vec<Vec<String>>>,
    }

    impl CommandRunner for RecordingRunner {
        fn run(&self, _program: &str, args: &[&str]) -> io::Result<CommandOutput> {
            self.calls
                .lock()
                .unwrap()
                .push(args.iter().map(|s| s.to_string()).collect());
            Ok(CommandOutput {
                code: Some(0),
                stdout: String::new(),
            })
        }

        fn pulse(&self, _program: &str, args: &[&str], _hold: Duration) -> io::Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(args.iter().map(|s| s.to_string()).collect());
            Ok(())
        }
    }

    #[test]
    fn selection_by_identity_substring() {
        let sony = CameraIdentity::new("Sony Alpha-A5100 (Control)");
        let canon = CameraIdentity::new("Canon EOS M3");
        let other = CameraIdentity::new("Nikon DSC D3400");
        assert_eq!(profile_for(&sony).name(), "sony-alpha");
        assert_eq!(profile_for(&canon).name(), "canon-m3");
        assert_eq!(profile_for(&other).name(), "default");
    }

    #[test]
    fn sony_batch_reissues_iso_after_warmup() {
        let runner = RecordingRunner::default();
        let camera = CameraIdentity::new("Sony Alpha-A5100 (Control)");
        SonyAlphaProfile.apply(&runner, &camera);

        let calls = runner.calls.lock().unwrap();
        // warm-up + 5 keyed writes
        assert_eq!(calls.len(), 6);
        assert_eq!(calls[0][1], format!("/main/imgsettings/iso={}", SONY_ISO));
        assert_eq!(calls[1][1], format!("/main/imgsettings/iso={}", SONY_ISO));
        assert_eq!(
            calls[2][1],
            format!("/main/capturesettings/shutterspeed={}", SONY_SHUTTER_SPEED)
        );
        assert_eq!(calls[5][1], format!("/main/imgsettings/f-number={}", SONY_F_NUMBER));
        // every write is addressed to the detected body
        assert!(calls.iter().all(|c| c.contains(&camera.as_str().to_string())));
    }

    #[test]
    fn default_profile_issues_nothing() {
        let runner = RecordingRunner::default();
        let camera = CameraIdentity::new("Nikon DSC D3400");
        DefaultProfile.apply(&runner, &camera);
        assert!(runner.calls.lock().unwrap().is_empty());
        assert!(DefaultProfile.capture_args().is_empty());
    }

    #[test]
    fn canon_capture_args_enable_chdk() {
        assert_eq!(CanonM3Profile.capture_args(), ["--set-config", "chdk=On"]);
    }
}
