// SPDX-License-Identifier: GPL-3.0-only

//! Camera auto-detection
//!
//! The control utility enumerates attached bodies as lines of
//! `<model name>   usb:<bus>,<device>`. Detection parses that output,
//! takes the first matching entry and retries on a fixed delay until a
//! camera appears; the kiosk is unattended hardware, so there is no
//! give-up path.

use super::profile;
use super::runner::CommandRunner;
use crate::constants::CAMERA_COMMAND;
use crate::errors::CameraError;
use crate::events::{UiDispatcher, UiEvent};
use crate::session::{CameraIdentity, SessionContext};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Run the enumeration command once.
///
/// Returns the first camera in the listing; `NotFound` when no line carries
/// a bus address. When several bodies are attached the first one wins;
/// the listing order is whatever the utility reports.
pub fn detect(runner: &dyn CommandRunner) -> Result<CameraIdentity, CameraError> {
    let output = runner
        .run(CAMERA_COMMAND, &["--auto-detect"])
        .map_err(|e| CameraError::CommandFailed(e.to_string()))?;

    if !output.success() {
        return Err(CameraError::CommandFailed(format!(
            "auto-detect exited with {:?}",
            output.code
        )));
    }

    match first_camera(&output.stdout) {
        Some(name) => Ok(CameraIdentity::new(name)),
        None => Err(CameraError::NotFound),
    }
}

/// Extract the first device name from the listing output.
///
/// A line matches when a `usb:<digits>,<digits>` token follows a non-empty
/// name; header and separator lines carry no bus address and fall through.
fn first_camera(listing: &str) -> Option<String> {
    listing.lines().find_map(parse_device_line)
}

fn parse_device_line(line: &str) -> Option<String> {
    let bus_start = line.find("usb:")?;
    let bus = &line[bus_start + 4..];
    let (bus, _) = bus.split_once(char::is_whitespace).unwrap_or((bus, ""));
    let (lhs, rhs) = bus.split_once(',')?;
    if lhs.is_empty() || rhs.is_empty() {
        return None;
    }
    if !lhs.bytes().all(|b| b.is_ascii_digit()) || !rhs.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let name = line[..bus_start].trim();
    if name.is_empty() {
        return None;
    }
    Some(name.to_string())
}

/// Startup detection task.
///
/// Retries `detect` on a fixed delay until a camera appears, applies the
/// vendor profile once, publishes the identity and emits `CameraReady`.
/// Runs exactly once per cold start and never gives up.
pub async fn run_detection(
    runner: Arc<dyn CommandRunner>,
    ctx: Arc<SessionContext>,
    events: UiDispatcher,
    retry_delay: Duration,
) {
    loop {
        let attempt_runner = Arc::clone(&runner);
        let result = tokio::task::spawn_blocking(move || detect(attempt_runner.as_ref())).await;

        match result {
            Ok(Ok(identity)) => {
                info!(camera = %identity, "Using camera");

                let init_runner = Arc::clone(&runner);
                let init_identity = identity.clone();
                let _ = tokio::task::spawn_blocking(move || {
                    let vendor_profile = profile::profile_for(&init_identity);
                    vendor_profile.apply(init_runner.as_ref(), &init_identity);
                })
                .await;

                ctx.set_camera(identity.clone());
                events.emit(UiEvent::CameraReady(identity));
                return;
            }
            Ok(Err(e)) => {
                warn!(error = %e, "No camera detected, trying again");
            }
            Err(e) => {
                warn!(error = %e, "Detection task failed, trying again");
            }
        }

        tokio::time::sleep(retry_delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
Model                          Port
----------------------------------------------------------
Sony Alpha-A5100 (Control)     usb:001,004
Canon EOS M3                   usb:001,007
";

    #[test]
    fn first_match_wins() {
        assert_eq!(
            first_camera(LISTING).as_deref(),
            Some("Sony Alpha-A5100 (Control)")
        );
    }

    #[test]
    fn header_lines_do_not_match() {
        let listing = "Model                          Port\n----------\n";
        assert_eq!(first_camera(listing), None);
    }

    #[test]
    fn empty_output_is_not_found() {
        assert_eq!(first_camera(""), None);
    }

    #[test]
    fn bus_address_must_be_numeric() {
        assert_eq!(parse_device_line("Weird Device usb:abc,def"), None);
        assert_eq!(parse_device_line("Weird Device usb:001,"), None);
    }

    #[test]
    fn name_required_before_bus_token() {
        assert_eq!(parse_device_line("   usb:001,004"), None);
    }

    #[test]
    fn trailing_columns_are_ignored() {
        assert_eq!(
            parse_device_line("Canon EOS M3                   usb:001,007   extra"),
            Some("Canon EOS M3".to_string())
        );
    }
}
