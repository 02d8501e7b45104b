// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! - Listing the attached camera
//! - Taking a single photo from the terminal
//! - Running the kiosk core headless (the touch GUI is a separate shell
//!   that consumes the same events; the terminal stands in for it here)

use photobox::camera::{self, CommandRunner, SystemRunner};
use photobox::capture::{CaptureSequencer, SequencerConfig};
use photobox::config::Config;
use photobox::constants::{
    CAMERA_RETRY_DELAY, CAPTURE_FPS, CAPTURE_HEIGHT, CAPTURE_WIDTH,
};
use photobox::events::{UiEvent, ui_channel};
use photobox::liveview::{self, LiveViewConfig, V4l2Source};
use photobox::session::SessionContext;
use photobox::storage;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Print the camera the control utility currently sees
pub fn list_camera() -> Result<(), Box<dyn std::error::Error>> {
    let runner = SystemRunner;
    match camera::detect(&runner) {
        Ok(identity) => {
            println!("Detected camera: {}", identity);
            Ok(())
        }
        Err(e) => {
            println!("No camera found ({})", e);
            Ok(())
        }
    }
}

/// Run one countdown/capture session from the terminal
pub async fn take_photo(
    countdown: Option<u32>,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();

    let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner);
    let identity = camera::detect(runner.as_ref())?;
    println!("Using camera: {}", identity);

    let ctx = Arc::new(SessionContext::new());
    ctx.set_camera(identity);

    let mut sequencer_config = SequencerConfig::from_config(&config);
    if let Some(countdown) = countdown {
        sequencer_config.countdown_start = countdown;
    }
    if let Some(dir) = output {
        sequencer_config.target_dir = storage::ensure_target_dir(&dir);
    }
    // No preview hold on the terminal
    sequencer_config.preview_duration = Duration::from_millis(1);

    let (events, mut event_rx) = ui_channel();
    let sequencer = CaptureSequencer::new(ctx, sequencer_config, events, runner);
    sequencer.request_capture();

    while let Some(event) = event_rx.recv().await {
        match event {
            UiEvent::CountdownTick(n) => println!("  {}...", n),
            UiEvent::CaptureFinished { path } => {
                println!("Photo saved: {}", path.display());
                return Ok(());
            }
            UiEvent::CaptureFailed { reason } => {
                return Err(reason.into());
            }
            _ => {}
        }
    }
    Ok(())
}

/// Run the kiosk core: camera detection, live view and the capture worker.
///
/// Enter triggers a capture, `h` + Enter is the home button, Ctrl+C exits.
pub async fn run_kiosk() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    info!(target_dir = %config.target_dir.display(), "Photobox starting");

    let ctx = Arc::new(SessionContext::new());
    let (events, mut event_rx) = ui_channel();
    let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner);

    // Camera detection retries until the booth camera appears
    tokio::spawn(camera::run_detection(
        Arc::clone(&runner),
        Arc::clone(&ctx),
        events.clone(),
        CAMERA_RETRY_DELAY,
    ));

    // Live view on its own thread
    let (frame_tx, mut frame_rx) = liveview::frame_channel();
    let live_config = LiveViewConfig {
        prompt_font: config.prompt_font.clone(),
        ..LiveViewConfig::default()
    };
    let camera_index = config.camera_index;
    let mut feed = liveview::spawn(
        "live-view",
        move || V4l2Source::open(camera_index, CAPTURE_WIDTH, CAPTURE_HEIGHT, CAPTURE_FPS),
        Arc::clone(&ctx),
        frame_tx,
        live_config,
    );

    // Headless frame sink; the GUI shell renders these instead
    tokio::spawn(async move {
        let mut frames: u64 = 0;
        while frame_rx.recv().await.is_some() {
            frames += 1;
            if frames % 250 == 0 {
                debug!(frames, "Live view running");
            }
        }
    });

    let sequencer = CaptureSequencer::new(
        Arc::clone(&ctx),
        SequencerConfig::from_config(&config),
        events.clone(),
        runner,
    );

    // Terminal stand-in for the touch controls
    let (input_tx, mut input_rx) = tokio::sync::mpsc::unbounded_channel::<String>();
    std::thread::spawn(move || {
        let mut line = String::new();
        loop {
            line.clear();
            if std::io::stdin().read_line(&mut line).is_err() {
                return;
            }
            if input_tx.send(line.trim().to_string()).is_err() {
                return;
            }
        }
    });

    let (shutdown_tx, mut shutdown_rx) = tokio::sync::mpsc::channel::<()>(1);
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.try_send(());
    })?;

    println!("{}", config.welcome_message);
    println!("Enter = capture, h = home, Ctrl+C = exit");

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            Some(line) = input_rx.recv() => match line.as_str() {
                "h" => {
                    info!("Home button pressed");
                    sequencer.cancel_preview();
                }
                _ => sequencer.request_capture(),
            },
            Some(event) = event_rx.recv() => match event {
                UiEvent::CameraReady(identity) => {
                    println!("Camera ready: {}", identity);
                }
                UiEvent::CountdownTick(n) => println!("  {}...", n),
                UiEvent::CaptureFinished { path } => {
                    println!("Photo saved: {}", path.display());
                }
                UiEvent::CaptureFailed { reason } => {
                    println!("Capture failed: {}", reason);
                }
                UiEvent::PreviewFinished => {
                    println!("Back to start screen");
                }
            },
        }
    }

    info!("Goodbye. See you next time.");
    feed.stop();
    Ok(())
}
