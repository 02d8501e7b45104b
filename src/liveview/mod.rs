// SPDX-License-Identifier: GPL-3.0-only

//! Live-view feed
//!
//! A dedicated thread pulls frames from the video source for the lifetime
//! of the session and pushes processed frames to the renderer. The feed
//! only ever reads session state: while `frozen` is set it shows the last
//! captured file instead of the stream, and while a collage job is active
//! it composites the stream into the slot being lined up.

pub mod loop_control;
pub mod process;
pub mod source;

pub use loop_control::{LiveLoopController, LoopAction};
pub use source::{FrameSource, V4l2Source};

use crate::constants;
use crate::session::SessionContext;
use crate::storage;
use ab_glyph::FontArc;
use image::{DynamicImage, RgbImage, RgbaImage};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Channel carrying display-ready frames; the renderer drains it and slow
/// consumers simply drop frames.
pub type FrameSender = mpsc::Sender<Arc<RgbImage>>;
pub type FrameReceiver = mpsc::Receiver<Arc<RgbImage>>;

pub fn frame_channel() -> (FrameSender, FrameReceiver) {
    mpsc::channel(constants::FRAME_CHANNEL_DEPTH)
}

/// Feed geometry and overlay assets
#[derive(Debug, Clone)]
pub struct LiveViewConfig {
    /// Final frame size handed to the renderer
    pub display_width: u32,
    pub display_height: u32,
    /// Font for the prompt overlay; None disables prompts
    pub prompt_font: Option<PathBuf>,
}

impl Default for LiveViewConfig {
    fn default() -> Self {
        let cropped = constants::cropped_width(constants::CAPTURE_HEIGHT);
        Self {
            display_width: (cropped as f32 * constants::DISPLAY_SCALE) as u32,
            display_height: (constants::CAPTURE_HEIGHT as f32 * constants::DISPLAY_SCALE) as u32,
            prompt_font: None,
        }
    }
}

/// Progressive collage canvas: previous slots stay baked in while the
/// active slot shows the stream
struct CollageCanvas {
    template: PathBuf,
    image: RgbaImage,
}

struct FeedState<S: FrameSource> {
    source: S,
    font: Option<FontArc>,
    canvas: Option<CollageCanvas>,
    config: LiveViewConfig,
}

/// Spawn the feed thread.
///
/// `open_source` runs on the feed thread; when it fails the feed never
/// starts (the kiosk keeps running without live view). The loop runs until
/// process exit or `stop()`.
pub fn spawn<S, F>(
    name: &str,
    open_source: F,
    ctx: Arc<SessionContext>,
    frames: FrameSender,
    config: LiveViewConfig,
) -> LiveLoopController
where
    S: FrameSource + 'static,
    F: FnOnce() -> Result<S, String> + Send + 'static,
{
    LiveLoopController::start_with_init(
        name,
        move || {
            let source = open_source()?;
            let font = config.prompt_font.as_deref().and_then(|path| {
                match std::fs::read(path) {
                    Ok(bytes) => match FontArc::try_from_vec(bytes) {
                        Ok(font) => Some(font),
                        Err(e) => {
                            warn!(path = %path.display(), error = %e, "Prompt font unusable");
                            None
                        }
                    },
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Prompt font unreadable");
                        None
                    }
                }
            });
            Ok(FeedState {
                source,
                font,
                canvas: None,
                config,
            })
        },
        move |state| tick(state, &ctx, &frames),
    )
}

/// One feed iteration: read, transform, emit. Read and decode failures
/// skip the iteration - the next frame is at most 40 ms away.
fn tick<S: FrameSource>(
    state: &mut FeedState<S>,
    ctx: &SessionContext,
    frames: &FrameSender,
) -> LoopAction {
    let Some(live) = state.source.read_frame() else {
        return LoopAction::Continue;
    };

    let mut frame = if !ctx.frozen() {
        process::mirror(&process::crop_side_margins(&live))
    } else {
        let Some(path) = ctx.last_capture() else {
            return LoopAction::Continue;
        };
        let Ok(still) = image::open(&path) else {
            return LoopAction::Continue;
        };
        let mut still = still.to_rgb8();
        if storage::is_collage(&path) {
            // Collages are saved un-mirrored; pre-flip so the mirror
            // below cancels out
            still = process::mirror(&still);
        }
        process::mirror(&still)
    };

    if let Some(composited) = composite_collage(state, ctx, &frame) {
        frame = composited;
    }

    if let Some(text) = ctx.prompt()
        && let Some(font) = &state.font
    {
        process::draw_prompt(&mut frame, &text, font);
    }

    let display = process::scale_to_display(
        &frame,
        state.config.display_width,
        state.config.display_height,
    );

    match frames.try_send(Arc::new(display)) {
        Ok(()) => LoopAction::Continue,
        Err(mpsc::error::TrySendError::Full(_)) => {
            debug!("Renderer lagging, frame dropped");
            LoopAction::Continue
        }
        Err(mpsc::error::TrySendError::Closed(_)) => LoopAction::Stop,
    }
}

/// Paste the current frame into the active collage slot and return the
/// updated canvas for display. None when no collage is running.
fn composite_collage<S: FrameSource>(
    state: &mut FeedState<S>,
    ctx: &SessionContext,
    frame: &RgbImage,
) -> Option<RgbImage> {
    let (template, slot) =
        ctx.with_collage(|job| (job.template().to_path_buf(), job.current_slot().spec.clone()))?;

    let stale = state
        .canvas
        .as_ref()
        .map(|c| c.template != template)
        .unwrap_or(true);
    if stale {
        let image = match image::open(&template) {
            Ok(image) => image.to_rgba8(),
            Err(e) => {
                warn!(template = %template.display(), error = %e, "Collage template unreadable");
                return None;
            }
        };
        state.canvas = Some(CollageCanvas { template, image });
    }

    let canvas = state.canvas.as_mut()?;
    process::paste_slot_frame(&mut canvas.image, frame, &slot);
    Some(DynamicImage::ImageRgba8(canvas.image.clone()).to_rgb8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collage::{CollageJob, SlotPosition, SlotSize, SlotSpec};
    use image::Rgb;

    struct SolidSource {
        frames_left: u32,
    }

    impl FrameSource for SolidSource {
        fn read_frame(&mut self) -> Option<RgbImage> {
            if self.frames_left == 0 {
                // exhausted sources keep failing, like an unplugged webcam
                std::thread::sleep(std::time::Duration::from_millis(1));
                return None;
            }
            self.frames_left -= 1;
            Some(RgbImage::from_pixel(
                constants::CAPTURE_WIDTH,
                constants::CAPTURE_HEIGHT,
                Rgb([10, 200, 30]),
            ))
        }
    }

    fn test_config() -> LiveViewConfig {
        LiveViewConfig {
            display_width: 100,
            display_height: 60,
            prompt_font: None,
        }
    }

    #[tokio::test]
    async fn live_frames_arrive_at_display_size() {
        let ctx = Arc::new(SessionContext::new());
        let (tx, mut rx) = frame_channel();

        let mut controller = spawn(
            "test-feed",
            || {
                Ok(SolidSource {
                    frames_left: 3,
                })
            },
            Arc::clone(&ctx),
            tx,
            test_config(),
        );

        let frame = rx.recv().await.expect("frame");
        assert_eq!(frame.dimensions(), (100, 60));
        controller.stop();
    }

    #[tokio::test]
    async fn frozen_without_readable_file_emits_nothing() {
        let ctx = Arc::new(SessionContext::new());
        ctx.set_frozen(true);
        ctx.set_last_capture(PathBuf::from("/nonexistent/photobox_x.jpg"));
        let (tx, mut rx) = frame_channel();

        let mut controller = spawn(
            "test-frozen",
            || {
                Ok(SolidSource {
                    frames_left: 5,
                })
            },
            Arc::clone(&ctx),
            tx,
            test_config(),
        );

        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        controller.stop();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn collage_canvas_accumulates_on_template() {
        let dir = tempfile::tempdir().unwrap();
        let template_path = dir.path().join("strip.png");
        RgbaImage::from_pixel(200, 200, image::Rgba([0, 0, 255, 255]))
            .save(&template_path)
            .unwrap();

        let ctx = SessionContext::new();
        ctx.set_collage(CollageJob::new(
            template_path,
            vec![SlotSpec {
                id: 1,
                position: SlotPosition { x: 20, y: 30 },
                size: SlotSize {
                    width: 50,
                    height: 40,
                },
                angle: 0.0,
                offset: 0,
            }],
        ));

        let mut state = FeedState {
            source: SolidSource { frames_left: 0 },
            font: None,
            canvas: None,
            config: test_config(),
        };
        let frame = RgbImage::from_pixel(80, 60, Rgb([250, 0, 0]));

        let composited = composite_collage(&mut state, &ctx, &frame).expect("canvas");
        // slot area carries the frame, the rest stays template blue
        assert_eq!(composited.get_pixel(25, 35), &Rgb([250, 0, 0]));
        assert_eq!(composited.get_pixel(150, 150), &Rgb([0, 0, 255]));
        // canvas persists for the next iteration
        assert!(state.canvas.is_some());
    }
}
