// SPDX-License-Identifier: GPL-3.0-only

//! Live-view frame sources
//!
//! The feed owns its source exclusively; a failed read yields no frame and
//! the caller simply tries again. The V4L2 implementation streams YUYV at a
//! fixed resolution from the booth webcam.

use image::RgbImage;
use v4l::FourCC;
use v4l::buffer::Type;
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;
use v4l::video::capture::Parameters;
use tracing::{info, warn};

/// Produces frames for the live-view pipeline
pub trait FrameSource: Send {
    /// One frame, or None when this read failed
    fn read_frame(&mut self) -> Option<RgbImage>;
}

/// Webcam source backed by a memory-mapped V4L2 stream
pub struct V4l2Source {
    // Held so the device outlives the mmap'd buffers
    _dev: Device,
    stream: Stream<'static>,
    width: u32,
    height: u32,
}

impl V4l2Source {
    /// Open device `index` at the requested geometry.
    ///
    /// The driver may negotiate a different resolution; whatever it settles
    /// on is what `read_frame` decodes.
    pub fn open(index: usize, width: u32, height: u32, fps: u32) -> Result<Self, String> {
        let dev = Device::new(index).map_err(|e| format!("open /dev/video{}: {}", index, e))?;

        let format = v4l::Format::new(width, height, FourCC::new(b"YUYV"));
        let actual = dev
            .set_format(&format)
            .map_err(|e| format!("set YUYV format: {}", e))?;
        if &actual.fourcc.repr != b"YUYV" {
            return Err(format!("device refused YUYV, offered {}", actual.fourcc));
        }

        if let Err(e) = dev.set_params(&Parameters::with_fps(fps)) {
            warn!(fps, error = %e, "Couldn't set framerate, keeping driver default");
        }

        info!(
            index,
            width = actual.width,
            height = actual.height,
            "Live-view source configured"
        );

        let stream = Stream::with_buffers(&dev, Type::VideoCapture, 4)
            .map_err(|e| format!("create stream: {}", e))?;

        Ok(Self {
            width: actual.width,
            height: actual.height,
            _dev: dev,
            stream,
        })
    }
}

impl FrameSource for V4l2Source {
    fn read_frame(&mut self) -> Option<RgbImage> {
        let (buf, _meta) = self.stream.next().ok()?;
        yuyv_to_rgb(buf, self.width, self.height)
    }
}

/// Convert YUYV (YUV 4:2:2) to an RGB image.
///
/// YUYV: Y0 U Y1 V - each 4-byte group encodes 2 pixels. BT.601
/// coefficients. Returns None when the buffer is shorter than the
/// negotiated geometry requires.
pub fn yuyv_to_rgb(data: &[u8], width: u32, height: u32) -> Option<RgbImage> {
    let pixel_count = (width * height) as usize;
    if data.len() < pixel_count * 2 {
        return None;
    }

    let mut rgb = Vec::with_capacity(pixel_count * 3);

    for chunk in data.chunks_exact(4) {
        let y0 = chunk[0] as f32;
        let u = chunk[1] as f32 - 128.0;
        let y1 = chunk[2] as f32;
        let v = chunk[3] as f32 - 128.0;

        for y in [y0, y1] {
            let r = (y + 1.402 * v).clamp(0.0, 255.0) as u8;
            let g = (y - 0.344 * u - 0.714 * v).clamp(0.0, 255.0) as u8;
            let b = (y + 1.772 * u).clamp(0.0, 255.0) as u8;

            rgb.push(r);
            rgb.push(g);
            rgb.push(b);
        }

        if rgb.len() >= pixel_count * 3 {
            break;
        }
    }

    rgb.truncate(pixel_count * 3);
    RgbImage::from_raw(width, height, rgb)
}
