// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Still-frame capture.
//!
//! Turns the frame currently shown by a [`VideoSurface`] into the
//! base64 JPEG payload sent to the detection service.

use super::media::{VideoFrame, VideoSurface};
use anyhow::{Context, Result};
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;

pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// A captured frame, JPEG encoded and base64 wrapped (no data-URL header).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedFrame {
    pub width: u32,
    pub height: u32,
    pub jpeg_base64: String,
}

/// Capture the surface's current frame.
///
/// Returns `None` when nothing has been decoded yet. Encoding failures
/// are logged and also yield `None`.
pub fn capture_frame(surface: &dyn VideoSurface, quality: u8) -> Option<CapturedFrame> {
    let frame = surface.current_frame().filter(|f| !f.is_empty())?;
    match encode_frame(frame, quality) {
        Ok(captured) => Some(captured),
        Err(e) => {
            log::error!("Failed to capture frame: {:#}", e);
            None
        }
    }
}

/// JPEG-encode an RGBA frame at its native resolution.
pub fn encode_frame(frame: &VideoFrame, quality: u8) -> Result<CapturedFrame> {
    let rgba = image::RgbaImage::from_raw(frame.width, frame.height, frame.pixels.clone())
        .context("frame buffer does not match its dimensions")?;
    // JPEG has no alpha channel
    let rgb = image::DynamicImage::ImageRgba8(rgba).to_rgb8();

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100))
        .encode_image(&rgb)
        .context("failed to encode JPEG")?;

    log::debug!(
        "Captured {}x{} frame ({} bytes JPEG)",
        frame.width,
        frame.height,
        jpeg.len()
    );

    Ok(CapturedFrame {
        width: frame.width,
        height: frame.height,
        jpeg_base64: base64::engine::general_purpose::STANDARD.encode(jpeg),
    })
}
