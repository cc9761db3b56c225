// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media file loading (images and videos).
//!
//! This module handles opening media sources and exposing them through
//! the [`VideoSurface`] trait, which the player drives once per UI frame.
//! Video decoding needs the `video-opencv` feature; still images are
//! always available and behave like a single-frame video.

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::time::Duration;

/// A decoded frame in RGBA8 layout.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl VideoFrame {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}

/// Playback capability of a loaded source.
///
/// Time is in seconds. `advance` is called with the wall-clock time since
/// the previous UI frame and returns `true` when a new frame was decoded.
pub trait VideoSurface: Send {
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, seconds: f64) -> Result<()>;
    fn is_playing(&self) -> bool;
    fn current_time(&self) -> f64;
    fn duration(&self) -> f64;
    fn advance(&mut self, elapsed: Duration) -> Result<bool>;
    fn current_frame(&self) -> Option<&VideoFrame>;
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

/// Video container extensions offered in the file dialog.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "avi", "webm", "m4v"];

/// File dialog filter covering everything that can be opened.
pub fn supported_extensions() -> Vec<&'static str> {
    IMAGE_EXTENSIONS
        .iter()
        .chain(VIDEO_EXTENSIONS.iter())
        .copied()
        .collect()
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Open a local path or direct URL as a playable surface.
pub fn open_source(source: &str) -> Result<Box<dyn VideoSurface>> {
    let path = Path::new(source);
    if is_image(path) {
        return Ok(Box::new(StillImage::open(path)?));
    }
    open_video(source)
}

#[cfg(feature = "video-opencv")]
fn open_video(source: &str) -> Result<Box<dyn VideoSurface>> {
    Ok(Box::new(opencv_video::OpencvVideo::open(source)?))
}

#[cfg(not(feature = "video-opencv"))]
fn open_video(source: &str) -> Result<Box<dyn VideoSurface>> {
    bail!(
        "cannot decode {}: video support requires the `video-opencv` feature",
        source
    )
}

/// An image file presented as a one-frame video.
pub struct StillImage {
    frame: VideoFrame,
    playing: bool,
}

impl StillImage {
    pub fn open(path: &Path) -> Result<Self> {
        let img = image::open(path)
            .with_context(|| format!("failed to open image {}", path.display()))?
            .to_rgba8();
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            bail!("image {} has no pixels", path.display());
        }
        log::info!("Loaded image: {} ({}x{})", path.display(), width, height);

        Ok(Self::from_frame(VideoFrame {
            width,
            height,
            pixels: img.into_raw(),
        }))
    }

    pub fn from_frame(frame: VideoFrame) -> Self {
        Self {
            frame,
            playing: false,
        }
    }
}

impl VideoSurface for StillImage {
    fn play(&mut self) {
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn seek(&mut self, _seconds: f64) -> Result<()> {
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn current_time(&self) -> f64 {
        0.0
    }

    fn duration(&self) -> f64 {
        0.0
    }

    fn advance(&mut self, _elapsed: Duration) -> Result<bool> {
        Ok(false)
    }

    fn current_frame(&self) -> Option<&VideoFrame> {
        Some(&self.frame)
    }
}

#[cfg(feature = "video-opencv")]
mod opencv_video {
    use super::{VideoFrame, VideoSurface};
    use anyhow::{bail, Result};
    use opencv::{core::Mat, imgproc, prelude::*, videoio};
    use std::time::Duration;

    const FALLBACK_FPS: f64 = 30.0;

    /// A video file or stream decoded with OpenCV.
    pub struct OpencvVideo {
        capture: videoio::VideoCapture,
        fps: f64,
        duration: f64,
        position: f64,
        backlog: f64,
        playing: bool,
        /// Set once the last frame has been decoded.
        ended: bool,
        frame: Option<VideoFrame>,
    }

    impl OpencvVideo {
        pub fn open(source: &str) -> Result<Self> {
            let capture = videoio::VideoCapture::from_file(source, videoio::CAP_ANY)?;
            if !capture.is_opened()? {
                bail!("could not open video {}", source);
            }

            let fps = match capture.get(videoio::CAP_PROP_FPS)? {
                fps if fps > 0.0 => fps,
                _ => FALLBACK_FPS,
            };
            let frames = capture.get(videoio::CAP_PROP_FRAME_COUNT)?.max(0.0);

            let mut video = Self {
                capture,
                fps,
                duration: frames / fps,
                position: 0.0,
                backlog: 0.0,
                playing: false,
                ended: false,
                frame: None,
            };
            video.read_next()?;

            let (width, height) = video
                .frame
                .as_ref()
                .map(|f| (f.width, f.height))
                .unwrap_or_default();
            log::info!(
                "Opened video {} ({}x{}, {:.2} fps, {:.1}s)",
                source,
                width,
                height,
                fps,
                video.duration
            );
            Ok(video)
        }

        /// Decode the next frame. Returns `false` at end of stream.
        fn read_next(&mut self) -> Result<bool> {
            let mut bgr = Mat::default();
            if !self.capture.read(&mut bgr)? || bgr.empty() {
                return Ok(false);
            }

            let mut rgba = Mat::default();
            imgproc::cvt_color(&bgr, &mut rgba, imgproc::COLOR_BGR2RGBA, 0)?;

            self.frame = Some(VideoFrame {
                width: rgba.cols() as u32,
                height: rgba.rows() as u32,
                pixels: rgba.data_bytes()?.to_vec(),
            });
            self.position = self.capture.get(videoio::CAP_PROP_POS_MSEC)? / 1000.0;
            Ok(true)
        }
    }

    impl VideoSurface for OpencvVideo {
        fn play(&mut self) {
            // Like a browser player, playing after the end starts over.
            if self.ended {
                if let Err(e) = self.seek(0.0) {
                    log::error!("Failed to rewind video: {:#}", e);
                    return;
                }
            }
            self.playing = true;
        }

        fn pause(&mut self) {
            self.playing = false;
            self.backlog = 0.0;
        }

        fn seek(&mut self, seconds: f64) -> Result<()> {
            let target = seconds.clamp(0.0, self.duration.max(0.0));
            self.capture.set(videoio::CAP_PROP_POS_MSEC, target * 1000.0)?;
            self.backlog = 0.0;
            self.ended = false;
            self.read_next()?;
            Ok(())
        }

        fn is_playing(&self) -> bool {
            self.playing
        }

        fn current_time(&self) -> f64 {
            self.position
        }

        fn duration(&self) -> f64 {
            self.duration
        }

        fn advance(&mut self, elapsed: Duration) -> Result<bool> {
            if !self.playing {
                return Ok(false);
            }

            self.backlog += elapsed.as_secs_f64();
            let step = 1.0 / self.fps;
            let mut decoded = false;
            while self.backlog >= step {
                self.backlog -= step;
                if !self.read_next()? {
                    // End of stream
                    self.playing = false;
                    self.ended = true;
                    self.backlog = 0.0;
                    break;
                }
                decoded = true;
            }
            Ok(decoded)
        }

        fn current_frame(&self) -> Option<&VideoFrame> {
            self.frame.as_ref()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_still_image_opens_with_native_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        image::RgbaImage::from_pixel(64, 48, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();

        let surface = open_source(path.to_str().unwrap()).unwrap();
        let frame = surface.current_frame().unwrap();
        assert_eq!((frame.width, frame.height), (64, 48));
        assert_eq!(frame.pixels.len(), 64 * 48 * 4);
        assert_eq!(surface.duration(), 0.0);
    }

    #[test]
    fn test_missing_image_is_an_error() {
        assert!(open_source("/definitely/not/here.png").is_err());
    }

    #[cfg(not(feature = "video-opencv"))]
    #[test]
    fn test_video_without_decoder_is_an_error() {
        let err = open_source("trailer.mp4").err().unwrap();
        assert!(err.to_string().contains("video-opencv"));
    }

    #[test]
    fn test_still_image_play_pause() {
        let mut still = StillImage::from_frame(VideoFrame {
            width: 1,
            height: 1,
            pixels: vec![0, 0, 0, 255],
        });
        still.play();
        assert!(still.is_playing());
        assert!(!still.advance(Duration::from_millis(16)).unwrap());
        still.pause();
        assert!(!still.is_playing());
    }

    #[cfg(feature = "video-opencv")]
    #[test]
    fn test_play_after_end_starts_over() {
        use opencv::{core, prelude::*, videoio};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.avi");
        let path_str = path.to_str().unwrap();

        let fourcc = videoio::VideoWriter::fourcc('M', 'J', 'P', 'G').unwrap();
        let mut writer =
            videoio::VideoWriter::new(path_str, fourcc, 10.0, core::Size::new(64, 48), true)
                .unwrap();
        for i in 0..5 {
            let frame = core::Mat::new_rows_cols_with_default(
                48,
                64,
                core::CV_8UC3,
                core::Scalar::all(40.0 * i as f64),
            )
            .unwrap();
            writer.write(&frame).unwrap();
        }
        writer.release().unwrap();

        let mut video = open_source(path_str).unwrap();
        video.play();
        video.advance(Duration::from_secs(5)).unwrap();
        assert!(!video.is_playing());

        video.play();
        assert!(video.is_playing());
        assert!(video.current_time() < 0.3);
        assert!(video.current_frame().is_some());
    }
}
