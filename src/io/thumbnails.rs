// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Background thumbnail fetching for product cards.

use super::media::VideoFrame;
use anyhow::{bail, Context, Result};
use std::sync::mpsc::Sender;

/// Edge length thumbnails are scaled down to before upload.
const THUMBNAIL_SIZE: u32 = 160;

/// A fetched thumbnail, keyed by the object id it belongs to.
pub struct LoadedThumbnail {
    pub object_id: String,
    pub image: Result<VideoFrame, String>,
}

/// Decode image bytes into an RGBA frame no larger than the card slot.
pub fn decode_thumbnail(bytes: &[u8]) -> Result<VideoFrame> {
    let img = image::load_from_memory(bytes)
        .context("unsupported thumbnail format")?
        .thumbnail(THUMBNAIL_SIZE, THUMBNAIL_SIZE)
        .to_rgba8();
    let (width, height) = img.dimensions();
    Ok(VideoFrame {
        width,
        height,
        pixels: img.into_raw(),
    })
}

fn fetch(client: &reqwest::blocking::Client, url: &str) -> Result<VideoFrame> {
    let response = client.get(url).send()?;
    if !response.status().is_success() {
        bail!("thumbnail request returned {}", response.status());
    }
    decode_thumbnail(&response.bytes()?)
}

/// Fetch each `(object_id, url)` pair on one background thread.
pub fn spawn_fetch(
    requests: Vec<(String, String)>,
    sender: Sender<LoadedThumbnail>,
    wake: impl Fn() + Send + 'static,
) {
    std::thread::spawn(move || {
        let client = match reqwest::blocking::Client::builder().build() {
            Ok(client) => client,
            Err(e) => {
                log::error!("Failed to build thumbnail client: {}", e);
                return;
            }
        };
        for (object_id, url) in requests {
            let image = fetch(&client, &url).map_err(|e| format!("{:#}", e));
            if let Err(ref e) = image {
                log::warn!("Failed to load thumbnail {}: {}", url, e);
            }
            if sender.send(LoadedThumbnail { object_id, image }).is_err() {
                // Results were replaced; stop fetching for them.
                return;
            }
            wake();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_decode_scales_down() {
        let mut png = Vec::new();
        image::RgbaImage::from_pixel(300, 150, image::Rgba([200, 0, 0, 255]))
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let frame = decode_thumbnail(&png).unwrap();
        assert_eq!((frame.width, frame.height), (160, 80));
        assert_eq!(frame.pixels.len(), 160 * 80 * 4);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_thumbnail(b"not an image").is_err());
    }
}
