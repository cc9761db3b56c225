// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides the mapping from detection boxes (0-1000 scale)
//! to percentage regions over the frame, and from those regions to
//! screen rectangles.

use crate::models::detection::{BoundingBox, DetectedObject};

/// A region over the frame, in percent of the frame size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayRegion {
    pub top: f32,
    pub left: f32,
    pub height: f32,
    pub width: f32,
}

impl OverlayRegion {
    pub fn from_box(bbox: &BoundingBox) -> Self {
        Self {
            top: (bbox.ymin() / 10.0) as f32,
            left: (bbox.xmin() / 10.0) as f32,
            height: ((bbox.ymax() - bbox.ymin()) / 10.0) as f32,
            width: ((bbox.xmax() - bbox.xmin()) / 10.0) as f32,
        }
    }

    /// Place the region over a frame drawn at `frame_rect`.
    pub fn to_screen(&self, frame_rect: egui::Rect) -> egui::Rect {
        let min = frame_rect.min
            + egui::vec2(
                frame_rect.width() * self.left / 100.0,
                frame_rect.height() * self.top / 100.0,
            );
        egui::Rect::from_min_size(
            min,
            egui::vec2(
                frame_rect.width() * self.width / 100.0,
                frame_rect.height() * self.height / 100.0,
            ),
        )
    }

    /// Whether a point given in percent of the frame lies inside.
    pub fn contains(&self, x_percent: f32, y_percent: f32) -> bool {
        x_percent >= self.left
            && x_percent <= self.left + self.width
            && y_percent >= self.top
            && y_percent <= self.top + self.height
    }
}

/// Regions to draw, paired with the id of the object they belong to.
pub fn overlay_regions(objects: &[DetectedObject]) -> Vec<(&str, OverlayRegion)> {
    objects
        .iter()
        .map(|o| (o.id.as_str(), OverlayRegion::from_box(&o.bbox)))
        .collect()
}

/// Object under a point (percent of frame). Later objects are drawn on
/// top, so they win.
pub fn hit_test<'a>(regions: &[(&'a str, OverlayRegion)], x_percent: f32, y_percent: f32) -> Option<&'a str> {
    regions
        .iter()
        .rev()
        .find(|(_, region)| region.contains(x_percent, y_percent))
        .map(|(id, _)| *id)
}

/// Convert a screen position to percent of `frame_rect`.
pub fn to_percent(pos: egui::Pos2, frame_rect: egui::Rect) -> (f32, f32) {
    (
        (pos.x - frame_rect.min.x) / frame_rect.width() * 100.0,
        (pos.y - frame_rect.min.y) / frame_rect.height() * 100.0,
    )
}

/// Largest rect with the frame's aspect ratio that fits in `available`,
/// centered.
pub fn fit_rect(frame_width: u32, frame_height: u32, available: egui::Rect) -> egui::Rect {
    if frame_width == 0 || frame_height == 0 {
        return available;
    }
    let frame_aspect = frame_width as f32 / frame_height as f32;
    let available_aspect = available.width() / available.height();

    let size = if frame_aspect > available_aspect {
        // Frame is wider - fit to width
        egui::vec2(available.width(), available.width() / frame_aspect)
    } else {
        // Frame is taller - fit to height
        egui::vec2(available.height() * frame_aspect, available.height())
    };
    egui::Rect::from_center_size(available.center(), size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::detection::Attributes;

    fn object(id: &str, bbox: [f64; 4]) -> DetectedObject {
        DetectedObject {
            id: id.to_string(),
            label: id.to_string(),
            confidence: 0.9,
            bbox: BoundingBox(bbox),
            attributes: Attributes::default(),
            shopping_url: String::new(),
            thumbnail_url: String::new(),
        }
    }

    #[test]
    fn test_box_to_percent() {
        let region = OverlayRegion::from_box(&BoundingBox([200.0, 100.0, 600.0, 500.0]));
        assert_eq!(
            region,
            OverlayRegion {
                top: 20.0,
                left: 10.0,
                height: 40.0,
                width: 40.0,
            }
        );
    }

    #[test]
    fn test_region_to_screen() {
        let region = OverlayRegion::from_box(&BoundingBox([200.0, 100.0, 600.0, 500.0]));
        let frame = egui::Rect::from_min_size(egui::pos2(100.0, 50.0), egui::vec2(800.0, 400.0));
        let rect = region.to_screen(frame);
        assert_eq!(rect.min, egui::pos2(180.0, 130.0));
        assert_eq!(rect.size(), egui::vec2(320.0, 160.0));
    }

    #[test]
    fn test_no_objects_no_regions() {
        assert!(overlay_regions(&[]).is_empty());
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let objects = vec![
            object("sofa", [0.0, 0.0, 1000.0, 1000.0]),
            object("watch", [400.0, 400.0, 500.0, 500.0]),
        ];
        let regions = overlay_regions(&objects);
        assert_eq!(hit_test(&regions, 45.0, 45.0), Some("watch"));
        assert_eq!(hit_test(&regions, 10.0, 90.0), Some("sofa"));

        let regions = overlay_regions(&objects[1..]);
        assert_eq!(hit_test(&regions, 10.0, 90.0), None);
    }

    #[test]
    fn test_to_percent() {
        let frame = egui::Rect::from_min_size(egui::pos2(100.0, 100.0), egui::vec2(200.0, 100.0));
        assert_eq!(to_percent(egui::pos2(150.0, 150.0), frame), (25.0, 50.0));
    }

    #[test]
    fn test_fit_rect_letterboxes() {
        let available = egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(1000.0, 1000.0));

        let wide = fit_rect(1920, 1080, available);
        assert_eq!(wide.width(), 1000.0);
        assert!((wide.height() - 562.5).abs() < 0.01);
        assert_eq!(wide.center(), available.center());

        let tall = fit_rect(1080, 1920, available);
        assert_eq!(tall.height(), 1000.0);
        assert!((tall.width() - 562.5).abs() < 0.01);
    }
}
