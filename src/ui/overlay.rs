// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Detection boxes drawn over the paused frame.

use crate::models::detection::DetectedObject;
use crate::util::geometry::{hit_test, overlay_regions, to_percent};

const BOX_COLOR: egui::Color32 = egui::Color32::from_rgb(239, 68, 68);

/// Draw one box per object over `frame_rect`. Returns the id of the
/// object the user clicked, if any.
pub fn show(ui: &mut egui::Ui, frame_rect: egui::Rect, objects: &[DetectedObject]) -> Option<String> {
    let regions = overlay_regions(objects);
    if regions.is_empty() {
        return None;
    }

    let response = ui.interact(
        frame_rect,
        ui.id().with("detection_overlay"),
        egui::Sense::click(),
    );
    let hovered = response
        .hover_pos()
        .map(|pos| to_percent(pos, frame_rect))
        .and_then(|(x, y)| hit_test(&regions, x, y));

    let painter = ui.painter_at(frame_rect);
    for (id, region) in &regions {
        let rect = region.to_screen(frame_rect);
        let is_hovered = hovered == Some(*id);
        let stroke_width: f32 = if is_hovered { 3.0 } else { 2.0 };
        painter.rect_stroke(rect, 0.0, egui::Stroke::new(stroke_width, BOX_COLOR));
        draw_corners(&painter, rect);
    }

    // Label for the hovered box, drawn last so it sits on top.
    if let Some((object, region)) = hovered.and_then(|id| {
        let object = objects.iter().find(|o| o.id == id)?;
        let region = regions.iter().find(|(rid, _)| *rid == id)?.1;
        Some((object, region))
    }) {
        let anchor = region.to_screen(frame_rect).left_bottom();
        let text = format!("{} ({}%)", object.label, object.confidence_percent());
        let galley = painter.layout_no_wrap(
            text,
            egui::FontId::proportional(12.0),
            egui::Color32::WHITE,
        );
        let label_rect =
            egui::Rect::from_min_size(anchor, galley.size() + egui::vec2(8.0, 4.0));
        painter.rect_filled(label_rect, 0.0, BOX_COLOR);
        painter.galley(label_rect.min + egui::vec2(4.0, 2.0), galley, egui::Color32::WHITE);
    }

    if hovered.is_some() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
    }

    if response.clicked() {
        response
            .interact_pointer_pos()
            .map(|pos| to_percent(pos, frame_rect))
            .and_then(|(x, y)| hit_test(&regions, x, y))
            .map(str::to_string)
    } else {
        None
    }
}

fn draw_corners(painter: &egui::Painter, rect: egui::Rect) {
    let len = 12.0_f32.min(rect.width() / 2.0).min(rect.height() / 2.0);
    let stroke = egui::Stroke::new(2.0, egui::Color32::WHITE);
    let tl = rect.left_top();
    let br = rect.right_bottom();
    painter.line_segment([tl, tl + egui::vec2(len, 0.0)], stroke);
    painter.line_segment([tl, tl + egui::vec2(0.0, len)], stroke);
    painter.line_segment([br, br - egui::vec2(len, 0.0)], stroke);
    painter.line_segment([br, br - egui::vec2(0.0, len)], stroke);
}
