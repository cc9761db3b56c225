// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Video timeline scrubber control.
//!
//! This module provides the timeline scrubber for navigating through
//! the video and picking the frame to scan.

const BAR_HEIGHT: f32 = 6.0;

/// Draw the timeline. Returns the time to seek to when clicked.
pub fn show(ui: &mut egui::Ui, current_time: f64, duration: f64) -> Option<f64> {
    let (rect, response) = ui.allocate_exact_size(
        egui::vec2(ui.available_width(), BAR_HEIGHT * 2.0),
        egui::Sense::click(),
    );
    let bar = egui::Rect::from_center_size(rect.center(), egui::vec2(rect.width(), BAR_HEIGHT));

    let progress = if duration > 0.0 {
        (current_time / duration).clamp(0.0, 1.0) as f32
    } else {
        0.0
    };

    let painter = ui.painter();
    let track = if response.hovered() {
        egui::Color32::from_gray(70)
    } else {
        egui::Color32::from_gray(50)
    };
    painter.rect_filled(bar, 3.0, track);
    let mut filled = bar;
    filled.set_width(bar.width() * progress);
    painter.rect_filled(filled, 3.0, egui::Color32::from_rgb(220, 38, 38));

    let mut seek = None;
    if response.clicked() && duration > 0.0 {
        if let Some(pos) = response.interact_pointer_pos() {
            seek = Some(seek_target(pos.x, bar, duration));
        }
    }

    ui.horizontal(|ui| {
        ui.label(
            egui::RichText::new(format!(
                "{} / {}",
                format_time(current_time),
                format_time(duration)
            ))
            .monospace()
            .weak(),
        );
    });

    seek
}

/// Time under horizontal position `x` on `bar`.
fn seek_target(x: f32, bar: egui::Rect, duration: f64) -> f64 {
    let fraction = ((x - bar.min.x) / bar.width()).clamp(0.0, 1.0);
    fraction as f64 * duration
}

/// Format seconds as `m:ss`.
pub fn format_time(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
