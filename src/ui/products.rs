// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Product card panel.
//!
//! This module lists every detected product as a card with its
//! confidence, attributes and a shopping link. Clicking a box in the
//! overlay highlights the matching card for a couple of seconds.

use crate::models::detection::DetectedObject;
use crate::store::AppState;
use std::collections::HashMap;
use std::time::{Duration, Instant};

pub const HIGHLIGHT_DURATION: Duration = Duration::from_secs(2);

const THUMBNAIL_SIDE: f32 = 64.0;
const ACCENT: egui::Color32 = egui::Color32::from_rgb(220, 38, 38);

/// A card highlighted after its box was clicked.
#[derive(Debug, Clone)]
pub struct Highlight {
    object_id: String,
    until: Instant,
    scrolled: bool,
}

impl Highlight {
    pub fn new(object_id: impl Into<String>, now: Instant) -> Self {
        Self {
            object_id: object_id.into(),
            until: now + HIGHLIGHT_DURATION,
            scrolled: false,
        }
    }

    pub fn is_active(&self, now: Instant) -> bool {
        now < self.until
    }
}

/// Display the product list for the current state.
pub fn show(
    ui: &mut egui::Ui,
    state: &AppState,
    thumbnails: &HashMap<String, egui::TextureHandle>,
    highlight: &mut Option<Highlight>,
    now: Instant,
) {
    ui.horizontal(|ui| {
        ui.heading("Scouted Products");
        if let Some(result) = state.result() {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("{} Items", result.objects.len()));
            });
        }
    });
    ui.separator();

    if state.is_scanning() {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.spinner();
            ui.label("Analyzing frame for products...");
        });
        return;
    }

    let Some(result) = state.result() else {
        show_idle(ui, state.pending_frame().is_some());
        return;
    };

    if highlight.as_ref().is_some_and(|h| !h.is_active(now)) {
        *highlight = None;
    }

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for object in &result.objects {
                let is_highlighted = highlight
                    .as_ref()
                    .is_some_and(|h| h.object_id == object.id);
                let response = show_card(ui, object, thumbnails.get(&object.id), is_highlighted);

                if let Some(h) = highlight.as_mut().filter(|h| h.object_id == object.id) {
                    if !h.scrolled {
                        response.scroll_to_me(Some(egui::Align::Center));
                        h.scrolled = true;
                    }
                }
                ui.add_space(8.0);
            }
        });
}

fn show_idle(ui: &mut egui::Ui, has_pending_frame: bool) {
    ui.vertical_centered(|ui| {
        ui.add_space(40.0);
        ui.label(egui::RichText::new("▶").size(32.0).weak());
        ui.label(egui::RichText::new("Scout is Idle").strong());
        let hint = if has_pending_frame {
            "Waiting for scan confirmation."
        } else {
            "Pause any video frame to identify high-quality movie gear."
        };
        ui.label(egui::RichText::new(hint).weak());
    });
}

fn show_card(
    ui: &mut egui::Ui,
    object: &DetectedObject,
    thumbnail: Option<&egui::TextureHandle>,
    highlighted: bool,
) -> egui::Response {
    let stroke = if highlighted {
        egui::Stroke::new(2.0, ACCENT)
    } else {
        egui::Stroke::new(1.0, egui::Color32::from_gray(60))
    };

    egui::Frame::group(ui.style())
        .stroke(stroke)
        .inner_margin(8.0)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                match thumbnail {
                    Some(texture) => {
                        ui.add(
                            egui::Image::new(texture)
                                .fit_to_exact_size(egui::vec2(THUMBNAIL_SIDE, THUMBNAIL_SIDE)),
                        );
                    }
                    None => {
                        let (rect, _) = ui.allocate_exact_size(
                            egui::vec2(THUMBNAIL_SIDE, THUMBNAIL_SIDE),
                            egui::Sense::hover(),
                        );
                        ui.painter().rect_filled(rect, 4.0, egui::Color32::from_gray(45));
                    }
                }

                ui.vertical(|ui| {
                    ui.label(
                        egui::RichText::new(format!("{}% MATCH", object.confidence_percent()))
                            .small()
                            .color(egui::Color32::from_rgb(34, 197, 94)),
                    );
                    ui.label(egui::RichText::new(&object.label).strong());
                    for (name, value) in object.attributes.entries() {
                        ui.label(egui::RichText::new(format!("{}: {}", name, value)).small().weak());
                    }
                    ui.hyperlink_to(
                        egui::RichText::new("Shop ↗").color(ACCENT),
                        &object.shopping_url,
                    );
                });
            });
        })
        .response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_expires_after_two_seconds() {
        let now = Instant::now();
        let highlight = Highlight::new("obj_1", now);
        assert_eq!(highlight.object_id, "obj_1");
        assert!(highlight.is_active(now + Duration::from_millis(1999)));
        assert!(!highlight.is_active(now + HIGHLIGHT_DURATION));
    }
}
