// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Video player area.
//!
//! This module draws the current frame letterboxed into the central
//! panel, the detection overlay on top of it, the scan prompt and
//! progress indicator, and the playback controls underneath.

use super::{overlay, timeline};
use crate::store::AppState;
use crate::util::geometry::fit_rect;

const CONTROLS_HEIGHT: f32 = 72.0;
const ACCENT: egui::Color32 = egui::Color32::from_rgb(220, 38, 38);

/// Snapshot of the surface's playback position.
#[derive(Debug, Clone, Copy)]
pub struct Playback {
    pub is_playing: bool,
    pub current_time: f64,
    pub duration: f64,
}

/// Everything the player needs to draw one frame.
pub struct PlayerView<'a> {
    pub state: &'a AppState,
    pub texture: Option<&'a egui::TextureHandle>,
    pub frame_size: Option<(u32, u32)>,
    pub playback: Option<Playback>,
    pub loading: Option<&'a str>,
}

/// Result of player interaction.
pub enum PlayerAction {
    None,
    TogglePlay,
    Restart,
    Seek(f64),
    SelectObject(String),
    DismissScan,
    ConfirmScan,
}

/// Display the player and handle its controls.
pub fn show(ui: &mut egui::Ui, view: &PlayerView) -> PlayerAction {
    let mut action = PlayerAction::None;

    let video_size = egui::vec2(
        ui.available_width(),
        (ui.available_height() - CONTROLS_HEIGHT).max(120.0),
    );
    let (video_rect, _) = ui.allocate_exact_size(video_size, egui::Sense::hover());
    ui.painter().rect_filled(video_rect, 8.0, egui::Color32::BLACK);

    if let Some(message) = view.loading {
        centered_message(ui, video_rect, |ui| {
            ui.spinner();
            ui.label(message);
        });
        return action;
    }

    let Some(ref video) = view.state.video else {
        centered_message(ui, video_rect, |ui| {
            ui.label(egui::RichText::new("The Cinema Awaits").size(24.0).italics());
            ui.label(
                egui::RichText::new("Open a local file or enter a YouTube link")
                    .color(egui::Color32::from_gray(130)),
            );
        });
        return action;
    };

    if let Some(embed_url) = video.embed_url() {
        centered_message(ui, video_rect, |ui| {
            ui.label(egui::RichText::new("● YOUTUBE STREAM").strong().color(ACCENT));
            ui.add_space(8.0);
            ui.hyperlink_to("Open video in browser", embed_url);
            ui.label(
                egui::RichText::new("Frame scanning needs a local file or direct video URL")
                    .small()
                    .weak(),
            );
        });
        return action;
    }

    if let (Some(texture), Some((width, height))) = (view.texture, view.frame_size) {
        let frame_rect = fit_rect(width, height, video_rect);
        ui.painter().image(
            texture.id(),
            frame_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        if let Some(id) = overlay::show(ui, frame_rect, view.state.overlay_objects()) {
            action = PlayerAction::SelectObject(id);
        }
    }

    if view.state.pending_frame().is_some() {
        floating(ui, "scan_prompt", video_rect.center(), |ui| {
            egui::Frame::popup(ui.style())
                .stroke(egui::Stroke::new(1.0, ACCENT))
                .inner_margin(16.0)
                .show(ui, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.heading("Detect Objects?");
                        ui.label(
                            egui::RichText::new(
                                "Scan this frame for clothing, gadgets, and furniture.",
                            )
                            .weak(),
                        );
                        ui.add_space(8.0);
                        ui.horizontal(|ui| {
                            if ui.button("Dismiss").clicked() {
                                action = PlayerAction::DismissScan;
                            }
                            let scan = egui::Button::new(egui::RichText::new("Scan Frame").strong())
                                .fill(ACCENT);
                            if ui.add(scan).clicked() {
                                action = PlayerAction::ConfirmScan;
                            }
                        });
                    });
                });
        });
    }

    if view.state.is_scanning() {
        ui.painter()
            .rect_filled(video_rect, 8.0, egui::Color32::from_black_alpha(140));
        centered_message(ui, video_rect, |ui| {
            ui.add(egui::Spinner::new().size(40.0));
            ui.label(egui::RichText::new("Analyzing frame for products...").size(16.0));
        });
    }

    if let Some(playback) = view.playback {
        ui.add_space(6.0);
        ui.horizontal(|ui| {
            let toggle = if playback.is_playing { "⏸ Pause" } else { "▶ Play" };
            if ui.button(toggle).clicked() {
                action = PlayerAction::TogglePlay;
            }
            if ui.button("⟲ Restart").clicked() {
                action = PlayerAction::Restart;
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(
                    egui::RichText::new("SCOUT SYSTEM ACTIVE")
                        .small()
                        .strong()
                        .color(ACCENT),
                );
            });
        });
        if let Some(target) = timeline::show(ui, playback.current_time, playback.duration) {
            action = PlayerAction::Seek(target);
        }
    }

    action
}

fn centered_message(ui: &mut egui::Ui, rect: egui::Rect, add_contents: impl FnOnce(&mut egui::Ui)) {
    floating(ui, "player_message", rect.center(), |ui| {
        ui.vertical_centered(add_contents);
    });
}

/// Contents centered on `center`, layered above the frame without
/// taking space in the panel layout.
fn floating(ui: &egui::Ui, name: &str, center: egui::Pos2, add_contents: impl FnOnce(&mut egui::Ui)) {
    egui::Area::new(ui.id().with(name))
        .pivot(egui::Align2::CENTER_CENTER)
        .fixed_pos(center)
        .order(egui::Order::Foreground)
        .show(ui.ctx(), add_contents);
}
