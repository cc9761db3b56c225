// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar with the video source controls.
//!
//! This module provides the URL field, the local file picker button and
//! the signed-in user's logout control.

pub enum ToolbarAction {
    None,
    LoadUrl,
    OpenFile,
    Logout,
}

/// Display the toolbar.
pub fn show(ui: &mut egui::Ui, url_input: &mut String, username: &str) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        ui.label(
            egui::RichText::new("SCOUT")
                .strong()
                .color(egui::Color32::WHITE),
        );
        ui.label(
            egui::RichText::new("AI")
                .strong()
                .color(egui::Color32::from_rgb(220, 38, 38)),
        );

        ui.separator();

        // Logout sits on the far right; reserve room for it first.
        let right_width = 200.0;
        let field_width = (ui.available_width() - right_width - 160.0).max(120.0);
        let response = ui.add(
            egui::TextEdit::singleline(url_input)
                .hint_text("Paste YouTube Trailer URL or file path...")
                .desired_width(field_width),
        );
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

        if ui.button("Load").clicked() || submitted {
            action = ToolbarAction::LoadUrl;
        }
        if ui.button("📂 Open File...").clicked() {
            action = ToolbarAction::OpenFile;
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Logout").clicked() {
                action = ToolbarAction::Logout;
            }
            ui.label(egui::RichText::new(username).strong());
            ui.label(egui::RichText::new("Active Operative").weak().small());
        });
    });

    action
}
