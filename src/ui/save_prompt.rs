// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Floating "save credentials?" offer shown after registration.

use crate::models::session::{SavePrompt, SavePromptStatus};
use std::time::Instant;

pub enum SavePromptAction {
    None,
    Save,
    Decline,
}

/// Display the prompt in the top-right corner.
pub fn show(ctx: &egui::Context, prompt: &SavePrompt, now: Instant) -> SavePromptAction {
    let mut action = SavePromptAction::None;

    egui::Window::new("save_credentials")
        .title_bar(false)
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-16.0, 72.0))
        .fixed_size(egui::vec2(280.0, 0.0))
        .show(ctx, |ui| match prompt.status(now) {
            SavePromptStatus::Saved => {
                ui.vertical_centered(|ui| {
                    ui.add_space(8.0);
                    ui.label(
                        egui::RichText::new("✔")
                            .size(28.0)
                            .color(egui::Color32::from_rgb(34, 197, 94)),
                    );
                    ui.label(egui::RichText::new("Credentials Secured").strong());
                    ui.add_space(8.0);
                });
            }
            SavePromptStatus::Offered | SavePromptStatus::Closed => {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new("Save Intelligence?").strong());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("✖").clicked() {
                            action = SavePromptAction::Decline;
                        }
                    });
                });
                ui.label(
                    egui::RichText::new(
                        "Would you like to store your credentials for faster access to the Scout Dashboard?",
                    )
                    .small()
                    .weak(),
                );
                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    if ui.button("Not Now").clicked() {
                        action = SavePromptAction::Decline;
                    }
                    if ui.button(egui::RichText::new("Yes, Save").strong()).clicked() {
                        action = SavePromptAction::Save;
                    }
                });
                ui.add(
                    egui::ProgressBar::new(prompt.remaining_fraction(now))
                        .desired_height(3.0)
                        .fill(egui::Color32::from_rgb(220, 38, 38)),
                );
            }
        });

    action
}
