// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Sign-in / registration form.

use crate::models::session::{AuthMode, Credentials};

/// Form contents and the last validation message.
pub struct AuthFormState {
    pub mode: AuthMode,
    pub form: Credentials,
    pub error: Option<String>,
}

impl AuthFormState {
    pub fn new(saved: Option<Credentials>) -> Self {
        Self {
            mode: AuthMode::Login,
            form: saved.unwrap_or_default(),
            error: None,
        }
    }
}

pub enum AuthAction {
    None,
    Submit,
}

/// Display the auth form centered in the available space.
pub fn show(ui: &mut egui::Ui, state: &mut AuthFormState) -> AuthAction {
    let mut action = AuthAction::None;

    ui.vertical_centered(|ui| {
        ui.add_space(ui.available_height() * 0.15);
        ui.set_max_width(360.0);

        let (title, subtitle) = match state.mode {
            AuthMode::Login => ("Welcome Back", "Access your cinematic scouting history"),
            AuthMode::Register => ("Join the Elite", "Start your smart shopping journey today"),
        };
        ui.heading(egui::RichText::new(title).size(28.0).strong());
        ui.label(egui::RichText::new(subtitle).color(egui::Color32::from_gray(150)));
        ui.add_space(20.0);

        let mut submitted = false;
        if state.mode == AuthMode::Register {
            let response = ui.add(
                egui::TextEdit::singleline(&mut state.form.username)
                    .hint_text("Username")
                    .desired_width(f32::INFINITY),
            );
            submitted |= enter_pressed(ui, &response);
            ui.add_space(6.0);
        }

        let response = ui.add(
            egui::TextEdit::singleline(&mut state.form.email)
                .hint_text("Email Address")
                .desired_width(f32::INFINITY),
        );
        submitted |= enter_pressed(ui, &response);
        ui.add_space(6.0);

        let response = ui.add(
            egui::TextEdit::singleline(&mut state.form.password)
                .hint_text("Secure Password")
                .password(true)
                .desired_width(f32::INFINITY),
        );
        submitted |= enter_pressed(ui, &response);
        ui.add_space(12.0);

        if let Some(ref error) = state.error {
            ui.colored_label(egui::Color32::from_rgb(248, 113, 113), error);
            ui.add_space(6.0);
        }

        let submit_text = match state.mode {
            AuthMode::Login => "Enter Dashboard",
            AuthMode::Register => "Create Account",
        };
        let button = egui::Button::new(egui::RichText::new(submit_text).strong())
            .fill(egui::Color32::from_rgb(220, 38, 38))
            .min_size(egui::vec2(ui.available_width(), 36.0));
        if ui.add(button).clicked() || submitted {
            action = AuthAction::Submit;
        }

        ui.add_space(16.0);
        let toggle_text = match state.mode {
            AuthMode::Login => "Don't have an account? Register",
            AuthMode::Register => "Already a member? Sign in",
        };
        if ui.link(toggle_text).clicked() {
            state.mode = state.mode.toggled();
            state.error = None;
        }
    });

    action
}

fn enter_pressed(ui: &egui::Ui, response: &egui::Response) -> bool {
    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter))
}
