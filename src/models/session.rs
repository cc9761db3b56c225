// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Mock sign-in and session state.
//!
//! There is no backend: any submission with the required fields filled
//! in produces a session. After a registration the user is offered to
//! keep their credentials on disk.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// How long the save offer stays up without an answer.
pub const SAVE_OFFER_TIMEOUT: Duration = Duration::from_secs(10);

/// How long the "saved" confirmation is shown before closing.
pub const SAVE_SUCCESS_DISPLAY: Duration = Duration::from_secs(2);

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
}

/// Which variant of the auth form is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

impl AuthMode {
    pub fn toggled(self) -> Self {
        match self {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        }
    }
}

/// Raw contents of the auth form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub username: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("{0} is required")]
    MissingField(&'static str),
}

/// Accept the form if every field required by `mode` is filled in.
pub fn authenticate(mode: AuthMode, form: &Credentials) -> Result<Session, AuthError> {
    if mode == AuthMode::Register && form.username.trim().is_empty() {
        return Err(AuthError::MissingField("Username"));
    }
    if form.email.trim().is_empty() {
        return Err(AuthError::MissingField("Email"));
    }
    if form.password.is_empty() {
        return Err(AuthError::MissingField("Password"));
    }

    let username = match form.username.trim() {
        "" => form
            .email
            .trim()
            .split('@')
            .next()
            .unwrap_or_default()
            .to_string(),
        name => name.to_string(),
    };

    Ok(Session { username })
}

/// Where the save offer currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavePromptStatus {
    /// Waiting for the user to answer.
    Offered,
    /// Credentials were written; confirmation is showing.
    Saved,
    /// Declined, timed out, or confirmation finished. Remove the prompt.
    Closed,
}

/// Post-registration offer to persist credentials.
#[derive(Debug, Clone)]
pub struct SavePrompt {
    credentials: Credentials,
    offered_at: Instant,
    saved_at: Option<Instant>,
    closed: bool,
}

impl SavePrompt {
    pub fn offer(credentials: Credentials, now: Instant) -> Self {
        Self {
            credentials,
            offered_at: now,
            saved_at: None,
            closed: false,
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Fraction of the answer window left, for the countdown bar.
    pub fn remaining_fraction(&self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.offered_at);
        1.0 - (elapsed.as_secs_f32() / SAVE_OFFER_TIMEOUT.as_secs_f32()).min(1.0)
    }

    /// Record that the credentials were written. Only valid while offered.
    pub fn mark_saved(&mut self, now: Instant) -> bool {
        if self.status(now) != SavePromptStatus::Offered {
            return false;
        }
        self.saved_at = Some(now);
        true
    }

    pub fn decline(&mut self) {
        self.closed = true;
    }

    pub fn status(&self, now: Instant) -> SavePromptStatus {
        if self.closed {
            return SavePromptStatus::Closed;
        }
        match self.saved_at {
            Some(saved_at) if now.saturating_duration_since(saved_at) >= SAVE_SUCCESS_DISPLAY => {
                SavePromptStatus::Closed
            }
            Some(_) => SavePromptStatus::Saved,
            None if now.saturating_duration_since(self.offered_at) >= SAVE_OFFER_TIMEOUT => {
                SavePromptStatus::Closed
            }
            None => SavePromptStatus::Offered,
        }
    }
}
