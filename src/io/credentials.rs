// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Saved sign-in credentials.
//!
//! A single JSON object `{email, password, username}` stored in plain
//! text. It is written only when the user accepts the save offer and is
//! overwritten whole on every save.

use crate::models::session::{Credentials, SavePrompt, SavePromptStatus};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;

pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, credentials: &Credentials) -> Result<()> {
        let json = serde_json::to_string_pretty(credentials)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        log::info!("Saved credentials to {}", self.path.display());
        Ok(())
    }

    /// Answer a save offer with "yes".
    ///
    /// Writes the offered credentials only while the offer is still open.
    /// Returns `false` without touching the file once it was declined,
    /// timed out or already saved.
    pub fn accept_offer(&self, prompt: &mut SavePrompt, now: Instant) -> Result<bool> {
        if prompt.status(now) != SavePromptStatus::Offered {
            log::debug!("Save offer no longer open; nothing written");
            return Ok(false);
        }
        self.save(prompt.credentials())?;
        Ok(prompt.mark_saved(now))
    }

    /// Previously saved credentials, if any.
    pub fn load(&self) -> Result<Option<Credentials>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let credentials = serde_json::from_str(&json)
            .with_context(|| format!("invalid credentials file {}", self.path.display()))?;
        Ok(Some(credentials))
    }
}
