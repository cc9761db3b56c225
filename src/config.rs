// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application settings.
//!
//! Settings come from an optional YAML file (`$SCOUT_CONFIG`, or
//! `scout.yaml` in the working directory). The API key may also be
//! supplied through `GEMINI_API_KEY` or `API_KEY`.

use crate::io::capture::DEFAULT_JPEG_QUALITY;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILE: &str = "scout.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    /// Storefront host used for shopping search links.
    pub retailer: String,
    pub jpeg_quality: u8,
    pub credentials_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-3-flash-preview".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            retailer: "www.flipkart.com".to_string(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            credentials_path: PathBuf::from("scout_ai_creds.json"),
        }
    }
}

impl Config {
    /// Load settings from the default location and the environment.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os("SCOUT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            log::debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };

        if let Some(key) = ["GEMINI_API_KEY", "API_KEY"]
            .iter()
            .find_map(|name| std::env::var(name).ok().filter(|v| !v.is_empty()))
        {
            config.api_key = key;
        }

        if config.api_key.is_empty() {
            log::warn!("No API key configured; scans will fail until one is set");
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = serde_yaml::from_str(&yaml)
            .with_context(|| format!("invalid config {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scout.yaml");
        std::fs::write(&path, "model: gemini-test\nretailer: shop.example.com\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.model, "gemini-test");
        assert_eq!(config.retailer, "shop.example.com");
        assert_eq!(config.jpeg_quality, DEFAULT_JPEG_QUALITY);
        assert_eq!(config.credentials_path, PathBuf::from("scout_ai_creds.json"));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scout.yaml");
        std::fs::write(&path, "jpeg_quality: [not, a, number]\n").unwrap();

        assert!(Config::from_file(&path).is_err());
    }
}
