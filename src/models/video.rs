// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Video source descriptions.
//!
//! A loaded video is either a YouTube video (identified by the trailing
//! part of its link) or a direct source such as a local file path.

use regex::Regex;
use std::sync::OnceLock;

/// The video currently loaded in the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveVideo {
    /// YouTube video id, or a local path / direct URL.
    pub source: String,
    pub is_youtube: bool,
}

impl ActiveVideo {
    /// A direct (decodable) source such as a local file.
    pub fn local(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            is_youtube: false,
        }
    }

    /// Embeddable player URL for YouTube sources.
    pub fn embed_url(&self) -> Option<String> {
        self.is_youtube
            .then(|| format!("https://www.youtube.com/embed/{}", self.source))
    }
}

fn youtube_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?:https?://)?(?:www\.)?(?:youtube\.com|youtu\.be)/(?:watch\?v=)?(.+)")
            .expect("static YouTube pattern is valid")
    })
}

/// Interpret text typed into the URL field.
///
/// Returns `None` for blank input. YouTube links yield the trailing
/// segment after the host (minus a leading `watch?v=`); everything else
/// is treated as a direct source.
pub fn parse_video_input(input: &str) -> Option<ActiveVideo> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Some(id) = youtube_pattern()
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
    {
        return Some(ActiveVideo {
            source: id.to_string(),
            is_youtube: true,
        });
    }

    Some(ActiveVideo::local(input))
}
