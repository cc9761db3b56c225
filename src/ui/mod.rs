// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the Trailer Scout application.

pub mod auth;
pub mod overlay;
pub mod player;
pub mod products;
pub mod save_prompt;
pub mod timeline;
pub mod toolbar;
