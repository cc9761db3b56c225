// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Trailer Scout - product discovery for movie frames
//!
//! A desktop application that plays a trailer, lets the user pause on a
//! frame and asks a vision model which purchasable products are visible,
//! then overlays the detections and lists shopping links for them.

mod app;
mod config;
mod io;
mod models;
mod store;
mod ui;
mod util;

use anyhow::Result;
use app::ScoutApp;
use config::Config;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let config = Config::load()?;
    let app = ScoutApp::new(config)?;

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title("Trailer Scout"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Trailer Scout",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
