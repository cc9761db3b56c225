// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the egui::App trait. It owns the [`Store`], the playing surface and
//! the channels of the background workers, turns UI actions into store
//! events, and runs the effects the store asks for.

use crate::config::Config;
use crate::io::capture::capture_frame;
use crate::io::credentials::CredentialStore;
use crate::io::detection::{spawn_detection, Detector, GeminiClient, ScanCompletion};
use crate::io::media::{self, VideoSurface};
use crate::io::thumbnails::{self, LoadedThumbnail};
use crate::models::session::{authenticate, AuthMode, SavePrompt, SavePromptStatus};
use crate::models::video::{parse_video_input, ActiveVideo};
use crate::store::{Effect, Event, Store};
use crate::ui::{auth, player, products, save_prompt, toolbar};
use anyhow::Result;
use std::collections::HashMap;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Result of background media opening.
struct LoadedMedia {
    video: ActiveVideo,
    surface: Box<dyn VideoSurface>,
}

/// Main application state.
pub struct ScoutApp {
    config: Config,

    /// Session, video and detection state
    store: Store,

    detector: Arc<dyn Detector>,
    credentials: CredentialStore,

    auth_form: auth::AuthFormState,
    save_prompt: Option<SavePrompt>,

    /// Text in the URL field
    url_input: String,

    /// Decoder for the active (non-YouTube) video
    surface: Option<Box<dyn VideoSurface>>,
    frame_texture: Option<egui::TextureHandle>,
    frame_size: Option<(u32, u32)>,
    last_update: Option<Instant>,

    /// Receiver for background media opening
    media_loader: Option<Receiver<Result<LoadedMedia, String>>>,
    loading_message: Option<String>,

    /// Last media error, shown under the player
    notice: Option<String>,

    scan_sender: Sender<ScanCompletion>,
    scan_receiver: Receiver<ScanCompletion>,

    thumbnail_loader: Option<Receiver<LoadedThumbnail>>,
    thumbnails: HashMap<String, egui::TextureHandle>,
    /// Store generation the thumbnails belong to
    thumbnails_generation: Option<u64>,

    highlight: Option<products::Highlight>,
}

impl ScoutApp {
    /// Create a new application instance.
    pub fn new(config: Config) -> Result<Self> {
        let detector: Arc<dyn Detector> = Arc::new(GeminiClient::new(&config)?);
        Ok(Self::with_detector(config, detector))
    }

    fn with_detector(config: Config, detector: Arc<dyn Detector>) -> Self {
        let credentials = CredentialStore::new(config.credentials_path.clone());
        let saved = credentials.load().unwrap_or_else(|e| {
            log::warn!("Ignoring saved credentials: {:#}", e);
            None
        });
        let (scan_sender, scan_receiver) = channel();

        Self {
            config,
            store: Store::default(),
            detector,
            credentials,
            auth_form: auth::AuthFormState::new(saved),
            save_prompt: None,
            url_input: String::new(),
            surface: None,
            frame_texture: None,
            frame_size: None,
            last_update: None,
            media_loader: None,
            loading_message: None,
            notice: None,
            scan_sender,
            scan_receiver,
            thumbnail_loader: None,
            thumbnails: HashMap::new(),
            thumbnails_generation: None,
            highlight: None,
        }
    }

    /// Apply an event and run whatever effect it produces.
    fn dispatch(&mut self, event: Event, ctx: &egui::Context) {
        if let Some(effect) = self.store.dispatch(event) {
            match effect {
                Effect::Detect { generation, frame } => {
                    let ctx = ctx.clone();
                    spawn_detection(
                        self.detector.clone(),
                        generation,
                        frame,
                        self.scan_sender.clone(),
                        move || ctx.request_repaint(),
                    );
                }
            }
        }
    }

    fn submit_auth(&mut self, ctx: &egui::Context) {
        let mode = self.auth_form.mode;
        match authenticate(mode, &self.auth_form.form) {
            Ok(session) => {
                log::info!("Signed in as {}", session.username);
                self.dispatch(Event::LoggedIn(session), ctx);
                self.auth_form.error = None;

                if mode == AuthMode::Register {
                    self.save_prompt =
                        Some(SavePrompt::offer(self.auth_form.form.clone(), Instant::now()));
                }
            }
            Err(e) => {
                self.auth_form.error = Some(e.to_string());
            }
        }
    }

    /// Sign out and drop every piece of video and detection state.
    fn logout(&mut self, ctx: &egui::Context) {
        self.dispatch(Event::LoggedOut, ctx);
        self.surface = None;
        self.frame_texture = None;
        self.frame_size = None;
        self.cancel_media_load();
        self.notice = None;
        self.save_prompt = None;
        self.url_input.clear();
        self.clear_detection_view();
        self.auth_form.form.password.clear();
        log::info!("Signed out");
    }

    fn clear_detection_view(&mut self) {
        self.thumbnail_loader = None;
        self.thumbnails.clear();
        self.thumbnails_generation = None;
        self.highlight = None;
    }

    /// Load whatever is typed in the URL field.
    fn load_url(&mut self, ctx: &egui::Context) {
        let Some(video) = parse_video_input(&self.url_input) else {
            return;
        };
        if video.is_youtube {
            log::info!("Loaded YouTube video {}", video.source);
            self.cancel_media_load();
            self.set_video(video, None, ctx);
        } else {
            self.open_media(video, ctx);
        }
    }

    fn open_file_dialog(&mut self, ctx: &egui::Context) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Media", &media::supported_extensions())
            .pick_file()
        {
            self.open_media(ActiveVideo::local(path.to_string_lossy()), ctx);
        }
    }

    /// Forget any open still in progress. Its result goes nowhere once
    /// the receiver is dropped.
    fn cancel_media_load(&mut self) {
        if self.media_loader.take().is_some() {
            log::info!("Abandoning pending video load");
        }
        self.loading_message = None;
    }

    /// Open a decodable source on a background thread.
    fn open_media(&mut self, video: ActiveVideo, ctx: &egui::Context) {
        let (sender, receiver) = channel();
        self.media_loader = Some(receiver);
        self.loading_message = Some("Loading video...".to_string());

        let ctx = ctx.clone();
        std::thread::spawn(move || {
            let result = media::open_source(&video.source)
                .map(|surface| LoadedMedia { video, surface })
                .map_err(|e| format!("{:#}", e));
            let _ = sender.send(result);
            ctx.request_repaint();
        });
    }

    fn set_video(
        &mut self,
        video: ActiveVideo,
        surface: Option<Box<dyn VideoSurface>>,
        ctx: &egui::Context,
    ) {
        self.dispatch(Event::VideoLoaded(video), ctx);
        self.surface = surface;
        self.frame_texture = None;
        self.frame_size = None;
        self.last_update = None;
        self.notice = None;
        self.clear_detection_view();
        self.upload_frame(ctx);
    }

    /// Copy the surface's current frame into the display texture.
    fn upload_frame(&mut self, ctx: &egui::Context) {
        let Some(frame) = self.surface.as_ref().and_then(|s| s.current_frame()) else {
            return;
        };
        if frame.is_empty() {
            return;
        }

        let size = [frame.width as usize, frame.height as usize];
        let image = egui::ColorImage::from_rgba_unmultiplied(size, &frame.pixels);
        match self.frame_texture {
            Some(ref mut texture) => texture.set(image, egui::TextureOptions::LINEAR),
            None => {
                self.frame_texture =
                    Some(ctx.load_texture("video_frame", image, egui::TextureOptions::LINEAR));
            }
        }
        self.frame_size = Some((frame.width, frame.height));
    }

    fn toggle_play(&mut self, ctx: &egui::Context) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        if surface.is_playing() {
            surface.pause();
            let frame = capture_frame(&**surface, self.config.jpeg_quality);
            if frame.is_none() {
                log::debug!("Paused without a decoded frame");
            }
            self.dispatch(Event::Paused(frame), ctx);
        } else {
            surface.play();
            self.dispatch(Event::Played, ctx);
            self.highlight = None;
        }
    }

    fn restart(&mut self, ctx: &egui::Context) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        if let Err(e) = surface.seek(0.0) {
            log::error!("Failed to restart video: {:#}", e);
            return;
        }
        surface.play();
        self.upload_frame(ctx);
        self.dispatch(Event::Played, ctx);
        self.highlight = None;
    }

    fn seek(&mut self, seconds: f64, ctx: &egui::Context) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        match surface.seek(seconds) {
            Ok(()) => self.upload_frame(ctx),
            Err(e) => log::error!("Failed to seek to {:.2}s: {:#}", seconds, e),
        }
    }

    /// Collect results from background workers.
    fn poll_workers(&mut self, ctx: &egui::Context) {
        if let Some(ref receiver) = self.media_loader {
            if let Ok(result) = receiver.try_recv() {
                self.media_loader = None;
                self.loading_message = None;

                match result {
                    Ok(loaded) => {
                        log::info!("Loaded video {}", loaded.video.source);
                        self.set_video(loaded.video, Some(loaded.surface), ctx);
                    }
                    Err(e) => {
                        log::error!("Failed to load video: {}", e);
                        self.notice = Some(e);
                    }
                }
            }
        }

        while let Ok(completion) = self.scan_receiver.try_recv() {
            self.dispatch(
                Event::ScanFinished {
                    generation: completion.generation,
                    outcome: completion.outcome,
                },
                ctx,
            );
        }

        self.request_thumbnails(ctx);

        if let Some(ref receiver) = self.thumbnail_loader {
            while let Ok(loaded) = receiver.try_recv() {
                if let Ok(frame) = loaded.image {
                    let image = egui::ColorImage::from_rgba_unmultiplied(
                        [frame.width as usize, frame.height as usize],
                        &frame.pixels,
                    );
                    let texture = ctx.load_texture(
                        format!("thumbnail_{}", loaded.object_id),
                        image,
                        egui::TextureOptions::LINEAR,
                    );
                    self.thumbnails.insert(loaded.object_id, texture);
                }
            }
        }
    }

    /// Start fetching thumbnails once per new result.
    fn request_thumbnails(&mut self, ctx: &egui::Context) {
        let state = self.store.state();
        let Some(result) = state.result() else {
            return;
        };
        if self.thumbnails_generation == Some(state.generation) {
            return;
        }

        let requests = result
            .objects
            .iter()
            .map(|o| (o.id.clone(), o.thumbnail_url.clone()))
            .collect::<Vec<_>>();
        self.thumbnails_generation = Some(state.generation);
        self.thumbnails.clear();
        if requests.is_empty() {
            return;
        }

        let (sender, receiver) = channel();
        self.thumbnail_loader = Some(receiver);
        let ctx = ctx.clone();
        thumbnails::spawn_fetch(requests, sender, move || ctx.request_repaint());
    }

    /// Decode frames for the time elapsed since the last UI update.
    fn advance_playback(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        let elapsed = self
            .last_update
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or_default();
        self.last_update = Some(now);

        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        match surface.advance(elapsed) {
            Ok(true) => self.upload_frame(ctx),
            Ok(false) => {}
            Err(e) => {
                log::error!("Playback error: {:#}", e);
                surface.pause();
            }
        }
    }

    fn update_save_prompt(&mut self, ctx: &egui::Context, now: Instant) {
        let Some(ref mut prompt) = self.save_prompt else {
            return;
        };
        if prompt.status(now) == SavePromptStatus::Closed {
            self.save_prompt = None;
            return;
        }

        match save_prompt::show(ctx, prompt, now) {
            save_prompt::SavePromptAction::Save => {
                if let Err(e) = self.credentials.accept_offer(prompt, now) {
                    log::error!("Failed to save credentials: {:#}", e);
                    prompt.decline();
                }
            }
            save_prompt::SavePromptAction::Decline => prompt.decline(),
            save_prompt::SavePromptAction::None => {}
        }
        ctx.request_repaint_after(Duration::from_millis(100));
    }

    fn show_dashboard(&mut self, ctx: &egui::Context, now: Instant) {
        let username = self
            .store
            .state()
            .session
            .as_ref()
            .map(|s| s.username.clone())
            .unwrap_or_default();

        // Top menu bar
        let mut menu_action = toolbar::ToolbarAction::None;
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Video...").clicked() {
                        menu_action = toolbar::ToolbarAction::OpenFile;
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Logout").clicked() {
                        menu_action = toolbar::ToolbarAction::Logout;
                        ui.close_menu();
                    }
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });

        // Toolbar
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| toolbar::show(ui, &mut self.url_input, &username))
            .inner;

        for action in [menu_action, toolbar_action] {
            match action {
                toolbar::ToolbarAction::LoadUrl => self.load_url(ctx),
                toolbar::ToolbarAction::OpenFile => self.open_file_dialog(ctx),
                toolbar::ToolbarAction::Logout => {
                    self.logout(ctx);
                    return;
                }
                toolbar::ToolbarAction::None => {}
            }
        }

        // Product cards (right side)
        egui::SidePanel::right("products")
            .default_width(300.0)
            .show(ctx, |ui| {
                products::show(
                    ui,
                    self.store.state(),
                    &self.thumbnails,
                    &mut self.highlight,
                    now,
                )
            });

        // Scene summary and errors (bottom)
        egui::TopBottomPanel::bottom("scene_summary").show(ctx, |ui| {
            let state = self.store.state();
            if let Some(ref error) = state.error {
                ui.colored_label(egui::Color32::from_rgb(248, 113, 113), format!("⚠ {}", error));
            }
            if let Some(ref notice) = self.notice {
                ui.colored_label(egui::Color32::from_rgb(251, 191, 36), notice);
            }
            match state.result() {
                Some(result) => {
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new("Scene Awareness Enabled").strong());
                        ui.separator();
                        ui.label(format!("Environment identified: {}", result.scene));
                    });
                }
                None => {
                    ui.label(egui::RichText::new("Pause a frame to scan it").weak());
                }
            }
        });

        // Main player (center)
        let playback = self.surface.as_ref().map(|s| player::Playback {
            is_playing: s.is_playing(),
            current_time: s.current_time(),
            duration: s.duration(),
        });
        let player_action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                player::show(
                    ui,
                    &player::PlayerView {
                        state: self.store.state(),
                        texture: self.frame_texture.as_ref(),
                        frame_size: self.frame_size,
                        playback,
                        loading: self.loading_message.as_deref(),
                    },
                )
            })
            .inner;

        match player_action {
            player::PlayerAction::TogglePlay => self.toggle_play(ctx),
            player::PlayerAction::Restart => self.restart(ctx),
            player::PlayerAction::Seek(seconds) => self.seek(seconds, ctx),
            player::PlayerAction::SelectObject(id) => {
                if let Some(object) = self.store.state().result().and_then(|r| r.find(&id)) {
                    log::info!("Selected {} ({})", object.label, id);
                }
                self.highlight = Some(products::Highlight::new(id, now));
            }
            player::PlayerAction::DismissScan => self.dispatch(Event::ScanDismissed, ctx),
            player::PlayerAction::ConfirmScan => self.dispatch(Event::ScanRequested, ctx),
            player::PlayerAction::None => {}
        }

        // Space toggles playback unless a text field has focus
        if !ctx.wants_keyboard_input() && ctx.input(|i| i.key_pressed(egui::Key::Space)) {
            self.toggle_play(ctx);
        }
    }
}

impl eframe::App for ScoutApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        self.poll_workers(ctx);
        self.advance_playback(ctx);

        if self.store.state().session.is_none() {
            egui::CentralPanel::default().show(ctx, |ui| {
                if let auth::AuthAction::Submit = auth::show(ui, &mut self.auth_form) {
                    self.submit_auth(ctx);
                }
            });
        } else {
            self.show_dashboard(ctx, now);
        }

        self.update_save_prompt(ctx, now);

        let playing = self.surface.as_ref().is_some_and(|s| s.is_playing());
        if playing || self.loading_message.is_some() || self.store.state().is_scanning() {
            ctx.request_repaint();
        } else if self.highlight.is_some() {
            ctx.request_repaint_after(Duration::from_millis(250));
        }
    }
}
