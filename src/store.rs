// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application state and its transitions.
//!
//! Every change to the session, the loaded video, the pending frame and
//! the detection result goes through [`reduce`], a pure function from
//! `(state, event)` to the next state plus an optional side effect for
//! the caller to run. Background detections are tagged with a
//! generation number; a completion is applied only if its generation is
//! still the one being waited for.

use crate::io::capture::CapturedFrame;
use crate::io::detection::DetectError;
use crate::models::detection::{DetectedObject, DetectionResult};
use crate::models::session::Session;
use crate::models::video::ActiveVideo;

/// Message shown for any failed detection.
pub const SCAN_FAILED_MESSAGE: &str =
    "AI Engine encountered an issue identifying products in this frame.";

/// Where the capture-and-detect workflow stands.
///
/// This tracks the workflow, not the media element: after a dismissal
/// the state returns to `Playing` even though the video stays paused.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Phase {
    /// No video loaded.
    #[default]
    Idle,
    Playing,
    /// Paused on a frame. `frame` is `None` after a failed scan.
    PausedPendingConfirm { frame: Option<CapturedFrame> },
    Scanning { generation: u64 },
    ResultsShown { result: DetectionResult },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub session: Option<Session>,
    pub video: Option<ActiveVideo>,
    pub phase: Phase,
    /// Bumped whenever an in-flight detection stops being wanted.
    pub generation: u64,
    pub error: Option<String>,
}

impl AppState {
    pub fn pending_frame(&self) -> Option<&CapturedFrame> {
        match &self.phase {
            Phase::PausedPendingConfirm { frame } => frame.as_ref(),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&DetectionResult> {
        match &self.phase {
            Phase::ResultsShown { result } => Some(result),
            _ => None,
        }
    }

    pub fn is_scanning(&self) -> bool {
        matches!(self.phase, Phase::Scanning { .. })
    }

    /// Objects to draw over the frame. Empty unless results are showing.
    pub fn overlay_objects(&self) -> &[DetectedObject] {
        self.result().map(|r| r.objects.as_slice()).unwrap_or(&[])
    }

    fn clear_video_state(&mut self) {
        self.phase = if self.video.is_some() {
            Phase::Playing
        } else {
            Phase::Idle
        };
        self.generation += 1;
        self.error = None;
    }
}

#[derive(Debug)]
pub enum Event {
    LoggedIn(Session),
    LoggedOut,
    VideoLoaded(ActiveVideo),
    /// Playback paused; carries the captured frame if one was available.
    Paused(Option<CapturedFrame>),
    Played,
    ScanDismissed,
    ScanRequested,
    ScanFinished {
        generation: u64,
        outcome: Result<DetectionResult, DetectError>,
    },
}

/// Work the caller must perform after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Detect { generation: u64, frame: CapturedFrame },
}

/// Compute the next state.
pub fn reduce(mut state: AppState, event: Event) -> (AppState, Option<Effect>) {
    match event {
        Event::LoggedIn(session) => {
            state.session = Some(session);
        }
        Event::LoggedOut => {
            state = AppState {
                generation: state.generation + 1,
                ..AppState::default()
            };
        }
        Event::VideoLoaded(video) => {
            if state.session.is_none() {
                log::warn!("Ignoring video load without a session");
                return (state, None);
            }
            state.video = Some(video);
            state.clear_video_state();
        }
        Event::Paused(frame) => {
            let Some(frame) = frame else {
                return (state, None);
            };
            match state.phase {
                Phase::Playing | Phase::PausedPendingConfirm { .. } | Phase::ResultsShown { .. } => {
                    state.phase = Phase::PausedPendingConfirm { frame: Some(frame) };
                    state.error = None;
                }
                Phase::Idle | Phase::Scanning { .. } => {}
            }
        }
        Event::Played => match state.phase {
            Phase::Idle | Phase::Playing => {}
            Phase::Scanning { .. } => {
                log::info!("Playback resumed, abandoning scan");
                state.generation += 1;
                state.phase = Phase::Playing;
            }
            Phase::PausedPendingConfirm { .. } | Phase::ResultsShown { .. } => {
                state.phase = Phase::Playing;
            }
        },
        Event::ScanDismissed => {
            if let Phase::PausedPendingConfirm { .. } = state.phase {
                state.phase = Phase::Playing;
            }
        }
        Event::ScanRequested => {
            // Only a pending frame can start a scan; this also rejects
            // requests while one is already in flight.
            let frame = match &mut state.phase {
                Phase::PausedPendingConfirm { frame } => frame.take(),
                _ => None,
            };
            if let Some(frame) = frame {
                state.generation += 1;
                state.phase = Phase::Scanning {
                    generation: state.generation,
                };
                state.error = None;
                let effect = Effect::Detect {
                    generation: state.generation,
                    frame,
                };
                return (state, Some(effect));
            }
        }
        Event::ScanFinished { generation, outcome } => match state.phase {
            Phase::Scanning { generation: current } if current == generation => match outcome {
                Ok(result) => {
                    state.phase = Phase::ResultsShown { result };
                }
                Err(e) => {
                    log::error!("Scan {} failed: {}", generation, e);
                    state.phase = Phase::PausedPendingConfirm { frame: None };
                    state.error = Some(SCAN_FAILED_MESSAGE.to_string());
                }
            },
            _ => {
                log::warn!("Discarding stale scan result (generation {})", generation);
            }
        },
    }
    (state, None)
}

/// Owner of the application state.
#[derive(Debug, Default)]
pub struct Store {
    state: AppState,
}

impl Store {
    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn dispatch(&mut self, event: Event) -> Option<Effect> {
        let (next, effect) = reduce(std::mem::take(&mut self.state), event);
        self.state = next;
        effect
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::detection::{spawn_detection, Detector, ScanCompletion};
    use crate::models::detection::{Attributes, BoundingBox};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc::channel;
    use std::sync::{Arc, Barrier};
    use std::time::Duration;

    fn frame() -> CapturedFrame {
        CapturedFrame {
            width: 4,
            height: 2,
            jpeg_base64: "Zm9v".to_string(),
        }
    }

    fn result(objects: usize) -> DetectionResult {
        DetectionResult {
            scene: "Casino".to_string(),
            objects: (0..objects)
                .map(|i| DetectedObject {
                    id: format!("obj_{}", i),
                    label: "Watch".to_string(),
                    confidence: 0.97,
                    bbox: BoundingBox([200.0, 100.0, 600.0, 500.0]),
                    attributes: Attributes::default(),
                    shopping_url: String::new(),
                    thumbnail_url: String::new(),
                })
                .collect(),
        }
    }

    fn signed_in_with_video() -> Store {
        let mut store = Store::default();
        store.dispatch(Event::LoggedIn(Session {
            username: "neo".to_string(),
        }));
        store.dispatch(Event::VideoLoaded(ActiveVideo::local("trailer.mp4")));
        store
    }

    fn scan(store: &mut Store) -> u64 {
        store.dispatch(Event::Paused(Some(frame())));
        match store.dispatch(Event::ScanRequested) {
            Some(Effect::Detect { generation, .. }) => generation,
            None => panic!("expected a detection effect"),
        }
    }

    #[test]
    fn test_video_load_starts_playing() {
        let store = signed_in_with_video();
        assert_eq!(store.state().phase, Phase::Playing);
        assert!(store.state().video.is_some());
    }

    #[test]
    fn test_video_load_requires_session() {
        let mut store = Store::default();
        store.dispatch(Event::VideoLoaded(ActiveVideo::local("trailer.mp4")));
        assert_eq!(store.state().phase, Phase::Idle);
        assert_eq!(store.state().video, None);
    }

    #[test]
    fn test_pause_captures_pending_frame() {
        let mut store = signed_in_with_video();
        store.dispatch(Event::Paused(Some(frame())));
        assert_eq!(store.state().pending_frame(), Some(&frame()));
    }

    #[test]
    fn test_pause_without_frame_changes_nothing() {
        let mut store = signed_in_with_video();
        store.dispatch(Event::Paused(None));
        assert_eq!(store.state().phase, Phase::Playing);
        assert_eq!(store.state().pending_frame(), None);
    }

    #[test]
    fn test_dismiss_discards_frame() {
        let mut store = signed_in_with_video();
        store.dispatch(Event::Paused(Some(frame())));
        store.dispatch(Event::ScanDismissed);
        assert_eq!(store.state().phase, Phase::Playing);
        assert_eq!(store.state().pending_frame(), None);
        assert_eq!(store.dispatch(Event::ScanRequested), None);
    }

    #[test]
    fn test_successful_scan_shows_results() {
        let mut store = signed_in_with_video();
        let generation = scan(&mut store);
        assert!(store.state().is_scanning());
        assert_eq!(store.state().pending_frame(), None);
        assert!(store.state().overlay_objects().is_empty());

        store.dispatch(Event::ScanFinished {
            generation,
            outcome: Ok(result(2)),
        });
        assert_eq!(store.state().result(), Some(&result(2)));
        assert_eq!(store.state().overlay_objects().len(), 2);
        assert_eq!(store.state().error, None);
    }

    #[test]
    fn test_empty_result_still_has_scene() {
        let mut store = signed_in_with_video();
        let generation = scan(&mut store);
        store.dispatch(Event::ScanFinished {
            generation,
            outcome: Ok(result(0)),
        });
        assert_eq!(store.state().result().map(|r| r.scene.as_str()), Some("Casino"));
        assert!(store.state().overlay_objects().is_empty());
    }

    #[test]
    fn test_failed_scan_clears_frame_and_reports() {
        let mut store = signed_in_with_video();
        let generation = scan(&mut store);
        store.dispatch(Event::ScanFinished {
            generation,
            outcome: Err(DetectError::MissingApiKey),
        });
        assert_eq!(
            store.state().phase,
            Phase::PausedPendingConfirm { frame: None }
        );
        assert_eq!(store.state().error.as_deref(), Some(SCAN_FAILED_MESSAGE));
        assert_eq!(store.state().result(), None);
        // Re-pausing is the only way to retry
        assert_eq!(store.dispatch(Event::ScanRequested), None);
        store.dispatch(Event::Paused(Some(frame())));
        assert_eq!(store.state().error, None);
        assert!(store.dispatch(Event::ScanRequested).is_some());
    }

    #[test]
    fn test_second_scan_request_is_ignored() {
        let mut store = signed_in_with_video();
        scan(&mut store);
        assert_eq!(store.dispatch(Event::ScanRequested), None);
        store.dispatch(Event::Paused(Some(frame())));
        assert!(store.state().is_scanning());
        assert_eq!(store.dispatch(Event::ScanRequested), None);
    }

    #[test]
    fn test_play_clears_results() {
        let mut store = signed_in_with_video();
        let generation = scan(&mut store);
        store.dispatch(Event::ScanFinished {
            generation,
            outcome: Ok(result(1)),
        });
        store.dispatch(Event::Played);
        assert_eq!(store.state().phase, Phase::Playing);
        assert_eq!(store.state().result(), None);
    }

    #[test]
    fn test_play_during_scan_abandons_it() {
        let mut store = signed_in_with_video();
        let generation = scan(&mut store);
        store.dispatch(Event::Played);
        store.dispatch(Event::ScanFinished {
            generation,
            outcome: Ok(result(1)),
        });
        assert_eq!(store.state().phase, Phase::Playing);
        assert_eq!(store.state().result(), None);
    }

    #[test]
    fn test_new_video_clears_frame_and_result() {
        let mut store = signed_in_with_video();
        store.dispatch(Event::Paused(Some(frame())));
        store.dispatch(Event::VideoLoaded(ActiveVideo::local("other.mp4")));
        assert_eq!(store.state().pending_frame(), None);
        assert_eq!(store.state().result(), None);

        let generation = scan(&mut store);
        store.dispatch(Event::ScanFinished {
            generation,
            outcome: Ok(result(1)),
        });
        store.dispatch(Event::VideoLoaded(ActiveVideo::local("third.mp4")));
        assert_eq!(store.state().pending_frame(), None);
        assert_eq!(store.state().result(), None);
        assert_eq!(store.state().phase, Phase::Playing);
    }

    #[test]
    fn test_late_result_after_new_video_is_discarded() {
        let mut store = signed_in_with_video();
        let stale = scan(&mut store);
        store.dispatch(Event::VideoLoaded(ActiveVideo::local("other.mp4")));
        store.dispatch(Event::ScanFinished {
            generation: stale,
            outcome: Ok(result(3)),
        });
        assert_eq!(store.state().result(), None);
        assert_eq!(store.state().phase, Phase::Playing);

        // A scan on the new video still completes normally.
        let fresh = scan(&mut store);
        store.dispatch(Event::ScanFinished {
            generation: stale,
            outcome: Ok(result(3)),
        });
        assert!(store.state().is_scanning());
        store.dispatch(Event::ScanFinished {
            generation: fresh,
            outcome: Ok(result(1)),
        });
        assert_eq!(store.state().overlay_objects().len(), 1);
    }

    #[test]
    fn test_logout_resets_everything() {
        let mut store = signed_in_with_video();
        let generation = scan(&mut store);
        store.dispatch(Event::LoggedOut);
        assert_eq!(store.state().session, None);
        assert_eq!(store.state().video, None);
        assert_eq!(store.state().phase, Phase::Idle);

        store.dispatch(Event::ScanFinished {
            generation,
            outcome: Ok(result(1)),
        });
        assert_eq!(store.state().phase, Phase::Idle);
    }

    struct CountingDetector {
        calls: AtomicUsize,
        gate: Barrier,
    }

    impl Detector for CountingDetector {
        fn detect(&self, _frame: &CapturedFrame) -> Result<DetectionResult, DetectError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.gate.wait();
            Ok(result(1))
        }
    }

    #[test]
    fn test_only_one_request_in_flight() {
        let detector = Arc::new(CountingDetector {
            calls: AtomicUsize::new(0),
            gate: Barrier::new(2),
        });
        let (sender, receiver) = channel::<ScanCompletion>();
        let mut store = signed_in_with_video();

        store.dispatch(Event::Paused(Some(frame())));
        for _ in 0..3 {
            if let Some(Effect::Detect { generation, frame }) = store.dispatch(Event::ScanRequested)
            {
                spawn_detection(detector.clone(), generation, frame, sender.clone(), || {});
            }
        }

        // The first call is parked on the barrier; release it.
        detector.gate.wait();
        let completion = receiver.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(detector.calls.load(Ordering::SeqCst), 1);

        store.dispatch(Event::ScanFinished {
            generation: completion.generation,
            outcome: completion.outcome,
        });
        assert_eq!(store.state().overlay_objects().len(), 1);
        assert!(receiver.try_recv().is_err());
    }
}
