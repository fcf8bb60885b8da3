// src/pipeline.rs - Frame-synchronous gesture and pointer pipeline
use serde::Serialize;
use tracing::{debug, warn};

use crate::clock::{Clock, MonotonicClock};
use crate::config::EngineConfig;
use crate::fingers::{peace_sign_angle, FingerClassifier, HandAnalysis};
use crate::gestures::Gesture;
use crate::landmarks::{Joint, LandmarkSet};
use crate::recognizer::GestureRecognizer;
use crate::smoothing::{AdaptiveSmoother, PointerConfig, RelativePointer};
use crate::state::{GestureState, GestureTracker};

/// What one frame produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameOutput {
    pub timestamp: f64,
    pub gesture: Gesture,
    pub stable_frames: u32,
    pub analysis: Option<HandAnalysis>,
    /// V-sign tilt in degrees, whenever a hand is present.
    pub peace_angle: Option<f64>,
}

impl FrameOutput {
    pub fn hand_present(&self) -> bool {
        self.analysis.is_some()
    }
}

#[derive(Debug, Clone)]
enum Pointer {
    Absolute(AdaptiveSmoother),
    Relative(RelativePointer),
}

/// Owns all per-hand state. One instance per hand; drive it from one thread.
pub struct GesturePipeline<C: Clock = MonotonicClock> {
    classifier: FingerClassifier,
    recognizer: GestureRecognizer,
    tracker: GestureTracker,
    pointer: Pointer,
    pointer_config: PointerConfig,
    clock: C,
    hand_present: bool,
}

impl GesturePipeline<MonotonicClock> {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_clock(config, MonotonicClock::new())
    }
}

impl<C: Clock> GesturePipeline<C> {
    pub fn with_clock(config: EngineConfig, clock: C) -> Self {
        let EngineConfig {
            fingers,
            gestures,
            stability,
            smoothing,
            pointer,
        } = config;

        let smoother = AdaptiveSmoother::new(smoothing);
        let pointer_state = if pointer.relative {
            Pointer::Relative(RelativePointer::new(smoother, pointer.sensitivity))
        } else {
            Pointer::Absolute(smoother)
        };

        Self {
            classifier: FingerClassifier::new(fingers),
            recognizer: GestureRecognizer::new(gestures),
            tracker: GestureTracker::new(stability, clock.now()),
            pointer: pointer_state,
            pointer_config: pointer,
            clock,
            hand_present: false,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Classifies one frame and advances the gesture state. `None` means no
    /// hand: the frame counts as NONE and pointer smoothing starts over.
    pub fn process(&mut self, hand: Option<&LandmarkSet>) -> FrameOutput {
        let now = self.clock.now();

        match (hand.is_some(), self.hand_present) {
            (true, false) => debug!("Hand acquired at {:.3}s", now),
            (false, true) => debug!("Hand lost at {:.3}s", now),
            _ => {}
        }
        self.hand_present = hand.is_some();
        if hand.is_none() {
            self.reset_pointer();
        }

        let analysis = self.classifier.analyze(hand);
        let gesture = self.recognizer.classify(hand, analysis.as_ref());
        let state = self.tracker.update(gesture, now);

        FrameOutput {
            timestamp: now,
            gesture: state.gesture,
            stable_frames: state.stable_frames,
            analysis,
            peace_angle: hand.map(peace_sign_angle),
        }
    }

    /// Like [`process`](Self::process) but from raw provider points; a
    /// malformed frame is logged and treated as no hand.
    pub fn process_raw(&mut self, raw: Option<&[[f64; 3]]>) -> FrameOutput {
        let hand = raw.and_then(|points| match LandmarkSet::from_slice(points) {
            Ok(set) => Some(set),
            Err(e) => {
                warn!("Dropping landmark frame: {}", e);
                None
            }
        });
        self.process(hand.as_ref())
    }

    /// Smoothed pointer target for a normalized hand position.
    ///
    /// Absolute mode maps `raw` onto the configured extent; relative mode adds
    /// the scaled hand delta to `current` and yields `None` on the seeding call.
    pub fn track_pointer(&mut self, raw: (f64, f64), current: (f64, f64)) -> Option<(f64, f64)> {
        let now = self.clock.now();
        let raw = if self.pointer_config.mirror_x {
            (1.0 - raw.0, raw.1)
        } else {
            raw
        };

        match &mut self.pointer {
            Pointer::Absolute(smoother) => {
                let config = smoother.config();
                let (x, y) = (raw.0 * config.width, raw.1 * config.height);
                Some(smoother.smooth(x, y, now))
            }
            Pointer::Relative(pointer) => pointer.update(raw, current, now),
        }
    }

    /// Pointer update driven by the index fingertip.
    pub fn track_index_tip(&mut self, hand: &LandmarkSet, current: (f64, f64)) -> Option<(f64, f64)> {
        let tip = hand.point(Joint::IndexTip);
        self.track_pointer((tip.x, tip.y), current)
    }

    pub fn reset_pointer(&mut self) {
        match &mut self.pointer {
            Pointer::Absolute(smoother) => smoother.reset(),
            Pointer::Relative(pointer) => pointer.reset(),
        }
    }

    pub fn state(&self) -> GestureState {
        self.tracker.state()
    }

    pub fn gesture(&self) -> Gesture {
        self.tracker.gesture()
    }

    pub fn is_stable(&self, min_frames: Option<u32>) -> bool {
        self.tracker.is_stable(min_frames)
    }

    pub fn is_held_for(&self, min_duration: Option<f64>) -> bool {
        self.tracker.is_held_for(min_duration, self.clock.now())
    }

    pub fn is_ready(&self, min_frames: Option<u32>, min_duration: Option<f64>) -> bool {
        self.tracker
            .is_ready(min_frames, min_duration, self.clock.now())
    }

    pub fn gesture_duration(&self) -> f64 {
        self.tracker.duration(self.clock.now())
    }
}
