// src/state.rs - Gesture debouncing: consecutive-frame and hold-time gates
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::gestures::Gesture;

/// Snapshot of the current gesture run. Replaced, never mutated, on each frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GestureState {
    pub gesture: Gesture,
    /// Seconds on the pipeline clock when this run began.
    pub start_time: f64,
    pub stable_frames: u32,
}

impl GestureState {
    /// State before any frame has been seen.
    pub fn initial(now: f64) -> Self {
        Self {
            gesture: Gesture::None,
            start_time: now,
            stable_frames: 0,
        }
    }

    /// A different gesture starts a fresh run at `now`; the same gesture
    /// extends the run and keeps its start time.
    pub fn next(self, gesture: Gesture, now: f64) -> Self {
        if gesture == self.gesture && self.stable_frames > 0 {
            Self {
                stable_frames: self.stable_frames.saturating_add(1),
                ..self
            }
        } else {
            Self {
                gesture,
                start_time: now,
                stable_frames: 1,
            }
        }
    }

    pub fn duration(&self, now: f64) -> f64 {
        now - self.start_time
    }

    pub fn is_stable(&self, min_frames: u32) -> bool {
        self.stable_frames >= min_frames
    }

    pub fn is_held_for(&self, min_duration: f64, now: f64) -> bool {
        self.duration(now) >= min_duration
    }

    pub fn is_ready(&self, min_frames: u32, min_duration: f64, now: f64) -> bool {
        self.is_stable(min_frames) && self.is_held_for(min_duration, now)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityConfig {
    pub min_stable_frames: u32,
    pub min_hold_seconds: f64,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            min_stable_frames: 3,
            min_hold_seconds: 0.15,
        }
    }
}

/// Owns the current [`GestureState`] and answers the readiness queries.
#[derive(Debug, Clone)]
pub struct GestureTracker {
    state: GestureState,
    config: StabilityConfig,
}

impl GestureTracker {
    pub fn new(config: StabilityConfig, now: f64) -> Self {
        Self {
            state: GestureState::initial(now),
            config,
        }
    }

    pub fn config(&self) -> &StabilityConfig {
        &self.config
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn gesture(&self) -> Gesture {
        self.state.gesture
    }

    pub fn update(&mut self, gesture: Gesture, now: f64) -> GestureState {
        let previous = self.state;
        self.state = previous.next(gesture, now);
        if previous.gesture != self.state.gesture {
            debug!(
                "Gesture {} -> {} after {:.3}s",
                previous.gesture,
                self.state.gesture,
                previous.duration(now)
            );
        }
        self.state
    }

    pub fn is_stable(&self, min_frames: Option<u32>) -> bool {
        self.state
            .is_stable(min_frames.unwrap_or(self.config.min_stable_frames))
    }

    pub fn is_held_for(&self, min_duration: Option<f64>, now: f64) -> bool {
        self.state
            .is_held_for(min_duration.unwrap_or(self.config.min_hold_seconds), now)
    }

    pub fn is_ready(&self, min_frames: Option<u32>, min_duration: Option<f64>, now: f64) -> bool {
        self.is_stable(min_frames) && self.is_held_for(min_duration, now)
    }

    pub fn duration(&self, now: f64) -> f64 {
        self.state.duration(now)
    }
}
