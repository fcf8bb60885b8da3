// src/lib.rs
pub mod clock;
pub mod config;
pub mod data;
pub mod fingers;
pub mod geometry;
pub mod gestures;
pub mod intents;
pub mod landmarks;
pub mod pipeline;
pub mod recognizer;
pub mod replay;
pub mod smoothing;
pub mod state;

#[doc(hidden)]
pub mod fixtures;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{ConfigError, EngineConfig};
pub use gestures::{ControlMode, Gesture};
pub use intents::{Intent, IntentEvent, IntentResolver};
pub use landmarks::{Finger, Joint, LandmarkError, LandmarkSet};
pub use pipeline::{FrameOutput, GesturePipeline};
pub use state::GestureState;
