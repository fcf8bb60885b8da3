// src/gestures.rs - Gesture vocabulary and control modes
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gesture {
    #[default]
    None,
    OkSign,
    OpenPalm,
    Grab,
    PinchMiddle,
    RockSign,
    CallMe,
    PeaceSign,
    IndexUp,
    LSign,
    RingCurl,
    MiddleCurl,
    PinkyCurl,
}

impl Gesture {
    pub const ALL: [Gesture; 13] = [
        Gesture::None,
        Gesture::OkSign,
        Gesture::OpenPalm,
        Gesture::Grab,
        Gesture::PinchMiddle,
        Gesture::RockSign,
        Gesture::CallMe,
        Gesture::PeaceSign,
        Gesture::IndexUp,
        Gesture::LSign,
        Gesture::RingCurl,
        Gesture::MiddleCurl,
        Gesture::PinkyCurl,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gesture::None => "NONE",
            Gesture::OkSign => "OK_SIGN",
            Gesture::OpenPalm => "OPEN_PALM",
            Gesture::Grab => "GRAB",
            Gesture::PinchMiddle => "PINCH_MIDDLE",
            Gesture::RockSign => "ROCK_SIGN",
            Gesture::CallMe => "CALL_ME",
            Gesture::PeaceSign => "PEACE_SIGN",
            Gesture::IndexUp => "INDEX_UP",
            Gesture::LSign => "L_SIGN",
            Gesture::RingCurl => "RING_CURL",
            Gesture::MiddleCurl => "MIDDLE_CURL",
            Gesture::PinkyCurl => "PINKY_CURL",
        }
    }

    /// Short human-readable description for overlays and reports.
    pub fn description(&self) -> &'static str {
        match self {
            Gesture::None => "No gesture detected",
            Gesture::OkSign => "Thumb and index circle, others open",
            Gesture::OpenPalm => "All five fingers extended",
            Gesture::Grab => "Closed or semi-closed hand",
            Gesture::PinchMiddle => "Thumb and middle finger touching",
            Gesture::RockSign => "Index and pinky extended, thumb tucked",
            Gesture::CallMe => "Thumb and pinky extended",
            Gesture::PeaceSign => "Index and middle extended (V)",
            Gesture::IndexUp => "Only index extended",
            Gesture::LSign => "Thumb and index fully extended (L shape)",
            Gesture::RingCurl => "Only ring finger curled",
            Gesture::MiddleCurl => "Only middle finger curled",
            Gesture::PinkyCurl => "Only pinky finger curled",
        }
    }

    pub fn is_none(&self) -> bool {
        *self == Gesture::None
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operating modes cycled by the mode-switch gesture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    #[default]
    Cursor,
    Scroll,
    Window,
    Media,
}

impl ControlMode {
    pub const ALL: [ControlMode; 4] = [
        ControlMode::Cursor,
        ControlMode::Scroll,
        ControlMode::Window,
        ControlMode::Media,
    ];

    /// Cursor → Scroll → Window → Media → Cursor.
    pub fn next(self) -> Self {
        match self {
            ControlMode::Cursor => ControlMode::Scroll,
            ControlMode::Scroll => ControlMode::Window,
            ControlMode::Window => ControlMode::Media,
            ControlMode::Media => ControlMode::Cursor,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ControlMode::Cursor => "cursor",
            ControlMode::Scroll => "scroll",
            ControlMode::Window => "window",
            ControlMode::Media => "media",
        }
    }

    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
