// src/landmarks.rs - 21-point hand landmark set and joint roles
use nalgebra::Vector3;
use thiserror::Error;

pub const LANDMARK_COUNT: usize = 21;

/// Fixed joint roles of the 21-point hand model, in provider order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Joint {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

impl Joint {
    pub const fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    /// The four fingers that have MCP/PIP/DIP joints.
    pub const NON_THUMB: [Finger; 4] = [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky];

    /// Joints from base to tip. For the thumb this is CMC, MCP, IP, TIP.
    pub const fn joints(self) -> [Joint; 4] {
        match self {
            Finger::Thumb => [Joint::ThumbCmc, Joint::ThumbMcp, Joint::ThumbIp, Joint::ThumbTip],
            Finger::Index => [Joint::IndexMcp, Joint::IndexPip, Joint::IndexDip, Joint::IndexTip],
            Finger::Middle => [Joint::MiddleMcp, Joint::MiddlePip, Joint::MiddleDip, Joint::MiddleTip],
            Finger::Ring => [Joint::RingMcp, Joint::RingPip, Joint::RingDip, Joint::RingTip],
            Finger::Pinky => [Joint::PinkyMcp, Joint::PinkyPip, Joint::PinkyDip, Joint::PinkyTip],
        }
    }

    pub const fn tip(self) -> Joint {
        self.joints()[3]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Finger::Thumb => "thumb",
            Finger::Index => "index",
            Finger::Middle => "middle",
            Finger::Ring => "ring",
            Finger::Pinky => "pinky",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LandmarkError {
    #[error("expected 21 landmarks, got {0}")]
    WrongCount(usize),

    #[error("landmark {index} has a non-finite coordinate")]
    NonFinite { index: usize },
}

/// One frame's hand: 21 points, x/y normalized to image space, z relative to the wrist.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSet {
    points: [Vector3<f64>; LANDMARK_COUNT],
    handedness: Option<String>,
}

impl LandmarkSet {
    pub fn new(points: [Vector3<f64>; LANDMARK_COUNT]) -> Result<Self, LandmarkError> {
        if let Some(index) = points.iter().position(|p| !p.iter().all(|c| c.is_finite())) {
            return Err(LandmarkError::NonFinite { index });
        }
        Ok(Self {
            points,
            handedness: None,
        })
    }

    /// For points that are finite by construction.
    pub(crate) fn from_finite(points: [Vector3<f64>; LANDMARK_COUNT]) -> Self {
        debug_assert!(points.iter().all(|p| p.iter().all(|c| c.is_finite())));
        Self {
            points,
            handedness: None,
        }
    }

    /// Builds a set from raw `[x, y, z]` triples as delivered by a landmark provider.
    pub fn from_slice(raw: &[[f64; 3]]) -> Result<Self, LandmarkError> {
        if raw.len() != LANDMARK_COUNT {
            return Err(LandmarkError::WrongCount(raw.len()));
        }
        let points = std::array::from_fn(|i| Vector3::new(raw[i][0], raw[i][1], raw[i][2]));
        Self::new(points)
    }

    pub fn with_handedness(mut self, handedness: impl Into<String>) -> Self {
        self.handedness = Some(handedness.into());
        self
    }

    pub fn handedness(&self) -> Option<&str> {
        self.handedness.as_deref()
    }

    pub fn point(&self, joint: Joint) -> &Vector3<f64> {
        &self.points[joint.index()]
    }

    /// Lookup by raw provider index.
    pub fn get(&self, index: usize) -> Option<&Vector3<f64>> {
        self.points.get(index)
    }

    pub fn points(&self) -> &[Vector3<f64>; LANDMARK_COUNT] {
        &self.points
    }

    pub fn tip(&self, finger: Finger) -> &Vector3<f64> {
        self.point(finger.tip())
    }

    /// Pixel coordinates of a joint for a frame of the given size.
    pub fn to_pixels(&self, joint: Joint, frame_width: u32, frame_height: u32) -> (i32, i32) {
        let p = self.point(joint);
        (
            (p.x * frame_width as f64) as i32,
            (p.y * frame_height as f64) as i32,
        )
    }
}
