// src/fingers.rs - Per-finger extended/curled states and thumb-to-tip distances
use serde::{Deserialize, Serialize};

use crate::geometry::{angle_at_2d, distance, distance_2d};
use crate::landmarks::{Finger, Joint, LandmarkSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerThresholds {
    /// PIP and DIP must both exceed this (degrees) for a finger to count as extended.
    pub extended_angle: f64,
    /// PIP below this (degrees) counts as curled.
    pub curled_pip_angle: f64,
    /// Thumb IP angle (degrees) required for an extended thumb.
    pub thumb_extended_angle: f64,
    /// Image-plane distance thumb tip to index MCP required for an extended thumb.
    pub thumb_index_mcp_min: f64,
}

impl Default for FingerThresholds {
    fn default() -> Self {
        Self {
            extended_angle: 140.0,
            curled_pip_angle: 150.0,
            thumb_extended_angle: 140.0,
            thumb_index_mcp_min: 0.08,
        }
    }
}

/// Extended flags for all five fingers and curled flags for the four others.
///
/// The two are computed independently: a finger mid-transition is often
/// neither extended nor curled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FingerStates {
    extended: [bool; 5],
    curled: [bool; 4],
}

impl FingerStates {
    pub fn new(extended: [bool; 5], curled: [bool; 4]) -> Self {
        Self { extended, curled }
    }

    pub fn is_extended(&self, finger: Finger) -> bool {
        self.extended[finger as usize]
    }

    /// Always false for the thumb, which has no curl predicate.
    pub fn is_curled(&self, finger: Finger) -> bool {
        match finger {
            Finger::Thumb => false,
            other => self.curled[other as usize - 1],
        }
    }

    /// Neither extended nor curled.
    pub fn is_partial(&self, finger: Finger) -> bool {
        !self.is_extended(finger) && !self.is_curled(finger)
    }

    pub fn all_extended(&self) -> bool {
        self.extended.iter().all(|e| *e)
    }

    pub fn curled_count(&self) -> usize {
        self.curled.iter().filter(|c| **c).count()
    }
}

/// Thumb-tip to fingertip distances in normalized 3-D space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FingertipDistances {
    values: [Option<f64>; 4],
}

impl FingertipDistances {
    pub fn new(index: Option<f64>, middle: Option<f64>, ring: Option<f64>, pinky: Option<f64>) -> Self {
        Self {
            values: [index, middle, ring, pinky],
        }
    }

    /// Distance from the thumb tip to `finger`'s tip; `None` for the thumb itself
    /// or when a tip could not be looked up.
    pub fn thumb_to(&self, finger: Finger) -> Option<f64> {
        match finger {
            Finger::Thumb => None,
            other => self.values[other as usize - 1],
        }
    }
}

/// Per-frame finger analysis consumed by the recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct HandAnalysis {
    pub fingers: FingerStates,
    pub distances: FingertipDistances,
}

#[derive(Debug, Clone, Default)]
pub struct FingerClassifier {
    thresholds: FingerThresholds,
}

impl FingerClassifier {
    pub fn new(thresholds: FingerThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &FingerThresholds {
        &self.thresholds
    }

    /// `None` when there is no hand; callers treat that frame as no gesture.
    pub fn analyze(&self, hand: Option<&LandmarkSet>) -> Option<HandAnalysis> {
        let hand = hand?;
        Some(HandAnalysis {
            fingers: self.finger_states(hand),
            distances: fingertip_distances(hand),
        })
    }

    pub fn finger_states(&self, hand: &LandmarkSet) -> FingerStates {
        let extended = Finger::ALL.map(|finger| self.is_extended(hand, finger));
        let curled = Finger::NON_THUMB.map(|finger| self.is_curled(hand, finger));
        FingerStates::new(extended, curled)
    }

    pub fn is_extended(&self, hand: &LandmarkSet, finger: Finger) -> bool {
        if finger == Finger::Thumb {
            return self.is_thumb_extended(hand);
        }
        pip_angle(hand, finger) > self.thresholds.extended_angle
            && dip_angle(hand, finger) > self.thresholds.extended_angle
    }

    pub fn is_curled(&self, hand: &LandmarkSet, finger: Finger) -> bool {
        if finger == Finger::Thumb {
            return false;
        }
        pip_angle(hand, finger) < self.thresholds.curled_pip_angle
    }

    /// A straight thumb lying against the palm is not extended: the tip must
    /// also be clear of the index knuckle.
    fn is_thumb_extended(&self, hand: &LandmarkSet) -> bool {
        thumb_ip_angle(hand) > self.thresholds.thumb_extended_angle
            && distance_2d(hand.point(Joint::ThumbTip), hand.point(Joint::IndexMcp))
                > self.thresholds.thumb_index_mcp_min
    }
}

/// Image-plane angle at the PIP joint (MCP-PIP-DIP). For the thumb, the MCP angle.
pub fn pip_angle(hand: &LandmarkSet, finger: Finger) -> f64 {
    let [base, pip, dip, _] = finger.joints();
    angle_at_2d(hand.point(base), hand.point(pip), hand.point(dip))
}

/// Image-plane angle at the DIP joint (PIP-DIP-TIP). For the thumb, the IP angle.
pub fn dip_angle(hand: &LandmarkSet, finger: Finger) -> f64 {
    let [_, pip, dip, tip] = finger.joints();
    angle_at_2d(hand.point(pip), hand.point(dip), hand.point(tip))
}

/// Image-plane angle at the thumb IP joint (MCP-IP-TIP).
pub fn thumb_ip_angle(hand: &LandmarkSet) -> f64 {
    dip_angle(hand, Finger::Thumb)
}

pub fn fingertip_distances(hand: &LandmarkSet) -> FingertipDistances {
    let thumb_tip = hand.get(Joint::ThumbTip.index());
    let [index, middle, ring, pinky] = Finger::NON_THUMB.map(|finger| {
        let tip = hand.get(finger.tip().index());
        thumb_tip.zip(tip).map(|(a, b)| distance(a, b))
    });
    FingertipDistances::new(index, middle, ring, pinky)
}

/// Tilt of a V sign from vertical, in degrees: 0 points straight up,
/// positive leans toward +x.
pub fn peace_sign_angle(hand: &LandmarkSet) -> f64 {
    let index_tip = hand.point(Joint::IndexTip);
    let middle_tip = hand.point(Joint::MiddleTip);
    let index_mcp = hand.point(Joint::IndexMcp);
    let middle_mcp = hand.point(Joint::MiddleMcp);

    let tip_mid_x = (index_tip.x + middle_tip.x) / 2.0;
    let tip_mid_y = (index_tip.y + middle_tip.y) / 2.0;
    let mcp_mid_x = (index_mcp.x + middle_mcp.x) / 2.0;
    let mcp_mid_y = (index_mcp.y + middle_mcp.y) / 2.0;

    // Image y grows downward.
    let dx = tip_mid_x - mcp_mid_x;
    let dy = tip_mid_y - mcp_mid_y;
    dx.atan2(-dy).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{hand, Pose, Thumb};

    #[test]
    fn extended_and_curled_fingers() {
        let classifier = FingerClassifier::default();
        let set = hand(
            Thumb::Out,
            [Pose::Extended, Pose::Curled, Pose::Extended, Pose::Curled],
        );
        let states = classifier.finger_states(&set);

        assert!(states.is_extended(Finger::Thumb));
        assert!(states.is_extended(Finger::Index));
        assert!(!states.is_curled(Finger::Index));
        assert!(states.is_curled(Finger::Middle));
        assert!(!states.is_extended(Finger::Middle));
        assert!(states.is_extended(Finger::Ring));
        assert!(states.is_curled(Finger::Pinky));
        assert_eq!(states.curled_count(), 2);
    }

    #[test]
    fn partial_finger_is_neither() {
        let classifier = FingerClassifier::default();
        let set = hand(
            Thumb::Tucked,
            [Pose::Partial, Pose::Partial, Pose::Partial, Pose::Partial],
        );
        let states = classifier.finger_states(&set);
        for finger in Finger::NON_THUMB {
            assert!(states.is_partial(finger), "{} should be partial", finger.as_str());
        }
        assert!((pip_angle(&set, Finger::Index) - 160.0).abs() < 1e-6);
        assert!((dip_angle(&set, Finger::Index) - 130.0).abs() < 1e-6);
    }

    #[test]
    fn tucked_thumb_is_not_extended() {
        let classifier = FingerClassifier::default();
        let set = hand(Thumb::Tucked, [Pose::Curled; 4]);
        assert!(!classifier.is_extended(&set, Finger::Thumb));
    }

    #[test]
    fn straight_thumb_near_palm_is_not_extended() {
        let classifier = FingerClassifier::default();
        // Straight chain, tip about 0.045 from the index MCP.
        let set = hand(Thumb::To(0.40, 0.62), [Pose::Curled; 4]);
        assert!(thumb_ip_angle(&set) > 170.0);
        assert!(!classifier.is_extended(&set, Finger::Thumb));
    }

    #[test]
    fn thumb_never_curled() {
        let classifier = FingerClassifier::default();
        let set = hand(Thumb::Tucked, [Pose::Curled; 4]);
        assert!(!classifier.is_curled(&set, Finger::Thumb));
        assert!(!classifier.finger_states(&set).is_curled(Finger::Thumb));
    }

    #[test]
    fn distances_are_three_dimensional() {
        let set = hand(Thumb::Out, [Pose::Extended; 4]);
        let distances = fingertip_distances(&set);
        let expected = distance(set.point(Joint::ThumbTip), set.point(Joint::IndexTip));
        assert_eq!(distances.thumb_to(Finger::Index), Some(expected));
        assert!(distances.thumb_to(Finger::Thumb).is_none());
        assert!(distances.thumb_to(Finger::Pinky).is_some());
    }

    #[test]
    fn no_hand_no_analysis() {
        let classifier = FingerClassifier::default();
        assert!(classifier.analyze(None).is_none());
    }

    #[test]
    fn peace_angle_upright_is_zero() {
        let set = hand(
            Thumb::Tucked,
            [Pose::Extended, Pose::Extended, Pose::Curled, Pose::Curled],
        );
        assert!(peace_sign_angle(&set).abs() < 1e-9);
    }
}
