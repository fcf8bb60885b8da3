// src/recognizer.rs - Priority-ordered gesture rules over one analyzed frame
use serde::{Deserialize, Serialize};

use crate::fingers::{pip_angle, dip_angle, thumb_ip_angle, HandAnalysis};
use crate::geometry::distance_2d;
use crate::gestures::Gesture;
use crate::landmarks::{Finger, Joint, LandmarkSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureThresholds {
    pub ok_distance: f64,
    pub ok_middle_ratio: f64,
    pub pinch_distance: f64,
    pub l_thumb_angle: f64,
    pub l_thumb_index_mcp_min: f64,
    pub l_thumb_wrist_min: f64,
    pub rock_thumb_middle_mcp_max: f64,
    pub rock_straight_thumb_angle: f64,
    pub rock_spread_min: f64,
    pub rock_index_pip_min: f64,
    pub index_up_angle: f64,
    pub index_up_wrist_min: f64,
    pub index_up_y_tolerance: f64,
    pub grab_min_curled: usize,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            ok_distance: 0.05,
            ok_middle_ratio: 1.5,
            pinch_distance: 0.06,
            l_thumb_angle: 155.0,
            l_thumb_index_mcp_min: 0.12,
            l_thumb_wrist_min: 0.15,
            rock_thumb_middle_mcp_max: 0.10,
            rock_straight_thumb_angle: 160.0,
            rock_spread_min: 0.10,
            rock_index_pip_min: 130.0,
            index_up_angle: 140.0,
            index_up_wrist_min: 0.15,
            index_up_y_tolerance: 0.02,
            grab_min_curled: 3,
        }
    }
}

/// Everything a rule may look at for one frame.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub hand: &'a LandmarkSet,
    pub analysis: &'a HandAnalysis,
}

impl<'a> Frame<'a> {
    pub fn new(hand: &'a LandmarkSet, analysis: &'a HandAnalysis) -> Self {
        Self { hand, analysis }
    }

    fn extended(&self, finger: Finger) -> bool {
        self.analysis.fingers.is_extended(finger)
    }

    fn curled(&self, finger: Finger) -> bool {
        self.analysis.fingers.is_curled(finger)
    }

    fn thumb_to(&self, finger: Finger) -> Option<f64> {
        self.analysis.distances.thumb_to(finger)
    }

    fn planar(&self, a: Joint, b: Joint) -> f64 {
        distance_2d(self.hand.point(a), self.hand.point(b))
    }
}

pub type Predicate = fn(&Frame<'_>, &GestureThresholds) -> bool;

pub struct Rule {
    pub gesture: Gesture,
    pub matches: Predicate,
}

/// Evaluated top to bottom; the first match wins. Tight distance checks come
/// before the broad shape checks that would otherwise shadow them.
pub const RULES: &[Rule] = &[
    Rule { gesture: Gesture::OkSign, matches: is_ok_sign },
    Rule { gesture: Gesture::CallMe, matches: is_call_me },
    Rule { gesture: Gesture::LSign, matches: is_l_sign },
    Rule { gesture: Gesture::RockSign, matches: is_rock_sign },
    Rule { gesture: Gesture::PinchMiddle, matches: is_pinch_middle },
    Rule { gesture: Gesture::PeaceSign, matches: is_peace_sign },
    Rule { gesture: Gesture::RingCurl, matches: is_ring_curl },
    Rule { gesture: Gesture::MiddleCurl, matches: is_middle_curl },
    Rule { gesture: Gesture::PinkyCurl, matches: is_pinky_curl },
    Rule { gesture: Gesture::OpenPalm, matches: is_open_palm },
    Rule { gesture: Gesture::IndexUp, matches: is_index_up },
    Rule { gesture: Gesture::Grab, matches: is_grab },
];

/// Thumb-index circle with the other three fingers open.
pub fn is_ok_sign(frame: &Frame<'_>, t: &GestureThresholds) -> bool {
    let (Some(thumb_index), Some(thumb_middle)) =
        (frame.thumb_to(Finger::Index), frame.thumb_to(Finger::Middle))
    else {
        return false;
    };
    thumb_index < t.ok_distance
        && frame.extended(Finger::Middle)
        && frame.extended(Finger::Ring)
        && frame.extended(Finger::Pinky)
        && thumb_middle >= thumb_index * t.ok_middle_ratio
}

pub fn is_call_me(frame: &Frame<'_>, _: &GestureThresholds) -> bool {
    frame.extended(Finger::Thumb)
        && frame.extended(Finger::Pinky)
        && frame.curled(Finger::Index)
        && frame.curled(Finger::Middle)
        && frame.curled(Finger::Ring)
}

/// Thumb and index out at a right angle. The thumb must be fully straight and
/// well clear of both the index knuckle and the wrist.
pub fn is_l_sign(frame: &Frame<'_>, t: &GestureThresholds) -> bool {
    frame.extended(Finger::Thumb)
        && frame.extended(Finger::Index)
        && frame.curled(Finger::Middle)
        && frame.curled(Finger::Ring)
        && frame.curled(Finger::Pinky)
        && thumb_ip_angle(frame.hand) > t.l_thumb_angle
        && frame.planar(Joint::ThumbTip, Joint::IndexMcp) > t.l_thumb_index_mcp_min
        && frame.planar(Joint::ThumbTip, Joint::Wrist) > t.l_thumb_wrist_min
}

/// Index and pinky horns with the thumb tucked over the middle knuckle.
pub fn is_rock_sign(frame: &Frame<'_>, t: &GestureThresholds) -> bool {
    if !(!frame.extended(Finger::Thumb)
        && frame.extended(Finger::Index)
        && frame.extended(Finger::Pinky)
        && frame.curled(Finger::Middle)
        && frame.curled(Finger::Ring))
    {
        return false;
    }

    let thumb_to_middle_mcp = frame.planar(Joint::ThumbTip, Joint::MiddleMcp);
    if thumb_to_middle_mcp >= t.rock_thumb_middle_mcp_max {
        return false;
    }

    // A straight thumb pointing away from the hand is an L, not a tuck.
    let thumb_straight_out = thumb_ip_angle(frame.hand) > t.rock_straight_thumb_angle
        && frame.planar(Joint::ThumbTip, Joint::Wrist) > t.l_thumb_wrist_min
        && frame.planar(Joint::ThumbTip, Joint::IndexMcp) > t.l_thumb_index_mcp_min;
    if thumb_straight_out {
        return false;
    }

    frame.planar(Joint::IndexTip, Joint::PinkyTip) > t.rock_spread_min
        && pip_angle(frame.hand, Finger::Index) > t.rock_index_pip_min
}

pub fn is_pinch_middle(frame: &Frame<'_>, t: &GestureThresholds) -> bool {
    let (Some(thumb_index), Some(thumb_middle)) =
        (frame.thumb_to(Finger::Index), frame.thumb_to(Finger::Middle))
    else {
        return false;
    };
    thumb_middle < t.pinch_distance && thumb_middle < thumb_index
}

pub fn is_peace_sign(frame: &Frame<'_>, _: &GestureThresholds) -> bool {
    frame.extended(Finger::Index)
        && frame.extended(Finger::Middle)
        && frame.curled(Finger::Ring)
        && frame.curled(Finger::Pinky)
}

fn only_curled(frame: &Frame<'_>, target: Finger) -> bool {
    Finger::ALL.iter().all(|&finger| {
        if finger == target {
            frame.curled(finger)
        } else {
            frame.extended(finger)
        }
    })
}

pub fn is_ring_curl(frame: &Frame<'_>, _: &GestureThresholds) -> bool {
    only_curled(frame, Finger::Ring)
}

pub fn is_middle_curl(frame: &Frame<'_>, _: &GestureThresholds) -> bool {
    only_curled(frame, Finger::Middle)
}

pub fn is_pinky_curl(frame: &Frame<'_>, _: &GestureThresholds) -> bool {
    only_curled(frame, Finger::Pinky)
}

pub fn is_open_palm(frame: &Frame<'_>, _: &GestureThresholds) -> bool {
    frame.analysis.fingers.all_extended()
}

/// Index alone, confirmed geometrically: straight joints, tip not below the
/// knuckle and reaching well away from the wrist.
pub fn is_index_up(frame: &Frame<'_>, t: &GestureThresholds) -> bool {
    if !(frame.extended(Finger::Index)
        && !frame.extended(Finger::Middle)
        && !frame.extended(Finger::Ring)
        && !frame.extended(Finger::Pinky))
    {
        return false;
    }

    let hand = frame.hand;
    let tip = hand.point(Joint::IndexTip);
    let mcp = hand.point(Joint::IndexMcp);

    pip_angle(hand, Finger::Index) > t.index_up_angle
        && dip_angle(hand, Finger::Index) > t.index_up_angle
        && tip.y <= mcp.y + t.index_up_y_tolerance
        && frame.planar(Joint::IndexTip, Joint::Wrist) > t.index_up_wrist_min
}

/// Coarse catch-all for a closed or half-closed hand.
pub fn is_grab(frame: &Frame<'_>, t: &GestureThresholds) -> bool {
    frame.analysis.fingers.curled_count() >= t.grab_min_curled
}

#[derive(Debug, Clone, Default)]
pub struct GestureRecognizer {
    thresholds: GestureThresholds,
}

impl GestureRecognizer {
    pub fn new(thresholds: GestureThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &GestureThresholds {
        &self.thresholds
    }

    /// Pure function of the frame. No analysis (no hand) classifies as NONE.
    pub fn classify(&self, hand: Option<&LandmarkSet>, analysis: Option<&HandAnalysis>) -> Gesture {
        let (Some(hand), Some(analysis)) = (hand, analysis) else {
            return Gesture::None;
        };
        let frame = Frame::new(hand, analysis);
        RULES
            .iter()
            .find(|rule| (rule.matches)(&frame, &self.thresholds))
            .map(|rule| rule.gesture)
            .unwrap_or(Gesture::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingers::{FingerClassifier, FingerThresholds};
    use crate::fixtures::{hand, moved, tip_of, Pose, Thumb};
    use Pose::{Curled as C, Extended as E, Partial as P};

    fn classify(set: &LandmarkSet) -> Gesture {
        let analysis = FingerClassifier::default().analyze(Some(set));
        GestureRecognizer::default().classify(Some(set), analysis.as_ref())
    }

    fn check(set: &LandmarkSet, rule: Predicate) -> bool {
        check_with(set, rule, FingerThresholds::default())
    }

    fn check_with(set: &LandmarkSet, rule: Predicate, fingers: FingerThresholds) -> bool {
        let analysis = FingerClassifier::new(fingers)
            .analyze(Some(set))
            .unwrap();
        rule(&Frame::new(set, &analysis), &GestureThresholds::default())
    }

    fn thumb_extended(set: &LandmarkSet) -> bool {
        FingerClassifier::default().is_extended(set, Finger::Thumb)
    }

    #[test]
    fn open_palm() {
        assert_eq!(classify(&hand(Thumb::Out, [E, E, E, E])), Gesture::OpenPalm);
    }

    #[test]
    fn ok_sign_beats_pinch() {
        let (x, y) = tip_of(Finger::Index, C);
        let set = hand(Thumb::To(x, y), [C, E, E, E]);
        assert!(check(&set, is_ok_sign));
        assert!(!check(&set, is_pinch_middle));
        assert_eq!(classify(&set), Gesture::OkSign);
    }

    #[test]
    fn ok_sign_needs_middle_clear_of_thumb() {
        // Thumb 0.04 from the index tip; the middle tip sits at 0.059 or 0.061.
        let near = moved(
            &hand(Thumb::To(0.50, 0.524), [C, E, E, E]),
            &[(Joint::IndexTip, (0.50, 0.564))],
        );
        assert!(!check(&near, is_ok_sign));

        let clear = moved(
            &hand(Thumb::To(0.50, 0.526), [C, E, E, E]),
            &[(Joint::IndexTip, (0.50, 0.566))],
        );
        assert!(check(&clear, is_ok_sign));
        assert_eq!(classify(&clear), Gesture::OkSign);
    }

    #[test]
    fn call_me() {
        assert_eq!(classify(&hand(Thumb::Out, [C, C, C, E])), Gesture::CallMe);
    }

    #[test]
    fn l_sign() {
        let set = hand(Thumb::Out, [E, C, C, C]);
        assert!(check(&set, is_l_sign));
        assert_eq!(classify(&set), Gesture::LSign);
    }

    #[test]
    fn l_sign_rejects_thumb_near_wrist() {
        let set = hand(Thumb::To(0.40, 0.76), [E, C, C, C]);
        assert!(thumb_extended(&set));
        assert!(distance_2d(set.point(Joint::ThumbTip), set.point(Joint::IndexMcp)) > 0.12);
        assert!(distance_2d(set.point(Joint::ThumbTip), set.point(Joint::Wrist)) <= 0.15);
        assert!(!check(&set, is_l_sign));
        assert_ne!(classify(&set), Gesture::LSign);
    }

    #[test]
    fn thumb_near_index_knuckle_is_not_l_or_rock() {
        let set = hand(Thumb::To(0.40, 0.62), [E, C, C, C]);
        assert!(!check(&set, is_l_sign));
        assert!(!check(&set, is_rock_sign));
        let result = classify(&set);
        assert_ne!(result, Gesture::LSign);
        assert_ne!(result, Gesture::RockSign);
    }

    #[test]
    fn rock_sign() {
        let set = hand(Thumb::Tucked, [E, C, C, E]);
        assert!(check(&set, is_rock_sign));
        assert_eq!(classify(&set), Gesture::RockSign);
    }

    #[test]
    fn rock_rejects_straight_thumb_out() {
        let set = hand(Thumb::Out, [E, C, C, E]);
        assert!(!check(&set, is_rock_sign));
    }

    #[test]
    fn rock_rejects_extended_thumb_across_palm() {
        // Close to the middle knuckle, but straight and clear of the index knuckle.
        let set = hand(Thumb::To(0.55, 0.62), [E, C, C, E]);
        assert!(thumb_extended(&set));
        assert!(distance_2d(set.point(Joint::ThumbTip), set.point(Joint::MiddleMcp)) < 0.10);
        assert!(!check(&set, is_rock_sign));
        assert_ne!(classify(&set), Gesture::RockSign);
    }

    #[test]
    fn rock_rejects_narrow_horns() {
        // Pinky leaning in until its tip nearly meets the index tip.
        let set = moved(
            &hand(Thumb::Tucked, [E, C, C, E]),
            &[
                (Joint::PinkyPip, (0.56, 0.58)),
                (Joint::PinkyDip, (0.52, 0.54)),
                (Joint::PinkyTip, (0.48, 0.50)),
            ],
        );
        assert!(FingerClassifier::default().is_extended(&set, Finger::Pinky));
        assert!(distance_2d(set.point(Joint::IndexTip), set.point(Joint::PinkyTip)) <= 0.10);
        assert!(!check(&set, is_rock_sign));
    }

    #[test]
    fn rock_rejects_bent_index() {
        // Index bent 55° at the PIP: extended under a loose 120° threshold,
        // but below the 130° floor.
        let set = moved(
            &hand(Thumb::Tucked, [E, C, C, E]),
            &[
                (Joint::IndexDip, (0.4113, 0.5299)),
                (Joint::IndexTip, (0.3867, 0.5127)),
            ],
        );
        let loose = FingerThresholds {
            extended_angle: 120.0,
            ..FingerThresholds::default()
        };
        assert!(FingerClassifier::new(loose.clone()).is_extended(&set, Finger::Index));
        assert!(crate::fingers::pip_angle(&set, Finger::Index) <= 130.0);
        assert!(distance_2d(set.point(Joint::ThumbTip), set.point(Joint::MiddleMcp)) < 0.10);
        assert!(!check_with(&set, is_rock_sign, loose));
    }

    #[test]
    fn pinch_middle() {
        let (x, y) = tip_of(Finger::Middle, C);
        let set = hand(Thumb::To(x, y), [E, C, E, E]);
        assert!(check(&set, is_pinch_middle));
        assert_eq!(classify(&set), Gesture::PinchMiddle);
    }

    #[test]
    fn peace_sign() {
        assert_eq!(classify(&hand(Thumb::Tucked, [E, E, C, C])), Gesture::PeaceSign);
    }

    #[test]
    fn single_curls() {
        assert_eq!(classify(&hand(Thumb::Out, [E, E, C, E])), Gesture::RingCurl);
        assert_eq!(classify(&hand(Thumb::Out, [E, C, E, E])), Gesture::MiddleCurl);
        assert_eq!(classify(&hand(Thumb::Out, [E, E, E, C])), Gesture::PinkyCurl);
    }

    #[test]
    fn index_up() {
        let set = hand(Thumb::Tucked, [E, C, C, C]);
        assert!(check(&set, is_index_up));
        assert_eq!(classify(&set), Gesture::IndexUp);
    }

    #[test]
    fn index_up_rejects_tip_below_knuckle() {
        // Straight index pointing down and out to the side.
        let set = moved(
            &hand(Thumb::Tucked, [E, C, C, C]),
            &[
                (Joint::IndexPip, (0.392, 0.614)),
                (Joint::IndexDip, (0.3584, 0.6244)),
                (Joint::IndexTip, (0.3296, 0.633)),
            ],
        );
        assert!(FingerClassifier::default().is_extended(&set, Finger::Index));
        assert!(distance_2d(set.point(Joint::IndexTip), set.point(Joint::Wrist)) > 0.15);
        assert!(!check(&set, is_index_up));
        assert_ne!(classify(&set), Gesture::IndexUp);
    }

    #[test]
    fn index_up_rejects_tip_near_wrist() {
        let set = moved(
            &hand(Thumb::Tucked, [E, C, C, C]),
            &[
                (Joint::IndexMcp, (0.47, 0.86)),
                (Joint::IndexPip, (0.47, 0.83)),
                (Joint::IndexDip, (0.47, 0.81)),
                (Joint::IndexTip, (0.47, 0.79)),
            ],
        );
        assert!(FingerClassifier::default().is_extended(&set, Finger::Index));
        assert!(!check(&set, is_index_up));
        assert_ne!(classify(&set), Gesture::IndexUp);
    }

    #[test]
    fn grab() {
        assert_eq!(classify(&hand(Thumb::Tucked, [C, C, C, C])), Gesture::Grab);
    }

    #[test]
    fn loose_hand_is_none() {
        assert_eq!(classify(&hand(Thumb::Tucked, [P, P, P, P])), Gesture::None);
    }

    #[test]
    fn no_hand_is_none() {
        assert_eq!(GestureRecognizer::default().classify(None, None), Gesture::None);
    }

    #[test]
    fn missing_distance_fails_closed() {
        let set = hand(Thumb::Out, [E, E, E, E]);
        let mut analysis = FingerClassifier::default().analyze(Some(&set)).unwrap();
        analysis.distances = crate::fingers::FingertipDistances::new(Some(0.0), None, None, None);
        let frame = Frame::new(&set, &analysis);
        let t = GestureThresholds::default();
        assert!(!is_ok_sign(&frame, &t));
        assert!(!is_pinch_middle(&frame, &t));
    }

    #[test]
    fn table_order_is_priority_order() {
        let order: Vec<_> = RULES.iter().map(|r| r.gesture).collect();
        assert_eq!(
            order,
            vec![
                Gesture::OkSign,
                Gesture::CallMe,
                Gesture::LSign,
                Gesture::RockSign,
                Gesture::PinchMiddle,
                Gesture::PeaceSign,
                Gesture::RingCurl,
                Gesture::MiddleCurl,
                Gesture::PinkyCurl,
                Gesture::OpenPalm,
                Gesture::IndexUp,
                Gesture::Grab,
            ]
        );
    }
}
