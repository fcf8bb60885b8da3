//! Synthetic hand poses for tests.
//!
//! Hand points up the image (y grows downward), wrist at (0.50, 0.80).
//! Extended fingers are straight chains; curled fingers fold 120° at the
//! PIP and 90° at the DIP; partial fingers bend 20° / 50° so they are
//! neither extended nor curled.
use nalgebra::Vector3;

use crate::landmarks::{Finger, Joint, LandmarkSet, LANDMARK_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pose {
    Extended,
    Curled,
    Partial,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Thumb {
    /// Straight, pointing away from the palm.
    Out,
    /// Bent across the palm near the middle knuckle.
    Tucked,
    /// Straight from the thumb MCP to the given tip.
    To(f64, f64),
}

pub const WRIST: (f64, f64) = (0.50, 0.80);
pub const INDEX_MCP: (f64, f64) = (0.44, 0.60);
pub const MIDDLE_MCP: (f64, f64) = (0.50, 0.58);
const THUMB_CMC: (f64, f64) = (0.44, 0.75);

fn mcp(finger: Finger) -> (f64, f64) {
    match finger {
        Finger::Thumb => THUMB_CMC,
        Finger::Index => INDEX_MCP,
        Finger::Middle => MIDDLE_MCP,
        Finger::Ring => (0.56, 0.60),
        Finger::Pinky => (0.61, 0.63),
    }
}

fn segments(finger: Finger) -> [f64; 3] {
    match finger {
        Finger::Pinky => [0.04, 0.025, 0.02],
        _ => [0.05, 0.035, 0.03],
    }
}

fn rotate(v: (f64, f64), degrees: f64) -> (f64, f64) {
    let (s, c) = degrees.to_radians().sin_cos();
    (v.0 * c - v.1 * s, v.0 * s + v.1 * c)
}

fn chain(finger: Finger, pose: Pose) -> [(f64, f64); 4] {
    let (pip_bend, dip_bend) = match pose {
        Pose::Extended => (0.0, 0.0),
        Pose::Curled => (120.0, 90.0),
        Pose::Partial => (20.0, 50.0),
    };
    let [l1, l2, l3] = segments(finger);
    let up = (0.0, -1.0);
    let p0 = mcp(finger);
    let p1 = (p0.0 + up.0 * l1, p0.1 + up.1 * l1);
    let d1 = rotate(up, pip_bend);
    let p2 = (p1.0 + d1.0 * l2, p1.1 + d1.1 * l2);
    let d2 = rotate(up, pip_bend + dip_bend);
    let p3 = (p2.0 + d2.0 * l3, p2.1 + d2.1 * l3);
    [p0, p1, p2, p3]
}

fn thumb_chain(thumb: Thumb) -> [(f64, f64); 4] {
    match thumb {
        Thumb::Out => [THUMB_CMC, (0.38, 0.70), (0.33, 0.70), (0.28, 0.70)],
        Thumb::Tucked => [(0.44, 0.76), (0.42, 0.72), (0.45, 0.67), (0.49, 0.66)],
        Thumb::To(x, y) => {
            let mcp = (0.40, 0.70);
            [THUMB_CMC, mcp, ((mcp.0 + x) / 2.0, (mcp.1 + y) / 2.0), (x, y)]
        }
    }
}

/// Builds a hand from a thumb shape and index/middle/ring/pinky poses.
pub fn hand(thumb: Thumb, fingers: [Pose; 4]) -> LandmarkSet {
    let mut points = [Vector3::zeros(); LANDMARK_COUNT];
    points[Joint::Wrist.index()] = Vector3::new(WRIST.0, WRIST.1, 0.0);

    for (joint, (x, y)) in Finger::Thumb.joints().iter().zip(thumb_chain(thumb)) {
        points[joint.index()] = Vector3::new(x, y, 0.0);
    }
    for (finger, pose) in Finger::NON_THUMB.iter().zip(fingers) {
        for (joint, (x, y)) in finger.joints().iter().zip(chain(*finger, pose)) {
            points[joint.index()] = Vector3::new(x, y, 0.0);
        }
    }

    LandmarkSet::from_finite(points)
}

/// `set` with the given joints moved in the image plane.
pub fn moved(set: &LandmarkSet, joints: &[(Joint, (f64, f64))]) -> LandmarkSet {
    let mut points = *set.points();
    for &(joint, (x, y)) in joints {
        points[joint.index()] = Vector3::new(x, y, 0.0);
    }
    LandmarkSet::from_finite(points)
}

pub fn open_palm() -> LandmarkSet {
    hand(Thumb::Out, [Pose::Extended; 4])
}

/// Tip position a non-thumb finger would have in the given pose.
pub fn tip_of(finger: Finger, pose: Pose) -> (f64, f64) {
    chain(finger, pose)[3]
}
