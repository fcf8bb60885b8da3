// src/geometry.rs - Angle and distance helpers over landmark points
use nalgebra::{Vector2, Vector3};

/// Angle at vertex `b` formed by `a`-`b`-`c`, in degrees.
///
/// Returns 180° when either arm has zero length, so a collapsed joint
/// reads as straight rather than producing NaN.
pub fn angle_at(a: &Vector3<f64>, b: &Vector3<f64>, c: &Vector3<f64>) -> f64 {
    let v1 = a - b;
    let v2 = c - b;
    angle_between(v1.dot(&v2), v1.norm(), v2.norm())
}

/// Same as [`angle_at`] but in the image plane only (z ignored).
///
/// Landmark depth is much noisier than x/y, so joint straightness is
/// judged on the projection.
pub fn angle_at_2d(a: &Vector3<f64>, b: &Vector3<f64>, c: &Vector3<f64>) -> f64 {
    let v1 = project(a) - project(b);
    let v2 = project(c) - project(b);
    angle_between(v1.dot(&v2), v1.norm(), v2.norm())
}

fn angle_between(dot: f64, mag1: f64, mag2: f64) -> f64 {
    if mag1 == 0.0 || mag2 == 0.0 {
        return 180.0;
    }

    let cos_angle = (dot / (mag1 * mag2)).clamp(-1.0, 1.0);
    cos_angle.acos().to_degrees()
}

/// Euclidean distance in full 3-D normalized space.
pub fn distance(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    (a - b).norm()
}

/// Euclidean distance in the image plane.
pub fn distance_2d(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    (project(a) - project(b)).norm()
}

fn project(p: &Vector3<f64>) -> Vector2<f64> {
    Vector2::new(p.x, p.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_joint_is_180() {
        let a = Vector3::new(0.0, 0.0, 0.0);
        let b = Vector3::new(0.5, 0.0, 0.0);
        let c = Vector3::new(1.0, 0.0, 0.0);
        assert!((angle_at(&a, &b, &c) - 180.0).abs() < 1e-9);
    }

    #[test]
    fn right_angle_is_90() {
        let a = Vector3::new(0.0, 0.0, 0.0);
        let b = Vector3::new(0.5, 0.0, 0.0);
        let c = Vector3::new(0.5, 0.5, 0.0);
        assert!((angle_at(&a, &b, &c) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_arm_reads_as_straight() {
        let a = Vector3::new(0.3, 0.3, 0.0);
        let c = Vector3::new(0.9, 0.1, 0.0);
        assert_eq!(angle_at(&a, &a, &c), 180.0);
        assert_eq!(angle_at_2d(&a, &c, &c), 180.0);
    }

    #[test]
    fn projection_ignores_depth() {
        // Bent in depth only: straight in the image plane.
        let a = Vector3::new(0.0, 0.0, 0.0);
        let b = Vector3::new(0.5, 0.0, 0.4);
        let c = Vector3::new(1.0, 0.0, 0.0);
        assert!(angle_at(&a, &b, &c) < 120.0);
        assert!((angle_at_2d(&a, &b, &c) - 180.0).abs() < 1e-9);
    }

    #[test]
    fn distances() {
        let a = Vector3::new(0.0, 0.0, 0.0);
        let b = Vector3::new(0.3, 0.4, 1.2);
        assert!((distance(&a, &b) - 1.3).abs() < 1e-12);
        assert!((distance_2d(&a, &b) - 0.5).abs() < 1e-12);
    }
}
