//! 2D rigid-body coordinate frames.
//!
//! A frame is a position (x, z) and a rotation about the out-of-plane y axis
//! (nose down positive) relative to a parent frame. Every chain of parents ends
//! at the datum, the world frame with no parent and an identity transform.
//!
//! Frames are immutable values shared through `Arc`. A body whose location
//! changes builds a new frame rather than mutating the one other bodies may
//! still reference.

use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    parent: Option<Arc<Frame>>,
    pos_x: f64,
    pos_z: f64,
    rot_y: f64,
}

impl Frame {
    /// The root world frame.
    pub fn datum() -> Arc<Frame> {
        Arc::new(Frame {
            parent: None,
            pos_x: 0.0,
            pos_z: 0.0,
            rot_y: 0.0,
        })
    }

    /// A frame located at (`pos_x`, `pos_z`) [m] with rotation `rot_y` [rad],
    /// all expressed in `parent` coordinates.
    pub fn new(parent: Arc<Frame>, pos_x: f64, pos_z: f64, rot_y: f64) -> Arc<Frame> {
        Arc::new(Frame {
            parent: Some(parent),
            pos_x,
            pos_z,
            rot_y,
        })
    }

    pub fn parent(&self) -> Option<&Arc<Frame>> {
        self.parent.as_ref()
    }

    pub fn is_datum(&self) -> bool {
        self.parent.is_none()
    }

    /// Local (x, z, rot_y) relative to the parent.
    pub fn location(&self) -> (f64, f64, f64) {
        (self.pos_x, self.pos_z, self.rot_y)
    }

    /// Same local location, hung from a different parent.
    pub fn reparented(&self, parent: Arc<Frame>) -> Arc<Frame> {
        Frame::new(parent, self.pos_x, self.pos_z, self.rot_y)
    }

    pub fn origin_in_datum(&self) -> (f64, f64) {
        match &self.parent {
            None => (0.0, 0.0),
            Some(parent) => {
                let (ref_x, ref_z) = parent.origin_in_datum();
                let (dx, dz) = rotate_to(self.pos_x, self.pos_z, parent.rotation_in_datum());
                (ref_x + dx, ref_z + dz)
            }
        }
    }

    pub fn rotation_in_datum(&self) -> f64 {
        match &self.parent {
            None => 0.0,
            Some(parent) => parent.rotation_in_datum() + self.rot_y,
        }
    }

    /// Re-expresses a vector given in this frame's coordinates in `target`'s coordinates.
    pub fn vector_to_frame(&self, x: f64, z: f64, target: &Frame) -> (f64, f64) {
        rotate_to(x, z, self.rotation_in_datum() - target.rotation_in_datum())
    }

    /// Re-expresses a vector given in `source`'s coordinates in this frame's coordinates.
    pub fn vector_from_frame(&self, x: f64, z: f64, source: &Frame) -> (f64, f64) {
        rotate_from(x, z, self.rotation_in_datum() - source.rotation_in_datum())
    }

    /// Position of a point given in this frame's coordinates, expressed in `target`.
    pub fn point_to_frame(&self, x: f64, z: f64, target: &Frame) -> (f64, f64) {
        let (ox, oz) = self.origin_in_datum();
        let (tx, tz) = target.origin_in_datum();
        let datum_rot = self.rotation_in_datum();
        let (px, pz) = rotate_to(x, z, datum_rot);
        let (dx, dz) = (ox + px - tx, oz + pz - tz);
        rotate_from(dx, dz, target.rotation_in_datum())
    }
}

// Rotation of components from a frame rotated by `rel` into the reference frame.
// A zero rotation passes components through untouched, so a non-finite
// component stays on its own axis.
fn rotate_to(x: f64, z: f64, rel: f64) -> (f64, f64) {
    if rel == 0.0 {
        return (x, z);
    }
    let (s, c) = rel.sin_cos();
    (x * c + z * s, -x * s + z * c)
}

fn rotate_from(x: f64, z: f64, rel: f64) -> (f64, f64) {
    if rel == 0.0 {
        return (x, z);
    }
    let (s, c) = rel.sin_cos();
    (x * c - z * s, x * s + z * c)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    fn close(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < TOL && (a.1 - b.1).abs() < TOL
    }

    #[test]
    fn datum_is_identity() {
        let datum = Frame::datum();
        assert!(datum.is_datum());
        assert_eq!(datum.origin_in_datum(), (0.0, 0.0));
        assert_eq!(datum.rotation_in_datum(), 0.0);
    }

    #[test]
    fn origin_composes_through_rotated_parent() {
        let datum = Frame::datum();
        let hull = Frame::new(datum, 0.0, -1.0, std::f64::consts::FRAC_PI_2);
        let foil = Frame::new(hull.clone(), 2.0, 0.0, 0.1);

        // Nose-down quarter turn points the hull x-axis straight down.
        let (x, z) = foil.origin_in_datum();
        assert!(close((x, z), (0.0, -3.0)), "got ({x}, {z})");
        assert!((foil.rotation_in_datum() - (std::f64::consts::FRAC_PI_2 + 0.1)).abs() < TOL);
    }

    #[test]
    fn vector_round_trip_between_frames() {
        let datum = Frame::datum();
        let a = Frame::new(datum.clone(), 1.0, -2.0, 0.3);
        let b = Frame::new(a.clone(), -4.0, 0.5, -1.1);
        let c = Frame::new(datum, 0.0, 0.0, 2.7);

        for (fa, fb) in [(&a, &b), (&b, &c), (&c, &a), (&a, &a)] {
            for v in [(1.0, 0.0), (0.0, 1.0), (-3.5, 12.25), (1e5, -2e4)] {
                let (x, z) = fa.vector_to_frame(v.0, v.1, fb);
                let back = fa.vector_from_frame(x, z, fb);
                assert!(close(back, v), "{back:?} != {v:?}");
            }
        }
    }

    #[test]
    fn nose_down_rotation_tilts_lift_forward() {
        let datum = Frame::datum();
        let trimmed = Frame::new(datum.clone(), 0.0, 0.0, 0.2);
        // Body-normal force seen from the datum leans toward +x for a nose-down frame.
        let (x, z) = trimmed.vector_to_frame(0.0, 1.0, &datum);
        assert!(x > 0.0 && z > 0.0);
    }

    #[test]
    fn point_to_frame_recovers_relative_position() {
        let datum = Frame::datum();
        let hull = Frame::new(datum, 0.0, -1.5, 0.05);
        let foil = Frame::new(hull.clone(), 17.75, 0.75, -0.08);

        let origin = foil.point_to_frame(0.0, 0.0, &hull);
        assert!(close(origin, (17.75, 0.75)), "{origin:?}");

        let offset = foil.point_to_frame(-0.375, 0.0, &hull);
        let expected = foil.vector_to_frame(-0.375, 0.0, &hull);
        assert!(close(offset, (17.75 + expected.0, 0.75 + expected.1)));
    }

    #[test]
    fn reparenting_keeps_local_location() {
        let datum = Frame::datum();
        let old_hull = Frame::new(datum.clone(), 0.0, -1.0, 0.0);
        let new_hull = Frame::new(datum, 0.0, -2.0, 0.0);
        let foil = Frame::new(old_hull, 3.0, 0.5, -0.1);
        let moved = foil.reparented(new_hull);
        assert_eq!(moved.location(), foil.location());
        assert!((moved.origin_in_datum().1 - (-1.5)).abs() < TOL);
    }

    #[test]
    fn unrotated_transform_keeps_axes_separate() {
        let hull = Frame::new(Frame::datum(), 0.0, -1.0, 0.0);
        let (x, z) = hull.vector_to_frame(f64::NEG_INFINITY, 2.0, &Frame::datum());
        assert_eq!(x, f64::NEG_INFINITY);
        assert_eq!(z, 2.0);
        let (x, z) = hull.vector_from_frame(f64::NEG_INFINITY, 2.0, &Frame::datum());
        assert_eq!((x, z), (f64::NEG_INFINITY, 2.0));
    }
}
