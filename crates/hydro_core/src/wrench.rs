use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::frame::Frame;

/// Force-moment pair in an implicit frame.
///
/// The wrench does not record which frame it is expressed in; callers must
/// transform before summing wrenches from different bodies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Wrench {
    /// [N]
    pub fx: f64,
    /// [N]
    pub fz: f64,
    /// [N m], nose down positive
    pub my: f64,
}

impl Wrench {
    pub const ZERO: Wrench = Wrench {
        fx: 0.0,
        fz: 0.0,
        my: 0.0,
    };

    pub fn new(fx: f64, fz: f64, my: f64) -> Self {
        Self { fx, fz, my }
    }

    pub fn force(&self) -> (f64, f64) {
        (self.fx, self.fz)
    }

    pub fn moment(&self) -> f64 {
        self.my
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.fx * factor, self.fz * factor, self.my * factor)
    }

    /// Rotates the force from `from` coordinates into `to` coordinates.
    /// The moment is unchanged by a pure rotation.
    pub fn rotated(&self, from: &Frame, to: &Frame) -> Self {
        let (fx, fz) = from.vector_to_frame(self.fx, self.fz, to);
        Self::new(fx, fz, self.my)
    }

    /// Moment of a force (fx, fz) applied at (x, z), about the origin.
    pub fn moment_of_force(x: f64, z: f64, fx: f64, fz: f64) -> f64 {
        z * fx - x * fz
    }
}

impl Add for Wrench {
    type Output = Wrench;

    fn add(self, rhs: Wrench) -> Wrench {
        Wrench::new(self.fx + rhs.fx, self.fz + rhs.fz, self.my + rhs.my)
    }
}

impl AddAssign for Wrench {
    fn add_assign(&mut self, rhs: Wrench) {
        *self = *self + rhs;
    }
}

impl Sum for Wrench {
    fn sum<I: Iterator<Item = Wrench>>(iter: I) -> Wrench {
        iter.fold(Wrench::ZERO, Add::add)
    }
}
