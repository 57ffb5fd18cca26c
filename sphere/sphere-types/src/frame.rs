//! Orthonormal reference frames on the sphere.
//!
//! A [`Frame`] rotates whole constellations of points around the sphere.
//! Test suites use this to re-run a fixture in many orientations with an
//! explicit, caller-supplied source of randomness.

use nalgebra::{Matrix3, Vector3};

use crate::point::SpherePoint;

/// A right-handed orthonormal basis `(x, y, z)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    basis: Matrix3<f64>,
}

impl Frame {
    /// The identity frame (world axes).
    #[must_use]
    pub fn identity() -> Self {
        Self {
            basis: Matrix3::identity(),
        }
    }

    /// Build a frame whose `z` column is the given point.
    ///
    /// The `x` and `y` columns are chosen deterministically from the point's
    /// coordinates, so equal inputs always produce equal frames.
    ///
    /// # Example
    ///
    /// ```
    /// use sphere_types::{Frame, SpherePoint};
    ///
    /// let z = SpherePoint::from_lat_lng_degrees(40.0, -70.0);
    /// let frame = Frame::from_z_axis(z);
    /// assert!(frame.apply(&SpherePoint::z_axis()).angle_to(&z).radians() < 1e-12);
    /// ```
    #[must_use]
    pub fn from_z_axis(z: SpherePoint) -> Self {
        let x = z.ortho();
        let y = z.coords().cross(&x.coords());
        Self {
            basis: Matrix3::from_columns(&[x.coords(), y, z.coords()]),
        }
    }

    /// Rotate the `x`/`y` columns about the frame's `z` axis.
    ///
    /// Composing [`Frame::from_z_axis`] with a rotation angle spans all
    /// orientations of the sphere.
    #[must_use]
    pub fn rotated_about_z(&self, radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        let x = self.basis.column(0) * cos + self.basis.column(1) * sin;
        let y = self.basis.column(1) * cos - self.basis.column(0) * sin;
        let z = self.basis.column(2).into_owned();
        Self {
            basis: Matrix3::from_columns(&[x, y, z]),
        }
    }

    /// Rotate a point from frame coordinates into world coordinates.
    #[must_use]
    pub fn apply(&self, p: &SpherePoint) -> SpherePoint {
        let v: Vector3<f64> = self.basis * p.coords();
        SpherePoint::from_unit_unchecked(v)
    }

    /// Rotate a world-coordinate point back into frame coordinates.
    #[must_use]
    pub fn unapply(&self, p: &SpherePoint) -> SpherePoint {
        let v: Vector3<f64> = self.basis.transpose() * p.coords();
        SpherePoint::from_unit_unchecked(v)
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::identity()
    }
}
