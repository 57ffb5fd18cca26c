//! Angles on the sphere.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An angle, stored in radians.
///
/// Thin newtype so that angular tolerances are typed rather than bare `f64`.
///
/// # Example
///
/// ```
/// use sphere_types::Angle;
///
/// let a = Angle::from_degrees(90.0);
/// assert!((a.radians() - std::f64::consts::FRAC_PI_2).abs() < 1e-15);
/// assert!(a > Angle::ZERO);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Angle {
    radians: f64,
}

impl Angle {
    /// The zero angle.
    pub const ZERO: Self = Self { radians: 0.0 };

    /// Create an angle from radians.
    #[inline]
    #[must_use]
    pub const fn from_radians(radians: f64) -> Self {
        Self { radians }
    }

    /// Create an angle from degrees.
    #[inline]
    #[must_use]
    pub fn from_degrees(degrees: f64) -> Self {
        Self {
            radians: degrees.to_radians(),
        }
    }

    /// The angle in radians.
    #[inline]
    #[must_use]
    pub const fn radians(self) -> f64 {
        self.radians
    }

    /// The angle in degrees.
    #[inline]
    #[must_use]
    pub fn degrees(self) -> f64 {
        self.radians.to_degrees()
    }

    /// Whether the angle is finite (not NaN or infinite).
    #[inline]
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.radians.is_finite()
    }

    /// Squared chord length subtended by this angle on the unit sphere.
    ///
    /// `chord = 2·sin(θ/2)`, so `chord² = 2 − 2·cos(θ)`. Used to translate
    /// angular tolerances into the straight-line distances a spatial index
    /// works with.
    #[must_use]
    pub fn chord2(self) -> f64 {
        let theta = self.radians.clamp(0.0, std::f64::consts::PI);
        let half_chord = (theta * 0.5).sin();
        4.0 * half_chord * half_chord
    }

    /// Total-order comparison (NaN sorts last), for use in sorts.
    #[inline]
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.radians.total_cmp(&other.radians)
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.9}°", self.degrees())
    }
}

impl Add for Angle {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::from_radians(self.radians + rhs.radians)
    }
}

impl Sub for Angle {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::from_radians(self.radians - rhs.radians)
    }
}

impl Neg for Angle {
    type Output = Self;
    fn neg(self) -> Self {
        Self::from_radians(-self.radians)
    }
}

impl Mul<f64> for Angle {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::from_radians(self.radians * rhs)
    }
}

impl Div<f64> for Angle {
    type Output = Self;
    fn div(self, rhs: f64) -> Self {
        Self::from_radians(self.radians / rhs)
    }
}
