//! Unit-sphere points.
//!
//! [`SpherePoint`] is the fundamental position type: a unit-length 3D vector.
//! Unlike a raw `Vector3<f64>`, it carries a total order and a hash that are
//! consistent with exact coordinate equality, so it can key deterministic
//! maps. All geometric tolerance handling lives in the algorithms that
//! consume points; two points are *equal* only when their coordinates are
//! bitwise identical.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use nalgebra::Vector3;

use crate::angle::Angle;

/// A point on the unit sphere.
///
/// Stored as a normalized `Vector3<f64>`. Construction normalizes the input
/// and canonicalizes negative zeros so that equality, ordering, and hashing
/// agree with each other.
///
/// # Example
///
/// ```
/// use sphere_types::SpherePoint;
///
/// let a = SpherePoint::from_lat_lng_degrees(0.0, 0.0);
/// let b = SpherePoint::from_lat_lng_degrees(0.0, 90.0);
/// assert!((a.angle_to(&b).degrees() - 90.0).abs() < 1e-12);
/// ```
#[derive(Clone, Copy)]
pub struct SpherePoint {
    coords: Vector3<f64>,
}

impl SpherePoint {
    /// Create a point from a vector, normalizing it to unit length.
    ///
    /// Returns `None` for vectors too short to normalize reliably.
    #[must_use]
    pub fn from_vector(v: Vector3<f64>) -> Option<Self> {
        let norm = v.norm();
        if norm < 1e-300 || !norm.is_finite() {
            return None;
        }
        Some(Self::from_normalized(v / norm))
    }

    /// Create a point from a vector that is already unit length.
    ///
    /// The caller guarantees `‖v‖ ≈ 1`; this is checked in debug builds only.
    #[must_use]
    pub fn from_unit_unchecked(v: Vector3<f64>) -> Self {
        debug_assert!((v.norm() - 1.0).abs() < 1e-9, "vector is not unit length");
        Self::from_normalized(v)
    }

    /// Create a point from latitude and longitude in degrees.
    ///
    /// # Example
    ///
    /// ```
    /// use sphere_types::SpherePoint;
    ///
    /// let north = SpherePoint::from_lat_lng_degrees(90.0, 0.0);
    /// assert!((north.coords().z - 1.0).abs() < 1e-15);
    /// ```
    #[must_use]
    pub fn from_lat_lng_degrees(lat: f64, lng: f64) -> Self {
        let phi = lat.to_radians();
        let theta = lng.to_radians();
        let cos_phi = phi.cos();
        Self::from_normalized(Vector3::new(
            theta.cos() * cos_phi,
            theta.sin() * cos_phi,
            phi.sin(),
        ))
    }

    /// The `+x` axis point.
    #[must_use]
    pub fn x_axis() -> Self {
        Self::from_normalized(Vector3::x())
    }

    /// The `+y` axis point.
    #[must_use]
    pub fn y_axis() -> Self {
        Self::from_normalized(Vector3::y())
    }

    /// The `+z` axis point.
    #[must_use]
    pub fn z_axis() -> Self {
        Self::from_normalized(Vector3::z())
    }

    /// Canonicalize coordinates: `-0.0` becomes `+0.0` so that bitwise
    /// equality, `total_cmp` ordering, and hashing all agree.
    fn from_normalized(v: Vector3<f64>) -> Self {
        #[inline]
        fn canon(c: f64) -> f64 {
            if c == 0.0 {
                0.0
            } else {
                c
            }
        }
        Self {
            coords: Vector3::new(canon(v.x), canon(v.y), canon(v.z)),
        }
    }

    /// The underlying unit vector.
    #[inline]
    #[must_use]
    pub fn coords(&self) -> Vector3<f64> {
        self.coords
    }

    /// The antipodal point.
    #[must_use]
    pub fn antipode(&self) -> Self {
        Self::from_normalized(-self.coords)
    }

    /// Angular distance to another point.
    ///
    /// Uses the `atan2(‖a×b‖, a·b)` form, which stays accurate for both
    /// nearly-identical and nearly-antipodal points.
    #[must_use]
    pub fn angle_to(&self, other: &Self) -> Angle {
        let cross = self.coords.cross(&other.coords).norm();
        let dot = self.coords.dot(&other.coords);
        Angle::from_radians(cross.atan2(dot))
    }

    /// Squared chord (straight-line) distance to another point.
    ///
    /// Cheap proxy for angular distance; used by spatial-index queries.
    #[inline]
    #[must_use]
    pub fn chord2(&self, other: &Self) -> f64 {
        (self.coords - other.coords).norm_squared()
    }

    /// Interpolate along the geodesic from `a` to `b`.
    ///
    /// `t = 0` yields `a`, `t = 1` yields `b`. For antipodal endpoints the
    /// geodesic is ambiguous; an arbitrary great circle through both points
    /// is used.
    #[must_use]
    pub fn interpolate(t: f64, a: &Self, b: &Self) -> Self {
        let theta = a.angle_to(b).radians();
        if theta < 1e-9 {
            // Endpoints nearly coincide; normalized lerp is exact enough.
            let v = a.coords.lerp(&b.coords, t);
            return Self::from_vector(v).unwrap_or(*a);
        }
        let sin_theta = theta.sin();
        if sin_theta < 1e-9 {
            // Nearly antipodal: route through an orthogonal waypoint.
            let mid = a.ortho();
            if t < 0.5 {
                return Self::interpolate(2.0 * t, a, &mid);
            }
            return Self::interpolate(2.0 * t - 1.0, &mid, b);
        }
        let v = a.coords * (((1.0 - t) * theta).sin() / sin_theta)
            + b.coords * ((t * theta).sin() / sin_theta);
        Self::from_vector(v).unwrap_or(*a)
    }

    /// A unit vector orthogonal to this point.
    ///
    /// Deterministic: derived from the smallest-magnitude coordinate axis.
    #[must_use]
    pub fn ortho(&self) -> Self {
        let a = self.coords.x.abs();
        let b = self.coords.y.abs();
        let c = self.coords.z.abs();
        let axis = if a <= b && a <= c {
            Vector3::x()
        } else if b <= c {
            Vector3::y()
        } else {
            Vector3::z()
        };
        let v = self.coords.cross(&axis);
        // The chosen axis is never parallel to a unit vector's smallest
        // coordinate, so the cross product cannot vanish.
        Self::from_vector(v).unwrap_or_else(Self::z_axis)
    }

    /// Convert back to latitude and longitude in degrees.
    #[must_use]
    pub fn to_lat_lng_degrees(&self) -> (f64, f64) {
        let lat = self
            .coords
            .z
            .atan2((self.coords.x * self.coords.x + self.coords.y * self.coords.y).sqrt());
        let lng = self.coords.y.atan2(self.coords.x);
        (lat.to_degrees(), lng.to_degrees())
    }
}

impl fmt::Debug for SpherePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (lat, lng) = self.to_lat_lng_degrees();
        write!(f, "SpherePoint({lat:.6}, {lng:.6})")
    }
}

impl PartialEq for SpherePoint {
    fn eq(&self, other: &Self) -> bool {
        self.coords.x.to_bits() == other.coords.x.to_bits()
            && self.coords.y.to_bits() == other.coords.y.to_bits()
            && self.coords.z.to_bits() == other.coords.z.to_bits()
    }
}

impl Eq for SpherePoint {}

impl PartialOrd for SpherePoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SpherePoint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.coords
            .x
            .total_cmp(&other.coords.x)
            .then_with(|| self.coords.y.total_cmp(&other.coords.y))
            .then_with(|| self.coords.z.total_cmp(&other.coords.z))
    }
}

impl Hash for SpherePoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.coords.x.to_bits().hash(state);
        self.coords.y.to_bits().hash(state);
        self.coords.z.to_bits().hash(state);
    }
}

/// A directed edge between two points on the sphere.
///
/// The segment is the shorter geodesic arc from `origin` to `destination`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// Start of the edge.
    pub origin: SpherePoint,
    /// End of the edge.
    pub destination: SpherePoint,
}

impl Edge {
    /// Create an edge from origin to destination.
    #[inline]
    #[must_use]
    pub fn new(origin: SpherePoint, destination: SpherePoint) -> Self {
        Self {
            origin,
            destination,
        }
    }

    /// The same edge traversed in the opposite direction.
    #[inline]
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            origin: self.destination,
            destination: self.origin,
        }
    }

    /// Whether both endpoints are the same point.
    #[inline]
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.origin == self.destination
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lat_lng_round_trip() {
        let p = SpherePoint::from_lat_lng_degrees(35.5, -120.25);
        let (lat, lng) = p.to_lat_lng_degrees();
        assert!((lat - 35.5).abs() < 1e-12);
        assert!((lng + 120.25).abs() < 1e-12);
    }

    #[test]
    fn angle_between_axes() {
        let x = SpherePoint::x_axis();
        let z = SpherePoint::z_axis();
        assert!((x.angle_to(&z).degrees() - 90.0).abs() < 1e-12);
        assert!(x.angle_to(&x).radians().abs() < 1e-15);
        assert!((x.angle_to(&x.antipode()).degrees() - 180.0).abs() < 1e-9);
    }

    #[test]
    fn equality_is_exact() {
        let a = SpherePoint::from_lat_lng_degrees(1.0, 2.0);
        let b = SpherePoint::from_lat_lng_degrees(1.0, 2.0);
        let c = SpherePoint::from_lat_lng_degrees(1.0, 2.0 + 1e-13);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn negative_zero_canonicalized() {
        let a = SpherePoint::from_vector(Vector3::new(0.0, 1.0, 0.0)).unwrap();
        let b = SpherePoint::from_vector(Vector3::new(-0.0, 1.0, -0.0)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn ordering_is_total_and_consistent() {
        let mut pts = vec![
            SpherePoint::from_lat_lng_degrees(10.0, 10.0),
            SpherePoint::from_lat_lng_degrees(-10.0, 10.0),
            SpherePoint::from_lat_lng_degrees(0.0, 0.0),
        ];
        pts.sort();
        for w in pts.windows(2) {
            assert!(w[0] <= w[1]);
        }
    }

    #[test]
    fn interpolate_endpoints_and_midpoint() {
        let a = SpherePoint::from_lat_lng_degrees(0.0, 0.0);
        let b = SpherePoint::from_lat_lng_degrees(0.0, 90.0);
        assert!(SpherePoint::interpolate(0.0, &a, &b).angle_to(&a).radians() < 1e-12);
        assert!(SpherePoint::interpolate(1.0, &a, &b).angle_to(&b).radians() < 1e-12);

        let mid = SpherePoint::interpolate(0.5, &a, &b);
        let expected = SpherePoint::from_lat_lng_degrees(0.0, 45.0);
        assert!(mid.angle_to(&expected).radians() < 1e-12);
    }

    #[test]
    fn interpolate_antipodal_stays_unit() {
        let a = SpherePoint::x_axis();
        let b = a.antipode();
        let q = SpherePoint::interpolate(0.25, &a, &b);
        assert!((q.coords().norm() - 1.0).abs() < 1e-12);
        assert!((q.angle_to(&a).degrees() - 45.0).abs() < 1e-6);
    }

    #[test]
    fn ortho_is_orthogonal() {
        for p in [
            SpherePoint::x_axis(),
            SpherePoint::from_lat_lng_degrees(45.0, 45.0),
            SpherePoint::from_lat_lng_degrees(-89.0, 3.0),
        ] {
            let o = p.ortho();
            assert!(p.coords().dot(&o.coords()).abs() < 1e-12);
        }
    }

    #[test]
    fn chord2_matches_angle() {
        let a = SpherePoint::from_lat_lng_degrees(0.0, 0.0);
        let b = SpherePoint::from_lat_lng_degrees(0.0, 60.0);
        // chord = 2 sin(θ/2); θ = 60° → chord² = 1
        assert!((a.chord2(&b) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn edge_reversal() {
        let e = Edge::new(
            SpherePoint::from_lat_lng_degrees(0.0, 0.0),
            SpherePoint::from_lat_lng_degrees(0.0, 10.0),
        );
        assert!(!e.is_degenerate());
        assert_eq!(e.reversed().reversed(), e);
        assert_eq!(e.reversed().origin, e.destination);
    }
}
