//! Closed loops on the sphere.

use crate::angle::Angle;
use crate::point::{Edge, SpherePoint};
use crate::predicates::{edges_cross, turn_angle};

/// A simple closed loop of vertices on the unit sphere.
///
/// The last vertex is implicitly connected back to the first. The loop
/// interior is the region to the left of the directed edges, so a small
/// counterclockwise loop encloses a small area and the same loop inverted
/// encloses the rest of the sphere.
///
/// # Example
///
/// ```
/// use sphere_types::{Loop, SpherePoint};
///
/// let triangle = Loop::new(vec![
///     SpherePoint::from_lat_lng_degrees(0.0, 0.0),
///     SpherePoint::from_lat_lng_degrees(0.0, 10.0),
///     SpherePoint::from_lat_lng_degrees(10.0, 5.0),
/// ]);
/// assert!(triangle.is_valid());
/// assert!(triangle.area() < std::f64::consts::PI);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loop {
    vertices: Vec<SpherePoint>,
}

impl Loop {
    /// Create a loop from a vertex sequence.
    ///
    /// No validation is performed; see [`Loop::is_valid`].
    #[must_use]
    pub fn new(vertices: Vec<SpherePoint>) -> Self {
        Self { vertices }
    }

    /// Number of vertices (equal to the number of edges).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Whether the loop has no vertices.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Vertex at cyclic index `i` (indices wrap modulo the length).
    #[must_use]
    pub fn vertex(&self, i: usize) -> SpherePoint {
        self.vertices[i % self.vertices.len()]
    }

    /// The vertex slice in loop order.
    #[inline]
    #[must_use]
    pub fn vertices(&self) -> &[SpherePoint] {
        &self.vertices
    }

    /// Edge from vertex `i` to vertex `i + 1` (cyclic).
    #[must_use]
    pub fn edge(&self, i: usize) -> Edge {
        Edge::new(self.vertex(i), self.vertex(i + 1))
    }

    /// Iterate over the loop's directed edges.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        (0..self.vertices.len()).map(|i| self.edge(i))
    }

    /// Structural validity: at least 3 vertices, no coincident or antipodal
    /// adjacent vertices.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        if self.vertices.len() < 3 {
            return false;
        }
        (0..self.vertices.len()).all(|i| {
            let e = self.edge(i);
            e.origin != e.destination && e.origin != e.destination.antipode()
        })
    }

    /// Whether no two non-adjacent edges cross.
    ///
    /// Quadratic scan; loops here are assembly output, not continent-sized
    /// datasets.
    #[must_use]
    pub fn is_simple(&self) -> bool {
        let n = self.vertices.len();
        for i in 0..n {
            for j in i + 1..n {
                // Skip adjacent edge pairs (they share a vertex).
                if j == i + 1 || (i == 0 && j == n - 1) {
                    continue;
                }
                let a = self.edge(i);
                let b = self.edge(j);
                if edges_cross(&a.origin, &a.destination, &b.origin, &b.destination) {
                    return false;
                }
            }
        }
        true
    }

    /// Reverse the vertex order, exchanging interior and exterior.
    pub fn invert(&mut self) {
        self.vertices.reverse();
    }

    /// Sum of signed turning angles along the loop, in radians.
    ///
    /// Positive turns are left turns; a small counterclockwise loop sums to
    /// nearly `2π`.
    #[must_use]
    pub fn turning_angle(&self) -> f64 {
        let n = self.vertices.len();
        if n < 3 {
            return 0.0;
        }
        (0..n)
            .map(|i| {
                turn_angle(
                    &self.vertex(i + n - 1),
                    &self.vertex(i),
                    &self.vertex(i + 1),
                )
            })
            .sum()
    }

    /// Area of the loop interior, in steradians (`0 ..= 4π`).
    ///
    /// Gauss–Bonnet: the interior to the left of the edges has area
    /// `2π − Σ turning angles`.
    #[must_use]
    pub fn area(&self) -> f64 {
        use std::f64::consts::PI;
        (2.0 * PI - self.turning_angle()).clamp(0.0, 4.0 * PI)
    }

    /// Whether the loop encloses at most half the sphere.
    #[must_use]
    pub fn is_normalized(&self) -> bool {
        // Small slop so numerically-hemispherical loops count as normalized.
        self.area() <= 2.0 * std::f64::consts::PI + 1e-10
    }

    /// Invert the loop if it encloses more than half the sphere.
    pub fn normalize(&mut self) {
        if !self.is_normalized() {
            self.invert();
        }
    }

    /// Whether `p` lies in the loop interior.
    ///
    /// Counts proper crossings of the arc from `p` to a reference point
    /// taken to be outside the loop (the antipode of the vertex mean).
    /// Intended for normalized loops; points exactly on the boundary give
    /// an arbitrary answer.
    #[must_use]
    pub fn contains(&self, p: &SpherePoint) -> bool {
        if self.vertices.len() < 3 {
            return false;
        }
        let mut outside = self.reference_outside();
        if p.angle_to(&outside).radians() > std::f64::consts::PI - 1e-6 {
            // A nearly-antipodal query would make the reference arc
            // ill-conditioned; route through a different outside point.
            outside =
                SpherePoint::interpolate(0.5, &self.vertex(0), &self.vertex(1)).antipode();
        }
        if *p == outside {
            return false;
        }
        let mut crossings = 0usize;
        for e in self.edges() {
            if edges_cross(p, &outside, &e.origin, &e.destination) {
                crossings += 1;
            }
        }
        crossings % 2 == 1
    }

    /// A point taken to be outside a normalized loop: the antipode of the
    /// normalized vertex sum, falling back to the antipode of the first
    /// edge's midpoint when the sum degenerates.
    fn reference_outside(&self) -> SpherePoint {
        let mut sum = nalgebra::Vector3::zeros();
        for v in &self.vertices {
            sum += v.coords();
        }
        SpherePoint::from_vector(-sum).unwrap_or_else(|| {
            SpherePoint::interpolate(0.5, &self.vertex(0), &self.vertex(1)).antipode()
        })
    }

    /// Whether the two loops trace the same cyclic boundary, allowing the
    /// starting vertex to differ, with each vertex within `max_error` of
    /// its counterpart.
    #[must_use]
    pub fn boundary_approx_equals(&self, other: &Self, max_error: Angle) -> bool {
        let n = self.vertices.len();
        if n != other.vertices.len() {
            return false;
        }
        if n == 0 {
            return true;
        }
        (0..n).any(|offset| {
            (0..n).all(|i| {
                self.vertex(i).angle_to(&other.vertex(i + offset)).radians()
                    <= max_error.radians()
            })
        })
    }

    /// Like [`Loop::boundary_approx_equals`] but also accepts the boundary
    /// traversed in the opposite direction.
    #[must_use]
    pub fn boundary_approx_equals_undirected(&self, other: &Self, max_error: Angle) -> bool {
        if self.boundary_approx_equals(other, max_error) {
            return true;
        }
        let mut reversed = other.clone();
        reversed.invert();
        self.boundary_approx_equals(&reversed, max_error)
    }
}
