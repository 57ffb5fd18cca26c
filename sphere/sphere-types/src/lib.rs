//! Core spherical-geometry types.
//!
//! This crate provides the foundational types for working with geometry on
//! the unit sphere:
//!
//! - [`SpherePoint`] - A unit-vector position with deterministic ordering
//! - [`Angle`] - Typed angular distances and tolerances
//! - [`Edge`] - A directed geodesic segment
//! - [`Loop`] - A closed vertex chain with area and containment queries
//! - [`Polygon`] - Nested loops (CCW shells, CW holes)
//! - [`Frame`] - Orthonormal bases for rotating fixtures around the sphere
//! - [`cell`] - A discrete cell grid for deterministic vertex snapping
//! - [`predicates`] - Orientation predicates with deterministic tie-breaks
//!
//! # Layer 0
//!
//! This is a Layer 0 crate: no engine, no I/O, no async. It can be used in
//! CLI tools, servers, WASM, and other libraries.
//!
//! # Determinism
//!
//! Point equality is exact (bitwise), ordering is total, and every
//! predicate resolves degeneracies by a fixed point ordering rather than
//! platform-dependent rounding. Algorithms built on these types produce
//! identical output for identical input, everywhere.
//!
//! # Example
//!
//! ```
//! use sphere_types::{Loop, SpherePoint};
//!
//! let ll = SpherePoint::from_lat_lng_degrees;
//! let triangle = Loop::new(vec![ll(0.0, 0.0), ll(0.0, 10.0), ll(10.0, 5.0)]);
//! assert!(triangle.is_valid());
//! assert!(triangle.contains(&ll(3.0, 5.0)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod angle;
pub mod cell;
mod frame;
mod loops;
mod point;
pub mod predicates;
mod polygon;

pub use angle::Angle;
pub use frame::Frame;
pub use loops::Loop;
pub use point::{Edge, SpherePoint};
pub use polygon::Polygon;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix3, Vector3};
