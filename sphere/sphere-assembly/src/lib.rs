//! Assemble simple closed loops and polygons from spherical edge soup.
//!
//! Given an unordered, possibly noisy, possibly redundant collection of
//! edges on the unit sphere, this crate reconstructs a consistent set of
//! simple closed loops — merging near-duplicate vertices, splicing
//! vertices into edges that pass too close, and cancelling duplicate
//! edges — and reports every edge it could not use.
//!
//! This crate provides:
//!
//! - [`PolygonAssembler`] - accumulates edges, runs the assembly pass
//! - [`AssemblerOptions`] - tolerances, XOR/undirected modes, validation
//! - [`LoopAssembly`] / [`PolygonAssembly`] - results plus unused edges
//! - [`AssemblyError`] - configuration and invariant failures
//!
//! # Pipeline
//!
//! Data flows one way through the assembly pass:
//!
//! 1. **Vertex merging** - distinct endpoints within the merge radius are
//!    clustered onto canonical representatives (optionally snapped to
//!    discrete cell centers for a quantifiable error bound).
//! 2. **Vertex moving** - edges are rewritten onto canonical vertices;
//!    newly-coincident opposite edges cancel under XOR.
//! 3. **Edge splicing** - a vertex lying almost on an edge splits it.
//! 4. **Loop extraction** - a greedy walk with a deterministic
//!    leftmost-turn rule closes loops and reports dead ends as unused.
//!
//! # Determinism
//!
//! Assembly is a pure function of the configuration and the input edge
//! order. Edge tables iterate in a total point order, junction ties break
//! by the same order, and nothing depends on hash iteration or global
//! state. Re-running assembly on its own output reproduces it.
//!
//! # Example
//!
//! ```
//! use sphere_assembly::{AssemblerOptions, PolygonAssembler};
//! use sphere_types::{Angle, SpherePoint};
//!
//! let ll = SpherePoint::from_lat_lng_degrees;
//!
//! // Two squares sharing an edge, with consistent (CCW) orientation.
//! let mut builder = PolygonAssembler::new(
//!     AssemblerOptions::default().with_vertex_merge_radius(Angle::from_degrees(0.01)),
//! )?;
//! for square in [
//!     [ll(0.0, 0.0), ll(0.0, 10.0), ll(10.0, 10.0), ll(10.0, 0.0)],
//!     [ll(0.0, 10.0), ll(0.0, 20.0), ll(10.0, 20.0), ll(10.0, 10.0)],
//! ] {
//!     for i in 0..4 {
//!         builder.add_edge(square[i], square[(i + 1) % 4]);
//!     }
//! }
//!
//! // The shared edge cancels; one combined outline remains.
//! let result = builder.assemble_polygon()?;
//! assert_eq!(result.polygon.num_loops(), 1);
//! assert_eq!(result.polygon.loop_at(0).len(), 6);
//! assert!(result.unused_edges.is_empty());
//! # Ok::<(), sphere_assembly::AssemblyError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod assemble;
mod builder;
mod edges;
mod error;
mod merge;
mod options;
mod splice;

pub use builder::{LoopAssembly, PolygonAssembler, PolygonAssembly};
pub use error::{AssemblyError, AssemblyResult};
pub use options::{AssemblerOptions, DEFAULT_EDGE_SPLICE_FRACTION};

// Re-export the geometry types callers interact with.
pub use sphere_types::{Angle, Edge, Loop, Polygon, SpherePoint};
