//! The polygon assembler: configuration, accumulation, and the single
//! assembly pass.

use tracing::{info, warn};

use sphere_types::{Edge, Loop, Polygon, SpherePoint};

use crate::assemble;
use crate::edges::EdgeSet;
use crate::error::{AssemblyError, AssemblyResult};
use crate::merge;
use crate::options::AssemblerOptions;
use crate::splice;

/// Result of [`PolygonAssembler::assemble_loops`].
#[derive(Debug)]
pub struct LoopAssembly {
    /// The extracted loops, in deterministic extraction order.
    pub loops: Vec<Loop>,
    /// Edges that could not be closed into any loop. Always reported,
    /// never dropped.
    pub unused_edges: Vec<Edge>,
}

/// Result of [`PolygonAssembler::assemble_polygon`].
#[derive(Debug)]
pub struct PolygonAssembly {
    /// The assembled polygon: normalized shells and holes.
    pub polygon: Polygon,
    /// Edges that could not be closed into any loop.
    pub unused_edges: Vec<Edge>,
}

/// Reconstructs simple closed loops (and polygons) from an unordered,
/// possibly noisy collection of edges on the unit sphere.
///
/// A builder is configured once, accumulates edges incrementally, and is
/// *consumed* by a single assembly pass — the pipeline discards its
/// intermediate state, so resuming after extraction is impossible by
/// construction.
///
/// The pipeline: vertex clustering (within
/// [`AssemblerOptions::vertex_merge_radius`]) → vertex moving, with XOR
/// re-cancellation → edge splicing → loop extraction.
///
/// # Example
///
/// ```
/// use sphere_assembly::{AssemblerOptions, PolygonAssembler};
/// use sphere_types::SpherePoint;
///
/// let ll = SpherePoint::from_lat_lng_degrees;
/// let mut builder = PolygonAssembler::new(AssemblerOptions::default())?;
/// builder.add_edge(ll(0.0, 0.0), ll(0.0, 10.0));
/// builder.add_edge(ll(0.0, 10.0), ll(10.0, 5.0));
/// builder.add_edge(ll(10.0, 5.0), ll(0.0, 0.0));
///
/// let result = builder.assemble_loops()?;
/// assert_eq!(result.loops.len(), 1);
/// assert!(result.unused_edges.is_empty());
/// # Ok::<(), sphere_assembly::AssemblyError>(())
/// ```
#[derive(Debug)]
pub struct PolygonAssembler {
    options: AssemblerOptions,
    edges: EdgeSet,
}

impl PolygonAssembler {
    /// Create an assembler with the given options.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::InvalidOptions`] for contradictory or
    /// out-of-range settings; no work is accepted on a bad configuration.
    pub fn new(options: AssemblerOptions) -> AssemblyResult<Self> {
        options.validate_options()?;
        let edges = EdgeSet::new(options.undirected_edges, options.xor_edges);
        Ok(Self { options, edges })
    }

    /// The configuration this assembler was built with.
    #[must_use]
    pub fn options(&self) -> &AssemblerOptions {
        &self.options
    }

    /// Add a single edge.
    ///
    /// Degenerate edges are ignored; with XOR enabled the edge may cancel
    /// an existing one instead of being added. Returns whether an edge was
    /// actually added.
    pub fn add_edge(&mut self, v0: SpherePoint, v1: SpherePoint) -> bool {
        self.edges.insert(v0, v1)
    }

    /// Add every edge of a loop.
    pub fn add_loop(&mut self, boundary: &Loop) {
        for e in boundary.edges() {
            self.add_edge(e.origin, e.destination);
        }
    }

    /// Add every boundary edge of a polygon.
    ///
    /// Hole loops are stored clockwise, so adding their edges as-is keeps
    /// shared shell/hole boundaries in cancelling orientations.
    pub fn add_polygon(&mut self, polygon: &Polygon) {
        for boundary in polygon.loops() {
            self.add_loop(boundary);
        }
    }

    /// Number of directed edges currently accumulated.
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.edges.num_directed_edges()
    }

    /// Run the assembly pass and return raw loops plus unused edges.
    ///
    /// Loops keep their traversal orientation; no shell/hole
    /// normalization is applied.
    ///
    /// # Errors
    ///
    /// Configuration errors surface before any processing; iteration-cap
    /// and (with [`AssemblerOptions::validate`]) invariant violations
    /// surface during it.
    pub fn assemble_loops(self) -> AssemblyResult<LoopAssembly> {
        let (loops, unused_edges) = self.run()?;
        Ok(LoopAssembly { loops, unused_edges })
    }

    /// Run the assembly pass and package the loops into a polygon with
    /// normalized orientation (CCW shells, CW holes).
    ///
    /// Polygon assembly relies on XOR semantics to cancel shared
    /// boundaries between input shapes.
    ///
    /// With [`AssemblerOptions::validate`], loops that do not form a valid
    /// polygon together (e.g. crossing boundaries) are rejected: their
    /// edges join the unused list and the polygon comes back empty.
    ///
    /// # Errors
    ///
    /// In addition to the [`PolygonAssembler::assemble_loops`] errors,
    /// fails fast when `xor_edges` is disabled.
    pub fn assemble_polygon(self) -> AssemblyResult<PolygonAssembly> {
        if !self.options.xor_edges {
            return Err(AssemblyError::InvalidOptions {
                reason: "polygon assembly requires xor_edges".to_string(),
            });
        }
        let validate = self.options.validate;
        let (loops, mut unused_edges) = self.run()?;
        let polygon = Polygon::from_loops(loops.clone());
        if validate && !polygon.is_valid() {
            warn!(
                loops = loops.len(),
                "assembled loops do not form a valid polygon; rejecting them"
            );
            for rejected in &loops {
                unused_edges.extend(rejected.edges());
            }
            return Ok(PolygonAssembly {
                polygon: Polygon::empty(),
                unused_edges,
            });
        }
        Ok(PolygonAssembly {
            polygon,
            unused_edges,
        })
    }

    fn run(mut self) -> AssemblyResult<(Vec<Loop>, Vec<Edge>)> {
        self.options.validate_options()?;

        if self.options.vertex_merge_radius.radians() > 0.0 {
            let map = merge::build_merge_map(&self.edges, &self.options)?;
            if !map.is_empty() {
                self.edges.move_vertices(|v| map.resolve(v));
            }
            if self.options.edge_splice_fraction > 0.0 {
                splice::splice_edges(&mut self.edges, &self.options)?;
            }
        }

        let assembled = assemble::assemble_loops(&mut self.edges, &self.options)?;
        info!(
            loops = assembled.loops.len(),
            unused = assembled.unused.len(),
            rejected = assembled.rejected,
            "assembly complete"
        );
        Ok((assembled.loops, assembled.unused))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sphere_types::Angle;

    fn ll(lat: f64, lng: f64) -> SpherePoint {
        SpherePoint::from_lat_lng_degrees(lat, lng)
    }

    fn add_closed(builder: &mut PolygonAssembler, points: &[SpherePoint]) {
        for i in 0..points.len() {
            builder.add_edge(points[i], points[(i + 1) % points.len()]);
        }
    }

    #[test]
    fn bad_options_fail_before_any_work() {
        let options =
            AssemblerOptions::default().with_vertex_merge_radius(Angle::from_radians(-1.0));
        assert!(matches!(
            PolygonAssembler::new(options),
            Err(AssemblyError::InvalidOptions { .. })
        ));
    }

    #[test]
    fn polygon_mode_requires_xor() {
        let builder = PolygonAssembler::new(AssemblerOptions::keep_duplicates()).unwrap();
        assert!(matches!(
            builder.assemble_polygon(),
            Err(AssemblyError::InvalidOptions { .. })
        ));
    }

    #[test]
    fn empty_input_is_empty_output() {
        let builder = PolygonAssembler::new(AssemblerOptions::default()).unwrap();
        let result = builder.assemble_loops().unwrap();
        assert!(result.loops.is_empty());
        assert!(result.unused_edges.is_empty());
    }

    #[test]
    fn shell_and_hole_assemble_into_polygon() {
        let mut builder = PolygonAssembler::new(AssemblerOptions::default()).unwrap();
        // CCW shell, CW hole: consistent orientations for XOR input.
        add_closed(
            &mut builder,
            &[ll(0.0, 0.0), ll(0.0, 20.0), ll(20.0, 20.0), ll(20.0, 0.0)],
        );
        add_closed(
            &mut builder,
            &[ll(5.0, 5.0), ll(15.0, 5.0), ll(15.0, 15.0), ll(5.0, 15.0)],
        );

        let result = builder.assemble_polygon().unwrap();
        assert_eq!(result.polygon.num_loops(), 2);
        assert!(result.unused_edges.is_empty());
        assert_eq!(result.polygon.depth(0), 0);
        assert_eq!(result.polygon.depth(1), 1);
        assert!(result.polygon.is_hole(1));
    }

    #[test]
    fn add_polygon_round_trips_through_assembly() {
        // Assemble a polygon, feed it back in, assemble again: identical.
        let mut builder = PolygonAssembler::new(AssemblerOptions::default()).unwrap();
        add_closed(
            &mut builder,
            &[ll(0.0, 0.0), ll(0.0, 20.0), ll(20.0, 20.0), ll(20.0, 0.0)],
        );
        add_closed(
            &mut builder,
            &[ll(5.0, 5.0), ll(15.0, 5.0), ll(15.0, 15.0), ll(5.0, 15.0)],
        );
        let first = builder.assemble_polygon().unwrap();

        let mut builder = PolygonAssembler::new(AssemblerOptions::default()).unwrap();
        builder.add_polygon(&first.polygon);
        let second = builder.assemble_polygon().unwrap();

        assert!(second.unused_edges.is_empty());
        assert!(first
            .polygon
            .boundary_approx_equals(&second.polygon, Angle::from_radians(1e-12)));
    }

    #[test]
    fn merging_unifies_near_duplicate_vertices() {
        // A triangle whose closing vertex misses the start by a hair.
        let a = ll(0.0, 0.0);
        let a_off = ll(0.0, 0.000_1);
        let mut builder = PolygonAssembler::new(
            AssemblerOptions::default().with_vertex_merge_radius(Angle::from_degrees(0.01)),
        )
        .unwrap();
        builder.add_edge(a, ll(0.0, 10.0));
        builder.add_edge(ll(0.0, 10.0), ll(10.0, 5.0));
        builder.add_edge(ll(10.0, 5.0), a_off);

        let result = builder.assemble_loops().unwrap();
        assert_eq!(result.loops.len(), 1);
        assert!(result.unused_edges.is_empty());
        assert_eq!(result.loops[0].len(), 3);
    }

    #[test]
    fn without_merging_the_gap_stays_open() {
        let a = ll(0.0, 0.0);
        let a_off = ll(0.0, 0.000_1);
        let mut builder = PolygonAssembler::new(AssemblerOptions::default()).unwrap();
        builder.add_edge(a, ll(0.0, 10.0));
        builder.add_edge(ll(0.0, 10.0), ll(10.0, 5.0));
        builder.add_edge(ll(10.0, 5.0), a_off);

        let result = builder.assemble_loops().unwrap();
        assert!(result.loops.is_empty());
        assert_eq!(result.unused_edges.len(), 3);
    }

    #[test]
    fn consumed_builder_reports_all_edges() {
        let mut builder = PolygonAssembler::new(AssemblerOptions::default()).unwrap();
        builder.add_edge(ll(0.0, 0.0), ll(0.0, 10.0));
        builder.add_edge(ll(30.0, 0.0), ll(30.0, 10.0));
        assert_eq!(builder.num_edges(), 2);

        let result = builder.assemble_loops().unwrap();
        assert!(result.loops.is_empty());
        assert_eq!(result.unused_edges.len(), 2);
    }

    #[test]
    fn degenerate_edges_never_accumulate() {
        let mut builder = PolygonAssembler::new(AssemblerOptions::default()).unwrap();
        let p = ll(1.0, 1.0);
        assert!(!builder.add_edge(p, p));
        assert_eq!(builder.num_edges(), 0);
    }
}
