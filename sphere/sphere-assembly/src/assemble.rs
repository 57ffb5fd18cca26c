//! Loop extraction: a greedy walk over the edge set.
//!
//! Starting vertices are scanned in insertion order; from each, the walk
//! follows outgoing edges, always preferring the leftmost turn relative to
//! the incoming edge. The turn choice is a pure function of the incoming
//! direction and the candidate set ([`predicates::ordered_ccw`]), with
//! exact ties resolved by the point order — junction decisions are
//! reproducible everywhere. Dead ends report their edge as unused and
//! backtrack; revisiting a vertex on the current path closes a loop.

use hashbrown::HashMap;
use tracing::{debug, warn};

use sphere_types::{predicates, Edge, Loop, SpherePoint};

use crate::edges::EdgeSet;
use crate::error::{AssemblyError, AssemblyResult};
use crate::options::AssemblerOptions;

/// Output of loop extraction.
#[derive(Debug, Default)]
pub(crate) struct AssembledLoops {
    pub(crate) loops: Vec<Loop>,
    pub(crate) unused: Vec<Edge>,
    /// Loops that closed but were rejected (degenerate or, with
    /// validation, self-crossing). Their edges are in `unused`.
    pub(crate) rejected: usize,
}

/// Extract every loop from the edge set, consuming it entirely.
pub(crate) fn assemble_loops(
    edges: &mut EdgeSet,
    options: &AssemblerOptions,
) -> AssemblyResult<AssembledLoops> {
    let total_before = edges.num_directed_edges();
    let mut out = AssembledLoops::default();

    let mut i = 0;
    while i < edges.num_starting_vertices() {
        let v0 = edges.starting_vertex(i);
        let Some(v1) = edges.first_successor(&v0) else {
            i += 1;
            continue;
        };
        // Each attempt consumes at least one edge (into a loop or the
        // unused list), so retrying the same starting vertex terminates.
        if let Some(assembled) = assemble_one(edges, options, v0, v1, &mut out) {
            out.loops.push(assembled);
        }
    }

    if options.validate && !edges.is_empty() {
        return Err(AssemblyError::InvariantViolation {
            details: format!(
                "{} edges remain after extraction",
                edges.num_directed_edges()
            ),
        });
    }

    debug!(
        edges = total_before,
        loops = out.loops.len(),
        unused = out.unused.len(),
        rejected = out.rejected,
        "loop extraction finished"
    );
    Ok(out)
}

/// Assemble one loop starting from the edge `(v0, v1)`.
///
/// The walk itself consumes nothing; edges are erased only when a loop is
/// accepted or rejected, or when a dead end drops its edge. In undirected
/// mode a closed loop can come out unnormalized — the walk traced the
/// face on the wrong side of the starting edge — and is re-walked with
/// the first edge reversed, which traces a face interior to the previous
/// one and therefore terminates.
fn assemble_one(
    edges: &mut EdgeSet,
    options: &AssemblerOptions,
    mut v0: SpherePoint,
    mut v1: SpherePoint,
    out: &mut AssembledLoops,
) -> Option<Loop> {
    loop {
        let assembled = Loop::new(walk(edges, v0, v1, &mut out.unused)?);

        if assembled.len() < 3 {
            // Sliver: an edge pair traversed both ways.
            warn!(len = assembled.len(), "rejecting degenerate loop");
            return reject_loop(assembled, edges, out);
        }
        if options.validate && !(assembled.is_valid() && assembled.is_simple()) {
            warn!(len = assembled.len(), "rejecting self-intersecting loop");
            return reject_loop(assembled, edges, out);
        }
        if edges.undirected() && !assembled.is_normalized() {
            v0 = assembled.vertex(1);
            v1 = assembled.vertex(0);
            continue;
        }
        erase_loop(&assembled, edges);
        return Some(assembled);
    }
}

/// Walk from `(v0, v1)` until a loop closes (returning its vertex path)
/// or the path fully unwinds (returning `None`).
fn walk(
    edges: &mut EdgeSet,
    v0: SpherePoint,
    v1: SpherePoint,
    unused: &mut Vec<Edge>,
) -> Option<Vec<SpherePoint>> {
    let mut path: Vec<SpherePoint> = vec![v0, v1];
    // Position of each vertex on the path (the starting vertex is absent
    // until the walk returns to it).
    let mut index: HashMap<SpherePoint, usize> = HashMap::new();
    index.insert(v1, 1);

    while path.len() >= 2 {
        let v0 = path[path.len() - 2];
        let v1 = path[path.len() - 1];

        let mut next: Option<SpherePoint> = None;
        if let Some(successors) = edges.successors(&v1) {
            for &candidate in successors.keys() {
                // Never bounce straight back along the incoming edge; this
                // is what makes a directed continuation win over the
                // paired reverse copy of an undirected edge.
                if candidate == v0 {
                    continue;
                }
                // Keep the candidate latest in CCW order from v0 around
                // v1: the leftmost turn relative to the incoming edge.
                next = match next {
                    None => Some(candidate),
                    Some(best) => {
                        if predicates::ordered_ccw(&v0, &best, &candidate, &v1) {
                            Some(candidate)
                        } else {
                            Some(best)
                        }
                    }
                };
            }
        }

        match next {
            None => {
                // Dead end: drop the edge and backtrack one step.
                unused.push(Edge::new(v0, v1));
                edges.erase(&v0, &v1);
                index.remove(&v1);
                path.pop();
            }
            Some(v2) => {
                if let Some(&pos) = index.get(&v2) {
                    // Loop closed; vertices before the first visit of v2
                    // are a tail that stays in the edge set for later
                    // attempts.
                    path.drain(..pos);
                    return Some(path);
                }
                index.insert(v2, path.len());
                path.push(v2);
            }
        }
    }
    None
}

fn reject_loop(assembled: Loop, edges: &mut EdgeSet, out: &mut AssembledLoops) -> Option<Loop> {
    for e in assembled.edges() {
        out.unused.push(e);
    }
    erase_loop(&assembled, edges);
    out.rejected += 1;
    None
}

fn erase_loop(assembled: &Loop, edges: &mut EdgeSet) {
    for e in assembled.edges() {
        edges.erase(&e.origin, &e.destination);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sphere_types::Angle;

    fn ll(lat: f64, lng: f64) -> SpherePoint {
        SpherePoint::from_lat_lng_degrees(lat, lng)
    }

    fn insert_chain(edges: &mut EdgeSet, points: &[SpherePoint], closed: bool) {
        for pair in points.windows(2) {
            edges.insert(pair[0], pair[1]);
        }
        if closed {
            if let (Some(&last), Some(&first)) = (points.last(), points.first()) {
                edges.insert(last, first);
            }
        }
    }

    fn directed() -> AssemblerOptions {
        AssemblerOptions::keep_duplicates()
    }

    #[test]
    fn single_triangle_assembles_exactly() {
        let tri = [ll(0.0, 0.0), ll(0.0, 10.0), ll(10.0, 5.0)];
        let mut edges = EdgeSet::new(false, false);
        insert_chain(&mut edges, &tri, true);

        let result = assemble_loops(&mut edges, &directed()).unwrap();
        assert_eq!(result.loops.len(), 1);
        assert!(result.unused.is_empty());
        assert_eq!(result.rejected, 0);
        let expected = Loop::new(tri.to_vec());
        assert!(result.loops[0].boundary_approx_equals(&expected, Angle::from_radians(1e-12)));
    }

    #[test]
    fn dangling_chain_is_reported_unused() {
        let tri = [ll(0.0, 0.0), ll(0.0, 10.0), ll(10.0, 5.0)];
        let chain = [ll(20.0, 20.0), ll(25.0, 25.0), ll(30.0, 20.0)];
        let mut edges = EdgeSet::new(false, false);
        insert_chain(&mut edges, &tri, true);
        insert_chain(&mut edges, &chain, false);

        let result = assemble_loops(&mut edges, &directed()).unwrap();
        assert_eq!(result.loops.len(), 1);
        assert_eq!(result.unused.len(), 2);
        assert!(edges.is_empty());
    }

    #[test]
    fn two_loops_sharing_a_vertex_split_apart() {
        // Two triangles touching at the origin vertex; the leftmost-turn
        // rule must not jump between them.
        let shared = ll(0.0, 0.0);
        let left = [shared, ll(0.0, -10.0), ll(10.0, -5.0)];
        let right = [shared, ll(0.0, 10.0), ll(10.0, 5.0)];
        let mut edges = EdgeSet::new(false, false);
        insert_chain(&mut edges, &left, true);
        insert_chain(&mut edges, &right, true);

        let result = assemble_loops(&mut edges, &directed()).unwrap();
        assert_eq!(result.loops.len(), 2);
        assert!(result.unused.is_empty());
        for assembled in &result.loops {
            assert_eq!(assembled.len(), 3);
            assert!(assembled.is_simple());
        }
    }

    #[test]
    fn reverse_edge_only_is_a_dead_end() {
        // A single undirected edge cannot close a loop; both stored
        // directions drain into one unused report.
        let mut edges = EdgeSet::new(true, false);
        edges.insert(ll(0.0, 0.0), ll(0.0, 10.0));

        let result = assemble_loops(&mut edges, &AssemblerOptions::undirected_xor()).unwrap();
        assert!(result.loops.is_empty());
        assert_eq!(result.unused.len(), 1);
        assert!(edges.is_empty());
    }

    #[test]
    fn undirected_loop_assembles() {
        let square = [ll(0.0, 0.0), ll(0.0, 10.0), ll(10.0, 10.0), ll(10.0, 0.0)];
        let mut edges = EdgeSet::new(true, false);
        insert_chain(&mut edges, &square, true);

        let result = assemble_loops(
            &mut edges,
            &AssemblerOptions::default().with_undirected_edges(true),
        )
        .unwrap();
        assert_eq!(result.loops.len(), 1);
        assert_eq!(result.loops[0].len(), 4);
        assert!(result.unused.is_empty());
        // Undirected extraction normalizes: the loop encloses the small
        // side regardless of which direction the walk happened to take.
        assert!(result.loops[0].is_normalized());
    }

    #[test]
    fn undirected_subdivided_square_extracts_faces() {
        // A square split into two rectangles by a shared interior edge
        // (multiplicity two, undirected, no XOR). The walk must extract
        // the two small faces, not the combined outline.
        // Off the equator so no junction triple is exactly coplanar.
        let sw = ll(1.0, 0.0);
        let se = ll(1.0, 10.0);
        let ne = ll(11.0, 10.0);
        let nw = ll(11.0, 0.0);
        let mid_s = ll(1.0, 5.0);
        let mid_n = ll(11.0, 5.0);

        let mut edges = EdgeSet::new(true, false);
        // West rectangle.
        insert_chain(&mut edges, &[sw, mid_s, mid_n, nw], true);
        // East rectangle.
        insert_chain(&mut edges, &[mid_s, se, ne, mid_n], true);

        let result = assemble_loops(
            &mut edges,
            &AssemblerOptions::default().with_undirected_edges(true),
        )
        .unwrap();
        assert_eq!(result.loops.len(), 2);
        assert!(result.unused.is_empty());
        for assembled in &result.loops {
            assert_eq!(assembled.len(), 4);
            assert!(assembled.is_normalized());
            // Each face is one rectangle, not the 6-vertex outline.
            assert!(assembled.vertices().contains(&mid_s));
            assert!(assembled.vertices().contains(&mid_n));
        }
    }

    #[test]
    fn bowtie_rejected_with_validation() {
        // Two open chains whose union is a figure-eight through two shared
        // vertices: it closes into a self-crossing "loop" that validation
        // rejects, returning all four edges as unused.
        let p = ll(0.0, 20.0);
        let q = ll(10.0, 20.0);
        let mut edges = EdgeSet::new(false, false);
        insert_chain(&mut edges, &[p, ll(0.0, 30.0), q], false);
        insert_chain(&mut edges, &[q, ll(10.0, 30.0), p], false);

        let result =
            assemble_loops(&mut edges, &directed().with_validate(true)).unwrap();
        assert!(result.loops.is_empty());
        assert_eq!(result.unused.len(), 4);
        assert_eq!(result.rejected, 1);
        assert!(edges.is_empty());
    }

    #[test]
    fn partial_tail_edges_are_not_lost() {
        // A "lollipop": a stick leading into a triangle. The triangle
        // closes; the stick edge dead-ends afterwards.
        let stick = ll(-10.0, 0.0);
        let a = ll(0.0, 0.0);
        let tri = [a, ll(0.0, 10.0), ll(10.0, 5.0)];
        let mut edges = EdgeSet::new(false, false);
        edges.insert(stick, a);
        insert_chain(&mut edges, &tri, true);

        let result = assemble_loops(&mut edges, &directed()).unwrap();
        assert_eq!(result.loops.len(), 1);
        assert_eq!(result.unused.len(), 1);
        assert_eq!(result.unused[0], Edge::new(stick, a));
    }

    #[test]
    fn validation_passes_on_clean_extraction() {
        let tri = [ll(0.0, 0.0), ll(0.0, 10.0), ll(10.0, 5.0)];
        let mut edges = EdgeSet::new(false, false);
        insert_chain(&mut edges, &tri, true);

        let result = assemble_loops(&mut edges, &directed().with_validate(true)).unwrap();
        assert_eq!(result.loops.len(), 1);
        assert_eq!(result.rejected, 0);
    }
}
