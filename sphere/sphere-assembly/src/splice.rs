//! Edge splicing: split edges that pass close to a vertex.
//!
//! After merging, a canonical vertex can end up lying almost on an edge it
//! is not an endpoint of; left alone, that produces self-intersecting or
//! disconnected loops. Splicing splits such edges through the vertex.
//! Splitting is applied to a fixed point via a work stack (each half can
//! itself pass near another vertex), under a split budget that converts a
//! potential infinite refinement loop into an error.

use kiddo::{KdTree, SquaredEuclidean};
use smallvec::SmallVec;
use tracing::debug;

use sphere_types::{predicates, Angle, SpherePoint};

use crate::edges::EdgeSet;
use crate::error::{AssemblyError, AssemblyResult};
use crate::options::AssemblerOptions;

/// Split every edge that passes within the splice tolerance of a
/// non-endpoint vertex.
pub(crate) fn splice_edges(
    edges: &mut EdgeSet,
    options: &AssemblerOptions,
) -> AssemblyResult<()> {
    let tolerance = options.vertex_merge_radius * options.edge_splice_fraction;
    if tolerance.radians() <= 0.0 {
        return Ok(());
    }

    let vertices = edges.vertices();
    let mut tree: KdTree<f64, 3> = KdTree::new();
    for (i, v) in vertices.iter().enumerate() {
        let c = v.coords();
        tree.add(&[c.x, c.y, c.z], i as u64);
    }

    let mut stack = edges.collect_edges();
    let limit = options
        .splice_split_limit
        .unwrap_or(64 + 8 * stack.len());

    let mut splits = 0usize;
    while let Some(edge) = stack.pop() {
        let (v0, v1) = (edge.origin, edge.destination);
        // The edge may have been erased by XOR cancellation while its
        // stack entry was pending.
        if !edges.contains(&v0, &v1) {
            continue;
        }
        let Some(vmid) = nearest_splice_vertex(&tree, &vertices, &v0, &v1, tolerance) else {
            continue;
        };

        splits += 1;
        if splits > limit {
            return Err(AssemblyError::SpliceLimitExceeded { limit });
        }

        edges.erase(&v0, &v1);
        if edges.insert(v0, vmid) {
            stack.push(sphere_types::Edge::new(v0, vmid));
        }
        if edges.insert(vmid, v1) {
            stack.push(sphere_types::Edge::new(vmid, v1));
        }
    }

    if splits > 0 {
        debug!(splits, "spliced vertices into edges");
    }
    Ok(())
}

/// The vertex closest to the interior of `(v0, v1)` within `tolerance`,
/// excluding the endpoints themselves. Distance ties resolve to the
/// smaller point.
fn nearest_splice_vertex(
    tree: &KdTree<f64, 3>,
    vertices: &[SpherePoint],
    v0: &SpherePoint,
    v1: &SpherePoint,
    tolerance: Angle,
) -> Option<SpherePoint> {
    // A ball around the edge midpoint with radius (half-length + tolerance)
    // covers every point within tolerance of the segment.
    let mid = SpherePoint::interpolate(0.5, v0, v1);
    let reach = Angle::from_radians(
        (v0.angle_to(v1).radians() * 0.5 + tolerance.radians()).min(std::f64::consts::PI),
    );
    let query_d2 = reach.chord2() * (1.0 + 1e-9) + 1e-12;

    let c = mid.coords();
    let candidates: SmallVec<[SpherePoint; 8]> = tree
        .within_unsorted::<SquaredEuclidean>(&[c.x, c.y, c.z], query_d2)
        .into_iter()
        .map(|n| vertices[n.item as usize])
        .collect();

    let mut best: Option<(Angle, SpherePoint)> = None;
    for p in candidates {
        if p == *v0 || p == *v1 {
            continue;
        }
        let d = predicates::distance_to_edge(&p, v0, v1);
        if d.radians() > tolerance.radians() {
            continue;
        }
        let closer = match &best {
            None => true,
            Some((bd, bp)) => {
                d.radians() < bd.radians() || (d.radians() == bd.radians() && p < *bp)
            }
        };
        if closer {
            best = Some((d, p));
        }
    }
    best.map(|(_, p)| p)
}
