//! Vertex merging: cluster nearby endpoints onto canonical positions.
//!
//! Clustering runs as explicit rounds over an arena of cluster records.
//! Each round unions every pair of cluster representatives within the
//! merge radius, then re-elects representatives; merging can pull
//! previously-distant clusters into range, so rounds repeat until a round
//! makes no progress. Cluster count strictly decreases every productive
//! round, and a configured round limit guards termination regardless.

use hashbrown::HashMap;
use kiddo::{KdTree, SquaredEuclidean};
use tracing::{debug, warn};

use sphere_types::{cell, SpherePoint};

use crate::edges::EdgeSet;
use crate::error::{AssemblyError, AssemblyResult};
use crate::options::AssemblerOptions;

/// Substitution from original vertex positions to canonical positions.
///
/// Only vertices that actually move have entries.
#[derive(Debug, Default)]
pub(crate) struct VertexMap {
    map: HashMap<SpherePoint, SpherePoint>,
}

impl VertexMap {
    pub(crate) fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    /// Canonical position for `v`, when it differs from `v` itself.
    pub(crate) fn resolve(&self, v: &SpherePoint) -> Option<SpherePoint> {
        self.map.get(v).copied()
    }

    fn insert(&mut self, from: SpherePoint, to: SpherePoint) {
        self.map.insert(from, to);
    }
}

/// Arena of cluster records over the distinct input vertices.
struct ClusterArena {
    /// All distinct vertices, in point order.
    vertices: Vec<SpherePoint>,
    /// Union-find parent links into `vertices`.
    parent: Vec<usize>,
}

impl ClusterArena {
    fn new(vertices: Vec<SpherePoint>) -> Self {
        let parent = (0..vertices.len()).collect();
        Self { vertices, parent }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            // Path halving keeps the forest shallow.
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    /// Union two clusters; returns whether they were previously distinct.
    fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        // Root at the smaller vertex so representatives are deterministic.
        let (keep, absorb) = if ra < rb { (ra, rb) } else { (rb, ra) };
        self.parent[absorb] = keep;
        true
    }

    /// Current representatives: the smallest member of each cluster.
    ///
    /// Rooting at the smaller index in `union` makes roots exactly that.
    fn representatives(&mut self) -> Vec<usize> {
        let mut reps: Vec<usize> = (0..self.vertices.len())
            .map(|i| self.find(i))
            .collect();
        reps.sort_unstable();
        reps.dedup();
        reps
    }
}

/// Cluster the edge set's endpoints and build the substitution map.
///
/// Returns an empty map when nothing merges (and snapping does not apply).
pub(crate) fn build_merge_map(
    edges: &EdgeSet,
    options: &AssemblerOptions,
) -> AssemblyResult<VertexMap> {
    let radius = options.vertex_merge_radius;
    debug_assert!(radius.radians() > 0.0);

    let vertices = edges.vertices();
    let mut arena = ClusterArena::new(vertices);
    let n = arena.vertices.len();
    if n == 0 {
        return Ok(VertexMap::default());
    }

    // Inflated query distance: the kd-tree works in squared chord space;
    // candidates are re-filtered by exact angular distance (inclusive).
    let query_d2 = radius.chord2() * (1.0 + 1e-9) + 1e-12;

    let mut rounds = 0usize;
    let mut reps = arena.representatives();
    loop {
        if rounds >= options.merge_iteration_limit {
            return Err(AssemblyError::MergeLimitExceeded {
                limit: options.merge_iteration_limit,
            });
        }
        rounds += 1;

        let mut tree: KdTree<f64, 3> = KdTree::new();
        for &i in &reps {
            let c = arena.vertices[i].coords();
            tree.add(&[c.x, c.y, c.z], i as u64);
        }

        let mut merged_any = false;
        for &i in &reps {
            let vi = arena.vertices[i];
            let c = vi.coords();
            for neighbor in tree.within_unsorted::<SquaredEuclidean>(&[c.x, c.y, c.z], query_d2) {
                let j = neighbor.item as usize;
                if j == i {
                    continue;
                }
                // Inclusive boundary: exactly `radius` apart still merges.
                if arena.vertices[j].angle_to(&vi).radians() <= radius.radians()
                    && arena.union(i, j)
                {
                    merged_any = true;
                }
            }
        }

        if !merged_any {
            break;
        }
        reps = arena.representatives();
    }

    debug!(
        vertices = n,
        clusters = reps.len(),
        rounds,
        "vertex clustering converged"
    );

    // Optional deterministic snapping of the canonical positions.
    let snap_level = options.snap_level();
    if options.snap_to_cell_centers && snap_level.is_none() {
        warn!(
            robustness_radius = options.robustness_radius().radians(),
            "robustness radius too small for any cell level; snapping disabled"
        );
    }

    let mut map = VertexMap::default();
    for i in 0..n {
        let root = arena.find(i);
        let mut canonical = arena.vertices[root];
        if let Some(level) = snap_level {
            canonical = cell::snap_to_level(&canonical, level);
        }
        if canonical != arena.vertices[i] {
            map.insert(arena.vertices[i], canonical);
        }
    }
    Ok(map)
}
