//! The canonical edge table.
//!
//! Edges are stored per origin vertex as a destination multiset, in
//! `BTreeMap`s keyed by the total point order so that every scan over the
//! table is deterministic. Undirected edges are stored in both directions
//! and kept in lockstep; XOR cancellation happens at insertion time.

use std::collections::BTreeMap;

use sphere_types::{Edge, SpherePoint};

/// Multiset of directed edges, indexed by origin.
#[derive(Debug, Clone)]
pub(crate) struct EdgeSet {
    undirected: bool,
    xor: bool,
    edges: BTreeMap<SpherePoint, BTreeMap<SpherePoint, u32>>,
    /// Origins in first-insertion order; assembly scans them in this order
    /// so results depend only on input order, not on hash state.
    starting_vertices: Vec<SpherePoint>,
}

impl EdgeSet {
    pub(crate) fn new(undirected: bool, xor: bool) -> Self {
        Self {
            undirected,
            xor,
            edges: BTreeMap::new(),
            starting_vertices: Vec::new(),
        }
    }

    pub(crate) fn undirected(&self) -> bool {
        self.undirected
    }

    /// Insert an edge, applying XOR cancellation.
    ///
    /// Degenerate edges (`v0 == v1`) are ignored. In XOR mode, when the
    /// reverse edge exists the pair is erased instead of inserting; for
    /// undirected storage the reverse lookup also matches a same-direction
    /// duplicate, so any duplicate cancels. Returns whether an edge was
    /// actually added.
    pub(crate) fn insert(&mut self, v0: SpherePoint, v1: SpherePoint) -> bool {
        if v0 == v1 {
            return false;
        }
        if self.xor && self.contains(&v1, &v0) {
            self.erase(&v1, &v0);
            return false;
        }
        self.insert_one(v0, v1);
        if self.undirected {
            self.insert_one(v1, v0);
        }
        true
    }

    fn insert_one(&mut self, v0: SpherePoint, v1: SpherePoint) {
        if !self.edges.contains_key(&v0) {
            self.starting_vertices.push(v0);
        }
        *self.edges.entry(v0).or_default().entry(v1).or_insert(0) += 1;
    }

    /// Remove one copy of the edge, which must exist. Undirected storage
    /// removes the sibling copy as well.
    pub(crate) fn erase(&mut self, v0: &SpherePoint, v1: &SpherePoint) {
        self.erase_one(v0, v1);
        if self.undirected {
            self.erase_one(v1, v0);
        }
    }

    fn erase_one(&mut self, v0: &SpherePoint, v1: &SpherePoint) {
        let Some(successors) = self.edges.get_mut(v0) else {
            debug_assert!(false, "erasing edge with unknown origin");
            return;
        };
        match successors.get_mut(v1) {
            Some(count) if *count > 1 => *count -= 1,
            Some(_) => {
                successors.remove(v1);
                if successors.is_empty() {
                    self.edges.remove(v0);
                }
            }
            None => debug_assert!(false, "erasing edge that is not present"),
        }
    }

    pub(crate) fn contains(&self, v0: &SpherePoint, v1: &SpherePoint) -> bool {
        self.edges
            .get(v0)
            .is_some_and(|successors| successors.contains_key(v1))
    }

    /// Destinations reachable from `v0`, in point order, with multiplicity.
    pub(crate) fn successors(&self, v0: &SpherePoint) -> Option<&BTreeMap<SpherePoint, u32>> {
        self.edges.get(v0)
    }

    /// Smallest-ordered successor of `v0`, if any.
    pub(crate) fn first_successor(&self, v0: &SpherePoint) -> Option<SpherePoint> {
        self.edges
            .get(v0)
            .and_then(|successors| successors.keys().next().copied())
    }

    pub(crate) fn num_starting_vertices(&self) -> usize {
        self.starting_vertices.len()
    }

    pub(crate) fn starting_vertex(&self, i: usize) -> SpherePoint {
        self.starting_vertices[i]
    }

    /// Total stored directed-edge count (undirected edges count twice).
    pub(crate) fn num_directed_edges(&self) -> usize {
        self.edges
            .values()
            .flat_map(|successors| successors.values())
            .map(|&count| count as usize)
            .sum()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Every distinct endpoint currently referenced by some edge.
    pub(crate) fn vertices(&self) -> Vec<SpherePoint> {
        let mut all: std::collections::BTreeSet<SpherePoint> = std::collections::BTreeSet::new();
        for (v0, successors) in &self.edges {
            all.insert(*v0);
            for v1 in successors.keys() {
                all.insert(*v1);
            }
        }
        all.into_iter().collect()
    }

    /// One entry per logical edge (undirected edges appear once, with
    /// `origin < destination`), repeated per multiplicity.
    pub(crate) fn collect_edges(&self) -> Vec<Edge> {
        let mut out = Vec::new();
        for (v0, successors) in &self.edges {
            for (v1, &count) in successors {
                if self.undirected && v1 < v0 {
                    continue;
                }
                for _ in 0..count {
                    out.push(Edge::new(*v0, *v1));
                }
            }
        }
        out
    }

    /// Rewrite edges through a vertex substitution, re-applying XOR.
    ///
    /// Only edges with a moved endpoint are touched; edges whose endpoints
    /// collapse onto each other vanish, and newly-coincident opposite
    /// edges cancel exactly as if they had been inserted that way.
    pub(crate) fn move_vertices(&mut self, resolve: impl Fn(&SpherePoint) -> Option<SpherePoint>) {
        let mut moved: Vec<(SpherePoint, SpherePoint)> = Vec::new();
        for (v0, successors) in &self.edges {
            for (v1, &count) in successors {
                if resolve(v0).is_none() && resolve(v1).is_none() {
                    continue;
                }
                // One copy per undirected pair is enough; erase removes both.
                if self.undirected && v1 < v0 {
                    continue;
                }
                for _ in 0..count {
                    moved.push((*v0, *v1));
                }
            }
        }
        for (v0, v1) in moved {
            self.erase(&v0, &v1);
            let n0 = resolve(&v0).unwrap_or(v0);
            let n1 = resolve(&v1).unwrap_or(v1);
            self.insert(n0, n1);
        }
    }
}
