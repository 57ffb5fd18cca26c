//! Configuration for the polygon assembler.
//!
//! # Presets
//!
//! - [`AssemblerOptions::default()`] - directed edges with XOR cancellation,
//!   the right choice for assembling polygons from oriented boundaries
//! - [`AssemblerOptions::undirected_xor()`] - unoriented input with XOR
//!   cancellation
//! - [`AssemblerOptions::keep_duplicates()`] - directed edges, duplicates
//!   preserved; use when extracting loops that intentionally share edges
//!
//! # Example
//!
//! ```
//! use sphere_assembly::AssemblerOptions;
//! use sphere_types::Angle;
//!
//! let options = AssemblerOptions::default()
//!     .with_vertex_merge_radius(Angle::from_degrees(0.1))
//!     .with_validate(true);
//! assert!(options.validate_options().is_ok());
//! ```

use sphere_types::{cell, Angle};

use crate::error::{AssemblyError, AssemblyResult};

/// Default edge splice fraction (`sin 60°`).
///
/// A vertex closer to an edge than this fraction of the merge radius is
/// spliced into it.
pub const DEFAULT_EDGE_SPLICE_FRACTION: f64 = 0.866;

/// Configuration for [`PolygonAssembler`](crate::PolygonAssembler).
#[derive(Debug, Clone)]
pub struct AssemblerOptions {
    /// Treat edges as unordered pairs for matching and cancellation.
    ///
    /// Default: `false` (edges are directed).
    pub undirected_edges: bool,

    /// Cancel pairs of edges connecting the same endpoints instead of
    /// collapsing them.
    ///
    /// With directed edges, an insertion cancels an existing edge in the
    /// *opposite* direction — exactly how shared boundaries between
    /// adjacent, consistently-oriented shapes annihilate. Odd
    /// multiplicities leave one edge, even multiplicities leave none.
    ///
    /// Default: `true`.
    pub xor_edges: bool,

    /// Escalate internal invariant violations to errors, and reject
    /// assembled loops that are degenerate or self-crossing (their edges
    /// are returned as unused).
    ///
    /// Default: `false` (best-effort output; the caller sanity-checks).
    pub validate: bool,

    /// Snap merged vertices to discrete cell centers instead of keeping
    /// cluster-representative positions.
    ///
    /// The cell level is derived from [`AssemblerOptions::robustness_radius`];
    /// when no level fits, snapping stays off. Has no effect while the
    /// merge radius is zero.
    ///
    /// Default: `false`.
    pub snap_to_cell_centers: bool,

    /// Angular radius within which distinct input vertices are unified.
    ///
    /// Zero disables merging entirely. The boundary is inclusive: points
    /// exactly this far apart merge.
    ///
    /// Default: zero.
    pub vertex_merge_radius: Angle,

    /// Fraction of the merge radius defining how close a vertex must be to
    /// an edge to be spliced into it. Zero disables splicing.
    ///
    /// Default: [`DEFAULT_EDGE_SPLICE_FRACTION`].
    pub edge_splice_fraction: f64,

    /// Maximum number of clustering rounds before merging is declared
    /// non-convergent. Convergence is observed by a round that merges
    /// nothing, so the limit must cover one quiet round beyond the last
    /// productive one.
    ///
    /// Default: `32`.
    pub merge_iteration_limit: usize,

    /// Maximum number of edge splits during splicing. `None` derives a
    /// budget from the edge count at splice time.
    ///
    /// Default: `None`.
    pub splice_split_limit: Option<usize>,
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        Self {
            undirected_edges: false,
            xor_edges: true,
            validate: false,
            snap_to_cell_centers: false,
            vertex_merge_radius: Angle::ZERO,
            edge_splice_fraction: DEFAULT_EDGE_SPLICE_FRACTION,
            merge_iteration_limit: 32,
            splice_split_limit: None,
        }
    }
}

impl AssemblerOptions {
    /// Undirected input with XOR cancellation.
    ///
    /// Any duplicate edge between the same endpoints cancels, regardless
    /// of direction.
    #[must_use]
    pub fn undirected_xor() -> Self {
        Self {
            undirected_edges: true,
            xor_edges: true,
            ..Default::default()
        }
    }

    /// Directed input, duplicates collapsed rather than cancelled.
    ///
    /// Use when the input contains loops that intentionally share
    /// boundaries and each loop should be extracted individually.
    #[must_use]
    pub fn keep_duplicates() -> Self {
        Self {
            xor_edges: false,
            ..Default::default()
        }
    }

    /// Set whether edges are undirected.
    #[must_use]
    pub fn with_undirected_edges(mut self, undirected: bool) -> Self {
        self.undirected_edges = undirected;
        self
    }

    /// Set whether duplicate edges cancel in pairs.
    #[must_use]
    pub fn with_xor_edges(mut self, xor: bool) -> Self {
        self.xor_edges = xor;
        self
    }

    /// Enable or disable internal validation.
    #[must_use]
    pub fn with_validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Enable or disable snapping to cell centers.
    #[must_use]
    pub fn with_snap_to_cell_centers(mut self, snap: bool) -> Self {
        self.snap_to_cell_centers = snap;
        self
    }

    /// Set the vertex merge radius.
    ///
    /// # Example
    ///
    /// ```
    /// use sphere_assembly::AssemblerOptions;
    /// use sphere_types::Angle;
    ///
    /// let options = AssemblerOptions::default()
    ///     .with_vertex_merge_radius(Angle::from_degrees(1.0));
    /// assert!((options.robustness_radius().degrees() - 0.5).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn with_vertex_merge_radius(mut self, radius: Angle) -> Self {
        self.vertex_merge_radius = radius;
        self
    }

    /// Set the edge splice fraction.
    #[must_use]
    pub fn with_edge_splice_fraction(mut self, fraction: f64) -> Self {
        self.edge_splice_fraction = fraction;
        self
    }

    /// Set the clustering round limit.
    #[must_use]
    pub fn with_merge_iteration_limit(mut self, limit: usize) -> Self {
        self.merge_iteration_limit = limit;
        self
    }

    /// Set the splice split budget.
    #[must_use]
    pub fn with_splice_split_limit(mut self, limit: Option<usize>) -> Self {
        self.splice_split_limit = limit;
        self
    }

    /// Configure tolerances from a robustness radius: the maximum distance
    /// any vertex may move during assembly.
    ///
    /// Sets `vertex_merge_radius = 2 × radius`, so that two vertices that
    /// both moved by up to `radius` toward each other still unify.
    #[must_use]
    pub fn with_robustness_radius(mut self, radius: Angle) -> Self {
        self.vertex_merge_radius = radius * 2.0;
        self
    }

    /// The robustness radius implied by the merge radius (half of it).
    #[must_use]
    pub fn robustness_radius(&self) -> Angle {
        self.vertex_merge_radius * 0.5
    }

    /// The cell level used for snapping, when snapping applies.
    ///
    /// `None` when `snap_to_cell_centers` is off or when even the finest
    /// cell level would move vertices beyond the robustness radius.
    ///
    /// # Example
    ///
    /// ```
    /// use sphere_assembly::AssemblerOptions;
    /// use sphere_types::Angle;
    ///
    /// let options = AssemblerOptions::default()
    ///     .with_snap_to_cell_centers(true)
    ///     .with_robustness_radius(Angle::from_degrees(180.0));
    /// assert_eq!(options.snap_level(), Some(0));
    /// ```
    #[must_use]
    pub fn snap_level(&self) -> Option<u8> {
        if !self.snap_to_cell_centers {
            return None;
        }
        cell::level_for_radius(self.robustness_radius())
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::InvalidOptions`] for non-finite or
    /// out-of-range tolerances and zero iteration limits.
    pub fn validate_options(&self) -> AssemblyResult<()> {
        let radius = self.vertex_merge_radius.radians();
        if !radius.is_finite() || !(0.0..=std::f64::consts::PI).contains(&radius) {
            return Err(AssemblyError::InvalidOptions {
                reason: format!("vertex_merge_radius must be in [0, π], got {radius}"),
            });
        }
        if !self.edge_splice_fraction.is_finite()
            || !(0.0..=1.0).contains(&self.edge_splice_fraction)
        {
            return Err(AssemblyError::InvalidOptions {
                reason: format!(
                    "edge_splice_fraction must be in [0, 1], got {}",
                    self.edge_splice_fraction
                ),
            });
        }
        if self.merge_iteration_limit == 0 {
            return Err(AssemblyError::InvalidOptions {
                reason: "merge_iteration_limit must be non-zero".to_string(),
            });
        }
        if self.splice_split_limit == Some(0) {
            return Err(AssemblyError::InvalidOptions {
                reason: "splice_split_limit must be non-zero when set".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_directed_xor() {
        let options = AssemblerOptions::default();
        assert!(!options.undirected_edges);
        assert!(options.xor_edges);
        assert!(!options.validate);
        assert!(options.vertex_merge_radius.radians().abs() < 1e-15);
        assert!((options.edge_splice_fraction - 0.866).abs() < 1e-12);
        assert!(options.validate_options().is_ok());
    }

    #[test]
    fn presets() {
        assert!(AssemblerOptions::undirected_xor().undirected_edges);
        assert!(AssemblerOptions::undirected_xor().xor_edges);
        assert!(!AssemblerOptions::keep_duplicates().xor_edges);
    }

    #[test]
    fn robustness_radius_round_trip() {
        let options = AssemblerOptions::default().with_robustness_radius(Angle::from_degrees(2.0));
        assert!((options.vertex_merge_radius.degrees() - 4.0).abs() < 1e-12);
        assert!((options.robustness_radius().degrees() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn snap_level_off_without_flag() {
        let options = AssemblerOptions::default().with_robustness_radius(Angle::from_degrees(1.0));
        assert_eq!(options.snap_level(), None);
    }

    #[test]
    fn snap_level_tracks_radius() {
        let options = AssemblerOptions::default().with_snap_to_cell_centers(true);

        // Enormous radius: coarsest level.
        let coarse = options
            .clone()
            .with_robustness_radius(Angle::from_degrees(180.0));
        assert_eq!(coarse.snap_level(), Some(0));

        // Something smallish: a finer level whose snap error fits.
        let mid = options
            .clone()
            .with_robustness_radius(Angle::from_degrees(0.1));
        let level = mid.snap_level();
        assert!(level.is_some_and(|l| l > 0));

        // Too small for the finest cell: snapping off.
        let off = options.with_robustness_radius(Angle::from_radians(1e-12));
        assert_eq!(off.snap_level(), None);
    }

    #[test]
    fn rejects_bad_tolerances() {
        let bad_radius = AssemblerOptions::default()
            .with_vertex_merge_radius(Angle::from_radians(-1.0));
        assert!(bad_radius.validate_options().is_err());

        let nan_radius =
            AssemblerOptions::default().with_vertex_merge_radius(Angle::from_radians(f64::NAN));
        assert!(nan_radius.validate_options().is_err());

        let bad_fraction = AssemblerOptions::default().with_edge_splice_fraction(1.5);
        assert!(bad_fraction.validate_options().is_err());

        let zero_limit = AssemblerOptions::default().with_merge_iteration_limit(0);
        assert!(zero_limit.validate_options().is_err());

        let zero_splits = AssemblerOptions::default().with_splice_split_limit(Some(0));
        assert!(zero_splits.validate_options().is_err());
    }
}
