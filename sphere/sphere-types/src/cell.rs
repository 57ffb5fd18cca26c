//! Discrete cell grid for deterministic vertex snapping.
//!
//! The sphere is covered by the six faces of a circumscribed cube; each
//! face is subdivided into `2^level × 2^level` cells in the gnomonic
//! (central) projection. Snapping a point moves it to the center of its
//! containing cell, which bounds the displacement by a quantifiable
//! per-level radius — the property the assembler's robustness-radius
//! configuration relies on.

use nalgebra::Vector3;

use crate::angle::Angle;
use crate::point::SpherePoint;

/// Finest supported subdivision level.
pub const MAX_CELL_LEVEL: u8 = 30;

/// Snap a point to the center of its containing cell at `level`.
///
/// Snapping is deterministic and idempotent: cell centers map to
/// themselves.
///
/// # Example
///
/// ```
/// use sphere_types::{cell, SpherePoint};
///
/// let p = SpherePoint::from_lat_lng_degrees(12.34, 56.78);
/// let snapped = cell::snap_to_level(&p, 16);
/// assert_eq!(cell::snap_to_level(&snapped, 16), snapped);
/// assert!(p.angle_to(&snapped) <= cell::max_snap_radius(16));
/// ```
#[must_use]
pub fn snap_to_level(p: &SpherePoint, level: u8) -> SpherePoint {
    let level = level.min(MAX_CELL_LEVEL);
    let (face, u, v) = to_face_uv(p);
    let cells = f64::from(1u32 << level);
    // Map [-1, 1] → cell index, clamped so u = 1.0 stays on the face.
    let iu = (((u + 1.0) * 0.5 * cells).floor()).clamp(0.0, cells - 1.0);
    let iv = (((v + 1.0) * 0.5 * cells).floor()).clamp(0.0, cells - 1.0);
    let cu = (iu + 0.5) / cells * 2.0 - 1.0;
    let cv = (iv + 0.5) / cells * 2.0 - 1.0;
    from_face_uv(face, cu, cv)
}

/// Conservative bound on the angular distance moved by snapping at `level`.
///
/// Half the cell diagonal in face coordinates; the gnomonic projection
/// never shrinks distances, so the true displacement is always smaller.
#[must_use]
pub fn max_snap_radius(level: u8) -> Angle {
    let level = level.min(MAX_CELL_LEVEL);
    let half_cell = 1.0 / f64::from(1u32 << level);
    Angle::from_radians(half_cell * std::f64::consts::SQRT_2)
}

/// The coarsest level whose snap error fits within `radius`.
///
/// Returns `None` when even the finest level moves points too far, in
/// which case snapping must stay disabled.
///
/// # Example
///
/// ```
/// use sphere_types::{cell, Angle};
///
/// // A huge radius admits the coarsest grid.
/// assert_eq!(cell::level_for_radius(Angle::from_degrees(180.0)), Some(0));
/// // A sub-leaf radius admits nothing.
/// assert_eq!(cell::level_for_radius(Angle::from_radians(1e-12)), None);
/// ```
#[must_use]
pub fn level_for_radius(radius: Angle) -> Option<u8> {
    if !radius.is_finite() || radius.radians() <= 0.0 {
        return None;
    }
    (0..=MAX_CELL_LEVEL).find(|&level| max_snap_radius(level).radians() <= radius.radians())
}

/// Project a point onto its dominant cube face.
///
/// Returns `(face, u, v)` with `u, v ∈ [-1, 1]`. Faces 0..2 are `+x, +y,
/// +z`; faces 3..5 are `-x, -y, -z`. Ties between coordinates resolve to
/// the smaller axis index, so the mapping is deterministic.
fn to_face_uv(p: &SpherePoint) -> (u8, f64, f64) {
    let c = p.coords();
    let abs = [c.x.abs(), c.y.abs(), c.z.abs()];
    let axis = if abs[0] >= abs[1] && abs[0] >= abs[2] {
        0
    } else if abs[1] >= abs[2] {
        1
    } else {
        2
    };
    let major = c[axis];
    let face = if major >= 0.0 { axis as u8 } else { axis as u8 + 3 };
    let (u, v) = match axis {
        0 => (c.y / major, c.z / major),
        1 => (c.z / major, c.x / major),
        _ => (c.x / major, c.y / major),
    };
    (face, u.clamp(-1.0, 1.0), v.clamp(-1.0, 1.0))
}

/// Inverse of [`to_face_uv`] for a cell-center coordinate.
fn from_face_uv(face: u8, u: f64, v: f64) -> SpherePoint {
    let sign = if face < 3 { 1.0 } else { -1.0 };
    let raw = match face % 3 {
        0 => Vector3::new(sign, sign * u, sign * v),
        1 => Vector3::new(sign * v, sign, sign * u),
        _ => Vector3::new(sign * u, sign * v, sign),
    };
    // `raw` has norm ≥ 1 by construction.
    SpherePoint::from_vector(raw).unwrap_or_else(SpherePoint::z_axis)
}
