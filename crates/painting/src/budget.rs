//! Per-triangle subdivision depth from a mesh-wide leaf area budget.
//!
//! Triangles of one mesh differ wildly in size. Subdividing all of them to
//! the same depth over-resolves small triangles and under-resolves large
//! ones, so each triangle picks the shallowest depth whose leaf cells come
//! close to a shared target area.

use tracing::{debug, warn};

use crate::constants::MAX_SUBDIVISION_DEPTH;

/// Select the subdivision depth for a triangle of `area`.
///
/// The target leaf area is `max_area / 4^requested_depth`. Levels are tried
/// from 0 upwards; the first level whose leaf area, divided by the target
/// and rounded to the nearest integer, is at most 1 wins. If no level up to
/// `requested_depth` qualifies, `requested_depth` is returned.
///
/// A non-positive or non-finite budget disables the heuristic.
pub fn select_depth(area: f32, requested_depth: u32, max_area: f32) -> u32 {
    let requested_depth = clamp_depth(requested_depth);

    if !(max_area.is_finite() && max_area > 0.0) {
        warn!(
            "select_depth: unusable area budget {}, using requested depth {}",
            max_area, requested_depth
        );
        return requested_depth;
    }

    let unit = max_area / leaf_count(requested_depth);
    for level in 0..=requested_depth {
        let leaf_area = area / leaf_count(level);
        let ratio = (leaf_area / unit).round();
        if ratio <= 1.0 {
            debug!(
                "select_depth: area={:.4} budget={:.4} requested={} -> {}",
                area, max_area, requested_depth, level
            );
            return level;
        }
    }
    requested_depth
}

/// Clamp a depth request to [`MAX_SUBDIVISION_DEPTH`].
pub fn clamp_depth(depth: u32) -> u32 {
    if depth > MAX_SUBDIVISION_DEPTH {
        warn!(
            "requested depth {} exceeds maximum {}, clamping",
            depth, MAX_SUBDIVISION_DEPTH
        );
        MAX_SUBDIVISION_DEPTH
    } else {
        depth
    }
}

/// Number of leaves of a full tree at `depth`.
fn leaf_count(depth: u32) -> f32 {
    4f32.powi(depth as i32)
}
