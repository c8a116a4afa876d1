use glam::Vec2;

/// Corners of the root parametric triangle every subdivision tree starts from.
pub const ROOT_PARAM_CORNERS: [Vec2; 3] = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)];

/// Smallest extent any axis of a triangle's bounding box may have.
pub const MIN_BOUNDS_EXTENT: f32 = 0.1;

/// Hard cap on subdivision depth. A full tree at this depth has 4^16 leaves.
pub const MAX_SUBDIVISION_DEPTH: u32 = navmesh_config::MAX_DEPTH;

/// Tolerance used when checking persisted child corners against the parent split.
pub const CORNER_EPSILON: f32 = 1e-6;
