use glam::{Vec2, Vec3};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FieldError {
    #[error("Invalid geometry: {what} is not finite")]
    InvalidGeometry { what: &'static str },
    #[error("Corrupt node records at index {index}: {reason}")]
    DataCorruption { index: usize, reason: String },
    #[error("Invalid state: {0}")]
    InvalidState(&'static str),
    #[error("Triangle field has no world-space vertices")]
    MissingWorldGeometry,
}

impl FieldError {
    pub(crate) fn corrupt(index: usize, reason: impl Into<String>) -> Self {
        FieldError::DataCorruption {
            index,
            reason: reason.into(),
        }
    }
}

/// Check that all three world-space vertices are finite
pub fn validate_vertices(vertices: &[Vec3; 3]) -> Result<(), FieldError> {
    const NAMES: [&str; 3] = ["vertex0", "vertex1", "vertex2"];
    for (vertex, what) in vertices.iter().zip(NAMES) {
        if !vertex.is_finite() {
            return Err(FieldError::InvalidGeometry { what });
        }
    }
    Ok(())
}

/// Check that all three texture coordinates are finite
pub fn validate_uvs(uvs: &[Vec2; 3]) -> Result<(), FieldError> {
    const NAMES: [&str; 3] = ["uv0", "uv1", "uv2"];
    for (uv, what) in uvs.iter().zip(NAMES) {
        if !uv.is_finite() {
            return Err(FieldError::InvalidGeometry { what });
        }
    }
    Ok(())
}
