use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Painted state of a leaf cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum CellState {
    /// Never painted or sampled
    #[default]
    Unset = 0,
    Walkable = 1,
    Blocked = 2,
}

impl CellState {
    /// State written by a paint stroke in the given mode
    pub fn from_erase(erase: bool) -> Self {
        if erase {
            CellState::Blocked
        } else {
            CellState::Walkable
        }
    }

    pub fn is_walkable(self) -> bool {
        self == CellState::Walkable
    }
}

impl TryFrom<u8> for CellState {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CellState::Unset),
            1 => Ok(CellState::Walkable),
            2 => Ok(CellState::Blocked),
            other => Err(other),
        }
    }
}

/// Whether a persisted node record is followed by its children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum BranchMarker {
    Leaf = 0,
    /// The next records hold the four children, each in pre-order
    Branch = 1,
}

impl TryFrom<u8> for BranchMarker {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(BranchMarker::Leaf),
            1 => Ok(BranchMarker::Branch),
            other => Err(other),
        }
    }
}

/// A leaf cell emitted for mesh regeneration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderTriangle {
    /// World-space corners
    pub positions: [Vec3; 3],
    /// Texture-space corners
    pub uvs: [Vec2; 3],
    pub state: CellState,
}

impl RenderTriangle {
    /// World-space area of the cell
    pub fn area(&self) -> f32 {
        crate::geometry::triangle_area(self.positions[0], self.positions[1], self.positions[2])
    }
}

/// A debug line segment along a leaf edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GizmoLine {
    pub start: Vec3,
    pub end: Vec3,
    pub state: CellState,
}

/// Receiver for debug line segments.
pub trait GizmoSink {
    fn draw_line(&mut self, start: Vec3, end: Vec3, state: CellState);
}

impl GizmoSink for Vec<GizmoLine> {
    fn draw_line(&mut self, start: Vec3, end: Vec3, state: CellState) {
        self.push(GizmoLine { start, end, state });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_state_from_erase() {
        assert_eq!(CellState::from_erase(false), CellState::Walkable);
        assert_eq!(CellState::from_erase(true), CellState::Blocked);
    }

    #[test]
    fn test_cell_state_byte_conversion() {
        for state in [CellState::Unset, CellState::Walkable, CellState::Blocked] {
            assert_eq!(CellState::try_from(state as u8), Ok(state));
        }
        assert_eq!(CellState::try_from(7), Err(7));
    }

    #[test]
    fn test_branch_marker_byte_conversion() {
        assert_eq!(BranchMarker::try_from(0), Ok(BranchMarker::Leaf));
        assert_eq!(BranchMarker::try_from(1), Ok(BranchMarker::Branch));
        assert_eq!(BranchMarker::try_from(2), Err(2));
    }

    #[test]
    fn test_gizmo_sink_for_vec() {
        let mut lines: Vec<GizmoLine> = Vec::new();
        lines.draw_line(Vec3::ZERO, Vec3::X, CellState::Blocked);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].end, Vec3::X);
        assert_eq!(lines[0].state, CellState::Blocked);
    }
}
