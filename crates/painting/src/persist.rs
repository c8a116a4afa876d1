//! Flat record form of a subdivision tree.
//!
//! A tree is persisted as its pre-order walk: one [`NodeRecord`] per node,
//! children visited in the order corner0, corner1, corner2, center. A record
//! marked [`BranchMarker::Branch`] is followed by the records of its four
//! subtrees; a leaf record is followed by its next sibling (or an ancestor's).
//!
//! The record layout is fixed (28 bytes, little-endian on disk) so saved
//! buffers stay readable across versions.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::geometry::ParamTriangle;
use crate::types::{BranchMarker, CellState};
use crate::validation::FieldError;

/// One node of a flattened subdivision tree
///
/// Field order is arranged for 4-byte alignment so the record can be cast
/// to and from raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct NodeRecord {
    /// Parametric corners: p0.x, p0.y, p1.x, p1.y, p2.x, p2.y
    pub corners: [f32; 6],
    /// [`CellState`] as u8
    pub state: u8,
    /// [`BranchMarker`] as u8
    pub marker: u8,
    /// Padding for 4-byte alignment
    pub _padding: [u8; 2],
}

/// Size of one encoded record in bytes
pub const RECORD_SIZE: usize = std::mem::size_of::<NodeRecord>();

impl NodeRecord {
    pub fn new(triangle: &ParamTriangle, state: CellState, marker: BranchMarker) -> Self {
        let [p0, p1, p2] = triangle.corners;
        Self {
            corners: [p0.x, p0.y, p1.x, p1.y, p2.x, p2.y],
            state: state as u8,
            marker: marker as u8,
            _padding: [0, 0],
        }
    }

    /// Record of a single unpainted root leaf
    pub fn root_leaf() -> Self {
        Self::new(&ParamTriangle::root(), CellState::Unset, BranchMarker::Leaf)
    }

    pub fn triangle(&self) -> ParamTriangle {
        let c = &self.corners;
        ParamTriangle::new(
            Vec2::new(c[0], c[1]),
            Vec2::new(c[2], c[3]),
            Vec2::new(c[4], c[5]),
        )
    }

    /// Decode the state byte; `index` is only used for error reporting
    pub fn cell_state(&self, index: usize) -> Result<CellState, FieldError> {
        CellState::try_from(self.state)
            .map_err(|b| FieldError::corrupt(index, format!("invalid state byte {}", b)))
    }

    /// Decode the marker byte; `index` is only used for error reporting
    pub fn branch_marker(&self, index: usize) -> Result<BranchMarker, FieldError> {
        BranchMarker::try_from(self.marker)
            .map_err(|b| FieldError::corrupt(index, format!("invalid branch marker {}", b)))
    }
}

/// Encode a record sequence as little-endian bytes.
pub fn encode_records(records: &[NodeRecord]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(records.len() * RECORD_SIZE);
    for record in records {
        for value in record.corners {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes.extend_from_slice(&[record.state, record.marker, 0, 0]);
    }
    bytes
}

/// Decode bytes produced by [`encode_records`].
///
/// Only the framing is checked here; marker and state bytes are validated
/// when the tree is rebuilt.
pub fn decode_records(bytes: &[u8]) -> Result<Vec<NodeRecord>, FieldError> {
    if bytes.len() % RECORD_SIZE != 0 {
        return Err(FieldError::corrupt(
            bytes.len() / RECORD_SIZE,
            format!(
                "byte length {} is not a multiple of record size {}",
                bytes.len(),
                RECORD_SIZE
            ),
        ));
    }

    let records = bytes
        .chunks_exact(RECORD_SIZE)
        .map(|chunk| {
            let mut record: NodeRecord = bytemuck::Zeroable::zeroed();
            for (i, value) in record.corners.iter_mut().enumerate() {
                let start = i * 4;
                let mut raw = [0u8; 4];
                raw.copy_from_slice(&chunk[start..start + 4]);
                *value = f32::from_le_bytes(raw);
            }
            record.state = chunk[24];
            record.marker = chunk[25];
            record
        })
        .collect();
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_size() {
        assert_eq!(RECORD_SIZE, 28);
        let record = NodeRecord::root_leaf();
        assert_eq!(bytemuck::bytes_of(&record).len(), RECORD_SIZE);
    }

    #[test]
    fn test_record_triangle_matches_source() {
        let tri = ParamTriangle::root().split()[3];
        let record = NodeRecord::new(&tri, CellState::Blocked, BranchMarker::Branch);
        assert_eq!(record.triangle(), tri);
        assert_eq!(record.cell_state(0), Ok(CellState::Blocked));
        assert_eq!(record.branch_marker(0), Ok(BranchMarker::Branch));
    }

    #[test]
    fn test_encode_decode_bytes() {
        let children = ParamTriangle::root().split();
        let records = vec![
            NodeRecord::new(&ParamTriangle::root(), CellState::Unset, BranchMarker::Branch),
            NodeRecord::new(&children[0], CellState::Walkable, BranchMarker::Leaf),
            NodeRecord::new(&children[1], CellState::Blocked, BranchMarker::Leaf),
        ];
        let bytes = encode_records(&records);
        assert_eq!(bytes.len(), 3 * RECORD_SIZE);
        assert_eq!(decode_records(&bytes), Ok(records));
    }

    #[test]
    fn test_decode_rejects_partial_record() {
        let bytes = encode_records(&[NodeRecord::root_leaf()]);
        let result = decode_records(&bytes[..RECORD_SIZE - 1]);
        assert!(matches!(result, Err(FieldError::DataCorruption { .. })));
    }

    #[test]
    fn test_invalid_bytes_reported() {
        let mut record = NodeRecord::root_leaf();
        record.state = 9;
        record.marker = 5;
        assert!(matches!(record.cell_state(4), Err(FieldError::DataCorruption { index: 4, .. })));
        assert!(matches!(record.branch_marker(4), Err(FieldError::DataCorruption { index: 4, .. })));
    }
}
