//! Recursive subdivision node and its traversals.
//!
//! Nodes live in the root's parametric space and never store world-space
//! geometry. Every traversal receives the owning triangle's world (or UV)
//! corners as a barycentric frame and maps each visited node through it on
//! the way down.

use glam::{Vec2, Vec3};

use crate::constants::{CORNER_EPSILON, MAX_SUBDIVISION_DEPTH};
use crate::geometry::{Aabb, ParamTriangle};
use crate::persist::NodeRecord;
use crate::texture::{SamplePolicy, Texture};
use crate::tool::PaintingTool;
use crate::types::{BranchMarker, CellState, GizmoSink, RenderTriangle};
use crate::validation::FieldError;

/// One sub-triangle of a subdivision tree.
///
/// A node is either a leaf carrying a [`CellState`], or split into exactly
/// four children (see [`ParamTriangle::split`]) that it owns exclusively.
/// The state of a split node is kept only so that newly created children
/// can inherit it; it is not part of the painted result.
#[derive(Debug, Clone, PartialEq)]
pub struct SubdivisionNode {
    triangle: ParamTriangle,
    state: CellState,
    children: Option<Box<[SubdivisionNode; 4]>>,
}

impl Default for SubdivisionNode {
    fn default() -> Self {
        Self::root()
    }
}

impl SubdivisionNode {
    pub fn new(triangle: ParamTriangle, state: CellState) -> Self {
        Self {
            triangle,
            state,
            children: None,
        }
    }

    /// Unpainted leaf spanning the whole parametric triangle
    pub fn root() -> Self {
        Self::new(ParamTriangle::root(), CellState::Unset)
    }

    pub fn triangle(&self) -> &ParamTriangle {
        &self.triangle
    }

    pub fn state(&self) -> CellState {
        self.state
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Children in corner0, corner1, corner2, center order
    pub fn children(&self) -> Option<&[SubdivisionNode; 4]> {
        self.children.as_deref()
    }

    /// Total number of nodes in this subtree, including this one
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .map_or(0, |c| c.iter().map(SubdivisionNode::node_count).sum::<usize>())
    }

    pub fn leaf_count(&self) -> usize {
        match self.children() {
            Some(children) => children.iter().map(SubdivisionNode::leaf_count).sum(),
            None => 1,
        }
    }

    /// Depth of the deepest leaf below this node (0 for a leaf)
    pub fn height(&self) -> u32 {
        self.children()
            .map_or(0, |c| 1 + c.iter().map(SubdivisionNode::height).max().unwrap_or(0))
    }

    /// Split this leaf, children inheriting its state. No-op if already split.
    fn ensure_children(&mut self) -> &mut [SubdivisionNode; 4] {
        let triangle = self.triangle;
        let state = self.state;
        self.children
            .get_or_insert_with(|| Box::new(triangle.split().map(|t| Self::new(t, state))))
            .as_mut()
    }

    /// Turn this node into a leaf with `state`, dropping any subtree.
    fn set_leaf_state(&mut self, state: CellState) {
        self.children = None;
        self.state = state;
    }

    // ---------------------------------------------------------------------
    // Flatten / rebuild
    // ---------------------------------------------------------------------

    /// Append this subtree's records in pre-order.
    pub fn flatten_into(&self, records: &mut Vec<NodeRecord>) {
        let marker = if self.is_leaf() {
            BranchMarker::Leaf
        } else {
            BranchMarker::Branch
        };
        records.push(NodeRecord::new(&self.triangle, self.state, marker));
        if let Some(children) = self.children() {
            for child in children.iter() {
                child.flatten_into(records);
            }
        }
    }

    /// Rebuild a whole tree from a pre-order record sequence.
    ///
    /// Every record must be consumed, and each record's corners must match
    /// the split of its parent. Anything else is [`FieldError::DataCorruption`].
    pub fn rebuild(records: &[NodeRecord]) -> Result<Self, FieldError> {
        let mut cursor = 0;
        let root = Self::rebuild_from(records, &mut cursor, ParamTriangle::root(), 0)?;
        if cursor != records.len() {
            return Err(FieldError::corrupt(
                cursor,
                format!("{} trailing records after tree", records.len() - cursor),
            ));
        }
        Ok(root)
    }

    fn rebuild_from(
        records: &[NodeRecord],
        cursor: &mut usize,
        expected: ParamTriangle,
        depth: u32,
    ) -> Result<Self, FieldError> {
        let index = *cursor;
        let record = records
            .get(index)
            .ok_or_else(|| FieldError::corrupt(index, "sequence ends before tree is complete"))?;
        *cursor += 1;

        let stored = record.triangle();
        if !stored.is_finite() || !stored.approx_eq(&expected, CORNER_EPSILON) {
            return Err(FieldError::corrupt(
                index,
                format!("corners {:?} do not match expected {:?}", stored.corners, expected.corners),
            ));
        }
        let state = record.cell_state(index)?;
        let mut node = SubdivisionNode::new(expected, state);

        if record.branch_marker(index)? == BranchMarker::Branch {
            if depth >= MAX_SUBDIVISION_DEPTH {
                return Err(FieldError::corrupt(
                    index,
                    format!("branch below maximum depth {}", MAX_SUBDIVISION_DEPTH),
                ));
            }
            let [c0, c1, c2, c3] = expected.split();
            let children = [
                Self::rebuild_from(records, cursor, c0, depth + 1)?,
                Self::rebuild_from(records, cursor, c1, depth + 1)?,
                Self::rebuild_from(records, cursor, c2, depth + 1)?,
                Self::rebuild_from(records, cursor, c3, depth + 1)?,
            ];
            node.children = Some(Box::new(children));
        }
        Ok(node)
    }

    // ---------------------------------------------------------------------
    // Traversals
    // ---------------------------------------------------------------------

    /// Seed leaf states from a texture.
    ///
    /// Descends to `max_depth`, creating children where needed, and sets
    /// each cell at that level from the texel under its UV centroid.
    /// Returns the number of cells sampled.
    pub fn sample_from_texture<T, P>(
        &mut self,
        uvs: &[Vec2; 3],
        texture: &T,
        policy: &P,
        depth: u32,
        max_depth: u32,
    ) -> usize
    where
        T: Texture + ?Sized,
        P: SamplePolicy + ?Sized,
    {
        if depth >= max_depth {
            let [a, b, c] = self.triangle.to_uv(uvs);
            let centroid = (a + b + c) / 3.0;
            let state = policy.classify(texture.sample(centroid));
            self.set_leaf_state(state);
            return 1;
        }

        self.ensure_children()
            .iter_mut()
            .map(|child| child.sample_from_texture(uvs, texture, policy, depth + 1, max_depth))
            .sum()
    }

    /// Paint (`state`) every cell at `max_depth` the tool touches.
    ///
    /// Subtrees whose world-space triangle misses the tool are skipped
    /// without creating nodes. Returns the number of cells painted.
    pub fn intersect<T>(
        &mut self,
        tool: &T,
        state: CellState,
        frame: &[Vec3; 3],
        depth: u32,
        max_depth: u32,
    ) -> usize
    where
        T: PaintingTool + ?Sized,
    {
        let [v0, v1, v2] = self.triangle.to_world(frame);
        if !tool.intersects_bounds(&Aabb::from_triangle(v0, v1, v2))
            || !tool.intersects_triangle(v0, v1, v2)
        {
            return 0;
        }

        if depth >= max_depth {
            self.set_leaf_state(state);
            return 1;
        }

        self.ensure_children()
            .iter_mut()
            .map(|child| child.intersect(tool, state, frame, depth + 1, max_depth))
            .sum()
    }

    /// Emit one render triangle per leaf, in traversal order.
    pub fn generate_mesh(&self, frame: &[Vec3; 3], uvs: &[Vec2; 3], out: &mut Vec<RenderTriangle>) {
        match self.children() {
            Some(children) => {
                for child in children.iter() {
                    child.generate_mesh(frame, uvs, out);
                }
            }
            None => out.push(RenderTriangle {
                positions: self.triangle.to_world(frame),
                uvs: self.triangle.to_uv(uvs),
                state: self.state,
            }),
        }
    }

    /// Draw the three edges of every leaf.
    pub fn draw_gizmos<S>(&self, frame: &[Vec3; 3], sink: &mut S)
    where
        S: GizmoSink + ?Sized,
    {
        match self.children() {
            Some(children) => {
                for child in children.iter() {
                    child.draw_gizmos(frame, sink);
                }
            }
            None => {
                let [a, b, c] = self.triangle.to_world(frame);
                sink.draw_line(a, b, self.state);
                sink.draw_line(b, c, self.state);
                sink.draw_line(c, a, self.state);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::SphereBrush;

    fn frame() -> [Vec3; 3] {
        [Vec3::ZERO, Vec3::X, Vec3::Y]
    }

    fn uv_frame() -> [Vec2; 3] {
        [Vec2::ZERO, Vec2::X, Vec2::Y]
    }

    fn full_tree(depth: u32) -> SubdivisionNode {
        let mut root = SubdivisionNode::root();
        let everything = SphereBrush::new(Vec3::ZERO, 100.0);
        root.intersect(&everything, CellState::Walkable, &frame(), 0, depth);
        root
    }

    #[test]
    fn test_root_is_single_leaf() {
        let root = SubdivisionNode::root();
        assert!(root.is_leaf());
        assert_eq!(root.node_count(), 1);
        assert_eq!(root.leaf_count(), 1);
        assert_eq!(root.height(), 0);
        assert_eq!(root.state(), CellState::Unset);
    }

    #[test]
    fn test_full_paint_builds_complete_tree() {
        let root = full_tree(3);
        assert_eq!(root.leaf_count(), 64);
        assert_eq!(root.node_count(), 1 + 4 + 16 + 64);
        assert_eq!(root.height(), 3);
    }

    #[test]
    fn test_children_partition_parent() {
        fn check(node: &SubdivisionNode) {
            if let Some(children) = node.children() {
                let expected = node.triangle().split();
                for (child, want) in children.iter().zip(expected.iter()) {
                    assert_eq!(child.triangle(), want);
                }
                let area: f32 = children.iter().map(|c| c.triangle().signed_area()).sum();
                assert!((area - node.triangle().signed_area()).abs() < 1e-7);
                children.iter().for_each(check);
            }
        }
        check(&full_tree(6));
    }

    #[test]
    fn test_flatten_then_rebuild() {
        let mut root = full_tree(2);
        let blocker = SphereBrush::new(Vec3::new(1.0, 0.0, 0.0), 0.3);
        root.intersect(&blocker, CellState::Blocked, &frame(), 0, 4);

        let mut records = Vec::new();
        root.flatten_into(&mut records);
        assert_eq!(records.len(), root.node_count());

        let rebuilt = SubdivisionNode::rebuild(&records).unwrap();
        assert_eq!(rebuilt, root);
    }

    #[test]
    fn test_rebuild_rejects_truncated_sequence() {
        let mut records = Vec::new();
        full_tree(1).flatten_into(&mut records);
        records.pop();
        let err = SubdivisionNode::rebuild(&records).unwrap_err();
        assert!(matches!(err, FieldError::DataCorruption { index: 4, .. }));
    }

    #[test]
    fn test_rebuild_rejects_trailing_records() {
        let mut records = Vec::new();
        SubdivisionNode::root().flatten_into(&mut records);
        records.push(NodeRecord::root_leaf());
        let err = SubdivisionNode::rebuild(&records).unwrap_err();
        assert!(matches!(err, FieldError::DataCorruption { index: 1, .. }));
    }

    #[test]
    fn test_rebuild_rejects_misplaced_child() {
        let mut records = Vec::new();
        full_tree(1).flatten_into(&mut records);
        // Swap two siblings: corners no longer match the split order
        records.swap(1, 2);
        let err = SubdivisionNode::rebuild(&records).unwrap_err();
        assert!(matches!(err, FieldError::DataCorruption { index: 1, .. }));
    }

    #[test]
    fn test_rebuild_rejects_non_finite_corners() {
        let mut records = Vec::new();
        SubdivisionNode::root().flatten_into(&mut records);
        records[0].corners[0] = f32::NAN;
        let err = SubdivisionNode::rebuild(&records).unwrap_err();
        assert!(matches!(err, FieldError::DataCorruption { index: 0, .. }));
    }

    #[test]
    fn test_rebuild_rejects_branch_at_depth_cap() {
        // One branch per level along corner0, the last one at the cap
        let mut records = Vec::new();
        let mut triangle = ParamTriangle::root();
        for _ in 0..=MAX_SUBDIVISION_DEPTH {
            records.push(NodeRecord::new(&triangle, CellState::Unset, BranchMarker::Branch));
            triangle = triangle.split()[0];
        }
        let err = SubdivisionNode::rebuild(&records).unwrap_err();
        let cap = MAX_SUBDIVISION_DEPTH as usize;
        assert!(matches!(err, FieldError::DataCorruption { index, .. } if index == cap));
    }

    #[test]
    fn test_rebuild_rejects_empty_sequence() {
        let err = SubdivisionNode::rebuild(&[]).unwrap_err();
        assert!(matches!(err, FieldError::DataCorruption { index: 0, .. }));
    }

    #[test]
    fn test_disjoint_tool_creates_nothing() {
        let mut root = SubdivisionNode::root();
        let far = SphereBrush::new(Vec3::new(10.0, 10.0, 10.0), 1.0);
        let painted = root.intersect(&far, CellState::Walkable, &frame(), 0, 5);
        assert_eq!(painted, 0);
        assert_eq!(root, SubdivisionNode::root());
    }

    #[test]
    fn test_partial_paint_only_touches_cells_near_brush() {
        let mut root = SubdivisionNode::root();
        let brush = SphereBrush::new(Vec3::ZERO, 0.1);
        let painted = root.intersect(&brush, CellState::Walkable, &frame(), 0, 3);
        assert!(painted > 0);

        let mut out = Vec::new();
        root.generate_mesh(&frame(), &uv_frame(), &mut out);
        let walkable = out.iter().filter(|t| t.state == CellState::Walkable).count();
        assert_eq!(walkable, painted);
        assert!(walkable < out.len());
    }

    #[test]
    fn test_split_children_inherit_state() {
        let mut root = full_tree(1);
        let brush = SphereBrush::new(Vec3::ZERO, 0.05);
        root.intersect(&brush, CellState::Blocked, &frame(), 0, 3);

        let mut out = Vec::new();
        root.generate_mesh(&frame(), &uv_frame(), &mut out);
        assert!(out.iter().all(|t| t.state != CellState::Unset));
        assert!(out.iter().any(|t| t.state == CellState::Blocked));
    }

    #[test]
    fn test_paint_at_lowered_depth_collapses_subtree() {
        let mut root = full_tree(3);
        let everything = SphereBrush::new(Vec3::ZERO, 100.0);
        root.intersect(&everything, CellState::Blocked, &frame(), 0, 1);
        assert_eq!(root.leaf_count(), 4);
        assert_eq!(root.height(), 1);
    }

    #[test]
    fn test_generate_mesh_areas_sum_to_root() {
        let world = [Vec3::new(0.0, 0.0, 0.0), Vec3::new(3.0, 0.0, 1.0), Vec3::new(0.5, 2.0, -1.0)];
        let mut root = SubdivisionNode::root();
        let brush = SphereBrush::new(world[1], 1.0);
        root.intersect(&brush, CellState::Walkable, &world, 0, 4);

        let mut out = Vec::new();
        root.generate_mesh(&world, &uv_frame(), &mut out);
        assert_eq!(out.len(), root.leaf_count());
        let total: f32 = out.iter().map(RenderTriangle::area).sum();
        let expected = crate::geometry::triangle_area(world[0], world[1], world[2]);
        assert!((total - expected).abs() < 1e-4);
    }

    #[test]
    fn test_draw_gizmos_three_lines_per_leaf() {
        let root = full_tree(2);
        let mut lines = Vec::new();
        root.draw_gizmos(&frame(), &mut lines);
        assert_eq!(lines.len(), 3 * root.leaf_count());
    }
}
