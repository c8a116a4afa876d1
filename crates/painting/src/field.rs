//! Paintable subdivision field of one mesh triangle.
//!
//! A [`TriangleField`] is either *live*, holding a [`SubdivisionNode`] tree
//! that traversals read and modify, or *at rest*, holding the tree's flat
//! pre-order records for a host serializer. [`TriangleField::init`] moves
//! from rest to live, [`TriangleField::save`] writes the records back.
//!
//! Only the at-rest form is serialized; call `save` before serializing a
//! live field or the painted data is lost.

use glam::{Vec2, Vec3};
use navmesh_config::PainterConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::budget::{clamp_depth, select_depth};
use crate::geometry::{Aabb, triangle_area};
use crate::node::SubdivisionNode;
use crate::persist::NodeRecord;
use crate::texture::{SamplePolicy, Texture};
use crate::tool::PaintingTool;
use crate::types::{CellState, GizmoSink, RenderTriangle};
use crate::validation::{FieldError, validate_uvs, validate_vertices};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TriangleFieldRaw")]
pub struct TriangleField {
    /// World-space corners; None for texture-space-only fields
    vertices: Option<[Vec3; 3]>,
    uvs: [Vec2; 3],
    /// Bounds of `vertices`, every extent at least `MIN_BOUNDS_EXTENT`
    bounds: Option<Aabb>,
    max_depth: u32,
    /// At-rest pre-order records, empty while live
    records: Vec<NodeRecord>,
    #[serde(skip)]
    root: Option<SubdivisionNode>,
}

/// Unchecked serialized form of a [`TriangleField`].
///
/// Stored bounds are ignored and recomputed from the vertices.
#[derive(Deserialize)]
struct TriangleFieldRaw {
    vertices: Option<[Vec3; 3]>,
    uvs: [Vec2; 3],
    max_depth: u32,
    records: Vec<NodeRecord>,
}

impl TryFrom<TriangleFieldRaw> for TriangleField {
    type Error = FieldError;

    fn try_from(raw: TriangleFieldRaw) -> Result<Self, Self::Error> {
        let [uv0, uv1, uv2] = raw.uvs;
        let mut field = match raw.vertices {
            Some([v0, v1, v2]) => Self::new(v0, v1, v2, uv0, uv1, uv2)?,
            None => Self::new_uv_only(uv0, uv1, uv2)?,
        };
        field.max_depth = clamp_depth(raw.max_depth);
        field.records = raw.records;
        Ok(field)
    }
}

impl TriangleField {
    /// Create an at-rest field for a mesh triangle.
    ///
    /// Degenerate triangles are accepted; only non-finite input fails.
    pub fn new(
        vertex0: Vec3,
        vertex1: Vec3,
        vertex2: Vec3,
        uv0: Vec2,
        uv1: Vec2,
        uv2: Vec2,
    ) -> Result<Self, FieldError> {
        let vertices = [vertex0, vertex1, vertex2];
        validate_vertices(&vertices)?;
        let mut field = Self::new_uv_only(uv0, uv1, uv2)?;
        field.bounds = Some(Aabb::for_mesh_triangle(vertex0, vertex1, vertex2));
        field.vertices = Some(vertices);
        Ok(field)
    }

    /// Create an at-rest field that only knows its texture-space corners.
    pub fn new_uv_only(uv0: Vec2, uv1: Vec2, uv2: Vec2) -> Result<Self, FieldError> {
        let uvs = [uv0, uv1, uv2];
        validate_uvs(&uvs)?;
        Ok(Self {
            vertices: None,
            uvs,
            bounds: None,
            max_depth: 0,
            records: vec![NodeRecord::root_leaf()],
            root: None,
        })
    }

    pub fn vertices(&self) -> Option<&[Vec3; 3]> {
        self.vertices.as_ref()
    }

    pub fn uvs(&self) -> &[Vec2; 3] {
        &self.uvs
    }

    pub fn bounds(&self) -> Option<&Aabb> {
        self.bounds.as_ref()
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn is_live(&self) -> bool {
        self.root.is_some()
    }

    pub fn root(&self) -> Option<&SubdivisionNode> {
        self.root.as_ref()
    }

    /// The at-rest records. Stale or empty while the field is live.
    pub fn records(&self) -> &[NodeRecord] {
        &self.records
    }

    /// Number of at-rest records.
    ///
    /// Used as a complexity check before painting; call [`save`](Self::save)
    /// first to count a live tree.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Live tree node count, None while at rest
    pub fn node_count(&self) -> Option<usize> {
        self.root.as_ref().map(SubdivisionNode::node_count)
    }

    /// Live tree leaf count, None while at rest
    pub fn leaf_count(&self) -> Option<usize> {
        self.root.as_ref().map(SubdivisionNode::leaf_count)
    }

    /// Replace the field's contents with externally loaded records.
    ///
    /// Drops any live tree; the records are validated by the next `init`.
    pub fn load_records(&mut self, records: Vec<NodeRecord>) {
        self.root = None;
        self.records = records;
    }

    /// Rebuild the live tree from the at-rest records.
    ///
    /// Empty records give a single unpainted leaf. On corrupt records the
    /// field is left unchanged.
    pub fn init(&mut self) -> Result<(), FieldError> {
        let root = if self.records.is_empty() {
            SubdivisionNode::root()
        } else {
            SubdivisionNode::rebuild(&self.records)?
        };
        debug!(
            "TriangleField::init: {} records -> {} leaves",
            self.records.len(),
            root.leaf_count()
        );
        self.root = Some(root);
        self.records = Vec::new();
        Ok(())
    }

    /// Reset the painted data to a single unpainted leaf.
    pub fn clear(&mut self) {
        self.root = Some(SubdivisionNode::root());
        self.records = Vec::new();
    }

    /// Flatten the live tree into the at-rest records.
    ///
    /// The live tree is kept. Does nothing if the field is not live.
    pub fn save(&mut self) {
        let Some(root) = &self.root else {
            return;
        };
        let mut records = Vec::with_capacity(root.node_count());
        root.flatten_into(&mut records);
        debug!("TriangleField::save: {} records", records.len());
        self.records = records;
    }

    /// World-space area; zero for degenerate and texture-space-only fields.
    pub fn area(&self) -> f32 {
        self.vertices
            .map_or(0.0, |[v0, v1, v2]| triangle_area(v0, v1, v2))
    }

    /// Choose the subdivision depth.
    ///
    /// With `force_set` the requested depth is used as is. Otherwise it is
    /// reduced by the leaf area heuristic (see [`select_depth`]) against the
    /// mesh-wide `max_area` budget. Returns the depth now in effect.
    pub fn set_max_depth(&mut self, requested_depth: u32, max_area: f32, force_set: bool) -> u32 {
        self.max_depth = if force_set {
            clamp_depth(requested_depth)
        } else {
            select_depth(self.area(), requested_depth, max_area)
        };
        self.max_depth
    }

    /// Select the depth from a painter config.
    pub fn apply_config(&mut self, config: &PainterConfig) -> u32 {
        self.set_max_depth(config.max_depth, config.max_area, false)
    }

    fn live_root(&self) -> Result<&SubdivisionNode, FieldError> {
        self.root
            .as_ref()
            .ok_or(FieldError::InvalidState("field is not initialized"))
    }

    fn world_frame(&self) -> Result<&[Vec3; 3], FieldError> {
        self.vertices.as_ref().ok_or(FieldError::MissingWorldGeometry)
    }

    /// Paint (`erase == false`) or block (`erase == true`) every leaf cell
    /// the tool touches. Returns the number of cells written.
    pub fn intersect<T>(&mut self, tool: &T, erase: bool) -> Result<usize, FieldError>
    where
        T: PaintingTool + ?Sized,
    {
        self.live_root()?;
        let frame = *self.world_frame()?;
        if let Some(bounds) = &self.bounds {
            if !tool.intersects_bounds(bounds) {
                return Ok(0);
            }
        }

        let max_depth = self.max_depth;
        let state = CellState::from_erase(erase);
        let painted = self
            .root
            .as_mut()
            .map_or(0, |root| root.intersect(tool, state, &frame, 0, max_depth));
        trace!("TriangleField::intersect: {} cells set to {:?}", painted, state);
        Ok(painted)
    }

    /// Seed every cell at `max_depth` from `texture` through `policy`.
    /// Returns the number of cells sampled.
    pub fn sample_from_texture<T, P>(&mut self, texture: &T, policy: &P) -> Result<usize, FieldError>
    where
        T: Texture + ?Sized,
        P: SamplePolicy + ?Sized,
    {
        let uvs = self.uvs;
        let max_depth = self.max_depth;
        let root = self
            .root
            .as_mut()
            .ok_or(FieldError::InvalidState("field is not initialized"))?;
        let sampled = root.sample_from_texture(&uvs, texture, policy, 0, max_depth);
        debug!("TriangleField::sample_from_texture: {} cells at depth {}", sampled, max_depth);
        Ok(sampled)
    }

    /// Append one render triangle per leaf to `out`.
    pub fn generate_mesh(&self, out: &mut Vec<RenderTriangle>) -> Result<(), FieldError> {
        let root = self.live_root()?;
        let frame = self.world_frame()?;
        root.generate_mesh(frame, &self.uvs, out);
        Ok(())
    }

    /// Draw every leaf's edges for debugging.
    pub fn draw_gizmos<S>(&self, sink: &mut S) -> Result<(), FieldError>
    where
        S: GizmoSink + ?Sized,
    {
        let root = self.live_root()?;
        let frame = self.world_frame()?;
        root.draw_gizmos(frame, sink);
        Ok(())
    }
}
