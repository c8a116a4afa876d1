//! Painting tool capability and editor registration.
//!
//! The subdivision core never positions or shapes brushes. It only asks a
//! [`PaintingTool`] whether a world-space region touches the brush volume.

use std::any::{TypeId, type_name};
use std::collections::HashMap;

use glam::Vec3;
use thiserror::Error;

use crate::geometry::{Aabb, closest_point_on_triangle};

/// Query interface a brush exposes to the subdivision traversals.
pub trait PaintingTool {
    /// Coarse overlap test against a bounding box.
    ///
    /// A `false` answer prunes the whole region, so it must never reject a
    /// box the brush actually touches. The default accepts everything.
    fn intersects_bounds(&self, bounds: &Aabb) -> bool {
        let _ = bounds;
        true
    }

    /// Whether the world-space triangle touches the brush volume.
    fn intersects_triangle(&self, v0: Vec3, v1: Vec3, v2: Vec3) -> bool;
}

impl<T: PaintingTool + ?Sized> PaintingTool for &T {
    fn intersects_bounds(&self, bounds: &Aabb) -> bool {
        (**self).intersects_bounds(bounds)
    }

    fn intersects_triangle(&self, v0: Vec3, v1: Vec3, v2: Vec3) -> bool {
        (**self).intersects_triangle(v0, v1, v2)
    }
}

/// Spherical brush volume
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereBrush {
    pub center: Vec3,
    pub radius: f32,
}

impl SphereBrush {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }
}

impl PaintingTool for SphereBrush {
    fn intersects_bounds(&self, bounds: &Aabb) -> bool {
        bounds.intersects_sphere(self.center, self.radius)
    }

    fn intersects_triangle(&self, v0: Vec3, v1: Vec3, v2: Vec3) -> bool {
        let closest = closest_point_on_triangle(self.center, v0, v1, v2);
        closest.distance_squared(self.center) <= self.radius * self.radius
    }
}

/// Box brush volume
///
/// The triangle test is conservative: it compares the triangle's bounding
/// box, so thin diagonal triangles may be reported as touching.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AabbBrush {
    pub bounds: Aabb,
}

impl AabbBrush {
    pub fn new(bounds: Aabb) -> Self {
        Self { bounds }
    }
}

impl PaintingTool for AabbBrush {
    fn intersects_bounds(&self, bounds: &Aabb) -> bool {
        self.bounds.intersects(bounds)
    }

    fn intersects_triangle(&self, v0: Vec3, v1: Vec3, v2: Vec3) -> bool {
        self.bounds.intersects(&Aabb::from_triangle(v0, v1, v2))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Tool type {tool} already has editor {editor}")]
    AlreadyRegistered {
        tool: &'static str,
        editor: &'static str,
    },
}

/// Association between painting tool types and the editor UI that edits them.
///
/// Each tool type may have at most one editor.
#[derive(Debug, Default)]
pub struct ToolEditorRegistry {
    editors: HashMap<TypeId, &'static str>,
}

impl ToolEditorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `editor` as the editor type for tool type `T`.
    pub fn register<T: PaintingTool + 'static>(
        &mut self,
        editor: &'static str,
    ) -> Result<(), RegistryError> {
        if let Some(existing) = self.editors.get(&TypeId::of::<T>()) {
            return Err(RegistryError::AlreadyRegistered {
                tool: type_name::<T>(),
                editor: *existing,
            });
        }
        self.editors.insert(TypeId::of::<T>(), editor);
        Ok(())
    }

    pub fn editor_for<T: PaintingTool + 'static>(&self) -> Option<&'static str> {
        self.editors.get(&TypeId::of::<T>()).copied()
    }

    pub fn len(&self) -> usize {
        self.editors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.editors.is_empty()
    }
}
