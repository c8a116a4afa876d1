//! Paintable per-triangle subdivision for navigation meshes
//!
//! Each mesh triangle owns a tree of edge-midpoint subdivisions in which a
//! user paints cells as walkable or blocked. This crate provides:
//! - [`field::TriangleField`] - One triangle's geometry, depth and tree
//! - [`node::SubdivisionNode`] - The recursive subdivision tree and its traversals
//! - [`budget`] - Per-triangle depth selection from a mesh-wide area budget
//! - [`persist`] - Flat pre-order records for storing the tree
//! - [`tool`] - Painting tool capability and editor registration
//! - [`texture`] - Texture sampling used to seed cell states
//! - [`geometry`] - Bounding boxes and barycentric mapping

pub mod budget;
pub mod constants;
pub mod field;
pub mod geometry;
pub mod node;
pub mod persist;
pub mod texture;
pub mod tool;
pub mod types;
pub mod validation;

pub use budget::*;
pub use constants::*;
pub use field::*;
pub use geometry::*;
pub use node::*;
pub use persist::*;
pub use texture::*;
pub use tool::*;
pub use types::*;
pub use validation::*;

pub use navmesh_config as config;
