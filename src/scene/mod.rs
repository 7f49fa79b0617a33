//! Scene graph: vertices, meshes, geometries and the node tree.

mod geometry;
mod graph;
mod mesh;

pub use geometry::Geometry;
pub use graph::{Node, NodeId, Scene};
pub use mesh::{Mesh, Vertex};
