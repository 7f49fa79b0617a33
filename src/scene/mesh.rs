//! Indexed triangle meshes.

use crate::error::SceneError;
use crate::math::{Color, Vec2, Vec3};

/// A single mesh vertex. Plain data, copied into pipeline stages.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub tex_coord: Vec2,
    pub normal: Vec3,
    pub color: Color,
}

impl Vertex {
    pub fn new(position: Vec3, tex_coord: Vec2, normal: Vec3, color: Color) -> Self {
        Self {
            position,
            tex_coord,
            normal,
            color,
        }
    }
}

/// An indexed triangle list. Every index is checked against the vertex count
/// on construction, so downstream stages index without bounds failures.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Result<Self, SceneError> {
        if indices.len() % 3 != 0 {
            return Err(SceneError::IncompleteTriangle(indices.len()));
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(SceneError::IndexOutOfRange {
                index,
                vertex_count: vertices.len(),
            });
        }
        Ok(Self { vertices, indices })
    }

    /// A two-triangle quad. Indices past the fourth corner are clamped to it.
    pub fn quad(vertices: [Vertex; 4], indices: [u32; 6]) -> Self {
        Self {
            vertices: vertices.to_vec(),
            indices: indices.map(|i| i.min(3)).to_vec(),
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// True when the mesh has nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterates over triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }
}
