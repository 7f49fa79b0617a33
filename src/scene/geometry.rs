use std::sync::Arc;

use super::mesh::Mesh;
use crate::material::Material;
use crate::math::Mat4;

/// One mesh drawn with one material.
///
/// `transform` places the mesh relative to the node it is attached to. It is
/// fixed at construction; animate the node instead.
#[derive(Clone, Debug)]
pub struct Geometry {
    mesh: Mesh,
    material: Option<Arc<Material>>,
    transform: Mat4,
}

impl Geometry {
    pub fn new(mesh: Mesh, material: Option<Arc<Material>>) -> Self {
        Self::with_transform(mesh, material, Mat4::IDENTITY)
    }

    pub fn with_transform(mesh: Mesh, material: Option<Arc<Material>>, transform: Mat4) -> Self {
        Self {
            mesh,
            material,
            transform,
        }
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// `None` renders with vertex colours only.
    pub fn material(&self) -> Option<&Arc<Material>> {
        self.material.as_ref()
    }

    pub fn transform(&self) -> Mat4 {
        self.transform
    }
}
