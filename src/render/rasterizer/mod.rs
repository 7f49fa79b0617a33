//! Triangle rasterization.
//!
//! Triangles arrive here already clipped, as [`ShadedVertex`] triples in clip
//! space. [`ScreenVertex::from_clip`] performs the perspective divide and the
//! viewport transform; [`EdgeFunctionRasterizer`] then walks the covered
//! pixels.
//!
//! # Screen Space
//!
//! ```text
//! sx = (x_ndc + 1) / 2 * width
//! sy = (1 - y_ndc) / 2 * height     (y grows downward)
//! ```

mod edgefunction;

pub use edgefunction::EdgeFunctionRasterizer;

use crate::math::{Color, Vec2, Vec3};
use crate::render::shader::ShadedVertex;

/// A vertex after the perspective divide, in pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenVertex {
    /// Pixel x, pixel y and normalized device z.
    pub position: Vec3,
    /// Reciprocal of clip-space w, for perspective-correct interpolation.
    pub inv_w: f32,
    pub color: Color,
    pub tex_coord: Vec2,
}

impl ScreenVertex {
    pub fn from_clip(vertex: &ShadedVertex, width: u32, height: u32) -> Self {
        let inv_w = 1.0 / vertex.position.w;
        let ndc = vertex.position.xyz() * inv_w;
        Self {
            position: Vec3::new(
                (ndc.x + 1.0) * 0.5 * width as f32,
                (1.0 - ndc.y) * 0.5 * height as f32,
                ndc.z,
            ),
            inv_w,
            color: vertex.color,
            tex_coord: vertex.tex_coord,
        }
    }
}
