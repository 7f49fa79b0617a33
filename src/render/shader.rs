//! Two-stage shader abstraction.
//!
//! The rasterizer is shader-agnostic: it only moves data between the stages.
//!
//! | Stage    | Input                          | Output                              |
//! |----------|--------------------------------|-------------------------------------|
//! | vertex   | [`Vertex`] + [`Uniforms`]      | clip-space position, colour, UV     |
//! | fragment | interpolated [`Fragment`]      | final colour, or `None` to discard  |
//!
//! A discarded fragment writes neither colour nor depth.

use std::fmt;

use crate::light::{self, Light};
use crate::material::Material;
use crate::math::{Color, Mat4, Vec2, Vec4};
use crate::scene::Vertex;

/// Per-draw constants shared by both stages.
pub struct Uniforms<'a> {
    /// Object to world.
    pub model: Mat4,
    /// Inverse transpose of `model`, for normals.
    pub normal_matrix: Mat4,
    /// Object to clip space.
    pub model_view_projection: Mat4,
    pub material: &'a Material,
    pub lights: &'a [Light],
}

/// Output of the vertex stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadedVertex {
    /// Homogeneous clip-space position, before the perspective divide.
    pub position: Vec4,
    pub color: Color,
    pub tex_coord: Vec2,
}

impl ShadedVertex {
    /// Interpolates every attribute; used when an edge crosses a clip plane.
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            position: self.position.lerp(other.position, t),
            color: self.color.lerp(other.color, t),
            tex_coord: self.tex_coord.lerp(other.tex_coord, t),
        }
    }
}

/// A perspective-correct interpolated sample handed to the fragment stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fragment {
    pub x: u32,
    pub y: u32,
    /// Normalized device depth in `[-1, 1]`; smaller is closer.
    pub depth: f32,
    pub color: Color,
    pub tex_coord: Vec2,
}

pub trait Shader: Send + Sync + fmt::Debug {
    fn vertex(&self, vertex: &Vertex, uniforms: &Uniforms) -> ShadedVertex;

    /// Returns the final colour, or `None` to discard the fragment.
    fn fragment(&self, fragment: &Fragment, uniforms: &Uniforms) -> Option<Color>;
}

/// Vertex colour modulated by the material diffuse colour (the tint), or the
/// diffuse colour alone when the material ignores vertex colours.
fn tinted_color(vertex: &Vertex, material: &Material) -> Color {
    if material.use_vertex_color() {
        vertex.color * material.diffuse()
    } else {
        material.diffuse()
    }
}

/// Multiplies in the texture sample and applies the alpha test.
fn textured_fragment(fragment: &Fragment, material: &Material) -> Option<Color> {
    let color = match material.sample(fragment.tex_coord) {
        Some(texel) => fragment.color * texel,
        None => fragment.color,
    };
    material.passes_alpha_test(color.a).then_some(color)
}

/// Baseline shader: no lighting beyond the colours baked into the vertices.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnshadedShader;

impl Shader for UnshadedShader {
    fn vertex(&self, vertex: &Vertex, uniforms: &Uniforms) -> ShadedVertex {
        ShadedVertex {
            position: uniforms.model_view_projection * Vec4::point(vertex.position),
            color: tinted_color(vertex, uniforms.material),
            tex_coord: vertex.tex_coord,
        }
    }

    fn fragment(&self, fragment: &Fragment, uniforms: &Uniforms) -> Option<Color> {
        textured_fragment(fragment, uniforms.material)
    }
}

/// Per-vertex Lambert lighting from the frame's lights.
///
/// With no lights supplied it behaves exactly like [`UnshadedShader`].
#[derive(Clone, Copy, Debug, Default)]
pub struct LitShader;

impl Shader for LitShader {
    fn vertex(&self, vertex: &Vertex, uniforms: &Uniforms) -> ShadedVertex {
        let mut color = tinted_color(vertex, uniforms.material);
        if !uniforms.lights.is_empty() {
            let normal = uniforms.normal_matrix.transform_direction(vertex.normal);
            let lit = light::accumulate(uniforms.lights, normal);
            color = Color::new(color.r * lit.r, color.g * lit.g, color.b * lit.b, color.a);
        }
        ShadedVertex {
            position: uniforms.model_view_projection * Vec4::point(vertex.position),
            color,
            tex_coord: vertex.tex_coord,
        }
    }

    fn fragment(&self, fragment: &Fragment, uniforms: &Uniforms) -> Option<Color> {
        textured_fragment(fragment, uniforms.material)
    }
}
