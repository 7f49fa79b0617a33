//! Edge function triangle rasterization.
//!
//! For an edge from A to B, the edge function at P is the 2D cross product
//! (B - A) x (P - A):
//!
//! ```text
//! E(P) = (P.x - A.x) * (B.y - A.y) - (P.y - A.y) * (B.x - A.x)
//! ```
//!
//! A pixel centre is covered when all three edge functions share the sign of
//! the triangle's signed area. Zero counts as covered, so pixels exactly on
//! the diagonal of a quad are drawn by both triangles; the strict depth test
//! keeps the first write.
//!
//! # Winding
//!
//! Screen y points down, so a triangle that is counter-clockwise in NDC has a
//! positive signed area here. That is the front face.
//!
//! # Interpolation
//!
//! The normalized edge values are screen-space barycentrics. NDC depth is
//! affine in screen space and is interpolated directly. Colour and texture
//! coordinates are interpolated as `attr / w` and divided by the interpolated
//! `1 / w`, which is what keeps textures straight under perspective.
//!
//! # References
//!
//! - Juan Pineda, "A Parallel Algorithm for Polygon Rasterization" (1988)

use super::ScreenVertex;
use crate::material::{BlendMode, CullMode};
use crate::math::{Color, Vec2};
use crate::render::framebuffer::FrameBuffer;
use crate::render::shader::Fragment;

/// Bounding-box rasterizer driven by edge functions.
#[derive(Clone, Copy, Debug, Default)]
pub struct EdgeFunctionRasterizer;

/// What happened to one triangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Coverage {
    /// The triangle was rejected as a back face or as degenerate.
    pub skipped: bool,
    /// Fragments that passed the depth test and were not discarded.
    pub written: usize,
}

impl EdgeFunctionRasterizer {
    pub fn new() -> Self {
        Self
    }

    #[inline]
    fn edge_function(a: Vec2, b: Vec2, p: Vec2) -> f32 {
        (p.x - a.x) * (b.y - a.y) - (p.y - a.y) * (b.x - a.x)
    }

    /// Signed screen-space area (doubled). Positive for front faces.
    pub fn signed_area(triangle: &[ScreenVertex; 3]) -> f32 {
        let [a, b, c] = triangle.map(|v| Vec2::new(v.position.x, v.position.y));
        Self::edge_function(a, b, c)
    }

    /// Fills one triangle.
    ///
    /// `shade` is the fragment stage: it receives each depth-visible
    /// fragment and returns the colour to write, or `None` to discard.
    pub fn fill_triangle<F>(
        &self,
        triangle: &[ScreenVertex; 3],
        buffer: &mut FrameBuffer,
        cull: CullMode,
        blend: BlendMode,
        mut shade: F,
    ) -> Coverage
    where
        F: FnMut(&Fragment) -> Option<Color>,
    {
        let area = Self::signed_area(triangle);
        if area.abs() < f32::EPSILON || (cull == CullMode::Back && area < 0.0) {
            return Coverage {
                skipped: true,
                written: 0,
            };
        }
        let inv_area = 1.0 / area;

        let [v0, v1, v2] = triangle;
        let (p0, p1, p2) = (
            Vec2::new(v0.position.x, v0.position.y),
            Vec2::new(v1.position.x, v1.position.y),
            Vec2::new(v2.position.x, v2.position.y),
        );

        let min_x = p0.x.min(p1.x).min(p2.x).floor().max(0.0) as u32;
        let min_y = p0.y.min(p1.y).min(p2.y).floor().max(0.0) as u32;
        let max_x = p0.x.max(p1.x).max(p2.x).ceil().min(buffer.width() as f32) as u32;
        let max_y = p0.y.max(p1.y).max(p2.y).ceil().min(buffer.height() as f32) as u32;

        // Perspective-correct attribute numerators, premultiplied by 1/w.
        let colors = [v0.color * v0.inv_w, v1.color * v1.inv_w, v2.color * v2.inv_w];
        let uvs = [v0.tex_coord * v0.inv_w, v1.tex_coord * v1.inv_w, v2.tex_coord * v2.inv_w];

        let mut written = 0;
        for y in min_y..max_y {
            for x in min_x..max_x {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);

                let w0 = Self::edge_function(p1, p2, p) * inv_area;
                let w1 = Self::edge_function(p2, p0, p) * inv_area;
                let w2 = Self::edge_function(p0, p1, p) * inv_area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * v0.position.z + w1 * v1.position.z + w2 * v2.position.z;
                if !buffer.depth_test(x, y, depth) {
                    continue;
                }

                let inv_w = w0 * v0.inv_w + w1 * v1.inv_w + w2 * v2.inv_w;
                let w = 1.0 / inv_w;
                let fragment = Fragment {
                    x,
                    y,
                    depth,
                    color: (colors[0] * w0 + colors[1] * w1 + colors[2] * w2) * w,
                    tex_coord: (uvs[0] * w0 + uvs[1] * w1 + uvs[2] * w2) * w,
                };

                if let Some(color) = shade(&fragment) {
                    buffer.write(x, y, depth, color, blend);
                    written += 1;
                }
            }
        }

        Coverage {
            skipped: false,
            written,
        }
    }
}
