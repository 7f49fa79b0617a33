//! Clipping against the homogeneous clip cube.
//!
//! Runs after the vertex stage, before the perspective divide:
//!
//! ```text
//! -w <= x <= w
//! -w <= y <= w
//! -w <= z <= w
//! ```
//!
//! Triangles that straddle the near plane would otherwise divide by a
//! non-positive `w`; clipping them first keeps every surviving vertex in
//! front of the camera.

use crate::render::shader::ShadedVertex;

/// Convex polygon produced while clipping a single triangle.
type Polygon = Vec<ShadedVertex>;

/// One face of the canonical clip cube.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClipPlane {
    Left,
    Right,
    Bottom,
    Top,
    Near,
    Far,
}

impl ClipPlane {
    pub const ALL: [ClipPlane; 6] = [
        ClipPlane::Left,
        ClipPlane::Right,
        ClipPlane::Bottom,
        ClipPlane::Top,
        ClipPlane::Near,
        ClipPlane::Far,
    ];

    /// Positive inside the clip volume, negative outside.
    pub fn signed_distance(&self, v: &ShadedVertex) -> f32 {
        let p = v.position;
        match self {
            Self::Left => p.w + p.x,
            Self::Right => p.w - p.x,
            Self::Bottom => p.w + p.y,
            Self::Top => p.w - p.y,
            Self::Near => p.w + p.z,
            Self::Far => p.w - p.z,
        }
    }
}

/// Sutherland-Hodgman against a single plane.
fn clip_against_plane(input: &[ShadedVertex], plane: ClipPlane, output: &mut Polygon) {
    output.clear();
    if input.len() < 3 {
        return;
    }

    for (i, current) in input.iter().enumerate() {
        let next = &input[(i + 1) % input.len()];
        let d1 = plane.signed_distance(current);
        let d2 = plane.signed_distance(next);

        if d1 >= 0.0 {
            output.push(*current);
            if d2 < 0.0 {
                output.push(current.lerp(next, d1 / (d1 - d2)));
            }
        } else if d2 >= 0.0 {
            output.push(current.lerp(next, d1 / (d1 - d2)));
        }
    }
}

/// Returns true when all three vertices are inside every plane.
fn fully_inside(triangle: &[ShadedVertex; 3]) -> bool {
    ClipPlane::ALL
        .iter()
        .all(|plane| triangle.iter().all(|v| plane.signed_distance(v) >= 0.0))
}

/// Clips triangles against the six planes of the clip cube and fans the
/// result back into triangles.
///
/// Stateless apart from two scratch buffers reused between calls.
#[derive(Debug, Default)]
pub struct ClipSpaceClipper {
    front: Polygon,
    back: Polygon,
}

impl ClipSpaceClipper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clips one triangle, calling `emit` for every resulting triangle.
    ///
    /// Triangles entirely inside pass through untouched; triangles entirely
    /// outside emit nothing. Winding order is preserved.
    pub fn clip_triangle<F>(&mut self, triangle: [ShadedVertex; 3], mut emit: F)
    where
        F: FnMut([ShadedVertex; 3]),
    {
        if fully_inside(&triangle) {
            emit(triangle);
            return;
        }

        self.front.clear();
        self.front.extend_from_slice(&triangle);
        for plane in ClipPlane::ALL {
            clip_against_plane(&self.front, plane, &mut self.back);
            std::mem::swap(&mut self.front, &mut self.back);
            if self.front.len() < 3 {
                return;
            }
        }

        let first = self.front[0];
        for i in 1..self.front.len() - 1 {
            emit([first, self.front[i], self.front[i + 1]]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Color, Vec2, Vec4};

    fn vertex(x: f32, y: f32, z: f32, w: f32) -> ShadedVertex {
        ShadedVertex {
            position: Vec4::new(x, y, z, w),
            color: Color::WHITE,
            tex_coord: Vec2::ZERO,
        }
    }

    fn clip(triangle: [ShadedVertex; 3]) -> Vec<[ShadedVertex; 3]> {
        let mut out = Vec::new();
        ClipSpaceClipper::new().clip_triangle(triangle, |t| out.push(t));
        out
    }

    #[test]
    fn inside_triangle_passes_through() {
        let tri = [
            vertex(-0.5, -0.5, 0.0, 1.0),
            vertex(0.5, -0.5, 0.0, 1.0),
            vertex(0.0, 0.5, 0.0, 1.0),
        ];
        assert_eq!(clip(tri), vec![tri]);
    }

    #[test]
    fn outside_triangle_is_discarded() {
        let tri = [
            vertex(2.0, 2.0, 0.0, 1.0),
            vertex(3.0, 2.0, 0.0, 1.0),
            vertex(2.5, 3.0, 0.0, 1.0),
        ];
        assert!(clip(tri).is_empty());
    }

    #[test]
    fn one_vertex_outside_yields_quad() {
        let tri = [
            vertex(0.0, 0.0, 0.0, 1.0),
            vertex(2.0, 0.0, 0.0, 1.0),
            vertex(0.0, 0.5, 0.0, 1.0),
        ];
        let out = clip(tri);
        assert_eq!(out.len(), 2);
        for triangle in &out {
            for v in triangle {
                assert!(v.position.x <= v.position.w + 1e-6);
            }
        }
    }

    #[test]
    fn behind_near_plane_is_clipped_away() {
        let tri = [
            vertex(0.0, 0.0, -2.0, 1.0),
            vertex(0.5, 0.0, -2.0, 1.0),
            vertex(0.0, 0.5, -2.0, 1.0),
        ];
        assert!(clip(tri).is_empty());
    }

    #[test]
    fn intersection_interpolates_attributes() {
        let mut a = vertex(0.0, 0.0, 0.0, 1.0);
        let mut b = vertex(3.0, 0.0, 0.0, 1.0);
        let c = vertex(0.0, 0.5, 0.0, 1.0);
        a.tex_coord = Vec2::new(0.0, 0.0);
        b.tex_coord = Vec2::new(1.0, 0.0);
        let out = clip([a, b, c]);
        // Edge a-b crosses x = w at t = 1/3.
        let crossing = out
            .iter()
            .flat_map(|t| t.iter())
            .find(|v| (v.position.x - 1.0).abs() < 1e-6 && v.position.y.abs() < 1e-6)
            .expect("intersection vertex");
        assert!((crossing.tex_coord.x - 1.0 / 3.0).abs() < 1e-6);
    }
}
