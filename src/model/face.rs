//! Geometry of a single element face.
//!
//! Every face is a quad whose corners are listed top-left, bottom-left,
//! bottom-right, top-right as seen from outside the element. With that order
//! the indices `[0, 1, 2, 0, 2, 3]` are counter-clockwise around the outward
//! normal.
//!
//! UVs are given in texture pixels (0..16, `v` pointing down) and converted
//! to `(u / 16, 1 - v / 16)` with the origin at the bottom-left.

use crate::math::{Color, Mat4, Vec2, Vec3};
use crate::scene::{Mesh, Vertex};

use super::definition::{Axis, Element, ElementRotation, Face};
use super::direction::Direction;

const WINDING: [u32; 6] = [0, 1, 2, 0, 2, 3];
const REVERSED_WINDING: [u32; 6] = [0, 2, 1, 0, 3, 2];

/// Corner positions of the face of the box `from..to` facing `direction`.
pub fn face_positions(direction: Direction, from: Vec3, to: Vec3) -> [Vec3; 4] {
    let (x1, y1, z1) = (from.x, from.y, from.z);
    let (x2, y2, z2) = (to.x, to.y, to.z);
    match direction {
        Direction::Down => [
            Vec3::new(x1, y1, z2),
            Vec3::new(x1, y1, z1),
            Vec3::new(x2, y1, z1),
            Vec3::new(x2, y1, z2),
        ],
        Direction::Up => [
            Vec3::new(x1, y2, z1),
            Vec3::new(x1, y2, z2),
            Vec3::new(x2, y2, z2),
            Vec3::new(x2, y2, z1),
        ],
        Direction::North => [
            Vec3::new(x2, y2, z1),
            Vec3::new(x2, y1, z1),
            Vec3::new(x1, y1, z1),
            Vec3::new(x1, y2, z1),
        ],
        Direction::South => [
            Vec3::new(x1, y2, z2),
            Vec3::new(x1, y1, z2),
            Vec3::new(x2, y1, z2),
            Vec3::new(x2, y2, z2),
        ],
        Direction::West => [
            Vec3::new(x1, y2, z1),
            Vec3::new(x1, y1, z1),
            Vec3::new(x1, y1, z2),
            Vec3::new(x1, y2, z2),
        ],
        Direction::East => [
            Vec3::new(x2, y2, z2),
            Vec3::new(x2, y1, z2),
            Vec3::new(x2, y1, z1),
            Vec3::new(x2, y2, z1),
        ],
    }
}

/// UV rectangle used when a face declares none: the element bounds projected
/// onto the two axes orthogonal to the face.
pub fn default_uv(direction: Direction, from: [f32; 3], to: [f32; 3]) -> [f32; 4] {
    let [x1, y1, z1] = from;
    let [x2, y2, z2] = to;
    match direction {
        Direction::Up | Direction::Down => [x1, z1, x2, z2],
        Direction::North | Direction::South => [x1, y1, x2, y2],
        Direction::West | Direction::East => [z1, y1, z2, y2],
    }
}

/// Texture coordinates for the four corners of `[u1, v1, u2, v2]`.
pub fn uv_corners(uv: [f32; 4]) -> [Vec2; 4] {
    let [s1, t1, s2, t2] = uv;
    let tc = |s: f32, t: f32| Vec2::new(s / 16.0, 1.0 - t / 16.0);
    [tc(s1, t1), tc(s1, t2), tc(s2, t2), tc(s2, t1)]
}

/// Rotates the corner assignment by `degrees` (a multiple of 90).
///
/// Each 90 degree step shifts the list left by one: `[c1, c2, c3, c0]`.
pub fn rotate_corners(corners: [Vec2; 4], degrees: u32) -> [Vec2; 4] {
    if degrees % 90 != 0 {
        log::warn!("face rotation {degrees} is not a multiple of 90, rounding down");
    }
    let steps = (degrees / 90 % 4) as usize;
    let mut rotated = corners;
    rotated.rotate_left(steps);
    rotated
}

/// Triangle indices for a face.
///
/// A cullface naming a different side than the face itself marks an interior
/// face; it is still emitted, with the winding reversed.
pub fn face_indices(direction: Direction, cullface: Option<Direction>) -> [u32; 6] {
    match cullface {
        Some(cull) if cull != direction => REVERSED_WINDING,
        _ => WINDING,
    }
}

/// Matrices for an element rotation: one for positions, one for normals.
pub fn rotation_matrices(rotation: &ElementRotation) -> (Mat4, Mat4) {
    let angle = rotation.angle.to_radians();
    let rotate = match rotation.axis {
        Axis::X => Mat4::rotation_x(angle),
        Axis::Y => Mat4::rotation_y(angle),
        Axis::Z => Mat4::rotation_z(angle),
    };

    let scale = if rotation.rescale && angle.cos().abs() > f32::EPSILON {
        let s = 1.0 / angle.cos().abs();
        match rotation.axis {
            Axis::X => Vec3::new(1.0, s, s),
            Axis::Y => Vec3::new(s, 1.0, s),
            Axis::Z => Vec3::new(s, s, 1.0),
        }
    } else {
        Vec3::ONE
    };

    let origin = Vec3::from_array(rotation.origin);
    let positions = Mat4::translation(origin) * Mat4::scaling(scale) * rotate * Mat4::translation(-origin);
    (positions, rotate)
}

/// Builds the quad for one face of `element`, in model units.
pub fn build_face(element: &Element, direction: Direction, face: &Face) -> Mesh {
    let a = Vec3::from_array(element.from);
    let b = Vec3::from_array(element.to);
    let (from, to) = (a.min(b), a.max(b));

    let positions = face_positions(direction, from, to);
    let uv = face.uv.unwrap_or_else(|| default_uv(direction, from.to_array(), to.to_array()));
    let tex_coords = rotate_corners(uv_corners(uv), face.rotation);

    let shade = if element.shade { direction.shade() } else { 1.0 };
    let color = Color::gray(shade);

    let (position_matrix, normal_matrix) = element
        .rotation
        .as_ref()
        .map(rotation_matrices)
        .unwrap_or((Mat4::IDENTITY, Mat4::IDENTITY));
    let normal = normal_matrix.transform_direction(direction.normal()).normalize();

    let vertices = [0, 1, 2, 3].map(|i| {
        Vertex::new(
            position_matrix.transform_point(positions[i]),
            tex_coords[i],
            normal,
            color,
        )
    });
    Mesh::quad(vertices, face_indices(direction, face.cullface))
}
