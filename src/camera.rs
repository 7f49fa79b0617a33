//! Look-at camera.
//!
//! # Coordinate System
//!
//! Right-handed, matching block model space:
//! - X: positive east
//! - Y: positive up
//! - Z: positive south
//!
//! The camera looks along its local -Z. Every setter recomputes the view or
//! projection matrix immediately, so readers never see stale matrices.

use crate::math::{Mat4, Vec3};
use crate::projection::Projection;

#[derive(Debug, Clone)]
pub struct Camera {
    eye: Vec3,
    target: Vec3,
    up: Vec3,
    projection: Projection,
    view_matrix: Mat4,
    projection_matrix: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Projection::default())
    }
}

impl Camera {
    /// Creates a camera at (0, 0, 10) looking at the origin.
    pub fn new(projection: Projection) -> Self {
        let mut camera = Self {
            eye: Vec3::ZERO,
            target: Vec3::ZERO,
            up: Vec3::UNIT_Y,
            projection,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: projection.matrix(),
        };
        camera.look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::UNIT_Y);
        camera
    }

    /// Places the camera at `eye` looking at `target`.
    pub fn look_at(&mut self, eye: Vec3, target: Vec3, up: Vec3) {
        self.eye = eye;
        self.target = target;
        self.up = up;
        self.view_matrix = Mat4::look_at(eye, target, up);
    }

    /// Perspective projection from explicit near-plane bounds.
    pub fn set_frustum(&mut self, left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) {
        self.set_projection(Projection::Frustum {
            left,
            right,
            bottom,
            top,
            z_near: near,
            z_far: far,
        });
    }

    /// Symmetric perspective projection; `fov_y` in radians.
    pub fn set_perspective(&mut self, fov_y: f32, aspect_ratio: f32, near: f32, far: f32) {
        self.set_projection(Projection::perspective(fov_y, aspect_ratio, near, far));
    }

    /// Orthographic projection of the given view-space box.
    pub fn set_parallel(&mut self, left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) {
        self.set_projection(Projection::Orthographic {
            left,
            right,
            bottom,
            top,
            z_near: near,
            z_far: far,
        });
    }

    pub fn set_projection(&mut self, projection: Projection) {
        self.projection = projection;
        self.projection_matrix = projection.matrix();
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Unit vector from the eye toward the target.
    pub fn forward(&self) -> Vec3 {
        (self.target - self.eye).normalize()
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// World to view space.
    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    /// View to clip space.
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    /// World to clip space: `projection * view`.
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix
    }
}
