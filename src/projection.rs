//! Projection parameters.
//!
//! [`Projection`] is the single source of truth for the camera lens. Block
//! icons use an orthographic ("parallel") projection; multiblock views use a
//! perspective one.

use crate::math::Mat4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Symmetric perspective from a vertical field of view.
    Perspective {
        /// Vertical field of view in radians.
        fov_y: f32,
        /// Width divided by height.
        aspect_ratio: f32,
        z_near: f32,
        z_far: f32,
    },
    /// Perspective from explicit near-plane bounds.
    Frustum {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        z_near: f32,
        z_far: f32,
    },
    /// Parallel projection of a view-space box.
    Orthographic {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        z_near: f32,
        z_far: f32,
    },
}

impl Default for Projection {
    fn default() -> Self {
        Self::from_degrees(45.0, 1.0, 0.1, 1000.0)
    }
}

impl Projection {
    /// # Arguments
    /// * `fov_y` - Vertical field of view in radians
    /// * `aspect_ratio` - Width divided by height
    /// * `z_near` - Near clipping plane distance (must be > 0)
    /// * `z_far` - Far clipping plane distance (must be > z_near)
    pub fn perspective(fov_y: f32, aspect_ratio: f32, z_near: f32, z_far: f32) -> Self {
        Projection::Perspective {
            fov_y,
            aspect_ratio,
            z_near,
            z_far,
        }
    }

    /// Creates a perspective projection from degrees instead of radians.
    pub fn from_degrees(fov_y_degrees: f32, aspect_ratio: f32, z_near: f32, z_far: f32) -> Self {
        Self::perspective(fov_y_degrees.to_radians(), aspect_ratio, z_near, z_far)
    }

    pub fn is_perspective(&self) -> bool {
        !matches!(self, Projection::Orthographic { .. })
    }

    pub fn z_near(&self) -> f32 {
        match *self {
            Projection::Perspective { z_near, .. }
            | Projection::Frustum { z_near, .. }
            | Projection::Orthographic { z_near, .. } => z_near,
        }
    }

    pub fn z_far(&self) -> f32 {
        match *self {
            Projection::Perspective { z_far, .. }
            | Projection::Frustum { z_far, .. }
            | Projection::Orthographic { z_far, .. } => z_far,
        }
    }

    /// Horizontal field of view in radians, for symmetric perspective only.
    pub fn fov_x(&self) -> Option<f32> {
        match *self {
            Projection::Perspective {
                fov_y, aspect_ratio, ..
            } => Some(2.0 * (aspect_ratio * (fov_y / 2.0).tan()).atan()),
            _ => None,
        }
    }

    /// Generates the projection matrix.
    pub fn matrix(&self) -> Mat4 {
        match *self {
            Projection::Perspective {
                fov_y,
                aspect_ratio,
                z_near,
                z_far,
            } => Mat4::perspective(fov_y, aspect_ratio, z_near, z_far),
            Projection::Frustum {
                left,
                right,
                bottom,
                top,
                z_near,
                z_far,
            } => Mat4::frustum(left, right, bottom, top, z_near, z_far),
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                z_near,
                z_far,
            } => Mat4::orthographic(left, right, bottom, top, z_near, z_far),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_4;

    #[test]
    fn fov_x_matches_aspect_ratio() {
        let proj = Projection::perspective(FRAC_PI_4, 1.0, 0.1, 100.0);
        assert_relative_eq!(proj.fov_x().unwrap(), FRAC_PI_4, epsilon = 1e-6);
    }

    #[test]
    fn fov_x_wider_with_higher_aspect() {
        let proj = Projection::perspective(FRAC_PI_4, 16.0 / 9.0, 0.1, 100.0);
        assert!(proj.fov_x().unwrap() > FRAC_PI_4);
    }

    #[test]
    fn symmetric_frustum_equals_perspective() {
        let top = 0.1 * (FRAC_PI_4 / 2.0).tan();
        let frustum = Projection::Frustum {
            left: -top,
            right: top,
            bottom: -top,
            top,
            z_near: 0.1,
            z_far: 100.0,
        };
        let perspective = Projection::perspective(FRAC_PI_4, 1.0, 0.1, 100.0);
        assert_relative_eq!(frustum.matrix(), perspective.matrix(), epsilon = 1e-5);
    }

    #[test]
    fn orthographic_is_not_perspective() {
        let ortho = Projection::Orthographic {
            left: -1.0,
            right: 1.0,
            bottom: -1.0,
            top: 1.0,
            z_near: 0.1,
            z_far: 10.0,
        };
        assert!(!ortho.is_perspective());
        assert_eq!(ortho.fov_x(), None);
        assert_eq!(ortho.z_far(), 10.0);
    }
}
