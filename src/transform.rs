//! Local transform of a scene node.
//!
//! Provides a [`Transform`] struct with a fluent API for managing translation,
//! rotation (Euler angles) and scale relative to the parent node.

use crate::math::{Mat4, Vec3};

/// A 3D transform with translation, rotation (Euler angles) and scale.
///
/// Mutating methods return `&mut Self` for chaining:
///
/// ```ignore
/// node.transform_mut()
///     .set_translation(Vec3::new(16.0, 0.0, 0.0))
///     .rotate_y(std::f32::consts::FRAC_PI_2);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    translation: Vec3,
    rotation: Vec3, // Euler angles in radians around x, y, z
    scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Identity transform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity transform moved by `offset`.
    pub fn from_translation(offset: Vec3) -> Self {
        Self {
            translation: offset,
            ..Self::default()
        }
    }

    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    pub fn set_translation(&mut self, translation: Vec3) -> &mut Self {
        self.translation = translation;
        self
    }

    /// Translate by a delta vector.
    pub fn translate(&mut self, delta: Vec3) -> &mut Self {
        self.translation = self.translation + delta;
        self
    }

    /// Euler angles in radians.
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Vec3) -> &mut Self {
        self.rotation = rotation;
        self
    }

    pub fn rotate_x(&mut self, angle: f32) -> &mut Self {
        self.rotation.x += angle;
        self
    }

    pub fn rotate_y(&mut self, angle: f32) -> &mut Self {
        self.rotation.y += angle;
        self
    }

    pub fn rotate_z(&mut self, angle: f32) -> &mut Self {
        self.rotation.z += angle;
        self
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vec3) -> &mut Self {
        self.scale = scale;
        self
    }

    /// Set uniform scale (same value for x, y, z).
    pub fn set_scale_uniform(&mut self, s: f32) -> &mut Self {
        self.scale = Vec3::splat(s);
        self
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Generate the parent-from-local matrix.
    ///
    /// Order: Translation * RotationX * RotationY * RotationZ * Scale
    /// (scale applied first, then rotations, then translation)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::translation(self.translation)
            * Mat4::rotation_x(self.rotation.x)
            * Mat4::rotation_y(self.rotation.y)
            * Mat4::rotation_z(self.rotation.z)
            * Mat4::scaling(self.scale)
    }
}
