//! Lights supplied to the renderer per frame.
//!
//! Lights are not part of the scene graph; the renderer receives them as a
//! flat slice and hands them to the shader through the uniforms.

use serde::Deserialize;

use crate::math::{Color, Vec3};

/// Deserializes from `{ "type": "ambient", "color": .. }` or
/// `{ "type": "directional", "color": .., "direction": .. }`.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Light {
    /// Uniform light reaching every surface equally.
    Ambient { color: Color },
    /// Parallel rays, like the sun.
    Directional {
        color: Color,
        /// The direction the light travels (not where it comes from).
        direction: Vec3,
    },
}

impl Light {
    /// White ambient light of the given intensity.
    pub fn ambient(intensity: f32) -> Self {
        Light::Ambient {
            color: Color::gray(intensity),
        }
    }

    /// White directional light; the direction is normalized.
    pub fn directional(intensity: f32, direction: Vec3) -> Self {
        Light::Directional {
            color: Color::gray(intensity),
            direction: direction.normalize(),
        }
    }

    /// Lambert factor in `[0, 1]` for a surface with the given normal.
    ///
    /// Always 1 for ambient lights.
    pub fn intensity(&self, normal: Vec3) -> f32 {
        match self {
            Light::Ambient { .. } => 1.0,
            // Negate direction: light pointing at surface = positive dot product
            Light::Directional { direction, .. } => (-direction.normalize()).dot(normal.normalize()).max(0.0),
        }
    }

    /// Colour this light contributes to a surface with the given normal.
    pub fn contribution(&self, normal: Vec3) -> Color {
        let color = match self {
            Light::Ambient { color } | Light::Directional { color, .. } => *color,
        };
        let k = self.intensity(normal);
        Color::new(color.r * k, color.g * k, color.b * k, 1.0)
    }
}

/// Sum of every light's contribution, alpha fixed at 1.
pub fn accumulate(lights: &[Light], normal: Vec3) -> Color {
    lights.iter().fold(Color::new(0.0, 0.0, 0.0, 1.0), |acc, light| {
        let c = light.contribution(normal);
        Color::new(acc.r + c.r, acc.g + c.g, acc.b + c.b, 1.0)
    })
}
