//! Shading inputs shared between geometries.
//!
//! Materials are created once per texture by the model builder and handed
//! out as `Arc<Material>`; exporters recognise shared materials by pointer.
//! The only mutable part is the animation frame, kept behind a lock so that
//! shared materials stay `Send + Sync`.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::animation::AnimatedTexture;
use crate::math::{Color, Vec2};
use crate::render::shader::{Shader, UnshadedShader};
use crate::texture::Texture;

/// Alpha threshold used for cutout textures.
pub const DEFAULT_ALPHA_CUTOFF: f32 = 0.1;

/// Keywords that mark a texture as a cutout (binary alpha) texture.
const CUTOUT_KEYWORDS: &[&str] = &[
    "glass", "leaves", "sapling", "flower", "grass", "fern", "vine", "bars", "door", "ladder",
    "rail", "torch", "mushroom", "crop", "roots", "overlay",
];

/// Name-based cutout heuristic, case-insensitive.
pub fn is_cutout_texture(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    CUTOUT_KEYWORDS.iter().any(|keyword| name.contains(keyword))
}

/// How a fragment combines with what is already in the frame buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlendMode {
    /// Replace the destination.
    #[default]
    Opaque,
    /// Source-over composition using the fragment alpha.
    AlphaBlend,
}

/// Which triangles the rasterizer skips.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CullMode {
    /// Skip triangles whose vertices appear clockwise on screen.
    #[default]
    Back,
    None,
}

#[derive(Debug)]
pub struct Material {
    name: String,
    diffuse_map: Option<Arc<Texture>>,
    animation: Option<RwLock<AnimatedTexture>>,
    diffuse: Color,
    use_vertex_color: bool,
    alpha_cutoff: Option<f32>,
    blend: BlendMode,
    cull: CullMode,
    shader: Arc<dyn Shader>,
}

impl Material {
    /// An untextured material that passes vertex colours through.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            diffuse_map: None,
            animation: None,
            diffuse: Color::WHITE,
            use_vertex_color: true,
            alpha_cutoff: None,
            blend: BlendMode::Opaque,
            cull: CullMode::Back,
            shader: Arc::new(UnshadedShader),
        }
    }

    pub fn with_texture(mut self, texture: Arc<Texture>) -> Self {
        self.diffuse_map = Some(texture);
        self
    }

    /// Attaches an animation; its first frame also becomes the diffuse map.
    pub fn with_animation(mut self, animation: AnimatedTexture) -> Self {
        if let Some(first) = animation.frames().first() {
            self.diffuse_map = Some(Arc::clone(first));
        }
        self.animation = Some(RwLock::new(animation));
        self
    }

    /// Colour multiplied into every vertex colour (the tint).
    pub fn with_diffuse(mut self, diffuse: Color) -> Self {
        self.diffuse = diffuse;
        self
    }

    pub fn with_vertex_color(mut self, enabled: bool) -> Self {
        self.use_vertex_color = enabled;
        self
    }

    /// Discards fragments whose alpha is below `cutoff`.
    pub fn with_alpha_test(mut self, cutoff: f32) -> Self {
        self.alpha_cutoff = Some(cutoff);
        self
    }

    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    pub fn with_cull(mut self, cull: CullMode) -> Self {
        self.cull = cull;
        self
    }

    pub fn with_shader(mut self, shader: Arc<dyn Shader>) -> Self {
        self.shader = shader;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The static diffuse texture (the first frame for animated materials).
    pub fn diffuse_map(&self) -> Option<&Arc<Texture>> {
        self.diffuse_map.as_ref()
    }

    pub fn diffuse(&self) -> Color {
        self.diffuse
    }

    pub fn use_vertex_color(&self) -> bool {
        self.use_vertex_color
    }

    pub fn alpha_cutoff(&self) -> Option<f32> {
        self.alpha_cutoff
    }

    pub fn blend(&self) -> BlendMode {
        self.blend
    }

    pub fn cull(&self) -> CullMode {
        self.cull
    }

    pub fn shader(&self) -> &Arc<dyn Shader> {
        &self.shader
    }

    pub fn is_animated(&self) -> bool {
        self.animation.is_some()
    }

    /// Read access to the animation state, if any.
    pub fn animation(&self) -> Option<parking_lot::RwLockReadGuard<'_, AnimatedTexture>> {
        self.animation.as_ref().map(|a| a.read())
    }

    /// Advances the animation by `dt` seconds. No-op for static materials.
    pub fn advance_animation(&self, dt: f32) {
        if let Some(animation) = &self.animation {
            animation.write().advance(dt);
        }
    }

    /// Samples the current diffuse texture, or `None` when untextured.
    pub fn sample(&self, uv: Vec2) -> Option<Color> {
        if let Some(animation) = &self.animation {
            if let Some(frame) = animation.read().current_texture() {
                return Some(frame.sample(uv));
            }
        }
        self.diffuse_map.as_ref().map(|t| t.sample(uv))
    }

    /// True when `alpha` survives the alpha test (always, if disabled).
    pub fn passes_alpha_test(&self, alpha: f32) -> bool {
        self.alpha_cutoff.map_or(true, |cutoff| alpha >= cutoff)
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new("default")
    }
}
