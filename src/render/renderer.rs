//! Frame driver.
//!
//! [`Renderer::render`] runs one frame over a scene:
//!
//! ```text
//! clear -> flatten scene -> vertex stage -> clip -> cull -> rasterize
//!       -> depth test -> fragment stage -> write
//! ```
//!
//! The renderer owns its frame buffer and is not meant to be shared between
//! threads; build one per worker.

use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, RgbaImage};

use super::framebuffer::FrameBuffer;
use super::rasterizer::{EdgeFunctionRasterizer, ScreenVertex};
use super::shader::{ShadedVertex, Uniforms};
use crate::camera::Camera;
use crate::clipper::ClipSpaceClipper;
use crate::error::ExportError;
use crate::export::write_atomic;
use crate::light::Light;
use crate::material::Material;
use crate::math::Color;
use crate::scene::Scene;

/// Counters gathered during one call to [`Renderer::render`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub geometries: usize,
    /// Triangles submitted from meshes, before clipping.
    pub triangles: usize,
    /// Triangles handed to the rasterizer after clipping.
    pub rasterized: usize,
    /// Back-facing or degenerate triangles rejected by the rasterizer.
    pub culled: usize,
    pub fragments: usize,
}

pub struct Renderer {
    framebuffer: FrameBuffer,
    background: Color,
    clipper: ClipSpaceClipper,
    rasterizer: EdgeFunctionRasterizer,
    fallback_material: Material,
    shaded: Vec<ShadedVertex>,
}

impl Renderer {
    /// Creates a renderer with a transparent background.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            framebuffer: FrameBuffer::new(width, height),
            background: Color::TRANSPARENT,
            clipper: ClipSpaceClipper::new(),
            rasterizer: EdgeFunctionRasterizer::new(),
            fallback_material: Material::default(),
            shaded: Vec::new(),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.framebuffer = FrameBuffer::new(width, height);
    }

    pub fn width(&self) -> u32 {
        self.framebuffer.width()
    }

    pub fn height(&self) -> u32 {
        self.framebuffer.height()
    }

    /// Width divided by height, for sizing a perspective camera.
    pub fn aspect_ratio(&self) -> f32 {
        self.width() as f32 / self.height().max(1) as f32
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn set_background(&mut self, background: Color) {
        self.background = background;
    }

    pub fn clear(&mut self) {
        self.framebuffer.clear(self.background);
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    /// Clears the buffers and draws every geometry reachable from the scene root.
    pub fn render(&mut self, scene: &Scene, camera: &Camera, lights: &[Light]) -> RenderStats {
        self.clear();

        let Self {
            framebuffer,
            clipper,
            rasterizer,
            fallback_material,
            shaded,
            ..
        } = self;
        let (width, height) = (framebuffer.width(), framebuffer.height());
        let view_projection = camera.view_projection();
        let mut stats = RenderStats::default();

        for (world, geometry) in scene.flatten() {
            let mesh = geometry.mesh();
            if mesh.is_empty() {
                continue;
            }
            stats.geometries += 1;

            let material = geometry.material().map_or(&*fallback_material, |m| m.as_ref());
            let shader = material.shader();
            let uniforms = Uniforms {
                model: world,
                normal_matrix: world.normal_matrix(),
                model_view_projection: view_projection * world,
                material,
                lights,
            };

            shaded.clear();
            shaded.extend(mesh.vertices().iter().map(|v| shader.vertex(v, &uniforms)));

            for [a, b, c] in mesh.triangles() {
                stats.triangles += 1;
                let triangle = [shaded[a as usize], shaded[b as usize], shaded[c as usize]];
                clipper.clip_triangle(triangle, |clipped| {
                    let screen = clipped.map(|v| ScreenVertex::from_clip(&v, width, height));
                    let coverage = rasterizer.fill_triangle(
                        &screen,
                        framebuffer,
                        material.cull(),
                        material.blend(),
                        |fragment| shader.fragment(fragment, &uniforms),
                    );
                    stats.rasterized += 1;
                    if coverage.skipped {
                        stats.culled += 1;
                    }
                    stats.fragments += coverage.written;
                });
            }
        }

        log::debug!(
            "rendered {} geometries: {} triangles, {} rasterized, {} culled, {} fragments",
            stats.geometries,
            stats.triangles,
            stats.rasterized,
            stats.culled,
            stats.fragments
        );
        stats
    }

    /// RGBA8 at (x, y), or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.framebuffer.pixel(x, y)
    }

    pub fn to_image(&self) -> RgbaImage {
        self.framebuffer.to_image()
    }

    /// Encodes the current frame as PNG and writes it to `path`.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), ExportError> {
        let path = path.as_ref();
        let mut bytes = Cursor::new(Vec::new());
        self.to_image().write_to(&mut bytes, ImageFormat::Png)?;
        write_atomic(path, bytes.get_ref())?;
        log::info!("wrote {}x{} image to {}", self.width(), self.height(), path.display());
        Ok(())
    }
}
