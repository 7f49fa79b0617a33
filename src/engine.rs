//! High-level entry point.
//!
//! The [`Engine`] owns a model builder, a renderer, a camera and the frame's
//! lights, and wires them together for the two common jobs: an isometric icon
//! of one block, and a perspective view of a multiblock structure. Scenes can
//! also be rendered or exported directly.

use std::collections::HashMap;
use std::path::Path;

use image::RgbaImage;
use serde::Deserialize;

use crate::assets::AssetProvider;
use crate::camera::Camera;
use crate::error::Result;
use crate::export::{GltfExporter, GltfSummary, ObjExporter, ObjOptions, ObjSummary};
use crate::light::Light;
use crate::math::{Color, Vec3};
use crate::model::{BuilderOptions, ModelBuilder};
use crate::multiblock::{self, Multiblock, BLOCK_SIZE};
use crate::render::{RenderStats, Renderer};
use crate::scene::Scene;

const DEFAULT_SIZE: u32 = 256;
/// Half the height of the parallel view volume around a single block.
const DEFAULT_BLOCK_EXTENT: f32 = 14.0;
const BLOCK_EYE: Vec3 = Vec3::new(100.0, 100.0, 100.0);

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub width: u32,
    pub height: u32,
    pub background: Color,
    /// Half height of the orthographic view used by [`Engine::render_block`].
    pub block_extent: f32,
    /// Only used by materials built with lighting enabled.
    pub lights: Vec<Light>,
    pub builder: BuilderOptions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            background: Color::TRANSPARENT,
            block_extent: DEFAULT_BLOCK_EXTENT,
            lights: Vec::new(),
            builder: BuilderOptions::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn with_lights(mut self, lights: Vec<Light>) -> Self {
        self.lights = lights;
        self
    }

    pub fn with_builder(mut self, builder: BuilderOptions) -> Self {
        self.builder = builder;
        self
    }
}

pub struct Engine<A> {
    builder: ModelBuilder<A>,
    renderer: Renderer,
    camera: Camera,
    lights: Vec<Light>,
    block_extent: f32,
    last_stats: RenderStats,
}

impl<A: AssetProvider> Engine<A> {
    pub fn new(assets: A) -> Self {
        Self::with_config(assets, EngineConfig::default())
    }

    pub fn with_config(assets: A, config: EngineConfig) -> Self {
        let mut renderer = Renderer::new(config.width, config.height);
        renderer.set_background(config.background);
        Self {
            builder: ModelBuilder::with_options(assets, config.builder),
            renderer,
            camera: Camera::default(),
            lights: config.lights,
            block_extent: config.block_extent,
            last_stats: RenderStats::default(),
        }
    }

    pub fn builder(&self) -> &ModelBuilder<A> {
        &self.builder
    }

    pub fn builder_mut(&mut self) -> &mut ModelBuilder<A> {
        &mut self.builder
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn set_lights(&mut self, lights: Vec<Light>) {
        self.lights = lights;
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.renderer.resize(width, height);
    }

    /// Counters from the most recent frame.
    pub fn last_stats(&self) -> RenderStats {
        self.last_stats
    }

    /// Builds the scene for `id` with its centre moved to the origin.
    pub fn build_block(&mut self, id: &str) -> Result<Scene> {
        let mut scene = self.builder.build_model(id)?;
        let half = BLOCK_SIZE / 2.0;
        scene
            .transform_mut(scene.root())?
            .set_translation(Vec3::new(-half, -half, -half));
        Ok(scene)
    }

    pub fn build_multiblock<L, S>(&mut self, pattern: &[L], mapping: &HashMap<char, String>) -> Result<Multiblock>
    where
        L: AsRef<[S]>,
        S: AsRef<str>,
    {
        Ok(multiblock::assemble(&mut self.builder, pattern, mapping)?)
    }

    /// Sets the isometric parallel camera used for block icons.
    pub fn use_block_camera(&mut self) {
        let extent = self.block_extent;
        let aspect = self.renderer.aspect_ratio();
        self.camera
            .set_parallel(-extent * aspect, extent * aspect, -extent, extent, 1.0, 1000.0);
        self.camera.look_at(BLOCK_EYE, Vec3::ZERO, Vec3::UNIT_Y);
    }

    /// Renders one block as an isometric icon.
    pub fn render_block(&mut self, id: &str) -> Result<RgbaImage> {
        let scene = self.build_block(id)?;
        self.use_block_camera();
        self.render_scene(&scene);
        Ok(self.renderer.to_image())
    }

    /// Renders a multiblock structure with a camera framed around it.
    pub fn render_multiblock<L, S>(&mut self, pattern: &[L], mapping: &HashMap<char, String>) -> Result<RgbaImage>
    where
        L: AsRef<[S]>,
        S: AsRef<str>,
    {
        let multiblock = self.build_multiblock(pattern, mapping)?;
        multiblock.frame_camera(&mut self.camera, self.renderer.aspect_ratio());
        self.render_scene(multiblock.scene());
        Ok(self.renderer.to_image())
    }

    /// Renders `scene` with the current camera and lights.
    pub fn render_scene(&mut self, scene: &Scene) -> RenderStats {
        self.last_stats = self.renderer.render(scene, &self.camera, &self.lights);
        self.last_stats
    }

    /// The most recent frame.
    pub fn image(&self) -> RgbaImage {
        self.renderer.to_image()
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        Ok(self.renderer.save_png(path)?)
    }

    pub fn export_obj(&self, scene: &Scene, path: &Path, options: ObjOptions) -> Result<ObjSummary> {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".to_string());
        Ok(ObjExporter::with_options(options).export(scene, path, &name)?)
    }

    pub fn export_glb(&self, scene: &Scene, path: &Path) -> Result<GltfSummary> {
        Ok(GltfExporter::new().export(scene, path)?)
    }

    /// Steps every animated material created so far by `dt` seconds.
    pub fn advance_animations(&self, dt: f32) {
        for material in self.builder.materials() {
            material.advance_animation(dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::InMemoryAssets;
    use crate::error::{AssetError, Error};
    use crate::model::{Element, ModelDefinition};
    use crate::texture::Texture;

    fn assets() -> InMemoryAssets {
        InMemoryAssets::new()
            .with_model(
                "block/stone",
                ModelDefinition::new()
                    .with_texture("all", "block/stone")
                    .with_element(Element::cube([0.0; 3], [16.0; 3], "#all")),
            )
            .with_texture("block/stone", Texture::solid("stone", 16, 16, Color::WHITE))
    }

    fn engine() -> Engine<InMemoryAssets> {
        Engine::with_config(assets(), EngineConfig::default().with_size(64, 64))
    }

    #[test]
    fn block_icon_covers_centre_and_leaves_corners() {
        let mut engine = engine();
        let image = engine.render_block("stone").unwrap();

        assert_eq!(image.dimensions(), (64, 64));
        assert_eq!(image.get_pixel(32, 32).0[3], 255);
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0, 0]);
        // Top, south and east faces are visible; the rest are back faces.
        assert!(engine.last_stats().culled >= 6);
    }

    #[test]
    fn top_face_is_brightest() {
        let mut engine = engine();
        let image = engine.render_block("stone").unwrap();
        // Top face above the centre, south/east faces below it.
        let top = image.get_pixel(32, 20).0[0];
        let side = image.get_pixel(24, 40).0[0];
        assert_eq!(top, 255);
        assert!(side < top);
    }

    #[test]
    fn multiblock_renders_and_missing_block_errors() {
        let mut engine = engine();
        let mapping = HashMap::from([('S', "stone".to_string())]);
        let image = engine.render_multiblock(&[["SS"], ["S "]], &mapping).unwrap();
        assert_eq!(image.get_pixel(32, 32).0[3], 255);

        let mapping = HashMap::from([('G', "gold_block".to_string())]);
        let err = engine.render_multiblock(&[["G"]], &mapping).unwrap_err();
        assert!(matches!(err, Error::Multiblock(_)));
        assert!(matches!(
            engine.render_block("gold_block"),
            Err(Error::Asset(AssetError::ModelNotFound(_)))
        ));
    }

    #[test]
    fn lit_materials_without_lights_match_unlit_render() {
        let unlit = engine().render_block("stone").unwrap();
        let config = EngineConfig::default()
            .with_size(64, 64)
            .with_builder(BuilderOptions::default().with_lighting(true));
        assert!(config.lights.is_empty());
        let lit = Engine::with_config(assets(), config).render_block("stone").unwrap();
        assert_eq!(lit.as_raw(), unlit.as_raw());
    }

    #[test]
    fn config_loads_from_json() {
        let config = EngineConfig::from_json(
            r#"{
                "width": 128,
                "background": { "r": 1.0, "g": 1.0, "b": 1.0 },
                "lights": [
                    { "type": "ambient", "color": { "r": 0.5, "g": 0.5, "b": 0.5 } },
                    { "type": "directional", "color": { "r": 1.0, "g": 1.0, "b": 1.0 },
                      "direction": { "x": 0.0, "y": -1.0, "z": 0.0 } }
                ],
                "builder": { "alpha_cutoff": 0.5 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.width, 128);
        assert_eq!(config.height, DEFAULT_SIZE);
        assert_eq!(config.background, Color::WHITE);
        assert_eq!(config.lights.len(), 2);
        assert_eq!(config.builder.alpha_cutoff, 0.5);
    }

    #[test]
    fn advancing_animations_moves_shared_frames() {
        let atlas = Texture::new(
            "lava",
            image::RgbaImage::from_fn(16, 32, |_, y| image::Rgba([if y < 16 { 255 } else { 0 }, 0, 0, 255])),
        );
        let assets = assets().with_texture("block/stone", atlas);
        let mut engine = Engine::new(assets);
        engine.build_block("stone").unwrap();

        let material = engine.builder().materials().next().unwrap().clone();
        assert_eq!(material.animation().unwrap().current_frame(), 0);
        engine.advance_animations(0.1);
        assert_eq!(material.animation().unwrap().current_frame(), 1);
    }
}
