//! Turns block model definitions into scenes.
//!
//! Each face becomes one [`Geometry`] (a textured quad) on the scene root.
//! Materials are cached per builder, keyed by texture id and tint index, so
//! faces sharing a texture share one `Arc<Material>`. Use one builder per
//! worker thread.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;

use super::definition::ModelDefinition;
use super::face::build_face;
use super::textures::resolve_texture;
use crate::animation::{AnimatedTexture, DEFAULT_FRAME_RATE};
use crate::assets::AssetProvider;
use crate::error::AssetError;
use crate::material::{is_cutout_texture, BlendMode, Material, DEFAULT_ALPHA_CUTOFF};
use crate::math::Color;
use crate::render::shader::LitShader;
use crate::scene::{Geometry, Scene};
use crate::texture::Texture;

/// Grass green, used for tint indices without an explicit colour.
const DEFAULT_TINT: [u8; 4] = [0x91, 0xBD, 0x59, 0xFF];

/// Settings for [`ModelBuilder`].
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BuilderOptions {
    /// Colour per tint index.
    pub tints: HashMap<i32, Color>,
    /// Colour for tint indices missing from `tints`.
    pub default_tint: Color,
    /// Alpha below which cutout fragments are discarded.
    pub alpha_cutoff: f32,
    /// Playback rate for animated textures.
    pub frame_rate: f32,
    /// Light faces with the frame's lights instead of the baked shade alone.
    pub lit: bool,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            tints: HashMap::new(),
            default_tint: Color::from_rgba8(DEFAULT_TINT),
            alpha_cutoff: DEFAULT_ALPHA_CUTOFF,
            frame_rate: DEFAULT_FRAME_RATE,
            lit: false,
        }
    }
}

impl BuilderOptions {
    pub fn with_tint(mut self, index: i32, color: Color) -> Self {
        self.tints.insert(index, color);
        self
    }

    pub fn with_default_tint(mut self, color: Color) -> Self {
        self.default_tint = color;
        self
    }

    pub fn with_alpha_cutoff(mut self, cutoff: f32) -> Self {
        self.alpha_cutoff = cutoff;
        self
    }

    pub fn with_frame_rate(mut self, frame_rate: f32) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    pub fn with_lighting(mut self, lit: bool) -> Self {
        self.lit = lit;
        self
    }

    pub fn tint(&self, index: i32) -> Color {
        self.tints.get(&index).copied().unwrap_or(self.default_tint)
    }
}

pub struct ModelBuilder<A> {
    assets: A,
    options: BuilderOptions,
    materials: HashMap<String, Arc<Material>>,
}

impl<A: AssetProvider> ModelBuilder<A> {
    pub fn new(assets: A) -> Self {
        Self::with_options(assets, BuilderOptions::default())
    }

    pub fn with_options(assets: A, options: BuilderOptions) -> Self {
        Self {
            assets,
            options,
            materials: HashMap::new(),
        }
    }

    pub fn assets(&self) -> &A {
        &self.assets
    }

    pub fn options(&self) -> &BuilderOptions {
        &self.options
    }

    /// Every material created so far.
    pub fn materials(&self) -> impl Iterator<Item = &Arc<Material>> {
        self.materials.values()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Forgets cached materials; later builds create fresh ones.
    pub fn clear_cache(&mut self) {
        self.materials.clear();
    }

    /// Resolves a `#tag` to its first member; other ids pass through.
    pub fn resolve_id(&self, id: &str) -> Result<String, AssetError> {
        match id.strip_prefix('#') {
            Some(tag) => self
                .assets
                .resolve_tag(tag)
                .into_iter()
                .next()
                .ok_or_else(|| AssetError::EmptyTag(id.to_string())),
            None => Ok(id.to_string()),
        }
    }

    /// Builds the scene for a block or item model.
    ///
    /// A missing model is an error. Faces whose texture cannot be resolved
    /// are logged and skipped. A model without elements yields an empty scene.
    pub fn build_model(&mut self, id: &str) -> Result<Scene, AssetError> {
        let id = self.resolve_id(id)?;
        let model = self.assets.model(&id)?;
        Ok(self.build_definition(&id, &model))
    }

    /// Builds a scene from an already loaded definition.
    pub fn build_definition(&mut self, name: &str, model: &ModelDefinition) -> Scene {
        let mut geometries = Vec::new();
        for (index, element) in model.elements().iter().enumerate() {
            for (&direction, face) in &element.faces {
                let texture_id = match resolve_texture(&model.textures, &face.texture) {
                    Ok(texture_id) => texture_id,
                    Err(err) => {
                        log::warn!("{name}: skipping {direction} face of element {index}: {err}");
                        continue;
                    }
                };
                let material = self.material(&texture_id, face.tint_index);
                geometries.push(Geometry::new(build_face(element, direction, face), Some(material)));
            }
        }

        log::debug!("built {name}: {} faces, {} cached materials", geometries.len(), self.materials.len());
        Scene::from_geometries(name, geometries)
    }

    /// The shared material for `texture_id`, creating it on first use.
    pub fn material(&mut self, texture_id: &str, tint_index: Option<i32>) -> Arc<Material> {
        let key = match tint_index {
            Some(index) => format!("{texture_id}@tint{index}"),
            None => texture_id.to_string(),
        };
        if let Some(material) = self.materials.get(&key) {
            return Arc::clone(material);
        }

        let material = Arc::new(self.create_material(texture_id, tint_index));
        self.materials.insert(key, Arc::clone(&material));
        material
    }

    fn load_texture(&self, id: &str) -> Texture {
        self.assets.texture(id).unwrap_or_else(|err| {
            log::warn!("using placeholder texture for {id}: {err}");
            Texture::missing()
        })
    }

    fn create_material(&self, texture_id: &str, tint_index: Option<i32>) -> Material {
        let texture = self.load_texture(texture_id);
        let translucent = texture.has_translucency();

        let mut material = Material::new(texture_id);
        material = match AnimatedTexture::from_atlas(&texture) {
            Some(animation) => {
                log::debug!("{texture_id}: {} animation frames", animation.frame_count());
                material.with_animation(animation.with_frame_rate(self.options.frame_rate))
            }
            None => material.with_texture(Arc::new(texture)),
        };

        if is_cutout_texture(texture_id) {
            material = material.with_alpha_test(self.options.alpha_cutoff);
        } else if translucent {
            material = material.with_blend(BlendMode::AlphaBlend);
        }
        if let Some(index) = tint_index {
            material = material.with_diffuse(self.options.tint(index));
        }
        if self.options.lit {
            material = material.with_shader(Arc::new(LitShader));
        }
        material
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::InMemoryAssets;
    use crate::model::{Direction, Element, Face};
    use image::{Rgba, RgbaImage};

    fn stone_assets() -> InMemoryAssets {
        InMemoryAssets::new()
            .with_model(
                "block/cube_all",
                ModelDefinition::new().with_element(Element::cube([0.0; 3], [16.0; 3], "#all")),
            )
            .with_model(
                "block/stone",
                ModelDefinition::new()
                    .with_parent("block/cube_all")
                    .with_texture("all", "block/stone"),
            )
            .with_texture("block/stone", Texture::solid("stone", 16, 16, Color::gray(0.5)))
    }

    #[test]
    fn cube_builds_six_faces_sharing_one_material() {
        let mut builder = ModelBuilder::new(stone_assets());
        let scene = builder.build_model("stone").unwrap();

        assert_eq!(scene.geometry_count(), 6);
        assert_eq!(builder.material_count(), 1);
        let flattened = scene.flatten();
        let first = flattened[0].1.material().unwrap();
        assert!(flattened.iter().all(|(_, g)| Arc::ptr_eq(g.material().unwrap(), first)));
    }

    #[test]
    fn cache_survives_across_builds() {
        let mut builder = ModelBuilder::new(stone_assets());
        let a = builder.build_model("stone").unwrap();
        let b = builder.build_model("minecraft:block/stone").unwrap();
        assert!(Arc::ptr_eq(
            a.flatten()[0].1.material().unwrap(),
            b.flatten()[0].1.material().unwrap()
        ));
    }

    #[test]
    fn missing_model_is_an_error() {
        let mut builder = ModelBuilder::new(stone_assets());
        assert!(matches!(builder.build_model("dirt"), Err(AssetError::ModelNotFound(_))));
    }

    #[test]
    fn model_without_elements_is_empty_scene() {
        let assets = InMemoryAssets::new().with_model("item/stick", ModelDefinition::new());
        let scene = ModelBuilder::new(assets).build_model("item/stick").unwrap();
        assert_eq!(scene.geometry_count(), 0);
        assert_eq!(scene.node_count(), 1);
    }

    #[test]
    fn unresolved_face_is_skipped() {
        let model = ModelDefinition::new()
            .with_texture("all", "block/stone")
            .with_element(
                Element::new([0.0; 3], [16.0; 3])
                    .with_face(Direction::Up, Face::new("#all"))
                    .with_face(Direction::Down, Face::new("#missing"))
                    .with_face(Direction::North, Face::new("#loop")),
            )
            .with_texture("loop", "#loop");
        let assets = stone_assets().with_model("block/odd", model);
        let scene = ModelBuilder::new(assets).build_model("block/odd").unwrap();
        assert_eq!(scene.geometry_count(), 1);
    }

    #[test]
    fn tags_resolve_to_first_member() {
        let assets = stone_assets().with_tag("forge:stones", ["minecraft:stone", "minecraft:granite"]);
        let mut builder = ModelBuilder::new(assets);
        assert_eq!(builder.resolve_id("#forge:stones").unwrap(), "minecraft:stone");
        assert_eq!(builder.build_model("#forge:stones").unwrap().geometry_count(), 6);
        assert!(matches!(builder.build_model("#forge:none"), Err(AssetError::EmptyTag(_))));
    }

    #[test]
    fn cutout_and_translucent_textures_pick_alpha_mode() {
        let mut glass = RgbaImage::from_pixel(16, 16, Rgba([255, 255, 255, 0]));
        glass.put_pixel(0, 0, Rgba([255, 255, 255, 255]));
        let water = Texture::solid("water", 16, 16, Color::new(0.2, 0.3, 1.0, 0.6));
        let assets = InMemoryAssets::new()
            .with_texture("block/glass", Texture::new("glass", glass))
            .with_texture("block/water_still", water);

        let mut builder = ModelBuilder::new(assets);
        let glass = builder.material("minecraft:block/glass", None);
        assert_eq!(glass.alpha_cutoff(), Some(DEFAULT_ALPHA_CUTOFF));
        assert_eq!(glass.blend(), BlendMode::Opaque);

        let water = builder.material("minecraft:block/water_still", None);
        assert_eq!(water.alpha_cutoff(), None);
        assert_eq!(water.blend(), BlendMode::AlphaBlend);
    }

    #[test]
    fn atlas_texture_becomes_animated_material() {
        let atlas = RgbaImage::from_fn(16, 64, |_, y| Rgba([(y / 16 * 60) as u8, 0, 0, 255]));
        let assets = InMemoryAssets::new().with_texture("block/fire", Texture::new("fire", atlas));
        let mut builder =
            ModelBuilder::with_options(assets, BuilderOptions::default().with_frame_rate(20.0));

        let material = builder.material("block/fire", None);
        assert!(material.is_animated());
        let animation = material.animation().unwrap();
        assert_eq!(animation.frame_count(), 4);
        assert_eq!(animation.frame_rate(), 20.0);
    }

    #[test]
    fn missing_texture_falls_back_to_placeholder() {
        let mut builder = ModelBuilder::new(InMemoryAssets::new());
        let material = builder.material("block/nothing", None);
        assert_eq!(material.diffuse_map().unwrap().name(), "missing");
    }

    #[test]
    fn tinted_faces_get_their_own_material() {
        let model = ModelDefinition::new().with_texture("all", "block/stone").with_element(
            Element::new([0.0; 3], [16.0; 3])
                .with_face(Direction::Up, Face::new("#all").with_tint_index(0))
                .with_face(Direction::Down, Face::new("#all")),
        );
        let assets = stone_assets().with_model("block/grassy", model);
        let tint = Color::rgb(0.2, 0.8, 0.2);
        let mut builder = ModelBuilder::with_options(assets, BuilderOptions::default().with_tint(0, tint));

        let scene = builder.build_model("block/grassy").unwrap();
        assert_eq!(builder.material_count(), 2);
        let diffuse: Vec<Color> = scene
            .flatten()
            .iter()
            .map(|(_, g)| g.material().unwrap().diffuse())
            .collect();
        assert!(diffuse.contains(&tint));
        assert!(diffuse.contains(&Color::WHITE));
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: BuilderOptions =
            serde_json::from_str(r#"{ "tints": { "0": { "r": 0.5, "g": 1.0, "b": 0.5 } }, "lit": true }"#).unwrap();
        assert_eq!(options.tint(0), Color::rgb(0.5, 1.0, 0.5));
        assert_eq!(options.tint(3), options.default_tint);
        assert_eq!(options.alpha_cutoff, DEFAULT_ALPHA_CUTOFF);
        assert!(options.lit);
    }
}
