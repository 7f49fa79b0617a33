//! Fixtures shared by the integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use blockraster::assets::InMemoryAssets;
use blockraster::math::Color;
use blockraster::model::{Direction, Element, Face, ModelDefinition};
use blockraster::texture::Texture;
use image::{Rgba, RgbaImage};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A scratch directory removed when dropped.
pub struct TempDir(tempfile::TempDir);

impl TempDir {
    pub fn new(name: &str) -> Self {
        let dir = tempfile::Builder::new()
            .prefix(&format!("blockraster-it-{name}-"))
            .tempdir()
            .unwrap();
        Self(dir)
    }

    pub fn path(&self) -> &Path {
        self.0.path()
    }

    pub fn join(&self, relative: &str) -> PathBuf {
        self.0.path().join(relative)
    }

    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
}

pub const STONE_GRAY: f32 = 0.6;

fn cube_all() -> ModelDefinition {
    ModelDefinition::new().with_element(Element::cube([0.0; 3], [16.0; 3], "#all"))
}

/// Two-frame 16x32 atlas: red then blue.
pub fn lava_atlas() -> Texture {
    let image = RgbaImage::from_fn(16, 32, |_, y| if y < 16 { Rgba([255, 0, 0, 255]) } else { Rgba([0, 0, 255, 255]) });
    Texture::new("minecraft:block/lava_still", image)
}

/// Models and textures for the common test blocks:
/// `stone`, `glass` (fully transparent cutout), `grass_block` (tinted top),
/// `slab` (half height) and `lava` (animated).
pub fn fixture_assets() -> InMemoryAssets {
    let grass = ModelDefinition::new()
        .with_texture("top", "block/grass_block_top")
        .with_texture("side", "block/dirt")
        .with_element(
            Element::new([0.0; 3], [16.0; 3])
                .with_face(Direction::Up, Face::new("#top").with_tint_index(0).with_cullface(Direction::Up))
                .with_face(Direction::Down, Face::new("#side").with_cullface(Direction::Down))
                .with_face(Direction::North, Face::new("#side").with_cullface(Direction::North))
                .with_face(Direction::South, Face::new("#side").with_cullface(Direction::South))
                .with_face(Direction::West, Face::new("#side").with_cullface(Direction::West))
                .with_face(Direction::East, Face::new("#side").with_cullface(Direction::East)),
        );
    let slab = ModelDefinition::new()
        .with_texture("all", "block/stone")
        .with_element(Element::cube([0.0; 3], [16.0, 8.0, 16.0], "#all"));

    InMemoryAssets::new()
        .with_model("block/cube_all", cube_all())
        .with_model(
            "block/stone",
            ModelDefinition::new()
                .with_parent("block/cube_all")
                .with_texture("all", "block/stone"),
        )
        .with_model(
            "block/glass",
            ModelDefinition::new()
                .with_parent("block/cube_all")
                .with_texture("all", "block/glass"),
        )
        .with_model(
            "block/lava",
            ModelDefinition::new()
                .with_parent("block/cube_all")
                .with_texture("all", "block/lava_still"),
        )
        .with_model("block/grass_block", grass)
        .with_model("block/slab", slab)
        .with_texture("block/stone", Texture::solid("minecraft:block/stone", 16, 16, Color::gray(STONE_GRAY)))
        .with_texture("block/glass", Texture::solid("minecraft:block/glass", 16, 16, Color::TRANSPARENT))
        .with_texture("block/grass_block_top", Texture::solid("minecraft:block/grass_block_top", 16, 16, Color::WHITE))
        .with_texture("block/dirt", Texture::solid("minecraft:block/dirt", 16, 16, Color::rgb(0.5, 0.35, 0.2)))
        .with_texture("block/lava_still", lava_atlas())
        .with_tag("forge:stones", ["minecraft:stone"])
}
