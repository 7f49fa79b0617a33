mod common;

use std::collections::HashMap;

use blockraster::assets::DirectoryAssets;
use blockraster::math::Color;
use blockraster::model::ModelBuilder;
use blockraster::multiblock;
use blockraster::texture::Texture;
use blockraster::{Engine, EngineConfig};
use common::{fixture_assets, init_logger, TempDir, STONE_GRAY};

fn engine() -> Engine<blockraster::assets::InMemoryAssets> {
    Engine::with_config(fixture_assets(), EngineConfig::default().with_size(64, 64))
}

#[test]
fn stone_icon_shows_shaded_faces() {
    init_logger();
    let mut engine = engine();
    let image = engine.render_block("stone").unwrap();

    let gray = (STONE_GRAY * 255.0).round() as u8;
    assert_eq!(image.get_pixel(32, 20).0, [gray, gray, gray, 255]);
    let side = image.get_pixel(24, 40).0;
    assert!(side[0] < gray && side[3] == 255);
    assert_eq!(image.get_pixel(1, 1).0, [0, 0, 0, 0]);
}

#[test]
fn fully_transparent_cutout_leaves_background() {
    init_logger();
    let background = Color::rgb(0.2, 0.4, 0.6);
    let config = EngineConfig::default().with_size(48, 32).with_background(background);
    let mut engine = Engine::with_config(fixture_assets(), config);

    let image = engine.render_block("glass").unwrap();
    assert!(image.pixels().all(|p| p.0 == background.to_rgba8()));
    assert_eq!(engine.last_stats().fragments, 0);
}

#[test]
fn tinted_top_uses_grass_colour() {
    init_logger();
    let mut engine = engine();
    let image = engine.render_block("grass_block").unwrap();
    assert_eq!(image.get_pixel(32, 20).0, [0x91, 0xBD, 0x59, 0xFF]);
}

#[test]
fn tag_ids_render_their_first_member() {
    init_logger();
    let mut engine = engine();
    let image = engine.render_block("#forge:stones").unwrap();
    assert_eq!(image.get_pixel(32, 32).0[3], 255);
}

#[test]
fn animated_texture_advances_between_frames() {
    init_logger();
    let mut engine = engine();
    let first = engine.render_block("lava").unwrap();
    assert_eq!(first.get_pixel(32, 20).0, [255, 0, 0, 255]);

    engine.advance_animations(0.1);
    let second = engine.render_block("lava").unwrap();
    assert_eq!(second.get_pixel(32, 20).0, [0, 0, 255, 255]);
}

#[test]
fn multiblock_placement_counts() {
    init_logger();
    let mut builder = ModelBuilder::new(fixture_assets());
    let mapping = HashMap::from([('X', "stone".to_string())]);

    let single = multiblock::assemble(&mut builder, &[["X"]], &mapping).unwrap();
    assert_eq!(single.placements().len(), 1);
    assert_eq!(single.placements()[0].cell, [0, 0, 0]);

    let blank = multiblock::assemble(&mut builder, &[[" "]], &mapping).unwrap();
    assert!(blank.placements().is_empty());

    let unmapped = multiblock::assemble(&mut builder, &[["Y"]], &mapping).unwrap();
    assert!(unmapped.placements().is_empty());
}

#[test]
fn multiblock_renders_with_framed_camera() {
    init_logger();
    let mut engine = engine();
    let mapping = HashMap::from([('S', "stone".to_string()), ('G', "grass_block".to_string())]);
    let pattern = [vec!["GGG", "GGG", "GGG"], vec!["SSS", "SSS", "SSS"]];

    let image = engine.render_multiblock(&pattern, &mapping).unwrap();
    assert_eq!(image.get_pixel(32, 32).0[3], 255);
    // Framed with a margin on every side.
    assert_eq!(image.get_pixel(0, 32).0[3], 0);
    assert_eq!(image.get_pixel(63, 32).0[3], 0);
    assert!(engine.camera().projection().is_perspective());
}

#[test]
fn directory_pack_renders_and_saves_png() {
    init_logger();
    let pack = TempDir::new("pack");
    pack.write(
        "assets/minecraft/models/block/cube_all.json",
        r##"{
            "elements": [{
                "from": [0, 0, 0], "to": [16, 16, 16],
                "faces": {
                    "up":    { "texture": "#all", "cullface": "up" },
                    "down":  { "texture": "#all", "cullface": "down" },
                    "north": { "texture": "#all", "cullface": "north" },
                    "south": { "texture": "#all", "cullface": "south" },
                    "west":  { "texture": "#all", "cullface": "west" },
                    "east":  { "texture": "#all", "cullface": "east" }
                }
            }]
        }"##,
    );
    pack.write(
        "assets/minecraft/models/block/granite.json",
        r#"{ "parent": "block/cube_all", "textures": { "all": "minecraft:block/granite" } }"#,
    );
    let texture_path = pack.join("assets/minecraft/textures/block/granite.png");
    std::fs::create_dir_all(texture_path.parent().unwrap()).unwrap();
    Texture::solid("granite", 16, 16, Color::rgb(0.6, 0.4, 0.3))
        .image()
        .save(&texture_path)
        .unwrap();

    let config = EngineConfig::default().with_size(64, 64);
    let mut engine = Engine::with_config(DirectoryAssets::new(pack.path()), config);
    let image = engine.render_block("granite").unwrap();
    assert_eq!(image.get_pixel(32, 20).0, Color::rgb(0.6, 0.4, 0.3).to_rgba8());

    let out = pack.join("out/granite.png");
    engine.save_png(&out).unwrap();
    let saved = image::open(&out).unwrap().to_rgba8();
    assert_eq!(saved.dimensions(), (64, 64));
    assert_eq!(saved.get_pixel(32, 20), image.get_pixel(32, 20));
}

#[test]
fn scratch_directories_with_the_same_name_do_not_clash() {
    let first = TempDir::new("shared");
    let second = TempDir::new("shared");
    assert_ne!(first.path(), second.path());

    first.write("a.txt", "first");
    second.write("a.txt", "second");
    assert_eq!(std::fs::read_to_string(first.join("a.txt")).unwrap(), "first");

    let kept = second.path().to_path_buf();
    drop(second);
    assert!(!kept.exists());
    assert!(first.path().is_dir());
}
