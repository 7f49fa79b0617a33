//! Assembles multi-cell structures from a character pattern.
//!
//! A pattern is a list of layers, each a list of equal-length rows, each row a
//! string with one character per cell. The first layer is the top of the
//! structure. Every cell whose character maps to a block id gets that block's
//! scene grafted under one composite root, translated so the structure is
//! centred on the origin.

use std::collections::HashMap;

use crate::assets::AssetProvider;
use crate::camera::Camera;
use crate::error::MultiblockError;
use crate::math::Vec3;
use crate::model::ModelBuilder;
use crate::scene::{NodeId, Scene};

/// Edge length of one block in model units.
pub const BLOCK_SIZE: f32 = 16.0;

/// One placed block.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    /// Grid cell as `[x, y, z]`, with `y` counted from the bottom layer.
    pub cell: [usize; 3],
    pub block: String,
    /// The grafted block root inside [`Multiblock::scene`].
    pub node: NodeId,
}

#[derive(Clone, Debug)]
pub struct Multiblock {
    scene: Scene,
    placements: Vec<Placement>,
    /// Cells along `[x, y, z]`.
    size: [usize; 3],
}

impl Multiblock {
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn into_scene(self) -> Scene {
        self.scene
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn size(&self) -> [usize; 3] {
        self.size
    }

    /// Largest of the three pattern dimensions.
    pub fn max_dimension(&self) -> usize {
        self.size.iter().copied().max().unwrap_or(0)
    }

    /// Points a 45° perspective camera at the structure from the south-east,
    /// far enough that the whole pattern stays in view.
    pub fn frame_camera(&self, camera: &mut Camera, aspect_ratio: f32) {
        let extent = self.max_dimension().max(1) as f32 * BLOCK_SIZE;
        let distance = extent * 1.5;
        camera.set_perspective(45f32.to_radians(), aspect_ratio, extent * 0.05, distance * 4.0);
        camera.look_at(Vec3::new(distance, distance, distance), Vec3::ZERO, Vec3::UNIT_Y);
    }
}

fn is_air(block: &str) -> bool {
    block.eq_ignore_ascii_case("air") || block.eq_ignore_ascii_case("minecraft:air")
}

/// Pattern dimensions `[x, y, z]`, rejecting ragged layers or rows.
fn dimensions<L, S>(pattern: &[L]) -> Result<[usize; 3], MultiblockError>
where
    L: AsRef<[S]>,
    S: AsRef<str>,
{
    let Some(first) = pattern.first() else {
        return Ok([0, 0, 0]);
    };
    let depth = first.as_ref().len();
    let width = first.as_ref().first().map_or(0, |row| row.as_ref().chars().count());

    for (layer, rows) in pattern.iter().enumerate() {
        let rows = rows.as_ref();
        if rows.len() != depth {
            return Err(MultiblockError::RaggedPattern {
                layer,
                row: rows.len().min(depth),
                found: rows.len(),
                expected: depth,
            });
        }
        for (row, line) in rows.iter().enumerate() {
            let found = line.as_ref().chars().count();
            if found != width {
                return Err(MultiblockError::RaggedPattern {
                    layer,
                    row,
                    found,
                    expected: width,
                });
            }
        }
    }
    Ok([width, pattern.len(), depth])
}

/// Builds the structure described by `pattern`, looking each character up in
/// `mapping`.
///
/// Spaces, unmapped characters and characters mapped to air are left empty.
pub fn assemble<A, L, S>(
    builder: &mut ModelBuilder<A>,
    pattern: &[L],
    mapping: &HashMap<char, String>,
) -> Result<Multiblock, MultiblockError>
where
    A: AssetProvider,
    L: AsRef<[S]>,
    S: AsRef<str>,
{
    let size = dimensions(pattern)?;
    let [nx, ny, nz] = size;
    log::debug!("assembling multiblock {nx}x{ny}x{nz}");

    let origin = Vec3::new(nx as f32, ny as f32, nz as f32) * (-BLOCK_SIZE / 2.0);
    let mut scene = Scene::new();
    let mut placements = Vec::new();

    for y in 0..ny {
        let layer = pattern[ny - 1 - y].as_ref();
        for (z, line) in layer.iter().enumerate() {
            for (x, symbol) in line.as_ref().chars().enumerate() {
                if symbol == ' ' {
                    continue;
                }
                let Some(block) = mapping.get(&symbol).filter(|block| !is_air(block)) else {
                    continue;
                };

                let block_scene = builder.build_model(block)?;
                let node = scene.graft(scene.root(), block_scene)?;
                let offset = Vec3::new(x as f32, y as f32, z as f32) * BLOCK_SIZE;
                scene.transform_mut(node)?.set_translation(origin + offset);
                placements.push(Placement {
                    cell: [x, y, z],
                    block: block.clone(),
                    node,
                });
            }
        }
    }

    log::debug!("placed {} blocks", placements.len());
    Ok(Multiblock {
        scene,
        placements,
        size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::InMemoryAssets;
    use crate::math::Color;
    use crate::model::{Element, ModelDefinition};
    use crate::texture::Texture;
    use approx::assert_relative_eq;

    fn builder() -> ModelBuilder<InMemoryAssets> {
        let cube = ModelDefinition::new()
            .with_texture("all", "block/stone")
            .with_element(Element::cube([0.0; 3], [16.0; 3], "#all"));
        let assets = InMemoryAssets::new()
            .with_model("block/stone", cube.clone())
            .with_model("block/dirt", cube)
            .with_texture("block/stone", Texture::solid("stone", 16, 16, Color::gray(0.5)));
        ModelBuilder::new(assets)
    }

    fn mapping(pairs: &[(char, &str)]) -> HashMap<char, String> {
        pairs.iter().map(|&(c, id)| (c, id.to_string())).collect()
    }

    #[test]
    fn single_cell_is_centred_on_origin() {
        let mut builder = builder();
        let multiblock = assemble(&mut builder, &[["X"]], &mapping(&[('X', "stone")])).unwrap();

        assert_eq!(multiblock.size(), [1, 1, 1]);
        assert_eq!(multiblock.placements().len(), 1);
        let placement = &multiblock.placements()[0];
        assert_eq!(placement.cell, [0, 0, 0]);
        let world = multiblock.scene().world_transform(placement.node).unwrap();
        assert_relative_eq!(world.translation_part(), Vec3::new(-8.0, -8.0, -8.0));
        assert_eq!(multiblock.scene().geometry_count(), 6);
    }

    #[test]
    fn blank_unmapped_and_air_cells_are_skipped() {
        let mut builder = builder();
        let map = mapping(&[('A', "AIR"), ('B', "minecraft:Air")]);
        for pattern in [[" "], ["?"], ["A"], ["B"]] {
            let multiblock = assemble(&mut builder, &[pattern], &map).unwrap();
            assert!(multiblock.placements().is_empty());
            assert_eq!(multiblock.scene().geometry_count(), 0);
        }
    }

    #[test]
    fn first_layer_is_on_top() {
        let mut builder = builder();
        let pattern = [vec!["S "], vec![" D"]];
        let map = mapping(&[('S', "stone"), ('D', "dirt")]);
        let multiblock = assemble(&mut builder, &pattern, &map).unwrap();

        assert_eq!(multiblock.size(), [2, 2, 1]);
        let stone = multiblock.placements().iter().find(|p| p.block == "stone").unwrap();
        let dirt = multiblock.placements().iter().find(|p| p.block == "dirt").unwrap();
        assert_eq!(stone.cell, [0, 1, 0]);
        assert_eq!(dirt.cell, [1, 0, 0]);

        let scene = multiblock.scene();
        assert_relative_eq!(
            scene.world_transform(stone.node).unwrap().translation_part(),
            Vec3::new(-16.0, 0.0, -8.0)
        );
        assert_relative_eq!(
            scene.world_transform(dirt.node).unwrap().translation_part(),
            Vec3::new(0.0, -16.0, -8.0)
        );
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let mut builder = builder();
        let pattern = [vec!["XX", "X"]];
        let result = assemble(&mut builder, &pattern, &mapping(&[('X', "stone")]));
        assert!(matches!(
            result,
            Err(MultiblockError::RaggedPattern { layer: 0, row: 1, found: 1, expected: 2 })
        ));
    }

    #[test]
    fn missing_model_propagates() {
        let mut builder = builder();
        let result = assemble(&mut builder, &[["X"]], &mapping(&[('X', "gold_block")]));
        assert!(matches!(result, Err(MultiblockError::Asset(_))));
    }

    #[test]
    fn camera_distance_grows_with_size() {
        let mut builder = builder();
        let map = mapping(&[('X', "stone")]);
        let small = assemble(&mut builder, &[["X"]], &map).unwrap();
        let large = assemble(&mut builder, &[["XXXX"]], &map).unwrap();

        let mut camera = Camera::default();
        small.frame_camera(&mut camera, 1.0);
        let near_eye = camera.eye();
        large.frame_camera(&mut camera, 1.0);
        assert!(camera.eye().magnitude() > near_eye.magnitude() * 3.0);
        assert!(camera.projection().is_perspective());
    }
}
