//! Block model definitions as they appear in a resource pack.
//!
//! ```json
//! {
//!   "parent": "block/cube",
//!   "textures": { "all": "minecraft:block/stone", "particle": "#all" },
//!   "elements": [
//!     { "from": [0, 0, 0], "to": [16, 16, 16],
//!       "faces": { "up": { "texture": "#all", "cullface": "up" } } }
//!   ]
//! }
//! ```
//!
//! Coordinates are in model units: one block spans 0..16 on every axis.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use super::direction::Direction;

fn default_true() -> bool {
    true
}

fn block_center() -> [f32; 3] {
    [8.0, 8.0, 8.0]
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ModelDefinition {
    #[serde(default)]
    pub parent: Option<String>,
    /// Texture variables: name to texture id, or to another `#variable`.
    #[serde(default)]
    pub textures: HashMap<String, String>,
    /// `None` when the model itself declares no elements (they may be inherited).
    #[serde(default)]
    pub elements: Option<Vec<Element>>,
}

impl ModelDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_texture(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.textures.insert(name.into(), value.into());
        self
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.elements.get_or_insert_with(Vec::new).push(element);
        self
    }

    /// The model's elements, empty when none are declared.
    pub fn elements(&self) -> &[Element] {
        self.elements.as_deref().unwrap_or(&[])
    }

    /// Merges `self` (the child) over `parent`.
    ///
    /// Elements come from the child when it declares any, otherwise from the
    /// parent. Texture variables are the parent's, overridden by the child's.
    /// The result takes the parent's own parent so the chain can continue.
    pub fn inherit_from(self, parent: ModelDefinition) -> ModelDefinition {
        let mut textures = parent.textures;
        textures.extend(self.textures);
        ModelDefinition {
            parent: parent.parent,
            textures,
            elements: self.elements.or(parent.elements),
        }
    }
}

/// An axis-aligned cuboid with up to six textured faces.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Element {
    pub from: [f32; 3],
    pub to: [f32; 3],
    #[serde(default)]
    pub rotation: Option<ElementRotation>,
    /// When false, every face gets full brightness.
    #[serde(default = "default_true")]
    pub shade: bool,
    #[serde(default)]
    pub faces: BTreeMap<Direction, Face>,
}

impl Element {
    /// An element with no faces.
    pub fn new(from: [f32; 3], to: [f32; 3]) -> Self {
        Self {
            from,
            to,
            rotation: None,
            shade: true,
            faces: BTreeMap::new(),
        }
    }

    /// An element with all six faces using `texture`, each culled on its own side.
    pub fn cube(from: [f32; 3], to: [f32; 3], texture: &str) -> Self {
        Direction::ALL.iter().fold(Self::new(from, to), |element, &dir| {
            element.with_face(dir, Face::new(texture).with_cullface(dir))
        })
    }

    pub fn with_face(mut self, direction: Direction, face: Face) -> Self {
        self.faces.insert(direction, face);
        self
    }

    pub fn with_rotation(mut self, rotation: ElementRotation) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn with_shade(mut self, shade: bool) -> Self {
        self.shade = shade;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Rotation of an element about a pivot, in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct ElementRotation {
    #[serde(default = "block_center")]
    pub origin: [f32; 3],
    pub axis: Axis,
    pub angle: f32,
    /// Stretch the faces so the rotated element still spans the block.
    #[serde(default)]
    pub rescale: bool,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Face {
    /// `[u1, v1, u2, v2]` in 0..16 texture pixels; derived from the element
    /// bounds when absent.
    #[serde(default)]
    pub uv: Option<[f32; 4]>,
    /// A texture id or a `#variable` reference.
    pub texture: String,
    #[serde(default)]
    pub cullface: Option<Direction>,
    /// Clockwise UV rotation in degrees: 0, 90, 180 or 270.
    #[serde(default)]
    pub rotation: u32,
    #[serde(default, rename = "tintindex")]
    pub tint_index: Option<i32>,
}

impl Face {
    pub fn new(texture: impl Into<String>) -> Self {
        Self {
            uv: None,
            texture: texture.into(),
            cullface: None,
            rotation: 0,
            tint_index: None,
        }
    }

    pub fn with_uv(mut self, uv: [f32; 4]) -> Self {
        self.uv = Some(uv);
        self
    }

    pub fn with_cullface(mut self, cullface: Direction) -> Self {
        self.cullface = Some(cullface);
        self
    }

    pub fn with_rotation(mut self, rotation: u32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_tint_index(mut self, tint_index: i32) -> Self {
        self.tint_index = Some(tint_index);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_resource_pack_json() {
        let model = ModelDefinition::from_json(
            r##"{
                "parent": "block/block",
                "textures": { "all": "minecraft:block/stone", "particle": "#all" },
                "elements": [{
                    "from": [0, 0, 0], "to": [16, 8, 16],
                    "rotation": { "origin": [8, 8, 8], "axis": "y", "angle": 45, "rescale": true },
                    "shade": false,
                    "faces": {
                        "bottom": { "texture": "#all", "cullface": "down" },
                        "up": { "uv": [0, 0, 16, 16], "texture": "#all", "rotation": 90, "tintindex": 0 }
                    }
                }]
            }"##,
        )
        .unwrap();

        assert_eq!(model.parent.as_deref(), Some("block/block"));
        assert_eq!(model.textures["particle"], "#all");
        let element = &model.elements()[0];
        assert!(!element.shade);
        assert_eq!(element.rotation.unwrap().axis, Axis::Y);
        assert!(element.rotation.unwrap().rescale);
        assert_eq!(element.faces[&Direction::Down].cullface, Some(Direction::Down));
        let up = &element.faces[&Direction::Up];
        assert_eq!(up.rotation, 90);
        assert_eq!(up.tint_index, Some(0));
        assert_eq!(up.uv, Some([0.0, 0.0, 16.0, 16.0]));
    }

    #[test]
    fn model_without_elements_is_empty() {
        let model = ModelDefinition::from_json(r#"{ "parent": "item/generated" }"#).unwrap();
        assert!(model.elements.is_none());
        assert!(model.elements().is_empty());
    }

    #[test]
    fn child_overrides_parent_textures_and_inherits_elements() {
        let parent = ModelDefinition::new()
            .with_parent("block/block")
            .with_texture("particle", "#all")
            .with_texture("all", "minecraft:block/dirt")
            .with_element(Element::cube([0.0; 3], [16.0; 3], "#all"));
        let child = ModelDefinition::new().with_texture("all", "minecraft:block/stone");

        let merged = child.inherit_from(parent);
        assert_eq!(merged.parent.as_deref(), Some("block/block"));
        assert_eq!(merged.textures["all"], "minecraft:block/stone");
        assert_eq!(merged.textures["particle"], "#all");
        assert_eq!(merged.elements().len(), 1);
        assert_eq!(merged.elements()[0].faces.len(), 6);
    }
}
