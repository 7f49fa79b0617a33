//! Block model definitions and their conversion to scenes.
//!
//! A model is a list of axis-aligned boxes (elements) measured in 1/16 block
//! units, each with up to six textured faces. [`ModelBuilder`] resolves the
//! texture variables, builds one quad per face and shares materials between
//! faces that use the same texture.

mod builder;
mod definition;
mod direction;
pub mod face;
mod textures;

pub use builder::{BuilderOptions, ModelBuilder};
pub use definition::{Axis, Element, ElementRotation, Face, ModelDefinition};
pub use direction::Direction;
pub use textures::resolve_texture;
