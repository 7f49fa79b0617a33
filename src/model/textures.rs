//! Texture variable resolution.
//!
//! Faces name their texture indirectly (`"#side"`); the model's texture map
//! binds variables to ids or to further variables:
//!
//! ```text
//! #north -> #side -> minecraft:block/furnace_side
//! ```

use std::collections::{HashMap, HashSet};

use crate::error::AssetError;

/// Follows `reference` through `textures` to a concrete texture id.
///
/// A `#name` reference must be bound in the map. A bare reference is looked
/// up as a variable first and otherwise taken as the texture id itself.
pub fn resolve_texture(textures: &HashMap<String, String>, reference: &str) -> Result<String, AssetError> {
    let mut visited = HashSet::new();
    let mut current = reference;

    loop {
        let (name, is_variable) = match current.strip_prefix('#') {
            Some(name) => (name, true),
            None => (current, false),
        };
        if !visited.insert(name) {
            return Err(AssetError::CyclicTexture(reference.to_string()));
        }
        match textures.get(name) {
            Some(next) => current = next.as_str(),
            None if is_variable => {
                return Err(AssetError::UnresolvedTexture {
                    reference: reference.to_string(),
                    missing: name.to_string(),
                })
            }
            None => return Ok(name.to_string()),
        }
    }
}
