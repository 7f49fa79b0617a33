//! Asset providers.
//!
//! The pipeline never discovers assets itself. It asks an [`AssetProvider`]
//! for three things: a model definition (parents already merged), a decoded
//! texture, and the members of a tag.
//!
//! Identifiers are `namespace:path`; a missing namespace means `minecraft`.

mod directory;
mod memory;

pub use directory::DirectoryAssets;
pub use memory::InMemoryAssets;

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::AssetError;
use crate::model::ModelDefinition;
use crate::texture::Texture;

pub const DEFAULT_NAMESPACE: &str = "minecraft";

pub trait AssetProvider {
    /// The model for `id` with its parent chain merged in.
    fn model(&self, id: &str) -> Result<ModelDefinition, AssetError>;

    fn texture(&self, id: &str) -> Result<Texture, AssetError>;

    /// Concrete identifiers in `tag` (given without the leading `#`).
    /// Empty when the tag is unknown.
    fn resolve_tag(&self, tag: &str) -> Vec<String>;
}

impl<T: AssetProvider + ?Sized> AssetProvider for &T {
    fn model(&self, id: &str) -> Result<ModelDefinition, AssetError> {
        (**self).model(id)
    }

    fn texture(&self, id: &str) -> Result<Texture, AssetError> {
        (**self).texture(id)
    }

    fn resolve_tag(&self, tag: &str) -> Vec<String> {
        (**self).resolve_tag(tag)
    }
}

impl<T: AssetProvider + ?Sized> AssetProvider for Arc<T> {
    fn model(&self, id: &str) -> Result<ModelDefinition, AssetError> {
        (**self).model(id)
    }

    fn texture(&self, id: &str) -> Result<Texture, AssetError> {
        (**self).texture(id)
    }

    fn resolve_tag(&self, tag: &str) -> Vec<String> {
        (**self).resolve_tag(tag)
    }
}

/// Splits `namespace:path`, defaulting the namespace.
pub fn split_id(id: &str) -> (&str, &str) {
    id.split_once(':').unwrap_or((DEFAULT_NAMESPACE, id))
}

/// Adds the default namespace and drops a trailing `[state=...]` selector.
pub fn normalize_id(id: &str) -> String {
    let id = id.split_once('[').map_or(id, |(base, _)| base).trim();
    let (namespace, path) = split_id(id);
    format!("{namespace}:{path}")
}

/// Candidate model ids for a block id: the id itself, then under `block/`.
pub(crate) fn model_candidates(id: &str) -> Vec<String> {
    let id = normalize_id(id);
    let (namespace, path) = split_id(&id);
    let mut candidates = vec![id.clone()];
    if !path.contains('/') {
        candidates.push(format!("{namespace}:block/{path}"));
    }
    candidates
}

/// Parents that are engine built-ins rather than files.
fn is_builtin(id: &str) -> bool {
    split_id(id).1.starts_with("builtin/")
}

/// Loads `id` and merges its parent chain using `load` for each raw model.
pub(crate) fn flatten_model<F>(id: &str, mut load: F) -> Result<ModelDefinition, AssetError>
where
    F: FnMut(&str) -> Result<ModelDefinition, AssetError>,
{
    let mut model = load(id)?;
    let mut seen = HashSet::from([normalize_id(id)]);

    while let Some(parent) = model.parent.clone() {
        let parent_id = normalize_id(&parent);
        if is_builtin(&parent_id) {
            break;
        }
        if !seen.insert(parent_id.clone()) {
            return Err(AssetError::CyclicParent(id.to_string()));
        }
        model = model.inherit_from(load(&parent_id)?);
    }
    Ok(model)
}
