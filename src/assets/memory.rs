//! Assets held in memory, for tests, benches and embedding.

use std::collections::HashMap;

use super::{flatten_model, model_candidates, normalize_id, AssetProvider};
use crate::error::AssetError;
use crate::model::ModelDefinition;
use crate::texture::Texture;

/// Raw (unmerged) models, textures and tags keyed by normalized id.
///
/// ```ignore
/// let assets = InMemoryAssets::new()
///     .with_model("block/stone", ModelDefinition::new().with_parent("block/cube_all"))
///     .with_texture("block/stone", Texture::solid("stone", 16, 16, Color::gray(0.5)));
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryAssets {
    models: HashMap<String, ModelDefinition>,
    textures: HashMap<String, Texture>,
    tags: HashMap<String, Vec<String>>,
}

impl InMemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, id: &str, model: ModelDefinition) -> Self {
        self.insert_model(id, model);
        self
    }

    pub fn with_texture(mut self, id: &str, texture: Texture) -> Self {
        self.insert_texture(id, texture);
        self
    }

    pub fn with_tag<I, S>(mut self, tag: &str, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags
            .insert(normalize_id(tag.trim_start_matches('#')), members.into_iter().map(Into::into).collect());
        self
    }

    pub fn insert_model(&mut self, id: &str, model: ModelDefinition) {
        self.models.insert(normalize_id(id), model);
    }

    pub fn insert_texture(&mut self, id: &str, texture: Texture) {
        self.textures.insert(normalize_id(id), texture);
    }

    fn raw_model(&self, id: &str) -> Result<ModelDefinition, AssetError> {
        model_candidates(id)
            .iter()
            .find_map(|candidate| self.models.get(candidate))
            .cloned()
            .ok_or_else(|| AssetError::ModelNotFound(id.to_string()))
    }
}

impl AssetProvider for InMemoryAssets {
    fn model(&self, id: &str) -> Result<ModelDefinition, AssetError> {
        flatten_model(id, |id| self.raw_model(id))
    }

    fn texture(&self, id: &str) -> Result<Texture, AssetError> {
        self.textures
            .get(&normalize_id(id))
            .cloned()
            .ok_or_else(|| AssetError::TextureNotFound(id.to_string()))
    }

    fn resolve_tag(&self, tag: &str) -> Vec<String> {
        self.tags
            .get(&normalize_id(tag.trim_start_matches('#')))
            .cloned()
            .unwrap_or_default()
    }
}
