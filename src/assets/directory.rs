//! Assets read from an unpacked resource pack / data pack directory.
//!
//! ```text
//! <root>/assets/<ns>/models/<path>.json
//! <root>/assets/<ns>/textures/<path>.png
//! <root>/data/<ns>/tags/blocks/<path>.json
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::{flatten_model, model_candidates, normalize_id, split_id, AssetProvider};
use crate::error::AssetError;
use crate::model::ModelDefinition;
use crate::texture::Texture;

const TAG_FOLDERS: &[&str] = &["blocks", "block", "items", "item"];

#[derive(Deserialize)]
struct TagFile {
    #[serde(default)]
    values: Vec<TagEntry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TagEntry {
    Id(String),
    Object { id: String },
}

impl TagEntry {
    fn id(&self) -> &str {
        match self {
            TagEntry::Id(id) | TagEntry::Object { id } => id,
        }
    }
}

#[derive(Clone, Debug)]
pub struct DirectoryAssets {
    root: PathBuf,
}

impl DirectoryAssets {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn asset_path(&self, kind: &str, id: &str, extension: &str) -> PathBuf {
        let (namespace, path) = split_id(id);
        self.root
            .join("assets")
            .join(namespace)
            .join(kind)
            .join(format!("{path}.{extension}"))
    }

    fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, AssetError> {
        let text = fs::read_to_string(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| AssetError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn raw_model(&self, id: &str) -> Result<ModelDefinition, AssetError> {
        let path = model_candidates(id)
            .iter()
            .map(|candidate| self.asset_path("models", candidate, "json"))
            .find(|path| path.is_file())
            .ok_or_else(|| AssetError::ModelNotFound(id.to_string()))?;
        log::debug!("loading model {id} from {}", path.display());
        Self::read_json(&path)
    }

    fn tag_path(&self, tag: &str) -> Option<PathBuf> {
        let (namespace, path) = split_id(tag);
        TAG_FOLDERS
            .iter()
            .map(|folder| {
                self.root
                    .join("data")
                    .join(namespace)
                    .join("tags")
                    .join(folder)
                    .join(format!("{path}.json"))
            })
            .find(|p| p.is_file())
    }

    fn expand_tag(&self, tag: &str, visited: &mut HashSet<String>, out: &mut Vec<String>) {
        let tag = normalize_id(tag);
        if !visited.insert(tag.clone()) {
            return;
        }
        let Some(path) = self.tag_path(&tag) else {
            log::debug!("tag {tag} not found");
            return;
        };
        let file: TagFile = match Self::read_json(&path) {
            Ok(file) => file,
            Err(err) => {
                log::warn!("skipping tag {tag}: {err}");
                return;
            }
        };
        for entry in &file.values {
            match entry.id().strip_prefix('#') {
                Some(nested) => self.expand_tag(nested, visited, out),
                None => out.push(normalize_id(entry.id())),
            }
        }
    }
}

impl AssetProvider for DirectoryAssets {
    fn model(&self, id: &str) -> Result<ModelDefinition, AssetError> {
        flatten_model(id, |id| self.raw_model(id))
    }

    fn texture(&self, id: &str) -> Result<Texture, AssetError> {
        let id = normalize_id(id);
        let path = self.asset_path("textures", &id, "png");
        if !path.is_file() {
            return Err(AssetError::TextureNotFound(id));
        }
        Texture::from_file(id, &path)
    }

    fn resolve_tag(&self, tag: &str) -> Vec<String> {
        let mut out = Vec::new();
        self.expand_tag(tag.trim_start_matches('#'), &mut HashSet::new(), &mut out);
        out
    }
}
