//! This module contains all errors that can be returned by functions in this crate.

use std::path::PathBuf;

use thiserror::Error;

use crate::scene::NodeId;

/// Failure to turn an identifier into asset data.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The provider has no model definition for this identifier.
    #[error("model not found: {0}")]
    ModelNotFound(String),
    /// The provider has no texture for this identifier.
    #[error("texture not found: {0}")]
    TextureNotFound(String),
    /// A tag reference resolved to an empty list.
    #[error("tag {0} resolved to no entries")]
    EmptyTag(String),
    /// A `#name` chain ended in a variable the texture map does not define.
    #[error("texture reference {reference} is not defined (missing variable {missing})")]
    UnresolvedTexture { reference: String, missing: String },
    /// A `#name` chain refers back to a variable already visited.
    #[error("texture reference {0} is cyclic")]
    CyclicTexture(String),
    /// A model's parent chain loops.
    #[error("model {0} inherits from itself")]
    CyclicParent(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Misuse of the scene graph or malformed mesh data.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
    #[error("index count {0} is not a multiple of three")]
    IncompleteTriangle(usize),
    #[error("node {0:?} already has a parent")]
    AlreadyAttached(NodeId),
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },
    #[error("node {0:?} does not belong to this scene")]
    UnknownNode(NodeId),
}

/// Failure while writing a rendered image or an interchange file.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("failed to serialize scene description: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Errors returned by the multiblock assembler.
#[derive(Debug, Error)]
pub enum MultiblockError {
    /// Rows of a layer, or layers of a pattern, differ in size.
    #[error("layer {layer} row {row} has length {found}, expected {expected}")]
    RaggedPattern {
        layer: usize,
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Crate-level error for the [`Engine`](crate::engine::Engine) facade.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Multiblock(#[from] MultiblockError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
