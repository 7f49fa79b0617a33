//! A CPU rasterizer for cuboid block models.
//!
//! This crate turns block model definitions into a scene graph, renders that
//! scene in software to an RGBA image, and exports it as Wavefront OBJ or
//! binary glTF. Multiblock structures are assembled from a character pattern.
//!
//! # Quick Start
//!
//! ```ignore
//! use blockraster::prelude::*;
//!
//! let assets = DirectoryAssets::new("resourcepack");
//! let mut engine = Engine::new(assets);
//! let icon = engine.render_block("minecraft:furnace")?;
//! icon.save("furnace.png")?;
//! ```

// Public API - exposed to library consumers
pub mod animation;
pub mod assets;
pub mod camera;
pub mod engine;
pub mod error;
pub mod export;
pub mod light;
pub mod material;
pub mod math;
pub mod model;
pub mod multiblock;
pub mod projection;
pub mod render;
pub mod scene;
pub mod texture;
pub mod transform;

// Internal modules - used within the crate only
pub(crate) mod clipper;

// Re-export commonly needed types at crate root for convenience
pub use engine::{Engine, EngineConfig};
pub use error::{Error, Result};
pub use projection::Projection;
pub use transform::Transform;

/// Prelude module for convenient imports.
///
/// # Example
/// ```ignore
/// use blockraster::prelude::*;
/// ```
pub mod prelude {
    // Assets
    pub use crate::assets::{AssetProvider, DirectoryAssets, InMemoryAssets};

    // Engine
    pub use crate::engine::{Engine, EngineConfig};

    // Model
    pub use crate::model::{BuilderOptions, Direction, Element, Face, ModelBuilder, ModelDefinition};
    pub use crate::multiblock::{assemble, Multiblock};

    // Scene
    pub use crate::scene::{Geometry, Mesh, NodeId, Scene, Vertex};
    pub use crate::transform::Transform;

    // Camera, lights, materials
    pub use crate::camera::Camera;
    pub use crate::light::Light;
    pub use crate::material::{BlendMode, CullMode, Material};
    pub use crate::projection::Projection;
    pub use crate::texture::Texture;

    // Math
    pub use crate::math::{Color, Mat4, Vec2, Vec3, Vec4};

    // Rendering & export
    pub use crate::export::{GltfExporter, ObjExporter, ObjOptions};
    pub use crate::render::Renderer;

    // Errors
    pub use crate::error::{Error, Result};
}
