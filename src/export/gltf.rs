//! Binary glTF 2.0 (GLB) writer.
//!
//! Unlike the OBJ writer this keeps the scene hierarchy: every reachable scene
//! node becomes a glTF node with its local matrix, and the geometries of a node
//! become the primitives of that node's mesh.
//!
//! Conventions:
//! - right-handed, +Y up, counter-clockwise front faces (same as model space)
//! - a wrapping root node scales by [`UNIT_SCALE`], so one block is one metre
//! - texture coordinates are flipped to glTF's top-left origin
//! - textures are embedded PNGs sampled with nearest filtering
//!
//! Animated materials export every frame as its own texture. The material's
//! `extras.animation` object lists the frame textures and points at two scalar
//! accessors holding the frame start times and the frame numbers.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use image::ImageFormat;
use serde::Serialize;
use serde_json::{json, Value};

use super::{material_key, write_atomic};
use crate::error::ExportError;
use crate::material::{BlendMode, CullMode, Material};
use crate::scene::{Geometry, NodeId, Scene};
use crate::texture::Texture;

/// Scale applied by the root node: model units are 1/16 of a block.
pub const UNIT_SCALE: f32 = 1.0 / 16.0;

const GLB_MAGIC: u32 = 0x4654_6C67;
const GLB_VERSION: u32 = 2;
const CHUNK_JSON: u32 = 0x4E4F_534A;
const CHUNK_BIN: u32 = 0x004E_4942;

const FLOAT: u32 = 5126;
const UNSIGNED_INT: u32 = 5125;
const ARRAY_BUFFER: u32 = 34962;
const ELEMENT_ARRAY_BUFFER: u32 = 34963;
const NEAREST: u32 = 9728;
const CLAMP_TO_EDGE: u32 = 33071;
const TRIANGLES: u32 = 4;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct GlbHeader {
    magic: u32,
    version: u32,
    length: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct ChunkHeader {
    length: u32,
    kind: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Root {
    asset: Asset,
    scene: usize,
    scenes: Vec<SceneDef>,
    nodes: Vec<NodeDef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    meshes: Vec<MeshDef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    materials: Vec<MaterialDef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    textures: Vec<TextureDef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<ImageDef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    samplers: Vec<SamplerDef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    accessors: Vec<AccessorDef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    buffer_views: Vec<BufferViewDef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    buffers: Vec<BufferDef>,
}

#[derive(Serialize)]
struct Asset {
    version: &'static str,
    generator: &'static str,
}

#[derive(Serialize)]
struct SceneDef {
    nodes: Vec<usize>,
}

#[derive(Serialize, Default)]
struct NodeDef {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    matrix: Option<[f32; 16]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scale: Option<[f32; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mesh: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<usize>,
}

#[derive(Serialize)]
struct MeshDef {
    primitives: Vec<PrimitiveDef>,
}

#[derive(Serialize)]
struct PrimitiveDef {
    attributes: HashMap<&'static str, usize>,
    indices: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    material: Option<usize>,
    mode: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MaterialDef {
    name: String,
    pbr_metallic_roughness: PbrDef,
    alpha_mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    alpha_cutoff: Option<f32>,
    double_sided: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    extras: Option<Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PbrDef {
    base_color_factor: [f32; 4],
    #[serde(skip_serializing_if = "Option::is_none")]
    base_color_texture: Option<TextureRef>,
    metallic_factor: f32,
    roughness_factor: f32,
}

#[derive(Serialize)]
struct TextureRef {
    index: usize,
}

#[derive(Serialize)]
struct TextureDef {
    sampler: usize,
    source: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageDef {
    name: String,
    buffer_view: usize,
    mime_type: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SamplerDef {
    mag_filter: u32,
    min_filter: u32,
    wrap_s: u32,
    wrap_t: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AccessorDef {
    buffer_view: usize,
    component_type: u32,
    count: usize,
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    min: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max: Option<Vec<f32>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BufferViewDef {
    buffer: usize,
    byte_offset: usize,
    byte_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BufferDef {
    byte_length: usize,
}

/// What an export wrote.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GltfSummary {
    /// glTF nodes, including the scaling root.
    pub nodes: usize,
    pub meshes: usize,
    pub primitives: usize,
    pub materials: usize,
    pub textures: usize,
    pub animated_materials: usize,
    pub bytes: usize,
}

/// Accumulates the JSON document and the binary chunk while walking a scene.
struct GlbBuilder {
    root: Root,
    bin: Vec<u8>,
    materials: HashMap<usize, usize>,
    textures: HashMap<usize, usize>,
    summary: GltfSummary,
}

impl GlbBuilder {
    fn new() -> Self {
        Self {
            root: Root {
                asset: Asset {
                    version: "2.0",
                    generator: concat!("blockraster ", env!("CARGO_PKG_VERSION")),
                },
                scene: 0,
                scenes: Vec::new(),
                nodes: Vec::new(),
                meshes: Vec::new(),
                materials: Vec::new(),
                textures: Vec::new(),
                images: Vec::new(),
                samplers: vec![SamplerDef {
                    mag_filter: NEAREST,
                    min_filter: NEAREST,
                    wrap_s: CLAMP_TO_EDGE,
                    wrap_t: CLAMP_TO_EDGE,
                }],
                accessors: Vec::new(),
                buffer_views: Vec::new(),
                buffers: Vec::new(),
            },
            bin: Vec::new(),
            materials: HashMap::new(),
            textures: HashMap::new(),
            summary: GltfSummary::default(),
        }
    }

    /// Appends `bytes` as a new buffer view, 4-byte aligned.
    fn push_view(&mut self, bytes: &[u8], target: Option<u32>) -> usize {
        while self.bin.len() % 4 != 0 {
            self.bin.push(0);
        }
        self.root.buffer_views.push(BufferViewDef {
            buffer: 0,
            byte_offset: self.bin.len(),
            byte_length: bytes.len(),
            target,
        });
        self.bin.extend_from_slice(bytes);
        self.root.buffer_views.len() - 1
    }

    fn push_accessor<T: Pod>(
        &mut self,
        data: &[T],
        component_type: u32,
        kind: &'static str,
        target: Option<u32>,
        bounds: Option<(Vec<f32>, Vec<f32>)>,
    ) -> usize {
        let buffer_view = self.push_view(bytemuck::cast_slice(data), target);
        let (min, max) = bounds.unzip();
        self.root.accessors.push(AccessorDef {
            buffer_view,
            component_type,
            count: data.len(),
            kind,
            min,
            max,
        });
        self.root.accessors.len() - 1
    }

    fn texture(&mut self, texture: &Arc<Texture>) -> Result<usize, ExportError> {
        let key = Arc::as_ptr(texture) as usize;
        if let Some(&index) = self.textures.get(&key) {
            return Ok(index);
        }

        let mut png = Cursor::new(Vec::new());
        texture.image().write_to(&mut png, ImageFormat::Png)?;
        let buffer_view = self.push_view(png.get_ref(), None);
        self.root.images.push(ImageDef {
            name: texture.name().to_string(),
            buffer_view,
            mime_type: "image/png",
        });
        self.root.textures.push(TextureDef {
            sampler: 0,
            source: self.root.images.len() - 1,
        });

        let index = self.root.textures.len() - 1;
        self.textures.insert(key, index);
        Ok(index)
    }

    fn animation_extras(&mut self, material: &Material) -> Result<Option<Value>, ExportError> {
        let Some(animation) = material.animation() else {
            return Ok(None);
        };

        let frames = animation
            .frames()
            .iter()
            .map(|frame| self.texture(frame))
            .collect::<Result<Vec<_>, _>>()?;
        let duration = animation.frame_duration();
        let times: Vec<f32> = (0..frames.len()).map(|i| i as f32 * duration).collect();
        let numbers: Vec<f32> = (0..frames.len()).map(|i| i as f32).collect();
        let time_bounds = times.last().map(|&last| (vec![0.0], vec![last]));
        let number_bounds = numbers.last().map(|&last| (vec![0.0], vec![last]));
        let time_accessor = self.push_accessor(&times, FLOAT, "SCALAR", None, time_bounds);
        let frame_accessor = self.push_accessor(&numbers, FLOAT, "SCALAR", None, number_bounds);

        self.summary.animated_materials += 1;
        Ok(Some(json!({
            "animation": {
                "frames": frames,
                "frameRate": animation.frame_rate(),
                "loop": animation.is_looping(),
                "timeAccessor": time_accessor,
                "frameAccessor": frame_accessor,
            }
        })))
    }

    fn material(&mut self, material: &Arc<Material>) -> Result<usize, ExportError> {
        let key = material_key(material);
        if let Some(&index) = self.materials.get(&key) {
            return Ok(index);
        }

        let base_color_texture = match material.diffuse_map() {
            Some(texture) => Some(TextureRef {
                index: self.texture(texture)?,
            }),
            None => None,
        };
        let extras = self.animation_extras(material)?;
        let (alpha_mode, alpha_cutoff) = match (material.alpha_cutoff(), material.blend()) {
            (Some(cutoff), _) => ("MASK", Some(cutoff)),
            (None, BlendMode::AlphaBlend) => ("BLEND", None),
            (None, BlendMode::Opaque) => ("OPAQUE", None),
        };
        let diffuse = material.diffuse();

        self.root.materials.push(MaterialDef {
            name: material.name().to_string(),
            pbr_metallic_roughness: PbrDef {
                base_color_factor: [diffuse.r, diffuse.g, diffuse.b, diffuse.a],
                base_color_texture,
                metallic_factor: 0.0,
                roughness_factor: 1.0,
            },
            alpha_mode,
            alpha_cutoff,
            double_sided: material.cull() == CullMode::None,
            extras,
        });

        let index = self.root.materials.len() - 1;
        self.materials.insert(key, index);
        Ok(index)
    }

    fn primitive(&mut self, geometry: &Geometry) -> Result<Option<PrimitiveDef>, ExportError> {
        let mesh = geometry.mesh();
        if mesh.is_empty() {
            return Ok(None);
        }

        let transform = geometry.transform();
        let normal_matrix = transform.normal_matrix();
        let vertices = mesh.vertices();
        let positions: Vec<[f32; 3]> = vertices
            .iter()
            .map(|v| transform.transform_point(v.position).to_array())
            .collect();
        let normals: Vec<[f32; 3]> = vertices
            .iter()
            .map(|v| normal_matrix.transform_direction(v.normal).normalize().to_array())
            .collect();
        let tex_coords: Vec<[f32; 2]> = vertices
            .iter()
            .map(|v| [v.tex_coord.x, 1.0 - v.tex_coord.y])
            .collect();

        let mut min = [f32::INFINITY; 3];
        let mut max = [f32::NEG_INFINITY; 3];
        for p in &positions {
            for axis in 0..3 {
                min[axis] = min[axis].min(p[axis]);
                max[axis] = max[axis].max(p[axis]);
            }
        }

        let position = self.push_accessor(
            &positions,
            FLOAT,
            "VEC3",
            Some(ARRAY_BUFFER),
            Some((min.to_vec(), max.to_vec())),
        );
        let normal = self.push_accessor(&normals, FLOAT, "VEC3", Some(ARRAY_BUFFER), None);
        let tex_coord = self.push_accessor(&tex_coords, FLOAT, "VEC2", Some(ARRAY_BUFFER), None);
        let indices = self.push_accessor(mesh.indices(), UNSIGNED_INT, "SCALAR", Some(ELEMENT_ARRAY_BUFFER), None);
        let material = geometry.material().map(|m| self.material(m)).transpose()?;

        self.summary.primitives += 1;
        Ok(Some(PrimitiveDef {
            attributes: HashMap::from([("POSITION", position), ("NORMAL", normal), ("TEXCOORD_0", tex_coord)]),
            indices,
            material,
            mode: TRIANGLES,
        }))
    }

    /// Exports `id` and its subtree, returning the glTF node index.
    fn node(&mut self, scene: &Scene, id: NodeId) -> Result<usize, ExportError> {
        let node = scene.node(id)?;

        let mut primitives = Vec::new();
        for geometry in node.geometries() {
            primitives.extend(self.primitive(geometry)?);
        }
        let mesh = if primitives.is_empty() {
            None
        } else {
            self.root.meshes.push(MeshDef { primitives });
            Some(self.root.meshes.len() - 1)
        };

        let transform = node.transform();
        let index = self.root.nodes.len();
        self.root.nodes.push(NodeDef {
            name: node.name().map(str::to_string),
            matrix: (!transform.is_identity()).then(|| transform.to_matrix().to_cols_array()),
            mesh,
            ..NodeDef::default()
        });

        let children = node
            .children()
            .iter()
            .map(|&child| self.node(scene, child))
            .collect::<Result<Vec<_>, _>>()?;
        self.root.nodes[index].children = children;
        Ok(index)
    }

    fn finish(mut self, scene: &Scene) -> Result<(Vec<u8>, GltfSummary), ExportError> {
        let scene_root = self.node(scene, scene.root())?;
        self.root.nodes.push(NodeDef {
            name: Some("blocks".to_string()),
            scale: Some([UNIT_SCALE; 3]),
            children: vec![scene_root],
            ..NodeDef::default()
        });
        self.root.scenes.push(SceneDef {
            nodes: vec![self.root.nodes.len() - 1],
        });

        while self.bin.len() % 4 != 0 {
            self.bin.push(0);
        }
        if !self.bin.is_empty() {
            self.root.buffers.push(BufferDef {
                byte_length: self.bin.len(),
            });
        }

        let mut json = serde_json::to_vec(&self.root)?;
        while json.len() % 4 != 0 {
            json.push(b' ');
        }

        let bin_chunk = if self.bin.is_empty() { 0 } else { 8 + self.bin.len() };
        let length = 12 + 8 + json.len() + bin_chunk;
        let mut glb = Vec::with_capacity(length);
        glb.extend_from_slice(bytemuck::bytes_of(&GlbHeader {
            magic: GLB_MAGIC,
            version: GLB_VERSION,
            length: length as u32,
        }));
        glb.extend_from_slice(bytemuck::bytes_of(&ChunkHeader {
            length: json.len() as u32,
            kind: CHUNK_JSON,
        }));
        glb.extend_from_slice(&json);
        if !self.bin.is_empty() {
            glb.extend_from_slice(bytemuck::bytes_of(&ChunkHeader {
                length: self.bin.len() as u32,
                kind: CHUNK_BIN,
            }));
            glb.extend_from_slice(&self.bin);
        }

        let mut summary = self.summary;
        summary.nodes = self.root.nodes.len();
        summary.meshes = self.root.meshes.len();
        summary.materials = self.root.materials.len();
        summary.textures = self.root.textures.len();
        summary.bytes = glb.len();
        Ok((glb, summary))
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GltfExporter;

impl GltfExporter {
    pub fn new() -> Self {
        Self
    }

    /// Encodes `scene` as a GLB container in memory.
    pub fn to_glb(&self, scene: &Scene) -> Result<(Vec<u8>, GltfSummary), ExportError> {
        GlbBuilder::new().finish(scene)
    }

    pub fn export(&self, scene: &Scene, path: &Path) -> Result<GltfSummary, ExportError> {
        let (glb, summary) = self.to_glb(scene)?;
        write_atomic(path, &glb)?;
        log::info!(
            "exported {} ({} nodes, {} materials, {} animated, {} bytes)",
            path.display(),
            summary.nodes,
            summary.materials,
            summary.animated_materials,
            summary.bytes
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::AnimatedTexture;
    use crate::math::{Color, Vec2, Vec3};
    use crate::scene::{Mesh, Vertex};

    fn quad(material: Option<Arc<Material>>) -> Geometry {
        let v = |x: f32, y: f32| Vertex::new(Vec3::new(x, y, 0.0), Vec2::new(x, y), Vec3::UNIT_Z, Color::WHITE);
        let mesh = Mesh::quad([v(0.0, 16.0), v(0.0, 0.0), v(16.0, 0.0), v(16.0, 16.0)], [0, 1, 2, 0, 2, 3]);
        Geometry::new(mesh, material)
    }

    fn json_chunk(glb: &[u8]) -> Value {
        let length = u32::from_le_bytes([glb[12], glb[13], glb[14], glb[15]]) as usize;
        serde_json::from_slice(&glb[20..20 + length]).unwrap()
    }

    #[test]
    fn header_and_chunks_are_aligned() {
        let scene = Scene::from_geometries("q", vec![quad(None)]);
        let (glb, summary) = GltfExporter::new().to_glb(&scene).unwrap();

        assert_eq!(&glb[0..4], b"glTF");
        assert_eq!(u32::from_le_bytes([glb[8], glb[9], glb[10], glb[11]]) as usize, glb.len());
        assert_eq!(glb.len() % 4, 0);
        assert_eq!(summary.bytes, glb.len());
        assert_eq!(summary.nodes, 2);
        assert_eq!(summary.primitives, 1);
    }

    #[test]
    fn hierarchy_and_local_matrices_are_kept() {
        let mut scene = Scene::new();
        let block = scene.add_child(scene.root(), "block").unwrap();
        scene.transform_mut(block).unwrap().set_translation(Vec3::new(16.0, 0.0, 0.0));
        scene.add_geometry(block, quad(None)).unwrap();

        let (glb, _) = GltfExporter::new().to_glb(&scene).unwrap();
        let doc = json_chunk(&glb);
        let nodes = doc["nodes"].as_array().unwrap();
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0]["children"], json!([1]));
        assert_eq!(nodes[1]["matrix"][12], json!(16.0));
        assert!(nodes[0].get("matrix").is_none());
        assert_eq!(nodes[2]["scale"], json!([UNIT_SCALE, UNIT_SCALE, UNIT_SCALE]));
        assert_eq!(doc["scenes"][0]["nodes"], json!([2]));
    }

    #[test]
    fn materials_map_alpha_modes_and_are_shared() {
        let texture = Arc::new(Texture::solid("leaves", 2, 2, Color::WHITE));
        let cutout = Arc::new(Material::new("leaves").with_texture(texture.clone()).with_alpha_test(0.1));
        let blended = Arc::new(Material::new("water").with_texture(texture).with_blend(BlendMode::AlphaBlend));
        let scene = Scene::from_geometries(
            "mix",
            vec![quad(Some(cutout.clone())), quad(Some(cutout)), quad(Some(blended))],
        );

        let (glb, summary) = GltfExporter::new().to_glb(&scene).unwrap();
        let doc = json_chunk(&glb);
        assert_eq!(summary.materials, 2);
        assert_eq!(summary.textures, 1);
        assert_eq!(doc["materials"][0]["alphaMode"], "MASK");
        assert_eq!(doc["materials"][1]["alphaMode"], "BLEND");
        assert_eq!(doc["samplers"][0]["magFilter"], NEAREST);
    }

    #[test]
    fn animated_material_lists_frames() {
        let atlas = Texture::new(
            "fire",
            image::RgbaImage::from_fn(4, 12, |_, y| image::Rgba([(y * 20) as u8, 0, 0, 255])),
        );
        let animation = AnimatedTexture::from_atlas(&atlas).unwrap().with_frame_rate(5.0);
        let material = Arc::new(Material::new("fire").with_animation(animation));
        let scene = Scene::from_geometries("fire", vec![quad(Some(material))]);

        let (glb, summary) = GltfExporter::new().to_glb(&scene).unwrap();
        let doc = json_chunk(&glb);
        assert_eq!(summary.animated_materials, 1);
        assert_eq!(summary.textures, 3);

        let extras = &doc["materials"][0]["extras"]["animation"];
        assert_eq!(extras["frames"], json!([0, 1, 2]));
        assert_eq!(extras["frameRate"], json!(5.0));
        let times = extras["timeAccessor"].as_u64().unwrap() as usize;
        assert_eq!(doc["accessors"][times]["count"], json!(3));
        assert_eq!(doc["accessors"][times]["max"], json!([0.4]));
    }
}
