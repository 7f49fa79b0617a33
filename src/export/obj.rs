//! Wavefront OBJ + MTL writer.
//!
//! The scene is flattened: every vertex is written in world space, so the
//! node hierarchy is lost. Each geometry becomes one `o` object with its own
//! `usemtl` line and faces. Face indices are 1-based and refer to the same
//! slot in the `v` and `vt` blocks.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::ImageFormat;

use super::{material_key, sanitize_name, write_atomic};
use crate::error::ExportError;
use crate::material::{BlendMode, Material};
use crate::scene::Scene;
use crate::texture::Texture;

const DEFAULT_MATERIAL: &str = "default";

#[derive(Clone, Copy, Debug)]
pub struct ObjOptions {
    /// Write each diffuse texture as a PNG next to the MTL file.
    pub write_textures: bool,
}

impl Default for ObjOptions {
    fn default() -> Self {
        Self { write_textures: true }
    }
}

/// What an export wrote.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjSummary {
    pub objects: usize,
    pub vertices: usize,
    pub triangles: usize,
    /// Distinct materials, not counting `default`.
    pub materials: usize,
    pub files: Vec<PathBuf>,
}

struct MtlEntry<'a> {
    name: String,
    material: &'a Material,
    texture_file: Option<String>,
}

/// The OBJ and MTL text for one scene, plus the textures they reference.
struct ObjDocument<'a> {
    obj: Vec<u8>,
    mtl: Vec<u8>,
    textures: Vec<(String, &'a Arc<Texture>)>,
    summary: ObjSummary,
}

#[derive(Clone, Debug, Default)]
pub struct ObjExporter {
    options: ObjOptions,
}

impl ObjExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ObjOptions) -> Self {
        Self { options }
    }

    /// Writes `path` and its sibling `.mtl` (and textures, if enabled).
    ///
    /// `model_name` prefixes the object names (`<model_name>_<i>`).
    pub fn export(&self, scene: &Scene, path: &Path, model_name: &str) -> Result<ObjSummary, ExportError> {
        let mtl_path = path.with_extension("mtl");
        let mtl_name = mtl_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("{model_name}.mtl"));

        let io_error = |source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        };
        let document = build_document(scene, &mtl_name, model_name).map_err(io_error)?;
        let mut summary = document.summary;

        if self.options.write_textures {
            let dir = path.parent().unwrap_or_else(|| Path::new(""));
            for (file_name, texture) in &document.textures {
                let texture_path = dir.join(file_name);
                let mut png = Cursor::new(Vec::new());
                texture.image().write_to(&mut png, ImageFormat::Png)?;
                write_atomic(&texture_path, png.get_ref())?;
                summary.files.push(texture_path);
            }
        }

        write_atomic(&mtl_path, &document.mtl)?;
        write_atomic(path, &document.obj)?;
        summary.files.push(mtl_path);
        summary.files.push(path.to_path_buf());

        log::info!(
            "exported {} ({} objects, {} vertices, {} materials)",
            path.display(),
            summary.objects,
            summary.vertices,
            summary.materials
        );
        Ok(summary)
    }
}

fn build_document<'a>(scene: &'a Scene, mtl_name: &str, model_name: &str) -> std::io::Result<ObjDocument<'a>> {
    let mut vertices = Vec::new();
    let mut tex_coords = Vec::new();
    let mut objects = Vec::new();
    let mut entries: Vec<MtlEntry<'a>> = Vec::new();
    let mut material_names: HashMap<usize, usize> = HashMap::new();
    let mut textures: Vec<(String, &'a Arc<Texture>)> = Vec::new();
    let mut summary = ObjSummary::default();
    let mut offset = 1usize;

    for (world, geometry) in scene.flatten() {
        let mesh = geometry.mesh();
        if mesh.is_empty() {
            continue;
        }

        let material_name = match geometry.material() {
            Some(material) => {
                let index = match material_names.entry(material_key(material)) {
                    Entry::Occupied(slot) => *slot.get(),
                    Entry::Vacant(slot) => {
                        let texture_file = material
                            .diffuse_map()
                            .map(|texture| texture_file_name(&mut textures, texture));
                        entries.push(MtlEntry {
                            name: format!("material_{}", entries.len()),
                            material: material.as_ref(),
                            texture_file,
                        });
                        *slot.insert(entries.len() - 1)
                    }
                };
                entries[index].name.clone()
            }
            None => DEFAULT_MATERIAL.to_string(),
        };

        for vertex in mesh.vertices() {
            let p = world.transform_point(vertex.position);
            writeln!(vertices, "v {:.6} {:.6} {:.6}", p.x, p.y, p.z)?;
            writeln!(tex_coords, "vt {:.6} {:.6}", vertex.tex_coord.x, vertex.tex_coord.y)?;
        }

        writeln!(objects, "o {model_name}_{}", summary.objects)?;
        writeln!(objects, "usemtl {material_name}")?;
        for [a, b, c] in mesh.triangles() {
            let (a, b, c) = (a as usize + offset, b as usize + offset, c as usize + offset);
            writeln!(objects, "f {a}/{a} {b}/{b} {c}/{c}")?;
            summary.triangles += 1;
        }

        offset += mesh.vertices().len();
        summary.vertices += mesh.vertices().len();
        summary.objects += 1;
    }
    summary.materials = entries.len();

    let mut obj = Vec::new();
    writeln!(obj, "# {model_name}")?;
    writeln!(obj, "mtllib {mtl_name}")?;
    writeln!(obj)?;
    obj.extend_from_slice(&vertices);
    writeln!(obj)?;
    obj.extend_from_slice(&tex_coords);
    writeln!(obj)?;
    obj.extend_from_slice(&objects);

    let mut mtl = Vec::new();
    writeln!(mtl, "# materials for {model_name}")?;
    write_mtl_entry(&mut mtl, DEFAULT_MATERIAL, None, None)?;
    for entry in &entries {
        write_mtl_entry(&mut mtl, &entry.name, Some(entry.material), entry.texture_file.as_deref())?;
    }

    Ok(ObjDocument {
        obj,
        mtl,
        textures,
        summary,
    })
}

/// File name for `texture`, registering it on first use.
///
/// Textures are shared by identity; distinct textures whose sanitized names
/// collide get a numeric suffix.
fn texture_file_name<'a>(textures: &mut Vec<(String, &'a Arc<Texture>)>, texture: &'a Arc<Texture>) -> String {
    if let Some((file, _)) = textures.iter().find(|(_, t)| Arc::ptr_eq(t, texture)) {
        return file.clone();
    }
    let base = sanitize_name(texture.name());
    let taken = |file: &str| textures.iter().any(|(name, _)| name == file);
    let mut file = format!("{base}.png");
    let mut suffix = 1;
    while taken(&file) {
        file = format!("{base}_{suffix}.png");
        suffix += 1;
    }
    textures.push((file.clone(), texture));
    file
}

fn write_mtl_entry(
    out: &mut Vec<u8>,
    name: &str,
    material: Option<&Material>,
    texture_file: Option<&str>,
) -> std::io::Result<()> {
    let diffuse = material.map(Material::diffuse).unwrap_or_default();
    let opacity = match material.map(Material::blend) {
        Some(BlendMode::AlphaBlend) => diffuse.a.min(1.0),
        _ => 1.0,
    };

    writeln!(out)?;
    writeln!(out, "newmtl {name}")?;
    writeln!(out, "Ka 1.000 1.000 1.000")?;
    writeln!(out, "Kd {:.3} {:.3} {:.3}", diffuse.r, diffuse.g, diffuse.b)?;
    writeln!(out, "Ks 0.000 0.000 0.000")?;
    writeln!(out, "Ns 0.000")?;
    writeln!(out, "d {opacity:.3}")?;
    writeln!(out, "illum 2")?;
    if let Some(file) = texture_file {
        writeln!(out, "map_Kd {file}")?;
    }
    Ok(())
}
