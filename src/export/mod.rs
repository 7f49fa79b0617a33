//! Interchange file writers.
//!
//! [`ObjExporter`] flattens a scene to world space (Wavefront OBJ + MTL);
//! [`GltfExporter`] keeps the node hierarchy (binary glTF 2.0).
//!
//! Every file is first written to a hidden sibling and renamed into place, so
//! a failed export never leaves a truncated file at the target path.

mod gltf;
mod obj;

pub use self::gltf::{GltfExporter, GltfSummary, UNIT_SCALE};
pub use self::obj::{ObjExporter, ObjOptions, ObjSummary};

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::ExportError;
use crate::material::Material;

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

/// Writes `bytes` to `path` through a temporary sibling file.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    let io_error = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    let tmp = temp_path(path);
    let result = fs::write(&tmp, bytes).and_then(|()| fs::rename(&tmp, path));
    if let Err(source) = result {
        let _ = fs::remove_file(&tmp);
        return Err(io_error(source));
    }
    Ok(())
}

/// Identity of a shared material, stable for the lifetime of the `Arc`.
pub(crate) fn material_key(material: &Arc<Material>) -> usize {
    Arc::as_ptr(material) as usize
}

/// Turns a texture or material name into something safe for a file name.
pub(crate) fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
