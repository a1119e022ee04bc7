//! Material conversion

use amd_common::{AmdMaterial, MAX_TEXTURE_NAME_LEN};

use crate::error::ExportError;
use crate::scene::SourceMaterial;

/// File name the renderer looks up for `path`: directory and extension
/// stripped, `extension` appended. `None` when the path names no file.
///
/// Both `/` and `\` count as separators so Windows paths stored in scene
/// files resolve the same on every host.
pub fn texture_file_name(path: &str, extension: &str) -> Option<String> {
    let base = path.rsplit(['/', '\\']).next().unwrap_or(path);
    if base.is_empty() {
        return None;
    }
    let stem = match base.rfind('.') {
        Some(dot) if dot > 0 => &base[..dot],
        _ => base,
    };
    let extension = extension.trim_start_matches('.');
    if extension.is_empty() {
        Some(stem.to_string())
    } else {
        Some(format!("{}.{}", stem, extension))
    }
}

/// Convert material `index`, rewriting its texture name
pub fn convert_material(
    index: usize,
    material: &SourceMaterial,
    texture_extension: &str,
) -> Result<AmdMaterial, ExportError> {
    let texture = material
        .texture_path
        .as_deref()
        .and_then(|p| texture_file_name(p, texture_extension));

    if let Some(name) = &texture {
        if name.len() > MAX_TEXTURE_NAME_LEN {
            return Err(ExportError::TextureNameTooLong {
                material: index,
                name: name.clone(),
            });
        }
    }

    Ok(AmdMaterial {
        diffuse: material.diffuse,
        diffuse_intensity: material.diffuse_intensity,
        diffuse_alpha: material.alpha,
        specular: material.specular,
        specular_intensity: material.specular_intensity,
        specular_alpha: material.specular_alpha,
        ambient: material.ambient,
        texture,
    })
}
