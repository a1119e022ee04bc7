//! Scene -> AMD export pipeline
//!
//! The whole file is assembled and encoded in memory. Output only reaches
//! disk once encoding succeeded, through a sibling temporary file that is
//! renamed over the target.

use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::Path;

use amd_common::{
    AmdAnimationSet, AmdFile, AmdGroup, AmdObject, AmdSkeleton, AmdTransform, FormatError,
    MAX_U8_COUNT,
};

use crate::animation::sample_clip;
use crate::config::ExportConfig;
use crate::error::{ExportError, ExportWarning};
use crate::material::convert_material;
use crate::mesh::build_mesh;
use crate::scene::{MeshObject, SceneProvider};
use crate::skeleton::FlatSkeleton;

/// Assembled file plus the warnings raised while building it
#[derive(Debug, Clone, PartialEq)]
pub struct Export {
    pub file: AmdFile,
    pub warnings: Vec<ExportWarning>,
}

/// Summary of a committed export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub materials: usize,
    pub objects: usize,
    pub vertices: usize,
    pub triangles: usize,
    pub bones: usize,
    pub animations: usize,
    pub bytes: usize,
    pub warnings: Vec<ExportWarning>,
}

impl ExportReport {
    fn new(export: &Export, bytes: usize) -> Self {
        let objects = &export.file.objects;
        Self {
            materials: export.file.materials.len(),
            objects: objects.len(),
            vertices: objects.iter().map(AmdObject::vertex_count).sum(),
            triangles: objects.iter().map(AmdObject::triangle_count).sum(),
            bones: objects.iter().map(AmdObject::bone_count).sum(),
            animations: export
                .file
                .animations
                .as_ref()
                .map_or(0, |set| set.clips.len()),
            bytes,
            warnings: export.warnings.clone(),
        }
    }
}

fn check_u8_count(field: &'static str, count: usize) -> Result<(), ExportError> {
    if count > MAX_U8_COUNT {
        return Err(FormatError::CountOverflow {
            field,
            count,
            max: MAX_U8_COUNT,
        }
        .into());
    }
    Ok(())
}

/// Build the in-memory AMD file for `scene`
pub fn build_amd<S: SceneProvider + ?Sized>(
    scene: &S,
    config: &ExportConfig,
) -> Result<Export, ExportError> {
    let mut warnings = Vec::new();

    let source_materials = scene.materials()?;
    check_u8_count("material", source_materials.len())?;
    let materials = source_materials
        .iter()
        .enumerate()
        .map(|(i, m)| convert_material(i, m, &config.texture_extension))
        .collect::<Result<Vec<_>, _>>()?;

    let mesh_objects = scene.mesh_objects()?;
    check_u8_count("object", mesh_objects.len())?;

    let mut objects = Vec::with_capacity(mesh_objects.len());
    let mut skeletons = Vec::with_capacity(mesh_objects.len());
    for source in &mesh_objects {
        let (object, skeleton) = build_object(source, materials.len(), config, &mut warnings)?;
        objects.push(object);
        skeletons.push(skeleton);
    }

    let clips = scene.clips()?;
    let animations = if clips.is_empty() {
        None
    } else {
        match (mesh_objects.as_slice(), skeletons.as_slice()) {
            ([], _) => return Err(ExportError::MissingArmature { object: None }),
            ([only], [None]) => {
                return Err(ExportError::MissingArmature {
                    object: Some(only.name.clone()),
                })
            }
            ([only], [Some(skeleton)]) => {
                check_u8_count("animation", clips.len())?;
                let sampled = clips
                    .iter()
                    .enumerate()
                    .map(|(i, clip)| sample_clip(scene, 0, i, clip, skeleton))
                    .collect::<Result<Vec<_>, _>>()?;
                tracing::info!(
                    "Sampled {} clip(s) for '{}' at {} fps",
                    sampled.len(),
                    only.name,
                    scene.fps()
                );
                Some(AmdAnimationSet {
                    fps: scene.fps(),
                    clips: sampled,
                })
            }
            _ => {
                let warning = ExportWarning::MultiObjectAnimationUnsupported {
                    objects: mesh_objects.len(),
                    clips: clips.len(),
                };
                tracing::warn!("{}", warning);
                warnings.push(warning);
                None
            }
        }
    };

    Ok(Export {
        file: AmdFile {
            materials,
            objects,
            animations,
        },
        warnings,
    })
}

fn build_object(
    source: &MeshObject,
    material_count: usize,
    config: &ExportConfig,
    warnings: &mut Vec<ExportWarning>,
) -> Result<(AmdObject, Option<FlatSkeleton>), ExportError> {
    let skeleton = source
        .armature
        .as_ref()
        .map(|armature| FlatSkeleton::flatten(&source.name, armature))
        .transpose()?;

    let mesh = build_mesh(
        &source.name,
        &source.mesh,
        material_count,
        skeleton.as_ref().map(FlatSkeleton::len),
    )?;

    let bounds = mesh.bounds();
    if !bounds.is_centered(config.center_tolerance) {
        let warning = ExportWarning::BoundingBoxNotCentered {
            object: source.name.clone(),
            offset: bounds.center_offset(),
        };
        tracing::warn!("{}", warning);
        warnings.push(warning);
    }

    // Index count is capped at u16::MAX, so triangle ranges fit a u16;
    // material indices were checked against the u8 material table
    let groups = mesh
        .ranges
        .iter()
        .map(|r| AmdGroup {
            start: r.start as u16,
            end: r.end as u16,
            material: r.material as u16,
        })
        .collect::<Vec<_>>();

    let amd_skeleton = match (&skeleton, mesh.skin.clone()) {
        (Some(flat), Some(skin)) => Some(AmdSkeleton {
            bones: flat.to_amd_bones(),
            skin,
        }),
        _ => None,
    };

    tracing::info!(
        "Object '{}': {} vertices, {} triangles, {} groups, {} bones",
        source.name,
        mesh.vertices.len(),
        mesh.triangle_count(),
        groups.len(),
        skeleton.as_ref().map_or(0, FlatSkeleton::len)
    );

    let object = AmdObject {
        positions: mesh.vertices.iter().map(|v| v.position).collect(),
        texcoords: mesh.vertices.iter().map(|v| v.texcoord).collect(),
        normals: mesh.vertices.iter().map(|v| v.normal).collect(),
        indices: mesh.indices,
        groups,
        bounding_max: bounds.max,
        transform: AmdTransform {
            position: source.translation.to_array(),
            rotation: source.rotation.to_array(),
            scale: source.scale.to_array(),
        },
        skeleton: amd_skeleton,
    };
    Ok((object, skeleton))
}

/// Build and encode `scene`, returning the bytes alongside the export
pub fn encode<S: SceneProvider + ?Sized>(
    scene: &S,
    config: &ExportConfig,
) -> Result<(Vec<u8>, Export), ExportError> {
    let export = build_amd(scene, config)?;
    let bytes = export.file.to_bytes()?;
    Ok((bytes, export))
}

/// Export `scene` to `path`.
///
/// Nothing is written unless the whole file encodes; an existing file at
/// `path` is only replaced on success.
pub fn export_to_path<S: SceneProvider + ?Sized>(
    scene: &S,
    config: &ExportConfig,
    path: &Path,
) -> Result<ExportReport, ExportError> {
    let (bytes, export) = encode(scene, config)?;
    commit(path, &bytes)?;

    let report = ExportReport::new(&export, bytes.len());
    tracing::info!(
        "Wrote {:?}: {} objects, {} materials, {} animations, {} bytes",
        path,
        report.objects,
        report.materials,
        report.animations,
        report.bytes
    );
    Ok(report)
}

/// Write through a `<name>.tmp` sibling and rename into place
fn commit(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let Some(name) = path.file_name() else {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("output path {:?} has no file name", path),
        ));
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut tmp_name = OsString::from(name);
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let written = (|| {
        let mut f = fs::File::create(&tmp_path)?;
        f.write_all(bytes)?;
        f.sync_all()
    })();
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    #[cfg(windows)]
    {
        if path.exists() {
            // Windows rename fails if destination exists.
            fs::remove_file(path)?;
        }
    }

    fs::rename(&tmp_path, path).inspect_err(|_| {
        let _ = fs::remove_file(&tmp_path);
    })
}
