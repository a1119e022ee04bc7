//! Export errors and warnings

use std::fmt;

use amd_common::FormatError;

/// Fatal export error. No output file is committed when one is raised.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// A vertex carries more bone influences than the 4-slot skin record holds
    #[error("object '{object}': vertex {vertex} has {count} bone influences (max 4)")]
    UnsupportedInfluenceCount {
        object: String,
        vertex: usize,
        count: usize,
    },

    /// Animation clips exist but the animated object has no skeleton
    #[error("animation clips present but {} has no armature", object_label(.object))]
    MissingArmature { object: Option<String> },

    /// A parent or child reference names a bone the armature does not declare
    #[error("object '{object}': bone '{name}' is not declared in the armature")]
    UnknownBone { object: String, name: String },

    /// Parent and children references disagree, or the hierarchy has no root
    #[error("object '{object}': inconsistent skeleton: {reason}")]
    InconsistentSkeleton { object: String, reason: String },

    /// A skin influence points past the end of the bone array
    #[error("object '{object}': vertex {vertex} references bone {bone} but the armature has {bone_count} bones")]
    BoneOutOfRange {
        object: String,
        vertex: usize,
        bone: usize,
        bone_count: usize,
    },

    /// A face uses a material index outside the material table
    #[error("object '{object}': face {face} uses material {material} but only {count} materials exist")]
    UnknownMaterial {
        object: String,
        face: usize,
        material: usize,
        count: usize,
    },

    /// A face corner references a vertex the mesh does not have
    #[error("object '{object}': face {face} references vertex {vertex} of {vertex_count}")]
    FaceVertexOutOfRange {
        object: String,
        face: usize,
        vertex: usize,
        vertex_count: usize,
    },

    /// Welded vertex buffer would not be addressable by u16 indices
    #[error("object '{object}': more than {max} unique vertices", max = u16::MAX)]
    TooManyVertices { object: String },

    /// Index buffer does not fit the u16 index count
    #[error("object '{object}': {count} indices exceed the limit of {max}", max = u16::MAX)]
    TooManyIndices { object: String, count: usize },

    /// Rewritten texture name does not fit the u8 length prefix
    #[error("material {material}: texture name '{name}' is longer than 255 bytes")]
    TextureNameTooLong { material: usize, name: String },

    /// The scene provider returned a pose with the wrong bone count
    #[error("clip '{clip}' at time {time}: pose has {got} bones, skeleton has {expected}")]
    PoseCountMismatch {
        clip: String,
        time: f32,
        expected: usize,
        got: usize,
    },

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),

    /// Failure inside the scene provider
    #[error(transparent)]
    Scene(#[from] anyhow::Error),
}

fn object_label(object: &Option<String>) -> String {
    match object {
        Some(name) => format!("object '{}'", name),
        None => "the scene (no mesh objects)".to_string(),
    }
}

/// Non-fatal condition surfaced to the caller; the export still completes
#[derive(Debug, Clone, PartialEq)]
pub enum ExportWarning {
    /// Format stores only the max corner, so an off-centre box is lossy
    BoundingBoxNotCentered { object: String, offset: [f32; 3] },
    /// Animations are written only for single-object scenes
    MultiObjectAnimationUnsupported { objects: usize, clips: usize },
}

impl fmt::Display for ExportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BoundingBoxNotCentered { object, offset } => write!(
                f,
                "object '{}': bounding box is not centered (min + max = {:?}); only the max corner is stored",
                object, offset
            ),
            Self::MultiObjectAnimationUnsupported { objects, clips } => write!(
                f,
                "{} animation clip(s) skipped: animations are only exported for a single mesh object, scene has {}",
                clips, objects
            ),
        }
    }
}
