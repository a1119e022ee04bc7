//! Per-object mesh building
//!
//! One pass over an object's faces drives the [`VertexWelder`], the
//! [`MaterialRangeBuilder`] and (for rigged objects) the
//! [`SkinWeightPacker`] together, so the three stay aligned by construction.

mod ranges;
mod skin;
mod weld;

pub use ranges::{material_ranges, MaterialRange, MaterialRangeBuilder};
pub use skin::{check_influence_count, pack_influences, SkinError, SkinWeightPacker};
pub use weld::{Vertex, VertexLimitReached, VertexWelder, Welded};

use amd_common::AmdSkinRecord;

use crate::error::ExportError;
use crate::scene::SourceMesh;

/// Derived buffers of one mesh object
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
    pub ranges: Vec<MaterialRange>,
    /// One record per vertex; `None` for unrigged objects
    pub skin: Option<Vec<AmdSkinRecord>>,
}

impl ObjectMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Axis-aligned bounds of the welded positions
    pub fn bounds(&self) -> Bounds {
        Bounds::from_points(self.vertices.iter().map(|v| v.position))
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Bounds {
    /// Bounds of `points`; an empty set collapses to the origin
    pub fn from_points(points: impl IntoIterator<Item = [f32; 3]>) -> Self {
        let mut points = points.into_iter();
        let Some(first) = points.next() else {
            return Self {
                min: [0.0; 3],
                max: [0.0; 3],
            };
        };
        points.fold(
            Self {
                min: first,
                max: first,
            },
            |mut b, p| {
                for axis in 0..3 {
                    b.min[axis] = b.min[axis].min(p[axis]);
                    b.max[axis] = b.max[axis].max(p[axis]);
                }
                b
            },
        )
    }

    /// `min + max` per axis; zero for an origin-centred box
    pub fn center_offset(&self) -> [f32; 3] {
        [
            self.min[0] + self.max[0],
            self.min[1] + self.max[1],
            self.min[2] + self.max[2],
        ]
    }

    pub fn is_centered(&self, tolerance: f32) -> bool {
        self.center_offset().iter().all(|o| o.abs() <= tolerance)
    }
}

/// Weld, range and skin one object's faces in a single scan.
///
/// `bone_count` is `Some` for rigged objects; influence lists are packed
/// against it. Influence counts are checked on every corner regardless.
pub fn build_mesh(
    object: &str,
    mesh: &SourceMesh,
    material_count: usize,
    bone_count: Option<usize>,
) -> Result<ObjectMesh, ExportError> {
    let mut welder = VertexWelder::new();
    let mut ranges = MaterialRangeBuilder::new();
    let mut packer = bone_count.map(SkinWeightPacker::new);

    for (face_index, face) in mesh.faces.iter().enumerate() {
        if face.material >= material_count {
            return Err(ExportError::UnknownMaterial {
                object: object.to_string(),
                face: face_index,
                material: face.material,
                count: material_count,
            });
        }
        ranges.push_face(face.material, welder.triangle_count());

        for corner in &face.corners {
            let source = mesh.vertices.get(corner.vertex).ok_or_else(|| {
                ExportError::FaceVertexOutOfRange {
                    object: object.to_string(),
                    face: face_index,
                    vertex: corner.vertex,
                    vertex_count: mesh.vertices.len(),
                }
            })?;
            check_influence_count(&source.influences)
                .map_err(|e| skin_error(object, corner.vertex, bone_count, e))?;

            let vertex = Vertex::from_source(source.position, source.normal, corner.texcoord);
            let welded = welder
                .push(vertex)
                .map_err(|VertexLimitReached| ExportError::TooManyVertices {
                    object: object.to_string(),
                })?;

            if let (Welded::New(_), Some(packer)) = (welded, packer.as_mut()) {
                packer
                    .push_vertex(&source.influences)
                    .map_err(|e| skin_error(object, corner.vertex, bone_count, e))?;
            }
        }
    }

    let triangles = welder.triangle_count();
    let (vertices, indices) = welder.finish();
    if indices.len() > u16::MAX as usize {
        return Err(ExportError::TooManyIndices {
            object: object.to_string(),
            count: indices.len(),
        });
    }

    Ok(ObjectMesh {
        vertices,
        indices,
        ranges: ranges.finish(triangles),
        skin: packer.map(SkinWeightPacker::finish),
    })
}

fn skin_error(object: &str, vertex: usize, bone_count: Option<usize>, err: SkinError) -> ExportError {
    match err {
        SkinError::TooManyInfluences(count) => ExportError::UnsupportedInfluenceCount {
            object: object.to_string(),
            vertex,
            count,
        },
        SkinError::BoneOutOfRange(bone) => ExportError::BoneOutOfRange {
            object: object.to_string(),
            vertex,
            bone,
            bone_count: bone_count.unwrap_or(0),
        },
    }
}
