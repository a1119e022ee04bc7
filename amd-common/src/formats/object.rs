//! Mesh object records: geometry, material groups, transform, skeleton and skin

use serde::{Deserialize, Serialize};
use std::io::Write;

use super::cursor::ByteCursor;
use super::error::FormatError;
use super::write::{count_u16, count_u8, WriteLe};
use super::MAX_INFLUENCES;

/// Contiguous triangle span drawn with one material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmdGroup {
    /// First triangle (inclusive)
    pub start: u16,
    /// Last triangle (exclusive)
    pub end: u16,
    /// Index into the file's material table
    pub material: u16,
}

/// Object placement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmdTransform {
    pub position: [f32; 3],
    /// Quaternion [x, y, z, w]
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
}

impl Default for AmdTransform {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
            scale: [1.0; 3],
        }
    }
}

/// One bone of a flattened skeleton
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmdBone {
    /// Parent bone index, [`super::ROOT_PARENT`] for roots
    pub parent: u16,
    pub children: Vec<u16>,
    /// Bind matrix relative to the parent's bind matrix (16 floats)
    pub local_bind: [f32; 16],
    /// Inverse of the object-space bind matrix (16 floats)
    pub inverse_bind: [f32; 16],
}

/// Fixed four-slot skin influence record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmdSkinRecord {
    pub weights: [f32; MAX_INFLUENCES],
    pub bones: [u16; MAX_INFLUENCES],
}

impl AmdSkinRecord {
    /// Full weight on a single bone
    pub fn rigid(bone: u16) -> Self {
        Self {
            weights: [1.0, 0.0, 0.0, 0.0],
            bones: [bone, 0, 0, 0],
        }
    }
}

/// Bones plus one skin record per vertex
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmdSkeleton {
    pub bones: Vec<AmdBone>,
    pub skin: Vec<AmdSkinRecord>,
}

/// Indexed mesh object
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AmdObject {
    pub positions: Vec<[f32; 3]>,
    pub texcoords: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u16>,
    pub groups: Vec<AmdGroup>,
    /// Max corner of an origin-centred bounding box (object-local)
    pub bounding_max: [f32; 3],
    pub transform: AmdTransform,
    pub skeleton: Option<AmdSkeleton>,
}

impl AmdObject {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn bone_count(&self) -> usize {
        self.skeleton.as_ref().map_or(0, |s| s.bones.len())
    }

    /// Check every length prefix and cross-array invariant before writing
    pub(crate) fn validate(&self, index: usize) -> Result<(), FormatError> {
        let vertices = self.positions.len();
        count_u16("vertex", vertices)?;
        count_u16("index", self.indices.len())?;
        count_u8("group", self.groups.len())?;

        for (attribute, count) in [
            ("texcoords", self.texcoords.len()),
            ("normals", self.normals.len()),
        ] {
            if count != vertices {
                return Err(FormatError::AttributeMismatch {
                    object: index,
                    attribute,
                    count,
                    vertices,
                });
            }
        }

        if let Some(skeleton) = &self.skeleton {
            if skeleton.bones.is_empty() {
                return Err(FormatError::EmptySkeleton(index));
            }
            count_u8("bone", skeleton.bones.len())?;
            for bone in &skeleton.bones {
                count_u16("child", bone.children.len())?;
            }
            if skeleton.skin.len() != vertices {
                return Err(FormatError::SkinTableMismatch {
                    object: index,
                    records: skeleton.skin.len(),
                    vertices,
                });
            }
        }
        Ok(())
    }

    /// Write the object; lengths must already be validated
    pub(crate) fn write<W: Write>(&self, w: &mut W) -> Result<(), FormatError> {
        w.put_u16(count_u16("vertex", self.positions.len())?)?;
        for p in &self.positions {
            w.put_f32s(p)?;
        }
        for t in &self.texcoords {
            w.put_f32s(t)?;
        }
        for n in &self.normals {
            w.put_f32s(n)?;
        }

        w.put_u16(count_u16("index", self.indices.len())?)?;
        for i in &self.indices {
            w.put_u16(*i)?;
        }

        w.put_u8(count_u8("group", self.groups.len())?)?;
        for g in &self.groups {
            w.put_u16(g.start)?;
            w.put_u16(g.end)?;
            w.put_u16(g.material)?;
        }

        w.put_f32s(&self.bounding_max)?;
        w.put_f32s(&self.transform.position)?;
        w.put_f32s(&self.transform.rotation)?;
        w.put_f32s(&self.transform.scale)?;

        let Some(skeleton) = &self.skeleton else {
            w.put_u8(0)?;
            return Ok(());
        };

        w.put_u8(count_u8("bone", skeleton.bones.len())?)?;
        for bone in &skeleton.bones {
            w.put_u16(bone.parent)?;
            w.put_u16(count_u16("child", bone.children.len())?)?;
            for c in &bone.children {
                w.put_u16(*c)?;
            }
            w.put_f32s(&bone.local_bind)?;
            w.put_f32s(&bone.inverse_bind)?;
        }
        for record in &skeleton.skin {
            w.put_f32s(&record.weights)?;
        }
        for record in &skeleton.skin {
            for b in &record.bones {
                w.put_u16(*b)?;
            }
        }
        Ok(())
    }

    pub(crate) fn read(c: &mut ByteCursor<'_>) -> Result<Self, FormatError> {
        let vertex_count = c.u16()? as usize;
        let positions = (0..vertex_count)
            .map(|_| c.f32s::<3>())
            .collect::<Result<Vec<_>, _>>()?;
        let texcoords = (0..vertex_count)
            .map(|_| c.f32s::<2>())
            .collect::<Result<Vec<_>, _>>()?;
        let normals = (0..vertex_count)
            .map(|_| c.f32s::<3>())
            .collect::<Result<Vec<_>, _>>()?;

        let index_count = c.u16()? as usize;
        let indices = (0..index_count)
            .map(|_| c.u16())
            .collect::<Result<Vec<_>, _>>()?;

        let group_count = c.u8()? as usize;
        let groups = (0..group_count)
            .map(|_| {
                Ok::<_, FormatError>(AmdGroup {
                    start: c.u16()?,
                    end: c.u16()?,
                    material: c.u16()?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let bounding_max = c.f32s::<3>()?;
        let transform = AmdTransform {
            position: c.f32s::<3>()?,
            rotation: c.f32s::<4>()?,
            scale: c.f32s::<3>()?,
        };

        let bone_count = c.u8()? as usize;
        let skeleton = if bone_count == 0 {
            None
        } else {
            let mut bones = Vec::with_capacity(bone_count);
            for _ in 0..bone_count {
                let parent = c.u16()?;
                let child_count = c.u16()? as usize;
                let children = (0..child_count)
                    .map(|_| c.u16())
                    .collect::<Result<Vec<_>, _>>()?;
                let local_bind = c.f32s::<16>()?;
                let inverse_bind = c.f32s::<16>()?;
                bones.push(AmdBone {
                    parent,
                    children,
                    local_bind,
                    inverse_bind,
                });
            }

            let weights = (0..vertex_count)
                .map(|_| c.f32s::<MAX_INFLUENCES>())
                .collect::<Result<Vec<_>, _>>()?;
            let mut skin = Vec::with_capacity(vertex_count);
            for w in weights {
                skin.push(AmdSkinRecord {
                    weights: w,
                    bones: c.u16s::<MAX_INFLUENCES>()?,
                });
            }
            Some(AmdSkeleton { bones, skin })
        };

        Ok(Self {
            positions,
            texcoords,
            normals,
            indices,
            groups,
            bounding_max,
            transform,
            skeleton,
        })
    }
}
