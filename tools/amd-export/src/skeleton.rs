//! Skeleton flattening (armature -> indexed bone table)
//!
//! Bones keep their declaration order; parent and child references are
//! resolved from names to indices in that order.

use amd_common::{AmdBone, FormatError, MAX_U8_COUNT, ROOT_PARENT};
use glam::Mat4;
use hashbrown::HashMap;

use crate::error::ExportError;
use crate::scene::Armature;

/// `child` expressed in the space of `parent`: `inverse(parent) * child`
pub fn relative_transform(parent: Mat4, child: Mat4) -> Mat4 {
    parent.inverse() * child
}

/// Bone with references resolved to indices
#[derive(Debug, Clone, PartialEq)]
pub struct FlatBone {
    pub name: String,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    /// Object-space bind matrix
    pub bind: Mat4,
}

/// Armature flattened into declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct FlatSkeleton {
    bones: Vec<FlatBone>,
}

impl FlatSkeleton {
    /// Resolve every parent/child name and check the two directions agree
    pub fn flatten(object: &str, armature: &Armature) -> Result<Self, ExportError> {
        let inconsistent = |reason: String| ExportError::InconsistentSkeleton {
            object: object.to_string(),
            reason,
        };

        if armature.bones.is_empty() {
            return Err(inconsistent(format!(
                "armature '{}' has no bones",
                armature.name
            )));
        }
        if armature.bones.len() > MAX_U8_COUNT {
            return Err(FormatError::CountOverflow {
                field: "bone",
                count: armature.bones.len(),
                max: MAX_U8_COUNT,
            }
            .into());
        }

        let mut by_name: HashMap<&str, usize> = HashMap::with_capacity(armature.bones.len());
        for (i, bone) in armature.bones.iter().enumerate() {
            if by_name.insert(bone.name.as_str(), i).is_some() {
                return Err(inconsistent(format!(
                    "bone name '{}' is declared twice",
                    bone.name
                )));
            }
        }
        let resolve = |name: &str| {
            by_name
                .get(name)
                .copied()
                .ok_or_else(|| ExportError::UnknownBone {
                    object: object.to_string(),
                    name: name.to_string(),
                })
        };

        let mut bones = Vec::with_capacity(armature.bones.len());
        for bone in &armature.bones {
            let parent = bone.parent.as_deref().map(|p| resolve(p)).transpose()?;
            let children = bone
                .children
                .iter()
                .map(|c| resolve(c))
                .collect::<Result<Vec<_>, _>>()?;
            bones.push(FlatBone {
                name: bone.name.clone(),
                parent,
                children,
                bind: bone.bind,
            });
        }

        for (i, bone) in bones.iter().enumerate() {
            if let Some(p) = bone.parent {
                if !bones[p].children.contains(&i) {
                    return Err(inconsistent(format!(
                        "'{}' names '{}' as parent but is not among its children",
                        bone.name, bones[p].name
                    )));
                }
            }
            for &c in &bone.children {
                if bones[c].parent != Some(i) {
                    return Err(inconsistent(format!(
                        "'{}' lists '{}' as a child but the child's parent differs",
                        bone.name, bones[c].name
                    )));
                }
            }
        }

        let skeleton = Self { bones };
        if let Some(bone) = skeleton.find_cycle() {
            return Err(inconsistent(format!(
                "parent chain of '{}' loops",
                skeleton.bones[bone].name
            )));
        }
        Ok(skeleton)
    }

    fn find_cycle(&self) -> Option<usize> {
        (0..self.bones.len()).find(|&start| {
            let mut current = start;
            for _ in 0..self.bones.len() {
                match self.bones[current].parent {
                    Some(p) => current = p,
                    None => return false,
                }
            }
            true
        })
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn bones(&self) -> &[FlatBone] {
        &self.bones
    }

    pub fn parents(&self) -> Vec<Option<usize>> {
        self.bones.iter().map(|b| b.parent).collect()
    }

    /// Bind relative to the parent's bind; roots keep their own bind
    pub fn local_bind(&self, bone: usize) -> Mat4 {
        let b = &self.bones[bone];
        match b.parent {
            Some(p) => relative_transform(self.bones[p].bind, b.bind),
            None => b.bind,
        }
    }

    pub fn inverse_bind(&self, bone: usize) -> Mat4 {
        self.bones[bone].bind.inverse()
    }

    /// Encode as format bone records
    pub fn to_amd_bones(&self) -> Vec<AmdBone> {
        // indices are below MAX_U8_COUNT, so every cast fits a u16
        (0..self.bones.len())
            .map(|i| {
                let bone = &self.bones[i];
                AmdBone {
                    parent: bone.parent.map_or(ROOT_PARENT, |p| p as u16),
                    children: bone.children.iter().map(|&c| c as u16).collect(),
                    local_bind: self.local_bind(i).to_cols_array(),
                    inverse_bind: self.inverse_bind(i).to_cols_array(),
                }
            })
            .collect()
    }
}
