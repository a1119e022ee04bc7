//! Whole-file encode/decode

use serde::{Deserialize, Serialize};
use std::io::Write;

use super::animation::AmdAnimationSet;
use super::cursor::ByteCursor;
use super::error::FormatError;
use super::material::AmdMaterial;
use super::object::AmdObject;
use super::write::{count_u8, WriteLe};
use super::AMD_MAGIC;

/// A complete AMD scene
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AmdFile {
    pub materials: Vec<AmdMaterial>,
    pub objects: Vec<AmdObject>,
    /// `None` writes an animation count of zero
    pub animations: Option<AmdAnimationSet>,
}

impl AmdFile {
    /// Check every count and cross-record invariant.
    ///
    /// [`AmdFile::write_to`] runs this before emitting the first byte, so a
    /// failed write never leaves a partial stream behind.
    pub fn validate(&self) -> Result<(), FormatError> {
        count_u8("material", self.materials.len())?;
        for mat in &self.materials {
            mat.validate()?;
        }

        count_u8("object", self.objects.len())?;
        for (i, obj) in self.objects.iter().enumerate() {
            obj.validate(i)?;
        }

        if let Some(set) = &self.animations {
            let bones = self.animated_bone_count().ok_or(FormatError::AnimationTarget {
                objects: self.objects.len(),
            })?;
            set.validate(bones)?;
        }
        Ok(())
    }

    /// Bone count of the single rigged object animations address
    fn animated_bone_count(&self) -> Option<usize> {
        match self.objects.as_slice() {
            [only] if only.bone_count() > 0 => Some(only.bone_count()),
            _ => None,
        }
    }

    /// Serialize the file
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<(), FormatError> {
        self.validate()?;

        w.write_all(AMD_MAGIC)?;

        w.put_u8(self.materials.len() as u8)?;
        for mat in &self.materials {
            mat.write(w)?;
        }

        w.put_u8(self.objects.len() as u8)?;
        for obj in &self.objects {
            obj.write(w)?;
        }

        match &self.animations {
            Some(set) => set.write(w)?,
            None => w.put_u8(0)?,
        }
        Ok(())
    }

    /// Serialize into a new buffer
    pub fn to_bytes(&self) -> Result<Vec<u8>, FormatError> {
        let mut out = Vec::new();
        self.write_to(&mut out)?;
        Ok(out)
    }

    /// Parse a complete file; trailing bytes are an error
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FormatError> {
        let mut c = ByteCursor::new(bytes);

        let magic = c.array::<3>()?;
        if &magic != AMD_MAGIC {
            return Err(FormatError::BadMagic(magic));
        }

        let material_count = c.u8()? as usize;
        let materials = (0..material_count)
            .map(|i| AmdMaterial::read(&mut c, i))
            .collect::<Result<Vec<_>, _>>()?;

        let object_count = c.u8()? as usize;
        let objects = (0..object_count)
            .map(|_| AmdObject::read(&mut c))
            .collect::<Result<Vec<_>, _>>()?;

        let mut file = Self {
            materials,
            objects,
            animations: None,
        };

        let animation_count = c.u8()? as usize;
        if animation_count > 0 {
            let bones = file
                .animated_bone_count()
                .ok_or(FormatError::AnimationTarget {
                    objects: file.objects.len(),
                })?;
            file.animations = Some(AmdAnimationSet::read(&mut c, animation_count, bones)?);
        }

        if c.remaining() > 0 {
            return Err(FormatError::TrailingBytes(c.remaining()));
        }
        Ok(file)
    }
}
