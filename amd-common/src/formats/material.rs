//! Material records

use serde::{Deserialize, Serialize};
use std::io::Write;

use super::cursor::ByteCursor;
use super::error::FormatError;
use super::write::WriteLe;
use super::MAX_TEXTURE_NAME_LEN;

/// Material record (11 floats + optional texture name)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmdMaterial {
    pub diffuse: [f32; 3],
    pub diffuse_intensity: f32,
    pub diffuse_alpha: f32,
    pub specular: [f32; 3],
    pub specular_intensity: f32,
    pub specular_alpha: f32,
    pub ambient: f32,
    /// Texture file name (basename only); `None` writes a zero length
    pub texture: Option<String>,
}

impl Default for AmdMaterial {
    fn default() -> Self {
        Self {
            diffuse: [0.8, 0.8, 0.8],
            diffuse_intensity: 1.0,
            diffuse_alpha: 1.0,
            specular: [1.0, 1.0, 1.0],
            specular_intensity: 0.5,
            specular_alpha: 1.0,
            ambient: 1.0,
            texture: None,
        }
    }
}

impl AmdMaterial {
    /// Serialized size in bytes
    pub fn encoded_len(&self) -> usize {
        11 * 4 + 1 + self.texture.as_ref().map_or(0, |t| t.len())
    }

    pub(crate) fn write<W: Write>(&self, w: &mut W) -> Result<(), FormatError> {
        w.put_f32s(&self.diffuse)?;
        w.put_f32(self.diffuse_intensity)?;
        w.put_f32(self.diffuse_alpha)?;
        w.put_f32s(&self.specular)?;
        w.put_f32(self.specular_intensity)?;
        w.put_f32(self.specular_alpha)?;
        w.put_f32(self.ambient)?;

        match &self.texture {
            Some(name) => {
                w.put_u8(name.len() as u8)?;
                w.write_all(name.as_bytes())?;
            }
            None => w.put_u8(0)?,
        }
        Ok(())
    }

    pub(crate) fn validate(&self) -> Result<(), FormatError> {
        if let Some(name) = &self.texture {
            if name.len() > MAX_TEXTURE_NAME_LEN {
                return Err(FormatError::CountOverflow {
                    field: "texture name bytes",
                    count: name.len(),
                    max: MAX_TEXTURE_NAME_LEN,
                });
            }
        }
        Ok(())
    }

    pub(crate) fn read(c: &mut ByteCursor<'_>, index: usize) -> Result<Self, FormatError> {
        let diffuse = c.f32s::<3>()?;
        let diffuse_intensity = c.f32()?;
        let diffuse_alpha = c.f32()?;
        let specular = c.f32s::<3>()?;
        let specular_intensity = c.f32()?;
        let specular_alpha = c.f32()?;
        let ambient = c.f32()?;

        let len = c.u8()? as usize;
        let texture = if len == 0 {
            None
        } else {
            let bytes = c.bytes(len)?;
            let name = std::str::from_utf8(bytes)
                .map_err(|_| FormatError::InvalidTextureName(index))?;
            Some(name.to_string())
        };

        Ok(Self {
            diffuse,
            diffuse_intensity,
            diffuse_alpha,
            specular,
            specular_intensity,
            specular_alpha,
            ambient,
            texture,
        })
    }
}
