//! Little-endian write helpers and count checks

use std::io::Write;

use super::error::FormatError;
use super::{MAX_U16_COUNT, MAX_U8_COUNT};

/// Little-endian primitive writers over any [`Write`]
pub(crate) trait WriteLe: Write {
    fn put_u8(&mut self, v: u8) -> std::io::Result<()> {
        self.write_all(&[v])
    }

    fn put_u16(&mut self, v: u16) -> std::io::Result<()> {
        self.write_all(&v.to_le_bytes())
    }

    fn put_f32(&mut self, v: f32) -> std::io::Result<()> {
        self.write_all(&v.to_le_bytes())
    }

    fn put_f32s(&mut self, values: &[f32]) -> std::io::Result<()> {
        for v in values {
            self.put_f32(*v)?;
        }
        Ok(())
    }
}

impl<W: Write + ?Sized> WriteLe for W {}

/// Narrow a collection length to its u8 prefix
pub(crate) fn count_u8(field: &'static str, count: usize) -> Result<u8, FormatError> {
    u8::try_from(count).map_err(|_| FormatError::CountOverflow {
        field,
        count,
        max: MAX_U8_COUNT,
    })
}

/// Narrow a collection length to its u16 prefix
pub(crate) fn count_u16(field: &'static str, count: usize) -> Result<u16, FormatError> {
    u16::try_from(count).map_err(|_| FormatError::CountOverflow {
        field,
        count,
        max: MAX_U16_COUNT,
    })
}
