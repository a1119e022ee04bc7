//! AMD binary scene format (.amd)
//!
//! Fixed-layout, little-endian, not self-describing: a reader must know the
//! schema below to parse it. Counts are unsigned; floats are IEEE-754 f32.
//!
//! # Layout
//! ```text
//! magic            3 bytes "AMD"
//! material_count   u8
//!   diffuse        f32×3, intensity f32, alpha f32
//!   specular       f32×3, intensity f32, alpha f32
//!   ambient        f32
//!   tex_name_len   u8 (0 = no texture), tex_name bytes (UTF-8)
//! object_count     u8
//!   vertex_count   u16
//!   positions      vertex_count × f32×3
//!   texcoords      vertex_count × f32×2
//!   normals        vertex_count × f32×3
//!   index_count    u16, indices index_count × u16
//!   group_count    u8, groups group_count × (u16 start, u16 end, u16 material)
//!   bounding_max   f32×3
//!   position       f32×3, rotation f32×4 (xyzw), scale f32×3
//!   bone_count     u8 (0 = unrigged)
//!     parent u16 (0xFFFF = root), child_count u16, children u16×n,
//!     local_bind f32×16, inverse_bind f32×16
//!   skin_weights   vertex_count × f32×4   (only when bone_count > 0)
//!   skin_bone_ids  vertex_count × u16×4
//! animation_count  u8
//!   fps            u8 (only when animation_count > 0)
//!   frame_count    u16
//!     time f32, then bone_count × (position f32×3, rotation f32×4)
//! ```
//!
//! Skin tables hold exactly one record per vertex so the decoder can size
//! them from `vertex_count`.

mod animation;
mod cursor;
mod error;
mod file;
mod material;
mod object;
mod write;

pub use animation::*;
pub use error::FormatError;
pub use file::AmdFile;
pub use material::*;
pub use object::*;

/// File signature
pub const AMD_MAGIC: &[u8; 3] = b"AMD";

/// Parent index stored for root bones
pub const ROOT_PARENT: u16 = 0xFFFF;

/// Influence slots per skin record
pub const MAX_INFLUENCES: usize = 4;

/// Upper bound for every u8 count (materials, objects, groups, bones, animations)
pub const MAX_U8_COUNT: usize = u8::MAX as usize;

/// Upper bound for every u16 count (vertices, indices, children, frames)
pub const MAX_U16_COUNT: usize = u16::MAX as usize;

/// Longest texture file name that fits the u8 length prefix
pub const MAX_TEXTURE_NAME_LEN: usize = u8::MAX as usize;
