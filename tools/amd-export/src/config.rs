//! Export settings

use serde::{Deserialize, Serialize};

/// Frame rate used when a scene entry does not set one
pub const DEFAULT_FPS: u8 = 24;

/// Knobs applied to every exported scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Extension written in place of the texture's own (without the dot)
    pub texture_extension: String,

    /// Largest `|min + max|` per axis still treated as an origin-centred box
    pub center_tolerance: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            texture_extension: "dds".to_string(),
            center_tolerance: 8e-6,
        }
    }
}
