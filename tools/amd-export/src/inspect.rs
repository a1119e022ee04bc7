//! Decode an .amd file and summarize it

use std::path::Path;

use amd_common::AmdFile;
use anyhow::{Context, Result};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileSummary {
    pub bytes: usize,
    pub materials: Vec<MaterialSummary>,
    pub objects: Vec<ObjectSummary>,
    pub animation: Option<AnimationSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialSummary {
    pub diffuse: [f32; 3],
    pub alpha: f32,
    pub texture: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectSummary {
    pub vertices: usize,
    pub triangles: usize,
    /// `(start, end, material)` per group
    pub groups: Vec<(u16, u16, u16)>,
    pub bounding_max: [f32; 3],
    pub bones: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationSummary {
    pub fps: u8,
    /// Frame count of each clip
    pub frames: Vec<usize>,
}

impl FileSummary {
    pub fn new(file: &AmdFile, bytes: usize) -> Self {
        Self {
            bytes,
            materials: file
                .materials
                .iter()
                .map(|m| MaterialSummary {
                    diffuse: m.diffuse,
                    alpha: m.diffuse_alpha,
                    texture: m.texture.clone(),
                })
                .collect(),
            objects: file
                .objects
                .iter()
                .map(|o| ObjectSummary {
                    vertices: o.vertex_count(),
                    triangles: o.triangle_count(),
                    groups: o.groups.iter().map(|g| (g.start, g.end, g.material)).collect(),
                    bounding_max: o.bounding_max,
                    bones: o.bone_count(),
                })
                .collect(),
            animation: file.animations.as_ref().map(|set| AnimationSummary {
                fps: set.fps,
                frames: set.clips.iter().map(|c| c.frames.len()).collect(),
            }),
        }
    }

    /// Print through the log, one line per record
    pub fn log(&self) {
        tracing::info!(
            "{} bytes, {} materials, {} objects",
            self.bytes,
            self.materials.len(),
            self.objects.len()
        );
        for (i, m) in self.materials.iter().enumerate() {
            tracing::info!(
                "  material [{}] diffuse={:?} alpha={} texture={}",
                i,
                m.diffuse,
                m.alpha,
                m.texture.as_deref().unwrap_or("-")
            );
        }
        for (i, o) in self.objects.iter().enumerate() {
            tracing::info!(
                "  object [{}] {} vertices, {} triangles, {} groups, {} bones, max={:?}",
                i,
                o.vertices,
                o.triangles,
                o.groups.len(),
                o.bones,
                o.bounding_max
            );
        }
        match &self.animation {
            Some(anim) => tracing::info!(
                "  {} animation(s) at {} fps, frames {:?}",
                anim.frames.len(),
                anim.fps,
                anim.frames
            ),
            None => tracing::info!("  no animations"),
        }
    }
}

/// Read and decode `path`
pub fn inspect_file(path: &Path) -> Result<FileSummary> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
    let file = AmdFile::from_bytes(&bytes).with_context(|| format!("Invalid AMD file {:?}", path))?;
    Ok(FileSummary::new(&file, bytes.len()))
}
