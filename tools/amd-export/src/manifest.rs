//! amd.toml manifest parsing and batch export
//!
//! ```toml
//! [export]
//! texture_extension = "dds"
//!
//! [[scenes]]
//! input = "models/hero.glb"
//! output = "out/hero.amd"   # default: input with .amd extension
//! fps = 30                  # default: 24
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::config::{ExportConfig, DEFAULT_FPS};
use crate::export::{export_to_path, ExportReport};
use crate::scene::GltfScene;

/// amd.toml manifest structure
#[derive(Debug, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub scenes: Vec<SceneEntry>,

    /// Directory relative paths resolve against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Single scene to export
#[derive(Debug, Deserialize)]
pub struct SceneEntry {
    pub input: String,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub fps: Option<u8>,
}

impl SceneEntry {
    pub fn fps(&self) -> u8 {
        self.fps.unwrap_or(DEFAULT_FPS)
    }
}

impl Manifest {
    /// Parse manifest from string; relative paths resolve against `base_dir`
    pub fn parse(content: &str, base_dir: &Path) -> Result<Self> {
        let mut manifest: Self = toml::from_str(content).context("Failed to parse amd.toml")?;
        manifest.base_dir = base_dir.to_path_buf();
        Ok(manifest)
    }

    pub fn input_path(&self, entry: &SceneEntry) -> PathBuf {
        self.base_dir.join(&entry.input)
    }

    /// Where `entry` is written; `output_dir` overrides the manifest
    pub fn output_path(&self, entry: &SceneEntry, output_dir: Option<&Path>) -> PathBuf {
        let resolved = match &entry.output {
            Some(out) => self.base_dir.join(out),
            None => self.input_path(entry).with_extension("amd"),
        };
        match (output_dir, resolved.file_name()) {
            (Some(dir), Some(name)) => dir.join(name),
            _ => resolved,
        }
    }
}

/// Load manifest from file
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    Manifest::parse(&content, base_dir)
}

/// Check the manifest without exporting anything
pub fn validate(manifest: &Manifest) -> Result<()> {
    if manifest.export.texture_extension.trim_start_matches('.').is_empty() {
        bail!("export.texture_extension must not be empty");
    }
    let tolerance = manifest.export.center_tolerance;
    if tolerance.is_nan() || tolerance < 0.0 {
        bail!("export.center_tolerance must be a non-negative number");
    }
    if manifest.scenes.is_empty() {
        tracing::warn!("Manifest declares no scenes");
    }

    for entry in &manifest.scenes {
        let input = manifest.input_path(entry);
        let ext = input
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();
        if ext != "gltf" && ext != "glb" {
            bail!("Unsupported scene format: {:?} (use .gltf or .glb)", input);
        }
        if !input.exists() {
            bail!("Scene not found: {:?}", input);
        }
        if entry.fps() == 0 {
            bail!("Scene {:?}: fps must be between 1 and 255", entry.input);
        }
    }
    Ok(())
}

/// Validate, then export every scene in order
pub fn build_all(manifest: &Manifest, output_dir: Option<&Path>) -> Result<Vec<ExportReport>> {
    validate(manifest)?;

    let mut reports = Vec::with_capacity(manifest.scenes.len());
    for entry in &manifest.scenes {
        let input = manifest.input_path(entry);
        let output = manifest.output_path(entry, output_dir);
        tracing::info!("Exporting {:?} -> {:?}", input, output);

        let scene = GltfScene::open(&input, entry.fps())?;
        let report = export_to_path(&scene, &manifest.export, &output)
            .with_context(|| format!("Failed to export {:?}", input))?;
        reports.push(report);
    }
    Ok(reports)
}
