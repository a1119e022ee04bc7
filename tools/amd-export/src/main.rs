//! amd-export - AMD scene export tool
//!
//! Converts glTF/GLB scenes into .amd files for the renderer.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use amd_export::config::{ExportConfig, DEFAULT_FPS};
use amd_export::{export_to_path, inspect, manifest, GltfScene};

#[derive(Parser)]
#[command(name = "amd-export")]
#[command(about = "AMD scene export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export every scene listed in a manifest
    Build {
        /// Path to amd.toml manifest
        #[arg(default_value = "amd.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate manifest without exporting
    Check {
        /// Path to amd.toml manifest
        #[arg(default_value = "amd.toml")]
        manifest: PathBuf,
    },

    /// Export a single glTF/GLB scene
    Scene {
        /// Input glTF/GLB file
        input: PathBuf,

        /// Output .amd file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Frame rate for animation keyframe times
        #[arg(long, default_value_t = DEFAULT_FPS)]
        fps: u8,

        /// Extension written for texture names
        #[arg(long)]
        texture_ext: Option<String>,
    },

    /// Decode an .amd file and print a summary
    Inspect {
        /// Input .amd file
        input: PathBuf,

        /// Print the summary as JSON on stdout
        #[arg(long)]
        json: bool,
    },
}

fn verbose_flag(cli: &Cli) -> bool {
    matches!(cli.command, Commands::Build { verbose: true, .. })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if verbose_flag(&cli) {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Build {
            manifest, output, ..
        } => {
            tracing::info!("Building scenes from {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            let reports = manifest::build_all(&config, output.as_deref())?;
            let warnings: usize = reports.iter().map(|r| r.warnings.len()).sum();
            tracing::info!(
                "Build complete: {} scene(s), {} warning(s)",
                reports.len(),
                warnings
            );
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            manifest::validate(&config)?;
            tracing::info!("Manifest is valid!");
        }

        Commands::Scene {
            input,
            output,
            fps,
            texture_ext,
        } => {
            if fps == 0 {
                bail!("--fps must be between 1 and 255");
            }
            let output = output.unwrap_or_else(|| input.with_extension("amd"));
            let mut config = ExportConfig::default();
            if let Some(ext) = texture_ext {
                config.texture_extension = ext;
            }

            tracing::info!("Converting {:?} -> {:?}", input, output);
            let scene = GltfScene::open(&input, fps)?;
            let report = export_to_path(&scene, &config, &output)?;
            tracing::info!(
                "Done! {} vertices, {} triangles, {} bones, {} animation(s)",
                report.vertices,
                report.triangles,
                report.bones,
                report.animations
            );
        }

        Commands::Inspect { input, json } => {
            let summary = inspect::inspect_file(&input)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                summary.log();
            }
        }
    }

    Ok(())
}
