//! amd-export library
//!
//! Converts 3D scenes into the AMD binary scene format. Scenes come from a
//! [`scene::SceneProvider`]; [`export::build_amd`] runs the encoder core
//! and [`export::export_to_path`] commits the result to disk.

pub mod animation;
pub mod config;
pub mod error;
pub mod export;
pub mod inspect;
pub mod manifest;
pub mod material;
pub mod mesh;
pub mod scene;
pub mod skeleton;

pub use config::ExportConfig;
pub use error::{ExportError, ExportWarning};
pub use export::{build_amd, encode, export_to_path, Export, ExportReport};
pub use scene::{GltfScene, MemoryScene, SceneProvider};
