//! Programmatic GLB generation for integration tests.
//!
//! The skinned scene contains:
//! - a quad on a 2-bone skeleton (Root -> Tip)
//! - one textured PBR material
//! - a 1 second "Bend" animation (root translation, tip rotation)

mod binary_packing;
mod glb_assembly;
mod gltf_json;

pub use binary_packing::{BEND_TIMES, PROP_OFFSET, SLIDE_DISTANCE, TIP_HEIGHT};
pub use gltf_json::PropMode;

/// Generate the skinned GLB
pub fn generate_skinned_glb() -> Vec<u8> {
    build(true, None)
}

/// Skinned GLB plus an extra unskinned mesh node named "Prop"
pub fn generate_skinned_glb_with_prop() -> Vec<u8> {
    build(true, Some(PropMode::Triangles))
}

/// Single unskinned, untextured quad ("Prop") offset along +X
pub fn generate_static_glb(mode: PropMode) -> Vec<u8> {
    build(false, Some(mode))
}

fn build(skinned: bool, prop: Option<PropMode>) -> Vec<u8> {
    let packed = binary_packing::pack_binary_data(skinned, prop.is_some());
    let root = gltf_json::build_gltf_json(&packed, prop);
    glb_assembly::assemble_glb(&root, &packed.buffer)
}
