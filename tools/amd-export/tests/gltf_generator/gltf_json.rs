//! GLTF JSON structure building.

use std::collections::BTreeMap;

use super::binary_packing::{Packed, PROP_OFFSET, TIP_HEIGHT};
use gltf_json as json;
use json::validation::Checked::Valid;

/// Primitive mode of the prop mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropMode {
    Triangles,
    Points,
}

fn node(name: &str) -> json::Node {
    json::Node {
        camera: None,
        children: None,
        extensions: Default::default(),
        extras: Default::default(),
        matrix: None,
        mesh: None,
        name: Some(name.to_string()),
        rotation: None,
        scale: None,
        translation: None,
        skin: None,
        weights: None,
    }
}

fn mesh(
    name: &str,
    attributes: BTreeMap<json::validation::Checked<json::mesh::Semantic>, json::Index<json::Accessor>>,
    indices: u32,
    material: Option<u32>,
    mode: json::mesh::Mode,
) -> json::Mesh {
    json::Mesh {
        extensions: Default::default(),
        extras: Default::default(),
        name: Some(name.to_string()),
        primitives: vec![json::mesh::Primitive {
            attributes,
            extensions: Default::default(),
            extras: Default::default(),
            indices: Some(json::Index::new(indices)),
            material: material.map(json::Index::new),
            mode: Valid(mode),
            targets: None,
        }],
        weights: None,
    }
}

fn sampler(
    input: u32,
    output: u32,
    interpolation: json::animation::Interpolation,
) -> json::animation::Sampler {
    json::animation::Sampler {
        input: json::Index::new(input),
        interpolation: Valid(interpolation),
        output: json::Index::new(output),
        extensions: Default::default(),
        extras: Default::default(),
    }
}

fn channel(sampler: u32, node: u32, path: json::animation::Property) -> json::animation::Channel {
    json::animation::Channel {
        sampler: json::Index::new(sampler),
        target: json::animation::Target {
            node: json::Index::new(node),
            path: Valid(path),
            extensions: Default::default(),
            extras: Default::default(),
        },
        extensions: Default::default(),
        extras: Default::default(),
    }
}

/// Build the GLTF JSON structure
pub(crate) fn build_gltf_json(packed: &Packed, prop: Option<PropMode>) -> json::Root {
    let mut nodes = Vec::new();
    let mut meshes = Vec::new();
    let mut skins = Vec::new();
    let mut animations = Vec::new();
    let mut materials = Vec::new();
    let mut textures = Vec::new();
    let mut images = Vec::new();
    let mut scene_nodes = Vec::new();

    if let Some(body) = &packed.body {
        // Node 0: Root, node 1: Tip, node 2: skinned mesh
        const ROOT_NODE: u32 = 0;
        const TIP_NODE: u32 = 1;
        const BODY_NODE: u32 = 2;

        nodes.push(json::Node {
            children: Some(vec![json::Index::new(TIP_NODE)]),
            translation: Some([0.0, 0.0, 0.0]),
            ..node("Root")
        });
        nodes.push(json::Node {
            translation: Some([0.0, TIP_HEIGHT, 0.0]),
            ..node("Tip")
        });
        nodes.push(json::Node {
            mesh: Some(json::Index::new(meshes.len() as u32)),
            skin: Some(json::Index::new(0)),
            ..node("Body")
        });
        scene_nodes.push(json::Index::new(ROOT_NODE));
        scene_nodes.push(json::Index::new(BODY_NODE));

        images.push(json::Image {
            buffer_view: None,
            mime_type: None,
            uri: Some("textures/brick.png".to_string()),
            name: Some("brick".to_string()),
            extensions: Default::default(),
            extras: Default::default(),
        });
        textures.push(json::Texture {
            source: json::Index::new(0),
            sampler: None,
            name: None,
            extensions: Default::default(),
            extras: Default::default(),
        });
        materials.push(json::Material {
            name: Some("Brick".to_string()),
            pbr_metallic_roughness: json::material::PbrMetallicRoughness {
                base_color_factor: json::material::PbrBaseColorFactor([1.0, 0.0, 0.0, 1.0]),
                base_color_texture: Some(json::texture::Info {
                    index: json::Index::new(0),
                    tex_coord: 0,
                    extensions: Default::default(),
                    extras: Default::default(),
                }),
                metallic_factor: json::material::StrengthFactor(0.0),
                roughness_factor: json::material::StrengthFactor(0.25),
                ..Default::default()
            },
            ..Default::default()
        });

        let mut attributes = BTreeMap::new();
        attributes.insert(Valid(json::mesh::Semantic::Positions), json::Index::new(body.positions));
        attributes.insert(Valid(json::mesh::Semantic::Normals), json::Index::new(body.normals));
        attributes.insert(Valid(json::mesh::Semantic::TexCoords(0)), json::Index::new(body.uvs));
        attributes.insert(Valid(json::mesh::Semantic::Joints(0)), json::Index::new(body.joints));
        attributes.insert(Valid(json::mesh::Semantic::Weights(0)), json::Index::new(body.weights));
        meshes.push(mesh(
            "BodyMesh",
            attributes,
            body.indices,
            Some(0),
            json::mesh::Mode::Triangles,
        ));

        skins.push(json::Skin {
            extensions: Default::default(),
            extras: Default::default(),
            inverse_bind_matrices: Some(json::Index::new(body.inverse_binds)),
            joints: vec![json::Index::new(ROOT_NODE), json::Index::new(TIP_NODE)],
            name: Some("Skeleton".to_string()),
            skeleton: Some(json::Index::new(ROOT_NODE)),
        });

        animations.push(json::Animation {
            channels: vec![
                channel(0, TIP_NODE, json::animation::Property::Rotation),
                channel(1, ROOT_NODE, json::animation::Property::Translation),
            ],
            extensions: Default::default(),
            extras: Default::default(),
            name: Some("Bend".to_string()),
            samplers: vec![
                sampler(
                    body.bend_times,
                    body.bend_rotations,
                    json::animation::Interpolation::Linear,
                ),
                sampler(
                    body.slide_times,
                    body.slide_translations,
                    json::animation::Interpolation::Linear,
                ),
            ],
        });
    }

    if let (Some(mode), Some(accessors)) = (prop, &packed.prop) {
        let mut attributes = BTreeMap::new();
        attributes.insert(
            Valid(json::mesh::Semantic::Positions),
            json::Index::new(accessors.positions),
        );
        attributes.insert(
            Valid(json::mesh::Semantic::Normals),
            json::Index::new(accessors.normals),
        );
        let gl_mode = match mode {
            PropMode::Triangles => json::mesh::Mode::Triangles,
            PropMode::Points => json::mesh::Mode::Points,
        };

        scene_nodes.push(json::Index::new(nodes.len() as u32));
        nodes.push(json::Node {
            mesh: Some(json::Index::new(meshes.len() as u32)),
            translation: Some([PROP_OFFSET, 0.0, 0.0]),
            ..node("Prop")
        });
        meshes.push(mesh("PropMesh", attributes, accessors.indices, None, gl_mode));
    }

    let scenes = vec![json::Scene {
        extensions: Default::default(),
        extras: Default::default(),
        name: Some("TestScene".to_string()),
        nodes: scene_nodes,
    }];

    // Byte length is set by assemble_glb
    let buffers = vec![json::Buffer {
        byte_length: 0u64.into(),
        extensions: Default::default(),
        extras: Default::default(),
        name: None,
        uri: None,
    }];

    json::Root {
        accessors: packed.accessors.clone(),
        animations,
        asset: json::Asset {
            copyright: None,
            extensions: Default::default(),
            extras: Default::default(),
            generator: Some("amd-export-test".to_string()),
            min_version: None,
            version: "2.0".to_string(),
        },
        buffers,
        buffer_views: packed.views.clone(),
        cameras: Vec::new(),
        extensions: Default::default(),
        extras: Default::default(),
        extensions_required: Vec::new(),
        extensions_used: Vec::new(),
        images,
        materials,
        meshes,
        nodes,
        samplers: Vec::new(),
        scene: Some(json::Index::new(0)),
        scenes,
        skins,
        textures,
    }
}
