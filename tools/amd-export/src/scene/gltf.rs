//! glTF/GLB scene provider
//!
//! Everything the exporter needs is read up front, so the provider holds no
//! buffer data once [`GltfScene::open`] returns. Images are never decoded;
//! only their names are kept for the material table.

use std::path::Path;

use anyhow::{bail, Context, Result};
use gltf::animation::{util::ReadOutputs, Interpolation, Property};
use gltf::mesh::Mode;
use glam::{Mat4, Quat, Vec3, Vec4};
use hashbrown::{HashMap, HashSet};

use super::{
    compose_armature_space, Armature, Influence, MeshObject, SceneProvider, SourceBone,
    SourceClip, SourceMaterial, SourceMesh,
};

/// Scene read from a glTF document
#[derive(Debug, Clone)]
pub struct GltfScene {
    fps: u8,
    materials: Vec<SourceMaterial>,
    objects: Vec<MeshObject>,
    rigs: Vec<Option<Rig>>,
    clips: Vec<Clip>,
}

/// Joint hierarchy of one skinned object, for pose evaluation
#[derive(Debug, Clone)]
struct Rig {
    /// Node index of each joint, in skin order
    joints: Vec<usize>,
    parents: Vec<Option<usize>>,
    /// Rest TRS of each joint node
    rest: Vec<Trs>,
    /// Mesh-space transform of a root joint's parent node (identity for non-roots)
    root_prefix: Vec<Mat4>,
}

#[derive(Debug, Clone, Copy)]
struct Trs {
    translation: Vec3,
    rotation: Quat,
    scale: Vec3,
}

impl Trs {
    fn from_node(node: &gltf::Node) -> Self {
        let (t, r, s) = node.transform().decomposed();
        Self {
            translation: Vec3::from_array(t),
            rotation: Quat::from_array(r),
            scale: Vec3::from_array(s),
        }
    }

    fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

#[derive(Debug, Clone)]
struct Channel {
    node: usize,
    property: Property,
    interpolation: Interpolation,
    /// Key times in frames
    times: Vec<f32>,
    /// One value per key (three per key for cubic splines); vec3 in xyz.
    /// Cubic tangents are per frame.
    values: Vec<Vec4>,
}

#[derive(Debug, Clone)]
struct Clip {
    name: String,
    channels: Vec<Channel>,
}

impl GltfScene {
    /// Read a `.gltf` or `.glb` file
    pub fn open(path: &Path, fps: u8) -> Result<Self> {
        let gltf::Gltf { document, blob } =
            gltf::Gltf::open(path).with_context(|| format!("Failed to load glTF: {:?}", path))?;
        let buffers = gltf::import_buffers(&document, path.parent(), blob)
            .with_context(|| format!("Failed to load glTF buffers: {:?}", path))?;
        Self::from_document(&document, &buffers, fps)
            .with_context(|| format!("Failed to read scene from {:?}", path))
    }

    /// Read a self-contained GLB (or glTF with embedded buffers) from memory
    pub fn from_slice(bytes: &[u8], fps: u8) -> Result<Self> {
        let gltf::Gltf { document, blob } =
            gltf::Gltf::from_slice(bytes).context("Failed to parse glTF")?;
        let buffers = gltf::import_buffers(&document, None, blob)
            .context("Failed to load glTF buffers")?;
        Self::from_document(&document, &buffers, fps)
    }

    fn from_document(
        document: &gltf::Document,
        buffers: &[gltf::buffer::Data],
        fps: u8,
    ) -> Result<Self> {
        if fps == 0 {
            bail!("Frame rate must be at least 1");
        }

        let nodes: Vec<gltf::Node> = document.nodes().collect();
        let mut parent_of: Vec<Option<usize>> = vec![None; nodes.len()];
        for node in &nodes {
            for child in node.children() {
                parent_of[child.index()] = Some(node.index());
            }
        }
        let world = node_world_matrices(&nodes, &parent_of);

        let mut materials: Vec<SourceMaterial> = document
            .materials()
            .enumerate()
            .map(|(i, m)| read_material(i, &m))
            .collect();
        let default_material = materials.len();
        let mut needs_default = false;

        let mut objects = Vec::new();
        let mut rigs = Vec::new();
        for node in nodes.iter() {
            let Some(mesh) = node.mesh() else {
                continue;
            };
            let name = node
                .name()
                .or(mesh.name())
                .map(str::to_string)
                .unwrap_or_else(|| format!("node_{}", node.index()));

            let mut source = SourceMesh::default();
            for primitive in mesh.primitives() {
                if primitive.material().index().is_none() {
                    needs_default = true;
                }
                read_primitive(&primitive, buffers, default_material, &mut source)
                    .with_context(|| {
                        format!("Mesh '{}' primitive {}", name, primitive.index())
                    })?;
            }

            let (scale, rotation, translation) =
                world[node.index()].to_scale_rotation_translation();
            let mut object =
                MeshObject::new(name.clone(), source).with_transform(translation, rotation, scale);

            match node.skin() {
                Some(skin) => {
                    let (armature, rig) =
                        read_skin(&skin, buffers, &nodes, &parent_of, &world, node.index())
                            .with_context(|| format!("Skin of '{}'", name))?;
                    object = object.with_armature(armature);
                    rigs.push(Some(rig));
                }
                None => rigs.push(None),
            }
            objects.push(object);
        }

        if needs_default {
            materials.push(SourceMaterial::new("default").with_diffuse([1.0, 1.0, 1.0], 1.0));
        }

        let clips = document
            .animations()
            .map(|a| read_animation(&a, buffers, fps))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            "glTF scene: {} materials, {} mesh objects, {} animations",
            materials.len(),
            objects.len(),
            clips.len()
        );

        Ok(Self {
            fps,
            materials,
            objects,
            rigs,
            clips,
        })
    }
}

impl SceneProvider for GltfScene {
    fn materials(&self) -> Result<Vec<SourceMaterial>> {
        Ok(self.materials.clone())
    }

    fn mesh_objects(&self) -> Result<Vec<MeshObject>> {
        Ok(self.objects.clone())
    }

    fn clips(&self) -> Result<Vec<SourceClip>> {
        Ok(self
            .clips
            .iter()
            .map(|clip| SourceClip {
                name: clip.name.clone(),
                curves: clip
                    .channels
                    .iter()
                    .map(|c| c.times.clone())
                    .collect(),
            })
            .collect())
    }

    fn fps(&self) -> u8 {
        self.fps
    }

    fn evaluate_pose(&self, object: usize, clip: usize, time: f32) -> Result<Vec<Mat4>> {
        let Some(rig) = self.rigs.get(object).context("No such mesh object")? else {
            bail!("Mesh object {} has no skin", object);
        };
        let clip = self
            .clips
            .get(clip)
            .with_context(|| format!("No animation {}", clip))?;

        let locals: Vec<Mat4> = rig
            .joints
            .iter()
            .enumerate()
            .map(|(i, &node)| {
                let mut trs = rig.rest[i];
                for channel in clip.channels.iter().filter(|c| c.node == node) {
                    let value = channel.sample(time);
                    match channel.property {
                        Property::Translation => trs.translation = value.truncate(),
                        Property::Rotation => trs.rotation = Quat::from_vec4(value).normalize(),
                        Property::Scale => trs.scale = value.truncate(),
                        Property::MorphTargetWeights => {}
                    }
                }
                rig.root_prefix[i] * trs.matrix()
            })
            .collect();

        Ok(compose_armature_space(&rig.parents, &locals))
    }
}

fn node_world_matrices(nodes: &[gltf::Node], parent_of: &[Option<usize>]) -> Vec<Mat4> {
    let locals: Vec<Mat4> = nodes
        .iter()
        .map(|n| Mat4::from_cols_array_2d(&n.transform().matrix()))
        .collect();
    compose_armature_space(parent_of, &locals)
}

fn read_material(index: usize, material: &gltf::Material) -> SourceMaterial {
    let pbr = material.pbr_metallic_roughness();
    let [r, g, b, a] = pbr.base_color_factor();
    let name = material
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("material_{}", index));

    let mut source = SourceMaterial::new(name).with_diffuse([r, g, b], a);
    source.diffuse_intensity = 1.0;
    source.specular = [1.0, 1.0, 1.0];
    source.specular_intensity = (1.0 - pbr.roughness_factor()).clamp(0.0, 1.0);
    source.specular_alpha = 1.0;
    source.ambient = 1.0;

    if let Some(info) = pbr.base_color_texture() {
        let image = info.texture().source();
        let path = match image.source() {
            gltf::image::Source::Uri { uri, .. } if !uri.starts_with("data:") => uri.to_string(),
            _ => image
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("image_{}", image.index())),
        };
        source.texture_path = Some(path);
    }
    source
}

fn read_primitive(
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
    default_material: usize,
    out: &mut SourceMesh,
) -> Result<()> {
    if primitive.mode() != Mode::Triangles {
        bail!(
            "Primitive mode {:?} is not a triangle list; triangulate before export",
            primitive.mode()
        );
    }
    let material = primitive.material().index().unwrap_or(default_material);
    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .context("No positions in primitive")?
        .collect();
    let count = positions.len();

    let normals: Vec<[f32; 3]> = match reader.read_normals() {
        Some(iter) => iter.collect(),
        None => vec![[0.0, 1.0, 0.0]; count],
    };
    let uvs: Vec<[f32; 2]> = match reader.read_tex_coords(0) {
        Some(iter) => iter.into_f32().collect(),
        None => vec![[0.0, 0.0]; count],
    };
    if normals.len() != count || uvs.len() != count {
        bail!("Vertex attribute counts disagree with {} positions", count);
    }

    // Every JOINTS_n/WEIGHTS_n pair contributes up to four influences
    let mut influences: Vec<Vec<Influence>> = vec![Vec::new(); count];
    let mut set = 0;
    while let (Some(joints), Some(weights)) = (reader.read_joints(set), reader.read_weights(set)) {
        for (vertex, (j, w)) in joints.into_u16().zip(weights.into_f32()).enumerate() {
            let Some(list) = influences.get_mut(vertex) else {
                bail!("JOINTS_{} has more entries than positions", set);
            };
            list.extend(
                j.iter()
                    .zip(w.iter())
                    .filter(|(_, weight)| **weight != 0.0)
                    .map(|(&bone, &weight)| Influence {
                        bone: bone as usize,
                        weight,
                    }),
            );
        }
        set += 1;
    }

    let base = out.vertices.len();
    for ((position, normal), influences) in positions.into_iter().zip(normals).zip(influences) {
        out.push_weighted_vertex(position, normal, influences);
    }

    let indices: Vec<u32> = match reader.read_indices() {
        Some(iter) => iter.into_u32().collect(),
        None => (0..count as u32).collect(),
    };
    if indices.len() % 3 != 0 {
        bail!("Index count {} is not a multiple of 3", indices.len());
    }
    for tri in indices.chunks_exact(3) {
        let mut corners = [(0usize, [0.0f32; 2]); 3];
        for (corner, &index) in corners.iter_mut().zip(tri) {
            let index = index as usize;
            if index >= count {
                bail!("Index {} out of range for {} vertices", index, count);
            }
            *corner = (base + index, uvs[index]);
        }
        out.push_face(material, corners);
    }
    Ok(())
}

fn read_skin(
    skin: &gltf::Skin,
    buffers: &[gltf::buffer::Data],
    nodes: &[gltf::Node],
    parent_of: &[Option<usize>],
    world: &[Mat4],
    mesh_node: usize,
) -> Result<(Armature, Rig)> {
    let joints: Vec<usize> = skin.joints().map(|j| j.index()).collect();
    if joints.is_empty() {
        bail!("Skin has no joints");
    }
    let joint_of: HashMap<usize, usize> =
        joints.iter().enumerate().map(|(i, &n)| (n, i)).collect();

    let reader = skin.reader(|buffer| Some(&buffers[buffer.index()]));
    let binds: Vec<Mat4> = match reader.read_inverse_bind_matrices() {
        Some(iter) => iter
            .map(|m| Mat4::from_cols_array_2d(&m).inverse())
            .collect(),
        None => vec![Mat4::IDENTITY; joints.len()],
    };
    if binds.len() != joints.len() {
        bail!(
            "Skin has {} joints but {} inverse bind matrices",
            joints.len(),
            binds.len()
        );
    }

    // Nearest ancestor that is itself a joint
    let parents: Vec<Option<usize>> = joints
        .iter()
        .map(|&node| {
            let mut current = parent_of[node];
            while let Some(p) = current {
                if let Some(&joint) = joint_of.get(&p) {
                    return Some(joint);
                }
                current = parent_of[p];
            }
            None
        })
        .collect();

    let mesh_inverse = world[mesh_node].inverse();
    let root_prefix = joints
        .iter()
        .zip(&parents)
        .map(|(&node, parent)| match (parent, parent_of[node]) {
            (None, Some(p)) => mesh_inverse * world[p],
            (None, None) => mesh_inverse,
            (Some(_), _) => Mat4::IDENTITY,
        })
        .collect();

    let names = joint_names(&joints, nodes);
    let mut armature = Armature::new(
        skin.name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("skin_{}", skin.index())),
    );
    armature.bones = (0..joints.len())
        .map(|i| SourceBone {
            name: names[i].clone(),
            parent: parents[i].map(|p| names[p].clone()),
            children: (0..joints.len())
                .filter(|&c| parents[c] == Some(i))
                .map(|c| names[c].clone())
                .collect(),
            bind: binds[i],
        })
        .collect();

    let rig = Rig {
        rest: joints.iter().map(|&n| Trs::from_node(&nodes[n])).collect(),
        joints,
        parents,
        root_prefix,
    };
    Ok((armature, rig))
}

/// Node names, made unique so bone references stay unambiguous
fn joint_names(joints: &[usize], nodes: &[gltf::Node]) -> Vec<String> {
    let mut seen = HashSet::new();
    joints
        .iter()
        .map(|&n| {
            let base = nodes[n]
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("joint_{}", n));
            if seen.insert(base.clone()) {
                base
            } else {
                let unique = format!("{}_{}", base, n);
                seen.insert(unique.clone());
                unique
            }
        })
        .collect()
}

fn read_animation(
    animation: &gltf::Animation,
    buffers: &[gltf::buffer::Data],
    fps: u8,
) -> Result<Clip> {
    let name = animation
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("animation_{}", animation.index()));

    let mut channels = Vec::new();
    for channel in animation.channels() {
        let reader = channel.reader(|buffer| Some(&buffers[buffer.index()]));
        let seconds: Vec<f32> = reader
            .read_inputs()
            .with_context(|| format!("Animation '{}' channel has no input", name))?
            .collect();
        let values: Vec<Vec4> = match reader.read_outputs() {
            Some(ReadOutputs::Translations(iter)) | Some(ReadOutputs::Scales(iter)) => {
                iter.map(|v| Vec3::from_array(v).extend(0.0)).collect()
            }
            Some(ReadOutputs::Rotations(iter)) => iter.into_f32().map(Vec4::from_array).collect(),
            Some(ReadOutputs::MorphTargetWeights(_)) => continue,
            None => bail!("Animation '{}' channel has no output", name),
        };

        let interpolation = channel.sampler().interpolation();
        let per_key = if interpolation == Interpolation::CubicSpline {
            3
        } else {
            1
        };
        if seconds.is_empty() || values.len() != seconds.len() * per_key {
            bail!(
                "Animation '{}': {} keys but {} output values",
                name,
                seconds.len(),
                values.len()
            );
        }

        channels.push(Channel::from_seconds(
            channel.target().node().index(),
            channel.target().property(),
            interpolation,
            &seconds,
            values,
            fps,
        ));
    }
    Ok(Clip { name, channels })
}

impl Channel {
    /// Channel keyed in seconds, rescaled to frames at `fps`
    fn from_seconds(
        node: usize,
        property: Property,
        interpolation: Interpolation,
        seconds: &[f32],
        mut values: Vec<Vec4>,
        fps: u8,
    ) -> Self {
        let fps = f32::from(fps);
        if interpolation == Interpolation::CubicSpline {
            for (i, value) in values.iter_mut().enumerate() {
                if i % 3 != 1 {
                    *value /= fps;
                }
            }
        }
        Self {
            node,
            property,
            interpolation,
            times: seconds.iter().map(|t| t * fps).collect(),
            values,
        }
    }

    /// Value at frame `t`, clamped to the keyed range
    fn sample(&self, t: f32) -> Vec4 {
        let keys = self.times.len();
        let next = self.times.partition_point(|&k| k <= t);
        let i = next.saturating_sub(1);
        if next == 0 || next >= keys {
            return self.key_value(if next == 0 { 0 } else { keys - 1 });
        }

        let (t0, t1) = (self.times[i], self.times[i + 1]);
        let dt = t1 - t0;
        let f = if dt > 0.0 {
            ((t - t0) / dt).clamp(0.0, 1.0)
        } else {
            0.0
        };

        match self.interpolation {
            Interpolation::Step => self.key_value(i),
            Interpolation::Linear => {
                let (a, b) = (self.key_value(i), self.key_value(i + 1));
                if self.property == Property::Rotation {
                    Vec4::from(Quat::from_vec4(a).slerp(Quat::from_vec4(b), f))
                } else {
                    a.lerp(b, f)
                }
            }
            Interpolation::CubicSpline => {
                // values hold [in-tangent, value, out-tangent] per key
                let p0 = self.values[i * 3 + 1];
                let m0 = self.values[i * 3 + 2] * dt;
                let p1 = self.values[(i + 1) * 3 + 1];
                let m1 = self.values[(i + 1) * 3] * dt;
                let (f2, f3) = (f * f, f * f * f);
                p0 * (2.0 * f3 - 3.0 * f2 + 1.0)
                    + m0 * (f3 - 2.0 * f2 + f)
                    + p1 * (-2.0 * f3 + 3.0 * f2)
                    + m1 * (f3 - f2)
            }
        }
    }

    fn key_value(&self, key: usize) -> Vec4 {
        match self.interpolation {
            Interpolation::CubicSpline => self.values[key * 3 + 1],
            _ => self.values[key],
        }
    }
}
