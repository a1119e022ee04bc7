//! Scene provider interface
//!
//! The exporter never walks a 3D scene itself. A [`SceneProvider`] hands it
//! triangulated meshes, materials, armatures and animation clips, and
//! evaluates poses on request. [`GltfScene`] reads glTF/GLB files;
//! [`MemoryScene`] is built in code.

mod gltf;
mod memory;

pub use self::gltf::GltfScene;
pub use self::memory::{BoneTrack, MemoryClip, MemoryScene, PoseKey};

use anyhow::Result;
use glam::{Mat4, Quat, Vec3};

/// Source of everything the exporter encodes
pub trait SceneProvider {
    /// All materials, in the order faces index them
    fn materials(&self) -> Result<Vec<SourceMaterial>>;

    /// Mesh objects in export order
    fn mesh_objects(&self) -> Result<Vec<MeshObject>>;

    /// Animation clips with their per-curve keyframe times (frame units)
    fn clips(&self) -> Result<Vec<SourceClip>>;

    /// Scene frame rate written ahead of the animation clips
    fn fps(&self) -> u8;

    /// Evaluate `clip` at `time` (frame units) for the armature of mesh
    /// object `object`.
    ///
    /// Returns one armature-space matrix per bone, in the armature's bone
    /// declaration order.
    fn evaluate_pose(&self, object: usize, clip: usize, time: f32) -> Result<Vec<Mat4>>;
}

/// Material as stored by the scene
#[derive(Debug, Clone, PartialEq)]
pub struct SourceMaterial {
    pub name: String,
    pub diffuse: [f32; 3],
    pub diffuse_intensity: f32,
    pub alpha: f32,
    pub specular: [f32; 3],
    pub specular_intensity: f32,
    pub specular_alpha: f32,
    pub ambient: f32,
    /// Image path as the scene references it (any directory, any extension)
    pub texture_path: Option<String>,
}

impl SourceMaterial {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            diffuse: [0.8, 0.8, 0.8],
            diffuse_intensity: 1.0,
            alpha: 1.0,
            specular: [1.0, 1.0, 1.0],
            specular_intensity: 0.5,
            specular_alpha: 1.0,
            ambient: 1.0,
            texture_path: None,
        }
    }

    pub fn with_diffuse(mut self, rgb: [f32; 3], alpha: f32) -> Self {
        self.diffuse = rgb;
        self.alpha = alpha;
        self
    }

    pub fn with_texture(mut self, path: impl Into<String>) -> Self {
        self.texture_path = Some(path.into());
        self
    }
}

/// One (bone, weight) pair; `bone` indexes the armature's bone list
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Influence {
    pub bone: usize,
    pub weight: f32,
}

/// Per-vertex data shared by every face corner that uses the vertex
#[derive(Debug, Clone, PartialEq)]
pub struct SourceVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub influences: Vec<Influence>,
}

/// Face corner: vertex reference plus the corner's own texcoord
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceCorner {
    pub vertex: usize,
    /// Texcoord as stored by the scene (V not yet flipped)
    pub texcoord: [f32; 2],
}

/// Triangle (triangulation happens in the provider)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Index into [`SceneProvider::materials`]
    pub material: usize,
    pub corners: [FaceCorner; 3],
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceMesh {
    pub vertices: Vec<SourceVertex>,
    pub faces: Vec<Face>,
}

impl SourceMesh {
    /// Add an unweighted vertex and return its index
    pub fn push_vertex(&mut self, position: [f32; 3], normal: [f32; 3]) -> usize {
        self.push_weighted_vertex(position, normal, Vec::new())
    }

    /// Add a vertex with bone influences and return its index
    pub fn push_weighted_vertex(
        &mut self,
        position: [f32; 3],
        normal: [f32; 3],
        influences: Vec<Influence>,
    ) -> usize {
        self.vertices.push(SourceVertex {
            position,
            normal,
            influences,
        });
        self.vertices.len() - 1
    }

    /// Add a triangle from `(vertex, texcoord)` corners
    pub fn push_face(&mut self, material: usize, corners: [(usize, [f32; 2]); 3]) {
        self.faces.push(Face {
            material,
            corners: corners.map(|(vertex, texcoord)| FaceCorner { vertex, texcoord }),
        });
    }
}

/// Bone as declared by the source armature
#[derive(Debug, Clone, PartialEq)]
pub struct SourceBone {
    pub name: String,
    pub parent: Option<String>,
    pub children: Vec<String>,
    /// Object-space bind (rest) matrix
    pub bind: Mat4,
}

/// Ordered bone list; declaration order is the exported bone index
#[derive(Debug, Clone, PartialEq)]
pub struct Armature {
    pub name: String,
    pub bones: Vec<SourceBone>,
}

impl Armature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bones: Vec::new(),
        }
    }

    /// Declare a bone; a named parent that is already declared gets the
    /// bone appended to its children.
    pub fn with_bone(mut self, name: &str, parent: Option<&str>, bind: Mat4) -> Self {
        if let Some(p) = parent {
            if let Some(parent_bone) = self.bones.iter_mut().find(|b| b.name == p) {
                parent_bone.children.push(name.to_string());
            }
        }
        self.bones.push(SourceBone {
            name: name.to_string(),
            parent: parent.map(str::to_string),
            children: Vec::new(),
            bind,
        });
        self
    }
}

/// Mesh object with its placement and optional armature
#[derive(Debug, Clone, PartialEq)]
pub struct MeshObject {
    pub name: String,
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub mesh: SourceMesh,
    pub armature: Option<Armature>,
}

impl MeshObject {
    pub fn new(name: impl Into<String>, mesh: SourceMesh) -> Self {
        Self {
            name: name.into(),
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            mesh,
            armature: None,
        }
    }

    pub fn with_transform(mut self, translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        self.translation = translation;
        self.rotation = rotation;
        self.scale = scale;
        self
    }

    pub fn with_armature(mut self, armature: Armature) -> Self {
        self.armature = Some(armature);
        self
    }
}

/// Animation clip as seen by the sampler
#[derive(Debug, Clone, PartialEq)]
pub struct SourceClip {
    pub name: String,
    /// Keyframe times of each curve, in frame units
    pub curves: Vec<Vec<f32>>,
}

/// Compose parent-relative matrices into armature space.
///
/// `parents[i]` is the parent bone of bone `i`. Parents may be declared
/// after their children.
pub(crate) fn compose_armature_space(parents: &[Option<usize>], locals: &[Mat4]) -> Vec<Mat4> {
    let mut world: Vec<Option<Mat4>> = vec![None; locals.len()];
    for bone in 0..locals.len() {
        // Walk up until a resolved ancestor (or a root), then resolve downwards
        let mut chain = vec![bone];
        let mut current = bone;
        while let Some(p) = parents[current] {
            if world[p].is_some() || chain.contains(&p) {
                break;
            }
            chain.push(p);
            current = p;
        }
        for &b in chain.iter().rev() {
            if world[b].is_some() {
                continue;
            }
            let parent_world = parents[b].and_then(|p| world[p]).unwrap_or(Mat4::IDENTITY);
            world[b] = Some(parent_world * locals[b]);
        }
    }
    world
        .into_iter()
        .map(|m| m.unwrap_or(Mat4::IDENTITY))
        .collect()
}
