//! In-memory scene built in code

use anyhow::{bail, Context, Result};
use glam::{Mat4, Quat, Vec3};

use super::{compose_armature_space, MeshObject, SceneProvider, SourceClip, SourceMaterial};
use crate::config::DEFAULT_FPS;
use crate::skeleton::FlatSkeleton;

/// Bone-local TRS key at `time` (frames)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseKey {
    pub time: f32,
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl PoseKey {
    pub fn new(time: f32) -> Self {
        Self {
            time,
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// Keys of one bone, kept sorted by time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoneTrack {
    keys: Vec<PoseKey>,
}

impl BoneTrack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, key: PoseKey) -> Self {
        let at = self.keys.partition_point(|k| k.time <= key.time);
        self.keys.insert(at, key);
        self
    }

    pub fn times(&self) -> Vec<f32> {
        self.keys.iter().map(|k| k.time).collect()
    }

    /// Parent-relative matrix at `time`; clamps outside the keyed range
    pub fn sample(&self, time: f32) -> Option<Mat4> {
        let first = self.keys.first()?;
        let next = self.keys.partition_point(|k| k.time <= time);
        if next == 0 {
            return Some(first.matrix());
        }
        let a = &self.keys[next - 1];
        let Some(b) = self.keys.get(next) else {
            return Some(a.matrix());
        };

        let span = b.time - a.time;
        let f = if span > 0.0 {
            ((time - a.time) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Some(Mat4::from_scale_rotation_translation(
            a.scale.lerp(b.scale, f),
            a.rotation.slerp(b.rotation, f),
            a.translation.lerp(b.translation, f),
        ))
    }
}

/// Named clip with one track per animated bone
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryClip {
    pub name: String,
    tracks: Vec<(String, BoneTrack)>,
}

impl MemoryClip {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tracks: Vec::new(),
        }
    }

    pub fn with_track(mut self, bone: impl Into<String>, track: BoneTrack) -> Self {
        self.tracks.push((bone.into(), track));
        self
    }

    fn track(&self, bone: &str) -> Option<&BoneTrack> {
        self.tracks.iter().find(|(name, _)| name == bone).map(|(_, t)| t)
    }
}

/// Scene provider over plain values
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryScene {
    materials: Vec<SourceMaterial>,
    objects: Vec<MeshObject>,
    clips: Vec<MemoryClip>,
    fps: u8,
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self {
            materials: Vec::new(),
            objects: Vec::new(),
            clips: Vec::new(),
            fps: DEFAULT_FPS,
        }
    }
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_material(mut self, material: SourceMaterial) -> Self {
        self.materials.push(material);
        self
    }

    pub fn with_object(mut self, object: MeshObject) -> Self {
        self.objects.push(object);
        self
    }

    pub fn with_clip(mut self, clip: MemoryClip) -> Self {
        self.clips.push(clip);
        self
    }

    pub fn with_fps(mut self, fps: u8) -> Self {
        self.fps = fps;
        self
    }
}

impl SceneProvider for MemoryScene {
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
                curves: clip.tracks.iter().map(|(_, t)| t.times()).collect(),
            })
            .collect())
    }

    fn fps(&self) -> u8 {
        self.fps
    }

    fn evaluate_pose(&self, object: usize, clip: usize, time: f32) -> Result<Vec<Mat4>> {
        let mesh_object = self
            .objects
            .get(object)
            .with_context(|| format!("no mesh object {}", object))?;
        let Some(armature) = &mesh_object.armature else {
            bail!("mesh object '{}' has no armature", mesh_object.name);
        };
        let clip = self
            .clips
            .get(clip)
            .with_context(|| format!("no animation clip {}", clip))?;

        let skeleton = FlatSkeleton::flatten(&mesh_object.name, armature)?;
        let locals: Vec<Mat4> = skeleton
            .bones()
            .iter()
            .enumerate()
            .map(|(i, bone)| {
                clip.track(&bone.name)
                    .and_then(|track| track.sample(time))
                    .unwrap_or_else(|| skeleton.local_bind(i))
            })
            .collect();
        Ok(compose_armature_space(&skeleton.parents(), &locals))
    }
}
