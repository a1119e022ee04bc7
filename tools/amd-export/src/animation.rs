//! Animation sampling
//!
//! Every clip is sampled at the union of its curves' keyframe times. At
//! each time the scene provider evaluates the pose and each bone is stored
//! relative to its parent as translation + rotation (scale is dropped).

use amd_common::{AmdBonePose, AmdClip, AmdFrame};
use glam::Mat4;

use crate::error::ExportError;
use crate::scene::{SceneProvider, SourceClip};
use crate::skeleton::{relative_transform, FlatSkeleton};

/// Distinct keyframe times across all curves, ascending.
///
/// Deduplication is by exact value, so `-0.0` and `0.0` are one time;
/// non-finite times are ignored.
pub fn keyframe_times(clip: &SourceClip) -> Vec<f32> {
    let mut times: Vec<f32> = clip
        .curves
        .iter()
        .flatten()
        .copied()
        .filter(|t| t.is_finite())
        .collect();
    times.sort_by(f32::total_cmp);
    times.dedup();
    times
}

/// Split a transform into translation and unit rotation `[x, y, z, w]`
pub fn decompose(m: Mat4) -> AmdBonePose {
    let (_scale, rotation, translation) = m.to_scale_rotation_translation();
    AmdBonePose {
        position: translation.to_array(),
        rotation: rotation.normalize().to_array(),
    }
}

/// Parent-relative poses from armature-space bone matrices
pub fn local_poses(skeleton: &FlatSkeleton, armature_space: &[Mat4]) -> Vec<AmdBonePose> {
    skeleton
        .bones()
        .iter()
        .enumerate()
        .map(|(i, bone)| {
            let local = match bone.parent {
                Some(p) => relative_transform(armature_space[p], armature_space[i]),
                None => armature_space[i],
            };
            decompose(local)
        })
        .collect()
}

/// Sample clip `clip_index` of `scene` for the armature of mesh object `object`
pub fn sample_clip<S: SceneProvider + ?Sized>(
    scene: &S,
    object: usize,
    clip_index: usize,
    clip: &SourceClip,
    skeleton: &FlatSkeleton,
) -> Result<AmdClip, ExportError> {
    let times = keyframe_times(clip);
    let mut frames = Vec::with_capacity(times.len());

    for time in times {
        let pose = scene.evaluate_pose(object, clip_index, time)?;
        if pose.len() != skeleton.len() {
            return Err(ExportError::PoseCountMismatch {
                clip: clip.name.clone(),
                time,
                expected: skeleton.len(),
                got: pose.len(),
            });
        }
        frames.push(AmdFrame {
            time,
            poses: local_poses(skeleton, &pose),
        });
    }

    tracing::debug!(
        "Sampled clip '{}': {} frames, {} bones",
        clip.name,
        frames.len(),
        skeleton.len()
    );
    Ok(AmdClip { frames })
}
