//! Sampled skeletal animation records

use serde::{Deserialize, Serialize};
use std::io::Write;

use super::cursor::ByteCursor;
use super::error::FormatError;
use super::write::{count_u16, count_u8, WriteLe};

/// Parent-relative bone pose at one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmdBonePose {
    pub position: [f32; 3],
    /// Quaternion [x, y, z, w]
    pub rotation: [f32; 4],
}

impl Default for AmdBonePose {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// One sampled keyframe: time plus one pose per bone in bone-array order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmdFrame {
    /// Keyframe time in source frame units (not necessarily integral)
    pub time: f32,
    pub poses: Vec<AmdBonePose>,
}

/// One animation clip
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AmdClip {
    pub frames: Vec<AmdFrame>,
}

/// Animation section: shared frame rate plus clips
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmdAnimationSet {
    pub fps: u8,
    pub clips: Vec<AmdClip>,
}

impl AmdAnimationSet {
    pub(crate) fn validate(&self, bone_count: usize) -> Result<(), FormatError> {
        if self.clips.is_empty() {
            return Err(FormatError::EmptyAnimationSet);
        }
        count_u8("animation", self.clips.len())?;
        for (ci, clip) in self.clips.iter().enumerate() {
            count_u16("frame", clip.frames.len())?;
            for (fi, frame) in clip.frames.iter().enumerate() {
                if frame.poses.len() != bone_count {
                    return Err(FormatError::PoseCountMismatch {
                        clip: ci,
                        frame: fi,
                        poses: frame.poses.len(),
                        bones: bone_count,
                    });
                }
            }
        }
        Ok(())
    }

    /// Write count, fps and clips; validated beforehand
    pub(crate) fn write<W: Write>(&self, w: &mut W) -> Result<(), FormatError> {
        w.put_u8(count_u8("animation", self.clips.len())?)?;
        w.put_u8(self.fps)?;
        for clip in &self.clips {
            w.put_u16(count_u16("frame", clip.frames.len())?)?;
            for frame in &clip.frames {
                w.put_f32(frame.time)?;
                for pose in &frame.poses {
                    w.put_f32s(&pose.position)?;
                    w.put_f32s(&pose.rotation)?;
                }
            }
        }
        Ok(())
    }

    /// Read `count` clips (count already consumed) for a skeleton of `bone_count` bones
    pub(crate) fn read(
        c: &mut ByteCursor<'_>,
        count: usize,
        bone_count: usize,
    ) -> Result<Self, FormatError> {
        let fps = c.u8()?;
        let mut clips = Vec::with_capacity(count);
        for _ in 0..count {
            let frame_count = c.u16()? as usize;
            let mut frames = Vec::with_capacity(frame_count);
            for _ in 0..frame_count {
                let time = c.f32()?;
                let poses = (0..bone_count)
                    .map(|_| {
                        Ok::<_, FormatError>(AmdBonePose {
                            position: c.f32s::<3>()?,
                            rotation: c.f32s::<4>()?,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                frames.push(AmdFrame { time, poses });
            }
            clips.push(AmdClip { frames });
        }
        Ok(Self { fps, clips })
    }
}
