//! Fixed 4-slot skin weight packing
//!
//! Policy: one record per welded vertex. Weights are normalised to sum 1;
//! vertices without influences (or with a zero total) get full weight on
//! bone 0. Unused slots are `(bone 0, 0.0)`.

use amd_common::{AmdSkinRecord, MAX_INFLUENCES};

use crate::scene::Influence;

/// Why a vertex's influence list cannot be packed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkinError {
    TooManyInfluences(usize),
    BoneOutOfRange(usize),
}

/// Reject influence lists the 4-slot record cannot hold
pub fn check_influence_count(influences: &[Influence]) -> Result<(), SkinError> {
    if influences.len() > MAX_INFLUENCES {
        return Err(SkinError::TooManyInfluences(influences.len()));
    }
    Ok(())
}

/// Pack one vertex's influences into a normalised record
pub fn pack_influences(
    influences: &[Influence],
    bone_count: usize,
) -> Result<AmdSkinRecord, SkinError> {
    check_influence_count(influences)?;
    if let Some(bad) = influences.iter().find(|i| i.bone >= bone_count) {
        return Err(SkinError::BoneOutOfRange(bad.bone));
    }

    let total: f32 = influences.iter().map(|i| i.weight).sum();
    if influences.is_empty() || !total.is_finite() || total <= 0.0 {
        return Ok(AmdSkinRecord::rigid(0));
    }

    let mut record = AmdSkinRecord {
        weights: [0.0; MAX_INFLUENCES],
        bones: [0; MAX_INFLUENCES],
    };
    for (slot, inf) in influences.iter().enumerate() {
        record.weights[slot] = inf.weight / total;
        // bone_count fits a u8, so the index fits a u16
        record.bones[slot] = inf.bone as u16;
    }
    Ok(record)
}

/// Collects one record per newly welded vertex, in vertex-buffer order
#[derive(Debug)]
pub struct SkinWeightPacker {
    bone_count: usize,
    records: Vec<AmdSkinRecord>,
}

impl SkinWeightPacker {
    pub fn new(bone_count: usize) -> Self {
        Self {
            bone_count,
            records: Vec::new(),
        }
    }

    /// Append the record for the vertex just added to the vertex buffer
    pub fn push_vertex(&mut self, influences: &[Influence]) -> Result<(), SkinError> {
        self.records
            .push(pack_influences(influences, self.bone_count)?);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn finish(self) -> Vec<AmdSkinRecord> {
        self.records
    }
}
