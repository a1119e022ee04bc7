//! Encode/decode errors for the AMD format

/// Error raised while writing or parsing an AMD stream
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// Stream does not start with "AMD"
    #[error("bad signature {0:?} (expected \"AMD\")")]
    BadMagic([u8; 3]),

    /// Stream ended before a field could be read
    #[error("truncated stream: needed {needed} bytes at offset {at}, {remaining} left")]
    Truncated {
        needed: usize,
        at: usize,
        remaining: usize,
    },

    /// Bytes left over after the animation section
    #[error("{0} trailing bytes after end of file")]
    TrailingBytes(usize),

    /// A collection does not fit its length prefix
    #[error("{field} count {count} exceeds the format limit of {max}")]
    CountOverflow {
        field: &'static str,
        count: usize,
        max: usize,
    },

    /// Per-vertex attribute arrays disagree in length
    #[error("object {object}: {attribute} has {count} entries but there are {vertices} vertices")]
    AttributeMismatch {
        object: usize,
        attribute: &'static str,
        count: usize,
        vertices: usize,
    },

    /// Skin table is not one record per vertex
    #[error("object {object}: skin table has {records} records for {vertices} vertices")]
    SkinTableMismatch {
        object: usize,
        records: usize,
        vertices: usize,
    },

    /// A rigged object with no bones cannot be told apart from an unrigged one
    #[error("object {0}: skeleton has no bones")]
    EmptySkeleton(usize),

    /// Animation set present but holds no clips
    #[error("animation set has no clips")]
    EmptyAnimationSet,

    /// Animations need exactly one rigged object to address bones
    #[error("animations require exactly one rigged object, file has {objects} object(s)")]
    AnimationTarget { objects: usize },

    /// A frame does not hold one pose per bone
    #[error("clip {clip} frame {frame}: {poses} poses for {bones} bones")]
    PoseCountMismatch {
        clip: usize,
        frame: usize,
        poses: usize,
        bones: usize,
    },

    /// Texture name is not valid UTF-8
    #[error("material {0}: texture name is not valid UTF-8")]
    InvalidTextureName(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
