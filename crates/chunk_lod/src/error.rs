use thiserror::Error;

/// Errors raised while building, uploading or drawing LOD index topology.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LodError {
    #[error("grid_stride must be >= 2 (got {0})")]
    StrideTooSmall(u32),

    #[error("grid_stride {grid_stride} exceeds full_grid_size {full_grid_size}")]
    StrideExceedsGrid {
        grid_stride: u32,
        full_grid_size: u32,
    },

    /// `grid_stride - 1` must be a multiple of every step, or coarse levels
    /// stop short of the chunk's far edge.
    #[error("grid_stride - 1 ({span}) is not divisible by step multiplier {step}")]
    StrideNotDivisible { span: u32, step: u32 },

    #[error("restart sentinel {full_grid_size}^2 does not fit in a 32-bit index")]
    SentinelOverflow { full_grid_size: u32 },

    #[error("invalid lod settings: {0}")]
    InvalidSettings(String),

    #[error("lod level {level} out of range (0..{levels})")]
    LevelOutOfRange { level: usize, levels: usize },

    #[error("index buffers have not been uploaded")]
    NotUploaded,

    #[error("index buffers already uploaded; cpu sequences were released")]
    AlreadyUploaded,

    #[error("index upload failed: {0}")]
    Upload(String),
}
