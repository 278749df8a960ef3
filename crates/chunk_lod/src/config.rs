//! Per-shape LOD configuration and its index-buffer lifecycle.
//!
//! ```text
//! ┌─────────┐  generate  ┌─────────┐  bind_buffer_data  ┌──────────┐
//! │ Unbuilt │───────────▶│  Built  │───────────────────▶│ Uploaded │
//! └─────────┘            └─────────┘                    └──────────┘
//!  (empty cache slot)     cpu sequences                  gpu buffers + counts
//! ```
//!
//! The `Uploaded` transition drops the CPU sequences; reading them afterwards
//! is an error, as is querying counts or binding before it.

use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};

use crate::core::{ChunkShape, LodSettings};
use crate::error::LodError;
use crate::gpu::{DrawTarget, IndexBackend, RenderContext};
use crate::selector::clamp_lod;
use crate::stats::UploadStats;
use crate::strip::build_detail_levels;

struct UploadedLevel<B> {
    buffer: B,
    index_count: u32,
}

enum IndexState<B> {
    Built { sequences: Vec<Vec<u32>> },
    Uploaded { levels: Vec<UploadedLevel<B>> },
}

/// Index topology for every level of one chunk shape.
///
/// Shared by reference across all chunks of the shape. `B` is the backend's
/// buffer type.
pub struct LodConfiguration<B> {
    shape: ChunkShape,
    step_multipliers: Vec<u32>,
    restart_sentinel: u32,
    state: RwLock<IndexState<B>>,
}

impl<B> LodConfiguration<B> {
    /// Validates `shape` against `settings` and builds every level.
    pub fn generate(shape: ChunkShape, settings: &LodSettings) -> Result<Self, LodError> {
        settings.validate()?;
        shape.validate(settings)?;
        let sentinel = shape.restart_sentinel()?;
        Ok(Self::from_validated(shape, &settings.step_multipliers, sentinel))
    }

    pub(crate) fn from_validated(shape: ChunkShape, steps: &[u32], restart_sentinel: u32) -> Self {
        let sequences = build_detail_levels(shape.grid_stride, steps, restart_sentinel);
        log::debug!(
            "generated {} lod levels for stride {} (grid {}): {:?} indices",
            sequences.len(),
            shape.grid_stride,
            shape.full_grid_size,
            sequences.iter().map(Vec::len).collect::<Vec<_>>()
        );
        Self {
            shape,
            step_multipliers: steps.to_vec(),
            restart_sentinel,
            state: RwLock::new(IndexState::Built { sequences }),
        }
    }

    pub fn shape(&self) -> ChunkShape {
        self.shape
    }

    pub fn grid_stride(&self) -> u32 {
        self.shape.grid_stride
    }

    pub fn full_grid_size(&self) -> u32 {
        self.shape.full_grid_size
    }

    /// Index value that ends a strip band.
    pub fn restart_sentinel(&self) -> u32 {
        self.restart_sentinel
    }

    pub fn level_count(&self) -> usize {
        self.step_multipliers.len()
    }

    pub fn step_multiplier(&self, level: usize) -> Option<u32> {
        self.step_multipliers.get(level).copied()
    }

    pub fn is_uploaded(&self) -> bool {
        matches!(*self.state.read(), IndexState::Uploaded { .. })
    }

    /// Clamps a requested level into this configuration's range.
    pub fn select(&self, requested: i32) -> usize {
        clamp_lod(requested, self.level_count())
    }

    /// CPU index sequence for `level`, available until upload.
    ///
    /// The returned guard holds a read lock; drop it before calling
    /// [`bind_buffer_data`](Self::bind_buffer_data).
    pub fn index_sequence(
        &self,
        level: usize,
    ) -> Result<MappedRwLockReadGuard<'_, [u32]>, LodError> {
        if level >= self.level_count() {
            return Err(LodError::LevelOutOfRange {
                level,
                levels: self.level_count(),
            });
        }
        RwLockReadGuard::try_map(self.state.read(), |state| match state {
            IndexState::Built { sequences } => Some(sequences[level].as_slice()),
            IndexState::Uploaded { .. } => None,
        })
        .map_err(|_| LodError::AlreadyUploaded)
    }

    /// Uploads every level, records element counts, releases the CPU
    /// sequences and programs primitive restart on `ctx`.
    ///
    /// Runs once per configuration; a failed upload leaves the sequences in
    /// place so it can be retried.
    pub fn bind_buffer_data<K, T>(
        &self,
        backend: &mut K,
        ctx: &mut RenderContext<T>,
    ) -> Result<UploadStats, LodError>
    where
        K: IndexBackend<Buffer = B>,
        T: DrawTarget<Buffer = B>,
    {
        let mut state = self.state.write();
        let sequences = match &*state {
            IndexState::Built { sequences } => sequences,
            IndexState::Uploaded { .. } => return Err(LodError::AlreadyUploaded),
        };

        let mut levels = Vec::with_capacity(sequences.len());
        let mut stats = UploadStats {
            levels: sequences.len(),
            ..UploadStats::default()
        };
        for (level, indices) in sequences.iter().enumerate() {
            let label = format!("chunk_lod.indices.s{}.lod{}", self.shape.grid_stride, level);
            let index_count = u32::try_from(indices.len()).map_err(|_| {
                LodError::Upload(format!("{label}: {} indices exceed u32", indices.len()))
            })?;
            let buffer = backend.upload_indices(&label, indices, self.restart_sentinel)?;
            stats.index_counts.push(index_count);
            stats.total_indices += indices.len();
            stats.bytes += std::mem::size_of_val(indices.as_slice()) as u64;
            levels.push(UploadedLevel {
                buffer,
                index_count,
            });
        }

        // Dropping the Built state frees the CPU sequences.
        *state = IndexState::Uploaded { levels };
        drop(state);

        ctx.program_restart(self.restart_sentinel);
        log::info!(
            "uploaded {} lod levels for stride {}: {} indices, {} bytes",
            stats.levels,
            self.shape.grid_stride,
            stats.total_indices,
            stats.bytes
        );
        Ok(stats)
    }

    /// Element count for the clamped level.
    pub fn indices_size(&self, lod: i32) -> Result<u32, LodError> {
        let level = self.select(lod);
        match &*self.state.read() {
            IndexState::Uploaded { levels } => Ok(levels[level].index_count),
            IndexState::Built { .. } => Err(LodError::NotUploaded),
        }
    }

    /// Binds the clamped level's buffer, reprogramming restart first if
    /// another shape's sentinel is current. Returns the level bound.
    pub fn bind_buffer<T>(&self, ctx: &mut RenderContext<T>, lod: i32) -> Result<usize, LodError>
    where
        T: DrawTarget<Buffer = B>,
    {
        let level = self.select(lod);
        let state = self.state.read();
        let IndexState::Uploaded { levels } = &*state else {
            return Err(LodError::NotUploaded);
        };
        ctx.program_restart(self.restart_sentinel);
        ctx.bind(&levels[level].buffer);
        log::trace!("bound lod {level} (requested {lod}) for stride {}", self.shape.grid_stride);
        Ok(level)
    }

    /// Binds and draws the clamped level. Returns the element count drawn.
    pub fn draw<T>(&self, ctx: &mut RenderContext<T>, lod: i32) -> Result<u32, LodError>
    where
        T: DrawTarget<Buffer = B>,
    {
        let level = self.bind_buffer(ctx, lod)?;
        let index_count = self.indices_size(level as i32)?;
        ctx.draw(index_count);
        Ok(index_count)
    }
}

impl<B> std::fmt::Debug for LodConfiguration<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LodConfiguration")
            .field("shape", &self.shape)
            .field("step_multipliers", &self.step_multipliers)
            .field("restart_sentinel", &self.restart_sentinel)
            .field("uploaded", &self.is_uploaded())
            .finish()
    }
}
