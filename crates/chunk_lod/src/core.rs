use crate::error::LodError;

/// Identity of a chunk's index topology.
///
/// Chunks that share a shape share one generated configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkShape {
    /// Row width used to address vertices inside a chunk's backing grid.
    pub grid_stride: u32,
    /// Side length of the whole vertex grid. Only used to derive the sentinel.
    pub full_grid_size: u32,
}

impl ChunkShape {
    pub const fn new(full_grid_size: u32, grid_stride: u32) -> Self {
        Self {
            grid_stride,
            full_grid_size,
        }
    }

    /// `full_grid_size²`, one past the largest index in the full grid.
    pub fn restart_sentinel(&self) -> Result<u32, LodError> {
        let sentinel = self.full_grid_size as u64 * self.full_grid_size as u64;
        u32::try_from(sentinel).map_err(|_| LodError::SentinelOverflow {
            full_grid_size: self.full_grid_size,
        })
    }

    /// Largest vertex index a chunk of this shape can address.
    pub fn max_vertex_index(&self) -> u32 {
        let last = self.grid_stride.saturating_sub(1);
        last.saturating_mul(self.grid_stride).saturating_add(last)
    }

    pub fn validate(&self, settings: &LodSettings) -> Result<(), LodError> {
        if self.grid_stride < 2 {
            return Err(LodError::StrideTooSmall(self.grid_stride));
        }
        if self.grid_stride > self.full_grid_size {
            return Err(LodError::StrideExceedsGrid {
                grid_stride: self.grid_stride,
                full_grid_size: self.full_grid_size,
            });
        }
        self.restart_sentinel()?;

        // Steps are powers of two, so divisibility by the coarsest covers the rest.
        let span = self.grid_stride - 1;
        if let Some(&step) = settings.step_multipliers.last() {
            if span % step != 0 {
                return Err(LodError::StrideNotDivisible { span, step });
            }
        }
        Ok(())
    }
}

/// LOD configuration shared by every shape in a cache.
#[derive(Debug, Clone)]
pub struct LodSettings {
    /// Vertex step per level, finest first. Each entry is a power of two.
    pub step_multipliers: Vec<u32>,
    /// Camera distance at which level `k + 1` takes over from level `k`.
    pub lod_distances: Vec<f32>,
}

impl Default for LodSettings {
    fn default() -> Self {
        Self {
            step_multipliers: vec![1, 2, 4],
            lod_distances: vec![128.0, 256.0],
        }
    }
}

impl LodSettings {
    pub fn level_count(&self) -> usize {
        self.step_multipliers.len()
    }

    pub fn validate(&self) -> Result<(), LodError> {
        if self.step_multipliers.is_empty() {
            return Err(LodError::InvalidSettings(
                "step_multipliers must not be empty".into(),
            ));
        }
        if let Some(&bad) = self
            .step_multipliers
            .iter()
            .find(|s| !s.is_power_of_two())
        {
            return Err(LodError::InvalidSettings(format!(
                "step multiplier {bad} is not a power of two"
            )));
        }
        if self.step_multipliers.windows(2).any(|w| w[0] >= w[1]) {
            return Err(LodError::InvalidSettings(
                "step_multipliers must be strictly increasing".into(),
            ));
        }
        if self.lod_distances.len() + 1 != self.step_multipliers.len() {
            return Err(LodError::InvalidSettings(format!(
                "expected {} lod distances for {} levels (got {})",
                self.step_multipliers.len() - 1,
                self.step_multipliers.len(),
                self.lod_distances.len()
            )));
        }
        if self.lod_distances.iter().any(|d| !d.is_finite() || *d < 0.0) {
            return Err(LodError::InvalidSettings(
                "lod distances must be finite and >= 0".into(),
            ));
        }
        if self.lod_distances.windows(2).any(|w| w[0] >= w[1]) {
            return Err(LodError::InvalidSettings(
                "lod distances must be strictly increasing".into(),
            ));
        }
        Ok(())
    }
}
