//! Level selection: clamping requests and deriving them from camera distance.

use glam::Vec3;

use crate::core::LodSettings;

/// Clamps a requested level into `[0, level_count)`.
///
/// Level 0 is the finest. `level_count` must be at least 1.
#[inline]
pub fn clamp_lod(requested: i32, level_count: usize) -> usize {
    let max = level_count.saturating_sub(1).min(i32::MAX as usize) as i32;
    requested.clamp(0, max) as usize
}

#[derive(Debug, Clone)]
pub struct LodSelector {
    level_count: usize,
    lod_distances: Vec<f32>,
}

impl LodSelector {
    pub fn new(settings: &LodSettings) -> Self {
        Self {
            level_count: settings.level_count(),
            lod_distances: settings.lod_distances.clone(),
        }
    }

    pub fn level_count(&self) -> usize {
        self.level_count
    }

    pub fn select(&self, requested: i32) -> usize {
        clamp_lod(requested, self.level_count)
    }

    /// Requested level for a chunk `distance` away: the number of thresholds
    /// the distance has reached.
    pub fn lod_for_distance(&self, distance: f32) -> i32 {
        self.lod_distances
            .iter()
            .take_while(|&&threshold| distance >= threshold)
            .count() as i32
    }

    pub fn lod_for_camera(&self, chunk_center: Vec3, camera: Vec3) -> i32 {
        self.lod_for_distance(chunk_center.distance(camera))
    }
}
