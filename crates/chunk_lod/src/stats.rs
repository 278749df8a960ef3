//! Statistics for uploads and shape caching.

/// Result of uploading one configuration's index buffers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UploadStats {
    /// Number of levels uploaded.
    pub levels: usize,
    /// Element count per level, finest first.
    pub index_counts: Vec<u32>,
    /// Sum of all level element counts.
    pub total_indices: usize,
    /// Bytes handed to the backend.
    pub bytes: u64,
}

impl UploadStats {
    /// Share of the upload spent on the finest level.
    pub fn finest_fraction(&self) -> f32 {
        match self.index_counts.first() {
            Some(&finest) if self.total_indices > 0 => finest as f32 / self.total_indices as f32,
            _ => 0.0,
        }
    }
}

/// Counters for a shape cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Shapes currently cached.
    pub shapes: usize,
    /// Configurations generated.
    pub builds: usize,
    /// Requests served from an existing configuration.
    pub hits: usize,
}

impl CacheStats {
    pub fn requests(&self) -> usize {
        self.builds + self.hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finest_fraction() {
        let stats = UploadStats {
            levels: 3,
            index_counts: vec![44, 14, 5],
            total_indices: 63,
            bytes: 252,
        };
        assert!((stats.finest_fraction() - 44.0 / 63.0).abs() < 1e-6);
        assert_eq!(UploadStats::default().finest_fraction(), 0.0);
    }

    #[test]
    fn cache_requests() {
        let stats = CacheStats {
            shapes: 2,
            builds: 2,
            hits: 5,
        };
        assert_eq!(stats.requests(), 7);
    }
}
