//! Shape-keyed cache of LOD configurations.
//!
//! The map lock is held only long enough to find or insert a shape's slot;
//! each slot is a `OnceLock`, so concurrent first requests for the same shape
//! build it exactly once while other shapes proceed in parallel.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use crate::config::LodConfiguration;
use crate::core::{ChunkShape, LodSettings};
use crate::error::LodError;
use crate::selector::LodSelector;
use crate::stats::CacheStats;

type Slot<B> = Arc<OnceLock<Arc<LodConfiguration<B>>>>;

pub struct LodCache<B> {
    settings: LodSettings,
    selector: LodSelector,
    slots: Mutex<HashMap<ChunkShape, Slot<B>>>,
    builds: AtomicUsize,
    hits: AtomicUsize,
}

impl<B> LodCache<B> {
    pub fn new(settings: LodSettings) -> Result<Self, LodError> {
        settings.validate()?;
        Ok(Self {
            selector: LodSelector::new(&settings),
            settings,
            slots: Mutex::new(HashMap::new()),
            builds: AtomicUsize::new(0),
            hits: AtomicUsize::new(0),
        })
    }

    pub fn settings(&self) -> &LodSettings {
        &self.settings
    }

    pub fn selector(&self) -> &LodSelector {
        &self.selector
    }

    /// Returns the configuration for `(full_grid_size, grid_stride)`,
    /// generating it on first request.
    pub fn generate_detail_levels(
        &self,
        full_grid_size: u32,
        grid_stride: u32,
    ) -> Result<Arc<LodConfiguration<B>>, LodError> {
        let shape = ChunkShape::new(full_grid_size, grid_stride);
        if let Err(err) = shape.validate(&self.settings) {
            log::warn!("rejected chunk shape {shape:?}: {err}");
            return Err(err);
        }
        let sentinel = shape.restart_sentinel()?;

        let slot = Arc::clone(self.slots.lock().entry(shape).or_default());

        let mut built = false;
        let config = slot.get_or_init(|| {
            built = true;
            Arc::new(LodConfiguration::from_validated(
                shape,
                &self.settings.step_multipliers,
                sentinel,
            ))
        });

        if built {
            self.builds.fetch_add(1, Ordering::Relaxed);
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
            log::debug!("reusing lod configuration for {shape:?}");
        }
        Ok(Arc::clone(config))
    }

    /// Cached configuration for `shape`, if it has been generated.
    pub fn get(&self, shape: ChunkShape) -> Option<Arc<LodConfiguration<B>>> {
        let slots = self.slots.lock();
        slots.get(&shape).and_then(|slot| slot.get().cloned())
    }

    /// Removes `shape`; chunks still holding the configuration keep it alive.
    pub fn evict(&self, shape: ChunkShape) -> Option<Arc<LodConfiguration<B>>> {
        let slot = self.slots.lock().remove(&shape)?;
        slot.get().cloned()
    }

    pub fn clear(&self) {
        self.slots.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            shapes: self.len(),
            builds: self.builds.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
        }
    }
}

impl<B> Default for LodCache<B> {
    fn default() -> Self {
        let settings = LodSettings::default();
        Self {
            selector: LodSelector::new(&settings),
            settings,
            slots: Mutex::new(HashMap::new()),
            builds: AtomicUsize::new(0),
            hits: AtomicUsize::new(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Barrier;
    use std::thread;

    use rand::Rng;

    use super::*;
    use crate::addressing::{rows_at_step, vertex_index};
    use crate::gpu::headless::{HeadlessBackend, HeadlessBuffer, HeadlessTarget};
    use crate::gpu::RenderContext;

    type Cache = LodCache<HeadlessBuffer>;

    #[test]
    fn same_shape_is_built_once() {
        let cache = Cache::default();
        let a = cache.generate_detail_levels(8, 5).unwrap();
        let b = cache.generate_detail_levels(8, 5).unwrap();
        let c = cache.generate_detail_levels(16, 5).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(c.restart_sentinel(), 256);
        assert_eq!(
            cache.stats(),
            CacheStats {
                shapes: 2,
                builds: 2,
                hits: 1
            }
        );
    }

    #[test]
    fn concurrent_requests_build_once() {
        let cache = Cache::default();
        let threads = 8;
        let barrier = Barrier::new(threads);

        let configs: Vec<_> = thread::scope(|s| {
            let handles: Vec<_> = (0..threads)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        cache.generate_detail_levels(257, 129).unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(configs.iter().all(|c| Arc::ptr_eq(c, &configs[0])));
        let stats = cache.stats();
        assert_eq!(stats.builds, 1);
        assert_eq!(stats.hits, threads - 1);
    }

    #[test]
    fn invalid_shapes_leave_no_slot() {
        let cache = Cache::default();
        assert_eq!(
            cache.generate_detail_levels(16, 7).unwrap_err(),
            LodError::StrideNotDivisible { span: 6, step: 4 }
        );
        assert!(cache.is_empty());
        assert_eq!(cache.stats().builds, 0);
    }

    #[test]
    fn custom_steps() {
        let settings = LodSettings {
            step_multipliers: vec![1, 2, 4, 8],
            lod_distances: vec![50.0, 100.0, 200.0],
        };
        let cache = Cache::new(settings).unwrap();
        assert!(cache.generate_detail_levels(64, 13).is_err());

        let config = cache.generate_detail_levels(64, 9).unwrap();
        assert_eq!(config.level_count(), 4);
        assert_eq!(config.index_sequence(3).unwrap().len(), 5);
        assert_eq!(cache.selector().select(10), 3);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let settings = LodSettings {
            step_multipliers: vec![1, 2, 4],
            lod_distances: vec![],
        };
        assert!(matches!(
            Cache::new(settings),
            Err(LodError::InvalidSettings(_))
        ));
    }

    #[test]
    fn evicted_configuration_outlives_cache_entry() {
        let cache = Cache::default();
        let shape = ChunkShape::new(8, 5);
        let held = cache.generate_detail_levels(8, 5).unwrap();

        let evicted = cache.evict(shape).unwrap();
        assert!(Arc::ptr_eq(&held, &evicted));
        assert!(cache.get(shape).is_none());
        assert_eq!(held.index_sequence(0).unwrap().len(), 44);

        let rebuilt = cache.generate_detail_levels(8, 5).unwrap();
        assert!(!Arc::ptr_eq(&held, &rebuilt));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn uploaded_configuration_is_shared() {
        let cache = Cache::default();
        let mut ctx = RenderContext::new(HeadlessTarget::default());
        let first = cache.generate_detail_levels(8, 5).unwrap();
        first
            .bind_buffer_data(&mut HeadlessBackend::new(), &mut ctx)
            .unwrap();

        let second = cache.get(ChunkShape::new(8, 5)).unwrap();
        assert!(second.is_uploaded());
        assert_eq!(second.indices_size(0), Ok(44));
    }

    #[test]
    fn random_shapes_keep_sentinel_exclusive() {
        let _ = env_logger::builder().is_test(true).try_init();
        let cache = Cache::default();
        let mut rng = rand::thread_rng();

        for _ in 0..32 {
            let stride = 4 * rng.gen_range(1..=32) + 1;
            let full = rng.gen_range(stride..=stride * 4);
            let config = cache.generate_detail_levels(full, stride).unwrap();
            let sentinel = config.restart_sentinel();
            assert_eq!(sentinel, full * full);

            for level in 0..config.level_count() {
                let step = config.step_multiplier(level).unwrap();
                let rows = rows_at_step(stride, step);
                for row in 0..rows {
                    for col in 0..rows {
                        assert_ne!(vertex_index(row, col, stride, step), sentinel);
                    }
                }

                let seq = config.index_sequence(level).unwrap();
                let markers = seq.iter().filter(|&&i| i == sentinel).count();
                assert_eq!(markers, (rows - 1) as usize);
                assert!(seq.iter().all(|&i| i == sentinel || i < full * full));
            }
        }
    }
}
