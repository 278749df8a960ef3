//! Triangle-strip LOD index topology for heightmap chunks.
//!
//! Every chunk of a given shape shares one [`LodConfiguration`]: a
//! restart-delimited strip per level, uploaded once to index buffers and then
//! selected per draw.
//!
//! # Example
//!
//! ```
//! use chunk_lod::gpu::headless::{HeadlessBackend, HeadlessBuffer, HeadlessTarget};
//! use chunk_lod::{LodCache, RenderContext};
//!
//! # fn main() -> Result<(), chunk_lod::LodError> {
//! let cache: LodCache<HeadlessBuffer> = LodCache::default();
//! let config = cache.generate_detail_levels(8, 5)?;
//! assert_eq!(config.restart_sentinel(), 64);
//!
//! let mut ctx = RenderContext::new(HeadlessTarget::default());
//! config.bind_buffer_data(&mut HeadlessBackend::new(), &mut ctx)?;
//!
//! let lod = cache.selector().lod_for_distance(300.0);
//! assert_eq!(config.draw(&mut ctx, lod)?, 5);
//! # Ok(())
//! # }
//! ```

pub mod addressing;
pub mod cache;
pub mod config;
pub mod core;
pub mod error;
pub mod gpu;
pub mod reference_cpu;
pub mod selector;
pub mod stats;
pub mod strip;

pub use crate::cache::LodCache;
pub use crate::config::LodConfiguration;
pub use crate::core::{ChunkShape, LodSettings};
pub use crate::error::LodError;
pub use crate::gpu::{DrawTarget, IndexBackend, RenderContext};
pub use crate::selector::LodSelector;
pub use crate::stats::{CacheStats, UploadStats};
