//! GPU seams for index upload and strip drawing.
//!
//! `IndexBackend` owns buffer creation; `DrawTarget` is whatever records draw
//! commands (a wgpu render pass, or the headless recorder). Primitive-restart
//! state is global to the pipeline, so draws go through a [`RenderContext`]
//! that remembers which sentinel is currently programmed.

pub mod headless;
pub mod wgpu_backend;

use crate::error::LodError;

/// Creates GPU-resident index buffers.
pub trait IndexBackend {
    type Buffer;

    /// Uploads `indices` to a new index buffer. `restart_sentinel` marks the
    /// entries that end a strip; backends with a fixed restart value rewrite
    /// them.
    fn upload_indices(
        &mut self,
        label: &str,
        indices: &[u32],
        restart_sentinel: u32,
    ) -> Result<Self::Buffer, LodError>;
}

/// Receives bind and draw commands for strip geometry.
pub trait DrawTarget {
    type Buffer;

    /// Enables primitive restart and sets the comparison value.
    fn enable_primitive_restart(&mut self, sentinel: u32);

    fn bind_index_buffer(&mut self, buffer: &Self::Buffer);

    /// Draws `index_count` indices from the bound buffer as a triangle strip.
    fn draw_strip(&mut self, index_count: u32);
}

/// Draw-time state threaded through every chunk draw.
pub struct RenderContext<T> {
    target: T,
    restart_sentinel: Option<u32>,
}

impl<T> RenderContext<T> {
    pub fn new(target: T) -> Self {
        Self {
            target,
            restart_sentinel: None,
        }
    }

    /// Sentinel currently programmed, if any.
    pub fn restart_sentinel(&self) -> Option<u32> {
        self.restart_sentinel
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    pub fn into_target(self) -> T {
        self.target
    }
}

impl<T: DrawTarget> RenderContext<T> {
    /// Programs `sentinel` unless it is already current.
    pub fn program_restart(&mut self, sentinel: u32) {
        if self.restart_sentinel == Some(sentinel) {
            return;
        }
        log::trace!(
            "primitive restart {:?} -> {}",
            self.restart_sentinel,
            sentinel
        );
        self.target.enable_primitive_restart(sentinel);
        self.restart_sentinel = Some(sentinel);
    }

    pub(crate) fn bind(&mut self, buffer: &T::Buffer) {
        self.target.bind_index_buffer(buffer);
    }

    pub(crate) fn draw(&mut self, index_count: u32) {
        self.target.draw_strip(index_count);
    }
}
