//! wgpu implementation of the index seams.
//!
//! wgpu has no programmable restart value: a pipeline created with
//! `strip_index_format: Some(Uint32)` restarts strips on `u32::MAX`. Uploads
//! therefore rewrite each sentinel to that value, and "programming" restart on
//! a render pass is a matter of using a pipeline built from
//! [`strip_primitive_state`].

use std::borrow::Cow;

use wgpu::util::DeviceExt;

use super::{DrawTarget, IndexBackend};
use crate::error::LodError;

/// Restart value wgpu uses for `IndexFormat::Uint32` strips.
pub const WGPU_STRIP_RESTART: u32 = u32::MAX;

/// Primitive state for pipelines that draw chunk strips.
pub fn strip_primitive_state() -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleStrip,
        strip_index_format: Some(wgpu::IndexFormat::Uint32),
        ..Default::default()
    }
}

/// Replaces `restart_sentinel` entries with [`WGPU_STRIP_RESTART`].
pub fn remap_restart(indices: &[u32], restart_sentinel: u32) -> Cow<'_, [u32]> {
    if restart_sentinel == WGPU_STRIP_RESTART || !indices.contains(&restart_sentinel) {
        return Cow::Borrowed(indices);
    }
    Cow::Owned(
        indices
            .iter()
            .map(|&i| if i == restart_sentinel { WGPU_STRIP_RESTART } else { i })
            .collect(),
    )
}

/// Uploads index sequences with a borrowed device.
pub struct WgpuIndexBackend<'a> {
    device: &'a wgpu::Device,
    max_buffer_size: u64,
}

impl<'a> WgpuIndexBackend<'a> {
    pub fn new(device: &'a wgpu::Device) -> Self {
        Self {
            device,
            max_buffer_size: device.limits().max_buffer_size,
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        self.device
    }

    fn ensure_buffer_fits(&self, bytes: u64, label: &str) -> Result<(), LodError> {
        if bytes > self.max_buffer_size {
            return Err(LodError::Upload(format!(
                "{label}: buffer size {} bytes exceeds max {} bytes",
                bytes, self.max_buffer_size
            )));
        }
        Ok(())
    }
}

impl IndexBackend for WgpuIndexBackend<'_> {
    type Buffer = wgpu::Buffer;

    fn upload_indices(
        &mut self,
        label: &str,
        indices: &[u32],
        restart_sentinel: u32,
    ) -> Result<wgpu::Buffer, LodError> {
        let bytes = std::mem::size_of_val(indices) as u64;
        self.ensure_buffer_fits(bytes, label)?;

        let remapped = remap_restart(indices, restart_sentinel);
        let contents: &[u32] = &remapped;
        Ok(self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(contents),
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            }))
    }
}

impl DrawTarget for wgpu::RenderPass<'_> {
    type Buffer = wgpu::Buffer;

    fn enable_primitive_restart(&mut self, sentinel: u32) {
        // Restart is part of the pipeline's primitive state; sentinels were
        // rewritten to WGPU_STRIP_RESTART at upload.
        log::trace!("restart sentinel {sentinel} mapped to {WGPU_STRIP_RESTART:#x}");
    }

    fn bind_index_buffer(&mut self, buffer: &wgpu::Buffer) {
        self.set_index_buffer(buffer.slice(..), wgpu::IndexFormat::Uint32);
    }

    fn draw_strip(&mut self, index_count: u32) {
        self.draw_indexed(0..index_count, 0, 0..1);
    }
}
