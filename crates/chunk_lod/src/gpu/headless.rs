//! In-memory backend and command recorder for running without a device.

use super::{DrawTarget, IndexBackend};
use crate::error::LodError;

/// Index buffer held in CPU memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessBuffer {
    pub id: u32,
    pub label: String,
    pub indices: Vec<u32>,
    pub restart_sentinel: u32,
}

/// Backend that keeps uploads in memory.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next_id: u32,
    uploaded_bytes: u64,
    upload_limit: Option<u32>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that fails every upload after the first `limit`.
    pub fn with_upload_limit(limit: u32) -> Self {
        Self {
            upload_limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn upload_count(&self) -> u32 {
        self.next_id
    }

    pub fn uploaded_bytes(&self) -> u64 {
        self.uploaded_bytes
    }
}

impl IndexBackend for HeadlessBackend {
    type Buffer = HeadlessBuffer;

    fn upload_indices(
        &mut self,
        label: &str,
        indices: &[u32],
        restart_sentinel: u32,
    ) -> Result<HeadlessBuffer, LodError> {
        if self.upload_limit.is_some_and(|limit| self.next_id >= limit) {
            return Err(LodError::Upload(format!("{label}: upload limit reached")));
        }
        let id = self.next_id;
        self.next_id += 1;
        self.uploaded_bytes += std::mem::size_of_val(indices) as u64;
        Ok(HeadlessBuffer {
            id,
            label: label.to_owned(),
            indices: indices.to_vec(),
            restart_sentinel,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCommand {
    EnableRestart(u32),
    Bind(u32),
    Draw(u32),
}

/// Records draw commands and checks them against the programmed restart value.
#[derive(Debug, Default)]
pub struct HeadlessTarget {
    commands: Vec<DrawCommand>,
    restart: Option<u32>,
    bound: Option<(u32, u32)>,
    mismatched_draws: usize,
}

impl HeadlessTarget {
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Id of the currently bound buffer.
    pub fn bound_buffer(&self) -> Option<u32> {
        self.bound.map(|(id, _)| id)
    }

    /// Draws issued while the restart value differed from the bound buffer's
    /// sentinel (or with nothing bound).
    pub fn mismatched_draws(&self) -> usize {
        self.mismatched_draws
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl DrawTarget for HeadlessTarget {
    type Buffer = HeadlessBuffer;

    fn enable_primitive_restart(&mut self, sentinel: u32) {
        self.restart = Some(sentinel);
        self.commands.push(DrawCommand::EnableRestart(sentinel));
    }

    fn bind_index_buffer(&mut self, buffer: &HeadlessBuffer) {
        self.bound = Some((buffer.id, buffer.restart_sentinel));
        self.commands.push(DrawCommand::Bind(buffer.id));
    }

    fn draw_strip(&mut self, index_count: u32) {
        match self.bound {
            Some((_, sentinel)) if self.restart == Some(sentinel) => {}
            _ => self.mismatched_draws += 1,
        }
        self.commands.push(DrawCommand::Draw(index_count));
    }
}
