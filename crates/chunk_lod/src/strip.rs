//! Restart-delimited triangle-strip index generation.

use crate::addressing::{expected_index_count, rows_at_step, vertex_index};

/// Builds one level's strip: for every band, pairs of (far row, near row)
/// indices per column, closed by `restart_sentinel`.
///
/// `stride - 1` must be divisible by `step`; callers validate the shape first.
pub fn build_strip_bands(stride: u32, step: u32, restart_sentinel: u32) -> Vec<u32> {
    let rows = rows_at_step(stride, step);
    let mut indices = Vec::with_capacity(expected_index_count(stride, step));

    for band in 0..rows - 1 {
        for col in 0..rows {
            indices.push(vertex_index(band + 1, col, stride, step));
            indices.push(vertex_index(band, col, stride, step));
        }
        indices.push(restart_sentinel);
    }

    indices
}

/// Builds the strip for every step, finest first.
pub fn build_detail_levels(stride: u32, steps: &[u32], restart_sentinel: u32) -> Vec<Vec<u32>> {
    steps
        .iter()
        .map(|&step| build_strip_bands(stride, step, restart_sentinel))
        .collect()
}
