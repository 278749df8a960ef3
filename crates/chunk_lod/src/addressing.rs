//! Row-major addressing into a chunk's dense vertex grid.
//!
//! Every level reads from the same grid; a coarser level only scales the
//! flat index by its step, so vertex data is never duplicated per level.

/// Flat vertex index of `(row, col)` at a level with the given step.
#[inline]
pub fn vertex_index(row: u32, col: u32, stride: u32, step: u32) -> u32 {
    (row * stride + col) * step
}

/// Vertices along one side of the chunk when reading every `step`-th vertex.
#[inline]
pub fn rows_at_step(stride: u32, step: u32) -> u32 {
    (stride - 1) / step + 1
}

/// Number of row bands (strips) at a level.
#[inline]
pub fn band_count(stride: u32, step: u32) -> u32 {
    rows_at_step(stride, step) - 1
}

/// Length of a level's index sequence: two indices per column plus one
/// restart sentinel per band.
#[inline]
pub fn expected_index_count(stride: u32, step: u32) -> usize {
    let rows = rows_at_step(stride, step) as usize;
    (rows - 1) * (2 * rows + 1)
}
