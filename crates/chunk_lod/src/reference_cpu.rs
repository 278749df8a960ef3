//! CPU decoding of restart-delimited triangle strips.
//!
//! Mirrors how the GPU assembles primitives so topology can be checked (or
//! reused for collision) without a device.

/// Splits a sequence into its strips, dropping the restart markers.
pub fn split_bands(indices: &[u32], restart_sentinel: u32) -> impl Iterator<Item = &[u32]> {
    indices
        .split(move |&i| i == restart_sentinel)
        .filter(|band| !band.is_empty())
}

/// Assembles triangles from a restart-delimited strip.
///
/// Odd positions within a strip swap their first two vertices so every
/// triangle keeps the winding of the first. Degenerate triangles are dropped.
pub fn strip_triangles(indices: &[u32], restart_sentinel: u32) -> Vec<[u32; 3]> {
    let mut triangles = Vec::new();
    for band in split_bands(indices, restart_sentinel) {
        for (k, w) in band.windows(3).enumerate() {
            let tri = if k % 2 == 0 {
                [w[0], w[1], w[2]]
            } else {
                [w[1], w[0], w[2]]
            };
            if tri[0] == tri[1] || tri[1] == tri[2] || tri[0] == tri[2] {
                continue;
            }
            triangles.push(tri);
        }
    }
    triangles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strip::build_strip_bands;

    #[test]
    fn single_quad_decodes_to_two_triangles() {
        let indices = build_strip_bands(5, 4, 64);
        let tris = strip_triangles(&indices, 64);
        assert_eq!(tris, vec![[20, 0, 24], [24, 0, 4]]);
    }

    #[test]
    fn restart_prevents_bridging_bands() {
        let indices = build_strip_bands(5, 2, 64);
        assert_eq!(split_bands(&indices, 64).count(), 2);
        let tris = strip_triangles(&indices, 64);
        assert_eq!(tris.len(), 8);
        // No triangle mixes band 0's near row with band 1's far row.
        for tri in &tris {
            let rows: Vec<u32> = tri.iter().map(|i| i / 5).collect();
            let min = *rows.iter().min().unwrap();
            let max = *rows.iter().max().unwrap();
            assert_eq!(max - min, 2);
        }
    }

    #[test]
    fn winding_is_consistent() {
        // Signed area in (col, row) space has the same sign for every triangle.
        let stride = 9;
        let indices = build_strip_bands(stride, 1, 81);
        let tris = strip_triangles(&indices, 81);
        let area = |t: &[u32; 3]| {
            let p: Vec<(i64, i64)> = t
                .iter()
                .map(|&i| ((i % stride) as i64, (i / stride) as i64))
                .collect();
            (p[1].0 - p[0].0) * (p[2].1 - p[0].1) - (p[2].0 - p[0].0) * (p[1].1 - p[0].1)
        };
        let first = area(&tris[0]).signum();
        assert_ne!(first, 0);
        assert!(tris.iter().all(|t| area(t).signum() == first));
    }

    #[test]
    fn degenerate_triangles_are_skipped() {
        let tris = strip_triangles(&[0, 1, 1, 2, 3], u32::MAX);
        assert_eq!(tris, vec![[1, 2, 3]]);
    }
}
