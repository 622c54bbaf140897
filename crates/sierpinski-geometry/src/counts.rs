//! Closed-form sizes of the generated buffers.
//!
//! Each subdivision step appends 3 vertices and records 3 triangles one level
//! deeper, so every level triples the previous one.

/// Number of triangles recorded at `level` (`3^level`).
#[inline]
pub const fn triangle_count(level: usize) -> usize {
    3usize.pow(level as u32)
}

/// Number of `u32` indices recorded at `level`.
#[inline]
pub const fn index_count(level: usize) -> usize {
    3 * triangle_count(level)
}

/// Size of the vertex pool for a mesh with `depth` levels.
///
/// `3 + 3 * (3^0 + 3^1 + ... + 3^(depth - 2))`, i.e. the root corners plus
/// three midpoints for every triangle that gets split. Returns 0 for depth 0.
#[inline]
pub const fn vertex_count(depth: usize) -> usize {
    if depth == 0 {
        return 0;
    }
    3 + 3 * (triangle_count(depth - 1) - 1) / 2
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── triangle_count ────────────────────────────────────────────────────

    #[test]
    fn triangles_triple_per_level() {
        assert_eq!(triangle_count(0), 1);
        assert_eq!(triangle_count(1), 3);
        assert_eq!(triangle_count(2), 9);
        assert_eq!(triangle_count(5), 243);
    }

    #[test]
    fn index_count_is_three_per_triangle() {
        assert_eq!(index_count(0), 3);
        assert_eq!(index_count(3), 81);
    }

    // ── vertex_count ──────────────────────────────────────────────────────

    #[test]
    fn vertex_count_matches_series() {
        for depth in 2..10 {
            let series: usize = (0..depth - 1).map(triangle_count).sum();
            assert_eq!(vertex_count(depth), 3 + 3 * series, "depth {depth}");
        }
    }

    #[test]
    fn vertex_count_small_depths() {
        assert_eq!(vertex_count(0), 0);
        assert_eq!(vertex_count(1), 3);
        assert_eq!(vertex_count(2), 6);
        assert_eq!(vertex_count(3), 15);
        assert_eq!(vertex_count(11), 88_575);
    }
}
