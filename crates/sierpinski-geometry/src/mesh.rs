use crate::counts::{triangle_count, vertex_count};
use crate::error::GeometryError;

/// A vertex position `(x, y, z)`.
pub type Point = [f32; 3];

/// Three indices into the vertex pool forming one triangle.
pub type Triangle = [u32; 3];

/// Deepest supported mesh.
///
/// Each level triples the work. Depth 14 holds ~2.4M vertices and ~2.4M
/// triangles, about 57 MB of vertex and index data kept on both the host and
/// the GPU. Its last level already has more triangles than an 800x600 window
/// has pixels, so depth 15 would triple memory and startup generation time
/// for no visible detail.
pub const MAX_DEPTH: usize = 14;

/// Depth used when none is configured.
pub const DEFAULT_DEPTH: usize = 11;

/// Root triangle corners in clip space: bottom-left, bottom-right, top.
pub const DEFAULT_ROOT: [Point; 3] = [
    [-1.0, -1.0, 0.0],
    [1.0, -1.0, 0.0],
    [0.0, 1.0, 0.0],
];

/// Generated Sierpinski geometry.
///
/// Invariants:
/// - `vertices[0..3]` are the root corners, unchanged.
/// - `levels.len() == depth`, `levels[0] == [[0, 1, 2]]`.
/// - `levels[l].len() == 3^l`.
/// - every index is a valid offset into `vertices`.
#[derive(Debug, Clone, PartialEq)]
pub struct SierpinskiMesh {
    vertices: Vec<Point>,
    levels: Vec<Vec<Triangle>>,
}

impl SierpinskiMesh {
    /// Number of levels (the configured depth).
    #[inline]
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Shared vertex pool referenced by every level.
    #[inline]
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Index tables, one per level.
    #[inline]
    pub fn levels(&self) -> &[Vec<Triangle>] {
        &self.levels
    }

    /// Triangles of a single level, or `None` past the last level.
    #[inline]
    pub fn level(&self, level: usize) -> Option<&[Triangle]> {
        self.levels.get(level).map(Vec::as_slice)
    }

    /// Total triangle count across all levels.
    pub fn triangle_total(&self) -> usize {
        self.levels.iter().map(Vec::len).sum()
    }
}

/// Generates a Sierpinski mesh with `depth` levels from the given root corners.
///
/// `root` is ordered left, right, top. The output is a pure function of
/// `depth` and `root`.
pub fn generate(depth: usize, root: [Point; 3]) -> Result<SierpinskiMesh, GeometryError> {
    if depth == 0 || depth > MAX_DEPTH {
        return Err(GeometryError::DepthOutOfRange { depth, max: MAX_DEPTH });
    }

    let mut builder = MeshBuilder::new(depth, root);
    builder.subdivide(0, 1, 2, 1);
    Ok(builder.finish())
}

/// Write cursors for the recursion: the growing vertex pool and the per-level
/// index tables. Passed by `&mut` through every step.
struct MeshBuilder {
    depth: usize,
    vertices: Vec<Point>,
    levels: Vec<Vec<Triangle>>,

    /// `(pool length, triangle)` for every recorded triangle, in order.
    #[cfg(test)]
    trace: Vec<(usize, Triangle)>,
}

impl MeshBuilder {
    fn new(depth: usize, root: [Point; 3]) -> Self {
        let mut vertices = Vec::with_capacity(vertex_count(depth));
        vertices.extend_from_slice(&root);

        let mut levels: Vec<Vec<Triangle>> = (0..depth)
            .map(|level| Vec::with_capacity(triangle_count(level)))
            .collect();
        levels[0].push([0, 1, 2]);

        Self {
            depth,
            vertices,
            levels,
            #[cfg(test)]
            trace: Vec::new(),
        }
    }

    /// Splits triangle `(left, right, top)` and records its three corner
    /// children at `level`, then recurses into each child.
    fn subdivide(&mut self, left: u32, right: u32, top: u32, level: usize) {
        if level == self.depth {
            return;
        }

        let lt = self.push_midpoint(left, top);
        let tr = self.push_midpoint(top, right);
        let rl = self.push_midpoint(left, right);

        // The center triangle (lt, tr, rl) is the hole and is never recorded.
        self.record(level, [left, rl, lt]);
        self.record(level, [rl, right, tr]);
        self.record(level, [lt, tr, top]);

        self.subdivide(left, rl, lt, level + 1);
        self.subdivide(rl, right, tr, level + 1);
        self.subdivide(lt, tr, top, level + 1);
    }

    fn push_midpoint(&mut self, a: u32, b: u32) -> u32 {
        let pa = self.vertices[a as usize];
        let pb = self.vertices[b as usize];
        let index = self.vertices.len() as u32;
        self.vertices.push([midpoint(pa[0], pb[0]), midpoint(pa[1], pb[1]), 0.0]);
        index
    }

    fn record(&mut self, level: usize, tri: Triangle) {
        debug_assert!(tri.iter().all(|&i| (i as usize) < self.vertices.len()));
        #[cfg(test)]
        self.trace.push((self.vertices.len(), tri));
        self.levels[level].push(tri);
    }

    fn finish(self) -> SierpinskiMesh {
        debug_assert_eq!(self.vertices.len(), vertex_count(self.depth));
        SierpinskiMesh {
            vertices: self.vertices,
            levels: self.levels,
        }
    }
}

#[inline]
fn midpoint(a: f32, b: f32) -> f32 {
    (a + b) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh(depth: usize) -> SierpinskiMesh {
        generate(depth, DEFAULT_ROOT).unwrap()
    }

    // ── depth validation ──────────────────────────────────────────────────

    #[test]
    fn depth_zero_rejected() {
        let err = generate(0, DEFAULT_ROOT).unwrap_err();
        assert_eq!(err, GeometryError::DepthOutOfRange { depth: 0, max: MAX_DEPTH });
    }

    #[test]
    fn depth_above_max_rejected() {
        assert!(generate(MAX_DEPTH + 1, DEFAULT_ROOT).is_err());
    }

    #[test]
    fn depth_one_is_root_only() {
        let m = mesh(1);
        assert_eq!(m.depth(), 1);
        assert_eq!(m.vertices(), &DEFAULT_ROOT);
        assert_eq!(m.level(0), Some(&[[0, 1, 2]][..]));
    }

    // ── shape of the output ───────────────────────────────────────────────

    #[test]
    fn level_sizes_triple() {
        let m = mesh(6);
        assert_eq!(m.depth(), 6);
        for (level, tris) in m.levels().iter().enumerate() {
            assert_eq!(tris.len(), triangle_count(level), "level {level}");
        }
        assert_eq!(m.level(6), None);
    }

    #[test]
    fn vertex_pool_fully_packed() {
        for depth in 1..=8 {
            let m = mesh(depth);
            assert_eq!(m.vertices().len(), vertex_count(depth), "depth {depth}");
            assert_eq!(m.vertices().len(), 3 + 3 * (triangle_count(depth - 1) - 1) / 2);
        }
    }

    #[test]
    fn triangle_total_sums_levels() {
        // 1 + 3 + 9 + 27
        assert_eq!(mesh(4).triangle_total(), 40);
    }

    #[test]
    fn depth_three_end_to_end() {
        let m = mesh(3);
        assert_eq!(m.vertices().len(), 15);
        let sizes: Vec<usize> = m.levels().iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![1, 3, 9]);
        assert_eq!(m.level(0), Some(&[[0, 1, 2]][..]));
        assert_eq!(&m.vertices()[..3], &DEFAULT_ROOT);
    }

    // ── subdivision details ───────────────────────────────────────────────

    #[test]
    fn first_midpoints_are_exact() {
        let m = mesh(2);
        // Appended in order: left-top, top-right, left-right.
        assert_eq!(m.vertices()[3], [-0.5, 0.0, 0.0]);
        assert_eq!(m.vertices()[4], [0.5, 0.0, 0.0]);
        assert_eq!(m.vertices()[5], [0.0, -1.0, 0.0]);
    }

    #[test]
    fn first_level_children_order() {
        let m = mesh(2);
        // LT = 3, TR = 4, RL = 5
        assert_eq!(m.level(1), Some(&[[0, 5, 3], [5, 1, 4], [3, 4, 2]][..]));
    }

    #[test]
    fn center_hole_never_emitted() {
        let m = mesh(2);
        let hole = [3u32, 4, 5];
        for tri in m.levels().iter().flatten() {
            let mut sorted = *tri;
            sorted.sort_unstable();
            assert_ne!(sorted, hole);
        }
    }

    #[test]
    fn midpoints_are_flat() {
        let root = [[-2.0, -1.0, 3.0], [2.0, -1.0, 3.0], [0.0, 2.0, 3.0]];
        let m = generate(4, root).unwrap();
        assert_eq!(&m.vertices()[..3], &root);
        assert!(m.vertices()[3..].iter().all(|v| v[2] == 0.0));
    }

    // ── index validity ────────────────────────────────────────────────────

    #[test]
    fn indices_within_pool() {
        let m = mesh(7);
        let len = m.vertices().len() as u32;
        assert!(m.levels().iter().flatten().flatten().all(|&i| i < len));
    }

    #[test]
    fn indices_never_reference_future_vertices() {
        let mut builder = MeshBuilder::new(6, DEFAULT_ROOT);
        builder.subdivide(0, 1, 2, 1);
        assert_eq!(builder.trace.len(), mesh(6).triangle_total() - 1);
        for (pool_len, tri) in &builder.trace {
            assert!(tri.iter().all(|&i| (i as usize) < *pool_len), "{tri:?} vs {pool_len}");
        }
    }

    // ── determinism ───────────────────────────────────────────────────────

    #[test]
    fn regeneration_is_identical() {
        let a = mesh(7);
        let b = mesh(7);
        assert_eq!(a, b);

        let bits = |m: &SierpinskiMesh| -> Vec<u32> {
            m.vertices().iter().flatten().map(|f| f.to_bits()).collect()
        };
        assert_eq!(bits(&a), bits(&b));
    }
}
