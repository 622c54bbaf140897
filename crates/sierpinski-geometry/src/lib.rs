//! Sierpinski triangle geometry.
//!
//! Produces a shared vertex pool plus one index table per recursion level.
//! Level 0 is the root triangle; level `L` holds `3^L` triangles. Drawing
//! levels `0..k` on top of each other yields the fractal at depth `k`.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`counts`] | closed-form vertex / triangle / index counts |
//! | [`error`] | `GeometryError` |
//! | [`mesh`] | `SierpinskiMesh`, `generate` |
//!
//! # Quick start
//!
//! ```rust
//! use sierpinski_geometry::{generate, DEFAULT_ROOT};
//!
//! let mesh = generate(3, DEFAULT_ROOT).unwrap();
//! assert_eq!(mesh.vertices().len(), 15);
//! assert_eq!(mesh.level(2).map(|l| l.len()), Some(9));
//! ```

pub mod counts;
pub mod error;
pub mod mesh;

pub use counts::{index_count, triangle_count, vertex_count};
pub use error::GeometryError;
pub use mesh::{generate, Point, SierpinskiMesh, Triangle, DEFAULT_DEPTH, DEFAULT_ROOT, MAX_DEPTH};
