//! Coordinate types shared between the runtime and renderers.
//!
//! Geometry itself is authored directly in clip space (NDC), so the only
//! pixel-space quantity renderers need is the drawable viewport.

mod viewport;

pub use viewport::Viewport;
