//! GPU rendering subsystem.
//!
//! Each renderer owns its GPU resources (pipelines, buffers) and records into
//! the frame's encoder through a [`RenderTarget`].
//!
//! Convention: vertex positions are already in clip space (NDC); renderers
//! map them onto the full-surface viewport.

mod ctx;
pub mod layered_mesh;

pub use ctx::{RenderCtx, RenderTarget};
pub use layered_mesh::LayeredMeshRenderer;
