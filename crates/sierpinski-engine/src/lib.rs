//! Sierpinski engine crate.
//!
//! Owns the platform + GPU runtime used by the explorer binary: the winit
//! event loop, the wgpu surface, input translation and the layered-mesh
//! renderer.

pub mod device;
pub mod window;
pub mod input;
pub mod core;

pub mod logging;
pub mod coords;
pub mod render;
pub mod paint;
