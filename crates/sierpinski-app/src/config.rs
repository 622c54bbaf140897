use winit::dpi::LogicalSize;

use sierpinski_engine::device::GpuInit;
use sierpinski_engine::logging::LoggingConfig;
use sierpinski_engine::paint::Color;
use sierpinski_engine::window::RuntimeConfig;
use sierpinski_geometry::{Point, DEFAULT_DEPTH, DEFAULT_ROOT};

/// Everything the explorer needs at startup.
#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    /// Number of precomputed levels.
    pub depth: usize,
    /// Root triangle corners: left, right, top.
    pub root: [Point; 3],
    pub clear_color: Color,
    pub runtime: RuntimeConfig,
    pub gpu: GpuInit,
    pub logging: LoggingConfig,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            root: DEFAULT_ROOT,
            clear_color: Color::BLACK,
            runtime: RuntimeConfig {
                title: "Sierpinski Triangle".to_string(),
                initial_size: LogicalSize::new(800.0, 600.0),
                resizable: true,
            },
            gpu: GpuInit {
                // Palette values are authored for direct output.
                prefer_srgb: false,
                present_mode: wgpu::PresentMode::Fifo,
                ..GpuInit::default()
            },
            logging: LoggingConfig::default(),
        }
    }
}
