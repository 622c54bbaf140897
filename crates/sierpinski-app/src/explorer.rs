use std::ops::ControlFlow;

use anyhow::{Context, Result};

use sierpinski_engine::core::{App, AppControl, FrameCtx};
use sierpinski_engine::paint::Color;
use sierpinski_engine::render::{LayeredMeshRenderer, RenderCtx};
use sierpinski_geometry::SierpinskiMesh;

use crate::palette::Palette;
use crate::view::ViewState;

/// Frame driver: turns buffered key presses into view changes and draws the
/// visible levels.
pub struct Explorer {
    mesh: SierpinskiMesh,
    palette: Palette,
    view: ViewState,
    clear_color: Color,
    renderer: LayeredMeshRenderer,

    /// First fatal error hit inside the loop.
    failure: Option<anyhow::Error>,
}

impl Explorer {
    pub fn new(mesh: SierpinskiMesh, palette: Palette, clear_color: Color) -> Self {
        let view = ViewState::new(mesh.depth(), palette.len());
        Self {
            mesh,
            palette,
            view,
            clear_color,
            renderer: LayeredMeshRenderer::new(),
            failure: None,
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Ok if the loop ended normally, or the error that stopped it.
    pub fn finish(self) -> Result<()> {
        match self.failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Uploads the mesh on first use; later calls only follow surface
    /// format changes.
    fn prepare(&mut self, rctx: &RenderCtx<'_>) -> Result<()> {
        let first = !self.renderer.is_prepared();
        self.renderer
            .prepare(rctx, self.mesh.vertices(), self.mesh.levels())
            .context("failed to prepare layered mesh renderer")?;

        if first {
            log::info!("uploaded {} levels to the GPU", self.renderer.layer_count());
        }
        Ok(())
    }

    fn frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<AppControl> {
        if let ControlFlow::Break(()) = self.view.handle_keys(ctx.input_frame.presses()) {
            log::info!("quit requested");
            return Ok(AppControl::Exit);
        }

        self.prepare(&ctx.render_ctx())?;

        let colors = self
            .palette
            .rotation(self.view.color_offset(), self.view.visible_levels());
        let renderer = &mut self.renderer;

        ctx.render(self.clear_color, |rctx, target| {
            renderer.draw(rctx, target, &colors);
        })
    }

    /// Passes a frame's control through. An error is logged, kept for
    /// [`finish`](Self::finish), and stops the loop.
    fn settle(&mut self, outcome: Result<AppControl>) -> AppControl {
        match outcome {
            Ok(control) => control,
            Err(err) => {
                log::error!("{err:#}");
                if self.failure.is_none() {
                    self.failure = Some(err);
                }
                AppControl::Exit
            }
        }
    }
}

impl App for Explorer {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let outcome = self.frame(ctx);
        self.settle(outcome)
    }
}

#[cfg(test)]
mod tests {
    use sierpinski_engine::coords::Viewport;
    use sierpinski_geometry::{generate, DEFAULT_ROOT};
    use winit::dpi::PhysicalSize;

    use super::*;

    fn explorer(depth: usize) -> Explorer {
        let mesh = generate(depth, DEFAULT_ROOT).unwrap();
        Explorer::new(mesh, Palette::classic(), Color::BLACK)
    }

    fn stub_device() -> (wgpu::Device, wgpu::Queue) {
        wgpu::Device::noop(&wgpu::DeviceDescriptor::default())
    }

    fn render_ctx<'a>(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        format: wgpu::TextureFormat,
    ) -> RenderCtx<'a> {
        RenderCtx::new(device, queue, format, Viewport::from_physical(PhysicalSize::new(800, 600)))
    }

    // ── view ──────────────────────────────────────────────────────────────

    #[test]
    fn view_is_bounded_by_mesh_depth() {
        let e = explorer(3);
        assert_eq!(e.view().visible_levels(), 1);
        assert_eq!(e.view().max_levels(), 3);
    }

    // ── renderer setup ────────────────────────────────────────────────────

    #[test]
    fn prepare_uploads_every_level() {
        let (device, queue) = stub_device();
        let mut e = explorer(4);

        e.prepare(&render_ctx(&device, &queue, wgpu::TextureFormat::Rgba8Unorm))
            .unwrap();
        assert_eq!(e.renderer.layer_count(), 4);
    }

    #[test]
    fn prepare_failure_exits_and_is_returned_from_finish() {
        let (device, queue) = stub_device();
        let mut e = explorer(3);

        let outcome = e
            .prepare(&render_ctx(&device, &queue, wgpu::TextureFormat::Depth32Float))
            .map(|()| AppControl::Continue);
        assert!(outcome.is_err());
        assert_eq!(e.settle(outcome), AppControl::Exit);

        let err = e.finish().unwrap_err();
        assert!(format!("{err:#}").contains("failed to prepare layered mesh renderer"));
    }

    // ── loop outcome ──────────────────────────────────────────────────────

    #[test]
    fn successful_frames_pass_control_through() {
        let mut e = explorer(1);
        assert_eq!(e.settle(Ok(AppControl::Continue)), AppControl::Continue);
        assert_eq!(e.settle(Ok(AppControl::Exit)), AppControl::Exit);
        assert!(e.finish().is_ok());
    }

    #[test]
    fn fatal_surface_error_is_returned_from_finish() {
        let mut e = explorer(1);
        let lost = anyhow::Error::new(wgpu::SurfaceError::OutOfMemory)
            .context("failed to acquire surface texture");
        assert_eq!(e.settle(Err(lost)), AppControl::Exit);

        let err = e.finish().unwrap_err();
        assert_eq!(
            err.downcast_ref::<wgpu::SurfaceError>(),
            Some(&wgpu::SurfaceError::OutOfMemory)
        );
    }

    #[test]
    fn first_failure_wins() {
        let mut e = explorer(1);
        let _ = e.settle(Err(anyhow::anyhow!("shader failed")));
        let _ = e.settle(Err(anyhow::anyhow!("later failure")));
        assert_eq!(e.finish().unwrap_err().to_string(), "shader failed");
    }
}
