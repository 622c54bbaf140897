use anyhow::Result;
use wgpu::SurfaceError;
use winit::window::Window;

use crate::device::{Gpu, SurfaceErrorAction};
use crate::input::InputFrame;
use crate::paint::Color;
use crate::render::{RenderCtx, RenderTarget};

use super::app::AppControl;

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window borrow carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: &'a Window,
    pub gpu: &'a mut Gpu<'w>,
    pub input_frame: &'a InputFrame,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Renderer context without an acquired frame, for uploading resources
    /// ahead of drawing.
    pub fn render_ctx(&self) -> RenderCtx<'_> {
        RenderCtx::new(
            self.gpu.device(),
            self.gpu.queue(),
            self.gpu.surface_format(),
            self.gpu.viewport(),
        )
    }

    /// Clears the surface with `clear`, calls `draw` with a ready
    /// [`RenderCtx`] and [`RenderTarget`], then presents the frame.
    ///
    /// Recoverable surface errors skip the frame; a fatal one is returned.
    /// A zero-size (minimized) surface skips drawing.
    pub fn render<F>(&mut self, clear: Color, draw: F) -> Result<AppControl>
    where
        F: FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>),
    {
        if !self.gpu.viewport().is_valid() {
            return Ok(AppControl::Continue);
        }

        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                let action = self.gpu.handle_surface_error(err.clone());
                return after_surface_error(action, err);
            }
        };

        // Clear pass; dropped before the encoder is borrowed again.
        {
            let _rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sierpinski clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        let rctx = RenderCtx::new(
            self.gpu.device(),
            self.gpu.queue(),
            self.gpu.surface_format(),
            self.gpu.viewport(),
        );

        // RenderTarget borrows frame.encoder; dropped before submit() takes frame.
        {
            let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
            draw(&rctx, &mut target);
        }

        self.window.pre_present_notify();
        self.gpu.submit(frame);

        Ok(AppControl::Continue)
    }
}

/// Frame outcome once the surface has handled `err`.
fn after_surface_error(action: SurfaceErrorAction, err: SurfaceError) -> Result<AppControl> {
    match action {
        SurfaceErrorAction::Fatal => {
            Err(anyhow::Error::new(err).context("failed to acquire surface texture"))
        }
        SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
            Ok(AppControl::Continue)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_surface_error_is_returned() {
        let err = after_surface_error(SurfaceErrorAction::Fatal, SurfaceError::OutOfMemory)
            .unwrap_err();
        assert_eq!(err.downcast_ref::<SurfaceError>(), Some(&SurfaceError::OutOfMemory));
        assert!(format!("{err:#}").starts_with("failed to acquire surface texture"));
    }

    #[test]
    fn recoverable_surface_errors_skip_the_frame() {
        for (action, err) in [
            (SurfaceErrorAction::Reconfigured, SurfaceError::Lost),
            (SurfaceErrorAction::Reconfigured, SurfaceError::Outdated),
            (SurfaceErrorAction::SkipFrame, SurfaceError::Timeout),
        ] {
            assert_eq!(after_surface_error(action, err).unwrap(), AppControl::Continue);
        }
    }
}
