/// One acquired swapchain frame.
///
/// Holding `surface_texture` blocks acquisition of the next frame, so submit
/// promptly via [`Gpu::submit`](super::Gpu::submit).
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
