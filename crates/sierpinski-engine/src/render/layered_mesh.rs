//! Layered indexed mesh renderer.
//!
//! One vertex buffer is shared by every layer; each layer has its own index
//! buffer and a solid color. Layers are drawn in order, so later layers paint
//! over earlier ones.

use anyhow::{Context, Result};
use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::paint::Color;
use crate::render::{RenderCtx, RenderTarget};

/// Vertex position in clip space.
pub type Position = [f32; 3];

/// Renders a shared vertex pool through per-layer index buffers.
///
/// Geometry is uploaded once by [`prepare`](Self::prepare) and treated as
/// immutable afterwards; per frame only the layer colors change.
#[derive(Default)]
pub struct LayeredMeshRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    shader: Option<wgpu::ShaderModule>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,

    vertex_buffer: Option<wgpu::Buffer>,
    layers: Vec<LayerBuffers>,
}

struct LayerBuffers {
    index_buffer: wgpu::Buffer,
    index_count: u32,
    color_ubo: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    /// Last color written to `color_ubo`.
    uploaded: Option<[f32; 4]>,
}

impl LayeredMeshRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once geometry is uploaded and a pipeline exists for the current
    /// surface format.
    pub fn is_prepared(&self) -> bool {
        self.vertex_buffer.is_some() && self.pipeline.is_some()
    }

    /// Number of uploaded layers.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Compiles the shader, (re)builds the pipeline for the current surface
    /// format, and uploads geometry on first call.
    ///
    /// Shader compilation, pipeline and upload validation errors are logged
    /// with their diagnostic text and returned; the caller should treat them
    /// as fatal. Calling again after success only rebuilds the pipeline if
    /// the surface format changed.
    pub fn prepare<L>(
        &mut self,
        ctx: &RenderCtx<'_>,
        vertices: &[Position],
        layers: &[L],
    ) -> Result<()>
    where
        L: AsRef<[[u32; 3]]>,
    {
        self.ensure_shader(ctx)?;
        self.ensure_pipeline(ctx)?;

        if self.vertex_buffer.is_none() {
            self.upload(ctx, vertices, layers)?;
        }

        Ok(())
    }

    /// Draws the first `colors.len()` layers, layer `i` filled with `colors[i]`.
    ///
    /// Extra colors beyond the uploaded layer count are ignored. Does nothing
    /// until [`prepare`](Self::prepare) has succeeded.
    pub fn draw(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, colors: &[Color]) {
        let visible = colors.len().min(self.layers.len());
        if visible == 0 || !ctx.viewport.is_valid() {
            return;
        }

        for (layer, color) in self.layers.iter_mut().zip(colors) {
            let rgba = color.to_array();
            if layer.uploaded != Some(rgba) {
                let u = ColorUniform { color: rgba };
                ctx.queue.write_buffer(&layer.color_ubo, 0, bytemuck::bytes_of(&u));
                layer.uploaded = Some(rgba);
            }
        }

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(vertex_buffer) = self.vertex_buffer.as_ref() else { return };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("sierpinski layered mesh pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_viewport(0.0, 0.0, ctx.viewport.width, ctx.viewport.height, 0.0, 1.0);
        rpass.set_pipeline(pipeline);
        rpass.set_vertex_buffer(0, vertex_buffer.slice(..));

        for layer in &self.layers[..visible] {
            rpass.set_bind_group(0, &layer.bind_group, &[]);
            rpass.set_index_buffer(layer.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..layer.index_count, 0, 0..1);
        }
    }

    fn ensure_shader(&mut self, ctx: &RenderCtx<'_>) -> Result<()> {
        if self.shader.is_none() {
            self.shader = Some(compile_shader(ctx.device, "layered_mesh.wgsl", SHADER_SOURCE)?);
        }
        Ok(())
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) -> Result<()> {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return Ok(());
        }
        let shader = self.shader.as_ref().context("shader not compiled")?;
        let scope = ctx.device.push_error_scope(wgpu::ErrorFilter::Validation);

        // Format-independent; kept across pipeline rebuilds so existing
        // layer bind groups stay valid.
        let bind_group_layout: &wgpu::BindGroupLayout =
            self.bind_group_layout.get_or_insert_with(|| {
                ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("sierpinski layer color bgl"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: wgpu::BufferSize::new(
                                std::mem::size_of::<ColorUniform>() as u64,
                            ),
                        },
                        count: None,
                    }],
                })
            });

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("sierpinski layered mesh pipeline layout"),
                bind_group_layouts: &[bind_group_layout],
                immediate_size: 0,
            });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sierpinski layered mesh pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[position_layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        if let Some(err) = pollster::block_on(scope.pop()) {
            log::error!("layered mesh pipeline rejected for {:?}: {err}", ctx.surface_format);
            anyhow::bail!("failed to build layered mesh pipeline for {:?}", ctx.surface_format);
        }

        log::debug!("layered mesh pipeline built for {:?}", ctx.surface_format);
        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        Ok(())
    }

    fn upload<L>(&mut self, ctx: &RenderCtx<'_>, vertices: &[Position], layers: &[L]) -> Result<()>
    where
        L: AsRef<[[u32; 3]]>,
    {
        anyhow::ensure!(!vertices.is_empty(), "layered mesh has no vertices");
        let bgl = self
            .bind_group_layout
            .as_ref()
            .context("bind group layout missing; pipeline not built")?;

        let vertex_count = vertices.len() as u32;
        let scope = ctx.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let vertex_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sierpinski vertex pool"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let mut uploaded = Vec::with_capacity(layers.len());
        for (i, layer) in layers.iter().enumerate() {
            let tris = layer.as_ref();
            anyhow::ensure!(!tris.is_empty(), "layer {i} has no triangles");
            anyhow::ensure!(
                tris.iter().flatten().all(|&idx| idx < vertex_count),
                "layer {i} references a vertex outside the pool ({vertex_count} vertices)"
            );

            let index_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("sierpinski layer indices"),
                contents: bytemuck::cast_slice(tris),
                usage: wgpu::BufferUsages::INDEX,
            });

            let color_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("sierpinski layer color ubo"),
                size: std::mem::size_of::<ColorUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });

            let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("sierpinski layer bind group"),
                layout: bgl,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: color_ubo.as_entire_binding(),
                }],
            });

            uploaded.push(LayerBuffers {
                index_buffer,
                index_count: (tris.len() * 3) as u32,
                color_ubo,
                bind_group,
                uploaded: None,
            });
        }

        if let Some(err) = pollster::block_on(scope.pop()) {
            log::error!("layered mesh upload rejected: {err}");
            anyhow::bail!("failed to upload layered mesh geometry");
        }

        log::debug!(
            "uploaded {} vertices across {} layers",
            vertices.len(),
            uploaded.len()
        );
        self.vertex_buffer = Some(vertex_buffer);
        self.layers = uploaded;
        Ok(())
    }
}

const SHADER_SOURCE: &str = include_str!("shaders/layered_mesh.wgsl");

/// Compiles WGSL `source`, logging every compiler message under `label`.
///
/// Validation errors are captured in an error scope and returned instead of
/// reaching the device's uncaptured-error handler.
fn compile_shader(device: &wgpu::Device, label: &str, source: &str) -> Result<wgpu::ShaderModule> {
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    let rejected = pollster::block_on(scope.pop());

    let info = pollster::block_on(shader.get_compilation_info());
    let mut errors = 0usize;
    for msg in &info.messages {
        let at = msg
            .location
            .as_ref()
            .map(|loc| format!("{}:{}", loc.line_number, loc.line_position))
            .unwrap_or_else(|| "?".to_string());
        match msg.message_type {
            wgpu::CompilationMessageType::Error => {
                log::error!("{label}:{at}: {}", msg.message);
                errors += 1;
            }
            wgpu::CompilationMessageType::Warning => {
                log::warn!("{label}:{at}: {}", msg.message);
            }
            _ => {
                log::debug!("{label}:{at}: {}", msg.message);
            }
        }
    }

    if let Some(err) = rejected {
        if errors == 0 {
            log::error!("{label}: {err}");
        }
        anyhow::bail!("{label} failed to compile");
    }
    anyhow::ensure!(errors == 0, "{label} failed to compile ({errors} errors)");

    Ok(shader)
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ColorUniform {
    color: [f32; 4],
}

fn position_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Position>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRS,
    }
}

#[cfg(test)]
mod tests {
    use winit::dpi::PhysicalSize;

    use super::*;
    use crate::coords::Viewport;

    #[test]
    fn color_uniform_is_one_vec4() {
        assert_eq!(std::mem::size_of::<ColorUniform>(), 16);
    }

    #[test]
    fn position_layout_is_tightly_packed() {
        let layout = position_layout();
        assert_eq!(layout.array_stride, 12);
        assert_eq!(layout.attributes.len(), 1);
        assert_eq!(layout.attributes[0].format, wgpu::VertexFormat::Float32x3);
    }

    #[test]
    fn new_renderer_is_unprepared() {
        let r = LayeredMeshRenderer::new();
        assert!(!r.is_prepared());
        assert_eq!(r.layer_count(), 0);
    }

    // ── setup on a stub device ────────────────────────────────────────────

    const VERTICES: [Position; 6] = [
        [-1.0, -1.0, 0.0],
        [1.0, -1.0, 0.0],
        [0.0, 1.0, 0.0],
        [-0.5, 0.0, 0.0],
        [0.5, 0.0, 0.0],
        [0.0, -1.0, 0.0],
    ];

    fn layers() -> Vec<Vec<[u32; 3]>> {
        vec![vec![[0, 1, 2]], vec![[0, 5, 3], [5, 1, 4], [3, 4, 2]]]
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

    #[test]
    fn bundled_shader_compiles() {
        let (device, _queue) = stub_device();
        assert!(compile_shader(&device, "layered_mesh.wgsl", SHADER_SOURCE).is_ok());
    }

    #[test]
    fn broken_shader_returns_error() {
        let (device, _queue) = stub_device();
        let source = "@fragment fn fs_main() -> @location(0) vec4<f32> { return oops; }";
        let err = compile_shader(&device, "broken.wgsl", source).unwrap_err();
        assert!(err.to_string().contains("broken.wgsl"), "{err:#}");
    }

    #[test]
    fn prepare_uploads_every_layer() {
        let (device, queue) = stub_device();
        let ctx = render_ctx(&device, &queue, wgpu::TextureFormat::Rgba8Unorm);
        let mut r = LayeredMeshRenderer::new();

        r.prepare(&ctx, &VERTICES, &layers()).unwrap();
        assert!(r.is_prepared());
        assert_eq!(r.layer_count(), 2);

        // Idempotent once prepared.
        r.prepare(&ctx, &VERTICES, &layers()).unwrap();
        assert_eq!(r.layer_count(), 2);
    }

    #[test]
    fn prepare_rejects_index_outside_pool() {
        let (device, queue) = stub_device();
        let ctx = render_ctx(&device, &queue, wgpu::TextureFormat::Rgba8Unorm);
        let mut r = LayeredMeshRenderer::new();

        let bad = vec![vec![[0u32, 1, 6]]];
        assert!(r.prepare(&ctx, &VERTICES, &bad).is_err());
        assert!(!r.is_prepared());
    }

    #[test]
    fn pipeline_for_depth_format_returns_error() {
        let (device, queue) = stub_device();
        let ctx = render_ctx(&device, &queue, wgpu::TextureFormat::Depth32Float);
        let mut r = LayeredMeshRenderer::new();

        let err = r.prepare(&ctx, &VERTICES, &layers()).unwrap_err();
        assert!(err.to_string().contains("pipeline"), "{err:#}");
        assert!(!r.is_prepared());
    }
}
