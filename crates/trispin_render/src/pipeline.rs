//! Render pipeline for the spinning triangle
//!
//! GPU state is one vertex buffer, one uniform buffer, and one shader
//! program. The program is rebuilt through [`ProgramBuilder`] whenever the
//! shader watcher reports a source change; the buffers and bind group
//! outlive every rebuild.

use wgpu::util::DeviceExt;

use trispin_math::{mat4, Mat4};

use crate::shader_watch::{ProgramFactory, ShaderSources, ShaderWatcher};

/// A triangle vertex: position and color
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

/// The one static triangle, placed past the near plane on the -Z axis
pub const TRIANGLE: [Vertex; 3] = [
    Vertex { position: [-1.0, -1.0, -3.0], color: [1.0, 0.0, 0.0] },
    Vertex { position: [1.0, -1.0, -3.0], color: [0.0, 1.0, 0.0] },
    Vertex { position: [0.0, 1.0, -3.0], color: [0.0, 0.0, 1.0] },
];

/// Per-frame uniforms: both matrices, uploaded in the row-major layout the
/// shaders consume with row-vector multiplication
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Uniforms {
    pub rotation: Mat4,
    pub projection: Mat4,
}

impl Default for Uniforms {
    fn default() -> Self {
        Self {
            rotation: mat4::IDENTITY,
            projection: mat4::IDENTITY,
        }
    }
}

/// The compiled/linked program handle. Empty either before the first
/// compile or after a failed rebuild; rendering skips the draw while empty.
#[derive(Default)]
pub struct ShaderProgram {
    pipeline: Option<wgpu::RenderPipeline>,
}

impl ShaderProgram {
    pub fn is_valid(&self) -> bool {
        self.pipeline.is_some()
    }
}

/// Compile-and-link collaborator backed by a wgpu device.
///
/// Both WGSL modules are created and the pipeline linked inside one
/// validation error scope; any validation failure is logged and yields an
/// empty program instead of panicking through the uncaptured-error handler.
pub struct ProgramBuilder<'a> {
    pub device: &'a wgpu::Device,
    pub layout: &'a wgpu::PipelineLayout,
    pub format: wgpu::TextureFormat,
}

impl ProgramFactory for ProgramBuilder<'_> {
    type Program = ShaderProgram;

    fn create_program(&mut self, vertex_src: &str, fragment_src: &str) -> ShaderProgram {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let vertex_module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Vertex Shader"),
            source: wgpu::ShaderSource::Wgsl(vertex_src.into()),
        });
        let fragment_module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Fragment Shader"),
            source: wgpu::ShaderSource::Wgsl(fragment_src.into()),
        });

        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Triangle Pipeline"),
            layout: Some(self.layout),
            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some("vs_main"),
                buffers: &[TrianglePipeline::vertex_buffer_layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // The triangle stays visible from either side
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        match pollster::block_on(self.device.pop_error_scope()) {
            None => ShaderProgram {
                pipeline: Some(pipeline),
            },
            Some(err) => {
                log::error!("Shader program rebuild failed: {}", err);
                ShaderProgram { pipeline: None }
            }
        }
    }
}

/// Pipeline state for the single-triangle demo
pub struct TrianglePipeline {
    pipeline_layout: wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    program: ShaderProgram,
}

impl TrianglePipeline {
    /// Create the GPU-resident state. The program starts empty; the first
    /// shader-watcher poll compiles it.
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Triangle Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Triangle Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Triangle Uniform Buffer"),
            contents: bytemuck::bytes_of(&Uniforms::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Triangle Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Triangle Vertex Buffer"),
            contents: bytemuck::cast_slice(&TRIANGLE),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            pipeline_layout,
            format: surface_format,
            uniform_buffer,
            bind_group,
            vertex_buffer,
            program: ShaderProgram::default(),
        }
    }

    /// Get the vertex buffer layout for [`Vertex`]
    fn vertex_buffer_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // position: vec3<f32>
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 0,
                },
                // color: vec3<f32>
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 12,
                    shader_location: 1,
                },
            ],
        }
    }

    /// Poll the watcher and rebuild the program when a source file changed.
    /// Returns true when a rebuild happened.
    pub fn check_reload(
        &mut self,
        device: &wgpu::Device,
        watcher: &mut ShaderWatcher,
        sources: &ShaderSources,
    ) -> bool {
        let mut builder = ProgramBuilder {
            device,
            layout: &self.pipeline_layout,
            format: self.format,
        };
        watcher.reload_if_changed(sources, &mut builder, &mut self.program)
    }

    /// Upload both matrices
    pub fn update_uniforms(&self, queue: &wgpu::Queue, uniforms: &Uniforms) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    /// Clear the target and draw the triangle. The clear always happens;
    /// the draw is skipped while no valid program is installed.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        clear_color: wgpu::Color,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Triangle Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let Some(pipeline) = &self.program.pipeline else {
            return;
        };

        render_pass.set_pipeline(pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.draw(0..TRIANGLE.len() as u32, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_buffer_layout_stride() {
        let layout = TrianglePipeline::vertex_buffer_layout();
        assert_eq!(layout.array_stride, std::mem::size_of::<Vertex>() as u64);
        assert_eq!(layout.attributes.len(), 2);
    }

    #[test]
    fn test_uniforms_size() {
        // Two tightly packed mat4x4<f32>
        assert_eq!(std::mem::size_of::<Uniforms>(), 128);
    }

    #[test]
    fn test_default_uniforms_are_identity() {
        let u = Uniforms::default();
        assert_eq!(u.rotation, mat4::IDENTITY);
        assert_eq!(u.projection, mat4::IDENTITY);
    }

    #[test]
    fn test_triangle_sits_past_near_plane() {
        for v in TRIANGLE {
            assert!(v.position[2] < -mat4::NEAR_PLANE);
        }
    }

    #[test]
    fn test_empty_program_is_invalid() {
        let program = ShaderProgram::default();
        assert!(!program.is_valid());
    }
}
