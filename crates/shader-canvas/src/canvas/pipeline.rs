use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::uniforms::{UniformLayout, UniformTable};

/// Default vertex stage, compiled when no override is supplied.
pub const DEFAULT_VERTEX_SHADER: &str = include_str!("shaders/quad.vert.wgsl");

/// Fallback fragment stage visualizing `fUv`.
pub const DEFAULT_FRAGMENT_SHADER: &str = include_str!("shaders/uv.frag.wgsl");

/// Unit-quad corner in local space, `(-0.5, -0.5)` to `(0.5, 0.5)`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct QuadVertex {
    corner: [f32; 2],
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { corner: [-0.5, -0.5] },
    QuadVertex { corner: [0.5, -0.5] },
    QuadVertex { corner: [0.5, 0.5] },
    QuadVertex { corner: [-0.5, 0.5] },
];

const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// Transform uniform consumed by the vertex stage.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct TransformUniform {
    mvp: [[f32; 4]; 4],
}

/// Assembles the single WGSL module for a canvas: generated preamble
/// (uniform struct, bindings, vertex output), then the vertex stage, then
/// the fragment stage.
pub fn compose_module(layout: &UniformLayout, vertex_src: &str, fragment_src: &str) -> String {
    let mut src = String::new();

    src.push_str(&layout.wgsl_struct("Uniforms"));
    src.push_str("@group(0) @binding(0) var<uniform> uniforms: Uniforms;\n\n");

    src.push_str("struct Transform {\n    mvp: mat4x4<f32>,\n}\n");
    src.push_str("@group(0) @binding(1) var<uniform> transform: Transform;\n\n");

    src.push_str(
        "struct VertexOut {\n    @builtin(position) position: vec4<f32>,\n    \
         @location(0) fUv: vec2<f32>,\n}\n\n",
    );

    src.push_str(vertex_src);
    src.push('\n');
    src.push_str(fragment_src);
    src.push('\n');
    src
}

/// GPU half of a canvas: the quad geometry, the compiled pipeline, and the
/// two uniform buffers (canvas uniforms + vertex transform).
///
/// Everything is created eagerly at construction; the surface format and the
/// uniform layout never change for the life of a canvas, so there is nothing
/// to rebuild. Shader validation errors surface through wgpu's own error
/// reporting, not through this type.
pub struct QuadRenderer {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    transform_buffer: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    layout: UniformLayout,
}

impl QuadRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        layout: UniformLayout,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Self {
        let module_src = compose_module(&layout, vertex_src, fragment_src);
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shader-canvas quad module"),
            source: wgpu::ShaderSource::Wgsl(module_src.into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("shader-canvas uniform ubo"),
            size: layout.size() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let transform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("shader-canvas transform ubo"),
            size: std::mem::size_of::<TransformUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("shader-canvas bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: std::num::NonZeroU64::new(layout.size() as u64),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: std::num::NonZeroU64::new(
                            std::mem::size_of::<TransformUniform>() as u64,
                        ),
                    },
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shader-canvas bind group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: transform_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("shader-canvas pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("shader-canvas quad pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[QuadVertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    // Opaque canvas: the fragment stage fully owns every pixel.
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

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("shader-canvas quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("shader-canvas quad ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            pipeline,
            bind_group,
            uniform_buffer,
            transform_buffer,
            vertex_buffer,
            index_buffer,
            layout,
        }
    }

    /// The uniform layout the pipeline was compiled against.
    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    /// Uploads the table's current values into the uniform buffer.
    pub fn write_uniforms(&self, queue: &wgpu::Queue, table: &UniformTable) {
        let bytes = self.layout.pack(table);
        queue.write_buffer(&self.uniform_buffer, 0, &bytes);
    }

    /// Uploads the quad transform for the vertex stage.
    pub fn write_transform(&self, queue: &wgpu::Queue, mvp: [[f32; 4]; 4]) {
        let u = TransformUniform { mvp };
        queue.write_buffer(&self.transform_buffer, 0, bytemuck::bytes_of(&u));
    }

    /// Records the quad draw into an open render pass.
    pub fn draw(&self, rpass: &mut wgpu::RenderPass<'_>) {
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        rpass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uniforms::{UniformTable, UniformValue};

    fn layout_with_speed() -> UniformLayout {
        let mut t = UniformTable::with_builtins();
        t.set("speed", UniformValue::Float(1.0));
        UniformLayout::of(&t)
    }

    #[test]
    fn composed_module_declares_bindings_and_stages() {
        let src = compose_module(
            &layout_with_speed(),
            DEFAULT_VERTEX_SHADER,
            DEFAULT_FRAGMENT_SHADER,
        );
        assert!(src.contains("struct Uniforms {"));
        assert!(src.contains("speed: f32,"));
        assert!(src.contains("@group(0) @binding(0) var<uniform> uniforms: Uniforms;"));
        assert!(src.contains("@group(0) @binding(1) var<uniform> transform: Transform;"));
        assert!(src.contains("fn vs_main"));
        assert!(src.contains("fn fs_main"));
    }

    #[test]
    fn preamble_precedes_both_stages() {
        let src = compose_module(&layout_with_speed(), "VS_MARK", "FS_MARK");
        let uniforms_at = src.find("struct Uniforms").unwrap();
        let vs_at = src.find("VS_MARK").unwrap();
        let fs_at = src.find("FS_MARK").unwrap();
        assert!(uniforms_at < vs_at);
        assert!(vs_at < fs_at);
    }
}
