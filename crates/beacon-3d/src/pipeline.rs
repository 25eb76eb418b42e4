use crate::depth::DEPTH_FORMAT;
use crate::resources::{CompiledProgram, ShaderCompiler};
use crate::shader::{
    FRAGMENT_ENTRY, ProgramLayout, ShaderError, VERTEX_ENTRY, VertexInputs, reflect_program,
};
use beacon_assets::ShaderSource;
use std::borrow::Cow;
use std::num::NonZeroU64;
use wgpu::*;

/// Size of one `vec3<f32>` vertex attribute.
const VEC3_STRIDE: BufferAddress = 12;

/// A linked program on the GPU: one render pipeline and the layout of its
/// single uniform bind group.
pub struct GpuProgram {
    pub pipeline: RenderPipeline,
    pub bind_group_layout: BindGroupLayout,
}

/// Compiles shader pairs into render pipelines targeting `color_format`.
pub struct WgpuShaderCompiler<'a> {
    device: &'a Device,
    color_format: TextureFormat,
}

impl<'a> WgpuShaderCompiler<'a> {
    pub fn new(device: &'a Device, color_format: TextureFormat) -> Self {
        Self {
            device,
            color_format,
        }
    }
}

impl ShaderCompiler for WgpuShaderCompiler<'_> {
    type Handle = GpuProgram;

    fn compile(&self, source: &ShaderSource) -> Result<CompiledProgram<GpuProgram>, ShaderError> {
        let layout = reflect_program(&source.name, &source.vertex, &source.fragment)?;
        let vertex_inputs = layout.vertex_inputs(&source.name)?;

        // Reflection already validated both stages; anything wgpu still
        // rejects is an interface mismatch between them.
        self.device.push_error_scope(ErrorFilter::Validation);
        let handle = create_program(self.device, self.color_format, source, &layout, vertex_inputs);
        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(ShaderError::Link {
                program: source.name.clone(),
                log: err.to_string(),
            });
        }

        Ok(CompiledProgram { handle, layout })
    }
}

fn create_program(
    device: &Device,
    color_format: TextureFormat,
    source: &ShaderSource,
    layout: &ProgramLayout,
    inputs: VertexInputs,
) -> GpuProgram {
    let vs_module = device.create_shader_module(ShaderModuleDescriptor {
        label: Some(&format!("{}.vert", source.name)),
        source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(&source.vertex)),
    });
    let fs_module = device.create_shader_module(ShaderModuleDescriptor {
        label: Some(&format!("{}.frag", source.name)),
        source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(&source.fragment)),
    });

    let bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some(&format!("{}_uniforms_bgl", source.name)),
        entries: &[BindGroupLayoutEntry {
            binding: 0,
            visibility: ShaderStages::VERTEX_FRAGMENT,
            ty: BindingType::Buffer {
                ty: BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: NonZeroU64::new(layout.block_size),
            },
            count: None,
        }],
    });

    let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some(&format!("{}_layout", source.name)),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });

    let position_attr = [VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: 0,
        shader_location: inputs.position,
    }];
    let normal_attr = [VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: 0,
        shader_location: inputs.normal,
    }];
    let vertex_buffers = [
        VertexBufferLayout {
            array_stride: VEC3_STRIDE,
            step_mode: VertexStepMode::Vertex,
            attributes: &position_attr,
        },
        VertexBufferLayout {
            array_stride: VEC3_STRIDE,
            step_mode: VertexStepMode::Vertex,
            attributes: &normal_attr,
        },
    ];

    let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some(&format!("{}_pipeline", source.name)),
        layout: Some(&pipeline_layout),
        vertex: VertexState {
            module: &vs_module,
            entry_point: Some(VERTEX_ENTRY),
            compilation_options: Default::default(),
            buffers: &vertex_buffers,
        },
        primitive: PrimitiveState {
            topology: PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: FrontFace::Ccw,
            cull_mode: Some(Face::Back),
            unclipped_depth: false,
            polygon_mode: PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: Some(DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: CompareFunction::Less,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        }),
        multisample: MultisampleState::default(),
        fragment: Some(FragmentState {
            module: &fs_module,
            entry_point: Some(FRAGMENT_ENTRY),
            compilation_options: Default::default(),
            targets: &[Some(ColorTargetState {
                format: color_format,
                blend: Some(BlendState::REPLACE),
                write_mask: ColorWrites::ALL,
            })],
        }),
        multiview: None,
        cache: None,
    });

    GpuProgram {
        pipeline,
        bind_group_layout,
    }
}
