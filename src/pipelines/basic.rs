/// How a pipeline rasterizes and depth-tests. Defaults match an opaque,
/// back-face culled, depth-writing, single-sampled pass.
#[derive(Clone, Copy, Debug)]
pub struct RasterState {
    pub cull_mode: Option<wgpu::Face>,
    pub depth_write: bool,
    pub depth_compare: wgpu::CompareFunction,
    pub sample_count: u32,
}

impl Default for RasterState {
    fn default() -> Self {
        Self {
            cull_mode: Some(wgpu::Face::Back),
            depth_write: true,
            depth_compare: wgpu::CompareFunction::Less,
            sample_count: 1,
        }
    }
}

/// Build a `vs_main` pipeline. A `fragment` of `None` produces a depth-only
/// pipeline, otherwise `(entry point, color format, blend)` names the single
/// color target.
pub fn mk_render_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    fragment: Option<(&str, wgpu::TextureFormat, Option<wgpu::BlendState>)>,
    depth_format: Option<wgpu::TextureFormat>,
    vertex_layouts: &[wgpu::VertexBufferLayout],
    raster: RasterState,
) -> wgpu::RenderPipeline {
    let targets = fragment.map(|(_, format, blend)| {
        [Some(wgpu::ColorTargetState {
            format,
            blend,
            write_mask: wgpu::ColorWrites::ALL,
        })]
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: match (&fragment, &targets) {
            (Some((entry_point, _, _)), Some(targets)) => Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some(*entry_point),
                targets,
                compilation_options: Default::default(),
            }),
            _ => None,
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: raster.cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: raster.depth_write,
            depth_compare: raster.depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: raster.sample_count,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}

pub fn uniform_layout_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}
