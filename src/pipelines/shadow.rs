use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        instance::InstanceRaw,
        model::{ModelVertex, Vertex},
        texture::Texture,
    },
    pipelines::basic::{RasterState, mk_render_pipeline, uniform_layout_entry},
};

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShadowCameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

/// A shadow map together with the camera it is rendered from.
pub struct ShadowSlot {
    pub map: Texture,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl ShadowSlot {
    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, size: u32, label: &str) -> Self {
        let map = Texture::create_shadow_map(device, size, label);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&[ShadowCameraUniform {
                view_proj: cgmath::Matrix4::from_scale(1.0).into(),
            }]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some(label),
        });
        Self {
            map,
            buffer,
            bind_group,
        }
    }

    pub fn size(&self) -> u32 {
        self.map.size()[0]
    }
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[uniform_layout_entry(0, wgpu::ShaderStages::VERTEX)],
        label: Some("shadow_camera_bind_group_layout"),
    })
}

/// Depth-only pipeline. Front faces are culled, so closed meshes write the
/// depth of their far side.
pub fn mk_shadow_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Shadow Pipeline Layout"),
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    });
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Shadow Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shadow.wgsl").into()),
    });
    mk_render_pipeline(
        device,
        "Shadow Pipeline",
        &pipeline_layout,
        &shader,
        None,
        Some(Texture::DEPTH_FORMAT),
        &[ModelVertex::desc(), InstanceRaw::desc()],
        RasterState {
            cull_mode: Some(wgpu::Face::Front),
            depth_compare: wgpu::CompareFunction::LessEqual,
            ..Default::default()
        },
    )
}
