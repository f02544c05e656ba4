//! The lit scene pipelines and their bind group layouts.
//!
//! Bind group order is shared by both pipelines:
//! 0 material, 1 camera, 2 lights, 3 shadow maps.

use wgpu::util::DeviceExt;

use crate::{
    context::FRAME_FORMAT,
    data_structures::{
        instance::InstanceRaw,
        material::{Material, Shading},
        model::{ModelVertex, Vertex},
        texture::{Texture, TextureMap},
    },
    pipelines::basic::{RasterState, mk_render_pipeline, uniform_layout_entry},
};

const SHADING_CATCHER: f32 = 0.0;
const SHADING_STANDARD: f32 = 1.0;
const SHADING_PHYSICAL: f32 = 2.0;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    color: [f32; 4],
    pbr: [f32; 4],
    specular: [f32; 4],
    uv: [f32; 4],
}

impl MaterialUniform {
    pub fn new(material: &Material, bump: Option<&TextureMap>) -> Self {
        let (opacity, clearcoat, clearcoat_roughness, reflectivity, kind) = match material.shading {
            Shading::ShadowCatcher { opacity } => (opacity, 0.0, 0.0, 0.5, SHADING_CATCHER),
            Shading::Standard => (1.0, 0.0, 0.0, 0.5, SHADING_STANDARD),
            Shading::Physical {
                clearcoat,
                clearcoat_roughness,
                reflectivity,
            } => (1.0, clearcoat, clearcoat_roughness, reflectivity, SHADING_PHYSICAL),
        };
        let repeat = bump.map_or([1.0, 1.0], |map| map.repeat);
        Self {
            color: [material.color.r, material.color.g, material.color.b, opacity],
            pbr: [material.roughness, material.metalness, clearcoat, clearcoat_roughness],
            specular: [
                dielectric_f0(reflectivity),
                material.bump_scale,
                if bump.is_some() { 1.0 } else { 0.0 },
                kind,
            ],
            uv: [repeat[0], repeat[1], 0.0, 0.0],
        }
    }

    pub fn f0(&self) -> f32 {
        self.specular[0]
    }
}

/// Normal-incidence reflectance of a dielectric with the given reflectivity.
/// Reflectivity 0.5 is the common 4% of glass and plastics; 1.0 gives 16%.
pub fn dielectric_f0(reflectivity: f32) -> f32 {
    let r = 0.4 * reflectivity.clamp(0.0, 1.0);
    r * r
}

pub fn mk_material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            uniform_layout_entry(0, wgpu::ShaderStages::FRAGMENT),
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("material_bind_group_layout"),
    })
}

/// Uniform buffer plus bind group for one material. `bump` falls back to the
/// renderer's flat default map.
pub fn mk_material_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    uniform: MaterialUniform,
    bump: &Texture,
    fallback_sampler: &wgpu::Sampler,
    label: &str,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(&[uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });
    let sampler = bump.sampler.as_ref().unwrap_or(fallback_sampler);
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&bump.view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
        label: Some(label),
    });
    (buffer, bind_group)
}

pub fn mk_camera_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[uniform_layout_entry(
            0,
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        )],
        label: Some("camera_bind_group_layout"),
    })
}

pub fn mk_shadow_maps_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let depth_entry = |binding| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            multisampled: false,
            view_dimension: wgpu::TextureViewDimension::D2,
            sample_type: wgpu::TextureSampleType::Depth,
        },
        count: None,
    };
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            depth_entry(0),
            depth_entry(1),
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                count: None,
            },
        ],
        label: Some("shadow_maps_bind_group_layout"),
    })
}

pub fn mk_shadow_maps_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    maps: [&Texture; 2],
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&maps[0].view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&maps[1].view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
        label: Some("shadow_maps_bind_group"),
    })
}

pub struct StudioLayouts {
    pub material: wgpu::BindGroupLayout,
    pub camera: wgpu::BindGroupLayout,
    pub lights: wgpu::BindGroupLayout,
    pub shadow_maps: wgpu::BindGroupLayout,
}

impl StudioLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            material: mk_material_layout(device),
            camera: mk_camera_layout(device),
            lights: crate::pipelines::light::mk_bind_group_layout(device),
            shadow_maps: mk_shadow_maps_layout(device),
        }
    }
}

/// Opaque lit surfaces and the alpha-blended shadow catcher.
pub struct StudioPipelines {
    pub lit: wgpu::RenderPipeline,
    pub shadow_catcher: wgpu::RenderPipeline,
}

impl StudioPipelines {
    pub fn new(device: &wgpu::Device, layouts: &StudioLayouts, sample_count: u32) -> Self {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Studio Pipeline Layout"),
            bind_group_layouts: &[
                &layouts.material,
                &layouts.camera,
                &layouts.lights,
                &layouts.shadow_maps,
            ],
            push_constant_ranges: &[],
        });
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Studio Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("studio.wgsl").into()),
        });
        let vertex_layouts = [ModelVertex::desc(), InstanceRaw::desc()];
        let raster = RasterState {
            sample_count,
            ..Default::default()
        };

        let lit = mk_render_pipeline(
            device,
            "Studio Lit Pipeline",
            &layout,
            &shader,
            Some((
                "fs_main",
                FRAME_FORMAT,
                Some(wgpu::BlendState {
                    alpha: wgpu::BlendComponent::REPLACE,
                    color: wgpu::BlendComponent::REPLACE,
                }),
            )),
            Some(Texture::DEPTH_FORMAT),
            &vertex_layouts,
            raster,
        );
        let shadow_catcher = mk_render_pipeline(
            device,
            "Studio Shadow Catcher Pipeline",
            &layout,
            &shader,
            Some((
                "fs_shadow_catcher",
                FRAME_FORMAT,
                Some(wgpu::BlendState::ALPHA_BLENDING),
            )),
            Some(Texture::DEPTH_FORMAT),
            &vertex_layouts,
            raster,
        );

        Self {
            lit,
            shadow_catcher,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::color::Color;

    #[test]
    fn reflectivity_maps_to_f0() {
        assert!((dielectric_f0(0.5) - 0.04).abs() < 1e-6);
        assert!((dielectric_f0(1.0) - 0.16).abs() < 1e-6);
    }

    #[test]
    fn catcher_uniform_carries_opacity() {
        let uniform = MaterialUniform::new(&Material::shadow_catcher("floor", 0.35), None);
        assert_eq!(uniform.color, [0.0, 0.0, 0.0, 0.35]);
        assert_eq!(uniform.specular[3], SHADING_CATCHER);
        let rim = Material::physical("rim", Color::WHITE, 0.22, 1.0).with_reflectivity(1.0);
        assert!((MaterialUniform::new(&rim, None).f0() - 0.16).abs() < 1e-6);
    }
}
