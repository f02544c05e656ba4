use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        light::{Light, LightKind},
        scene_graph::Scene,
    },
    pipelines::basic::uniform_layout_entry,
};

pub const MAX_LIGHTS: usize = 4;
pub const MAX_SHADOWS: usize = 2;

const KIND_DIRECTIONAL: f32 = 0.0;
const KIND_SPOT: f32 = 1.0;

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightRaw {
    // rgb premultiplied by intensity, w = kind
    color: [f32; 4],
    // w = cutoff distance (spot only, 0 = infinite)
    position: [f32; 4],
    // unit vector towards the target, w = decay
    direction: [f32; 4],
    // cos outer, cos inner, shadow slot (-1 = none), shadow bias
    cone: [f32; 4],
}

impl LightRaw {
    pub fn new(light: &Light, shadow_slot: Option<usize>) -> Self {
        let (kind, distance, decay, cos_outer, cos_inner) = match light.kind {
            LightKind::Directional => (KIND_DIRECTIONAL, 0.0, 0.0, -1.0, -1.0),
            LightKind::Spot {
                distance,
                angle,
                penumbra,
                decay,
            } => (
                KIND_SPOT,
                distance,
                decay,
                angle.cos(),
                (angle * (1.0 - penumbra)).cos(),
            ),
        };
        let color = light.color.scaled(light.intensity);
        let direction = light.direction();
        Self {
            color: [color.r, color.g, color.b, kind],
            position: [light.position.x, light.position.y, light.position.z, distance],
            direction: [direction.x, direction.y, direction.z, decay],
            cone: [
                cos_outer,
                cos_inner,
                shadow_slot.map_or(-1.0, |slot| slot as f32),
                light.shadow.map_or(0.0, |shadow| shadow.bias),
            ],
        }
    }
}

/// Everything the lit shader needs besides material and camera: lights,
/// shadow transforms, fog and tone mapping exposure.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightsUniform {
    lights: [LightRaw; MAX_LIGHTS],
    shadow_view_proj: [[[f32; 4]; 4]; MAX_SHADOWS],
    // rgb, w = 1 when fog is enabled
    fog_color: [f32; 4],
    // fog near, fog far, exposure, light count
    params: [f32; 4],
    // 1 / shadow map size per slot
    shadow_texel: [f32; 4],
}

/// Lights that get a shadow map, in slot order.
pub fn shadow_casters(scene: &Scene) -> impl Iterator<Item = &Light> {
    scene
        .lights()
        .filter(|light| light.casts_shadow())
        .take(MAX_SHADOWS)
}

impl LightsUniform {
    /// `shadow_sizes[slot]` is the edge length of the map allocated for slot.
    /// Casters without an allocated map are lit unshadowed.
    pub fn from_scene(scene: &Scene, exposure: f32, shadow_sizes: &[u32]) -> Self {
        let mut uniform: Self = bytemuck::Zeroable::zeroed();
        let mut count = 0;
        let mut slot = 0;
        for light in scene.lights() {
            if count == MAX_LIGHTS {
                log::warn!("only {MAX_LIGHTS} lights are supported, '{}' is ignored", light.name);
                continue;
            }
            let shadow_slot = match light.shadow_view_proj() {
                Some(view_proj) if slot < MAX_SHADOWS.min(shadow_sizes.len()) => {
                    uniform.shadow_view_proj[slot] = view_proj.into();
                    uniform.shadow_texel[slot] = 1.0 / shadow_sizes[slot].max(1) as f32;
                    slot += 1;
                    Some(slot - 1)
                }
                _ => None,
            };
            uniform.lights[count] = LightRaw::new(light, shadow_slot);
            count += 1;
        }
        if let Some(fog) = scene.fog {
            uniform.fog_color = [fog.color.r, fog.color.g, fog.color.b, 1.0];
            uniform.params[0] = fog.near;
            uniform.params[1] = fog.far;
        }
        uniform.params[2] = exposure;
        uniform.params[3] = count as f32;
        uniform
    }

    pub fn light_count(&self) -> usize {
        self.params[3] as usize
    }
}

pub fn mk_buffer(device: &wgpu::Device, uniform: LightsUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Lights Buffer"),
        contents: bytemuck::cast_slice(&[uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[uniform_layout_entry(
            0,
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        )],
        label: Some("lights_bind_group_layout"),
    })
}

pub fn mk_bind_group(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    light_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: light_buffer.as_entire_binding(),
        }],
        label: Some("lights_bind_group"),
    })
}

#[cfg(test)]
mod tests {
    use cgmath::{Deg, Point3};

    use super::*;
    use crate::data_structures::{
        color::Color,
        light::{ShadowCamera, ShadowConfig},
    };

    fn shadow() -> ShadowConfig {
        ShadowConfig {
            map_size: 512,
            bias: -0.001,
            camera: ShadowCamera::Perspective {
                fovy: Deg(60.0).into(),
                near: 0.5,
                far: 20.0,
            },
        }
    }

    #[test]
    fn shadow_slots_follow_light_order() {
        let mut scene = Scene::new(Color::BLACK);
        scene.add(Light::directional("a", Color::WHITE, 1.0, Point3::new(1.0, 5.0, 0.0)));
        scene.add(
            Light::directional("b", Color::WHITE, 1.0, Point3::new(0.0, 5.0, 1.0))
                .with_shadow(shadow()),
        );
        let uniform = LightsUniform::from_scene(&scene, 1.0, &[512]);
        assert_eq!(uniform.light_count(), 2);
        assert_eq!(uniform.lights[0].cone[2], -1.0);
        assert_eq!(uniform.lights[1].cone[2], 0.0);
        assert_eq!(uniform.shadow_texel[0], 1.0 / 512.0);
    }

    #[test]
    fn casters_without_maps_are_unshadowed() {
        let mut scene = Scene::new(Color::BLACK);
        scene.add(
            Light::directional("a", Color::WHITE, 1.0, Point3::new(1.0, 5.0, 0.0))
                .with_shadow(shadow()),
        );
        let uniform = LightsUniform::from_scene(&scene, 1.0, &[]);
        assert_eq!(uniform.lights[0].cone[2], -1.0);
    }
}
