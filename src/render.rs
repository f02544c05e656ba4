//! Offscreen scene rendering.
//!
//! [`Renderer`] draws a [`Scene`] through a [`Camera`] into a retained
//! offscreen frame. The frame survives between renders, so it can be presented
//! again or read back without touching the scene. Each render runs one depth
//! pass per shadow-casting light followed by a multisampled lit pass.
//!
//! Meshes sharing geometry, material and shadow flag are drawn as one
//! instanced batch, so the eight spokes cost a single draw call.
//!
//! The view logic only depends on the [`FrameRenderer`] trait, which keeps it
//! testable without a GPU.

use std::{iter, pin::Pin};

use anyhow::{Context as _, Result, anyhow, bail};
use image::RgbaImage;
use wgpu::util::DeviceExt;

use crate::{
    camera::{Camera, CameraUniform},
    context::{Context, FRAME_FORMAT},
    data_structures::{
        geometry::GeometryId,
        instance::InstanceRaw,
        material::MaterialId,
        scene_graph::Scene,
        texture::{Texture, create_default_sampler, create_shadow_sampler},
    },
    pipelines::{
        light::{self, LightsUniform, shadow_casters},
        shadow::{self, ShadowCameraUniform, ShadowSlot},
        studio::{self, MaterialUniform, StudioLayouts, StudioPipelines},
    },
};

/// Readback of the current frame as tightly packed sRGB RGBA8 pixels.
pub type Capture = Pin<Box<dyn Future<Output = Result<RgbaImage>>>>;

/// Size of the view in logical pixels plus the device pixel ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32, pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            pixel_ratio,
        }
    }

    /// Logical size derived from a physical size and scale factor.
    pub fn from_physical(width: u32, height: u32, scale_factor: f64) -> Self {
        let scale = if scale_factor > 0.0 { scale_factor } else { 1.0 };
        Self {
            width: (width as f64 / scale).round() as u32,
            height: (height as f64 / scale).round() as u32,
            pixel_ratio: scale as f32,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Backing-store size with the pixel ratio capped at `max_pixel_ratio`.
    pub fn physical_size(&self, max_pixel_ratio: f32) -> [u32; 2] {
        let ratio = self.pixel_ratio.clamp(f32::EPSILON, max_pixel_ratio.max(f32::EPSILON));
        [
            ((self.width as f32 * ratio).round() as u32).max(1),
            ((self.height as f32 * ratio).round() as u32).max(1),
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RendererSettings {
    /// Multiplier applied before ACES filmic tone mapping.
    pub exposure: f32,
    pub max_pixel_ratio: f32,
    pub antialias: bool,
    pub shadows: bool,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            exposure: 1.2,
            max_pixel_ratio: 2.0,
            antialias: true,
            shadows: true,
        }
    }
}

/// What the view needs from a renderer.
pub trait FrameRenderer {
    /// Draw `scene` through `camera` into the retained frame.
    fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<()>;

    /// Resize the retained frame. Does not render.
    fn set_size(&mut self, viewport: Viewport) -> Result<()>;

    /// Current size in logical pixels.
    fn size(&self) -> Viewport;

    /// Read the retained frame back. The returned future owns everything it
    /// needs and does not borrow the renderer.
    fn capture(&self) -> Capture;

    /// Release every GPU resource. Further renders fail.
    fn dispose(&mut self);

    fn is_disposed(&self) -> bool;
}

struct GpuGeometry {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    num_elements: u32,
}

struct GpuMaterial {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    transparent: bool,
}

/// GPU copies of one scene's tables.
struct GpuScene {
    signature: (usize, usize, usize),
    geometries: Vec<GpuGeometry>,
    materials: Vec<GpuMaterial>,
    textures: Vec<Texture>,
    shadow_slots: Vec<ShadowSlot>,
    shadow_maps: wgpu::BindGroup,
}

impl GpuScene {
    fn destroy(&self) {
        for geometry in &self.geometries {
            geometry.vertex_buffer.destroy();
            geometry.index_buffer.destroy();
        }
        for material in &self.materials {
            material.buffer.destroy();
        }
        for texture in &self.textures {
            texture.destroy();
        }
        for slot in &self.shadow_slots {
            slot.map.destroy();
            slot.buffer.destroy();
        }
    }
}

/// One instanced draw.
pub struct Batch {
    pub geometry: GeometryId,
    pub material: MaterialId,
    pub cast_shadow: bool,
    pub instances: Vec<InstanceRaw>,
}

/// Group the scene's meshes into instanced batches, in first-seen order.
pub fn collect_batches(scene: &Scene) -> Vec<Batch> {
    let mut batches: Vec<Batch> = Vec::new();
    for (mesh, world) in scene.get_world_meshes() {
        let raw = InstanceRaw::new(world.to_matrix(), mesh.receive_shadow);
        match batches.iter_mut().find(|batch| {
            batch.geometry == mesh.geometry
                && batch.material == mesh.material
                && batch.cast_shadow == mesh.cast_shadow
        }) {
            Some(batch) => batch.instances.push(raw),
            None => batches.push(Batch {
                geometry: mesh.geometry,
                material: mesh.material,
                cast_shadow: mesh.cast_shadow,
                instances: vec![raw],
            }),
        }
    }
    batches
}

struct PreparedBatch {
    geometry: usize,
    material: usize,
    cast_shadow: bool,
    transparent: bool,
    instance_buffer: wgpu::Buffer,
    amount: u32,
}

trait DrawBatch<'a> {
    fn draw_batch(&mut self, geometry: &'a GpuGeometry, instances: &'a wgpu::Buffer, amount: u32);
}

impl<'a> DrawBatch<'a> for wgpu::RenderPass<'a> {
    fn draw_batch(&mut self, geometry: &'a GpuGeometry, instances: &'a wgpu::Buffer, amount: u32) {
        self.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
        self.set_vertex_buffer(1, instances.slice(..));
        self.set_index_buffer(geometry.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..geometry.num_elements, 0, 0..amount);
    }
}

/// Bytes per row of a texture-to-buffer copy, padded to the copy alignment.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * 4;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Drop the alignment padding from each row of a readback.
pub fn strip_row_padding(data: &[u8], width: u32, height: u32, padded_row: u32) -> Vec<u8> {
    let row = (width * 4) as usize;
    let mut pixels = Vec::with_capacity(row * height as usize);
    for chunk in data.chunks(padded_row as usize).take(height as usize) {
        pixels.extend_from_slice(&chunk[..row.min(chunk.len())]);
    }
    pixels
}

pub struct Renderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    settings: RendererSettings,
    sample_count: u32,
    max_texture_size: u32,
    viewport: Viewport,
    physical: [u32; 2],
    frame: Texture,
    frame_version: u64,
    msaa: Option<Texture>,
    depth: Texture,
    layouts: StudioLayouts,
    pipelines: StudioPipelines,
    shadow_layout: wgpu::BindGroupLayout,
    shadow_pipeline: wgpu::RenderPipeline,
    shadow_sampler: wgpu::Sampler,
    dummy_shadow_map: Texture,
    default_bump: Texture,
    default_sampler: wgpu::Sampler,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    lights_buffer: wgpu::Buffer,
    lights_bind_group: wgpu::BindGroup,
    scene: Option<GpuScene>,
    frames_rendered: u64,
    disposed: bool,
}

impl Renderer {
    pub fn new(ctx: &Context, viewport: Viewport, settings: RendererSettings) -> Result<Self> {
        if viewport.is_empty() {
            bail!(
                "cannot create a renderer for an empty {}x{} viewport",
                viewport.width,
                viewport.height
            );
        }
        let device = ctx.device.clone();
        let queue = ctx.queue.clone();
        let sample_count = if settings.antialias { ctx.sample_count } else { 1 };
        let physical = viewport.physical_size(settings.max_pixel_ratio);

        let layouts = StudioLayouts::new(&device);
        let pipelines = StudioPipelines::new(&device, &layouts, sample_count);
        let shadow_layout = shadow::mk_bind_group_layout(&device);
        let shadow_pipeline = shadow::mk_shadow_pipeline(&device, &shadow_layout);

        let mut camera_uniform = CameraUniform::new();
        camera_uniform.update_view_proj(&Camera::studio(viewport.aspect()));
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &layouts.camera,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        let lights_buffer = light::mk_buffer(&device, bytemuck::Zeroable::zeroed());
        let lights_bind_group = light::mk_bind_group(&device, &layouts.lights, &lights_buffer);

        let (frame, msaa, depth) = Self::mk_targets(&device, physical, sample_count);

        Ok(Self {
            shadow_sampler: create_shadow_sampler(&device),
            dummy_shadow_map: Texture::create_shadow_map(&device, 1, "dummy shadow map"),
            default_bump: Texture::create_default_bump_map(&device, &queue),
            default_sampler: create_default_sampler(&device),
            max_texture_size: ctx.max_texture_size(),
            device,
            queue,
            settings,
            sample_count,
            viewport,
            physical,
            frame,
            frame_version: 0,
            msaa,
            depth,
            layouts,
            pipelines,
            shadow_layout,
            shadow_pipeline,
            camera_buffer,
            camera_bind_group,
            lights_buffer,
            lights_bind_group,
            scene: None,
            frames_rendered: 0,
            disposed: false,
        })
    }

    fn mk_targets(
        device: &wgpu::Device,
        size: [u32; 2],
        sample_count: u32,
    ) -> (Texture, Option<Texture>, Texture) {
        let frame = Texture::create_render_target(device, size, FRAME_FORMAT, 1, "frame");
        let msaa = (sample_count > 1).then(|| {
            Texture::create_render_target(device, size, FRAME_FORMAT, sample_count, "frame msaa")
        });
        let depth = Texture::create_depth_texture(device, size, sample_count, "depth_texture");
        (frame, msaa, depth)
    }

    /// The retained frame, single-sampled and sampleable.
    pub fn frame(&self) -> &Texture {
        &self.frame
    }

    /// Changes whenever the frame texture is recreated.
    pub fn frame_version(&self) -> u64 {
        self.frame_version
    }

    pub fn physical_size(&self) -> [u32; 2] {
        self.physical
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Edge lengths of the allocated shadow maps, in slot order.
    pub fn shadow_map_sizes(&self) -> Vec<u32> {
        self.scene
            .as_ref()
            .map(|scene| scene.shadow_slots.iter().map(ShadowSlot::size).collect())
            .unwrap_or_default()
    }

    /// Upload the scene's tables unless they are already resident.
    fn prepare(&mut self, scene: &Scene) -> Result<()> {
        let signature = (
            scene.geometries().len(),
            scene.materials().len(),
            scene.textures().len(),
        );
        if self.scene.as_ref().is_some_and(|gpu| gpu.signature == signature) {
            return Ok(());
        }
        if let Some(old) = self.scene.take() {
            old.destroy();
        }
        scene.validate()?;

        let mut textures = Vec::with_capacity(scene.textures().len());
        for map in scene.textures() {
            textures.push(
                Texture::from_texture_map(&self.device, &self.queue, map)
                    .with_context(|| format!("uploading texture '{}'", map.name))?,
            );
        }

        let mut geometries = Vec::with_capacity(scene.geometries().len());
        for (index, geometry) in scene.geometries().iter().enumerate() {
            if geometry.is_disposed() {
                bail!("geometry {index} was disposed before upload");
            }
            let label = format!("Geometry {index}");
            geometries.push(GpuGeometry {
                vertex_buffer: self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{label} Vertex Buffer")),
                    contents: bytemuck::cast_slice(&geometry.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
                index_buffer: self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{label} Index Buffer")),
                    contents: bytemuck::cast_slice(&geometry.indices),
                    usage: wgpu::BufferUsages::INDEX,
                }),
                num_elements: geometry.indices.len() as u32,
            });
        }

        let mut materials = Vec::with_capacity(scene.materials().len());
        for material in scene.materials() {
            if material.is_disposed() {
                bail!("material '{}' was disposed before upload", material.name);
            }
            let bump_map = material.bump_map.and_then(|id| scene.texture(id));
            let bump = material
                .bump_map
                .and_then(|id| textures.get(id.index()))
                .unwrap_or(&self.default_bump);
            let (buffer, bind_group) = studio::mk_material_bind_group(
                &self.device,
                &self.layouts.material,
                MaterialUniform::new(material, bump_map),
                bump,
                &self.default_sampler,
                &material.name,
            );
            materials.push(GpuMaterial {
                buffer,
                bind_group,
                transparent: material.is_transparent(),
            });
        }

        let mut shadow_slots = Vec::new();
        if self.settings.shadows {
            for (slot, light) in shadow_casters(scene).enumerate() {
                let Some(config) = light.shadow else { continue };
                let size = if config.map_size > self.max_texture_size {
                    log::warn!(
                        "shadow map of '{}' clamped from {} to {}",
                        light.name,
                        config.map_size,
                        self.max_texture_size
                    );
                    self.max_texture_size
                } else {
                    config.map_size
                };
                shadow_slots.push(ShadowSlot::new(
                    &self.device,
                    &self.shadow_layout,
                    size,
                    &format!("shadow map {slot} ({})", light.name),
                ));
            }
        }
        let shadow_maps = studio::mk_shadow_maps_bind_group(
            &self.device,
            &self.layouts.shadow_maps,
            [
                shadow_slots.first().map_or(&self.dummy_shadow_map, |slot| &slot.map),
                shadow_slots.get(1).map_or(&self.dummy_shadow_map, |slot| &slot.map),
            ],
            &self.shadow_sampler,
        );

        log::debug!(
            "uploaded scene: {} geometries, {} materials, {} textures, {} shadow maps",
            geometries.len(),
            materials.len(),
            textures.len(),
            shadow_slots.len()
        );
        self.scene = Some(GpuScene {
            signature,
            geometries,
            materials,
            textures,
            shadow_slots,
            shadow_maps,
        });
        Ok(())
    }
}

impl FrameRenderer for Renderer {
    fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<()> {
        if self.disposed {
            bail!("render called on a disposed renderer");
        }
        if scene.is_disposed() {
            bail!("render called with a disposed scene");
        }
        self.prepare(scene)?;
        let gpu = self
            .scene
            .as_ref()
            .ok_or_else(|| anyhow!("scene resources missing after upload"))?;

        let mut camera_uniform = CameraUniform::new();
        camera_uniform.update_view_proj(camera);
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[camera_uniform]));

        let shadow_sizes: Vec<u32> = gpu.shadow_slots.iter().map(ShadowSlot::size).collect();
        let lights = LightsUniform::from_scene(scene, self.settings.exposure, &shadow_sizes);
        self.queue
            .write_buffer(&self.lights_buffer, 0, bytemuck::cast_slice(&[lights]));

        for (slot, light) in gpu.shadow_slots.iter().zip(shadow_casters(scene)) {
            if let Some(view_proj) = light.shadow_view_proj() {
                self.queue.write_buffer(
                    &slot.buffer,
                    0,
                    bytemuck::cast_slice(&[ShadowCameraUniform {
                        view_proj: view_proj.into(),
                    }]),
                );
            }
        }

        let batches: Vec<PreparedBatch> = collect_batches(scene)
            .into_iter()
            .filter_map(|batch| {
                let material = gpu.materials.get(batch.material.index())?;
                gpu.geometries.get(batch.geometry.index())?;
                Some(PreparedBatch {
                    geometry: batch.geometry.index(),
                    material: batch.material.index(),
                    cast_shadow: batch.cast_shadow,
                    transparent: material.transparent,
                    amount: batch.instances.len() as u32,
                    instance_buffer: self.device.create_buffer_init(
                        &wgpu::util::BufferInitDescriptor {
                            label: Some("Instance Buffer"),
                            contents: bytemuck::cast_slice(&batch.instances),
                            usage: wgpu::BufferUsages::VERTEX,
                        },
                    ),
                })
            })
            .collect();

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        for slot in &gpu.shadow_slots {
            let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &slot.map.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            shadow_pass.set_pipeline(&self.shadow_pipeline);
            shadow_pass.set_bind_group(0, &slot.bind_group, &[]);
            for batch in batches.iter().filter(|batch| batch.cast_shadow) {
                shadow_pass.draw_batch(
                    &gpu.geometries[batch.geometry],
                    &batch.instance_buffer,
                    batch.amount,
                );
            }
        }

        {
            let (view, resolve_target) = match &self.msaa {
                Some(msaa) => (&msaa.view, Some(&self.frame.view)),
                None => (&self.frame.view, None),
            };
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(scene.background.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_bind_group(1, &self.camera_bind_group, &[]);
            render_pass.set_bind_group(2, &self.lights_bind_group, &[]);
            render_pass.set_bind_group(3, &gpu.shadow_maps, &[]);

            // Opaque first, then the blended shadow catcher over them.
            for transparent in [false, true] {
                render_pass.set_pipeline(if transparent {
                    &self.pipelines.shadow_catcher
                } else {
                    &self.pipelines.lit
                });
                for batch in batches.iter().filter(|batch| batch.transparent == transparent) {
                    if batch.amount == 0 {
                        log::warn!("skipping a batch with zero instances");
                        continue;
                    }
                    render_pass.set_bind_group(0, &gpu.materials[batch.material].bind_group, &[]);
                    render_pass.draw_batch(
                        &gpu.geometries[batch.geometry],
                        &batch.instance_buffer,
                        batch.amount,
                    );
                }
            }
        }

        self.queue.submit(iter::once(encoder.finish()));
        for batch in &batches {
            batch.instance_buffer.destroy();
        }
        self.frames_rendered += 1;
        Ok(())
    }

    fn set_size(&mut self, viewport: Viewport) -> Result<()> {
        if self.disposed {
            bail!("set_size called on a disposed renderer");
        }
        if viewport.is_empty() {
            bail!("cannot resize to an empty {}x{} viewport", viewport.width, viewport.height);
        }
        let physical = viewport.physical_size(self.settings.max_pixel_ratio);
        self.viewport = viewport;
        if physical != self.physical {
            self.frame.destroy();
            if let Some(msaa) = &self.msaa {
                msaa.destroy();
            }
            self.depth.destroy();
            let (frame, msaa, depth) = Self::mk_targets(&self.device, physical, self.sample_count);
            self.frame = frame;
            self.msaa = msaa;
            self.depth = depth;
            self.physical = physical;
            self.frame_version += 1;
        }
        Ok(())
    }

    fn size(&self) -> Viewport {
        self.viewport
    }

    fn capture(&self) -> Capture {
        if self.disposed {
            return Box::pin(async { Err(anyhow!("capture called on a disposed renderer")) });
        }
        let [width, height] = self.physical;
        let padded_row = padded_bytes_per_row(width);
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Capture Buffer"),
            size: (padded_row * height) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Capture Encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &self.frame.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(iter::once(encoder.finish()));

        let device = self.device.clone();
        Box::pin(async move {
            let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
            let buffer_slice = buffer.slice(..);
            buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
                let _ = tx.send(result);
            });
            device
                .poll(wgpu::PollType::Wait)
                .context("waiting for the frame readback")?;
            rx.receive()
                .await
                .context("readback channel closed before mapping finished")?
                .context("mapping the readback buffer")?;
            let pixels = {
                let data = buffer_slice.get_mapped_range();
                strip_row_padding(&data, width, height, padded_row)
            };
            buffer.unmap();
            buffer.destroy();
            RgbaImage::from_raw(width, height, pixels)
                .context("readback size does not match the frame")
        })
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        if let Some(scene) = self.scene.take() {
            scene.destroy();
        }
        self.frame.destroy();
        if let Some(msaa) = &self.msaa {
            msaa.destroy();
        }
        self.depth.destroy();
        self.dummy_shadow_map.destroy();
        self.default_bump.destroy();
        self.camera_buffer.destroy();
        self.lights_buffer.destroy();
        self.disposed = true;
        log::debug!("renderer disposed after {} frames", self.frames_rendered);
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn physical_size_caps_pixel_ratio() {
        let viewport = Viewport::new(800, 600, 3.0);
        assert_eq!(viewport.physical_size(2.0), [1600, 1200]);
        assert_eq!(Viewport::new(800, 600, 1.0).physical_size(2.0), [800, 600]);
    }

    #[test]
    fn rows_are_padded_to_copy_alignment() {
        assert_eq!(padded_bytes_per_row(64), 256);
        assert_eq!(padded_bytes_per_row(65), 512);
        let data: Vec<u8> = (0..512u32).map(|i| (i % 256) as u8).collect();
        let pixels = strip_row_padding(&data, 2, 2, 256);
        assert_eq!(pixels.len(), 16);
        assert_eq!(&pixels[8..12], &[0, 1, 2, 3]);
    }
}
