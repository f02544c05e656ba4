//! Textures, on the CPU and on the GPU.
//!
//! [`TextureMap`] is the scene-side description of a texture: a single-channel
//! raster plus the sampling parameters it should be drawn with. [`Texture`]
//! wraps the WGPU objects a map (or a render target) turns into once uploaded.

use anyhow::*;
use image::GrayImage;

/// Handle into a scene's texture table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub(crate) usize);

impl TextureId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wrap {
    Repeat,
    ClampToEdge,
}

impl From<Wrap> for wgpu::AddressMode {
    fn from(wrap: Wrap) -> Self {
        match wrap {
            Wrap::Repeat => wgpu::AddressMode::Repeat,
            Wrap::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        }
    }
}

/// A raster with its sampling parameters.
#[derive(Clone, Debug)]
pub struct TextureMap {
    pub name: String,
    image: GrayImage,
    pub wrap: (Wrap, Wrap),
    pub repeat: [f32; 2],
    pub anisotropy: u16,
    disposed: bool,
}

impl TextureMap {
    pub fn new(name: &str, image: GrayImage) -> Self {
        Self {
            name: name.to_string(),
            image,
            wrap: (Wrap::ClampToEdge, Wrap::ClampToEdge),
            repeat: [1.0, 1.0],
            anisotropy: 1,
            disposed: false,
        }
    }

    pub fn with_wrap(mut self, u: Wrap, v: Wrap) -> Self {
        self.wrap = (u, v);
        self
    }

    pub fn with_repeat(mut self, u: f32, v: f32) -> Self {
        self.repeat = [u, v];
        self
    }

    pub fn with_anisotropy(mut self, anisotropy: u16) -> Self {
        self.anisotropy = anisotropy.max(1);
        self
    }

    pub fn image(&self) -> &GrayImage {
        &self.image
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Number of levels in a full mip chain down to 1x1.
    pub fn mip_level_count(&self) -> u32 {
        let (width, height) = self.dimensions();
        32 - width.max(height).max(1).leading_zeros()
    }

    /// Drop the raster. Uploading a disposed map is an error.
    pub fn dispose(&mut self) {
        self.image = GrayImage::new(0, 0);
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

/// A GPU texture with a view and optional sampler.
#[derive(Clone, Debug)]
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: Option<wgpu::Sampler>,
}

impl Texture {
    /// Standard depth buffer texture format (32-bit float).
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Create a depth texture for depth-testing during rendering.
    ///
    /// `sample_count` must match the color attachment it is paired with.
    pub fn create_depth_texture(
        device: &wgpu::Device,
        size: [u32; 2],
        sample_count: u32,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: size[0].max(1),
            height: size[1].max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            sampler: None,
        }
    }

    /// Square depth texture that a light renders occluders into and the lit
    /// pass samples with a comparison sampler.
    pub fn create_shadow_map(device: &wgpu::Device, size: u32, label: &str) -> Self {
        let size = wgpu::Extent3d {
            width: size.max(1),
            height: size.max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = Some(create_shadow_sampler(device));

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Color attachment of the given format. Single-sampled targets can be
    /// copied out for readback.
    pub fn create_render_target(
        device: &wgpu::Device,
        size: [u32; 2],
        format: wgpu::TextureFormat,
        sample_count: u32,
        label: &str,
    ) -> Self {
        let usage = if sample_count > 1 {
            wgpu::TextureUsages::RENDER_ATTACHMENT
        } else {
            wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size[0].max(1),
                height: size[1].max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = (sample_count == 1).then(|| create_blit_sampler(device));

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Flat mid-grey height map, bound when a material has no bump map so the
    /// shader layout stays fixed.
    pub fn create_default_bump_map(device: &wgpu::Device, queue: &wgpu::Queue) -> Texture {
        let size = wgpu::Extent3d {
            width: 1,
            height: 1,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("default bump map"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            &[128],
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(1),
                rows_per_image: Some(1),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = Some(create_default_sampler(device));
        Texture {
            texture,
            view,
            sampler,
        }
    }

    /// Upload a [`TextureMap`] as a linear single-channel texture with a full
    /// mip chain and the map's wrap and anisotropy settings.
    pub fn from_texture_map(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        map: &TextureMap,
    ) -> Result<Self> {
        if map.is_disposed() {
            bail!("texture map '{}' was disposed before upload", map.name);
        }
        let (width, height) = map.dimensions();
        if width == 0 || height == 0 {
            bail!("texture map '{}' has no pixels", map.name);
        }
        let mip_level_count = map.mip_level_count();

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&map.name),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (level, raster) in mip_chain(map.image(), mip_level_count).iter().enumerate() {
            let (w, h) = raster.dimensions();
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    aspect: wgpu::TextureAspect::All,
                    texture: &texture,
                    mip_level: level as u32,
                    origin: wgpu::Origin3d::ZERO,
                },
                raster.as_raw(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(w),
                    rows_per_image: Some(h),
                },
                wgpu::Extent3d {
                    width: w,
                    height: h,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = Some(device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&map.name),
            address_mode_u: map.wrap.0.into(),
            address_mode_v: map.wrap.1.into(),
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            anisotropy_clamp: map.anisotropy.max(1),
            ..Default::default()
        }));

        Ok(Self {
            texture,
            view,
            sampler,
        })
    }

    pub fn size(&self) -> [u32; 2] {
        [self.texture.width(), self.texture.height()]
    }

    /// Release the GPU memory now instead of when the last handle drops.
    pub fn destroy(&self) {
        self.texture.destroy();
    }
}

/// Box-filtered mip chain, level 0 first.
pub fn mip_chain(base: &GrayImage, levels: u32) -> Vec<GrayImage> {
    let mut chain = Vec::with_capacity(levels as usize);
    chain.push(base.clone());
    for level in 1..levels {
        let w = (base.width() >> level).max(1);
        let h = (base.height() >> level).max(1);
        let Some(previous) = chain.last() else { break };
        let next = image::imageops::resize(previous, w, h, image::imageops::FilterType::Triangle);
        chain.push(next);
    }
    chain
}

pub fn create_default_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}

fn create_blit_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("blit sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}

/// Hardware 2x2 PCF: linear filtering on a comparison sampler.
pub fn create_shadow_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("shadow sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        compare: Some(wgpu::CompareFunction::LessEqual),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mip_chain_reaches_one_pixel() {
        let map = TextureMap::new("probe", GrayImage::new(1024, 1024));
        assert_eq!(map.mip_level_count(), 11);
        let chain = mip_chain(map.image(), map.mip_level_count());
        assert_eq!(chain.len(), 11);
        assert_eq!(chain.last().map(|m| m.dimensions()), Some((1, 1)));
    }

    #[test]
    fn dispose_drops_raster() {
        let mut map = TextureMap::new("probe", GrayImage::new(4, 4));
        map.dispose();
        assert!(map.is_disposed());
        assert_eq!(map.dimensions(), (0, 0));
    }
}
