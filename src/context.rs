//! GPU and window context.
//!
//! [`Context`] owns the device and queue every other GPU object is created
//! from. It can be created against a window surface ([`Context::new`]) or
//! without one ([`Context::headless`]) for offscreen rendering and tests.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use winit::window::Window;

use crate::data_structures::texture::Texture;

/// Color format of the offscreen frame. Writes are sRGB-encoded in hardware.
pub const FRAME_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

pub const MSAA_SAMPLES: u32 = 4;

#[derive(Debug, Clone)]
pub struct Context {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub adapter_info: wgpu::AdapterInfo,
    /// 4 when the adapter can multisample the frame and depth formats, 1 otherwise.
    pub sample_count: u32,
}

/// Window plus the surface it presents through.
#[derive(Debug)]
pub struct WindowSurface {
    pub window: Arc<Window>,
    pub surface: wgpu::Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,
    pub is_configured: bool,
}

impl WindowSurface {
    /// Reconfigure the swapchain. Zero sizes are ignored.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(device, &self.config);
            self.is_configured = true;
        }
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }
}

fn mk_instance() -> wgpu::Instance {
    wgpu::Instance::new(&wgpu::InstanceDescriptor {
        #[cfg(not(target_arch = "wasm32"))]
        backends: wgpu::Backends::PRIMARY,
        #[cfg(target_arch = "wasm32")]
        backends: wgpu::Backends::GL,
        ..Default::default()
    })
}

impl Context {
    /// Create a context whose device can present to `window`.
    pub async fn new(window: Arc<Window>) -> Result<(Self, WindowSurface)> {
        let size = window.inner_size();

        log::info!("WGPU setup");
        let instance = mk_instance();
        let surface = instance
            .create_surface(window.clone())
            .context("cannot create a surface for the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no graphics adapter is compatible with the window surface")?;
        let ctx = Self::from_adapter(&adapter).await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The blit shader writes linear values and relies on an sRGB surface
        // to encode them.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("the surface reports no supported formats")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        let mut surface = WindowSurface {
            window,
            surface,
            config,
            is_configured: false,
        };
        surface.resize(&ctx.device, size.width, size.height);

        Ok((ctx, surface))
    }

    /// Create a context with no surface attached.
    pub async fn headless() -> Result<Self> {
        let instance = mk_instance();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .context("no graphics adapter available for headless rendering")?;
        Self::from_adapter(&adapter).await
    }

    async fn from_adapter(adapter: &wgpu::Adapter) -> Result<Self> {
        log::info!("device and queue");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("tyre-studio device"),
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features, so if
                // we're building for the web we'll have to disable some.
                // Texture sizes follow the adapter so the 4096 shadow map fits
                // wherever the hardware allows it.
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                }
                .using_resolution(adapter.limits()),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("the graphics adapter refused to create a device")?;

        let supports = |format: wgpu::TextureFormat| {
            adapter
                .get_texture_format_features(format)
                .flags
                .sample_count_supported(MSAA_SAMPLES)
        };
        let sample_count = if supports(FRAME_FORMAT) && supports(Texture::DEPTH_FORMAT) {
            MSAA_SAMPLES
        } else {
            log::warn!("{MSAA_SAMPLES}x multisampling unsupported, rendering without antialiasing");
            1
        };

        let adapter_info = adapter.get_info();
        log::info!("using {} ({:?})", adapter_info.name, adapter_info.backend);
        Ok(Self {
            device,
            queue,
            adapter_info,
            sample_count,
        })
    }

    pub fn max_texture_size(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }
}
