#![allow(dead_code)]

use anyhow::{Result, bail};
use image::{Rgba, RgbaImage};
use tyre_studio::{
    FrameRenderer, Viewport,
    camera::Camera,
    data_structures::scene_graph::Scene,
    render::Capture,
};

/// Renderer double that records what the view asks of it.
#[derive(Debug, Default)]
pub(crate) struct FakeRenderer {
    pub(crate) viewport: Option<Viewport>,
    pub(crate) renders: u32,
    pub(crate) aspects: Vec<f32>,
    pub(crate) disposed: bool,
}

impl FakeRenderer {
    pub(crate) fn new(viewport: Viewport) -> Self {
        Self {
            viewport: Some(viewport),
            ..Default::default()
        }
    }
}

impl FrameRenderer for FakeRenderer {
    fn render(&mut self, _scene: &Scene, camera: &Camera) -> Result<()> {
        if self.disposed {
            bail!("render after dispose");
        }
        self.renders += 1;
        self.aspects.push(camera.aspect);
        Ok(())
    }

    fn set_size(&mut self, viewport: Viewport) -> Result<()> {
        self.viewport = Some(viewport);
        Ok(())
    }

    fn size(&self) -> Viewport {
        self.viewport.unwrap_or(Viewport::new(0, 0, 1.0))
    }

    fn capture(&self) -> Capture {
        let [width, height] = self.size().physical_size(2.0);
        let shade = self.renders.min(255) as u8;
        Box::pin(async move { Ok(RgbaImage::from_pixel(width, height, Rgba([shade, 0, 0, 255]))) })
    }

    fn dispose(&mut self) {
        self.disposed = true;
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

pub(crate) fn viewport(width: u32, height: u32) -> Viewport {
    Viewport::new(width, height, 1.0)
}

pub(crate) fn fake(viewport: Viewport) -> Result<FakeRenderer> {
    Ok(FakeRenderer::new(viewport))
}

/// Headless GPU context. GPU tests are opt-in, so a missing adapter fails
/// the test instead of passing it.
#[cfg(feature = "integration-tests")]
pub(crate) fn headless_context() -> tyre_studio::context::Context {
    futures::executor::block_on(tyre_studio::context::Context::headless())
        .unwrap_or_else(|e| panic!("GPU tests need a wgpu adapter: {e:#}"))
}
