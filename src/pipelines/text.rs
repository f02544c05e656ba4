use anyhow::{Result, anyhow};
use glyphon::{
    Attrs, Buffer, Cache, Color, Family, FontSystem, Metrics, Resolution, Shaping, SwashCache,
    TextArea, TextAtlas, TextBounds, TextRenderer, Viewport,
};

use crate::controls::Label;

const FONT_SIZE: f32 = 14.0;
const LINE_HEIGHT: f32 = 18.0;

/// Button captions, shaped with the system fonts and drawn on the surface
/// pass after the overlay quads.
pub struct LabelRenderer {
    font_system: FontSystem,
    swash_cache: SwashCache,
    viewport: Viewport,
    atlas: TextAtlas,
    renderer: TextRenderer,
    buffers: Vec<Buffer>,
}

impl LabelRenderer {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, format: wgpu::TextureFormat) -> Self {
        let font_system = FontSystem::new();
        let cache = Cache::new(device);
        let viewport = Viewport::new(device, &cache);
        let mut atlas = TextAtlas::new(device, queue, &cache, format);
        let renderer =
            TextRenderer::new(&mut atlas, device, wgpu::MultisampleState::default(), None);
        Self {
            font_system,
            swash_cache: SwashCache::new(),
            viewport,
            atlas,
            renderer,
            buffers: Vec::new(),
        }
    }

    /// Shape `labels` for a surface of `size` physical pixels at `scale`
    /// physical pixels per logical pixel and upload their glyphs.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        labels: &[Label],
        size: [u32; 2],
        scale: f32,
    ) -> Result<()> {
        self.viewport.update(
            queue,
            Resolution {
                width: size[0],
                height: size[1],
            },
        );

        self.buffers.clear();
        for label in labels {
            let mut buffer = Buffer::new(
                &mut self.font_system,
                Metrics::new(FONT_SIZE * scale, LINE_HEIGHT * scale),
            );
            buffer.set_size(
                &mut self.font_system,
                Some(label.rect.w * scale),
                Some(label.rect.h * scale),
            );
            buffer.set_text(
                &mut self.font_system,
                label.text,
                &Attrs::new().family(Family::SansSerif),
                Shaping::Advanced,
            );
            buffer.shape_until_scroll(&mut self.font_system, false);
            self.buffers.push(buffer);
        }

        let areas = labels.iter().zip(&self.buffers).map(|(label, buffer)| {
            let r = label.rect;
            let (x, y, w, h) = (r.x * scale, r.y * scale, r.w * scale, r.h * scale);
            let [red, green, blue, alpha] = label.color;
            TextArea {
                buffer,
                left: x + (w - line_width(buffer)) / 2.0,
                top: y + (h - LINE_HEIGHT * scale) / 2.0,
                scale: 1.0,
                bounds: TextBounds {
                    left: x as i32,
                    top: y as i32,
                    right: (x + w) as i32,
                    bottom: (y + h) as i32,
                },
                default_color: Color::rgba(red, green, blue, alpha),
                custom_glyphs: &[],
            }
        });
        self.renderer
            .prepare(
                device,
                queue,
                &mut self.font_system,
                &mut self.atlas,
                &self.viewport,
                areas,
                &mut self.swash_cache,
            )
            .map_err(|e| anyhow!("preparing button labels: {e:?}"))
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) -> Result<()> {
        self.renderer
            .render(&self.atlas, &self.viewport, render_pass)
            .map_err(|e| anyhow!("drawing button labels: {e:?}"))
    }

    /// Drop glyphs that were not used since the last trim.
    pub fn trim(&mut self) {
        self.atlas.trim();
    }
}

fn line_width(buffer: &Buffer) -> f32 {
    buffer
        .layout_runs()
        .map(|run| run.line_w)
        .fold(0.0, f32::max)
}
