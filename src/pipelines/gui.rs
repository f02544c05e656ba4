use wgpu::util::DeviceExt;

use crate::{
    controls::Quad,
    pipelines::basic::{RasterState, mk_render_pipeline},
};

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Convert logical-pixel quads into clip-space triangles for a surface of
/// `size` physical pixels at `scale` physical pixels per logical pixel.
pub fn tessellate(quads: &[Quad], size: [u32; 2], scale: f32) -> (Vec<Vertex>, Vec<u16>) {
    let mut vertices = Vec::with_capacity(quads.len() * 4);
    let mut indices = Vec::with_capacity(quads.len() * 6);
    let (w, h) = (size[0].max(1) as f32, size[1].max(1) as f32);
    let to_clip = |x: f32, y: f32| [x * scale / w * 2.0 - 1.0, 1.0 - y * scale / h * 2.0];
    for quad in quads {
        let r = quad.rect;
        let base = vertices.len() as u16;
        for (x, y) in [
            (r.x, r.y),
            (r.x, r.y + r.h),
            (r.x + r.w, r.y + r.h),
            (r.x + r.w, r.y),
        ] {
            vertices.push(Vertex {
                position: to_clip(x, y),
                color: quad.color,
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    (vertices, indices)
}

/// Vertex and index buffers for one overlay frame.
pub struct GuiMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
}

impl GuiMesh {
    pub fn new(device: &wgpu::Device, quads: &[Quad], size: [u32; 2], scale: f32) -> Self {
        let (vertices, indices) = tessellate(quads, size, scale);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Overlay Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Overlay Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            num_indices: indices.len() as u32,
        }
    }

    pub fn draw<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>) {
        if self.num_indices == 0 {
            return;
        }
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        render_pass.draw_indexed(0..self.num_indices, 0, 0..1);
    }
}

pub fn mk_gui_pipeline(device: &wgpu::Device, format: wgpu::TextureFormat) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Overlay Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("gui.wgsl").into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Overlay Render Pipeline Layout"),
        bind_group_layouts: &[],
        push_constant_ranges: &[],
    });
    mk_render_pipeline(
        device,
        "Overlay Render Pipeline",
        &layout,
        &shader,
        Some((
            "fs_main",
            format,
            Some(wgpu::BlendState::ALPHA_BLENDING),
        )),
        None,
        &[Vertex::desc()],
        RasterState {
            cull_mode: None,
            ..Default::default()
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::Rect;

    #[test]
    fn full_window_quad_spans_clip_space() {
        let quad = Quad {
            rect: Rect {
                x: 0.0,
                y: 0.0,
                w: 400.0,
                h: 300.0,
            },
            color: [1.0; 4],
        };
        let (vertices, indices) = tessellate(&[quad], [800, 600], 2.0);
        assert_eq!(indices.len(), 6);
        assert_eq!(vertices[0].position, [-1.0, 1.0]);
        assert_eq!(vertices[2].position, [1.0, -1.0]);
    }
}
