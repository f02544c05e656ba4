//! Meshes and their vertex format.
//!
//! A [`Mesh`] is a scene node that pairs a geometry with a material and a local
//! transform. Geometries and materials live in the owning [`Scene`]'s tables and
//! are referenced by handle, so several meshes can share them (the spokes share
//! one box geometry; hub, spokes and cap share the rim material).
//!
//! [`Scene`]: crate::data_structures::scene_graph::Scene

use crate::data_structures::{geometry::GeometryId, instance::Transform, material::MaterialId};

/// GPU vertex buffer layout description.
pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// A drawable scene node.
#[derive(Clone, Debug)]
pub struct Mesh {
    pub name: String,
    pub geometry: GeometryId,
    pub material: MaterialId,
    pub transform: Transform,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Mesh {
    pub fn new(name: &str, geometry: GeometryId, material: MaterialId) -> Self {
        Self {
            name: name.to_string(),
            geometry,
            material,
            transform: Transform::default(),
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_shadows(mut self, cast: bool, receive: bool) -> Self {
        self.cast_shadow = cast;
        self.receive_shadow = receive;
        self
    }
}
