//! Object transforms and their per-instance GPU representation.
//!
//! Every mesh in the studio is drawn through an instance buffer, even when it
//! occurs only once. Meshes that share geometry and material (the spokes) are
//! batched into a single instanced draw.

use std::ops::Mul;

use cgmath::{Matrix, One, SquareMatrix};

use crate::data_structures::model;

/// Local transform of a scene node: translation, rotation and scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: cgmath::Vector3<f32>,
    pub rotation: cgmath::Quaternion<f32>,
    pub scale: cgmath::Vector3<f32>,
}

impl Transform {
    /// Identity transform (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: cgmath::Vector3::new(0.0, 0.0, 0.0),
            rotation: cgmath::Quaternion::one(),
            scale: cgmath::Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn at(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: cgmath::Vector3::new(x, y, z),
            ..Self::new()
        }
    }

    /// Set the rotation from Euler angles (radians) applied in X, Y, Z order.
    pub fn with_euler(mut self, x: f32, y: f32, z: f32) -> Self {
        self.rotation = euler_xyz(x, y, z);
        self
    }

    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from(self.rotation)
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Mul<Transform> for Transform {
    type Output = Self;

    /// Parent-times-child composition.
    fn mul(self, rhs: Transform) -> Self::Output {
        &self * &rhs
    }
}

impl<'a, 'b> Mul<&'b Transform> for &'a Transform {
    type Output = Transform;

    fn mul(self, rhs: &'b Transform) -> Self::Output {
        let scaled_rhs_pos = cgmath::Vector3::new(
            self.scale.x * rhs.position.x,
            self.scale.y * rhs.position.y,
            self.scale.z * rhs.position.z,
        );
        Transform {
            position: self.position + (self.rotation * scaled_rhs_pos),
            rotation: self.rotation * rhs.rotation,
            scale: cgmath::Vector3::new(
                self.scale.x * rhs.scale.x,
                self.scale.y * rhs.scale.y,
                self.scale.z * rhs.scale.z,
            ),
        }
    }
}

/// Quaternion for intrinsic X, then Y, then Z rotations.
pub fn euler_xyz(x: f32, y: f32, z: f32) -> cgmath::Quaternion<f32> {
    use cgmath::Rotation3;
    cgmath::Quaternion::from_angle_x(cgmath::Rad(x))
        * cgmath::Quaternion::from_angle_y(cgmath::Rad(y))
        * cgmath::Quaternion::from_angle_z(cgmath::Rad(z))
}

/**
 * The raw instance is the actual data stored on the GPU
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    model: [[f32; 4]; 4],
    normal: [[f32; 3]; 3],
    receive_shadow: f32,
}

impl InstanceRaw {
    pub fn new(world: cgmath::Matrix4<f32>, receive_shadow: bool) -> Self {
        // Inverse-transpose keeps normals perpendicular under non-uniform scale.
        let linear = cgmath::Matrix3::from_cols(
            world.x.truncate(),
            world.y.truncate(),
            world.z.truncate(),
        );
        let normal = linear
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or(linear);
        Self {
            model: world.into(),
            normal: normal.into(),
            receive_shadow: if receive_shadow { 1.0 } else { 0.0 },
        }
    }
}

/**
 * Stride layout here: world matrix as four vec4 columns, the normal matrix as
 * three vec3 columns, then the receive-shadow flag.
 */
impl model::Vertex for InstanceRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 16]>() as wgpu::BufferAddress,
                    shader_location: 9,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 19]>() as wgpu::BufferAddress,
                    shader_location: 10,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 22]>() as wgpu::BufferAddress,
                    shader_location: 11,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 25]>() as wgpu::BufferAddress,
                    shader_location: 12,
                    format: wgpu::VertexFormat::Float32,
                },
            ],
        }
    }
}
