//! Procedural primitive geometry.
//!
//! Generates indexed triangle lists for the four primitives the studio needs:
//! plane, box, cylinder and torus. Vertex order, UV layout and winding follow
//! the widespread parameterisation used by web 3D toolkits, so that a plane
//! faces +Z, a cylinder stands along +Y and a torus lies in the XY plane, all
//! with counter-clockwise front faces.

use std::f32::consts::TAU;

use cgmath::InnerSpace;

use crate::data_structures::model::ModelVertex;

/// Handle into a scene's geometry table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(pub(crate) usize);

impl GeometryId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Shape parameters a geometry was generated from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Primitive {
    Plane {
        width: f32,
        height: f32,
    },
    Box {
        width: f32,
        height: f32,
        depth: f32,
    },
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        radial_segments: u32,
    },
    Torus {
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
    },
}

/// Indexed triangle data plus its disposal state.
#[derive(Clone, Debug)]
pub struct Geometry {
    pub primitive: Primitive,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    disposed: bool,
}

impl Geometry {
    pub fn new(primitive: Primitive) -> Self {
        let (vertices, indices) = match primitive {
            Primitive::Plane { width, height } => plane(width, height),
            Primitive::Box {
                width,
                height,
                depth,
            } => cuboid(width, height, depth),
            Primitive::Cylinder {
                radius_top,
                radius_bottom,
                height,
                radial_segments,
            } => cylinder(radius_top, radius_bottom, height, radial_segments),
            Primitive::Torus {
                radius,
                tube,
                radial_segments,
                tubular_segments,
            } => torus(radius, tube, radial_segments, tubular_segments),
        };
        Self {
            primitive,
            vertices,
            indices,
            disposed: false,
        }
    }

    pub fn plane(width: f32, height: f32) -> Self {
        Self::new(Primitive::Plane { width, height })
    }

    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        Self::new(Primitive::Box {
            width,
            height,
            depth,
        })
    }

    pub fn cylinder(radius: f32, height: f32, radial_segments: u32) -> Self {
        Self::new(Primitive::Cylinder {
            radius_top: radius,
            radius_bottom: radius,
            height,
            radial_segments,
        })
    }

    pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Self {
        Self::new(Primitive::Torus {
            radius,
            tube,
            radial_segments,
            tubular_segments,
        })
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Release the vertex data. The geometry keeps its shape description.
    pub fn dispose(&mut self) {
        self.vertices = Vec::new();
        self.indices = Vec::new();
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

fn vertex(position: [f32; 3], normal: [f32; 3], tex_coords: [f32; 2]) -> ModelVertex {
    ModelVertex {
        position,
        normal,
        tex_coords,
    }
}

/// Single-quad plane in the XY plane, facing +Z.
fn plane(width: f32, height: f32) -> (Vec<ModelVertex>, Vec<u32>) {
    let mut vertices = Vec::with_capacity(4);
    let mut indices = Vec::with_capacity(6);
    push_grid(
        &mut vertices,
        &mut indices,
        [0, 1, 2],
        [1.0, -1.0],
        [width, height, 0.0],
        1.0,
    );
    (vertices, indices)
}

/// Axis-aligned box centred on the origin, one quad per face.
fn cuboid(width: f32, height: f32, depth: f32) -> (Vec<ModelVertex>, Vec<u32>) {
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    // (u axis, v axis, w axis), (u dir, v dir), (u extent, v extent, w extent)
    let faces: [([usize; 3], [f32; 2], [f32; 3]); 6] = [
        ([2, 1, 0], [-1.0, -1.0], [depth, height, width]),
        ([2, 1, 0], [1.0, -1.0], [depth, height, -width]),
        ([0, 2, 1], [1.0, 1.0], [width, depth, height]),
        ([0, 2, 1], [1.0, -1.0], [width, depth, -height]),
        ([0, 1, 2], [1.0, -1.0], [width, height, depth]),
        ([0, 1, 2], [-1.0, -1.0], [width, height, -depth]),
    ];
    for (axes, dirs, extents) in faces {
        let facing = if extents[2] > 0.0 { 1.0 } else { -1.0 };
        push_grid(&mut vertices, &mut indices, axes, dirs, extents, facing);
    }
    (vertices, indices)
}

/// Emit one single-segment face. `extents[2]` is the signed offset of the face
/// along its normal axis, `facing` the sign of the normal.
fn push_grid(
    vertices: &mut Vec<ModelVertex>,
    indices: &mut Vec<u32>,
    axes: [usize; 3],
    dirs: [f32; 2],
    extents: [f32; 3],
    facing: f32,
) {
    let [u, v, w] = axes;
    let [width, height, depth] = extents;
    let base = vertices.len() as u32;
    for iy in 0..2 {
        let y = iy as f32 * height - height / 2.0;
        for ix in 0..2 {
            let x = ix as f32 * width - width / 2.0;
            let mut position = [0.0; 3];
            position[u] = x * dirs[0];
            position[v] = y * dirs[1];
            position[w] = depth / 2.0;
            let mut normal = [0.0; 3];
            normal[w] = facing;
            vertices.push(vertex(position, normal, [ix as f32, 1.0 - iy as f32]));
        }
    }
    let (a, b, c, d) = (base, base + 2, base + 3, base + 1);
    indices.extend_from_slice(&[a, b, d, b, c, d]);
}

/// Capped cylinder along Y, centred on the origin.
fn cylinder(
    radius_top: f32,
    radius_bottom: f32,
    height: f32,
    radial_segments: u32,
) -> (Vec<ModelVertex>, Vec<u32>) {
    let segments = radial_segments.max(3);
    let half_height = height / 2.0;
    let slope = (radius_bottom - radius_top) / height;
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    // Torso: two rings, top (v = 0) then bottom (v = 1).
    for y in 0..2u32 {
        let v = y as f32;
        let radius = v * (radius_bottom - radius_top) + radius_top;
        for x in 0..=segments {
            let u = x as f32 / segments as f32;
            let (sin, cos) = (u * TAU).sin_cos();
            let normal = cgmath::Vector3::new(sin, slope, cos).normalize();
            vertices.push(vertex(
                [radius * sin, -v * height + half_height, radius * cos],
                normal.into(),
                [u, 1.0 - v],
            ));
        }
    }
    let ring = segments + 1;
    for x in 0..segments {
        let a = x;
        let b = ring + x;
        let c = ring + x + 1;
        let d = x + 1;
        indices.extend_from_slice(&[a, b, d, b, c, d]);
    }

    push_cap(&mut vertices, &mut indices, segments, radius_top, half_height, true);
    push_cap(&mut vertices, &mut indices, segments, radius_bottom, half_height, false);
    (vertices, indices)
}

fn push_cap(
    vertices: &mut Vec<ModelVertex>,
    indices: &mut Vec<u32>,
    segments: u32,
    radius: f32,
    half_height: f32,
    top: bool,
) {
    let sign = if top { 1.0 } else { -1.0 };
    let center_start = vertices.len() as u32;
    for _ in 0..segments {
        vertices.push(vertex(
            [0.0, half_height * sign, 0.0],
            [0.0, sign, 0.0],
            [0.5, 0.5],
        ));
    }
    let rim_start = vertices.len() as u32;
    for x in 0..=segments {
        let u = x as f32 / segments as f32;
        let (sin, cos) = (u * TAU).sin_cos();
        vertices.push(vertex(
            [radius * sin, half_height * sign, radius * cos],
            [0.0, sign, 0.0],
            [cos * 0.5 + 0.5, sin * 0.5 * sign + 0.5],
        ));
    }
    for x in 0..segments {
        let c = center_start + x;
        let i = rim_start + x;
        if top {
            indices.extend_from_slice(&[i, i + 1, c]);
        } else {
            indices.extend_from_slice(&[i + 1, i, c]);
        }
    }
}

/// Torus in the XY plane around the Z axis.
fn torus(
    radius: f32,
    tube: f32,
    radial_segments: u32,
    tubular_segments: u32,
) -> (Vec<ModelVertex>, Vec<u32>) {
    let radial = radial_segments.max(3);
    let tubular = tubular_segments.max(3);
    let mut vertices = Vec::with_capacity(((radial + 1) * (tubular + 1)) as usize);
    let mut indices = Vec::with_capacity((radial * tubular * 6) as usize);

    for j in 0..=radial {
        for i in 0..=tubular {
            let u = i as f32 / tubular as f32 * TAU;
            let v = j as f32 / radial as f32 * TAU;
            let position = cgmath::Vector3::new(
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            );
            let center = cgmath::Vector3::new(radius * u.cos(), radius * u.sin(), 0.0);
            let normal = (position - center).normalize();
            vertices.push(vertex(
                position.into(),
                normal.into(),
                [i as f32 / tubular as f32, j as f32 / radial as f32],
            ));
        }
    }

    let row = tubular + 1;
    for j in 1..=radial {
        for i in 1..=tubular {
            let a = row * j + i - 1;
            let b = row * (j - 1) + i - 1;
            let c = row * (j - 1) + i;
            let d = row * j + i;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    (vertices, indices)
}
