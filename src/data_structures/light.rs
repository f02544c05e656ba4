//! Scene lights and their shadow cameras.

use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3, Rad, Vector3};

use crate::{camera::OPENGL_TO_WGPU_MATRIX, data_structures::color::Color};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LightKind {
    /// Parallel rays travelling from `position` towards `target`.
    Directional,
    /// Cone of light. `angle` is the half-angle in radians; `penumbra` the
    /// fraction of the cone that fades out.
    Spot {
        distance: f32,
        angle: f32,
        penumbra: f32,
        decay: f32,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShadowCamera {
    Orthographic {
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
        near: f32,
        far: f32,
    },
    Perspective {
        fovy: Rad<f32>,
        near: f32,
        far: f32,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowConfig {
    pub map_size: u32,
    pub bias: f32,
    pub camera: ShadowCamera,
}

#[derive(Clone, Debug)]
pub struct Light {
    pub name: String,
    pub kind: LightKind,
    pub color: Color,
    pub intensity: f32,
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub shadow: Option<ShadowConfig>,
}

impl Light {
    pub fn directional(name: &str, color: Color, intensity: f32, position: Point3<f32>) -> Self {
        Self {
            name: name.to_string(),
            kind: LightKind::Directional,
            color,
            intensity,
            position,
            target: Point3::origin(),
            shadow: None,
        }
    }

    pub fn spot(
        name: &str,
        color: Color,
        intensity: f32,
        distance: f32,
        angle: Rad<f32>,
        penumbra: f32,
        decay: f32,
    ) -> Self {
        Self {
            name: name.to_string(),
            kind: LightKind::Spot {
                distance,
                angle: angle.0,
                penumbra,
                decay,
            },
            color,
            intensity,
            position: Point3::origin(),
            target: Point3::origin(),
            shadow: None,
        }
    }

    pub fn at(mut self, position: Point3<f32>) -> Self {
        self.position = position;
        self
    }

    pub fn with_target(mut self, target: Point3<f32>) -> Self {
        self.target = target;
        self
    }

    pub fn with_shadow(mut self, shadow: ShadowConfig) -> Self {
        self.shadow = Some(shadow);
        self
    }

    pub fn casts_shadow(&self) -> bool {
        self.shadow.is_some()
    }

    /// Unit vector from the light towards its target.
    pub fn direction(&self) -> Vector3<f32> {
        let d = self.target - self.position;
        if d.magnitude2() > 0.0 {
            d.normalize()
        } else {
            -Vector3::unit_y()
        }
    }

    /// Clip-space transform of the shadow camera, if this light casts shadows.
    pub fn shadow_view_proj(&self) -> Option<Matrix4<f32>> {
        let shadow = self.shadow.as_ref()?;
        let up = if self.direction().cross(Vector3::unit_y()).magnitude2() < 1e-6 {
            Vector3::unit_z()
        } else {
            Vector3::unit_y()
        };
        let view = Matrix4::look_at_rh(self.position, self.target, up);
        let proj = match shadow.camera {
            ShadowCamera::Orthographic {
                left,
                right,
                top,
                bottom,
                near,
                far,
            } => cgmath::ortho(left, right, bottom, top, near, far),
            ShadowCamera::Perspective { fovy, near, far } => {
                cgmath::perspective(fovy, 1.0, near, far)
            }
        };
        Some(OPENGL_TO_WGPU_MATRIX * proj * view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, Vector4};

    #[test]
    fn shadow_camera_sees_its_target() {
        let light = Light::directional("key", Color::WHITE, 1.0, Point3::new(6.0, 9.0, 6.0))
            .with_shadow(ShadowConfig {
                map_size: 1024,
                bias: 0.0,
                camera: ShadowCamera::Orthographic {
                    left: -10.0,
                    right: 10.0,
                    top: 10.0,
                    bottom: -10.0,
                    near: 1.0,
                    far: 40.0,
                },
            });
        let clip = light.shadow_view_proj().unwrap() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn spot_shadow_camera_keeps_target_in_depth_range() {
        let light = Light::spot("fill", Color::WHITE, 1.0, 30.0, Deg(35.0).into(), 0.2, 1.0)
            .at(Point3::new(0.0, 8.0, 10.0))
            .with_target(Point3::new(0.0, 1.2, 0.0))
            .with_shadow(ShadowConfig {
                map_size: 512,
                bias: 0.0,
                camera: ShadowCamera::Perspective {
                    fovy: Deg(70.0).into(),
                    near: 0.5,
                    far: 30.0,
                },
            });
        let view_proj = light.shadow_view_proj().unwrap();
        let clip = view_proj * Vector4::new(0.0, 1.2, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0, "{ndc:?}");

        // Points at the near and far planes land on the depth bounds.
        let dir = light.direction();
        let near = light.position + dir * 0.5;
        let far = light.position + dir * 30.0;
        let z = |p: Point3<f32>| {
            let clip = view_proj * p.to_homogeneous();
            clip.z / clip.w
        };
        assert!(z(near).abs() < 1e-3);
        assert!((z(far) - 1.0).abs() < 1e-3);
    }

    #[test]
    fn lights_without_shadow_have_no_camera() {
        let light = Light::spot("fill", Color::WHITE, 1.0, 30.0, Deg(35.0).into(), 0.2, 1.0);
        assert!(light.shadow_view_proj().is_none());
    }
}
