//! Perspective camera and its uniform.

use cgmath::{Deg, EuclideanSpace, Matrix4, Point3, Rad, Vector3};

/// Maps OpenGL clip depth [-1, 1] onto wgpu's [0, 1]. Arguments are
/// column-major, so the 0.5 offset sits in the last column.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// A fixed perspective camera looking at a target point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fovy: Rad<f32>,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn new<F: Into<Rad<f32>>>(fovy: F, aspect: f32, znear: f32, zfar: f32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 1.0),
            target: Point3::origin(),
            up: Vector3::unit_y(),
            fovy: fovy.into(),
            aspect,
            znear,
            zfar,
        }
    }

    /// The studio camera: 38 degree vertical fov, near 0.1, far 100.
    pub fn studio(aspect: f32) -> Self {
        let mut camera = Self::new(Deg(38.0), aspect, 0.1, 100.0);
        camera.position = Point3::new(6.0, 3.2, 8.5);
        camera.look_at(Point3::new(0.0, 1.4, 0.0));
        camera
    }

    pub fn look_at(&mut self, target: Point3<f32>) {
        self.target = target;
    }

    /// Set the aspect to exactly `width / height`. Zero heights are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }

    pub fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_proj: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    // w is unused, vec3 needs 16 byte alignment
    position: [f32; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_proj: Matrix4::identity().into(),
            view: Matrix4::identity().into(),
            position: [0.0; 4],
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera) {
        self.view_proj = camera.build_view_projection_matrix().into();
        self.view = camera.view_matrix().into();
        self.position = camera.position.to_homogeneous().into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector4;

    #[test]
    fn target_projects_to_screen_centre() {
        let camera = Camera::studio(16.0 / 9.0);
        let clip = camera.build_view_projection_matrix() * Vector4::new(0.0, 1.4, 0.0, 1.0);
        assert!((clip.x / clip.w).abs() < 1e-5);
        assert!((clip.y / clip.w).abs() < 1e-5);
    }

    fn ndc(camera: &Camera, x: f32, y: f32, z: f32) -> Vector3<f32> {
        let clip = camera.build_view_projection_matrix() * Vector4::new(x, y, z, 1.0);
        clip.truncate() / clip.w
    }

    fn looking_down_negative_z(aspect: f32) -> Camera {
        let mut camera = Camera::new(Deg(38.0), aspect, 0.1, 100.0);
        camera.position = Point3::origin();
        camera.look_at(Point3::new(0.0, 0.0, -1.0));
        camera
    }

    #[test]
    fn fov_edges_project_to_ndc_bounds() {
        let camera = looking_down_negative_z(1.5);
        let half = Rad::from(Deg(19.0f32)).0.tan() * 10.0;

        let top = ndc(&camera, 0.0, half, -10.0);
        assert!((top.y - 1.0).abs() < 1e-4, "{top:?}");
        let bottom = ndc(&camera, 0.0, -half, -10.0);
        assert!((bottom.y + 1.0).abs() < 1e-4, "{bottom:?}");
        let right = ndc(&camera, half * 1.5, 0.0, -10.0);
        assert!((right.x - 1.0).abs() < 1e-4, "{right:?}");
    }

    #[test]
    fn depth_range_is_zero_to_one() {
        let camera = looking_down_negative_z(1.0);
        assert!(ndc(&camera, 0.0, 0.0, -0.1).z.abs() < 1e-4);
        assert!((ndc(&camera, 0.0, 0.0, -100.0).z - 1.0).abs() < 1e-4);
        let mid = ndc(&camera, 0.0, 0.0, -10.0).z;
        assert!(mid > 0.0 && mid < 1.0);
    }

    #[test]
    fn resize_ignores_zero_height() {
        let mut camera = Camera::studio(1.5);
        camera.resize(800, 0);
        assert_eq!(camera.aspect, 1.5);
        camera.resize(800, 600);
        assert_eq!(camera.aspect, 800.0 / 600.0);
    }
}
