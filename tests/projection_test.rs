use cgmath::{Deg, Point3, Rad, Vector3, Vector4};
use tyre_studio::{build_scene, camera::Camera};

fn to_ndc(view_proj: cgmath::Matrix4<f32>, point: Point3<f32>) -> Vector3<f32> {
    let clip = view_proj * Vector4::new(point.x, point.y, point.z, 1.0);
    clip.truncate() / clip.w
}

/// Points on and around the tyre assembly.
fn subject_points() -> [Point3<f32>; 5] {
    [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.0, 1.6, 0.0),
        Point3::new(0.0, 3.7, 0.0),
        Point3::new(2.0, 1.6, 1.0),
        Point3::new(-2.0, 0.5, -1.0),
    ]
}

#[test]
fn studio_camera_matches_pinhole_projection() {
    let aspect = 16.0 / 9.0;
    let camera = Camera::studio(aspect);
    let view_proj = camera.build_view_projection_matrix();
    let tan_half = Rad::from(Deg(19.0f32)).0.tan();

    for point in subject_points() {
        let eye = camera.view_matrix() * Vector4::new(point.x, point.y, point.z, 1.0);
        let depth = -eye.z;
        let ndc = to_ndc(view_proj, point);
        let expected_x = eye.x / (depth * tan_half * aspect);
        let expected_y = eye.y / (depth * tan_half);
        assert!((ndc.x - expected_x).abs() < 1e-4, "{point:?}: {ndc:?}");
        assert!((ndc.y - expected_y).abs() < 1e-4, "{point:?}: {ndc:?}");
        assert!(ndc.z > 0.0 && ndc.z < 1.0, "{point:?}: {ndc:?}");
    }
}

#[test]
fn tyre_fills_the_frame_vertically() {
    let camera = Camera::studio(1.0);
    let top = to_ndc(camera.build_view_projection_matrix(), Point3::new(0.0, 4.25, 0.0));
    assert!(top.y > 0.7 && top.y < 1.0, "{top:?}");
}

#[test]
fn shadow_cameras_cover_the_tyre() {
    let scene = build_scene();
    let casters: Vec<_> = scene.lights().filter(|light| light.casts_shadow()).collect();
    assert_eq!(casters.len(), 2);

    for light in casters {
        let view_proj = light.shadow_view_proj().unwrap();
        for point in subject_points() {
            let ndc = to_ndc(view_proj, point);
            assert!(
                ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0,
                "{} misses {point:?}: {ndc:?}",
                light.name
            );
            assert!(
                ndc.z > 0.0 && ndc.z < 1.0,
                "{} clips {point:?} in depth: {ndc:?}",
                light.name
            );
        }
    }
}

#[test]
fn shadow_depth_grows_away_from_the_light() {
    let scene = build_scene();
    let key = scene.lights().find(|light| light.name == "key").unwrap();
    let view_proj = key.shadow_view_proj().unwrap();
    let near = to_ndc(view_proj, Point3::new(0.0, 3.7, 0.0));
    let far = to_ndc(view_proj, Point3::new(0.0, 0.0, 0.0));
    assert!(near.z < far.z, "{near:?} vs {far:?}");
}
