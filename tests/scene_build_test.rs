use std::collections::BTreeSet;

use cgmath::{Deg, Point3, Rad};
use tyre_studio::{
    build_scene,
    data_structures::{
        light::{LightKind, ShadowCamera},
        material::Shading,
        scene_graph::{Node, Scene},
        texture::Wrap,
    },
    render::collect_batches,
    resources::tread::{TREAD_SIZE, make_tread_texture},
};

fn tyre_group(scene: &Scene) -> &tyre_studio::data_structures::scene_graph::Group {
    match scene.find("tyre") {
        Some(Node::Group(group)) => group,
        other => panic!("expected the tyre group, found {other:?}"),
    }
}

#[test]
fn scene_has_floor_backdrop_three_lights_and_one_group() {
    let scene = build_scene();
    let children = scene.children();
    assert_eq!(children.len(), 6);

    let meshes = children.iter().filter(|n| matches!(n, Node::Mesh(_))).count();
    let lights = children.iter().filter(|n| matches!(n, Node::Light(_))).count();
    let groups = children.iter().filter(|n| matches!(n, Node::Group(_))).count();
    assert_eq!((meshes, lights, groups), (2, 3, 1));
    assert!(matches!(scene.find("floor"), Some(Node::Mesh(_))));
    assert!(matches!(scene.find("backdrop"), Some(Node::Mesh(_))));
    assert_eq!(tyre_group(&scene).meshes().count(), 11);
    scene.validate().unwrap();
}

#[test]
fn tyre_group_construction_order() {
    let scene = build_scene();
    let names: Vec<&str> = tyre_group(&scene).meshes().map(|m| m.name.as_str()).collect();
    assert_eq!(names.first(), Some(&"tyre"));
    assert_eq!(names[1], "hub");
    assert!(names[2..10].iter().all(|name| name.starts_with("spoke")));
    assert_eq!(names.last(), Some(&"cap"));
}

#[test]
fn group_meshes_share_two_materials_and_spokes_share_geometry() {
    let scene = build_scene();
    let group = tyre_group(&scene);
    let materials: BTreeSet<_> = group.meshes().map(|m| m.material).collect();
    assert_eq!(materials.len(), 2);

    let spoke_geometries: BTreeSet<_> = group
        .meshes()
        .filter(|m| m.name.starts_with("spoke"))
        .map(|m| m.geometry)
        .collect();
    assert_eq!(spoke_geometries.len(), 1);
}

#[test]
fn only_the_tyre_material_is_textured() {
    let scene = build_scene();
    let textured: Vec<_> = scene
        .materials()
        .iter()
        .filter(|m| m.bump_map.is_some())
        .collect();
    assert_eq!(textured.len(), 1);
    assert_eq!(textured[0].name, "tyre");
    assert_eq!(textured[0].bump_scale, 0.06);
    assert_eq!(scene.textures().len(), 1);
    assert!(matches!(
        textured[0].shading,
        Shading::Physical { clearcoat, .. } if clearcoat == 0.6
    ));
}

#[test]
fn floor_only_catches_shadows() {
    let scene = build_scene();
    let Some(Node::Mesh(floor)) = scene.find("floor") else {
        panic!("floor missing");
    };
    assert!(floor.receive_shadow);
    assert!(!floor.cast_shadow);
    let material = scene.material(floor.material).unwrap();
    assert!(matches!(material.shading, Shading::ShadowCatcher { opacity } if opacity == 0.35));
    assert!(material.is_transparent());
}

#[test]
fn lights_match_the_studio_rig() {
    let scene = build_scene();
    let lights: Vec<_> = scene.lights().collect();
    assert_eq!(lights.len(), 3);

    let key = lights[0];
    assert_eq!(key.name, "key");
    assert_eq!(key.intensity, 3.2);
    let shadow = key.shadow.unwrap();
    assert_eq!(shadow.map_size, 4096);
    assert!(matches!(shadow.camera, ShadowCamera::Orthographic { far, .. } if far == 40.0));

    assert_eq!(lights[1].name, "rim");
    assert!(lights[1].shadow.is_none());

    let fill = lights[2];
    assert_eq!(fill.position, Point3::new(0.0, 8.0, 10.0));
    assert_eq!(fill.target, Point3::new(0.0, 1.2, 0.0));
    let LightKind::Spot { angle, distance, .. } = fill.kind else {
        panic!("fill should be a spot light");
    };
    assert!((angle - Rad::from(Deg(35.0f32)).0).abs() < 1e-6);
    assert_eq!(distance, 30.0);
    assert_eq!(fill.shadow.unwrap().map_size, 2048);
}

#[test]
fn spokes_draw_as_one_instanced_batch() {
    let scene = build_scene();
    let batches = collect_batches(&scene);
    // floor, backdrop, tyre, hub, spokes, cap
    assert_eq!(batches.len(), 6);
    assert_eq!(batches[4].instances.len(), 8);
    assert_eq!(batches.iter().map(|b| b.instances.len()).sum::<usize>(), 13);
}

#[test]
fn tread_texture_is_deterministic() {
    let first = make_tread_texture();
    let second = make_tread_texture();
    assert_eq!(first.image(), second.image());
    assert_eq!(first.dimensions(), (TREAD_SIZE, TREAD_SIZE));
    assert_eq!(first.wrap, (Wrap::Repeat, Wrap::Repeat));
    assert_eq!(first.repeat, [8.0, 2.0]);
    assert_eq!(first.anisotropy, 16);
}
