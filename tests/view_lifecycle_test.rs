mod common;

use common::test_utils::{FakeRenderer, fake, viewport};
use tyre_studio::{FrameRenderer, StudioConfig, StudioView};

fn mounted() -> StudioView<FakeRenderer> {
    let mut view = StudioView::new(&StudioConfig::default());
    view.mount(viewport(800, 600), fake).unwrap();
    view
}

fn renders(view: &StudioView<FakeRenderer>) -> u32 {
    view.renderer().map_or(0, |renderer| renderer.renders)
}

#[test]
fn controls_disabled_until_mounted() {
    let mut view: StudioView<FakeRenderer> = StudioView::new(&StudioConfig::default());
    assert!(!view.is_ready());
    assert!(!view.controls().is_enabled());
    assert_eq!(view.controls().hit(20.0, 20.0), None);
    assert_eq!(view.controls().accelerator("r"), None);

    view.mount(viewport(800, 600), fake).unwrap();
    assert!(view.is_ready());
    assert!(view.controls().is_enabled());
    assert!(view.controls().hit(20.0, 20.0).is_some());
}

#[test]
fn mount_renders_first_frame_synchronously() {
    let view = mounted();
    assert_eq!(renders(&view), 1);
    assert!(view.burst().is_running());
}

#[test]
fn burst_renders_exactly_four_frames() {
    let mut view = StudioView::new(&StudioConfig::default());
    let mut more = view.mount(viewport(640, 480), fake).unwrap();
    let mut callbacks = 0;
    while more {
        more = view.on_animation_frame().unwrap();
        callbacks += 1;
        assert!(callbacks < 10, "burst never stopped");
    }
    assert_eq!(renders(&view), 4);

    // Later redraws present the retained frame without rendering.
    assert!(!view.on_animation_frame().unwrap());
    assert_eq!(renders(&view), 4);
}

#[test]
fn unmount_cancels_burst() {
    let mut view = mounted();
    view.on_animation_frame().unwrap();
    let released = view.unmount().unwrap();
    assert!(!view.burst().is_running());
    assert!(!view.on_animation_frame().unwrap());
    assert_eq!(released.renderer.renders, 2);
}

#[test]
fn unmount_releases_everything() {
    let mut view = mounted();
    let released = view.unmount().unwrap();

    assert!(released.renderer.disposed);
    assert!(released.scene.is_disposed());
    for (mesh, _) in released.scene.get_world_meshes() {
        let geometry = released.scene.geometry(mesh.geometry).unwrap();
        assert!(geometry.is_disposed(), "{} geometry", mesh.name);
        let material = released.scene.material(mesh.material).unwrap();
        assert!(material.is_disposed(), "{} material", mesh.name);
        for texture in material.textures() {
            assert!(released.scene.texture(texture).unwrap().is_disposed());
        }
    }
    assert!(!view.is_ready());
    assert!(!view.controls().is_enabled());
    assert!(view.unmount().is_none());
}

#[test]
fn actions_before_mount_do_nothing() {
    let mut view: StudioView<FakeRenderer> = StudioView::new(&StudioConfig::default());
    assert!(view.export_png().is_none());
    assert!(!view.rerender().unwrap());
    assert!(!view.resize(viewport(100, 100)).unwrap());
    assert!(!view.on_animation_frame().unwrap());
}

#[test]
fn empty_viewport_fails_mount() {
    let mut view = StudioView::new(&StudioConfig::default());
    let mut called = false;
    let result = view.mount(viewport(0, 600), |vp| {
        called = true;
        fake(vp)
    });
    assert!(result.is_err());
    assert!(!called);
    assert!(!view.is_ready());
    assert!(!view.controls().is_enabled());
}

#[test]
fn rerender_renders_once() {
    let mut view = mounted();
    assert!(view.rerender().unwrap());
    assert_eq!(renders(&view), 2);
}

#[test]
fn resize_sets_exact_aspect_and_size() {
    let mut view = mounted();
    assert!(view.resize(viewport(1000, 500)).unwrap());

    let studio = view.studio().unwrap();
    assert_eq!(studio.camera.aspect, 1000.0 / 500.0);
    assert_eq!(studio.renderer.size(), viewport(1000, 500));
    assert_eq!(studio.renderer.renders, 2);
    assert_eq!(studio.renderer.aspects.last(), Some(&2.0));
}

#[test]
fn zero_resize_is_ignored() {
    let mut view = mounted();
    assert!(!view.resize(viewport(0, 0)).unwrap());
    let studio = view.studio().unwrap();
    assert_eq!(studio.renderer.size(), viewport(800, 600));
    assert_eq!(studio.renderer.renders, 1);
}

#[test]
fn export_encodes_the_retained_frame() {
    let view = mounted();
    let bytes = futures::executor::block_on(view.export_png().unwrap()).unwrap();
    let image = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(image.dimensions(), (800, 600));
    assert_eq!(image.get_pixel(0, 0).0, [1, 0, 0, 255]);
    // Exporting does not render.
    assert_eq!(renders(&view), 1);
}
