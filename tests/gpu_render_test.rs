#![cfg(feature = "integration-tests")]
//! Renders through a real device. Run with
//! `cargo test --features integration-tests -- --ignored`.

mod common;

use common::test_utils::headless_context;
use tyre_studio::{
    FrameRenderer, Renderer, RendererSettings, StudioConfig, StudioView, Viewport,
    camera::Camera, render::padded_bytes_per_row,
};

fn small() -> Viewport {
    Viewport::new(96, 64, 1.0)
}

#[test]
#[ignore = "needs a GPU adapter, run with --ignored"]
fn rerender_without_changes_is_pixel_identical() {
    let ctx = headless_context();
    let mut view = StudioView::new(&StudioConfig::default());
    view.mount(small(), |viewport| {
        Renderer::new(&ctx, viewport, RendererSettings::default())
    })
    .unwrap();
    while view.on_animation_frame().unwrap() {}

    let first = futures::executor::block_on(view.export_png().unwrap()).unwrap();
    view.rerender().unwrap();
    let second = futures::executor::block_on(view.export_png().unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
#[ignore = "needs a GPU adapter, run with --ignored"]
fn frame_shows_background_and_lit_tyre() {
    let ctx = headless_context();
    let scene = tyre_studio::build_scene();
    let viewport = Viewport::new(160, 120, 1.0);
    let mut renderer = Renderer::new(&ctx, viewport, RendererSettings::default()).unwrap();
    renderer
        .render(&scene, &Camera::studio(viewport.aspect()))
        .unwrap();
    let image = futures::executor::block_on(renderer.capture()).unwrap();
    assert_eq!(image.dimensions(), (160, 120));

    // Top-left corner looks past the backdrop into the fogged background.
    let corner = image.get_pixel(0, 0).0;
    assert!(corner[0] < 40 && corner[1] < 40 && corner[2] < 40, "{corner:?}");
    // Something in the frame is lit well above the background.
    let brightest = image.pixels().map(|p| p.0[0].max(p.0[1]).max(p.0[2])).max();
    assert!(brightest.unwrap_or(0) > 60);
}

#[test]
#[ignore = "needs a GPU adapter, run with --ignored"]
fn resize_reallocates_the_frame() {
    let ctx = headless_context();
    let mut view = StudioView::new(&StudioConfig::default());
    view.mount(small(), |viewport| {
        Renderer::new(&ctx, viewport, RendererSettings::default())
    })
    .unwrap();
    let before = view.renderer().unwrap().frame_version();

    view.resize(Viewport::new(70, 30, 2.0)).unwrap();
    let renderer = view.renderer().unwrap();
    assert_eq!(renderer.physical_size(), [140, 60]);
    assert_eq!(renderer.size(), Viewport::new(70, 30, 2.0));
    assert_ne!(renderer.frame_version(), before);
    assert_eq!(view.studio().unwrap().camera.aspect, 70.0 / 30.0);

    // 140 px rows need padding before readback.
    assert_eq!(padded_bytes_per_row(140), 768);
    let image = futures::executor::block_on(renderer.capture()).unwrap();
    assert_eq!(image.dimensions(), (140, 60));
}

#[test]
#[ignore = "needs a GPU adapter, run with --ignored"]
fn shadow_maps_follow_casting_lights() {
    let ctx = headless_context();
    let scene = tyre_studio::build_scene();
    let mut renderer = Renderer::new(&ctx, small(), RendererSettings::default()).unwrap();
    renderer
        .render(&scene, &Camera::studio(small().aspect()))
        .unwrap();
    let sizes = renderer.shadow_map_sizes();
    assert_eq!(sizes.len(), 2);
    assert_eq!(sizes[0], 4096.min(ctx.max_texture_size()));
    assert_eq!(sizes[1], 2048.min(ctx.max_texture_size()));
}

#[test]
#[ignore = "needs a GPU adapter, run with --ignored"]
fn unmount_disposes_the_renderer() {
    let ctx = headless_context();
    let mut view = StudioView::new(&StudioConfig::default());
    view.mount(small(), |viewport| {
        Renderer::new(&ctx, viewport, RendererSettings::default())
    })
    .unwrap();
    let mut released = view.unmount().unwrap();
    assert!(released.renderer.is_disposed());
    assert!(released.scene.is_disposed());
    assert!(
        released
            .renderer
            .render(&released.scene, &released.camera)
            .is_err()
    );
    assert!(futures::executor::block_on(released.renderer.capture()).is_err());
}
