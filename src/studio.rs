//! The tyre studio: scene construction and the view that owns it.
//!
//! [`build_scene`] assembles the complete scene in one go. [`StudioView`]
//! mounts it against a [`FrameRenderer`], runs the stabilisation burst and
//! answers the re-render, resize and export actions until it is unmounted.

use std::{f32::consts::TAU, pin::Pin};

use anyhow::{Result, bail};
use cgmath::{Deg, Point3, Rad};

use crate::{
    burst::StabilizationBurst,
    camera::Camera,
    config::StudioConfig,
    controls::Controls,
    data_structures::{
        color::Color,
        geometry::Geometry,
        instance::Transform,
        light::{Light, ShadowCamera, ShadowConfig},
        material::Material,
        model::Mesh,
        scene_graph::{Fog, Group, Scene},
    },
    export::encode_png,
    render::{FrameRenderer, Viewport},
    resources::tread::make_tread_texture,
};

pub const BACKGROUND: u32 = 0x0a0a0a;
pub const SPOKE_COUNT: usize = 8;

const FILL_DISTANCE: f32 = 30.0;
const FILL_ANGLE: Deg<f32> = Deg(35.0);

/// PNG bytes of the retained frame.
pub type PngExport = Pin<Box<dyn Future<Output = Result<Vec<u8>>>>>;

/// Build the floor, backdrop, lights and tyre assembly.
pub fn build_scene() -> Scene {
    let background = Color::from_hex(BACKGROUND);
    let mut scene = Scene::new(background).with_fog(Fog {
        color: background,
        near: 12.0,
        far: 22.0,
    });

    let floor_geometry = scene.add_geometry(Geometry::plane(40.0, 40.0));
    let floor_material = scene.add_material(Material::shadow_catcher("floor", 0.35));
    scene.add(
        Mesh::new("floor", floor_geometry, floor_material)
            .with_transform(Transform::new().with_euler(-TAU / 4.0, 0.0, 0.0))
            .with_shadows(false, true),
    );

    let backdrop_geometry = scene.add_geometry(Geometry::plane(40.0, 20.0));
    let backdrop_material = scene.add_material(Material::standard(
        "backdrop",
        Color::from_hex(0x0c0c0c),
        0.8,
        0.1,
    ));
    scene.add(
        Mesh::new("backdrop", backdrop_geometry, backdrop_material)
            .with_transform(Transform::at(0.0, 10.0, -8.0))
            .with_shadows(false, false),
    );

    scene.add(
        Light::directional("key", Color::WHITE, 3.2, Point3::new(6.0, 9.0, 6.0)).with_shadow(
            ShadowConfig {
                map_size: 4096,
                bias: -0.0005,
                camera: ShadowCamera::Orthographic {
                    left: -10.0,
                    right: 10.0,
                    top: 10.0,
                    bottom: -10.0,
                    near: 1.0,
                    far: 40.0,
                },
            },
        ),
    );
    scene.add(Light::directional(
        "rim",
        Color::from_hex(0xb0d0ff),
        1.1,
        Point3::new(-8.0, 6.0, -6.0),
    ));
    scene.add(
        Light::spot(
            "fill",
            Color::WHITE,
            0.9,
            FILL_DISTANCE,
            FILL_ANGLE.into(),
            0.2,
            1.0,
        )
        .at(Point3::new(0.0, 8.0, 10.0))
        .with_target(Point3::new(0.0, 1.2, 0.0))
        .with_shadow(ShadowConfig {
            map_size: 2048,
            bias: -0.0003,
            camera: ShadowCamera::Perspective {
                fovy: Rad::from(FILL_ANGLE * 2.0),
                near: 0.5,
                far: FILL_DISTANCE,
            },
        }),
    );

    let tyre_group = build_tyre(&mut scene);
    scene.add(tyre_group);
    scene
}

/// Tyre, hub, spokes and cap, in that order.
fn build_tyre(scene: &mut Scene) -> Group {
    let tread = scene.add_texture(make_tread_texture());
    let tyre_material = scene.add_material(
        Material::physical("tyre", Color::from_hex(0x111111), 0.55, 0.15)
            .with_clearcoat(0.6, 0.35)
            .with_bump_map(tread, 0.06)
            .with_env_map_intensity(1.0),
    );
    let rim_material = scene.add_material(
        Material::physical("rim", Color::from_hex(0xbbbbbb), 0.22, 1.0)
            .with_reflectivity(1.0)
            .with_env_map_intensity(1.2),
    );
    let upright = || Transform::new().with_euler(0.0, 0.0, TAU / 4.0);

    let mut group = Group::new("tyre").with_transform(
        Transform::at(0.0, 1.6, 0.0).with_euler(
            Rad::from(Deg(-8.0f32)).0,
            Rad::from(Deg(25.0f32)).0,
            0.0,
        ),
    );

    let torus = scene.add_geometry(Geometry::torus(2.1, 0.55, 120, 240));
    group.add(
        Mesh::new("tyre", torus, tyre_material)
            .with_transform(upright())
            .with_shadows(true, true),
    );

    let hub = scene.add_geometry(Geometry::cylinder(0.9, 1.8, 64));
    group.add(
        Mesh::new("hub", hub, rim_material)
            .with_transform(upright())
            .with_shadows(true, true),
    );

    let spoke = scene.add_geometry(Geometry::cuboid(0.16, 0.5, 2.3));
    for i in 0..SPOKE_COUNT {
        let angle = i as f32 / SPOKE_COUNT as f32 * TAU;
        group.add(
            Mesh::new(&format!("spoke-{i}"), spoke, rim_material)
                .with_transform(
                    Transform::at(0.0, angle.sin() * 0.8, angle.cos() * 0.8)
                        .with_euler(angle, 0.0, 0.0),
                )
                .with_shadows(true, false),
        );
    }

    let cap = scene.add_geometry(Geometry::cylinder(0.34, 1.9, 48));
    group.add(
        Mesh::new("cap", cap, rim_material)
            .with_transform(upright())
            .with_shadows(true, false),
    );
    group
}

/// Handles retained for the lifetime of a mounted view.
pub struct Studio<R> {
    pub renderer: R,
    pub scene: Scene,
    pub camera: Camera,
}

/// Build the scene and its camera for `viewport` and create the renderer.
pub fn build<R, F>(viewport: Viewport, make_renderer: F) -> Result<Studio<R>>
where
    F: FnOnce(Viewport) -> Result<R>,
{
    if viewport.is_empty() {
        bail!(
            "cannot build the studio for an empty {}x{} viewport",
            viewport.width,
            viewport.height
        );
    }
    let renderer = make_renderer(viewport)?;
    let scene = build_scene();
    scene.validate()?;
    Ok(Studio {
        renderer,
        scene,
        camera: Camera::studio(viewport.aspect()),
    })
}

pub struct StudioView<R: FrameRenderer> {
    studio: Option<Studio<R>>,
    burst: StabilizationBurst,
    controls: Controls,
}

impl<R: FrameRenderer> StudioView<R> {
    pub fn new(config: &StudioConfig) -> Self {
        Self {
            studio: None,
            burst: StabilizationBurst::new(config.stabilization_frames),
            controls: Controls::new(),
        }
    }

    /// Build everything and render the first frame of the burst. Returns true
    /// when more burst frames should be requested.
    pub fn mount<F>(&mut self, viewport: Viewport, make_renderer: F) -> Result<bool>
    where
        F: FnOnce(Viewport) -> Result<R>,
    {
        if self.studio.is_some() {
            log::warn!("mount called on a mounted view, remounting");
            self.unmount();
        }
        let started = instant::Instant::now();
        let mut studio = build(viewport, make_renderer)?;
        if let Err(e) = studio.renderer.render(&studio.scene, &studio.camera) {
            studio.renderer.dispose();
            studio.scene.dispose();
            return Err(e.context("rendering the first frame"));
        }
        self.studio = Some(studio);
        self.burst.start();
        let more = self.burst.advance();
        self.controls.set_enabled(true);
        log::info!(
            "studio mounted at {}x{} in {:?}",
            viewport.width,
            viewport.height,
            started.elapsed()
        );
        Ok(more)
    }

    /// Host frame callback. Renders while the burst runs and returns true
    /// when another frame should be requested.
    pub fn on_animation_frame(&mut self) -> Result<bool> {
        let Some(studio) = self.studio.as_mut() else {
            return Ok(false);
        };
        if !self.burst.is_running() {
            return Ok(false);
        }
        studio.renderer.render(&studio.scene, &studio.camera)?;
        Ok(self.burst.advance())
    }

    /// Render once more. Returns false if nothing is mounted.
    pub fn rerender(&mut self) -> Result<bool> {
        let Some(studio) = self.studio.as_mut() else {
            return Ok(false);
        };
        studio.renderer.render(&studio.scene, &studio.camera)?;
        log::debug!("re-rendered on request");
        Ok(true)
    }

    /// Follow a viewport change and render once. Zero sizes are ignored.
    pub fn resize(&mut self, viewport: Viewport) -> Result<bool> {
        let Some(studio) = self.studio.as_mut() else {
            return Ok(false);
        };
        if viewport.is_empty() {
            log::warn!(
                "ignoring resize to {}x{}",
                viewport.width,
                viewport.height
            );
            return Ok(false);
        }
        studio.renderer.set_size(viewport)?;
        studio.camera.resize(viewport.width, viewport.height);
        studio.renderer.render(&studio.scene, &studio.camera)?;
        log::debug!("resized to {}x{}", viewport.width, viewport.height);
        Ok(true)
    }

    /// Capture the retained frame as PNG. `None` if nothing is mounted.
    pub fn export_png(&self) -> Option<PngExport> {
        let studio = self.studio.as_ref()?;
        let capture = studio.renderer.capture();
        Some(Box::pin(async move { encode_png(&capture.await?) }))
    }

    /// Cancel the burst and release the renderer, geometries, materials and
    /// textures. Returns the released handles.
    pub fn unmount(&mut self) -> Option<Studio<R>> {
        self.burst.cancel();
        self.controls.set_enabled(false);
        let mut studio = self.studio.take()?;
        studio.renderer.dispose();
        studio.scene.dispose();
        log::info!("studio unmounted");
        Some(studio)
    }

    pub fn is_ready(&self) -> bool {
        self.studio.is_some()
    }

    pub fn studio(&self) -> Option<&Studio<R>> {
        self.studio.as_ref()
    }

    pub fn renderer(&self) -> Option<&R> {
        self.studio.as_ref().map(|studio| &studio.renderer)
    }

    pub fn burst(&self) -> &StabilizationBurst {
        &self.burst
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut Controls {
        &mut self.controls
    }
}

impl<R: FrameRenderer> Drop for StudioView<R> {
    fn drop(&mut self) {
        self.unmount();
    }
}
