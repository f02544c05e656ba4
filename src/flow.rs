//! Window, event loop and presentation.
//!
//! [`App`] owns the window surface and a [`StudioView`]. Redraw requests drive
//! the stabilisation burst and present the retained frame with the button
//! overlay on top. Button clicks and keyboard accelerators dispatch to the
//! view's re-render and export actions.
//!
//! # Lifecycle
//!
//! 1. `resumed` creates the window and requests a GPU context. Natively the
//!    request is blocked on a tokio runtime; on the web it is spawned locally
//!    and delivered back through [`StudioEvent::Initialized`].
//! 2. Once the context exists the view mounts and renders its first frame.
//! 3. `CloseRequested` unmounts the view, releasing all GPU and scene
//!    resources, and exits the loop.

use std::sync::Arc;

use anyhow::Result;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::Key,
    window::Window,
};

use crate::{
    config::StudioConfig,
    context::{Context, WindowSurface},
    controls::Action,
    pipelines::{
        blit::BlitPipeline,
        gui::{GuiMesh, mk_gui_pipeline},
    },
    render::{Renderer, Viewport},
    studio::StudioView,
};

pub(crate) enum StudioEvent {
    #[allow(dead_code)]
    Initialized(Box<Result<(Context, WindowSurface)>>),
}

impl std::fmt::Debug for StudioEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized(result) => f
                .debug_tuple("Initialized")
                .field(&result.as_ref().as_ref().map(|_| ()))
                .finish(),
        }
    }
}

/// Everything needed to present onto the window.
struct Presenter {
    ctx: Context,
    surface: WindowSurface,
    blit: BlitPipeline,
    // frame version the bind group samples
    blit_bind_group: Option<(u64, wgpu::BindGroup)>,
    overlay: wgpu::RenderPipeline,
    #[cfg(feature = "ui")]
    labels: crate::pipelines::text::LabelRenderer,
}

impl Presenter {
    fn new(ctx: Context, surface: WindowSurface) -> Self {
        let blit = BlitPipeline::new(&ctx.device, surface.format());
        let overlay = mk_gui_pipeline(&ctx.device, surface.format());
        #[cfg(feature = "ui")]
        let labels =
            crate::pipelines::text::LabelRenderer::new(&ctx.device, &ctx.queue, surface.format());
        Self {
            ctx,
            surface,
            blit,
            blit_bind_group: None,
            overlay,
            #[cfg(feature = "ui")]
            labels,
        }
    }

    fn viewport(&self) -> Viewport {
        let size = self.surface.window.inner_size();
        Viewport::from_physical(size.width, size.height, self.surface.window.scale_factor())
    }

    fn present(&mut self, view: &StudioView<Renderer>) -> Result<(), wgpu::SurfaceError> {
        if !self.surface.is_configured {
            return Ok(());
        }
        let output = self.surface.surface.get_current_texture()?;
        let target = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        if let Some(renderer) = view.renderer() {
            let version = renderer.frame_version();
            if self.blit_bind_group.as_ref().is_none_or(|(v, _)| *v != version) {
                self.blit_bind_group = self
                    .blit
                    .bind_group(&self.ctx.device, renderer.frame())
                    .map(|group| (version, group));
            }
        } else {
            self.blit_bind_group = None;
        }

        let size = [self.surface.config.width, self.surface.config.height];
        let scale = self.surface.window.scale_factor() as f32;
        let overlay = GuiMesh::new(&self.ctx.device, &view.controls().quads(), size, scale);
        #[cfg(feature = "ui")]
        let labels_ready = self
            .labels
            .prepare(
                &self.ctx.device,
                &self.ctx.queue,
                &view.controls().labels(),
                size,
                scale,
            )
            .inspect_err(|e| log::warn!("{e:#}"))
            .is_ok();

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Present Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Present Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            if let Some((_, bind_group)) = &self.blit_bind_group {
                render_pass.set_pipeline(&self.blit.pipeline);
                render_pass.set_bind_group(0, bind_group, &[]);
                render_pass.draw(0..3, 0..1);
            }
            render_pass.set_pipeline(&self.overlay);
            overlay.draw(&mut render_pass);
            #[cfg(feature = "ui")]
            if labels_ready {
                if let Err(e) = self.labels.draw(&mut render_pass) {
                    log::warn!("{e:#}");
                }
            }
        }
        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        #[cfg(feature = "ui")]
        self.labels.trim();
        Ok(())
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[allow(dead_code)]
    proxy: winit::event_loop::EventLoopProxy<StudioEvent>,
    config: StudioConfig,
    window: Option<Arc<Window>>,
    presenter: Option<Presenter>,
    view: StudioView<Renderer>,
    cursor: PhysicalPosition<f64>,
}

impl App {
    fn new(event_loop: &EventLoop<StudioEvent>, config: StudioConfig) -> Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = {
            use anyhow::Context as _;
            tokio::runtime::Runtime::new().context("creating the async runtime")?
        };
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            view: StudioView::new(&config),
            config,
            window: None,
            presenter: None,
            cursor: PhysicalPosition::new(0.0, 0.0),
        })
    }

    fn on_initialized(&mut self, ctx: Context, mut surface: WindowSurface) {
        log::info!(
            "using {} ({:?}), {}x MSAA",
            ctx.adapter_info.name,
            ctx.adapter_info.backend,
            ctx.sample_count
        );
        let size = surface.window.inner_size();
        surface.resize(&ctx.device, size.width, size.height);
        self.presenter = Some(Presenter::new(ctx, surface));
        self.try_mount();
    }

    /// Mount the view if it is not mounted and the window has an area.
    fn try_mount(&mut self) {
        let Some(presenter) = &self.presenter else {
            return;
        };
        if self.view.is_ready() {
            return;
        }
        let viewport = presenter.viewport();
        if viewport.is_empty() {
            log::debug!("window has no area yet, mount deferred");
            return;
        }
        let ctx = presenter.ctx.clone();
        let settings = self.config.renderer;
        match self
            .view
            .mount(viewport, |viewport| Renderer::new(&ctx, viewport, settings))
        {
            Ok(_) => presenter.surface.window.request_redraw(),
            Err(e) => log::error!("Unable to build the studio: {e:#}"),
        }
    }

    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn dispatch(&mut self, action: Action) {
        log::debug!("{action:?} requested");
        match action {
            Action::Rerender => match self.view.rerender() {
                Ok(_) => self.request_redraw(),
                Err(e) => log::error!("Unable to re-render: {e:#}"),
            },
            Action::Download => {
                let Some(export) = self.view.export_png() else {
                    return;
                };
                #[cfg(not(target_arch = "wasm32"))]
                {
                    let path = self.config.export_path();
                    let result = self
                        .async_runtime
                        .block_on(export)
                        .and_then(|bytes| crate::export::save_png(&bytes, &path));
                    if let Err(e) = result {
                        log::error!("Unable to export: {e:#}");
                    }
                }
                #[cfg(target_arch = "wasm32")]
                {
                    let file_name = self.config.export_file_name.clone();
                    wasm_bindgen_futures::spawn_local(async move {
                        let result = export
                            .await
                            .and_then(|bytes| crate::export::download_png(&bytes, &file_name));
                        if let Err(e) = result {
                            log::error!("Unable to export: {e:#}");
                        }
                    });
                }
            }
        }
    }

    fn cursor_logical(&self) -> (f32, f32) {
        let scale = self.window.as_ref().map_or(1.0, |window| window.scale_factor());
        let logical = self.cursor.to_logical::<f32>(scale);
        (logical.x, logical.y)
    }
}

impl ApplicationHandler<StudioEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        #[allow(unused_mut)]
        let mut window_attributes =
            Window::default_attributes().with_title(self.config.window_title.clone());

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = wgpu::web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Unable to create a window: {e}");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());
        let init_future = Context::new(window);

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(init_future) {
                Ok((ctx, surface)) => self.on_initialized(ctx, surface),
                Err(e) => {
                    log::error!("Unable to create a GPU context: {e:#}");
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let result = init_future.await;
                assert!(
                    proxy
                        .send_event(StudioEvent::Initialized(Box::new(result)))
                        .is_ok()
                );
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: StudioEvent) {
        match event {
            StudioEvent::Initialized(result) => match *result {
                Ok((ctx, surface)) => self.on_initialized(ctx, surface),
                Err(e) => {
                    log::error!("Unable to create a GPU context: {e:#}");
                    event_loop.exit();
                }
            },
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.view.unmount();
                self.presenter = None;
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                let Some(presenter) = &mut self.presenter else {
                    return;
                };
                presenter.surface.resize(&presenter.ctx.device, size.width, size.height);
                if self.view.is_ready() {
                    let viewport = presenter.viewport();
                    if let Err(e) = self.view.resize(viewport) {
                        log::error!("Unable to resize: {e:#}");
                    }
                    self.request_redraw();
                } else {
                    self.try_mount();
                }
            }
            WindowEvent::RedrawRequested => {
                match self.view.on_animation_frame() {
                    Ok(true) => self.request_redraw(),
                    Ok(false) => (),
                    Err(e) => log::error!("Unable to render: {e:#}"),
                }
                let Some(presenter) = &mut self.presenter else {
                    return;
                };
                match presenter.present(&self.view) {
                    Ok(()) => (),
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = presenter.surface.window.inner_size();
                        presenter
                            .surface
                            .resize(&presenter.ctx.device, size.width, size.height);
                    }
                    Err(e) => log::error!("Unable to present {e}"),
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = position;
                let (x, y) = self.cursor_logical();
                if self.view.controls_mut().hover(x, y) {
                    self.request_redraw();
                }
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                let (x, y) = self.cursor_logical();
                if let Some(action) = self.view.controls().hit(x, y) {
                    self.dispatch(action);
                }
            }
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() && !event.repeat => {
                let action = match &event.logical_key {
                    Key::Character(text) => self.view.controls().accelerator(text.as_str()),
                    _ => None,
                };
                if let Some(action) = action {
                    self.dispatch(action);
                }
            }
            _ => {}
        }
    }
}

/// Open the studio window and run until it is closed.
pub fn run() -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    #[cfg(not(target_arch = "wasm32"))]
    let config = StudioConfig::from_env();
    #[cfg(target_arch = "wasm32")]
    let config = StudioConfig::default();

    let event_loop: EventLoop<StudioEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config)?;

    event_loop.run_app(&mut app)?;

    Ok(())
}
