//! tyre-studio
//!
//! A procedurally built, studio-lit render of a tyre and wheel assembly. The
//! scene is assembled once, rendered in a short stabilisation burst and then
//! kept as a retained frame that can be re-rendered or exported as PNG. Runs
//! natively through winit and in the browser on a `canvas` element.
//!
//! High-level modules
//! - `burst`: fixed-length render burst after mount
//! - `camera`: perspective camera and its uniform
//! - `config`: runtime settings with environment overrides
//! - `context`: GPU device/queue and the window surface
//! - `controls`: the re-render and download buttons
//! - `data_structures`: scene graph, geometry, materials, lights and textures
//! - `export`: PNG encoding and delivery
//! - `flow`: window event loop and presentation
//! - `pipelines`: render pipelines and shaders
//! - `render`: offscreen renderer behind the `FrameRenderer` seam
//! - `resources`: procedural texture synthesis
//! - `studio`: scene construction and the view lifecycle
//!

pub mod burst;
pub mod camera;
pub mod config;
pub mod context;
pub mod controls;
pub mod data_structures;
pub mod export;
pub mod flow;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod studio;

// Re-exports commonly used types for convenience in downstream code.
pub use config::StudioConfig;
pub use flow::run;
pub use render::{FrameRenderer, Renderer, RendererSettings, Viewport};
pub use studio::{StudioView, build_scene};

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    if let Err(e) = run() {
        log::error!("{e:#}");
    }
}
