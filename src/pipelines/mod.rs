//! Render pipelines and the bind group layouts they share.
//!
//! - `basic` holds the common pipeline builder
//! - `studio` draws lit surfaces and the shadow catcher
//! - `shadow` renders depth from each shadow-casting light
//! - `light` packs lights, fog and exposure into one uniform
//! - `blit` presents the retained frame to a window surface
//! - `gui` draws the button overlay
//! - `text` draws the button captions (`ui` feature)

pub mod basic;
pub mod blit;
pub mod gui;
pub mod light;
pub mod shadow;
pub mod studio;
#[cfg(feature = "ui")]
pub mod text;
