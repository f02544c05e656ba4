//! Scene data structures: geometry, materials, textures, lights and the graph
//! that ties them together.
//!
//! - `color` holds linear RGB colours decoded from sRGB hex
//! - `geometry` generates plane, box, cylinder and torus triangle lists
//! - `instance` holds local transforms and their per-instance GPU layout
//! - `light` describes directional and spot lights plus shadow cameras
//! - `material` describes the shadow-catcher, standard and physical surfaces
//! - `model` contains the vertex format and the mesh node
//! - `scene_graph` owns everything above and resolves world transforms
//! - `texture` contains the CPU texture map and the GPU texture wrapper

pub mod color;
pub mod geometry;
pub mod instance;
pub mod light;
pub mod material;
pub mod model;
pub mod scene_graph;
pub mod texture;
