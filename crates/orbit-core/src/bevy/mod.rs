//! Bevy integration for the orbit scene.
//!
//! Wraps [`OrbitScene`](crate::stage::OrbitScene) in ECS resources, mirrors
//! scene nodes onto entities, and routes window pointer input through the
//! picking pipeline.

pub mod components;
pub mod events;
pub mod plugin;
pub mod resources;
pub mod systems;

#[cfg(test)]
pub(crate) mod test_utils;

#[cfg(all(target_arch = "wasm32", feature = "windowed"))]
pub mod wasm_entry;

#[cfg(all(target_arch = "wasm32", feature = "windowed"))]
pub use wasm_entry::*;

pub use components::*;
pub use events::*;
pub use plugin::{OrbitHeadlessPlugin, OrbitScenePlugin, OrbitSet};
pub use resources::*;
pub use systems::RenderStyle;
