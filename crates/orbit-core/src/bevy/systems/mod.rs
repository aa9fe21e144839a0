//! Systems for the orbit scene.
//!
//! Organized by functionality:
//! - command: Command queue processing from WASM / the host binary
//! - scene_loader: Scene building and entity spawning
//! - orbit: Fixed-step orbit advance and transform sync
//! - interaction: Pointer routing and asset-failure body removal
//! - input: Mouse/touch capture (window-dependent)
//! - rendering: Meshes, materials, camera and highlight (render-dependent)

pub mod command;
pub mod input;
pub mod interaction;
pub mod orbit;
pub mod rendering;
pub mod scene_loader;

pub use command::*;
pub use input::*;
pub use interaction::*;
pub use orbit::*;
pub use rendering::*;
pub use scene_loader::*;
