//! Orbit-Core Library
//!
//! Satellite bodies on tilted elliptical orbits around a draggable anchor, and
//! pointer picking that routes presses to navigate or drag behaviors.
//!
//! The modules at the crate root are engine-independent: they only use Bevy's
//! math and `Transform` value types. The [`bevy`](crate::bevy) module wires
//! them into an ECS app (headless for tests, windowed for the viewer and the
//! browser).

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod drag;
pub mod interaction;
pub mod orbit;
pub mod pick;
pub mod pointer;
pub mod scene;
pub mod stage;

// Bevy integration
pub mod bevy;

pub use config::{
    AnchorConfig, CameraConfig, ConfigError, HitProxyConfig, SatelliteConfig, SceneConfig,
};
pub use drag::DragSession;
pub use interaction::{Dispatch, InteractionBehavior, InteractionRouter, LogUrlOpener, UrlOpener};
pub use orbit::{ORBIT_DT, OrbitClock, OrbitField, OrbitSpec, Satellite, SatelliteState};
pub use pick::{Hit, PerspectiveRig, PickCamera, PickShape, PickSurface};
pub use pointer::{
    PointerEvent, PointerNormalizer, PointerPhase, PointerSource, RawPointer, Viewport,
};
pub use scene::{NodeId, SceneError, SceneGraph, SceneNode};
pub use stage::{OrbitScene, SatelliteNodes};
