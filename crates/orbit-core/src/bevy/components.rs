//! ECS Components for the orbit scene.

use bevy::prelude::*;

use crate::scene::NodeId;

/// Links an entity to the scene node whose world transform it mirrors.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrbitNode {
    pub node: NodeId,
}

/// Marker for the anchor body entity.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct AnchorBody;

/// Marker for an orbiting body.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct SatelliteBody;

/// Marker for an enlarged pick target attached to a satellite.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct HitProxy;

/// Marker for the main scene camera.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct MainCamera;

/// What the renderer should attach to a body entity.
///
/// Inserted by the scene loader (which runs headless); turned into meshes,
/// materials and glTF scenes by the rendering systems.
#[derive(Component, Debug, Clone, PartialEq)]
pub enum BodyVisual {
    /// glTF scene at an asset path.
    Model { path: String },
    /// Stand-in cube for an anchor without a model.
    Cube { half_extents: Vec3 },
    /// Solid or textured sphere.
    Sphere {
        radius: f32,
        color: Color,
        texture: Option<String>,
    },
}

/// Asset handle whose load state is watched until it settles.
#[derive(Component, Debug, Clone)]
pub struct AssetWatch {
    pub handle: UntypedHandle,
    pub path: String,
}
