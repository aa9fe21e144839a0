//! Pointer ray picking against registered surfaces.

use bevy::math::bounding::{Aabb3d, BoundingSphere, RayCast3d};
use bevy::math::{Dir3, Ray3d, Vec2, Vec3};
use bevy::transform::components::Transform;
use serde::{Deserialize, Serialize};

use crate::scene::{NodeId, SceneGraph};

/// Camera abstraction used for picking.
pub trait PickCamera {
    /// Builds a world-space ray through normalized device coordinates
    /// (`[-1, 1]` on both axes, Y up).
    fn ray_from_ndc(&self, ndc: Vec2) -> Option<Ray3d>;

    /// Direction the camera is looking at.
    fn forward(&self) -> Dir3;

    /// Maximum pick distance along a ray.
    fn far(&self) -> f32 {
        f32::MAX
    }
}

/// Perspective camera described by position, look-at target and vertical FOV.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveRig {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Viewport width / height.
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for PerspectiveRig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 10.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: 75.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl PerspectiveRig {
    /// Camera transform for rendering. Picking rays use the same basis.
    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position).looking_at(self.target, self.up)
    }

    /// Orthonormal basis (forward, right, up) of the rig.
    fn basis(&self) -> (Dir3, Dir3, Dir3) {
        let transform = self.transform();
        (transform.forward(), transform.right(), transform.up())
    }
}

impl PickCamera for PerspectiveRig {
    fn ray_from_ndc(&self, ndc: Vec2) -> Option<Ray3d> {
        let (forward, right, up) = self.basis();
        let half_height = (self.fov_y * 0.5).tan();
        let half_width = half_height * self.aspect;
        let direction =
            *forward + *right * (ndc.x * half_width) + *up * (ndc.y * half_height);
        let direction = Dir3::new(direction).ok()?;
        Some(Ray3d::new(self.position, direction))
    }

    fn forward(&self) -> Dir3 {
        self.basis().0
    }

    fn far(&self) -> f32 {
        self.far
    }
}

/// Hit-test volume of a pickable surface, in the node's local units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PickShape {
    Sphere { radius: f32 },
    /// Axis-aligned box (node rotation is ignored).
    Cuboid { half_extents: [f32; 3] },
}

/// A surface registered for ray-intersection testing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pickable {
    pub node: NodeId,
    pub shape: PickShape,
}

/// Result of a successful pick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// The surface that was hit (possibly a hit-proxy).
    pub node: NodeId,
    /// Distance from the ray origin.
    pub distance: f32,
    pub point: Vec3,
}

/// The set of pickable surfaces of one scene.
#[derive(Debug, Clone, Default)]
pub struct PickSurface {
    surfaces: Vec<Pickable>,
}

impl PickSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, node: NodeId, shape: PickShape) {
        self.surfaces.push(Pickable { node, shape });
    }

    /// Drops every surface attached to one of `nodes`.
    pub fn unregister(&mut self, nodes: &[NodeId]) {
        self.surfaces.retain(|s| !nodes.contains(&s.node));
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Casts a ray through `ndc` and returns the nearest hit.
    pub fn resolve(
        &self,
        graph: &SceneGraph,
        ndc: Vec2,
        camera: &impl PickCamera,
    ) -> Option<Hit> {
        let ray = camera.ray_from_ndc(ndc)?;
        self.cast(graph, ray, camera.far())
    }

    /// Tests `ray` against every surface and keeps the nearest hit.
    /// Exact ties go to the surface registered first.
    pub fn cast(&self, graph: &SceneGraph, ray: Ray3d, max_distance: f32) -> Option<Hit> {
        let caster = RayCast3d::from_ray(ray, max_distance);
        let mut nearest: Option<Hit> = None;

        for surface in &self.surfaces {
            let Some(world) = graph.world_transform(surface.node) else {
                continue;
            };
            let distance = match surface.shape {
                PickShape::Sphere { radius } => {
                    let radius = radius * world.scale.abs().max_element();
                    caster.sphere_intersection_at(&BoundingSphere::new(world.translation, radius))
                }
                PickShape::Cuboid { half_extents } => {
                    let half = Vec3::from(half_extents) * world.scale.abs();
                    caster.aabb_intersection_at(&Aabb3d::new(world.translation, half))
                }
            };
            let Some(distance) = distance else {
                continue;
            };
            if nearest.is_none_or(|n| distance < n.distance) {
                nearest = Some(Hit {
                    node: surface.node,
                    distance,
                    point: ray.get_point(distance),
                });
            }
        }

        if let Some(hit) = &nearest {
            tracing::trace!("[pick] hit {:?} at {:.3}", hit.node, hit.distance);
        }
        nearest
    }
}
