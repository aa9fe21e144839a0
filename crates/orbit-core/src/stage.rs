//! A complete orbit scene: graph, orbit field, pick surface and router.
//!
//! [`OrbitScene`] is the engine-independent state the Bevy layer drives.
//! It is built from a [`SceneConfig`] and has two entry points:
//! [`advance`](OrbitScene::advance) once per fixed tick and
//! [`handle_pointer`](OrbitScene::handle_pointer) per normalized pointer event.

use bevy::math::{Quat, Vec3};
use bevy::transform::components::Transform;

use crate::config::SceneConfig;
use crate::interaction::{Dispatch, InteractionBehavior, InteractionRouter, UrlOpener};
use crate::orbit::OrbitField;
use crate::pick::{PerspectiveRig, PickCamera, PickShape, PickSurface};
use crate::pointer::{PointerEvent, PointerPhase, Viewport};
use crate::scene::{NodeId, SceneError, SceneGraph, SceneNode};

/// Nodes created for one satellite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SatelliteNodes {
    pub name: String,
    pub body: NodeId,
    pub proxy: Option<NodeId>,
}

/// Runtime state of one loaded scene.
#[derive(Debug, Clone)]
pub struct OrbitScene {
    graph: SceneGraph,
    field: OrbitField,
    picks: PickSurface,
    router: InteractionRouter,
    rig: PerspectiveRig,
    anchor: NodeId,
    satellites: Vec<SatelliteNodes>,
}

impl OrbitScene {
    /// Builds the scene graph, orbit field and pick surface for `config`.
    ///
    /// The config is assumed to be validated.
    pub fn from_config(config: &SceneConfig) -> Result<Self, SceneError> {
        let mut graph = SceneGraph::new();
        let mut picks = PickSurface::new();

        let anchor_cfg = &config.anchor;
        let anchor_position = Vec3::from(anchor_cfg.position);
        let anchor = graph.insert(
            SceneNode::new(anchor_cfg.name.clone())
                .with_transform(
                    Transform::from_translation(anchor_position)
                        .with_rotation(Quat::from_rotation_y(anchor_cfg.rotation_y))
                        .with_scale(Vec3::splat(anchor_cfg.scale)),
                )
                .with_behavior(anchor_cfg.behavior.clone()),
        )?;
        picks.register(anchor, anchor_cfg.pick);

        let mut field = OrbitField::new(config.angular_step);
        field.set_anchor(anchor_position);

        let mut satellites = Vec::with_capacity(config.satellites.len());
        for sat in &config.satellites {
            let body = graph.insert(
                SceneNode::new(sat.name.clone()).with_behavior(sat.behavior.clone()),
            )?;
            field.add(sat.orbit, body);
            picks.register(body, PickShape::Sphere { radius: sat.size });

            let proxy = match &sat.hit_proxy {
                Some(proxy_cfg) => {
                    let mut node = SceneNode::new(format!("{}-proxy", sat.name))
                        .with_parent(body)
                        .with_transform(Transform::from_scale(Vec3::splat(proxy_cfg.scale)))
                        .with_behavior(InteractionBehavior::None);
                    if !proxy_cfg.visible {
                        node = node.hidden();
                    }
                    let proxy = graph.insert(node)?;
                    picks.register(proxy, PickShape::Sphere { radius: sat.size });
                    Some(proxy)
                }
                None => None,
            };

            satellites.push(SatelliteNodes {
                name: sat.name.clone(),
                body,
                proxy,
            });
        }

        let mut scene = Self {
            graph,
            field,
            picks,
            router: InteractionRouter::new(),
            rig: config.camera.rig(Viewport::default().aspect()),
            anchor,
            satellites,
        };
        scene.sync_satellites();

        tracing::info!(
            "[orbit] scene built: {} satellites, {} pick surfaces",
            scene.satellites.len(),
            scene.picks.len()
        );
        Ok(scene)
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn field(&self) -> &OrbitField {
        &self.field
    }

    pub fn picks(&self) -> &PickSurface {
        &self.picks
    }

    pub fn router(&self) -> &InteractionRouter {
        &self.router
    }

    pub fn rig(&self) -> &PerspectiveRig {
        &self.rig
    }

    pub fn anchor(&self) -> NodeId {
        self.anchor
    }

    pub fn satellites(&self) -> &[SatelliteNodes] {
        &self.satellites
    }

    /// Keeps the picking rig's aspect ratio in line with the render target.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.rig.aspect = viewport.aspect();
    }

    /// Advances the orbit field by `dt_ticks` and writes satellite poses to
    /// the graph. A satellite being dragged keeps its dragged pose.
    pub fn advance(&mut self, dt_ticks: f32) {
        if let Some(anchor) = self.graph.world_position(self.anchor) {
            self.field.set_anchor(anchor);
        }
        self.field.advance(dt_ticks);
        self.sync_satellites();
    }

    fn sync_satellites(&mut self) {
        let pinned = self.router.dragging();
        for satellite in self.field.satellites() {
            if Some(satellite.node) == pinned {
                continue;
            }
            if let Err(e) = self.graph.set_local_pose(
                satellite.node,
                satellite.state.position,
                satellite.state.rotation(),
            ) {
                tracing::warn!("[orbit] satellite pose not applied: {}", e);
            }
        }
    }

    /// Routes one normalized pointer event.
    pub fn handle_pointer(&mut self, event: PointerEvent, opener: &dyn UrlOpener) -> Dispatch {
        let ray = self.rig.ray_from_ndc(event.ndc);
        match event.phase {
            PointerPhase::Press => {
                let Some(ray) = ray else {
                    return Dispatch::Ignored;
                };
                let hit = self.picks.resolve(&self.graph, event.ndc, &self.rig);
                self.router
                    .dispatch(&mut self.graph, hit, ray, self.rig.forward(), opener)
            }
            PointerPhase::Move => match ray {
                Some(ray) => self.router.drag_to(&mut self.graph, ray),
                None => Dispatch::Ignored,
            },
            PointerPhase::Release => self.router.release(&mut self.graph),
        }
    }

    /// Removes a body whose assets failed to load, together with everything
    /// attached to it. Other bodies are unaffected.
    pub fn drop_body(&mut self, node: NodeId) -> Result<Vec<NodeId>, SceneError> {
        let removed = self.graph.remove(node)?;
        for id in &removed {
            self.field.remove_node(*id);
        }
        self.picks.unregister(&removed);
        self.router.forget(&removed);
        self.satellites.retain(|s| !removed.contains(&s.body));
        tracing::warn!("[orbit] dropped body {:?} ({} nodes)", node, removed.len());
        Ok(removed)
    }
}
