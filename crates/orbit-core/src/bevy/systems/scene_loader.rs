//! Scene loading systems.
//!
//! Builds the engine-independent [`OrbitScene`] and spawns one entity per
//! scene node. Entities carry plain `Transform`s mirrored from the graph's
//! world transforms; the ownership chain lives in the graph, not in the ECS
//! hierarchy.

use bevy::prelude::*;

use crate::bevy::{
    ActiveScene, AnchorBody, BodyVisual, ClearSceneEvent, HitProxy, LoadSceneEvent, NodeEntityMap,
    OrbitNode, PointerInput, SatelliteBody, SceneLoadedEvent,
};
use crate::config::SceneConfig;
use crate::pick::PickShape;
use crate::stage::OrbitScene;

/// System to handle scene loading requests.
pub fn handle_load_scene(
    mut commands: Commands,
    mut events: MessageReader<LoadSceneEvent>,
    mut loaded: MessageWriter<SceneLoadedEvent>,
    mut active: ResMut<ActiveScene>,
    mut node_map: ResMut<NodeEntityMap>,
    mut pointer: ResMut<PointerInput>,
) {
    for event in events.read() {
        if let Err(e) = event.config.validate() {
            tracing::warn!("[orbit] rejected scene config: {}", e);
            continue;
        }
        let mut scene = match OrbitScene::from_config(&event.config) {
            Ok(scene) => scene,
            Err(e) => {
                tracing::warn!("[orbit] failed to build scene: {}", e);
                continue;
            }
        };
        scene.set_viewport(pointer.viewport);

        // The map also holds entities spawned earlier this frame.
        despawn_scene_entities(&mut commands, &mut node_map);
        pointer.normalizer.reset();

        spawn_scene_entities(&mut commands, &scene, &event.config, &mut node_map);

        let satellites = scene.satellites().len();
        active.replace(scene);
        tracing::info!("[orbit] scene loaded ({} entities)", node_map.len());
        loaded.write(SceneLoadedEvent { satellites });
    }
}

/// System to handle scene clearing requests.
pub fn handle_clear_scene(
    mut commands: Commands,
    mut events: MessageReader<ClearSceneEvent>,
    mut active: ResMut<ActiveScene>,
    mut node_map: ResMut<NodeEntityMap>,
    mut pointer: ResMut<PointerInput>,
) {
    for _ in events.read() {
        despawn_scene_entities(&mut commands, &mut node_map);
        pointer.normalizer.reset();
        if active.take().is_some() {
            tracing::info!("[orbit] scene cleared");
        }
    }
}

fn despawn_scene_entities(commands: &mut Commands, node_map: &mut NodeEntityMap) {
    for entity in node_map.drain() {
        commands.entity(entity).despawn();
    }
}

fn spawn_scene_entities(
    commands: &mut Commands,
    scene: &OrbitScene,
    config: &SceneConfig,
    node_map: &mut NodeEntityMap,
) {
    let graph = scene.graph();
    let world_of = |node| graph.world_transform(node).unwrap_or_default();

    let anchor = scene.anchor();
    let anchor_visual = match (&config.anchor.model, config.anchor.pick) {
        (Some(path), _) => BodyVisual::Model { path: path.clone() },
        (None, PickShape::Cuboid { half_extents }) => BodyVisual::Cube {
            half_extents: Vec3::from(half_extents),
        },
        (None, PickShape::Sphere { radius }) => BodyVisual::Sphere {
            radius,
            color: Color::WHITE,
            texture: None,
        },
    };
    let entity = commands
        .spawn((
            Name::new(config.anchor.name.clone()),
            OrbitNode { node: anchor },
            AnchorBody,
            anchor_visual,
            world_of(anchor),
            Visibility::Visible,
        ))
        .id();
    node_map.insert(anchor, entity);

    for (nodes, sat) in scene.satellites().iter().zip(&config.satellites) {
        let [r, g, b] = sat.color;
        let entity = commands
            .spawn((
                Name::new(nodes.name.clone()),
                OrbitNode { node: nodes.body },
                SatelliteBody,
                BodyVisual::Sphere {
                    radius: sat.size,
                    color: Color::linear_rgb(r, g, b),
                    texture: sat.texture.clone(),
                },
                world_of(nodes.body),
                Visibility::Visible,
            ))
            .id();
        node_map.insert(nodes.body, entity);

        if let Some(proxy) = nodes.proxy {
            let visible = graph.get(proxy).is_some_and(|n| n.visible);
            let mut proxy_entity = commands.spawn((
                Name::new(format!("{}-proxy", nodes.name)),
                OrbitNode { node: proxy },
                HitProxy,
                world_of(proxy),
                if visible { Visibility::Visible } else { Visibility::Hidden },
            ));
            if visible {
                proxy_entity.insert(BodyVisual::Sphere {
                    radius: sat.size,
                    color: Color::linear_rgba(r, g, b, 0.25),
                    texture: None,
                });
            }
            node_map.insert(proxy, proxy_entity.id());
        }
    }
}
