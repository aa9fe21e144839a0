//! Orbit stepping and transform sync.

use bevy::prelude::*;

use crate::bevy::{ActiveScene, OrbitNode};

/// Advances the orbit field by one tick per fixed step.
pub fn advance_orbits(mut active: ResMut<ActiveScene>) {
    if let Some(scene) = active.get_mut() {
        scene.advance(1.0);
    }
}

/// Mirrors graph world transforms onto entities.
pub fn sync_node_transforms(
    active: Res<ActiveScene>,
    mut nodes: Query<(&OrbitNode, &mut Transform)>,
) {
    let Some(scene) = active.get() else {
        return;
    };
    for (orbit_node, mut transform) in &mut nodes {
        if let Some(world) = scene.graph().world_transform(orbit_node.node) {
            if *transform != world {
                *transform = world;
            }
        }
    }
}
