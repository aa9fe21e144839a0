//! Pointer routing and body removal.

use bevy::prelude::*;

use crate::bevy::{
    ActiveScene, AssetFailedEvent, BodyDroppedEvent, DragEndedEvent, DragStartedEvent,
    NavigateEvent, NodeEntityMap, PointerInput, PointerInputEvent, UrlOpenerRes,
};
use crate::interaction::Dispatch;

/// Normalizes raw pointer input and routes it through the active scene.
#[allow(clippy::too_many_arguments)]
pub fn route_pointer_input(
    mut events: MessageReader<PointerInputEvent>,
    mut active: ResMut<ActiveScene>,
    mut pointer: ResMut<PointerInput>,
    opener: Res<UrlOpenerRes>,
    node_map: Res<NodeEntityMap>,
    mut navigate_events: MessageWriter<NavigateEvent>,
    mut drag_started: MessageWriter<DragStartedEvent>,
    mut drag_ended: MessageWriter<DragEndedEvent>,
) {
    let viewport = pointer.viewport;
    for PointerInputEvent(raw) in events.read() {
        let Some(event) = pointer.normalizer.normalize(*raw, viewport) else {
            continue;
        };
        let Some(scene) = active.get_mut() else {
            continue;
        };

        let dispatch = scene.handle_pointer(event, opener.0.as_ref());
        if !matches!(dispatch, Dispatch::Ignored | Dispatch::DragMoved(_)) {
            tracing::debug!("[pick] {}", dispatch);
        }
        match dispatch {
            Dispatch::Ignored | Dispatch::DragMoved(_) => {}
            Dispatch::Navigated(url) => {
                navigate_events.write(NavigateEvent { url });
            }
            Dispatch::DragStarted { node, replaced } => {
                if let Some(old) = replaced {
                    drag_ended.write(DragEndedEvent {
                        node: old,
                        entity: node_map.get(old),
                    });
                }
                drag_started.write(DragStartedEvent {
                    node,
                    entity: node_map.get(node),
                    replaced: replaced.and_then(|old| node_map.get(old)),
                });
            }
            Dispatch::DragEnded(node) => {
                drag_ended.write(DragEndedEvent {
                    node,
                    entity: node_map.get(node),
                });
            }
        }
    }
}

/// Keeps the picking rig's aspect ratio in line with the pointer viewport.
pub fn sync_viewport(pointer: Res<PointerInput>, mut active: ResMut<ActiveScene>) {
    if !pointer.is_changed() {
        return;
    }
    if let Some(scene) = active.get_mut() {
        scene.set_viewport(pointer.viewport);
    }
}

/// Drops bodies whose assets failed to load. Other bodies keep running.
pub fn handle_asset_failures(
    mut commands: Commands,
    mut events: MessageReader<AssetFailedEvent>,
    mut active: ResMut<ActiveScene>,
    mut node_map: ResMut<NodeEntityMap>,
    mut dropped: MessageWriter<BodyDroppedEvent>,
) {
    for event in events.read() {
        tracing::warn!("[assets] failed to load '{}' for {:?}", event.path, event.node);
        let Some(scene) = active.get_mut() else {
            continue;
        };
        let removed = match scene.drop_body(event.node) {
            Ok(removed) => removed,
            Err(e) => {
                tracing::debug!("[assets] body already gone: {}", e);
                continue;
            }
        };
        for node in &removed {
            if let Some(entity) = node_map.remove(*node) {
                commands.entity(entity).despawn();
            }
        }
        dropped.write(BodyDroppedEvent {
            node: event.node,
            removed,
        });
    }
}
