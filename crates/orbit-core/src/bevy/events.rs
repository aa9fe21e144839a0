//! ECS Messages for the orbit scene.
//!
//! Note: In Bevy 0.18+, buffered events use Message trait instead of Event.

use bevy::prelude::*;

use crate::config::SceneConfig;
use crate::pointer::RawPointer;
use crate::scene::NodeId;

/// Message to request loading a scene, replacing the current one.
#[derive(Message, Debug, Clone)]
pub struct LoadSceneEvent {
    pub config: SceneConfig,
}

/// Message to request removing the current scene.
#[derive(Message, Debug, Clone, Default)]
pub struct ClearSceneEvent;

/// Message fired when a scene has been built and its entities spawned.
#[derive(Message, Debug, Clone)]
pub struct SceneLoadedEvent {
    pub satellites: usize,
}

/// Raw pointer input, before normalization.
#[derive(Message, Debug, Clone, Copy)]
pub struct PointerInputEvent(pub RawPointer);

/// Message fired when a press resolved to a navigate behavior.
#[derive(Message, Debug, Clone)]
pub struct NavigateEvent {
    pub url: String,
}

/// Message fired when a drag begins.
#[derive(Message, Debug, Clone)]
pub struct DragStartedEvent {
    pub node: NodeId,
    pub entity: Option<Entity>,
    /// Entity of a drag that was still open and got replaced.
    pub replaced: Option<Entity>,
}

/// Message fired when a drag ends.
#[derive(Message, Debug, Clone)]
pub struct DragEndedEvent {
    pub node: NodeId,
    pub entity: Option<Entity>,
}

/// Message fired by the renderer when a body's asset failed to load.
#[derive(Message, Debug, Clone)]
pub struct AssetFailedEvent {
    pub node: NodeId,
    pub path: String,
}

/// Message fired after a body and everything attached to it was removed.
#[derive(Message, Debug, Clone)]
pub struct BodyDroppedEvent {
    pub node: NodeId,
    pub removed: Vec<NodeId>,
}
