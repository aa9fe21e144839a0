//! ECS Resources for the orbit scene.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Arc;

use bevy::prelude::*;
use parking_lot::Mutex;

use crate::config::SceneConfig;
use crate::interaction::{LogUrlOpener, UrlOpener};
use crate::pointer::{PointerNormalizer, RawPointer, Viewport};
use crate::scene::NodeId;
use crate::stage::OrbitScene;

/// The loaded scene, if any.
#[derive(Resource, Debug, Default)]
pub struct ActiveScene {
    scene: Option<OrbitScene>,
}

impl ActiveScene {
    pub fn get(&self) -> Option<&OrbitScene> {
        self.scene.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut OrbitScene> {
        self.scene.as_mut()
    }

    pub fn replace(&mut self, scene: OrbitScene) -> Option<OrbitScene> {
        self.scene.replace(scene)
    }

    pub fn take(&mut self) -> Option<OrbitScene> {
        self.scene.take()
    }

    pub fn is_loaded(&self) -> bool {
        self.scene.is_some()
    }
}

/// Mapping from scene node to the entity that renders it.
#[derive(Resource, Debug, Default)]
pub struct NodeEntityMap {
    entities: HashMap<NodeId, Entity>,
}

impl NodeEntityMap {
    pub fn insert(&mut self, node: NodeId, entity: Entity) {
        self.entities.insert(node, entity);
    }

    pub fn get(&self, node: NodeId) -> Option<Entity> {
        self.entities.get(&node).copied()
    }

    pub fn remove(&mut self, node: NodeId) -> Option<Entity> {
        self.entities.remove(&node)
    }

    /// Empties the map, yielding every mapped entity.
    pub fn drain(&mut self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.drain().map(|(_, entity)| entity)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Pointer normalization state and the surface size pointers are measured in.
#[derive(Resource, Debug, Default)]
pub struct PointerInput {
    pub normalizer: PointerNormalizer,
    pub viewport: Viewport,
}

/// URL side effect used by navigate behaviors.
#[derive(Resource, Clone)]
pub struct UrlOpenerRes(pub Arc<dyn UrlOpener>);

impl UrlOpenerRes {
    pub fn new(opener: impl UrlOpener + 'static) -> Self {
        Self(Arc::new(opener))
    }
}

impl Default for UrlOpenerRes {
    fn default() -> Self {
        Self::new(LogUrlOpener)
    }
}

/// Commands that can be sent from JavaScript or the host binary.
#[derive(Debug, Clone)]
pub enum SceneCommand {
    /// Replace the current scene.
    LoadScene { config: SceneConfig },
    /// Remove the current scene.
    ClearScene,
    /// Feed one raw pointer event.
    Pointer(RawPointer),
    /// Frame boundary: commands after this are processed next frame.
    Yield,
}

/// Thread-safe command queue for WASM interop.
///
/// This allows JavaScript to push commands that will be processed
/// by Bevy systems on the next frame.
#[derive(Resource, Clone)]
pub struct CommandQueue {
    inner: Arc<Mutex<VecDeque<SceneCommand>>>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Push a command to be processed.
    pub fn push(&self, command: SceneCommand) {
        self.inner.lock().push_back(command);
    }

    /// Drain all pending commands.
    pub fn drain(&self) -> Vec<SceneCommand> {
        self.inner.lock().drain(..).collect()
    }

    /// Drain commands until Yield or empty.
    ///
    /// Yield itself is consumed but not returned.
    pub fn drain_until_yield(&self) -> Vec<SceneCommand> {
        let mut guard = self.inner.lock();
        let mut commands = Vec::new();
        while let Some(cmd) = guard.pop_front() {
            if matches!(cmd, SceneCommand::Yield) {
                break;
            }
            commands.push(cmd);
        }
        commands
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}
