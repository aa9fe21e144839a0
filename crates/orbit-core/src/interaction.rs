//! Behavior resolution and dispatch for picked surfaces.
//!
//! A hit surface rarely carries a behavior itself: hit-proxies and sub-meshes
//! defer to the object that owns them. The router walks the ownership chain
//! from the hit node upward and acts on the first behavior it finds.

use std::fmt;

use bevy::math::{Dir3, Ray3d};
use serde::{Deserialize, Serialize};

use crate::drag::DragSession;
use crate::pick::Hit;
use crate::scene::{NodeId, SceneGraph};

/// What happens when a node is pressed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractionBehavior {
    #[default]
    None,
    /// Open `url` in a new browsing context.
    Navigate { url: String },
    /// Drag on a camera-facing plane while highlighted.
    DragHighlight,
}

impl InteractionBehavior {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Side effect used by [`InteractionBehavior::Navigate`].
pub trait UrlOpener: Send + Sync {
    fn open(&self, url: &str);
}

/// Opener that only records the request in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogUrlOpener;

impl UrlOpener for LogUrlOpener {
    fn open(&self, url: &str) {
        tracing::info!("[pick] navigate: {}", url);
    }
}

/// Outcome of one routed pointer event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Ignored,
    Navigated(String),
    DragStarted {
        node: NodeId,
        /// Session that was still open when this press arrived.
        replaced: Option<NodeId>,
    },
    DragMoved(NodeId),
    DragEnded(NodeId),
}

impl fmt::Display for Dispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ignored => write!(f, "ignored"),
            Self::Navigated(url) => write!(f, "navigated to {url}"),
            Self::DragStarted { node, .. } => write!(f, "drag started on {node:?}"),
            Self::DragMoved(node) => write!(f, "drag moved {node:?}"),
            Self::DragEnded(node) => write!(f, "drag ended on {node:?}"),
        }
    }
}

/// Finds the nearest node in the ownership chain of `node` (itself included)
/// that carries a behavior.
pub fn resolve_behavior(
    graph: &SceneGraph,
    node: NodeId,
) -> Option<(NodeId, &InteractionBehavior)> {
    graph
        .ancestors(node)
        .find(|(_, n)| !n.behavior.is_none())
        .map(|(id, n)| (id, &n.behavior))
}

/// Routes pointer events to behaviors. Holds at most one drag session.
#[derive(Debug, Clone, Default)]
pub struct InteractionRouter {
    session: Option<DragSession>,
}

impl InteractionRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Node currently being dragged.
    pub fn dragging(&self) -> Option<NodeId> {
        self.session.as_ref().map(DragSession::target)
    }

    /// Handles a press that produced `hit` (or nothing).
    ///
    /// A press that starts a new drag while an old one is still open ends the
    /// old one first, reverting its highlight.
    pub fn dispatch(
        &mut self,
        graph: &mut SceneGraph,
        hit: Option<Hit>,
        ray: Ray3d,
        facing: Dir3,
        opener: &dyn UrlOpener,
    ) -> Dispatch {
        let Some(hit) = hit else {
            return Dispatch::Ignored;
        };
        let Some((owner, behavior)) = resolve_behavior(graph, hit.node) else {
            tracing::debug!("[pick] {:?} has no behavior in its chain", hit.node);
            return Dispatch::Ignored;
        };

        match behavior.clone() {
            InteractionBehavior::None => Dispatch::Ignored,
            InteractionBehavior::Navigate { url } => {
                opener.open(&url);
                Dispatch::Navigated(url)
            }
            InteractionBehavior::DragHighlight => {
                let Some(position) = graph.world_position(owner) else {
                    return Dispatch::Ignored;
                };
                let replaced = self.end_session(graph);
                if let Some(old) = replaced {
                    tracing::debug!("[pick] replaced stale drag on {:?}", old);
                }
                self.session = Some(DragSession::begin(owner, position, facing, ray));
                graph.set_highlight(owner, true);
                Dispatch::DragStarted {
                    node: owner,
                    replaced,
                }
            }
        }
    }

    /// Moves the dragged node under `ray`.
    pub fn drag_to(&mut self, graph: &mut SceneGraph, ray: Ray3d) -> Dispatch {
        let Some(session) = &self.session else {
            return Dispatch::Ignored;
        };
        let Some(position) = session.update(ray) else {
            return Dispatch::Ignored;
        };
        let target = session.target();
        match graph.set_world_position(target, position) {
            Ok(()) => Dispatch::DragMoved(target),
            Err(e) => {
                tracing::warn!("[pick] dragged node vanished: {}", e);
                self.session = None;
                Dispatch::Ignored
            }
        }
    }

    /// Ends the active drag, if any.
    pub fn release(&mut self, graph: &mut SceneGraph) -> Dispatch {
        self.end_session(graph).map_or(Dispatch::Ignored, Dispatch::DragEnded)
    }

    /// Drops the session without touching the graph if it targets one of
    /// `nodes` (used when nodes are removed).
    pub fn forget(&mut self, nodes: &[NodeId]) {
        if self.dragging().is_some_and(|n| nodes.contains(&n)) {
            self.session = None;
        }
    }

    fn end_session(&mut self, graph: &mut SceneGraph) -> Option<NodeId> {
        let target = self.session.take()?.end();
        graph.set_highlight(target, false);
        Some(target)
    }
}
