//! Scene graph with explicit parent back-references.
//!
//! Nodes live in an arena and refer to their parent by [`NodeId`]. A parent
//! does not own its children through this reference; it only lets the
//! interaction layer walk the ownership chain and lets hit-proxies inherit
//! the world transform of the visual node they are attached to.

use bevy::math::{Quat, Vec3};
use bevy::transform::components::Transform;

use crate::interaction::InteractionBehavior;

/// Arena index of a scene node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Error type for scene graph operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("Unknown parent node: {0:?}")]
    UnknownParent(NodeId),
    #[error("Unknown node: {0:?}")]
    UnknownNode(NodeId),
}

/// A surface in the scene that may carry an interaction behavior.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    /// Owner of this node, if any.
    pub parent: Option<NodeId>,
    /// Transform relative to the parent (or the world for roots).
    pub local: Transform,
    pub behavior: InteractionBehavior,
    pub visible: bool,
    /// Set while the node is being dragged.
    pub highlighted: bool,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            local: Transform::IDENTITY,
            behavior: InteractionBehavior::None,
            visible: true,
            highlighted: false,
        }
    }

    pub fn with_parent(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_transform(mut self, local: Transform) -> Self {
        self.local = local;
        self
    }

    pub fn with_behavior(mut self, behavior: InteractionBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// Arena of scene nodes.
///
/// Parents must exist before their children are inserted, so every
/// ownership chain is finite and acyclic. Removed slots are never reused.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<Option<SceneNode>>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node, validating its parent reference.
    pub fn insert(&mut self, node: SceneNode) -> Result<NodeId, SceneError> {
        if let Some(parent) = node.parent {
            if self.get(parent).is_none() {
                return Err(SceneError::UnknownParent(parent));
            }
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Some(node));
        Ok(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0 as usize).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Iterates live nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.as_ref().map(|n| (NodeId(i as u32), n)))
    }

    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the ownership chain starting at `id`: the node itself, then
    /// its parent, then the parent's parent, up to the root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            graph: self,
            next: self.contains(id).then_some(id),
        }
    }

    /// Direct and indirect children of `id`, in insertion order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        // Children always have a higher index than their parent.
        let mut found = vec![id];
        for (child, node) in self.iter() {
            if let Some(parent) = node.parent {
                if found.contains(&parent) && child != id {
                    found.push(child);
                }
            }
        }
        found.remove(0);
        found
    }

    /// Computes the world transform by composing the ownership chain.
    pub fn world_transform(&self, id: NodeId) -> Option<Transform> {
        let node = self.get(id)?;
        match node.parent {
            Some(parent) => Some(self.world_transform(parent)?.mul_transform(node.local)),
            None => Some(node.local),
        }
    }

    pub fn world_position(&self, id: NodeId) -> Option<Vec3> {
        self.world_transform(id).map(|t| t.translation)
    }

    /// Places a node at `position` in world space, keeping its local rotation
    /// and scale.
    pub fn set_world_position(&mut self, id: NodeId, position: Vec3) -> Result<(), SceneError> {
        let parent = self.get(id).ok_or(SceneError::UnknownNode(id))?.parent;
        let local = match parent.and_then(|p| self.world_transform(p)) {
            Some(parent_world) => parent_world
                .compute_affine()
                .inverse()
                .transform_point3(position),
            None => position,
        };
        if let Some(node) = self.get_mut(id) {
            node.local.translation = local;
        }
        Ok(())
    }

    /// Sets translation and rotation of a root-level node directly.
    pub fn set_local_pose(
        &mut self,
        id: NodeId,
        translation: Vec3,
        rotation: Quat,
    ) -> Result<(), SceneError> {
        let node = self.get_mut(id).ok_or(SceneError::UnknownNode(id))?;
        node.local.translation = translation;
        node.local.rotation = rotation;
        Ok(())
    }

    pub fn set_highlight(&mut self, id: NodeId, highlighted: bool) {
        if let Some(node) = self.get_mut(id) {
            node.highlighted = highlighted;
        }
    }

    /// Removes a node together with everything it owns.
    /// Returns the removed ids, the node itself first.
    pub fn remove(&mut self, id: NodeId) -> Result<Vec<NodeId>, SceneError> {
        if !self.contains(id) {
            return Err(SceneError::UnknownNode(id));
        }
        let mut removed = vec![id];
        removed.extend(self.descendants(id));
        for node in &removed {
            self.nodes[node.0 as usize] = None;
        }
        Ok(removed)
    }
}

/// Iterator over an ownership chain, see [`SceneGraph::ancestors`].
pub struct Ancestors<'a> {
    graph: &'a SceneGraph,
    next: Option<NodeId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = (NodeId, &'a SceneNode);

    fn next(&mut self) -> Option<Self::Item> {
        let graph = self.graph;
        let id = self.next?;
        let node = graph.get(id)?;
        self.next = node.parent.filter(|p| graph.contains(*p));
        Some((id, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with_proxy() -> (SceneGraph, NodeId, NodeId, NodeId) {
        let mut graph = SceneGraph::new();
        let root = graph
            .insert(SceneNode::new("anchor").with_transform(Transform::from_xyz(1.0, 0.0, 0.0)))
            .unwrap();
        let moon = graph
            .insert(
                SceneNode::new("moon")
                    .with_parent(root)
                    .with_transform(Transform::from_xyz(0.0, 2.0, 0.0)),
            )
            .unwrap();
        let proxy = graph
            .insert(
                SceneNode::new("moon-proxy")
                    .with_parent(moon)
                    .with_transform(Transform::from_scale(Vec3::splat(2.0)))
                    .hidden(),
            )
            .unwrap();
        (graph, root, moon, proxy)
    }

    #[test]
    fn test_insert_rejects_unknown_parent() {
        let mut graph = SceneGraph::new();
        let err = graph
            .insert(SceneNode::new("orphan").with_parent(NodeId(7)))
            .unwrap_err();
        assert_eq!(err, SceneError::UnknownParent(NodeId(7)));
        assert!(graph.is_empty());
    }

    #[test]
    fn test_ancestors_walk_to_root() {
        let (graph, root, moon, proxy) = graph_with_proxy();
        let chain: Vec<NodeId> = graph.ancestors(proxy).map(|(id, _)| id).collect();
        assert_eq!(chain, vec![proxy, moon, root]);
        assert_eq!(graph.ancestors(NodeId(99)).count(), 0);
    }

    #[test]
    fn test_proxy_inherits_world_transform() {
        let (mut graph, root, _moon, proxy) = graph_with_proxy();
        assert_eq!(graph.world_position(proxy), Some(Vec3::new(1.0, 2.0, 0.0)));

        graph
            .set_local_pose(root, Vec3::new(-3.0, 0.0, 0.0), Quat::IDENTITY)
            .unwrap();
        assert_eq!(graph.world_position(proxy), Some(Vec3::new(-3.0, 2.0, 0.0)));
        let scale = graph.world_transform(proxy).unwrap().scale;
        assert_eq!(scale, Vec3::splat(2.0));
    }

    #[test]
    fn test_set_world_position_under_parent() {
        let (mut graph, _root, moon, _proxy) = graph_with_proxy();
        graph.set_world_position(moon, Vec3::new(5.0, 5.0, 5.0)).unwrap();
        let world = graph.world_position(moon).unwrap();
        assert!(world.abs_diff_eq(Vec3::new(5.0, 5.0, 5.0), 1e-5));
        let local = graph.get(moon).unwrap().local.translation;
        assert!(local.abs_diff_eq(Vec3::new(4.0, 5.0, 5.0), 1e-5));
    }

    #[test]
    fn test_remove_takes_descendants() {
        let (mut graph, root, moon, proxy) = graph_with_proxy();
        let other = graph.insert(SceneNode::new("other")).unwrap();

        let removed = graph.remove(moon).unwrap();
        assert_eq!(removed, vec![moon, proxy]);
        assert!(graph.contains(root));
        assert!(graph.contains(other));
        assert!(!graph.contains(proxy));
        assert_eq!(graph.remove(moon), Err(SceneError::UnknownNode(moon)));

        // Removed slots are not reused
        let next = graph.insert(SceneNode::new("late")).unwrap();
        assert_eq!(next, NodeId(4));
    }
}
