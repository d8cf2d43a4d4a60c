//! Arena of named transform nodes
//!
//! Stands in for the renderer's scene graph: every anchor, object, hit
//! surface and controller is a node addressed by [`NodeId`]. Nodes form a
//! tree under a single root; detached nodes keep their subtree but are not
//! part of the world until attached again.

use std::fmt;

use super::{Bounds, Point3D, Quaternion, Ray, RayHit, Transform, Vector3D};

/// Handle to a node in a [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// A single transform node
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub local: Transform,
    pub visible: bool,
    /// Local-space extent of the node's geometry, if it has any
    pub extent: Option<Bounds>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    fn new(name: impl Into<String>, local: Transform) -> Self {
        Self {
            name: name.into(),
            local,
            visible: true,
            extent: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// The transform-node arena
#[derive(Debug, Clone)]
pub struct Scene {
    nodes: Vec<Option<SceneNode>>,
    root: NodeId,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            nodes: vec![Some(SceneNode::new("scene", Transform::identity()))],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Number of live nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Create a node under `parent` with the given local transform.
    ///
    /// An unknown parent falls back to the scene root.
    pub fn spawn(&mut self, parent: NodeId, name: impl Into<String>, local: Transform) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(SceneNode::new(name, local)));
        let parent = if self.contains(parent) {
            parent
        } else {
            tracing::warn!("Parent {} not found; attaching {} to the scene root", parent, id);
            self.root
        };
        self.link(id, parent);
        id
    }

    /// Create a node with a local geometry extent
    pub fn spawn_with_extent(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        local: Transform,
        extent: Bounds,
    ) -> NodeId {
        let id = self.spawn(parent, name, local);
        self.set_extent(id, extent);
        id
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.node(id).map(|n| n.name.as_str())
    }

    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) {
        if let Some(node) = self.node_mut(id) {
            node.name = name.into();
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn extent(&self, id: NodeId) -> Option<Bounds> {
        self.node(id).and_then(|n| n.extent)
    }

    pub fn set_extent(&mut self, id: NodeId, extent: Bounds) {
        if let Some(node) = self.node_mut(id) {
            node.extent = Some(extent);
        }
    }

    pub fn is_visible(&self, id: NodeId) -> bool {
        self.node(id).map(|n| n.visible).unwrap_or(false)
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(node) = self.node_mut(id) {
            node.visible = visible;
        }
    }

    /// Whether the node's parent chain reaches the root
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == self.root {
                return true;
            }
            current = self.parent(node_id);
        }
        false
    }

    pub fn local_transform(&self, id: NodeId) -> Transform {
        self.node(id).map(|n| n.local).unwrap_or_default()
    }

    pub fn set_local_transform(&mut self, id: NodeId, local: Transform) {
        if let Some(node) = self.node_mut(id) {
            node.local = local;
        }
    }

    /// Accumulated transform from the top of the node's chain
    pub fn world_transform(&self, id: NodeId) -> Transform {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            match self.node(node_id) {
                Some(node) => {
                    chain.push(node.local);
                    current = node.parent;
                }
                None => break,
            }
        }
        chain
            .iter()
            .rev()
            .fold(Transform::identity(), |acc, local| acc.compose(local))
    }

    pub fn world_position(&self, id: NodeId) -> Point3D {
        self.world_transform(id).position
    }

    pub fn world_rotation(&self, id: NodeId) -> Quaternion {
        self.world_transform(id).rotation
    }

    fn parent_world(&self, id: NodeId) -> Transform {
        self.parent(id)
            .map(|p| self.world_transform(p))
            .unwrap_or_default()
    }

    /// Set the node's local transform so that its world transform equals `world`
    pub fn set_world_transform(&mut self, id: NodeId, world: Transform) {
        let local = world.relative_to(&self.parent_world(id));
        self.set_local_transform(id, local);
    }

    pub fn set_world_position(&mut self, id: NodeId, position: Point3D) {
        let mut world = self.world_transform(id);
        world.position = position;
        self.set_world_transform(id, world);
    }

    pub fn set_world_rotation(&mut self, id: NodeId, rotation: Quaternion) {
        let mut world = self.world_transform(id);
        world.rotation = rotation;
        self.set_world_transform(id, world);
    }

    pub fn translate_world(&mut self, id: NodeId, offset: Vector3D) {
        let position = self.world_position(id) + offset;
        self.set_world_position(id, position);
    }

    fn unlink(&mut self, id: NodeId) {
        if let Some(parent) = self.parent(id) {
            if let Some(p) = self.node_mut(parent) {
                p.children.retain(|c| *c != id);
            }
        }
        if let Some(node) = self.node_mut(id) {
            node.parent = None;
        }
    }

    fn link(&mut self, id: NodeId, parent: NodeId) {
        if let Some(p) = self.node_mut(parent) {
            p.children.push(id);
        }
        if let Some(node) = self.node_mut(id) {
            node.parent = Some(parent);
        }
    }

    fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == ancestor {
                return true;
            }
            current = self.parent(node_id);
        }
        false
    }

    /// Move `id` under `new_parent` keeping its local transform
    pub fn set_parent(&mut self, id: NodeId, new_parent: NodeId) {
        if !self.contains(id) || !self.contains(new_parent) || self.is_ancestor(id, new_parent) {
            tracing::warn!("Refusing to parent {} under {}", id, new_parent);
            return;
        }
        self.unlink(id);
        self.link(id, new_parent);
    }

    /// Move `id` under `new_parent` keeping its world transform
    pub fn attach(&mut self, id: NodeId, new_parent: NodeId) {
        let world = self.world_transform(id);
        self.set_parent(id, new_parent);
        self.set_world_transform(id, world);
    }

    /// Remove the node from its parent; the subtree stays alive but out of the world
    pub fn detach(&mut self, id: NodeId) {
        if id == self.root {
            return;
        }
        self.unlink(id);
    }

    /// Pre-order list of `id` and all of its descendants
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// First node of the subtree (pre-order, root included) satisfying `criteria`
    pub fn find_by<F>(&self, id: NodeId, criteria: F) -> Option<NodeId>
    where
        F: Fn(&SceneNode) -> bool,
    {
        self.descendants(id)
            .into_iter()
            .find(|n| self.node(*n).map(&criteria).unwrap_or(false))
    }

    pub fn find_by_prefix(&self, id: NodeId, prefix: &str) -> Option<NodeId> {
        self.find_by(id, |n| n.name.starts_with(prefix))
    }

    /// All matching nodes of the subtree.
    ///
    /// With `descend_into_matches == false` the children of a matching node are skipped.
    pub fn find_all_by<F>(&self, id: NodeId, criteria: F, descend_into_matches: bool) -> Vec<NodeId>
    where
        F: Fn(&SceneNode) -> bool,
    {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let matched = self.node(current).map(&criteria).unwrap_or(false);
            if matched {
                out.push(current);
            }
            if !matched || descend_into_matches {
                stack.extend(self.children(current).iter().rev().copied());
            }
        }
        out
    }

    pub fn find_all_by_prefix(&self, id: NodeId, prefix: &str) -> Vec<NodeId> {
        self.find_all_by(id, |n| n.name.starts_with(prefix), true)
    }

    /// Deep copy of a subtree, placed under `parent` with the same local transforms
    pub fn clone_subtree(&mut self, id: NodeId, parent: NodeId) -> Option<NodeId> {
        let source = self.node(id)?.clone();
        let copy = self.spawn(parent, source.name.clone(), source.local);
        if let Some(node) = self.node_mut(copy) {
            node.visible = source.visible;
            node.extent = source.extent;
        }
        for child in source.children {
            self.clone_subtree(child, copy);
        }
        Some(copy)
    }

    /// Destroy a subtree, returning the ids that were freed
    pub fn remove_subtree(&mut self, id: NodeId) -> Vec<NodeId> {
        if id == self.root {
            tracing::warn!("The scene root cannot be removed");
            return Vec::new();
        }
        let removed = self.descendants(id);
        self.unlink(id);
        for node in &removed {
            if let Some(slot) = self.nodes.get_mut(node.0) {
                *slot = None;
            }
        }
        removed
    }

    /// Intersect a world ray with the extent of a node
    pub fn raycast_node(&self, id: NodeId, ray: &Ray) -> Option<RayHit> {
        let extent = self.extent(id)?;
        let world = self.world_transform(id);
        let local_ray = ray.to_local(&world);
        let t = extent.ray_distance(&local_ray)?;
        let point = world.transform_point(local_ray.at(t));
        Some(RayHit {
            node: id,
            point,
            distance: ray.origin.distance(&point),
        })
    }
}
