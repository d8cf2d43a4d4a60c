use std::collections::HashMap;
use std::fmt;

use labxr_spatial::{NodeId, Scene};

use super::behavior::{Hook, NoBehavior, ObjectBehavior, ToggleBehavior};
use super::{ManipulableObject, ObjectKind};
use crate::error::{LabError, Result};

/// Constructor of the behavior attached to every object of one kind
pub type BehaviorCtor = fn() -> Box<dyn ObjectBehavior>;

const HIT_SURFACE_PREFIX: &str = "hitSurface";
const HOLDING_POINT_PREFIX: &str = "holdingPoint";
const BASE_POINT_PREFIX: &str = "basePoint";

fn lid() -> Box<dyn ObjectBehavior> {
    Box::new(ToggleBehavior::lid())
}

fn door() -> Box<dyn ObjectBehavior> {
    Box::new(ToggleBehavior::door())
}

/// Builds [`ManipulableObject`]s from scene nodes named after an [`ObjectKind`]
pub struct ObjectFactory {
    behaviors: HashMap<ObjectKind, BehaviorCtor>,
}

impl fmt::Debug for ObjectFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.behaviors.keys().collect();
        kinds.sort();
        f.debug_struct("ObjectFactory").field("behaviors", &kinds).finish()
    }
}

impl Default for ObjectFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectFactory {
    pub fn new() -> Self {
        let mut behaviors: HashMap<ObjectKind, BehaviorCtor> = HashMap::new();
        behaviors.insert(ObjectKind::Bin, lid);
        behaviors.insert(ObjectKind::SphDoor, door);
        Self { behaviors }
    }

    /// Replace the behavior built for `kind`
    pub fn register_behavior(&mut self, kind: ObjectKind, ctor: BehaviorCtor) {
        self.behaviors.insert(kind, ctor);
    }

    pub fn has_behavior(&self, kind: ObjectKind) -> bool {
        self.behaviors.contains_key(&kind)
    }

    /// Build the object rooted at `root`.
    ///
    /// Hit surfaces are hidden. Parts that are missing or unusable are
    /// logged and the object is returned degraded.
    pub fn build(&self, scene: &mut Scene, root: NodeId) -> Result<ManipulableObject> {
        let name = scene.name(root).ok_or(LabError::UnknownNode(root))?.to_string();
        let kind =
            ObjectKind::from_node_name(&name).ok_or_else(|| LabError::UnknownObjectKind(name.clone()))?;

        let behavior = self.behaviors.get(&kind).map_or_else(
            || Box::new(NoBehavior) as Box<dyn ObjectBehavior>,
            |ctor| ctor(),
        );
        let mut object = ManipulableObject::new(kind, root).with_behavior(behavior);

        for node in own_parts(scene, root) {
            let part = scene.name(node).unwrap_or_default().to_string();
            if part.starts_with(HIT_SURFACE_PREFIX) {
                if scene.extent(node).is_none() {
                    tracing::error!("Hit surface {} of {} has no extent", part, name);
                    continue;
                }
                scene.set_visible(node, false);
                object.add_hit_surface(node);
            } else if part.starts_with(HOLDING_POINT_PREFIX) {
                if object.holding_point().is_none() {
                    object.set_holding_point(node);
                }
            } else if part.starts_with(BASE_POINT_PREFIX) {
                if object.base().is_none() {
                    object.set_base(node);
                }
            }
        }

        for required in kind.required_points() {
            let found = own_parts(scene, root)
                .into_iter()
                .find(|n| scene.name(*n).is_some_and(|p| p.starts_with(*required)));
            match found {
                Some(node) => object.add_interaction_point(*required, node),
                None => tracing::error!("{} was not found for object {}", required, name),
            }
        }

        if object.grabbable() && object.holding_point().is_none() {
            tracing::debug!("{} has no holding point, its root will be held", name);
        }
        if !object.is_interactable() {
            tracing::debug!("{} has no hit surface and cannot be pointed at", name);
        }

        object.fire(Hook::Init, scene);
        Ok(object)
    }
}

/// Descendants of `root` in pre-order, leaving out nested objects
fn own_parts(scene: &Scene, root: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack: Vec<NodeId> = scene.children(root).iter().rev().copied().collect();
    while let Some(current) = stack.pop() {
        if scene
            .name(current)
            .is_some_and(|n| ObjectKind::from_node_name(n).is_some())
        {
            continue;
        }
        out.push(current);
        stack.extend(scene.children(current).iter().rev().copied());
    }
    out
}
