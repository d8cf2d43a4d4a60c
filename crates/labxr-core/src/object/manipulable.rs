use std::cmp::Ordering;

use labxr_input::Handedness;
use labxr_spatial::{NodeId, Point3D, Quaternion, Ray, Scene, Transform, Vector3D};

use super::behavior::{dispatch, Hook, HookContext, NoBehavior, ObjectBehavior};
use super::{ObjectId, ObjectKind};
use crate::anchor::{AnchorId, AnchorKind, AnchorPoint, AnchorRegistry};

/// Named sub-location of an object, e.g. the mouth of a flask
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionPoint {
    pub name: String,
    pub node: NodeId,
}

/// A controller ray touching one of an object's hit surfaces
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectHit {
    pub object: ObjectId,
    pub surface: NodeId,
    pub point: Point3D,
    pub distance: f32,
}

/// Anything on the bench that can be highlighted, grabbed or anchored
#[derive(Debug)]
pub struct ManipulableObject {
    pub(crate) id: ObjectId,
    kind: ObjectKind,
    root: NodeId,
    grabbable: bool,
    interaction_enabled: bool,
    active: bool,
    interaction_points: Vec<InteractionPoint>,
    hit_surfaces: Vec<NodeId>,
    base: Option<NodeId>,
    holding_point: Option<NodeId>,
    controller: Option<Handedness>,
    anchored: Option<AnchorId>,
    highlighted: Option<Option<NodeId>>,
    placeholder: Option<NodeId>,
    behavior: Box<dyn ObjectBehavior>,
}

impl ManipulableObject {
    /// Bare object rooted at `root`; see [`super::ObjectFactory`] for convention scanning
    pub fn new(kind: ObjectKind, root: NodeId) -> Self {
        Self {
            id: ObjectId::UNREGISTERED,
            kind,
            root,
            grabbable: kind.grabbable(),
            interaction_enabled: true,
            active: false,
            interaction_points: Vec::new(),
            hit_surfaces: Vec::new(),
            base: None,
            holding_point: None,
            controller: None,
            anchored: None,
            highlighted: None,
            placeholder: None,
            behavior: Box::new(NoBehavior),
        }
    }

    pub fn with_behavior(mut self, behavior: Box<dyn ObjectBehavior>) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn with_grabbable(mut self, grabbable: bool) -> Self {
        self.grabbable = grabbable;
        self
    }

    pub fn add_hit_surface(&mut self, node: NodeId) {
        self.hit_surfaces.push(node);
    }

    pub fn add_interaction_point(&mut self, name: impl Into<String>, node: NodeId) {
        self.interaction_points.push(InteractionPoint {
            name: name.into(),
            node,
        });
    }

    pub fn set_base(&mut self, node: NodeId) {
        self.base = Some(node);
    }

    pub fn set_holding_point(&mut self, node: NodeId) {
        self.holding_point = Some(node);
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn grabbable(&self) -> bool {
        self.grabbable
    }

    pub fn interaction_enabled(&self) -> bool {
        self.interaction_enabled
    }

    pub fn set_interaction_enabled(&mut self, enabled: bool) {
        self.interaction_enabled = enabled;
    }

    pub fn active(&self) -> bool {
        self.active
    }

    /// Has at least one hit surface
    pub fn is_interactable(&self) -> bool {
        !self.hit_surfaces.is_empty()
    }

    pub fn hit_surfaces(&self) -> &[NodeId] {
        &self.hit_surfaces
    }

    pub fn interaction_points(&self) -> &[InteractionPoint] {
        &self.interaction_points
    }

    pub fn holding_point(&self) -> Option<NodeId> {
        self.holding_point
    }

    pub fn base(&self) -> Option<NodeId> {
        self.base
    }

    /// Hand currently holding the object
    pub fn controller(&self) -> Option<Handedness> {
        self.controller
    }

    pub(crate) fn set_controller(&mut self, hand: Option<Handedness>) {
        self.controller = hand;
    }

    pub fn grabbed(&self) -> bool {
        self.controller.is_some()
    }

    pub fn anchored(&self) -> Option<AnchorId> {
        self.anchored
    }

    pub(crate) fn set_anchored(&mut self, anchor: Option<AnchorId>) {
        self.anchored = anchor;
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted.is_some()
    }

    /// Hit surface that caused the current highlight
    pub fn highlighted_surface(&self) -> Option<NodeId> {
        self.highlighted.flatten()
    }

    pub fn highlight(&mut self, on: bool, surface: Option<NodeId>) {
        self.highlighted = on.then_some(surface);
    }

    pub fn world_position(&self, scene: &Scene) -> Point3D {
        scene.world_position(self.root)
    }

    pub fn interaction_point_world(&self, name: &str, scene: &Scene) -> Option<Point3D> {
        self.interaction_points
            .iter()
            .find(|p| p.name == name)
            .map(|p| scene.world_position(p.node))
    }

    /// World position of every interaction point
    pub fn points_positions(&self, scene: &Scene) -> Vec<Point3D> {
        self.interaction_points
            .iter()
            .map(|p| scene.world_position(p.node))
            .collect()
    }

    /// Base point in the object's unscaled local frame
    pub fn base_offset(&self, scene: &Scene) -> Vector3D {
        match self.base {
            Some(base) => scene
                .world_transform(self.root)
                .inverse_transform_point(scene.world_position(base))
                .to_vector(),
            None => Vector3D::ZERO,
        }
    }

    pub fn base_world_position(&self, scene: &Scene) -> Point3D {
        match self.base {
            Some(base) => scene.world_position(base),
            None => scene.world_position(self.root),
        }
    }

    /// Holding point position and rotation relative to the object's root
    pub(crate) fn holding_offset(&self, scene: &Scene) -> (Vector3D, Quaternion) {
        match self.holding_point {
            Some(hp) => {
                let root = scene.world_transform(self.root);
                let hp_world = scene.world_transform(hp);
                (
                    root.inverse_transform_point(hp_world.position).to_vector(),
                    root.rotation.inverse() * hp_world.rotation,
                )
            }
            None => (Vector3D::ZERO, Quaternion::IDENTITY),
        }
    }

    pub fn holding_point_world(&self, scene: &Scene) -> Point3D {
        match self.holding_point {
            Some(hp) => scene.world_position(hp),
            None => scene.world_position(self.root),
        }
    }

    /// Root pose whose base point sits at `position` with the given rotation
    fn pose_with_base_at(&self, position: Point3D, rotation: Quaternion, scene: &Scene) -> Transform {
        let scale = scene.world_transform(self.root).scale;
        let offset = rotation.rotate_vector(self.base_offset(scene).mul_elements(&scale));
        Transform {
            position: position - offset,
            rotation,
            scale,
        }
    }

    /// World pose the object takes when placed on `anchor`
    pub fn anchored_transform(&self, anchor: &AnchorPoint, scene: &Scene) -> Transform {
        let anchor_world = anchor.world_transform(scene);
        self.pose_with_base_at(anchor_world.position, anchor_world.rotation, scene)
    }

    /// Move the object so its base point lands on `world_position`
    pub fn place_at(&self, world_position: Point3D, scene: &mut Scene) {
        let rotation = scene.world_rotation(self.root);
        let pose = self.pose_with_base_at(world_position, rotation, scene);
        scene.set_world_transform(self.root, pose);
    }

    /// Nearest hit among the object's hit surfaces
    pub fn ray_intersection(&self, ray: &Ray, scene: &Scene) -> Option<ObjectHit> {
        self.hit_surfaces
            .iter()
            .filter_map(|surface| scene.raycast_node(*surface, ray))
            .min_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal))
            .map(|hit| ObjectHit {
                object: self.id,
                surface: hit.node,
                point: hit.point,
                distance: hit.distance,
            })
    }

    /// Eligible anchor nearest to the base point, if it lies within that anchor's snap distance
    pub fn closest_anchor(&self, registry: &AnchorRegistry, scene: &Scene) -> Option<AnchorId> {
        let base = self.base_world_position(scene);
        let mut candidates: Vec<(&AnchorPoint, f32)> = registry
            .find_eligible(self.kind)
            .map(|a| (a, a.position(scene).distance(&base)))
            .collect();

        candidates.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        let (closest, distance) = candidates.first()?;
        (*distance <= closest.min_distance()).then(|| closest.id())
    }

    /// Snap-preview node, built on first use.
    ///
    /// The preview is a hidden copy of the object's subtree parented to the
    /// scene root. Hit surfaces, anchors and nested objects are stripped so a
    /// later scan of the scene does not pick the copy up.
    pub fn placeholder(&mut self, scene: &mut Scene) -> Option<NodeId> {
        if let Some(existing) = self.placeholder.filter(|p| scene.contains(*p)) {
            return Some(existing);
        }

        let root = scene.root();
        let copy = scene.clone_subtree(self.root, root)?;
        let stripped: Vec<NodeId> = scene
            .children(copy)
            .to_vec()
            .into_iter()
            .flat_map(|child| {
                scene.find_all_by(
                    child,
                    |n| {
                        n.name.starts_with("hitSurface")
                            || AnchorKind::classify(&n.name).is_some()
                            || ObjectKind::from_node_name(&n.name).is_some()
                    },
                    false,
                )
            })
            .collect();
        for node in stripped {
            scene.remove_subtree(node);
        }
        let name = format!("{}-placeholder", scene.name(self.root).unwrap_or_default());
        scene.set_name(copy, name);
        scene.set_visible(copy, false);
        self.placeholder = Some(copy);
        Some(copy)
    }

    pub fn enable(&mut self) {
        self.active = true;
    }

    /// Detach from the scene and stop updating; anchors are released by the workspace
    pub fn disable(&mut self, scene: &mut Scene) {
        scene.detach(self.root);
        self.active = false;
        self.highlighted = None;
    }

    /// Run one behavior hook
    pub fn fire(&mut self, hook: Hook, scene: &mut Scene) {
        tracing::trace!(object = %self.id, ?hook, "hook");
        let mut ctx = HookContext {
            object: self.id,
            kind: self.kind,
            root: self.root,
            scene,
        };
        dispatch(self.behavior.as_mut(), hook, &mut ctx);
    }
}
