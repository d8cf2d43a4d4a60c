//! The scene, its anchors and its objects, kept consistent with each other

use labxr_config::LabConfig;
use labxr_spatial::{NodeId, Point3D, Scene};

use crate::anchor::{AnchorId, AnchorRegistry};
use crate::error::Result;
use crate::object::{ObjectFactory, ObjectId, ObjectKind, ObjectPool};

/// Service bundle shared by both controllers.
///
/// Object/anchor links are only changed through the methods here, which keep
/// `object.anchored() == Some(a)` and `anchor(a).occupant() == Some(object)`
/// in agreement.
#[derive(Debug)]
pub struct Workspace {
    pub scene: Scene,
    pub anchors: AnchorRegistry,
    pub objects: ObjectPool,
    pub factory: ObjectFactory,
    /// Eye position; highlight picks the hit closest to it
    pub viewer: Point3D,
    config: LabConfig,
}

impl Workspace {
    pub fn new(config: LabConfig) -> Self {
        Self::with_scene(Scene::new(), config)
    }

    pub fn with_scene(scene: Scene, config: LabConfig) -> Self {
        Self {
            scene,
            anchors: AnchorRegistry::new(config.anchors.clone()),
            objects: ObjectPool::new(),
            factory: ObjectFactory::new(),
            viewer: Point3D::ORIGIN,
            config,
        }
    }

    pub fn config(&self) -> &LabConfig {
        &self.config
    }

    /// Discover anchors and build objects for every node under `root` named after an object kind
    pub fn populate(&mut self, root: NodeId) -> (Vec<ObjectId>, Vec<AnchorId>) {
        let anchors = self.anchors.discover(&mut self.scene, root);
        let nodes = self
            .scene
            .find_all_by(root, |n| ObjectKind::from_node_name(&n.name).is_some(), true);

        let mut objects = Vec::new();
        for node in nodes {
            match self.add_object(node) {
                Ok(id) => objects.push(id),
                Err(e) => tracing::error!("Skipping object at {}: {}", node, e),
            }
        }

        tracing::info!(
            "Workspace populated with {} objects and {} anchors",
            objects.len(),
            anchors.len()
        );
        (objects, anchors)
    }

    pub fn add_object(&mut self, node: NodeId) -> Result<ObjectId> {
        let object = self.factory.build(&mut self.scene, node)?;
        Ok(self.objects.add(object))
    }

    /// Snap an object onto an anchor and link the two.
    ///
    /// Held objects are refused. A different occupant of the anchor loses
    /// its link but is not moved.
    pub fn place_on_anchor(&mut self, object: ObjectId, anchor: AnchorId) -> bool {
        match self.objects.get(object) {
            Some(o) if o.grabbed() => {
                tracing::warn!("{} is held and cannot be placed on {}", object, anchor);
                return false;
            }
            Some(_) => {}
            None => {
                tracing::warn!("Cannot place unknown {}", object);
                return false;
            }
        }
        if self.anchors.get(anchor).is_none() {
            tracing::warn!("Cannot place {} on unknown {}", object, anchor);
            return false;
        }

        self.remove_from_anchor(object);

        let stale = self
            .anchors
            .get(anchor)
            .and_then(|a| a.occupant())
            .filter(|o| *o != object);
        if let Some(other) = stale {
            if let Some(o) = self.objects.get_mut(other) {
                o.set_anchored(None);
            }
        }

        let (Some(o), Some(point)) = (self.objects.get(object), self.anchors.get_mut(anchor)) else {
            return false;
        };
        point.place(o, &mut self.scene);
        if let Some(o) = self.objects.get_mut(object) {
            o.set_anchored(Some(anchor));
        }
        true
    }

    /// Unlink an object from its anchor, freeing the anchor; returns the old anchor
    pub fn remove_from_anchor(&mut self, object: ObjectId) -> Option<AnchorId> {
        let o = self.objects.get_mut(object)?;
        let anchor = o.anchored()?;
        o.set_anchored(None);

        if let Some(point) = self.anchors.get_mut(anchor) {
            if point.occupant() == Some(object) {
                point.free(&mut self.scene);
            }
        }
        Some(anchor)
    }

    pub fn closest_anchor(&self, object: ObjectId) -> Option<AnchorId> {
        self.objects
            .get(object)?
            .closest_anchor(&self.anchors, &self.scene)
    }

    /// Free the object's anchor, drop the anchors it carries and make it inert.
    ///
    /// The object stays in the pool and can come back with [`Self::enable_object`].
    pub fn disable_object(&mut self, object: ObjectId) {
        self.remove_from_anchor(object);
        let Some(root) = self.objects.get(object).map(|o| o.root()) else {
            return;
        };
        self.remove_subtree(root);
        if let Some(o) = self.objects.get_mut(object) {
            o.disable(&mut self.scene);
        }
    }

    /// Put a disabled object back under `parent` and rediscover the anchors it carries
    pub fn enable_object(&mut self, object: ObjectId, parent: NodeId) -> Vec<AnchorId> {
        let Some(o) = self.objects.get_mut(object) else {
            tracing::warn!("Cannot enable unknown {}", object);
            return Vec::new();
        };
        if o.active() {
            return Vec::new();
        }
        let root = o.root();
        o.enable();
        self.scene.attach(root, parent);
        self.anchors.discover(&mut self.scene, root)
    }

    /// Drop the anchors owned by nodes of the subtree and unlink their occupants
    pub fn remove_subtree(&mut self, root: NodeId) -> Vec<AnchorId> {
        let removed = self.anchors.remove_subtree(&self.scene, root);
        for (anchor, occupant) in &removed {
            let Some(o) = occupant.and_then(|id| self.objects.get_mut(id)) else {
                continue;
            };
            if o.anchored() == Some(*anchor) {
                o.set_anchored(None);
            }
        }
        if !removed.is_empty() {
            tracing::debug!("Removed {} anchors under {}", removed.len(), root);
        }
        removed.into_iter().map(|(id, _)| id).collect()
    }

    /// New copy of the first object of `kind`, with its own anchors
    pub fn instantiate(&mut self, kind: ObjectKind, parent: NodeId) -> Result<ObjectId> {
        let id = self
            .objects
            .instantiate(kind, &self.factory, &mut self.scene, parent)?;
        if let Some(root) = self.objects.get(id).map(|o| o.root()) {
            self.anchors.discover(&mut self.scene, root);
        }
        Ok(id)
    }

    /// Drop every object, freeing the anchors they occupy and dropping the ones they carry
    pub fn clear_objects(&mut self) {
        let ids: Vec<(ObjectId, NodeId)> = self.objects.iter().map(|o| (o.id(), o.root())).collect();
        for (id, root) in ids {
            self.remove_from_anchor(id);
            self.remove_subtree(root);
        }
        self.objects.clear(&mut self.scene);
    }

    /// Drop objects and anchors; the scene keeps its nodes
    pub fn reset(&mut self) {
        self.clear_objects();
        self.anchors.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labxr_spatial::{Bounds, Transform, Vector3D};

    fn tube(scene: &mut Scene, parent: NodeId, at: Point3D) -> NodeId {
        let tube = scene.spawn(parent, "tube", Transform::from_position(at));
        scene.spawn(tube, "basePoint", Transform::from_position(Point3D::new(0.0, -0.05, 0.0)));
        scene.spawn_with_extent(
            tube,
            "hitSurface",
            Transform::identity(),
            Bounds::aabb_centered(Point3D::ORIGIN, Vector3D::splat(0.02)),
        );
        scene.spawn(tube, "capPoint", Transform::identity());
        tube
    }

    fn bench() -> (Workspace, Vec<ObjectId>, Vec<AnchorId>) {
        let mut ws = Workspace::new(LabConfig::default());
        let root = ws.scene.root();
        let table = ws.scene.spawn(root, "table", Transform::identity());
        ws.scene.spawn(table, "tubeAnchor1", Transform::from_position(Point3D::new(0.0, 1.0, 0.0)));
        ws.scene.spawn(table, "tubeAnchor2", Transform::from_position(Point3D::new(0.2, 1.0, 0.0)));
        tube(&mut ws.scene, table, Point3D::new(0.5, 1.05, 0.0));
        tube(&mut ws.scene, table, Point3D::new(0.7, 1.05, 0.0));
        let (objects, anchors) = ws.populate(root);
        (ws, objects, anchors)
    }

    fn assert_linked(ws: &Workspace) {
        for object in ws.objects.iter() {
            if let Some(anchor) = object.anchored() {
                assert_eq!(ws.anchors.get(anchor).unwrap().occupant(), Some(object.id()));
            }
        }
        for anchor in ws.anchors.iter() {
            if let Some(object) = anchor.occupant() {
                assert_eq!(ws.objects.get(object).unwrap().anchored(), Some(anchor.id()));
            }
        }
    }

    #[test]
    fn test_populate_builds_objects_and_anchors() {
        let (ws, objects, anchors) = bench();
        assert_eq!(objects.len(), 2);
        assert_eq!(anchors.len(), 2);
        assert_eq!(ws.objects.interactables(), objects);
    }

    #[test]
    fn test_place_links_both_sides() {
        let (mut ws, objects, anchors) = bench();
        assert!(ws.place_on_anchor(objects[0], anchors[0]));
        assert_eq!(ws.objects.get(objects[0]).unwrap().anchored(), Some(anchors[0]));
        assert_eq!(ws.anchors.get(anchors[0]).unwrap().occupant(), Some(objects[0]));
        assert_linked(&ws);

        // Moving to another anchor frees the first one
        assert!(ws.place_on_anchor(objects[0], anchors[1]));
        assert!(!ws.anchors.get(anchors[0]).unwrap().occupied());
        assert_linked(&ws);
    }

    #[test]
    fn test_place_on_occupied_anchor_unlinks_previous_occupant() {
        let (mut ws, objects, anchors) = bench();
        ws.place_on_anchor(objects[0], anchors[0]);
        ws.place_on_anchor(objects[1], anchors[0]);

        assert_eq!(ws.anchors.get(anchors[0]).unwrap().occupant(), Some(objects[1]));
        assert_eq!(ws.objects.get(objects[0]).unwrap().anchored(), None);
        assert_linked(&ws);
    }

    #[test]
    fn test_disable_group_keeps_occupants() {
        let (mut ws, objects, anchors) = bench();
        ws.place_on_anchor(objects[0], anchors[0]);
        let other = ws.objects.get(objects[1]).unwrap().root();
        ws.scene.set_world_position(other, Point3D::new(0.2, 1.05, 0.0));
        assert_eq!(ws.closest_anchor(objects[1]), Some(anchors[1]));

        ws.anchors.disable_group(&mut ws.scene, "tubeAnchor");

        assert_eq!(ws.anchors.get(anchors[0]).unwrap().occupant(), Some(objects[0]));
        assert_eq!(ws.objects.get(objects[0]).unwrap().anchored(), Some(anchors[0]));
        assert_eq!(ws.closest_anchor(objects[1]), None);
    }

    #[test]
    fn test_disable_object_frees_anchor() {
        let (mut ws, objects, anchors) = bench();
        ws.place_on_anchor(objects[0], anchors[0]);
        ws.disable_object(objects[0]);

        assert!(!ws.anchors.get(anchors[0]).unwrap().occupied());
        let object = ws.objects.get(objects[0]).unwrap();
        assert!(!object.active());
        assert!(!ws.scene.is_attached(object.root()));
        assert_eq!(ws.objects.interactables(), vec![objects[1]]);
    }

    /// A stand carrying its own anchor, with a pipette resting on it
    fn stand_bench() -> (Workspace, ObjectId, ObjectId, AnchorId) {
        let mut ws = Workspace::new(LabConfig::default());
        let root = ws.scene.root();
        let stand = ws.scene.spawn(root, "stand", Transform::from_position(Point3D::new(0.0, 1.0, 0.0)));
        ws.scene.spawn_with_extent(
            stand,
            "hitSurface",
            Transform::identity(),
            Bounds::aabb_centered(Point3D::ORIGIN, Vector3D::splat(0.05)),
        );
        ws.scene.spawn(stand, "anchorStand1", Transform::from_position(Point3D::new(0.0, 0.1, 0.0)));
        let pipette = ws.scene.spawn(root, "p100", Transform::from_position(Point3D::new(0.0, 1.15, 0.0)));
        ws.scene.spawn_with_extent(
            pipette,
            "hitSurface",
            Transform::identity(),
            Bounds::aabb_centered(Point3D::ORIGIN, Vector3D::splat(0.01)),
        );

        let (objects, anchors) = ws.populate(root);
        let stand = ws.objects.by_root(stand).unwrap();
        let pipette = ws.objects.by_root(pipette).unwrap();
        assert!(objects.contains(&stand) && objects.contains(&pipette));
        assert_eq!(anchors.len(), 1);
        assert!(ws.place_on_anchor(pipette, anchors[0]));
        (ws, stand, pipette, anchors[0])
    }

    #[test]
    fn test_disable_object_drops_carried_anchors() {
        let (mut ws, stand, pipette, anchor) = stand_bench();
        ws.disable_object(stand);

        assert!(ws.anchors.get(anchor).is_none());
        assert_eq!(ws.objects.get(pipette).unwrap().anchored(), None);
        assert_eq!(ws.closest_anchor(pipette), None);
        assert_linked(&ws);

        let root = ws.scene.root();
        let found = ws.enable_object(stand, root);
        assert_eq!(found.len(), 1);
        assert_ne!(found[0], anchor);
        assert!(ws.objects.get(stand).unwrap().active());
        assert!(ws.objects.interactables().contains(&stand));
        assert_eq!(ws.closest_anchor(pipette), Some(found[0]));
    }

    #[test]
    fn test_remove_subtree_unlinks_occupants() {
        let (mut ws, stand, pipette, anchor) = stand_bench();
        let root = ws.objects.get(stand).unwrap().root();

        assert_eq!(ws.remove_subtree(root), vec![anchor]);
        assert!(ws.anchors.is_empty());
        assert_eq!(ws.objects.get(pipette).unwrap().anchored(), None);
        assert_linked(&ws);
    }

    #[test]
    fn test_clear_objects_drops_carried_anchors() {
        let (mut ws, _, _, _) = stand_bench();
        ws.clear_objects();
        assert!(ws.anchors.is_empty());
    }

    #[test]
    fn test_clear_and_instantiate() {
        let (mut ws, objects, anchors) = bench();
        ws.place_on_anchor(objects[1], anchors[1]);
        ws.clear_objects();

        assert!(ws.objects.is_empty());
        assert!(ws.anchors.iter().all(|a| !a.occupied()));

        let root = ws.scene.root();
        let id = ws.instantiate(ObjectKind::Tube, root).unwrap();
        assert!(ws.place_on_anchor(id, anchors[0]));
        assert_linked(&ws);

        ws.reset();
        assert!(ws.anchors.is_empty());
        assert!(ws.objects.is_empty());
    }
}
