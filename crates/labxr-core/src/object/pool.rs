use std::collections::{BTreeMap, HashMap};

use labxr_spatial::{NodeId, Scene};

use super::behavior::Hook;
use super::{ManipulableObject, ObjectFactory, ObjectId, ObjectKind};
use crate::error::{LabError, Result};

/// Every live object of the workspace plus one template per kind
#[derive(Debug)]
pub struct ObjectPool {
    objects: BTreeMap<ObjectId, ManipulableObject>,
    templates: HashMap<ObjectKind, NodeId>,
    next_id: u64,
}

impl Default for ObjectPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectPool {
    pub fn new() -> Self {
        Self {
            objects: BTreeMap::new(),
            templates: HashMap::new(),
            next_id: 1,
        }
    }

    /// Take ownership of `object`, enable it and return its id.
    ///
    /// The first object of a kind becomes the template for [`Self::instantiate`].
    pub fn add(&mut self, mut object: ManipulableObject) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        object.id = id;
        object.enable();
        self.templates.entry(object.kind()).or_insert(object.root());
        tracing::debug!(object = %id, kind = %object.kind(), "object added");
        self.objects.insert(id, object);
        id
    }

    pub fn get(&self, id: ObjectId) -> Option<&ManipulableObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut ManipulableObject> {
        self.objects.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ManipulableObject> {
        self.objects.values()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Object whose root is `node`
    pub fn by_root(&self, node: NodeId) -> Option<ObjectId> {
        self.objects.values().find(|o| o.root() == node).map(|o| o.id())
    }

    pub fn template(&self, kind: ObjectKind) -> Option<NodeId> {
        self.templates.get(&kind).copied()
    }

    /// Active objects that can currently be pointed at and picked up
    pub fn interactables(&self) -> Vec<ObjectId> {
        self.objects
            .values()
            .filter(|o| o.active() && o.interaction_enabled() && o.is_interactable())
            .map(|o| o.id())
            .collect()
    }

    /// Run the per-frame hook of every active object
    pub fn update(&mut self, scene: &mut Scene) {
        for object in self.objects.values_mut().filter(|o| o.active()) {
            object.fire(Hook::Update, scene);
        }
    }

    /// Copy the template of `kind` under `parent` and add the copy as a new object
    pub fn instantiate(
        &mut self,
        kind: ObjectKind,
        factory: &ObjectFactory,
        scene: &mut Scene,
        parent: NodeId,
    ) -> Result<ObjectId> {
        let template = self.template(kind).ok_or(LabError::MissingTemplate(kind))?;
        let copy = scene
            .clone_subtree(template, parent)
            .ok_or(LabError::UnknownNode(template))?;
        scene.set_visible(copy, true);
        let object = factory.build(scene, copy)?;
        Ok(self.add(object))
    }

    /// Remove one object, disabling it first
    pub fn remove(&mut self, id: ObjectId, scene: &mut Scene) -> Option<ManipulableObject> {
        let mut object = self.objects.remove(&id)?;
        object.disable(scene);
        Some(object)
    }

    /// Disable and drop every object; templates stay available
    pub fn clear(&mut self, scene: &mut Scene) {
        for object in self.objects.values_mut() {
            object.disable(scene);
        }
        tracing::info!("Cleared {} objects", self.objects.len());
        self.objects.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labxr_spatial::{Bounds, Point3D, Transform, Vector3D};

    fn tube_node(scene: &mut Scene) -> NodeId {
        let tube = scene.spawn(scene.root(), "tube", Transform::from_position(Point3D::new(0.0, 1.0, 0.0)));
        scene.spawn_with_extent(
            tube,
            "hitSurface",
            Transform::identity(),
            Bounds::aabb_centered(Point3D::ORIGIN, Vector3D::splat(0.02)),
        );
        scene.spawn(tube, "capPoint", Transform::identity());
        tube
    }

    #[test]
    fn test_add_assigns_ids_and_templates() {
        let mut scene = Scene::new();
        let factory = ObjectFactory::new();
        let mut pool = ObjectPool::new();

        let first = tube_node(&mut scene);
        let second = tube_node(&mut scene);
        let a = pool.add(factory.build(&mut scene, first).unwrap());
        let b = pool.add(factory.build(&mut scene, second).unwrap());

        assert_eq!(a.value(), 1);
        assert_eq!(b.value(), 2);
        assert!(pool.get(a).unwrap().active());
        assert_eq!(pool.template(ObjectKind::Tube), Some(first));
        assert_eq!(pool.by_root(second), Some(b));
    }

    #[test]
    fn test_interactables_skip_held_and_inert() {
        let mut scene = Scene::new();
        let factory = ObjectFactory::new();
        let mut pool = ObjectPool::new();
        let a = tube_node(&mut scene);
        let b = tube_node(&mut scene);
        let a = pool.add(factory.build(&mut scene, a).unwrap());
        let b = pool.add(factory.build(&mut scene, b).unwrap());
        let clock = scene.spawn(scene.root(), "clock", Transform::identity());
        pool.add(factory.build(&mut scene, clock).unwrap());

        assert_eq!(pool.interactables(), vec![a, b]);
        pool.get_mut(a).unwrap().set_interaction_enabled(false);
        assert_eq!(pool.interactables(), vec![b]);
    }

    #[test]
    fn test_instantiate_after_clear() {
        let mut scene = Scene::new();
        let factory = ObjectFactory::new();
        let mut pool = ObjectPool::new();
        let node = tube_node(&mut scene);
        pool.add(factory.build(&mut scene, node).unwrap());

        pool.clear(&mut scene);
        assert!(pool.is_empty());
        assert!(!scene.is_attached(node));

        let root = scene.root();
        let id = pool.instantiate(ObjectKind::Tube, &factory, &mut scene, root).unwrap();
        let copy = pool.get(id).unwrap();
        assert_ne!(copy.root(), node);
        assert!(scene.is_attached(copy.root()));
        assert_eq!(copy.hit_surfaces().len(), 1);
        assert_eq!(copy.interaction_points().len(), 1);
    }

    #[test]
    fn test_instantiate_without_template() {
        let mut scene = Scene::new();
        let mut pool = ObjectPool::new();
        let root = scene.root();
        assert!(matches!(
            pool.instantiate(ObjectKind::Vortex, &ObjectFactory::new(), &mut scene, root),
            Err(LabError::MissingTemplate(ObjectKind::Vortex))
        ));
    }
}
