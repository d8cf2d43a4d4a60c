use std::fmt;

use labxr_spatial::{Point3D, Quaternion, Scene, NodeId, Transform};

use super::{AnchorId, AnchorKind, CapabilityFilter};
use crate::object::{ManipulableObject, ObjectId, ObjectKind};

/// Occupancy change reported to anchor listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorNotice {
    Occupied { anchor: AnchorId, object: ObjectId },
    Freed { anchor: AnchorId, object: Option<ObjectId> },
}

type Listener = Box<dyn FnMut(&AnchorNotice)>;

/// A named slot that holds at most one object
pub struct AnchorPoint {
    pub(crate) id: AnchorId,
    name: String,
    node: NodeId,
    kind: Option<AnchorKind>,
    filter: CapabilityFilter,
    min_distance: f32,
    enabled: bool,
    show_marker: bool,
    occupant: Option<ObjectId>,
    occupied_listeners: Vec<Listener>,
    freed_listeners: Vec<Listener>,
}

impl fmt::Debug for AnchorPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnchorPoint")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("node", &self.node)
            .field("kind", &self.kind)
            .field("filter", &self.filter)
            .field("min_distance", &self.min_distance)
            .field("enabled", &self.enabled)
            .field("occupant", &self.occupant)
            .field("listeners", &(self.occupied_listeners.len() + self.freed_listeners.len()))
            .finish()
    }
}

impl AnchorPoint {
    /// Anchor accepting any object, owned by `node`
    pub fn new(name: impl Into<String>, node: NodeId, min_distance: f32) -> Self {
        Self {
            id: AnchorId::UNREGISTERED,
            name: name.into(),
            node,
            kind: None,
            filter: CapabilityFilter::Any,
            min_distance,
            enabled: true,
            show_marker: false,
            occupant: None,
            occupied_listeners: Vec::new(),
            freed_listeners: Vec::new(),
        }
    }

    /// Anchor carrying the rule of `kind`
    pub fn with_kind(name: impl Into<String>, node: NodeId, kind: AnchorKind, min_distance: f32) -> Self {
        let rule = kind.rule();
        Self {
            kind: Some(kind),
            filter: rule.filter,
            ..Self::new(name, node, rule.min_distance.unwrap_or(min_distance))
        }
    }

    pub fn with_filter(mut self, filter: CapabilityFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_marker(mut self, show_marker: bool) -> Self {
        self.show_marker = show_marker;
        self
    }

    pub fn id(&self) -> AnchorId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn kind(&self) -> Option<AnchorKind> {
        self.kind
    }

    pub fn filter(&self) -> &CapabilityFilter {
        &self.filter
    }

    pub fn min_distance(&self) -> f32 {
        self.min_distance
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn occupied(&self) -> bool {
        self.occupant.is_some()
    }

    pub fn occupant(&self) -> Option<ObjectId> {
        self.occupant
    }

    pub fn position(&self, scene: &Scene) -> Point3D {
        scene.world_position(self.node)
    }

    pub fn rotation(&self, scene: &Scene) -> Quaternion {
        scene.world_rotation(self.node)
    }

    pub fn world_transform(&self, scene: &Scene) -> Transform {
        scene.world_transform(self.node)
    }

    pub fn includes(&self, kind: ObjectKind) -> bool {
        self.filter.includes(kind)
    }

    /// Enabled, free and accepting `kind`
    pub fn accepts(&self, kind: ObjectKind) -> bool {
        self.enabled && !self.occupied() && self.includes(kind)
    }

    pub fn on_occupied(&mut self, listener: impl FnMut(&AnchorNotice) + 'static) {
        self.occupied_listeners.push(Box::new(listener));
    }

    pub fn on_freed(&mut self, listener: impl FnMut(&AnchorNotice) + 'static) {
        self.freed_listeners.push(Box::new(listener));
    }

    /// Snap `object` onto this anchor and mark it as the occupant.
    ///
    /// Placing onto an occupied, disabled or non-accepting anchor is logged
    /// and still carried out.
    pub fn place(&mut self, object: &ManipulableObject, scene: &mut Scene) {
        if self.occupied() {
            tracing::warn!("Anchor {} is occupied; object will still be placed on", self.name);
        }
        if !self.enabled {
            tracing::warn!("Anchor {} is not enabled; object will still be placed on", self.name);
        }
        if !self.includes(object.kind()) {
            tracing::warn!(
                "Anchor {} does not allow '{}'; object will still be placed on",
                self.name,
                object.kind()
            );
        }

        let pose = object.anchored_transform(self, scene);
        scene.set_world_transform(object.root(), pose);

        self.occupant = Some(object.id());
        scene.set_visible(self.node, false);
        tracing::debug!(anchor = %self.name, object = %object.id(), "anchor occupied");

        let notice = AnchorNotice::Occupied {
            anchor: self.id,
            object: object.id(),
        };
        for listener in self.occupied_listeners.iter_mut() {
            listener(&notice);
        }
    }

    /// Clear the occupant, returning it
    pub fn free(&mut self, scene: &mut Scene) -> Option<ObjectId> {
        let previous = self.occupant.take();
        scene.set_visible(self.node, self.show_marker && self.enabled);
        tracing::debug!(anchor = %self.name, "anchor freed");

        let notice = AnchorNotice::Freed {
            anchor: self.id,
            object: previous,
        };
        for listener in self.freed_listeners.iter_mut() {
            listener(&notice);
        }
        previous
    }

    /// Accept objects again; an occupant keeps the marker hidden
    pub fn enable(&mut self, scene: &mut Scene) {
        self.enabled = true;
        scene.set_visible(self.node, self.show_marker && !self.occupied());
    }

    /// Stop accepting objects; a current occupant stays in place
    pub fn disable(&mut self, scene: &mut Scene) {
        self.enabled = false;
        scene.set_visible(self.node, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use labxr_spatial::Vector3D;

    use crate::object::ObjectFactory;

    fn bench() -> (Scene, NodeId, ManipulableObject) {
        let mut scene = Scene::new();
        let anchor_node = scene.spawn(
            scene.root(),
            "tubeAnchor",
            Transform::from_position_rotation(
                Point3D::new(1.0, 1.0, 0.0),
                Quaternion::from_axis_angle(Vector3D::UP, 0.5),
            ),
        );
        let tube = scene.spawn(scene.root(), "tube", Transform::from_position(Point3D::new(0.0, 2.0, 0.0)));
        scene.spawn(tube, "basePoint", Transform::from_position(Point3D::new(0.0, -0.05, 0.0)));
        let object = ObjectFactory::new().build(&mut scene, tube).unwrap();
        (scene, anchor_node, object)
    }

    #[test]
    fn test_place_puts_base_on_anchor() {
        let (mut scene, node, object) = bench();
        let mut anchor = AnchorPoint::with_kind("tubeAnchor", node, AnchorKind::Tube, 0.1);

        anchor.place(&object, &mut scene);

        assert!(anchor.occupied());
        assert_eq!(anchor.occupant(), Some(object.id()));
        assert!(object.base_world_position(&scene).approx_eq(&anchor.position(&scene)));
        assert!(scene.world_rotation(object.root()).approx_eq(&anchor.rotation(&scene)));
        assert!(!scene.is_visible(node));
    }

    #[test]
    fn test_place_is_permissive() {
        let (mut scene, node, object) = bench();
        let mut anchor = AnchorPoint::with_kind("anchorSPH", node, AnchorKind::Sph, 0.1);
        anchor.disable(&mut scene);

        assert!(!anchor.includes(object.kind()));
        anchor.place(&object, &mut scene);
        assert!(anchor.occupied());
    }

    #[test]
    fn test_notifications() {
        let (mut scene, node, object) = bench();
        let mut anchor = AnchorPoint::new("slot", node, 0.1);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&seen);
        anchor.on_occupied(move |n| log.borrow_mut().push(*n));
        let log = Rc::clone(&seen);
        anchor.on_freed(move |n| log.borrow_mut().push(*n));

        anchor.place(&object, &mut scene);
        assert_eq!(anchor.free(&mut scene), Some(object.id()));
        assert!(!anchor.occupied());

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert!(matches!(seen[0], AnchorNotice::Occupied { .. }));
        assert!(matches!(seen[1], AnchorNotice::Freed { object: Some(_), .. }));
    }

    #[test]
    fn test_disable_keeps_occupant() {
        let (mut scene, node, object) = bench();
        let mut anchor = AnchorPoint::new("slot", node, 0.1);
        anchor.place(&object, &mut scene);
        anchor.disable(&mut scene);

        assert!(anchor.occupied());
        assert!(!anchor.enabled());
        assert!(!anchor.accepts(ObjectKind::Tube));
    }

    #[test]
    fn test_marker_visibility_follows_state() {
        let (mut scene, node, object) = bench();
        let mut anchor = AnchorPoint::new("slot", node, 0.1).with_marker(true);
        anchor.enable(&mut scene);
        assert!(scene.is_visible(node));

        anchor.place(&object, &mut scene);
        assert!(!scene.is_visible(node));

        anchor.free(&mut scene);
        assert!(scene.is_visible(node));
    }
}
