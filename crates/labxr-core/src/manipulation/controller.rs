use std::cmp::Ordering;
use std::time::Duration;

use labxr_config::ManipulationConfig;
use labxr_input::{ControllerEvent, Handedness, HapticPulse};
use labxr_spatial::{NodeId, Point3D, Ray, Scene, Transform, Vector3D};

use super::session::{GrabSession, GrabState};
use super::{ControllerState, ManipulationEvent};
use crate::object::{Hook, ObjectId};
use crate::workspace::Workspace;

/// One hand: points at objects, grabs them and brings them back.
///
/// The controller owns two scene nodes. The grip node follows the tracked
/// pose and casts the pointing ray along its forward axis; the holding node
/// sits in front of it and is where held objects attach.
#[derive(Debug)]
pub struct ManipulationController {
    hand: Handedness,
    grip: NodeId,
    holding: NodeId,
    highlighted: Option<(ObjectId, NodeId)>,
    session: Option<GrabSession>,
    grab_step: f32,
    release_step: f32,
    grab_pulse: (f32, Duration),
    haptics: Vec<HapticPulse>,
    events: Vec<ManipulationEvent>,
}

impl ManipulationController {
    pub fn new(hand: Handedness, scene: &mut Scene, config: &ManipulationConfig) -> Self {
        let grip = scene.spawn(scene.root(), format!("{}Controller", hand), Transform::identity());
        let holding = scene.spawn(
            grip,
            "holdingNode",
            Transform::from_position((Vector3D::FORWARD * config.holding_offset).to_point()),
        );
        let defaults = ManipulationConfig::default();
        Self {
            hand,
            grip,
            holding,
            highlighted: None,
            session: None,
            grab_step: flight_step("grab_step", config.grab_step, defaults.grab_step),
            release_step: flight_step("release_step", config.release_step, defaults.release_step),
            grab_pulse: (config.grab_pulse_intensity, config.grab_pulse_duration()),
            haptics: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn hand(&self) -> Handedness {
        self.hand
    }

    pub fn grip_node(&self) -> NodeId {
        self.grip
    }

    pub fn holding_node(&self) -> NodeId {
        self.holding
    }

    /// Move the grip node to the tracked controller pose
    pub fn set_pose(&self, scene: &mut Scene, pose: Transform) {
        scene.set_world_transform(self.grip, pose);
    }

    pub fn state(&self) -> ControllerState {
        match (&self.session, self.highlighted) {
            (Some(s), _) => match s.state {
                GrabState::Grabbing => ControllerState::Grabbing,
                GrabState::Grabbed => ControllerState::Grabbed,
                GrabState::Releasing => ControllerState::Releasing,
            },
            (None, Some(_)) => ControllerState::Highlighting,
            (None, None) => ControllerState::Idle,
        }
    }

    /// Highlighted object and the hit surface the ray touches
    pub fn highlighted(&self) -> Option<(ObjectId, NodeId)> {
        self.highlighted
    }

    pub fn session(&self) -> Option<&GrabSession> {
        self.session.as_ref()
    }

    /// Object currently owned by this hand
    pub fn held_object(&self) -> Option<ObjectId> {
        self.session.as_ref().filter(|s| s.holding()).map(|s| s.object)
    }

    /// Queue a vibration on this hand
    pub fn pulse(&mut self, intensity: f32, duration: Duration) {
        self.haptics.push(HapticPulse::new(self.hand, intensity, duration));
    }

    pub fn drain_haptics(&mut self) -> Vec<HapticPulse> {
        std::mem::take(&mut self.haptics)
    }

    pub fn drain_events(&mut self) -> Vec<ManipulationEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn handle_event(&mut self, ws: &mut Workspace, event: ControllerEvent) {
        tracing::trace!(hand = %self.hand, ?event, "controller event");
        match event {
            ControllerEvent::GripDown => self.grip_down(ws),
            ControllerEvent::GripUp => self.grip_up(ws),
            ControllerEvent::TriggerDown => {
                if let Some((id, surface)) = self.highlighted {
                    if let Some(object) = ws.objects.get_mut(id) {
                        object.fire(Hook::TriggerDown(surface), &mut ws.scene);
                    }
                }
            }
            ControllerEvent::TriggerUp => {}
            ControllerEvent::JoystickDown => self.fire_on_held(ws, Hook::JoystickDown),
            ControllerEvent::ThumbButtonDown => self.fire_on_held(ws, Hook::ThumbButtonDown),
        }
    }

    /// Advance by one frame
    pub fn update(&mut self, ws: &mut Workspace) {
        let Some(mut session) = self.session.take() else {
            self.update_highlight(ws);
            return;
        };

        let alive = ws.objects.get(session.object).is_some_and(|o| o.active());
        if !alive {
            tracing::warn!(hand = %self.hand, "{} vanished during a grab", session.object);
            if let Some(placeholder) = session.placeholder {
                ws.scene.set_visible(placeholder, false);
            }
            if let Some(object) = ws.objects.get_mut(session.object) {
                object.set_controller(None);
                object.set_interaction_enabled(true);
            }
            if self.highlighted.is_some_and(|(id, _)| id == session.object) {
                self.highlighted = None;
            }
            return;
        }

        session.elapsed_frames += 1;
        let keep = match session.state {
            GrabState::Grabbing => {
                self.tick_grabbing(ws, &mut session);
                true
            }
            GrabState::Grabbed => {
                self.tick_grabbed(ws, &mut session);
                true
            }
            GrabState::Releasing => !self.tick_releasing(ws, &mut session),
        };
        if keep {
            self.session = Some(session);
        }
    }

    fn fire_on_held(&mut self, ws: &mut Workspace, hook: Hook) {
        let Some(id) = self.held_object() else {
            return;
        };
        if let Some(object) = ws.objects.get_mut(id) {
            object.fire(hook, &mut ws.scene);
        }
    }

    fn update_highlight(&mut self, ws: &mut Workspace) {
        let previous = self.highlighted.take();
        if let Some((id, _)) = previous {
            if let Some(object) = ws.objects.get_mut(id) {
                object.highlight(false, None);
            }
        }

        let ray = Ray::from_pose(&ws.scene.world_transform(self.grip));
        let viewer = ws.viewer;
        let nearest = ws
            .objects
            .interactables()
            .into_iter()
            .filter_map(|id| ws.objects.get(id)?.ray_intersection(&ray, &ws.scene))
            .min_by(|a, b| {
                a.point
                    .distance(&viewer)
                    .partial_cmp(&b.point.distance(&viewer))
                    .unwrap_or(Ordering::Equal)
            });

        if let Some(hit) = nearest {
            if let Some(object) = ws.objects.get_mut(hit.object) {
                object.highlight(true, Some(hit.surface));
            }
            self.highlighted = Some((hit.object, hit.surface));
        }

        let now = self.highlighted.map(|(id, _)| id);
        if previous.map(|(id, _)| id) != now {
            tracing::debug!(hand = %self.hand, object = ?now, "highlight changed");
            self.events.push(ManipulationEvent::Highlighted {
                hand: self.hand,
                object: now,
            });
        }
    }

    fn grip_down(&mut self, ws: &mut Workspace) {
        if self.session.is_some() {
            return;
        }
        let Some((id, _)) = self.highlighted else {
            return;
        };
        let Some(object) = ws.objects.get_mut(id) else {
            return;
        };
        if !object.is_interactable() || !object.interaction_enabled() || object.grabbed() {
            tracing::debug!(hand = %self.hand, object = %id, "object is not available");
            return;
        }

        object.fire(Hook::GripDown, &mut ws.scene);
        if !object.grabbable() {
            return;
        }

        let root = object.root();
        let parking = ws.scene.world_transform(root);
        let original_parent = ws.scene.parent(root);
        if let Some(anchor) = ws.remove_from_anchor(id) {
            tracing::debug!(object = %id, %anchor, "lifted from anchor");
        }

        let Some(object) = ws.objects.get_mut(id) else {
            return;
        };
        let placeholder = object.placeholder(&mut ws.scene);
        object.highlight(false, None);
        object.set_interaction_enabled(false);
        object.set_controller(Some(self.hand));
        self.highlighted = None;

        let (intensity, duration) = self.grab_pulse;
        self.pulse(intensity, duration);
        self.session = Some(GrabSession::grabbing(
            id,
            self.grab_step,
            parking,
            original_parent,
            placeholder,
        ));
        tracing::debug!(hand = %self.hand, object = %id, "grab started");
        self.events.push(ManipulationEvent::GrabStarted {
            hand: self.hand,
            object: id,
        });
    }

    fn tick_grabbing(&mut self, ws: &mut Workspace, session: &mut GrabSession) {
        let Some(object) = ws.objects.get_mut(session.object) else {
            return;
        };
        let root = object.root();
        let target = ws.scene.world_position(self.holding);
        let current = object.holding_point_world(&ws.scene);
        let (next, arrived) = current.step_toward(&target, session.step);
        ws.scene.translate_world(root, next - current);
        if !arrived {
            return;
        }

        // Parent under the holding node so both holding points coincide
        let (point, rotation) = object.holding_offset(&ws.scene);
        let scale = ws
            .scene
            .world_transform(root)
            .scale
            .div_elements(&ws.scene.world_transform(self.holding).scale);
        let rotation = rotation.inverse();
        ws.scene.set_parent(root, self.holding);
        ws.scene.set_local_transform(
            root,
            Transform {
                position: Point3D::ORIGIN - rotation.rotate_vector(point.mul_elements(&scale)),
                rotation,
                scale,
            },
        );

        session.enter(GrabState::Grabbed);
        object.fire(Hook::Grabbed, &mut ws.scene);
        tracing::debug!(hand = %self.hand, object = %session.object, "grabbed");
        self.events.push(ManipulationEvent::Grabbed {
            hand: self.hand,
            object: session.object,
        });
    }

    fn tick_grabbed(&mut self, ws: &mut Workspace, session: &mut GrabSession) {
        let Some(object) = ws.objects.get_mut(session.object) else {
            return;
        };

        let near = object.closest_anchor(&ws.anchors, &ws.scene);
        if near != session.near_anchor {
            tracing::debug!(hand = %self.hand, object = %session.object, anchor = ?near, "near anchor changed");
            session.near_anchor = near;
        }

        if let Some(placeholder) = session.placeholder {
            match near.and_then(|a| ws.anchors.get(a)) {
                Some(anchor) => {
                    let pose = object.anchored_transform(anchor, &ws.scene);
                    ws.scene.set_world_transform(placeholder, pose);
                    ws.scene.set_visible(placeholder, true);
                }
                None => ws.scene.set_visible(placeholder, false),
            }
        }

        object.fire(Hook::WhileGrabbed, &mut ws.scene);
    }

    /// Start the release flight. A grip released mid-grab sends the object back as well.
    fn grip_up(&mut self, ws: &mut Workspace) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if !session.holding() {
            return;
        }
        let Some(object) = ws.objects.get_mut(session.object) else {
            return;
        };

        if session.state == GrabState::Grabbed {
            session.near_anchor = object.closest_anchor(&ws.anchors, &ws.scene);
        }

        let root = object.root();
        let parent = session
            .original_parent
            .filter(|p| ws.scene.contains(*p))
            .unwrap_or_else(|| ws.scene.root());
        ws.scene.attach(root, parent);
        ws.scene.set_world_rotation(root, session.parking.rotation);

        session.destination = match session.near_anchor.and_then(|a| ws.anchors.get(a)) {
            Some(anchor) => object.anchored_transform(anchor, &ws.scene),
            None => session.parking,
        };
        if let Some(placeholder) = session.placeholder {
            ws.scene.set_visible(placeholder, false);
        }
        object.set_controller(None);

        session.enter(GrabState::Releasing);
        session.step = self.release_step;
        object.fire(Hook::Dropped, &mut ws.scene);
        tracing::debug!(hand = %self.hand, object = %session.object, anchor = ?session.near_anchor, "dropped");
        self.events.push(ManipulationEvent::Dropped {
            hand: self.hand,
            object: session.object,
            near_anchor: session.near_anchor,
        });
    }

    /// Returns true once the object has settled
    fn tick_releasing(&mut self, ws: &mut Workspace, session: &mut GrabSession) -> bool {
        let id = session.object;
        let Some(root) = ws.objects.get(id).map(|o| o.root()) else {
            return true;
        };

        let current = ws.scene.world_position(root);
        let (next, arrived) = current.step_toward(&session.destination.position, session.step);
        ws.scene.set_world_position(root, next);
        if !arrived {
            return false;
        }

        // Another hand may have filled the anchor during the flight
        let anchor = session.near_anchor.filter(|a| {
            ws.anchors
                .get(*a)
                .is_some_and(|p| p.occupant().map_or(true, |o| o == id))
        });
        let placed = match anchor {
            Some(anchor) => ws.place_on_anchor(id, anchor),
            None => false,
        };
        if !placed {
            ws.scene.set_world_transform(root, session.parking);
        }

        let anchor = anchor.filter(|_| placed);
        if let Some(object) = ws.objects.get_mut(id) {
            object.set_interaction_enabled(true);
            object.fire(Hook::Released, &mut ws.scene);
        }
        tracing::debug!(hand = %self.hand, object = %id, anchor = ?anchor, "released");
        self.events.push(ManipulationEvent::Released {
            hand: self.hand,
            object: id,
            anchor,
        });
        true
    }
}

/// Flights only finish with a positive per-frame step
fn flight_step(name: &str, value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        return value;
    }
    tracing::warn!("{} must be positive, got {}; using {}", name, value, fallback);
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;
    use labxr_config::LabConfig;
    use labxr_spatial::{Bounds, Quaternion};

    use crate::anchor::AnchorId;

    struct Bench {
        ws: Workspace,
        hand: ManipulationController,
        tube: ObjectId,
        anchor: AnchorId,
    }

    /// A tube resting on its anchor in front of a right hand at the origin
    fn bench() -> Bench {
        let mut ws = Workspace::new(LabConfig::default());
        let root = ws.scene.root();
        ws.scene.spawn(root, "tubeAnchor1", Transform::from_position(Point3D::new(0.0, 0.0, 1.0)));
        let tube = ws.scene.spawn(root, "tube", Transform::from_position(Point3D::new(0.0, 0.05, 1.0)));
        ws.scene.spawn(tube, "basePoint", Transform::from_position(Point3D::new(0.0, -0.05, 0.0)));
        ws.scene.spawn(tube, "holdingPoint", Transform::from_position(Point3D::new(0.0, 0.02, 0.0)));
        ws.scene.spawn(tube, "capPoint", Transform::from_position(Point3D::new(0.0, 0.05, 0.0)));
        ws.scene.spawn_with_extent(
            tube,
            "hitSurface",
            Transform::identity(),
            Bounds::aabb_centered(Point3D::ORIGIN, Vector3D::new(0.02, 0.06, 0.02)),
        );
        let (objects, anchors) = ws.populate(root);
        assert!(ws.place_on_anchor(objects[0], anchors[0]));

        let config = ws.config().manipulation.clone();
        let hand = ManipulationController::new(Handedness::Right, &mut ws.scene, &config);
        hand.set_pose(&mut ws.scene, Transform::from_position(Point3D::new(0.0, 0.05, 0.0)));
        Bench {
            ws,
            hand,
            tube: objects[0],
            anchor: anchors[0],
        }
    }

    fn run_until(bench: &mut Bench, state: ControllerState, max_frames: usize) -> usize {
        for frame in 0..max_frames {
            if bench.hand.state() == state {
                return frame;
            }
            bench.hand.update(&mut bench.ws);
        }
        panic!("controller never reached {:?}", state);
    }

    fn root(bench: &Bench) -> NodeId {
        bench.ws.objects.get(bench.tube).unwrap().root()
    }

    #[test]
    fn test_highlight_picks_pointed_object() {
        let mut b = bench();
        b.hand.update(&mut b.ws);
        assert_eq!(b.hand.state(), ControllerState::Highlighting);
        assert_eq!(b.hand.highlighted().map(|h| h.0), Some(b.tube));
        assert!(b.ws.objects.get(b.tube).unwrap().is_highlighted());

        // Point away
        b.hand.set_pose(
            &mut b.ws.scene,
            Transform::from_position_rotation(
                Point3D::new(0.0, 0.05, 0.0),
                Quaternion::from_axis_angle(Vector3D::UP, std::f32::consts::PI),
            ),
        );
        b.hand.update(&mut b.ws);
        assert_eq!(b.hand.state(), ControllerState::Idle);
        assert!(!b.ws.objects.get(b.tube).unwrap().is_highlighted());

        let events = b.hand.drain_events();
        assert_eq!(
            events,
            vec![
                ManipulationEvent::Highlighted {
                    hand: Handedness::Right,
                    object: Some(b.tube)
                },
                ManipulationEvent::Highlighted {
                    hand: Handedness::Right,
                    object: None
                },
            ]
        );
    }

    #[test]
    fn test_grip_down_lifts_from_anchor() {
        let mut b = bench();
        b.hand.update(&mut b.ws);
        b.hand.handle_event(&mut b.ws, ControllerEvent::GripDown);

        assert_eq!(b.hand.state(), ControllerState::Grabbing);
        let tube = b.ws.objects.get(b.tube).unwrap();
        assert_eq!(tube.controller(), Some(Handedness::Right));
        assert!(!tube.interaction_enabled());
        assert!(!tube.is_highlighted());
        assert_eq!(tube.anchored(), None);
        assert!(!b.ws.anchors.get(b.anchor).unwrap().occupied());

        let pulses = b.hand.drain_haptics();
        assert_eq!(pulses.len(), 1);
        assert_eq!(pulses[0].hand, Handedness::Right);
        assert!(b.hand.drain_haptics().is_empty());
    }

    #[test]
    fn test_grabbing_moves_continuously_until_arrival() {
        let mut b = bench();
        b.hand.update(&mut b.ws);
        b.hand.handle_event(&mut b.ws, ControllerEvent::GripDown);

        let step = b.ws.config().manipulation.grab_step;
        let holding = b.hand.holding_node();
        let mut last = b.ws.objects.get(b.tube).unwrap().holding_point_world(&b.ws.scene);
        for _ in 0..100 {
            b.hand.update(&mut b.ws);
            let now = b.ws.objects.get(b.tube).unwrap().holding_point_world(&b.ws.scene);
            assert!(now.distance(&last) <= step + 1e-4);
            last = now;

            let remaining = now.distance(&b.ws.scene.world_position(holding));
            if b.hand.state() == ControllerState::Grabbed {
                assert!(remaining < 1e-4);
                break;
            }
            assert!(remaining > 0.0);
        }
        assert_eq!(b.hand.state(), ControllerState::Grabbed);
        assert_eq!(b.ws.scene.parent(root(&b)), Some(holding));

        // The object now follows the hand
        b.hand.set_pose(&mut b.ws.scene, Transform::from_position(Point3D::new(0.3, 0.5, 0.0)));
        let held = b.ws.objects.get(b.tube).unwrap().holding_point_world(&b.ws.scene);
        assert!(held.approx_eq(&b.ws.scene.world_position(holding)));
    }

    #[test]
    fn test_release_without_anchor_restores_parking_pose() {
        let mut b = bench();
        b.ws.anchors.disable_group(&mut b.ws.scene, "tubeAnchor");
        let parking = b.ws.scene.world_transform(root(&b));

        b.hand.update(&mut b.ws);
        b.hand.handle_event(&mut b.ws, ControllerEvent::GripDown);
        run_until(&mut b, ControllerState::Grabbed, 100);
        b.hand.set_pose(&mut b.ws.scene, Transform::from_position(Point3D::new(0.5, 0.5, 0.5)));
        b.hand.update(&mut b.ws);

        b.hand.handle_event(&mut b.ws, ControllerEvent::GripUp);
        assert_eq!(b.hand.state(), ControllerState::Releasing);
        assert_eq!(b.ws.scene.parent(root(&b)), Some(b.ws.scene.root()));
        run_until(&mut b, ControllerState::Idle, 100);

        assert!(b.ws.scene.world_transform(root(&b)).approx_eq(&parking));
        let tube = b.ws.objects.get(b.tube).unwrap();
        assert!(tube.interaction_enabled());
        assert_eq!(tube.controller(), None);
        assert_eq!(tube.anchored(), None);
        assert!(b.hand.session().is_none());
    }

    #[test]
    fn test_grab_release_round_trip_reanchors() {
        let mut b = bench();
        b.hand.update(&mut b.ws);
        b.hand.handle_event(&mut b.ws, ControllerEvent::GripDown);
        run_until(&mut b, ControllerState::Grabbed, 100);

        // Bring the hand back above the anchor
        b.hand.set_pose(&mut b.ws.scene, Transform::from_position(Point3D::new(0.0, 0.1, 0.92)));
        b.hand.update(&mut b.ws);
        assert_eq!(b.hand.session().unwrap().near_anchor, Some(b.anchor));
        let placeholder = b.hand.session().unwrap().placeholder.unwrap();
        assert!(b.ws.scene.is_visible(placeholder));

        b.hand.handle_event(&mut b.ws, ControllerEvent::GripUp);
        assert!(!b.ws.scene.is_visible(placeholder));
        run_until(&mut b, ControllerState::Idle, 100);

        let tube = b.ws.objects.get(b.tube).unwrap();
        assert_eq!(tube.anchored(), Some(b.anchor));
        assert_eq!(b.ws.anchors.get(b.anchor).unwrap().occupant(), Some(b.tube));
        let anchor_pos = b.ws.anchors.get(b.anchor).unwrap().position(&b.ws.scene);
        assert!(tube.base_world_position(&b.ws.scene).approx_eq(&anchor_pos));

        let events = b.hand.drain_events();
        assert!(matches!(
            events.last(),
            Some(ManipulationEvent::Released { anchor: Some(a), .. }) if *a == b.anchor
        ));
        assert!(events
            .iter()
            .any(|e| matches!(e, ManipulationEvent::Dropped { near_anchor: Some(_), .. })));
    }

    #[test]
    fn test_grip_up_while_idle_is_ignored() {
        let mut b = bench();
        b.hand.handle_event(&mut b.ws, ControllerEvent::GripUp);
        b.hand.handle_event(&mut b.ws, ControllerEvent::TriggerUp);
        assert_eq!(b.hand.state(), ControllerState::Idle);
        assert_eq!(b.ws.objects.get(b.tube).unwrap().anchored(), Some(b.anchor));
    }

    #[test]
    fn test_fixtures_are_not_grabbed() {
        let mut b = bench();
        let root_node = b.ws.scene.root();
        let burner = b.ws.scene.spawn(root_node, "burner", Transform::from_position(Point3D::new(0.0, 0.05, 0.5)));
        b.ws.scene.spawn_with_extent(
            burner,
            "hitSurface",
            Transform::identity(),
            Bounds::aabb_centered(Point3D::ORIGIN, Vector3D::splat(0.05)),
        );
        let id = b.ws.add_object(burner).unwrap();

        b.hand.update(&mut b.ws);
        assert_eq!(b.hand.highlighted().map(|h| h.0), Some(id));
        b.hand.handle_event(&mut b.ws, ControllerEvent::GripDown);
        assert_eq!(b.hand.state(), ControllerState::Highlighting);
        assert!(b.ws.objects.get(id).unwrap().interaction_enabled());
    }

    #[test]
    fn test_disabled_object_ends_session() {
        let mut b = bench();
        b.hand.update(&mut b.ws);
        b.hand.handle_event(&mut b.ws, ControllerEvent::GripDown);
        b.ws.disable_object(b.tube);
        b.hand.update(&mut b.ws);
        assert!(b.hand.session().is_none());
        assert!(b.hand.highlighted().is_none());
        let tube = b.ws.objects.get(b.tube).unwrap();
        assert!(!tube.grabbed());
        assert!(tube.interaction_enabled());
    }

    #[test]
    fn test_object_disabled_mid_grab_can_be_grabbed_again() {
        let mut b = bench();
        let parking = b.ws.scene.world_transform(root(&b));
        b.hand.update(&mut b.ws);
        b.hand.handle_event(&mut b.ws, ControllerEvent::GripDown);
        b.hand.update(&mut b.ws);
        b.ws.disable_object(b.tube);
        b.hand.update(&mut b.ws);
        assert!(b.ws.objects.interactables().is_empty());

        let scene_root = b.ws.scene.root();
        b.ws.enable_object(b.tube, scene_root);
        let tube_root = root(&b);
        b.ws.scene.set_world_transform(tube_root, parking);
        assert_eq!(b.ws.objects.interactables(), vec![b.tube]);

        b.hand.update(&mut b.ws);
        assert_eq!(b.hand.highlighted().map(|h| h.0), Some(b.tube));
        b.hand.handle_event(&mut b.ws, ControllerEvent::GripDown);
        assert_eq!(b.hand.state(), ControllerState::Grabbing);
        run_until(&mut b, ControllerState::Grabbed, 100);
    }

    #[test]
    fn test_non_positive_steps_still_finish_flights() {
        let mut config = LabConfig::default();
        config.manipulation.grab_step = 0.0;
        config.manipulation.release_step = f32::NAN;
        let mut b = bench();
        let parking = b.ws.scene.world_transform(root(&b));
        let hand = ManipulationController::new(Handedness::Left, &mut b.ws.scene, &config.manipulation);
        hand.set_pose(&mut b.ws.scene, Transform::from_position(Point3D::new(0.0, 0.05, 0.0)));
        b.hand = hand;

        b.hand.update(&mut b.ws);
        b.hand.handle_event(&mut b.ws, ControllerEvent::GripDown);
        run_until(&mut b, ControllerState::Grabbed, 1000);
        b.hand.handle_event(&mut b.ws, ControllerEvent::GripUp);
        let step = b.hand.session().unwrap().step;
        assert!(step > 0.0 && step.is_finite());
        run_until(&mut b, ControllerState::Idle, 1000);
        assert!(b.ws.scene.world_transform(root(&b)).approx_eq(&parking));
    }

    #[test]
    fn test_release_restores_pre_grab_rotation() {
        let mut b = bench();
        b.ws.anchors.disable_group(&mut b.ws.scene, "tubeAnchor");
        let parking = b.ws.scene.world_transform(root(&b));

        b.hand.update(&mut b.ws);
        b.hand.handle_event(&mut b.ws, ControllerEvent::GripDown);
        run_until(&mut b, ControllerState::Grabbed, 100);

        // Twist the hand so the held object picks up a different orientation
        let twist = Quaternion::from_axis_angle(Vector3D::new(1.0, 1.0, 0.0).normalize(), 1.2);
        b.hand.set_pose(
            &mut b.ws.scene,
            Transform::from_position_rotation(Point3D::new(0.4, 0.6, 0.3), twist),
        );
        b.hand.update(&mut b.ws);
        assert!(!b.ws.scene.world_rotation(root(&b)).approx_eq(&parking.rotation));

        let before = b.ws.scene.world_position(root(&b));
        b.hand.handle_event(&mut b.ws, ControllerEvent::GripUp);
        let after = b.ws.scene.world_transform(root(&b));
        assert!(after.rotation.approx_eq(&parking.rotation));
        assert!(after.position.approx_eq(&before));

        run_until(&mut b, ControllerState::Idle, 200);
        assert!(b.ws.scene.world_transform(root(&b)).approx_eq(&parking));
    }

    #[test]
    fn test_release_flight_is_continuous() {
        let mut b = bench();
        b.hand.update(&mut b.ws);
        b.hand.handle_event(&mut b.ws, ControllerEvent::GripDown);
        run_until(&mut b, ControllerState::Grabbed, 100);
        b.hand.set_pose(&mut b.ws.scene, Transform::from_position(Point3D::new(0.0, 0.1, 0.92)));
        b.hand.update(&mut b.ws);
        assert_eq!(b.hand.session().unwrap().near_anchor, Some(b.anchor));

        let step = b.ws.config().manipulation.release_step;
        let mut last = b.ws.scene.world_position(root(&b));
        b.hand.handle_event(&mut b.ws, ControllerEvent::GripUp);
        assert!(b.ws.scene.world_position(root(&b)).approx_eq(&last));

        let mut frames = 0;
        while b.hand.state() == ControllerState::Releasing {
            b.hand.update(&mut b.ws);
            let now = b.ws.scene.world_position(root(&b));
            assert!(now.distance(&last) <= step + 1e-4);
            last = now;
            frames += 1;
            assert!(frames < 200, "release never settled");
        }
        assert!(frames >= 1);
        assert_eq!(b.ws.objects.get(b.tube).unwrap().anchored(), Some(b.anchor));
    }

    #[test]
    fn test_grip_up_mid_grab_sends_object_back() {
        let mut b = bench();
        let parking = b.ws.scene.world_transform(root(&b));
        b.hand.update(&mut b.ws);
        b.hand.handle_event(&mut b.ws, ControllerEvent::GripDown);
        b.hand.update(&mut b.ws);
        assert_eq!(b.hand.state(), ControllerState::Grabbing);

        b.hand.handle_event(&mut b.ws, ControllerEvent::GripUp);
        assert_eq!(b.hand.state(), ControllerState::Releasing);
        run_until(&mut b, ControllerState::Idle, 100);

        assert!(b.ws.scene.world_transform(root(&b)).approx_eq(&parking));
        let tube = b.ws.objects.get(b.tube).unwrap();
        assert!(tube.interaction_enabled());
        assert!(!tube.grabbed());
    }
}
