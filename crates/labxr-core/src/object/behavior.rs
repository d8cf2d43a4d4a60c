//! Per-kind reactions to manipulation moments

use std::f32::consts::PI;
use std::fmt;

use labxr_spatial::{NodeId, Quaternion, Scene, Vector3D};

use super::{ObjectId, ObjectKind};

/// Moment of the manipulation cycle at which a behavior runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    Init,
    GripDown,
    Grabbed,
    WhileGrabbed,
    Dropped,
    Released,
    TriggerDown(NodeId),
    JoystickDown,
    ThumbButtonDown,
    Update,
}

/// What a behavior may see and touch while it runs
pub struct HookContext<'a> {
    pub object: ObjectId,
    pub kind: ObjectKind,
    pub root: NodeId,
    pub scene: &'a mut Scene,
}

impl HookContext<'_> {
    /// First node of the object named with `prefix`
    pub fn find_part(&self, prefix: &str) -> Option<NodeId> {
        self.scene.find_by_prefix(self.root, prefix)
    }
}

/// Domain logic attached to an object. Every hook defaults to doing nothing.
pub trait ObjectBehavior: fmt::Debug {
    /// Runs once after the object is built
    fn init(&mut self, _ctx: &mut HookContext<'_>) {}

    fn on_grip_down(&mut self, _ctx: &mut HookContext<'_>) {}

    /// The object reached the hand
    fn on_grabbed(&mut self, _ctx: &mut HookContext<'_>) {}

    fn while_grabbed(&mut self, _ctx: &mut HookContext<'_>) {}

    /// The grip was released; the object starts flying back
    fn on_dropped(&mut self, _ctx: &mut HookContext<'_>) {}

    /// The object settled on its anchor or parking pose
    fn on_released(&mut self, _ctx: &mut HookContext<'_>) {}

    fn on_trigger_down(&mut self, _ctx: &mut HookContext<'_>, _surface: NodeId) {}

    fn on_joystick_down(&mut self, _ctx: &mut HookContext<'_>) {}

    fn on_thumb_button_down(&mut self, _ctx: &mut HookContext<'_>) {}

    /// Per-frame update while the object is active
    fn update(&mut self, _ctx: &mut HookContext<'_>) {}
}

pub(crate) fn dispatch(behavior: &mut dyn ObjectBehavior, hook: Hook, ctx: &mut HookContext<'_>) {
    match hook {
        Hook::Init => behavior.init(ctx),
        Hook::GripDown => behavior.on_grip_down(ctx),
        Hook::Grabbed => behavior.on_grabbed(ctx),
        Hook::WhileGrabbed => behavior.while_grabbed(ctx),
        Hook::Dropped => behavior.on_dropped(ctx),
        Hook::Released => behavior.on_released(ctx),
        Hook::TriggerDown(surface) => behavior.on_trigger_down(ctx, surface),
        Hook::JoystickDown => behavior.on_joystick_down(ctx),
        Hook::ThumbButtonDown => behavior.on_thumb_button_down(ctx),
        Hook::Update => behavior.update(ctx),
    }
}

/// Objects without domain logic
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBehavior;

impl ObjectBehavior for NoBehavior {}

/// Hinged part that swings between two angles around its local X axis
#[derive(Debug, Clone)]
pub struct ToggleBehavior {
    /// Name prefix of the hinged node; `None` swings the object itself
    part: Option<String>,
    open_angle: f32,
    closed_angle: f32,
    open: bool,
    toggle_on_grip: bool,
}

impl ToggleBehavior {
    pub fn new(part: Option<&str>, open_angle: f32, closed_angle: f32, start_open: bool) -> Self {
        Self {
            part: part.map(str::to_string),
            open_angle,
            closed_angle,
            open: start_open,
            toggle_on_grip: false,
        }
    }

    /// Waste bin lid, open at start
    pub fn lid() -> Self {
        Self::new(Some("lid"), 70f32.to_radians(), PI, true)
    }

    /// Instrument door swinging down, toggled by trigger or grip
    pub fn door() -> Self {
        Self {
            toggle_on_grip: true,
            ..Self::new(None, (-60f32).to_radians(), 0.0, false)
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    fn apply(&self, ctx: &mut HookContext<'_>) {
        let target = match &self.part {
            Some(prefix) => ctx.find_part(prefix),
            None => Some(ctx.root),
        };
        let Some(node) = target else {
            tracing::error!("Hinged part {:?} was not found for object {}", self.part, ctx.kind);
            return;
        };

        let angle = if self.open { self.open_angle } else { self.closed_angle };
        let mut local = ctx.scene.local_transform(node);
        local.rotation = Quaternion::from_axis_angle(Vector3D::RIGHT, angle);
        ctx.scene.set_local_transform(node, local);
    }

    fn toggle(&mut self, ctx: &mut HookContext<'_>) {
        self.open = !self.open;
        self.apply(ctx);
        tracing::debug!(object = %ctx.object, open = self.open, "toggled");
    }
}

impl ObjectBehavior for ToggleBehavior {
    fn init(&mut self, ctx: &mut HookContext<'_>) {
        self.apply(ctx);
    }

    fn on_trigger_down(&mut self, ctx: &mut HookContext<'_>, _surface: NodeId) {
        self.toggle(ctx);
    }

    fn on_grip_down(&mut self, ctx: &mut HookContext<'_>) {
        if self.toggle_on_grip {
            self.toggle(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labxr_spatial::Transform;

    #[test]
    fn test_lid_swings_on_trigger() {
        let mut scene = Scene::new();
        let bin = scene.spawn(scene.root(), "bin", Transform::identity());
        let lid = scene.spawn(bin, "lid", Transform::identity());

        let mut behavior = ToggleBehavior::lid();
        let mut ctx = HookContext {
            object: ObjectId::UNREGISTERED,
            kind: ObjectKind::Bin,
            root: bin,
            scene: &mut scene,
        };
        dispatch(&mut behavior, Hook::Init, &mut ctx);
        assert!(behavior.is_open());
        let open = ctx.scene.local_transform(lid).rotation;
        assert!(open.approx_eq(&Quaternion::from_axis_angle(Vector3D::RIGHT, 70f32.to_radians())));

        dispatch(&mut behavior, Hook::TriggerDown(lid), &mut ctx);
        assert!(!behavior.is_open());
        let closed = ctx.scene.local_transform(lid).rotation;
        assert!(closed.approx_eq(&Quaternion::from_axis_angle(Vector3D::RIGHT, PI)));

        // Grip does not affect a lid
        dispatch(&mut behavior, Hook::GripDown, &mut ctx);
        assert!(!behavior.is_open());
    }

    #[test]
    fn test_door_toggles_on_grip() {
        let mut scene = Scene::new();
        let door = scene.spawn(scene.root(), "sphDoor", Transform::identity());
        let mut behavior = ToggleBehavior::door();
        let mut ctx = HookContext {
            object: ObjectId::UNREGISTERED,
            kind: ObjectKind::SphDoor,
            root: door,
            scene: &mut scene,
        };
        dispatch(&mut behavior, Hook::GripDown, &mut ctx);
        assert!(behavior.is_open());
        assert!(!ctx.scene.local_transform(door).rotation.approx_eq(&Quaternion::IDENTITY));
    }
}
