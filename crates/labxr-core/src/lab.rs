//! Two-hand frame driver

use std::time::Duration;

use labxr_config::LabConfig;
use labxr_input::{
    ControllerEvent, GamepadEvent, GamepadMonitor, GamepadSnapshot, Handedness, HapticPulse,
    SimulatedInput, StickSettings,
};
use labxr_spatial::Transform;

use crate::manipulation::{ManipulationController, ManipulationEvent};
use crate::workspace::Workspace;

/// Runs both controllers against one workspace.
///
/// Input is queued and applied at the start of the next [`Lab::frame`], in
/// arrival order. Controllers then update left first, so when both hands
/// reach for the same object in one frame the left one gets it.
#[derive(Debug)]
pub struct Lab {
    pub workspace: Workspace,
    left: ManipulationController,
    right: ManipulationController,
    left_pad: GamepadMonitor,
    right_pad: GamepadMonitor,
    queue: Vec<(Handedness, ControllerEvent)>,
    frames: u64,
}

impl Lab {
    pub fn new(config: LabConfig) -> Self {
        Self::with_workspace(Workspace::new(config))
    }

    pub fn with_workspace(mut workspace: Workspace) -> Self {
        let manipulation = workspace.config().manipulation.clone();
        let input = &workspace.config().input;
        let stick = StickSettings {
            dead_zone: input.dead_zone,
            hold_threshold: input.hold_threshold,
            hold_interval: input.hold_interval(),
        };

        let left = ManipulationController::new(Handedness::Left, &mut workspace.scene, &manipulation);
        let right = ManipulationController::new(Handedness::Right, &mut workspace.scene, &manipulation);
        Self {
            left_pad: GamepadMonitor::new(Handedness::Left, stick),
            right_pad: GamepadMonitor::new(Handedness::Right, stick),
            workspace,
            left,
            right,
            queue: Vec::new(),
            frames: 0,
        }
    }

    pub fn controller(&self, hand: Handedness) -> &ManipulationController {
        match hand {
            Handedness::Left => &self.left,
            Handedness::Right => &self.right,
        }
    }

    fn split(&mut self, hand: Handedness) -> (&mut ManipulationController, &mut Workspace) {
        match hand {
            Handedness::Left => (&mut self.left, &mut self.workspace),
            Handedness::Right => (&mut self.right, &mut self.workspace),
        }
    }

    pub fn set_controller_pose(&mut self, hand: Handedness, pose: Transform) {
        let (controller, ws) = self.split(hand);
        controller.set_pose(&mut ws.scene, pose);
    }

    pub fn push_event(&mut self, hand: Handedness, event: ControllerEvent) {
        self.queue.push((hand, event));
    }

    /// Feed one gamepad snapshot; button edges are queued as controller events
    pub fn poll_gamepad(&mut self, hand: Handedness, snapshot: &GamepadSnapshot, delta: Duration) -> Vec<GamepadEvent> {
        let pad = match hand {
            Handedness::Left => &mut self.left_pad,
            Handedness::Right => &mut self.right_pad,
        };
        let events = pad.poll(snapshot, delta);
        self.queue
            .extend(events.iter().filter_map(GamepadEvent::controller_event).map(|e| (hand, e)));
        events
    }

    /// Route keyboard-simulated input
    pub fn apply(&mut self, input: &SimulatedInput) {
        match input {
            SimulatedInput::Pose { hand, transform } => self.set_controller_pose(*hand, *transform),
            SimulatedInput::Button { hand, event } => self.push_event(*hand, *event),
            SimulatedInput::HandSwitched(hand) => tracing::debug!("Active hand is now {}", hand),
            SimulatedInput::Key(_) => {}
        }
    }

    /// Apply queued input, update left then right, then every active object
    pub fn frame(&mut self) {
        for (hand, event) in std::mem::take(&mut self.queue) {
            let (controller, ws) = self.split(hand);
            controller.handle_event(ws, event);
        }
        self.left.update(&mut self.workspace);
        self.right.update(&mut self.workspace);
        let ws = &mut self.workspace;
        ws.objects.update(&mut ws.scene);
        self.frames += 1;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Events of both hands since the last call, left hand first
    pub fn drain_events(&mut self) -> Vec<ManipulationEvent> {
        let mut events = self.left.drain_events();
        events.extend(self.right.drain_events());
        events
    }

    pub fn drain_haptics(&mut self) -> Vec<HapticPulse> {
        let mut pulses = self.left.drain_haptics();
        pulses.extend(self.right.drain_haptics());
        pulses
    }
}
