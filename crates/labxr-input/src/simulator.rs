//! Keyboard stand-in for tracked hand controllers
//!
//! Maps key presses to controller poses and button events so the engine can
//! be exercised from a terminal.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use labxr_spatial::{Point3D, Quaternion, Transform, Vector3D};

use super::{ControllerEvent, Handedness};

/// Output of the simulator
#[derive(Debug, Clone, PartialEq)]
pub enum SimulatedInput {
    /// A controller moved
    Pose {
        hand: Handedness,
        transform: Transform,
    },
    /// A controller button fired
    Button {
        hand: Handedness,
        event: ControllerEvent,
    },
    /// The active hand changed
    HandSwitched(Handedness),
    /// Key with no controller binding
    Key(KeyEvent),
}

#[derive(Debug, Clone, Copy)]
struct SimulatedHand {
    position: Point3D,
    yaw: f32,
    pitch: f32,
    grip_held: bool,
}

impl SimulatedHand {
    fn at(position: Point3D) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            grip_held: false,
        }
    }

    fn transform(&self) -> Transform {
        Transform::from_position_rotation(self.position, Quaternion::from_yaw_pitch(self.yaw, self.pitch))
    }
}

/// Simulates two hand controllers from keyboard input
///
/// | Key | Action |
/// |-----|--------|
/// | Tab | switch active hand |
/// | arrows | move hand along X/Y |
/// | PageUp / PageDown | move hand along Z |
/// | W/A/S/D | pitch / yaw the hand |
/// | G | toggle grip |
/// | Space | trigger press and release |
/// | J | joystick click |
/// | X | thumb button |
#[derive(Debug)]
pub struct InputSimulator {
    active: Handedness,
    left: SimulatedHand,
    right: SimulatedHand,
    move_speed: f32,
    turn_speed: f32,
}

impl Default for InputSimulator {
    fn default() -> Self {
        Self {
            active: Handedness::Right,
            left: SimulatedHand::at(Point3D::new(-0.2, 1.2, 0.0)),
            right: SimulatedHand::at(Point3D::new(0.2, 1.2, 0.0)),
            move_speed: 0.05,
            turn_speed: 0.1,
        }
    }
}

impl InputSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_hand(&self) -> Handedness {
        self.active
    }

    fn hand_mut(&mut self, hand: Handedness) -> &mut SimulatedHand {
        match hand {
            Handedness::Left => &mut self.left,
            Handedness::Right => &mut self.right,
        }
    }

    fn hand(&self, hand: Handedness) -> &SimulatedHand {
        match hand {
            Handedness::Left => &self.left,
            Handedness::Right => &self.right,
        }
    }

    /// Current simulated grip pose of a controller
    pub fn pose(&self, hand: Handedness) -> Transform {
        self.hand(hand).transform()
    }

    pub fn set_pose(&mut self, hand: Handedness, position: Point3D, yaw: f32, pitch: f32) {
        let h = self.hand_mut(hand);
        h.position = position;
        h.yaw = yaw;
        h.pitch = pitch;
    }

    /// Process a keyboard event and generate simulated controller input
    pub fn process_key(&mut self, key: KeyEvent) -> Vec<SimulatedInput> {
        let mut events = Vec::new();

        if key.kind != KeyEventKind::Press {
            return events;
        }

        let speed = self.move_speed;
        let turn = self.turn_speed;
        match key.code {
            KeyCode::Tab => {
                self.active = self.active.other();
                events.push(SimulatedInput::HandSwitched(self.active));
            }

            KeyCode::Up => events.push(self.nudge(Vector3D::UP * speed)),
            KeyCode::Down => events.push(self.nudge(Vector3D::UP * -speed)),
            KeyCode::Left => events.push(self.nudge(Vector3D::RIGHT * -speed)),
            KeyCode::Right => events.push(self.nudge(Vector3D::RIGHT * speed)),
            KeyCode::PageUp => events.push(self.nudge(Vector3D::FORWARD * speed)),
            KeyCode::PageDown => events.push(self.nudge(Vector3D::FORWARD * -speed)),

            KeyCode::Char('w') | KeyCode::Char('W') => events.push(self.turn(0.0, -turn)),
            KeyCode::Char('s') | KeyCode::Char('S') => events.push(self.turn(0.0, turn)),
            KeyCode::Char('a') | KeyCode::Char('A') => events.push(self.turn(-turn, 0.0)),
            KeyCode::Char('d') | KeyCode::Char('D') => events.push(self.turn(turn, 0.0)),

            KeyCode::Char('g') | KeyCode::Char('G') => {
                let hand = self.active;
                let h = self.hand_mut(hand);
                h.grip_held = !h.grip_held;
                let event = if h.grip_held {
                    ControllerEvent::GripDown
                } else {
                    ControllerEvent::GripUp
                };
                events.push(SimulatedInput::Button { hand, event });
            }

            KeyCode::Char(' ') => {
                events.push(self.button(ControllerEvent::TriggerDown));
                events.push(self.button(ControllerEvent::TriggerUp));
            }

            KeyCode::Char('j') | KeyCode::Char('J') => {
                events.push(self.button(ControllerEvent::JoystickDown));
            }
            KeyCode::Char('x') | KeyCode::Char('X') => {
                events.push(self.button(ControllerEvent::ThumbButtonDown));
            }

            _ => {
                events.push(SimulatedInput::Key(key));
            }
        }

        events
    }

    fn button(&self, event: ControllerEvent) -> SimulatedInput {
        SimulatedInput::Button {
            hand: self.active,
            event,
        }
    }

    fn nudge(&mut self, offset: Vector3D) -> SimulatedInput {
        let hand = self.active;
        let h = self.hand_mut(hand);
        h.position = h.position + offset;
        SimulatedInput::Pose {
            hand,
            transform: h.transform(),
        }
    }

    fn turn(&mut self, yaw: f32, pitch: f32) -> SimulatedInput {
        let hand = self.active;
        let h = self.hand_mut(hand);
        h.yaw += yaw;
        h.pitch += pitch;
        SimulatedInput::Pose {
            hand,
            transform: h.transform(),
        }
    }

    /// Reset both hands to their rest poses
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
