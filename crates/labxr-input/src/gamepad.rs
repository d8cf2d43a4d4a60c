//! Gamepad polling: button edges and thumbstick processing

use std::time::Duration;

use super::{ButtonName, ControllerEvent, Handedness};

/// Thumbstick tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StickSettings {
    /// Radius around the rest position that reads as zero
    pub dead_zone: f32,
    /// Raw deflection above which a held stick repeats
    pub hold_threshold: f32,
    /// Time between repeated hold events
    pub hold_interval: Duration,
}

impl Default for StickSettings {
    fn default() -> Self {
        Self {
            dead_zone: 0.4,
            hold_threshold: 0.7,
            hold_interval: Duration::from_millis(800),
        }
    }
}

/// Raw state of one controller's gamepad for a single frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GamepadSnapshot {
    pub buttons: Vec<bool>,
    /// Standard layout: thumbstick on axes 2 and 3
    pub axes: Vec<f32>,
}

impl GamepadSnapshot {
    pub fn new(buttons: Vec<bool>, axes: Vec<f32>) -> Self {
        Self { buttons, axes }
    }

    /// Snapshot with only the given buttons pressed
    pub fn pressed(buttons: &[ButtonName]) -> Self {
        let mut state = vec![false; 6];
        for button in buttons {
            state[button.index()] = true;
        }
        Self {
            buttons: state,
            axes: vec![0.0; 4],
        }
    }

    pub fn with_stick(mut self, x: f32, y: f32) -> Self {
        if self.axes.len() < 4 {
            self.axes.resize(4, 0.0);
        }
        self.axes[2] = x;
        self.axes[3] = y;
        self
    }
}

/// Events detected while polling a gamepad
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GamepadEvent {
    ButtonDown {
        index: usize,
        button: Option<ButtonName>,
    },
    ButtonUp {
        index: usize,
        button: Option<ButtonName>,
    },
    /// Dead-zone-adjusted stick position changed
    AxisChanged { x: f32, y: f32 },
    /// Stick held out along X; repeats every hold interval
    AxisXHeld(f32),
    /// Stick held out along Y; repeats every hold interval
    AxisYHeld(f32),
}

impl GamepadEvent {
    /// Manipulation event carried by this gamepad event, if any
    pub fn controller_event(&self) -> Option<ControllerEvent> {
        match self {
            GamepadEvent::ButtonDown {
                button: Some(b), ..
            } => ControllerEvent::from_button(*b, true),
            GamepadEvent::ButtonUp {
                button: Some(b), ..
            } => ControllerEvent::from_button(*b, false),
            _ => None,
        }
    }
}

/// Tracks one hand's gamepad between frames
#[derive(Debug, Clone)]
pub struct GamepadMonitor {
    handedness: Handedness,
    settings: StickSettings,
    buttons: Option<Vec<bool>>,
    stick: (f32, f32),
    stick_raw: (f32, f32),
    hold_timer: Duration,
}

impl GamepadMonitor {
    pub fn new(handedness: Handedness, settings: StickSettings) -> Self {
        Self {
            handedness,
            settings,
            buttons: None,
            stick: (0.0, 0.0),
            stick_raw: (0.0, 0.0),
            hold_timer: Duration::ZERO,
        }
    }

    pub fn handedness(&self) -> Handedness {
        self.handedness
    }

    /// Compare `snapshot` with the previous frame and report edges.
    ///
    /// The first snapshot only primes the button state.
    pub fn poll(&mut self, snapshot: &GamepadSnapshot, delta: Duration) -> Vec<GamepadEvent> {
        let mut events = Vec::new();
        self.poll_buttons(snapshot, &mut events);
        self.poll_axes(snapshot, delta, &mut events);
        events
    }

    /// Manipulation events for `snapshot`, dropping stick-only events
    pub fn poll_controller_events(
        &mut self,
        snapshot: &GamepadSnapshot,
        delta: Duration,
    ) -> Vec<ControllerEvent> {
        self.poll(snapshot, delta)
            .iter()
            .filter_map(GamepadEvent::controller_event)
            .collect()
    }

    pub fn is_down(&self, button: ButtonName) -> bool {
        self.buttons
            .as_ref()
            .and_then(|state| state.get(button.index()).copied())
            .unwrap_or(false)
    }

    /// Dead-zone-adjusted stick position
    pub fn stick_position(&self) -> (f32, f32) {
        self.stick
    }

    fn poll_buttons(&mut self, snapshot: &GamepadSnapshot, events: &mut Vec<GamepadEvent>) {
        let Some(previous) = self.buttons.replace(snapshot.buttons.clone()) else {
            return;
        };

        for (index, pressed) in snapshot.buttons.iter().copied().enumerate() {
            let was_pressed = previous.get(index).copied().unwrap_or(false);
            let button = ButtonName::from_index(self.handedness, index);
            if pressed && !was_pressed {
                tracing::trace!(hand = %self.handedness, index, "button down");
                events.push(GamepadEvent::ButtonDown { index, button });
            } else if !pressed && was_pressed {
                tracing::trace!(hand = %self.handedness, index, "button up");
                events.push(GamepadEvent::ButtonUp { index, button });
            }
        }
    }

    fn poll_axes(&mut self, snapshot: &GamepadSnapshot, delta: Duration, events: &mut Vec<GamepadEvent>) {
        if snapshot.axes.len() < 4 {
            return;
        }

        let raw = (snapshot.axes[2], snapshot.axes[3]);
        let adjusted = (self.dead_zone(raw.0), self.dead_zone(raw.1));
        if adjusted != self.stick {
            events.push(GamepadEvent::AxisChanged {
                x: adjusted.0,
                y: adjusted.1,
            });
        }
        self.stick_raw = raw;
        self.stick = adjusted;
        self.check_stick_hold(events, delta);
    }

    fn check_stick_hold(&mut self, events: &mut Vec<GamepadEvent>, delta: Duration) {
        let deflected = self.stick.0 != 0.0 || self.stick.1 != 0.0;
        if deflected && self.hold_timer.is_zero() {
            if self.stick_raw.0.abs() > self.settings.hold_threshold {
                events.push(GamepadEvent::AxisXHeld(self.stick.0));
            }
            if self.stick_raw.1.abs() > self.settings.hold_threshold {
                events.push(GamepadEvent::AxisYHeld(self.stick.1));
            }
            self.hold_timer = self.settings.hold_interval;
        } else {
            self.hold_timer = self.hold_timer.saturating_sub(delta);
        }
    }

    fn dead_zone(&self, value: f32) -> f32 {
        let dz = self.settings.dead_zone;
        if value < 0.0 {
            (value + dz).min(0.0)
        } else {
            (value - dz).max(0.0)
        }
    }
}
