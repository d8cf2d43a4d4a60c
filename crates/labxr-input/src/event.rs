//! Controller events consumed by the manipulation layer

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which hand a controller belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub const BOTH: [Handedness; 2] = [Handedness::Left, Handedness::Right];

    pub fn other(&self) -> Handedness {
        match self {
            Handedness::Left => Handedness::Right,
            Handedness::Right => Handedness::Left,
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handedness::Left => write!(f, "left"),
            Handedness::Right => write!(f, "right"),
        }
    }
}

/// Named gamepad buttons of a tracked hand controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ButtonName {
    Trigger,
    Grip,
    Joystick,
    ButtonX,
    ButtonY,
    ButtonA,
    ButtonB,
}

impl ButtonName {
    /// Button at a standard gamepad index for the given hand
    pub fn from_index(hand: Handedness, index: usize) -> Option<ButtonName> {
        match (index, hand) {
            (0, _) => Some(ButtonName::Trigger),
            (1, _) => Some(ButtonName::Grip),
            (3, _) => Some(ButtonName::Joystick),
            (4, Handedness::Left) => Some(ButtonName::ButtonX),
            (5, Handedness::Left) => Some(ButtonName::ButtonY),
            (4, Handedness::Right) => Some(ButtonName::ButtonA),
            (5, Handedness::Right) => Some(ButtonName::ButtonB),
            _ => None,
        }
    }

    /// Inverse of [`ButtonName::from_index`]
    pub fn index(&self) -> usize {
        match self {
            ButtonName::Trigger => 0,
            ButtonName::Grip => 1,
            ButtonName::Joystick => 3,
            ButtonName::ButtonX | ButtonName::ButtonA => 4,
            ButtonName::ButtonY | ButtonName::ButtonB => 5,
        }
    }

    /// Face buttons under the thumb
    pub fn is_thumb_button(&self) -> bool {
        matches!(
            self,
            ButtonName::ButtonX | ButtonName::ButtonY | ButtonName::ButtonA | ButtonName::ButtonB
        )
    }
}

/// Discrete input event delivered to a manipulation controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControllerEvent {
    GripDown,
    GripUp,
    TriggerDown,
    TriggerUp,
    JoystickDown,
    ThumbButtonDown,
}

impl ControllerEvent {
    /// Event produced by a button edge, if the button drives manipulation
    pub fn from_button(button: ButtonName, pressed: bool) -> Option<ControllerEvent> {
        match (button, pressed) {
            (ButtonName::Grip, true) => Some(ControllerEvent::GripDown),
            (ButtonName::Grip, false) => Some(ControllerEvent::GripUp),
            (ButtonName::Trigger, true) => Some(ControllerEvent::TriggerDown),
            (ButtonName::Trigger, false) => Some(ControllerEvent::TriggerUp),
            (ButtonName::Joystick, true) => Some(ControllerEvent::JoystickDown),
            (b, true) if b.is_thumb_button() => Some(ControllerEvent::ThumbButtonDown),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_mapping_by_hand() {
        assert_eq!(ButtonName::from_index(Handedness::Left, 4), Some(ButtonName::ButtonX));
        assert_eq!(ButtonName::from_index(Handedness::Right, 4), Some(ButtonName::ButtonA));
        assert_eq!(ButtonName::from_index(Handedness::Right, 2), None);
        assert_eq!(ButtonName::ButtonB.index(), 5);
    }

    #[test]
    fn test_controller_event_from_button() {
        assert_eq!(
            ControllerEvent::from_button(ButtonName::Grip, false),
            Some(ControllerEvent::GripUp)
        );
        assert_eq!(
            ControllerEvent::from_button(ButtonName::ButtonY, true),
            Some(ControllerEvent::ThumbButtonDown)
        );
        assert_eq!(ControllerEvent::from_button(ButtonName::Joystick, false), None);
    }
}
