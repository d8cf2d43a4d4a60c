//! Hand-controller input for the labxr manipulation engine
//!
//! Raw gamepad snapshots are turned into edge events by [`GamepadMonitor`],
//! which the manipulation layer consumes as [`ControllerEvent`]s. The
//! [`InputSimulator`] maps keyboard input onto the same events so the engine
//! can be driven from a terminal without XR hardware.

mod event;
mod gamepad;
mod haptics;
mod simulator;

pub use event::{ButtonName, ControllerEvent, Handedness};
pub use gamepad::{GamepadEvent, GamepadMonitor, GamepadSnapshot, StickSettings};
pub use haptics::HapticPulse;
pub use simulator::{InputSimulator, SimulatedInput};
