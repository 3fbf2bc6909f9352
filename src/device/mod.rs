//! # Device Module
//!
//! The capability surface a gamepad exposes to the engine.
//!
//! This module handles:
//! - The button / direction pad / gamepad traits the engine consumes
//! - Physical button identities and their mapping labels
//! - An in-memory surface ([`VirtualGamepad`]) driven by pushed updates
//! - An evdev reader ([`EvdevGamepad`]) that pushes real hardware updates
//!
//! Buttons are push based: the device calls the registered handler on every
//! edge. Axes are pull based: the engine reads them on its own tick.

pub mod evdev_pad;
pub mod virtual_pad;

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::mapping::{Direction, StickSide};

pub use evdev_pad::EvdevGamepad;
pub use virtual_pad::{VirtualButton, VirtualGamepad, VirtualPad};

/// Edge callback. Receives the new pressed state.
///
/// The error of a failed dispatch is handed back to the device layer that
/// delivered the edge.
pub type ButtonHandler = Box<dyn Fn(bool) -> Result<()> + Send + Sync>;

/// A discrete button with a single edge subscriber.
pub trait ButtonInput: Send + Sync {
    /// Registers `handler`, replacing any previous one.
    fn set_handler(&self, handler: ButtonHandler);

    /// Removes the registered handler, if any.
    fn clear_handler(&self);
}

/// A d-pad or analog stick.
pub trait DirectionPadInput: Send + Sync {
    /// Horizontal axis in `[-1, 1]`, right positive.
    fn x_axis(&self) -> f32;

    /// Vertical axis in `[-1, 1]`, up positive.
    fn y_axis(&self) -> f32;

    /// Button for one direction. Only digital d-pads have these.
    fn direction(&self, _direction: Direction) -> Option<Arc<dyn ButtonInput>> {
        None
    }
}

/// An "extended gamepad": face, shoulder, trigger, stick-click and menu
/// buttons, one d-pad and two thumbsticks. Any part may be missing.
pub trait GamepadInput: Send + Sync {
    fn button(&self, button: PhysicalButton) -> Option<Arc<dyn ButtonInput>>;

    fn dpad(&self) -> Option<Arc<dyn DirectionPadInput>>;

    fn thumbstick(&self, side: StickSide) -> Option<Arc<dyn DirectionPadInput>>;
}

/// Physical buttons of an extended gamepad, excluding the d-pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PhysicalButton {
    A,
    B,
    X,
    Y,
    LeftShoulder,
    LeftTrigger,
    RightShoulder,
    RightTrigger,
    LeftThumbstick,
    RightThumbstick,
    /// Options / share / back.
    Select,
    /// Menu / start.
    Start,
}

impl PhysicalButton {
    /// All buttons in binding order.
    pub const ALL: [PhysicalButton; 12] = [
        PhysicalButton::A,
        PhysicalButton::B,
        PhysicalButton::X,
        PhysicalButton::Y,
        PhysicalButton::LeftShoulder,
        PhysicalButton::LeftTrigger,
        PhysicalButton::RightShoulder,
        PhysicalButton::RightTrigger,
        PhysicalButton::LeftThumbstick,
        PhysicalButton::RightThumbstick,
        PhysicalButton::Select,
        PhysicalButton::Start,
    ];

    /// Label used in the `Buttons` mapping section and in press reports.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            PhysicalButton::A => "A",
            PhysicalButton::B => "B",
            PhysicalButton::X => "X",
            PhysicalButton::Y => "Y",
            PhysicalButton::LeftShoulder => "Left 1",
            PhysicalButton::LeftTrigger => "Left 2",
            PhysicalButton::RightShoulder => "Right 1",
            PhysicalButton::RightTrigger => "Right 2",
            PhysicalButton::LeftThumbstick => "Left Stick",
            PhysicalButton::RightThumbstick => "Right Stick",
            PhysicalButton::Select => "Select",
            PhysicalButton::Start => "Start",
        }
    }
}

impl fmt::Display for PhysicalButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A change reported by a hardware backend, applied to a [`VirtualGamepad`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeviceUpdate {
    Button(PhysicalButton, bool),
    DPad(Direction, bool),
    StickX(StickSide, f32),
    StickY(StickSide, f32),
}
