//! # Stick Configuration
//!
//! Per-stick behavior: ignored, driving the mouse, or emulating a d-pad.

use serde::{Deserialize, Serialize};

use super::key::Section;

/// Default mouse speed in pixels per tick at full deflection.
pub const DEFAULT_STICK_SPEED: f64 = 15.0;

/// Upper bound of the speed range offered to users.
pub const MAX_STICK_SPEED: f64 = 30.0;

/// What an analog stick does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StickMode {
    /// Stick is only reported as moving, never dispatched.
    #[default]
    #[serde(alias = "")]
    None,
    /// Stick deflection becomes relative mouse motion.
    #[serde(alias = "Map to mouse axes")]
    MouseAxis,
    /// Stick acts as four independent direction buttons.
    #[serde(alias = "Simulate a direction pad")]
    DirectionPad,
}

/// Settings for one analog stick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StickConfig {
    #[serde(default)]
    pub mode: StickMode,

    /// Mouse speed multiplier, in `(0, MAX_STICK_SPEED]` once validated.
    #[serde(default = "default_speed")]
    pub speed: f64,

    /// When false only relative deltas are emitted and the cursor is left
    /// where it is.
    #[serde(default = "default_move_pointer")]
    pub move_pointer: bool,
}

fn default_speed() -> f64 { DEFAULT_STICK_SPEED }
fn default_move_pointer() -> bool { true }

impl Default for StickConfig {
    fn default() -> Self {
        Self {
            mode: StickMode::None,
            speed: default_speed(),
            move_pointer: default_move_pointer(),
        }
    }
}

impl StickConfig {
    /// Mouse-axis configuration with the given speed.
    #[must_use]
    pub fn mouse(speed: f64, move_pointer: bool) -> Self {
        Self {
            mode: StickMode::MouseAxis,
            speed,
            move_pointer,
        }
    }

    /// Direction-pad emulation.
    #[must_use]
    pub fn direction_pad() -> Self {
        Self {
            mode: StickMode::DirectionPad,
            ..Self::default()
        }
    }
}

/// Which of the two analog sticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StickSide {
    Left,
    Right,
}

impl StickSide {
    /// Both sticks, left first. Poll order within a tick follows this.
    pub const BOTH: [StickSide; 2] = [StickSide::Left, StickSide::Right];

    /// Mapping section for this stick's virtual directions.
    #[must_use]
    pub fn section(self) -> Section {
        match self {
            StickSide::Left => Section::LeftStick,
            StickSide::Right => Section::RightStick,
        }
    }

    #[must_use]
    pub fn is_left(self) -> bool {
        self == StickSide::Left
    }
}
