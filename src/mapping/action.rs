//! # Actions
//!
//! The output side of a binding: a key, a mouse button, or a scroll tick,
//! plus the display name shown to the user.
//!
//! JSON form:
//!
//! ```json
//! {"type": "key", "code": 57, "name": "Space"}
//! {"type": "mouseButton", "code": 0, "name": "Left Click"}
//! {"type": "scroll", "direction": 1, "name": "Scroll Up"}
//! ```
//!
//! Key codes are Linux input event codes (`KEY_SPACE` = 57) and are used as
//! stored. Profiles written with another platform's key codes are not
//! translated and need their bindings re-captured.

use serde::{Deserialize, Deserializer, Serialize};

/// Mouse button code for the left button.
pub const MOUSE_LEFT: u16 = 0;
/// Mouse button code for the right button.
pub const MOUSE_RIGHT: u16 = 1;
/// Mouse button code for the middle button. Any other code also maps here.
pub const MOUSE_MIDDLE: u16 = 2;

/// What an [`Action`] emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ActionKind {
    /// Keyboard key, identified by its Linux input key code.
    Key { code: u16 },
    /// Mouse button: 0 = left, 1 = right, anything else = middle.
    MouseButton { code: u16 },
    /// One wheel tick per activation; positive scrolls up.
    Scroll {
        #[serde(alias = "value", deserialize_with = "deserialize_scroll_direction")]
        direction: i32,
    },
}

/// Scroll direction for any stored value: negative scrolls down, anything
/// else up.
#[must_use]
pub fn normalize_scroll_direction(direction: i32) -> i32 {
    if direction < 0 {
        -1
    } else {
        1
    }
}

fn deserialize_scroll_direction<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    i32::deserialize(deserializer).map(normalize_scroll_direction)
}

/// A resolved output action with its human-readable name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    #[serde(flatten)]
    pub kind: ActionKind,
    pub name: String,
}

impl Action {
    /// Keyboard key action.
    #[must_use]
    pub fn key(code: u16, name: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::Key { code },
            name: name.into(),
        }
    }

    /// Mouse button action.
    #[must_use]
    pub fn mouse_button(code: u16, name: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::MouseButton { code },
            name: name.into(),
        }
    }

    /// Scroll action. The direction is normalized to `+1` or `-1`.
    #[must_use]
    pub fn scroll(direction: i32, name: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::Scroll {
                direction: normalize_scroll_direction(direction),
            },
            name: name.into(),
        }
    }
}
