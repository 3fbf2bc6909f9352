//! # Mapping Module
//!
//! The binding data model consumed by the input engine.
//!
//! This module handles:
//! - Mapping keys and their `"<Section>|<Label>"` string form
//! - Output actions (key, mouse button, scroll)
//! - Per-stick configuration
//! - The immutable [`EngineConfig`] snapshot and face-button swap resolution

pub mod action;
pub mod key;
pub mod stick;

use std::collections::HashMap;

pub use action::{Action, ActionKind, MOUSE_LEFT, MOUSE_MIDDLE, MOUSE_RIGHT};
pub use key::{MappingKey, Section};
pub use stick::{StickConfig, StickMode, StickSide, DEFAULT_STICK_SPEED, MAX_STICK_SPEED};

/// One of the four directions of a d-pad or an emulated stick d-pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All directions, in evaluation order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Mapping label for this direction.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Direction::Up => "Up",
            Direction::Down => "Down",
            Direction::Left => "Left",
            Direction::Right => "Right",
        }
    }
}

/// Returns the label used for lookup (and for the on-screen indicator) of a
/// physical input.
///
/// With `swap_face_buttons` set, `A`/`B` and `X`/`Y` trade places in the
/// [`Section::Buttons`] section. Every other label passes through.
///
/// ```
/// use gamepad_mapper::mapping::{display_label, Section};
///
/// assert_eq!(display_label(Section::Buttons, "A", true), "B");
/// assert_eq!(display_label(Section::Buttons, "A", false), "A");
/// assert_eq!(display_label(Section::DPad, "Up", true), "Up");
/// ```
#[must_use]
pub fn display_label(section: Section, label: &str, swap_face_buttons: bool) -> &str {
    if section != Section::Buttons || !swap_face_buttons {
        return label;
    }
    match label {
        "A" => "B",
        "B" => "A",
        "X" => "Y",
        "Y" => "X",
        other => other,
    }
}

/// Table of bindings. Keys are unique; ordering carries no meaning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingTable {
    entries: HashMap<MappingKey, Action>,
}

impl MappingTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `key` to `action`, returning the previous binding.
    pub fn insert(&mut self, key: MappingKey, action: Action) -> Option<Action> {
        self.entries.insert(key, action)
    }

    pub fn remove(&mut self, key: &MappingKey) -> Option<Action> {
        self.entries.remove(key)
    }

    #[must_use]
    pub fn get(&self, key: &MappingKey) -> Option<&Action> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MappingKey, &Action)> {
        self.entries.iter()
    }
}

impl FromIterator<(MappingKey, Action)> for MappingTable {
    fn from_iter<I: IntoIterator<Item = (MappingKey, Action)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Immutable snapshot the engine is built from.
///
/// The engine never changes this after construction; a new setting means a
/// new engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineConfig {
    pub mappings: MappingTable,
    pub left_stick: StickConfig,
    pub right_stick: StickConfig,
    pub swap_face_buttons: bool,
}

impl EngineConfig {
    /// Effective label for a physical input under this config's swap flag.
    #[must_use]
    pub fn effective_label<'a>(&self, section: Section, label: &'a str) -> &'a str {
        display_label(section, label, self.swap_face_buttons)
    }

    /// Looks up the action bound to `(section, effective_label(label))`.
    ///
    /// Returns the effective label alongside the action so callers can
    /// narrate what fired.
    #[must_use]
    pub fn resolve<'a>(&'a self, section: Section, label: &'a str) -> Option<(&'a str, &'a Action)> {
        let effective = self.effective_label(section, label);
        self.mappings
            .get(&MappingKey::new(section, effective))
            .map(|action| (effective, action))
    }

    /// Configuration of one stick.
    #[must_use]
    pub fn stick(&self, side: StickSide) -> &StickConfig {
        match side {
            StickSide::Left => &self.left_stick,
            StickSide::Right => &self.right_stick,
        }
    }
}
