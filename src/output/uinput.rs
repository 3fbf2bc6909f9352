//! # uinput Output Sink
//!
//! Emits keyboard and mouse events through a Linux uinput virtual device.
//!
//! ## Device Capabilities
//!
//! | Capability | Codes |
//! |------------|-------|
//! | Keyboard keys | 1-248 (`KEY_ESC` .. `KEY_MICMUTE`) |
//! | Mouse buttons | `BTN_LEFT`, `BTN_RIGHT`, `BTN_MIDDLE` |
//! | Relative axes | `REL_X`, `REL_Y`, `REL_WHEEL` |
//!
//! ## Pointer Tracking
//!
//! uinput only carries relative motion, so "move the pointer" and "delta
//! only" produce the same events on the wire. The sink tracks the pointer
//! location itself (origin at creation) and advances it only when
//! `move_pointer` is set, which is what the engine reports in its log.

use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AttributeSet, EventType, InputEvent, Key, RelativeAxisType};
use tracing::{debug, info};

use super::OutputSink;
use crate::error::{MapperError, Result};
use crate::mapping::{Action, ActionKind, MOUSE_LEFT, MOUSE_RIGHT};

/// Highest keyboard key code registered on the virtual device.
pub const MAX_KEY_CODE: u16 = 248;

/// Linux limit on a uinput device name, in bytes.
pub const MAX_DEVICE_NAME_LEN: usize = 80;

/// Maps a mouse button code to the evdev button.
#[must_use]
pub fn mouse_button_key(code: u16) -> Key {
    match code {
        MOUSE_LEFT => Key::BTN_LEFT,
        MOUSE_RIGHT => Key::BTN_RIGHT,
        _ => Key::BTN_MIDDLE,
    }
}

/// Builds the events for a discrete action. Empty when nothing is emitted.
#[must_use]
pub fn discrete_events(action: &Action, pressed: bool) -> Vec<InputEvent> {
    let value = i32::from(pressed);
    match action.kind {
        ActionKind::Key { code } => vec![InputEvent::new(EventType::KEY, code, value)],
        ActionKind::MouseButton { code } => {
            vec![InputEvent::new(EventType::KEY, mouse_button_key(code).code(), value)]
        }
        ActionKind::Scroll { direction } if pressed => vec![InputEvent::new(
            EventType::RELATIVE,
            RelativeAxisType::REL_WHEEL.0,
            direction,
        )],
        ActionKind::Scroll { .. } => Vec::new(),
    }
}

/// Converts fractional deltas into whole relative counts.
///
/// The remainder of each call is carried into the next one so that slow
/// stick speeds still move the pointer.
#[derive(Debug, Default, Clone, Copy)]
pub struct MotionAccumulator {
    residual_x: f64,
    residual_y: f64,
}

impl MotionAccumulator {
    /// Adds a delta and returns the whole counts to emit now.
    pub fn accumulate(&mut self, dx: f64, dy: f64) -> (i32, i32) {
        let total_x = self.residual_x + dx;
        let total_y = self.residual_y + dy;
        let whole_x = total_x.trunc();
        let whole_y = total_y.trunc();
        self.residual_x = total_x - whole_x;
        self.residual_y = total_y - whole_y;
        (whole_x as i32, whole_y as i32)
    }
}

/// Builds the relative motion events for whole counts.
#[must_use]
pub fn motion_events(x: i32, y: i32) -> Vec<InputEvent> {
    let mut events = Vec::with_capacity(2);
    if x != 0 {
        events.push(InputEvent::new(EventType::RELATIVE, RelativeAxisType::REL_X.0, x));
    }
    if y != 0 {
        events.push(InputEvent::new(EventType::RELATIVE, RelativeAxisType::REL_Y.0, y));
    }
    events
}

/// Output sink backed by a uinput virtual keyboard + mouse.
pub struct UinputSink {
    device: VirtualDevice,
    name: String,
    motion: MotionAccumulator,
    pointer: (f64, f64),
}

impl std::fmt::Debug for UinputSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UinputSink")
            .field("name", &self.name)
            .field("pointer", &self.pointer)
            .finish_non_exhaustive()
    }
}

impl UinputSink {
    /// Creates the virtual device.
    ///
    /// # Errors
    ///
    /// - `Sink`: the name is empty or longer than 80 bytes
    /// - `Io`: `/dev/uinput` is missing or not writable
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gamepad_mapper::output::UinputSink;
    ///
    /// let sink = UinputSink::create("gamepad-mapper virtual input")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn create(name: &str) -> Result<Self> {
        if name.is_empty() || name.len() > MAX_DEVICE_NAME_LEN {
            return Err(MapperError::Sink(format!(
                "device name must be 1-{} bytes, got {}",
                MAX_DEVICE_NAME_LEN,
                name.len()
            )));
        }

        let mut keys = AttributeSet::<Key>::new();
        for code in 1..=MAX_KEY_CODE {
            keys.insert(Key::new(code));
        }
        keys.insert(Key::BTN_LEFT);
        keys.insert(Key::BTN_RIGHT);
        keys.insert(Key::BTN_MIDDLE);

        let mut axes = AttributeSet::<RelativeAxisType>::new();
        axes.insert(RelativeAxisType::REL_X);
        axes.insert(RelativeAxisType::REL_Y);
        axes.insert(RelativeAxisType::REL_WHEEL);

        let device = VirtualDeviceBuilder::new()?
            .name(name)
            .with_keys(&keys)?
            .with_relative_axes(&axes)?
            .build()?;

        info!("Created uinput device \"{}\"", name);

        Ok(Self {
            device,
            name: name.to_string(),
            motion: MotionAccumulator::default(),
            pointer: (0.0, 0.0),
        })
    }

    fn emit(&mut self, events: &[InputEvent]) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }
        self.device
            .emit(events)
            .map_err(|e| MapperError::Sink(format!("Failed to emit events: {}", e)))
    }
}

impl OutputSink for UinputSink {
    fn dispatch_discrete(&mut self, action: &Action, pressed: bool) -> Result<()> {
        let events = discrete_events(action, pressed);
        debug!("Emitting {} event(s) for {}", events.len(), action.name);
        self.emit(&events)
    }

    fn dispatch_motion(&mut self, dx: f64, dy: f64, move_pointer: bool) -> Result<()> {
        let (x, y) = self.motion.accumulate(dx, dy);
        self.emit(&motion_events(x, y))?;
        if move_pointer {
            self.pointer.0 += dx;
            self.pointer.1 += dy;
        }
        Ok(())
    }

    fn pointer_location(&self) -> Option<(f64, f64)> {
        Some(self.pointer)
    }
}
