//! # In-Memory Gamepad
//!
//! A [`GamepadInput`] whose state is pushed in from outside: by a hardware
//! backend such as [`super::EvdevGamepad`], or directly by tests.
//!
//! Buttons call their handler only when the pressed state changes, while
//! holding the button's handler lock, so edges of one button are delivered
//! one at a time and in order.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use super::{ButtonHandler, ButtonInput, DeviceUpdate, DirectionPadInput, GamepadInput, PhysicalButton};
use crate::error::Result;
use crate::mapping::{Direction, StickSide};

/// Button with a single replaceable handler.
#[derive(Default)]
pub struct VirtualButton {
    handler: Mutex<Option<ButtonHandler>>,
    pressed: AtomicBool,
}

impl std::fmt::Debug for VirtualButton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualButton")
            .field("pressed", &self.is_pressed())
            .field("has_handler", &self.has_handler())
            .finish()
    }
}

impl VirtualButton {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the pressed state and fires the handler on a change.
    ///
    /// # Errors
    ///
    /// Returns whatever the handler returns.
    pub fn set_pressed(&self, pressed: bool) -> Result<()> {
        let handler = self.handler.lock().unwrap_or_else(|e| e.into_inner());
        if self.pressed.swap(pressed, Ordering::SeqCst) == pressed {
            return Ok(());
        }
        match handler.as_ref() {
            Some(handler) => handler(pressed),
            None => Ok(()),
        }
    }

    #[must_use]
    pub fn is_pressed(&self) -> bool {
        self.pressed.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn has_handler(&self) -> bool {
        self.handler
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}

impl ButtonInput for VirtualButton {
    fn set_handler(&self, handler: ButtonHandler) {
        *self.handler.lock().unwrap_or_else(|e| e.into_inner()) = Some(handler);
    }

    fn clear_handler(&self) {
        *self.handler.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

/// f32 stored as its bit pattern.
#[derive(Debug, Default)]
struct AtomicAxis(AtomicU32);

impl AtomicAxis {
    fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    fn store(&self, value: f32) {
        self.0.store(value.clamp(-1.0, 1.0).to_bits(), Ordering::Relaxed);
    }
}

/// Two axes, plus four direction buttons for a digital d-pad.
#[derive(Debug, Default)]
pub struct VirtualPad {
    x: AtomicAxis,
    y: AtomicAxis,
    buttons: Option<[Arc<VirtualButton>; 4]>,
}

impl VirtualPad {
    /// Analog stick: axes only.
    #[must_use]
    pub fn stick() -> Self {
        Self::default()
    }

    /// Digital d-pad: axes plus Up/Down/Left/Right buttons.
    #[must_use]
    pub fn dpad() -> Self {
        Self {
            buttons: Some(std::array::from_fn(|_| Arc::new(VirtualButton::new()))),
            ..Self::default()
        }
    }

    /// Sets both axes. Values are clamped to `[-1, 1]`.
    pub fn set_axes(&self, x: f32, y: f32) {
        self.x.store(x);
        self.y.store(y);
    }

    pub fn set_x(&self, x: f32) {
        self.x.store(x);
    }

    pub fn set_y(&self, y: f32) {
        self.y.store(y);
    }

    /// Direction button, if this is a d-pad.
    #[must_use]
    pub fn button(&self, direction: Direction) -> Option<&Arc<VirtualButton>> {
        let index = Direction::ALL.iter().position(|d| *d == direction)?;
        self.buttons.as_ref().map(|buttons| &buttons[index])
    }

    /// Presses or releases one direction and keeps the axes in step.
    ///
    /// Each axis follows both of its buttons: Up and Down held together
    /// cancel out to 0.
    ///
    /// # Errors
    ///
    /// Returns whatever the direction's handler returns.
    pub fn set_direction(&self, direction: Direction, pressed: bool) -> Result<()> {
        let held = |d: Direction| {
            if d == direction {
                pressed
            } else {
                self.button(d).map_or(false, |b| b.is_pressed())
            }
        };
        let axis = |positive: Direction, negative: Direction| {
            f32::from(u8::from(held(positive))) - f32::from(u8::from(held(negative)))
        };
        match direction {
            Direction::Up | Direction::Down => self.set_y(axis(Direction::Up, Direction::Down)),
            Direction::Left | Direction::Right => {
                self.set_x(axis(Direction::Right, Direction::Left))
            }
        }
        match self.button(direction) {
            Some(button) => button.set_pressed(pressed),
            None => Ok(()),
        }
    }
}

impl DirectionPadInput for VirtualPad {
    fn x_axis(&self) -> f32 {
        self.x.load()
    }

    fn y_axis(&self) -> f32 {
        self.y.load()
    }

    fn direction(&self, direction: Direction) -> Option<Arc<dyn ButtonInput>> {
        self.button(direction)
            .map(|button| Arc::clone(button) as Arc<dyn ButtonInput>)
    }
}

/// In-memory extended gamepad.
///
/// # Examples
///
/// ```
/// use gamepad_mapper::device::{PhysicalButton, VirtualGamepad};
/// use gamepad_mapper::mapping::StickSide;
///
/// let pad = VirtualGamepad::new();
/// pad.set_button(PhysicalButton::A, true)?;
/// pad.set_stick(StickSide::Left, 0.0, 1.0);
/// # Ok::<(), gamepad_mapper::error::MapperError>(())
/// ```
#[derive(Debug)]
pub struct VirtualGamepad {
    buttons: BTreeMap<PhysicalButton, Arc<VirtualButton>>,
    dpad: Option<Arc<VirtualPad>>,
    left_stick: Arc<VirtualPad>,
    right_stick: Arc<VirtualPad>,
}

impl Default for VirtualGamepad {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualGamepad {
    /// Gamepad with every button, a d-pad and two sticks.
    #[must_use]
    pub fn new() -> Self {
        Self::with_buttons(&PhysicalButton::ALL, true)
    }

    /// Gamepad exposing only `buttons`, with or without a d-pad.
    #[must_use]
    pub fn with_buttons(buttons: &[PhysicalButton], has_dpad: bool) -> Self {
        Self {
            buttons: buttons
                .iter()
                .map(|button| (*button, Arc::new(VirtualButton::new())))
                .collect(),
            dpad: has_dpad.then(|| Arc::new(VirtualPad::dpad())),
            left_stick: Arc::new(VirtualPad::stick()),
            right_stick: Arc::new(VirtualPad::stick()),
        }
    }

    /// Presses or releases a button. Unknown buttons are ignored.
    ///
    /// # Errors
    ///
    /// Returns whatever the button's handler returns.
    pub fn set_button(&self, button: PhysicalButton, pressed: bool) -> Result<()> {
        match self.buttons.get(&button) {
            Some(b) => b.set_pressed(pressed),
            None => Ok(()),
        }
    }

    /// Presses or releases a d-pad direction.
    ///
    /// # Errors
    ///
    /// Returns whatever the direction's handler returns.
    pub fn set_dpad(&self, direction: Direction, pressed: bool) -> Result<()> {
        match &self.dpad {
            Some(dpad) => dpad.set_direction(direction, pressed),
            None => Ok(()),
        }
    }

    /// Sets both axes of a thumbstick.
    pub fn set_stick(&self, side: StickSide, x: f32, y: f32) {
        self.stick(side).set_axes(x, y);
    }

    /// Applies an update from a hardware backend.
    ///
    /// # Errors
    ///
    /// Returns whatever the affected handler returns.
    pub fn apply(&self, update: DeviceUpdate) -> Result<()> {
        match update {
            DeviceUpdate::Button(button, pressed) => self.set_button(button, pressed),
            DeviceUpdate::DPad(direction, pressed) => self.set_dpad(direction, pressed),
            DeviceUpdate::StickX(side, x) => {
                self.stick(side).set_x(x);
                Ok(())
            }
            DeviceUpdate::StickY(side, y) => {
                self.stick(side).set_y(y);
                Ok(())
            }
        }
    }

    #[must_use]
    pub fn button_pressed(&self, button: PhysicalButton) -> bool {
        self.buttons.get(&button).map_or(false, |b| b.is_pressed())
    }

    #[must_use]
    pub fn dpad_pressed(&self, direction: Direction) -> bool {
        self.dpad
            .as_ref()
            .and_then(|dpad| dpad.button(direction))
            .map_or(false, |b| b.is_pressed())
    }

    /// Number of buttons (including d-pad directions) with a handler.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        let buttons = self.buttons.values().filter(|b| b.has_handler()).count();
        let directions = self
            .dpad
            .as_ref()
            .map(|dpad| {
                Direction::ALL
                    .iter()
                    .filter_map(|d| dpad.button(*d))
                    .filter(|b| b.has_handler())
                    .count()
            })
            .unwrap_or(0);
        buttons + directions
    }

    fn stick(&self, side: StickSide) -> &Arc<VirtualPad> {
        match side {
            StickSide::Left => &self.left_stick,
            StickSide::Right => &self.right_stick,
        }
    }
}

impl GamepadInput for VirtualGamepad {
    fn button(&self, button: PhysicalButton) -> Option<Arc<dyn ButtonInput>> {
        self.buttons
            .get(&button)
            .map(|b| Arc::clone(b) as Arc<dyn ButtonInput>)
    }

    fn dpad(&self) -> Option<Arc<dyn DirectionPadInput>> {
        self.dpad
            .as_ref()
            .map(|dpad| Arc::clone(dpad) as Arc<dyn DirectionPadInput>)
    }

    fn thumbstick(&self, side: StickSide) -> Option<Arc<dyn DirectionPadInput>> {
        Some(Arc::clone(self.stick(side)) as Arc<dyn DirectionPadInput>)
    }
}
