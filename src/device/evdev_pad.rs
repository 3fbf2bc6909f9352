//! # evdev Gamepad Backend
//!
//! Reads a Linux gamepad through evdev and pushes its state into a
//! [`VirtualGamepad`], which is the surface the engine binds to.
//!
//! ## Controller Detection
//!
//! Without an explicit path, `/dev/input/event*` is scanned in sorted order
//! and the first device exposing both `BTN_SOUTH` and `ABS_X` is used.
//!
//! ## Event Codes
//!
//! | Input | evdev Code | Surface |
//! |-------|------------|---------|
//! | South / East / West / North | `BTN_SOUTH`, `BTN_EAST`, `BTN_WEST`, `BTN_NORTH` | A, B, X, Y |
//! | L1 / L2 | `BTN_TL`, `BTN_TL2` | Left 1, Left 2 |
//! | R1 / R2 | `BTN_TR`, `BTN_TR2` | Right 1, Right 2 |
//! | L3 / R3 | `BTN_THUMBL`, `BTN_THUMBR` | Left Stick, Right Stick |
//! | Select / Start | `BTN_SELECT`, `BTN_START` | Select, Start |
//! | D-Pad | `ABS_HAT0X`, `ABS_HAT0Y` (-1/0/1) | Up, Down, Left, Right |
//! | Left stick | `ABS_X`, `ABS_Y` | left thumbstick |
//! | Right stick | `ABS_RX`, `ABS_RY` | right thumbstick |
//!
//! Stick values are normalized to `[-1, 1]` from the range the device
//! reports, and Y is inverted so that pushing up is positive.

use std::path::Path;
use std::sync::Arc;

use evdev::{AbsoluteAxisType, Device, InputEvent, InputEventKind, Key};
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use super::{DeviceUpdate, PhysicalButton, VirtualGamepad};
use crate::error::{MapperError, Result};
use crate::mapping::{Direction, StickSide};

/// Range assumed when the device does not report one.
pub const FALLBACK_AXIS_MIN: i32 = 0;
/// Range assumed when the device does not report one.
pub const FALLBACK_AXIS_MAX: i32 = 255;

/// Raw range of one absolute axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRange {
    pub min: i32,
    pub max: i32,
}

impl Default for AxisRange {
    fn default() -> Self {
        Self {
            min: FALLBACK_AXIS_MIN,
            max: FALLBACK_AXIS_MAX,
        }
    }
}

impl AxisRange {
    /// Builds a range, falling back to 0..255 when `min >= max`.
    #[must_use]
    pub fn new(min: i32, max: i32) -> Self {
        if min < max {
            Self { min, max }
        } else {
            Self::default()
        }
    }

    /// Maps a raw value onto `[-1, 1]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use gamepad_mapper::device::evdev_pad::AxisRange;
    ///
    /// let range = AxisRange::new(0, 255);
    /// assert_eq!(range.normalize(0), -1.0);
    /// assert_eq!(range.normalize(255), 1.0);
    /// ```
    #[must_use]
    pub fn normalize(&self, value: i32) -> f32 {
        let span = (self.max - self.min) as f32;
        let scaled = 2.0 * (value - self.min) as f32 / span - 1.0;
        scaled.clamp(-1.0, 1.0)
    }
}

/// Axis ranges of both thumbsticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StickRanges {
    pub left_x: AxisRange,
    pub left_y: AxisRange,
    pub right_x: AxisRange,
    pub right_y: AxisRange,
}

/// Turns raw evdev events into [`DeviceUpdate`]s.
///
/// Holds no device handle, so it is tested without hardware.
#[derive(Debug, Default)]
pub struct EventTranslator {
    ranges: StickRanges,
}

impl EventTranslator {
    #[must_use]
    pub fn new(ranges: StickRanges) -> Self {
        Self { ranges }
    }

    /// Translates one event. Sync and unknown events produce nothing.
    #[must_use]
    pub fn translate(&self, event: &InputEvent) -> Vec<DeviceUpdate> {
        match event.kind() {
            InputEventKind::Key(key) => button_for_key(key)
                .map(|button| vec![DeviceUpdate::Button(button, event.value() != 0)])
                .unwrap_or_default(),
            InputEventKind::AbsAxis(axis) => self.translate_axis(axis, event.value()),
            _ => Vec::new(),
        }
    }

    fn translate_axis(&self, axis: AbsoluteAxisType, value: i32) -> Vec<DeviceUpdate> {
        let r = &self.ranges;
        match axis {
            AbsoluteAxisType::ABS_X => {
                vec![DeviceUpdate::StickX(StickSide::Left, r.left_x.normalize(value))]
            }
            AbsoluteAxisType::ABS_Y => {
                vec![DeviceUpdate::StickY(StickSide::Left, -r.left_y.normalize(value))]
            }
            AbsoluteAxisType::ABS_RX => {
                vec![DeviceUpdate::StickX(StickSide::Right, r.right_x.normalize(value))]
            }
            AbsoluteAxisType::ABS_RY => {
                vec![DeviceUpdate::StickY(StickSide::Right, -r.right_y.normalize(value))]
            }
            // Hat: -1 = left/up, 1 = right/down
            AbsoluteAxisType::ABS_HAT0X => vec![
                DeviceUpdate::DPad(Direction::Left, value < 0),
                DeviceUpdate::DPad(Direction::Right, value > 0),
            ],
            AbsoluteAxisType::ABS_HAT0Y => vec![
                DeviceUpdate::DPad(Direction::Up, value < 0),
                DeviceUpdate::DPad(Direction::Down, value > 0),
            ],
            _ => Vec::new(),
        }
    }
}

/// Surface button for an evdev key, if it is one we bind.
#[must_use]
pub fn button_for_key(key: Key) -> Option<PhysicalButton> {
    let button = match key {
        Key::BTN_SOUTH => PhysicalButton::A,
        Key::BTN_EAST => PhysicalButton::B,
        Key::BTN_WEST => PhysicalButton::X,
        Key::BTN_NORTH => PhysicalButton::Y,
        Key::BTN_TL => PhysicalButton::LeftShoulder,
        Key::BTN_TL2 => PhysicalButton::LeftTrigger,
        Key::BTN_TR => PhysicalButton::RightShoulder,
        Key::BTN_TR2 => PhysicalButton::RightTrigger,
        Key::BTN_THUMBL => PhysicalButton::LeftThumbstick,
        Key::BTN_THUMBR => PhysicalButton::RightThumbstick,
        Key::BTN_SELECT => PhysicalButton::Select,
        Key::BTN_START => PhysicalButton::Start,
        _ => return None,
    };
    Some(button)
}

/// A gamepad opened through evdev.
pub struct EvdevGamepad {
    device: Device,
    device_path: String,
    surface: Arc<VirtualGamepad>,
    translator: EventTranslator,
}

impl std::fmt::Debug for EvdevGamepad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvdevGamepad")
            .field("device_path", &self.device_path)
            .field("name", &self.device.name())
            .finish_non_exhaustive()
    }
}

impl EvdevGamepad {
    /// Opens `path`, or the first gamepad under `/dev/input` when `None`.
    ///
    /// # Errors
    ///
    /// - `ControllerNotFound`: no gamepad found during the scan
    /// - `Controller`: `/dev/input` unreadable, or `path` is not a gamepad
    /// - `Io`: `path` could not be opened
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gamepad_mapper::device::EvdevGamepad;
    ///
    /// let gamepad = EvdevGamepad::open(None)?;
    /// println!("Using {}", gamepad.device_path());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(path: Option<&str>) -> Result<Self> {
        let (device, device_path) = match path {
            Some(path) => {
                let device = Device::open(path)?;
                if !looks_like_gamepad(&device) {
                    return Err(MapperError::Controller(format!(
                        "{} does not look like a gamepad",
                        path
                    )));
                }
                (device, path.to_string())
            }
            None => scan()?,
        };

        let ranges = read_ranges(&device);
        debug!("Stick ranges for {}: {:?}", device_path, ranges);
        info!(
            "Opened gamepad \"{}\" at {}",
            device.name().unwrap_or("unknown"),
            device_path
        );

        Ok(Self {
            device,
            device_path,
            surface: Arc::new(VirtualGamepad::new()),
            translator: EventTranslator::new(ranges),
        })
    }

    /// Path of the opened `/dev/input/eventX` node.
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Human-readable device name.
    pub fn name(&self) -> Option<&str> {
        self.device.name()
    }

    /// Surface the engine binds to. Updated by [`Self::run`].
    #[must_use]
    pub fn surface(&self) -> Arc<VirtualGamepad> {
        Arc::clone(&self.surface)
    }

    /// Reads events until the device fails, applying each to the surface.
    ///
    /// Blocks the calling thread. Handler failures are logged and do not
    /// stop the loop.
    ///
    /// # Errors
    ///
    /// Returns `Controller` when reading fails (e.g. the gamepad was
    /// unplugged).
    pub fn run(&mut self) -> Result<()> {
        loop {
            let events = self
                .device
                .fetch_events()
                .map_err(|e| MapperError::Controller(format!("Failed to fetch events: {}", e)))?;
            for event in events {
                for update in self.translator.translate(&event) {
                    if let Err(e) = self.surface.apply(update) {
                        warn!("Dispatch for {:?} failed: {}", update, e);
                    }
                }
            }
        }
    }

    /// Runs [`Self::run`] on a dedicated thread.
    ///
    /// The returned receiver completes when the reader stops, carrying the
    /// error that stopped it.
    pub fn spawn(mut self) -> oneshot::Receiver<MapperError> {
        let (tx, rx) = oneshot::channel();
        std::thread::spawn(move || {
            if let Err(e) = self.run() {
                error!("Gamepad reader stopped: {}", e);
                let _ = tx.send(e);
            }
        });
        rx
    }
}

fn looks_like_gamepad(device: &Device) -> bool {
    let has_south = device
        .supported_keys()
        .map_or(false, |keys| keys.contains(Key::BTN_SOUTH));
    let has_stick = device
        .supported_absolute_axes()
        .map_or(false, |axes| axes.contains(AbsoluteAxisType::ABS_X));
    has_south && has_stick
}

fn scan() -> Result<(Device, String)> {
    let input_dir = Path::new("/dev/input");

    let mut entries: Vec<_> = std::fs::read_dir(input_dir)
        .map_err(|e| MapperError::Controller(format!("Failed to read /dev/input: {}", e)))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| MapperError::Controller(format!("Failed to read directory entry: {}", e)))?;

    entries.sort_by_key(|entry| entry.path());

    for entry in entries {
        let path = entry.path();
        let is_event = path
            .file_name()
            .map_or(false, |name| name.to_string_lossy().starts_with("event"));
        if !is_event {
            continue;
        }

        match Device::open(&path) {
            Ok(device) => {
                debug!(
                    "Found input device: {} ({})",
                    path.display(),
                    device.name().unwrap_or("unnamed")
                );
                if looks_like_gamepad(&device) {
                    return Ok((device, path.to_string_lossy().to_string()));
                }
            }
            Err(e) => debug!("Could not open {}: {}", path.display(), e),
        }
    }

    Err(MapperError::ControllerNotFound)
}

fn read_ranges(device: &Device) -> StickRanges {
    let state = match device.get_abs_state() {
        Ok(state) => state,
        Err(e) => {
            warn!("Could not read axis ranges, assuming 0..255: {}", e);
            return StickRanges::default();
        }
    };
    let range = |axis: AbsoluteAxisType| {
        let info = &state[axis.0 as usize];
        AxisRange::new(info.minimum, info.maximum)
    };
    StickRanges {
        left_x: range(AbsoluteAxisType::ABS_X),
        left_y: range(AbsoluteAxisType::ABS_Y),
        right_x: range(AbsoluteAxisType::ABS_RX),
        right_y: range(AbsoluteAxisType::ABS_RY),
    }
}
