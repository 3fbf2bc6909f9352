//! # Stick Poller
//!
//! Samples both thumbsticks on a fixed tick and, per stick mode, emits
//! relative mouse motion or edge-detected virtual d-pad presses.
//!
//! ## Per-Tick Behavior
//!
//! | Mode | Dispatch | Log |
//! |------|----------|-----|
//! | `None` | nothing | nothing |
//! | `MouseAxis` | motion `(x * speed, -y * speed)` while moving | every tick while moving |
//! | `DirectionPad` | press/release on each direction change | activations only |
//!
//! The moving flag is reported for both sticks on every tick regardless of
//! mode.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

use super::dispatch::{Dispatcher, Output};
use crate::device::{DirectionPadInput, GamepadInput};
use crate::error::Result;
use crate::mapping::{Direction, EngineConfig, StickMode, StickSide};

/// Squared magnitude above which a stick counts as moving (magnitude 0.1).
pub const MOVING_THRESHOLD_SQUARED: f64 = 0.01;

/// Axis value a stick must exceed to activate a virtual direction.
pub const DIRECTION_THRESHOLD: f64 = 0.5;

/// Whether `direction` is active for a stick at `(x, y)`.
///
/// ```
/// use gamepad_mapper::engine::poller::direction_active;
/// use gamepad_mapper::mapping::Direction;
///
/// assert!(direction_active(Direction::Up, 0.0, 0.8));
/// assert!(!direction_active(Direction::Up, 0.0, 0.5));
/// assert!(direction_active(Direction::Left, -0.6, 0.0));
/// ```
#[must_use]
pub fn direction_active(direction: Direction, x: f64, y: f64) -> bool {
    match direction {
        Direction::Up => y > DIRECTION_THRESHOLD,
        Direction::Down => y < -DIRECTION_THRESHOLD,
        Direction::Left => x < -DIRECTION_THRESHOLD,
        Direction::Right => x > DIRECTION_THRESHOLD,
    }
}

/// Whether a stick at `(x, y)` counts as moving.
#[must_use]
pub fn is_moving(x: f64, y: f64) -> bool {
    x * x + y * y > MOVING_THRESHOLD_SQUARED
}

struct PolledStick {
    side: StickSide,
    input: Arc<dyn DirectionPadInput>,
    /// Last dispatched state per direction, indexed like `Direction::ALL`.
    active: [bool; 4],
}

pub(crate) struct StickPoller {
    dispatcher: Arc<Dispatcher>,
    config: Arc<EngineConfig>,
    sticks: Vec<PolledStick>,
}

impl StickPoller {
    pub fn new(
        gamepad: &dyn GamepadInput,
        dispatcher: Arc<Dispatcher>,
        config: Arc<EngineConfig>,
    ) -> Self {
        let sticks = StickSide::BOTH
            .into_iter()
            .filter_map(|side| {
                gamepad.thumbstick(side).map(|input| PolledStick {
                    side,
                    input,
                    active: [false; 4],
                })
            })
            .collect();
        Self {
            dispatcher,
            config,
            sticks,
        }
    }

    /// Samples both sticks once, left first.
    ///
    /// A failure on one stick does not skip the other; the first error is
    /// returned.
    pub fn tick(&mut self) -> Result<()> {
        let mut result = Ok(());
        for stick in &mut self.sticks {
            let polled = poll_stick(&self.dispatcher, &self.config, stick);
            if result.is_ok() {
                result = polled;
            }
        }
        result
    }

    /// Ticks every `period` until the dispatcher shuts down.
    pub async fn run(mut self, period: Duration) {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        debug!("Stick poller running every {:?}", period);

        loop {
            ticker.tick().await;
            if !self.dispatcher.is_live() {
                break;
            }
            if let Err(e) = self.tick() {
                warn!("Stick poll failed: {}", e);
            }
        }

        debug!("Stick poller stopped");
    }
}

fn poll_stick(dispatcher: &Dispatcher, config: &EngineConfig, stick: &mut PolledStick) -> Result<()> {
    let x = f64::from(stick.input.x_axis());
    let y = f64::from(stick.input.y_axis());
    let moving = is_moving(x, y);
    let side = stick.side;
    let stick_config = config.stick(side);

    dispatcher.run(|out| {
        out.observer.stick_moving(side.is_left(), moving);

        match stick_config.mode {
            StickMode::None => Ok(()),
            StickMode::MouseAxis if moving => move_mouse(
                out,
                side,
                x * stick_config.speed,
                -y * stick_config.speed,
                stick_config.move_pointer,
            ),
            StickMode::MouseAxis => Ok(()),
            StickMode::DirectionPad => emulate_dpad(out, config, side, &mut stick.active, x, y),
        }
    })
}

fn move_mouse(out: &mut Output, side: StickSide, dx: f64, dy: f64, move_pointer: bool) -> Result<()> {
    out.sink.dispatch_motion(dx, dy, move_pointer)?;

    let mut line = format!("{} -> Mouse Move Delta ({:.1}, {:.1})", side.section(), dx, dy);
    if move_pointer {
        if let Some((lx, ly)) = out.sink.pointer_location() {
            line.push_str(&format!(" Loc ({:.0}, {:.0})", lx, ly));
        }
    }
    out.observer.action_logged(&line);
    Ok(())
}

fn emulate_dpad(
    out: &mut Output,
    config: &EngineConfig,
    side: StickSide,
    state: &mut [bool; 4],
    x: f64,
    y: f64,
) -> Result<()> {
    let section = side.section();

    for (index, direction) in Direction::ALL.into_iter().enumerate() {
        let active = direction_active(direction, x, y);
        if active == state[index] {
            continue;
        }

        if let Some((_, action)) = config.resolve(section, direction.label()) {
            // State advances only after the sink accepts the edge.
            out.sink.dispatch_discrete(action, active)?;
            if active {
                out.observer.action_logged(&format!(
                    "{} {} -> {}",
                    section,
                    direction.label(),
                    action.name
                ));
            }
        }
        state[index] = active;
    }
    Ok(())
}
