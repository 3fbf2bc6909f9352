//! # Output Module
//!
//! Turns resolved actions into synthetic keyboard and mouse events.
//!
//! This module handles:
//! - The [`OutputSink`] contract the engine dispatches through
//! - A Linux uinput implementation ([`uinput::UinputSink`])

pub mod uinput;

use crate::error::Result;
use crate::mapping::Action;

pub use uinput::UinputSink;

/// Consumer of resolved actions.
///
/// Both dispatch operations are called at up to 60 Hz and must return
/// without blocking. Errors propagate to whoever triggered the dispatch.
#[cfg_attr(test, mockall::automock)]
pub trait OutputSink: Send {
    /// Emits a discrete action.
    ///
    /// - `Key`: key down when `pressed`, key up otherwise
    /// - `MouseButton`: button down/up at the current pointer location
    /// - `Scroll`: one wheel tick when `pressed`; nothing on release
    fn dispatch_discrete(&mut self, action: &Action, pressed: bool) -> Result<()>;

    /// Emits relative mouse motion of `(dx, dy)`.
    ///
    /// With `move_pointer` the cursor follows the delta; without it only
    /// the delta event is produced.
    fn dispatch_motion(&mut self, dx: f64, dy: f64, move_pointer: bool) -> Result<()>;

    /// Current pointer location, if the sink knows it.
    fn pointer_location(&self) -> Option<(f64, f64)> {
        None
    }
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use crate::error::MapperError;
    use std::sync::{Arc, Mutex};

    /// One call recorded by [`RecordingSink`].
    #[derive(Debug, Clone, PartialEq)]
    pub enum SinkCall {
        Discrete(Action, bool),
        Motion(f64, f64, bool),
    }

    /// Sink that records every call for later inspection.
    #[derive(Clone, Default)]
    pub struct RecordingSink {
        pub calls: Arc<Mutex<Vec<SinkCall>>>,
        pub fail: Arc<Mutex<bool>>,
        pub location: Option<(f64, f64)>,
    }

    impl RecordingSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_location(x: f64, y: f64) -> Self {
            Self {
                location: Some((x, y)),
                ..Self::default()
            }
        }

        pub fn calls(&self) -> Vec<SinkCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn discrete_calls(&self) -> Vec<(Action, bool)> {
            self.calls()
                .into_iter()
                .filter_map(|call| match call {
                    SinkCall::Discrete(action, pressed) => Some((action, pressed)),
                    SinkCall::Motion(..) => None,
                })
                .collect()
        }

        pub fn motion_calls(&self) -> Vec<(f64, f64, bool)> {
            self.calls()
                .into_iter()
                .filter_map(|call| match call {
                    SinkCall::Motion(dx, dy, move_pointer) => Some((dx, dy, move_pointer)),
                    SinkCall::Discrete(..) => None,
                })
                .collect()
        }

        pub fn set_fail(&self, fail: bool) {
            *self.fail.lock().unwrap() = fail;
        }

        fn check(&self) -> Result<()> {
            if *self.fail.lock().unwrap() {
                return Err(MapperError::Sink("mock sink failure".to_string()));
            }
            Ok(())
        }
    }

    impl OutputSink for RecordingSink {
        fn dispatch_discrete(&mut self, action: &Action, pressed: bool) -> Result<()> {
            self.check()?;
            self.calls
                .lock()
                .unwrap()
                .push(SinkCall::Discrete(action.clone(), pressed));
            Ok(())
        }

        fn dispatch_motion(&mut self, dx: f64, dy: f64, move_pointer: bool) -> Result<()> {
            self.check()?;
            self.calls
                .lock()
                .unwrap()
                .push(SinkCall::Motion(dx, dy, move_pointer));
            Ok(())
        }

        fn pointer_location(&self) -> Option<(f64, f64)> {
            self.location
        }
    }
}
