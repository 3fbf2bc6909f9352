//! # Observer Module
//!
//! Side channel through which the engine reports what it did.
//!
//! This module handles:
//! - The [`EngineObserver`] hook with its three channels (press state,
//!   stick moving, action log line)
//! - [`TracingObserver`], which forwards everything to `tracing`
//! - [`ChannelObserver`], which forwards everything over a Tokio channel
//!   for a UI to consume

use tokio::sync::mpsc;
use tracing::{debug, info, trace};

/// Receiver of engine reports.
///
/// Calls arrive from the poller task and from device callback threads, but
/// never concurrently: the engine serializes them behind its dispatch path.
/// No call happens after the engine has been disposed.
pub trait EngineObserver: Send + Sync {
    /// Raw, unswapped press state of a physical button.
    fn button_changed(&self, _label: &str, _pressed: bool) {}

    /// Stick moving flag, reported every poller tick for both sticks.
    fn stick_moving(&self, _is_left: bool, _moving: bool) {}

    /// Human-readable line describing a dispatched action.
    fn action_logged(&self, _line: &str) {}
}

/// Observer that writes every report to `tracing`.
///
/// Action lines go to `info!` under the `gamepad_mapper::actions` target so
/// they can be filtered separately, e.g. `RUST_LOG=gamepad_mapper::actions=info`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl EngineObserver for TracingObserver {
    fn button_changed(&self, label: &str, pressed: bool) {
        debug!("Button {} {}", label, if pressed { "down" } else { "up" });
    }

    fn stick_moving(&self, is_left: bool, moving: bool) {
        trace!(
            "{} stick moving: {}",
            if is_left { "Left" } else { "Right" },
            moving
        );
    }

    fn action_logged(&self, line: &str) {
        info!(target: "gamepad_mapper::actions", "{}", line);
    }
}

/// One report, as delivered by [`ChannelObserver`].
#[derive(Debug, Clone, PartialEq)]
pub enum ObserverEvent {
    Button { label: String, pressed: bool },
    StickMoving { is_left: bool, moving: bool },
    Log(String),
}

/// Observer that forwards every report over an unbounded Tokio channel.
///
/// Sending never blocks. Reports are dropped silently once the receiver is
/// gone.
///
/// # Examples
///
/// ```
/// use gamepad_mapper::observer::{ChannelObserver, EngineObserver, ObserverEvent};
///
/// let (observer, mut rx) = ChannelObserver::new();
/// observer.action_logged("A pressed -> Space");
/// assert_eq!(rx.try_recv().unwrap(), ObserverEvent::Log("A pressed -> Space".into()));
/// ```
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<ObserverEvent>,
}

impl ChannelObserver {
    /// Creates the observer and the receiving end of its channel.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ObserverEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: ObserverEvent) {
        // Receiver dropped: the UI is gone, nothing to report to.
        let _ = self.tx.send(event);
    }
}

impl EngineObserver for ChannelObserver {
    fn button_changed(&self, label: &str, pressed: bool) {
        self.send(ObserverEvent::Button {
            label: label.to_string(),
            pressed,
        });
    }

    fn stick_moving(&self, is_left: bool, moving: bool) {
        self.send(ObserverEvent::StickMoving { is_left, moving });
    }

    fn action_logged(&self, line: &str) {
        self.send(ObserverEvent::Log(line.to_string()));
    }
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Observer that records every report.
    #[derive(Clone, Default)]
    pub struct RecordingObserver {
        pub events: Arc<Mutex<Vec<ObserverEvent>>>,
    }

    impl RecordingObserver {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn events(&self) -> Vec<ObserverEvent> {
            self.events.lock().unwrap().clone()
        }

        pub fn logs(&self) -> Vec<String> {
            self.events()
                .into_iter()
                .filter_map(|event| match event {
                    ObserverEvent::Log(line) => Some(line),
                    _ => None,
                })
                .collect()
        }

        pub fn buttons(&self) -> Vec<(String, bool)> {
            self.events()
                .into_iter()
                .filter_map(|event| match event {
                    ObserverEvent::Button { label, pressed } => Some((label, pressed)),
                    _ => None,
                })
                .collect()
        }

        pub fn stick_reports(&self) -> Vec<(bool, bool)> {
            self.events()
                .into_iter()
                .filter_map(|event| match event {
                    ObserverEvent::StickMoving { is_left, moving } => Some((is_left, moving)),
                    _ => None,
                })
                .collect()
        }
    }

    impl EngineObserver for RecordingObserver {
        fn button_changed(&self, label: &str, pressed: bool) {
            self.events.lock().unwrap().push(ObserverEvent::Button {
                label: label.to_string(),
                pressed,
            });
        }

        fn stick_moving(&self, is_left: bool, moving: bool) {
            self.events
                .lock()
                .unwrap()
                .push(ObserverEvent::StickMoving { is_left, moving });
        }

        fn action_logged(&self, line: &str) {
            self.events
                .lock()
                .unwrap()
                .push(ObserverEvent::Log(line.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Silent;
    impl EngineObserver for Silent {}

    #[test]
    fn test_default_methods_are_noops() {
        let observer = Silent;
        observer.button_changed("A", true);
        observer.stick_moving(true, false);
        observer.action_logged("nothing");
    }

    #[test]
    fn test_channel_observer_forwards_in_order() {
        let (observer, mut rx) = ChannelObserver::new();

        observer.button_changed("A", true);
        observer.action_logged("A pressed -> Space");
        observer.stick_moving(false, true);

        assert_eq!(
            rx.try_recv().unwrap(),
            ObserverEvent::Button {
                label: "A".to_string(),
                pressed: true
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            ObserverEvent::Log("A pressed -> Space".to_string())
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            ObserverEvent::StickMoving {
                is_left: false,
                moving: true
            }
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_channel_observer_survives_closed_receiver() {
        let (observer, rx) = ChannelObserver::new();
        drop(rx);
        observer.action_logged("dropped");
    }

    #[test]
    fn test_tracing_observer_does_not_panic() {
        let observer = TracingObserver;
        observer.button_changed("B", false);
        observer.stick_moving(true, true);
        observer.action_logged("B pressed -> Escape");
    }
}
