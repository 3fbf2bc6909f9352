//! # Engine Module
//!
//! Binds a gamepad surface to an output sink under one immutable
//! [`EngineConfig`].
//!
//! This module handles:
//! - Registering an edge handler on every discrete input (push)
//! - Polling both thumbsticks on a fixed tick (pull)
//! - Serializing both sources onto one dispatch path
//! - Disposal: after it begins, nothing reaches the sink or the observer
//!
//! An engine is never reconfigured. When any setting changes, dispose it
//! and build a new one.
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use gamepad_mapper::device::EvdevGamepad;
//! use gamepad_mapper::engine::{InputEngine, DEFAULT_POLL_INTERVAL};
//! use gamepad_mapper::mapping::EngineConfig;
//! use gamepad_mapper::observer::TracingObserver;
//! use gamepad_mapper::output::UinputSink;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let gamepad = EvdevGamepad::open(None)?;
//! let sink = UinputSink::create("gamepad-mapper virtual input")?;
//! let mut engine = InputEngine::start(
//!     &*gamepad.surface(),
//!     EngineConfig::default(),
//!     sink,
//!     Arc::new(TracingObserver),
//!     DEFAULT_POLL_INTERVAL,
//! );
//! let _stopped = gamepad.spawn();
//! // ...
//! engine.dispose();
//! # Ok(())
//! # }
//! ```

mod binding;
mod dispatch;
pub mod poller;

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::info;

use crate::device::{ButtonInput, GamepadInput};
use crate::error::Result;
use crate::mapping::EngineConfig;
use crate::observer::EngineObserver;
use crate::output::OutputSink;
use dispatch::Dispatcher;
use poller::StickPoller;

/// Stick poller cadence (~60 Hz).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(16);

/// A running input mapping session.
pub struct InputEngine {
    dispatcher: Arc<Dispatcher>,
    bound: Vec<Arc<dyn ButtonInput>>,
    poller: Option<StickPoller>,
    task: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for InputEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputEngine")
            .field("live", &self.is_live())
            .field("bound", &self.bound.len())
            .field("polling", &self.task.is_some())
            .finish()
    }
}

impl InputEngine {
    /// Registers button handlers without starting the stick timer.
    ///
    /// Sticks are then sampled only through [`Self::poll`].
    pub fn attach(
        gamepad: &dyn GamepadInput,
        config: EngineConfig,
        sink: impl OutputSink + 'static,
        observer: Arc<dyn EngineObserver>,
    ) -> Self {
        let dispatcher = Arc::new(Dispatcher::new(Box::new(sink), observer));
        let config = Arc::new(config);

        let bound = binding::bind_all(gamepad, &dispatcher, &config);
        let poller = StickPoller::new(gamepad, Arc::clone(&dispatcher), config);

        Self {
            dispatcher,
            bound,
            poller: Some(poller),
            task: None,
        }
    }

    /// Registers button handlers and starts polling the sticks every
    /// `period` on a Tokio task.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn start(
        gamepad: &dyn GamepadInput,
        config: EngineConfig,
        sink: impl OutputSink + 'static,
        observer: Arc<dyn EngineObserver>,
        period: Duration,
    ) -> Self {
        let mut engine = Self::attach(gamepad, config, sink, observer);
        if let Some(poller) = engine.poller.take() {
            engine.task = Some(tokio::spawn(poller.run(period)));
        }
        info!(
            "Input engine started: {} buttons bound, polling every {:?}",
            engine.bound.len(),
            period
        );
        engine
    }

    /// Samples the sticks once.
    ///
    /// Does nothing on a started engine, whose poller belongs to its timer
    /// task.
    ///
    /// # Errors
    ///
    /// Returns the first sink error of the tick.
    pub fn poll(&mut self) -> Result<()> {
        match self.poller.as_mut() {
            Some(poller) => poller.tick(),
            None => Ok(()),
        }
    }

    /// `false` once [`Self::dispose`] has begun.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.dispatcher.is_live()
    }

    /// Stops all dispatch, detaches every button handler and stops the
    /// stick timer. Safe to call more than once.
    pub fn dispose(&mut self) {
        let was_live = self.dispatcher.is_live();
        self.dispatcher.shutdown();

        for button in self.bound.drain(..) {
            button.clear_handler();
        }
        self.poller = None;
        if let Some(task) = self.task.take() {
            task.abort();
        }

        if was_live {
            info!("Input engine disposed");
        }
    }
}

impl Drop for InputEngine {
    fn drop(&mut self) {
        self.dispose();
    }
}
