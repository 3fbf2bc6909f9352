//! # Dispatch Path
//!
//! The single serialized path from the engine to the output sink and the
//! observer. Button callbacks (device threads) and the stick poller (timer
//! task) both go through [`Dispatcher::run`], which holds one lock for the
//! duration of a report + dispatch + log sequence.
//!
//! The liveness flag is read under that same lock, so once
//! [`Dispatcher::shutdown`] returns no closure passed to `run` executes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::error::Result;
use crate::observer::EngineObserver;
use crate::output::OutputSink;

/// The two shared resources the engine writes to.
pub(crate) struct Output {
    pub sink: Box<dyn OutputSink>,
    pub observer: Arc<dyn EngineObserver>,
}

pub(crate) struct Dispatcher {
    live: AtomicBool,
    output: Mutex<Output>,
}

impl Dispatcher {
    pub fn new(sink: Box<dyn OutputSink>, observer: Arc<dyn EngineObserver>) -> Self {
        Self {
            live: AtomicBool::new(true),
            output: Mutex::new(Output { sink, observer }),
        }
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// Runs `f` with exclusive access to the sink and observer.
    ///
    /// Does nothing and returns `Ok` once the dispatcher is shut down.
    pub fn run<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Output) -> Result<()>,
    {
        // A panic inside a sink leaves nothing half-updated here.
        let mut output = self.output.lock().unwrap_or_else(|e| e.into_inner());
        if !self.is_live() {
            return Ok(());
        }
        f(&mut output)
    }

    /// Stops all further dispatch. Waits for an in-flight `run` to finish.
    pub fn shutdown(&self) {
        let _output = self.output.lock().unwrap_or_else(|e| e.into_inner());
        if self.live.swap(false, Ordering::SeqCst) {
            debug!("Dispatch path shut down");
        }
    }
}
