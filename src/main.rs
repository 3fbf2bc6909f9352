//! # Gamepad Mapper
//!
//! Remap a gamepad's buttons and analog sticks onto virtual keyboard and
//! mouse events.
//!
//! This application reads the first gamepad it finds through evdev, applies
//! the selected mapping profile and emits the result through a uinput
//! virtual keyboard/mouse.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info, warn, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use gamepad_mapper::config::{Config, ControllerConfig, LoggingConfig};
use gamepad_mapper::device::EvdevGamepad;
use gamepad_mapper::engine::InputEngine;
use gamepad_mapper::mapping::EngineConfig;
use gamepad_mapper::observer::TracingObserver;
use gamepad_mapper::output::UinputSink;
use gamepad_mapper::profile::ProfileStore;

/// Configuration file used when no path is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// File name prefix of the rolling log files
const LOG_FILE_PREFIX: &str = "gamepad-mapper.log";

/// Initialize logging
///
/// Installs a stderr layer filtered by `RUST_LOG` with `level` as the
/// default, plus a daily rolling file layer when `log_dir` is set. The
/// returned guard must be held until exit so buffered lines are flushed.
fn init_logging(logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let level: Level = logging
        .level
        .parse()
        .with_context(|| format!("Invalid log level: {}", logging.level))?;
    let filter = EnvFilter::from_default_env().add_directive(LevelFilter::from_level(level).into());

    let (file_layer, guard) = if logging.log_dir.is_empty() {
        (None, None)
    } else {
        let appender = tracing_appender::rolling::daily(&logging.log_dir, LOG_FILE_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer().with_writer(writer).with_ansi(false);
        (Some(layer), Some(guard))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    Ok(guard)
}

/// How a gamepad session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    /// The reader stopped; scan for a gamepad again
    Disconnected,
    /// Ctrl+C
    Shutdown,
}

/// Scan for a gamepad every `reconnect_interval` until one opens.
///
/// Returns `None` when Ctrl+C arrives first.
async fn wait_for_gamepad(controller: &ControllerConfig) -> Option<EvdevGamepad> {
    let mut announced = false;
    loop {
        match EvdevGamepad::open(controller.device_path()) {
            Ok(gamepad) => return Some(gamepad),
            Err(e) if !announced => {
                warn!(
                    "No gamepad available ({}), rescanning every {:?}",
                    e,
                    controller.reconnect_interval()
                );
                announced = true;
            }
            Err(e) => debug!("Gamepad scan failed: {}", e),
        }

        tokio::select! {
            _ = tokio::time::sleep(controller.reconnect_interval()) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                return None;
            }
        }
    }
}

/// Run one engine over `gamepad` until it disconnects or Ctrl+C arrives.
///
/// Every session gets a fresh virtual output device, so keys still held
/// when a gamepad vanishes are released with the old device.
async fn run_session(
    gamepad: EvdevGamepad,
    config: &Config,
    engine_config: &EngineConfig,
) -> Result<SessionEnd> {
    let sink = UinputSink::create(&config.output.device_name)?;

    let mut engine = InputEngine::start(
        &*gamepad.surface(),
        engine_config.clone(),
        sink,
        Arc::new(TracingObserver),
        config.controller.poll_interval(),
    );
    let reader_stopped = gamepad.spawn();

    let end = tokio::select! {
        _ = reader_stopped => {
            warn!("Gamepad disconnected, rescanning...");
            SessionEnd::Disconnected
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
            SessionEnd::Shutdown
        }
    };

    engine.dispose();
    Ok(end)
}

/// Main entry point for Gamepad Mapper
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (first argument, default `config/default.toml`)
///    - Set up logging
///    - Load the profile store and build the engine config
///
/// 2. **Session Loop**
///    - Wait for a gamepad, rescanning every `reconnect_interval_ms`
///    - Create the virtual output device and start the input engine
///    - Read gamepad events on a dedicated thread
///    - On disconnect, dispose the engine and go back to waiting
///
/// 3. **Graceful Shutdown**
///    - On Ctrl+C, dispose the engine and exit
///
/// # Errors
///
/// Returns error if:
/// - The configuration or profile store cannot be loaded
/// - `/dev/uinput` cannot be opened
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/default.toml
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;

    let _log_guard = init_logging(&config.logging)?;

    info!("Gamepad Mapper v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut store = ProfileStore::load(&config.profiles.path)
        .with_context(|| format!("Failed to load profiles from {}", config.profiles.path))?;
    if !config.profiles.selected.is_empty() {
        store.select(&config.profiles.selected)?;
    }
    let profile = store.selected();
    info!(
        "Using profile \"{}\" ({} bindings)",
        profile.name,
        profile.mappings.len()
    );
    let engine_config = profile.engine_config();

    info!("Press Ctrl+C to exit");

    while let Some(gamepad) = wait_for_gamepad(&config.controller).await {
        if run_session(gamepad, &config, &engine_config).await? == SessionEnd::Shutdown {
            break;
        }
    }

    Ok(())
}
