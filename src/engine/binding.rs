//! # Button Bindings
//!
//! Registers one edge handler per discrete input and turns each edge into
//! a press report, a mapping lookup and (when bound) a sink dispatch.

use std::sync::Arc;

use tracing::debug;

use super::dispatch::Dispatcher;
use crate::device::{ButtonHandler, ButtonInput, GamepadInput, PhysicalButton};
use crate::error::Result;
use crate::mapping::{Direction, EngineConfig, Section};

/// Handles one edge of the physical input `(section, label)`.
///
/// The press report carries the physical label; the lookup and the log line
/// use the effective (post-swap) label. Only presses are logged.
pub(crate) fn handle_edge(
    dispatcher: &Dispatcher,
    config: &EngineConfig,
    section: Section,
    label: &str,
    pressed: bool,
) -> Result<()> {
    dispatcher.run(|out| {
        out.observer.button_changed(label, pressed);

        let Some((effective, action)) = config.resolve(section, label) else {
            return Ok(());
        };

        out.sink.dispatch_discrete(action, pressed)?;
        if pressed {
            out.observer
                .action_logged(&format!("{} pressed -> {}", effective, action.name));
        }
        Ok(())
    })
}

fn handler(
    dispatcher: &Arc<Dispatcher>,
    config: &Arc<EngineConfig>,
    section: Section,
    label: &'static str,
) -> ButtonHandler {
    let dispatcher = Arc::clone(dispatcher);
    let config = Arc::clone(config);
    Box::new(move |pressed| handle_edge(&dispatcher, &config, section, label, pressed))
}

/// Registers a handler on every button and d-pad direction `gamepad`
/// exposes, in binding order. Returns the buttons so they can be detached.
pub(crate) fn bind_all(
    gamepad: &dyn GamepadInput,
    dispatcher: &Arc<Dispatcher>,
    config: &Arc<EngineConfig>,
) -> Vec<Arc<dyn ButtonInput>> {
    let mut bound = Vec::new();

    for button in PhysicalButton::ALL {
        if let Some(input) = gamepad.button(button) {
            input.set_handler(handler(dispatcher, config, Section::Buttons, button.label()));
            bound.push(input);
        }
    }

    if let Some(dpad) = gamepad.dpad() {
        for direction in Direction::ALL {
            if let Some(input) = dpad.direction(direction) {
                input.set_handler(handler(dispatcher, config, Section::DPad, direction.label()));
                bound.push(input);
            }
        }
    }

    debug!("Bound {} button handlers", bound.len());
    bound
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::VirtualGamepad;
    use crate::mapping::{Action, MappingKey};
    use crate::observer::mocks::RecordingObserver;
    use crate::output::mocks::RecordingSink;

    fn setup(
        config: EngineConfig,
    ) -> (Arc<Dispatcher>, Arc<EngineConfig>, RecordingSink, RecordingObserver) {
        let sink = RecordingSink::new();
        let observer = RecordingObserver::new();
        let dispatcher = Arc::new(Dispatcher::new(
            Box::new(sink.clone()),
            Arc::new(observer.clone()),
        ));
        (dispatcher, Arc::new(config), sink, observer)
    }

    fn config_with(key: MappingKey, action: Action) -> EngineConfig {
        let mut config = EngineConfig::default();
        config.mappings.insert(key, action);
        config
    }

    #[test]
    fn test_bind_all_covers_every_input() {
        let pad = VirtualGamepad::new();
        let (dispatcher, config, _, _) = setup(EngineConfig::default());

        let bound = bind_all(&pad, &dispatcher, &config);

        // 12 buttons + 4 d-pad directions
        assert_eq!(bound.len(), 16);
        assert_eq!(pad.handler_count(), 16);
    }

    #[test]
    fn test_bind_all_skips_missing_inputs() {
        let pad = VirtualGamepad::with_buttons(&[PhysicalButton::A, PhysicalButton::Start], false);
        let (dispatcher, config, _, _) = setup(EngineConfig::default());

        assert_eq!(bind_all(&pad, &dispatcher, &config).len(), 2);
    }

    #[test]
    fn test_press_logs_release_does_not() {
        let (dispatcher, config, sink, observer) = setup(config_with(
            MappingKey::new(Section::Buttons, "Left 1"),
            Action::key(42, "Shift"),
        ));

        handle_edge(&dispatcher, &config, Section::Buttons, "Left 1", true).unwrap();
        handle_edge(&dispatcher, &config, Section::Buttons, "Left 1", false).unwrap();

        assert_eq!(
            sink.discrete_calls(),
            vec![(Action::key(42, "Shift"), true), (Action::key(42, "Shift"), false)]
        );
        assert_eq!(observer.logs(), vec!["Left 1 pressed -> Shift"]);
    }

    #[test]
    fn test_press_report_is_physical_log_is_effective() {
        let mut config = config_with(
            MappingKey::new(Section::Buttons, "B"),
            Action::key(1, "Escape"),
        );
        config.swap_face_buttons = true;
        let (dispatcher, config, sink, observer) = setup(config);

        handle_edge(&dispatcher, &config, Section::Buttons, "A", true).unwrap();

        assert_eq!(observer.buttons(), vec![("A".to_string(), true)]);
        assert_eq!(observer.logs(), vec!["B pressed -> Escape"]);
        assert_eq!(sink.discrete_calls(), vec![(Action::key(1, "Escape"), true)]);
    }

    #[test]
    fn test_unmapped_edge_reports_but_does_not_dispatch() {
        let (dispatcher, config, sink, observer) = setup(EngineConfig::default());

        handle_edge(&dispatcher, &config, Section::DPad, "Up", true).unwrap();

        assert!(sink.calls().is_empty());
        assert_eq!(observer.buttons(), vec![("Up".to_string(), true)]);
        assert!(observer.logs().is_empty());
    }

    #[test]
    fn test_failed_dispatch_is_not_logged() {
        let (dispatcher, config, sink, observer) = setup(config_with(
            MappingKey::new(Section::Buttons, "A"),
            Action::key(57, "Space"),
        ));
        sink.set_fail(true);

        assert!(handle_edge(&dispatcher, &config, Section::Buttons, "A", true).is_err());
        assert!(observer.logs().is_empty());
    }

    #[test]
    fn test_dpad_handler_uses_dpad_section() {
        let pad = VirtualGamepad::new();
        let (dispatcher, config, sink, observer) = setup(config_with(
            MappingKey::new(Section::DPad, "Left"),
            Action::key(105, "Left Arrow"),
        ));
        bind_all(&pad, &dispatcher, &config);

        pad.set_dpad(Direction::Left, true).unwrap();

        assert_eq!(sink.discrete_calls(), vec![(Action::key(105, "Left Arrow"), true)]);
        assert_eq!(observer.logs(), vec!["Left pressed -> Left Arrow"]);
    }
}
