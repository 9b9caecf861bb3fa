//! Per-tick input dispatch
//!
//! Platform events arrive on a channel from any thread. Once per update tick
//! the dispatcher drains them into the devices it owns, hands every enabled
//! device to the state layer, then clears the device's per-tick edges.

use crate::input::{DeviceKind, Gamepad, GamepadSource, InputEvent, InputSender, Keyboard, Mouse};
use crate::state::StateLayer;
use crossbeam_channel::{Receiver, Sender};
use lightdrive_core::FeatureFlags;

pub struct InputDispatcher {
    flags: FeatureFlags,
    tx: Sender<InputEvent>,
    rx: Receiver<InputEvent>,
    keyboard: Keyboard,
    mouse: Mouse,
    gamepads: Vec<Gamepad>,
    discarded: u64,
}

impl InputDispatcher {
    pub fn new(flags: FeatureFlags) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self::with_channel(flags, tx, rx)
    }

    /// Dispatcher reading from an existing event channel
    pub fn with_channel(
        flags: FeatureFlags,
        tx: Sender<InputEvent>,
        rx: Receiver<InputEvent>,
    ) -> Self {
        Self {
            flags,
            tx,
            rx,
            keyboard: Keyboard::new(),
            mouse: Mouse::new(),
            gamepads: Vec::new(),
            discarded: 0,
        }
    }

    pub fn flags(&self) -> FeatureFlags {
        self.flags
    }

    pub fn sender(&self) -> InputSender {
        InputSender::new(self.tx.clone())
    }

    /// Enumerate gamepads. Failures and empty lists leave zero pads.
    pub fn discover_gamepads(&mut self, source: &mut dyn GamepadSource) {
        self.gamepads.clear();
        if !self.flags.gamepads {
            return;
        }
        match source.discover() {
            Ok(found) if found.is_empty() => {
                log::warn!("Gamepads enabled but none were found");
            }
            Ok(found) => {
                for (index, info) in found.iter().enumerate() {
                    log::debug!("Gamepad {}: {} ({} axes)", index, info.name, info.axes);
                    self.gamepads.push(Gamepad::new(index, info));
                }
                log::info!("Discovered {} gamepad(s)", self.gamepads.len());
            }
            Err(e) => {
                log::warn!("Gamepad discovery failed, continuing without pads: {}", e);
            }
        }
    }

    pub fn gamepad_count(&self) -> usize {
        self.gamepads.len()
    }

    /// Events dropped because their device was disabled or unknown
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    fn enabled(&self, kind: DeviceKind) -> bool {
        match kind {
            DeviceKind::Keyboard => self.flags.keyboard,
            DeviceKind::Mouse => self.flags.mouse,
            DeviceKind::Gamepad => self.flags.gamepads,
        }
    }

    fn apply(&mut self, event: InputEvent) {
        if !self.enabled(event.device()) {
            self.discarded += 1;
            return;
        }
        match event {
            InputEvent::KeyDown(key) => self.keyboard.press(key),
            InputEvent::KeyUp(key) => self.keyboard.release(key),
            InputEvent::MouseMove { x, y } => self.mouse.move_to(x, y),
            InputEvent::MouseDown(button) => self.mouse.press(button),
            InputEvent::MouseUp(button) => self.mouse.release(button),
            InputEvent::MouseWheel(amount) => self.mouse.scroll(amount),
            InputEvent::GamepadDown { pad, button } => match self.gamepads.get_mut(pad) {
                Some(gamepad) => gamepad.press(button),
                None => self.discarded += 1,
            },
            InputEvent::GamepadUp { pad, button } => match self.gamepads.get_mut(pad) {
                Some(gamepad) => gamepad.release(button),
                None => self.discarded += 1,
            },
            InputEvent::GamepadAxis { pad, axis, value } => match self.gamepads.get_mut(pad) {
                Some(gamepad) => gamepad.set_axis(axis, value),
                None => self.discarded += 1,
            },
        }
    }

    /// Drain pending events, then feed each enabled device to `state`
    pub fn dispatch<S: StateLayer + ?Sized>(&mut self, state: &mut S) {
        if !self.flags.any() {
            self.discarded += self.rx.try_iter().count() as u64;
            return;
        }
        while let Ok(event) = self.rx.try_recv() {
            self.apply(event);
        }

        if self.flags.keyboard {
            state.keyboard_input(&self.keyboard);
            self.keyboard.end_tick();
        }
        if self.flags.mouse {
            state.mouse_input(&self.mouse);
            self.mouse.end_tick();
        }
        if self.flags.gamepads {
            for pad in &mut self.gamepads {
                state.gamepad_input(pad);
                pad.end_tick();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{GamepadInfo, KeyCode, MouseButton, NoGamepads, StaticGamepads};
    use lightdrive_core::{LightDriveError, Result};
    use lightdrive_render::Canvas;

    #[derive(Default)]
    struct Recorder {
        keyboard_calls: usize,
        mouse_calls: usize,
        gamepad_calls: Vec<usize>,
        space_pressed: usize,
        left_clicks: usize,
        pad_presses: usize,
        pad_releases: usize,
        pad_held: usize,
    }

    impl StateLayer for Recorder {
        fn update(&mut self, _delta: f64) -> Result<()> {
            Ok(())
        }

        fn render(&mut self, _canvas: &mut Canvas<'_>) -> Result<()> {
            Ok(())
        }

        fn keyboard_input(&mut self, keyboard: &Keyboard) {
            self.keyboard_calls += 1;
            if keyboard.just_pressed(KeyCode::SPACE) {
                self.space_pressed += 1;
            }
        }

        fn mouse_input(&mut self, mouse: &Mouse) {
            self.mouse_calls += 1;
            if mouse.just_pressed(MouseButton::Left) {
                self.left_clicks += 1;
            }
        }

        fn gamepad_input(&mut self, gamepad: &Gamepad) {
            self.gamepad_calls.push(gamepad.index());
            if gamepad.just_pressed(0) {
                self.pad_presses += 1;
            }
            if gamepad.just_released(0) {
                self.pad_releases += 1;
            }
            if gamepad.is_down(0) {
                self.pad_held += 1;
            }
        }
    }

    struct BrokenSource;

    impl GamepadSource for BrokenSource {
        fn discover(&mut self) -> Result<Vec<GamepadInfo>> {
            Err(LightDriveError::DeviceUnavailable("no controller subsystem".into()))
        }
    }

    fn flags(keyboard: bool, mouse: bool, gamepads: bool) -> FeatureFlags {
        FeatureFlags {
            keyboard,
            mouse,
            gamepads,
        }
    }

    #[test]
    fn test_disabled_devices_get_no_calls() {
        let mut dispatcher = InputDispatcher::new(FeatureFlags::default());
        let sender = dispatcher.sender();
        let mut state = Recorder::default();
        for _ in 0..50 {
            sender.send(InputEvent::KeyDown(KeyCode::SPACE));
            sender.send(InputEvent::MouseDown(MouseButton::Left));
            dispatcher.dispatch(&mut state);
        }
        assert_eq!(state.keyboard_calls, 0);
        assert_eq!(state.mouse_calls, 0);
        assert!(state.gamepad_calls.is_empty());
        assert_eq!(dispatcher.discarded(), 100);
    }

    #[test]
    fn test_edges_visible_for_exactly_one_tick() {
        let mut dispatcher = InputDispatcher::new(flags(true, true, false));
        let sender = dispatcher.sender();
        let mut state = Recorder::default();

        sender.send(InputEvent::KeyDown(KeyCode::SPACE));
        sender.send(InputEvent::MouseDown(MouseButton::Left));
        dispatcher.dispatch(&mut state);
        dispatcher.dispatch(&mut state);

        assert_eq!(state.keyboard_calls, 2);
        assert_eq!(state.mouse_calls, 2);
        assert_eq!(state.space_pressed, 1);
        assert_eq!(state.left_clicks, 1);
    }

    #[test]
    fn test_gamepad_edges_clear_after_handler() {
        let mut dispatcher = InputDispatcher::new(flags(false, false, true));
        dispatcher.discover_gamepads(&mut StaticGamepads(vec![GamepadInfo::new("pad", 2)]));
        let sender = dispatcher.sender();
        let mut state = Recorder::default();

        sender.send(InputEvent::GamepadDown { pad: 0, button: 0 });
        dispatcher.dispatch(&mut state);
        dispatcher.dispatch(&mut state);
        assert_eq!(state.pad_presses, 1);
        assert_eq!(state.pad_held, 2);

        sender.send(InputEvent::GamepadUp { pad: 0, button: 0 });
        dispatcher.dispatch(&mut state);
        dispatcher.dispatch(&mut state);
        assert_eq!(state.pad_releases, 1);
        assert_eq!(state.pad_held, 2);
        assert_eq!(state.gamepad_calls, vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_gamepads_dispatched_in_index_order() {
        let mut dispatcher = InputDispatcher::new(flags(false, false, true));
        dispatcher.discover_gamepads(&mut StaticGamepads(vec![
            GamepadInfo::new("left", 2),
            GamepadInfo::new("right", 2),
        ]));
        let sender = dispatcher.sender();
        sender.send(InputEvent::GamepadDown { pad: 7, button: 0 });
        let mut state = Recorder::default();
        dispatcher.dispatch(&mut state);
        assert_eq!(state.gamepad_calls, vec![0, 1]);
        assert_eq!(dispatcher.discarded(), 1);
    }

    #[test]
    fn test_unavailable_gamepads_degrade_to_none() {
        let mut dispatcher = InputDispatcher::new(flags(false, false, true));
        dispatcher.discover_gamepads(&mut BrokenSource);
        assert_eq!(dispatcher.gamepad_count(), 0);
        dispatcher.discover_gamepads(&mut NoGamepads);
        assert_eq!(dispatcher.gamepad_count(), 0);

        let mut state = Recorder::default();
        dispatcher.dispatch(&mut state);
        assert!(state.gamepad_calls.is_empty());
    }

    #[test]
    fn test_discovery_skipped_when_disabled() {
        let mut dispatcher = InputDispatcher::new(FeatureFlags::default());
        dispatcher.discover_gamepads(&mut StaticGamepads(vec![GamepadInfo::new("pad", 4)]));
        assert_eq!(dispatcher.gamepad_count(), 0);
    }
}
