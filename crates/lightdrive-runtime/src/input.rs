//! Input device state
//!
//! Devices accumulate platform events between update ticks. Edge sets
//! (pressed / released this tick) and per-tick deltas survive until
//! `end_tick`, which the dispatcher calls after the state layer has seen them.

use crossbeam_channel::Sender;
use lightdrive_core::Result;
use std::collections::HashSet;

/// Platform-neutral key identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCode(pub u32);

impl KeyCode {
    pub const BACKSPACE: Self = Self(8);
    pub const TAB: Self = Self(9);
    pub const ENTER: Self = Self(10);
    pub const ESCAPE: Self = Self(27);
    pub const SPACE: Self = Self(32);
    pub const LEFT: Self = Self(37);
    pub const UP: Self = Self(38);
    pub const RIGHT: Self = Self(39);
    pub const DOWN: Self = Self(40);

    /// Letters and digits map to their upper-case ASCII code
    pub fn from_char(c: char) -> Option<Self> {
        c.is_ascii_alphanumeric()
            .then(|| Self(c.to_ascii_uppercase() as u32))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

/// Keyboard state as seen by the state layer during one tick
#[derive(Debug, Default, Clone)]
pub struct Keyboard {
    down: HashSet<KeyCode>,
    just_pressed: HashSet<KeyCode>,
    just_released: HashSet<KeyCode>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: KeyCode) {
        if self.down.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn release(&mut self, key: KeyCode) {
        if self.down.remove(&key) {
            self.just_released.insert(key);
        }
    }

    pub fn is_down(&self, key: KeyCode) -> bool {
        self.down.contains(&key)
    }

    pub fn just_pressed(&self, key: KeyCode) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn just_released(&self, key: KeyCode) -> bool {
        self.just_released.contains(&key)
    }

    /// Clear this tick's edges
    pub fn end_tick(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

/// Mouse state; positions are in view pixels
#[derive(Debug, Default, Clone)]
pub struct Mouse {
    position: (f64, f64),
    delta: (f64, f64),
    wheel: f64,
    down: HashSet<MouseButton>,
    just_pressed: HashSet<MouseButton>,
    just_released: HashSet<MouseButton>,
}

impl Mouse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.delta.0 += x - self.position.0;
        self.delta.1 += y - self.position.1;
        self.position = (x, y);
    }

    pub fn press(&mut self, button: MouseButton) {
        if self.down.insert(button) {
            self.just_pressed.insert(button);
        }
    }

    pub fn release(&mut self, button: MouseButton) {
        if self.down.remove(&button) {
            self.just_released.insert(button);
        }
    }

    pub fn scroll(&mut self, amount: f64) {
        self.wheel += amount;
    }

    pub fn position(&self) -> (f64, f64) {
        self.position
    }

    /// Movement since the previous tick
    pub fn delta(&self) -> (f64, f64) {
        self.delta
    }

    /// Wheel movement since the previous tick
    pub fn wheel(&self) -> f64 {
        self.wheel
    }

    pub fn is_down(&self, button: MouseButton) -> bool {
        self.down.contains(&button)
    }

    pub fn just_pressed(&self, button: MouseButton) -> bool {
        self.just_pressed.contains(&button)
    }

    pub fn just_released(&self, button: MouseButton) -> bool {
        self.just_released.contains(&button)
    }

    pub fn end_tick(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
        self.delta = (0.0, 0.0);
        self.wheel = 0.0;
    }
}

/// Description of a gamepad found at discovery time
#[derive(Debug, Clone, PartialEq)]
pub struct GamepadInfo {
    pub name: String,
    pub axes: usize,
}

impl GamepadInfo {
    pub fn new(name: impl Into<String>, axes: usize) -> Self {
        Self {
            name: name.into(),
            axes,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Gamepad {
    index: usize,
    name: String,
    axes: Vec<f32>,
    down: HashSet<u32>,
    just_pressed: HashSet<u32>,
    just_released: HashSet<u32>,
}

impl Gamepad {
    pub fn new(index: usize, info: &GamepadInfo) -> Self {
        Self {
            index,
            name: info.name.clone(),
            axes: vec![0.0; info.axes],
            down: HashSet::new(),
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn press(&mut self, button: u32) {
        if self.down.insert(button) {
            self.just_pressed.insert(button);
        }
    }

    pub fn release(&mut self, button: u32) {
        if self.down.remove(&button) {
            self.just_released.insert(button);
        }
    }

    /// Values are clamped to [-1, 1]; unknown axes are ignored
    pub fn set_axis(&mut self, axis: usize, value: f32) {
        if let Some(slot) = self.axes.get_mut(axis) {
            *slot = value.clamp(-1.0, 1.0);
        }
    }

    pub fn axis(&self, axis: usize) -> f32 {
        self.axes.get(axis).copied().unwrap_or(0.0)
    }

    pub fn axis_count(&self) -> usize {
        self.axes.len()
    }

    pub fn is_down(&self, button: u32) -> bool {
        self.down.contains(&button)
    }

    pub fn just_pressed(&self, button: u32) -> bool {
        self.just_pressed.contains(&button)
    }

    pub fn just_released(&self, button: u32) -> bool {
        self.just_released.contains(&button)
    }

    pub fn end_tick(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

/// Raw event fed by the platform layer.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown(KeyCode),
    KeyUp(KeyCode),
    MouseMove { x: f64, y: f64 },
    MouseDown(MouseButton),
    MouseUp(MouseButton),
    MouseWheel(f64),
    GamepadDown { pad: usize, button: u32 },
    GamepadUp { pad: usize, button: u32 },
    GamepadAxis { pad: usize, axis: usize, value: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Keyboard,
    Mouse,
    Gamepad,
}

impl InputEvent {
    pub fn device(&self) -> DeviceKind {
        match self {
            InputEvent::KeyDown(_) | InputEvent::KeyUp(_) => DeviceKind::Keyboard,
            InputEvent::MouseMove { .. }
            | InputEvent::MouseDown(_)
            | InputEvent::MouseUp(_)
            | InputEvent::MouseWheel(_) => DeviceKind::Mouse,
            InputEvent::GamepadDown { .. }
            | InputEvent::GamepadUp { .. }
            | InputEvent::GamepadAxis { .. } => DeviceKind::Gamepad,
        }
    }
}

/// Cloneable handle the platform layer uses to feed input into the loop.
#[derive(Debug, Clone)]
pub struct InputSender {
    tx: Sender<InputEvent>,
}

impl InputSender {
    pub(crate) fn new(tx: Sender<InputEvent>) -> Self {
        Self { tx }
    }

    /// Queue an event for the next update tick. Returns false once the
    /// receiving loop is gone.
    pub fn send(&self, event: InputEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Enumerates attached gamepads once, when the loop opens.
pub trait GamepadSource: Send {
    fn discover(&mut self) -> Result<Vec<GamepadInfo>>;
}

/// Source that never finds a gamepad
#[derive(Debug, Default, Clone, Copy)]
pub struct NoGamepads;

impl GamepadSource for NoGamepads {
    fn discover(&mut self) -> Result<Vec<GamepadInfo>> {
        Ok(Vec::new())
    }
}

/// Fixed list of pads, for tests and replays
#[derive(Debug, Default, Clone)]
pub struct StaticGamepads(pub Vec<GamepadInfo>);

impl GamepadSource for StaticGamepads {
    fn discover(&mut self) -> Result<Vec<GamepadInfo>> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_transitions() {
        let mut keyboard = Keyboard::new();

        keyboard.press(KeyCode::SPACE);
        assert!(keyboard.is_down(KeyCode::SPACE));
        assert!(keyboard.just_pressed(KeyCode::SPACE));

        keyboard.end_tick();
        assert!(keyboard.is_down(KeyCode::SPACE));
        assert!(!keyboard.just_pressed(KeyCode::SPACE));

        keyboard.release(KeyCode::SPACE);
        assert!(!keyboard.is_down(KeyCode::SPACE));
        assert!(keyboard.just_released(KeyCode::SPACE));
    }

    #[test]
    fn test_repeat_press_is_not_a_new_edge() {
        let mut keyboard = Keyboard::new();
        keyboard.press(KeyCode::ENTER);
        keyboard.end_tick();
        keyboard.press(KeyCode::ENTER);
        assert!(!keyboard.just_pressed(KeyCode::ENTER));
    }

    #[test]
    fn test_key_from_char() {
        assert_eq!(KeyCode::from_char('w'), Some(KeyCode(87)));
        assert_eq!(KeyCode::from_char('7'), Some(KeyCode(55)));
        assert_eq!(KeyCode::from_char('-'), None);
    }

    #[test]
    fn test_mouse_delta_and_wheel() {
        let mut mouse = Mouse::new();
        mouse.move_to(100.0, 200.0);
        mouse.move_to(110.0, 205.0);
        mouse.scroll(-1.0);
        assert_eq!(mouse.delta(), (110.0, 205.0));
        assert_eq!(mouse.wheel(), -1.0);

        mouse.end_tick();
        assert_eq!(mouse.delta(), (0.0, 0.0));
        assert_eq!(mouse.wheel(), 0.0);
        assert_eq!(mouse.position(), (110.0, 205.0));
    }

    #[test]
    fn test_mouse_buttons() {
        let mut mouse = Mouse::new();
        mouse.press(MouseButton::Left);
        assert!(mouse.is_down(MouseButton::Left));
        assert!(mouse.just_pressed(MouseButton::Left));
        mouse.release(MouseButton::Left);
        assert!(!mouse.is_down(MouseButton::Left));
        assert!(mouse.just_released(MouseButton::Left));
    }

    #[test]
    fn test_gamepad_axes_clamp() {
        let mut pad = Gamepad::new(0, &GamepadInfo::new("pad", 2));
        pad.set_axis(0, 3.0);
        pad.set_axis(5, 1.0);
        assert_eq!(pad.axis(0), 1.0);
        assert_eq!(pad.axis(5), 0.0);
        assert_eq!(pad.axis_count(), 2);
    }

    #[test]
    fn test_event_device_kind() {
        assert_eq!(InputEvent::KeyDown(KeyCode::UP).device(), DeviceKind::Keyboard);
        assert_eq!(InputEvent::MouseWheel(1.0).device(), DeviceKind::Mouse);
        assert_eq!(
            InputEvent::GamepadAxis { pad: 0, axis: 1, value: 0.5 }.device(),
            DeviceKind::Gamepad
        );
    }
}
