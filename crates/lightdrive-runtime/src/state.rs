//! Application state layer
//!
//! The loop drives exactly one [`StateLayer`]. [`StateStack`] is a pushdown
//! automaton over boxed states: the top state receives every call, states
//! below it are suspended.

use crate::input::{Gamepad, Keyboard, Mouse};
use lightdrive_core::Result;
use lightdrive_render::Canvas;

/// Application logic driven by the loop.
///
/// `update` always receives a normalized step of one tick. Errors returned
/// from `update` or `render` are handled by the loop's fault policy.
pub trait StateLayer: Send {
    /// Called once by `open`, before the loop thread starts
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    fn update(&mut self, delta: f64) -> Result<()>;

    fn render(&mut self, canvas: &mut Canvas<'_>) -> Result<()>;

    fn keyboard_input(&mut self, _keyboard: &Keyboard) {}

    fn mouse_input(&mut self, _mouse: &Mouse) {}

    fn gamepad_input(&mut self, _gamepad: &Gamepad) {}

    /// Called once during teardown, before the surface is disposed
    fn shutdown(&mut self) {}
}

impl<S: StateLayer + ?Sized> StateLayer for Box<S> {
    fn init(&mut self) -> Result<()> {
        (**self).init()
    }

    fn update(&mut self, delta: f64) -> Result<()> {
        (**self).update(delta)
    }

    fn render(&mut self, canvas: &mut Canvas<'_>) -> Result<()> {
        (**self).render(canvas)
    }

    fn keyboard_input(&mut self, keyboard: &Keyboard) {
        (**self).keyboard_input(keyboard)
    }

    fn mouse_input(&mut self, mouse: &Mouse) {
        (**self).mouse_input(mouse)
    }

    fn gamepad_input(&mut self, gamepad: &Gamepad) {
        (**self).gamepad_input(gamepad)
    }

    fn shutdown(&mut self) {
        (**self).shutdown()
    }
}

/// Pushdown stack of states; never empty.
pub struct StateStack {
    stack: Vec<Box<dyn StateLayer>>,
    initialized: bool,
}

impl StateStack {
    pub fn new(initial: impl StateLayer + 'static) -> Self {
        let initial: Box<dyn StateLayer> = Box::new(initial);
        Self {
            stack: vec![initial],
            initialized: false,
        }
    }

    /// Push a state on top. It is initialized right away when the stack
    /// already is.
    pub fn push(&mut self, state: impl StateLayer + 'static) -> Result<()> {
        let mut state: Box<dyn StateLayer> = Box::new(state);
        if self.initialized {
            state.init()?;
        }
        self.stack.push(state);
        Ok(())
    }

    /// Pop the top state and shut it down. The last state is never removed.
    pub fn pop(&mut self) -> bool {
        if self.stack.len() <= 1 {
            return false;
        }
        if let Some(mut top) = self.stack.pop() {
            top.shutdown();
        }
        true
    }

    /// Replace the top state
    pub fn replace(&mut self, state: impl StateLayer + 'static) -> Result<()> {
        let mut state: Box<dyn StateLayer> = Box::new(state);
        if self.initialized {
            state.init()?;
        }
        if let Some(top) = self.stack.last_mut() {
            let mut old = std::mem::replace(top, state);
            old.shutdown();
        }
        Ok(())
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn top(&mut self) -> &mut dyn StateLayer {
        let last = self.stack.len() - 1;
        self.stack[last].as_mut()
    }
}

impl StateLayer for StateStack {
    /// Initializes every state, bottom to top
    fn init(&mut self) -> Result<()> {
        for state in &mut self.stack {
            state.init()?;
        }
        self.initialized = true;
        Ok(())
    }

    fn update(&mut self, delta: f64) -> Result<()> {
        self.top().update(delta)
    }

    fn render(&mut self, canvas: &mut Canvas<'_>) -> Result<()> {
        self.top().render(canvas)
    }

    fn keyboard_input(&mut self, keyboard: &Keyboard) {
        self.top().keyboard_input(keyboard)
    }

    fn mouse_input(&mut self, mouse: &Mouse) {
        self.top().mouse_input(mouse)
    }

    fn gamepad_input(&mut self, gamepad: &Gamepad) {
        self.top().gamepad_input(gamepad)
    }

    fn shutdown(&mut self) {
        while let Some(mut state) = self.stack.pop() {
            state.shutdown();
            if self.stack.is_empty() {
                self.stack.push(state);
                break;
            }
        }
    }
}
