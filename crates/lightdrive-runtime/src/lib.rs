//! LightDrive Runtime - fixed-timestep loop infrastructure
//!
//! Provides the pieces that drive an application state on a dedicated thread:
//! - `FrameClock` / `TickAccumulator` - wall time to whole update ticks
//! - `InputDispatcher` - channel-fed keyboard, mouse and gamepad state
//! - `StateLayer` - the application hooks the loop calls
//! - `LoopScheduler` - update ticks, one render per iteration, rate windows
//! - `Lifecycle` / `Screen` - start and stop of the loop thread

mod clock;
mod dispatcher;
mod input;
mod lifecycle;
mod reporter;
mod scheduler;
mod screen;
mod state;

pub use clock::{
    FrameClock, ManualClock, MonotonicClock, TickAccumulator, TimeSource, TICK_TOLERANCE,
};
pub use dispatcher::InputDispatcher;
pub use input::{
    DeviceKind, Gamepad, GamepadInfo, GamepadSource, InputEvent, InputSender, KeyCode, Keyboard,
    Mouse, MouseButton, NoGamepads, StaticGamepads,
};
pub use lifecycle::{Lifecycle, LoopState, LOOP_THREAD_NAME};
pub use reporter::{
    ChannelReporter, Counters, FnReporter, LogReporter, RateReport, RateReporter,
};
pub use scheduler::{LoopScheduler, LoopSummary, SharedState, StepOutcome};
pub use screen::Screen;
pub use state::{StateLayer, StateStack};
