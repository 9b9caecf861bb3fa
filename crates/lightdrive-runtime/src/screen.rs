//! Screen facade
//!
//! Collects configuration, input toggles, filters and reporters, then opens a
//! loop over a state layer and a display surface. Feature toggles and time
//! or gamepad sources are frozen while the loop runs; the filter chain stays
//! editable from any thread.

use crate::clock::{MonotonicClock, TimeSource};
use crate::dispatcher::InputDispatcher;
use crate::input::{GamepadSource, InputEvent, InputSender, NoGamepads};
use crate::lifecycle::{Lifecycle, LoopState};
use crate::reporter::RateReporter;
use crate::scheduler::{LoopScheduler, LoopSummary, SharedState};
use crate::state::StateLayer;
use crossbeam_channel::{Receiver, Sender};
use lightdrive_core::{FeatureFlags, LoopConfig, Result};
use lightdrive_render::{Antialiasing, DisplaySurface, FilterChain, FilterHandle, RenderPipeline};
use std::sync::{Arc, Mutex};

pub struct Screen<S: StateLayer + 'static> {
    config: LoopConfig,
    flags: FeatureFlags,
    antialiasing: Antialiasing,
    filters: Arc<FilterChain>,
    time: Arc<dyn TimeSource>,
    gamepads: Box<dyn GamepadSource>,
    reporters: Vec<Box<dyn RateReporter>>,
    input_tx: Sender<InputEvent>,
    input_rx: Receiver<InputEvent>,
    state: Option<SharedState<S>>,
    lifecycle: Lifecycle,
}

impl<S: StateLayer + 'static> std::fmt::Debug for Screen<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Screen")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<S: StateLayer + 'static> Screen<S> {
    /// Validate `config` and build an idle screen
    pub fn new(config: LoopConfig) -> Result<Self> {
        config.validate()?;
        let (input_tx, input_rx) = crossbeam_channel::unbounded();
        Ok(Self {
            config,
            flags: FeatureFlags::default(),
            antialiasing: Antialiasing::NONE,
            filters: Arc::new(FilterChain::new()),
            time: Arc::new(MonotonicClock::new()),
            gamepads: Box::new(NoGamepads),
            reporters: Vec::new(),
            input_tx,
            input_rx,
            state: None,
            lifecycle: Lifecycle::new(),
        })
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    fn frozen(&self, what: &str) -> bool {
        if self.lifecycle.is_running() {
            log::warn!("Cannot change {} while the loop is running", what);
            return true;
        }
        false
    }

    pub fn enable_keyboard(&mut self) {
        if !self.frozen("keyboard input") {
            self.flags.keyboard = true;
        }
    }

    pub fn enable_mouse(&mut self) {
        if !self.frozen("mouse input") {
            self.flags.mouse = true;
        }
    }

    pub fn enable_gamepads(&mut self) {
        if !self.frozen("gamepad input") {
            self.flags.gamepads = true;
        }
    }

    pub fn features(&self) -> FeatureFlags {
        self.flags
    }

    /// Takes effect on the next `open`
    pub fn enable_antialiasing(&mut self, mode: Antialiasing) {
        if !self.frozen("antialiasing") {
            self.antialiasing = mode;
        }
    }

    pub fn set_gamepad_source(&mut self, source: impl GamepadSource + 'static) {
        if !self.frozen("the gamepad source") {
            self.gamepads = Box::new(source);
        }
    }

    pub fn set_time_source(&mut self, time: impl TimeSource + 'static) {
        if !self.frozen("the time source") {
            self.time = Arc::new(time);
        }
    }

    /// Reporters move into the loop on the next `open`
    pub fn add_reporter(&mut self, reporter: impl RateReporter + 'static) {
        self.reporters.push(Box::new(reporter));
    }

    pub fn add_filter(&self, filter: FilterHandle) {
        self.filters.add(filter);
    }

    pub fn remove_filter(&self, filter: &FilterHandle) -> bool {
        self.filters.remove(filter)
    }

    pub fn clear_filters(&self) {
        self.filters.clear();
    }

    pub fn filters(&self) -> Arc<FilterChain> {
        Arc::clone(&self.filters)
    }

    /// Handle for the platform layer to feed input events
    pub fn input_sender(&self) -> InputSender {
        InputSender::new(self.input_tx.clone())
    }

    /// Initialize `state`, attach `surface` and start the loop thread.
    ///
    /// Returns `false` when a loop is already running; `state` and `surface`
    /// are dropped untouched in that case.
    pub fn open(&mut self, mut state: S, surface: impl DisplaySurface + 'static) -> Result<bool> {
        if self.lifecycle.has_thread() {
            log::debug!("Screen already open, ignoring open()");
            return Ok(false);
        }

        let mut pipeline =
            RenderPipeline::new(self.config.width, self.config.height, self.filters());
        pipeline.set_antialiasing(self.antialiasing);
        pipeline.open(Box::new(surface));

        // Events queued while closed belong to no tick.
        while self.input_rx.try_recv().is_ok() {}
        let mut input =
            InputDispatcher::with_channel(self.flags, self.input_tx.clone(), self.input_rx.clone());
        input.discover_gamepads(self.gamepads.as_mut());

        state.init()?;
        let shared = Arc::new(Mutex::new(state));
        let mut scheduler = LoopScheduler::new(
            self.config.clone(),
            Arc::clone(&self.time),
            Arc::clone(&shared),
            pipeline,
            input,
            std::mem::take(&mut self.reporters),
        )?;

        self.state = Some(shared);
        self.lifecycle.start(move |running| scheduler.run(&running))
    }

    /// Stop the loop and wait for teardown to finish. Returns the loop's
    /// summary, or the state fault that ended it early.
    pub fn close(&mut self) -> Result<Option<LoopSummary>> {
        self.lifecycle.stop()
    }

    /// Alias of [`Screen::close`]
    pub fn stop(&mut self) -> Result<Option<LoopSummary>> {
        self.close()
    }

    /// The state passed to the last `open`.
    ///
    /// The loop locks it for each iteration; do not hold the lock across
    /// `close`.
    pub fn state(&self) -> Option<SharedState<S>> {
        self.state.clone()
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle.is_running()
    }

    pub fn loop_state(&self) -> LoopState {
        self.lifecycle.state()
    }

    pub fn view_width(&self) -> u32 {
        self.config.width
    }

    pub fn view_height(&self) -> u32 {
        self.config.height
    }
}
