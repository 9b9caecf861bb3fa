//! Fixed-timestep loop scheduler
//!
//! Each iteration samples the clock, runs every whole update tick owed
//! (input dispatch, then `update(1.0)`), renders exactly one frame, and
//! closes the reporting window when it has elapsed. The scheduler owns the
//! accumulator, counters, input devices and render pipeline; it runs on the
//! loop thread only.

use crate::clock::{FrameClock, TickAccumulator, TimeSource};
use crate::dispatcher::InputDispatcher;
use crate::reporter::{Counters, RateReport, RateReporter};
use crate::state::StateLayer;
use lightdrive_core::{FaultPolicy, LightDriveError, LoopConfig, Result};
use lightdrive_render::RenderPipeline;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// State shared between the loop thread and its owner
pub type SharedState<S> = Arc<Mutex<S>>;

pub(crate) fn lock_state<S: ?Sized>(state: &Mutex<S>) -> MutexGuard<'_, S> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

/// What one iteration did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOutcome {
    pub updates: u32,
    /// Whole ticks dropped by the catch-up cap
    pub dropped: u64,
    pub rendered: bool,
    pub report: Option<RateReport>,
}

/// Totals over a loop's lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopSummary {
    pub total_updates: u64,
    pub total_frames: u64,
    pub dropped_ticks: u64,
    pub iterations: u64,
}

pub struct LoopScheduler<S: StateLayer> {
    config: LoopConfig,
    time: Arc<dyn TimeSource>,
    clock: FrameClock,
    accumulator: TickAccumulator,
    state: SharedState<S>,
    pipeline: RenderPipeline,
    input: InputDispatcher,
    reporters: Vec<Box<dyn RateReporter>>,
    counters: Counters,
    summary: LoopSummary,
    next_frame_ns: Option<u64>,
    torn_down: bool,
}

impl<S: StateLayer> LoopScheduler<S> {
    /// Build a scheduler over an opened pipeline. The clock starts now.
    pub fn new(
        config: LoopConfig,
        time: Arc<dyn TimeSource>,
        state: SharedState<S>,
        pipeline: RenderPipeline,
        input: InputDispatcher,
        reporters: Vec<Box<dyn RateReporter>>,
    ) -> Result<Self> {
        config.validate()?;
        let mut clock = FrameClock::new(config.target_ticks_per_second)?;
        clock.reset(time.now_ns());
        let counters = Counters::starting_at(time.now_ms());
        Ok(Self {
            config,
            time,
            clock,
            accumulator: TickAccumulator::new(),
            state,
            pipeline,
            input,
            reporters,
            counters,
            summary: LoopSummary::default(),
            next_frame_ns: None,
            torn_down: false,
        })
    }

    pub fn summary(&self) -> LoopSummary {
        self.summary
    }

    pub fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    fn check(&self, phase: &str, result: Result<()>) -> Result<bool> {
        match result {
            Ok(()) => Ok(true),
            Err(e) => match self.config.fault_policy {
                FaultPolicy::Stop => Err(e),
                FaultPolicy::Continue => {
                    log::warn!("State {} failed, continuing: {}", phase, e);
                    Ok(false)
                }
            },
        }
    }

    /// Run one loop iteration
    pub fn step(&mut self) -> Result<StepOutcome> {
        if self.torn_down {
            return Err(LightDriveError::NotInitialized(
                "loop has already been torn down".into(),
            ));
        }
        let mut outcome = StepOutcome::default();

        let ticks = self.clock.elapsed_ticks(self.time.now_ns());
        self.accumulator.add(ticks);

        let shared = Arc::clone(&self.state);
        let mut state = lock_state(&shared);

        while self.accumulator.is_due() {
            if let Some(cap) = self.config.max_catch_up_ticks {
                if outcome.updates >= cap {
                    outcome.dropped = self.accumulator.discard_whole();
                    log::warn!(
                        "Catch-up cap of {} ticks reached, dropped {} tick(s)",
                        cap,
                        outcome.dropped
                    );
                    break;
                }
            }
            self.accumulator.consume();
            self.input.dispatch(&mut *state);
            self.check("update", state.update(1.0))?;
            outcome.updates += 1;
        }
        self.counters.updates += u64::from(outcome.updates);

        let rendered = self
            .pipeline
            .render_frame(|canvas| state.render(canvas))
            .map(|_| ());
        drop(state);
        outcome.rendered = self.check("render", rendered)?;
        if outcome.rendered {
            self.counters.frames += 1;
        }

        outcome.report = self.counters.roll(
            self.time.now_ms(),
            self.config.report_interval_ms,
            &self.config.title,
        );
        if let Some(report) = &outcome.report {
            self.publish(report);
        }

        self.summary.total_updates += u64::from(outcome.updates);
        self.summary.total_frames += u64::from(outcome.rendered);
        self.summary.dropped_ticks += outcome.dropped;
        self.summary.iterations += 1;

        self.pace();
        Ok(outcome)
    }

    fn publish(&mut self, report: &RateReport) {
        log::debug!("{}", report.title_line());
        self.pipeline.set_title(&report.title_line());
        for reporter in &mut self.reporters {
            if let Err(e) = reporter.report(report) {
                log::warn!("Rate reporter failed: {}", e);
            }
        }
    }

    /// Sleep until the next frame deadline when a frame cap is set
    fn pace(&mut self) {
        let Some(fps) = self.config.max_frames_per_second else {
            return;
        };
        let frame_ns = (1_000_000_000.0 / fps) as u64;
        let now = self.time.now_ns();
        let deadline = self.next_frame_ns.unwrap_or(now) + frame_ns;
        if deadline > now {
            self.time.sleep(Duration::from_nanos(deadline - now));
            self.next_frame_ns = Some(deadline);
        } else {
            // Behind schedule; don't try to catch up on frames.
            self.next_frame_ns = Some(now);
        }
    }

    /// Step until `running` clears or a fault stops the loop, then tear down.
    /// A fault clears `running` so the owner can see the loop ended.
    pub fn run(&mut self, running: &AtomicBool) -> Result<LoopSummary> {
        log::info!(
            "Loop running: {} at {} ticks/s, {}x{}",
            self.config.title,
            self.config.target_ticks_per_second,
            self.config.width,
            self.config.height
        );
        let mut result = Ok(());
        while running.load(Ordering::Acquire) {
            if let Err(e) = self.step() {
                log::error!("Loop stopped by fault: {}", e);
                result = Err(e);
                break;
            }
        }
        running.store(false, Ordering::Release);
        self.teardown();
        result.map(|()| self.summary)
    }

    /// Shut the state down, then dispose the surface and release buffers.
    /// Idempotent.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        lock_state(&self.state).shutdown();
        self.pipeline.close();
        log::info!(
            "Loop stopped after {} iterations ({} updates, {} frames, {} dropped ticks)",
            self.summary.iterations,
            self.summary.total_updates,
            self.summary.total_frames,
            self.summary.dropped_ticks
        );
    }
}

impl<S: StateLayer> Drop for LoopScheduler<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}
