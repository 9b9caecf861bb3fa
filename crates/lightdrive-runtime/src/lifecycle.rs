//! Loop thread lifecycle
//!
//! One dedicated, named thread runs the loop body while a shared flag stays
//! set. `start` and `stop` take the same lock, and `stop` holds it across the
//! join, so transitions never interleave.

use crate::scheduler::LoopSummary;
use lightdrive_core::{LightDriveError, Result};
use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

/// Name given to the loop thread
pub const LOOP_THREAD_NAME: &str = "lightdrive-loop";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

struct Inner {
    state: LoopState,
    handle: Option<JoinHandle<Result<LoopSummary>>>,
}

pub struct Lifecycle {
    running: Arc<AtomicBool>,
    inner: Mutex<Inner>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            inner: Mutex::new(Inner {
                state: LoopState::Idle,
                handle: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn state(&self) -> LoopState {
        self.lock().state
    }

    /// Whether a loop thread exists that `stop` has not joined yet
    pub fn has_thread(&self) -> bool {
        self.lock().handle.is_some()
    }

    /// True while the loop body is live and has not been asked to stop
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Spawn the loop thread running `body`. The body must return once the
    /// flag it receives clears. Returns `false` without spawning when a loop
    /// thread already exists.
    pub fn start<F>(&self, body: F) -> Result<bool>
    where
        F: FnOnce(Arc<AtomicBool>) -> Result<LoopSummary> + Send + 'static,
    {
        let mut inner = self.lock();
        if inner.handle.is_some() {
            log::debug!("Loop already running, start ignored");
            return Ok(false);
        }

        self.running.store(true, Ordering::Release);
        let running = Arc::clone(&self.running);
        let spawned = thread::Builder::new()
            .name(LOOP_THREAD_NAME.to_string())
            .spawn(move || body(running));
        match spawned {
            Ok(handle) => {
                inner.handle = Some(handle);
                inner.state = LoopState::Running;
                log::info!("Loop thread started");
                Ok(true)
            }
            Err(e) => {
                self.running.store(false, Ordering::Release);
                Err(e.into())
            }
        }
    }

    /// Clear the flag and wait for the loop thread to exit.
    ///
    /// Returns the loop's summary, or the fault that ended it. A no-op
    /// returning `Ok(None)` when no loop thread exists.
    pub fn stop(&self) -> Result<Option<LoopSummary>> {
        let mut inner = self.lock();
        let Some(handle) = inner.handle.take() else {
            return Ok(None);
        };

        if handle.thread().id() == thread::current().id() {
            // Called from inside the loop: ask it to finish, nobody to join.
            self.running.store(false, Ordering::Release);
            inner.handle = Some(handle);
            inner.state = LoopState::Stopping;
            return Ok(None);
        }

        inner.state = LoopState::Stopping;
        self.running.store(false, Ordering::Release);
        let joined = handle.join();
        inner.state = LoopState::Stopped;

        match joined {
            Ok(Ok(summary)) => {
                log::info!("Loop thread joined");
                Ok(Some(summary))
            }
            Ok(Err(e)) => Err(e),
            Err(payload) => {
                let msg = panic_message(payload.as_ref());
                log::error!("Loop thread panicked: {}", msg);
                Err(LightDriveError::TeardownInterrupted(msg))
            }
        }
    }
}

impl Drop for Lifecycle {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log::warn!("Loop ended with error during drop: {}", e);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "loop thread panicked".to_string()
    }
}
