//! Control-rate scheduling: the delayed intensity reset and the animation loop.
//!
//! - [`DelayedReset`] is a single-slot timer. Arming it replaces whatever was
//!   pending, so the latest trigger always owns the decay.
//! - [`AnimationLoop`] is a background thread that calls a tick closure at a
//!   fixed period until the closure reports the session is gone or the loop
//!   is stopped. Stopping wakes the thread and joins it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::{EngineError, Result};

/// Pending "set target intensity to `level` at `due`".
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct DelayedReset {
    pending: Option<(Duration, f32)>,
}

impl DelayedReset {
    /// Schedule a reset `delay` after `now`, superseding any pending one.
    #[inline]
    pub fn arm(&mut self, now: Duration, delay: Duration, level: f32) {
        self.pending = Some((now + delay, level));
    }

    #[inline]
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending reset fires, if any.
    #[inline]
    pub fn due(&self) -> Option<Duration> {
        self.pending.map(|(due, _)| due)
    }

    /// Fire at most once: returns the level when `now` has reached the deadline.
    #[inline]
    pub fn poll(&mut self, now: Duration) -> Option<f32> {
        match self.pending {
            Some((due, level)) if now >= due => {
                self.pending = None;
                Some(level)
            }
            _ => None,
        }
    }
}

/// Handle to the periodic tick thread.
#[derive(Debug)]
pub struct AnimationLoop {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl AnimationLoop {
    /// Spawn a thread calling `tick` every `interval`. The loop ends when
    /// `tick` returns `false` or [`stop`](Self::stop) is called.
    pub fn spawn<F>(interval: Duration, mut tick: F) -> Result<Self>
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("resonaural-animation".into())
            .spawn(move || {
                while !flag.load(Ordering::Acquire) {
                    if !tick() {
                        break;
                    }
                    thread::park_timeout(interval);
                }
            })
            .map_err(|e| EngineError::Scheduler { message: e.to_string() })?;
        Ok(Self { stop, handle: Some(handle) })
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop ticking and wait for the thread. No tick runs after this returns.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            if handle.join().is_err() {
                tracing::error!("animation loop panicked");
            }
        }
    }
}

impl Drop for AnimationLoop {
    fn drop(&mut self) {
        self.shutdown();
    }
}
