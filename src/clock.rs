//! Time sources for the transfer model.
//!
//! Every reading is in dilated seconds: the wall clock multiplied by a fixed dilation factor chosen
//! at startup. A dilation above one makes simulated transfers finish sooner in real time.

use std::{
    sync::Arc,
    time::{Instant, SystemTime, UNIX_EPOCH},
};

use parking_lot::Mutex;

use crate::time::{Delta, Time};

/// A source of simulated time.
///
/// Readings must never decrease between successive calls.
pub trait Clock: Send + Sync {
    fn now(&self) -> Time;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Time {
        (**self).now()
    }
}

/// The dilated wall clock.
///
/// The wall clock is read once at construction; later readings advance that epoch with a monotonic
/// [`Instant`], so the clock never steps backwards when the system time is adjusted.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    dilation: f64,
    epoch_secs: f64,
    anchor: Instant,
}

impl SystemClock {
    pub fn new(dilation: f64) -> Self {
        assert!(dilation > 0.0 && dilation.is_finite());
        let epoch_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default();
        Self {
            dilation,
            epoch_secs,
            anchor: Instant::now(),
        }
    }

    pub fn dilation(&self) -> f64 {
        self.dilation
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Time {
        let wall = self.epoch_secs + self.anchor.elapsed().as_secs_f64();
        Time::new(self.dilation * wall)
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<Time>,
}

impl ManualClock {
    pub fn new(start: Time) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Moves the clock to `time`. Requests to move backwards are ignored.
    pub fn set(&self, time: Time) {
        let mut now = self.now.lock();
        *now = now.max(time);
    }

    pub fn advance(&self, delta: impl Into<Delta>) {
        let delta = delta.into();
        let mut now = self.now.lock();
        if delta > Delta::ZERO {
            *now += delta;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Time {
        *self.now.lock()
    }
}
