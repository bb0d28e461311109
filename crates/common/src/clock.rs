//! Clock and timing utilities for the playback engine.
//!
//! The editor's master clock is virtual: it is derived from a wall-clock
//! source rather than from any media element. This module provides:
//! - The [`TimeSource`] seam and its system and manual implementations
//! - An update throttle that limits how often time changes are emitted

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Default interval between emitted time updates (~30 Hz).
pub const DEFAULT_UPDATE_INTERVAL_MS: f64 = 33.0;

/// A source of wall-clock time in milliseconds.
///
/// Only differences between readings are meaningful; the origin is
/// implementation-defined.
pub trait TimeSource {
    /// Current wall-clock reading in milliseconds.
    fn now_ms(&self) -> f64;
}

/// Monotonic system clock anchored at construction.
#[derive(Debug, Clone)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    /// Create a clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::start()
    }
}

impl TimeSource for SystemClock {
    fn now_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }
}

/// A manually driven clock for headless sessions and tests.
///
/// Clones share the same reading, so a driver can keep one handle while
/// the editor owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Rc<Cell<f64>>,
}

impl ManualClock {
    /// Create a clock reading `start_ms`.
    pub fn new(start_ms: f64) -> Self {
        Self {
            now_ms: Rc::new(Cell::new(start_ms)),
        }
    }

    /// Move the clock forward by `delta_ms` (negative deltas are ignored).
    pub fn advance(&self, delta_ms: f64) {
        if delta_ms > 0.0 {
            self.now_ms.set(self.now_ms.get() + delta_ms);
        }
    }

    /// Set the absolute reading. The clock never moves backwards.
    pub fn set(&self, now_ms: f64) {
        if now_ms > self.now_ms.get() {
            self.now_ms.set(now_ms);
        }
    }
}

impl TimeSource for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now_ms.get()
    }
}

/// Limits how often the playback clock emits a new time value.
///
/// The frame loop keeps running every available frame; only the state
/// updates are thinned out.
#[derive(Debug, Clone)]
pub struct UpdateThrottle {
    interval_ms: f64,
    last_emit_ms: Option<f64>,
}

impl UpdateThrottle {
    /// Create a throttle emitting at most once per `interval_ms`.
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms: interval_ms.max(0.0),
            last_emit_ms: None,
        }
    }

    /// Treat `now_ms` as the last emission, so the next emission happens
    /// one full interval later.
    pub fn prime(&mut self, now_ms: f64) {
        self.last_emit_ms = Some(now_ms);
    }

    /// Forget the last emission.
    pub fn reset(&mut self) {
        self.last_emit_ms = None;
    }

    /// Check if enough time has passed to emit; records the emission if so.
    /// An unprimed throttle always emits.
    pub fn should_emit(&mut self, now_ms: f64) -> bool {
        match self.last_emit_ms {
            Some(last) if now_ms - last < self.interval_ms => false,
            _ => {
                self.last_emit_ms = Some(now_ms);
                true
            }
        }
    }

    /// Interval in milliseconds.
    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }
}

impl Default for UpdateThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_UPDATE_INTERVAL_MS)
    }
}

/// Convert milliseconds to seconds.
pub fn ms_to_secs(ms: f64) -> f64 {
    ms / 1000.0
}

/// Convert seconds to milliseconds.
pub fn secs_to_ms(secs: f64) -> f64 {
    secs * 1000.0
}
