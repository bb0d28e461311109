//! The virtual master clock.
//!
//! Time is derived from a wall-clock anchor, never from a media element:
//!
//! ```text
//! current = initial + (now - reference) * rate / 1000
//! ```
//!
//! Media elements are slaved to this value. Emitted updates are thinned
//! by an [`UpdateThrottle`] while the frame loop itself keeps running.

use cutframe_common::clock::{ms_to_secs, UpdateThrottle};

/// Outcome of one clock tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    /// Too soon since the last emitted update, or the clock is stopped.
    Skip,
    /// The playhead moved to this time.
    Advance(f64),
    /// The playhead reached the end; the clock has stopped itself.
    Finished(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Anchor {
    reference_ms: f64,
    initial_time: f64,
    rate: f64,
}

/// Drift-free playback clock anchored to wall time.
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    anchor: Option<Anchor>,
    throttle: UpdateThrottle,
}

impl PlaybackClock {
    pub fn new(update_interval_ms: f64) -> Self {
        Self {
            anchor: None,
            throttle: UpdateThrottle::new(update_interval_ms),
        }
    }

    /// Begin running from `current_time`.
    ///
    /// The throttle is primed with `now_ms`, so the first emitted update
    /// comes one full interval after play.
    pub fn start(&mut self, now_ms: f64, current_time: f64, rate: f64) {
        self.anchor = Some(Anchor {
            reference_ms: now_ms,
            initial_time: current_time,
            rate,
        });
        self.throttle.prime(now_ms);
    }

    /// Move the anchor without touching the throttle. Used after a seek or
    /// a rate change while running.
    pub fn rebase(&mut self, now_ms: f64, current_time: f64, rate: f64) {
        if self.anchor.is_some() {
            self.anchor = Some(Anchor {
                reference_ms: now_ms,
                initial_time: current_time,
                rate,
            });
        }
    }

    pub fn stop(&mut self) {
        self.anchor = None;
        self.throttle.reset();
    }

    pub fn is_running(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn update_interval_ms(&self) -> f64 {
        self.throttle.interval_ms()
    }

    /// Unthrottled position at `now_ms`, if running.
    pub fn position_at(&self, now_ms: f64) -> Option<f64> {
        self.anchor
            .map(|a| a.initial_time + ms_to_secs((now_ms - a.reference_ms).max(0.0)) * a.rate)
    }

    /// Compute the playhead for `now_ms` against a timeline of `duration`.
    pub fn tick(&mut self, now_ms: f64, duration: f64) -> Tick {
        if !self.is_running() || !self.throttle.should_emit(now_ms) {
            return Tick::Skip;
        }
        let Some(time) = self.position_at(now_ms) else {
            return Tick::Skip;
        };
        if time >= duration {
            self.stop();
            Tick::Finished(duration)
        } else {
            Tick::Advance(time)
        }
    }
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new(cutframe_common::clock::DEFAULT_UPDATE_INTERVAL_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopped_clock_skips() {
        let mut clock = PlaybackClock::default();
        assert_eq!(clock.tick(1000.0, 10.0), Tick::Skip);
    }

    #[test]
    fn test_first_tick_inside_interval_is_throttled() {
        let mut clock = PlaybackClock::default();
        clock.start(0.0, 2.0, 1.0);
        assert_eq!(clock.tick(16.0, 10.0), Tick::Skip);
        match clock.tick(33.0, 10.0) {
            Tick::Advance(t) => assert!((t - 2.033).abs() < 1e-9),
            other => panic!("expected advance, got {other:?}"),
        }
        assert_eq!(clock.tick(40.0, 10.0), Tick::Skip);
    }

    #[test]
    fn test_rate_scales_elapsed_time() {
        let mut clock = PlaybackClock::new(0.0);
        clock.start(1000.0, 0.0, 2.0);
        assert_eq!(clock.tick(1500.0, 10.0), Tick::Advance(1.0));
    }

    #[test]
    fn test_reaching_duration_finishes_and_stops() {
        let mut clock = PlaybackClock::default();
        clock.start(0.0, 9.98, 1.0);
        assert_eq!(clock.tick(33.0, 10.0), Tick::Finished(10.0));
        assert!(!clock.is_running());
        assert_eq!(clock.tick(66.0, 10.0), Tick::Skip);
    }

    #[test]
    fn test_rebase_continues_from_new_position() {
        let mut clock = PlaybackClock::new(0.0);
        clock.start(0.0, 0.0, 1.0);
        assert_eq!(clock.tick(1000.0, 10.0), Tick::Advance(1.0));

        clock.rebase(1000.0, 5.0, 1.0);
        assert_eq!(clock.tick(1500.0, 10.0), Tick::Advance(5.5));

        clock.rebase(1500.0, 5.5, 0.5);
        assert_eq!(clock.tick(2500.0, 10.0), Tick::Advance(6.0));
    }

    #[test]
    fn test_position_ignores_throttle() {
        let mut clock = PlaybackClock::default();
        assert_eq!(clock.position_at(10.0), None);
        clock.start(0.0, 1.0, 2.0);
        assert_eq!(clock.position_at(250.0), Some(1.5));
    }

    #[test]
    fn test_rebase_does_not_start_a_stopped_clock() {
        let mut clock = PlaybackClock::default();
        clock.rebase(0.0, 3.0, 1.0);
        assert!(!clock.is_running());
    }
}
