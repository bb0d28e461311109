//! Transport control: play, pause, seek, rate and volume.
//!
//! ```text
//! Stopped ──play──▶ Playing ──pause──▶ Paused ──play──▶ Playing
//!                      │
//!                      └──reaches duration──▶ Stopped-at-end
//! ```

use cutframe_editor_state::Action;

use crate::editor::VideoEditor;

impl VideoEditor {
    /// Start playback from the current time.
    ///
    /// Returns once the transition is issued. Starting the primary element
    /// and the in-range video elements is best-effort. Calling it while
    /// already playing does nothing: the stored time lags the clock.
    pub fn play(&mut self) {
        let state = self.store.snapshot();
        let playback = &state.playback;
        if playback.is_playing {
            return;
        }

        self.cancel_frame();
        self.dispatch(Action::SetPlaying(true));
        let now = self.time_source.now_ms();
        self.clock
            .start(now, playback.current_time, playback.playback_rate);
        self.schedule_frame();
        tracing::debug!(from = playback.current_time, rate = playback.playback_rate, "Playback started");

        if let Some(primary) = self.primary.as_mut() {
            if let Err(err) = primary.play() {
                // the virtual clock runs regardless of the element
                tracing::debug!(error = %err, "Primary element refused to play");
            }
        }
        self.media.start_active(&state.tracks, playback.current_time);
    }

    /// Stop the clock and pause every element, keeping the current time.
    pub fn pause(&mut self) {
        self.cancel_frame();
        self.clock.stop();
        let changed = self.dispatch(Action::SetPlaying(false));

        if let Some(primary) = self.primary.as_mut() {
            primary.pause();
        }
        self.media.pause_all();

        if changed {
            tracing::debug!(at = self.store.state().playback.current_time, "Playback paused");
        }
        self.refresh();
    }

    pub fn toggle_playback(&mut self) {
        if self.store.state().playback.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Jump to `time`, clamped into the timeline, in any play state.
    pub fn seek_to(&mut self, time: f64) {
        if time.is_nan() {
            return;
        }
        let playback = &self.store.state().playback;
        let time = time.clamp(0.0, playback.duration);
        let rate = playback.playback_rate;
        let playing = playback.is_playing;

        self.dispatch(Action::SetCurrentTime(time));

        if playing {
            // one live tick chain: drop the pending frame, re-anchor, reschedule
            self.cancel_frame();
            let now = self.time_source.now_ms();
            self.clock.rebase(now, time, rate);
            self.schedule_frame();
        }

        if let Some(primary) = self.primary.as_mut() {
            primary.set_current_time(time);
        }
        let state = self.store.snapshot();
        self.media.seek_active(&state.tracks, time);
        self.refresh();
    }

    pub fn seek_to_start(&mut self) {
        self.seek_to(0.0);
    }

    pub fn seek_to_end(&mut self) {
        let duration = self.store.state().playback.duration;
        self.seek_to(duration);
    }

    /// Seek to a fraction of the timeline; `fraction` is clamped to `[0, 1]`.
    pub fn seek_to_fraction(&mut self, fraction: f64) {
        if fraction.is_nan() {
            return;
        }
        let duration = self.store.state().playback.duration;
        self.seek_to(fraction.clamp(0.0, 1.0) * duration);
    }

    /// Move one frame forward or back.
    pub fn step_frame(&mut self, forward: bool) {
        let step = 1.0 / self.frame_step_fps;
        let current = self.store.state().playback.current_time;
        self.seek_to(if forward { current + step } else { current - step });
    }

    pub fn set_volume(&mut self, volume: f64) {
        if !self.dispatch(Action::SetVolume(volume)) {
            return;
        }
        let volume = self.store.state().playback.volume;
        if let Some(primary) = self.primary.as_mut() {
            primary.set_volume(volume);
        }
    }

    /// Flip between silent and full volume.
    pub fn toggle_mute(&mut self) {
        let volume = self.store.state().playback.volume;
        self.set_volume(if volume > 0.0 { 0.0 } else { 1.0 });
    }

    /// Change speed. While playing, the clock is re-anchored at its
    /// current position so the playhead does not jump.
    pub fn set_playback_rate(&mut self, rate: f64) {
        let now = self.time_source.now_ms();
        let position = self.clock.position_at(now);

        if !self.dispatch(Action::SetPlaybackRate(rate)) {
            return;
        }
        let playback = &self.store.state().playback;
        let rate = playback.playback_rate;
        if let Some(position) = position {
            let position = position.min(playback.duration);
            self.clock.rebase(now, position, rate);
        }
        if let Some(primary) = self.primary.as_mut() {
            primary.set_playback_rate(rate);
        }
    }
}

/// Format seconds as `MM:SS`, or `HH:MM:SS` from one hour up.
pub fn format_timecode(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}
