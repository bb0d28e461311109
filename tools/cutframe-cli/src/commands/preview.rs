//! Headless playback preview.
//!
//! Runs a mounted editor either against a simulated 60 Hz display (the
//! default, deterministic and instant) or against the system clock with a
//! real-time tokio interval.

use std::path::PathBuf;
use std::time::Duration;

use cutframe_common::clock::{ms_to_secs, secs_to_ms, ManualClock, SystemClock};
use cutframe_common::config::EditorConfig;
use cutframe_render_engine::{format_timecode, VideoEditor};
use tokio::time::{Instant, MissedTickBehavior};

/// Display refresh period of the simulated host.
const FRAME_PERIOD_MS: f64 = 1000.0 / 60.0;

pub struct PreviewOptions {
    pub seconds: f64,
    pub rate: f64,
    pub seek: f64,
    pub every: f64,
}

impl PreviewOptions {
    fn check(&self) -> anyhow::Result<()> {
        if !(self.seconds.is_finite() && self.seconds > 0.0) {
            anyhow::bail!("--seconds must be positive, got {}", self.seconds);
        }
        if !(self.every.is_finite() && self.every > 0.0) {
            anyhow::bail!("--every must be positive, got {}", self.every);
        }
        if !self.rate.is_finite() || !self.seek.is_finite() {
            anyhow::bail!("--rate and --seek must be finite numbers");
        }
        Ok(())
    }
}

/// Prints one transport line each time the playhead crosses a report mark.
struct Reporter {
    every: f64,
    next_mark: f64,
}

impl Reporter {
    fn new(every: f64) -> Self {
        Self {
            every,
            next_mark: 0.0,
        }
    }

    fn observe(&mut self, editor: &VideoEditor) {
        let time = editor.state().playback.current_time;
        if time >= self.next_mark {
            print_line(editor);
            self.next_mark = ((time / self.every).floor() + 1.0) * self.every;
        }
    }
}

fn print_line(editor: &VideoEditor) {
    let state = editor.state();
    let overlay = editor.debug_overlay().to_string();
    println!(
        "[{} / {}] {}",
        format_timecode(state.playback.current_time),
        format_timecode(state.playback.duration),
        overlay.lines().collect::<Vec<_>>().join(" | ")
    );
}

fn start(editor: &mut VideoEditor, options: &PreviewOptions) {
    editor.set_playback_rate(options.rate);
    editor.seek_to(options.seek);
    editor.play();
    tracing::info!(
        rate = editor.state().playback.playback_rate,
        from = editor.state().playback.current_time,
        "Preview started"
    );
}

fn finish(mut editor: VideoEditor) {
    editor.pause();
    print_line(&editor);
    editor.unmount();
}

/// Run against a simulated display, as fast as possible.
pub fn run_simulated(
    path: PathBuf,
    options: PreviewOptions,
    config: &EditorConfig,
) -> anyhow::Result<()> {
    options.check()?;
    let project = super::load_project(&path)?;
    let clock = ManualClock::new(0.0);
    let (mut editor, frames) = super::mount_headless(project, Box::new(clock.clone()), config);

    start(&mut editor, &options);
    let mut reporter = Reporter::new(options.every);
    reporter.observe(&editor);

    let budget_ms = secs_to_ms(options.seconds);
    let mut elapsed_ms = 0.0;
    while elapsed_ms < budget_ms && editor.state().playback.is_playing {
        clock.advance(FRAME_PERIOD_MS);
        elapsed_ms += FRAME_PERIOD_MS;
        super::pump_frames(&mut editor, &frames);
        reporter.observe(&editor);
    }

    tracing::debug!(elapsed_ms, "Simulated preview finished");
    finish(editor);
    Ok(())
}

/// Run in real time, driven by a tokio interval at display rate.
pub async fn run_realtime(
    path: PathBuf,
    options: PreviewOptions,
    config: &EditorConfig,
) -> anyhow::Result<()> {
    options.check()?;
    let project = super::load_project(&path)?;
    let (mut editor, frames) =
        super::mount_headless(project, Box::new(SystemClock::start()), config);

    start(&mut editor, &options);
    let mut reporter = Reporter::new(options.every);
    reporter.observe(&editor);

    let period = Duration::from_secs_f64(ms_to_secs(FRAME_PERIOD_MS));
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let deadline = Instant::now() + Duration::from_secs_f64(options.seconds);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                super::pump_frames(&mut editor, &frames);
                reporter.observe(&editor);
                if !editor.state().playback.is_playing || Instant::now() >= deadline {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("Interrupted");
                break;
            }
        }
    }

    finish(editor);
    Ok(())
}
