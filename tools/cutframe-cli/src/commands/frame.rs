//! Compose a single frame and print it as JSON.

use std::path::PathBuf;

use cutframe_common::clock::ManualClock;
use cutframe_common::config::EditorConfig;

pub fn run(
    path: PathBuf,
    at: f64,
    debug_overlay: bool,
    config: &EditorConfig,
) -> anyhow::Result<()> {
    if !at.is_finite() {
        anyhow::bail!("--at must be a finite number of seconds, got {at}");
    }
    let project = super::load_project(&path)?;
    let (mut editor, _frames) =
        super::mount_headless(project, Box::new(ManualClock::new(0.0)), config);

    editor.set_show_debug_info(debug_overlay);
    editor.seek_to(at);

    let frame = editor
        .last_frame()
        .ok_or_else(|| anyhow::anyhow!("Editor produced no frame"))?;
    let json = frame
        .to_json()
        .map_err(|e| anyhow::anyhow!("Failed to serialize frame: {e}"))?;
    println!("{json}");

    tracing::debug!(time = frame.time, ops = frame.ops.len(), "Composed frame");
    Ok(())
}
