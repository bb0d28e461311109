pub mod frame;
pub mod info;
pub mod init;
pub mod preview;
pub mod validate;

use std::path::Path;

use cutframe_common::clock::TimeSource;
use cutframe_common::config::EditorConfig;
use cutframe_project_model::{load_project_file, MountOptions, VideoProject};
use cutframe_render_engine::{EditorHost, FrameQueue, SimulatedMediaBackend, VideoEditor};

/// Load a timeline project or a playlist, lowering the latter onto tracks.
pub fn load_project(path: &Path) -> anyhow::Result<VideoProject> {
    load_project_file(path).map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))
}

/// Mount `project` against simulated media and a host-pumped frame queue.
pub fn mount_headless(
    project: VideoProject,
    time_source: Box<dyn TimeSource>,
    config: &EditorConfig,
) -> (VideoEditor, FrameQueue) {
    let frames = FrameQueue::new();
    let host = EditorHost::new(
        time_source,
        Box::new(frames.clone()),
        Box::new(SimulatedMediaBackend::new()),
    );
    let editor = VideoEditor::mount(MountOptions::from_project(project), host, config);
    (editor, frames)
}

/// Deliver every pending animation frame to the editor.
pub fn pump_frames(editor: &mut VideoEditor, frames: &FrameQueue) {
    for handle in frames.take_due() {
        editor.on_animation_frame(handle);
    }
}
