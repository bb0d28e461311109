//! Initialize a new Cutframe project file.

use std::path::PathBuf;

use cutframe_project_model::{
    InitialTextTrack, InitialTrack, ProjectSettings, TextAlign, TrackTiming, VideoProject,
};

pub fn run(
    name: String,
    output: PathBuf,
    width: u32,
    height: u32,
    duration: f64,
) -> anyhow::Result<()> {
    let path = output.join(format!("{}.json", file_stem(&name)));
    if path.exists() {
        anyhow::bail!("Refusing to overwrite existing file {}", path.display());
    }
    println!("Creating project '{}' at {}", name, path.display());

    let mut project = VideoProject::new(&name, width, height, duration);
    project.settings = Some(ProjectSettings {
        background_color: Some("#000000".to_string()),
        ..ProjectSettings::default()
    });
    project.tracks.push(InitialTrack::Text(InitialTextTrack {
        timing: TrackTiming {
            name: Some("Title".to_string()),
            ..TrackTiming::new(0.0, duration.min(3.0))
        },
        text: name.clone(),
        font_size: Some(64.0),
        color: None,
        x: None,
        y: None,
        font_family: None,
        text_align: Some(TextAlign::Center),
        baseline: None,
        background_color: None,
    }));

    project
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid project parameters: {e}"))?;
    project
        .save(&path)
        .map_err(|e| anyhow::anyhow!("Failed to create project: {e}"))?;

    println!("Project created successfully:");
    println!("  File: {}", path.display());
    println!("  Canvas: {}x{}", width, height);
    println!("  Duration: {duration}s");
    println!("  Tracks: 1 (title text)");

    Ok(())
}

/// Lowercase, dash-separated file name for a project title.
fn file_stem(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    let stem = stem
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if stem.is_empty() {
        "project".to_string()
    } else {
        stem
    }
}
