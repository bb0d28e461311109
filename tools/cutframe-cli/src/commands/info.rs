//! Show project information.

use std::path::PathBuf;

use cutframe_common::config::EditorConfig;
use cutframe_project_model::{MountDefaults, MountOptions, Track, TrackContent};
use cutframe_render_engine::format_timecode;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectSummary<'a> {
    name: Option<&'a str>,
    width: u32,
    height: u32,
    duration: f64,
    frame_rate: Option<f64>,
    background_color: Option<&'a str>,
    tracks: &'a [Track],
}

pub fn run(path: PathBuf, json: bool, config: &EditorConfig) -> anyhow::Result<()> {
    let project = super::load_project(&path)?;
    let effective = MountOptions::from_project(project).resolve(MountDefaults {
        width: config.canvas.width,
        height: config.canvas.height,
        duration: config.playback.default_duration_secs,
    });
    let tracks = effective.converted_tracks();

    if json {
        let summary = ProjectSummary {
            name: effective.name.as_deref(),
            width: effective.width,
            height: effective.height,
            duration: effective.duration,
            frame_rate: effective.frame_rate,
            background_color: effective.background_color.as_deref(),
            tracks: &tracks,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "Project: {}",
        effective.name.as_deref().unwrap_or("(untitled)")
    );
    println!("  Canvas: {}x{}", effective.width, effective.height);
    println!(
        "  Duration: {} ({:.2}s)",
        format_timecode(effective.duration),
        effective.duration
    );
    if let Some(fps) = effective.frame_rate {
        println!("  Frame rate: {fps}");
    }
    if let Some(color) = &effective.background_color {
        println!("  Background: {color}");
    }
    println!();

    println!("Tracks ({}), bottom to top:", tracks.len());
    for track in &tracks {
        let mut flags = Vec::new();
        if !track.enabled {
            flags.push("disabled");
        }
        if track.locked {
            flags.push("locked");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };

        println!(
            "  {} {:<6} {:>7.2}s - {:>7.2}s  {}{}",
            track.id,
            track.kind().as_str(),
            track.start_time,
            track.end_time,
            track.name,
            flags
        );
        match &track.content {
            TrackContent::Text(text) => {
                if let Some(body) = &text.text {
                    println!("      text: {body:?}");
                }
            }
            TrackContent::Video(visual) | TrackContent::Image(visual) => {
                println!(
                    "      source: {}  layout: {:?}  fit: {:?}",
                    track.source.as_deref().unwrap_or("-"),
                    visual.layout,
                    visual.object_fit
                );
            }
            TrackContent::Audio(audio) => {
                println!(
                    "      source: {}  volume: {}",
                    track.source.as_deref().unwrap_or("-"),
                    audio.volume
                );
            }
        }
    }

    Ok(())
}
