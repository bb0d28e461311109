//! Validate a Cutframe project file.

use std::path::PathBuf;

use cutframe_project_model::TrackKind;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating project at: {}", path.display());

    let project = super::load_project(&path)?;

    println!("  Name: {}", project.name.as_deref().unwrap_or("(untitled)"));
    println!(
        "  Output: {}x{}",
        project.output.width, project.output.height
    );
    println!("  Duration: {:.2}s", project.duration);
    println!("  Tracks: {}", project.tracks.len());

    // Advisory checks; the project loads regardless
    let mut warnings = Vec::new();
    for (index, track) in project.tracks.iter().enumerate() {
        let timing = track.timing();
        if timing.end_time < timing.start_time {
            warnings.push(format!(
                "track #{index} ends before it starts ({} < {})",
                timing.end_time, timing.start_time
            ));
        }
        if timing.start_time > project.duration {
            warnings.push(format!(
                "track #{index} starts after the timeline ends"
            ));
        } else if timing.end_time > project.duration {
            warnings.push(format!(
                "track #{index} is clipped to the {:.2}s timeline",
                project.duration
            ));
        }
        if track.kind() == TrackKind::Audio {
            warnings.push(format!("track #{index} is audio and is not played back"));
        }
    }

    if warnings.is_empty() {
        println!("\nProject is valid.");
    } else {
        println!("\nWarnings:");
        for warning in &warnings {
            println!("  - {warning}");
        }
        println!("\nProject is valid with {} warning(s).", warnings.len());
    }

    Ok(())
}
