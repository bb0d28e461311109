use std::path::PathBuf;

use cutframe_project_model::{
    Layout, MountDefaults, MountOptions, ObjectFit, TrackContent, TrackKind, VideoProject,
};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../fixtures/sample-project.json")
}

#[test]
fn sample_fixture_loads_and_validates() {
    let project = VideoProject::load(fixture_path()).unwrap();
    assert_eq!(project.name.as_deref(), Some("Launch Teaser"));
    assert_eq!(project.output.width, 1280);
    assert_eq!(project.output.frame_rate, Some(30.0));
    assert_eq!(project.background_color(), Some("#101018"));

    let kinds: Vec<_> = project.tracks.iter().map(|t| t.kind()).collect();
    assert_eq!(
        kinds,
        vec![TrackKind::Video, TrackKind::Image, TrackKind::Text, TrackKind::Audio]
    );
}

#[test]
fn sample_fixture_converts_in_paint_order() {
    let project = VideoProject::load(fixture_path()).unwrap();
    let tracks = MountOptions::from_project(project)
        .resolve(MountDefaults::default())
        .converted_tracks();

    assert_eq!(tracks[0].id.as_str(), "initial-video-0");
    assert_eq!(tracks[0].name, "Background");
    match &tracks[0].content {
        TrackContent::Video(visual) => {
            assert_eq!(visual.layout, Layout::Fullscreen);
            assert_eq!(visual.object_fit, ObjectFit::Cover);
            assert!(visual.muted);
        }
        other => panic!("expected video content, got {other:?}"),
    }

    let logo = tracks[1].visual().unwrap();
    assert_eq!(logo.layout, Layout::Custom);
    assert_eq!(logo.transform.unwrap().width, 200.0);
    assert_eq!(logo.opacity(), 0.9);

    // text position defaults to the canvas centre
    let text = tracks[2].text_metadata().unwrap();
    assert_eq!(text.text.as_deref(), Some("Hello"));
    assert_eq!((text.x, text.y), (Some(640.0), Some(360.0)));
}

#[test]
fn saved_project_reloads_identically() {
    let project = VideoProject::load(fixture_path()).unwrap();
    let dir = std::env::temp_dir().join(format!("cutframe-fixture-{}", std::process::id()));
    let path = dir.join("copy.json");

    project.save(&path).unwrap();
    let reloaded = VideoProject::load(&path).unwrap();
    assert_eq!(reloaded, project);

    std::fs::remove_dir_all(&dir).ok();
}
