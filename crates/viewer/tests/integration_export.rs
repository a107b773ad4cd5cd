//! Integration tests for the one-shot exports.

use mmviewer_lib::adapter::DisplayStyle;
use mmviewer_lib::config::ViewerSettings;
use mmviewer_lib::fixtures;
use mmviewer_lib::harness::headless_session_with;
use shared::Representation;

#[test]
fn test_save_writes_every_object() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = headless_session_with(ViewerSettings::default().with_output_dir(dir.path())).unwrap();
    session
        .add_polydata(fixtures::cube(1.0), DisplayStyle::default())
        .unwrap();
    session
        .add_geometry(fixtures::triangle(), [1.0, 0.0, 0.0], Representation::Wireframe)
        .unwrap();
    session.add_point([0.0, 0.0, 5.0], [0.0; 3]).unwrap();

    let path = session.save_geometry().unwrap();
    let doc = std::fs::read_to_string(&path).unwrap();
    assert!(doc.contains("<VTKFile type=\"PolyData\""));
    assert_eq!(doc.matches("<Piece ").count(), 3);
    assert!(doc.contains("NumberOfPoints=\"8\""));
    assert!(doc.contains("NumberOfPolys=\"6\""));
    assert!(doc.contains("NumberOfVerts=\"1\""));
}

#[test]
fn test_save_overwrites_previous_file() {
    let dir = tempfile::tempdir().unwrap();
    let settings = ViewerSettings::default().with_output_dir(dir.path());
    std::fs::write(settings.output.save_path(), "stale").unwrap();

    let mut session = headless_session_with(settings).unwrap();
    session
        .add_polydata(fixtures::triangle(), DisplayStyle::default())
        .unwrap();
    let path = session.save_geometry().unwrap();
    let doc = std::fs::read_to_string(path).unwrap();
    assert!(!doc.contains("stale"));
}

#[test]
fn test_screenshot_matches_window() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = ViewerSettings::default().with_output_dir(dir.path());
    settings.window.width = 64;
    settings.window.height = 48;
    let mut session = headless_session_with(settings).unwrap();

    let path = session.screenshot().unwrap();
    let img = image::open(path).unwrap().to_rgb8();
    assert_eq!(img.dimensions(), (64, 48));
    assert_eq!(img.get_pixel(10, 10).0, [197, 208, 255]);
}
